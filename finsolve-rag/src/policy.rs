//! Role → visible departments mapping.

use std::collections::{BTreeSet, HashMap};

use crate::department::Department;
use crate::error::{RagError, Result};

/// Role that may read every department.
pub const FULL_ACCESS_ROLE: &str = "c_level";

/// Maps a requester's role to the departments it may retrieve from.
///
/// - the full-access role sees every configured department;
/// - a role with an explicit override sees exactly that set;
/// - any other role sees `{role-as-department, general}`, which is just
///   `{general}` when the role does not name a department.
///
/// Recognition ([`AccessPolicy::authorize`]) is separate from mapping: the
/// boundary rejects unknown roles before asking for their departments.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    departments: BTreeSet<Department>,
    full_access_role: String,
    overrides: HashMap<String, BTreeSet<Department>>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(Department::ALL, FULL_ACCESS_ROLE)
    }
}

impl AccessPolicy {
    pub fn new(
        departments: impl IntoIterator<Item = Department>,
        full_access_role: impl Into<String>,
    ) -> Self {
        Self {
            departments: departments.into_iter().collect(),
            full_access_role: full_access_role.into(),
            overrides: HashMap::new(),
        }
    }

    /// Give `role` an explicit department set, replacing the default mapping.
    pub fn with_role(
        mut self,
        role: impl Into<String>,
        departments: impl IntoIterator<Item = Department>,
    ) -> Self {
        self.overrides.insert(role.into(), departments.into_iter().collect());
        self
    }

    pub fn full_access_role(&self) -> &str {
        &self.full_access_role
    }

    /// Departments `role` may retrieve from.
    pub fn allowed_departments(&self, role: &str) -> BTreeSet<Department> {
        if role == self.full_access_role {
            return self.departments.clone();
        }
        if let Some(departments) = self.overrides.get(role) {
            return departments.clone();
        }

        let mut allowed = BTreeSet::from([Department::General]);
        if let Ok(department) = role.parse::<Department>() {
            allowed.insert(department);
        }
        allowed
    }

    /// Whether `role` is known: the full-access role, an overridden role, or
    /// one of the configured departments.
    pub fn recognizes(&self, role: &str) -> bool {
        role == self.full_access_role
            || self.overrides.contains_key(role)
            || role.parse::<Department>().is_ok_and(|d| self.departments.contains(&d))
    }

    /// Reject unknown roles with [`RagError::AccessDenied`].
    pub fn authorize(&self, role: &str) -> Result<()> {
        if self.recognizes(role) {
            Ok(())
        } else {
            Err(RagError::AccessDenied { role: role.to_string() })
        }
    }

    /// All recognized roles, full-access first.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec![self.full_access_role.clone()];
        roles.extend(self.departments.iter().map(|d| d.as_str().to_string()));
        let mut extra: Vec<String> =
            self.overrides.keys().filter(|r| !roles.contains(r)).cloned().collect();
        extra.sort();
        roles.extend(extra);
        roles
    }
}
