//! Assembles retrieved context and role information into a single prompt.

use crate::document::SearchResult;

/// Answer returned, without calling the model, when retrieval finds nothing.
pub const NO_INFORMATION_ANSWER: &str = "I don't know based on the current information.";

/// Separator placed between context entries.
pub const CONTEXT_DELIMITER: &str = "\n---\n";

/// What to do with a query after retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    /// Nothing was retrieved; answer with [`NO_INFORMATION_ANSWER`].
    ShortCircuit(&'static str),
    /// Send this prompt to the model.
    Prompt(String),
}

/// Builds the instruction block sent to the model.
///
/// The role shown to the model is advisory only; department filtering has
/// already happened during retrieval.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    assistant: String,
    organization: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new("an AI assistant", "FinSolve Technologies, a leading FinTech company")
    }
}

impl PromptComposer {
    pub fn new(assistant: impl Into<String>, organization: impl Into<String>) -> Self {
        Self { assistant: assistant.into(), organization: organization.into() }
    }

    /// Render each retrieved chunk as `[source] text`, joined by [`CONTEXT_DELIMITER`].
    pub fn context(results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|r| format!("[{}] {}", r.chunk.metadata.source, r.chunk.text))
            .collect::<Vec<_>>()
            .join(CONTEXT_DELIMITER)
    }

    /// Compose the prompt for `query`, or short-circuit when `results` is empty.
    pub fn compose(&self, query: &str, role: &str, results: &[SearchResult]) -> Composition {
        if results.is_empty() {
            return Composition::ShortCircuit(NO_INFORMATION_ANSWER);
        }

        Composition::Prompt(format!(
            "You are {assistant} for {organization}. You help internal employees by answering \
             questions from secure, role-specific company documents.\n\n\
             The user asking this question has the role: **{role}**\n\n\
             {RULES}\n\
             ### Context\n{context}\n\n\
             ### Question\n{query}\n\n\
             ### Answer",
            assistant = self.assistant,
            organization = self.organization,
            role = role.to_uppercase(),
            context = Self::context(results),
        ))
    }
}

const RULES: &str = "\
### Rules
1. Answer only from the context below. Do not invent facts.
2. If the question concerns a department outside the user's role, reply:
   \"You are not authorized to access that information.\"
3. If the context does not contain the answer, reply:
   \"I don't have that information based on the current documents.\"
4. Cite the documents you used in square brackets, e.g. [quarterly_report.md].
5. Keep the answer clear, professional and concise.
6. Markdown context: respect headings, lists and code blocks.
7. Tabular context (column: value rows): format currency like $1200.50 and
   percentages like 12.3%, and give exact values when numbers are requested.
";
