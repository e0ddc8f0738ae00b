//! Prompt and fallback text for the summary service.
//!
//! Centralising every piece of exchanged wording here serves two purposes:
//!
//! 1. **Single source of truth** — the instruction sent to the model and the
//!    fallback strings substituted for missing response fields are contract
//!    text; changing either requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the composed prompt without
//!    touching a real service, making prompt regressions easy to catch.
//!
//! Callers can override the template via
//! [`crate::config::SummaryConfig::prompt_template`]; the constant here is
//! used only when no override is provided.

/// Placeholder replaced with the user's text when composing the prompt.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Default instruction template for the summarize request.
///
/// The model is asked for two artifacts in one response: a bulleted
/// abstractive summary and a flowchart derived from it. The declared JSON
/// response shape (see [`crate::client`]) enforces the envelope; the wording
/// here shapes the content. Bullet formatting and diagram syntax are
/// instructions to the model, not locally enforced.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"You are an expert in text summarization and data visualization. Perform two tasks on the text provided below.

1. SUMMARY
   - Write a concise, abstractive summary in your own words.
   - Format it as a bulleted list, one point per line, each line starting with "* ".

2. DIAGRAM
   - Derive a flowchart from the summary, not from the raw text.
   - Use Mermaid flowchart syntax, starting with the line "flowchart TD".
   - Use broad, high-level concept nodes and syntactically valid directed
     edges ("-->"), one statement per line.

Here is the text:
---
{input}
---"#;

/// Substituted when the service response omits the `summary` field or
/// returns it empty.
pub const FALLBACK_SUMMARY: &str = "No summary could be generated.";

/// Substituted when the service response omits the `diagram` field or
/// returns it empty. Must itself be valid flowchart source.
pub const FALLBACK_DIAGRAM: &str = "flowchart TD\n  A[\"No diagram could be generated.\"]";

/// Compose the instruction for one summarize request.
///
/// The input text is embedded verbatim. A custom template uses the
/// `{input}` placeholder (first occurrence replaced); templates without the
/// placeholder get the text appended in the default delimiter block.
pub fn build_prompt(template: Option<&str>, input: &str) -> String {
    let template = template.unwrap_or(DEFAULT_PROMPT_TEMPLATE);
    if template.contains(INPUT_PLACEHOLDER) {
        template.replacen(INPUT_PLACEHOLDER, input, 1)
    } else {
        format!("{template}\n\nHere is the text:\n---\n{input}\n---")
    }
}
