//! Prompt loading and slot filling.
//!
//! The answer synthesis prompt lives in the central prompts directory as a
//! markdown document with Usage and Prompt sections and is embedded at
//! compile time using `include_str!`.

use crate::error::{Error, Result};

// Embed prompt files at compile time
const ANSWER_MD: &str = include_str!("../../../prompts/answer.md");

/// Placeholder replaced with the labelled context block.
const CONTEXT_SLOT: &str = "{context}";
/// Placeholder replaced with the user's question.
const QUESTION_SLOT: &str = "{question}";

/// Loads the answer synthesis prompt template.
///
/// # Errors
/// Returns an error if the prompt section cannot be extracted
pub fn answer_template() -> Result<String> {
    extract_prompt_section(ANSWER_MD)
}

/// Fills the answer template with the labelled context and the question.
///
/// The question slot is filled first; the context slot precedes it in the
/// template, so filling context last with a single replacement keeps
/// placeholder text inside either value from capturing the other slot.
///
/// # Errors
/// Returns an error if the prompt section cannot be extracted
pub fn build_prompt(context: &str, question: &str) -> Result<String> {
    let template = answer_template()?;
    let with_question = template.replacen(QUESTION_SLOT, question, 1);
    Ok(with_question.replacen(CONTEXT_SLOT, context, 1))
}

/// Extracts the Prompt section from a markdown file
///
/// # Errors
/// Returns an error if the Prompt section cannot be found
fn extract_prompt_section(content: &str) -> Result<String> {
    // Find the "## Prompt" header
    let prompt_start = content
        .find("## Prompt")
        .ok_or_else(|| Error::Config("Prompt section not found".to_owned()))?;

    // Skip past the header line
    let prompt_content_start = content[prompt_start..]
        .find('\n')
        .ok_or_else(|| Error::Config("Invalid prompt format".to_owned()))?
        + prompt_start
        + 1;

    // Take everything after "## Prompt" to the end of the file
    // (prompt files have ## Prompt as the last top-level section)
    Ok(content[prompt_content_start..].trim().to_owned())
}
