//! The menu's operations minus the terminal: prompt construction and
//! post-processing of model replies. Every function takes the model as a
//! [`Generate`] so it can be driven by a stub.

use crate::extract::{ExtractError, Extraction};
use crate::model::{Generate, Generation, GenerationRequest, ModelError};
use crate::recipe::{self, Recipe};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Longest description used verbatim as a generated recipe's name.
pub const MAX_NAME_CHARS: usize = 50;

const EXPLAIN_CODE_PROMPT: &str = "Explain the following code snippet thoroughly, focusing on its \
purpose, inputs, and outputs. Use clear, simple language:";

const CODE_SYSTEM_INSTRUCTION: &str = "You are an expert software developer. Generate a complete, \
runnable code solution for the user's request. Always wrap the code in a single Markdown code block \
(```language\\ncode\\n```).";

const SUMMARY_PROMPT: &str =
    "Please provide a concise, bulleted summary of the following document content:";

pub const IMAGE_SUMMARY_PROMPT: &str =
    "Describe and summarize this image content in a concise, bulleted list.";

const COMMAND_PROMPT: &str = "You are an expert Linux/macOS command line utility expert. Your sole \
output must be a single, complete, executable command line string that fulfills the user's request. \
DO NOT include any explanatory text, markdown formatting, or extra characters. Only provide the \
command itself.";

const TAGS_PROMPT: &str = "Analyze the following Linux/CLI command. Provide exactly 5 relevant tags, \
separated by commas. Do NOT include any explanation, headers, or extra text, only the tags.";

const TUTOR_PROMPT: &str = "Act as a Linux/DevOps tutor. Explain the following command line recipe \
step-by-step. Focus on what each flag and argument does, and provide a clear, easy-to-understand \
purpose for the entire command. The command is:";

// ---------------------------------------------------------------------------
// Q&A and code
// ---------------------------------------------------------------------------

/// General question with web-search grounding.
pub fn ask(model: &dyn Generate, question: &str) -> Result<Generation, ModelError> {
    model.generate(&GenerationRequest::new(question).grounded())
}

pub fn explain_code(model: &dyn Generate, snippet: &str) -> Result<Generation, ModelError> {
    let prompt = format!("{EXPLAIN_CODE_PROMPT}\n\n\n{snippet}\n");
    model.generate(&GenerationRequest::new(prompt))
}

pub fn generate_code(model: &dyn Generate, request: &str) -> Result<Generation, ModelError> {
    let prompt = format!("Generate code for the following request: {request}");
    model.generate(&GenerationRequest::new(prompt).with_system_instruction(CODE_SYSTEM_INSTRUCTION))
}

/// True for the line that terminates a pasted code snippet.
pub fn is_end_marker(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("END")
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// A ready-to-send summary request.
#[derive(Debug)]
pub struct SummaryRequest {
    pub request: GenerationRequest,
    /// Characters of extracted text; `None` for images.
    pub extracted_chars: Option<usize>,
}

/// Turn an extraction into a summary request. Failures, warnings included,
/// are handed back so the caller can abort.
pub fn summary_request(extraction: Extraction) -> Result<SummaryRequest, ExtractError> {
    match extraction {
        Extraction::Text(text) => Ok(SummaryRequest {
            extracted_chars: Some(text.chars().count()),
            request: GenerationRequest::new(format!("{SUMMARY_PROMPT}\n\n---\n{text}\n---")),
        }),
        Extraction::Image(image) => Ok(SummaryRequest {
            extracted_chars: None,
            request: GenerationRequest::new(IMAGE_SUMMARY_PROMPT).with_image(image),
        }),
        Extraction::Failure(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// Ask for a single shell command. `Ok(None)` when the reply cleans down to
/// nothing usable.
pub fn generate_command(
    model: &dyn Generate,
    description: &str,
) -> Result<Option<String>, ModelError> {
    let prompt = format!("{COMMAND_PROMPT} Request: {description}");
    let generation = model.generate(&GenerationRequest::new(prompt))?;
    let command = clean_command(&generation.text);
    debug!(raw = %generation.text, %command, "cleaned generated command");
    Ok((!command.is_empty()).then_some(command))
}

fn shell_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:(?:bash|sh|shell|zsh|console)(?:\s+|$))?(?:\$\s+)?").unwrap())
}

/// Reduce a model reply to one command line: the first line that is not a
/// code fence, with backticks and a leading shell tag or `$` prompt removed.
pub fn clean_command(reply: &str) -> String {
    let Some(line) = reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("```"))
    else {
        return String::new();
    };
    let line = line.replace('`', "");
    shell_tag().replace(line.trim(), "").trim().to_string()
}

/// Name for an AI-generated recipe.
pub fn recipe_name(description: &str) -> String {
    let description = description.trim();
    if description.chars().count() > MAX_NAME_CHARS {
        let head: String = description.chars().take(MAX_NAME_CHARS).collect();
        format!("AI Generated: {head}...")
    } else {
        description.to_string()
    }
}

/// Ask for five tags describing `command`.
pub fn suggest_tags(model: &dyn Generate, command: &str) -> Result<Vec<String>, ModelError> {
    let prompt = format!("{TAGS_PROMPT} Command: {command}");
    let generation = model.generate(&GenerationRequest::new(prompt))?;
    Ok(recipe::parse_tags(&generation.text.replace('\n', ",")))
}

pub fn explain_recipe(model: &dyn Generate, recipe: &Recipe) -> Result<Generation, ModelError> {
    let prompt = format!("{TUTOR_PROMPT}\n\n`{}`", recipe.command);
    model.generate(&GenerationRequest::new(prompt))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
