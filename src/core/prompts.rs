//! Prompt rendering and chat message construction.

use crate::core::assets;
use crate::core::lab::{Difficulty, TemplateType};
use crate::core::model::ChatMessage;
use std::sync::LazyLock;
use tiktoken_rs::{CoreBPE, cl100k_base};

static BPE: LazyLock<Option<CoreBPE>> = LazyLock::new(|| cl100k_base().ok());

/// Inputs shared by the selector and content prompts.
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub goal: &'a str,
    pub context: Option<&'a str>,
    pub level: Difficulty,
    pub duration_minutes: u32,
    pub scope_block: Option<&'a str>,
}

/// Step-count guidance by learner level.
pub fn step_count(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => "3-4",
        Difficulty::Intermediate => "4-5",
        Difficulty::Advanced => "5-6",
    }
}

/// Fill `{{difficulty}}`, `{{duration}}` and `{{step_count}}`.
pub fn render(template: &str, difficulty: Difficulty, duration_minutes: u32) -> String {
    template
        .replace("{{difficulty}}", difficulty.as_str())
        .replace("{{duration}}", &duration_minutes.to_string())
        .replace("{{step_count}}", step_count(difficulty))
}

pub fn render_for(template_type: TemplateType, difficulty: Difficulty, duration_minutes: u32) -> String {
    render(assets::prompt_for(template_type), difficulty, duration_minutes)
}

fn user_message(inputs: &PromptInputs<'_>) -> String {
    let mut out = format!("Learning goal: {}\n", inputs.goal.trim());
    if let Some(context) = inputs.context.map(str::trim).filter(|c| !c.is_empty()) {
        out.push_str(&format!("Context: {}\n", context));
    }
    out.push_str(&format!("Learner level: {}\n", inputs.level));
    if let Some(scope) = inputs.scope_block.map(str::trim).filter(|s| !s.is_empty()) {
        out.push('\n');
        out.push_str(scope);
        out.push('\n');
    }
    out
}

pub fn selector_messages(inputs: &PromptInputs<'_>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(assets::selector_prompt()),
        ChatMessage::user(user_message(inputs)),
    ]
}

pub fn content_messages(template_type: TemplateType, inputs: &PromptInputs<'_>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(render_for(template_type, inputs.level, inputs.duration_minutes)),
        ChatMessage::user(user_message(inputs)),
    ]
}

/// cl100k token count, or a four-characters-per-token estimate when the
/// encoder is unavailable.
pub fn estimate_tokens(text: &str) -> usize {
    match BPE.as_ref() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.chars().count().div_ceil(4),
    }
}
