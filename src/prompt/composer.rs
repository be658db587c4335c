use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use strum::{Display, EnumString};

const CINEMATIC_DIRECTIVE: &str = "\
Write with cinematic clarity: open on a concrete image, keep scenes grounded in \
sensory detail, let dialogue carry subtext, and end on a beat that resonates. \
Never mention that you are an AI and never add commentary outside the story.";

const FEEDBACK_DIRECTIVE: &str = "\
You are an experienced fiction editor. Give specific, actionable feedback that \
respects the author's voice. Quote the passages you refer to and keep the \
response focused on the author's request.";

/// Coarse length category chosen by the author.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl StoryLength {
    /// Human-readable range embedded in the user prompt.
    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "roughly 400-800 tokens",
            Self::Medium => "roughly 800-1500 tokens",
            Self::Long => "roughly 1500-3000 tokens",
        }
    }

    /// Upper bound of the range, used as the output-token budget.
    pub fn token_budget(self) -> u32 {
        match self {
            Self::Short => 800,
            Self::Medium => 1500,
            Self::Long => 3000,
        }
    }
}

/// Author-facing story settings. Every field is optional; blanks fall back to
/// neutral defaults when prompts are composed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub perspective: Option<String>,
    #[serde(default)]
    pub length: StoryLength,
    #[serde(default)]
    pub target_tokens: Option<u32>,
}

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(fallback)
}

impl StoryMetadata {
    pub fn title(&self) -> &str {
        or_default(self.title.as_deref(), "Untitled")
    }

    pub fn genre(&self) -> &str {
        or_default(self.genre.as_deref(), "general fiction")
    }

    pub fn tone(&self) -> &str {
        or_default(self.tone.as_deref(), "balanced")
    }

    pub fn perspective(&self) -> &str {
        or_default(self.perspective.as_deref(), "third person")
    }

    /// Explicit target if set (and non-zero), otherwise the length category budget.
    pub fn token_budget(&self) -> u32 {
        self.target_tokens
            .filter(|tokens| *tokens > 0)
            .unwrap_or_else(|| self.length.token_budget())
    }

    fn length_label(&self) -> String {
        match self.target_tokens.filter(|tokens| *tokens > 0) {
            Some(tokens) => format!("about {tokens} tokens"),
            None => self.length.label().to_string(),
        }
    }
}

/// System prompt shared by every backend for story generation.
pub fn system_prompt(metadata: &StoryMetadata) -> String {
    format!(
        "You are a creative writing partner crafting {genre} stories.\n\
         Tone: {tone}. Keep the tone consistent from the first line to the last.\n\
         Perspective: write in {perspective}.\n\n\
         {CINEMATIC_DIRECTIVE}",
        genre = metadata.genre(),
        tone = metadata.tone(),
        perspective = metadata.perspective(),
    )
}

pub fn user_prompt(metadata: &StoryMetadata, author_prompt: &str) -> String {
    format!(
        "Title: {title}\n\
         Target length: {length}\n\n\
         Author's prompt:\n{author_prompt}",
        title = metadata.title(),
        length = metadata.length_label(),
    )
}

pub fn feedback_system_prompt() -> &'static str {
    FEEDBACK_DIRECTIVE
}

pub fn feedback_prompt(metadata: &StoryMetadata, draft: &str, instruction: &str) -> String {
    let mut prompt = String::with_capacity(draft.len() + instruction.len() + 256);
    let _ = writeln!(prompt, "Title: {}", metadata.title());
    let _ = writeln!(prompt, "Genre: {}", metadata.genre());
    let _ = writeln!(prompt, "Tone: {}", metadata.tone());
    let _ = write!(prompt, "\nDraft:\n{draft}\n\n");
    let instruction = instruction.trim();
    if instruction.is_empty() {
        prompt.push_str("Request: Give general feedback on pacing, voice and clarity.");
    } else {
        let _ = write!(prompt, "Request: {instruction}");
    }
    prompt
}
