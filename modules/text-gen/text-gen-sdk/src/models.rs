use serde::{Deserialize, Serialize};

/// Shown in place of generated text when generation fails.
pub const FALLBACK_TEXT: &str = "Unable to generate explanation at the moment.";

/// A concrete cultural exploration task for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeTask {
    pub title: String,
    pub description: String,
    pub cultural_context: String,
}

impl ChallengeTask {
    /// Generic task used when the model's answer cannot be used.
    #[must_use]
    pub fn fallback(domain: &str) -> Self {
        let domain = domain.trim();
        Self {
            title: format!("{} Cultural Discovery", capitalize(domain)),
            description: format!(
                "Explore a new aspect of {domain} that challenges your current preferences and expands your cultural understanding."
            ),
            cultural_context: format!(
                "Engaging with unfamiliar {domain} helps develop cultural empathy and broadens your aesthetic appreciation."
            ),
        }
    }

    /// All three fields carry text.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.title, &self.description, &self.cultural_context]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}

/// Wording for the 1-5 difficulty scale used in prompts and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyLabel {
    Gentle,
    Mild,
    Medium,
    Challenging,
    Intense,
}

impl DifficultyLabel {
    /// Out-of-range levels read as `Medium`.
    #[must_use]
    pub fn for_level(level: u8) -> Self {
        match level {
            1 => Self::Gentle,
            2 => Self::Mild,
            4 => Self::Challenging,
            5 => Self::Intense,
            _ => Self::Medium,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gentle => "Gentle",
            Self::Mild => "Mild",
            Self::Medium => "Medium",
            Self::Challenging => "Challenging",
            Self::Intense => "Intense",
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
