use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taste_graph_sdk::Domain;

/// Discomfort rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    pub const MAX: Difficulty = Difficulty(5);

    /// Any integer, clamped into `[1, 5]`.
    #[must_use]
    pub fn saturating(value: i64) -> Self {
        // Clamped to 1..=5 first, so the cast is lossless.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(value.clamp(1, 5) as u8)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self::saturating(value))
        } else {
            Err(format!("difficulty must be within 1..=5, got {value}"))
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

/// Where a card's entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSource {
    /// Live taste graph lookup.
    Graph,
    /// Editorial list used when the graph gave nothing for a domain.
    Curated,
    /// Generic placeholder for a domain whose processing failed outright.
    Fallback,
    /// Padding added to reach the minimum batch size.
    Bonus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMetadata {
    pub source: CardSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Graph id of the suggested entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// The explanation was written by the language model.
    #[serde(default)]
    pub generated_explanation: bool,
}

impl CardMetadata {
    #[must_use]
    pub fn new(source: CardSource) -> Self {
        Self {
            source,
            genre: None,
            entity_id: None,
            generated_explanation: false,
        }
    }

    /// Anything not taken from a live graph lookup.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source != CardSource::Graph
    }
}

/// One suggestion shown during a browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscomfortCard {
    /// Unique within its batch.
    pub id: String,
    pub domain: Domain,
    pub title: String,
    pub description: String,
    pub cultural_context: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub growth_benefit: String,
    pub metadata: CardMetadata,
    pub created_at: DateTime<Utc>,
}

/// Response of a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBatch {
    pub cards: Vec<DiscomfortCard>,
    pub total: usize,
}

impl CardBatch {
    #[must_use]
    pub fn new(cards: Vec<DiscomfortCard>) -> Self {
        let total = cards.len();
        Self { cards, total }
    }
}

/// Persisted record of an accepted card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub domain: Domain,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub cultural_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Challenge {
    /// New, not yet completed challenge carrying the card's content.
    #[must_use]
    pub fn from_card(card: &DiscomfortCard, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: card.title.clone(),
            description: card.description.clone(),
            domain: card.domain,
            difficulty: card.difficulty,
            cultural_context: card.cultural_context.clone(),
            entity_id: card.metadata.entity_id.clone(),
            image_url: card.image_url.clone(),
            explanation: card.explanation.clone(),
            is_completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }

    pub fn reactivate(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl ChallengeStats {
    #[must_use]
    pub fn of(challenges: &[Challenge]) -> Self {
        let completed = challenges.iter().filter(|c| c.is_completed).count();
        Self {
            total: challenges.len(),
            active: challenges.len() - completed,
            completed,
        }
    }
}

/// Personalised summary produced after onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingReport {
    pub cultural_profile: String,
    pub growth_areas: Vec<String>,
    pub recommended_challenges: Vec<String>,
    pub motivation_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthReflection {
    pub reflection: String,
    pub growth_insights: Vec<String>,
    pub next_challenges: Vec<String>,
}

/// Simulated user with the opposite taste profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nemesis {
    pub id: String,
    pub name: String,
    pub opposite_preferences: Vec<NemesisPreference>,
    pub compatibility_score: f64,
    pub challenge_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NemesisPreference {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
}
