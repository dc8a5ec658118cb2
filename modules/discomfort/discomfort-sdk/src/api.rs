use async_trait::async_trait;

use crate::models::{CardBatch, GrowthReflection, Nemesis, OnboardingReport};
use crate::preferences::{PreferenceInput, UserPreferenceSet};
use taste_graph_sdk::Domain;
use text_gen_sdk::ChallengeTask;

/// Public contract of the card pipeline.
///
/// None of these calls fail: upstream trouble is absorbed into curated or
/// templated content.
#[async_trait]
pub trait DiscomfortApi: Send + Sync {
    /// A shuffled batch of at least the configured minimum of cards.
    /// An empty `domains` slice means the default four.
    async fn generate_cards(&self, preferences: &UserPreferenceSet, domains: &[Domain]) -> CardBatch;

    async fn onboarding_report(
        &self,
        user_name: &str,
        preferences: &UserPreferenceSet,
    ) -> OnboardingReport;

    async fn growth_reflection(
        &self,
        user_name: &str,
        completed_challenges: &serde_json::Value,
    ) -> GrowthReflection;

    async fn challenge_task(&self, domain: Domain, difficulty: u8) -> ChallengeTask;

    fn find_nemesis(&self, user_id: &str, preferences: &[PreferenceInput]) -> Nemesis;
}
