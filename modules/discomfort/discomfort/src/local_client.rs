use std::sync::Arc;

use async_trait::async_trait;
use discomfort_sdk::{
    CardBatch, CardFeed, ChallengeTask, DiscomfortApi, DiscomfortCard, DiscomfortError, Domain,
    GrowthReflection, Nemesis, OnboardingReport, PreferenceInput, UserPreferenceSet,
};

use crate::domain::service::DiscomfortService;

/// In-process [`DiscomfortApi`], also usable as a [`CardFeed`] when the
/// session runs next to the pipeline.
#[derive(Clone)]
pub struct LocalClient {
    service: Arc<DiscomfortService>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<DiscomfortService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl DiscomfortApi for LocalClient {
    async fn generate_cards(&self, preferences: &UserPreferenceSet, domains: &[Domain]) -> CardBatch {
        self.service.generate_cards(preferences, domains).await
    }

    async fn onboarding_report(
        &self,
        user_name: &str,
        preferences: &UserPreferenceSet,
    ) -> OnboardingReport {
        self.service.onboarding_report(user_name, preferences).await
    }

    async fn growth_reflection(
        &self,
        user_name: &str,
        completed_challenges: &serde_json::Value,
    ) -> GrowthReflection {
        self.service
            .growth_reflection(user_name, completed_challenges)
            .await
    }

    async fn challenge_task(&self, domain: Domain, difficulty: u8) -> ChallengeTask {
        self.service.challenge_task(domain, difficulty).await
    }

    fn find_nemesis(&self, user_id: &str, preferences: &[PreferenceInput]) -> Nemesis {
        self.service.find_nemesis(user_id, preferences)
    }
}

#[async_trait]
impl CardFeed for LocalClient {
    async fn fetch_cards(
        &self,
        preferences: &[PreferenceInput],
        domains: &[Domain],
    ) -> Result<Vec<DiscomfortCard>, DiscomfortError> {
        let (preferences, _) = UserPreferenceSet::from_inputs(preferences);
        let batch = self.service.generate_cards(&preferences, domains).await;
        if batch.cards.is_empty() {
            return Err(DiscomfortError::EmptyFeed);
        }
        Ok(batch.cards)
    }
}
