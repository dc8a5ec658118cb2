use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use discomfort_sdk::{
    CardBatch, CardSource, ChallengeTask, DiscomfortCard, Domain, GrowthReflection, Nemesis,
    OnboardingReport, PreferenceInput, UserPreferenceSet,
};
use futures::future::join_all;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use taste_graph_sdk::{TasteEntity, TasteGraphApi, TasteGraphError};
use text_gen::TextGenService;
use tokio::time::{Instant, timeout_at};
use tracing::instrument;

use super::cards::{self, Candidate};
use super::catalog;
use super::report::{self, GeneratedReport};
use crate::config::DiscomfortConfig;

/// Every requested domain contributes at least this many cards before padding.
pub const MIN_CARDS_PER_DOMAIN: usize = 2;

pub struct DiscomfortService {
    graph: Arc<dyn TasteGraphApi>,
    text_gen: TextGenService,
    config: DiscomfortConfig,
}

impl DiscomfortService {
    #[must_use]
    pub fn new(
        graph: Arc<dyn TasteGraphApi>,
        text_gen: TextGenService,
        config: DiscomfortConfig,
    ) -> Self {
        Self {
            graph,
            text_gen,
            config,
        }
    }

    /// Build a shuffled batch of cards. Never fails: every upstream problem
    /// degrades to curated or templated content.
    #[instrument(skip_all, fields(domains = domains.len(), preferences = preferences.len()))]
    pub async fn generate_cards(
        &self,
        preferences: &UserPreferenceSet,
        domains: &[Domain],
    ) -> CardBatch {
        let deadline = Instant::now() + self.config.batch_timeout;
        let domains = requested_domains(domains);
        let graph_candidates = self
            .collect_graph_candidates(preferences, &domains, deadline)
            .await;

        let now = Utc::now();
        let mut cards = Vec::new();
        let mut curated_used = HashMap::new();
        for (&domain, candidates) in domains.iter().zip(graph_candidates) {
            let seeds = preferences.seeds(domain, self.config.max_seeds_per_domain);
            let (domain_cards, used) = self.domain_cards(domain, candidates, seeds, now);
            curated_used.insert(domain, used);
            cards.extend(domain_cards);
        }
        let mut cards = dedupe(cards);

        self.attach_explanations(&mut cards, preferences, deadline).await;

        let padding = Padding {
            domains: &domains,
            preferences,
            curated_used,
            min_cards: self.config.min_cards,
            now,
        };
        let cards = padding.pad_and_shuffle(cards, &mut rand::rng());

        tracing::info!(total = cards.len(), "card batch generated");
        CardBatch::new(cards)
    }

    /// Graph candidates per requested domain, aligned with `domains`.
    ///
    /// Seeds are looked up concurrently; each lookup fails on its own and
    /// leaves its siblings untouched.
    async fn collect_graph_candidates(
        &self,
        preferences: &UserPreferenceSet,
        domains: &[Domain],
        deadline: Instant,
    ) -> Vec<Vec<Candidate>> {
        if !self.graph.is_configured() {
            tracing::debug!("taste graph not configured; using curated content only");
            return vec![Vec::new(); domains.len()];
        }

        let lookups = domains.iter().flat_map(|&domain| {
            preferences
                .seeds(domain, self.config.max_seeds_per_domain)
                .iter()
                .map(move |seed| async move {
                    (domain, self.seed_antitheses(seed, domain, deadline).await)
                })
        });
        let results = join_all(lookups).await;

        domains
            .iter()
            .map(|&domain| {
                let mut seen = HashSet::new();
                results
                    .iter()
                    .filter(|(d, _)| *d == domain)
                    .flat_map(|(_, entities)| entities)
                    .filter(|e| seen.insert(e.id.clone()))
                    .take(self.config.graph_candidates_per_domain)
                    .enumerate()
                    .map(|(index, entity)| Candidate::from_entity(entity, index))
                    .collect()
            })
            .collect()
    }

    /// Search the seed, then take the approximate antitheses of the match.
    /// Any failure, timeout included, yields an empty list.
    async fn seed_antitheses(
        &self,
        seed: &str,
        domain: Domain,
        deadline: Instant,
    ) -> Vec<TasteEntity> {
        let lookup = async {
            let Some(entity) = self.graph.search_entity(seed, domain).await? else {
                tracing::debug!(seed, %domain, "seed not found in taste graph");
                return Ok(Vec::new());
            };
            let mut related = self.graph.approximate_antitheses(&entity.id, domain).await?;
            related.retain(|r| r.id != entity.id && !r.name.trim().is_empty());
            Ok::<_, TasteGraphError>(related)
        };

        match timeout_at(self.call_deadline(deadline), lookup).await {
            Ok(Ok(entities)) => entities,
            Ok(Err(e)) => {
                tracing::warn!(seed, %domain, kind = %e.kind(), error = %e, "seed lookup failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(seed, %domain, "seed lookup timed out");
                Vec::new()
            }
        }
    }

    /// Per-call deadline, never past the batch deadline.
    fn call_deadline(&self, batch_deadline: Instant) -> Instant {
        batch_deadline.min(Instant::now() + self.config.upstream_timeout)
    }

    /// Cards for one domain and how many curated entries they consumed.
    fn domain_cards(
        &self,
        domain: Domain,
        mut candidates: Vec<Candidate>,
        seeds: &[String],
        now: DateTime<Utc>,
    ) -> (Vec<DiscomfortCard>, usize) {
        let curated = catalog::curated(domain);
        let mut used = 0;
        if candidates.is_empty() {
            used = self.config.curated_per_domain.min(curated.len());
        } else {
            while candidates.len() + used < MIN_CARDS_PER_DOMAIN && used < curated.len() {
                used += 1;
            }
        }
        candidates.extend(
            curated[..used]
                .iter()
                .map(|e| Candidate::from_curated(e, CardSource::Curated)),
        );

        if candidates.is_empty() {
            tracing::warn!(%domain, "no candidates for domain; using placeholder cards");
            let cards = (1..=MIN_CARDS_PER_DOMAIN)
                .map(|n| cards::fallback_card(domain, n, now))
                .collect();
            return (cards, used);
        }

        let cards = candidates
            .into_iter()
            .map(|c| cards::build_card(domain, c, seeds, now))
            .collect();
        (cards, used)
    }

    /// Replace the templated explanation of the first cards with generated
    /// text, within the configured budget. Failures keep the template.
    async fn attach_explanations(
        &self,
        cards: &mut [DiscomfortCard],
        preferences: &UserPreferenceSet,
        deadline: Instant,
    ) {
        if !self.text_gen.is_configured() {
            return;
        }
        if Instant::now() >= deadline {
            tracing::debug!("batch deadline reached; keeping templated explanations");
            return;
        }
        let call_deadline = self.call_deadline(deadline);
        let budget = self.config.explanation_budget.min(cards.len());
        let jobs: Vec<(Vec<String>, String, Domain)> = cards[..budget]
            .iter()
            .map(|card| {
                let likes = preferences
                    .seeds(card.domain, self.config.max_seeds_per_domain)
                    .to_vec();
                (likes, card.title.clone(), card.domain)
            })
            .collect();

        let replies = join_all(jobs.into_iter().map(|(likes, title, domain)| async move {
            timeout_at(
                call_deadline,
                self.text_gen
                    .try_explain_discomfort(&likes, &title, domain.as_str()),
            )
            .await
        }))
        .await;

        for (card, reply) in cards.iter_mut().zip(replies) {
            match reply {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    card.explanation = Some(text.trim().to_owned());
                    card.metadata.generated_explanation = true;
                }
                Ok(Ok(_)) => tracing::debug!(card = %card.id, "empty explanation; keeping template"),
                Ok(Err(e)) => {
                    tracing::debug!(card = %card.id, kind = %e.kind(), "explanation failed; keeping template");
                }
                Err(_) => tracing::debug!(card = %card.id, "explanation timed out; keeping template"),
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn onboarding_report(
        &self,
        user_name: &str,
        preferences: &UserPreferenceSet,
    ) -> OnboardingReport {
        if preferences.is_empty() {
            return report::generic_report();
        }
        let base = report::default_report(user_name, preferences);
        if !self.text_gen.is_configured() {
            return base;
        }
        match self
            .text_gen
            .structured::<GeneratedReport>(&report::onboarding_prompt(user_name, preferences))
            .await
        {
            Ok(generated) => generated.merge_into(base),
            Err(e) => {
                tracing::debug!(kind = %e.kind(), "onboarding report not generated; using template");
                base
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn growth_reflection(
        &self,
        user_name: &str,
        completed_challenges: &serde_json::Value,
    ) -> GrowthReflection {
        let reflection: GrowthReflection = self
            .text_gen
            .structured_or(
                &report::growth_prompt(user_name, completed_challenges),
                report::fallback_reflection,
            )
            .await;
        if reflection.reflection.trim().is_empty() {
            report::fallback_reflection()
        } else {
            reflection
        }
    }

    pub async fn challenge_task(&self, domain: Domain, difficulty: u8) -> ChallengeTask {
        self.text_gen.challenge_task(domain.as_str(), difficulty).await
    }

    #[must_use]
    pub fn find_nemesis(&self, user_id: &str, preferences: &[PreferenceInput]) -> Nemesis {
        tracing::debug!(user_id, preferences = preferences.len(), "simulating cultural nemesis");
        report::nemesis(preferences, Utc::now(), &mut rand::rng())
    }
}

/// Requested domains without repeats; the default four when none are given.
#[must_use]
pub fn requested_domains(domains: &[Domain]) -> Vec<Domain> {
    if domains.is_empty() {
        return Domain::DEFAULT_CARD_DOMAINS.to_vec();
    }
    let mut out = Vec::with_capacity(domains.len());
    for &d in domains {
        if !out.contains(&d) {
            out.push(d);
        }
    }
    out
}

/// Keep the first card of every id.
fn dedupe(cards: Vec<DiscomfortCard>) -> Vec<DiscomfortCard> {
    let mut seen = HashSet::new();
    cards
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}

/// Final step of a batch: top up to the minimum size, then shuffle.
struct Padding<'a> {
    domains: &'a [Domain],
    preferences: &'a UserPreferenceSet,
    /// Curated entries per domain already in the batch; padding starts after them.
    curated_used: HashMap<Domain, usize>,
    min_cards: usize,
    now: DateTime<Utc>,
}

impl Padding<'_> {
    fn pad_and_shuffle<R: Rng + ?Sized>(
        mut self,
        mut cards: Vec<DiscomfortCard>,
        rng: &mut R,
    ) -> Vec<DiscomfortCard> {
        let mut n = 0;
        while cards.len() < self.min_cards {
            let Some(&domain) = self.domains.choose(rng) else {
                break;
            };
            let next = self.curated_used.entry(domain).or_insert(0);
            let entry = catalog::curated(domain).get(*next);
            if entry.is_some() {
                *next += 1;
            }
            n += 1;
            let seeds = self.preferences.get(domain);
            cards.push(cards::bonus_card(domain, entry, seeds, n, self.now));
        }
        cards.shuffle(rng);
        cards
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_domain_list_means_default_four() {
        assert_eq!(requested_domains(&[]), Domain::DEFAULT_CARD_DOMAINS.to_vec());
        assert_eq!(
            requested_domains(&[Domain::Food, Domain::Food, Domain::Music]),
            vec![Domain::Food, Domain::Music]
        );
    }

    #[test]
    fn padding_reaches_minimum_with_unique_ids() {
        let prefs = UserPreferenceSet::new();
        let domains = [Domain::Fashion];
        let padding = Padding {
            domains: &domains,
            preferences: &prefs,
            curated_used: HashMap::from([(Domain::Fashion, 4)]),
            min_cards: 10,
            now: Utc::now(),
        };
        let mut rng = StdRng::seed_from_u64(42);
        let cards = padding.pad_and_shuffle(Vec::new(), &mut rng);

        assert_eq!(cards.len(), 10);
        let ids: HashSet<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
        // Two unused curated entries, then generic bonus cards.
        let named = cards.iter().filter(|c| !c.title.starts_with("Bonus ")).count();
        assert_eq!(named, 2);
        assert!(cards.iter().all(|c| c.metadata.source == CardSource::Bonus));
    }

    #[test]
    fn dedupe_keeps_first() {
        let now = Utc::now();
        let a = cards::fallback_card(Domain::Book, 1, now);
        let mut b = a.clone();
        b.title = "other".to_owned();
        let out = dedupe(vec![a.clone(), b]);
        assert_eq!(out, vec![a]);
    }
}
