#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use discomfort::{DiscomfortConfig, DiscomfortService, ProxyFeedConfig};
use discomfort_sdk::{CardSource, Domain, PreferenceInput, UserPreferenceSet};
use proptest::prelude::*;
use serde_json::Value;
use taste_graph_sdk::{InsightsQuery, TasteEntity, TasteGraphApi, TasteGraphError};
use text_gen::TextGenService;
use text_gen_sdk::{TextGenApi, TextGenError};

#[derive(Clone, Copy)]
enum Graph {
    /// Every call fails with a 503.
    Down,
    /// Search finds the seed; antitheses return `n` entities.
    Related(usize),
    /// Every call hangs past any sensible timeout.
    Hanging,
}

struct FakeGraph {
    behaviour: Graph,
    /// Seeds whose search fails even when the graph is otherwise up.
    broken_seeds: Vec<&'static str>,
    calls: AtomicUsize,
}

impl FakeGraph {
    fn new(behaviour: Graph) -> Arc<Self> {
        Self::with_broken_seeds(behaviour, Vec::new())
    }

    fn with_broken_seeds(behaviour: Graph, broken_seeds: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            broken_seeds,
            calls: AtomicUsize::new(0),
        })
    }
}

fn entity(id: String, domain: Domain) -> TasteEntity {
    TasteEntity {
        name: format!("Entity {id}"),
        id,
        entity_type: domain.entity_urn().to_owned(),
        image_url: None,
        genres: vec!["Obscure".to_owned()],
        popularity: None,
        properties: Value::Null,
    }
}

#[async_trait]
impl TasteGraphApi for FakeGraph {
    fn is_configured(&self) -> bool {
        true
    }

    async fn search(&self, _query: &str, _types: &str) -> Result<Vec<TasteEntity>, TasteGraphError> {
        unreachable!("the pipeline only uses search_entity")
    }

    async fn search_entity(
        &self,
        query: &str,
        domain: Domain,
    ) -> Result<Option<TasteEntity>, TasteGraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_seeds.iter().any(|s| *s == query) {
            return Err(TasteGraphError::transport("connection reset"));
        }
        match self.behaviour {
            Graph::Down => Err(TasteGraphError::upstream(503, None)),
            Graph::Hanging => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(None)
            }
            Graph::Related(_) => Ok(Some(entity(format!("seed-{query}"), domain))),
        }
    }

    async fn insights(&self, _query: &InsightsQuery) -> Result<Vec<TasteEntity>, TasteGraphError> {
        unreachable!("the pipeline does not use raw insights")
    }

    async fn get_recommendations(
        &self,
        _entity_id: &str,
        _domain: Domain,
    ) -> Result<Vec<TasteEntity>, TasteGraphError> {
        unreachable!("the pipeline uses approximate_antitheses")
    }

    async fn approximate_antitheses(
        &self,
        entity_id: &str,
        domain: Domain,
    ) -> Result<Vec<TasteEntity>, TasteGraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Graph::Related(n) => Ok((0..n)
                .map(|i| entity(format!("{entity_id}-anti-{i}"), domain))
                .collect()),
            Graph::Down | Graph::Hanging => Err(TasteGraphError::upstream(503, None)),
        }
    }

    async fn affinity_cluster(&self, _entities: &str) -> Result<Value, TasteGraphError> {
        Err(TasteGraphError::NotConfigured)
    }

    async fn cross_domain_affinity(
        &self,
        _source_entities: &str,
        _target_type: &str,
    ) -> Result<Value, TasteGraphError> {
        Err(TasteGraphError::NotConfigured)
    }
}

struct FakeModel {
    reply: Result<&'static str, TextGenError>,
    calls: AtomicUsize,
}

impl FakeModel {
    fn new(reply: Result<&'static str, TextGenError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextGenApi for FakeModel {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate_content(&self, _prompt: &str) -> Result<String, TextGenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map(str::to_owned)
    }
}

/// Model that never answers in time.
struct HangingModel;

#[async_trait]
impl TextGenApi for HangingModel {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate_content(&self, _prompt: &str) -> Result<String, TextGenError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".to_owned())
    }
}

fn service(graph: Arc<FakeGraph>, model: Arc<FakeModel>, config: DiscomfortConfig) -> DiscomfortService {
    DiscomfortService::new(graph, TextGenService::new(model), config)
}

fn preferences(pairs: &[(&str, &str)]) -> UserPreferenceSet {
    let inputs: Vec<PreferenceInput> = pairs
        .iter()
        .map(|(name, kind)| PreferenceInput::new(*name, *kind))
        .collect();
    UserPreferenceSet::from_inputs(&inputs).0
}

fn per_domain(cards: &[discomfort_sdk::DiscomfortCard]) -> HashMap<Domain, usize> {
    let mut counts = HashMap::new();
    for card in cards {
        *counts.entry(card.domain).or_default() += 1;
    }
    counts
}

#[tokio::test]
async fn total_upstream_failure_still_yields_a_full_fallback_batch() {
    let model = FakeModel::new(Err(TextGenError::Upstream { status: 500 }));
    let svc = service(
        FakeGraph::new(Graph::Down),
        model.clone(),
        DiscomfortConfig::default(),
    );

    let batch = svc
        .generate_cards(&UserPreferenceSet::new(), &[Domain::Movie, Domain::Music])
        .await;

    assert!(batch.total >= 10);
    assert_eq!(batch.total, batch.cards.len());
    for card in &batch.cards {
        assert!(card.metadata.is_fallback(), "{} is not fallback-sourced", card.id);
        assert!(!card.metadata.generated_explanation);
        assert!(matches!(card.domain, Domain::Movie | Domain::Music));
        assert!((1..=5).contains(&card.difficulty.get()));
    }
    let ids: HashSet<_> = batch.cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), batch.cards.len());
    // Explanations are attempted, fail, and keep the template.
    assert!(model.calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn failing_seed_does_not_disturb_its_sibling() {
    let graph = FakeGraph::with_broken_seeds(Graph::Related(3), vec!["Drake"]);
    let svc = service(
        graph,
        FakeModel::new(Err(TextGenError::NotConfigured)),
        DiscomfortConfig::default(),
    );
    let prefs = preferences(&[("Drake", "music"), ("Adele", "music")]);

    let batch = svc.generate_cards(&prefs, &[Domain::Music]).await;

    let graph_cards: Vec<_> = batch
        .cards
        .iter()
        .filter(|c| c.metadata.source == CardSource::Graph)
        .collect();
    assert_eq!(graph_cards.len(), 3);
    assert!(graph_cards.iter().all(|c| c.id.starts_with("graph-music-seed-Adele")));
    assert!(
        graph_cards
            .iter()
            .all(|c| c.explanation.as_deref().unwrap().starts_with("Since you enjoy Drake,"))
    );
}

#[tokio::test]
async fn graph_candidates_are_capped_per_domain() {
    let svc = service(
        FakeGraph::new(Graph::Related(5)),
        FakeModel::new(Err(TextGenError::NotConfigured)),
        DiscomfortConfig::default(),
    );
    let prefs = preferences(&[("Marvel", "movies"), ("Pixar", "film"), ("Dune", "book")]);

    let batch = svc.generate_cards(&prefs, &[Domain::Movie, Domain::Book]).await;

    let counts: HashMap<Domain, usize> = batch
        .cards
        .iter()
        .filter(|c| c.metadata.source == CardSource::Graph)
        .fold(HashMap::new(), |mut acc, c| {
            *acc.entry(c.domain).or_default() += 1;
            acc
        });
    assert_eq!(counts[&Domain::Movie], 4);
    assert_eq!(counts[&Domain::Book], 4);
}

#[tokio::test]
async fn single_graph_candidate_is_topped_up_to_two() {
    let svc = service(
        FakeGraph::new(Graph::Related(1)),
        FakeModel::new(Err(TextGenError::NotConfigured)),
        DiscomfortConfig {
            min_cards: 0,
            ..DiscomfortConfig::default()
        },
    );
    let prefs = preferences(&[("Sushi", "restaurants")]);

    let batch = svc.generate_cards(&prefs, &[Domain::Food]).await;

    assert_eq!(batch.total, 2);
    let sources: HashSet<_> = batch.cards.iter().map(|c| c.metadata.source).collect();
    assert_eq!(sources, HashSet::from([CardSource::Graph, CardSource::Curated]));
}

#[tokio::test]
async fn hanging_graph_is_cut_off_by_the_timeout() {
    let svc = service(
        FakeGraph::new(Graph::Hanging),
        FakeModel::new(Err(TextGenError::NotConfigured)),
        DiscomfortConfig {
            upstream_timeout: Duration::from_millis(50),
            ..DiscomfortConfig::default()
        },
    );
    let prefs = preferences(&[("Jazz", "music")]);

    let batch = tokio::time::timeout(
        Duration::from_secs(5),
        svc.generate_cards(&prefs, &[Domain::Music]),
    )
    .await
    .expect("pipeline must not wait on a hanging graph");

    assert!(batch.total >= 10);
    assert!(batch.cards.iter().all(|c| c.metadata.is_fallback()));
}

#[tokio::test(start_paused = true)]
async fn hanging_upstreams_finish_before_the_card_feed_gives_up() {
    let config = DiscomfortConfig::default();
    let svc = DiscomfortService::new(
        FakeGraph::new(Graph::Hanging),
        TextGenService::new(Arc::new(HangingModel)),
        config.clone(),
    );
    let prefs = preferences(&[("Jazz", "music"), ("Dune", "book")]);

    let started = tokio::time::Instant::now();
    let batch = svc.generate_cards(&prefs, &[]).await;
    let took = started.elapsed();

    assert!(took <= config.batch_timeout, "batch took {took:?}");
    assert!(took < ProxyFeedConfig::default().timeout, "batch took {took:?}");
    assert!(batch.total >= 10);
    assert!(batch.cards.iter().all(|c| !c.metadata.generated_explanation));
}

#[tokio::test]
async fn explanation_budget_limits_generated_text() {
    let model = FakeModel::new(Ok("  You will grow from this.  "));
    let svc = service(
        FakeGraph::new(Graph::Down),
        model.clone(),
        DiscomfortConfig::default(),
    );

    let batch = svc.generate_cards(&UserPreferenceSet::new(), &[]).await;

    let generated: Vec<_> = batch
        .cards
        .iter()
        .filter(|c| c.metadata.generated_explanation)
        .collect();
    assert_eq!(generated.len(), 3);
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    assert!(
        generated
            .iter()
            .all(|c| c.explanation.as_deref() == Some("You will grow from this."))
    );
    // Default four domains, four curated cards each.
    let counts = per_domain(&batch.cards);
    assert_eq!(counts.len(), 4);
    assert!(counts.values().all(|&n| n >= 4));
}

#[tokio::test]
async fn domain_without_any_candidate_gets_placeholders() {
    let svc = service(
        FakeGraph::new(Graph::Down),
        FakeModel::new(Err(TextGenError::NotConfigured)),
        DiscomfortConfig {
            curated_per_domain: 0,
            min_cards: 0,
            ..DiscomfortConfig::default()
        },
    );

    let batch = svc
        .generate_cards(&UserPreferenceSet::new(), &[Domain::Fashion])
        .await;

    let mut titles: Vec<_> = batch.cards.iter().map(|c| c.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, ["Fashion Challenge 1", "Fashion Challenge 2"]);
    assert!(batch.cards.iter().all(|c| c.difficulty.get() == 3));
}

#[tokio::test]
async fn unconfigured_graph_is_never_called() {
    struct Unconfigured(Arc<FakeGraph>);

    #[async_trait]
    impl TasteGraphApi for Unconfigured {
        fn is_configured(&self) -> bool {
            false
        }
        async fn search(&self, q: &str, t: &str) -> Result<Vec<TasteEntity>, TasteGraphError> {
            self.0.search(q, t).await
        }
        async fn search_entity(
            &self,
            q: &str,
            d: Domain,
        ) -> Result<Option<TasteEntity>, TasteGraphError> {
            self.0.search_entity(q, d).await
        }
        async fn insights(&self, q: &InsightsQuery) -> Result<Vec<TasteEntity>, TasteGraphError> {
            self.0.insights(q).await
        }
        async fn get_recommendations(
            &self,
            id: &str,
            d: Domain,
        ) -> Result<Vec<TasteEntity>, TasteGraphError> {
            self.0.get_recommendations(id, d).await
        }
        async fn approximate_antitheses(
            &self,
            id: &str,
            d: Domain,
        ) -> Result<Vec<TasteEntity>, TasteGraphError> {
            self.0.approximate_antitheses(id, d).await
        }
        async fn affinity_cluster(&self, e: &str) -> Result<Value, TasteGraphError> {
            self.0.affinity_cluster(e).await
        }
        async fn cross_domain_affinity(&self, s: &str, t: &str) -> Result<Value, TasteGraphError> {
            self.0.cross_domain_affinity(s, t).await
        }
    }

    let inner = FakeGraph::new(Graph::Related(3));
    let svc = DiscomfortService::new(
        Arc::new(Unconfigured(inner.clone())),
        TextGenService::new(FakeModel::new(Err(TextGenError::NotConfigured))),
        DiscomfortConfig::default(),
    );

    let batch = svc
        .generate_cards(&preferences(&[("Jazz", "music")]), &[Domain::Music])
        .await;

    assert!(batch.total >= 10);
    assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn onboarding_report_merges_generated_fields() {
    let model = FakeModel::new(Ok(
        "```json\n{\"cultural_profile\": \"An adventurous listener.\", \"growth_areas\": [\"Gamelan\"]}\n```",
    ));
    let svc = service(FakeGraph::new(Graph::Down), model, DiscomfortConfig::default());
    let prefs = preferences(&[("Jazz", "music")]);

    let report = svc.onboarding_report("Sam", &prefs).await;

    assert_eq!(report.cultural_profile, "An adventurous listener.");
    assert_eq!(report.growth_areas, vec!["Gamelan".to_owned()]);
    assert_eq!(report.recommended_challenges.len(), 5);
    assert!(report.motivation_message.starts_with("Sam,"));
}

#[tokio::test]
async fn onboarding_report_without_preferences_is_generic() {
    let svc = service(
        FakeGraph::new(Graph::Down),
        FakeModel::new(Ok("{}")),
        DiscomfortConfig::default(),
    );

    let report = svc.onboarding_report("Sam", &UserPreferenceSet::new()).await;

    assert_eq!(report.growth_areas.len(), 3);
    assert!(!report.cultural_profile.is_empty());
}

#[tokio::test]
async fn growth_reflection_falls_back_on_garbage() {
    let svc = service(
        FakeGraph::new(Graph::Down),
        FakeModel::new(Ok("what a journey!")),
        DiscomfortConfig::default(),
    );

    let reflection = svc
        .growth_reflection("Sam", &serde_json::json!([{"title": "Free Jazz"}]))
        .await;

    assert!(reflection.reflection.starts_with("You've shown remarkable courage"));
    assert_eq!(reflection.next_challenges.len(), 2);
}

#[tokio::test]
async fn challenge_task_falls_back_on_garbage() {
    let svc = service(
        FakeGraph::new(Graph::Down),
        FakeModel::new(Ok("not json at all")),
        DiscomfortConfig::default(),
    );

    let task = svc.challenge_task(Domain::Food, 4).await;

    assert_eq!(task.title, "Food Cultural Discovery");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The difficulty heuristic is not calibrated; only its range is checked.
    #[test]
    fn difficulty_always_within_one_to_five(
        related in 0usize..12,
        seeds in 0usize..4,
        min_cards in 0usize..20,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let svc = service(
            FakeGraph::new(Graph::Related(related)),
            FakeModel::new(Err(TextGenError::NotConfigured)),
            DiscomfortConfig { min_cards, ..DiscomfortConfig::default() },
        );
        let names = ["Jazz", "Blues", "Funk", "Soul"];
        let pairs: Vec<(&str, &str)> = names[..seeds].iter().map(|n| (*n, "music")).collect();
        let prefs = preferences(&pairs);

        let batch = runtime.block_on(svc.generate_cards(&prefs, &[Domain::Music, Domain::Book]));

        prop_assert!(batch.total >= min_cards);
        let counts = per_domain(&batch.cards);
        prop_assert!(counts[&Domain::Music] >= 2);
        prop_assert!(counts[&Domain::Book] >= 2);
        for card in &batch.cards {
            prop_assert!((1..=5).contains(&card.difficulty.get()));
        }
    }
}
