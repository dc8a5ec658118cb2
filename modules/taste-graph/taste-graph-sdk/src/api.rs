use async_trait::async_trait;
use serde_json::Value;

use crate::domain::Domain;
use crate::error::TasteGraphError;
use crate::models::{InsightsQuery, TasteEntity};

/// Client for the cultural recommendation graph.
///
/// Every method reports failures as [`TasteGraphError`]; none of them
/// substitutes data on its own. Deciding what to show instead is the caller's
/// job.
#[async_trait]
pub trait TasteGraphApi: Send + Sync {
    /// Whether a credential is configured. When `false`, every call fails
    /// with [`TasteGraphError::NotConfigured`] without touching the network.
    fn is_configured(&self) -> bool;

    /// Raw search: `types` is passed to the graph unchanged.
    async fn search(&self, query: &str, types: &str) -> Result<Vec<TasteEntity>, TasteGraphError>;

    /// Best match for `query` within `domain`; `Ok(None)` when nothing matches.
    async fn search_entity(
        &self,
        query: &str,
        domain: Domain,
    ) -> Result<Option<TasteEntity>, TasteGraphError>;

    /// Forward an insight query and return the related entities it produced.
    async fn insights(&self, query: &InsightsQuery) -> Result<Vec<TasteEntity>, TasteGraphError>;

    /// Entities the graph ranks as related to `entity_id`, most similar first.
    async fn get_recommendations(
        &self,
        entity_id: &str,
        domain: Domain,
    ) -> Result<Vec<TasteEntity>, TasteGraphError>;

    /// Heuristic stand-in for "opposite taste".
    ///
    /// The graph has no antithesis relation, so this fetches an enlarged
    /// related set and keeps its lowest-ranked tail: the least similar
    /// entities that are still topically related. Nothing guarantees these
    /// are true opposites.
    async fn approximate_antitheses(
        &self,
        entity_id: &str,
        domain: Domain,
    ) -> Result<Vec<TasteEntity>, TasteGraphError>;

    /// Affinity cluster for a comma separated list of entity ids, verbatim.
    async fn affinity_cluster(&self, entities: &str) -> Result<Value, TasteGraphError>;

    /// Cross-domain affinity from source entities towards a target type, verbatim.
    async fn cross_domain_affinity(
        &self,
        source_entities: &str,
        target_type: &str,
    ) -> Result<Value, TasteGraphError>;
}
