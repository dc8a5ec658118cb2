use serde::{Deserialize, Serialize};
use serde_json::Value;
use xxhash_rust::xxh3::xxh3_64;

use crate::domain::Domain;

/// An item the taste graph knows about: a film, an artist, a dish, a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteEntity {
    /// Opaque graph identifier.
    pub id: String,
    pub name: String,
    /// Entity type as reported by the graph, e.g. `urn:entity:movie`.
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    /// Graph popularity in `[0, 1]` when the graph reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    /// Remaining graph properties, kept verbatim.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub properties: Value,
}

impl TasteEntity {
    /// Content domain of this entity, if its type maps to one.
    #[must_use]
    pub fn domain(&self) -> Option<Domain> {
        self.entity_type
            .split(',')
            .find_map(Domain::from_alias)
    }

    /// First genre tag, used in templated card text.
    #[must_use]
    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }

    /// Placeholder returned by search when the graph cannot be asked.
    ///
    /// The id depends only on the trimmed, lowercased query and the type, so
    /// repeated searches for the same thing agree on it. `upstream_failed`
    /// marks results that stand in for a failed call rather than a missing
    /// credential.
    #[must_use]
    pub fn mock(query: &str, types: &str, upstream_failed: bool) -> Self {
        let normalized = query.trim().to_lowercase();
        let digest = xxh3_64(format!("{normalized}\u{1f}{types}").as_bytes());
        let mut properties = serde_json::json!({ "mock": true });
        if upstream_failed {
            properties["error"] = Value::from("API unavailable");
        }
        Self {
            id: format!("mock-{types}-{digest:016x}"),
            name: query.trim().to_owned(),
            entity_type: format!("urn:entity:{types}"),
            image_url: None,
            genres: Vec::new(),
            popularity: None,
            properties,
        }
    }

    #[must_use]
    pub fn is_mock(&self) -> bool {
        self.properties.get("mock").and_then(Value::as_bool) == Some(true)
    }
}

/// Raw insight query forwarded to the graph: what to start from and what to
/// return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsQuery {
    pub signal: Value,
    pub filter: Value,
}

impl InsightsQuery {
    /// Related entities of one type for a single seed entity.
    #[must_use]
    pub fn related_to(entity_id: &str, domain: Domain, limit: Option<u32>) -> Self {
        let mut filter = serde_json::json!({ "type": domain.entity_urn() });
        if let Some(limit) = limit {
            filter["limit"] = Value::from(limit);
        }
        Self {
            signal: serde_json::json!({ "interests": { "entities": [entity_id] } }),
            filter,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn mock_id_is_stable_for_query_and_type() {
        let a = TasteEntity::mock("Jazz", "music", false);
        let b = TasteEntity::mock("  jazz ", "music", true);
        assert_eq!(a.id, b.id);
        assert!(a.id.starts_with("mock-music-"));
        assert_ne!(a.id, TasteEntity::mock("Jazz", "book", false).id);
    }

    #[test]
    fn mock_marks_failure() {
        let failed = TasteEntity::mock("Jazz", "music", true);
        assert!(failed.is_mock());
        assert_eq!(failed.properties["error"], "API unavailable");
        assert_eq!(failed.entity_type, "urn:entity:music");
        assert!(TasteEntity::mock("Jazz", "music", false).properties.get("error").is_none());
    }

    #[test]
    fn domain_from_entity_type() {
        let e = TasteEntity::mock("Heat", "tv_show,movie", false);
        assert_eq!(e.domain(), Some(Domain::Movie));
    }

    #[test]
    fn related_query_shape() {
        let q = InsightsQuery::related_to("E1", Domain::Book, Some(10));
        assert_eq!(q.signal["interests"]["entities"][0], "E1");
        assert_eq!(q.filter["type"], "urn:entity:book");
        assert_eq!(q.filter["limit"], 10);
    }
}
