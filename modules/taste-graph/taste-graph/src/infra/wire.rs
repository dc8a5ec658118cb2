//! Decoding of graph responses into [`TasteEntity`] values.
//!
//! The graph has shipped several response envelopes over time (`results`,
//! `results.entities`, `related`, `entities`) and entity objects vary in how
//! they spell ids, types and images. Decoding is lenient: entities without an
//! id or a name are dropped, everything else is best effort.

use serde_json::{Map, Value};
use taste_graph_sdk::TasteEntity;

/// Entity list from any known envelope. `None` if the body has none of them.
pub fn entity_list(body: &Value) -> Option<&Vec<Value>> {
    match body.get("results") {
        Some(Value::Array(items)) => return Some(items),
        Some(Value::Object(results)) => {
            if let Some(Value::Array(items)) = results.get("entities") {
                return Some(items);
            }
        }
        _ => {}
    }
    ["related", "entities"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
}

/// Decode every usable entity of a response, keeping graph order.
///
/// `fallback_type` is used for entities that carry no type of their own.
pub fn decode_entities(body: &Value, fallback_type: &str) -> Option<Vec<TasteEntity>> {
    let items = entity_list(body)?;
    Some(
        items
            .iter()
            .filter_map(|item| decode_entity(item, fallback_type))
            .collect(),
    )
}

pub fn decode_entity(item: &Value, fallback_type: &str) -> Option<TasteEntity> {
    let obj = item.as_object()?;
    let id = string_field(obj, &["entity_id", "id"])?;
    let name = string_field(obj, &["name"]).filter(|n| !n.trim().is_empty())?;

    let entity_type = string_field(obj, &["type", "subtype"])
        .or_else(|| {
            obj.get("types")
                .and_then(Value::as_array)
                .and_then(|types| types.iter().find_map(Value::as_str))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| fallback_type.to_owned());

    let properties = obj.get("properties").cloned().unwrap_or(Value::Null);
    let image_url = properties
        .pointer("/image/url")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| string_field(obj, &["image_url"]))
        .or_else(|| {
            obj.get("image")
                .and_then(|img| img.get("url").or(Some(img)))
                .and_then(Value::as_str)
                .map(str::to_owned)
        });

    Some(TasteEntity {
        id,
        name,
        entity_type,
        image_url,
        genres: genres(obj),
        popularity: obj
            .get("popularity")
            .and_then(Value::as_f64)
            .filter(|p| p.is_finite()),
        properties,
    })
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Genre tags first, then a plain `genres` list.
fn genres(obj: &Map<String, Value>) -> Vec<String> {
    let from_tags: Vec<String> = obj
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter(|tag| {
                    tag.get("type")
                        .and_then(Value::as_str)
                        .is_some_and(|t| t.contains("genre"))
                })
                .filter_map(|tag| tag.get("name").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    if !from_tags.is_empty() {
        return from_tags;
    }
    obj.get("genres")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
