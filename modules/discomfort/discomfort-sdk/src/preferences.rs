//! User preferences and the adapter from the shapes clients send.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use taste_graph_sdk::Domain;

/// One preference as posted by clients: `{ "name": "Jazz", "type": "music" }`.
///
/// `type` may use any spelling [`Domain::from_alias`] understands; `domain`
/// is accepted as a synonym for the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceInput {
    pub name: String,
    #[serde(rename = "type", alias = "domain")]
    pub kind: String,
}

impl PreferenceInput {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Ordered preferences per domain; the first entry of a domain is the most
/// salient one.
///
/// Built only through the adapters below, so every key is a canonical
/// [`Domain`] and every value is trimmed, non-empty and unique within its
/// domain (case-insensitively).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserPreferenceSet {
    by_domain: BTreeMap<Domain, Vec<String>>,
}

impl UserPreferenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a preference. Blank and duplicate values are ignored.
    pub fn push(&mut self, domain: Domain, preference: &str) {
        let preference = preference.trim();
        if preference.is_empty() {
            return;
        }
        let list = self.by_domain.entry(domain).or_default();
        if !list.iter().any(|p| p.eq_ignore_ascii_case(preference)) {
            list.push(preference.to_owned());
        }
    }

    /// Adapt a list of `{name, type}` pairs.
    ///
    /// Returns the set and the type spellings that matched no domain; the
    /// preferences carrying them are dropped.
    #[must_use]
    pub fn from_inputs(inputs: &[PreferenceInput]) -> (Self, Vec<String>) {
        let mut set = Self::new();
        let mut unknown = Vec::new();
        for input in inputs {
            match Domain::from_alias(&input.kind) {
                Some(domain) => set.push(domain, &input.name),
                None => unknown.push(input.kind.clone()),
            }
        }
        (set, unknown)
    }

    /// Adapt a profile-style map (`{"movies": [...], "books": [...]}`).
    ///
    /// Returns the set and the keys that matched no domain.
    #[must_use]
    pub fn from_legacy_map<I, V>(entries: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = String>,
    {
        let mut set = Self::new();
        let mut unknown = Vec::new();
        for (key, values) in entries {
            match Domain::from_alias(&key) {
                Some(domain) => {
                    for value in values {
                        set.push(domain, &value);
                    }
                }
                None => unknown.push(key),
            }
        }
        (set, unknown)
    }

    #[must_use]
    pub fn get(&self, domain: Domain) -> &[String] {
        self.by_domain.get(&domain).map_or(&[], Vec::as_slice)
    }

    /// The first `max` preferences of a domain.
    #[must_use]
    pub fn seeds(&self, domain: Domain, max: usize) -> &[String] {
        let all = self.get(domain);
        &all[..all.len().min(max)]
    }

    /// Domains that have at least one preference, in canonical order.
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.by_domain
            .iter()
            .filter(|(_, prefs)| !prefs.is_empty())
            .map(|(d, _)| *d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Domain, &[String])> + '_ {
        self.by_domain.iter().map(|(d, prefs)| (*d, prefs.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_domain.values().all(Vec::is_empty)
    }

    /// Number of preferences across all domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_domain.values().map(Vec::len).sum()
    }
}

/// Lenient form accepted on the wire: unknown keys are dropped and a single
/// string counts as a one-element list.
impl<'de> Deserialize<'de> for UserPreferenceSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        let raw = BTreeMap::<String, OneOrMany>::deserialize(deserializer)?;
        let (set, _unknown) = Self::from_legacy_map(raw.into_iter().map(|(k, v)| {
            let values = match v {
                OneOrMany::One(s) => vec![s],
                OneOrMany::Many(list) => list,
            };
            (k, values)
        }));
        Ok(set)
    }
}
