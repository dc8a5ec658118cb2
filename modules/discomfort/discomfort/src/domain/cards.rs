//! Turning candidates into cards: ids, templated text, difficulty.

use chrono::{DateTime, Utc};
use discomfort_sdk::{CardMetadata, CardSource, Difficulty, DiscomfortCard, Domain};
use taste_graph_sdk::TasteEntity;

use super::catalog::CuratedEntry;

/// Something worth turning into a card, before any text is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub genre: Option<String>,
    pub difficulty: Difficulty,
    pub image_url: Option<String>,
    pub entity_id: Option<String>,
    pub source: CardSource,
}

impl Candidate {
    /// `index` is the entity's rank within the domain's candidate list.
    #[must_use]
    pub fn from_entity(entity: &TasteEntity, index: usize) -> Self {
        Self {
            name: entity.name.clone(),
            genre: entity.primary_genre().map(str::to_owned),
            difficulty: graph_difficulty(entity.popularity, index),
            image_url: entity.image_url.clone(),
            entity_id: Some(entity.id.clone()),
            source: CardSource::Graph,
        }
    }

    #[must_use]
    pub fn from_curated(entry: &CuratedEntry, source: CardSource) -> Self {
        Self {
            name: entry.name.to_owned(),
            genre: Some(entry.genre.to_owned()),
            difficulty: Difficulty::saturating(i64::from(entry.difficulty)),
            image_url: None,
            entity_id: None,
            source,
        }
    }
}

/// Heuristic discomfort of a graph entity.
///
/// Less popular entities rate harder (popularity 1.0 gives 2, 0.0 gives 5).
/// Without a popularity the rank decides: `3 + index`, kept within `[2, 5]`.
/// Neither is a calibrated metric.
#[must_use]
pub fn graph_difficulty(popularity: Option<f64>, index: usize) -> Difficulty {
    match popularity.filter(|p| p.is_finite()) {
        Some(p) => {
            // In [0, 3] after the clamp, so rounding cannot overflow.
            #[allow(clippy::cast_possible_truncation)]
            let offset = (p.clamp(0.0, 1.0) * 3.0).round() as i64;
            Difficulty::saturating(5 - offset)
        }
        None => {
            let rank = i64::try_from(index).unwrap_or(i64::MAX);
            Difficulty::saturating(rank.saturating_add(3).clamp(2, 5))
        }
    }
}

#[must_use]
pub fn growth_benefit(domain: Domain) -> &'static str {
    match domain {
        Domain::Movie => "Cinematic appreciation & cultural literacy",
        Domain::Music => "Musical diversity & auditory expansion",
        Domain::Book => "Literary exploration & intellectual growth",
        Domain::Food => "Culinary adventure & cultural immersion",
        Domain::Fashion => "Aesthetic range & self-expression",
    }
}

/// Lowercase, ASCII-dash separated form of a name for use in ids.
#[must_use]
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// What the user is being nudged away from: their first preference, or the
/// mainstream of the domain when they named none.
#[must_use]
pub fn seed_label(seeds: &[String], domain: Domain) -> String {
    seeds
        .first()
        .cloned()
        .unwrap_or_else(|| format!("mainstream {domain}"))
}

#[must_use]
pub fn templated_explanation(seed: &str, title: &str, genre_or_domain: &str) -> String {
    format!(
        "Since you enjoy {seed}, trying \"{title}\" will challenge your comfort zone significantly. \
         This {genre_or_domain} represents a completely different aesthetic that could dramatically \
         broaden your cultural understanding and push you into unexplored territory."
    )
}

/// Card for a graph or curated candidate, with templated text.
#[must_use]
pub fn build_card(
    domain: Domain,
    candidate: Candidate,
    seeds: &[String],
    now: DateTime<Utc>,
) -> DiscomfortCard {
    let id = match (&candidate.source, &candidate.entity_id) {
        (CardSource::Graph, Some(entity_id)) => format!("graph-{domain}-{entity_id}"),
        _ => format!("curated-{domain}-{}", slug(&candidate.name)),
    };
    let liked = if seeds.is_empty() {
        "your current preferences".to_owned()
    } else {
        seeds.join(" and ")
    };
    let genre_or_domain = candidate
        .genre
        .clone()
        .unwrap_or_else(|| domain.as_str().to_owned());

    let mut metadata = CardMetadata::new(candidate.source);
    metadata.genre.clone_from(&candidate.genre);
    metadata.entity_id.clone_from(&candidate.entity_id);

    DiscomfortCard {
        id,
        domain,
        description: format!(
            "Since you enjoy {liked}, challenge yourself with {}. This will expand your {domain} \
             horizons and push you out of your comfort zone.",
            candidate.name
        ),
        cultural_context: format!(
            "{genre_or_domain} represents a different cultural perspective in {domain}."
        ),
        difficulty: candidate.difficulty,
        explanation: Some(templated_explanation(
            &seed_label(seeds, domain),
            &candidate.name,
            &genre_or_domain,
        )),
        image_url: candidate.image_url,
        growth_benefit: growth_benefit(domain).to_owned(),
        metadata,
        title: candidate.name,
        created_at: now,
    }
}

/// Placeholder for a domain that produced no candidates at all.
/// `n` is 1 or 2.
#[must_use]
pub fn fallback_card(domain: Domain, n: usize, now: DateTime<Utc>) -> DiscomfortCard {
    DiscomfortCard {
        id: format!("fallback-{domain}-{n}"),
        domain,
        title: format!("{} Challenge {n}", domain.title()),
        description: format!(
            "Step outside your {domain} comfort zone and discover something completely new."
        ),
        cultural_context: format!("Unfamiliar {domain} is where new perspectives start."),
        difficulty: Difficulty::saturating(3),
        explanation: Some(format!(
            "Step outside your {domain} comfort zone and discover something completely new."
        )),
        image_url: None,
        growth_benefit: "Cultural expansion".to_owned(),
        metadata: CardMetadata::new(CardSource::Fallback),
        created_at: now,
    }
}

/// Padding card. Uses `entry` when there is an unused curated entry for the
/// domain, a generic card otherwise. `n` keeps ids unique within the batch.
#[must_use]
pub fn bonus_card(
    domain: Domain,
    entry: Option<&CuratedEntry>,
    seeds: &[String],
    n: usize,
    now: DateTime<Utc>,
) -> DiscomfortCard {
    let id = format!("bonus-{domain}-{n}");
    match entry {
        Some(entry) => DiscomfortCard {
            id,
            ..build_card(
                domain,
                Candidate::from_curated(entry, CardSource::Bonus),
                seeds,
                now,
            )
        },
        None => DiscomfortCard {
            id,
            domain,
            title: format!("Bonus {} Challenge", domain.title()),
            description: format!(
                "An extra challenge to push your {domain} boundaries even further."
            ),
            cultural_context: format!("Pick something in {domain} you would normally never choose."),
            difficulty: Difficulty::saturating(4),
            explanation: Some(format!(
                "An extra challenge to push your {domain} boundaries even further."
            )),
            image_url: None,
            growth_benefit: "Extended cultural exploration".to_owned(),
            metadata: CardMetadata::new(CardSource::Bonus),
            created_at: now,
        },
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::catalog::curated;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("Stalker (1979)"), "stalker-1979");
        assert_eq!(slug("Gravity's Rainbow"), "gravity-s-rainbow");
        assert_eq!(slug("  Free   Jazz "), "free-jazz");
        assert_eq!(slug("Surstr\u{f6}mming"), "surstr\u{f6}mming");
    }

    #[test]
    fn graph_difficulty_stays_in_range() {
        for index in 0..20 {
            let d = graph_difficulty(None, index).get();
            assert!((2..=5).contains(&d));
        }
        assert_eq!(graph_difficulty(Some(1.0), 0).get(), 2);
        assert_eq!(graph_difficulty(Some(0.0), 0).get(), 5);
        assert_eq!(graph_difficulty(Some(f64::NAN), 0).get(), 3);
        assert_eq!(graph_difficulty(Some(7.5), 3).get(), 2);
    }

    #[test]
    fn curated_card_uses_slug_id_and_template() {
        let entry = curated(Domain::Music)[1];
        let card = build_card(
            Domain::Music,
            Candidate::from_curated(&entry, CardSource::Curated),
            &["Taylor Swift".to_owned()],
            Utc::now(),
        );
        assert_eq!(card.id, "curated-music-free-jazz");
        assert_eq!(card.difficulty.get(), 4);
        assert_eq!(card.metadata.genre.as_deref(), Some("Experimental Jazz"));
        let explanation = card.explanation.unwrap();
        assert!(explanation.starts_with("Since you enjoy Taylor Swift, trying \"Free Jazz\""));
        assert!(explanation.contains("This Experimental Jazz represents"));
        assert_eq!(card.growth_benefit, "Musical diversity & auditory expansion");
    }

    #[test]
    fn seedless_card_names_the_mainstream() {
        let entry = curated(Domain::Book)[0];
        let card = build_card(
            Domain::Book,
            Candidate::from_curated(&entry, CardSource::Curated),
            &[],
            Utc::now(),
        );
        assert!(
            card.explanation
                .unwrap()
                .starts_with("Since you enjoy mainstream book,")
        );
    }

    #[test]
    fn graph_card_id_uses_entity_id() {
        let entity = TasteEntity {
            id: "E42".to_owned(),
            name: "Sunn O)))".to_owned(),
            entity_type: "urn:entity:artist".to_owned(),
            image_url: Some("https://img/e42.jpg".to_owned()),
            genres: vec!["Drone".to_owned()],
            popularity: None,
            properties: serde_json::Value::Null,
        };
        let card = build_card(
            Domain::Music,
            Candidate::from_entity(&entity, 1),
            &["Adele".to_owned()],
            Utc::now(),
        );
        assert_eq!(card.id, "graph-music-E42");
        assert_eq!(card.metadata.source, CardSource::Graph);
        assert_eq!(card.metadata.entity_id.as_deref(), Some("E42"));
        assert_eq!(card.image_url.as_deref(), Some("https://img/e42.jpg"));
        assert_eq!(card.difficulty.get(), 4);
    }

    #[test]
    fn generic_bonus_and_fallback_cards() {
        let now = Utc::now();
        let bonus = bonus_card(Domain::Food, None, &[], 7, now);
        assert_eq!(bonus.id, "bonus-food-7");
        assert_eq!(bonus.title, "Bonus Food Challenge");
        assert_eq!(bonus.difficulty.get(), 4);

        let fallback = fallback_card(Domain::Movie, 2, now);
        assert_eq!(fallback.title, "Movie Challenge 2");
        assert_eq!(fallback.difficulty.get(), 3);
        assert_eq!(fallback.metadata.source, CardSource::Fallback);
    }
}
