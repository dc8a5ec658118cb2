//! Onboarding report, growth reflection and cultural nemesis content.

use chrono::{DateTime, Utc};
use discomfort_sdk::{
    GrowthReflection, Nemesis, NemesisPreference, OnboardingReport, PreferenceInput,
    UserPreferenceSet,
};
use rand::Rng;
use serde::Deserialize;

/// Report built from the preferences alone.
#[must_use]
pub fn default_report(user_name: &str, preferences: &UserPreferenceSet) -> OnboardingReport {
    let domains: Vec<&str> = preferences.domains().map(|d| d.as_str()).collect();
    let highlights: Vec<String> = preferences
        .iter()
        .flat_map(|(domain, items)| items.iter().map(move |item| format!("{domain}: {item}")))
        .take(3)
        .collect();

    OnboardingReport {
        cultural_profile: format!(
            "You have diverse interests spanning {}. Your taste profile shows a preference for {}, \
             indicating an openness to mainstream culture with potential for exciting growth into \
             unexplored territories.",
            domains.join(", "),
            highlights.join(", ")
        ),
        growth_areas: to_strings(&[
            "International and art house cinema",
            "World music and experimental genres",
            "Global literature and non-fiction",
            "International cuisine and fusion foods",
            "Alternative fashion and cultural styles",
        ]),
        recommended_challenges: to_strings(&[
            "Watch a foreign film with subtitles",
            "Listen to music from a culture you've never explored",
            "Read a book by an author from a different continent",
            "Try cooking a dish from a cuisine you've never attempted",
            "Experiment with a fashion style outside your comfort zone",
        ]),
        motivation_message: format!(
            "{user_name}, your journey into cultural discomfort will expand your worldview and \
             deepen your empathy. Every challenge you accept is a step toward becoming a more \
             culturally intelligent and open-minded person. Embrace the discomfort: it's where \
             growth happens!"
        ),
    }
}

/// Report used when there is nothing to personalise.
#[must_use]
pub fn generic_report() -> OnboardingReport {
    OnboardingReport {
        cultural_profile:
            "You have interesting cultural preferences with great potential for growth.".to_owned(),
        growth_areas: to_strings(&[
            "International experiences",
            "Diverse media consumption",
            "Cultural exploration",
        ]),
        recommended_challenges: to_strings(&[
            "Try something completely new",
            "Explore unfamiliar cultures",
            "Step outside your comfort zone",
        ]),
        motivation_message: "Every step outside your comfort zone is a step toward personal growth!"
            .to_owned(),
    }
}

#[must_use]
pub fn onboarding_prompt(user_name: &str, preferences: &UserPreferenceSet) -> String {
    let preferences = serde_json::to_string(preferences).unwrap_or_default();
    format!(
        "Create a personalized cultural growth report for {user_name}. Their preferences are: \
         {preferences}. Generate a JSON response with: {{\"cultural_profile\": \"2-3 sentence \
         summary\", \"growth_areas\": [\"area1\", \"area2\", \"area3\"], \"recommended_challenges\": \
         [\"challenge1\", \"challenge2\", \"challenge3\"], \"motivation_message\": \"encouraging \
         message\"}}"
    )
}

/// Whatever part of a report the model produced. Missing or empty fields
/// keep the templated value.
#[derive(Debug, Default, Deserialize)]
pub struct GeneratedReport {
    #[serde(default)]
    cultural_profile: Option<String>,
    #[serde(default)]
    growth_areas: Option<Vec<String>>,
    #[serde(default)]
    recommended_challenges: Option<Vec<String>>,
    #[serde(default)]
    motivation_message: Option<String>,
}

impl GeneratedReport {
    #[must_use]
    pub fn merge_into(self, mut base: OnboardingReport) -> OnboardingReport {
        if let Some(text) = non_blank(self.cultural_profile) {
            base.cultural_profile = text;
        }
        if let Some(list) = non_empty(self.growth_areas) {
            base.growth_areas = list;
        }
        if let Some(list) = non_empty(self.recommended_challenges) {
            base.recommended_challenges = list;
        }
        if let Some(text) = non_blank(self.motivation_message) {
            base.motivation_message = text;
        }
        base
    }
}

#[must_use]
pub fn growth_prompt(user_name: &str, completed: &serde_json::Value) -> String {
    format!(
        "{user_name} has completed these cultural challenges: {completed}. Write a thoughtful \
         reflection on their growth journey. Include insights about what they've learned and \
         suggest next steps. Format as JSON: {{\"reflection\": \"your reflection\", \
         \"growth_insights\": [\"insight1\", \"insight2\"], \"next_challenges\": [\"challenge1\", \
         \"challenge2\"]}}"
    )
}

#[must_use]
pub fn fallback_reflection() -> GrowthReflection {
    GrowthReflection {
        reflection: "You've shown remarkable courage in stepping outside your comfort zone."
            .to_owned(),
        growth_insights: to_strings(&[
            "Increased cultural awareness",
            "Greater empathy for different perspectives",
        ]),
        next_challenges: to_strings(&[
            "Explore a new art form",
            "Try cuisine from a different continent",
        ]),
    }
}

/// Simulated user whose every preference is the inverse of the caller's.
pub fn nemesis<R: Rng + ?Sized>(
    preferences: &[PreferenceInput],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Nemesis {
    Nemesis {
        id: format!("nemesis_{}", now.timestamp_millis()),
        name: "Cultural Explorer".to_owned(),
        opposite_preferences: preferences
            .iter()
            .map(|p| NemesisPreference {
                name: format!("Anti-{}", p.name),
                kind: p.kind.clone(),
                reason: "Completely opposite taste profile".to_owned(),
            })
            .collect(),
        compatibility_score: 0.15,
        challenge_count: rng.random_range(10..60),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_empty(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value
        .map(|items| items.into_iter().filter(|s| !s.trim().is_empty()).collect::<Vec<_>>())
        .filter(|items| !items.is_empty())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use discomfort_sdk::Domain;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn prefs() -> UserPreferenceSet {
        let mut set = UserPreferenceSet::new();
        set.push(Domain::Music, "Taylor Swift");
        set.push(Domain::Music, "Drake");
        set.push(Domain::Movie, "Marvel");
        set.push(Domain::Movie, "Pixar");
        set
    }

    #[test]
    fn default_report_names_domains_and_first_three_preferences() {
        let report = default_report("Sam", &prefs());
        assert!(report.cultural_profile.contains("music"));
        assert!(report.cultural_profile.contains("movie"));
        assert_eq!(report.cultural_profile.matches(": ").count(), 3);
        assert_eq!(report.growth_areas.len(), 5);
        assert_eq!(report.recommended_challenges.len(), 5);
        assert!(report.motivation_message.starts_with("Sam,"));
    }

    #[test]
    fn generated_fields_override_only_when_present() {
        let generated: GeneratedReport = serde_json::from_value(serde_json::json!({
            "cultural_profile": "A bold listener.",
            "growth_areas": [],
            "motivation_message": "  "
        }))
        .unwrap();
        let base = default_report("Sam", &prefs());
        let merged = generated.merge_into(base.clone());
        assert_eq!(merged.cultural_profile, "A bold listener.");
        assert_eq!(merged.growth_areas, base.growth_areas);
        assert_eq!(merged.motivation_message, base.motivation_message);
    }

    #[test]
    fn nemesis_inverts_each_preference() {
        let mut rng = StdRng::seed_from_u64(7);
        let input = vec![
            PreferenceInput::new("Jazz", "music"),
            PreferenceInput::new("Sushi", "food"),
        ];
        let n = nemesis(&input, Utc::now(), &mut rng);
        assert_eq!(n.name, "Cultural Explorer");
        assert_eq!(n.opposite_preferences[0].name, "Anti-Jazz");
        assert_eq!(n.opposite_preferences[1].kind, "food");
        assert!((10..60).contains(&n.challenge_count));
        assert!((n.compatibility_score - 0.15).abs() < f64::EPSILON);
        assert!(n.id.starts_with("nemesis_"));
    }

    #[test]
    fn prompts_embed_inputs() {
        assert!(onboarding_prompt("Sam", &prefs()).contains("Taylor Swift"));
        let completed = serde_json::json!([{ "title": "Free Jazz" }]);
        assert!(growth_prompt("Sam", &completed).contains("Free Jazz"));
    }
}
