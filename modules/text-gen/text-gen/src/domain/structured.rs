//! Pulling a JSON object out of free-form model output.

use serde::de::DeserializeOwned;
use text_gen_sdk::TextGenError;

/// Parse the JSON object contained in `text`.
///
/// Models wrap JSON in code fences or chat around it. Fences are removed,
/// then the span from the first `{` to the last `}` is parsed.
///
/// # Errors
/// [`TextGenError::Malformed`] when no object is found or it does not
/// deserialize into `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, TextGenError> {
    let cleaned = strip_code_fences(text);
    let start = cleaned
        .find('{')
        .ok_or_else(|| TextGenError::malformed("no JSON object in generated text"))?;
    let end = cleaned
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| TextGenError::malformed("unterminated JSON object in generated text"))?;
    serde_json::from_str(&cleaned[start..=end])
        .map_err(|e| TextGenError::malformed(format!("generated JSON does not match: {e}")))
}

fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        title: String,
    }

    #[test]
    fn parses_fenced_json() {
        let text = "```json\n{\"title\": \"Gamelan night\"}\n```";
        let reply: Reply = extract_json(text).unwrap();
        assert_eq!(reply.title, "Gamelan night");
    }

    #[test]
    fn parses_json_surrounded_by_prose() {
        let text = "Sure! Here it is: {\"title\": \"Read Ulysses\"} Enjoy.";
        let reply: Reply = extract_json(text).unwrap();
        assert_eq!(reply.title, "Read Ulysses");
    }

    #[test]
    fn garbage_is_malformed() {
        let err = extract_json::<Reply>("lorem ipsum }{").unwrap_err();
        assert!(matches!(err, TextGenError::Malformed { .. }));
        assert!(extract_json::<Reply>("{\"other\": 1}").is_err());
    }
}
