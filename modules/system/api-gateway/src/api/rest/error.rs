use taste_graph_sdk::TasteGraphError;
use text_gen_sdk::TextGenError;
use zesty_errors::{Problem, codes};

pub type ApiResult<T> = Result<T, Problem>;

/// Trimmed value, `None` when absent or blank.
#[must_use]
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// 400 naming the fields whose flag is `false`.
#[must_use]
pub fn missing(detail: &str, fields: &[(&str, bool)]) -> Problem {
    let absent: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    codes::validation(detail, &absent)
}

#[must_use]
pub fn unknown_type(field: &str, value: &str) -> Problem {
    codes::validation(format!("Unknown content type: {value}"), &[]).with_errors(vec![
        zesty_errors::ValidationViolation {
            field: field.to_owned(),
            message: format!("{value} is not one of music, movie, book, food, fashion"),
            code: Some("unknown_domain".to_owned()),
        },
    ])
}

/// Log the graph failure and answer with a fixed message.
#[must_use]
pub fn graph_failure(op: &'static str, err: &TasteGraphError, detail: &'static str) -> Problem {
    tracing::error!(op, kind = %err.kind(), error = %err, "taste graph passthrough failed");
    codes::upstream_failure(detail)
}

#[must_use]
pub fn text_gen_failure(err: &TextGenError) -> Problem {
    tracing::error!(kind = %err.kind(), error = %err, "text generation passthrough failed");
    codes::upstream_failure("Failed to generate content")
}
