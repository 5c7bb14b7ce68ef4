use serde_json::Value;
use tracker_logging::tracker_warn;

/// The model's reply could not be read as a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unparseable model response: {reason}")]
pub struct Unparseable {
    /// Text that was handed to the JSON parser after fence stripping.
    pub text: String,
    pub reason: String,
}

/// Extracts a single JSON document from a noisy model reply.
///
/// Strips a leading ```` ``` ```` / ```` ```json ```` fence and a trailing fence,
/// then narrows to the span between the first `{` and the last `}` when both
/// exist. The remainder must parse strictly. Failures are logged with the
/// offending text and returned as [`Unparseable`]; this never panics.
pub fn parse_model_response(raw: &str) -> Result<Value, Unparseable> {
    let text = narrow_to_object(strip_fences(raw.trim()));
    serde_json::from_str(text).map_err(|err| {
        tracker_warn!("JSON parse error: {:?} ({})", text, err);
        Unparseable {
            text: text.to_string(),
            reason: err.to_string(),
        }
    })
}

fn strip_fences(text: &str) -> &str {
    let mut out = text;
    if let Some(rest) = out.strip_prefix("```") {
        out = strip_prefix_ignore_ascii_case(rest, "json")
            .unwrap_or(rest)
            .trim_start();
    }
    if let Some(rest) = out.strip_suffix("```") {
        out = rest.trim_end();
    }
    out
}

fn strip_prefix_ignore_ascii_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn narrow_to_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}
