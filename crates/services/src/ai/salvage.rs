//! Pulls JSON out of free-form model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static ARRAY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").expect("array span pattern is valid"));
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("object span pattern is valid"));
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z]*").expect("code fence pattern is valid"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("trailing comma pattern is valid"));

/// Largest `[...]` span in `text`, parsed as JSON.
///
/// The span runs from the first `[` to the last `]`. When it does not parse as is,
/// one retry is made after removing code fences, trailing commas and smart quotes.
#[must_use]
pub fn salvage_json_array(text: &str) -> Option<Value> {
    salvage(text, &ARRAY_SPAN).filter(Value::is_array)
}

/// Largest `{...}` span in `text`, parsed as JSON. Same rules as
/// [`salvage_json_array`].
#[must_use]
pub fn salvage_json_object(text: &str) -> Option<Value> {
    salvage(text, &OBJECT_SPAN).filter(Value::is_object)
}

fn salvage(text: &str, span: &Regex) -> Option<Value> {
    let direct = span
        .find(text)
        .and_then(|found| serde_json::from_str(found.as_str()).ok());
    if direct.is_some() {
        return direct;
    }

    let cleaned = sanitize(text);
    let found = span.find(&cleaned)?;
    match serde_json::from_str(found.as_str()) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("could not salvage JSON from model output: {err}");
            None
        }
    }
}

fn sanitize(text: &str) -> String {
    let without_fences = CODE_FENCE.replace_all(text, "");
    let quotes_fixed = without_fences
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    TRAILING_COMMA.replace_all(&quotes_fixed, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_array_in_prose() {
        let text = "Here you go:\n[{\"question\": \"Why Rust?\"}]\nGood luck!";
        assert_eq!(
            salvage_json_array(text),
            Some(json!([{"question": "Why Rust?"}]))
        );
    }

    #[test]
    fn repairs_fenced_output_with_trailing_commas() {
        let text = "```json\n[\n  {\u{201C}a\u{201D}: 1,},\n  {\"a\": 2},\n]\n```";
        assert_eq!(salvage_json_array(text), Some(json!([{"a": 1}, {"a": 2}])));
    }

    #[test]
    fn object_salvage_ignores_wrapping_text() {
        let text = "Analysis follows. {\"overallScore\": 82, \"strengths\": []} Thanks.";
        assert_eq!(
            salvage_json_object(text),
            Some(json!({"overallScore": 82, "strengths": []}))
        );
    }

    #[test]
    fn returns_none_when_nothing_parses() {
        assert_eq!(salvage_json_array("no json here"), None);
        assert_eq!(salvage_json_array("[not, valid json"), None);
        assert_eq!(salvage_json_object("{broken: }"), None);
    }
}
