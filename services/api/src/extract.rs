//! services/api/src/extract.rs
//!
//! Best-effort normalization of the raw text returned by the generation API.
//!
//! The upstream model is instructed to emit strict JSON of the shape
//! `{"response": "...", "reference": "..."}` but does not reliably comply:
//! replies may be wrapped in markdown fences, double-encoded, or plain
//! prose. The extractor is an ordered cascade of independent, pure
//! attempts, from the most-structured assumption down to the least; the
//! first success wins. It makes no correctness guarantee for adversarial
//! input beyond producing some non-empty text rather than erroring.

use regex::Regex;
use serde_json::{Map, Value};

/// Reference placeholder used when the upstream reply names no verse.
pub const FALLBACK_REFERENCE: &str = "—";

/// A structured answer recovered from the upstream reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub response: String,
    pub reference: String,
}

/// Recovers a structured [`Answer`] from a raw upstream reply.
///
/// Returns `None` when the reply contains nothing usable; the caller is
/// expected to substitute a fixed apology in that case.
pub fn extract_answer(raw: &str) -> Option<Answer> {
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        return None;
    }

    parse_object(&cleaned)
        .or_else(|| parse_brace_span(&cleaned))
        .or_else(|| recover_response_field(&cleaned))
        .or_else(|| plain_text_fallback(&cleaned))
}

/// Removes markdown/code-fence markers and trims surrounding whitespace.
fn strip_fences(text: &str) -> String {
    let fence_re = Regex::new(r"(?i)```json|```|``").unwrap();
    fence_re.replace_all(text, "").trim().to_string()
}

/// Attempt 1: parse the whole text as a JSON object with a `response` field.
fn parse_object(text: &str) -> Option<Answer> {
    let value: Value = serde_json::from_str(text).ok()?;
    answer_from_value(&value)
}

/// Attempt 2: parse the first brace-delimited span (greedy, first `{` to
/// last `}`) with the same object logic.
fn parse_brace_span(text: &str) -> Option<Answer> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
}

/// Attempt 3: recover a literal `"response": "..."` pair by regex,
/// unescaping embedded quotes.
fn recover_response_field(text: &str) -> Option<Answer> {
    let response_re = Regex::new(r#"(?s)"response"\s*:\s*"(.*?)"(?:,|\n|\})"#).unwrap();
    let caps = response_re.captures(text)?;
    let response = caps.get(1)?.as_str().replace("\\\"", "\"");
    Some(Answer {
        response,
        reference: FALLBACK_REFERENCE.to_string(),
    })
}

/// Attempt 4: treat the whole cleaned text as the response when it is
/// non-trivial (longer than 10 characters).
fn plain_text_fallback(text: &str) -> Option<Answer> {
    if text.chars().count() > 10 {
        Some(Answer {
            response: text.to_string(),
            reference: FALLBACK_REFERENCE.to_string(),
        })
    } else {
        None
    }
}

/// Accepts a JSON object carrying a string `response` field. When that
/// string itself looks like it contains a nested JSON object, one level of
/// unwrapping is attempted and the inner object is preferred if it has its
/// own `response`. Deeper nesting falls through to the outer object.
fn answer_from_value(value: &Value) -> Option<Answer> {
    let obj = value.as_object()?;
    let response = obj.get("response")?.as_str()?;

    if response.contains('{') {
        if let Ok(inner) = serde_json::from_str::<Value>(response) {
            if let Some(answer) = inner.as_object().and_then(|inner_obj| {
                let inner_response = inner_obj.get("response")?.as_str()?;
                Some(Answer {
                    response: inner_response.to_string(),
                    reference: reference_of(inner_obj),
                })
            }) {
                return Some(answer);
            }
        }
    }

    Some(Answer {
        response: response.to_string(),
        reference: reference_of(obj),
    })
}

fn reference_of(obj: &Map<String, Value>) -> String {
    obj.get("reference")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_REFERENCE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_json_round_trip() {
        let answer = extract_answer(r#"{"response":"Hello","reference":"2.47"}"#).unwrap();
        assert_eq!(answer.response, "Hello");
        assert_eq!(answer.reference, "2.47");
    }

    #[test]
    fn fenced_json_is_unwrapped_and_reference_defaults() {
        let answer = extract_answer("```json\n{\"response\":\"Hi\"}\n```").unwrap();
        assert_eq!(answer.response, "Hi");
        assert_eq!(answer.reference, FALLBACK_REFERENCE);
    }

    #[test]
    fn nested_double_encoded_json_prefers_inner() {
        let answer =
            extract_answer(r#"{"response":"{\"response\":\"Inner\"}"}"#).unwrap();
        assert_eq!(answer.response, "Inner");
        assert_eq!(answer.reference, FALLBACK_REFERENCE);
    }

    #[test]
    fn nested_json_keeps_inner_reference_when_present() {
        let answer = extract_answer(
            r#"{"response":"{\"response\":\"Inner\",\"reference\":\"18.66\"}","reference":"1.1"}"#,
        )
        .unwrap();
        assert_eq!(answer.response, "Inner");
        assert_eq!(answer.reference, "18.66");
    }

    #[test]
    fn malformed_nested_string_falls_back_to_outer() {
        let answer = extract_answer(r#"{"response":"brace { but not json","reference":"3.5"}"#)
            .unwrap();
        assert_eq!(answer.response, "brace { but not json");
        assert_eq!(answer.reference, "3.5");
    }

    #[test]
    fn json_embedded_in_prose_is_found() {
        let answer = extract_answer(
            "Here you go: {\"response\":\"Hi\",\"reference\":\"2.47\"} hope that helps",
        )
        .unwrap();
        assert_eq!(answer.response, "Hi");
        assert_eq!(answer.reference, "2.47");
    }

    #[test]
    fn literal_response_field_is_recovered() {
        let answer = extract_answer("oops \"response\": \"Hello\",\ntruncated").unwrap();
        assert_eq!(answer.response, "Hello");
        assert_eq!(answer.reference, FALLBACK_REFERENCE);
    }

    #[test]
    fn plain_prose_becomes_the_response() {
        let answer = extract_answer("The path of dharma is stillness.").unwrap();
        assert_eq!(answer.response, "The path of dharma is stillness.");
        assert_eq!(answer.reference, FALLBACK_REFERENCE);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert_eq!(extract_answer(""), None);
        assert_eq!(extract_answer("   \n\t  "), None);
    }

    #[test]
    fn short_garbage_yields_nothing() {
        assert_eq!(extract_answer("om"), None);
        assert_eq!(extract_answer("```\nok\n```"), None);
    }
}
