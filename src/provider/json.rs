//! JSON extraction from provider responses.
//!
//! Providers often return JSON wrapped in markdown code fences or padded
//! with conversational text. Extraction handles nested braces and string
//! escaping correctly rather than searching for the first `}`.

use serde::de::DeserializeOwned;

use crate::error::ProviderError;

/// Extract a JSON object from a response that may be wrapped in markdown.
///
/// Tries, in order:
/// 1. Markdown ` ```json ... ``` ` fenced block
/// 2. Bare ` ``` ... ``` ` fenced block (if the content starts with `{`)
/// 3. Proper JSON parsing / balanced-brace extraction from surrounding text
/// 4. Returns the input unchanged as a last resort
pub fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json")
        && let Some(end) = trimmed[start + 7..].find("```")
    {
        return trimmed[start + 7..start + 7 + end].trim().to_string();
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
    {
        let inner = trimmed[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }

    if let Some(json_str) = find_valid_json_object(trimmed) {
        return json_str;
    }

    trimmed.to_string()
}

/// Extract and deserialize a typed object from a provider response.
///
/// Failures surface as [`ProviderError::MalformedResponse`] carrying the
/// parse error and a bounded sample of the content.
pub fn parse_json_response<T: DeserializeOwned>(
    provider: &str,
    response: &str,
) -> Result<T, ProviderError> {
    let json_str = extract_json(response);
    serde_json::from_str(&json_str).map_err(|e| {
        let sample: String = response.chars().take(200).collect();
        ProviderError::MalformedResponse {
            name: provider.to_string(),
            detail: format!("{} (content: {})", e, sample),
        }
    })
}

/// Find a valid JSON object in a string using proper brace matching.
///
/// Iterates through every `{` in the input. For each one, first tries a full
/// `serde_json` parse (which handles nested braces correctly), then falls
/// back to balanced-brace extraction with string-escape awareness.
fn find_valid_json_object(text: &str) -> Option<String> {
    for (start_idx, _) in text.match_indices('{') {
        let candidate = &text[start_idx..];

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
            if let Ok(json_str) = serde_json::to_string(&value) {
                return Some(json_str);
            }
        }

        if let Some(json_str) = extract_balanced_braces(candidate) {
            if serde_json::from_str::<serde_json::Value>(&json_str).is_ok() {
                return Some(json_str);
            }
        }
    }

    None
}

/// Extract a substring with balanced braces starting from the first `{`.
///
/// Tracks brace depth while respecting JSON string literals (including
/// escaped characters), so `{"msg": "use { and } carefully"}` is handled
/// correctly.
fn extract_balanced_braces(text: &str) -> Option<String> {
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[..=idx].to_string());
                }
            }
            _ => {}
        }
    }

    None
}
