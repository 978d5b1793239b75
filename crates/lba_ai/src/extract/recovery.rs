use serde_json::Value;
use tracing::warn;

/// Parser strategies tried in order; each is independent and returns the first
/// JSON value it can recover.
type Strategy = fn(&str) -> Option<Value>;

const STRATEGIES: &[Strategy] = &[
    try_direct_parse,
    try_fenced_block,
    try_bracket_scan,
    try_strip_prefix,
];

const KNOWN_PREFIXES: &[&str] = &[
    "Here is the JSON:",
    "Here's the JSON:",
    "JSON response:",
    "Response:",
    "Output:",
    "Result:",
];

/// Layered recovery for model output that should contain one JSON document:
/// direct parse, then fenced-code-block extraction, then first/last-bracket
/// extraction, then stripped-known-prefix retry. `None` only when every
/// strategy fails.
pub fn parse_json_response(response_text: &str) -> Option<Value> {
    let text = response_text.trim();
    if text.is_empty() {
        warn!("empty response text");
        return None;
    }

    for strategy in STRATEGIES {
        if let Some(value) = strategy(text) {
            return Some(value);
        }
    }

    warn!(
        head = text.chars().take(200).collect::<String>().as_str(),
        "failed to parse JSON from response"
    );
    None
}

fn try_direct_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// JSON inside Markdown code fences, with or without a `json` language tag.
fn try_fenced_block(text: &str) -> Option<Value> {
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let body = &rest[open + 3..];
        let body = body.strip_prefix("json").unwrap_or(body);
        let Some(close) = body.find("```") else {
            return None;
        };
        let inner = body[..close].trim();
        if inner.starts_with('{') || inner.starts_with('[') {
            if let Ok(value) = serde_json::from_str(inner) {
                return Some(value);
            }
        }
        rest = &body[close + 3..];
    }
    None
}

/// First `{`..last `}` (then first `[`..last `]`) as a candidate document.
fn try_bracket_scan(text: &str) -> Option<Value> {
    for (open, close) in [('{', '}'), ('[', ']')] {
        let start = text.find(open);
        let end = text.rfind(close);
        if let (Some(start), Some(end)) = (start, end) {
            if end > start {
                if let Ok(value) = serde_json::from_str(&text[start..=end]) {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn try_strip_prefix(text: &str) -> Option<Value> {
    let lowered = text.to_ascii_lowercase();
    for prefix in KNOWN_PREFIXES {
        if lowered.starts_with(&prefix.to_ascii_lowercase()) {
            let cleaned = text[prefix.len()..].trim();
            if let Ok(value) = serde_json::from_str(cleaned) {
                return Some(value);
            }
        }
    }
    None
}
