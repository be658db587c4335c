use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Token prefixes issued by the providers we talk to.
const PREFIX_PATTERNS: [&str; 4] = ["sk-ant-", "sk-", "AIza", "ya29."];

/// Places where a credential follows a fixed marker (headers, query strings, JSON).
const MARKER_PATTERNS: [&str; 7] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "x-api-key: ",
    "?key=",
    "&key=",
    "api_key=",
    "\"api_key\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|(_, c)| !is_secret_char(*c))
        .map_or(input.len(), |(i, _)| from + i)
}

/// True when a token may begin at byte `at`, i.e. it is not inside a word.
fn starts_token(input: &str, at: usize) -> bool {
    input[..at]
        .chars()
        .next_back()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pattern {
    /// Keep the marker, redact the value after it.
    Marker,
    /// Redact the whole token, only where a token can start.
    Prefix,
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str, pattern: Pattern) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Bare marker with nothing after it, or a prefix in the middle of a word.
        if end == content_start || (pattern == Pattern::Prefix && !starts_token(scrubbed, start)) {
            search_from = content_start;
            continue;
        }

        let replace_from = match pattern {
            Pattern::Marker => content_start,
            Pattern::Prefix => start,
        };
        scrubbed.replace_range(replace_from..end, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// Scrub credential-like tokens from provider error strings.
///
/// Prefix tokens (`sk-...`, `AIza...`) are replaced whole; marker forms such as
/// `?key=...` or `x-api-key: ...` keep the marker and lose the value.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_scrubbing = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_scrubbing {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKER_PATTERNS {
        scrub_after_marker(&mut scrubbed, marker, Pattern::Marker);
    }
    for prefix in PREFIX_PATTERNS {
        scrub_after_marker(&mut scrubbed, prefix, Pattern::Prefix);
    }
    Cow::Owned(scrubbed)
}

/// Remove an exact credential from text, then apply the pattern scrubber.
pub fn scrub_credential<'a>(input: &'a str, credential: &str) -> Cow<'a, str> {
    let credential = credential.trim();
    if credential.len() >= 4 && input.contains(credential) {
        let replaced = input.replace(credential, REDACTED);
        return Cow::Owned(scrub_secret_patterns(&replaced).into_owned());
    }
    scrub_secret_patterns(input)
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let scrubbed = scrubbed.as_ref();
    let end = scrubbed
        .char_indices()
        .nth(MAX_API_ERROR_CHARS)
        .map_or(scrubbed.len(), |(i, _)| i);

    format!("{}...", &scrubbed[..end])
}
