//! Name/identifier normalization and candidate matching.

/// Start of the identifier slice compared during matching (0-based).
const SLICE_START: usize = 3;
/// End (exclusive) of the identifier slice compared during matching.
const SLICE_END: usize = 9;

/// Uppercase, strip punctuation and collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Keep only the digits of an identifier.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The six digits at positions 4 to 9 of a normalized identifier, or the
/// whole identifier when it is shorter than nine digits.
///
/// The portal masks CPFs as `***.456.789-**`, so this slice is the only part
/// of the identifier that is visible on every result row.
pub fn identifier_slice(normalized: &str) -> &str {
    normalized.get(SLICE_START..SLICE_END).unwrap_or(normalized)
}

/// A search result row, normalized on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub display_name: String,
    pub display_identifier: String,
}

impl Candidate {
    pub fn new(name: &str, identifier: &str) -> Self {
        Self {
            display_name: normalize_name(name),
            display_identifier: normalize_identifier(identifier),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_empty() || self.display_identifier.is_empty()
    }
}

/// Compares search result candidates against one target person.
#[derive(Debug, Clone)]
pub struct IdentityMatcher {
    name_tokens: Vec<String>,
    identifier: String,
}

impl IdentityMatcher {
    pub fn new(target_name: &str, target_identifier: &str) -> Self {
        Self {
            name_tokens: normalize_name(target_name)
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            identifier: normalize_identifier(target_identifier),
        }
    }

    /// True when the identifier slices agree and the names share a token.
    /// Empty names or identifiers never match.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if candidate.is_empty() || self.name_tokens.is_empty() || self.identifier.is_empty() {
            return false;
        }

        if identifier_slice(&candidate.display_identifier) != identifier_slice(&self.identifier) {
            return false;
        }

        candidate
            .display_name
            .split_whitespace()
            .any(|token| self.name_tokens.iter().any(|t| t == token))
    }
}

/// One-shot form of [`IdentityMatcher::matches`].
pub fn matches(candidate: &Candidate, target_name: &str, target_identifier: &str) -> bool {
    IdentityMatcher::new(target_name, target_identifier).matches(candidate)
}
