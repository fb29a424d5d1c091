//! Glob matching for tool identifiers in template allow/deny lists

use crate::error::{Error, Result};

/// Matches tool identifiers against template entries
///
/// An entry is either a literal tool id or a pattern using `*` (any
/// sequence) and `?` (exactly one character).
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobMatcher;

impl GlobMatcher {
    /// Create a new glob matcher
    pub fn new() -> Self {
        Self
    }

    /// Match a tool id against a single entry
    pub fn matches(&self, pattern: &str, tool_id: &str) -> bool {
        Self::match_bytes(pattern.as_bytes(), tool_id.as_bytes())
    }

    fn match_bytes(pattern: &[u8], tool_id: &[u8]) -> bool {
        match (pattern.first(), tool_id.first()) {
            (None, None) => true,
            (None, Some(_)) => false,
            (Some(&b'*'), None) => Self::match_bytes(&pattern[1..], tool_id),
            (Some(_), None) => false,
            (Some(&b'*'), Some(_)) => {
                Self::match_bytes(&pattern[1..], tool_id) || Self::match_bytes(pattern, &tool_id[1..])
            }
            (Some(&b'?'), Some(_)) => Self::match_bytes(&pattern[1..], &tool_id[1..]),
            (Some(&p), Some(&t)) if p == t => Self::match_bytes(&pattern[1..], &tool_id[1..]),
            _ => false,
        }
    }

    /// Validate an entry before it is stored in a template
    ///
    /// Bracket classes are not supported, so they are rejected rather than
    /// silently matched as literals.
    pub fn validate_pattern(&self, pattern: &str) -> Result<()> {
        if pattern.trim().is_empty() {
            return Err(Error::InvalidGlobPattern(
                "Pattern cannot be empty".to_string(),
            ));
        }
        if pattern.chars().any(char::is_whitespace) {
            return Err(Error::InvalidGlobPattern(format!(
                "Pattern '{}' contains whitespace",
                pattern
            )));
        }
        if pattern.contains('[') || pattern.contains(']') {
            return Err(Error::InvalidGlobPattern(format!(
                "Pattern '{}' uses unsupported bracket syntax",
                pattern
            )));
        }
        Ok(())
    }

    /// Return the most specific entry matching the tool id
    ///
    /// Literal entries beat patterns, fewer `*` beat more, more `?` beat
    /// fewer, and longer entries beat shorter ones. The first entry wins ties.
    pub fn most_specific_match<'a, S: AsRef<str>>(
        &self,
        patterns: &'a [S],
        tool_id: &str,
    ) -> Option<&'a str> {
        let mut best: Option<(&'a str, Specificity)> = None;

        for pattern in patterns.iter().map(AsRef::as_ref) {
            if !self.matches(pattern, tool_id) {
                continue;
            }
            let specificity = Specificity::of(pattern);
            match best {
                Some((_, current)) if specificity <= current => {}
                _ => best = Some((pattern, specificity)),
            }
        }

        best.map(|(pattern, _)| pattern)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Specificity {
    is_literal: bool,
    star_count: usize,
    question_count: usize,
    len: usize,
}

impl Specificity {
    fn of(pattern: &str) -> Self {
        let star_count = pattern.matches('*').count();
        let question_count = pattern.matches('?').count();
        Self {
            is_literal: star_count == 0 && question_count == 0,
            star_count,
            question_count,
            len: pattern.len(),
        }
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.is_literal
            .cmp(&other.is_literal)
            .then_with(|| other.star_count.cmp(&self.star_count))
            .then_with(|| self.question_count.cmp(&other.question_count))
            .then_with(|| self.len.cmp(&other.len))
    }
}
