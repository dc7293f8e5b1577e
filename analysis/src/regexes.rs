//! Compilation and memoization of user-supplied regular expressions.
//!
//! Rule files are regex-heavy and the same pattern tends to appear in many
//! sections (binary scopes especially), so compilation is cached. A
//! compiled [`Regex`] clones cheaply and matches without interior
//! mutability, which is what lets a built rule set be shared across
//! threads with no synchronization.

use std::collections::HashMap;

use regex::Regex;

/// A memoizing compiler for user-supplied patterns.
///
/// Owned by the rule parser for the duration of one read; the compiled
/// regexes it hands out are owned by the rules that hold them.
#[derive(Debug, Default)]
pub struct RegexCache {
    compiled: HashMap<String, Regex>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern`, reusing a previous compilation of the same
    /// source if there was one.
    pub fn compile(&mut self, pattern: &str) -> Result<Regex, regex::Error> {
        if let Some(re) = self.compiled.get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(pattern)?;
        self.compiled.insert(pattern.to_string(), re.clone());
        Ok(re)
    }

    /// Number of distinct patterns compiled so far.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Build a pattern equivalent to set membership: a string matches the
/// result iff it is one of `strings`, verbatim.
///
/// The empty set yields `^_^`, which matches nothing.
pub fn pattern_from_strings<S: AsRef<str>>(strings: &[S]) -> String {
    if strings.is_empty() {
        return "^_^".to_string();
    }
    let mut pattern = String::from("^(");
    for (i, s) in strings.iter().enumerate() {
        if i > 0 {
            pattern.push('|');
        }
        pattern.push_str(&regex::escape(s.as_ref()));
    }
    pattern.push_str(")$");
    pattern
}

/// Serde adapter for `Option<Regex>` fields: a compiled regex serializes
/// as its pattern source and deserializes by recompiling.
pub mod serde_pattern {
    use regex::Regex;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(re: &Option<Regex>, serializer: S) -> Result<S::Ok, S::Error> {
        re.as_ref().map(Regex::as_str).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Regex>, D::Error> {
        let pattern: Option<String> = Option::deserialize(deserializer)?;
        pattern
            .map(|p| Regex::new(&p).map_err(serde::de::Error::custom))
            .transpose()
    }
}
