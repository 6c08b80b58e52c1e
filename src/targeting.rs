//! Selects appliances by glob pattern, e.g. `ns-prod-*`.

use glob::{Pattern, PatternError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid target pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        source: PatternError,
    },

    #[error("no configured appliance matches {0}")]
    NoMatch(String),
}

/// A compiled glob pattern over appliance names.
///
/// Supports `*` (any run of characters), `?` (any one character), and bracketed classes such as
/// `[abc]`, `[a-c]`, and `[!abc]`. A pattern must match the whole name.
#[derive(Clone, Debug)]
pub struct Target {
    pattern: Pattern,
}

impl Target {
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        let pattern = Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Target { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches(name)
    }

    /// Returns the names in `names` that match, in their original order.
    ///
    /// Returns an error if none match.
    pub fn select<'a, S: AsRef<str>>(&self, names: &'a [S]) -> Result<Vec<&'a str>, Error> {
        let selected: Vec<&str> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.matches(name))
            .collect();
        match selected.is_empty() {
            true => Err(Error::NoMatch(self.pattern().to_owned())),
            false => Ok(selected),
        }
    }
}
