//! API credentials, read from the environment only.
//!
//! | Source      | Variable              |
//! |-------------|-----------------------|
//! | PhysRisk    | `PHYSRISK_API_KEY`    |
//! | Trafilatura | `TRAFILATURA_API_KEY` |
//! | Watchman    | `WATCHMAN_API_KEY`    |
//!
//! Tokens are never written to the config file and never logged.

use std::collections::BTreeMap;
use std::fmt;

use unisearch_engine::{AggregatorBuilder, Source};

/// Environment variable holding each source's bearer token.
pub const CREDENTIAL_ENV_VARS: [(Source, &str); 3] = [
    (Source::PhysRisk, "PHYSRISK_API_KEY"),
    (Source::Trafilatura, "TRAFILATURA_API_KEY"),
    (Source::Watchman, "WATCHMAN_API_KEY"),
];

/// Bearer tokens per source.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    tokens: BTreeMap<Source, String>,
}

impl Credentials {
    /// Read tokens from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read tokens through `lookup`, which maps a variable name to its
    /// value. Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tokens = CREDENTIAL_ENV_VARS
            .iter()
            .filter_map(|&(source, var)| {
                let token = lookup(var)?;
                let token = token.trim();
                (!token.is_empty()).then(|| (source, token.to_owned()))
            })
            .collect();
        Self { tokens }
    }

    pub fn get(&self, source: Source) -> Option<&str> {
        self.tokens.get(&source).map(String::as_str)
    }

    /// Sources that have a token.
    pub fn sources(&self) -> Vec<Source> {
        self.tokens.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Register every token on an aggregator under construction.
    pub fn apply(&self, mut builder: AggregatorBuilder) -> AggregatorBuilder {
        for (source, token) in &self.tokens {
            builder = builder.credential(*source, token.clone());
        }
        builder
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.tokens.keys().map(|source| (source, "<redacted>")))
            .finish()
    }
}
