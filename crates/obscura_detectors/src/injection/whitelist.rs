//! # Injection Whitelist
//!
//! The build pipeline writes a manifest of every library the shipped game
//! is expected to load. Runtime only reads it.
//!
//! ## Manifest Format
//!
//! ```text
//! # generated by the build pipeline
//! libc.so.6
//! libgame.so
//! ```
//!
//! One name per line. Blank lines and `#` comments are ignored. Paths are
//! reduced to their file name, comparison is case-insensitive.

use crate::error::{DetectorError, DetectorResult};
use std::collections::HashSet;

/// Ordered set of expected library names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InjectionWhitelist {
    /// Names in manifest order, normalized.
    names: Vec<String>,
    /// Lookup set.
    lookup: HashSet<String>,
}

impl InjectionWhitelist {
    /// Parses a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the manifest lists no
    /// library: an empty whitelist would flag everything.
    pub fn from_manifest(manifest: &str) -> DetectorResult<Self> {
        let whitelist = Self::from_names(
            manifest
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        );
        if whitelist.is_empty() {
            return Err(DetectorError::InvalidConfig(
                "injection whitelist manifest lists no libraries".to_string(),
            ));
        }
        Ok(whitelist)
    }

    /// Builds a whitelist from names, keeping first-seen order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut whitelist = Self::default();
        for name in names {
            let normalized = normalize_library_name(name.as_ref());
            if !normalized.is_empty() && whitelist.lookup.insert(normalized.clone()) {
                whitelist.names.push(normalized);
            }
        }
        whitelist
    }

    /// Returns true if `library` (name or path) is expected.
    #[must_use]
    pub fn contains(&self, library: &str) -> bool {
        self.lookup.contains(&normalize_library_name(library))
    }

    /// Names in manifest order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Renders the manifest text the build pipeline would write.
    #[must_use]
    pub fn to_manifest(&self) -> String {
        let mut out = String::from("# injection whitelist\n");
        for name in &self.names {
            out.push_str(name);
            out.push('\n');
        }
        out
    }
}

/// Reduces a path to a lowercase file name.
#[must_use]
pub fn normalize_library_name(library: &str) -> String {
    library
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
