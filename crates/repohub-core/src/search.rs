//! Case-insensitive name index and file search.
//!
//! [`SearchIndex`] holds repository names keyed by their lowercase form, so
//! existence checks and substring queries ignore case while results keep the
//! original spelling. File search is not indexed: [`search_files`] scans a
//! branch's [`FileStore`] directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::file_store::FileStore;

/// Ordered, case-insensitive set of names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchIndex {
    /// lowercase key -> name as registered
    names: BTreeMap<String, String>,
}

impl SearchIndex {
    /// Create an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    /// Register a name. Returns `false` (and changes nothing) if a name equal
    /// ignoring case is already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let key = fold(name);
        if self.names.contains_key(&key) {
            return false;
        }
        self.names.insert(key, name.to_owned());
        true
    }

    /// Remove a name (matched ignoring case). Returns `true` if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(&fold(name)).is_some()
    }

    /// Exact existence check, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&fold(name))
    }

    /// All registered names whose lowercase form contains `term` lowercased,
    /// in case-insensitive order. An empty term matches everything.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<String> {
        let needle = fold(term);
        self.names
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Which part of a file [`search_files`] matches against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTarget {
    /// Match the file name.
    #[default]
    Name,
    /// Match the file content.
    Content,
}

/// Names of files whose name (or content) contains `term`, ignoring case,
/// in store order.
#[must_use]
pub fn search_files(store: &FileStore, term: &str, target: SearchTarget) -> Vec<String> {
    let needle = fold(term);
    store
        .iter()
        .filter(|f| {
            let haystack = match target {
                SearchTarget::Name => &f.name,
                SearchTarget::Content => &f.content,
            };
            fold(haystack).contains(&needle)
        })
        .map(|f| f.name.clone())
        .collect()
}
