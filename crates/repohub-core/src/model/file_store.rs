//! Insertion-ordered, name-unique collection of text files.
//!
//! A [`FileStore`] is owned by exactly one branch. It performs no logging;
//! callers record commit entries and operation records themselves.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::File;
use crate::error::{CoreError, CoreResult};

/// Ordered map of file name to [`File`].
///
/// Serializes as a plain list of files in insertion order. Equality is
/// order-sensitive.
#[derive(Clone, Debug, Default, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<File>", into = "Vec<File>")]
pub struct FileStore {
    files: IndexMap<String, File>,
}

impl FileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new file.
    ///
    /// # Errors
    /// Returns [`CoreError::FileExists`] if a file with this name is present.
    pub fn create(&mut self, name: &str, content: &str) -> CoreResult<()> {
        if self.files.contains_key(name) {
            return Err(CoreError::FileExists {
                name: name.to_owned(),
            });
        }
        self.files
            .insert(name.to_owned(), File::new(name, content));
        Ok(())
    }

    /// Replace a file's content, returning the content it had before.
    ///
    /// # Errors
    /// Returns [`CoreError::FileNotFound`] if no such file exists.
    pub fn edit(&mut self, name: &str, content: &str) -> CoreResult<String> {
        let file = self
            .files
            .get_mut(name)
            .ok_or_else(|| CoreError::file_not_found(name))?;
        Ok(std::mem::replace(&mut file.content, content.to_owned()))
    }

    /// Remove a file and return it. The order of the remaining files is kept.
    ///
    /// # Errors
    /// Returns [`CoreError::FileNotFound`] if no such file exists.
    pub fn delete(&mut self, name: &str) -> CoreResult<File> {
        self.files
            .shift_remove(name)
            .ok_or_else(|| CoreError::file_not_found(name))
    }

    /// Like [`delete`](Self::delete), but also returns the position the
    /// file held.
    ///
    /// # Errors
    /// Returns [`CoreError::FileNotFound`] if no such file exists.
    pub fn delete_full(&mut self, name: &str) -> CoreResult<(usize, File)> {
        self.files
            .shift_remove_full(name)
            .map(|(index, _, file)| (index, file))
            .ok_or_else(|| CoreError::file_not_found(name))
    }

    /// Add a new file at `index`, shifting later files back. An index past
    /// the end appends.
    ///
    /// # Errors
    /// Returns [`CoreError::FileExists`] if a file with this name is present.
    pub fn insert_at(&mut self, index: usize, name: &str, content: &str) -> CoreResult<()> {
        if self.files.contains_key(name) {
            return Err(CoreError::FileExists {
                name: name.to_owned(),
            });
        }
        let index = index.min(self.files.len());
        self.files
            .shift_insert(index, name.to_owned(), File::new(name, content));
        Ok(())
    }

    /// File names in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.keys().map(String::as_str)
    }

    /// Files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &File> + '_ {
        self.files.values()
    }

    /// Look up a file by exact name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&File> {
        self.files.get(name)
    }

    /// Insert or overwrite a file. Returns `true` if a file was overwritten.
    pub(crate) fn upsert(&mut self, name: &str, content: &str) -> bool {
        match self.files.get_mut(name) {
            Some(file) => {
                content.clone_into(&mut file.content);
                true
            }
            None => {
                self.files
                    .insert(name.to_owned(), File::new(name, content));
                false
            }
        }
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the store holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl PartialEq for FileStore {
    fn eq(&self, other: &Self) -> bool {
        self.files.iter().eq(other.files.iter())
    }
}

impl From<Vec<File>> for FileStore {
    fn from(files: Vec<File>) -> Self {
        Self {
            files: files.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }
}

impl From<FileStore> for Vec<File> {
    fn from(store: FileStore) -> Self {
        store.files.into_values().collect()
    }
}
