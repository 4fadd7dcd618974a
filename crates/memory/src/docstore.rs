//! Named JSON document store — the persisted-memory substrate.
//!
//! One pretty-printed JSON file per document under a data directory.
//! Deliberately generic: callers bring their own document shape (memory
//! exports, preset snapshots), this store only does names and bytes.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use recap_domain::error::{Error, Result};

pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Open a store over `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::Storage(format!("creating {}: {e}", dir.display())))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Names are plain file stems; anything that could escape the data
    /// directory (separators, `.`/`..` components) is rejected.
    fn doc_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(Error::InvalidParam(format!(
                "invalid document name {name:?}"
            )));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// Load a named document, `None` when it does not exist.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.doc_path(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("reading {name}: {e}")))?;
        let doc = serde_json::from_str(&raw)
            .map_err(|e| Error::Storage(format!("malformed document {name}: {e}")))?;
        Ok(Some(doc))
    }

    /// Create an empty document, resolving name collisions with a numeric
    /// suffix. Returns the name actually used.
    pub fn create(&self, name: &str) -> Result<String> {
        let mut candidate = name.to_owned();
        let mut n = 1usize;
        while self.doc_path(&candidate)?.exists() {
            n += 1;
            candidate = format!("{name}-{n}");
        }
        self.write_raw(&candidate, "{}")?;
        Ok(candidate)
    }

    /// Write a document, overwriting any existing one of that name.
    pub fn save<T: Serialize>(&self, name: &str, doc: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| Error::Storage(format!("serializing {name}: {e}")))?;
        self.write_raw(name, &json)
    }

    /// Delete a named document. Missing documents are not an error.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.doc_path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .map_err(|e| Error::Storage(format!("deleting {name}: {e}")))?;
        Ok(true)
    }

    /// All document names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| Error::Storage(format!("listing {}: {e}", self.dir.display())))?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn write_raw(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::write(self.doc_path(name)?, contents)
            .map_err(|e| Error::Storage(format!("writing {name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let mut doc = BTreeMap::new();
        doc.insert("k".to_string(), "v".to_string());
        store.save("memories", &doc).unwrap();

        let loaded: BTreeMap<String, String> = store.load("memories").unwrap().unwrap();
        assert_eq!(loaded.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        let loaded: Option<serde_json::Value> = store.load("nope").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let res: Result<Option<serde_json::Value>> = store.load("bad");
        assert!(matches!(res, Err(Error::Storage(_))));
    }

    #[test]
    fn create_numbers_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        assert_eq!(store.create("book").unwrap(), "book");
        assert_eq!(store.create("book").unwrap(), "book-2");
        assert_eq!(store.create("book").unwrap(), "book-3");
    }

    #[test]
    fn names_with_path_components_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        for name in ["../escape", "a/b", "a\\b", "..", ".", ""] {
            let res = store.create(name);
            assert!(matches!(res, Err(Error::InvalidParam(_))), "{name:?}");
        }
        assert!(!dir.path().parent().unwrap().join("escape.json").exists());
    }

    #[test]
    fn list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        store.create("a").unwrap();
        store.create("b").unwrap();

        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.list().unwrap(), vec!["b"]);
    }
}
