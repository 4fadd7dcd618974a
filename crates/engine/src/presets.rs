//! Named configuration presets.
//!
//! A preset snapshots the tunable config sections (generation,
//! summarization, retrieval) so different chats can switch styles without
//! editing the config file. The whole book lives in a single document so
//! listing is one read.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recap_domain::config::{Config, GenerationConfig, RetrievalConfig, SummarizationConfig};
use recap_domain::error::{Error, Result};
use recap_memory::DocumentStore;

/// The config sections a preset captures. Storage paths stay out: a preset
/// describes behavior, not where data lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetSettings {
    pub generation: GenerationConfig,
    pub summarization: SummarizationConfig,
    pub retrieval: RetrievalConfig,
}

impl PresetSettings {
    pub fn snapshot(config: &Config) -> Self {
        Self {
            generation: config.generation.clone(),
            summarization: config.summarization.clone(),
            retrieval: config.retrieval.clone(),
        }
    }

    /// Overlay these settings onto a config, leaving storage untouched.
    pub fn apply(&self, config: &mut Config) {
        config.generation = self.generation.clone();
        config.summarization = self.summarization.clone();
        config.retrieval = self.retrieval.clone();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub settings: PresetSettings,
}

/// All presets, keyed by name. Persisted as one document.
pub type PresetBook = BTreeMap<String, Preset>;

/// Preset persistence over a [`DocumentStore`].
pub struct Presets {
    store: DocumentStore,
    doc_name: String,
}

impl Presets {
    pub fn new(store: DocumentStore, doc_name: &str) -> Self {
        Self {
            store,
            doc_name: doc_name.to_owned(),
        }
    }

    fn book(&self) -> Result<PresetBook> {
        Ok(self.store.load(&self.doc_name)?.unwrap_or_default())
    }

    /// Save the current config sections under `name`, overwriting any
    /// existing preset of that name.
    pub fn save(&self, name: &str, config: &Config) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidParam("preset name must not be empty".into()));
        }
        let mut book = self.book()?;
        book.insert(
            name.to_owned(),
            Preset {
                name: name.to_owned(),
                created_at: Utc::now(),
                settings: PresetSettings::snapshot(config),
            },
        );
        self.store.save(&self.doc_name, &book)
    }

    pub fn get(&self, name: &str) -> Result<Option<Preset>> {
        Ok(self.book()?.remove(name))
    }

    /// Apply a named preset to the config. Errors when the preset does not
    /// exist.
    pub fn apply(&self, name: &str, config: &mut Config) -> Result<()> {
        let preset = self
            .get(name)?
            .ok_or_else(|| Error::InvalidParam(format!("no preset named '{name}'")))?;
        preset.settings.apply(config);
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<bool> {
        let mut book = self.book()?;
        let removed = book.remove(name).is_some();
        if removed {
            self.store.save(&self.doc_name, &book)?;
        }
        Ok(removed)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.book()?.keys().cloned().collect())
    }

    /// Write a single preset to a standalone JSON file for sharing.
    pub fn export(&self, name: &str, path: &Path) -> Result<()> {
        let preset = self
            .get(name)?
            .ok_or_else(|| Error::InvalidParam(format!("no preset named '{name}'")))?;
        let json = serde_json::to_string_pretty(&preset)
            .map_err(|e| Error::Storage(format!("serializing preset {name}: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| Error::Storage(format!("writing {}: {e}", path.display())))?;
        Ok(())
    }

    /// Read a preset file produced by [`Presets::export`] and add it to the
    /// book under its embedded name, overwriting any existing preset.
    /// Returns that name.
    pub fn import(&self, path: &Path) -> Result<String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("reading {}: {e}", path.display())))?;
        let preset: Preset = serde_json::from_str(&raw)
            .map_err(|e| Error::Storage(format!("malformed preset file: {e}")))?;

        let mut book = self.book()?;
        let name = preset.name.clone();
        book.insert(name.clone(), preset);
        self.store.save(&self.doc_name, &book)?;
        Ok(name)
    }
}
