//! Learned description→category mappings.
//!
//! Every manual correction is remembered here and overrides the keyword
//! rules on later imports. The store is loaded once per categorization pass
//! and flushed after every `record`, so a crash between corrections loses
//! at most the in-flight one. Last write for a key wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HuchaError, Result};
use crate::models::Category;
use crate::namespace;
use crate::storage::{self, Storage};

const MAPPING_CONFIG_KEY: &str = "category_mapping";

/// Persisted shape: `{"learned_mappings": {key: category-name}}`. Anything
/// else fails closed; a guessed-at mapping would silently mis-categorize
/// every future import.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingDocument {
    learned_mappings: BTreeMap<String, String>,
}

/// Mapping key normalization. Must stay identical to what the categorizer
/// looks up with, or corrections stop re-applying.
pub fn normalize_key(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Default)]
pub struct LearnedMappings {
    map: BTreeMap<String, Category>,
}

impl LearnedMappings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the account's mapping document. An absent config table or row
    /// means no corrections yet; a malformed document is an error.
    pub fn load(storage: &dyn Storage, account_key: &str) -> Result<Self> {
        let Some(table) = storage.read(&namespace::config_key(account_key))? else {
            return Ok(Self::empty());
        };
        let Some(json) = storage::config_get(&table, MAPPING_CONFIG_KEY) else {
            return Ok(Self::empty());
        };
        let doc: MappingDocument =
            serde_json::from_str(json).map_err(|e| HuchaError::MappingFormat(e.to_string()))?;
        let mut map = BTreeMap::new();
        for (key, name) in doc.learned_mappings {
            let category = Category::parse(&name)
                .map_err(|_| HuchaError::MappingFormat(format!("unknown category {name:?}")))?;
            map.insert(normalize_key(&key), category);
        }
        Ok(Self { map })
    }

    pub fn lookup(&self, description: &str) -> Option<Category> {
        self.map.get(&normalize_key(description)).copied()
    }

    /// Upsert a correction and flush it immediately.
    pub fn record(
        &mut self,
        storage: &dyn Storage,
        account_key: &str,
        description: &str,
        category: Category,
    ) -> Result<()> {
        self.map.insert(normalize_key(description), category);
        self.save(storage, account_key)
    }

    fn save(&self, storage: &dyn Storage, account_key: &str) -> Result<()> {
        let doc = MappingDocument {
            learned_mappings: self
                .map
                .iter()
                .map(|(k, v)| (k.clone(), v.name().to_string()))
                .collect(),
        };
        let json = serde_json::to_string(&doc).map_err(|e| HuchaError::Other(e.to_string()))?;
        let key = namespace::config_key(account_key);
        let mut table = storage.read(&key)?.unwrap_or_else(storage::empty_config);
        storage::config_set(&mut table, MAPPING_CONFIG_KEY, json);
        storage.write(&key, &table)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
