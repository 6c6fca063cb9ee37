//! Static, process-wide category catalog (I4).

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub fallback: bool,
}

/// Read-only after construction. Any category id returned by the oracle that
/// isn't a key here is remapped to `fallback_id` (I4).
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    names: HashMap<i32, String>,
    fallback_id: i32,
}

impl CategoryCatalog {
    pub fn from_entries(entries: Vec<CategoryEntry>) -> AppResult<Self> {
        if entries.is_empty() {
            return Err(AppError::CatalogError(
                "catalog must define at least one category".into(),
            ));
        }

        let mut names = HashMap::with_capacity(entries.len());
        let mut fallback_id = None;

        for entry in &entries {
            if names.insert(entry.id, entry.name.clone()).is_some() {
                return Err(AppError::CatalogError(format!(
                    "duplicate category id {}",
                    entry.id
                )));
            }
            if entry.fallback {
                if fallback_id.is_some() {
                    return Err(AppError::CatalogError(
                        "catalog must mark exactly one fallback category".into(),
                    ));
                }
                fallback_id = Some(entry.id);
            }
        }

        let fallback_id = fallback_id.ok_or_else(|| {
            AppError::CatalogError("catalog must mark exactly one fallback category".into())
        })?;

        Ok(Self { names, fallback_id })
    }

    pub fn fallback_id(&self) -> i32 {
        self.fallback_id
    }

    pub fn contains(&self, id: i32) -> bool {
        self.names.contains_key(&id)
    }

    pub fn name(&self, id: i32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Map an id to itself if known, otherwise to the fallback id (I4).
    pub fn normalize(&self, id: i32) -> i32 {
        if self.contains(id) { id } else { self.fallback_id }
    }
}
