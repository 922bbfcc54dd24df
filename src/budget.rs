//! Budget structure: category -> subcategory -> fixed monthly charge.
//!
//! The structure doubles as the grouping taxonomy for category summaries.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::taxonomy::Taxonomy;

/// Subcategory that collects records carrying no subcategory of their own.
pub const CATCH_ALL_SUBCATEGORY: &str = "autre";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetStructure {
    pub categories: BTreeMap<String, BTreeMap<String, f64>>,
}

impl BudgetStructure {
    /// Read the structure from `path`. A missing or unreadable file yields an
    /// empty structure.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<Self>(&s).map_err(|e| e.to_string()));
        match parsed {
            Ok(structure) => structure,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable budget file");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{json}\n"))?;
        Ok(())
    }

    /// One catch-all subcategory with no fixed charge per taxonomy category.
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        let categories = taxonomy
            .categories()
            .iter()
            .map(|c| {
                let mut subs = BTreeMap::new();
                subs.insert(CATCH_ALL_SUBCATEGORY.to_string(), 0.0);
                (c.clone(), subs)
            })
            .collect();
        Self { categories }
    }

    /// The structure at `path`, or the taxonomy-derived one when that file
    /// defines nothing.
    pub fn load_or_taxonomy(path: &Path, taxonomy: &Taxonomy) -> Self {
        let loaded = Self::load(path);
        if loaded.is_empty() {
            Self::from_taxonomy(taxonomy)
        } else {
            loaded
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn fixed_charges(&self, category: &str) -> f64 {
        self.categories
            .get(category)
            .map(|subs| subs.values().sum())
            .unwrap_or(0.0)
    }

    pub fn total_fixed_charges(&self) -> f64 {
        self.categories.values().flat_map(|subs| subs.values()).sum()
    }
}
