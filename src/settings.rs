use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CarnetError, Result};
use crate::schema::Schema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Schema used when creating the live file.
    #[serde(default)]
    pub schema: Schema,
    /// Account names of legacy files mapped onto configured accounts on import.
    #[serde(default)]
    pub legacy_accounts: BTreeMap<String, String>,
}

pub fn default_accounts() -> Vec<String> {
    ["Commun", "Luc", "Laura"].iter().map(|s| s.to_string()).collect()
}

pub fn default_categories() -> Vec<String> {
    [
        "Maison",
        "Transport",
        "Santé",
        "Restaurant",
        "Courses",
        "Bien-être",
        "Culture",
        "Sport",
        "Shopping",
        "Saucisse",
        "Liquide",
        "Economie",
        "Cadeau",
        "Autre",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_category() -> String {
    "Autre".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            accounts: default_accounts(),
            categories: default_categories(),
            default_category: default_category(),
            schema: Schema::default(),
            legacy_accounts: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_path().join("Expenses").join("expenses_working.csv")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.data_path().join("History")
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.data_path().join("Summary")
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.data_path().join("charts")
    }

    pub fn budget_file(&self) -> PathBuf {
        self.data_path().join("budget").join("initial_budget.json")
    }

    /// Schema for writing the live file. Legacy files are import-only.
    pub fn live_schema(&self) -> Schema {
        match self.schema {
            Schema::Legacy => Schema::Standard,
            s => s,
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.data_path().join("Expenses"),
            self.history_dir(),
            self.summary_dir(),
            self.data_path().join("budget"),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("carnet")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("carnet")
}

/// Saved settings, or the defaults when there are none or they do not parse.
pub fn load_settings() -> Settings {
    let path = settings_path();
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Settings::default();
    };
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CarnetError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
