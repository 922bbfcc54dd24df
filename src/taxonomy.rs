//! The closed sets of accounts and categories an expense may belong to.
//!
//! Built once from [`Settings`](crate::settings::Settings) and passed to
//! whatever needs it. Values outside the sets are coerced, never rejected.

use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    accounts: Vec<String>,
    categories: Vec<String>,
    default_category: String,
}

/// Result of resolving user input against a closed set.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: String,
    pub defaulted: bool,
}

impl Taxonomy {
    /// Empty account or category lists fall back to the built-in defaults so
    /// that the primary account and the default category always exist.
    pub fn new(accounts: Vec<String>, categories: Vec<String>, default_category: &str) -> Self {
        let accounts = if accounts.is_empty() {
            crate::settings::default_accounts()
        } else {
            accounts
        };
        let mut categories = if categories.is_empty() {
            crate::settings::default_categories()
        } else {
            categories
        };
        if !categories.iter().any(|c| c == default_category) {
            categories.push(default_category.to_string());
        }
        Self {
            accounts,
            categories,
            default_category: default_category.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.accounts.clone(),
            settings.categories.clone(),
            &settings.default_category,
        )
    }

    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn primary_account(&self) -> &str {
        &self.accounts[0]
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn coerce_account(&self, name: &str) -> Choice {
        match self.accounts.iter().find(|a| a.as_str() == name.trim()) {
            Some(a) => Choice { value: a.clone(), defaulted: false },
            None => Choice { value: self.primary_account().to_string(), defaulted: true },
        }
    }

    pub fn coerce_category(&self, name: &str) -> Choice {
        match self.categories.iter().find(|c| c.as_str() == name.trim()) {
            Some(c) => Choice { value: c.clone(), defaulted: false },
            None => Choice { value: self.default_category.clone(), defaulted: true },
        }
    }

    /// Resolve an account typed at the prompt: a 1-based menu number or the
    /// account name itself (case-insensitive).
    pub fn account_from_input(&self, input: &str) -> Choice {
        resolve(input, &self.accounts).unwrap_or_else(|| Choice {
            value: self.primary_account().to_string(),
            defaulted: true,
        })
    }

    /// Resolve a category typed at the prompt, like [`Self::account_from_input`].
    pub fn category_from_input(&self, input: &str) -> Choice {
        resolve(input, &self.categories).unwrap_or_else(|| Choice {
            value: self.default_category.clone(),
            defaulted: true,
        })
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn resolve(input: &str, set: &[String]) -> Option<Choice> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return set.get(n.checked_sub(1)?).map(|v| Choice {
            value: v.clone(),
            defaulted: false,
        });
    }
    set.iter()
        .find(|v| v.to_lowercase() == input.to_lowercase())
        .map(|v| Choice { value: v.clone(), defaulted: false })
}
