//! Run configuration
//!
//! Loaded from a TOML file (`--config`, or `mftax.toml` in the working
//! directory when present). Command-line flags override file values.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::tax::regime::{default_cutoff_date, FundCategory, HoldingThresholds, TaxRules};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "mftax.toml";

/// Input file used when neither the config nor the CLI names one
pub const DEFAULT_INPUT_FILE: &str = "2.xlsx";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cutoff_date: NaiveDate,
    pub input: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub timestamp_filenames: bool,
    pub old_regime: HoldingThresholds,
    pub new_regime: HoldingThresholds,
    /// Exact fund name → category
    pub funds: HashMap<String, FundCategory>,
    /// Substring rules tried when a fund has no exact entry and no category in the input
    pub category_rules: Vec<CategoryRule>,
}

/// Assign a category to every fund whose name contains `contains` (case-insensitive)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRule {
    pub contains: String,
    pub category: FundCategory,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cutoff_date: default_cutoff_date(),
            input: None,
            output_dir: PathBuf::from("."),
            timestamp_filenames: true,
            old_regime: HoldingThresholds::default(),
            new_regime: HoldingThresholds::default(),
            funds: HashMap::new(),
            category_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse configuration TOML")
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading config file: {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the explicit path if given, else the default file if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn tax_rules(&self) -> TaxRules {
        TaxRules {
            cutoff_date: self.cutoff_date,
            old_regime: self.old_regime,
            new_regime: self.new_regime,
        }
    }

    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE))
    }

    pub fn fund_catalog(&self) -> FundCatalog {
        FundCatalog::new(&self.funds, &self.category_rules)
    }
}

/// Resolves a fund's category from the configured lookup table and rules
#[derive(Debug, Clone, Default)]
pub struct FundCatalog {
    exact: HashMap<String, FundCategory>,
    rules: Vec<(String, FundCategory)>,
}

impl FundCatalog {
    pub fn new(funds: &HashMap<String, FundCategory>, rules: &[CategoryRule]) -> Self {
        Self {
            exact: funds
                .iter()
                .map(|(name, category)| (normalize_name(name), *category))
                .collect(),
            rules: rules
                .iter()
                .map(|r| (r.contains.trim().to_lowercase(), r.category))
                .filter(|(needle, _)| !needle.is_empty())
                .collect(),
        }
    }

    /// Whether the fund has an exact `[funds]` entry
    pub fn has_exact(&self, fund_name: &str) -> bool {
        self.exact.contains_key(&normalize_name(fund_name))
    }

    /// Resolve a category.
    ///
    /// Precedence: exact configured name, then the category found in the
    /// input row, then the first matching substring rule.
    pub fn resolve(&self, fund_name: &str, from_input: Option<FundCategory>) -> Option<FundCategory> {
        let key = normalize_name(fund_name);
        if let Some(category) = self.exact.get(&key) {
            return Some(*category);
        }
        if from_input.is_some() {
            return from_input;
        }
        self.rules
            .iter()
            .find(|(needle, _)| key.contains(needle.as_str()))
            .map(|(_, category)| *category)
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
