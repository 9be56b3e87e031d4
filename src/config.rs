//! Store configuration.
//!
//! Everything the store needs to know about its environment is passed in
//! through [`StoreConfig`]; there are no process-wide paths or singletons.

use std::path::{Path, PathBuf};

/// File name used inside the data folder unless overridden
pub const DEFAULT_FILE_NAME: &str = "inventory_data.csv";

/// Threshold used when the data file carries no LOWSTOCK record
pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 5;

/// Categories the original shop started with
pub const SHOP_CATEGORIES: [&str; 4] = ["Engine Parts", "Electrical", "Body Parts", "Accessories"];

/// What happens to a category once its last item is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyCategoryPolicy {
    /// Delete the category (the sentinel category is exempt)
    #[default]
    Remove,
    /// Keep it with a zero aggregate
    Keep,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
    pub default_low_stock_threshold: u64,
    pub empty_category_policy: EmptyCategoryPolicy,
    /// Created on open when the loaded state has no categories besides the sentinel
    pub seed_categories: Vec<String>,
}

/// Returns the default data folder: ~/.local/share/parts_inventory (or platform equivalent)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parts_inventory")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            default_low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            empty_category_policy: EmptyCategoryPolicy::default(),
            seed_categories: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Config rooted at `data_dir` with all other settings defaulted
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_low_stock_threshold(mut self, threshold: u64) -> Self {
        self.default_low_stock_threshold = threshold;
        self
    }

    pub fn with_empty_category_policy(mut self, policy: EmptyCategoryPolicy) -> Self {
        self.empty_category_policy = policy;
        self
    }

    pub fn with_seed_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_categories = names.into_iter().map(Into::into).collect();
        self
    }

    /// Full path of the backing data file
    pub fn data_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}
