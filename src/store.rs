//! In-memory inventory store backed by a single flat file.
//!
//! - Every operation validates its input before touching any state, so a
//!   rejected call leaves memory and file exactly as they were.
//! - Every successful mutation rewrites the whole data file. If that write
//!   fails the error is returned, but the in-memory change stands and is
//!   written again by the next mutation.
//! - Category aggregates are re-derived from the item list after each
//!   structural change instead of being patched with deltas.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::codec::{self, EncodeOptions, LoadReport};
use crate::config::{EmptyCategoryPolicy, StoreConfig};
use crate::error::{InventoryError, Result};
use crate::exchange;
use crate::models::{
    keys_match, Category, InventoryState, Item, ItemUpdate, TransactionAction,
    TransactionLogEntry,
};
use crate::restock::{needs_restock, RestockAnalysis, RestockStats};

/// Store handle for callers on more than one thread; lock once per operation.
pub type SharedStore = Arc<Mutex<InventoryStore>>;

/// Outcome of an item import
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows whose model number is already in the inventory
    pub duplicates: usize,
    /// Rows that could not be parsed
    pub invalid: usize,
}

pub struct InventoryStore {
    config: StoreConfig,
    state: InventoryState,
}

fn require_text<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::InvalidArgument(format!(
            "{what} cannot be empty"
        )));
    }
    Ok(trimmed)
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(InventoryError::InvalidArgument(format!(
            "Price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

fn non_negative(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        InventoryError::InvalidArgument(format!("{what} cannot be negative, got {value}"))
    })
}

/// Trims the text fields and checks every constraint on a new item.
fn validated_item(item: Item) -> Result<Item> {
    let model_number = require_text(&item.model_number, "Model number")?.to_string();
    let model_name = require_text(&item.model_name, "Model name")?.to_string();
    let category = require_text(&item.category, "Category")?.to_string();
    validate_price(item.price)?;
    Ok(Item {
        model_number,
        model_name,
        price: item.price,
        quantity: item.quantity,
        category,
    })
}

impl InventoryStore {
    /// Opens the store and loads the data file. Never fails: unreadable data
    /// degrades to an empty inventory.
    pub fn open(config: StoreConfig) -> Self {
        let mut store = Self {
            state: InventoryState::empty(config.default_low_stock_threshold),
            config,
        };
        store.load_data();

        let only_sentinel = store.state.categories.iter().all(Category::is_sentinel);
        if only_sentinel && !store.config.seed_categories.is_empty() {
            let seeds = store.config.seed_categories.clone();
            for name in seeds.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
                store.state.ensure_category(name);
            }
            log::info!("Seeded {} default categories", seeds.len());
        }
        store
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn data_file_path(&self) -> PathBuf {
        self.config.data_file_path()
    }

    pub fn state(&self) -> &InventoryState {
        &self.state
    }

    pub fn items(&self) -> &[Item] {
        &self.state.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.state.categories
    }

    pub fn transaction_log(&self) -> &[TransactionLogEntry] {
        &self.state.log
    }

    pub fn low_stock_threshold(&self) -> u64 {
        self.state.low_stock_threshold
    }

    pub fn find_item(&self, model_number: &str) -> Option<&Item> {
        self.state.find_item(model_number.trim())
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.state.find_category(name.trim())
    }

    // ==================== Persistence ====================

    /// Replaces the whole in-memory state with the contents of the data file.
    pub fn load_data(&mut self) -> LoadReport {
        let path = self.data_file_path();
        let threshold = self.config.default_low_stock_threshold;
        let (state, report) = match codec::read_state(&path, threshold) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::warn!("Could not load inventory, starting empty: {e}");
                (InventoryState::empty(threshold), LoadReport::default())
            }
        };
        self.state = state;

        if report.skipped_lines > 0 {
            log::warn!(
                "Skipped {} unreadable line(s) in {}",
                report.skipped_lines,
                path.display()
            );
        }
        log::info!(
            "Loaded {} items, {} categories, {} log entries from {}",
            self.state.items.len(),
            self.state.categories.len(),
            self.state.log.len(),
            path.display()
        );
        report
    }

    /// Rewrites the data file with the complete current state.
    pub fn save_data(&mut self) -> Result<()> {
        let dir = &self.config.data_dir;
        let folder = std::path::absolute(dir).unwrap_or_else(|_| dir.clone());
        self.state.recorded_path = Some(folder.display().to_string());

        let options = EncodeOptions {
            keep_empty_categories: self.config.empty_category_policy == EmptyCategoryPolicy::Keep,
        };
        let path = self.data_file_path();
        codec::write_state(&path, &self.state, options)?;
        log::debug!("Saved inventory to {}", path.display());
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        self.save_data().inspect_err(|e| {
            log::error!("Failed to save inventory, changes are kept in memory: {e}");
        })
    }

    /// Points the store at a new data folder and writes the current state there.
    /// An existing file in that folder is overwritten, not merged.
    pub fn set_data_file_path(&mut self, folder: impl AsRef<Path>) -> Result<()> {
        let folder = folder.as_ref();
        require_text(&folder.to_string_lossy(), "Data folder")?;
        log::info!(
            "Moving data file from {} to {}",
            self.config.data_dir.display(),
            folder.display()
        );
        self.config.data_dir = folder.to_path_buf();
        self.persist()
    }

    // ==================== Items ====================

    pub fn add_item(&mut self, item: Item) -> Result<()> {
        let item = validated_item(item)?;
        if self.state.find_item(&item.model_number).is_some() {
            return Err(InventoryError::DuplicateKey(format!(
                "Item with model number {} already exists",
                item.model_number
            )));
        }

        self.state.ensure_category(&item.category);
        self.state
            .log
            .push(TransactionLogEntry::for_item(TransactionAction::Add, &item));
        log::info!(
            "Added item {} ({}) x{} to {}",
            item.model_number,
            item.model_name,
            item.quantity,
            item.category
        );
        self.state.items.push(item);
        self.state.recompute_aggregates();
        self.persist()
    }

    pub fn remove_item_by_number(&mut self, model_number: &str) -> Result<Item> {
        let model_number = require_text(model_number, "Model number")?;
        let pos = self
            .state
            .items
            .iter()
            .position(|i| keys_match(&i.model_number, model_number))
            .ok_or_else(|| {
                InventoryError::NotFound(format!(
                    "Item with model number {model_number} not found"
                ))
            })?;

        let item = self.state.items.remove(pos);
        self.state.recompute_aggregates();
        self.state
            .log
            .push(TransactionLogEntry::for_item(TransactionAction::Remove, &item));
        self.drop_category_if_empty(&item.category);
        log::info!("Removed item {}", item.model_number);
        self.persist()?;
        Ok(item)
    }

    /// Removes every item in a category, then the category itself.
    pub fn remove_items_by_category(&mut self, category: &str) -> Result<Vec<Item>> {
        let category = require_text(category, "Category")?;
        if !self.state.items.iter().any(|i| i.in_category(category)) {
            return Err(InventoryError::NotFound(format!(
                "No items found in category {category}"
            )));
        }

        let (removed, kept): (Vec<Item>, Vec<Item>) = std::mem::take(&mut self.state.items)
            .into_iter()
            .partition(|i| i.in_category(category));
        self.state.items = kept;

        for item in &removed {
            self.state.log.push(TransactionLogEntry::for_item(
                TransactionAction::RemoveCategoryItem,
                item,
            ));
        }
        self.state.recompute_aggregates();

        if let Some(pos) = self
            .state
            .categories
            .iter()
            .position(|c| keys_match(&c.name, category) && !c.is_sentinel())
        {
            let cat = self.state.categories.remove(pos);
            self.state
                .log
                .push(TransactionLogEntry::category_removed(&cat));
        }

        log::info!("Removed {} item(s) in category {category}", removed.len());
        self.persist()?;
        Ok(removed)
    }

    /// Point lookup by exact model number or model name, ignoring case.
    pub fn search_item(&self, term: &str) -> Result<Option<&Item>> {
        let term = require_text(term, "Search term")?;
        Ok(self
            .state
            .items
            .iter()
            .find(|i| keys_match(&i.model_number, term) || keys_match(&i.model_name, term)))
    }

    pub fn edit_item(&mut self, model_number: &str, update: ItemUpdate) -> Result<()> {
        let model_number = require_text(model_number, "Model number")?;
        let model_name = require_text(&update.model_name, "Model name")?.to_string();
        let category = require_text(&update.category, "Category")?.to_string();
        validate_price(update.price)?;

        let item = self
            .state
            .items
            .iter_mut()
            .find(|i| keys_match(&i.model_number, model_number))
            .ok_or_else(|| {
                InventoryError::NotFound(format!(
                    "Item with model number {model_number} not found"
                ))
            })?;

        let old_category = std::mem::replace(&mut item.category, category);
        item.model_name = model_name;
        item.price = update.price;
        item.quantity = update.quantity;
        let entry = TransactionLogEntry::for_item(TransactionAction::Edit, item);
        let new_category = item.category.clone();

        self.state.ensure_category(&new_category);
        self.state.recompute_aggregates();
        self.state.log.push(entry);
        if !keys_match(&old_category, &new_category) {
            self.drop_category_if_empty(&old_category);
        }
        log::info!("Edited item {model_number}");
        self.persist()
    }

    // ==================== Categories ====================

    pub fn add_category(&mut self, name: &str, initial_quantity: i64) -> Result<()> {
        let name = require_text(name, "Category name")?;
        let quantity = non_negative(initial_quantity, "Initial quantity")?;
        if self.state.find_category(name).is_some() {
            return Err(InventoryError::DuplicateKey(format!(
                "Category {name} already exists"
            )));
        }
        self.state.categories.push(Category::new(name, quantity));
        log::info!("Added category {name}");
        self.persist()
    }

    /// Removes an explicitly named category. Refused while items still use it.
    pub fn remove_category(&mut self, name: &str) -> Result<Category> {
        let name = require_text(name, "Category name")?;
        let pos = self
            .state
            .categories
            .iter()
            .position(|c| keys_match(&c.name, name))
            .ok_or_else(|| InventoryError::NotFound(format!("Category {name} not found")))?;

        let referencing = self.state.items.iter().filter(|i| i.in_category(name)).count();
        if referencing > 0 {
            return Err(InventoryError::CategoryInUse {
                category: self.state.categories[pos].name.clone(),
                items: referencing,
            });
        }

        let category = self.state.categories.remove(pos);
        self.state
            .log
            .push(TransactionLogEntry::category_removed(&category));
        log::info!("Removed category {}", category.name);
        self.persist()?;
        Ok(category)
    }

    /// Applies a manual adjustment to a category aggregate, creating the
    /// category if needed. The result never goes below zero. The next
    /// structural change re-derives the aggregate from the items.
    pub fn update_category_quantity(&mut self, name: &str, delta: i64) -> Result<u64> {
        let name = require_text(name, "Category name")?;
        self.state.ensure_category(name);
        let quantity = match self
            .state
            .categories
            .iter_mut()
            .find(|c| keys_match(&c.name, name))
        {
            Some(category) => {
                category.adjust(delta);
                category.quantity
            }
            None => 0,
        };
        log::debug!("Category {name} adjusted by {delta} to {quantity}");
        self.persist()?;
        Ok(quantity)
    }

    /// Drops a category that no item references any more, unless it is the
    /// sentinel or the policy keeps empty categories.
    fn drop_category_if_empty(&mut self, name: &str) {
        if self.config.empty_category_policy == EmptyCategoryPolicy::Keep {
            return;
        }
        if self.state.items.iter().any(|i| i.in_category(name)) {
            return;
        }
        if let Some(pos) = self
            .state
            .categories
            .iter()
            .position(|c| keys_match(&c.name, name) && !c.is_sentinel())
        {
            let category = self.state.categories.remove(pos);
            log::info!("Category {} is empty and was removed", category.name);
            self.state
                .log
                .push(TransactionLogEntry::category_removed(&category));
        }
    }

    // ==================== Stock levels ====================

    pub fn set_low_stock_threshold(&mut self, value: i64) -> Result<()> {
        let value = non_negative(value, "Low-stock threshold")?;
        let old = self.state.low_stock_threshold;
        self.state.low_stock_threshold = value;
        self.state
            .log
            .push(TransactionLogEntry::threshold_set(old, value));
        log::info!("Low-stock threshold changed from {old} to {value}");
        self.persist()
    }

    /// Categories whose aggregate is strictly below the threshold
    pub fn low_stock_categories(&self) -> Vec<&Category> {
        self.state
            .categories
            .iter()
            .filter(|c| needs_restock(c.quantity, self.state.low_stock_threshold))
            .collect()
    }

    pub fn restock_alerts(&self) -> RestockStats {
        RestockAnalysis::new(&self.state.items).analyze(self.state.low_stock_threshold)
    }

    pub fn total_inventory_worth(&self) -> f64 {
        self.state.items.iter().map(Item::worth).sum()
    }

    // ==================== Exchange ====================

    pub fn export_items_csv(&self, path: impl AsRef<Path>) -> Result<usize> {
        exchange::export_items(path, &self.state.items)?;
        Ok(self.state.items.len())
    }

    /// Adds the items of an exchange file that are not in the inventory yet.
    pub fn import_items_csv(&mut self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let rows = exchange::read_items(path.as_ref())?;
        let mut summary = ImportSummary {
            invalid: rows.skipped,
            ..ImportSummary::default()
        };

        for row in rows.items {
            let item = match validated_item(row) {
                Ok(item) => item,
                Err(e) => {
                    log::warn!("Skipping imported row: {e}");
                    summary.invalid += 1;
                    continue;
                }
            };
            if self.state.find_item(&item.model_number).is_some() {
                log::warn!("Skipping duplicate model number {}", item.model_number);
                summary.duplicates += 1;
                continue;
            }
            self.state.ensure_category(&item.category);
            self.state
                .log
                .push(TransactionLogEntry::for_item(TransactionAction::Add, &item));
            self.state.items.push(item);
            summary.imported += 1;
        }

        log::info!(
            "Imported {} item(s) from {} ({} duplicates, {} invalid)",
            summary.imported,
            path.as_ref().display(),
            summary.duplicates,
            summary.invalid
        );
        if summary.imported > 0 {
            self.state.recompute_aggregates();
            self.persist()?;
        }
        Ok(summary)
    }
}
