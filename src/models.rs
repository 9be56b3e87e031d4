use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;

/// Name of the category that is never removed automatically
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Timestamp layout used in the data file and in log output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compares two keys (model numbers, category names) ignoring case
pub fn keys_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Current local time truncated to whole seconds, so it survives a save/load cycle
pub fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// A stock-keeping unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub model_number: String,
    pub model_name: String,
    pub price: f64,
    pub quantity: u32,
    pub category: String,
}

impl Item {
    pub fn new(
        model_number: impl Into<String>,
        model_name: impl Into<String>,
        price: f64,
        quantity: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            model_number: model_number.into(),
            model_name: model_name.into(),
            price,
            quantity,
            category: category.into(),
        }
    }

    /// Value of the stock on hand for this item
    pub fn worth(&self) -> f64 {
        self.price * self.quantity as f64
    }

    pub fn in_category(&self, category: &str) -> bool {
        keys_match(&self.category, category)
    }
}

/// New values for an existing item. The model number is the key and stays fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpdate {
    pub model_name: String,
    pub price: f64,
    pub quantity: u32,
    pub category: String,
}

impl From<&Item> for ItemUpdate {
    fn from(item: &Item) -> Self {
        Self {
            model_name: item.model_name.clone(),
            price: item.price,
            quantity: item.quantity,
            category: item.category.clone(),
        }
    }
}

/// An aggregate bucket of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    /// Sum of the quantities of all items assigned to this category
    pub quantity: u64,
}

impl Category {
    pub fn new(name: impl Into<String>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// Applies a signed change, clamping at zero
    pub fn adjust(&mut self, delta: i64) {
        if delta >= 0 {
            self.quantity = self.quantity.saturating_add(delta.unsigned_abs());
        } else {
            self.quantity = self.quantity.saturating_sub(delta.unsigned_abs());
        }
    }

    pub fn is_sentinel(&self) -> bool {
        keys_match(&self.name, UNCATEGORIZED)
    }
}

/// Kinds of audit records written to the transaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionAction {
    Add,
    Remove,
    Edit,
    RemoveCategoryItem,
    CategoryRemoved,
    LowStockSet,
}

impl TransactionAction {
    /// Returns the token stored in the data file (e.g., "ADD", "REMOVE")
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionAction::Add => "ADD",
            TransactionAction::Remove => "REMOVE",
            TransactionAction::Edit => "EDIT",
            TransactionAction::RemoveCategoryItem => "REMOVE_CATEGORY_ITEM",
            TransactionAction::CategoryRemoved => "CATEGORY_REMOVED",
            TransactionAction::LowStockSet => "LOWSTOCK_SET",
        }
    }

    /// Parse a data file token into an action
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "ADD" => Some(TransactionAction::Add),
            "REMOVE" => Some(TransactionAction::Remove),
            "EDIT" => Some(TransactionAction::Edit),
            "REMOVE_CATEGORY_ITEM" => Some(TransactionAction::RemoveCategoryItem),
            "CATEGORY_REMOVED" => Some(TransactionAction::CategoryRemoved),
            "LOWSTOCK_SET" => Some(TransactionAction::LowStockSet),
            _ => None,
        }
    }
}

/// Old and new values of a low-stock threshold change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdChange {
    pub old: u64,
    pub new: u64,
}

/// An immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionLogEntry {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub action: TransactionAction,
    pub item_name: String,
    pub model_number: String,
    pub quantity: u64,
    pub category: Option<String>,
    pub threshold: Option<ThresholdChange>,
}

impl TransactionLogEntry {
    /// Record for an action on a single item
    pub fn for_item(action: TransactionAction, item: &Item) -> Self {
        Self {
            timestamp: now_timestamp(),
            action,
            item_name: item.model_name.clone(),
            model_number: item.model_number.clone(),
            quantity: u64::from(item.quantity),
            category: Some(item.category.clone()),
            threshold: None,
        }
    }

    pub fn category_removed(category: &Category) -> Self {
        Self {
            timestamp: now_timestamp(),
            action: TransactionAction::CategoryRemoved,
            item_name: String::new(),
            model_number: String::new(),
            quantity: category.quantity,
            category: Some(category.name.clone()),
            threshold: None,
        }
    }

    pub fn threshold_set(old: u64, new: u64) -> Self {
        Self {
            timestamp: now_timestamp(),
            action: TransactionAction::LowStockSet,
            item_name: String::new(),
            model_number: String::new(),
            quantity: new,
            category: None,
            threshold: Some(ThresholdChange { old, new }),
        }
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}

/// Everything persisted in the data file
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryState {
    pub items: Vec<Item>,
    pub categories: Vec<Category>,
    pub log: Vec<TransactionLogEntry>,
    pub low_stock_threshold: u64,
    /// Folder the file was last saved in, as recorded by the file itself
    pub recorded_path: Option<String>,
}

impl InventoryState {
    pub fn empty(low_stock_threshold: u64) -> Self {
        Self {
            items: Vec::new(),
            categories: Vec::new(),
            log: Vec::new(),
            low_stock_threshold,
            recorded_path: None,
        }
    }

    pub fn find_item(&self, model_number: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| keys_match(&i.model_number, model_number))
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| keys_match(&c.name, name))
    }

    /// Adds a zero-quantity category unless one with the same name exists
    pub fn ensure_category(&mut self, name: &str) {
        if self.find_category(name).is_none() {
            self.categories.push(Category::new(name, 0));
        }
    }

    /// Re-derives every category aggregate from the item list
    pub fn recompute_aggregates(&mut self) {
        for category in &mut self.categories {
            category.quantity = self
                .items
                .iter()
                .filter(|i| i.in_category(&category.name))
                .map(|i| u64::from(i.quantity))
                .sum();
        }
    }
}
