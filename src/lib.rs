//! Parts Inventory - stock store for a motor-parts shop
//!
//! Tracks items and categories, keeps category totals consistent with the
//! item list, logs every stock change, and persists everything to a single
//! flat text file that is rewritten after each change.

pub mod codec;
pub mod config;
pub mod error;
pub mod exchange;
pub mod formatters;
pub mod models;
pub mod restock;
pub mod store;

// Re-export commonly used items
pub use codec::LoadReport;
pub use config::{EmptyCategoryPolicy, StoreConfig};
pub use error::{ErrorKind, InventoryError, Result};
pub use models::{
    Category, InventoryState, Item, ItemUpdate, ThresholdChange, TransactionAction,
    TransactionLogEntry, UNCATEGORIZED,
};
pub use restock::{format_restock_alerts, RestockStats};
pub use store::{ImportSummary, InventoryStore, SharedStore};
