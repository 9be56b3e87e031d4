//! Item list exchange in the plain `inventory.csv` layout:
//! `modelNumber,modelName,price,quantity[,category]`, no header row.

use std::path::Path;

use csv::StringRecord;

use crate::error::{InventoryError, Result};
use crate::models::{Item, UNCATEGORIZED};

/// Rows read from an exchange file
#[derive(Debug, Default)]
pub struct ItemRows {
    pub items: Vec<Item>,
    /// Rows that were unreadable, too short or had unparsable numbers
    pub skipped: usize,
}

fn parse_item_row(record: &StringRecord) -> Option<Item> {
    if record.len() < 4 {
        return None;
    }
    let model_number = record.get(0)?;
    let model_name = record.get(1)?;
    if model_number.is_empty() || model_name.is_empty() {
        return None;
    }
    let price: f64 = record.get(2)?.parse().ok()?;
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    let quantity: u32 = record.get(3)?.parse().ok()?;
    let category = record
        .get(4)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNCATEGORIZED);
    Some(Item::new(model_number, model_name, price, quantity, category))
}

pub fn read_items<P: AsRef<Path>>(path: P) -> Result<ItemRows> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut rows = ItemRows::default();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!(
                    "Skipping unreadable line in {}: {e}",
                    path.as_ref().display()
                );
                rows.skipped += 1;
                continue;
            }
        };
        match parse_item_row(&record) {
            Some(item) => rows.items.push(item),
            None => {
                log::warn!(
                    "Skipping invalid line format in {}: {}",
                    path.as_ref().display(),
                    record.iter().collect::<Vec<_>>().join(",")
                );
                rows.skipped += 1;
            }
        }
    }

    Ok(rows)
}

pub fn export_items<P: AsRef<Path>>(path: P, items: &[Item]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path.as_ref())?;

    for item in items {
        wtr.write_record([
            item.model_number.as_str(),
            item.model_name.as_str(),
            item.price.to_string().as_str(),
            item.quantity.to_string().as_str(),
            item.category.as_str(),
        ])?;
    }
    wtr.flush()
        .map_err(|e| InventoryError::io(path.as_ref(), e))?;

    log::info!(
        "Exported {} items to {}",
        items.len(),
        path.as_ref().display()
    );
    Ok(())
}
