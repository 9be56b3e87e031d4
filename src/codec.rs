//! Flat-file codec for the whole inventory state.
//!
//! One logical record per line, dispatched on its first field:
//!
//! ```text
//! FORMAT,1
//! PATH,/home/shop/parts
//! CATEGORY,Fasteners
//! ITEM,M1,Bolt,1.5,10,Fasteners
//! LOG,2024-03-01 09:15:00,ADD,Bolt,M1,10,Fasteners
//! LOWSTOCK,2024-03-01 09:20:00,SET,3,5,
//! ```
//!
//! Reading is tolerant: lines that cannot be understood are skipped with a
//! warning. Section order does not matter. Category aggregates are never taken
//! from the file; they are summed from the ITEM lines after decoding.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::StringRecord;

use crate::error::{InventoryError, Result};
use crate::models::{
    InventoryState, Item, TransactionAction, TransactionLogEntry,
    TIMESTAMP_FORMAT, UNCATEGORIZED,
};

/// Version written in the FORMAT line. Files without one are treated as legacy.
pub const FORMAT_VERSION: u32 = 1;

/// Encoder switches that depend on store policy
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Emit CATEGORY lines for empty categories too
    pub keep_empty_categories: bool,
}

/// Summary of a decode pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// False when there was no file to read
    pub file_found: bool,
    pub format_version: Option<u32>,
    pub items: usize,
    pub categories: usize,
    pub log_entries: usize,
    /// Lines ignored because they were unknown or malformed
    pub skipped_lines: usize,
}

/// Serializes the complete state into the file format.
pub fn encode(state: &InventoryState, options: EncodeOptions) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(["FORMAT", FORMAT_VERSION.to_string().as_str()])?;

    if let Some(path) = &state.recorded_path {
        wtr.write_record(["PATH", path.as_str()])?;
    }

    for category in &state.categories {
        if options.keep_empty_categories || category.quantity > 0 || category.is_sentinel() {
            wtr.write_record(["CATEGORY", category.name.as_str()])?;
        }
    }

    for item in &state.items {
        wtr.write_record([
            "ITEM",
            item.model_number.as_str(),
            item.model_name.as_str(),
            item.price.to_string().as_str(),
            item.quantity.to_string().as_str(),
            item.category.as_str(),
        ])?;
    }

    for entry in &state.log {
        let timestamp = entry.timestamp_string();
        match entry.threshold {
            Some(change) => wtr.write_record([
                "LOWSTOCK",
                timestamp.as_str(),
                "SET",
                change.new.to_string().as_str(),
                change.old.to_string().as_str(),
                "",
            ])?,
            None => wtr.write_record([
                "LOG",
                timestamp.as_str(),
                entry.action.as_str(),
                entry.item_name.as_str(),
                entry.model_number.as_str(),
                entry.quantity.to_string().as_str(),
                entry.category.as_deref().unwrap_or(""),
            ])?,
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| InventoryError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parses file contents into a state. Never fails; bad lines, including ones
/// that are not valid UTF-8, are counted and skipped.
pub fn decode(input: impl AsRef<[u8]>, default_threshold: u64) -> (InventoryState, LoadReport) {
    let mut state = InventoryState::empty(default_threshold);
    let mut report = LoadReport {
        file_found: true,
        ..LoadReport::default()
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_ref());
    // Lowercased model numbers already decoded
    let mut seen: HashSet<String> = HashSet::new();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping unreadable line: {e}");
                report.skipped_lines += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if let Err(reason) = decode_record(&record, &mut state, &mut report, &mut seen) {
            log::warn!("Skipping line {line} ({reason}): {}", join_record(&record));
            report.skipped_lines += 1;
        }
    }

    // Items may name categories that have no CATEGORY line
    let referenced: Vec<String> = state.items.iter().map(|i| i.category.clone()).collect();
    for name in &referenced {
        state.ensure_category(name);
    }
    state.recompute_aggregates();

    report.items = state.items.len();
    report.categories = state.categories.len();
    report.log_entries = state.log.len();
    (state, report)
}

fn decode_record(
    record: &StringRecord,
    state: &mut InventoryState,
    report: &mut LoadReport,
    seen: &mut HashSet<String>,
) -> std::result::Result<(), String> {
    let tag = record.get(0).unwrap_or("").to_uppercase();
    match tag.as_str() {
        "FORMAT" => {
            let version: u32 = parse_field(record, 1, "format version")?;
            if version > FORMAT_VERSION {
                log::warn!(
                    "Data file format {version} is newer than supported {FORMAT_VERSION}, loading what is understood"
                );
            }
            report.format_version = Some(version);
        }
        "PATH" => {
            let path = required(record, 1, "path")?;
            state.recorded_path = Some(path.to_string());
        }
        "CATEGORY" => {
            let name = required(record, 1, "category name")?;
            state.ensure_category(name);
        }
        "ITEM" => {
            let item = decode_item(record)?;
            if !seen.insert(item.model_number.to_lowercase()) {
                return Err(format!("duplicate model number {}", item.model_number));
            }
            state.items.push(item);
        }
        "LOG" => state.log.push(decode_log(record)?),
        "LOWSTOCK" => {
            let timestamp = parse_timestamp(record, 1)?;
            let new: u64 = parse_field(record, 3, "new threshold")?;
            let old: u64 = parse_field(record, 4, "old threshold").unwrap_or(new);
            state.low_stock_threshold = new;
            state.log.push(TransactionLogEntry {
                timestamp,
                ..TransactionLogEntry::threshold_set(old, new)
            });
        }
        "" => return Err("empty record tag".to_string()),
        other => return Err(format!("unknown record type {other}")),
    }
    Ok(())
}

fn decode_item(record: &StringRecord) -> std::result::Result<Item, String> {
    let model_number = required(record, 1, "model number")?;
    let model_name = required(record, 2, "model name")?;
    let price: f64 = parse_field(record, 3, "price")?;
    if !price.is_finite() || price < 0.0 {
        return Err(format!("invalid price {price}"));
    }
    let quantity: u32 = parse_field(record, 4, "quantity")?;
    let category = record
        .get(5)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNCATEGORIZED);
    Ok(Item::new(model_number, model_name, price, quantity, category))
}

fn decode_log(record: &StringRecord) -> std::result::Result<TransactionLogEntry, String> {
    let timestamp = parse_timestamp(record, 1)?;
    let action_token = required(record, 2, "action")?;
    let action = TransactionAction::parse(action_token)
        .ok_or_else(|| format!("unknown action {action_token}"))?;
    let quantity: u64 = parse_field(record, 5, "quantity")?;
    let category = record
        .get(6)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    Ok(TransactionLogEntry {
        timestamp,
        action,
        item_name: record.get(3).unwrap_or("").to_string(),
        model_number: record.get(4).unwrap_or("").to_string(),
        quantity,
        category,
        threshold: None,
    })
}

fn required<'r>(
    record: &'r StringRecord,
    idx: usize,
    what: &str,
) -> std::result::Result<&'r str, String> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing {what}")),
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    idx: usize,
    what: &str,
) -> std::result::Result<T, String> {
    let raw = required(record, idx, what)?;
    raw.parse()
        .map_err(|_| format!("invalid {what} {raw:?}"))
}

fn parse_timestamp(record: &StringRecord, idx: usize) -> std::result::Result<NaiveDateTime, String> {
    let raw = required(record, idx, "timestamp")?;
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| format!("invalid timestamp {raw:?}"))
}

fn join_record(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

/// Reads and decodes the data file. A missing file is an empty state, not an error.
pub fn read_state(path: &Path, default_threshold: u64) -> Result<(InventoryState, LoadReport)> {
    if !path.exists() {
        log::info!("No data file at {}, starting empty", path.display());
        return Ok((InventoryState::empty(default_threshold), LoadReport::default()));
    }
    let bytes = fs::read(path).map_err(|e| InventoryError::io(path, e))?;
    let (state, report) = decode(&bytes, default_threshold);
    log::debug!(
        "Decoded {}: {} items, {} categories, {} log entries, {} skipped",
        path.display(),
        report.items,
        report.categories,
        report.log_entries,
        report.skipped_lines
    );
    Ok((state, report))
}

/// Rewrites the data file with the full state (write to a temp file, then rename).
pub fn write_state(path: &Path, state: &InventoryState, options: EncodeOptions) -> Result<()> {
    let text = encode(state, options)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| InventoryError::io(parent, e))?;
    }
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, text).map_err(|e| InventoryError::io(&temp_path, e))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            log::warn!("Could not remove {}: {cleanup}", temp_path.display());
        }
        return Err(InventoryError::io(path, e));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
