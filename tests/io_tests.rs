use parts_inventory::codec::{read_state, write_state, EncodeOptions, FORMAT_VERSION};
use parts_inventory::exchange::{export_items, read_items};
use parts_inventory::models::{Category, InventoryState, Item, UNCATEGORIZED};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

// Test fixtures - sample data for testing

fn create_legacy_data_content() -> String {
    r#"PATH,/home/shop/parts
CATEGORY,Engine Parts
CATEGORY,Uncategorized
ITEM,E-100,Piston,55.5,2,Engine Parts
ITEM,E-101,Gasket,oops,4,Engine Parts
ITEM,E-102,Camshaft,310.0,1,Engine Parts
LOG,2024-01-05 10:00:00,ADD,Piston,E-100,2,Engine Parts
LOWSTOCK,2024-01-05 10:05:00,SET,3,5,
GARBAGE LINE"#
        .to_string()
}

fn create_sample_exchange_content() -> String {
    r#"E-100,Piston,55.5,2,Engine Parts
L-1,Headlight,25,4,Electrical
X-9,Mystery Part,1.0,1
bad,row
B-2,Door Handle,n/a,1,Body Parts"#
        .to_string()
}

// Tests for the data file

#[test]
fn test_read_state_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let (state, report) = read_state(&dir.path().join("nothing.csv"), 5).unwrap();

    assert!(state.items.is_empty());
    assert!(state.categories.is_empty());
    assert!(state.log.is_empty());
    assert_eq!(state.low_stock_threshold, 5);
    assert!(!report.file_found);
}

#[test]
fn test_read_state_legacy_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", create_legacy_data_content()).unwrap();

    let (state, report) = read_state(temp_file.path(), 5).unwrap();

    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[0].model_number, "E-100");
    assert_eq!(state.items[1].model_number, "E-102");
    assert_eq!(state.find_category("engine parts").unwrap().quantity, 3);
    assert_eq!(state.low_stock_threshold, 3);
    assert_eq!(state.log.len(), 2);
    assert_eq!(state.recorded_path.as_deref(), Some("/home/shop/parts"));
    assert_eq!(report.skipped_lines, 2);
    assert_eq!(report.format_version, None);
}

#[test]
fn test_write_state_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("inventory_data.csv");

    let mut state = InventoryState::empty(5);
    state.categories.push(Category::new(UNCATEGORIZED, 0));
    write_state(&path, &state, EncodeOptions::default()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(&format!("FORMAT,{FORMAT_VERSION}\n")));
    assert!(content.contains("CATEGORY,Uncategorized"));
    assert!(!dir.path().join("nested").join("inventory_data.csv.tmp").exists());
}

#[test]
fn test_write_state_overwrites_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inventory_data.csv");
    fs::write(&path, "ITEM,OLD,Stale,1,1,Gone\n").unwrap();

    let mut state = InventoryState::empty(5);
    state.categories.push(Category::new("Electrical", 4));
    state.items.push(Item::new("L-1", "Headlight", 25.0, 4, "Electrical"));
    write_state(&path, &state, EncodeOptions::default()).unwrap();

    let (reloaded, _) = read_state(&path, 5).unwrap();
    assert_eq!(reloaded.items.len(), 1);
    assert_eq!(reloaded.items[0].model_number, "L-1");
    assert!(reloaded.find_category("Gone").is_none());
}

#[test]
fn test_read_state_unreadable_path_is_error() {
    let dir = TempDir::new().unwrap();
    // A directory cannot be read as a data file
    let result = read_state(dir.path(), 5);
    assert!(result.is_err());
}

// Tests for item exchange files

#[test]
fn test_read_items_valid_and_invalid_rows() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", create_sample_exchange_content()).unwrap();

    let rows = read_items(temp_file.path()).unwrap();

    assert_eq!(rows.items.len(), 3);
    assert_eq!(rows.skipped, 2);
    assert_eq!(rows.items[0].model_name, "Piston");
    assert_eq!(rows.items[1].price, 25.0);
    assert_eq!(rows.items[2].category, UNCATEGORIZED);
}

#[test]
fn test_read_items_nonexistent_file() {
    let result = read_items("/this/file/does/not/exist.csv");
    assert!(result.is_err());
}

#[test]
fn test_read_items_empty_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let rows = read_items(temp_file.path()).unwrap();
    assert!(rows.items.is_empty());
    assert_eq!(rows.skipped, 0);
}

#[test]
fn test_read_items_with_whitespace() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "  E-100 ,  Piston  , 55.5 ,  2  , Engine Parts  ").unwrap();

    let rows = read_items(temp_file.path()).unwrap();
    assert_eq!(rows.items.len(), 1);

    // CSV reader should trim whitespace
    assert_eq!(rows.items[0].model_number, "E-100");
    assert_eq!(rows.items[0].model_name, "Piston");
    assert_eq!(rows.items[0].quantity, 2);
    assert_eq!(rows.items[0].category, "Engine Parts");
}

#[test]
fn test_export_items_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.csv");
    let items = vec![
        Item::new("E-100", "Piston", 55.5, 2, "Engine Parts"),
        Item::new("B-7", "Mirror, left", 40.0, 1, "Body Parts"),
    ];

    export_items(&path, &items).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "E-100,Piston,55.5,2,Engine Parts\nB-7,\"Mirror, left\",40,1,Body Parts\n"
    );

    let rows = read_items(&path).unwrap();
    assert_eq!(rows.items, items);
}
