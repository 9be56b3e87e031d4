use clap::{Args as ClapArgs, Parser, Subcommand};
use parts_inventory::config::default_data_dir;
use parts_inventory::formatters::{
    format_categories, format_item_details, format_item_table, format_transaction_log,
};
use parts_inventory::{
    format_restock_alerts, InventoryStore, Item, ItemUpdate, Result, StoreConfig,
};
use std::path::PathBuf;

/// Motor parts inventory - items, categories and restock alerts in one data file
#[derive(Parser, Debug)]
#[command(name = "parts_inventory")]
#[command(version, about, long_about = None)]
struct Args {
    /// Folder holding the data file
    #[arg(short, long, default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Low-stock threshold used until one is saved in the data file
    #[arg(long, default_value_t = 5)]
    threshold: u64,

    /// Print query results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all items
    List,
    /// List categories with their totals
    Categories,
    /// List categories below the low-stock threshold
    LowStock,
    /// Show the total worth of the inventory
    Worth,
    /// Show the transaction log
    Log,
    /// Show per-category restock alerts
    Alerts,
    /// Add a new item
    Add(AddArgs),
    /// Remove an item by model number, or every item in a category
    Remove {
        #[arg(long, conflicts_with = "category", required_unless_present = "category")]
        number: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Look up an item by model number or name
    Search { term: String },
    /// Change an existing item
    Edit(EditArgs),
    /// Add a category
    AddCategory {
        name: String,
        #[arg(long, default_value_t = 0)]
        quantity: i64,
    },
    /// Remove a category that no item uses
    RemoveCategory { name: String },
    /// Set the low-stock threshold
    SetThreshold { value: i64 },
    /// Move the data file to another folder
    SetPath { folder: PathBuf },
    /// Export items to a CSV file
    Export { file: PathBuf },
    /// Import items from a CSV file
    Import { file: PathBuf },
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
    #[arg(long)]
    number: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    quantity: u32,
    #[arg(long, default_value = parts_inventory::UNCATEGORIZED)]
    category: String,
}

#[derive(ClapArgs, Debug)]
struct EditArgs {
    number: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    quantity: Option<u32>,
    #[arg(long)]
    category: Option<String>,
}

fn main() {
    // Initialize logger. Set RUST_LOG environment variable to control log level.
    // Examples: RUST_LOG=info, RUST_LOG=warn, RUST_LOG=parts_inventory=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = StoreConfig::in_dir(&args.data_dir).with_low_stock_threshold(args.threshold);
    log::info!("Data file: {}", config.data_file_path().display());

    let mut store = InventoryStore::open(config);
    if let Err(e) = run(&mut store, args.command, args.json) {
        log::error!("Command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(store: &mut InventoryStore, command: Command, json: bool) -> Result<()> {
    match command {
        Command::List => {
            if json {
                print_json(store.items());
            } else {
                print!("{}", format_item_table(store.items()));
            }
        }
        Command::Categories => {
            if json {
                print_json(store.categories());
            } else {
                print!(
                    "{}",
                    format_categories(store.categories(), store.low_stock_threshold())
                );
            }
        }
        Command::LowStock => {
            let low = store.low_stock_categories();
            if json {
                print_json(&low);
            } else if low.is_empty() {
                println!("No categories below {}.", store.low_stock_threshold());
            } else {
                for category in low {
                    println!("{}: {}", category.name, category.quantity);
                }
            }
        }
        Command::Worth => println!("{:.2}", store.total_inventory_worth()),
        Command::Log => {
            if json {
                print_json(store.transaction_log());
            } else {
                print!("{}", format_transaction_log(store.transaction_log()));
            }
        }
        Command::Alerts => print!("{}", format_restock_alerts(&store.restock_alerts())),
        Command::Add(add) => {
            store.add_item(Item::new(
                add.number,
                add.name,
                add.price,
                add.quantity,
                add.category,
            ))?;
            println!("Item added.");
        }
        Command::Remove { number, category } => match (number, category) {
            (Some(number), _) => {
                let item = store.remove_item_by_number(&number)?;
                println!("Removed {}.", item.model_number);
            }
            (None, Some(category)) => {
                let removed = store.remove_items_by_category(&category)?;
                println!("Removed {} item(s) from {category}.", removed.len());
            }
            (None, None) => {
                return Err(parts_inventory::InventoryError::InvalidArgument(
                    "Pass --number or --category".to_string(),
                ))
            }
        },
        Command::Search { term } => match store.search_item(&term)? {
            Some(item) => print!("{}", format_item_details(item)),
            None => println!("No item matches {term}."),
        },
        Command::Edit(edit) => {
            let current = store.find_item(&edit.number).map(ItemUpdate::from);
            let Some(mut update) = current else {
                return Err(parts_inventory::InventoryError::NotFound(format!(
                    "Item with model number {} not found",
                    edit.number
                )));
            };
            if let Some(name) = edit.name {
                update.model_name = name;
            }
            if let Some(price) = edit.price {
                update.price = price;
            }
            if let Some(quantity) = edit.quantity {
                update.quantity = quantity;
            }
            if let Some(category) = edit.category {
                update.category = category;
            }
            store.edit_item(&edit.number, update)?;
            println!("Item updated.");
        }
        Command::AddCategory { name, quantity } => {
            store.add_category(&name, quantity)?;
            println!("Category added.");
        }
        Command::RemoveCategory { name } => {
            store.remove_category(&name)?;
            println!("Category removed.");
        }
        Command::SetThreshold { value } => {
            store.set_low_stock_threshold(value)?;
            println!("Low-stock threshold set to {value}.");
        }
        Command::SetPath { folder } => {
            store.set_data_file_path(&folder)?;
            println!("Data file moved to {}.", store.data_file_path().display());
        }
        Command::Export { file } => {
            let count = store.export_items_csv(&file)?;
            println!("Exported {count} item(s) to {}.", file.display());
        }
        Command::Import { file } => {
            let summary = store.import_items_csv(&file)?;
            println!(
                "Imported {} item(s), {} duplicate(s), {} invalid row(s).",
                summary.imported, summary.duplicates, summary.invalid
            );
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize output: {e}"),
    }
}
