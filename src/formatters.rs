use crate::models::{Category, Item, TransactionLogEntry};

pub fn format_item_table(items: &[Item]) -> String {
    if items.is_empty() {
        return "No items in inventory.\n".to_string();
    }

    let mut max_number_len = "Model Number".len();
    let mut max_name_len = "Model Name".len();
    let mut max_category_len = "Category".len();

    // Calculate maximum lengths for alignment
    for item in items {
        max_number_len = max_number_len.max(item.model_number.len());
        max_name_len = max_name_len.max(item.model_name.len());
        max_category_len = max_category_len.max(item.category.len());
    }

    let mut output = format!(
        "{:<max_number_len$}  {:<max_name_len$}  {:>10}  {:>8}  {:<max_category_len$}\n",
        "Model Number", "Model Name", "Price", "Qty", "Category"
    );
    output.push_str(&format!(
        "{}\n",
        "-".repeat(max_number_len + max_name_len + max_category_len + 26)
    ));

    for item in items {
        output.push_str(&format!(
            "{:<max_number_len$}  {:<max_name_len$}  {:>10.2}  {:>8}  {:<max_category_len$}\n",
            item.model_number, item.model_name, item.price, item.quantity, item.category
        ));
    }

    let total: f64 = items.iter().map(Item::worth).sum();
    output.push_str(&format!("\nTotal inventory worth: {total:.2}\n"));
    output
}

pub fn format_item_details(item: &Item) -> String {
    format!(
        "Details: Number={}, Name={}, Price={:.2}, Quantity={}, Category={}\n",
        item.model_number, item.model_name, item.price, item.quantity, item.category
    )
}

pub fn format_categories(categories: &[Category], low_stock_threshold: u64) -> String {
    if categories.is_empty() {
        return "No categories defined.\n".to_string();
    }

    let mut output = String::from("=== Categories ===\n");
    for category in categories {
        let marker = if category.quantity < low_stock_threshold {
            " (low stock)"
        } else {
            ""
        };
        output.push_str(&format!(
            "Category: {}\nQuantity: {}{}\n------------------------\n",
            category.name, category.quantity, marker
        ));
    }
    output
}

pub fn format_transaction_log(entries: &[TransactionLogEntry]) -> String {
    if entries.is_empty() {
        return "Transaction log is empty.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        let line = match entry.threshold {
            Some(change) => format!(
                "{} {} threshold {} -> {}",
                entry.timestamp_string(),
                entry.action.as_str(),
                change.old,
                change.new
            ),
            None if entry.model_number.is_empty() => format!(
                "{} {} {} ({})",
                entry.timestamp_string(),
                entry.action.as_str(),
                entry.category.as_deref().unwrap_or("-"),
                entry.quantity
            ),
            None => format!(
                "{} {} {} [{}] x{}{}",
                entry.timestamp_string(),
                entry.action.as_str(),
                entry.item_name,
                entry.model_number,
                entry.quantity,
                entry
                    .category
                    .as_deref()
                    .map(|c| format!(" in {c}"))
                    .unwrap_or_default()
            ),
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}
