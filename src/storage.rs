//! Keyed tabular storage.
//!
//! Both transaction history and per-account config go through one narrow
//! interface: `read(key)` / `write(key)` of a `Table`. The shipped backend
//! keeps one CSV file per key under the data directory; a remote
//! spreadsheet-like backend implements the same trait with a worksheet per
//! key. The core does no retry, batching or fallback; a failing backend
//! call propagates to the caller unmodified.

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{HuchaError, Result};
use crate::models::{Category, Transaction};

/// Plain tabular data: a header row plus string cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<Table>>;
    fn write(&self, key: &str, table: &Table) -> Result<()>;
}

/// Local backend: `<root>/<key>.csv`, one file per namespace key.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.csv"))
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<Table>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)?;
        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        Ok(Some(Table { headers, rows }))
    }

    fn write(&self, key: &str, table: &Table) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(self.path(key))?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transaction history codec
// ---------------------------------------------------------------------------

const HISTORY_HEADERS: &[&str] = &["Date", "Concept", "Card", "Amount", "Category"];

pub fn history_to_table(transactions: &[Transaction]) -> Table {
    let mut table = Table::new(HISTORY_HEADERS);
    for txn in transactions {
        table.rows.push(vec![
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.card_suffix.clone().unwrap_or_default(),
            format!("{:.2}", txn.amount),
            txn.category.name().to_string(),
        ]);
    }
    table
}

/// Decode a stored history table. `source_user` is implicit in the storage
/// key, so the caller supplies it back. Any cell that no longer parses is
/// reported as corruption, never skipped.
pub fn history_from_table(key: &str, table: &Table, source_user: &str) -> Result<Vec<Transaction>> {
    let corrupt = |reason: String| HuchaError::Corrupt {
        key: key.to_string(),
        reason,
    };
    let col = |name: &str| {
        table
            .column(name)
            .ok_or_else(|| corrupt(format!("missing column {name}")))
    };
    let (date_col, concept_col, card_col, amount_col, category_col) = (
        col("Date")?,
        col("Concept")?,
        col("Card")?,
        col("Amount")?,
        col("Category")?,
    );

    let mut transactions = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let date = NaiveDate::parse_from_str(cell(date_col), "%Y-%m-%d")
            .map_err(|_| corrupt(format!("bad date {:?} in row {}", cell(date_col), i + 1)))?;
        let amount = Decimal::from_str(cell(amount_col))
            .map_err(|_| corrupt(format!("bad amount {:?} in row {}", cell(amount_col), i + 1)))?;
        let category = Category::parse(cell(category_col))
            .map_err(|_| corrupt(format!("bad category {:?} in row {}", cell(category_col), i + 1)))?;
        let card = cell(card_col);
        transactions.push(Transaction {
            description: cell(concept_col).to_string(),
            card_suffix: (!card.is_empty()).then(|| card.to_string()),
            date,
            amount,
            category,
            source_user: source_user.to_string(),
        });
    }
    Ok(transactions)
}

// ---------------------------------------------------------------------------
// Config table (key/value rows per account)
// ---------------------------------------------------------------------------

const CONFIG_HEADERS: &[&str] = &["key", "value"];

pub fn empty_config() -> Table {
    Table::new(CONFIG_HEADERS)
}

pub fn config_get<'t>(table: &'t Table, key: &str) -> Option<&'t str> {
    let key_col = table.column("key")?;
    let value_col = table.column("value")?;
    table
        .rows
        .iter()
        .find(|row| row.get(key_col).map(String::as_str) == Some(key))
        .and_then(|row| row.get(value_col))
        .map(String::as_str)
}

pub fn config_set(table: &mut Table, key: &str, value: String) {
    let key_col = table.column("key").unwrap_or(0);
    if let Some(row) = table
        .rows
        .iter_mut()
        .find(|row| row.get(key_col).map(String::as_str) == Some(key))
    {
        row.resize(2, String::new());
        row[1] = value;
    } else {
        table.rows.push(vec![key.to_string(), value]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_txn() -> Transaction {
        Transaction {
            description: "COMPRA MERCADONA".to_string(),
            card_suffix: Some("1234".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: Decimal::from_str("-20.37").unwrap(),
            category: Category::Groceries,
            source_user: "Pablo".to_string(),
        }
    }

    #[test]
    fn test_local_storage_read_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.read("missing_key").unwrap().is_none());
    }

    #[test]
    fn test_local_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("data"));
        let table = history_to_table(&[sample_txn()]);
        storage.write("abc123_pablo", &table).unwrap();
        let loaded = storage.read("abc123_pablo").unwrap().unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_history_codec_roundtrip() {
        let txn = sample_txn();
        let table = history_to_table(std::slice::from_ref(&txn));
        let back = history_from_table("k", &table, "Pablo").unwrap();
        assert_eq!(back, vec![txn]);
    }

    #[test]
    fn test_history_codec_empty_card_is_none() {
        let mut txn = sample_txn();
        txn.card_suffix = None;
        let table = history_to_table(std::slice::from_ref(&txn));
        let back = history_from_table("k", &table, "Pablo").unwrap();
        assert_eq!(back[0].card_suffix, None);
    }

    #[test]
    fn test_history_codec_rejects_corrupt_amount() {
        let mut table = history_to_table(&[sample_txn()]);
        table.rows[0][3] = "twenty".to_string();
        let err = history_from_table("abc123_pablo", &table, "Pablo").unwrap_err();
        assert!(matches!(err, HuchaError::Corrupt { .. }));
    }

    #[test]
    fn test_history_codec_rejects_unknown_category() {
        let mut table = history_to_table(&[sample_txn()]);
        table.rows[0][4] = "Yacht Upkeep".to_string();
        assert!(history_from_table("k", &table, "Pablo").is_err());
    }

    #[test]
    fn test_config_get_set() {
        let mut table = empty_config();
        assert_eq!(config_get(&table, "category_mapping"), None);
        config_set(&mut table, "category_mapping", "{}".to_string());
        assert_eq!(config_get(&table, "category_mapping"), Some("{}"));
        config_set(&mut table, "category_mapping", "{\"a\":1}".to_string());
        assert_eq!(config_get(&table, "category_mapping"), Some("{\"a\":1}"));
        assert_eq!(table.rows.len(), 1);
    }
}
