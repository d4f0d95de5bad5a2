use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::error::{HuchaError, Result};

/// Closed set of spending categories. `Income` is reserved for credits,
/// `Uncategorized` for expenses nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    HousingBills,
    Groceries,
    FoodDining,
    Subscriptions,
    Transport,
    Leisure,
    Shopping,
    Health,
    Financial,
    Income,
    Uncategorized,
}

pub const ALL_CATEGORIES: &[Category] = &[
    Category::HousingBills,
    Category::Groceries,
    Category::FoodDining,
    Category::Subscriptions,
    Category::Transport,
    Category::Leisure,
    Category::Shopping,
    Category::Health,
    Category::Financial,
    Category::Income,
    Category::Uncategorized,
];

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HousingBills => "Housing & Bills",
            Self::Groceries => "Groceries",
            Self::FoodDining => "Food & Dining",
            Self::Subscriptions => "Subscriptions",
            Self::Transport => "Transport",
            Self::Leisure => "Leisure & Entertainment",
            Self::Shopping => "Shopping",
            Self::Health => "Health & Wellness",
            Self::Financial => "Financial",
            Self::Income => "Income",
            Self::Uncategorized => "Uncategorized",
        }
    }

    /// Parse a stored or user-supplied category name. Unknown names are an
    /// error, never a silent fallback to `Uncategorized`.
    pub fn parse(name: &str) -> Result<Self> {
        let wanted = name.trim();
        ALL_CATEGORIES
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| HuchaError::UnknownCategory(name.to_string()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A statement row after format normalization, before categorization.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub description: String,
    pub card_suffix: Option<String>,
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// One ledger entry in a data user's consolidated history.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub description: String,
    pub card_suffix: Option<String>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: Category,
    pub source_user: String,
}

impl Transaction {
    pub fn from_row(row: CanonicalRow, category: Category, source_user: &str) -> Self {
        Self {
            description: row.description,
            card_suffix: row.card_suffix,
            date: row.date,
            amount: row.amount,
            category,
            source_user: source_user.to_string(),
        }
    }

    /// Duplicate-detection key: two transactions agreeing on description
    /// (case-folded), date, amount, card suffix and source user are the same
    /// real-world event and must collapse to one record on merge.
    pub fn identity_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.description.to_lowercase().as_bytes());
        hasher.update(b"|");
        hasher.update(self.date.format("%Y-%m-%d").to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(format!("{:.2}", self.amount).as_bytes());
        hasher.update(b"|");
        hasher.update(self.card_suffix.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(self.source_user.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Why a statement row was excluded from an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnparsableAmount,
    UnparsableDate,
    EmptyDescription,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UnparsableAmount => "unparsable amount",
            Self::UnparsableDate => "unparsable date",
            Self::EmptyDescription => "empty description",
        };
        f.write_str(s)
    }
}

/// Row-level import diagnostic. `row` is the 1-based position within the
/// data section (first row after the detected header row = 1).
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    pub row: usize,
    pub raw: String,
    pub reason: RejectReason,
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {} ({:?})", self.row, self.reason, self.raw)
    }
}
