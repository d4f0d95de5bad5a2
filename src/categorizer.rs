use rust_decimal::Decimal;

use crate::learned::LearnedMappings;
use crate::models::{CanonicalRow, Category};
use crate::rules::RuleSet;

/// Assign a category to a normalized statement row.
///
/// Credits are income, not expenses, and short-circuit everything else.
/// For expenses the decision is two-tier: a learned mapping from a past
/// user correction wins unconditionally over the keyword rules, so user
/// intent sticks without ever editing the shared trigger table. No match
/// at either tier leaves the row `Uncategorized` for manual review.
pub fn classify(row: &CanonicalRow, learned: &LearnedMappings, rules: &RuleSet) -> Category {
    if row.amount > Decimal::ZERO {
        return Category::Income;
    }
    if let Some(category) = learned.lookup(&row.description) {
        return category;
    }
    rules.classify(&row.description).unwrap_or(Category::Uncategorized)
}
