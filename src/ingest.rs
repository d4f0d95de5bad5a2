//! Import pipeline: normalize a raw statement, merge it into a data user's
//! history with duplicate detection, and categorize what is new.

use std::collections::HashMap;

use crate::categorizer;
use crate::error::Result;
use crate::learned::LearnedMappings;
use crate::models::{Category, RowRejection, Transaction};
use crate::normalize;
use crate::rules::RuleSet;

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_duplicate: usize,
    pub backfilled: usize,
    pub rejected: Vec<RowRejection>,
}

/// Merge one statement export into `existing`.
///
/// Rows whose identity key is already present are skipped, which makes
/// re-uploading the same file a no-op, except that a duplicate may
/// backfill the category of an existing `Uncategorized` record when the
/// incoming row classifies. New rows are categorized and appended. The
/// merged set comes back ascending by date; ties keep prior-set order
/// first, then the newest import's file order (the sort is stable).
///
/// Malformed rows never abort the batch; a missing required column aborts
/// the whole import with nothing merged.
pub fn ingest(
    input: &[u8],
    existing: &[Transaction],
    data_user: &str,
    learned: &LearnedMappings,
    rules: &RuleSet,
) -> Result<(Vec<Transaction>, ImportSummary)> {
    let normalized = normalize::normalize(input)?;

    let mut merged: Vec<Transaction> = existing.to_vec();
    let mut by_key: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, txn)| (txn.identity_key(), i))
        .collect();

    let mut summary = ImportSummary {
        rejected: normalized.rejected,
        ..Default::default()
    };

    for row in normalized.rows {
        let category = categorizer::classify(&row, learned, rules);
        let txn = Transaction::from_row(row, category, data_user);
        match by_key.get(&txn.identity_key()).copied() {
            Some(i) => {
                if merged[i].category == Category::Uncategorized
                    && category != Category::Uncategorized
                {
                    merged[i].category = category;
                    summary.backfilled += 1;
                } else {
                    summary.skipped_duplicate += 1;
                }
            }
            None => {
                by_key.insert(txn.identity_key(), merged.len());
                merged.push(txn);
                summary.imported += 1;
            }
        }
    }

    merged.sort_by_key(|txn| txn.date);
    Ok((merged, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HuchaError;
    use chrono::NaiveDate;

    fn setup() -> (LearnedMappings, RuleSet) {
        (LearnedMappings::empty(), RuleSet::new())
    }

    const STATEMENT: &[u8] = b"Fecha;Concepto;Importe\n\
16/01/2024;NOMINA ENERO;1.234,56 EUR\n\
15/01/2024;COMPRA MERCADONA;-20,37EUR\n\
15/01/2024;XJKQW 99281;-7,00EUR\n";

    #[test]
    fn test_ingest_into_empty_history() {
        let (learned, rules) = setup();
        let (merged, summary) = ingest(STATEMENT, &[], "Pablo", &learned, &rules).unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped_duplicate, 0);
        assert!(summary.rejected.is_empty());
        assert_eq!(merged.len(), 3);
        assert!(merged.iter().all(|t| t.source_user == "Pablo"));
    }

    #[test]
    fn test_ingest_categorizes_new_rows() {
        let (learned, rules) = setup();
        let (merged, _) = ingest(STATEMENT, &[], "Pablo", &learned, &rules).unwrap();
        let by_desc = |d: &str| merged.iter().find(|t| t.description == d).unwrap();
        assert_eq!(by_desc("NOMINA ENERO").category, Category::Income);
        assert_eq!(by_desc("COMPRA MERCADONA").category, Category::Groceries);
        assert_eq!(by_desc("XJKQW 99281").category, Category::Uncategorized);
    }

    #[test]
    fn test_ingest_is_idempotent() {
        let (learned, rules) = setup();
        let (first, _) = ingest(STATEMENT, &[], "Pablo", &learned, &rules).unwrap();
        let (second, summary) = ingest(STATEMENT, &first, "Pablo", &learned, &rules).unwrap();
        assert_eq!(summary.imported, 0);
        // The uncategorized row stays uncategorized (no backfill source), so
        // every row is a plain skip.
        assert_eq!(summary.skipped_duplicate, 3);
        assert_eq!(second, first);
    }

    #[test]
    fn test_ingest_result_ordering() {
        let (learned, rules) = setup();
        let (merged, _) = ingest(STATEMENT, &[], "Pablo", &learned, &rules).unwrap();
        // Ascending by date; the two 15/01 rows keep their file order.
        assert_eq!(merged[0].description, "COMPRA MERCADONA");
        assert_eq!(merged[1].description, "XJKQW 99281");
        assert_eq!(merged[2].description, "NOMINA ENERO");
    }

    #[test]
    fn test_ingest_dedup_respects_card_suffix() {
        let (learned, rules) = setup();
        let input = b"Fecha;Concepto;Tarjeta;Importe\n\
15/01/2024;GYM CENTRAL;1234;-30,00EUR\n\
15/01/2024;GYM CENTRAL;5678;-30,00EUR\n\
15/01/2024;GYM CENTRAL;1234;-30,00EUR\n";
        let (merged, summary) = ingest(input, &[], "Pablo", &learned, &rules).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped_duplicate, 1);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_ingest_backfills_uncategorized_duplicates() {
        let (mut learned, rules) = setup();
        let (first, _) = ingest(STATEMENT, &[], "Pablo", &learned, &rules).unwrap();

        // User teaches the odd description a category, then re-imports.
        let dir = tempfile::tempdir().unwrap();
        let storage = crate::storage::LocalStorage::new(dir.path());
        learned
            .record(&storage, "abc123", "XJKQW 99281", Category::Leisure)
            .unwrap();

        let (second, summary) = ingest(STATEMENT, &first, "Pablo", &learned, &rules).unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.backfilled, 1);
        assert_eq!(summary.skipped_duplicate, 2);
        let fixed = second.iter().find(|t| t.description == "XJKQW 99281").unwrap();
        assert_eq!(fixed.category, Category::Leisure);
    }

    #[test]
    fn test_ingest_rejected_rows_do_not_abort() {
        let (learned, rules) = setup();
        let input = b"Fecha;Concepto;Importe\n\
15/01/2024;FINE;-1,00EUR\n\
bad-date;BROKEN DATE;-2,00EUR\n\
16/01/2024;BROKEN AMOUNT;garbage\n";
        let (merged, summary) = ingest(input, &[], "Pablo", &learned, &rules).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.rejected.len(), 2);
        assert_eq!(merged.len(), 1);
        let rows: Vec<usize> = summary.rejected.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 3]);
    }

    #[test]
    fn test_ingest_missing_column_aborts_whole_import() {
        let (learned, rules) = setup();
        let existing = {
            let (merged, _) = ingest(STATEMENT, &[], "Pablo", &learned, &rules).unwrap();
            merged
        };
        let input = b"Concepto;Importe\nCOMPRA;-5,00EUR\n";
        let err = ingest(input, &existing, "Pablo", &learned, &rules).unwrap_err();
        assert!(matches!(err, HuchaError::MissingColumn(ref f) if f == "date"));
    }

    #[test]
    fn test_ingest_same_rows_different_users_stay_separate() {
        let (learned, rules) = setup();
        let (pablo, _) = ingest(STATEMENT, &[], "Pablo", &learned, &rules).unwrap();
        // Masha's history is a separate set; the same statement imports in
        // full because identity keys include the source user.
        let (masha, summary) = ingest(STATEMENT, &[], "Masha", &learned, &rules).unwrap();
        assert_eq!(summary.imported, 3);
        assert_ne!(
            pablo[0].identity_key(),
            masha[0].identity_key()
        );
    }

    #[test]
    fn test_ingest_existing_history_precedes_new_ties() {
        let (learned, rules) = setup();
        let existing = vec![Transaction {
            description: "OLD SAME DAY".to_string(),
            card_suffix: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: "-9.99".parse().unwrap(),
            category: Category::Uncategorized,
            source_user: "Pablo".to_string(),
        }];
        let (merged, _) = ingest(STATEMENT, &existing, "Pablo", &learned, &rules).unwrap();
        let same_day: Vec<&str> = merged
            .iter()
            .filter(|t| t.date == NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(same_day, vec!["OLD SAME DAY", "COMPRA MERCADONA", "XJKQW 99281"]);
    }
}
