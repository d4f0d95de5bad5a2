//! Statement format normalization.
//!
//! Bank exports arrive with metadata preambles, locale-formatted numbers
//! ("1.234,56 EUR") and day-first dates. This module finds the real header
//! row, resolves columns through an alias table, and turns each data row
//! into a `CanonicalRow` or a per-row rejection. Only a structurally
//! missing column fails the whole import.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{HuchaError, Result};
use crate::models::{CanonicalRow, RejectReason, RowRejection};

// Accepted column names per canonical field, case-insensitive containment.
// First matching column in the header wins.
const DESCRIPTION_ALIASES: &[&str] = &["concepto", "concept", "description"];
const DATE_ALIASES: &[&str] = &["fecha", "date"];
const AMOUNT_ALIASES: &[&str] = &["importe", "amount", "cantidad"];
const CARD_ALIASES: &[&str] = &["tarjeta", "card"];

#[derive(Debug)]
pub struct NormalizedFile {
    pub rows: Vec<CanonicalRow>,
    pub rejected: Vec<RowRejection>,
}

struct Header {
    line_index: usize,
    delimiter: u8,
    description: usize,
    date: usize,
    amount: usize,
    card: Option<usize>,
}

/// Decode raw statement bytes. UTF-8 first; anything else is treated as
/// Latin-1 so Windows-exported files with accented characters still import.
fn decode(input: &[u8]) -> String {
    match std::str::from_utf8(input) {
        Ok(s) => s.to_string(),
        Err(_) => input.iter().map(|&b| b as char).collect(),
    }
}

/// Trim and collapse internal whitespace runs to single spaces.
pub fn clean_description(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a locale-formatted amount: optional `€`/`EUR` suffix, `.` as
/// thousands separator and `,` as decimal separator. Strings already in
/// plain decimal form ("1234.56") parse unchanged. Result is rounded to
/// cents so identity keys and sums stay exact.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '€').collect();
    if s.to_uppercase().ends_with("EUR") {
        s.truncate(s.len() - 3);
    }
    if s.is_empty() {
        return None;
    }
    if s.contains(',') {
        s = s.replace('.', "").replace(',', ".");
    }
    Decimal::from_str(&s).ok().map(|d| d.round_dp(2))
}

/// Parse a statement date. Day-first formats are the statement locale's
/// standard and are tried before ISO.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%y", "%d-%m-%y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn find_alias(cells: &[String], aliases: &[&str]) -> Option<usize> {
    cells
        .iter()
        .position(|cell| aliases.iter().any(|a| cell.contains(a)))
}

/// Scan for the first line that carries every required column. Exports put
/// account metadata above the real header, so matching on line position is
/// not an option.
fn find_header(content: &str) -> Result<Header> {
    let mut best: Option<(usize, Vec<String>)> = None;

    for (line_index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let delimiter = if line.contains(';') { b';' } else { b',' };
        let cells: Vec<String> = line
            .split(delimiter as char)
            .map(|c| c.trim().to_lowercase())
            .collect();

        let description = find_alias(&cells, DESCRIPTION_ALIASES);
        let date = find_alias(&cells, DATE_ALIASES);
        let amount = find_alias(&cells, AMOUNT_ALIASES);

        if let (Some(description), Some(date), Some(amount)) = (description, date, amount) {
            return Ok(Header {
                line_index,
                delimiter,
                description,
                date,
                amount,
                card: find_alias(&cells, CARD_ALIASES),
            });
        }

        let matched = [description, date, amount].iter().flatten().count();
        if matched > 0 && best.as_ref().map_or(true, |(n, _)| matched > *n) {
            best = Some((matched, cells));
        }
    }

    // No line had all required columns; name the first canonical field the
    // closest candidate line was missing.
    let missing = match best {
        Some((_, cells)) => {
            if find_alias(&cells, DESCRIPTION_ALIASES).is_none() {
                "description"
            } else if find_alias(&cells, DATE_ALIASES).is_none() {
                "date"
            } else {
                "amount"
            }
        }
        None => "description",
    };
    Err(HuchaError::MissingColumn(missing.to_string()))
}

/// Normalize a raw statement export. Returns canonical rows in file order
/// plus per-row rejection diagnostics (1-based index within the data
/// section). Fails only when a required column cannot be resolved at all.
pub fn normalize(input: &[u8]) -> Result<NormalizedFile> {
    let content = decode(input);
    let header = find_header(&content)?;

    let data: String = content
        .lines()
        .skip(header.line_index + 1)
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(header.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    let mut row_index = 0usize;

    for record in reader.records() {
        let Ok(record) = record else { continue };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        row_index += 1;

        let cell = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        let description = clean_description(&cell(header.description));
        if description.is_empty() {
            rejected.push(RowRejection {
                row: row_index,
                raw: String::new(),
                reason: RejectReason::EmptyDescription,
            });
            continue;
        }

        let raw_amount = cell(header.amount);
        let Some(amount) = parse_amount(&raw_amount) else {
            rejected.push(RowRejection {
                row: row_index,
                raw: raw_amount,
                reason: RejectReason::UnparsableAmount,
            });
            continue;
        };

        let raw_date = cell(header.date);
        let Some(date) = parse_date(&raw_date) else {
            rejected.push(RowRejection {
                row: row_index,
                raw: raw_date,
                reason: RejectReason::UnparsableDate,
            });
            continue;
        };

        let card_suffix = header
            .card
            .map(|idx| cell(idx))
            .filter(|c| !c.is_empty());

        rows.push(CanonicalRow {
            description,
            card_suffix,
            date,
            amount,
        });
    }

    Ok(NormalizedFile { rows, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_locale_formats() {
        assert_eq!(parse_amount("-20,37EUR"), Some(dec("-20.37")));
        assert_eq!(parse_amount("1.234,56 EUR"), Some(dec("1234.56")));
        assert_eq!(parse_amount("-45,67EUR"), Some(dec("-45.67")));
        assert_eq!(parse_amount("3.980,53EUR"), Some(dec("3980.53")));
        assert_eq!(parse_amount("-36,00EUR"), Some(dec("-36.00")));
    }

    #[test]
    fn test_parse_amount_plain_decimal() {
        assert_eq!(parse_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("-500"), Some(dec("-500")));
        assert_eq!(parse_amount("12,50 €"), Some(dec("12.50")));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("EUR"), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("12,34,56"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("15/01/2024"), Some(date));
        assert_eq!(parse_date("15-01-2024"), Some(date));
        assert_eq!(parse_date("2024-01-15"), Some(date));
        assert_eq!(parse_date("15/01/24"), Some(date));
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date("32/01/2024"), None);
        assert_eq!(parse_date("15/13/2024"), None);
        assert_eq!(parse_date("pronto"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description("  COMPRA   MERCADONA  "), "COMPRA MERCADONA");
        assert_eq!(clean_description("A\tB\n C"), "A B C");
    }

    #[test]
    fn test_normalize_with_metadata_preamble() {
        let input = b"Titular;PABLO GARCIA\nCuenta;ES12 3456\n\n\
Fecha;Concepto;Importe\n\
15/01/2024;COMPRA MERCADONA;-20,37EUR\n\
16/01/2024;NOMINA ENERO;1.234,56 EUR\n";
        let out = normalize(input).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert!(out.rejected.is_empty());
        assert_eq!(out.rows[0].description, "COMPRA MERCADONA");
        assert_eq!(out.rows[0].amount, dec("-20.37"));
        assert_eq!(out.rows[1].amount, dec("1234.56"));
        assert_eq!(out.rows[1].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn test_normalize_alias_and_card_column() {
        let input = b"Date,Description,Card,Amount\n\
15/01/2024,GYM PAYMENT,1234,-30.00\n\
16/01/2024,GYM PAYMENT,,-30.00\n";
        let out = normalize(input).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[0].card_suffix.as_deref(), Some("1234"));
        assert_eq!(out.rows[1].card_suffix, None);
    }

    #[test]
    fn test_normalize_missing_date_column() {
        let input = b"Concepto;Importe\nCOMPRA;-5,00EUR\n";
        let err = normalize(input).unwrap_err();
        match err {
            HuchaError::MissingColumn(field) => assert_eq!(field, "date"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_no_header_at_all() {
        let err = normalize(b"just some text\nwithout any header\n").unwrap_err();
        assert!(matches!(err, HuchaError::MissingColumn(_)));
    }

    #[test]
    fn test_normalize_row_fault_isolation() {
        let mut input = String::from("Fecha;Concepto;Importe\n");
        for i in 1..=100 {
            if [10, 50, 90].contains(&i) {
                input.push_str(&format!("15/01/2024;ROW {i};no-amount\n"));
            } else {
                input.push_str(&format!("15/01/2024;ROW {i};-1,00EUR\n"));
            }
        }
        let out = normalize(input.as_bytes()).unwrap();
        assert_eq!(out.rows.len(), 97);
        assert_eq!(out.rejected.len(), 3);
        let indices: Vec<usize> = out.rejected.iter().map(|r| r.row).collect();
        assert_eq!(indices, vec![10, 50, 90]);
        assert!(out
            .rejected
            .iter()
            .all(|r| r.reason == RejectReason::UnparsableAmount && r.raw == "no-amount"));
    }

    #[test]
    fn test_normalize_bad_date_rejected_not_fatal() {
        let input = b"Fecha;Concepto;Importe\n\
99/99/2024;BROKEN;-1,00EUR\n\
15/01/2024;FINE;-2,00EUR\n";
        let out = normalize(input).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].reason, RejectReason::UnparsableDate);
        assert_eq!(out.rejected[0].raw, "99/99/2024");
    }

    #[test]
    fn test_normalize_tolerates_latin1_bytes() {
        // "CAFETERÍA" with Í as the Latin-1 byte 0xCD, not valid UTF-8.
        let input = b"Fecha;Concepto;Importe\n15/01/2024;CAFETER\xCDA;-3,50EUR\n";
        let out = normalize(input).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert!(out.rows[0].description.starts_with("CAFETER"));
    }

    #[test]
    fn test_normalize_collapses_description_whitespace() {
        let input = b"Fecha;Concepto;Importe\n15/01/2024;  COMPRA    MERCADONA ;-1,00EUR\n";
        let out = normalize(input).unwrap();
        assert_eq!(out.rows[0].description, "COMPRA MERCADONA");
    }
}
