//! Extract receipt fields from the provider's HTML confirmation page.
//!
//! The page is a table layout of label cells followed by value cells. Every
//! `<td>` is collected in document order, label cells are recognised through
//! the [`LABEL_TABLE`](crate::labels::LABEL_TABLE), and the value is read
//! from the cell after the label (shifted by the entry's cell offset).
//!
//! Nothing here fails: unknown markup yields fewer fields, and unparseable
//! amounts yield `NaN`.

use scraper::{ElementRef, Html, Selector};

use crate::labels::{self, LabelEntry};
use crate::types::{FieldKey, FieldValue, Fields};

/// Currency token stripped from amount cells before parsing.
const CURRENCY_TOKEN: &str = "birr";

/// Parse fields from a receipt page.
pub fn parse_from_html(html: &str) -> Fields {
    let document = Html::parse_document(html);
    let cells = collect_cells(&document);
    let mut fields = Fields::new();

    for (index, cell) in cells.iter().enumerate() {
        let Some(entry) = labels::lookup(&normalize_label(cell)) else {
            continue;
        };
        let raw = cells
            .get(index + entry.cell_offset + 1)
            .map(|c| normalize_value(c))
            .unwrap_or_default();
        tracing::debug!(key = %entry.key, cell = index, value = %raw, "matched receipt label");
        store_value(&mut fields, entry, &raw);
    }

    tracing::debug!(count = fields.len(), cells = cells.len(), "extracted receipt fields");
    fields
}

/// Text content of every table cell, in document order.
fn collect_cells(document: &Html) -> Vec<String> {
    let Ok(sel) = Selector::parse("td") else {
        return Vec::new();
    };
    document.select(&sel).map(|td| cell_text(&td)).collect()
}

fn cell_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn store_value(fields: &mut Fields, entry: &LabelEntry, raw: &str) {
    match entry.key {
        FieldKey::BankAccNo => {
            let (account, recipient) = split_bank_account(raw);
            fields.insert(FieldKey::To.as_str(), recipient);
            fields.insert(FieldKey::BankAccNo.as_str(), account);
        }
        key if key.is_amount() => {
            fields.insert(key.as_str(), FieldValue::Number(parse_amount(raw)));
        }
        key => fields.insert(key.as_str(), raw),
    }
}

/// Normalize a label cell: drop all whitespace, then lowercase.
pub fn normalize_label(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Normalize a value cell: drop line breaks and tabs, collapse whitespace
/// runs to a single space, trim the ends.
pub fn normalize_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars().filter(|c| !matches!(c, '\n' | '\r' | '\t')) {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Split a bank account cell such as `"1000123456789 Kebede Alemu"` into the
/// account number (ASCII letters removed) and the recipient name (leading
/// digit run removed).
pub fn split_bank_account(raw: &str) -> (String, String) {
    let account: String = raw.chars().filter(|c| !c.is_ascii_alphabetic()).collect();
    let recipient = raw.trim_start_matches(|c: char| c.is_ascii_digit());
    (account.trim().to_string(), recipient.trim().to_string())
}

/// Parse an amount cell like `"1,250.00 Birr"`.
///
/// The currency token is removed case-insensitively along with thousands
/// separators. Anything that still fails to parse, or parses to an
/// infinity, becomes `NaN`.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned = remove_ascii_ci(raw, CURRENCY_TOKEN).replace(',', "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(f64::NAN)
}

/// Remove every ASCII-case-insensitive occurrence of `needle`.
fn remove_ascii_ci(haystack: &str, needle: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(needle) {
        out.push_str(&haystack[pos..pos + found]);
        pos += found + needle.len();
    }
    out.push_str(&haystack[pos..]);
    out
}
