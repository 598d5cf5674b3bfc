//! Core data types for extracted receipt fields.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Canonical field keys produced by the extractor.
///
/// The string form is the wire name used in JSON and in expected-field
/// mappings, so it must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    PayerName,
    PayerPhone,
    PayerAccType,
    CreditedPartyName,
    CreditedPartyAccNo,
    TransactionStatus,
    BankAccNo,
    ReceiptNo,
    Date,
    SettledAmount,
    DiscountAmount,
    VatAmount,
    TotalAmount,
    AmountInWord,
    PaymentMode,
    PaymentReason,
    PaymentChannel,
    /// Recipient name derived from the bank account cell.
    To,
}

impl FieldKey {
    /// Every key, table keys first, derived keys last.
    pub const ALL: [FieldKey; 18] = [
        FieldKey::PayerName,
        FieldKey::PayerPhone,
        FieldKey::PayerAccType,
        FieldKey::CreditedPartyName,
        FieldKey::CreditedPartyAccNo,
        FieldKey::TransactionStatus,
        FieldKey::BankAccNo,
        FieldKey::ReceiptNo,
        FieldKey::Date,
        FieldKey::SettledAmount,
        FieldKey::DiscountAmount,
        FieldKey::VatAmount,
        FieldKey::TotalAmount,
        FieldKey::AmountInWord,
        FieldKey::PaymentMode,
        FieldKey::PaymentReason,
        FieldKey::PaymentChannel,
        FieldKey::To,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::PayerName => "payer_name",
            FieldKey::PayerPhone => "payer_phone",
            FieldKey::PayerAccType => "payer_acc_type",
            FieldKey::CreditedPartyName => "credited_party_name",
            FieldKey::CreditedPartyAccNo => "credited_party_acc_no",
            FieldKey::TransactionStatus => "transaction_status",
            FieldKey::BankAccNo => "bank_acc_no",
            FieldKey::ReceiptNo => "receiptNo",
            FieldKey::Date => "date",
            FieldKey::SettledAmount => "settled_amount",
            FieldKey::DiscountAmount => "discount_amount",
            FieldKey::VatAmount => "vat_amount",
            FieldKey::TotalAmount => "total_amount",
            FieldKey::AmountInWord => "amount_in_word",
            FieldKey::PaymentMode => "payment_mode",
            FieldKey::PaymentReason => "payment_reason",
            FieldKey::PaymentChannel => "payment_channel",
            FieldKey::To => "to",
        }
    }

    /// Whether values for this key are parsed as numbers.
    pub fn is_amount(self) -> bool {
        is_amount_key(self.as_str())
    }
}

/// Amount keys are recognised by name, so caller-defined keys follow the same rule.
pub fn is_amount_key(key: &str) -> bool {
    key.ends_with("amount")
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = ReceiptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ReceiptError::InvalidField(format!("unknown field key: {s}")))
    }
}

/// A single extracted or expected value.
///
/// Text and numbers are distinct kinds: `"5000"` never equals `5000.0`.
///
/// An unparseable amount is `Number(NaN)`, which JSON writes as `null`;
/// reading `null` back yields `Number(NaN)` again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValueRepr {
    Text(String),
    Number(Option<f64>),
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match FieldValueRepr::deserialize(deserializer)? {
            FieldValueRepr::Text(s) => FieldValue::Text(s),
            FieldValueRepr::Number(n) => FieldValue::Number(n.unwrap_or(f64::NAN)),
        })
    }
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// Sparse key → value mapping.
///
/// Absent keys are a normal state, not an error. Keys are plain strings so
/// caller-built mappings may carry names outside [`FieldKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields {
    entries: BTreeMap<String, FieldValue>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Insert a raw string, typed the way the extractor types it:
    /// amount keys become numbers, everything else stays text.
    pub fn insert_raw(&mut self, key: impl Into<String>, raw: &str) {
        let key = key.into();
        let value = if is_amount_key(&key) {
            FieldValue::Number(crate::extract::parse_amount(raw))
        } else {
            FieldValue::Text(raw.to_string())
        };
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn field(&self, key: FieldKey) -> Option<&FieldValue> {
        self.entries.get(key.as_str())
    }

    pub fn text(&self, key: FieldKey) -> Option<&str> {
        self.field(key).and_then(FieldValue::as_text)
    }

    pub fn number(&self, key: FieldKey) -> Option<f64> {
        self.field(key).and_then(FieldValue::as_number)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Errors that can occur while fetching a receipt.
///
/// Extraction and verification never fail; they degrade to sparse fields
/// and `false` results instead.
#[derive(thiserror::Error, Debug)]
pub enum ReceiptError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Base URL cannot take path segments: {0}")]
    CannotBeBase(String),

    #[error("No receipt number or URL given")]
    MissingSource,

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

/// Convenience result type.
pub type ReceiptResult<T> = Result<T, ReceiptError>;
