//! Label table for the provider's receipt page.
//!
//! Labels are stored already normalized (no whitespace, lowercase) and are
//! matched byte-for-byte. When the provider changes its page template this
//! table is what needs updating.

use crate::types::FieldKey;

/// One row of the label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelEntry {
    /// Normalized label text as it appears in the label cell.
    pub label: &'static str,
    /// Field the value is stored under.
    pub key: FieldKey,
    /// Extra cells to skip between the label cell and its value cell.
    pub cell_offset: usize,
}

const fn entry(label: &'static str, key: FieldKey, cell_offset: usize) -> LabelEntry {
    LabelEntry {
        label,
        key,
        cell_offset,
    }
}

/// Canonical label table, in page order.
///
/// Receipt number, payment date and settled amount sit in a row layout with
/// one filler cell after each label, hence their offset of 2.
pub const LABEL_TABLE: [LabelEntry; 17] = [
    entry("የከፋይስም/payername", FieldKey::PayerName, 0),
    entry("የከፋይቴሌብርቁ./payertelebirrno.", FieldKey::PayerPhone, 0),
    entry("የከፋይአካውንትአይነት/payeraccounttype", FieldKey::PayerAccType, 0),
    entry("የገንዘብተቀባይስም/creditedpartyname", FieldKey::CreditedPartyName, 0),
    entry("የገንዘብተቀባይቴሌብርቁ./creditedpartyaccountno", FieldKey::CreditedPartyAccNo, 0),
    entry("የክፍያውሁኔታ/transactionstatus", FieldKey::TransactionStatus, 0),
    entry("የባንክአካውንትቁጥር/bankaccountnumber", FieldKey::BankAccNo, 0),
    entry("የክፍያቁጥር/receiptno.", FieldKey::ReceiptNo, 2),
    entry("የክፍያቀን/paymentdate", FieldKey::Date, 2),
    entry("የተከፈለውመጠን/settledamount", FieldKey::SettledAmount, 2),
    entry("ቅናሽ/discountamount", FieldKey::DiscountAmount, 0),
    entry("15%ቫት/vat", FieldKey::VatAmount, 0),
    entry("ጠቅላላየተክፈለ/totalamountpaid", FieldKey::TotalAmount, 0),
    entry("የገንዘቡልክበፊደል/totalamountinword", FieldKey::AmountInWord, 0),
    entry("የክፍያዘዴ/paymentmode", FieldKey::PaymentMode, 0),
    entry("የክፍያምክንያት/paymentreason", FieldKey::PaymentReason, 0),
    entry("የክፍያመንገድ/paymentchannel", FieldKey::PaymentChannel, 0),
];

/// Find the entry whose label equals an already-normalized cell text.
pub fn lookup(normalized: &str) -> Option<&'static LabelEntry> {
    LABEL_TABLE.iter().find(|e| e.label == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_unique() {
        let labels: HashSet<_> = LABEL_TABLE.iter().map(|e| e.label).collect();
        assert_eq!(labels.len(), LABEL_TABLE.len());
        let keys: HashSet<_> = LABEL_TABLE.iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), LABEL_TABLE.len());
    }

    #[test]
    fn test_keys_follow_canonical_order() {
        for (entry, key) in LABEL_TABLE.iter().zip(FieldKey::ALL) {
            assert_eq!(entry.key, key);
        }
    }

    #[test]
    fn test_offsets() {
        let shifted: Vec<usize> = LABEL_TABLE
            .iter()
            .enumerate()
            .filter(|(_, e)| e.cell_offset == 2)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(shifted, vec![7, 8, 9]);
        assert!(LABEL_TABLE
            .iter()
            .all(|e| e.cell_offset == 0 || e.cell_offset == 2));
    }

    #[test]
    fn test_labels_are_normalized() {
        for e in &LABEL_TABLE {
            assert!(!e.label.chars().any(char::is_whitespace), "{}", e.label);
            assert_eq!(e.label, e.label.to_lowercase());
        }
    }

    #[test]
    fn test_label_bytes_pinned() {
        assert_eq!(
            LABEL_TABLE[0].label.as_bytes(),
            &[
                225, 139, 168, 225, 138, 168, 225, 141, 139, 225, 139, 173, 225, 136, 181, 225,
                136, 157, 47, 112, 97, 121, 101, 114, 110, 97, 109, 101
            ]
        );
        assert_eq!(LABEL_TABLE[10].label.as_bytes(), LABEL_BYTES_DISCOUNT);
        assert_eq!(LABEL_TABLE[11].label.as_bytes(), LABEL_BYTES_VAT);
    }

    const LABEL_BYTES_DISCOUNT: &[u8] = &[
        225, 137, 133, 225, 138, 147, 225, 136, 189, 47, 100, 105, 115, 99, 111, 117, 110, 116,
        97, 109, 111, 117, 110, 116,
    ];
    const LABEL_BYTES_VAT: &[u8] = &[
        49, 53, 37, 225, 137, 171, 225, 137, 181, 47, 118, 97, 116,
    ];

    #[test]
    fn test_lookup() {
        let e = lookup("የክፍያቁጥር/receiptno.").unwrap();
        assert_eq!(e.key, FieldKey::ReceiptNo);
        assert_eq!(e.cell_offset, 2);
        assert!(lookup("payername").is_none());
        assert!(lookup("").is_none());
    }
}
