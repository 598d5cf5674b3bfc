//! Compare extracted receipt fields against expected values.
//!
//! Every check answers with a plain `bool`. A `false` means either that a
//! checked field differed or that there was nothing to check (empty
//! extraction, empty field list); use [`Verifier::mismatches`] to tell the
//! two apart.

use serde::Serialize;

use crate::types::{FieldValue, Fields};

/// Value equality across kinds.
///
/// Two absent values are equal. Text only equals text, numbers only equal
/// numbers (`NaN` equals nothing).
pub fn equals(a: Option<&FieldValue>, b: Option<&FieldValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(FieldValue::Text(a)), Some(FieldValue::Text(b))) => a == b,
        (Some(FieldValue::Number(a)), Some(FieldValue::Number(b))) => a == b,
        _ => false,
    }
}

/// A checked field whose extracted and expected values differ.
///
/// Absent sides are left out of the JSON form, so `null` always means an
/// unparseable amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<FieldValue>,
}

/// Verification over one extracted mapping and one expected mapping.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    extracted: &'a Fields,
    expected: &'a Fields,
}

impl<'a> Verifier<'a> {
    pub fn new(extracted: &'a Fields, expected: &'a Fields) -> Self {
        Self {
            extracted,
            expected,
        }
    }

    pub fn extracted(&self) -> &'a Fields {
        self.extracted
    }

    pub fn expected(&self) -> &'a Fields {
        self.expected
    }

    /// Run a custom check with `(extracted, expected)` and return its answer.
    pub fn verify<F>(&self, check: F) -> bool
    where
        F: FnOnce(&Fields, &Fields) -> bool,
    {
        check(self.extracted, self.expected)
    }

    /// Check every extracted field except those named in `exclude`.
    ///
    /// Keys present only in the expected mapping are never checked.
    /// Returns `false` when nothing was extracted.
    pub fn verify_all(&self, exclude: &[&str]) -> bool {
        if self.extracted.is_empty() {
            return false;
        }
        self.extracted
            .keys()
            .filter(|key| !exclude.contains(key))
            .all(|key| self.matches(key))
    }

    /// Check only the named fields, extracted against expected.
    ///
    /// Returns `false` when `fields` is empty. A name absent from both
    /// mappings counts as a match.
    pub fn verify_only(&self, fields: &[&str]) -> bool {
        if fields.is_empty() {
            return false;
        }
        fields.iter().all(|key| self.matches(key))
    }

    /// Every differing field among `keys`, or among all extracted keys when
    /// `keys` is empty.
    pub fn mismatches(&self, keys: &[&str]) -> Vec<Mismatch> {
        let checked: Vec<&str> = if keys.is_empty() {
            self.extracted.keys().collect()
        } else {
            keys.to_vec()
        };
        checked
            .into_iter()
            .filter(|key| !self.matches(key))
            .map(|key| Mismatch {
                key: key.to_string(),
                extracted: self.extracted.get(key).cloned(),
                expected: self.expected.get(key).cloned(),
            })
            .collect()
    }

    fn matches(&self, key: &str) -> bool {
        let ok = equals(self.extracted.get(key), self.expected.get(key));
        if !ok {
            tracing::debug!(key, "field mismatch");
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKey;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn demo_fields() -> Fields {
        [("to", "Kebede"), ("amount", "5000")].into_iter().collect()
    }

    #[test]
    fn test_equals_same_kind() {
        assert!(equals(Some(&text("a")), Some(&text("a"))));
        assert!(equals(
            Some(&FieldValue::Number(1.5)),
            Some(&FieldValue::Number(1.5))
        ));
        assert!(!equals(Some(&text("a")), Some(&text("b"))));
    }

    #[test]
    fn test_equals_absent() {
        assert!(equals(None, None));
        assert!(!equals(Some(&text("")), None));
        assert!(!equals(None, Some(&FieldValue::Number(0.0))));
    }

    #[test]
    fn test_equals_rejects_cross_kind() {
        assert!(!equals(Some(&text("5000")), Some(&FieldValue::Number(5000.0))));
        assert!(!equals(Some(&FieldValue::Number(5000.0)), Some(&text("5000"))));
    }

    #[test]
    fn test_equals_nan() {
        let nan = FieldValue::Number(f64::NAN);
        assert!(!equals(Some(&nan), Some(&nan)));
    }

    #[test]
    fn test_verify_custom_check() {
        let extracted = demo_fields();
        let expected = demo_fields();
        let v = Verifier::new(&extracted, &expected);
        assert!(v.verify(|p, e| equals(p.get("to"), e.get("to"))));
        assert!(!v.verify(|_, _| false));
    }

    #[test]
    fn test_verify_all_with_exclusion() {
        let extracted = demo_fields();
        let expected = demo_fields();
        let v = Verifier::new(&extracted, &expected);
        assert!(v.verify_all(&["payer_name"]));
        assert!(v.verify_all(&[]));
    }

    #[test]
    fn test_verify_all_cross_kind_fails() {
        let extracted = demo_fields();
        let mut expected = Fields::new();
        expected.insert("to", "Kebede");
        expected.insert("amount", 5000.0);
        let v = Verifier::new(&extracted, &expected);
        assert!(!v.verify_all(&[]));
        assert!(v.verify_all(&["amount"]));
    }

    #[test]
    fn test_verify_all_empty_extraction() {
        let extracted = Fields::new();
        let expected = demo_fields();
        assert!(!Verifier::new(&extracted, &expected).verify_all(&[]));
    }

    #[test]
    fn test_verify_all_ignores_expected_only_keys() {
        let extracted: Fields = [("to", "Kebede")].into_iter().collect();
        let expected = demo_fields();
        assert!(Verifier::new(&extracted, &expected).verify_all(&[]));
    }

    #[test]
    fn test_verify_only() {
        let extracted = demo_fields();
        let expected: Fields = [("to", "Kebede"), ("amount", "1")].into_iter().collect();
        let v = Verifier::new(&extracted, &expected);
        assert!(v.verify_only(&["to"]));
        assert!(!v.verify_only(&["to", "amount"]));
        assert!(!v.verify_only(&[]));
        assert!(v.verify_only(&["payer_name"]));
    }

    #[test]
    fn test_mismatch_json_tells_nan_from_absent() {
        let extracted: Fields = [("discount_amount", f64::NAN)].into_iter().collect();
        let expected = Fields::new();
        let diff = Verifier::new(&extracted, &expected).mismatches(&[]);
        assert_eq!(
            serde_json::to_string(&diff).unwrap(),
            r#"[{"key":"discount_amount","extracted":null}]"#
        );
    }

    #[test]
    fn test_mismatches() {
        let extracted = demo_fields();
        let expected: Fields = [("to", "Abebe"), ("amount", "5000")].into_iter().collect();
        let v = Verifier::new(&extracted, &expected);
        let diff = v.mismatches(&[]);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].key, FieldKey::To.as_str());
        assert_eq!(diff[0].expected, Some(text("Abebe")));
        assert!(v.mismatches(&["amount"]).is_empty());
    }
}
