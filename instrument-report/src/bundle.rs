// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Untyped key/value bundles passed along with host callbacks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bundle key for the fully qualified class name of the current test.
pub const REPORT_KEY_NAME_CLASS: &str = "class";

/// Bundle key for the method name of the current test.
pub const REPORT_KEY_NAME_TEST: &str = "test";

/// Bundle key for the stack trace of a test that did not succeed.
pub const REPORT_KEY_STACK: &str = "stack";

/// Bundle key for the 1-based sequence number of the current test.
pub const REPORT_KEY_NUM_CURRENT: &str = "current";

/// Bundle key for the total number of tests in the run.
pub const REPORT_KEY_NUM_TOTAL: &str = "numtests";

/// A bundle of values supplied by the instrumentation host.
///
/// Hosts do not guarantee the presence or the type of any field, so accessors return `None` (or
/// a default) rather than failing. Insertion order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusBundle {
    values: IndexMap<String, BundleValue>,
}

impl StatusBundle {
    /// Creates a new, empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<BundleValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns the value for the key, if present.
    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.values.get(key)
    }

    /// Returns the value for the key if it is present and is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(BundleValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value for the key as a boolean flag.
    ///
    /// Only a boolean `true` or a string equal to `"true"` (ignoring ASCII case) is true.
    /// Everything else, including a missing key, is false.
    pub fn get_flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(BundleValue::Bool(b)) => *b,
            Some(BundleValue::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Returns the number of entries in the bundle.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the bundle has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the entries of the bundle in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BundleValue)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for StatusBundle
where
    K: Into<String>,
    V: Into<BundleValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A single value in a [`StatusBundle`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleValue {
    /// A boolean.
    Bool(bool),

    /// An integer.
    Int(i64),

    /// A floating-point number, or an integer outside the range of `i64`.
    Float(f64),

    /// A string.
    String(String),
}

impl fmt::Display for BundleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleValue::Bool(b) => write!(f, "{b}"),
            BundleValue::Int(n) => write!(f, "{n}"),
            BundleValue::Float(x) => write!(f, "{x}"),
            BundleValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for BundleValue {
    fn from(value: bool) -> Self {
        BundleValue::Bool(value)
    }
}

impl From<i64> for BundleValue {
    fn from(value: i64) -> Self {
        BundleValue::Int(value)
    }
}

impl From<String> for BundleValue {
    fn from(value: String) -> Self {
        BundleValue::String(value)
    }
}

impl From<&str> for BundleValue {
    fn from(value: &str) -> Self {
        BundleValue::String(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(BundleValue::Bool(true), true ; "bool true")]
    #[test_case(BundleValue::Bool(false), false ; "bool false")]
    #[test_case("true".into(), true ; "string true")]
    #[test_case("TRUE".into(), true ; "string upper")]
    #[test_case("yes".into(), false ; "string other")]
    #[test_case(BundleValue::Int(1), false ; "integer")]
    fn flag_semantics(value: BundleValue, expected: bool) {
        let bundle: StatusBundle = [("disableAnalytics", value)].into_iter().collect();
        assert_eq!(bundle.get_flag("disableAnalytics"), expected);
        assert!(!bundle.get_flag("missing"));
    }

    #[test]
    fn deserialize_untyped_values() {
        let bundle: StatusBundle = serde_json::from_str(
            r#"{"class": "com.example.FooTest", "current": 3, "flag": true}"#,
        )
        .expect("bundle deserializes");

        assert_eq!(bundle.get_str(REPORT_KEY_NAME_CLASS), Some("com.example.FooTest"));
        assert_eq!(bundle.get(REPORT_KEY_NUM_CURRENT), Some(&BundleValue::Int(3)));
        assert_eq!(bundle.get_str(REPORT_KEY_NUM_CURRENT), None, "not a string");
        assert_eq!(bundle.get("flag"), Some(&BundleValue::Bool(true)));
        assert_eq!(
            bundle.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            ["class", "current", "flag"],
            "insertion order is preserved"
        );
    }

    #[test]
    fn deserialize_numbers() {
        let bundle: StatusBundle =
            serde_json::from_str(r#"{"current": 1.0, "numtests": 18446744073709551615}"#)
                .expect("non-i64 numbers deserialize");

        assert_eq!(bundle.get(REPORT_KEY_NUM_CURRENT), Some(&BundleValue::Float(1.0)));
        assert!(matches!(
            bundle.get(REPORT_KEY_NUM_TOTAL),
            Some(BundleValue::Float(_))
        ));
    }
}
