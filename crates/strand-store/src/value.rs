//! State Values
//!
//! The mixed-type value model for media state, with deep structural
//! equality. Equality treats NaN as equal to itself so that repeated
//! snapshots of an unknown duration do not look like changes.

use std::collections::BTreeMap;

use serde::Serialize;

/// One piece of media state
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<StateValue>),
    Record(BTreeMap<String, StateValue>),
}

impl StateValue {
    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, StateValue>> {
        match self {
            StateValue::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Record builder for list-of-record state values
    pub fn record<I, K>(fields: I) -> StateValue
    where
        I: IntoIterator<Item = (K, StateValue)>,
        K: Into<String>,
    {
        StateValue::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        StateValue::Bool(b)
    }
}

impl From<f64> for StateValue {
    fn from(n: f64) -> Self {
        StateValue::Number(n)
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::Text(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::Text(s)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(l: Vec<StateValue>) -> Self {
        StateValue::List(l)
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => StateValue::Null,
        }
    }
}

/// Deep structural equality; `NaN == NaN` holds
pub fn values_eq(a: &StateValue, b: &StateValue) -> bool {
    match (a, b) {
        (StateValue::Null, StateValue::Null) => true,
        (StateValue::Bool(a), StateValue::Bool(b)) => a == b,
        (StateValue::Number(a), StateValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
        (StateValue::Text(a), StateValue::Text(b)) => a == b,
        (StateValue::List(a), StateValue::List(b)) => lists_eq(a, b),
        (StateValue::Record(a), StateValue::Record(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && values_eq(va, vb))
        }
        _ => false,
    }
}

/// List equality: length- and order-sensitive
pub fn lists_eq(a: &[StateValue], b: &[StateValue]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_eq(x, y))
}

impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        values_eq(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_equals_itself() {
        let a = StateValue::Number(f64::NAN);
        let b = StateValue::Number(f64::NAN);
        assert!(values_eq(&a, &b));
        assert!(!values_eq(&a, &StateValue::Number(1.0)));
    }

    #[test]
    fn test_nested_equality() {
        let make = || {
            StateValue::List(vec![
                StateValue::record([
                    ("label", StateValue::from("English")),
                    ("gap", StateValue::Number(f64::NAN)),
                ]),
                StateValue::Bool(true),
            ])
        };
        assert!(values_eq(&make(), &make()));
    }

    #[test]
    fn test_list_order_and_length_sensitive() {
        let a = vec![StateValue::Number(1.0), StateValue::Number(2.0)];
        let b = vec![StateValue::Number(2.0), StateValue::Number(1.0)];
        assert!(!lists_eq(&a, &b));
        assert!(!lists_eq(&a, &a[..1].to_vec()));
        assert!(lists_eq(&a, &a.clone()));
    }

    #[test]
    fn test_record_key_mismatch() {
        let a = StateValue::record([("a", StateValue::Bool(true))]);
        let b = StateValue::record([("b", StateValue::Bool(true))]);
        assert!(!values_eq(&a, &b));
    }

    #[test]
    fn test_type_mismatch() {
        assert!(!values_eq(&StateValue::Bool(true), &StateValue::Number(1.0)));
        assert!(!values_eq(&StateValue::Null, &StateValue::Text(String::new())));
    }
}
