//! Parameter mapping handed to the tool wrapper
//!
//! A [`ParameterMap`] is built exactly once per call. The same value is
//! passed to the wrapper and recorded in the result metadata, so callers can
//! see precisely what the external tool was asked to do.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Integer(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&Path> for ParamValue {
    fn from(value: &Path) -> Self {
        ParamValue::Text(value.to_string_lossy().into_owned())
    }
}

/// Name → value mapping passed to the tool wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap {
    entries: BTreeMap<String, ParamValue>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder pattern)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_f64)
    }

    /// Boolean flag; absent flags read as `false`
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(ParamValue::as_bool).unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let params = ParameterMap::new()
            .with("infile", Path::new("/data/t1.nii.gz"))
            .with("fractional_intensity", 0.5)
            .with("dof", 12i64)
            .with("binary_mask", true);

        assert_eq!(params.get_str("infile"), Some("/data/t1.nii.gz"));
        assert_eq!(params.get_f64("fractional_intensity"), Some(0.5));
        assert_eq!(params.get_i64("dof"), Some(12));
        assert_eq!(params.get_f64("dof"), Some(12.0));
        assert!(params.flag("binary_mask"));
        assert!(!params.flag("missing"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let params = ParameterMap::new()
            .with("cost", "corratio")
            .with("dof", 12i64)
            .with("fractional_intensity", 0.5);

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"cost": "corratio", "dof": 12, "fractional_intensity": 0.5})
        );
    }

    #[test]
    fn test_deserialize_keeps_integer_and_float_apart() {
        let params: ParameterMap =
            serde_json::from_str(r#"{"classes": 3, "fractional_intensity": 0.5, "all": true}"#)
                .unwrap();

        assert_eq!(params.get("classes"), Some(&ParamValue::Integer(3)));
        assert_eq!(params.get("fractional_intensity"), Some(&ParamValue::Float(0.5)));
        assert_eq!(params.get("all"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::Float(0.5).to_string(), "0.5");
        assert_eq!(ParamValue::Integer(6).to_string(), "6");
        assert_eq!(ParamValue::Text("csd".into()).to_string(), "csd");
    }
}
