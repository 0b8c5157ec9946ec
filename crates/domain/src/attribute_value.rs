//! Typed values for the extended attribute map an entity exposes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u8> for AttributeValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for AttributeValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Ordered attribute map, so serialized output is stable.
pub type Attributes = BTreeMap<String, AttributeValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_string_variant_as_plain_string() {
        let val = AttributeValue::from("Middle");
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "\"Middle\"");
    }

    #[test]
    fn should_serialize_int_variant_as_number() {
        let val = AttributeValue::from(45_u8);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "45");
    }

    #[test]
    fn should_serialize_attribute_map_in_key_order() {
        let mut attrs = Attributes::new();
        attrs.insert("room".to_string(), "Lounge".into());
        attrs.insert("is_open".to_string(), false.into());
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"is_open":false,"room":"Lounge"}"#);
    }
}
