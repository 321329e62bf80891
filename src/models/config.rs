//! Typed interpretation of config store values.
//!
//! Values are persisted as serialized JSON and re-interpreted through their
//! declared type on every read, so the store tolerates loosely serialized
//! payloads (a number saved as `"100"`, an array saved as its JSON text).

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Declared interpretation of a `ConfigEntry` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Date,
}

impl ConfigType {
    pub const ALL: [Self; 6] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Array,
        Self::Object,
        Self::Date,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            "date" => Ok(Self::Date),
            _ => Err(()),
        }
    }
}

/// Coerce a raw stored value to its declared type.
///
/// Misses are not errors: an unparseable number becomes `null`, an absent or
/// unparseable array/object becomes the empty collection.
#[must_use]
pub fn coerce(config_type: ConfigType, raw: &Value) -> Value {
    match config_type {
        ConfigType::Number => coerce_number(raw),
        ConfigType::Boolean => Value::Bool(
            matches!(raw, Value::Bool(true)) || raw.as_str().is_some_and(|s| s == "true"),
        ),
        ConfigType::Array => match raw {
            Value::Array(_) => raw.clone(),
            Value::String(s) => serde_json::from_str::<Value>(s)
                .ok()
                .filter(Value::is_array)
                .unwrap_or_else(|| Value::Array(vec![])),
            _ => Value::Array(vec![]),
        },
        ConfigType::Object => match raw {
            Value::Object(_) => raw.clone(),
            Value::String(s) => serde_json::from_str::<Value>(s)
                .ok()
                .filter(Value::is_object)
                .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
            _ => Value::Object(serde_json::Map::new()),
        },
        ConfigType::String | ConfigType::Date => raw.clone(),
    }
}

fn coerce_number(raw: &Value) -> Value {
    match raw {
        Value::Number(_) => raw.clone(),
        Value::String(s) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                Value::from(i)
            } else if let Ok(f) = s.trim().parse::<f64>() {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        Value::Bool(b) => Value::from(i32::from(*b)),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_round_trip() {
        for t in ConfigType::ALL {
            assert_eq!(t.as_str().parse::<ConfigType>().unwrap(), t);
        }
        assert!("decimal".parse::<ConfigType>().is_err());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce(ConfigType::Number, &json!(100)), json!(100));
        assert_eq!(coerce(ConfigType::Number, &json!("100")), json!(100));
        assert_eq!(coerce(ConfigType::Number, &json!("2.5")), json!(2.5));
        assert_eq!(coerce(ConfigType::Number, &json!("abc")), Value::Null);
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(coerce(ConfigType::Boolean, &json!(true)), json!(true));
        assert_eq!(coerce(ConfigType::Boolean, &json!("true")), json!(true));
        assert_eq!(coerce(ConfigType::Boolean, &json!("yes")), json!(false));
        assert_eq!(coerce(ConfigType::Boolean, &json!(false)), json!(false));
        assert_eq!(coerce(ConfigType::Boolean, &json!(1)), json!(false));
    }

    #[test]
    fn test_coerce_array_passthrough_and_parse() {
        assert_eq!(coerce(ConfigType::Array, &json!([1, 2])), json!([1, 2]));
        assert_eq!(coerce(ConfigType::Array, &json!("[1,2]")), json!([1, 2]));
        assert_eq!(coerce(ConfigType::Array, &json!("not json")), json!([]));
        assert_eq!(coerce(ConfigType::Array, &json!(7)), json!([]));
    }

    #[test]
    fn test_coerce_object_passthrough_and_parse() {
        assert_eq!(coerce(ConfigType::Object, &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(
            coerce(ConfigType::Object, &json!("{\"a\":1}")),
            json!({"a": 1})
        );
        assert_eq!(coerce(ConfigType::Object, &json!("[]")), json!({}));
        assert_eq!(coerce(ConfigType::Object, &Value::Null), json!({}));
    }

    #[test]
    fn test_string_and_date_returned_as_stored() {
        assert_eq!(coerce(ConfigType::String, &json!("hello")), json!("hello"));
        assert_eq!(
            coerce(ConfigType::Date, &json!("2026-01-01T00:00:00Z")),
            json!("2026-01-01T00:00:00Z")
        );
    }
}
