use crate::definition::ConfigDef;
use crate::error::Result;
use crate::value::Value;

use super::{ConfigType, mismatch};

/// Free text; `+=` concatenates
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl ConfigType for StringType {
    fn name(&self) -> &'static str {
        "string"
    }

    fn string_set(&self, _def: &ConfigDef, text: &str) -> Result<Value> {
        Ok(Value::String(text.to_string()))
    }

    fn string_get(&self, value: &Value) -> String {
        value.to_string()
    }

    fn native_check(&self, def: &ConfigDef, value: &Value) -> Result<()> {
        match value {
            Value::String(_) => Ok(()),
            other => Err(mismatch(def, "string", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::String(s) if s.is_empty())
    }

    fn plus_equals(&self, def: &ConfigDef, current: &Value, text: &str) -> Result<Value> {
        match current {
            Value::String(s) => Ok(Value::String(format!("{s}{text}"))),
            other => Err(mismatch(def, "string", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTag;

    #[test]
    fn test_plus_equals_concatenates() {
        let def = ConfigDef::new("Apple", TypeTag::STRING);
        let value = StringType
            .plus_equals(&def, &Value::from("foo"), "bar")
            .unwrap();
        assert_eq!(value, Value::from("foobar"));
    }

    #[test]
    fn test_native_check_rejects_other_variants() {
        let def = ConfigDef::new("Apple", TypeTag::STRING);
        let err = StringType.native_check(&def, &Value::Number(1)).unwrap_err();
        assert_eq!(err.to_string(), "Option Apple expects a string value, got number");
    }
}
