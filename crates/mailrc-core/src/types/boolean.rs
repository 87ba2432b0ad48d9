use crate::definition::ConfigDef;
use crate::error::{Error, Result};
use crate::value::Value;

use super::{ConfigType, mismatch};

/// `yes`/`no` switches
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl ConfigType for BoolType {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn string_set(&self, def: &ConfigDef, text: &str) -> Result<Value> {
        match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(Value::Bool(true)),
            "no" | "false" | "off" | "0" | "" => Ok(Value::Bool(false)),
            _ => Err(Error::InvalidValue {
                name: def.name.clone(),
                reason: format!("invalid boolean value: {text}"),
            }),
        }
    }

    fn string_get(&self, value: &Value) -> String {
        value.to_string()
    }

    fn native_check(&self, def: &ConfigDef, value: &Value) -> Result<()> {
        match value {
            Value::Bool(_) => Ok(()),
            other => Err(mismatch(def, "bool", other)),
        }
    }

    fn is_empty(&self, _value: &Value) -> bool {
        false
    }

    fn quoted(&self) -> bool {
        false
    }
}
