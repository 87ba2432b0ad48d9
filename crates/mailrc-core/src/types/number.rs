use crate::definition::ConfigDef;
use crate::error::{Error, Result};
use crate::flags::DefFlags;
use crate::value::Value;

use super::{ConfigType, mismatch};

/// Signed integers; `+=` adds
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberType;

impl NumberType {
    fn check_sign(def: &ConfigDef, n: i64) -> Result<()> {
        if n < 0 && def.flags.contains(DefFlags::NOT_NEGATIVE) {
            return Err(Error::InvalidValue {
                name: def.name.clone(),
                reason: format!("value may not be negative: {n}"),
            });
        }
        Ok(())
    }

    fn parse(def: &ConfigDef, text: &str) -> Result<i64> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse::<i64>().map_err(|e| Error::InvalidValue {
            name: def.name.clone(),
            reason: format!("invalid number {text:?}: {e}"),
        })
    }
}

impl ConfigType for NumberType {
    fn name(&self) -> &'static str {
        "number"
    }

    fn string_set(&self, def: &ConfigDef, text: &str) -> Result<Value> {
        let n = Self::parse(def, text)?;
        Self::check_sign(def, n)?;
        Ok(Value::Number(n))
    }

    fn string_get(&self, value: &Value) -> String {
        value.to_string()
    }

    fn native_check(&self, def: &ConfigDef, value: &Value) -> Result<()> {
        match value {
            Value::Number(n) => Self::check_sign(def, *n),
            other => Err(mismatch(def, "number", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Number(0))
    }

    fn plus_equals(&self, def: &ConfigDef, current: &Value, text: &str) -> Result<Value> {
        let Value::Number(base) = current else {
            return Err(mismatch(def, "number", current));
        };
        let delta = Self::parse(def, text)?;
        let sum = base.checked_add(delta).ok_or_else(|| Error::InvalidValue {
            name: def.name.clone(),
            reason: format!("{base} + {delta} overflows"),
        })?;
        Self::check_sign(def, sum)?;
        Ok(Value::Number(sum))
    }

    fn quoted(&self) -> bool {
        false
    }
}
