//! JSON formatter
//!
//! A chain is an array of `{"type": name, "value": value}` objects. Nested chains become
//! arrays in the `value` slot, and a terminal cdr is kept under `"cdr"` as another
//! `{"type", "value"}` object. Values without a JSON counterpart are rendered through their
//! type.

use super::registry::{FormatError, Formatter};
use crate::treelex::cell::Cell;
use crate::treelex::types::{Type, Value};
use serde_json::{json, Map, Number};

fn value_to_json(value: &Value, value_type: &Type) -> Result<serde_json::Value, FormatError> {
    Ok(match value {
        Value::Empty => serde_json::Value::Null,
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::Integer(i) => json!(i),
        Value::Decimal(d) => Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                FormatError::SerializationError(format!(
                    "{} value {} has no JSON representation",
                    value_type.name(),
                    d
                ))
            })?,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Cell(chain) => to_json_value(chain)?,
        Value::Custom(_) => serde_json::Value::String(value_type.value_to_string(value)),
    })
}

fn typed(value: &Value, value_type: &Type) -> Result<Map<String, serde_json::Value>, FormatError> {
    let mut object = Map::new();
    object.insert("type".to_string(), json!(value_type.name()));
    object.insert("value".to_string(), value_to_json(value, value_type)?);
    Ok(object)
}

/// Build the JSON tree for a chain
pub fn to_json_value(chain: &Cell) -> Result<serde_json::Value, FormatError> {
    let mut cells = Vec::new();
    for cell in chain.iter() {
        let mut object = typed(&cell.car(), &cell.car_type())?;
        match cell.cdr() {
            Value::Cell(_) | Value::Empty => {}
            cdr => {
                let cdr = typed(&cdr, &cell.cdr_type())?;
                object.insert("cdr".to_string(), serde_json::Value::Object(cdr));
            }
        }
        cells.push(serde_json::Value::Object(object));
    }
    Ok(serde_json::Value::Array(cells))
}

pub fn to_json_str(chain: &Cell) -> Result<String, FormatError> {
    let value = to_json_value(chain)?;
    serde_json::to_string_pretty(&value).map_err(|e| FormatError::SerializationError(e.to_string()))
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, chain: &Cell) -> Result<String, FormatError> {
        to_json_str(chain)
    }

    fn description(&self) -> &str {
        "JSON array of typed cells, nested chains as arrays"
    }
}
