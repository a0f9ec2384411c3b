//! Conversions between dispatcher values and Rhai values

use crate::operation::{DomainError, Value};
use crate::script::engine::numbers;
use rhai::{Array, Dynamic, EvalAltResult};

fn float_array(items: &[f64]) -> Array {
    items.iter().copied().map(Dynamic::from_float).collect()
}

pub fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Number(n) => Dynamic::from_float(*n),
        Value::List(items) => Dynamic::from_array(float_array(items)),
        Value::Matrix(rows) => Dynamic::from_array(
            rows.iter()
                .map(|row| Dynamic::from_array(float_array(row)))
                .collect(),
        ),
    }
}

/// Interpret a script result: numbers and booleans become numbers, arrays of
/// numbers become lists and non-empty arrays of arrays become matrices
pub fn from_dynamic(value: Dynamic) -> Result<Value, DomainError> {
    if let Ok(n) = value.as_float() {
        return Ok(Value::Number(n));
    }
    if let Ok(n) = value.as_int() {
        return Ok(Value::Number(n as f64));
    }
    if let Ok(flag) = value.as_bool() {
        return Ok(Value::Number(if flag { 1.0 } else { 0.0 }));
    }

    let type_name = value.type_name();
    let items = value.into_array().map_err(|_| {
        DomainError::new(format!("unsupported result type '{}'", type_name))
    })?;

    if !items.is_empty() && items.iter().all(Dynamic::is_array) {
        let rows = items
            .into_iter()
            .map(|row| {
                let row = row.into_array().map_err(DomainError::new)?;
                numbers(&row).map_err(domain_error)
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Matrix(rows));
    }
    numbers(&items).map(Value::List).map_err(domain_error)
}

/// The message a script raised, unwrapped from any call-site context
pub fn domain_error(mut err: Box<EvalAltResult>) -> DomainError {
    loop {
        match *err {
            EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => err = inner,
            EvalAltResult::ErrorRuntime(value, _) => return DomainError::new(value.to_string()),
            other => return DomainError::new(other.to_string()),
        }
    }
}
