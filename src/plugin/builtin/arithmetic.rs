//! The `core` builtin plugin: the calculator's basic arithmetic

use crate::builtin;
use crate::operation::{Arity, DomainError, Value};
use crate::plugin::types::PluginExport;

builtin!("core", core_export);

pub fn core_export() -> PluginExport {
    PluginExport::new()
        .description("Basic arithmetic operations")
        .version(crate::PACKAGE_VERSION)
        .operation("+", Arity::Exact(2), |args| binary(args, |a, b| Ok(a + b)))
        .operation("-", Arity::Exact(2), |args| binary(args, |a, b| Ok(a - b)))
        .operation("*", Arity::Exact(2), |args| binary(args, |a, b| Ok(a * b)))
        .operation("/", Arity::Exact(2), |args| binary(args, divide))
        .operation("^", Arity::Exact(2), |args| binary(args, |a, b| Ok(a.powf(b))))
        .operation("%", Arity::Exact(2), |args| binary(args, modulo))
        .operation("!", Arity::Exact(1), |args| {
            factorial_of(args[0].as_number()?).map(Value::Number)
        })
}

fn binary(
    args: &[Value],
    f: impl Fn(f64, f64) -> Result<f64, DomainError>,
) -> Result<Value, DomainError> {
    f(args[0].as_number()?, args[1].as_number()?).map(Value::Number)
}

/// Largest n whose factorial is finite in an f64
const MAX_FINITE_FACTORIAL: f64 = 170.0;

fn divide(a: f64, b: f64) -> Result<f64, DomainError> {
    if b == 0.0 {
        return Err(DomainError::new("Cannot divide by zero"));
    }
    Ok(a / b)
}

fn modulo(a: f64, b: f64) -> Result<f64, DomainError> {
    if b == 0.0 {
        return Err(DomainError::new("Cannot take modulo by zero"));
    }
    Ok(a % b)
}

/// n! for non-negative integral n; anything past 170! is infinite
fn factorial_of(n: f64) -> Result<f64, DomainError> {
    if n < 0.0 {
        return Err(DomainError::new(
            "Factorial is not defined for negative numbers",
        ));
    }
    if n.is_nan() || (n.is_finite() && n.fract() != 0.0) {
        return Err(DomainError::new("Factorial is only defined for integers"));
    }
    if n > MAX_FINITE_FACTORIAL {
        return Ok(f64::INFINITY);
    }
    // n <= 170 here, so the loop is short and the cast exact
    Ok((2..=n as u32).fold(1.0, |acc, k| acc * f64::from(k)))
}
