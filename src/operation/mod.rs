//! Operation Values and Callables
//!
//! Defines the tagged capability every plugin exports: a callable over an
//! argument list that returns either a [`Value`] or a [`DomainError`].

pub(crate) mod error;
pub(crate) mod value;

pub use error::DomainError;
pub use value::Value;

use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Identifier-style names (`mean`, `dot_product`) or purely symbolic ones (`+`, `**`, `!`)
static OPERATION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_]*|[-+*/^%!<>=&|~]+)$")
        .expect("valid operation name regex")
});

/// Check whether a string is usable as an operation name
pub fn is_valid_operation_name(name: &str) -> bool {
    OPERATION_NAME.is_match(name)
}

/// Number of arguments an operation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => *n == count,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Variadic => write!(f, "variadic"),
        }
    }
}

type OperationFn = dyn Fn(&[Value]) -> Result<Value, DomainError> + Send + Sync;

/// A callable contributed by a plugin
///
/// Cloning is cheap; clones share the same underlying function so the
/// registry and the owning plugin record can both hold it.
#[derive(Clone)]
pub struct Operation {
    arity: Arity,
    func: Arc<OperationFn>,
}

impl Operation {
    pub fn new<F>(arity: Arity, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, DomainError> + Send + Sync + 'static,
    {
        Self {
            arity,
            func: Arc::new(func),
        }
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Invoke the operation after checking the argument count
    pub fn call(&self, args: &[Value]) -> Result<Value, DomainError> {
        if !self.arity.accepts(args.len()) {
            return Err(DomainError::new(format!(
                "expected {} argument(s), got {}",
                self.arity,
                args.len()
            )));
        }
        (self.func)(args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
