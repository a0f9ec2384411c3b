//! Engine factory
//!
//! Every load builds its own engine so nothing registered or cached by one
//! plugin generation is visible to the next.

use rhai::{Array, Dynamic, Engine, EvalAltResult, FLOAT};

// Debug builds spend far more stack per nesting level
#[cfg(debug_assertions)]
const MAX_EXPR_DEPTHS: (usize, usize) = (32, 24);
#[cfg(not(debug_assertions))]
const MAX_EXPR_DEPTHS: (usize, usize) = (64, 48);

#[cfg(debug_assertions)]
const MAX_CALL_LEVELS: usize = 8;
#[cfg(not(debug_assertions))]
const MAX_CALL_LEVELS: usize = 48;

/// Upper bound on work per top-level run or per operation call
const MAX_OPERATIONS: u64 = 500_000;
const MAX_ARRAY_SIZE: usize = 100_000;
const MAX_STRING_SIZE: usize = 64 * 1024;
const MAX_MAP_SIZE: usize = 10_000;

/// A sandboxed engine for the plugin `id`, with the numeric helpers
/// plugins rely on registered
pub fn new_engine(id: &str) -> Engine {
    let mut engine = Engine::new();
    engine
        .set_max_expr_depths(MAX_EXPR_DEPTHS.0, MAX_EXPR_DEPTHS.1)
        .set_max_call_levels(MAX_CALL_LEVELS)
        .set_max_operations(MAX_OPERATIONS)
        .set_max_array_size(MAX_ARRAY_SIZE)
        .set_max_string_size(MAX_STRING_SIZE)
        .set_max_map_size(MAX_MAP_SIZE);

    let plugin = id.to_string();
    engine.on_print(move |text| log::info!("[{}] {}", plugin, text));
    let plugin = id.to_string();
    engine.on_debug(move |text, _, position| {
        log::debug!("[{}] {} ({})", plugin, text, position)
    });

    engine
        .register_fn("sum", |items: Array| -> Result<FLOAT, Box<EvalAltResult>> {
            Ok(numbers(&items)?.iter().sum())
        })
        .register_fn("product", |items: Array| -> Result<FLOAT, Box<EvalAltResult>> {
            Ok(numbers(&items)?.iter().product())
        })
        .register_fn("min", |items: Array| -> Result<FLOAT, Box<EvalAltResult>> {
            extreme(&items, FLOAT::min)
        })
        .register_fn("max", |items: Array| -> Result<FLOAT, Box<EvalAltResult>> {
            extreme(&items, FLOAT::max)
        });

    engine
}

/// Read an array of INT or FLOAT as floats
pub(crate) fn numbers(items: &[Dynamic]) -> Result<Vec<FLOAT>, Box<EvalAltResult>> {
    items
        .iter()
        .map(|item| {
            item.as_float()
                .or_else(|_| item.as_int().map(|n| n as FLOAT))
                .map_err(|found| format!("expected a number, found {}", found).into())
        })
        .collect()
}

fn extreme(
    items: &[Dynamic],
    pick: fn(FLOAT, FLOAT) -> FLOAT,
) -> Result<FLOAT, Box<EvalAltResult>> {
    numbers(items)?
        .into_iter()
        .reduce(pick)
        .ok_or_else(|| "empty list has no extreme value".into())
}
