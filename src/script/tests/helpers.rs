//! Numeric helpers available to every script

use crate::script::new_engine;
use rhai::FLOAT;

fn eval(expr: &str) -> Result<FLOAT, String> {
    new_engine("t")
        .eval::<FLOAT>(expr)
        .map_err(|err| err.to_string())
}

#[test]
fn test_aggregates_accept_ints_and_floats() {
    assert_eq!(eval("sum([1, 2.5, 3])").unwrap(), 6.5);
    assert_eq!(eval("product([2, 3.0, 4])").unwrap(), 24.0);
    assert_eq!(eval("min([3, -1.5, 2])").unwrap(), -1.5);
    assert_eq!(eval("max([3, -1.5, 2])").unwrap(), 3.0);
    assert_eq!(eval("sum([])").unwrap(), 0.0);
}

#[test]
fn test_aggregates_reject_bad_input() {
    assert!(eval("min([])").unwrap_err().contains("empty list"));
    assert!(eval("sum([1, \"two\"])")
        .unwrap_err()
        .contains("expected a number"));
}
