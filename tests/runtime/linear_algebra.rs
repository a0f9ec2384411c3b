//! The linear algebra demo plugin: vectors as lists, matrices as lists of rows

use crate::common::{as_number, assert_close, demo_plugin_dir};
use plugcalc::operation::Value;
use plugcalc::plugin::api::{DiscoveryConfig, PluginError, PluginManager, SharedPluginManager};

fn runtime() -> SharedPluginManager {
    let runtime = SharedPluginManager::new(PluginManager::with_config(
        DiscoveryConfig::with_path(demo_plugin_dir())
            .without_builtins()
            .excluding(["finance", "statistics", "units"]),
    ));
    let report = runtime.discover().unwrap();
    assert_eq!(report.loaded, vec!["linear_algebra".to_string()], "{}", report);
    runtime
}

fn value(text: &str) -> Value {
    text.parse().unwrap()
}

fn call(runtime: &SharedPluginManager, name: &str, args: &[&str]) -> Value {
    let args: Vec<Value> = args.iter().map(|text| value(text)).collect();
    runtime.dispatch(name, &args).unwrap()
}

fn failure(runtime: &SharedPluginManager, name: &str, args: &[&str]) -> String {
    let args: Vec<Value> = args.iter().map(|text| value(text)).collect();
    match runtime.dispatch(name, &args) {
        Err(PluginError::OperationFailed { cause, .. }) => cause.message().to_string(),
        other => panic!("expected a domain error from {}, got {:?}", name, other),
    }
}

#[test]
fn test_dot_product() {
    let runtime = runtime();
    assert_eq!(call(&runtime, "dot_product", &["[1, 2, 3]", "[4, 5, 6]"]), Value::Number(32.0));
    assert_eq!(call(&runtime, "dot_product", &["[1, 0]", "[0, 1]"]), Value::Number(0.0));
    assert_eq!(call(&runtime, "dot_product", &["[3, 4]", "[3, 4]"]), Value::Number(25.0));

    assert_eq!(
        failure(&runtime, "dot_product", &["[1, 2]", "[1, 2, 3]"]),
        "Vectors must have the same dimension"
    );
    assert_eq!(failure(&runtime, "dot_product", &["[]", "[]"]), "Vectors cannot be empty");
}

#[test]
fn test_cross_product() {
    let runtime = runtime();
    assert_eq!(
        call(&runtime, "cross_product", &["[1, 0, 0]", "[0, 1, 0]"]),
        Value::List(vec![0.0, 0.0, 1.0])
    );
    assert_eq!(
        call(&runtime, "cross_product", &["[1, 2, 3]", "[2, 4, 6]"]),
        Value::List(vec![0.0, 0.0, 0.0])
    );

    // perpendicular to both inputs, and anticommutative
    let product = call(&runtime, "cross_product", &["[1, 2, 3]", "[4, 5, 6]"]);
    let text = product.to_string();
    assert_eq!(call(&runtime, "dot_product", &[text.as_str(), "[1, 2, 3]"]), Value::Number(0.0));
    assert_eq!(call(&runtime, "dot_product", &[text.as_str(), "[4, 5, 6]"]), Value::Number(0.0));
    let reversed = call(&runtime, "cross_product", &["[4, 5, 6]", "[1, 2, 3]"]);
    let negated: Vec<f64> = reversed.as_list().unwrap().iter().map(|x| -x).collect();
    assert_eq!(product, Value::List(negated));

    assert_eq!(
        failure(&runtime, "cross_product", &["[1, 2]", "[3, 4]"]),
        "Cross product requires 3D vectors"
    );
}

#[test]
fn test_magnitude_and_normalize() {
    let runtime = runtime();
    assert_eq!(call(&runtime, "magnitude", &["[3, 4]"]), Value::Number(5.0));
    assert_eq!(call(&runtime, "magnitude", &["[1, 0, 0]"]), Value::Number(1.0));
    assert_eq!(call(&runtime, "magnitude", &["[1, 2, 2]"]), Value::Number(3.0));
    assert_eq!(failure(&runtime, "magnitude", &["[]"]), "Vector cannot be empty");

    let unit = call(&runtime, "normalize", &["[3, 4]"]);
    let items = unit.as_list().unwrap();
    assert_close(items[0], 0.6);
    assert_close(items[1], 0.8);
    assert_close(as_number(call(&runtime, "magnitude", &[unit.to_string().as_str()])), 1.0);
    assert_eq!(
        call(&runtime, "normalize", &["[1, 0, 0]"]),
        Value::List(vec![1.0, 0.0, 0.0])
    );
    assert_eq!(failure(&runtime, "normalize", &["[0, 0]"]), "Cannot normalize zero vector");
}

#[test]
fn test_matrix_multiply() {
    let runtime = runtime();
    assert_eq!(
        call(&runtime, "matrix_multiply", &["[[1, 2], [3, 4]]", "[[5, 6], [7, 8]]"]),
        value("[[19, 22], [43, 50]]")
    );
    assert_eq!(
        call(&runtime, "matrix_multiply", &["[[1, 2], [3, 4]]", "[[1, 0], [0, 1]]"]),
        value("[[1, 2], [3, 4]]")
    );
    assert_eq!(
        call(&runtime, "matrix_multiply", &["[[1, 2, 3]]", "[[4], [5], [6]]"]),
        Value::Matrix(vec![vec![32.0]])
    );

    assert_eq!(
        failure(&runtime, "matrix_multiply", &["[[1, 2]]", "[[3, 4, 5]]"]),
        "Cannot multiply 1×2 by 1×3 matrices"
    );
    assert_eq!(
        failure(&runtime, "matrix_multiply", &["[]", "[1]"]),
        "First matrix cannot be empty"
    );
    assert_eq!(
        failure(&runtime, "matrix_multiply", &["[[1, 2], [3]]", "[[4], [5]]"]),
        "First matrix must be rectangular"
    );
}

#[test]
fn test_transpose() {
    let runtime = runtime();
    assert_eq!(call(&runtime, "transpose", &["[[1, 2], [3, 4]]"]), value("[[1, 3], [2, 4]]"));
    assert_eq!(
        call(&runtime, "transpose", &["[[1, 2, 3], [4, 5, 6]]"]),
        value("[[1, 4], [2, 5], [3, 6]]")
    );
    assert_eq!(call(&runtime, "transpose", &["[[1, 2, 3]]"]), value("[[1], [2], [3]]"));

    let symmetric = "[[1, 2, 3], [2, 4, 5], [3, 5, 6]]";
    assert_eq!(call(&runtime, "transpose", &[symmetric]), value(symmetric));
    let once = call(&runtime, "transpose", &["[[1, 2], [3, 4], [5, 6]]"]).to_string();
    assert_eq!(call(&runtime, "transpose", &[once.as_str()]), value("[[1, 2], [3, 4], [5, 6]]"));

    assert_eq!(failure(&runtime, "transpose", &["[]"]), "Matrix cannot be empty");
    assert_eq!(
        failure(&runtime, "transpose", &["[[1, 2], [3]]"]),
        "Matrix must be rectangular"
    );
}

#[test]
fn test_determinant() {
    let runtime = runtime();
    let det = |text: &str| as_number(call(&runtime, "determinant", &[text]));
    assert_eq!(det("[[1, 2], [3, 4]]"), -2.0);
    assert_eq!(det("[[1, 0], [0, 1]]"), 1.0);
    assert_eq!(det("[[1, 2, 3], [4, 5, 6], [7, 8, 9]]"), 0.0);
    assert_eq!(det("[[1, 0, 0], [0, 1, 0], [0, 0, 1]]"), 1.0);
    assert_eq!(det("[[2, 3, 1], [1, 2, 3], [3, 1, 2]]"), 18.0);

    assert_eq!(
        failure(&runtime, "determinant", &["[[1, 2, 3], [4, 5, 6]]"]),
        "Determinant requires square matrix"
    );
    assert_eq!(
        failure(
            &runtime,
            "determinant",
            &["[[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]"]
        ),
        "Determinant only implemented for 2×2 and 3×3 matrices"
    );
    assert_eq!(failure(&runtime, "determinant", &["[]"]), "Matrix cannot be empty");
}
