//! Turning a Rhai script into a plugin export

use crate::operation::{is_valid_operation_name, Arity, Operation, Value};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::{OperationSpec, PluginExport, PluginMetadata};
use crate::script::convert::{domain_error, from_dynamic, to_dynamic};
use crate::script::engine::new_engine;
use rhai::{Dynamic, Engine, FnPtr, Map, ParseErrorType, Scope, AST};
use std::sync::Arc;

/// Scope variable holding the name -> function map
const EXPORT: &str = "operations";
/// Optional scope variable mapping operation names to descriptions
const DESCRIPTIONS: &str = "descriptions";
/// Sole parameter name that marks a function as variadic
const VARIADIC_PARAM: &str = "args";

/// Compile and run a plugin script, then collect its export
///
/// Syntax errors and failing top-level code are `LoadFailure`s; a missing,
/// malformed or non-callable export is a `ContractViolation`.
pub fn compile_script(id: &str, text: &str) -> PluginResult<PluginExport> {
    let engine = Arc::new(new_engine(id));
    let ast = match engine.compile(text) {
        Ok(ast) => Arc::new(ast),
        Err(err) => {
            return Err(match err.err_type() {
                ParseErrorType::DuplicatedProperty(name) => {
                    PluginError::contract(id, format!("duplicate operation name '{}'", name))
                }
                _ => PluginError::load_failure(id, format!("syntax error: {}", err)),
            })
        }
    };

    let mut scope = Scope::new();
    engine
        .run_ast_with_scope(&mut scope, &ast)
        .map_err(|err| PluginError::load_failure(id, format!("top-level code failed: {}", err)))?;

    let mut export = PluginExport {
        metadata: PluginMetadata {
            description: text_variable(id, &scope, "plugin_description")?,
            version: text_variable(id, &scope, "plugin_version")?,
            author: text_variable(id, &scope, "plugin_author")?,
        },
        operations: Vec::new(),
    };

    let operations = match scope.get_value::<Dynamic>(EXPORT) {
        Some(value) => {
            let found = value.type_name();
            value.try_cast::<Map>().ok_or_else(|| {
                PluginError::contract(
                    id,
                    format!("'{}' must be an object map, found {}", EXPORT, found),
                )
            })?
        }
        None => {
            return Err(PluginError::contract(
                id,
                format!("missing '{}' export", EXPORT),
            ))
        }
    };
    let descriptions = scope
        .get_value::<Dynamic>(DESCRIPTIONS)
        .and_then(|value| value.try_cast::<Map>())
        .unwrap_or_default();

    for (name, value) in operations {
        let name = name.to_string();
        if name.is_empty() {
            return Err(PluginError::contract(id, "operation with an empty name"));
        }
        if !is_valid_operation_name(&name) {
            return Err(PluginError::contract(
                id,
                format!("invalid operation name '{}'", name),
            ));
        }

        let found = value.type_name();
        let function = value.try_cast::<FnPtr>().ok_or_else(|| {
            PluginError::contract(
                id,
                format!("operation '{}' is not callable (found {})", name, found),
            )
        })?;
        let arity = arity_of(id, &name, &function, &ast)?;
        let description = descriptions
            .get(name.as_str())
            .and_then(|text| text.clone().into_string().ok());

        let operation = bind(arity, function, Arc::clone(&engine), Arc::clone(&ast));
        export.push(
            OperationSpec {
                name,
                description,
                arity,
            },
            operation,
        );
    }

    Ok(export)
}

fn text_variable(id: &str, scope: &Scope, name: &str) -> PluginResult<Option<String>> {
    match scope.get_value::<Dynamic>(name) {
        None => Ok(None),
        Some(value) => {
            let found = value.type_name();
            value.into_string().map(Some).map_err(|_| {
                PluginError::contract(id, format!("'{}' must be a string, found {}", name, found))
            })
        }
    }
}

/// Arity from the script function's declared parameters, less the values a
/// closure has already captured
fn arity_of(id: &str, name: &str, function: &FnPtr, ast: &AST) -> PluginResult<Arity> {
    let signatures: Vec<Vec<&str>> = ast
        .iter_functions()
        .filter(|meta| meta.name == function.fn_name())
        .map(|meta| meta.params)
        .collect();

    let params = match signatures.as_slice() {
        [params] => params,
        [] => {
            return Err(PluginError::contract(
                id,
                format!(
                    "operation '{}' is not callable (no script function '{}')",
                    name,
                    function.fn_name()
                ),
            ))
        }
        _ => {
            return Err(PluginError::contract(
                id,
                format!(
                    "operation '{}' refers to overloaded function '{}'",
                    name,
                    function.fn_name()
                ),
            ))
        }
    };

    let own = &params[function.curry().len().min(params.len())..];
    Ok(match own {
        [only] if *only == VARIADIC_PARAM => Arity::Variadic,
        _ => Arity::Exact(own.len()),
    })
}

fn bind(arity: Arity, function: FnPtr, engine: Arc<Engine>, ast: Arc<AST>) -> Operation {
    Operation::new(arity, move |args: &[Value]| {
        let call_args: Vec<Dynamic> = match arity {
            Arity::Variadic => vec![to_dynamic(&Value::List(Value::flatten(args)))],
            Arity::Exact(_) => args.iter().map(to_dynamic).collect(),
        };
        let result = function
            .call::<Dynamic>(&engine, &ast, call_args)
            .map_err(domain_error)?;
        from_dynamic(result)
    })
}
