//! Interactive calculator loop
//!
//! Input lines are either calculations dispatched through the plugin
//! runtime or `!` commands that drive the plugin lifecycle:
//!
//! ```text
//! 5 + 3            infix binary
//! mean 1 2 [3, 4]  prefix, any number of arguments
//! 5 !              postfix unary
//! !reload stats    lifecycle command
//! ```

use crate::app::cli::display;
use crate::core::logging::set_log_level;
use crate::core::styles::StyleRole;
use crate::operation::Value;
use crate::plugin::api::{PluginError, SharedPluginManager};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplError {
    #[error("Invalid format. Use: number operation number, operation arguments..., or number operation")]
    Format,

    #[error("Unbalanced brackets in '{0}'")]
    Unbalanced(String),

    #[error("Invalid number provided: {0}")]
    InvalidNumber(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command: {0}. Type !help for the list of commands")]
    UnknownCommand(String),

    #[error("Could not change log level: {0}")]
    LogLevel(String),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Help,
    Plugins,
    Ops,
    Discover,
    Load(PathBuf),
    Unload(String),
    Reload(String),
    Enable(String),
    Disable(String),
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplInput {
    Empty,
    Quit,
    Command(ReplCommand),
    Call { operation: String, arguments: Vec<Value> },
}

/// Split on whitespace, keeping `[ ... ]` groups together
fn tokenize(line: &str) -> Result<Vec<String>, ReplError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in line.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ReplError::Unbalanced(line.to_string()))?;
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if depth != 0 {
        return Err(ReplError::Unbalanced(line.to_string()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_value(token: &str) -> Result<Value, ReplError> {
    token
        .parse::<Value>()
        .map_err(|_| ReplError::InvalidNumber(token.to_string()))
}

fn looks_like_value(token: &str) -> bool {
    token.starts_with('[') || token.parse::<f64>().is_ok()
}

fn parse_command(tokens: &[String]) -> Result<ReplCommand, ReplError> {
    let name = tokens[0].to_ascii_lowercase();
    let argument = |usage: &'static str| {
        tokens.get(1).cloned().ok_or(ReplError::Usage(usage))
    };
    Ok(match name.as_str() {
        "!help" => ReplCommand::Help,
        "!plugins" => ReplCommand::Plugins,
        "!ops" => ReplCommand::Ops,
        "!discover" => ReplCommand::Discover,
        "!load" => ReplCommand::Load(PathBuf::from(argument("!load <path>")?)),
        "!unload" => ReplCommand::Unload(argument("!unload <plugin>")?),
        "!reload" => ReplCommand::Reload(argument("!reload <plugin>")?),
        "!enable" => ReplCommand::Enable(argument("!enable <plugin>")?),
        "!disable" => ReplCommand::Disable(argument("!disable <plugin>")?),
        "!log" => ReplCommand::LogLevel(argument("!log <level>")?),
        _ => return Err(ReplError::UnknownCommand(tokens[0].clone())),
    })
}

pub fn parse_line(line: &str) -> Result<ReplInput, ReplError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ReplInput::Empty);
    }
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
        return Ok(ReplInput::Quit);
    }

    let tokens = tokenize(trimmed)?;
    // "!" alone is the factorial operator, "!name" is a command
    if tokens[0].len() > 1 && tokens[0].starts_with('!') {
        return parse_command(&tokens).map(ReplInput::Command);
    }

    let (operation, operands): (String, Vec<&String>) = if looks_like_value(&tokens[0]) {
        match tokens.len() {
            2 if !looks_like_value(&tokens[1]) => (tokens[1].clone(), vec![&tokens[0]]),
            3 if !looks_like_value(&tokens[1]) => {
                (tokens[1].clone(), vec![&tokens[0], &tokens[2]])
            }
            _ => return Err(ReplError::Format),
        }
    } else {
        (tokens[0].clone(), tokens[1..].iter().collect())
    };

    let arguments = operands
        .into_iter()
        .map(|token| parse_value(token))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ReplInput::Call {
        operation,
        arguments,
    })
}

/// Whether the loop keeps reading after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    runtime: SharedPluginManager,
    use_color: bool,
}

const HELP: &str = "\
Calculations:
  a OP b           binary operation, e.g. 5 + 3
  OP a b ...       prefix operation, e.g. mean 1 2 3 or mean [1, 2, 3]
  OP [[a, b], ...] matrices are lists of rows, e.g. transpose [[1, 2], [3, 4]]
  a OP             unary operation, e.g. 5 !
Plugin commands:
  !plugins         list loaded plugins
  !ops             list operations and their plugins
  !load <path>     load a plugin file
  !unload <id>     unload a plugin
  !reload <id>     reload a plugin if its source changed
  !enable <id>     enable a plugin's operations
  !disable <id>    disable a plugin's operations
  !discover        load new plugins from the plugin directory
  !log <level>     change the log level, e.g. debug or plugcalc::plugin=trace
Type 'quit' to exit";

impl Repl {
    pub fn new(runtime: SharedPluginManager, use_color: bool) -> Self {
        Self { runtime, use_color }
    }

    /// Run one parsed input, writing its output to `out`
    pub fn execute(&self, input: ReplInput, out: &mut dyn Write) -> Result<Flow, ReplError> {
        match input {
            ReplInput::Empty => {}
            ReplInput::Quit => return Ok(Flow::Quit),
            ReplInput::Call {
                operation,
                arguments,
            } => {
                let result = self.runtime.dispatch(&operation, &arguments)?;
                let text = StyleRole::Result.paint(&result.to_string(), self.use_color);
                self.write(out, &format!("Result: {}", text));
            }
            ReplInput::Command(command) => self.execute_command(command, out)?,
        }
        Ok(Flow::Continue)
    }

    fn execute_command(&self, command: ReplCommand, out: &mut dyn Write) -> Result<(), ReplError> {
        match command {
            ReplCommand::Help => self.write(out, HELP),
            ReplCommand::Plugins => {
                let plugins = self
                    .runtime
                    .list_plugins()
                    .iter()
                    .map(|id| self.runtime.plugin_info(id))
                    .collect::<Result<Vec<_>, _>>()?;
                if plugins.is_empty() {
                    self.write(out, "No plugins loaded.");
                } else {
                    let table = display::plugin_table(&plugins, self.use_color);
                    self.write(out, table.to_string().trim_end());
                }
                let idle: Vec<String> = self
                    .runtime
                    .catalog()
                    .into_iter()
                    .filter(|id| !plugins.iter().any(|info| &info.id == id))
                    .collect();
                if !idle.is_empty() {
                    self.write(out, &format!("Known but not loaded: {}", idle.join(", ")));
                }
            }
            ReplCommand::Ops => {
                let operations = self.runtime.operations();
                if operations.is_empty() {
                    self.write(out, "No operations registered.");
                } else {
                    self.write(out, &display::format_operations(&operations, self.use_color));
                }
            }
            ReplCommand::Discover => {
                let report = self.runtime.discover()?;
                self.write(out, &display::format_discovery(&report));
            }
            ReplCommand::Load(path) => {
                let operations = self.runtime.load_path(&path)?;
                self.write(
                    out,
                    &format!("Loaded {}: {}", path.display(), operations.join(", ")),
                );
            }
            ReplCommand::Unload(id) => {
                self.runtime.unload(&id)?;
                self.write(out, &format!("Plugin '{}' unloaded.", id));
            }
            ReplCommand::Reload(id) => {
                let outcome = self.runtime.reload(&id)?;
                self.write(out, &display::format_reload(&id, &outcome));
            }
            ReplCommand::Enable(id) => {
                self.runtime.enable(&id)?;
                self.write(out, &format!("Plugin '{}' enabled.", id));
            }
            ReplCommand::Disable(id) => {
                self.runtime.disable(&id)?;
                self.write(out, &format!("Plugin '{}' disabled.", id));
            }
            ReplCommand::LogLevel(spec) => {
                set_log_level(&spec).map_err(|e| ReplError::LogLevel(e.to_string()))?;
                log::info!("Log level changed to '{}'", spec);
                self.write(out, &format!("Log level set to '{}'.", spec));
            }
        }
        Ok(())
    }

    fn write(&self, out: &mut dyn Write, text: &str) {
        if let Err(e) = writeln!(out, "{}", text) {
            log::warn!("Could not write REPL output: {}", e);
        }
    }

    /// Read lines until `quit` or end of input
    pub fn run(
        &self,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
        prompt: bool,
    ) -> io::Result<()> {
        let mut line = String::new();
        loop {
            if prompt {
                write!(out, "{}", StyleRole::Notice.paint("calc> ", self.use_color))?;
                out.flush()?;
            }
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            let outcome = parse_line(&line).and_then(|input| self.execute(input, &mut *out));
            match outcome {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    log::debug!("REPL input '{}' failed: {:?}", line.trim(), e);
                    let text = format!("Error: {}", e);
                    writeln!(out, "{}", StyleRole::Error.paint(&text, self.use_color))?;
                }
            }
        }
        Ok(())
    }
}
