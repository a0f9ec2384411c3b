//! Host startup
//!
//! Resolves settings, initialises logging, configures the process-wide
//! plugin runtime, discovers plugins and runs the requested subcommand.

use crate::app::cli::args::{Args, Command};
use crate::app::cli::config::{load_config_file, Settings};
use crate::app::cli::display;
use crate::app::repl::Repl;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::styles::palette_to_clap;
use crate::notifications::api::{EventFilter, EventKind, Observer, ObserverResult, PluginEvent};
use crate::operation::Value;
use crate::plugin::api::{plugin_runtime, SharedPluginManager};
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::sync::Arc;

/// Logs every lifecycle event and prints the ones worth a notice
pub struct HostObserver {
    use_color: bool,
}

impl HostObserver {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }
}

impl Observer for HostObserver {
    fn on_event(&self, event: &PluginEvent) -> ObserverResult {
        match event.kind {
            EventKind::Error => log::warn!(
                "plugin '{}': {}",
                event.plugin,
                event.message.as_deref().unwrap_or("unknown error")
            ),
            kind => log::debug!(
                "plugin '{}' {} at {}",
                event.plugin,
                kind,
                event.timestamp.format("%H:%M:%S%.3f")
            ),
        }
        if let Some(notice) = display::format_event_notice(event, self.use_color) {
            eprintln!("{}", notice);
        }
        Ok(())
    }

    fn source(&self) -> &str {
        "host"
    }
}

fn parse_args() -> Args {
    let styled = std::io::stdout().is_terminal();
    let matches = Args::command().styles(palette_to_clap(styled)).get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Run the host and return the process exit code
pub fn startup() -> i32 {
    let args = parse_args();

    let file_config = match load_config_file(args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let settings = match Settings::resolve(&args, file_config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let use_color = settings
        .color
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    colored::control::set_override(use_color);

    let log_file = settings.log_file.as_deref().and_then(|path| path.to_str());
    if let Err(e) = init_logging(
        Some(&settings.log_level),
        settings.log_format,
        log_file,
        use_color,
    ) {
        eprintln!("Error: could not initialise logging: {}", e);
        return 1;
    }
    log::info!("plugcalc {} starting", crate::PACKAGE_VERSION);
    log::debug!("Resolved settings: {:?}", settings);

    let runtime = plugin_runtime();
    runtime.write().set_config(settings.discovery.clone());
    runtime.subscribe(EventFilter::all(), Arc::new(HostObserver::new(use_color)));

    match runtime.discover() {
        Ok(report) => {
            log::info!("{}", report);
            for (id, error) in &report.failures {
                log::warn!("Plugin '{}' was not loaded: {}", id, error);
            }
        }
        Err(e) => {
            log_error_with_context(&e, "Plugin discovery");
            return 1;
        }
    }

    let code = run_command(args.selected_command(), &runtime, use_color);
    runtime.shutdown();
    log::info!("plugcalc finished with exit code {}", code);
    code
}

pub fn run_command(command: Command, runtime: &SharedPluginManager, use_color: bool) -> i32 {
    match command {
        Command::Repl => {
            let interactive = std::io::stdin().is_terminal();
            if interactive {
                println!(
                    "plugcalc {} - type !help for commands, quit to exit",
                    crate::PACKAGE_VERSION
                );
            }
            let repl = Repl::new(runtime.clone(), use_color);
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            match repl.run(&mut stdin.lock(), &mut stdout.lock(), interactive) {
                Ok(()) => 0,
                Err(e) => {
                    log::error!("REPL terminated: {}", e);
                    1
                }
            }
        }
        Command::Call {
            operation,
            arguments,
        } => call_once(runtime, &operation, &arguments),
        Command::Plugins => {
            let mut plugins = Vec::new();
            for id in runtime.list_plugins() {
                match runtime.plugin_info(&id) {
                    Ok(info) => plugins.push(info),
                    Err(e) => log::warn!("Skipping plugin '{}': {}", id, e),
                }
            }
            display::display_plugin_table(&plugins, use_color);
            0
        }
    }
}

fn call_once(runtime: &SharedPluginManager, operation: &str, arguments: &[String]) -> i32 {
    let values = match arguments
        .iter()
        .map(|argument| argument.parse::<Value>())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    match runtime.dispatch(operation, &values) {
        Ok(result) => {
            println!("{}", result);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            log_error_with_context(&e, &format!("Calling '{}'", operation));
            1
        }
    }
}
