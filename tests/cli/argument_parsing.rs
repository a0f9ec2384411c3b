//! Argument parsing through the public CLI types

use clap::Parser;
use plugcalc::app::cli::args::{Args, Command};
use std::path::PathBuf;

#[test]
fn test_full_command_line() {
    let args = Args::try_parse_from([
        "plugcalc",
        "--config-file",
        "/etc/plugcalc.toml",
        "--plugin-dir",
        "./plugins",
        "--exclude-plugin",
        "finance",
        "--log-format",
        "ext",
        "--log-file",
        "calc.log",
        "-q",
        "call",
        "mean",
        "1",
        "2",
    ])
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("/etc/plugcalc.toml")));
    assert_eq!(args.plugin_dir, Some(PathBuf::from("./plugins")));
    assert_eq!(args.excluded_plugins(), vec!["finance"]);
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file, Some(PathBuf::from("calc.log")));
    assert_eq!(args.verbosity(), -1);
    assert_eq!(
        args.selected_command(),
        Command::Call {
            operation: "mean".to_string(),
            arguments: vec!["1".to_string(), "2".to_string()],
        }
    );
}

#[test]
fn test_call_requires_an_operation() {
    assert!(Args::try_parse_from(["plugcalc", "call"]).is_err());
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    assert!(Args::try_parse_from(["plugcalc", "scan"]).is_err());
}

#[test]
fn test_version_and_help_are_clap_errors() {
    let version = Args::try_parse_from(["plugcalc", "--version"]).unwrap_err();
    assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
    let help = Args::try_parse_from(["plugcalc", "--help"]).unwrap_err();
    assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
}
