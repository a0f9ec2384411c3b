//! Configuration file loading and precedence

use clap::Parser;
use plugcalc::app::cli::args::Args;
use plugcalc::app::cli::config::{load_config_file, Settings};
use plugcalc::core::logging::LogFormat;
use std::path::PathBuf;

#[test]
fn test_config_file_feeds_discovery() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("plugcalc.toml");
    std::fs::write(
        &config_path,
        r#"
plugin_dir = "/srv/calc/plugins"
exclude_plugins = ["units"]
include_builtins = false
log_format = "json"
"#,
    )
    .unwrap();

    let args = Args::try_parse_from([
        "plugcalc",
        "--config-file",
        config_path.to_str().unwrap(),
        "--exclude-plugin",
        "finance",
    ])
    .unwrap();
    let file = load_config_file(args.config_file.as_deref()).unwrap();
    let settings = Settings::resolve(&args, file.as_ref()).unwrap();

    assert_eq!(
        settings.discovery.search_path,
        Some(PathBuf::from("/srv/calc/plugins"))
    );
    assert_eq!(settings.discovery.excluded_plugins, vec!["units", "finance"]);
    assert!(!settings.discovery.include_builtins);
    assert_eq!(settings.log_format, LogFormat::Json);
}

#[test]
fn test_malformed_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("plugcalc.toml");
    std::fs::write(&config_path, "plugin_dir = [\n").unwrap();

    let error = load_config_file(Some(&config_path)).unwrap_err();
    assert!(error.to_string().starts_with("Error parsing configuration file"));
}
