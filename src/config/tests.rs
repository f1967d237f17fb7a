use super::{apply_config, has_default_config_in, load_config_file, types::ConfigFile};
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::{LoadArgs, OutputFormat, PercentileMode};

fn parse_with_matches(argv: &[&str]) -> Result<(LoadArgs, clap::ArgMatches), String> {
    let matches = LoadArgs::command()
        .try_get_matches_from(argv)
        .map_err(|err| format!("parse failed: {}", err))?;
    let args = LoadArgs::from_arg_matches(&matches).map_err(|err| format!("{}", err))?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.toml");
    let content = r#"
url = "http://localhost:3000"
requests = 500
concurrency = 16
timeout = "2m"
request_timeout = "250ms"
percentiles = "sorted"
output_format = "json"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| format!("{}", err))?;
    if config.url.as_deref() != Some("http://localhost:3000") {
        return Err("Unexpected url".to_owned());
    }
    if config.requests != Some(500) || config.concurrency != Some(16) {
        return Err("Unexpected counts".to_owned());
    }
    if config.percentiles != Some(PercentileMode::Sorted) {
        return Err("Unexpected percentile mode".to_owned());
    }
    Ok(())
}

#[test]
fn parse_json_config_with_aliases() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.json");
    let content = r#"{
  "url": "http://localhost:3000",
  "tries": 42,
  "workers": 3,
  "timeout": 90
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| format!("{}", err))?;
    if config.requests != Some(42) {
        return Err("Expected tries alias to map to requests".to_owned());
    }
    if config.concurrency != Some(3) {
        return Err("Expected workers alias to map to concurrency".to_owned());
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.yaml");
    std::fs::write(&path, "url: x").map_err(|err| format!("write failed: {}", err))?;
    if load_config_file(&path).is_ok() {
        return Err("Expected yaml config to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.toml");
    std::fs::write(&path, "rate = 10\n").map_err(|err| format!("write failed: {}", err))?;
    if load_config_file(&path).is_ok() {
        return Err("Expected unknown key to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn apply_config_fills_unset_values() -> Result<(), String> {
    let (mut args, matches) = parse_with_matches(&["volley"])?;
    let config: ConfigFile = toml::from_str(
        r#"
url = "http://localhost:9000"
requests = 7
concurrency = 2
timeout = "5s"
request_timeout = 0
connect_timeout = "1s"
output_format = "json"
"#,
    )
    .map_err(|err| format!("toml failed: {}", err))?;

    apply_config(&mut args, &matches, &config).map_err(|err| format!("{}", err))?;

    if args.target_url() != Some("http://localhost:9000") {
        return Err("Expected url from config".to_owned());
    }
    if args.requests != 7 || args.concurrency.get() != 2 {
        return Err("Expected counts from config".to_owned());
    }
    if args.timeout != Duration::from_secs(5) {
        return Err("Expected timeout from config".to_owned());
    }
    if !args.request_timeout.is_zero() {
        return Err("Expected request timeout disabled".to_owned());
    }
    if args.connect_timeout != Duration::from_secs(1) {
        return Err("Expected connect timeout from config".to_owned());
    }
    if args.output_format != OutputFormat::Json {
        return Err("Expected output format from config".to_owned());
    }
    Ok(())
}

#[test]
fn cli_values_win_over_config() -> Result<(), String> {
    let (mut args, matches) =
        parse_with_matches(&["volley", "-r", "3", "-c", "4", "http://cli.example"])?;
    let config: ConfigFile = toml::from_str(
        r#"
url = "http://config.example"
requests = 100
concurrency = 50
"#,
    )
    .map_err(|err| format!("toml failed: {}", err))?;

    apply_config(&mut args, &matches, &config).map_err(|err| format!("{}", err))?;

    if args.target_url() != Some("http://cli.example") {
        return Err("CLI url should win".to_owned());
    }
    if args.requests != 3 || args.concurrency.get() != 4 {
        return Err("CLI counts should win".to_owned());
    }
    Ok(())
}

#[test]
fn apply_config_rejects_zero_concurrency() -> Result<(), String> {
    let (mut args, matches) = parse_with_matches(&["volley"])?;
    let config = ConfigFile {
        concurrency: Some(0),
        ..ConfigFile::default()
    };
    if apply_config(&mut args, &matches, &config).is_ok() {
        return Err("Expected zero concurrency to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn apply_config_rejects_zero_run_timeout() -> Result<(), String> {
    let (mut args, matches) = parse_with_matches(&["volley"])?;
    let config: ConfigFile =
        toml::from_str("timeout = 0\n").map_err(|err| format!("toml failed: {}", err))?;
    if apply_config(&mut args, &matches, &config).is_ok() {
        return Err("Expected zero run timeout to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn default_config_detected_by_file_name() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    if has_default_config_in(dir.path()) {
        return Err("Empty directory must not report a config".to_owned());
    }
    std::fs::write(dir.path().join("load.toml"), "requests = 1\n")
        .map_err(|err| format!("write failed: {}", err))?;
    if has_default_config_in(dir.path()) {
        return Err("Only default file names count".to_owned());
    }
    std::fs::write(dir.path().join("volley.json"), "{}")
        .map_err(|err| format!("write failed: {}", err))?;
    if !has_default_config_in(dir.path()) {
        return Err("Expected volley.json to be detected".to_owned());
    }
    Ok(())
}
