mod common;

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use zenhub_export::config::types::Settings;
use zenhub_export::config::{ExportArgs, RunConfig, load_settings};
use zenhub_export::error::ConfigError;
use zenhub_export::types::StateFilter;

use common::{GITHUB_TOKEN, TRACKER_ID, ZENHUB_TOKEN, env_with, export_args, token_env};

fn args() -> ExportArgs {
    export_args(Path::new("out.xlsx"), "all", "0")
}

#[test]
fn resolves_minimal_arguments() {
    let config = RunConfig::resolve(&args(), token_env()).unwrap();
    assert_eq!(config.repo.full_name(), "acme/widgets");
    assert_eq!(config.tracker_id, TRACKER_ID);
    assert_eq!(config.output, PathBuf::from("out.xlsx"));
    assert!(!config.html);
    assert_eq!(config.state, StateFilter::All);
    assert_eq!(config.github_token, GITHUB_TOKEN);
    assert_eq!(config.zenhub_token, ZENHUB_TOKEN);
}

#[test]
fn default_file_name_follows_repository() {
    let mut a = args();
    a.file_name = None;
    let config = RunConfig::resolve(&a, token_env()).unwrap();
    assert_eq!(config.output, PathBuf::from("widgets.xlsx"));
}

#[test]
fn parses_optional_flags() {
    let mut a = args();
    a.html = "1".into();
    a.state = "closed".into();
    a.since = Some("2018-01-01".into());
    a.comments = true;
    a.epics = true;
    a.dependencies = true;
    let config = RunConfig::resolve(&a, token_env()).unwrap();
    assert!(config.html);
    assert_eq!(config.state, StateFilter::Closed);
    assert_eq!(config.since, NaiveDate::from_ymd_opt(2018, 1, 1));
    assert!(config.include_comments);
    assert!(config.include_epics);
    assert!(config.include_dependencies);
}

#[test]
fn gh_token_takes_precedence_over_github_token() {
    let env = env_with(&[
        ("GH_TOKEN", "from-gh"),
        ("GITHUB_TOKEN", "from-github"),
        ("ZENHUB_TOKEN", "zh"),
    ]);
    let config = RunConfig::resolve(&args(), env).unwrap();
    assert_eq!(config.github_token, "from-gh");
}

#[test]
fn missing_github_token_is_a_config_error() {
    let env = env_with(&[("ZENHUB_TOKEN", "zh"), ("GITHUB_TOKEN", "  ")]);
    let err = RunConfig::resolve(&args(), env).unwrap_err();
    assert!(matches!(err, ConfigError::MissingToken { .. }), "{err}");
}

#[test]
fn missing_zenhub_token_is_a_config_error() {
    let env = env_with(&[("GITHUB_TOKEN", "gh")]);
    let err = RunConfig::resolve(&args(), env).unwrap_err();
    assert!(err.to_string().contains("ZENHUB_TOKEN"), "{err}");
}

#[test]
fn rejects_repository_without_owner() {
    let mut a = args();
    a.repo_list = vec!["widgets".into(), "1".into()];
    let err = RunConfig::resolve(&a, token_env()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRepository(_)));
}

#[test]
fn rejects_missing_tracker_id() {
    let mut a = args();
    a.repo_list = vec!["acme/widgets".into()];
    assert!(RunConfig::resolve(&a, token_env()).is_err());
}

#[test]
fn rejects_non_numeric_or_zero_tracker_id() {
    for bad in ["abc", "0", "-3"] {
        let mut a = args();
        a.repo_list = vec!["acme/widgets".into(), bad.into()];
        let err = RunConfig::resolve(&a, token_env()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTrackerId(_)), "{bad}");
    }
}

#[test]
fn rejects_unknown_state() {
    let mut a = args();
    a.state = "merged".into();
    let err = RunConfig::resolve(&a, token_env()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidState(_)));
}

#[test]
fn rejects_html_flag_outside_zero_and_one() {
    let mut a = args();
    a.html = "yes".into();
    let err = RunConfig::resolve(&a, token_env()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidHtmlFlag(_)));
}

#[test]
fn rejects_malformed_since() {
    let mut a = args();
    a.since = Some("01/01/2018".into());
    let err = RunConfig::resolve(&a, token_env()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSince(_)));
}

#[test]
fn debug_output_redacts_tokens() {
    let config = RunConfig::resolve(&args(), token_env()).unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains(GITHUB_TOKEN));
    assert!(!debug.contains(ZENHUB_TOKEN));
    assert!(debug.contains("<redacted>"));
}

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

#[test]
fn empty_settings_use_defaults() {
    let settings: Settings = toml::from_str("").unwrap();
    assert_eq!(settings.github.api_url, "https://api.github.com");
    assert_eq!(settings.github.page_size, 100);
    assert_eq!(settings.zenhub.requests_per_minute, 100);
    assert_eq!(settings.http.connect_timeout_secs, 30);
    assert_eq!(settings.http.max_retry_wait_secs, 3_600);
    assert!(settings.validate().is_ok());
}

#[test]
fn partial_settings_keep_other_defaults() {
    let toml = r#"
[github]
page_size = 50

[http]
max_attempts = 5
"#;
    let settings: Settings = toml::from_str(toml).unwrap();
    assert_eq!(settings.github.page_size, 50);
    assert_eq!(settings.github.api_url, "https://api.github.com");
    assert_eq!(settings.http.max_attempts, 5);
    assert_eq!(settings.http.timeout_secs, 30);
}

#[test]
fn page_size_above_github_limit_is_rejected() {
    let settings: Settings = toml::from_str("[github]\npage_size = 500\n").unwrap();
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::InvalidSetting { key: "github.page_size", .. })
    ));
}

#[test]
fn zero_timeouts_are_rejected() {
    let settings: Settings = toml::from_str("[http]\nconnect_timeout_secs = 0\n").unwrap();
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::InvalidSetting { key: "http.connect_timeout_secs", .. })
    ));

    let settings: Settings = toml::from_str("[http]\ntimeout_secs = 0\n").unwrap();
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::InvalidSetting { key: "http.timeout_secs", .. })
    ));
}

#[test]
fn load_settings_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[zenhub]\napi_url = \"https://zenhub.example.com\"").unwrap();
    let settings = load_settings(Some(file.path())).unwrap();
    assert_eq!(settings.zenhub.api_url, "https://zenhub.example.com");
}

#[test]
fn load_settings_missing_explicit_path_is_an_error() {
    let err = load_settings(Some(Path::new("/nonexistent/zenhub-export.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn load_settings_reports_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[github\npage_size = ").unwrap();
    let err = load_settings(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
