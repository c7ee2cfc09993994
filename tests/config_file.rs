//! Integration tests for loading configuration files from disk.

use postirc::Config;
use postirc::config::StoreBackend;
use postirc::config::validation;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_shipped_sample_matches_defaults() {
    let sample = Path::new(env!("CARGO_MANIFEST_DIR")).join("contrib/postirc.toml");
    let config = Config::load(&sample).expect("sample config should parse");
    assert!(validation::validate(&config).is_ok());

    let defaults = Config::default();
    assert_eq!(config.relay.nick, defaults.relay.nick);
    assert_eq!(config.routing.default, defaults.routing.default);
    assert_eq!(config.routing.shortcuts, defaults.routing.shortcuts);
    assert_eq!(config.webhook.templates, defaults.webhook.templates);
    assert_eq!(config.rate_limit.max_per_minute, defaults.rate_limit.max_per_minute);
    assert_eq!(config.rate_limit.store, defaults.rate_limit.store);
    assert_eq!(config.rate_limit.redis_url, defaults.rate_limit.redis_url);
}

#[test]
fn test_partial_file_keeps_other_defaults() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[relay]
nick = "buildbot"

[irc]
deadline_secs = 3
"#
    )?;

    let config = Config::load(file.path())?;
    assert_eq!(config.relay.nick, "buildbot");
    assert_eq!(config.irc.deadline().as_secs(), 3);
    assert_eq!(config.relay.max_message_len, 400);
    assert_eq!(config.paste.url, "http://ix.io");
    Ok(())
}

#[test]
fn test_missing_file_falls_back_to_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::load_or_default(dir.path().join("absent.toml"))?;
    assert_eq!(config.routing.default, "ro");
    Ok(())
}

#[test]
fn test_broken_file_is_an_error() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "[relay\nnick = ")?;
    assert!(Config::load_or_default(file.path()).is_err());
    Ok(())
}

#[test]
fn test_invalid_values_are_all_reported() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[relay]
nick = "two words"
max_message_len = 0

[routing]
default = "missing"
"#
    )?;

    let config = Config::load(file.path())?;
    let errors = validation::validate(&config).unwrap_err();
    assert_eq!(errors.len(), 3);
    Ok(())
}

#[test]
fn test_default_limit_is_shared_across_processes() {
    // Each CGI request is a new process; only an external store carries the count.
    let config = Config::default();
    assert!(config.rate_limit.max_per_minute > 0);
    assert_eq!(config.rate_limit.store, StoreBackend::Redis);
    assert!(config.rate_limit.redis_url.starts_with("redis://"));
}
