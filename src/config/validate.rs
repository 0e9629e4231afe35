// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DotwatchError, Result};
use crate::fileset::glob::WatchPatterns;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DotwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.command, raw.watch, raw.process))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_command(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_command(cfg: &RawConfigFile) -> Result<()> {
    if let Some(cmd) = &cfg.command {
        if cmd.executable.trim().is_empty() {
            return Err(DotwatchError::ConfigError(
                "[command].executable must not be empty".to_string(),
            ));
        }
        if let Some(key) = cmd.env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(DotwatchError::ConfigError(format!(
                "[command].env has an invalid variable name: {key:?}"
            )));
        }
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.include.is_empty() {
        return Err(DotwatchError::ConfigError(
            "[watch].include must contain at least one pattern".to_string(),
        ));
    }

    if cfg.watch.debounce_ms == 0 {
        return Err(DotwatchError::ConfigError(
            "[watch].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    // Surface bad globs at load time rather than on the first walk.
    WatchPatterns::new(&cfg.watch.include, &cfg.watch.exclude)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::CommandSection;

    fn parse(toml_str: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_str)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert!(cfg.command().is_none());
        assert_eq!(cfg.watch_section().debounce_ms, 50);
        assert_eq!(cfg.process_section().shutdown_grace_ms, 5000);
    }

    #[test]
    fn full_config_parses() {
        let cfg = parse(
            r#"
            [command]
            executable = "dotnet"
            args = ["test", "--logger", "console"]
            env = { ASPNETCORE_ENVIRONMENT = "Development" }

            [watch]
            include = ["**/*.cs"]
            exclude = ["obj/**"]
            debounce_ms = 100

            [process]
            shutdown_grace_ms = 250
            "#,
        )
        .unwrap();

        let cmd = cfg.command().unwrap();
        assert_eq!(cmd.args, vec!["test", "--logger", "console"]);
        assert_eq!(cfg.watcher_options().debounce.as_millis(), 100);
        assert_eq!(cfg.shutdown_grace().as_millis(), 250);
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let err = parse("[watch]\ndebounce_ms = 0\n").unwrap_err();
        assert!(matches!(err, DotwatchError::ConfigError(_)));
    }

    #[test]
    fn blank_executable_is_rejected() {
        let raw = RawConfigFile {
            command: Some(CommandSection {
                executable: "  ".to_string(),
                args: vec![],
                env: Default::default(),
                working_directory: None,
                display_name: None,
            }),
            ..RawConfigFile::default()
        };
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(DotwatchError::ConfigError(_))
        ));
    }

    #[test]
    fn bad_glob_is_rejected() {
        let err = parse("[watch]\ninclude = [\"src/[\"]\n").unwrap_err();
        assert!(matches!(err, DotwatchError::GlobError(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("[watch]\ndebounce = 10\n").unwrap_err();
        assert!(matches!(err, DotwatchError::TomlError(_)));
    }
}
