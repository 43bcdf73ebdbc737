//! CLI argument definitions for the Hearth console.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use hearth_core::config::HearthConfig;

/// Hearth: collects baking and cooking preferences and writes a recipe.
#[derive(Parser, Debug)]
#[command(name = "hearth", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Conversation domain (bread, recipe).
    #[arg(short = 'd', long = "domain")]
    pub domain: Option<String>,

    /// Resume or name a session; a fresh id is generated otherwise.
    #[arg(short = 's', long = "session")]
    pub session: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Use the offline generator instead of the HTTP service.
    #[arg(long = "offline")]
    pub offline: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > HEARTH_CONFIG env var > ~/.hearth/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("HEARTH_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --domain flag > config `general.default_domain`.
    pub fn resolve_domain(&self, config: &HearthConfig) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| config.general.default_domain.clone())
    }

    /// Priority: --log-level flag > config `general.log_level`.
    pub fn resolve_log_level(&self, config: &HearthConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    pub fn resolve_session(&self) -> String {
        self.session
            .clone()
            .unwrap_or_else(hearth_core::types::new_session_id)
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".hearth").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".hearth").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("hearth").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_parse() {
        let args = parse(&["--domain", "recipe", "-s", "abc", "--offline", "-l", "debug"]);
        assert_eq!(args.domain.as_deref(), Some("recipe"));
        assert_eq!(args.session.as_deref(), Some("abc"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.offline);
    }

    #[test]
    fn test_config_flag_wins() {
        let args = parse(&["--config", "/tmp/hearth.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/hearth.toml"));
    }

    #[test]
    fn test_domain_falls_back_to_config() {
        let mut config = HearthConfig::default();
        config.general.default_domain = "recipe".into();
        assert_eq!(parse(&[]).resolve_domain(&config), "recipe");
        assert_eq!(parse(&["-d", "bread"]).resolve_domain(&config), "bread");
    }

    #[test]
    fn test_log_level_falls_back_to_config() {
        let config = HearthConfig::default();
        assert_eq!(parse(&[]).resolve_log_level(&config), "info");
        assert_eq!(parse(&["--log-level", "trace"]).resolve_log_level(&config), "trace");
    }

    #[test]
    fn test_session_is_generated_when_absent() {
        let a = parse(&[]).resolve_session();
        let b = parse(&[]).resolve_session();
        assert!(!a.is_empty());
        assert_ne!(a, b);
        assert_eq!(parse(&["-s", "fixed"]).resolve_session(), "fixed");
    }
}
