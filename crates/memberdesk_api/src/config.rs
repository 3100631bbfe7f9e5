//! Server configuration.
//!
//! # Responsibility
//! - Parse command-line flags with environment fallbacks.
//! - Normalize them into a validated `ServerConfig`.

use anyhow::{bail, Result};
use clap::Parser;
use memberdesk_core::default_log_level;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "memberdesk.sqlite3";
const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "memberdesk-server",
    about = "Account and member management HTTP service",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        env = "MEMBERDESK_DB_PATH",
        value_name = "FILE",
        default_value = DEFAULT_DB_FILE_NAME,
        help = "SQLite database file, created and migrated on startup"
    )]
    pub db_path: PathBuf,

    #[arg(
        long,
        env = "MEMBERDESK_BIND",
        value_name = "ADDR",
        default_value = DEFAULT_BIND,
        help = "HTTP bind address"
    )]
    pub bind: SocketAddr,

    #[arg(
        long,
        env = "MEMBERDESK_LOG_LEVEL",
        value_name = "LEVEL",
        help = "Log level (trace|debug|info|warn|error)"
    )]
    pub log_level: Option<String>,

    #[arg(
        long,
        env = "MEMBERDESK_LOG_DIR",
        value_name = "DIR",
        help = "Absolute directory for rolling log files; stderr when unset"
    )]
    pub log_dir: Option<PathBuf>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        if args.db_path.as_os_str().is_empty() {
            bail!("database path cannot be empty");
        }

        let log_level = args
            .log_level
            .map(|level| level.trim().to_ascii_lowercase())
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| default_log_level().to_string());

        let log_dir = args.log_dir.filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = &log_dir {
            if !dir.is_absolute() {
                bail!("log directory must be absolute, got {:?}", dir);
            }
        }

        Ok(Self {
            db_path: args.db_path,
            bind: args.bind,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, ServerConfig};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn flags_override_defaults() {
        let args = CliArgs::try_parse_from([
            "memberdesk-server",
            "--db-path",
            "/tmp/members.db",
            "--bind",
            "0.0.0.0:9000",
            "--log-level",
            " WARN ",
        ])
        .unwrap();
        let config = ServerConfig::from_args(args).unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/members.db"));
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let args = CliArgs::try_parse_from([
            "memberdesk-server",
            "--db-path",
            "/tmp/members.db",
            "--log-dir",
            "logs",
        ])
        .unwrap();
        let err = ServerConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn invalid_bind_address_fails_to_parse() {
        let result = CliArgs::try_parse_from(["memberdesk-server", "--bind", "not-an-address"]);
        assert!(result.is_err());
    }
}
