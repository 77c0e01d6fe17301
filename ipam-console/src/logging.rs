//! env_logger setup
//!
//! The interactive console owns the terminal, so it logs to a file under the
//! user cache directory. Headless commands log to stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

use crate::config::APP_DIR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// `~/.cache/ipam-console/ipam-console.log`
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("ipam-console.log")
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the global logger; `RUST_LOG` overrides the default level
pub fn init(target: LogTarget, verbose: bool) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter(verbose)));

    match &target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }

    builder.try_init().context("Logger already initialised")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_lives_under_app_dir() {
        let path = log_file_path();
        assert!(path.ends_with("ipam-console/ipam-console.log"));
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(true), "debug");
        assert_eq!(default_filter(false), "info");
    }
}
