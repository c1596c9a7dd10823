//! Server configuration
//!
//! Compiled defaults overridable through environment variables, loaded
//! once at startup after `.env` has been read.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use log::warn;

use crate::paths::PathMode;

pub struct Config {
    pub host: String,
    pub port: u16,
    /// Root directory served by the fallback route and used to anchor
    /// relative upload and inspection paths.
    pub serve_root: PathBuf,
    pub path_mode: PathMode,
    pub max_list_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8030,
            serve_root: PathBuf::from("./served"),
            path_mode: PathMode::Strict,
            max_list_depth: 32,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("DROPSHELF_HOST").unwrap_or(defaults.host),
            port: env::var("DROPSHELF_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            serve_root: env::var("DROPSHELF_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.serve_root),
            path_mode: match env::var("DROPSHELF_PERMISSIVE_PATHS") {
                Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => PathMode::Permissive,
                _ => defaults.path_mode,
            },
            max_list_depth: env::var("DROPSHELF_MAX_LIST_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_list_depth),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| {
                warn!(
                    "invalid bind address '{}:{}', falling back to 0.0.0.0",
                    self.host, self.port
                );
                SocketAddr::from(([0, 0, 0, 0], self.port))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_addr_joins_host_and_port() {
        let mut cfg = Config::default();
        cfg.host = "127.0.0.1".to_string();
        cfg.port = 9999;
        assert_eq!(cfg.socket_addr(), "127.0.0.1:9999".parse().unwrap());
    }

    #[test]
    fn unparsable_host_falls_back_to_wildcard() {
        let mut cfg = Config::default();
        cfg.host = "not an address".to_string();
        cfg.port = 8030;
        assert_eq!(cfg.socket_addr(), SocketAddr::from(([0, 0, 0, 0], 8030)));
    }

    #[test]
    fn defaults_are_strict() {
        let cfg = Config::default();
        assert_eq!(cfg.path_mode, PathMode::Strict);
        assert!(cfg.max_list_depth > 0);
    }
}
