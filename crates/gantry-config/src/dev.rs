//! Development server options.

use serde::{Deserialize, Serialize};

/// Settings for `gantry dev`. Every field has a default so a manifest
/// without a `[dev]` table gets a working server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevOptions {
    /// Interface to bind.
    pub host: String,

    /// Preferred port. When taken, the next free port is probed.
    pub port: u16,

    /// Open the system browser once the server is listening.
    pub open: bool,

    /// Inject the reload client and push rebuild events over SSE.
    pub hot: bool,

    /// Serve responses gzip-compressed.
    pub compress: bool,

    /// Serve `index.html` for unknown extensionless routes.
    pub spa_fallback: bool,

    /// Quiet window after a filesystem event before rebuilding.
    pub debounce_ms: u64,

    /// Path substrings excluded from watching.
    pub watch_ignore: Vec<String>,
}

impl Default for DevOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: true,
            hot: true,
            compress: true,
            spa_fallback: true,
            debounce_ms: 100,
            watch_ignore: Vec::new(),
        }
    }
}

impl DevOptions {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serve_locally_on_3000() {
        let dev = DevOptions::default();
        assert_eq!(dev.address(), "127.0.0.1:3000");
        assert_eq!(dev.url(), "http://127.0.0.1:3000");
        assert!(dev.open && dev.hot && dev.compress && dev.spa_fallback);
    }

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let dev: DevOptions = serde_json::from_value(serde_json::json!({
            "port": 8080,
            "open": false,
        }))
        .unwrap();
        assert_eq!(dev.port, 8080);
        assert!(!dev.open);
        assert!(dev.hot);
        assert_eq!(dev.debounce_ms, 100);
    }
}
