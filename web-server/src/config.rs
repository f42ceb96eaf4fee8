//! Settings of the web server, read from `ServerConfig.json` in the working directory.

use serde::{Deserialize, Serialize};
use tokio::fs;

/// Name of the config file.
pub const CONFIG_FILE: &str = "ServerConfig.json";

/// Where to listen and what to serve.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address and port, e.g. `127.0.0.1:8080`.
    pub bind_address: String,
    /// The folder with the wasm bundle.
    pub static_dir: String,
    /// Served for every path that does not exist.
    pub index_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1:8080".to_string(),
            static_dir: ".".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

impl ServerConfig {
    /// Path of the fallback page inside the static folder.
    pub fn index_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.static_dir).join(&self.index_file)
    }
}

/// Parses the content of a config file, missing entries keep their defaults.
pub fn parse_config(json_content: &str) -> Result<ServerConfig, String> {
    serde_json::from_str(json_content).map_err(|e| format!("Failed to parse JSON: {}", e))
}

/// Loads the config file. Without a file the defaults are used.
pub async fn load_config(path: &str) -> Result<ServerConfig, String> {
    match fs::read_to_string(path).await {
        Ok(json_content) => parse_config(&json_content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "No config file, using defaults.");
            Ok(ServerConfig::default())
        }
        Err(e) => Err(format!("Failed to read file: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(r#"{ "static_dir": "dist" }"#).unwrap();
        assert_eq!(config.static_dir, "dist");
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.index_path(), std::path::Path::new("dist").join("index.html"));
    }

    #[test]
    fn broken_json_is_reported() {
        let error = parse_config("{ bind_address").unwrap_err();
        assert!(error.starts_with("Failed to parse JSON"));
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let config = load_config("does-not-exist/ServerConfig.json").await.unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[tokio::test]
    async fn reads_config_file() {
        let path = std::env::temp_dir().join(format!("server-config-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"{ "bind_address": "0.0.0.0:9000" }"#)
            .await
            .unwrap();
        let config = load_config(path.to_str().unwrap()).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.index_file, "index.html");
    }
}
