use anyhow::{Result, bail};
use std::path::PathBuf;

pub const DEFAULT_NAMESPACE: &str = "App\\Entity";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Namespace offered as the prompt default.
    pub namespace: String,
    /// Output directory; `~/mysql-workbench/<schema>` when unset.
    pub output_dir: Option<PathBuf>,
    pub extension: String,
    /// Schema to generate; the first one when unset.
    pub schema: Option<String>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            output_dir: None,
            extension: crate::generator::DEFAULT_EXTENSION.to_string(),
            schema: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env if present
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let namespace = non_empty("ENTITYGEN_NAMESPACE").unwrap_or(defaults.namespace);
        let output_dir = non_empty("ENTITYGEN_OUTPUT_DIR").map(PathBuf::from);
        let schema = non_empty("ENTITYGEN_SCHEMA");
        let log_level = non_empty("RUST_LOG").unwrap_or(defaults.log_level);

        let extension = non_empty("ENTITYGEN_EXTENSION").unwrap_or(defaults.extension);
        let extension = extension.trim_start_matches('.').to_string();
        if extension.is_empty() || extension.contains(['/', '\\', '.']) {
            bail!("ENTITYGEN_EXTENSION must be a bare file extension, got {:?}", extension);
        }

        Ok(Self {
            namespace,
            output_dir,
            extension,
            schema,
            log_level,
        })
    }
}

/// `~/mysql-workbench/<schema>`, relative to the working directory when no
/// home directory is known.
pub fn default_output_dir(schema_name: &str) -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join("mysql-workbench").join(schema_name)
}
