use std::path::Path;

use serde::Deserialize;

/// Configuration loaded from `modnorm.toml` at the project root.
#[derive(Debug, Deserialize, Default)]
pub struct NormalizeConfig {
    /// Additional path patterns to exclude from the `normalize` walk (beyond
    /// `.gitignore` and `node_modules`).
    pub exclude: Option<Vec<String>>,
    /// Prefix prepended to every derived module identifier, for projects that
    /// namespace their whole tree under a root package name.
    pub filename_prefix: Option<String>,
    /// Whether `cjs`/`normalize` should record provide/require relationships
    /// into a `DependencyGraph` (equivalent to always passing `--report-deps`).
    #[serde(default)]
    pub report_dependencies: bool,
}

impl NormalizeConfig {
    /// Load configuration from `modnorm.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or
    /// cannot be parsed — a malformed config degrades to defaults with a
    /// warning rather than aborting the run.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join("modnorm.toml");

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("warning: failed to parse modnorm.toml: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("warning: failed to read modnorm.toml: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}
