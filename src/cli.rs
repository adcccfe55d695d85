//! Clap adapter.
//!
//! Compiled only with the `clap` Cargo feature (on by default). [`ConfigArgs`]
//! can be flattened into an application's `#[derive(Parser)]` struct to accept
//! an optional configuration file plus `KEY=VALUE` overrides:
//!
//! ```text
//! train --config base.yaml model.depth=50 optimizer.lr=0.01
//! ```

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::error::ConfigError;
use crate::file::load_config;
use crate::overrides::apply_overrides;
use crate::policy::Policy;

/// Configuration file and overrides from the command line.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     config: ConfigArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Configuration file (.json, .toml, .yaml or .yml).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Values to set, e.g. `model.depth=50`. Applied in order, after the file.
    #[arg(value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

impl ConfigArgs {
    /// Load the file (or start empty) and apply the overrides on top.
    pub fn into_config(self, policy: Policy) -> Result<Config, ConfigError> {
        let config = match &self.config {
            Some(path) => load_config(path, policy, None)?,
            None => Config::new(policy),
        };
        apply_overrides(&config, self.overrides.as_slice())?;
        Ok(config)
    }
}
