mod up;
mod validate;

pub use up::{run_up, UpOptions};
pub use validate::run_validate;

use testnet::{NetworkConfig, Parser as ConfigParser};
use std::path::PathBuf;

/// Resolve the config path (explicit or searched upward) and load it.
fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<(PathBuf, NetworkConfig)> {
    let parser = ConfigParser::new();
    let path = match config_path {
        Some(path) => path,
        None => parser.find_config_file()?,
    };
    let config = parser.load_config(&path)?;
    Ok((path, config))
}
