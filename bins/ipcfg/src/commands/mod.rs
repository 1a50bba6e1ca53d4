//! ipcfg command implementations.
// Host commands are only dispatched on Windows.
#![cfg_attr(not(windows), allow(dead_code))]

pub mod admin;
pub mod apply;
pub mod dns;
pub mod plan;
pub mod routes;
pub mod show;

use std::path::Path;

use anyhow::Context;
use ipcfg::config::InterfaceConfig;

/// Load a state file: JSON when the extension says so, YAML otherwise.
pub fn load_config(path: &Path) -> anyhow::Result<InterfaceConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
    };
    Ok(config)
}
