use anyhow::Context;
use prizedraw_core::DrawConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const PRIZES_FILE: &str = "prizes.json";

/// Reads `prizes.json` from `dir`, falling back to the built-in table when the
/// file is absent. The result is always validated.
pub fn load_draw_config(dir: &Path) -> anyhow::Result<DrawConfig> {
    let path = dir.join(PRIZES_FILE);
    let config = if path.exists() {
        load_json(&path)?
    } else {
        tracing::info!("{} not found, using built-in prize table", path.display());
        DrawConfig::default()
    };
    config
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
