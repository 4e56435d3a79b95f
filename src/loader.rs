use std::fs;

use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{PipelineError, Result};

const ITEMS_PATH: [&str; 3] = ["raw_api_data", "data", "items"];

/// Read and parse the cached dataset.
pub fn load_dataset(cfg: &Config) -> Result<Value> {
    let path = cfg.cache_path();
    if !path.exists() {
        error!("Data file not found: {}", path.display());
        return Err(PipelineError::MissingCache(path));
    }

    info!("Parsing local data file {}", path.display());
    let text = fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
    serde_json::from_str(&text).map_err(|source| {
        error!("JSON parse failed, file may be incomplete: {}", source);
        PipelineError::Parse { path, source }
    })
}

/// Item records under `raw_api_data.data.items`; any missing level means no items.
pub fn items(doc: &Value) -> &[Value] {
    let mut node = doc;
    for key in ITEMS_PATH {
        match node.get(key) {
            Some(next) => node = next,
            None => return &[],
        }
    }
    node.as_array().map(Vec::as_slice).unwrap_or(&[])
}
