use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::images::ImageResolver;
use crate::{export, fetch, loader, transform};

/// What a finished run produced.
pub struct RunSummary {
    pub fetched: bool,
    pub items: usize,
    pub csv_path: PathBuf,
    pub html_path: PathBuf,
}

fn init_dirs(cfg: &Config) -> Result<()> {
    let images = cfg.images_dir();
    if !images.exists() {
        fs::create_dir_all(&images).map_err(|e| PipelineError::io(&images, e))?;
        info!("Created directory: {}", images.display());
    }
    Ok(())
}

/// fetch (unless cached) → load → transform → export.
pub fn run(cfg: &Config) -> Result<RunSummary> {
    init_dirs(cfg)?;

    let cache = cfg.cache_path();
    let fetched = if cache.exists() {
        info!(
            "Using existing data file {} (delete it to force a re-download)",
            cache.display()
        );
        false
    } else {
        fetch::download_dataset(cfg)?;
        true
    };

    let doc = loader::load_dataset(cfg)?;
    let raw_items = loader::items(&doc);

    let mut resolver = ImageResolver::new(cfg);
    let items = transform::transform_items(raw_items, cfg, &mut resolver);

    let csv_path = cfg.csv_path();
    export::write_csv(&csv_path, &items)?;
    info!("Wrote {} rows to {}", items.len(), csv_path.display());

    let html_path = cfg.html_path();
    export::write_page(&html_path, &items)?;
    info!("Wrote page {}", html_path.display());

    Ok(RunSummary {
        fetched,
        items: items.len(),
        csv_path,
        html_path,
    })
}
