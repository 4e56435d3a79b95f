use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::images::{self, ImageResolver};
use crate::model::{Diff, NormalizedItem, RawItem, TraderOffer, NO_TRADER};

/// Highest trader payout and who pays it. Only a strictly higher price replaces
/// the current best, so ties keep the first trader listed.
pub fn best_trader(offers: &[TraderOffer]) -> (i64, String) {
    let mut best_price = 0;
    let mut best_name: &str = NO_TRADER;
    for offer in offers {
        if offer.price > best_price {
            best_price = offer.price;
            best_name = offer.trader.as_str();
        }
    }
    (best_price, best_name.to_string())
}

/// Build the normalized record. Pure: no I/O, image path is derived from the id alone.
pub fn normalize(raw: &RawItem, cfg: &Config) -> NormalizedItem {
    let (trader_price, best_trader) = best_trader(&raw.trader_prices);
    let file = images::file_name(&raw.id, raw.icon_link.as_deref(), &cfg.image_ext);
    NormalizedItem {
        id: raw.id.clone(),
        name: raw.name.clone(),
        short_name: raw.short_name.clone(),
        base_price: raw.base_price,
        flea_price: raw.last_low_price,
        offer_count: raw.last_offer_count,
        trader_price,
        best_trader,
        diff: Diff::compute(raw.last_low_price, trader_price),
        img_path: format!("{}/{}", cfg.images_rel(), file),
        img_file: file,
    }
}

/// Normalize every record in order, fetching each icon inline as it goes.
pub fn transform_items(
    items: &[Value],
    cfg: &Config,
    resolver: &mut ImageResolver,
) -> Vec<NormalizedItem> {
    info!("Processing {} items...", items.len());

    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let every = cfg.progress_every.max(1);
    let mut out = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for (idx, value) in items.iter().enumerate() {
        match RawItem::from_value(value) {
            Some(raw) => {
                let item = normalize(&raw, cfg);
                if let Some(url) = raw.icon_link.as_deref() {
                    // Failures are silent; the page hides icons that never arrived.
                    let _ = resolver.resolve(url, &item.img_file);
                }
                out.push(item);
            }
            None => skipped += 1,
        }

        if (idx + 1) % every == 0 {
            pb.set_position((idx + 1) as u64);
        }
    }

    pb.finish_and_clear();
    info!(
        "Processed {} items ({} skipped without id)",
        out.len(),
        skipped
    );
    debug!(
        "Icons: {} downloaded, {} already cached",
        resolver.fetched, resolver.cached
    );
    out
}
