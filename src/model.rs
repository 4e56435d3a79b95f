use std::fmt;

use serde::Serialize;
use serde_json::Value;

pub const NO_TRADER: &str = "none";
pub const UNKNOWN_TRADER: &str = "Unknown";
pub const UNKNOWN_NAME: &str = "Unknown";

// ── Field accessors ──
//
// Every lookup returns a typed default instead of failing: missing, null and
// wrongly-typed values all degrade the same way.

fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// Integer field, 0 when absent, null, false or not a number. Floats are truncated.
pub fn int_field(obj: &Value, key: &str) -> i64 {
    match field(obj, key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

pub fn str_field(obj: &Value, key: &str) -> Option<String> {
    match field(obj, key)? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Non-empty identifier; numeric ids are accepted in their decimal form.
fn id_field(obj: &Value) -> Option<String> {
    match field(obj, "id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

// ── Raw records ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraderOffer {
    pub price: i64,
    pub trader: String,
}

impl TraderOffer {
    pub fn from_value(v: &Value) -> Self {
        let trader = v
            .get("trader")
            .and_then(|t| str_field(t, "name"))
            .unwrap_or_else(|| UNKNOWN_TRADER.to_string());
        TraderOffer {
            price: int_field(v, "priceRUB"),
            trader,
        }
    }
}

/// One item record as supplied by the API, after best-effort field extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub base_price: i64,
    pub last_low_price: i64,
    pub last_offer_count: i64,
    pub trader_prices: Vec<TraderOffer>,
    pub icon_link: Option<String>,
}

impl RawItem {
    /// `None` for records without a usable identifier; those are skipped.
    pub fn from_value(v: &Value) -> Option<Self> {
        let id = id_field(v)?;
        let trader_prices = match field(v, "traderPrices") {
            Some(Value::Array(offers)) => offers.iter().map(TraderOffer::from_value).collect(),
            _ => Vec::new(),
        };
        Some(RawItem {
            id,
            name: str_field(v, "name").unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            short_name: str_field(v, "shortName").unwrap_or_default(),
            base_price: int_field(v, "basePrice"),
            last_low_price: int_field(v, "lastLowPrice"),
            last_offer_count: int_field(v, "lastOfferCount"),
            trader_prices,
            icon_link: str_field(v, "iconLink").filter(|s| !s.is_empty()),
        })
    }
}

// ── Normalized records ──

/// Flea price minus best trader price, or the reason it can't be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diff {
    Value(i64),
    NoMarketPrice,
    MarketPriceOnly,
}

impl Diff {
    pub fn compute(flea_price: i64, trader_price: i64) -> Self {
        if flea_price == 0 {
            Diff::NoMarketPrice
        } else if trader_price == 0 {
            Diff::MarketPriceOnly
        } else {
            Diff::Value(flea_price.saturating_sub(trader_price))
        }
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diff::Value(v) => write!(f, "{}", v),
            Diff::NoMarketPrice => f.write_str("no market price"),
            Diff::MarketPriceOnly => f.write_str("market price only"),
        }
    }
}

impl Serialize for Diff {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Diff::Value(v) => s.serialize_i64(*v),
            other => s.collect_str(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub base_price: i64,
    pub flea_price: i64,
    pub offer_count: i64,
    pub trader_price: i64,
    pub best_trader: String,
    pub diff: Diff,
    /// `<id>.<ext>` inside the images directory.
    pub img_file: String,
    /// Page-relative, e.g. `images/<id>.webp`. Set whether or not the file exists.
    pub img_path: String,
}
