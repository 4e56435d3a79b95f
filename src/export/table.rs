use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::model::{Diff, NormalizedItem};

/// Header used when there are no rows to infer it from.
const HEADER: [&str; 7] = [
    "Short Name",
    "Full Name",
    "Base Price",
    "Flea Price",
    "Trader Price",
    "Best Trader",
    "Diff",
];

/// Lets spreadsheet tools detect UTF-8 and keep non-ASCII names intact.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Short Name")]
    short_name: &'a str,
    #[serde(rename = "Full Name")]
    name: &'a str,
    #[serde(rename = "Base Price")]
    base_price: i64,
    #[serde(rename = "Flea Price")]
    flea_price: i64,
    #[serde(rename = "Trader Price")]
    trader_price: i64,
    #[serde(rename = "Best Trader")]
    best_trader: &'a str,
    /// Integer for normal rows, sentinel text otherwise.
    #[serde(rename = "Diff")]
    diff: Diff,
}

impl<'a> From<&'a NormalizedItem> for CsvRow<'a> {
    fn from(item: &'a NormalizedItem) -> Self {
        CsvRow {
            short_name: &item.short_name,
            name: &item.name,
            base_price: item.base_price,
            flea_price: item.flea_price,
            trader_price: item.trader_price,
            best_trader: &item.best_trader,
            diff: item.diff,
        }
    }
}

/// Header plus one row per item, in the given order.
pub fn write_rows<W: Write>(mut w: W, items: &[NormalizedItem]) -> Result<()> {
    w.write_all(UTF8_BOM)
        .map_err(|e| PipelineError::Csv(e.into()))?;
    let mut writer = csv::Writer::from_writer(w);
    for item in items {
        writer.serialize(CsvRow::from(item))?;
    }
    if items.is_empty() {
        writer.write_record(HEADER)?;
    }
    writer.flush().map_err(|e| PipelineError::Csv(e.into()))?;
    Ok(())
}

pub fn write_csv(path: &Path, items: &[NormalizedItem]) -> Result<()> {
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    write_rows(BufWriter::new(file), items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(short: &str, name: &str, flea: i64, trader: i64) -> NormalizedItem {
        NormalizedItem {
            id: short.to_lowercase(),
            name: name.to_string(),
            short_name: short.to_string(),
            base_price: 15000,
            flea_price: flea,
            offer_count: 0,
            trader_price: trader,
            best_trader: if trader > 0 { "Skier".into() } else { "none".into() },
            diff: Diff::compute(flea, trader),
            img_file: String::new(),
            img_path: String::new(),
        }
    }

    fn render(items: &[NormalizedItem]) -> String {
        let mut buf = Vec::new();
        write_rows(&mut buf, items).unwrap();
        assert!(buf.starts_with(UTF8_BOM));
        String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap()
    }

    #[test]
    fn header_and_rows_in_fixed_order() {
        let out = render(&[item("AK74", "AK-74", 18000, 13500)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "Short Name,Full Name,Base Price,Flea Price,Trader Price,Best Trader,Diff",
                "AK74,AK-74,15000,18000,13500,Skier,4500",
            ]
        );
    }

    #[test]
    fn sentinels_are_written_as_text() {
        let out = render(&[item("Tag", "Dogtag", 0, 0), item("Q", "Quest", 5000, 0)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "Tag,Dogtag,15000,0,0,none,no market price");
        assert_eq!(lines[2], "Q,Quest,15000,5000,0,none,market price only");
    }

    #[test]
    fn quotes_and_non_ascii_survive() {
        let out = render(&[item("Ф-1", "Grenade, \"F-1\"", 1000, 2500)]);
        assert!(out.contains("Ф-1,\"Grenade, \"\"F-1\"\"\",15000,1000,2500,Skier,-1500"));
    }

    #[test]
    fn empty_input_still_has_header() {
        let out = render(&[]);
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("Short Name,"));
    }
}
