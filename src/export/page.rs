use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::{PipelineError, Result};
use crate::model::{Diff, NormalizedItem};

/// Filter debounce on the search box, in milliseconds.
const DEBOUNCE_MS: u32 = 200;

const STYLE: &str = r#"
    body {
        font-family: 'Segoe UI', 'Microsoft YaHei', sans-serif;
        background-color: #121212;
        color: #e0e0e0;
        margin: 0;
        padding: 0;
        height: 100vh;
        display: flex;
        flex-direction: column;
        overflow: hidden;
    }
    .fixed-header {
        flex: 0 0 auto;
        background: #1f1f1f;
        border-bottom: 1px solid #333;
        padding: 20px 30px;
        z-index: 20;
        box-shadow: 0 4px 8px rgba(0,0,0,0.4);
    }
    .header-title { margin: 0 0 6px 0; font-size: 1.5rem; font-weight: bold; color: #fff; }
    .header-meta { margin: 0 0 15px 0; font-size: 0.8rem; color: #777; }
    input#searchInput {
        width: 100%;
        max-width: 800px;
        padding: 12px 15px;
        font-size: 16px;
        border: 1px solid #444;
        background: #2d2d2d;
        color: white;
        border-radius: 6px;
        outline: none;
        transition: border 0.2s, background 0.2s;
    }
    input#searchInput:focus { border-color: #4ec9b0; background: #333; }
    .table-scroll-container { flex: 1 1 auto; overflow-y: auto; padding: 0 30px; position: relative; }
    table { width: 100%; border-collapse: separate; border-spacing: 0; margin-top: 0; }
    th {
        position: sticky;
        top: 0;
        z-index: 10;
        background-color: #121212;
        text-align: left;
        padding: 15px 10px;
        border-bottom: 2px solid #333;
        font-weight: 600;
        color: #bbb;
    }
    td { padding: 12px 10px; border-bottom: 1px solid #252525; vertical-align: middle; }
    tr:hover { background-color: #1e1e20; }
    .price-rub { font-family: 'Consolas', monospace; font-size: 1.1em; letter-spacing: 0.5px; }
    .price-rub::after { content: " ₽"; color: #666; font-size: 0.8em; }
    .flea { color: #a5d6ff; }
    .diff-pos { color: #4ec9b0; font-weight: bold; }
    .diff-neg { color: #f44747; font-weight: bold; }
    .diff-none { color: #777; font-style: italic; }
    img.item-icon {
        width: 56px;
        height: 56px;
        object-fit: contain;
        background: #000;
        border-radius: 4px;
        border: 1px solid #333;
        display: block;
    }
    .item-name { font-size: 1em; font-weight: bold; color: #ddd; }
    .trader-tag { font-size: 0.8em; color: #aaa; background: #333; padding: 2px 6px; border-radius: 4px; margin-left: 8px; }
    .item-meta { font-size: 0.85em; color: #777; margin-top: 4px; }
    .offer-count { font-size: 0.75em; color: #555; }
"#;

const TABLE_HEAD: &str = r#"        <table id="itemTable">
            <thead>
                <tr>
                    <th width="70">Icon</th>
                    <th>Item</th>
                    <th>Base Price</th>
                    <th>Flea Market</th>
                    <th>Trader Buy (best)</th>
                    <th>Diff (flea - trader)</th>
                </tr>
            </thead>
            <tbody>
"#;

/// Row 0 is the header; column 1 holds full name then short name as two divs.
const SCRIPT: &str = r#"
    const searchInput = document.getElementById('searchInput');
    const table = document.getElementById('itemTable');
    let timeout = null;

    searchInput.addEventListener('input', function() {
        clearTimeout(timeout);
        timeout = setTimeout(() => {
            const filter = searchInput.value.toLowerCase().trim();
            const rows = table.getElementsByTagName('tr');
            requestAnimationFrame(() => {
                for (let i = 1; i < rows.length; i++) {
                    const row = rows[i];
                    const nameCol = row.getElementsByTagName('td')[1];
                    if (!nameCol) continue;
                    const divs = nameCol.getElementsByTagName('div');
                    const fullName = divs[0].textContent.toLowerCase();
                    const shortName = divs[1].textContent.toLowerCase();
                    row.style.display =
                        (fullName.includes(filter) || shortName.includes(filter)) ? "" : "none";
                }
            });
        }, __DEBOUNCE__);
    });
"#;

/// `1234567` → `1,234,567`; negatives keep their sign.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn diff_cell(diff: Diff) -> (&'static str, String) {
    match diff {
        Diff::Value(v) if v > 0 => ("diff-pos", group_thousands(v)),
        Diff::Value(v) => ("diff-neg", group_thousands(v)),
        other => ("diff-none", other.to_string()),
    }
}

fn render_row(out: &mut String, p: &NormalizedItem) {
    let flea = if p.flea_price > 0 {
        group_thousands(p.flea_price)
    } else {
        "-".to_string()
    };
    let offers = if p.offer_count > 0 {
        format!(
            "\n                        <span class=\"offer-count\">{} offers</span>",
            group_thousands(p.offer_count)
        )
    } else {
        String::new()
    };
    let (diff_class, diff_text) = diff_cell(p.diff);

    let _ = write!(
        out,
        r#"                <tr data-id="{id}">
                    <td><img src="{img}" loading="lazy" class="item-icon" onerror="this.style.display='none'"></td>
                    <td>
                        <div class="item-name">{name}</div>
                        <div class="item-meta">{short}</div>{offers}
                    </td>
                    <td class="price-rub">{base}</td>
                    <td class="price-rub flea">{flea}</td>
                    <td>
                        <span class="price-rub">{trader_price}</span>
                        <span class="trader-tag">{trader}</span>
                    </td>
                    <td class="{diff_class}">{diff_text}</td>
                </tr>
"#,
        id = escape_html(&p.id),
        img = escape_html(&p.img_path),
        name = escape_html(&p.name),
        short = escape_html(&p.short_name),
        base = group_thousands(p.base_price),
        trader_price = group_thousands(p.trader_price),
        trader = escape_html(&p.best_trader),
    );
}

/// Whole self-contained page: stylesheet, search box, one table row per item, filter script.
pub fn render_page(items: &[NormalizedItem], generated: DateTime<Local>) -> String {
    let mut out = String::with_capacity(4096 + items.len() * 900);
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Tarkov Offline Price Table</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="fixed-header">
        <div class="header-title">Escape from Tarkov Offline Price Table</div>
        <div class="header-meta">{count} items · generated {stamp}</div>
        <input type="text" id="searchInput" placeholder="Search item name (e.g. M4A1, key)..." autocomplete="off">
    </div>
    <div class="table-scroll-container">
{TABLE_HEAD}"#,
        count = items.len(),
        stamp = generated.format("%Y-%m-%d %H:%M"),
    );

    for item in items {
        render_row(&mut out, item);
    }

    let script = SCRIPT.replace("__DEBOUNCE__", &DEBOUNCE_MS.to_string());
    let _ = write!(
        out,
        r#"            </tbody>
        </table>
    </div>
    <script>{script}</script>
</body>
</html>
"#
    );
    out
}

pub fn write_page(path: &Path, items: &[NormalizedItem]) -> Result<()> {
    let html = render_page(items, Local::now());
    fs::write(path, html).map_err(|e| PipelineError::io(path, e))
}
