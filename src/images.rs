use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::config::Config;

static EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(webp|png|jpe?g|gif)(?:[?#].*)?$").unwrap());
static UNSAFE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9-]").unwrap());

/// Escape every byte outside `[A-Za-z0-9-]` as `_XX`. `_` itself is escaped,
/// so distinct ids never share a file.
fn encode_id(id: &str) -> String {
    UNSAFE_RE
        .replace_all(id, |c: &Captures| {
            c[0].bytes().fold(String::new(), |mut s, b| {
                let _ = write!(s, "_{:02X}", b);
                s
            })
        })
        .into_owned()
}

/// Local file name for an item icon: `<id>.<ext>`, extension taken from the URL when known.
pub fn file_name(id: &str, icon_url: Option<&str>, default_ext: &str) -> String {
    let ext = icon_url
        .and_then(|u| EXT_RE.captures(u))
        .map(|c| c[1].to_ascii_lowercase())
        .unwrap_or_else(|| default_ext.to_string());
    format!("{}.{}", encode_id(id), ext)
}

pub struct ImageResolver {
    client: Option<Client>,
    dir: PathBuf,
    pub fetched: usize,
    pub cached: usize,
}

impl ImageResolver {
    pub fn new(cfg: &Config) -> Self {
        ImageResolver {
            // A client that cannot be built just means no icons this run.
            client: cfg.client(cfg.image_timeout).ok(),
            dir: cfg.images_dir(),
            fetched: 0,
            cached: 0,
        }
    }

    /// Make sure `file_name` exists in the images directory.
    ///
    /// An existing file is returned as-is without touching the network. Any
    /// failure yields `None` and is otherwise silent.
    pub fn resolve(&mut self, url: &str, file_name: &str) -> Option<PathBuf> {
        let path = self.dir.join(file_name);
        if path.exists() {
            self.cached += 1;
            return Some(path);
        }

        let client = self.client.as_ref()?;
        let resp = client.get(url).send().ok()?;
        if resp.status() != StatusCode::OK {
            return None;
        }
        let bytes = resp.bytes().ok()?;
        write_file(&path, &bytes)?;
        self.fetched += 1;
        Some(path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Option<()> {
    if fs::write(path, bytes).is_err() {
        let _ = fs::remove_file(path);
        return None;
    }
    Some(())
}
