use std::path::{Path, PathBuf};
use std::time::Duration;

const API_URL: &str = "https://api.eftarkov.com/dasha445566.php?id=9";
const OUTPUT_DIR: &str = "Tarkov_Data";
const CACHE_FILE: &str = "temp_data.json";
const IMAGES_DIR: &str = "images";
const CSV_FILE: &str = "tarkov_prices.csv";
const HTML_FILE: &str = "index.html";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Everything a run needs to know: where to fetch from, where to write, how long to wait.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub output_dir: PathBuf,
    /// Sent with both the dataset request and every icon request.
    pub headers: Vec<(String, String)>,
    pub dataset_timeout: Duration,
    pub image_timeout: Duration,
    /// Progress is reported once per this many records.
    pub progress_every: usize,
    /// Used when the icon URL carries no recognised extension.
    pub image_ext: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: API_URL.to_string(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            headers: vec![
                ("User-Agent".into(), USER_AGENT.into()),
                ("Accept".into(), ACCEPT.into()),
                ("Connection".into(), "keep-alive".into()),
            ],
            dataset_timeout: Duration::from_secs(60),
            image_timeout: Duration::from_secs(10),
            progress_every: 100,
            image_ext: "webp".to_string(),
        }
    }
}

impl Config {
    /// Production defaults rooted at a different directory.
    #[cfg(test)]
    pub fn with_output_dir(dir: impl AsRef<Path>) -> Self {
        Config {
            output_dir: dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        self.output_dir.join(CACHE_FILE)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join(IMAGES_DIR)
    }

    /// Directory name used for image paths embedded in the page, relative to the page itself.
    pub fn images_rel(&self) -> &'static str {
        IMAGES_DIR
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(CSV_FILE)
    }

    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join(HTML_FILE)
    }

    pub fn header_map(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                continue;
            };
            map.insert(name, value);
        }
        map
    }

    /// Blocking client carrying the configured headers and the given per-call timeout.
    pub fn client(&self, timeout: Duration) -> reqwest::Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .default_headers(self.header_map())
            .timeout(timeout)
            .build()
    }
}
