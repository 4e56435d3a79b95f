use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::Config;
use crate::error::{PipelineError, Result};

const CHUNK_SIZE: usize = 8192;

/// Stream the dataset to the cache file. Returns the number of bytes written.
///
/// The body goes to `<cache>.part` first and is renamed into place only once
/// fully written, so an interrupted download never looks like a valid cache.
pub fn download_dataset(cfg: &Config) -> Result<u64> {
    let cache = cfg.cache_path();
    info!("Fetching dataset (streaming): {}", cfg.endpoint);

    let fetch_err = |source: reqwest::Error| PipelineError::Fetch {
        endpoint: cfg.endpoint.clone(),
        cache: cache.clone(),
        source,
    };

    let client = cfg.client(cfg.dataset_timeout).map_err(fetch_err)?;
    let mut response = client
        .get(&cfg.endpoint)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            error!("Dataset download failed: {}", e);
            fetch_err(e)
        })?;

    let part = part_path(&cache);
    let written = match stream_to(&mut response, &part) {
        Ok(n) => n,
        Err(StreamError::Read(source)) => {
            let _ = fs::remove_file(&part);
            error!("Dataset download interrupted: {}", source);
            return Err(PipelineError::FetchBody {
                endpoint: cfg.endpoint.clone(),
                cache,
                source,
            });
        }
        Err(StreamError::Write(source)) => {
            let e = PipelineError::io(&part, source);
            let _ = fs::remove_file(&part);
            error!("Writing dataset failed: {}", e);
            return Err(e);
        }
    };

    fs::rename(&part, &cache).map_err(|e| PipelineError::io(&cache, e))?;
    info!(
        "Dataset downloaded: {:.2} MB -> {}",
        written as f64 / 1024.0 / 1024.0,
        cache.display()
    );
    Ok(written)
}

/// Network side and disk side fail differently: only the former gets the download hint.
enum StreamError {
    Read(io::Error),
    Write(io::Error),
}

fn stream_to(response: &mut impl Read, path: &Path) -> std::result::Result<u64, StreamError> {
    let file = File::create(path).map_err(StreamError::Write)?;
    let mut out = BufWriter::new(file);
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let n = match response.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Read(e)),
        };
        out.write_all(&buf[..n]).map_err(StreamError::Write)?;
        written += n as u64;
    }
    out.flush().map_err(StreamError::Write)?;
    Ok(written)
}

fn part_path(cache: &Path) -> PathBuf {
    let mut name = cache.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    cache.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{refused_url, serve_declaring, serve_once};

    #[test]
    fn writes_body_to_cache_and_removes_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = br#"{"raw_api_data":{"data":{"items":[]}}}"#;
        let server = serve_once(200, body.to_vec());

        let mut cfg = Config::with_output_dir(dir.path());
        cfg.endpoint = server.url("/dasha.php?id=9");

        let n = download_dataset(&cfg).unwrap();
        assert_eq!(n, body.len() as u64);
        assert_eq!(fs::read(cfg.cache_path()).unwrap(), body);
        assert!(!part_path(&cfg.cache_path()).exists());

        let request = server.finish();
        assert!(request.starts_with("GET /dasha.php?id=9 "));
        assert!(request.to_ascii_lowercase().contains("user-agent: mozilla/5.0"));
    }

    #[test]
    fn non_success_status_leaves_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let server = serve_once(503, b"busy".to_vec());

        let mut cfg = Config::with_output_dir(dir.path());
        cfg.endpoint = server.url("/");

        let err = download_dataset(&cfg).unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert!(err.to_string().contains("hint:"));
        assert!(!cfg.cache_path().exists());
        server.finish();
    }

    #[test]
    fn truncated_body_keeps_hint_and_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let server = serve_declaring(100_000, br#"{"raw_api"#.to_vec());

        let mut cfg = Config::with_output_dir(dir.path());
        cfg.endpoint = server.url("/");

        let err = download_dataset(&cfg).unwrap_err();
        assert!(matches!(err, PipelineError::FetchBody { .. }));
        assert!(err.to_string().contains("hint:"));
        assert!(!cfg.cache_path().exists());
        assert!(!part_path(&cfg.cache_path()).exists());
        server.finish();
    }

    #[test]
    fn connection_failure_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::with_output_dir(dir.path());
        cfg.endpoint = refused_url();

        let err = download_dataset(&cfg).unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert!(!cfg.cache_path().exists());
    }

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("out/temp_data.json")),
            PathBuf::from("out/temp_data.json.part")
        );
    }
}
