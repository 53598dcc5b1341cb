use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::ReshapeError;

pub trait Fetcher {
    /// Stores the raw response body of `url` at `destination`. Returns the byte count.
    fn download(&self, url: &str, destination: &Path) -> Result<u64, ReshapeError>;
}

#[derive(Clone)]
pub struct EurostatHttpClient {
    client: Client,
}

impl EurostatHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, ReshapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("eurostat-reshape/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ReshapeError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| ReshapeError::Http(err.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for EurostatHttpClient {
    fn download(&self, url: &str, destination: &Path) -> Result<u64, ReshapeError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ReshapeError::Http(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ReshapeError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|err| ReshapeError::Filesystem(err.to_string()))?;
        }
        let mut file =
            File::create(destination).map_err(|err| ReshapeError::Filesystem(err.to_string()))?;
        let written = io::copy(&mut response, &mut file)
            .map_err(|err| ReshapeError::Http(err.to_string()))?;
        debug!(url, bytes = written, path = %destination.display(), "cached archive");
        Ok(written)
    }
}

/// Gunzips `archive` into `destination`, replacing it. Returns the decompressed size.
pub fn decompress_file(archive: &Path, destination: &Path) -> Result<u64, ReshapeError> {
    let decompress_err = |message: String| ReshapeError::Decompress {
        path: archive.display().to_string(),
        message,
    };
    let input = File::open(archive).map_err(|err| decompress_err(err.to_string()))?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| ReshapeError::Filesystem(err.to_string()))?;
    }
    let output =
        File::create(destination).map_err(|err| ReshapeError::Filesystem(err.to_string()))?;

    let mut decoder = GzDecoder::new(BufReader::new(input));
    let mut writer = BufWriter::new(output);
    let written =
        io::copy(&mut decoder, &mut writer).map_err(|err| decompress_err(err.to_string()))?;
    io::Write::flush(&mut writer).map_err(|err| ReshapeError::Filesystem(err.to_string()))?;
    Ok(written)
}
