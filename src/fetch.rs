use crate::Result;
use log::{debug, warn};
use serde::Deserialize;
use std::io::Write;
use std::time::Duration;

/// Pixel dimensions requested from the keyless provider.
pub const DEFAULT_IMAGE_WIDTH: u32 = 1600;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 900;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

const SEARCH_ENDPOINT: &str = "https://api.unsplash.com/search/photos";
const REDIRECT_ENDPOINT: &str = "https://loremflickr.com";

/// Result of one fetch attempt. Transport and HTTP-status failures are
/// folded into `NotFound`; they degrade the deck, they never abort it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    NotFound,
}

/// Capability: find an image for a text query and stream its bytes into
/// `out`. On `NotFound`, `out` may have received partial data and should be
/// discarded by the caller.
pub trait ImageSource {
    fn fetch(&self, query: &str, out: &mut dyn Write) -> FetchOutcome;
}

/// Picks the retrieval strategy once at startup: keyed search when an access
/// key is present, the keyless redirect service otherwise.
pub fn image_source_from_key(access_key: Option<String>) -> Result<Box<dyn ImageSource>> {
    match access_key {
        Some(key) if !key.trim().is_empty() => Ok(Box::new(KeyedSearch::new(key)?)),
        _ => Ok(Box::new(RedirectFetch::new()?)),
    }
}

/// Ranked photo search against the provider API, followed by a separate
/// download of the best match.
pub struct KeyedSearch {
    client: reqwest::blocking::Client,
    access_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: ImageUrls,
}

#[derive(Debug, Deserialize)]
struct ImageUrls {
    full: String,
}

impl KeyedSearch {
    pub fn new(access_key: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self { client, access_key })
    }

    /// One landscape-oriented result; its highest-resolution URL.
    fn search(&self, query: &str) -> reqwest::Result<Option<String>> {
        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("query", query),
                ("orientation", "landscape"),
                ("per_page", "1"),
            ])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .timeout(SEARCH_TIMEOUT)
            .send()?
            .error_for_status()?;

        let parsed: SearchResponse = response.json()?;
        Ok(parsed.results.into_iter().next().map(|r| r.urls.full))
    }

    fn download(&self, url: &str, out: &mut dyn Write) -> reqwest::Result<u64> {
        let mut response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()?
            .error_for_status()?;
        response.copy_to(out)
    }
}

impl ImageSource for KeyedSearch {
    fn fetch(&self, query: &str, out: &mut dyn Write) -> FetchOutcome {
        let url = match self.search(query) {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!("image search returned no results for '{query}'");
                return FetchOutcome::NotFound;
            }
            Err(e) => {
                warn!("image search failed for '{query}': {e}");
                return FetchOutcome::NotFound;
            }
        };

        match self.download(&url, out) {
            Ok(_) => FetchOutcome::Fetched,
            Err(e) => {
                warn!("image download failed for '{query}': {e}");
                FetchOutcome::NotFound
            }
        }
    }
}

/// Keyless strategy: a deterministic redirect URL embedding the query and
/// the desired pixel dimensions. The service redirects to a matching image;
/// the client follows and downloads.
pub struct RedirectFetch {
    client: reqwest::blocking::Client,
    width: u32,
    height: u32,
}

impl RedirectFetch {
    pub fn new() -> Result<Self> {
        Self::with_size(DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            width,
            height,
        })
    }

    fn redirect_url(&self, query: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            REDIRECT_ENDPOINT,
            self.width,
            self.height,
            urlencoding::encode(query)
        )
    }
}

impl ImageSource for RedirectFetch {
    fn fetch(&self, query: &str, out: &mut dyn Write) -> FetchOutcome {
        let url = self.redirect_url(query);
        let result = self
            .client
            .get(&url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|mut r| r.copy_to(out));

        match result {
            Ok(_) => FetchOutcome::Fetched,
            Err(e) => {
                warn!("image fetch failed for '{query}': {e}");
                FetchOutcome::NotFound
            }
        }
    }
}
