// src/engine/io.rs
//
// I/O operations: image sources, source identity, data URLs and remote fetch.

use super::common::EngineResult;
use crate::error::CropEngineError;
use base64::Engine as _;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Where the image for a session comes from.
#[derive(Clone)]
pub enum ImageSource {
    /// Raw encoded bytes, e.g. a file the user just picked.
    Bytes(Arc<Vec<u8>>),
    /// `data:image/...;base64,...`
    DataUrl(String),
    /// Remote image fetched through an [`ImageFetcher`].
    Url(String),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            Self::DataUrl(url) => write!(f, "DataUrl({} chars)", url.len()),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

impl ImageSource {
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::new(data.into()))
    }

    /// Classify a host-supplied string: `data:` URLs are decoded locally,
    /// anything else is treated as a remote URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        if url.trim_start().starts_with("data:") {
            Self::DataUrl(url)
        } else {
            Self::Url(url)
        }
    }

    /// Stable identity used to key the edit history.
    ///
    /// URLs and data URLs are compared by their full string; raw bytes by a
    /// content digest plus length, so re-picking the same file matches.
    pub fn identity(&self) -> ImageIdentity {
        match self {
            Self::Url(url) | Self::DataUrl(url) => ImageIdentity::Url(url.clone()),
            Self::Bytes(data) => {
                let mut hasher = DefaultHasher::new();
                data.hash(&mut hasher);
                ImageIdentity::Content {
                    digest: hasher.finish(),
                    len: data.len(),
                }
            }
        }
    }

    /// Resolve to encoded bytes. `fetcher` is required only for `Url`.
    pub fn load(&self, fetcher: Option<&dyn ImageFetcher>) -> EngineResult<Arc<Vec<u8>>> {
        match self {
            Self::Bytes(data) => Ok(data.clone()),
            Self::DataUrl(url) => decode_data_url(url).map(Arc::new),
            Self::Url(url) => {
                let fetcher = fetcher.ok_or_else(|| {
                    CropEngineError::fetch_failed(url.clone(), "no fetcher configured")
                })?;
                fetcher.fetch(url).map(Arc::new)
            }
        }
    }
}

/// Identity of a source image, as stored in the edit history.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageIdentity {
    Url(String),
    Content { digest: u64, len: usize },
}

/// Decode a base64 `data:` URL into its payload bytes.
pub fn decode_data_url(url: &str) -> EngineResult<Vec<u8>> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| CropEngineError::invalid_data_url("missing data: prefix"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CropEngineError::invalid_data_url("missing ',' separator"))?;

    if !meta
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"))
    {
        return Err(CropEngineError::invalid_data_url(
            "only base64 data URLs are supported",
        ));
    }

    // Some hosts line-wrap long data URLs.
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CropEngineError::invalid_data_url(format!("invalid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(CropEngineError::invalid_data_url("empty payload"));
    }
    Ok(bytes)
}

/// Fetches remote image bytes. Implementations must be usable from a
/// background task.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> EngineResult<Vec<u8>>;
}

/// Blocking HTTP(S) fetcher with a byte cap and timeout.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_bytes: u64,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new(timeout: std::time::Duration, max_bytes: u64) -> EngineResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("votecard-crop/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| CropEngineError::fetch_failed("", format!("client init failed: {e}")))?;
        Ok(Self { client, max_bytes })
    }

    pub fn from_limits(limits: &super::limits::EditorLimits) -> EngineResult<Self> {
        Self::new(limits.timeout(), limits.byte_cap())
    }
}

#[cfg(feature = "http")]
impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> EngineResult<Vec<u8>> {
        use std::io::Read;

        let parsed = reqwest::Url::parse(url)
            .map_err(|e| CropEngineError::fetch_failed(url.to_string(), format!("invalid url: {e}")))?;
        let scheme = parsed.scheme().to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(CropEngineError::fetch_failed(
                url.to_string(),
                format!("unsupported scheme '{scheme}'"),
            ));
        }

        tracing::debug!(url, "fetching remote image");
        let resp = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| CropEngineError::fetch_failed(url.to_string(), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CropEngineError::fetch_failed(
                url.to_string(),
                format!("HTTP {}", status.as_u16()),
            ));
        }
        if let Some(len) = resp.content_length() {
            if len > self.max_bytes {
                return Err(CropEngineError::limit_exceeded(format!(
                    "remote image is {len} bytes, limit is {}",
                    self.max_bytes
                )));
            }
        }

        let mut body = Vec::new();
        resp.take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| CropEngineError::fetch_failed(url.to_string(), e.to_string()))?;
        if body.len() as u64 > self.max_bytes {
            return Err(CropEngineError::limit_exceeded(format!(
                "remote image exceeds {} bytes",
                self.max_bytes
            )));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher(Vec<u8>);

    impl ImageFetcher for StaticFetcher {
        fn fetch(&self, _url: &str) -> EngineResult<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn decodes_base64_data_url() {
        let bytes = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        let wrapped = decode_data_url("data:image/png;base64,aGVs\nbG8=").unwrap();
        assert_eq!(wrapped, b"hello");
    }

    #[test]
    fn rejects_malformed_data_urls() {
        for bad in [
            "image/png;base64,aGVsbG8=",
            "data:image/png;base64",
            "data:image/png,hello",
            "data:image/png;base64,!!!",
            "data:image/png;base64,",
        ] {
            let err = decode_data_url(bad).unwrap_err();
            assert!(
                matches!(err, CropEngineError::InvalidDataUrl { .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn classifies_urls() {
        assert!(matches!(
            ImageSource::from_url("data:image/png;base64,AA=="),
            ImageSource::DataUrl(_)
        ));
        assert!(matches!(
            ImageSource::from_url("https://cdn.example.com/a.png"),
            ImageSource::Url(_)
        ));
    }

    #[test]
    fn identity_by_url_or_content() {
        let a = ImageSource::from_url("https://cdn.example.com/a.png");
        let b = ImageSource::from_url("https://cdn.example.com/a.png");
        assert_eq!(a.identity(), b.identity());
        assert_ne!(
            a.identity(),
            ImageSource::from_url("https://cdn.example.com/b.png").identity()
        );

        let x = ImageSource::from_bytes(vec![1, 2, 3]);
        let y = ImageSource::from_bytes(vec![1, 2, 3]);
        let z = ImageSource::from_bytes(vec![1, 2, 4]);
        assert_eq!(x.identity(), y.identity());
        assert_ne!(x.identity(), z.identity());
    }

    #[test]
    fn url_requires_fetcher() {
        let src = ImageSource::from_url("https://cdn.example.com/a.png");
        let err = src.load(None).unwrap_err();
        assert!(matches!(err, CropEngineError::FetchFailed { .. }));

        let fetcher = StaticFetcher(vec![7, 7]);
        assert_eq!(*src.load(Some(&fetcher as &dyn ImageFetcher)).unwrap(), vec![7, 7]);
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_fetcher_rejects_non_http_schemes() {
        let fetcher = HttpFetcher::new(std::time::Duration::from_secs(1), 1024).unwrap();
        let err = fetcher.fetch("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, CropEngineError::FetchFailed { .. }));
    }
}
