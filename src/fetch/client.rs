use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};

/// Per-request timeout, covering connect through the end of the body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Write buffer size; bounds memory use regardless of file size.
pub const CHUNK_SIZE: usize = 8192;

/// Suffix of the temporary file a body is streamed into.
pub const PARTIAL_SUFFIX: &str = ".part";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client could not be built: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{url} returned an empty body")]
    EmptyBody { url: String },
}

impl FetchError {
    fn request(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Shared HTTP client used for the background image and every catalog entry.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Opens a GET request and returns (content length, body stream).
    /// Non-success statuses are errors.
    pub async fn open_stream(
        &self,
        url: &str,
    ) -> Result<(Option<u64>, BoxStream<'static, Result<bytes::Bytes>>)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        // A body shorter than Content-Length surfaces as a stream error.
        let total_size = response.content_length();
        let owned_url = url.to_string();
        let stream = response
            .bytes_stream()
            .map_err(move |e| FetchError::request(&owned_url, e))
            .boxed();

        Ok((total_size, stream))
    }

    /// Streams `url` into `dest`, returning the number of bytes written.
    ///
    /// The body goes to a sibling `.part` file that replaces `dest` only once it
    /// is complete, so a failed fetch leaves `dest` untouched.
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    pub async fn fetch_to_path(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!("Starting fetch");
        let (total, stream) = self.open_stream(url).await?;
        debug!(?total, "Response headers received");
        let partial = partial_path(dest);

        match write_body(url, stream, &partial).await {
            Ok(written) => {
                tokio::fs::rename(&partial, dest)
                    .await
                    .map_err(|e| FetchError::io(dest, e))?;
                debug!(bytes = written, "Fetch complete");
                Ok(written)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %partial.display(), error = %cleanup, "Could not remove partial file");
                    }
                }
                Err(e)
            }
        }
    }
}

async fn write_body(
    url: &str,
    mut stream: BoxStream<'static, Result<bytes::Bytes>>,
    partial: &Path,
) -> Result<u64> {
    let file = File::create(partial)
        .await
        .map_err(|e| FetchError::io(partial, e))?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(partial, e))?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| FetchError::io(partial, e))?;
    writer
        .get_ref()
        .sync_all()
        .await
        .map_err(|e| FetchError::io(partial, e))?;

    if written == 0 {
        return Err(FetchError::EmptyBody {
            url: url.to_string(),
        });
    }

    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}
