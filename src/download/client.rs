//! Streaming PDF downloader.
//!
//! [`Downloader`] performs one GET per call, applies the content-type gate to
//! the response headers, and only then streams the body to disk.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, WRITE_BUFFER_SIZE};
use super::content_type;
use super::error::DownloadError;
use crate::config::{ContentTypePolicy, DownloadConfig};

/// HTTP downloader for resolved PDF links.
///
/// Created once per run and shared by every entry task; the underlying
/// `reqwest::Client` pools connections across tasks.
///
/// # Example
///
/// ```no_run
/// use bibfetch_core::{DownloadConfig, Downloader};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Downloader::new(&DownloadConfig::default())?;
/// let bytes = downloader
///     .download(Some("https://arxiv.org/pdf/1706.03762.pdf"), Path::new("attention.pdf"))
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    policy: ContentTypePolicy,
}

impl Downloader {
    /// Builds a downloader from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &DownloadConfig) -> Result<Self, DownloadError> {
        let timeout = config.timeout();
        let connect_timeout = timeout.min(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS));
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .gzip(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| DownloadError::Client { source })?;
        Ok(Self {
            client,
            policy: config.content_type_policy,
        })
    }

    /// Downloads `url` to `dest`, returning the number of bytes written.
    ///
    /// An existing file at `dest` is overwritten. The file is only created
    /// once the response has passed the status and content-type checks, and
    /// it is removed again if streaming the body fails.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::EmptyUrl`] for a missing or blank URL (no request is made)
    /// - [`DownloadError::InvalidUrl`] for unparseable or non-HTTP(S) URLs
    /// - [`DownloadError::Timeout`], [`DownloadError::Network`] for transport failures
    /// - [`DownloadError::HttpStatus`] for non-2xx responses
    /// - [`DownloadError::HtmlContent`], [`DownloadError::DisallowedContentType`] from the gate
    /// - [`DownloadError::Io`] when writing to disk fails
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    pub async fn download(&self, url: Option<&str>, dest: &Path) -> Result<u64, DownloadError> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(DownloadError::EmptyUrl)?;
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(url));
        }

        let response = self.send_request(parsed, url).await?;

        let declared_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        content_type::check(self.policy, declared_type.as_deref(), url)?;

        let file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;

        let stream_result = stream_to_file(file, response, url, dest).await;
        if stream_result.is_err() {
            debug!(path = %dest.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(dest).await;
        }
        let bytes_written = stream_result?;

        info!(path = %dest.display(), bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }

    async fn send_request(&self, url: Url, raw: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(raw)
            } else {
                DownloadError::network(raw, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(raw, status.as_u16()));
        }
        Ok(response)
    }
}

/// Streams response body to file, returning bytes written.
///
/// Kept separate so the caller can remove the file on error.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::socket_guard::{socket_skip_return, start_mock_server_or_skip};
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, Request, ResponseTemplate};

    fn downloader(policy: ContentTypePolicy) -> Downloader {
        Downloader::new(&DownloadConfig {
            content_type_policy: policy,
            ..DownloadConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_url_fails_without_request() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("x.pdf");
        let d = downloader(ContentTypePolicy::Permissive);
        for url in [None, Some(""), Some("   ")] {
            let err = d.download(url, &dest).await.unwrap_err();
            assert!(matches!(err, DownloadError::EmptyUrl), "got {err}");
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_non_http_scheme_is_invalid() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("x.pdf");
        let err = downloader(ContentTypePolicy::Permissive)
            .download(Some("ftp://example.com/a.pdf"), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_pdf_response_written_verbatim_with_browser_agent() {
        let Some(server) = start_mock_server_or_skip().await else {
            return socket_skip_return();
        };
        let body = b"%PDF-1.5\nbinary\x00\x01".to_vec();
        Mock::given(method("GET"))
            .and(path("/paper.pdf"))
            // `matchers::header` splits values on commas, which the UA contains.
            .and(|req: &Request| {
                req.headers.get("user-agent").and_then(|v| v.to_str().ok())
                    == Some(crate::user_agent::BROWSER_USER_AGENT)
            })
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(body.clone()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("paper.pdf");
        let written = downloader(ContentTypePolicy::Permissive)
            .download(Some(&format!("{}/paper.pdf", server.uri())), &dest)
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_html_response_does_not_create_file() {
        let Some(server) = start_mock_server_or_skip().await else {
            return socket_skip_return();
        };
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<html>Sign in</html>".to_vec(), "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("paper.pdf");
        let err = downloader(ContentTypePolicy::Permissive)
            .download(Some(&server.uri()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::HtmlContent { .. }), "got {err}");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let Some(server) = start_mock_server_or_skip().await else {
            return socket_skip_return();
        };
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing.pdf");
        let err = downloader(ContentTypePolicy::Permissive)
            .download(Some(&format!("{}/missing.pdf", server.uri())), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::HttpStatus { status: 404, .. }));
        assert!(err.to_string().contains("404"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_unknown_type_but_permissive_allows() {
        let Some(server) = start_mock_server_or_skip().await else {
            return socket_skip_return();
        };
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/zip")
                    .set_body_bytes(b"PK".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let strict_dest = dir.path().join("strict.pdf");
        let err = downloader(ContentTypePolicy::Strict)
            .download(Some(&server.uri()), &strict_dest)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::DisallowedContentType { .. }));
        assert!(!strict_dest.exists());

        let loose_dest = dir.path().join("loose.pdf");
        let written = downloader(ContentTypePolicy::Permissive)
            .download(Some(&server.uri()), &loose_dest)
            .await
            .unwrap();
        assert_eq!(written, 2);
    }

    #[tokio::test]
    async fn test_existing_file_is_overwritten() {
        let Some(server) = start_mock_server_or_skip().await else {
            return socket_skip_return();
        };
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"new".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("paper.pdf");
        std::fs::write(&dest, b"old partial content").unwrap();
        downloader(ContentTypePolicy::Permissive)
            .download(Some(&server.uri()), &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_truncated_body_removes_partial_file() {
        if crate::test_support::socket_guard::should_skip_socket_bound_test() {
            return;
        }
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 2048];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      Content-Type: application/pdf\r\n\
                      Content-Length: 100000\r\n\r\n\
                      %PDF-1.4 partial",
                )
                .await
                .unwrap();
            socket.flush().await.unwrap();
            // Dropping the socket ends the body well short of Content-Length.
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("partial.pdf");
        let err = downloader(ContentTypePolicy::Strict)
            .download(Some(&format!("http://{addr}/paper.pdf")), &dest)
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, DownloadError::Network { .. }), "got {err}");
        assert!(!dest.exists());
    }
}
