use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder, Response};
use ss_core::config::ScrapeConfig;

use crate::error::ScrapeError;

/// Accès réseau utilisé par la boucle de scraping.
pub trait Transport {
    /// Fetch `url` and return its body as text.
    ///
    /// # Errors
    /// Returns `ScrapeError` on connection failure or non-2xx status.
    fn get_text(&self, url: &str) -> Result<String, ScrapeError>;

    /// Stream `url` into a new file at `dest`, returning the byte count.
    ///
    /// # Errors
    /// Returns `ScrapeError` on network, status, or write failure.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ScrapeError>;
}

/// Client settings shared by page fetches and downloads.
///
/// The blocking client applies `timeout` to the wait for response headers
/// and then to each body read, not to the whole transfer.
fn client_builder(config: &ScrapeConfig) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
}

/// Blocking reqwest transport with a fixed timeout and User-Agent.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the client from the scraper settings.
    ///
    /// # Errors
    /// Returns `ScrapeError::Client` if the TLS backend cannot be initialised.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = client_builder(config).build().map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }

    fn fetch(&self, url: &str) -> Result<Response, ScrapeError> {
        let response = self.client.get(url).send().map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        self.fetch(url)?.text().map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64, ScrapeError> {
        let mut response = self.fetch(url)?;
        let mut file = File::create(dest).map_err(|source| ScrapeError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        match response.copy_to(&mut file) {
            Ok(n) => Ok(n),
            Err(source) => {
                drop(file);
                // Pas de fichier tronqué sur disque
                if let Err(e) = std::fs::remove_file(dest) {
                    log::debug!("Suppression de {} impossible : {e}", dest.display());
                }
                Err(ScrapeError::Http {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    /// Answer exactly one HTTP request with `response`; the handle yields the
    /// raw request head.
    fn serve_once(response: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut byte = [0u8; 1];
            while !head.ends_with(b"\r\n\r\n") {
                if stream.read(&mut byte).unwrap() == 0 {
                    break;
                }
                head.push(byte[0]);
            }
            stream.write_all(&response).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (url, handle)
    }

    fn response(status: &str, body: &[u8], content_length: usize) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n"
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    /// Production settings, without system proxies so loopback stays direct.
    fn transport() -> HttpTransport {
        let client = client_builder(&ScrapeConfig::default())
            .no_proxy()
            .build()
            .unwrap();
        HttpTransport { client }
    }

    #[test]
    fn client_builds_from_defaults() {
        assert!(HttpTransport::new(&ScrapeConfig::default()).is_ok());
    }

    #[test]
    fn get_text_returns_body_and_sends_user_agent() {
        let html = "<html><body><div class=\"bw-player\"></div></body></html>";
        let (url, server) = serve_once(response("200 OK", html.as_bytes(), html.len()));

        let text = transport().get_text(&format!("{url}/search/?q=&page=1")).unwrap();
        assert_eq!(text, html);

        let head = server.join().unwrap().to_lowercase();
        assert!(head.starts_with("get /search/?q=&page=1 "));
        assert!(head.contains("user-agent: mozilla/5.0 (compatible; freesoundscraper/1.0)"));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let (url, server) = serve_once(response("404 Not Found", b"gone", 4));
        let err = transport().get_text(&url).unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
        server.join().unwrap();
    }

    #[test]
    fn download_streams_body_to_disk() {
        let body: Vec<u8> = (0..=255u8).cycle().take(20_000).collect();
        let (url, server) = serve_once(response("200 OK", &body, body.len()));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Kick.mp3");

        let n = transport().download(&format!("{url}/k.mp3"), &dest).unwrap();
        assert_eq!(n, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        server.join().unwrap();
    }

    #[test]
    fn failed_download_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();

        let (url, server) = serve_once(response("500 Internal Server Error", b"", 0));
        let dest = dir.path().join("err.mp3");
        assert!(matches!(
            transport().download(&url, &dest),
            Err(ScrapeError::Status { status: 500, .. })
        ));
        assert!(!dest.exists());
        server.join().unwrap();

        // Body shorter than announced: the connection closes mid-transfer
        let (url, server) = serve_once(response("200 OK", b"short", 1_000));
        let dest = dir.path().join("cut.mp3");
        assert!(matches!(
            transport().download(&url, &dest),
            Err(ScrapeError::Http { .. })
        ));
        assert!(!dest.exists());
        server.join().unwrap();
    }
}
