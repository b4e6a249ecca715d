/// Load-time tiers
///
/// Each tier is a probe that either yields a collection (possibly empty) or
/// fails. The loader walks them in priority order.

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::fmt;

use crate::config::AssetSource;
use crate::error::ProbeError;
use crate::state::data::{Artwork, ArtworkCollection};
use crate::state::store::CollectionStore;

/// Collection compiled into the binary
pub const BUNDLED_COLLECTION: &str = include_str!("../../assets/data.json");

/// Which storage location a collection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    StaticAsset,
    LocalCache,
    BundledDefault,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::StaticAsset => "static asset",
            Tier::LocalCache => "local cache",
            Tier::BundledDefault => "bundled default",
        };
        f.write_str(name)
    }
}

/// One tier of the load-time fallback chain
#[async_trait]
pub trait CollectionProbe: Send + Sync {
    fn tier(&self) -> Tier;

    async fn probe(&self) -> Result<Vec<Artwork>, ProbeError>;
}

fn parse_collection(bytes: &[u8]) -> Result<Vec<Artwork>, ProbeError> {
    Ok(ArtworkCollection::from_slice(bytes)?.artworks)
}

/// The published `data.json`, always fetched fresh
pub struct StaticAssetProbe {
    source: AssetSource,
    client: reqwest::Client,
}

impl StaticAssetProbe {
    pub fn new(source: AssetSource) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { source, client }
    }
}

#[async_trait]
impl CollectionProbe for StaticAssetProbe {
    fn tier(&self) -> Tier {
        Tier::StaticAsset
    }

    async fn probe(&self) -> Result<Vec<Artwork>, ProbeError> {
        match &self.source {
            AssetSource::Remote(url) => {
                let response = self
                    .client
                    .get(url)
                    .header(CACHE_CONTROL, "no-cache")
                    .header(PRAGMA, "no-cache")
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(ProbeError::Status(status.as_u16()));
                }

                parse_collection(&response.bytes().await?)
            }
            AssetSource::File(path) => parse_collection(&tokio::fs::read(path).await?),
        }
    }
}

/// The local cache tier
pub struct LocalCacheProbe {
    store: CollectionStore,
}

impl LocalCacheProbe {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CollectionProbe for LocalCacheProbe {
    fn tier(&self) -> Tier {
        Tier::LocalCache
    }

    async fn probe(&self) -> Result<Vec<Artwork>, ProbeError> {
        Ok(self.store.load().await?)
    }
}

/// JSON shipped with the build
pub struct BundledDefaultProbe {
    json: &'static str,
}

impl BundledDefaultProbe {
    pub fn new(json: &'static str) -> Self {
        Self { json }
    }
}

impl Default for BundledDefaultProbe {
    fn default() -> Self {
        Self::new(BUNDLED_COLLECTION)
    }
}

#[async_trait]
impl CollectionProbe for BundledDefaultProbe {
    fn tier(&self) -> Tier {
        Tier::BundledDefault
    }

    async fn probe(&self) -> Result<Vec<Artwork>, ProbeError> {
        parse_collection(self.json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::loader::GalleryLoader;
    use crate::state::data::fixtures::artwork;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request and hand back the request head, lowercased
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (format!("http://{addr}/data.json"), server)
    }

    #[tokio::test]
    async fn test_remote_asset_fetched_without_cache() {
        let published = ArtworkCollection::new(vec![artwork("Over the wire")]);
        let (url, server) = serve_once("200 OK", published.to_json().unwrap()).await;

        let probe = StaticAssetProbe::new(AssetSource::Remote(url));
        let artworks = probe.probe().await.unwrap();

        assert_eq!(artworks, published.artworks);
        let request = server.await.unwrap();
        assert!(request.starts_with("get /data.json "));
        assert!(request.contains("cache-control: no-cache"));
        assert!(request.contains("pragma: no-cache"));
    }

    #[tokio::test]
    async fn test_remote_asset_error_status() {
        let (url, server) = serve_once("404 Not Found", "Not Found".to_string()).await;

        let probe = StaticAssetProbe::new(AssetSource::Remote(url));

        assert!(matches!(probe.probe().await, Err(ProbeError::Status(404))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_asset_garbled_body() {
        let (url, server) = serve_once("200 OK", "<html>maintenance</html>".to_string()).await;

        let probe = StaticAssetProbe::new(AssetSource::Remote(url));

        assert!(matches!(probe.probe().await, Err(ProbeError::Parse(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_asset_failure_falls_through_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = CollectionStore::open(dir.path().join("portfolio.db")).unwrap();
        let cached = vec![artwork("Kept locally")];
        store.replace(cached.clone()).await.unwrap();
        let (url, server) = serve_once("500 Internal Server Error", String::new()).await;

        let loader = GalleryLoader::new(
            vec![
                Box::new(StaticAssetProbe::new(AssetSource::Remote(url))),
                Box::new(LocalCacheProbe::new(store.clone())),
            ],
            Some(store.clone()),
        );
        let outcome = loader.load().await;

        assert_eq!(outcome.tier, Some(Tier::LocalCache));
        assert_eq!(outcome.state.artworks(), cached.as_slice());
        assert_eq!(store.load().await.unwrap(), cached);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_bundled_collection_parses() {
        let artworks = BundledDefaultProbe::default().probe().await.unwrap();
        assert!(!artworks.is_empty());
    }

    #[tokio::test]
    async fn test_static_file_probe_reads_fresh_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let probe = StaticAssetProbe::new(AssetSource::File(path.clone()));

        let first = ArtworkCollection::new(vec![artwork("One")]);
        std::fs::write(&path, first.to_json().unwrap()).unwrap();
        assert_eq!(probe.probe().await.unwrap(), first.artworks);

        let second = ArtworkCollection::new(vec![artwork("One"), artwork("Two")]);
        std::fs::write(&path, second.to_json().unwrap()).unwrap();
        assert_eq!(probe.probe().await.unwrap(), second.artworks);
    }

    #[tokio::test]
    async fn test_static_file_probe_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = StaticAssetProbe::new(AssetSource::File(dir.path().join("absent.json")));
        assert!(matches!(missing.probe().await, Err(ProbeError::Io(_))));

        let garbled_path = dir.path().join("garbled.json");
        std::fs::write(&garbled_path, "<html>404</html>").unwrap();
        let garbled = StaticAssetProbe::new(AssetSource::File(garbled_path));
        assert!(matches!(garbled.probe().await, Err(ProbeError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_artworks_key_is_empty() {
        let probe = BundledDefaultProbe::new("{}");
        assert!(probe.probe().await.unwrap().is_empty());
    }
}
