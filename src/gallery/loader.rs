use std::sync::Arc;

use super::probe::{BundledDefaultProbe, CollectionProbe, LocalCacheProbe, StaticAssetProbe, Tier};
use crate::config::PortfolioConfig;
use crate::state::data::Artwork;
use crate::state::store::CollectionStore;

/// What the gallery view is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready(Vec<Artwork>),
    /// Every tier came back empty or failed
    Empty,
}

impl LoadState {
    fn from_artworks(artworks: Vec<Artwork>) -> Self {
        if artworks.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Ready(artworks)
        }
    }

    /// Replace the collection wholesale with a notification payload
    pub fn apply_notification(&mut self, artworks: Vec<Artwork>) {
        *self = Self::from_artworks(artworks);
    }

    pub fn artworks(&self) -> &[Artwork] {
        match self {
            LoadState::Ready(artworks) => artworks,
            LoadState::Loading | LoadState::Empty => &[],
        }
    }
}

/// Result of one load pass
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Tier the collection came from, `None` when nothing was found
    pub tier: Option<Tier>,
    pub state: LoadState,
}

/// Resolves the collection to render by walking the tiers in order
pub struct GalleryLoader {
    probes: Vec<Box<dyn CollectionProbe>>,
    /// Overwritten when the static asset wins
    cache: Option<CollectionStore>,
}

impl GalleryLoader {
    pub fn new(probes: Vec<Box<dyn CollectionProbe>>, cache: Option<CollectionStore>) -> Self {
        Self { probes, cache }
    }

    /// Static asset, then local cache, then the bundled default
    pub fn standard(config: &PortfolioConfig, store: CollectionStore) -> Self {
        Self::new(
            vec![
                Box::new(StaticAssetProbe::new(config.static_asset.clone())),
                Box::new(LocalCacheProbe::new(store.clone())),
                Box::new(BundledDefaultProbe::default()),
            ],
            Some(store),
        )
    }

    /// Probe each tier in turn and stop at the first non-empty collection.
    ///
    /// Failures and empty tiers fall through to the next one. If the static
    /// asset wins, the local cache is overwritten with it, unless the cache
    /// was written while the tiers were being probed.
    pub async fn load(&self) -> LoadOutcome {
        let seen_revision = self.cache_revision().await;

        for probe in &self.probes {
            let tier = probe.tier();
            let artworks = match probe.probe().await {
                Ok(artworks) if !artworks.is_empty() => artworks,
                Ok(_) => {
                    tracing::debug!(%tier, "tier is empty, falling back");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(%tier, error = %e, "tier unavailable, falling back");
                    continue;
                }
            };

            tracing::info!(%tier, count = artworks.len(), "gallery loaded");

            if tier == Tier::StaticAsset {
                self.refresh_cache(&artworks, seen_revision).await;
            }

            return LoadOutcome {
                tier: Some(tier),
                state: LoadState::Ready(artworks),
            };
        }

        tracing::info!("no artworks in any tier");
        LoadOutcome {
            tier: None,
            state: LoadState::Empty,
        }
    }

    async fn cache_revision(&self) -> Option<i64> {
        let store = self.cache.as_ref()?;
        match store.revision().await {
            Ok(revision) => Some(revision),
            Err(e) => {
                tracing::warn!(error = %e, "could not read cache revision, skipping refresh");
                None
            }
        }
    }

    async fn refresh_cache(&self, artworks: &[Artwork], seen_revision: Option<i64>) {
        let (Some(store), Some(expected)) = (&self.cache, seen_revision) else {
            return;
        };
        // A failed or skipped refresh leaves the cache as it is
        match store.replace_if_unchanged(artworks.to_vec(), expected).await {
            Ok(true) => tracing::debug!("local cache refreshed from static asset"),
            Ok(false) => tracing::info!("local cache changed during load, keeping local writes"),
            Err(e) => tracing::warn!(error = %e, "could not refresh local cache from static asset"),
        }
    }
}

/// Run one load pass on a shared loader
pub async fn load_shared(loader: Arc<GalleryLoader>) -> LoadOutcome {
    loader.load().await
}
