use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::dispatch::Dispatcher;
use super::encode::encode_all;
use super::validation::{validate, ArtworkForm};
use crate::config;
use crate::error::{DispatchError, SubmitError};
use crate::state::data::Artwork;
use crate::state::store::CollectionStore;

/// What a successful submission produced
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    /// The artwork as persisted
    pub artwork: Artwork,
    /// The full local collection after the append
    pub collection: Vec<Artwork>,
    /// Outcome of the remote dispatch attempt
    pub remote: Result<(), DispatchError>,
    /// Live gallery views that received the updated collection
    pub notified: usize,
}

impl SubmissionReport {
    pub fn success_message(&self) -> String {
        format!("Art \"{}\" submitted successfully!", self.artwork.title)
    }

    /// Banner text when the artwork only reached the local tier
    pub fn advisory(&self) -> Option<&'static str> {
        self.remote.as_ref().err().map(DispatchError::advisory)
    }
}

/// Validates, encodes and persists new artwork across the storage tiers.
///
/// Cheap to clone; clones share the store, the dispatcher and the
/// in-flight flag.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    store: CollectionStore,
    dispatcher: Arc<dyn Dispatcher>,
    in_flight: Arc<AtomicBool>,
}

impl SubmissionCoordinator {
    pub fn new(store: CollectionStore, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a submission is running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one submission to completion.
    ///
    /// Order of work:
    /// 1. validation (no I/O on failure)
    /// 2. all images encoded and joined
    /// 3. remote dispatch and local append, concurrently; both always run
    /// 4. the updated collection is published to subscribers
    ///
    /// Only a failed local write fails the submission. A dispatch failure is
    /// carried in the report as an advisory.
    pub async fn submit(&self, form: ArtworkForm) -> Result<SubmissionReport, SubmitError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(SubmitError::Busy)?;

        validate(&form, config::current_year())?;

        let images = encode_all(&form.images).await?;

        let link = form
            .link
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty());
        let artwork = Artwork::new(
            form.title.trim().to_string(),
            form.description.trim().to_string(),
            form.year,
            images,
            link,
        );

        tracing::info!(
            id = %artwork.id,
            title = %artwork.title,
            images = artwork.images.len(),
            "submitting artwork"
        );

        let (remote, local) = tokio::join!(
            self.dispatcher.dispatch(&artwork),
            self.store.append(artwork.clone()),
        );

        match &remote {
            Ok(()) => tracing::info!(id = %artwork.id, "artwork dispatched to repository"),
            Err(e) if e.is_configuration() => {
                tracing::info!(reason = %e, "remote dispatch skipped, saving locally only")
            }
            Err(e) => tracing::warn!(error = %e, "remote dispatch failed, saving locally only"),
        }

        let collection = local.map_err(|e| {
            tracing::error!(error = %e, "local cache write failed");
            SubmitError::Persist(Arc::new(e))
        })?;

        let notified = self.store.publish(&collection);
        tracing::debug!(notified, total = collection.len(), "collection update published");

        Ok(SubmissionReport {
            artwork,
            collection,
            remote,
            notified,
        })
    }
}

/// Holds the in-flight flag for the duration of one submission
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
