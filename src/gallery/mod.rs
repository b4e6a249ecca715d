/// Gallery loading
///
/// This module handles:
/// - The load-time tiers: static asset, local cache, bundled default (probe.rs)
/// - Walking the tiers and the gallery view state machine (loader.rs)
pub mod loader;
pub mod probe;
