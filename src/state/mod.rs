/// State management module
///
/// This module handles all persistent and shared application state:
/// - The artwork data model (data.rs)
/// - The local cache tier and its notification channel (store.rs)
/// - Per-card image navigation (navigation.rs)
pub mod data;
pub mod navigation;
pub mod store;
