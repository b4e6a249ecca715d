/// Artwork submission
///
/// This module handles:
/// - Form validation (validation.rs)
/// - Image to data URI encoding (encode.rs)
/// - Repository dispatch to the remote tier (dispatch.rs)
/// - The submission flow across all tiers (coordinator.rs)
pub mod coordinator;
pub mod dispatch;
pub mod encode;
pub mod validation;
