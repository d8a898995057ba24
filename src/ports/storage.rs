//! Storage port: Trait for the per-user key-value document store.
//!
//! This trait abstracts the persistence backend from the application logic.
//! Values are opaque serialized JSON documents; the engine is agnostic to
//! key naming beyond the conventions in `application`.

/// Trait for per-user scoped document storage.
///
/// Calls are synchronous: when an operation returns `Ok`, the write has
/// completed. The engine never retries internally; persistence failures
/// surface to the caller as-is.
pub trait UserStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the document stored under `key` for `user_id`.
    ///
    /// # Returns
    /// `None` if no document is stored.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn get(&self, key: &str, user_id: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key` for `user_id`, replacing any previous
    /// document.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn set(&self, key: &str, value: &str, user_id: &str) -> Result<(), Self::Error>;

    /// Delete the document under `key` for `user_id`. Deleting a missing
    /// document is not an error.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn delete(&self, key: &str, user_id: &str) -> Result<(), Self::Error>;
}
