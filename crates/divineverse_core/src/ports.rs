//! crates/divineverse_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{ChatTurn, User, UserCredentials};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Upstream service is rate limited")]
    RateLimited,
    #[error("Missing configuration: {0}")]
    Configuration(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistent storage of user identity and chat history records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a new user record with an empty chat history.
    ///
    /// Returns `PortError::Conflict` when the email is already registered.
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User>;

    /// Looks up the stored credentials for an email address.
    ///
    /// Returns `PortError::NotFound` when no account matches.
    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    /// Appends chat turns to a user's history, preserving insertion order.
    ///
    /// Returns `PortError::NotFound` when the user record does not exist.
    async fn append_chat_turns(&self, user_id: Uuid, turns: &[ChatTurn]) -> PortResult<()>;
}

/// The external text-generation service that produces the assistant's raw reply.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Sends a fully-built prompt upstream and returns the raw reply text.
    ///
    /// Returns `PortError::RateLimited` when the upstream rejects the call
    /// with HTTP 429, and `PortError::Configuration` when the service is not
    /// configured with an API key.
    async fn generate(&self, prompt: &str) -> PortResult<String>;
}
