//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (per-user storage, etc.).

mod storage;

pub use storage::UserStore;
