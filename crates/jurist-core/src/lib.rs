//! # jurist-core
//!
//! Core types shared across the Jurist crates:
//! - `Identity` and the profile payloads written to the profile store
//! - `Role` and `SessionStatus` enums (the latter with its transition table)
//! - `SessionSnapshot`, the value every consumer reads
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod identity;
pub mod session;

pub use enums::{Role, SessionStatus};
pub use errors::CoreError;
pub use identity::{Identity, NewProfile, ProfileUpdate};
pub use session::SessionSnapshot;
