//! Crea Core - Foundational types for the Crea content studio
//!
//! This crate provides the types that all other Crea crates depend on:
//! - `AssetId` - Unique campaign asset identifiers
//! - `Notice` - User-facing confirmations and failure reports
//! - Error types and Result alias

mod error;
mod id;
mod notice;

pub use error::{CreaError, FieldError, Result};
pub use id::AssetId;
pub use notice::{Notice, NoticeLevel};
