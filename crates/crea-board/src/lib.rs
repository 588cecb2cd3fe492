//! Crea Board - The campaign board
//!
//! This crate owns the session's committed assets and everything that reads
//! them: the observable asset store, card rendering, and paginated export.

mod card;
mod data_uri;
mod export;
mod layout;
mod pdf;
mod raster;
mod store;
mod types;

pub use card::{format_age, render_board, Card, CardBody};
pub use data_uri::{data_uri_from_base64, encode_data_uri, parse_data_uri, DataUri};
pub use export::{BoardExporter, ExportOutcome, ExportSettings, ExportedDocument};
pub use layout::{PageCursor, PageSetup, Placement};
pub use pdf::PdfWriter;
pub use raster::{BlockRasterizer, Rasterizer};
pub use store::{AssetStore, StoreEvent, SubscriptionId};
pub use types::{Asset, AssetDraft, AssetKind, AssetType, ModerationVerdict, PromptData};
