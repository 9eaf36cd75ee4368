//! Session layer: the ingest pass and its process-lifetime cache.

pub mod cache;
pub mod ingest;

pub use cache::{SessionCache, SessionEntry, SessionKey};
pub use ingest::{ingest, resolve_session, IngestParams};
