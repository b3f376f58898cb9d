//! Seams between the pipeline and the outside world.
//!
//! The pipeline only talks to the network, the rewrite model and the
//! document store through these traits, so each can be swapped for an
//! in-memory double in tests.

pub mod rewrite;
pub mod store;
pub mod web;

pub use rewrite::RewriteBackend;
pub use store::RecordStore;
pub use web::WebClient;
