//! Shared primitives: retry/backoff and text helpers.

pub mod retry;
pub mod text;

pub use retry::{with_retry, RetryPolicy};
pub use text::{clean_text, extract_slug, non_empty, slugify, split_list, title_from_slug};
