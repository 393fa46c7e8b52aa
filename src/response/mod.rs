//! Response model for odata-query
//!
//! Decoded payloads wrapped with their protocol annotations, and the
//! extraction helpers used to read entries, scalars and arrays out of them.

pub mod annotations;
pub mod feed;
pub mod odata_response;

pub use annotations::{EntryAnnotations, FeedAnnotations};
pub use feed::{AnnotatedEntry, AnnotatedFeed, ResponseNode};
pub use odata_response::ODataResponse;

/// Property name holding a value that has no name of its own
pub const RESULT_KEY: &str = "__result";

/// Property name under which annotations are injected into entry data
pub const ANNOTATIONS_KEY: &str = "__annotations";
