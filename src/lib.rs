//! odata-query: the query-building core of an OData client
//!
//! This crate resolves loosely written names against an OData schema,
//! compiles filter expressions into protocol query text, and wraps decoded
//! responses for uniform extraction of entries, scalars and arrays.

pub mod errors;
pub mod metadata;
pub mod ql;
pub mod response;
pub mod session;
pub mod value;

#[cfg(test)]
mod testing;

// Ré-exporter les types principaux pour faciliter l'utilisation
pub use errors::{ODataError, Result};
pub use metadata::{EntityCollection, MetadataResolver, Resolution, Schema};
pub use ql::{parse_expression, Expression, ExpressionCompiler, ExpressionContext};
pub use response::{AnnotatedEntry, AnnotatedFeed, ODataResponse, ResponseNode};
pub use session::{ProtocolVersion, Session, Settings};
pub use value::{FromValue, Properties, TargetType, Value};
