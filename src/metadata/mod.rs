//! Metadata for odata-query
//!
//! This module holds the schema graph loaded once per session and the
//! resolver that matches loosely specified names against it.

pub mod collection;
pub mod pluralizer;
pub mod resolver;
pub mod schema;

pub use collection::EntityCollection;
pub use pluralizer::{EnglishPluralizer, NameMatcher, Pluralizer};
pub use resolver::{MetadataResolver, Resolution};
pub use schema::{EntityTypeId, Multiplicity, Schema, SchemaDocument};
