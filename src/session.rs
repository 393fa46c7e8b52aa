//! Session settings and convenience entry points
//!
//! A `Session` owns the schema together with the policies every lookup and
//! compilation needs (protocol version, pluralization, case sensitivity).

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{ODataError, Result};
use crate::metadata::{EnglishPluralizer, MetadataResolver, NameMatcher, Pluralizer, Schema};
use crate::ql::{
    parse_expression, Expression, ExpressionCompiler, ExpressionContext, ODataLiteralFormatter,
    StandardFunctions,
};

/// OData protocol version spoken by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    V3,
    #[default]
    V4,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V3 => write!(f, "V3"),
            ProtocolVersion::V4 => write!(f, "V4"),
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = ODataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().trim_start_matches('v') {
            "3" | "3.0" => Ok(ProtocolVersion::V3),
            "4" | "4.0" => Ok(ProtocolVersion::V4),
            _ => Err(ODataError::Syntax(format!("Unknown protocol version: {}", s))),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub protocol_version: ProtocolVersion,
    /// Accept singular/plural variants of names
    pub pluralize: bool,
    pub ignore_case: bool,
    /// Name of the property holding dynamic properties of open types
    pub dynamic_properties_container: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            protocol_version: ProtocolVersion::V4,
            pluralize: true,
            ignore_case: true,
            dynamic_properties_container: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Settings::from_json(&text)
    }
}

/// Schema plus the services compiled queries are built with
pub struct Session {
    schema: Schema,
    settings: Settings,
    pluralizer: Box<dyn Pluralizer>,
    functions: StandardFunctions,
    literals: ODataLiteralFormatter,
}

impl Session {
    pub fn new(schema: Schema, settings: Settings) -> Self {
        Session::with_pluralizer(schema, settings, Box::new(EnglishPluralizer::new()))
    }

    pub fn with_pluralizer(schema: Schema, settings: Settings, pluralizer: Box<dyn Pluralizer>) -> Self {
        let literals = ODataLiteralFormatter::new(settings.protocol_version);
        Session {
            schema,
            settings,
            pluralizer,
            functions: StandardFunctions::new(),
            literals,
        }
    }

    /// Load the schema from a JSON file
    pub fn open<P: AsRef<Path>>(schema_path: P, settings: Settings) -> Result<Self> {
        let schema = Schema::from_file(schema_path)?;
        Ok(Session::new(schema, settings))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolver(&self) -> MetadataResolver<'_> {
        let pluralizer = if self.settings.pluralize {
            Some(self.pluralizer.as_ref())
        } else {
            None
        };
        MetadataResolver::new(&self.schema, NameMatcher::new(pluralizer, self.settings.ignore_case))
    }

    /// A fresh compiler; its lambda qualifiers start at `x1`
    pub fn compiler(&self) -> ExpressionCompiler<'_> {
        ExpressionCompiler::new(
            self.resolver(),
            &self.functions,
            &self.literals,
            self.settings.protocol_version,
        )
    }

    /// Compilation context for an entity set path (`Products`, `People/Employee`)
    pub fn context_for(&self, entity_set: &str) -> Result<ExpressionContext> {
        let collection = self.resolver().concrete_entity_collection(entity_set)?;
        let ctx = ExpressionContext::for_collection(collection);
        Ok(match &self.settings.dynamic_properties_container {
            Some(name) => ctx.with_dynamic_container(name.as_str()),
            None => ctx,
        })
    }

    /// Compile an expression tree as a `$filter` on `entity_set`
    pub fn compile_expression(&self, entity_set: &str, expr: &Expression) -> Result<String> {
        let ctx = self.context_for(entity_set)?;
        self.compiler().compile(expr, &ctx)
    }

    /// Parse and compile a textual filter on `entity_set`
    pub fn compile_filter(&self, entity_set: &str, text: &str) -> Result<String> {
        debug!("Compiling filter on {}: {}", entity_set, text);
        let expr = parse_expression(text)?;
        self.compile_expression(entity_set, &expr)
    }

    /// Parse and compile custom query options (`A == 1 && B == 2`)
    pub fn compile_query_option(&self, text: &str) -> Result<String> {
        debug!("Compiling query option: {}", text);
        let expr = parse_expression(text)?;
        self.compiler().compile(&expr, &ExpressionContext::query_option())
    }
}
