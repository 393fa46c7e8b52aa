//! Filter expressions for odata-query
//!
//! This module provides the expression tree, a textual parser for it, and
//! the compiler that turns it into OData query text.

pub mod ast;
pub mod compiler;
pub mod context;
pub mod functions;
pub mod literal;
pub mod parser;

pub use ast::{Expression, FunctionCall, Operator};
pub use compiler::ExpressionCompiler;
pub use context::{ExpressionContext, ScopeCounter};
pub use functions::{FunctionMapping, FunctionMappings, MappedFunction, StandardFunctions};
pub use literal::{LiteralFormatter, ODataLiteralFormatter};
pub use parser::parse_expression;

use crate::errors::Result;

/// Parse a filter string and compile it in the given context
pub fn compile_text(compiler: &ExpressionCompiler<'_>, ctx: &ExpressionContext, text: &str) -> Result<String> {
    // Parse the expression
    let expr = parser::parse_expression(text)?;

    // Compile it
    compiler.compile(&expr, ctx)
}
