//! Expression compiler
//!
//! Turns an `Expression` tree into OData query text (`$filter` syntax, or
//! the terse `key=value&key=value` form of custom query options). Names are
//! resolved against the schema through a `MetadataResolver`, so loosely
//! written references come out with their exact schema spelling.

use log::{debug, trace, warn};

use crate::errors::{ODataError, Result};
use crate::metadata::{EntityCollection, MetadataResolver};
use crate::ql::ast::{Expression, FunctionCall, Operator};
use crate::ql::context::{ExpressionContext, ScopeCounter};
use crate::ql::functions::{FunctionMapping, FunctionMappings};
use crate::ql::literal::LiteralFormatter;
use crate::session::ProtocolVersion;
use crate::value::{TargetType, Value};

/// Compiles expression trees into protocol text.
///
/// One compiler is one compilation session: lambda scope qualifiers are
/// allocated from its own counter, so successive `Any`/`All` calls get
/// `x1`, `x2`, ... and wrap back to `x1` after `x9`.
pub struct ExpressionCompiler<'a> {
    resolver: MetadataResolver<'a>,
    functions: &'a dyn FunctionMappings,
    literals: &'a dyn LiteralFormatter,
    version: ProtocolVersion,
    qualifiers: ScopeCounter,
}

impl<'a> ExpressionCompiler<'a> {
    pub fn new(
        resolver: MetadataResolver<'a>,
        functions: &'a dyn FunctionMappings,
        literals: &'a dyn LiteralFormatter,
        version: ProtocolVersion,
    ) -> Self {
        ExpressionCompiler {
            resolver,
            functions,
            literals,
            version,
            qualifiers: ScopeCounter::new(),
        }
    }

    pub fn resolver(&self) -> &MetadataResolver<'a> {
        &self.resolver
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Number of lambda qualifiers handed out so far
    pub fn qualifiers_allocated(&self) -> usize {
        self.qualifiers.allocated()
    }

    /// Compile `expr` in `ctx`
    pub fn compile(&self, expr: &Expression, ctx: &ExpressionContext) -> Result<String> {
        let text = self.format(expr, ctx)?;
        debug!("Compiled expression: {}", text);
        Ok(text)
    }

    fn format(&self, expr: &Expression, ctx: &ExpressionContext) -> Result<String> {
        if ctx.is_query_option {
            if let Some(op) = expr.operator() {
                if op != Operator::And && op != Operator::Eq {
                    return Err(ODataError::InvalidOperation(format!(
                        "Operator {} is not allowed in custom query options",
                        op.keyword()
                    )));
                }
            }
        }

        match expr {
            Expression::Conversion { target, operand } => self.format_conversion(*target, operand, ctx),
            Expression::Unary { op, operand } => self.format_unary(*op, operand, ctx),
            Expression::Binary { op, left, right } => self.format_binary(*op, left, right, ctx),
            Expression::Reference(path) => self.format_reference(path, ctx),
            Expression::Function(call) => self.format_function(call, ctx),
            Expression::Value(value) => self.format_value(value),
            Expression::TypeName(name) => {
                let qualified = self.resolver.qualified_type_name(name);
                Ok(self.literals.format_type_name(&qualified))
            }
        }
    }

    // ---- operators ----

    fn format_conversion(
        &self,
        target: TargetType,
        operand: &Expression,
        ctx: &ExpressionContext,
    ) -> Result<String> {
        match operand {
            Expression::Value(value) if !value.is_enum() => {
                let converted = value.convert_to(target).unwrap_or_else(|| {
                    warn!("Cannot convert {} to {}, keeping the original value", value, target.name());
                    value.clone()
                });
                self.format_value(&converted)
            }
            other => self.format(other, ctx),
        }
    }

    fn format_unary(&self, op: Operator, operand: &Expression, ctx: &ExpressionContext) -> Result<String> {
        let text = self.format(operand, ctx)?;
        if binds_looser(operand, op) {
            Ok(format!("{} ({})", op.keyword(), text))
        } else {
            Ok(format!("{} {}", op.keyword(), text))
        }
    }

    fn format_binary(
        &self,
        op: Operator,
        left: &Expression,
        right: &Expression,
        ctx: &ExpressionContext,
    ) -> Result<String> {
        let left_text = self.format(left, ctx)?;
        let right_text = self.format(right, ctx)?;

        if ctx.is_query_option {
            let separator = if op == Operator::And { "&" } else { "=" };
            return Ok(format!("{}{}{}", left_text, separator, right_text));
        }

        Ok(format!(
            "{} {} {}",
            group(left, op, left_text),
            op.keyword(),
            group(right, op, right_text)
        ))
    }

    // ---- references ----

    fn format_reference(&self, path: &str, ctx: &ExpressionContext) -> Result<String> {
        let segments = path.split(|c: char| c == '.' || c == '/').filter(|s| !s.is_empty());

        let mut collection = ctx.entity_collection.clone();
        let mut parts: Vec<String> = Vec::new();
        let mut wrapped = false;
        let mut verbatim = false;

        for segment in segments {
            // Past an unknown unscoped segment the rest is copied as written
            if verbatim {
                parts.push(segment.to_string());
                continue;
            }

            let zero_arity = self.functions.try_get_mapping(segment, 0, self.version);

            let Some(current) = collection.take() else {
                if !self.functions.contains_function(segment, 0) {
                    parts.push(segment.to_string());
                    verbatim = true;
                    continue;
                }
                let mapping = zero_arity.ok_or_else(|| ODataError::NotSupported {
                    function: segment.to_string(),
                    arity: 0,
                })?;
                parts = vec![self.apply_to_path(mapping, segment, &parts, wrapped, ctx)];
                wrapped = true;
                continue;
            };

            let type_path = current.path();
            if self.resolver.has_structural_property(&type_path, segment) {
                parts.push(self.resolver.structural_property_exact_name(&type_path, segment)?);
            } else if self.resolver.has_navigation_property(&type_path, segment) {
                parts.push(self.resolver.navigation_property_exact_name(&type_path, segment)?);
                collection = Some(self.resolver.navigation_target_collection(&type_path, segment)?);
            } else if let Some(mapping) = zero_arity {
                parts = vec![self.apply_to_path(mapping, segment, &parts, wrapped, ctx)];
                wrapped = true;
            } else if self.resolver.is_open_type(&type_path) {
                trace!("Open type {} keeps dynamic property {}", type_path, segment);
                parts.push(segment.to_string());
            } else {
                return Err(ODataError::unresolvable(
                    segment,
                    format!("{} is not a property of {}", segment, type_path),
                ));
            }
        }

        let joined = parts.join("/");
        if wrapped {
            Ok(joined)
        } else {
            Ok(ctx.scoped(&joined))
        }
    }

    /// Apply a zero-arity function to the path accumulated so far
    fn apply_to_path(
        &self,
        mapping: FunctionMapping,
        segment: &str,
        parts: &[String],
        wrapped: bool,
        ctx: &ExpressionContext,
    ) -> String {
        let subject = if parts.is_empty() {
            String::new()
        } else if wrapped {
            parts.join("/")
        } else {
            ctx.scoped(&parts.join("/"))
        };
        trace!("Reference segment {} maps to {}({})", segment, mapping.target(), subject);
        format!("{}({})", mapping.target(), subject)
    }

    // ---- functions ----

    fn format_function(&self, call: &FunctionCall, ctx: &ExpressionContext) -> Result<String> {
        let arity = call.arguments.len();

        if let Some(mapping) = self.functions.try_get_mapping(&call.name, arity, self.version) {
            let mapped = mapping.rewrite(&call.name, call.caller.as_deref(), &call.arguments);
            let arguments = mapped
                .arguments
                .iter()
                .map(|arg| self.format(arg, ctx))
                .collect::<Result<Vec<_>>>()?;
            return Ok(format!("{}({})", mapped.name, arguments.join(",")));
        }

        match (call.name.to_ascii_lowercase().as_str(), arity) {
            ("any" | "all", 0 | 1) => self.format_lambda(call, ctx),
            ("isof" | "cast", 1 | 2) => self.format_type_check(call),
            ("get_item", 1) => self.format_indexer(call, ctx),
            ("tostring", 0) if call.caller.is_some() => self.caller_reference(call, ctx),
            _ => Err(ODataError::NotSupported {
                function: call.name.clone(),
                arity,
            }),
        }
    }

    fn format_lambda(&self, call: &FunctionCall, ctx: &ExpressionContext) -> Result<String> {
        let navigation = match call.caller.as_deref() {
            Some(Expression::Reference(path)) => path,
            _ => {
                return Err(ODataError::InvalidOperation(format!(
                    "{} must be applied to a navigation property",
                    call.name
                )))
            }
        };
        let root = ctx.entity_collection.clone().ok_or_else(|| {
            ODataError::InvalidOperation(format!(
                "{} on {} requires an entity collection in scope",
                call.name, navigation
            ))
        })?;

        let (path, target) = self.navigate_to_collection(root, navigation)?;
        let operator = call.name.to_ascii_lowercase();

        let text = match call.arguments.first() {
            None => format!("{}/{}()", path, operator),
            Some(body) => {
                let qualifier = self.qualifiers.allocate();
                let scope = ctx.lambda(target, qualifier.clone());
                let body = self.format(body, &scope)?;
                format!("{}/{}({}:{})", path, operator, qualifier, body)
            }
        };

        Ok(ctx.scoped(&text))
    }

    /// Follow a navigation path, returning its exact spelling and the
    /// collection it ends in
    fn navigate_to_collection(
        &self,
        root: EntityCollection,
        navigation: &str,
    ) -> Result<(String, EntityCollection)> {
        let mut collection = root;
        let mut names = Vec::new();

        for segment in navigation.split(|c: char| c == '.' || c == '/').filter(|s| !s.is_empty()) {
            let type_path = collection.path();
            names.push(self.resolver.navigation_property_exact_name(&type_path, segment)?);
            collection = self.resolver.navigation_target_collection(&type_path, segment)?;
        }

        if names.is_empty() {
            return Err(ODataError::unresolvable(navigation, "Empty navigation path"));
        }
        Ok((names.join("/"), collection))
    }

    /// `isof(T)`, `isof(expr,T)`, `cast(...)`.
    ///
    /// Arguments are compiled outside of any collection scope.
    fn format_type_check(&self, call: &FunctionCall) -> Result<String> {
        let fresh = ExpressionContext::new();
        let mut operands: Vec<&Expression> = Vec::with_capacity(2);
        if call.arguments.len() == 1 {
            if let Some(caller) = call.caller.as_deref() {
                operands.push(caller);
            }
        }
        operands.extend(call.arguments.iter());

        let mut formatted = Vec::with_capacity(2);
        if operands.len() == 2 && !operands[0].is_null() {
            formatted.push(self.format(operands[0], &fresh)?);
        }
        if let Some(last) = operands.last() {
            formatted.push(self.format(last, &fresh)?);
        }

        Ok(format!("{}({})", call.name.to_ascii_lowercase(), formatted.join(",")))
    }

    /// `container['key']` on a dynamic-properties container
    fn format_indexer(&self, call: &FunctionCall, ctx: &ExpressionContext) -> Result<String> {
        let key = match call.arguments.first() {
            Some(arg) => self.format(arg, &ExpressionContext::new())?,
            None => return Err(ODataError::NotSupported { function: call.name.clone(), arity: 0 }),
        };
        let key = key.trim_matches('\'').to_string();

        let container = self.caller_reference(call, ctx)?;
        match ctx.dynamic_properties_container.as_deref() {
            Some(name) if name == container => Ok(key),
            _ => Ok(format!("{}.{}", container, key)),
        }
    }

    /// The caller as written: raw text for references, compiled otherwise
    fn caller_reference(&self, call: &FunctionCall, ctx: &ExpressionContext) -> Result<String> {
        match call.caller.as_deref() {
            Some(Expression::Reference(path)) => Ok(path.clone()),
            Some(other) => self.format(other, ctx),
            None => Err(ODataError::NotSupported {
                function: call.name.clone(),
                arity: call.arguments.len(),
            }),
        }
    }

    // ---- values ----

    fn format_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Enum { type_name, member } => {
                let qualified = Value::Enum {
                    type_name: self.resolver.qualified_type_name(type_name),
                    member: member.clone(),
                };
                self.literals.format_literal(&qualified, false)
            }
            other => self.literals.format_literal(other, false),
        }
    }
}

/// Whether `operand`'s top operator binds more loosely than `op`
fn binds_looser(operand: &Expression, op: Operator) -> bool {
    operand
        .operator()
        .map(|inner| inner.precedence() > op.precedence())
        .unwrap_or(false)
}

fn group(operand: &Expression, op: Operator, text: String) -> String {
    if binds_looser(operand, op) {
        format!("({})", text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EnglishPluralizer, NameMatcher, Schema};
    use crate::ql::functions::StandardFunctions;
    use crate::ql::literal::ODataLiteralFormatter;
    use crate::testing::northwind;

    static PLURALIZER: EnglishPluralizer = EnglishPluralizer;
    static FUNCTIONS: StandardFunctions = StandardFunctions;
    static V3_LITERALS: ODataLiteralFormatter = ODataLiteralFormatter::new(ProtocolVersion::V3);
    static V4_LITERALS: ODataLiteralFormatter = ODataLiteralFormatter::new(ProtocolVersion::V4);

    fn compiler(schema: &Schema, version: ProtocolVersion) -> ExpressionCompiler<'_> {
        let resolver = MetadataResolver::new(schema, NameMatcher::new(Some(&PLURALIZER), true));
        let literals: &dyn LiteralFormatter = match version {
            ProtocolVersion::V3 => &V3_LITERALS,
            ProtocolVersion::V4 => &V4_LITERALS,
        };
        ExpressionCompiler::new(resolver, &FUNCTIONS, literals, version)
    }

    fn scope(compiler: &ExpressionCompiler<'_>, set: &str) -> ExpressionContext {
        let collection = compiler.resolver().concrete_entity_collection(set).unwrap();
        ExpressionContext::for_collection(collection)
    }

    fn r(path: &str) -> Expression {
        Expression::reference(path)
    }

    #[test]
    fn test_groups_looser_operands_only() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = ExpressionContext::new();

        let grouped = (r("Price") + r("Tax")) * r("Qty");
        assert_eq!(c.compile(&grouped, &ctx).unwrap(), "(Price add Tax) mul Qty");

        let flat = r("Price") * r("Tax") + r("Qty");
        assert_eq!(c.compile(&flat, &ctx).unwrap(), "Price mul Tax add Qty");

        let right = r("A") - (r("B") - r("C"));
        assert_eq!(c.compile(&right, &ctx).unwrap(), "A sub B sub C");

        let logical = (r("A").equals(Expression::value(1)) | r("B").equals(Expression::value(2)))
            & r("C").greater_than(Expression::value(3));
        assert_eq!(
            c.compile(&logical, &ctx).unwrap(),
            "(A eq 1 or B eq 2) and C gt 3"
        );
    }

    #[test]
    fn test_unary_operators() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = ExpressionContext::new();

        assert_eq!(c.compile(&!r("Discontinued"), &ctx).unwrap(), "not Discontinued");
        assert_eq!(
            c.compile(&!r("A").equals(r("B")), &ctx).unwrap(),
            "not (A eq B)"
        );
        assert_eq!(c.compile(&-r("Price"), &ctx).unwrap(), "- Price");
    }

    #[test]
    fn test_query_option_mode() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = ExpressionContext::query_option();

        let expr = r("A").equals(r("B")) & r("C").equals(r("D"));
        assert_eq!(c.compile(&expr, &ctx).unwrap(), "A=B&C=D");

        let or = r("A").equals(r("B")) | r("C").equals(r("D"));
        assert!(matches!(c.compile(&or, &ctx), Err(ODataError::InvalidOperation(_))));

        let nested = r("A").equals(r("B")) & r("C").greater_than(r("D"));
        assert!(matches!(c.compile(&nested, &ctx), Err(ODataError::InvalidOperation(_))));
    }

    #[test]
    fn test_references_take_exact_names() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "products");

        assert_eq!(c.compile(&r("productname"), &ctx).unwrap(), "ProductName");
        assert_eq!(c.compile(&r("category.categoryname"), &ctx).unwrap(), "Category/CategoryName");
        assert_eq!(c.compile(&r("ProductName.Length"), &ctx).unwrap(), "length(ProductName)");

        let err = c.compile(&r("Bogus"), &ctx).unwrap_err();
        assert!(matches!(err, ODataError::UnresolvableObject { .. }));
    }

    #[test]
    fn test_unscoped_references() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = ExpressionContext::new();

        assert_eq!(c.compile(&r("ProductName.Length"), &ctx).unwrap(), "ProductName/Length");
        assert_eq!(c.compile(&r("Address.City.Length"), &ctx).unwrap(), "Address/City/Length");
        assert_eq!(c.compile(&r("Now"), &ctx).unwrap(), "now()");

        let v3 = compiler(&schema, ProtocolVersion::V3);
        assert!(matches!(
            v3.compile(&r("Now"), &ctx),
            Err(ODataError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_conversion_keeps_operand_grouping() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Products");

        let expr = (r("UnitPrice") + r("UnitsInStock")).convert(TargetType::Int32) * Expression::value(2);
        assert_eq!(
            c.compile(&expr, &ctx).unwrap(),
            "(UnitPrice add UnitsInStock) mul 2"
        );

        let parsed = crate::ql::parse_expression("(UnitPrice add UnitsInStock) as Int32 mul 2").unwrap();
        assert_eq!(
            c.compile(&parsed, &ctx).unwrap(),
            "(UnitPrice add UnitsInStock) mul 2"
        );

        let negated = !(r("Discontinued").equals(Expression::value(true))).convert(TargetType::Boolean);
        assert_eq!(c.compile(&negated, &ctx).unwrap(), "not (Discontinued eq true)");
    }

    #[test]
    fn test_any_over_multi_segment_navigation() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Products");

        let expr = r("category.products").any(r("Discontinued"));
        assert_eq!(
            c.compile(&expr, &ctx).unwrap(),
            "Category/Products/any(x1:x1/Discontinued)"
        );

        let broken = r("category.bogus").any(r("Discontinued"));
        assert!(matches!(
            c.compile(&broken, &ctx),
            Err(ODataError::UnresolvableObject { .. })
        ));
    }

    #[test]
    fn test_open_and_derived_types() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);

        let events = scope(&c, "Events");
        assert_eq!(c.compile(&r("Venue"), &events).unwrap(), "Venue");
        assert_eq!(c.compile(&r("title"), &events).unwrap(), "Title");

        let employees = scope(&c, "People/Employee");
        assert_eq!(c.compile(&r("salary"), &employees).unwrap(), "Salary");
        assert_eq!(c.compile(&r("name"), &employees).unwrap(), "Name");
    }

    #[test]
    fn test_mapped_functions_per_version() {
        let schema = northwind();
        let expr = r("ProductName").method("Contains", vec![Expression::value("ab")]);

        let v4 = compiler(&schema, ProtocolVersion::V4);
        assert_eq!(
            v4.compile(&expr, &scope(&v4, "Products")).unwrap(),
            "contains(ProductName,'ab')"
        );

        let v3 = compiler(&schema, ProtocolVersion::V3);
        assert_eq!(
            v3.compile(&expr, &scope(&v3, "Products")).unwrap(),
            "substringof('ab',ProductName)"
        );
    }

    #[test]
    fn test_any_allocates_scope_qualifiers() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Orders");

        let expr = r("OrderDetails").any(r("Quantity").greater_than(Expression::value(5)));
        assert_eq!(
            c.compile(&expr, &ctx).unwrap(),
            "Order_Details/any(x1:x1/Quantity gt 5)"
        );
        assert_eq!(
            c.compile(&expr, &ctx).unwrap(),
            "Order_Details/any(x2:x2/Quantity gt 5)"
        );
        assert_eq!(c.qualifiers_allocated(), 2);
    }

    #[test]
    fn test_qualifiers_wrap_after_nine() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Categories");
        let expr = r("Products").all(r("Discontinued"));

        let outputs: Vec<String> = (0..10).map(|_| c.compile(&expr, &ctx).unwrap()).collect();
        assert_eq!(outputs[0], "Products/all(x1:x1/Discontinued)");
        assert_eq!(outputs[8], "Products/all(x9:x9/Discontinued)");
        assert_eq!(outputs[9], "Products/all(x1:x1/Discontinued)");
    }

    #[test]
    fn test_nested_lambdas() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Customers");

        let inner = r("Order_Details").any(r("Quantity").greater_than(Expression::value(5)));
        let expr = r("Orders").any(inner);
        assert_eq!(
            c.compile(&expr, &ctx).unwrap(),
            "Orders/any(x1:x1/Order_Details/any(x2:x2/Quantity gt 5))"
        );

        let functions = r("Products").any(
            r("ProductName.Length").greater_than(Expression::value(3))
                & r("ProductName").method("StartsWith", vec![Expression::value("C")]),
        );
        let categories = scope(&c, "Categories");
        assert_eq!(
            c.compile(&functions, &categories).unwrap(),
            "Products/any(x3:length(x3/ProductName) gt 3 and startswith(x3/ProductName,'C'))"
        );
    }

    #[test]
    fn test_any_without_body() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Orders");

        let expr = r("Order_Details").method("Any", vec![]);
        assert_eq!(c.compile(&expr, &ctx).unwrap(), "Order_Details/any()");
        assert_eq!(c.qualifiers_allocated(), 0);
    }

    #[test]
    fn test_type_checks() {
        let schema = northwind();
        let v4 = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&v4, "People");

        let isof = Expression::call("IsOf", vec![Expression::type_name("Employee")]);
        assert_eq!(v4.compile(&isof, &ctx).unwrap(), "isof(NorthwindModel.Employee)");

        let null_first = Expression::call("IsOf", vec![Expression::null(), Expression::type_name("Employee")]);
        assert_eq!(v4.compile(&null_first, &ctx).unwrap(), "isof(NorthwindModel.Employee)");

        let cast = Expression::call("Cast", vec![r("Boss"), Expression::type_name("Manager")]);
        assert_eq!(v4.compile(&cast, &ctx).unwrap(), "cast(Boss,NorthwindModel.Manager)");

        let v3 = compiler(&schema, ProtocolVersion::V3);
        assert_eq!(v3.compile(&isof, &ctx).unwrap(), "isof('NorthwindModel.Employee')");
    }

    #[test]
    fn test_indexer_and_to_string() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Events").with_dynamic_container("Extras");

        let dynamic = r("Extras").method("get_Item", vec![Expression::value("Color")]);
        assert_eq!(c.compile(&dynamic, &ctx).unwrap(), "Color");

        let other = r("Tags").method("get_Item", vec![Expression::value("Main")]);
        assert_eq!(c.compile(&other, &ctx).unwrap(), "Tags.Main");

        let to_string = r("EventID").method("ToString", vec![]);
        assert_eq!(c.compile(&to_string, &ctx).unwrap(), "EventID");
    }

    #[test]
    fn test_unknown_function_is_not_supported() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let expr = r("Name").method("Frobnicate", vec![Expression::value(1)]);

        match c.compile(&expr, &ExpressionContext::new()) {
            Err(ODataError::NotSupported { function, arity }) => {
                assert_eq!(function, "Frobnicate");
                assert_eq!(arity, 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        let wrong_arity = r("Name").method("Length", vec![Expression::value(1)]);
        assert!(matches!(
            c.compile(&wrong_arity, &ExpressionContext::new()),
            Err(ODataError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_conversions_coerce_values() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V4);
        let ctx = scope(&c, "Products");

        let expr = r("UnitsInStock").equals(Expression::value("5").convert(TargetType::Int32));
        assert_eq!(c.compile(&expr, &ctx).unwrap(), "UnitsInStock eq 5");

        let kept = Expression::value("five").convert(TargetType::Int32);
        assert_eq!(c.compile(&kept, &ctx).unwrap(), "'five'");

        let color = Expression::value(Value::Enum {
            type_name: "Color".to_string(),
            member: "Red".to_string(),
        })
        .convert(TargetType::Int32);
        assert_eq!(c.compile(&color, &ctx).unwrap(), "NorthwindModel.Color'Red'");

        let reference = r("unitprice").convert(TargetType::Double);
        assert_eq!(c.compile(&reference, &ctx).unwrap(), "UnitPrice");
    }

    #[test]
    fn test_values_use_literal_formatter() {
        let schema = northwind();
        let c = compiler(&schema, ProtocolVersion::V3);
        let ctx = scope(&c, "Customers");

        let expr = r("CompanyName").equals(Expression::value("O'Hara"));
        assert_eq!(c.compile(&expr, &ctx).unwrap(), "CompanyName eq 'O''Hara'");
        assert_eq!(c.compile(&Expression::null(), &ctx).unwrap(), "null");
    }
}
