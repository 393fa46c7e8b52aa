//! Parser for filter expressions
//!
//! This module parses textual filters such as
//! `ProductName.Contains('ab') && UnitPrice gt 10` into an `Expression`.

use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use uuid::Uuid;

use crate::errors::{ODataError, Result};
use crate::ql::ast::{Expression, Operator};
use crate::value::{parse_datetime, TargetType, Value};

#[derive(Parser)]
#[grammar = "ql/grammar.pest"]
pub struct FilterParser;

/// Parse a filter expression
pub fn parse_expression(input: &str) -> Result<Expression> {
    let mut pairs = FilterParser::parse(Rule::main, input)
        .map_err(|e| ODataError::Syntax(format!("Parse error: {}", e)))?;

    let main = next_pair(&mut pairs, "expression")?;
    let expr = next_pair(&mut main.into_inner(), "expression")?;
    parse_expr(expr.into_inner(), &pratt_parser())
}

fn pratt_parser() -> PrattParser<Rule> {
    // Lowest precedence first
    PrattParser::new()
        .op(Op::infix(Rule::or_op, Assoc::Left))
        .op(Op::infix(Rule::and_op, Assoc::Left))
        .op(Op::infix(Rule::eq_op, Assoc::Left) | Op::infix(Rule::ne_op, Assoc::Left))
        .op(Op::infix(Rule::gt_op, Assoc::Left)
            | Op::infix(Rule::ge_op, Assoc::Left)
            | Op::infix(Rule::lt_op, Assoc::Left)
            | Op::infix(Rule::le_op, Assoc::Left))
        .op(Op::infix(Rule::add_op, Assoc::Left) | Op::infix(Rule::sub_op, Assoc::Left))
        .op(Op::infix(Rule::mul_op, Assoc::Left)
            | Op::infix(Rule::div_op, Assoc::Left)
            | Op::infix(Rule::mod_op, Assoc::Left))
        .op(Op::prefix(Rule::not_op) | Op::prefix(Rule::neg_op))
        .op(Op::postfix(Rule::conversion))
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, what: &str) -> Result<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| ODataError::Syntax(format!("Missing {}", what)))
}

fn parse_expr(pairs: Pairs<Rule>, pratt: &PrattParser<Rule>) -> Result<Expression> {
    pratt
        .map_primary(|primary| parse_primary(primary, pratt))
        .map_prefix(|op, operand| {
            let operand = operand?;
            match op.as_rule() {
                Rule::not_op => Ok(!operand),
                // Negative numeric literals stay literals
                Rule::neg_op => Ok(match operand {
                    Expression::Value(Value::Integer(i)) => Expression::value(-i),
                    Expression::Value(Value::Float(f)) => Expression::value(-f),
                    other => -other,
                }),
                rule => Err(ODataError::Syntax(format!("Unexpected prefix operator: {:?}", rule))),
            }
        })
        .map_postfix(|operand, op| {
            let operand = operand?;
            let mut inner = op.into_inner();
            let target = inner
                .find(|p| p.as_rule() == Rule::qualified_name)
                .ok_or_else(|| ODataError::Syntax("Missing conversion type".to_string()))?;
            Ok(operand.convert(TargetType::from_str(target.as_str())?))
        })
        .map_infix(|left, op, right| {
            let op = match op.as_rule() {
                Rule::or_op => Operator::Or,
                Rule::and_op => Operator::And,
                Rule::eq_op => Operator::Eq,
                Rule::ne_op => Operator::Ne,
                Rule::gt_op => Operator::Gt,
                Rule::ge_op => Operator::Ge,
                Rule::lt_op => Operator::Lt,
                Rule::le_op => Operator::Le,
                Rule::add_op => Operator::Add,
                Rule::sub_op => Operator::Sub,
                Rule::mul_op => Operator::Mul,
                Rule::div_op => Operator::Div,
                Rule::mod_op => Operator::Mod,
                rule => {
                    return Err(ODataError::Syntax(format!("Unexpected operator: {:?}", rule)))
                }
            };
            Ok(Expression::binary(op, left?, right?))
        })
        .parse(pairs)
}

fn parse_primary(pair: Pair<Rule>, pratt: &PrattParser<Rule>) -> Result<Expression> {
    match pair.as_rule() {
        Rule::expr => parse_expr(pair.into_inner(), pratt),
        Rule::path => Ok(Expression::reference(pair.as_str())),
        Rule::call => {
            let mut inner = pair.into_inner();
            let path = next_pair(&mut inner, "function name")?.as_str();
            let arguments = parse_arguments(next_pair(&mut inner, "arguments")?, pratt)?;

            let (caller, name) = match path.rfind(|c: char| c == '.' || c == '/') {
                Some(at) => (Some(&path[..at]), &path[at + 1..]),
                None => (None, path),
            };
            let arguments = type_arguments(name, arguments);
            let mut expr = match caller {
                Some(caller) => Expression::reference(caller).method(name, arguments),
                None => Expression::call(name, arguments),
            };

            // Chained calls: Name.Trim().Length()
            for method in inner {
                let mut parts = method.into_inner();
                let name = next_pair(&mut parts, "method name")?.as_str();
                let arguments = parse_arguments(next_pair(&mut parts, "arguments")?, pratt)?;
                expr = expr.method(name, type_arguments(name, arguments));
            }
            Ok(expr)
        }
        Rule::index => {
            let mut inner = pair.into_inner();
            let container = next_pair(&mut inner, "indexed path")?.as_str();
            let key = parse_expr(next_pair(&mut inner, "index")?.into_inner(), pratt)?;
            Ok(Expression::reference(container).method("get_Item", vec![key]))
        }
        _ => parse_literal(pair),
    }
}

fn parse_arguments(pair: Pair<Rule>, pratt: &PrattParser<Rule>) -> Result<Vec<Expression>> {
    pair.into_inner()
        .map(|arg| parse_expr(arg.into_inner(), pratt))
        .collect()
}

/// The type operand of `isof`/`cast` is a type name, not a property
fn type_arguments(name: &str, mut arguments: Vec<Expression>) -> Vec<Expression> {
    let is_type_check = name.eq_ignore_ascii_case("isof") || name.eq_ignore_ascii_case("cast");
    if is_type_check {
        if let Some(Expression::Reference(type_name)) = arguments.last() {
            let type_name = Expression::type_name(type_name.clone());
            if let Some(last) = arguments.last_mut() {
                *last = type_name;
            }
        }
    }
    arguments
}

fn parse_literal(pair: Pair<Rule>) -> Result<Expression> {
    match pair.as_rule() {
        Rule::string => Ok(Expression::value(unquote(pair)?)),
        Rule::number => {
            let text = pair.as_str();
            if !text.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
                if let Ok(i) = text.parse::<i64>() {
                    return Ok(Expression::value(i));
                }
            }
            text.parse::<f64>()
                .map(Expression::value)
                .map_err(|_| ODataError::Syntax(format!("Invalid number: {}", text)))
        }
        Rule::boolean => Ok(Expression::value(pair.as_str().eq_ignore_ascii_case("true"))),
        Rule::null => Ok(Expression::null()),
        Rule::typed_literal => {
            let mut inner = pair.into_inner();
            let prefix = next_pair(&mut inner, "literal type")?.as_str();
            let text = unquote(next_pair(&mut inner, "literal text")?)?;
            typed_literal(prefix, &text).map(Expression::Value)
        }
        rule => Err(ODataError::Syntax(format!("Unexpected literal type: {:?}", rule))),
    }
}

/// Text of a quoted string with `''` unescaped
fn unquote(pair: Pair<Rule>) -> Result<String> {
    let mut inner = pair.into_inner();
    let text = next_pair(&mut inner, "string content")?.as_str();
    Ok(text.replace("''", "'"))
}

fn typed_literal(prefix: &str, text: &str) -> Result<Value> {
    let invalid = || ODataError::Syntax(format!("Invalid {} literal: '{}'", prefix, text));

    match prefix.to_ascii_lowercase().as_str() {
        "guid" => Uuid::parse_str(text).map(Value::Guid).map_err(|_| invalid()),
        "datetime" | "datetimeoffset" => parse_datetime(text).map(Value::DateTime).ok_or_else(invalid),
        "binary" => URL_SAFE
            .decode(text)
            .or_else(|_| STANDARD.decode(text))
            .map(Value::Binary)
            .map_err(|_| invalid()),
        "x" => decode_hex(text).map(Value::Binary).ok_or_else(invalid),
        _ => Ok(Value::Enum {
            type_name: prefix.to_string(),
            member: text.to_string(),
        }),
    }
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}
