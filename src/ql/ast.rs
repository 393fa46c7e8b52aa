//! Abstract Syntax Tree for filter expressions
//!
//! This module defines the expression tree compiled into OData query text.

use std::ops;

use crate::value::{TargetType, Value};

/// Operators of the expression language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
}

impl Operator {
    /// Binding strength, lower binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Not | Operator::Neg => 1,
            Operator::Mul | Operator::Div | Operator::Mod => 2,
            Operator::Add | Operator::Sub => 3,
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => 4,
            Operator::Eq | Operator::Ne => 5,
            Operator::And => 6,
            Operator::Or => 7,
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Not | Operator::Neg)
    }

    /// Protocol keyword spelling
    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
            Operator::Mod => "mod",
            Operator::Neg => "-",
        }
    }
}

/// A function applied to an optional caller expression
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The function name as written by the caller
    pub name: String,
    /// The expression the function is invoked on (`Name` in `Name.Length()`)
    pub caller: Option<Box<Expression>>,
    /// The arguments to the function
    pub arguments: Vec<Expression>,
}

/// Types of expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value
    Value(Value),
    /// A reference to a schema type, used by `isof`/`cast`
    TypeName(String),
    /// A property or navigation path (`Category.CategoryName`)
    Reference(String),
    /// A function call
    Function(FunctionCall),
    /// Logical or arithmetic negation
    Unary {
        op: Operator,
        operand: Box<Expression>,
    },
    /// Binary operator application
    Binary {
        op: Operator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Conversion of the operand to a target type
    Conversion {
        target: TargetType,
        operand: Box<Expression>,
    },
}

impl Expression {
    pub fn reference<S: Into<String>>(path: S) -> Self {
        Expression::Reference(path.into())
    }

    pub fn value<V: Into<Value>>(value: V) -> Self {
        Expression::Value(value.into())
    }

    pub fn null() -> Self {
        Expression::Value(Value::Null)
    }

    pub fn type_name<S: Into<String>>(name: S) -> Self {
        Expression::TypeName(name.into())
    }

    /// A free function call such as `isof(Employee)`
    pub fn call<S: Into<String>>(name: S, arguments: Vec<Expression>) -> Self {
        Expression::Function(FunctionCall {
            name: name.into(),
            caller: None,
            arguments,
        })
    }

    /// A function invoked on this expression, e.g. `Name.Contains('x')`
    pub fn method<S: Into<String>>(self, name: S, arguments: Vec<Expression>) -> Self {
        Expression::Function(FunctionCall {
            name: name.into(),
            caller: Some(Box::new(self)),
            arguments,
        })
    }

    /// `Orders.Any(body)`
    pub fn any(self, body: Expression) -> Self {
        self.method("Any", vec![body])
    }

    /// `Orders.All(body)`
    pub fn all(self, body: Expression) -> Self {
        self.method("All", vec![body])
    }

    pub fn binary(op: Operator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: Operator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn convert(self, target: TargetType) -> Self {
        Expression::Conversion {
            target,
            operand: Box::new(self),
        }
    }

    pub fn equals(self, other: Expression) -> Self {
        Expression::binary(Operator::Eq, self, other)
    }

    pub fn not_equals(self, other: Expression) -> Self {
        Expression::binary(Operator::Ne, self, other)
    }

    pub fn greater_than(self, other: Expression) -> Self {
        Expression::binary(Operator::Gt, self, other)
    }

    pub fn greater_or_equal(self, other: Expression) -> Self {
        Expression::binary(Operator::Ge, self, other)
    }

    pub fn less_than(self, other: Expression) -> Self {
        Expression::binary(Operator::Lt, self, other)
    }

    pub fn less_or_equal(self, other: Expression) -> Self {
        Expression::binary(Operator::Le, self, other)
    }

    /// Top-level operator of this node, if any.
    ///
    /// Conversions emit no text of their own, so they report the operator
    /// of their operand.
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Expression::Unary { op, .. } | Expression::Binary { op, .. } => Some(*op),
            Expression::Conversion { operand, .. } => operand.operator(),
            _ => None,
        }
    }

    /// Check if this node is a literal null
    pub fn is_null(&self) -> bool {
        matches!(self, Expression::Value(Value::Null))
    }
}

macro_rules! binary_ops {
    ($($trait:ident :: $method:ident => $op:expr),* $(,)?) => {
        $(
            impl ops::$trait for Expression {
                type Output = Expression;

                fn $method(self, rhs: Expression) -> Expression {
                    Expression::binary($op, self, rhs)
                }
            }
        )*
    };
}

binary_ops! {
    BitAnd::bitand => Operator::And,
    BitOr::bitor => Operator::Or,
    Add::add => Operator::Add,
    Sub::sub => Operator::Sub,
    Mul::mul => Operator::Mul,
    Div::div => Operator::Div,
    Rem::rem => Operator::Mod,
}

impl ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        Expression::unary(Operator::Not, self)
    }
}

impl ops::Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::unary(Operator::Neg, self)
    }
}
