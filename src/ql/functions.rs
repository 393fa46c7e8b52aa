//! Mapping of client-side function names onto protocol functions
//!
//! `Name.Contains('x')` is written against the caller; the protocol wants
//! `contains(Name,'x')` (V4) or `substringof('x',Name)` (V3). A mapping
//! rewrites caller and arguments into the protocol function's argument
//! list; the compiler then compiles each argument.

use crate::ql::ast::Expression;
use crate::session::ProtocolVersion;

/// Protocol function name plus rewritten argument list
#[derive(Debug, Clone, PartialEq)]
pub struct MappedFunction {
    pub name: String,
    pub arguments: Vec<Expression>,
}

/// Where the caller goes in the rewritten argument list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerPosition {
    First,
    Last,
}

/// A single mapping entry
#[derive(Debug, Clone, Copy)]
pub struct FunctionMapping {
    target: &'static str,
    caller: CallerPosition,
}

impl FunctionMapping {
    pub const fn new(target: &'static str, caller: CallerPosition) -> Self {
        FunctionMapping { target, caller }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Rewrite `caller.name(arguments)` into the protocol call
    pub fn rewrite(&self, _name: &str, caller: Option<&Expression>, arguments: &[Expression]) -> MappedFunction {
        let mut mapped = Vec::with_capacity(arguments.len() + 1);
        if self.caller == CallerPosition::First {
            mapped.extend(caller.cloned());
        }
        mapped.extend(arguments.iter().cloned());
        if self.caller == CallerPosition::Last {
            mapped.extend(caller.cloned());
        }

        MappedFunction {
            name: self.target.to_string(),
            arguments: mapped,
        }
    }
}

/// Lookup table of function mappings
pub trait FunctionMappings: Send + Sync {
    /// Mapping for `name` (case-insensitive) called with `arity` arguments
    fn try_get_mapping(&self, name: &str, arity: usize, version: ProtocolVersion) -> Option<FunctionMapping>;

    /// Whether any protocol version maps `name`/`arity`
    fn contains_function(&self, name: &str, arity: usize) -> bool {
        [ProtocolVersion::V3, ProtocolVersion::V4]
            .iter()
            .any(|v| self.try_get_mapping(name, arity, *v).is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    All,
    V3,
    V4,
}

impl Availability {
    fn includes(&self, version: ProtocolVersion) -> bool {
        match self {
            Availability::All => true,
            Availability::V3 => version == ProtocolVersion::V3,
            Availability::V4 => version == ProtocolVersion::V4,
        }
    }
}

use CallerPosition::{First, Last};

const STANDARD: &[(&str, usize, Availability, FunctionMapping)] = &[
    ("Contains", 1, Availability::V3, FunctionMapping::new("substringof", Last)),
    ("Contains", 1, Availability::V4, FunctionMapping::new("contains", First)),
    ("StartsWith", 1, Availability::All, FunctionMapping::new("startswith", First)),
    ("EndsWith", 1, Availability::All, FunctionMapping::new("endswith", First)),
    ("Length", 0, Availability::All, FunctionMapping::new("length", First)),
    ("IndexOf", 1, Availability::All, FunctionMapping::new("indexof", First)),
    ("Replace", 2, Availability::All, FunctionMapping::new("replace", First)),
    ("Substring", 1, Availability::All, FunctionMapping::new("substring", First)),
    ("Substring", 2, Availability::All, FunctionMapping::new("substring", First)),
    ("ToLower", 0, Availability::All, FunctionMapping::new("tolower", First)),
    ("ToUpper", 0, Availability::All, FunctionMapping::new("toupper", First)),
    ("Trim", 0, Availability::All, FunctionMapping::new("trim", First)),
    ("Concat", 1, Availability::All, FunctionMapping::new("concat", First)),
    ("Year", 0, Availability::All, FunctionMapping::new("year", First)),
    ("Month", 0, Availability::All, FunctionMapping::new("month", First)),
    ("Day", 0, Availability::All, FunctionMapping::new("day", First)),
    ("Hour", 0, Availability::All, FunctionMapping::new("hour", First)),
    ("Minute", 0, Availability::All, FunctionMapping::new("minute", First)),
    ("Second", 0, Availability::All, FunctionMapping::new("second", First)),
    ("Date", 0, Availability::V4, FunctionMapping::new("date", First)),
    ("Time", 0, Availability::V4, FunctionMapping::new("time", First)),
    ("Round", 0, Availability::All, FunctionMapping::new("round", First)),
    ("Floor", 0, Availability::All, FunctionMapping::new("floor", First)),
    ("Ceiling", 0, Availability::All, FunctionMapping::new("ceiling", First)),
    ("Now", 0, Availability::V4, FunctionMapping::new("now", First)),
];

/// The canonical string, date and math function mappings
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFunctions;

impl StandardFunctions {
    pub fn new() -> Self {
        StandardFunctions
    }
}

impl FunctionMappings for StandardFunctions {
    fn try_get_mapping(&self, name: &str, arity: usize, version: ProtocolVersion) -> Option<FunctionMapping> {
        STANDARD
            .iter()
            .find(|(n, a, avail, _)| {
                *a == arity && avail.includes(version) && n.eq_ignore_ascii_case(name)
            })
            .map(|(_, _, _, mapping)| *mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_differs_per_version() {
        let table = StandardFunctions::new();
        let caller = Expression::reference("Name");
        let args = [Expression::value("ab")];

        let v4 = table.try_get_mapping("contains", 1, ProtocolVersion::V4).unwrap();
        let mapped = v4.rewrite("contains", Some(&caller), &args);
        assert_eq!(mapped.name, "contains");
        assert_eq!(mapped.arguments, vec![caller.clone(), args[0].clone()]);

        let v3 = table.try_get_mapping("Contains", 1, ProtocolVersion::V3).unwrap();
        let mapped = v3.rewrite("Contains", Some(&caller), &args);
        assert_eq!(mapped.name, "substringof");
        assert_eq!(mapped.arguments, vec![args[0].clone(), caller]);
    }

    #[test]
    fn test_arity_and_version_must_match() {
        let table = StandardFunctions::new();
        assert!(table.try_get_mapping("Length", 1, ProtocolVersion::V4).is_none());
        assert!(table.try_get_mapping("Now", 0, ProtocolVersion::V3).is_none());
        assert!(table.contains_function("now", 0));
        assert!(table.contains_function("LENGTH", 0));
        assert!(!table.contains_function("Frobnicate", 0));
    }

    #[test]
    fn test_rewrite_without_caller() {
        let now = StandardFunctions::new()
            .try_get_mapping("Now", 0, ProtocolVersion::V4)
            .unwrap();
        let mapped = now.rewrite("Now", None, &[]);
        assert_eq!(mapped.name, "now");
        assert!(mapped.arguments.is_empty());
    }
}
