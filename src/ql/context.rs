//! Per-call compilation context

use std::cell::Cell;

use crate::metadata::EntityCollection;

/// Addressing scope and mode of a single compilation call
#[derive(Debug, Clone, Default)]
pub struct ExpressionContext {
    /// Collection references are resolved against
    pub entity_collection: Option<EntityCollection>,
    /// Lambda variable prefixed to references (`x3`)
    pub scope_qualifier: Option<String>,
    /// Terse `key=value&key=value` spelling for custom query options
    pub is_query_option: bool,
    /// Name reserved for the dynamic-properties container
    pub dynamic_properties_container: Option<String>,
}

impl ExpressionContext {
    /// Context without a collection: references are emitted verbatim
    pub fn new() -> Self {
        ExpressionContext::default()
    }

    pub fn for_collection(collection: EntityCollection) -> Self {
        ExpressionContext {
            entity_collection: Some(collection),
            ..ExpressionContext::default()
        }
    }

    /// Context for custom query options
    pub fn query_option() -> Self {
        ExpressionContext {
            is_query_option: true,
            ..ExpressionContext::default()
        }
    }

    pub fn with_dynamic_container<S: Into<String>>(mut self, name: S) -> Self {
        self.dynamic_properties_container = Some(name.into());
        self
    }

    /// Lambda body scope: a new collection and qualifier, same container name
    pub(crate) fn lambda(&self, collection: EntityCollection, qualifier: String) -> Self {
        ExpressionContext {
            entity_collection: Some(collection),
            scope_qualifier: Some(qualifier),
            is_query_option: false,
            dynamic_properties_container: self.dynamic_properties_container.clone(),
        }
    }

    /// Prefix `text` with the scope qualifier, if any
    pub(crate) fn scoped(&self, text: &str) -> String {
        match self.scope_qualifier.as_deref() {
            Some(q) if !q.is_empty() => format!("{}/{}", q, text),
            _ => text.to_string(),
        }
    }
}

/// Source of lambda scope qualifiers `x1`..`x9`.
///
/// Every allocation advances the counter; qualifiers wrap after nine.
#[derive(Debug, Default)]
pub struct ScopeCounter {
    next: Cell<usize>,
}

impl ScopeCounter {
    pub fn new() -> Self {
        ScopeCounter::default()
    }

    /// Allocate the next qualifier
    pub fn allocate(&self) -> String {
        let n = self.next.get();
        self.next.set(n.wrapping_add(1));
        format!("x{}", 1 + n % 9)
    }

    /// Number of qualifiers allocated so far
    pub fn allocated(&self) -> usize {
        self.next.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifiers_wrap_after_nine() {
        let counter = ScopeCounter::new();
        let issued: Vec<String> = (0..11).map(|_| counter.allocate()).collect();
        assert_eq!(issued[0], "x1");
        assert_eq!(issued[1], "x2");
        assert_eq!(issued[8], "x9");
        assert_eq!(issued[9], "x1");
        assert_eq!(issued[10], "x2");
        assert_eq!(counter.allocated(), 11);
    }

    #[test]
    fn test_scoped() {
        let ctx = ExpressionContext::new();
        assert_eq!(ctx.scoped("Name"), "Name");

        let lambda = ctx.lambda(EntityCollection::new("Orders"), "x3".to_string());
        assert_eq!(lambda.scoped("Name"), "x3/Name");
        assert_eq!(lambda.entity_collection.unwrap().name(), "Orders");
    }
}
