use std::fmt;
use std::sync::Arc;

/// Addressing unit threaded through compilation: an exact entity set
/// name, or a derived type projected from a base collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCollection {
    name: String,
    base: Option<Arc<EntityCollection>>,
}

impl EntityCollection {
    pub fn new<S: Into<String>>(name: S) -> Self {
        EntityCollection {
            name: name.into(),
            base: None,
        }
    }

    /// Derived-type projection of `base`
    pub fn derived<S: Into<String>>(name: S, base: EntityCollection) -> Self {
        EntityCollection {
            name: name.into(),
            base: Some(Arc::new(base)),
        }
    }

    /// Exact set name, or the derived type name for projections
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&EntityCollection> {
        self.base.as_deref()
    }

    /// Path understood by the resolver: `Set` or `Set/Derived`
    pub fn path(&self) -> String {
        match &self.base {
            Some(base) => format!("{}/{}", base.path(), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for EntityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        let people = EntityCollection::new("People");
        let employees = EntityCollection::derived("Employee", people.clone());
        assert_eq!(people.path(), "People");
        assert_eq!(employees.path(), "People/Employee");
        assert_eq!(employees.base(), Some(&people));
        assert_eq!(employees.name(), "Employee");
    }
}
