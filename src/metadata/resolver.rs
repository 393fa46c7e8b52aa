//! Metadata resolver
//!
//! A stateless view over an immutable `Schema` that resolves loosely
//! specified names (case-insensitive, singular/plural tolerant) to exact
//! schema identifiers and answers structural questions about entity
//! types. Every "resolve" operation either returns a definitive answer or
//! fails with `ODataError::UnresolvableObject`; the `has_*`/`is_*`
//! predicates return `false` instead of failing.

use log::{trace, warn};

use crate::errors::{ODataError, Result};
use crate::metadata::collection::EntityCollection;
use crate::metadata::pluralizer::{homogenize, NameMatcher};
use crate::metadata::schema::{
    EntitySet, EntityType, EntityTypeId, FunctionImport, NavigationProperty, Schema,
};

/// Outcome of a name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Exactly one schema element matched
    Unique(T),
    /// Nothing matched
    NotFound,
    /// More than one element matched (the count is reported)
    Ambiguous(usize),
}

impl<T> Resolution<T> {
    /// Classify the candidates produced by a lookup
    pub fn from_matches<I: IntoIterator<Item = T>>(matches: I) -> Self {
        let mut iter = matches.into_iter();
        match iter.next() {
            None => Resolution::NotFound,
            Some(first) => {
                let rest = iter.count();
                if rest == 0 {
                    Resolution::Unique(first)
                } else {
                    Resolution::Ambiguous(rest + 1)
                }
            }
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, Resolution::Unique(_))
    }

    /// The unique match, if any
    pub fn ok(self) -> Option<T> {
        match self {
            Resolution::Unique(value) => Some(value),
            _ => None,
        }
    }

    /// Default policy: anything but a unique match is fatal
    pub fn into_result(self, name: &str, kind: &str) -> Result<T> {
        match self {
            Resolution::Unique(value) => Ok(value),
            Resolution::NotFound => Err(ODataError::unresolvable(
                name,
                format!("{} {} not found", kind, name),
            )),
            Resolution::Ambiguous(count) => Err(ODataError::unresolvable(
                name,
                format!("{} {} is ambiguous ({} matches)", kind, name, count),
            )),
        }
    }
}

/// Split `Set/Derived` into its set part and optional type part
fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('/') {
        Some((set, rest)) => (set, Some(rest.rsplit('/').next().unwrap_or(rest))),
        None => (path, None),
    }
}

/// Resolves names against a schema using a name-equality policy
#[derive(Debug, Clone, Copy)]
pub struct MetadataResolver<'a> {
    schema: &'a Schema,
    matcher: NameMatcher<'a>,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(schema: &'a Schema, matcher: NameMatcher<'a>) -> Self {
        MetadataResolver { schema, matcher }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    fn names_are_equal(&self, actual: &str, requested: &str) -> bool {
        self.matcher.names_are_equal(actual, requested)
    }

    // ---- entity sets ----

    pub fn entity_set_names(&self) -> Vec<&'a str> {
        self.schema.entity_sets().map(|s| s.name.as_str()).collect()
    }

    /// Look up an entity set; composite paths resolve their set portion
    pub fn resolve_entity_set(&self, name: &str) -> Resolution<&'a EntitySet> {
        let (set_name, _) = split_path(name);
        Resolution::from_matches(
            self.schema
                .entity_sets()
                .filter(|s| self.names_are_equal(&s.name, set_name)),
        )
    }

    fn entity_set(&self, name: &str) -> Result<&'a EntitySet> {
        let (set_name, _) = split_path(name);
        self.resolve_entity_set(name).into_result(set_name, "Entity set")
    }

    pub fn entity_set_exact_name(&self, name: &str) -> Result<String> {
        let set = self.entity_set(name)?;
        trace!("Resolved entity set {} -> {}", name, set.name);
        Ok(set.name.clone())
    }

    // ---- entity types ----

    fn resolve_entity_type_name(&self, name: &str) -> Resolution<EntityTypeId> {
        Resolution::from_matches(
            self.schema
                .entity_types()
                .filter(|(_, t)| self.names_are_equal(&t.name, name))
                .map(|(id, _)| id),
        )
    }

    /// Entity type addressed by a set name, a `Set/Derived` path, or a
    /// derived type name whose direct base type backs an entity set.
    pub(crate) fn entity_type_id(&self, path: &str) -> Result<EntityTypeId> {
        let (set_name, derived_name) = split_path(path);

        match derived_name {
            Some(derived_name) => {
                let set = self.resolve_entity_set(set_name).ok().ok_or_else(|| {
                    ODataError::unresolvable(set_name, format!("Entity set {} not found", set_name))
                })?;
                if derived_name.is_empty() {
                    return Ok(set.element_type);
                }

                let derived = self
                    .resolve_entity_type_name(derived_name)
                    .ok()
                    .filter(|id| {
                        self.schema
                            .directly_derived_types(set.element_type)
                            .contains(id)
                    });

                derived.ok_or_else(|| {
                    ODataError::unresolvable(
                        path,
                        format!("Entity type {} is not directly derived from set {}", derived_name, set.name),
                    )
                })
            }
            None => match self.resolve_entity_set(set_name) {
                Resolution::Unique(set) => Ok(set.element_type),
                Resolution::NotFound => self.derived_type_shorthand(set_name).ok_or_else(|| {
                    ODataError::unresolvable(set_name, format!("Entity set {} not found", set_name))
                }),
                Resolution::Ambiguous(count) => Err(ODataError::unresolvable(
                    set_name,
                    format!("Entity set {} is ambiguous ({} matches)", set_name, count),
                )),
            },
        }
    }

    /// A derived type name used in place of a set name
    fn derived_type_shorthand(&self, name: &str) -> Option<EntityTypeId> {
        let derived = self.resolve_entity_type_name(name).ok()?;
        let base = self.schema.entity_type(derived).base_type?;
        let backed = Resolution::from_matches(
            self.schema.entity_sets().filter(|s| s.element_type == base),
        );
        backed.is_unique().then_some(derived)
    }

    /// Entity type of a set, `Set/Derived` path or derived type name
    pub fn entity_type_for(&self, path: &str) -> Result<&'a EntityType> {
        self.entity_type_id(path).map(|id| self.schema.entity_type(id))
    }

    pub fn entity_set_type_name(&self, path: &str) -> Result<String> {
        Ok(self.entity_type_for(path)?.name.clone())
    }

    pub fn entity_set_type_namespace(&self, path: &str) -> Result<String> {
        Ok(self.entity_type_for(path)?.namespace.clone())
    }

    pub fn entity_type_exact_name(&self, name: &str) -> Result<String> {
        let id = self
            .resolve_entity_type_name(name)
            .into_result(name, "Entity type")?;
        Ok(self.schema.entity_type(id).name.clone())
    }

    /// Exact name of a type deriving directly from the set's element type.
    ///
    /// Grandchildren are not searched.
    pub fn derived_entity_type_exact_name(&self, entity_set: &str, entity_type: &str) -> Result<String> {
        let set = self.entity_set(entity_set)?;
        let candidates = self
            .schema
            .directly_derived_types(set.element_type)
            .iter()
            .map(|id| self.schema.entity_type(*id))
            .filter(|t| self.names_are_equal(&t.name, entity_type));

        let derived = Resolution::from_matches(candidates).into_result(entity_type, "Entity type")?;
        Ok(derived.name.clone())
    }

    pub fn is_open_type(&self, path: &str) -> bool {
        self.entity_type_for(path).map(|t| t.is_open).unwrap_or(false)
    }

    /// Key of the nearest type in the base chain that declares one
    pub fn declared_key_names(&self, path: &str) -> Result<Vec<String>> {
        let id = self.entity_type_id(path)?;
        let key = self
            .schema
            .base_chain(id)
            .find_map(|t| self.schema.entity_type(t).declared_key.clone());
        Ok(key.unwrap_or_default())
    }

    pub fn requires_concurrency_check(&self, path: &str) -> Result<bool> {
        let id = self.entity_type_id(path)?;
        Ok(self
            .schema
            .structural_properties(id)
            .any(|p| p.concurrency_token))
    }

    /// `Namespace.Name` of a known entity or enum type
    pub fn qualified_type_name(&self, name: &str) -> String {
        if let Some(id) = self.resolve_entity_type_name(name).ok() {
            return self.schema.entity_type(id).qualified_name();
        }
        let enums = self
            .schema
            .enum_types()
            .iter()
            .filter(|e| NameMatcher::strict().names_are_equal(&e.name, name));
        match Resolution::from_matches(enums) {
            Resolution::Unique(e) if !e.namespace.is_empty() => format!("{}.{}", e.namespace, e.name),
            _ => name.to_string(),
        }
    }

    // ---- collections ----

    pub fn entity_collection(&self, name: &str) -> Result<EntityCollection> {
        Ok(EntityCollection::new(self.entity_set_exact_name(name)?))
    }

    pub fn base_entity_collection(&self, path: &str) -> Result<EntityCollection> {
        let (set_name, _) = split_path(path);
        self.entity_collection(set_name)
    }

    /// Collection addressed by `Set` or `Set/Derived`
    pub fn concrete_entity_collection(&self, path: &str) -> Result<EntityCollection> {
        match split_path(path) {
            (set_name, Some(derived)) => {
                let base = self.entity_collection(set_name)?;
                if derived.is_empty() {
                    Ok(base)
                } else {
                    self.derived_entity_collection(base, derived)
                }
            }
            (set_name, None) => self.entity_collection(set_name),
        }
    }

    pub fn derived_entity_collection(
        &self,
        base: EntityCollection,
        entity_type: &str,
    ) -> Result<EntityCollection> {
        let actual = self.derived_entity_type_exact_name(base.name(), entity_type)?;
        Ok(EntityCollection::derived(actual, base))
    }

    // ---- structural properties ----

    pub fn structural_property_names(&self, path: &str) -> Result<Vec<String>> {
        let id = self.entity_type_id(path)?;
        Ok(self
            .schema
            .structural_properties(id)
            .map(|p| p.name.clone())
            .collect())
    }

    pub fn has_structural_property(&self, path: &str, property: &str) -> bool {
        match self.entity_type_id(path) {
            Ok(id) => self
                .schema
                .structural_properties(id)
                .any(|p| self.names_are_equal(&p.name, property)),
            Err(_) => false,
        }
    }

    pub fn structural_property_exact_name(&self, path: &str, property: &str) -> Result<String> {
        let id = self.entity_type_id(path)?;
        let candidates = self
            .schema
            .structural_properties(id)
            .filter(|p| self.names_are_equal(&p.name, property));
        let found = Resolution::from_matches(candidates).into_result(property, "Structural property")?;
        Ok(found.name.clone())
    }

    // ---- navigation properties ----

    pub fn has_navigation_property(&self, path: &str, property: &str) -> bool {
        match self.entity_type_id(path) {
            Ok(id) => self
                .schema
                .navigation_properties(id)
                .any(|p| self.names_are_equal(&p.name, property)),
            Err(_) => false,
        }
    }

    fn navigation_property(&self, path: &str, property: &str) -> Result<&'a NavigationProperty> {
        let id = self.entity_type_id(path)?;
        let candidates = self
            .schema
            .navigation_properties(id)
            .filter(|p| self.names_are_equal(&p.name, property));
        Resolution::from_matches(candidates).into_result(property, "Navigation property")
    }

    pub fn navigation_property_exact_name(&self, path: &str, property: &str) -> Result<String> {
        Ok(self.navigation_property(path, property)?.name.clone())
    }

    /// Name of the entity type declaring the partner property
    pub fn navigation_property_partner_name(&self, path: &str, property: &str) -> Result<String> {
        let nav = self.navigation_property(path, property)?;
        Ok(self.schema.entity_type(nav.target).name.clone())
    }

    pub fn is_navigation_property_multiple(&self, path: &str, property: &str) -> bool {
        self.navigation_property(path, property)
            .map(|nav| nav.multiplicity == crate::metadata::schema::Multiplicity::Many)
            .unwrap_or(false)
    }

    /// Collection reached by traversing a navigation property.
    ///
    /// The set is looked up by the partner type's name first; failing
    /// that, by element type (directly, or as a derived projection of the
    /// set backing its base type).
    pub fn navigation_target_collection(&self, path: &str, property: &str) -> Result<EntityCollection> {
        let nav = self.navigation_property(path, property)?;
        let target = self.schema.entity_type(nav.target);

        if let Resolution::Unique(set) = self.resolve_entity_set(&target.name) {
            return Ok(EntityCollection::new(set.name.clone()));
        }

        let backing = |id: EntityTypeId| {
            Resolution::from_matches(self.schema.entity_sets().filter(move |s| s.element_type == id)).ok()
        };

        if let Some(set) = backing(nav.target) {
            return Ok(EntityCollection::new(set.name.clone()));
        }
        if let Some(set) = target.base_type.and_then(backing) {
            return Ok(EntityCollection::derived(
                target.name.clone(),
                EntityCollection::new(set.name.clone()),
            ));
        }

        Err(ODataError::unresolvable(
            &target.name,
            format!("No entity set for type {} reached through {}", target.name, nav.name),
        ))
    }

    // ---- functions ----

    /// All function imports matching `name` (homogenized comparison)
    pub fn resolve_function(&self, name: &str) -> Resolution<&'a FunctionImport> {
        let wanted = homogenize(name, true);
        Resolution::from_matches(
            self.schema
                .function_imports()
                .filter(move |f| homogenize(&f.name, true) == wanted),
        )
    }

    /// Exact name of a function import.
    ///
    /// Unlike the other lookups, several matches do not fail: the first
    /// import in container order wins.
    pub fn function_exact_name(&self, name: &str) -> Result<String> {
        let wanted = homogenize(name, true);
        let mut matches = self
            .schema
            .function_imports()
            .filter(|f| homogenize(&f.name, true) == wanted);

        let first = matches.next().ok_or_else(|| {
            ODataError::unresolvable(name, format!("Function {} not found", name))
        })?;
        let others = matches.count();
        if others > 0 {
            warn!(
                "Function {} matches {} imports, using {}",
                name,
                others + 1,
                first.name
            );
        }
        Ok(first.name.clone())
    }
}
