//! Schema graph for odata-query
//!
//! The schema is an arena of entity types addressed by `EntityTypeId`.
//! Base types and navigation targets are stored as ids into the same
//! arena, so the graph has no pointer cycles. A `SchemaDocument` is the
//! serde loading format; `Schema::from_document` validates every
//! reference before the arena is built.

use std::collections::HashMap;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{ODataError, Result};

/// Index of an entity type inside the schema arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityTypeId(pub(crate) usize);

/// Cardinality of the target end of a navigation property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    /// Zero or one related entity
    #[default]
    One,
    /// A collection of related entities
    Many,
}

#[derive(Debug, Clone)]
pub struct StructuralProperty {
    pub name: String,
    /// Marks an optimistic-concurrency token
    pub concurrency_token: bool,
}

#[derive(Debug, Clone)]
pub struct NavigationProperty {
    pub name: String,
    /// Declaring type of the partner property
    pub target: EntityTypeId,
    /// Name of the reverse navigation property on `target`
    pub partner: String,
    pub multiplicity: Multiplicity,
}

#[derive(Debug, Clone)]
pub struct EntityType {
    pub name: String,
    pub namespace: String,
    pub base_type: Option<EntityTypeId>,
    /// Key declared on this type itself (not inherited)
    pub declared_key: Option<Vec<String>>,
    pub structural_properties: Vec<StructuralProperty>,
    pub navigation_properties: Vec<NavigationProperty>,
    pub is_open: bool,
}

impl EntityType {
    /// Namespace-qualified type name
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub namespace: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub name: String,
    pub element_type: EntityTypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionImport {
    pub name: String,
    pub parameters: Vec<String>,
}

impl FunctionImport {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

#[derive(Debug, Clone)]
pub struct EntityContainer {
    pub name: String,
    pub entity_sets: Vec<EntitySet>,
    pub function_imports: Vec<FunctionImport>,
}

/// Immutable, validated schema graph
#[derive(Debug, Clone)]
pub struct Schema {
    entity_types: Vec<EntityType>,
    enum_types: Vec<EnumType>,
    containers: Vec<EntityContainer>,
    /// Direct-derivation relation, indexed by base type id
    derived: Vec<Vec<EntityTypeId>>,
}

impl Schema {
    /// Build and validate a schema from its document form
    pub fn from_document(doc: SchemaDocument) -> Result<Self> {
        let mut ids: HashMap<String, EntityTypeId> = HashMap::new();
        for (idx, ty) in doc.entity_types.iter().enumerate() {
            let namespace = ty.namespace.as_deref().unwrap_or(&doc.namespace);
            let qualified = qualify(namespace, &ty.name);
            if ids.insert(ty.name.clone(), EntityTypeId(idx)).is_some() {
                return Err(ODataError::InvalidSchema(format!(
                    "Duplicate entity type {}",
                    ty.name
                )));
            }
            ids.insert(qualified, EntityTypeId(idx));
        }

        let lookup = |name: &str, context: &str| -> Result<EntityTypeId> {
            ids.get(name).copied().ok_or_else(|| {
                ODataError::InvalidSchema(format!("Unknown entity type {} referenced by {}", name, context))
            })
        };

        let mut entity_types = Vec::with_capacity(doc.entity_types.len());
        for ty in &doc.entity_types {
            let base_type = match &ty.base_type {
                Some(base) => Some(lookup(base, &ty.name)?),
                None => None,
            };

            let mut navigation_properties = Vec::with_capacity(ty.navigation_properties.len());
            for nav in &ty.navigation_properties {
                navigation_properties.push(NavigationProperty {
                    name: nav.name.clone(),
                    target: lookup(&nav.target, &format!("{}.{}", ty.name, nav.name))?,
                    partner: nav.partner.clone(),
                    multiplicity: nav.multiplicity,
                });
            }

            entity_types.push(EntityType {
                name: ty.name.clone(),
                namespace: ty.namespace.clone().unwrap_or_else(|| doc.namespace.clone()),
                base_type,
                declared_key: ty.key.clone(),
                structural_properties: ty
                    .properties
                    .iter()
                    .map(|p| StructuralProperty {
                        name: p.name.clone(),
                        concurrency_token: p.concurrency,
                    })
                    .collect(),
                navigation_properties,
                is_open: ty.open,
            });
        }

        let mut containers = Vec::with_capacity(doc.containers.len());
        for container in &doc.containers {
            let mut entity_sets = Vec::with_capacity(container.entity_sets.len());
            for set in &container.entity_sets {
                entity_sets.push(EntitySet {
                    name: set.name.clone(),
                    element_type: lookup(&set.entity_type, &set.name)?,
                });
            }
            containers.push(EntityContainer {
                name: container.name.clone(),
                entity_sets,
                function_imports: container
                    .function_imports
                    .iter()
                    .map(|f| FunctionImport {
                        name: f.name.clone(),
                        parameters: f.parameters.clone(),
                    })
                    .collect(),
            });
        }

        let enum_types = doc
            .enum_types
            .iter()
            .map(|e| EnumType {
                name: e.name.clone(),
                namespace: e.namespace.clone().unwrap_or_else(|| doc.namespace.clone()),
                members: e.members.clone(),
            })
            .collect();

        let mut derived = vec![Vec::new(); entity_types.len()];
        for (idx, ty) in entity_types.iter().enumerate() {
            if let Some(base) = ty.base_type {
                derived[base.0].push(EntityTypeId(idx));
            }
        }

        let schema = Schema {
            entity_types,
            enum_types,
            containers,
            derived,
        };
        schema.validate()?;

        debug!(
            "Loaded schema: {} entity types, {} enum types, {} containers",
            schema.entity_types.len(),
            schema.enum_types.len(),
            schema.containers.len()
        );

        Ok(schema)
    }

    /// Parse a schema document from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Load a schema document from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        for (idx, ty) in self.entity_types.iter().enumerate() {
            // Base chains must terminate
            let mut current = ty.base_type;
            let mut steps = 0;
            while let Some(base) = current {
                steps += 1;
                if base.0 == idx || steps > self.entity_types.len() {
                    return Err(ODataError::InvalidSchema(format!(
                        "Inheritance cycle through {}",
                        ty.name
                    )));
                }
                current = self.entity_types[base.0].base_type;
            }
        }

        for ty in &self.entity_types {
            for nav in &ty.navigation_properties {
                let has_partner = self
                    .navigation_properties(nav.target)
                    .any(|p| p.name == nav.partner);
                if !has_partner {
                    return Err(ODataError::InvalidSchema(format!(
                        "Navigation property {}.{} has no partner {} on {}",
                        ty.name,
                        nav.name,
                        nav.partner,
                        self.entity_type(nav.target).name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn entity_type(&self, id: EntityTypeId) -> &EntityType {
        &self.entity_types[id.0]
    }

    pub fn entity_types(&self) -> impl Iterator<Item = (EntityTypeId, &EntityType)> {
        self.entity_types
            .iter()
            .enumerate()
            .map(|(idx, ty)| (EntityTypeId(idx), ty))
    }

    pub fn enum_types(&self) -> &[EnumType] {
        &self.enum_types
    }

    pub fn containers(&self) -> &[EntityContainer] {
        &self.containers
    }

    pub fn entity_sets(&self) -> impl Iterator<Item = &EntitySet> {
        self.containers.iter().flat_map(|c| c.entity_sets.iter())
    }

    pub fn function_imports(&self) -> impl Iterator<Item = &FunctionImport> {
        self.containers.iter().flat_map(|c| c.function_imports.iter())
    }

    /// Types deriving directly (one level) from `id`
    pub fn directly_derived_types(&self, id: EntityTypeId) -> &[EntityTypeId] {
        &self.derived[id.0]
    }

    /// `id` followed by its ancestors, nearest first
    pub fn base_chain(&self, id: EntityTypeId) -> impl Iterator<Item = EntityTypeId> + '_ {
        std::iter::successors(Some(id), move |current| self.entity_types[current.0].base_type)
    }

    /// Structural properties declared on the type or inherited
    pub fn structural_properties(&self, id: EntityTypeId) -> impl Iterator<Item = &StructuralProperty> {
        self.base_chain(id)
            .flat_map(move |t| self.entity_types[t.0].structural_properties.iter())
    }

    /// Navigation properties declared on the type or inherited
    pub fn navigation_properties(&self, id: EntityTypeId) -> impl Iterator<Item = &NavigationProperty> {
        self.base_chain(id)
            .flat_map(move |t| self.entity_types[t.0].navigation_properties.iter())
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Serialized schema, as read from a JSON metadata file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDocument {
    pub namespace: String,
    pub entity_types: Vec<EntityTypeDocument>,
    pub enum_types: Vec<EnumTypeDocument>,
    pub containers: Vec<ContainerDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTypeDocument {
    pub name: String,
    pub namespace: Option<String>,
    pub base_type: Option<String>,
    pub key: Option<Vec<String>>,
    pub open: bool,
    pub properties: Vec<PropertyDocument>,
    pub navigation_properties: Vec<NavigationDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyDocument {
    pub name: String,
    #[serde(default)]
    pub concurrency: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationDocument {
    pub name: String,
    pub target: String,
    pub partner: String,
    #[serde(default)]
    pub multiplicity: Multiplicity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumTypeDocument {
    pub name: String,
    pub namespace: Option<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerDocument {
    pub name: String,
    pub entity_sets: Vec<EntitySetDocument>,
    pub function_imports: Vec<FunctionImportDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySetDocument {
    pub name: String,
    pub entity_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionImportDocument {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::northwind;
    use std::io::Write;

    #[test]
    fn test_base_chain_and_derivation() {
        let schema = northwind();
        let (person, _) = schema.entity_types().find(|(_, t)| t.name == "Person").unwrap();
        let (employee, _) = schema.entity_types().find(|(_, t)| t.name == "Employee").unwrap();
        let (manager, _) = schema.entity_types().find(|(_, t)| t.name == "Manager").unwrap();

        assert_eq!(schema.directly_derived_types(person), &[employee]);
        assert_eq!(schema.directly_derived_types(employee), &[manager]);
        assert_eq!(schema.base_chain(manager).collect::<Vec<_>>(), vec![manager, employee, person]);

        // Inherited properties are visible on derived types
        assert!(schema.structural_properties(manager).any(|p| p.name == "PersonID"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{
            "namespace": "NS",
            "entity_types": [{"name": "A", "base_type": "Missing"}]
        }"#;
        match Schema::from_json(json) {
            Err(ODataError::InvalidSchema(msg)) => assert!(msg.contains("Missing")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_partner_is_rejected() {
        let json = r#"{
            "namespace": "NS",
            "entity_types": [
                {"name": "A", "navigation_properties": [{"name": "Bs", "target": "B", "partner": "A", "multiplicity": "many"}]},
                {"name": "B"}
            ]
        }"#;
        assert!(matches!(Schema::from_json(json), Err(ODataError::InvalidSchema(_))));
    }

    #[test]
    fn test_inheritance_cycle_is_rejected() {
        let json = r#"{
            "namespace": "NS",
            "entity_types": [
                {"name": "A", "base_type": "B"},
                {"name": "B", "base_type": "A"}
            ]
        }"#;
        assert!(matches!(Schema::from_json(json), Err(ODataError::InvalidSchema(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "namespace": "NS",
                "entity_types": [{{"name": "Product", "key": ["Id"], "properties": [{{"name": "Id"}}]}}],
                "containers": [{{"name": "Default", "entity_sets": [{{"name": "Products", "entity_type": "Product"}}]}}]
            }}"#
        )
        .unwrap();

        let schema = Schema::from_file(file.path()).unwrap();
        assert_eq!(schema.entity_sets().count(), 1);
        let (_, product) = schema.entity_types().next().unwrap();
        assert_eq!(product.qualified_name(), "NS.Product");
    }
}
