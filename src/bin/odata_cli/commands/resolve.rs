use anyhow::Result;
use odata_query::{MetadataResolver, Properties, Value};

use crate::context::Context;

fn text(value: String) -> Value {
    Value::String(value)
}

/// Résout une propriété (structurelle ou de navigation) d'un ensemble
fn resolve_member(resolver: &MetadataResolver<'_>, set: &str, name: &str) -> Result<Properties> {
    let mut found = Properties::new();
    let collection = resolver.concrete_entity_collection(set)?;
    let path = collection.path();
    found.insert("entitySet".to_string(), text(path.clone()));

    if let Ok(property) = resolver.structural_property_exact_name(&path, name) {
        found.insert("kind".to_string(), text("property".to_string()));
        found.insert("name".to_string(), text(property));
        return Ok(found);
    }

    let navigation = resolver.navigation_property_exact_name(&path, name)?;
    let target = resolver.navigation_target_collection(&path, &navigation)?;
    found.insert("kind".to_string(), text("navigation".to_string()));
    found.insert(
        "multiple".to_string(),
        Value::Boolean(resolver.is_navigation_property_multiple(&path, &navigation)),
    );
    found.insert("name".to_string(), text(navigation));
    found.insert("target".to_string(), text(target.path()));
    Ok(found)
}

/// Résout un nom d'ensemble d'entités, de type ou de fonction
fn resolve_schema_object(resolver: &MetadataResolver<'_>, name: &str) -> Result<Properties> {
    let mut found = Properties::new();

    if let Ok(set) = resolver.entity_set_exact_name(name) {
        let keys = resolver.declared_key_names(&set)?;
        found.insert("kind".to_string(), text("entitySet".to_string()));
        found.insert("type".to_string(), text(resolver.entity_set_type_name(&set)?));
        found.insert("keys".to_string(), Value::Array(keys.into_iter().map(text).collect()));
        found.insert("open".to_string(), Value::Boolean(resolver.is_open_type(&set)));
        found.insert("name".to_string(), text(set));
        return Ok(found);
    }

    if let Ok(entity_type) = resolver.entity_type_exact_name(name) {
        found.insert("kind".to_string(), text("entityType".to_string()));
        found.insert("name".to_string(), text(entity_type));
        return Ok(found);
    }

    let function = resolver.function_exact_name(name)?;
    found.insert("kind".to_string(), text("function".to_string()));
    found.insert("name".to_string(), text(function));
    Ok(found)
}

/// Exécute la commande de résolution
pub fn execute(context: &Context, entity_set: Option<&str>, name: &str) -> Result<()> {
    let session = context.session()?;
    let resolver = session.resolver();

    let found = match entity_set {
        Some(set) => resolve_member(&resolver, set, name)?,
        None => resolve_schema_object(&resolver, name)?,
    };

    println!("{}", context.formatter().format_entries(&[found])?);

    Ok(())
}
