//! Lecture des réponses JSON (formats V4 et V3 « light » / verbeux)

use serde_json::{Map, Value as Json};

use odata_query::response::{EntryAnnotations, FeedAnnotations};
use odata_query::{AnnotatedEntry, AnnotatedFeed, ODataResponse, Properties, ResponseNode, Value};

use crate::utils::error::CliError;

/// Construit une réponse à partir du texte d'une réponse serveur.
///
/// Un corps qui n'est pas du JSON est traité comme une valeur brute (`$value`).
pub fn parse_payload(text: &str) -> Result<ODataResponse, CliError> {
    let json: Json = match serde_json::from_str(text) {
        Ok(json) => json,
        Err(_) => return Ok(ODataResponse::from_value_stream(text.trim().as_bytes())?),
    };

    match json {
        Json::Object(map) => parse_object(map),
        Json::Array(items) => Ok(parse_items(items, FeedAnnotations::default())),
        scalar => Ok(ODataResponse::from_property(None, Value::from(scalar))),
    }
}

fn parse_object(mut map: Map<String, Json>) -> Result<ODataResponse, CliError> {
    // Enveloppe V3 verbeuse: {"d": ...}
    if map.len() == 1 {
        if let Some(inner) = map.remove("d") {
            return match inner {
                Json::Object(inner) => parse_object(inner),
                Json::Array(items) => Ok(parse_items(items, FeedAnnotations::default())),
                other => Err(CliError::InvalidPayload(format!("contenu inattendu: {}", other))),
            };
        }
    }

    let items = match map.remove("value").or_else(|| map.remove("results")) {
        Some(Json::Array(items)) => items,
        Some(single) => {
            // Propriété seule: {"@odata.context": ..., "value": 42}
            return Ok(ODataResponse::from_property(None, Value::from(single)));
        }
        None => {
            let entry = parse_entry(map);
            return Ok(ODataResponse::from_node(ResponseNode::from_entry(entry)));
        }
    };

    let annotations = feed_annotations(map);
    Ok(parse_items(items, annotations))
}

fn parse_items(items: Vec<Json>, annotations: FeedAnnotations) -> ODataResponse {
    if !items.iter().all(Json::is_object) {
        return ODataResponse::from_collection(items.into_iter().map(Value::from));
    }

    let entries = items
        .into_iter()
        .filter_map(|item| match item {
            Json::Object(map) => Some(parse_entry(map)),
            _ => None,
        })
        .collect();

    let feed = if annotations == FeedAnnotations::default() {
        AnnotatedFeed::new(entries)
    } else {
        AnnotatedFeed::with_annotations(entries, annotations)
    };
    ODataResponse::from_node(ResponseNode::from_feed(feed))
}

/// Nom d'annotation sans préfixe (`@odata.count`, `odata.count` -> `count`)
fn annotation_name(key: &str) -> Option<&str> {
    key.strip_prefix("@odata.")
        .or_else(|| key.strip_prefix("odata."))
        .or_else(|| key.strip_prefix("__"))
}

fn text(value: Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s),
        Json::Null => None,
        other => Some(other.to_string()),
    }
}

fn feed_annotations(map: Map<String, Json>) -> FeedAnnotations {
    let mut annotations = FeedAnnotations::default();

    for (key, value) in map {
        match annotation_name(&key) {
            Some("count") => {
                annotations.count = match &value {
                    Json::Number(n) => n.as_i64(),
                    // Le format V3 transmet le total sous forme de chaîne
                    Json::String(s) => s.parse().ok(),
                    _ => None,
                };
            }
            Some("nextLink") | Some("next") => annotations.next_page_link = text(value),
            Some("deltaLink") => annotations.delta_link = text(value),
            Some("id") => annotations.id = text(value),
            Some(_) => {}
            None if key.starts_with('@') => {
                annotations
                    .instance_annotations
                    .insert(key[1..].to_string(), Value::from(value));
            }
            None => {}
        }
    }

    annotations
}

fn parse_entry(map: Map<String, Json>) -> AnnotatedEntry {
    let mut data = Properties::new();
    let mut annotations = EntryAnnotations::default();

    for (key, value) in map {
        if key == "__metadata" {
            // V3 verbeux: {"uri": ..., "type": ..., "etag": ...}
            if let Json::Object(meta) = value {
                for (name, value) in meta {
                    apply_entry_annotation(&mut annotations, &name, value);
                }
            }
            continue;
        }

        match annotation_name(&key) {
            Some(name) => apply_entry_annotation(&mut annotations, name, value),
            None if key.starts_with('@') => {
                annotations
                    .instance_annotations
                    .insert(key[1..].to_string(), Value::from(value));
            }
            None => {
                data.insert(key, Value::from(value));
            }
        }
    }

    if annotations == EntryAnnotations::default() {
        AnnotatedEntry::new(data)
    } else {
        AnnotatedEntry::with_annotations(data, annotations)
    }
}

fn apply_entry_annotation(annotations: &mut EntryAnnotations, name: &str, value: Json) {
    let slot = match name {
        "id" | "uri" => &mut annotations.id,
        "type" => &mut annotations.type_name,
        "etag" => &mut annotations.etag,
        "readLink" => &mut annotations.read_link,
        "editLink" => &mut annotations.edit_link,
        "mediaReadLink" | "media_src" => &mut annotations.media_read_link,
        "mediaEditLink" | "edit_media" => &mut annotations.media_edit_link,
        "mediaContentType" | "content_type" => &mut annotations.media_content_type,
        // context, metadataEtag...
        _ => return,
    };
    *slot = text(value).map(|s| s.trim_start_matches('#').to_string());
}
