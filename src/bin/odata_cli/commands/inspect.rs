use std::fs;
use std::path::Path;

use anyhow::Result;
use odata_query::{ODataResponse, Properties, Value};

use crate::context::Context;
use crate::payload::parse_payload;

/// Exécute la commande d'inspection d'une réponse
pub fn execute(context: &Context, path: &Path, annotations: bool) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let response = parse_payload(&text)?;
    show(context, &response, annotations)
}

/// Affiche les entrées d'une réponse et ses annotations de flux
pub fn show(context: &Context, response: &ODataResponse, annotations: bool) -> Result<()> {
    let formatter = context.formatter();

    if let Some(code) = response.status_code() {
        println!("{}", formatter.format_info(&format!("Code de statut: {}", code)));
        return Ok(());
    }

    let entries = response.as_entries(annotations).unwrap_or_default();
    if is_scalar(&entries) {
        let value: Value = response.as_scalar()?;
        println!("{}", formatter.format_value(&value)?);
        return Ok(());
    }

    println!("{}", formatter.format_entries(&entries)?);

    if let Some(feed_annotations) = response.feed().and_then(|feed| feed.annotations()) {
        if let Some(count) = feed_annotations.count {
            println!("{}", formatter.format_info(&format!("Total: {}", count)));
        }
        if let Some(next) = &feed_annotations.next_page_link {
            println!("{}", formatter.format_info(&format!("Page suivante: {}", next)));
        }
    }

    Ok(())
}

/// Une seule entrée à une seule valeur non structurée
fn is_scalar(entries: &[Properties]) -> bool {
    match entries {
        [entry] => entry.len() == 1 && entry.values().all(|v| !v.is_object()),
        _ => false,
    }
}
