use anyhow::Result;
use log::debug;
use odata_query::{parse_expression, ExpressionContext};

use crate::context::Context;

/// Compile une expression dans le contexte d'un ensemble d'entités.
///
/// Sans ensemble d'entités, les noms sont émis tels quels.
pub fn compile(
    context: &Context,
    entity_set: Option<&str>,
    expression: &str,
    query_option: bool,
) -> Result<String> {
    let session = context.session()?;

    // Analyser l'expression
    let expr = parse_expression(expression)?;
    debug!("Arbre analysé: {:?}", expr);

    let ctx = if query_option {
        ExpressionContext::query_option()
    } else {
        match entity_set {
            Some(set) => session.context_for(set)?,
            None => ExpressionContext::new(),
        }
    };

    Ok(session.compiler().compile(&expr, &ctx)?)
}

/// Exécute la commande de compilation
pub fn execute(context: &Context, entity_set: Option<&str>, expression: &str, query_option: bool) -> Result<()> {
    let compiled = compile(context, entity_set, expression, query_option)?;

    // Formater et afficher le résultat
    println!("{}", context.formatter().format_query(&compiled));

    Ok(())
}
