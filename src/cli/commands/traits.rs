//! `traits`: catalog listing and detail view.

use serde::Serialize;

use crate::catalog::{Trait, TraitCatalog};
use crate::cli::args::{OutputFormat, TraitsArgs};
use crate::cli::commands::load_config;
use crate::error::{LabError, SessionError};
use crate::risk::{GateDecision, RiskPolicy};

#[derive(Serialize)]
struct TraitView<'a> {
    id: &'a str,
    #[serde(flatten)]
    entry: &'a Trait,
    insertion: Option<&'a str>,
    risk_gate: GateDecision,
}

impl<'a> TraitView<'a> {
    fn new(id: &'a str, entry: &'a Trait, policy: &RiskPolicy) -> Self {
        Self {
            id,
            entry,
            insertion: entry.insertion_label(),
            risk_gate: policy.evaluate(entry.metrics.off_target_risk, entry.metrics.mutation_rate),
        }
    }
}

/// Lists the catalog, or shows one trait with `--id`.
///
/// # Errors
///
/// - [`LabError::Config`] if the configuration cannot be loaded
/// - [`LabError::Session`] if `--id` names an unknown trait
/// - [`LabError::Json`] if JSON rendering fails
pub fn run(args: &TraitsArgs) -> Result<(), LabError> {
    let config = load_config(args.config.as_deref())?;
    let catalog = config.catalog();
    let policy = config.risk;

    if let Some(id) = &args.id {
        let entry = lookup(&catalog, id)?;
        let view = TraitView::new(id, entry, &policy);
        match args.format {
            OutputFormat::Human => print_detail(&view),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        }
        return Ok(());
    }

    let views: Vec<TraitView<'_>> = catalog
        .iter()
        .map(|(id, entry)| TraitView::new(id, entry, &policy))
        .collect();
    match args.format {
        OutputFormat::Human => print_table(&views),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&views)?),
    }
    Ok(())
}

fn lookup<'a>(catalog: &'a TraitCatalog, id: &str) -> Result<&'a Trait, SessionError> {
    catalog.get(id).ok_or_else(|| SessionError::UnknownTrait {
        id: id.to_string(),
        suggestion: catalog.suggest(id),
    })
}

fn gate_note(view: &TraitView<'_>) -> &'static str {
    match view.risk_gate {
        GateDecision::Allowed => "",
        GateDecision::Blocked => "  (needs confirmation)",
    }
}

fn print_table(views: &[TraitView<'_>]) {
    println!(
        "{:<22} {:<34} {:<8} {:>7} {:>10} {:>8}",
        "ID", "NAME", "LEVEL", "SUCCESS", "OFF-TARGET", "MUTATION"
    );
    for view in views {
        let m = view.entry.metrics;
        println!(
            "{:<22} {:<34} {:<8} {:>6}% {:>9}% {:>7}%{}",
            view.id,
            view.entry.name,
            view.entry.difficulty,
            m.success_rate,
            m.off_target_risk,
            m.mutation_rate,
            gate_note(view)
        );
    }
}

fn print_detail(view: &TraitView<'_>) {
    let t = view.entry;
    println!("{} ({})", t.name, view.id);
    println!("  organism:     {}", t.organism);
    println!("  target gene:  {}", t.target_gene);
    println!("  mechanism:    {}", t.mechanism);
    println!("  difficulty:   {}", t.difficulty);
    println!(
        "  metrics:      success {}% | off-target {}% | mutation {}%{}",
        t.metrics.success_rate,
        t.metrics.off_target_risk,
        t.metrics.mutation_rate,
        gate_note(view)
    );
    println!("  phenotype:    {}", t.phenotype);
    println!("  change:       {}", t.function_change);
    println!("  DNA before:   {}", t.dna_original);
    println!("  DNA after:    {}", t.dna_edited);
    if !t.benefits.is_empty() {
        println!("  benefits:");
        for b in &t.benefits {
            println!("    + {b}");
        }
    }
    if !t.risks.is_empty() {
        println!("  risks:");
        for r in &t.risks {
            println!("    - {r}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_catalog;

    #[test]
    fn lookup_suggests_close_id() {
        let catalog = builtin_catalog();
        let err = lookup(&catalog, "protein-productoin").unwrap_err();
        assert_eq!(
            err,
            SessionError::UnknownTrait {
                id: "protein-productoin".to_string(),
                suggestion: Some("protein-production".to_string()),
            }
        );
    }

    #[test]
    fn view_flags_blocked_traits() {
        let catalog = builtin_catalog();
        let policy = RiskPolicy::default();
        let drought = catalog.get("drought-tolerance").unwrap();
        let view = TraitView::new("drought-tolerance", drought, &policy);
        assert_eq!(view.risk_gate, GateDecision::Blocked);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "drought-tolerance");
        assert_eq!(json["off_target_risk"], 22);
        assert_eq!(json["insertion"], "DREB1A-CASSETTE");
        assert_eq!(json["risk_gate"], "blocked");
    }
}
