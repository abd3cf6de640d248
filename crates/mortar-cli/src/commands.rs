//! CLI command implementations.

use crate::ingest;
use crate::report;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mortar_analysis::{
    analyze_boundaries, module_summaries, recommend_merges, recommend_relocations, MergeConfig,
    ModuleResolver, RelocationThresholds,
};
use mortar_graph::{GraphBuilder, RelationCounts, RelationModel};
use std::fs;
use std::path::Path;
use std::time::Duration;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Loads the dependency export and builds the relation model.
fn load_model(csv: &Path) -> Result<RelationModel> {
    let records = ingest::read_records(csv)?;
    println!(
        "{} Loaded {} records from {}",
        "✓".green(),
        records.len().to_string().cyan(),
        csv.display()
    );

    let mut builder = GraphBuilder::new();
    builder.add_records(&records);
    if builder.skipped() > 0 {
        println!(
            "{} Skipped {} malformed records",
            "⚠".yellow(),
            builder.skipped()
        );
    }

    let model = builder.build();
    println!(
        "{} Built relation graphs ({} modules, {} headers)",
        "✓".green(),
        model.modules.node_count().to_string().cyan(),
        model.headers.node_count().to_string().cyan()
    );

    Ok(model)
}

fn write_report(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    println!("{} Report written to {}", "✓".green(), path.display());
    Ok(())
}

/// Show graph statistics and the most connected nodes.
pub fn stats(csv: &Path, top: usize, output: Option<&Path>) -> Result<()> {
    let model = load_model(csv)?;

    let module_counts = RelationCounts::compute(&model.modules);
    let header_counts = RelationCounts::compute(&model.headers);

    for (title, stats) in [
        ("Module relations", model.modules.stats()),
        ("Header relations", model.headers.stats()),
    ] {
        println!();
        println!("{}", title.cyan().bold());
        println!("  {} {}", "Nodes:".dimmed(), stats.nodes);
        println!("  {} {}", "Relations:".dimmed(), stats.relations);
        println!(
            "  {} primary {}, reverse {}, conflicted {}",
            "Signs:".dimmed(),
            stats.primary,
            stats.reverse,
            stats.conflict
        );
    }

    if module_counts.is_empty() {
        println!("\n{} No module relations to rank", "⚠".yellow());
    } else {
        println!("\n{}", "Top modules by all dependencies:".cyan());
        for (name, count) in report::top_by(&module_counts, |c| c.total_primary, top) {
            println!(
                "  {} direct={}, all={}",
                name.cyan(),
                count.direct_primary,
                count.total_primary
            );
        }

        println!("\n{}", "Top modules by all dependents:".cyan());
        for (name, count) in report::top_by(&module_counts, |c| c.total_reverse, top) {
            println!(
                "  {} direct={}, all={}",
                name.cyan(),
                count.direct_reverse,
                count.total_reverse
            );
        }
    }

    if let Some(path) = output {
        let rendered = report::render_overview(&model, &module_counts, &header_counts, top);
        write_report(path, &rendered)?;
    }

    Ok(())
}

/// Query the relation between two modules or two headers.
pub fn query(csv: &Path, a: &str, b: &str, headers: bool) -> Result<()> {
    let model = load_model(csv)?;
    let graph = if headers { &model.headers } else { &model.modules };

    println!();
    match graph.relation(a, b) {
        Some(relation) => println!(
            "{} -> {} = {} ({})",
            a.cyan(),
            b.cyan(),
            relation.value(),
            relation
        ),
        None => println!("{} -> {}: {}", a.cyan(), b.cyan(), "no relation recorded".dimmed()),
    }
    match graph.relation(b, a) {
        Some(relation) => println!(
            "{} -> {} = {} ({})",
            b.cyan(),
            a.cyan(),
            relation.value(),
            relation
        ),
        None => println!("{} -> {}: {}", b.cyan(), a.cyan(), "no relation recorded".dimmed()),
    }

    Ok(())
}

/// Compute and print the merge plan.
pub fn merge(
    csv: &Path,
    config: MergeConfig,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let model = load_model(csv)?;
    let counts = RelationCounts::compute(&model.modules);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!(
        "Scoring merge candidates (sizes {}-{})...",
        config.min_size, config.max_size
    ));

    let plan = recommend_merges(&model.modules, &counts, &config);

    spinner.finish_and_clear();
    println!(
        "{} Evaluated {} candidate groups from a pool of {}",
        "✓".green(),
        plan.candidates_evaluated.to_string().cyan(),
        plan.pool_size
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if plan.recommendations.is_empty() {
        println!("{} No merge candidates found", "⚠".yellow());
        return Ok(());
    }

    println!();
    println!("{}", "Overall impact:".cyan().bold());
    println!("  Original total edges: {}", plan.impact.original_edges);
    println!("  Reduced total edges:  {}", plan.impact.reduced_edges);
    println!("  Edge reduction:       {}", plan.impact.edge_reduction);
    println!("  Modules merged:       {}", plan.impact.nodes_merged);
    println!();

    for (i, rec) in plan.recommendations.iter().enumerate() {
        println!(
            "Rank {}: {} ({} modules)",
            (i + 1).to_string().bold(),
            rec.group.join(" + ").cyan(),
            rec.group.len()
        );
        println!(
            "  Edges: {} -> {} (saved {})",
            rec.edges.original_edges,
            rec.edges.merged_edges,
            rec.edges.edge_reduction.to_string().green()
        );
        println!(
            "  Shared: primary={}, reverse={} | Damage={:.2}",
            rec.damage.shared_primary, rec.damage.shared_reverse, rec.damage.total_damage
        );
        println!();
    }

    if let Some(path) = output {
        let rendered = report::render_merge_plan(&plan, &counts, &model.modules);
        write_report(path, &rendered)?;
    }

    Ok(())
}

/// Compute and print relocation recommendations.
pub fn relocate(
    csv: &Path,
    root: &str,
    thresholds: RelocationThresholds,
    top: usize,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let model = load_model(csv)?;
    let resolver = ModuleResolver::new(root);

    let boundaries = analyze_boundaries(&model.headers, &resolver);
    let relocations = recommend_relocations(&boundaries, &model, &thresholds);

    if json {
        println!("{}", serde_json::to_string_pretty(&relocations)?);
        return Ok(());
    }

    if !relocations.conflicts.is_empty() || !relocations.dangling.is_empty() {
        println!();
        println!(
            "{} Dependency issues detected (excluded from recommendations):",
            "⚠".yellow()
        );
        if !relocations.conflicts.is_empty() {
            println!(
                "  {} headers with bidirectional dependencies",
                relocations.conflicts.len()
            );
        }
        if !relocations.dangling.is_empty() {
            println!(
                "  {} headers referencing non-existent headers",
                relocations.dangling.len()
            );
        }
    }

    if relocations.recommendations.is_empty() {
        println!("\n{} No relocation candidates passed the thresholds", "⚠".yellow());
    } else {
        println!(
            "\n{} relocation candidates:",
            relocations.recommendations.len().to_string().cyan()
        );
        for (i, rec) in relocations.recommendations.iter().take(top).enumerate() {
            let improvement = if rec.improvement_ratio.is_finite() {
                format!("{:.1}x more connections to target", rec.improvement_ratio)
            } else {
                "no internal connections at all".to_string()
            };
            println!();
            println!("{}. {}", i + 1, rec.header.cyan());
            println!(
                "   {} -> {} ({} of {} relations point there)",
                rec.current_module,
                rec.target_module.green(),
                rec.target_connections,
                rec.total_connections
            );
            println!(
                "   external ratio {:.1}% -> {:.1}% | {} | benefit {:.1}",
                rec.current_external_ratio * 100.0,
                rec.new_external_ratio * 100.0,
                improvement,
                rec.benefit_score
            );
        }
        if relocations.recommendations.len() > top {
            println!(
                "\n  ... and {} more",
                relocations.recommendations.len() - top
            );
        }
    }

    if let Some(path) = output {
        let rendered = report::render_relocations(&relocations, &resolver);
        write_report(path, &rendered)?;
    }

    Ok(())
}

/// List headers with bidirectional dependencies.
pub fn conflicts(csv: &Path, root: &str, output: Option<&Path>) -> Result<()> {
    let model = load_model(csv)?;
    let resolver = ModuleResolver::new(root);

    if model.conflicts.is_empty() {
        println!("{} No bidirectional dependencies found", "✓".green());
    } else {
        println!(
            "\n{} headers with bidirectional dependencies:",
            model.conflicts.len().to_string().yellow()
        );
        for (header, partners) in &model.conflicts {
            println!(
                "  {} ({}): {} conflict(s)",
                header.cyan(),
                resolver.resolve(header),
                partners.len()
            );
        }
    }

    if let Some(path) = output {
        let rendered = report::render_conflicts(&model.conflicts, &resolver);
        write_report(path, &rendered)?;
    }

    Ok(())
}

/// Show per-module boundary summaries.
pub fn boundaries(csv: &Path, root: &str, top: usize) -> Result<()> {
    let model = load_model(csv)?;
    let resolver = ModuleResolver::new(root);

    let boundaries = analyze_boundaries(&model.headers, &resolver);
    let summaries = module_summaries(&boundaries);

    if summaries.is_empty() {
        println!("{} No header relations to analyze", "⚠".yellow());
        return Ok(());
    }

    println!("\n{}", "Module boundaries (by external ratio):".cyan().bold());
    println!(
        "{:<24} {:>8} {:>10} {:>10} {:>10}",
        "Module", "Headers", "Internal", "External", "Ext Ratio"
    );
    for summary in summaries.iter().take(top) {
        println!(
            "{:<24} {:>8} {:>10} {:>10} {:>9.1}%",
            summary.module,
            summary.header_count,
            summary.total_internal,
            summary.total_external,
            summary.external_ratio * 100.0
        );
    }

    Ok(())
}
