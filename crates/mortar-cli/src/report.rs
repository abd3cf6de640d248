//! Markdown report rendering.
//!
//! Reports are plain strings; the command layer decides where they
//! go. Tables follow the shape of the console output so the two stay
//! comparable.

use mortar_analysis::{MergePlan, ModuleResolver, RelocationReport};
use mortar_graph::{RelationCount, RelationCounts, RelationGraph, RelationModel};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Top-n nodes by a count column, ties broken by name.
pub fn top_by<'a, F>(counts: &'a RelationCounts, key: F, n: usize) -> Vec<(&'a str, RelationCount)>
where
    F: Fn(&RelationCount) -> usize,
{
    let mut entries: Vec<(&str, RelationCount)> =
        counts.iter().map(|(name, count)| (name, *count)).collect();
    entries.sort_by(|a, b| key(&b.1).cmp(&key(&a.1)).then_with(|| a.0.cmp(b.0)));
    entries.truncate(n);
    entries
}

fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "-".to_string();
    }
    format!("{:.2}%", part as f64 / whole as f64 * 100.0)
}

fn count_table(out: &mut String, title: &str, entries: &[(&str, RelationCount)]) {
    let _ = writeln!(out, "## {}\n", title);
    out.push_str("| Rank | Name | Direct Dependencies | All Dependencies | Direct Dependents | All Dependents |\n");
    out.push_str("|------|------|--------------------|------------------|-------------------|----------------|\n");
    for (i, (name, count)) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | `{}` | {} | {} | {} | {} |",
            i + 1,
            name,
            count.direct_primary,
            count.total_primary,
            count.direct_reverse,
            count.total_reverse
        );
    }
    out.push('\n');
}

/// Overview report: graph statistics and the top nodes per column.
pub fn render_overview(
    model: &RelationModel,
    module_counts: &RelationCounts,
    header_counts: &RelationCounts,
    top: usize,
) -> String {
    let mut out = String::new();
    out.push_str("# Dependency Analysis Report\n\n");

    for (title, stats) in [
        ("Module Relations", model.modules.stats()),
        ("Header Relations", model.headers.stats()),
    ] {
        let _ = writeln!(out, "## {}\n", title);
        out.push_str("| Metric | Value |\n|--------|-------|\n");
        let _ = writeln!(out, "| Nodes | {} |", stats.nodes);
        let _ = writeln!(out, "| Relations | {} |", stats.relations);
        let _ = writeln!(out, "| Primary | {} |", stats.primary);
        let _ = writeln!(out, "| Reverse | {} |", stats.reverse);
        let _ = writeln!(out, "| Conflicted | {} |\n", stats.conflict);
    }

    if model.modules.node_count() == 0 && model.headers.node_count() == 0 {
        out.push_str("No dependency data was loaded.\n");
        return out;
    }

    count_table(
        &mut out,
        "Top Modules by All Dependencies",
        &top_by(module_counts, |c| c.total_primary, top),
    );
    count_table(
        &mut out,
        "Top Modules by All Dependents",
        &top_by(module_counts, |c| c.total_reverse, top),
    );

    if !header_counts.is_empty() {
        count_table(
            &mut out,
            "Top Headers by All Dependencies",
            &top_by(header_counts, |c| c.total_primary, top),
        );
        count_table(
            &mut out,
            "Top Headers by All Dependents",
            &top_by(header_counts, |c| c.total_reverse, top),
        );
    }

    out
}

/// Merge plan report: overall impact plus one section per rank.
pub fn render_merge_plan(
    plan: &MergePlan,
    counts: &RelationCounts,
    graph: &RelationGraph,
) -> String {
    let mut out = String::new();
    out.push_str("# Module Merge Recommendations\n\n");
    let _ = writeln!(out, "**Candidate pool:** {} modules", plan.pool_size);
    let _ = writeln!(out, "**Groups evaluated:** {}", plan.candidates_evaluated);
    out.push_str("**Sorting:** by edge reduction (highest first)\n\n");

    out.push_str("## Overall Impact\n\n| Metric | Value |\n|--------|-------|\n");
    let _ = writeln!(out, "| Original total edges | {} |", plan.impact.original_edges);
    let _ = writeln!(out, "| Reduced total edges | {} |", plan.impact.reduced_edges);
    let _ = writeln!(
        out,
        "| Edge reduction | {} ({}) |",
        plan.impact.edge_reduction,
        percent(plan.impact.edge_reduction, plan.impact.original_edges)
    );
    let _ = writeln!(out, "| Modules merged | {} |\n", plan.impact.nodes_merged);
    out.push_str("---\n\n");

    if plan.recommendations.is_empty() {
        out.push_str("No merge candidates were found.\n");
        return out;
    }

    for (i, rec) in plan.recommendations.iter().enumerate() {
        let _ = writeln!(out, "## Rank {}: {}\n", i + 1, rec.group.join(" + "));

        out.push_str("### Edge Count Impact\n\n| Metric | Value |\n|--------|-------|\n");
        let _ = writeln!(out, "| Original edges (sum) | {} |", rec.edges.original_edges);
        let _ = writeln!(out, "| Internal edges (removed) | {} |", rec.edges.internal_edges);
        let _ = writeln!(out, "| Merged edges (unique) | {} |", rec.edges.merged_edges);
        let _ = writeln!(
            out,
            "| Edge reduction | {} ({}) |\n",
            rec.edges.edge_reduction,
            percent(rec.edges.edge_reduction, rec.edges.original_edges)
        );

        out.push_str("### Shared Relations\n\n| Metric | Primary | Reverse |\n|--------|---------|--------|\n");
        let _ = writeln!(
            out,
            "| Shared | {} | {} |",
            rec.damage.shared_primary, rec.damage.shared_reverse
        );
        let _ = writeln!(
            out,
            "| Unique | {} | {} |",
            rec.damage.unique_primary, rec.damage.unique_reverse
        );
        let _ = writeln!(
            out,
            "| Unshared | {} | {} |",
            rec.damage.unshared_primary, rec.damage.unshared_reverse
        );
        let _ = writeln!(
            out,
            "| Redundant | {} | {} |",
            rec.damage.redundant_primary, rec.damage.redundant_reverse
        );
        let _ = writeln!(
            out,
            "| Damage | {:.2} | {:.2} |\n",
            rec.damage.primary_damage, rec.damage.reverse_damage
        );
        let _ = writeln!(out, "**Total damage:** {:.2}\n", rec.damage.total_damage);

        out.push_str("### Individual Module Details\n\n");
        for member in &rec.group {
            let _ = writeln!(out, "**{}:**", member);
            let _ = writeln!(out, "- Edges from this module: {}", graph.degree(member));
            if let Some(count) = counts.get(member) {
                let _ = writeln!(
                    out,
                    "- Dependencies: direct = {}, all = {}",
                    count.direct_primary, count.total_primary
                );
                let _ = writeln!(
                    out,
                    "- Dependents: direct = {}, all = {}\n",
                    count.direct_reverse, count.total_reverse
                );
            } else {
                out.push_str("- No relation counts recorded\n\n");
            }
        }

        out.push_str("---\n\n");
    }

    out
}

fn notice_sections(out: &mut String, report: &RelocationReport, resolver: &ModuleResolver) {
    if report.conflicts.is_empty() && report.dangling.is_empty() {
        return;
    }

    out.push_str("## Notice: Dependency Issues Detected\n\n");
    out.push_str(
        "The following headers have dependency issues and are NOT included in the \
         relocation recommendations.\n\n",
    );

    if !report.conflicts.is_empty() {
        let _ = writeln!(
            out,
            "### Bidirectional Dependencies: {} headers\n",
            report.conflicts.len()
        );
        out.push_str(
            "These headers include each other. Move both members of a pair together, \
             or break the cycle before relocating.\n\n",
        );
        for (i, (header, partners)) in report.conflicts.iter().enumerate() {
            let module = resolver.resolve(header);
            let _ = writeln!(out, "{}. **`{}`** (module: `{}`)", i + 1, header, module);
            for partner in partners {
                let _ = writeln!(out, "   - `{}`", partner);
            }
        }
        out.push('\n');
    }

    if !report.dangling.is_empty() {
        let _ = writeln!(
            out,
            "### Non-Existent Header References: {} headers\n",
            report.dangling.len()
        );
        for (i, (header, missing)) in report.dangling.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. **`{}`** references non-existent `{}`",
                i + 1,
                header,
                missing
            );
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

/// Relocation report: notices first, then the ranked recommendations.
pub fn render_relocations(report: &RelocationReport, resolver: &ModuleResolver) -> String {
    let mut out = String::new();
    out.push_str("# Header Relocation Recommendations\n\n");

    notice_sections(&mut out, report, resolver);

    out.push_str("## Summary\n\n| Metric | Value |\n|--------|-------|\n");
    let _ = writeln!(
        out,
        "| Relocation recommendations | {} |",
        report.recommendations.len()
    );
    let _ = writeln!(
        out,
        "| Conflicted headers (notice only) | {} |",
        report.conflicts.len()
    );
    let _ = writeln!(
        out,
        "| Dangling references (notice only) | {} |\n",
        report.dangling.len()
    );

    if report.recommendations.is_empty() {
        out.push_str("No relocation candidates passed the thresholds.\n");
        return out;
    }

    out.push_str("## Recommendations\n\n");
    out.push_str("| Rank | Header | From | To | Internal | External | Target Connections | Improvement | Benefit |\n");
    out.push_str("|------|--------|------|----|----------|----------|--------------------|-------------|--------|\n");
    for (i, rec) in report.recommendations.iter().enumerate() {
        let improvement = if rec.improvement_ratio.is_finite() {
            format!("{:.1}x", rec.improvement_ratio)
        } else {
            "inf".to_string()
        };
        let _ = writeln!(
            out,
            "| {} | `{}` | {} | {} | {} | {} | {} | {} | {:.1} |",
            i + 1,
            rec.header,
            rec.current_module,
            rec.target_module,
            rec.current_internal,
            rec.current_external,
            rec.target_connections,
            improvement,
            rec.benefit_score
        );
    }
    out.push('\n');

    // Which modules shed and gain the most headers.
    let mut losing: BTreeMap<&str, usize> = BTreeMap::new();
    let mut gaining: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in &report.recommendations {
        *losing.entry(rec.current_module.as_str()).or_insert(0) += 1;
        *gaining.entry(rec.target_module.as_str()).or_insert(0) += 1;
    }

    for (title, table) in [
        ("Modules Losing Headers", losing),
        ("Modules Gaining Headers", gaining),
    ] {
        let _ = writeln!(out, "## {}\n", title);
        out.push_str("| Module | Headers |\n|--------|--------|\n");
        let mut rows: Vec<(&str, usize)> = table.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        for (module, count) in rows {
            let _ = writeln!(out, "| {} | {} |", module, count);
        }
        out.push('\n');
    }

    out
}

/// Standalone conflict list grouped by module.
pub fn render_conflicts(
    conflicts: &BTreeMap<String, Vec<String>>,
    resolver: &ModuleResolver,
) -> String {
    let mut out = String::new();
    out.push_str("# Headers with Bidirectional Dependencies\n\n");
    let _ = writeln!(
        out,
        "Total headers with bidirectional dependencies: **{}**\n",
        conflicts.len()
    );

    if conflicts.is_empty() {
        out.push_str("*None found*\n");
        return out;
    }

    let mut by_module: BTreeMap<String, Vec<(&String, &Vec<String>)>> = BTreeMap::new();
    for (header, partners) in conflicts {
        by_module
            .entry(resolver.resolve(header))
            .or_default()
            .push((header, partners));
    }

    let mut modules: Vec<(&String, &Vec<(&String, &Vec<String>)>)> = by_module.iter().collect();
    modules.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    out.push_str("## Headers by Module\n\n");
    for (module, headers) in &modules {
        let _ = writeln!(out, "### Module: `{}`\n", module);
        let _ = writeln!(out, "**{} header(s) with conflicts**\n", headers.len());
        for (header, partners) in headers.iter() {
            let _ = writeln!(out, "#### `{}`\n", header);
            let _ = writeln!(out, "Circular dependencies with {} header(s):", partners.len());
            for partner in partners.iter() {
                let _ = writeln!(out, "- `{}`", partner);
            }
            out.push('\n');
        }
    }

    out.push_str("## Statistics by Module\n\n| Module | Headers with Conflicts |\n|--------|------------------------|\n");
    for (module, headers) in &modules {
        let _ = writeln!(out, "| {} | {} |", module, headers.len());
    }
    out.push('\n');

    out
}
