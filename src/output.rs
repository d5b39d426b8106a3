//! CLI output formatting for the build commands.
//!
//! # Information-First Display
//!
//! Every entity (page, category, finding) leads with its semantic identity:
//! positional index and title. Filesystem paths and routes follow as
//! indented context lines, so the output reads as a content inventory while
//! still letting users trace entries back to specific files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Content (en)
//! 001 Introduction
//!     Source: docs/intro.md
//!     Route: /docs/intro
//!
//! Translations
//!     fr: 1 translated, 3 from en
//! ```
//!
//! ## Navigation
//!
//! ```text
//! Sidebar defaultSidebar (en)
//! 001 Introduction → /docs/intro
//! 002 Guides
//!     001 Deploy → /docs/guides/deploy
//! ```
//!
//! ## Summary
//!
//! ```text
//! Findings
//!     error [broken link] (en): docs/a -> /docs/missing (route)
//!
//! Links: 12 checked, 1 broken, 0 ambiguous
//! Build failed: 1 error, 3 warnings
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::diagnostics::{Findings, Severity};
use crate::inventory::ContentInventory;
use crate::locale::PerLocaleInventory;
use crate::navigation::{NavigationNode, NavigationTree};
use crate::pipeline::BuildOutcome;
use crate::types::ContentKind;
use std::collections::BTreeMap;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the inventory, grouped by locale, plus a translation summary.
pub fn format_scan_output(inventory: &ContentInventory, resolved: &PerLocaleInventory) -> Vec<String> {
    let mut lines = Vec::new();
    let mut locales: Vec<&String> = resolved.partitions.keys().collect();
    locales.sort_by_key(|l| **l != resolved.default_locale);

    for locale in locales {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("Content ({locale})"));
        for (i, item) in inventory.in_locale(locale).enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), item.title));
            lines.push(format!(
                "    Source: {}/{}",
                kind_dir(item.kind),
                item.source_path
            ));
            lines.push(format!("    Route: {}", item.permalink));
        }
    }

    if !resolved.fallbacks.is_empty() {
        lines.push(String::new());
        lines.push("Translations".to_string());
        for (locale, fallback) in &resolved.fallbacks {
            let translated = resolved.partitions.get(locale).map_or(0, Vec::len);
            lines.push(format!(
                "    {locale}: {translated} translated, {} from {}",
                fallback.len(),
                resolved.default_locale
            ));
        }
    }
    lines
}

fn kind_dir(kind: ContentKind) -> &'static str {
    kind.prefix()
}

/// Print scan output to stdout.
pub fn print_scan_output(inventory: &ContentInventory, resolved: &PerLocaleInventory) {
    for line in format_scan_output(inventory, resolved) {
        println!("{}", line);
    }
}

// ============================================================================
// Navigation output
// ============================================================================

fn walk_nodes(nodes: &[NavigationNode], depth: usize, lines: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let prefix = format!("{}{}", indent(depth), format_index(i + 1));
        match node {
            NavigationNode::Page { label, permalink, .. } => {
                lines.push(format!("{prefix} {label} → {permalink}"));
            }
            NavigationNode::Link { label, href } => {
                lines.push(format!("{prefix} {label} → {href} (link)"));
            }
            NavigationNode::Category { label, items, .. } => {
                lines.push(format!("{prefix} {label}"));
                walk_nodes(items, depth + 1, lines);
            }
        }
    }
}

/// Format the sidebars of every locale.
pub fn format_navigation(navigation: &BTreeMap<String, NavigationTree>) -> Vec<String> {
    let mut lines = Vec::new();
    for (locale, tree) in navigation {
        for (sidebar, nodes) in &tree.sidebars {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("Sidebar {sidebar} ({locale})"));
            walk_nodes(nodes, 0, &mut lines);
        }
        if !tree.blog.is_empty() {
            lines.push(String::new());
            lines.push(format!("Recent posts ({locale})"));
            walk_nodes(&tree.blog, 0, &mut lines);
        }
    }
    lines
}

/// Print the sidebars of every locale to stdout.
pub fn print_navigation(navigation: &BTreeMap<String, NavigationTree>) {
    for line in format_navigation(navigation) {
        println!("{}", line);
    }
}

// ============================================================================
// Findings and summary
// ============================================================================

/// Format every finding, errors first.
pub fn format_findings(findings: &Findings) -> Vec<String> {
    if findings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Findings".to_string()];
    lines.extend(findings.iter().map(|f| format!("    {f}")));
    lines
}

/// Print every finding to stdout.
pub fn print_findings(findings: &Findings) {
    for line in format_findings(findings) {
        println!("{}", line);
    }
}

/// Format the closing summary of a build or check.
pub fn format_summary(outcome: &BuildOutcome) -> Vec<String> {
    let mut lines = format_findings(&outcome.findings);
    if !lines.is_empty() {
        lines.push(String::new());
    }
    let stats = &outcome.stats;
    let items: usize = stats.items_by_locale.values().sum();
    lines.push(format!(
        "Content: {} in {}, {}",
        plural(items, "item"),
        plural(stats.items_by_locale.len(), "locale"),
        plural(stats.sidebars, "sidebar")
    ));
    lines.push(format!(
        "Links: {} checked, {} broken, {} ambiguous",
        stats.references, stats.broken, stats.ambiguous
    ));

    let errors = plural(outcome.findings.count(Severity::Error), "error");
    let warnings = plural(outcome.findings.count(Severity::Warning), "warning");
    if outcome.succeeded() {
        lines.push(format!("Build succeeded: {warnings}"));
    } else {
        lines.push(format!("Build failed: {errors}, {warnings}"));
    }
    lines
}

/// Print the build summary to stdout.
pub fn print_summary(outcome: &BuildOutcome) {
    for line in format_summary(outcome) {
        println!("{}", line);
    }
}
