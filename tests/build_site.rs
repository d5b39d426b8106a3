//! End-to-end builds of small sites on disk.

use docweave::diagnostics::{FindingKind, Severity};
use docweave::links::{LinkOrigin, ReferenceStatus};
use docweave::manifest::{self, NavbarTarget, SiteManifest};
use docweave::navigation::{NavigationNode, DEFAULT_SIDEBAR_ID};
use docweave::pipeline::{self, BuildError, BuildOutcome, Site};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn build(root: &Path) -> BuildOutcome {
    let site = Site::load(root, None).unwrap();
    pipeline::run(&site).unwrap()
}

fn labels(nodes: &[NavigationNode]) -> Vec<&str> {
    nodes
        .iter()
        .map(|n| match n {
            NavigationNode::Page { label, .. }
            | NavigationNode::Category { label, .. }
            | NavigationNode::Link { label, .. } => label.as_str(),
        })
        .collect()
}

/// Docs-only site with one markdown link and one route link, both broken.
fn broken_links_site(markdown_policy: &str, route_policy: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "docweave.toml",
        &format!(
            "on_broken_links = \"{route_policy}\"\non_broken_markdown_links = \"{markdown_policy}\"\n\n[blog]\nenabled = false\n"
        ),
    );
    write(
        tmp.path(),
        "docs/intro.md",
        "# Intro\n\n[old](./old-page.md) and [gone](/docs/gone).\n",
    );
    tmp
}

// =========================================================================
// Link policies
// =========================================================================

#[test]
fn warn_policy_reports_and_succeeds() {
    let tmp = broken_links_site("warn", "warn");
    let outcome = build(tmp.path());

    assert!(outcome.succeeded());
    assert_eq!(outcome.findings.count(Severity::Warning), 2);
    let manifest = outcome.manifest.unwrap();
    let broken: Vec<(&str, LinkOrigin)> = manifest
        .parts
        .references
        .problems()
        .map(|r| (r.raw.as_str(), r.origin))
        .collect();
    assert_eq!(
        broken,
        vec![("./old-page.md", LinkOrigin::Markdown), ("/docs/gone", LinkOrigin::Route)]
    );
}

#[test]
fn error_policy_fails_and_lists_every_finding() {
    let tmp = broken_links_site("warn", "error");
    let outcome = build(tmp.path());

    assert!(!outcome.succeeded());
    assert!(outcome.manifest.is_none());
    let kinds: Vec<(Severity, FindingKind)> =
        outcome.findings.iter().map(|f| (f.severity, f.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (Severity::Error, FindingKind::BrokenReference),
            (Severity::Warning, FindingKind::BrokenReference),
        ]
    );
}

#[test]
fn ignore_policy_drops_only_its_subset() {
    let tmp = broken_links_site("ignore", "warn");
    let manifest = build(tmp.path()).manifest.unwrap();
    let raws: Vec<&str> = manifest
        .parts
        .references
        .references
        .iter()
        .map(|r| r.raw.as_str())
        .collect();
    assert_eq!(raws, vec!["/docs/gone"]);
}

#[test]
fn markdown_links_follow_numbered_files() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "docweave.toml",
        "on_broken_markdown_links = \"error\"\n\n[blog]\nenabled = false\n",
    );
    write(tmp.path(), "docs/01-intro.md", "# Intro\n");
    write(
        tmp.path(),
        "docs/02-guides/setup.md",
        "# Setup\n\n[intro](../intro.md) and [again](../01-intro.md#intro)\n",
    );

    let outcome = build(tmp.path());
    assert!(outcome.succeeded(), "{:?}", outcome.findings);
    let manifest = outcome.manifest.unwrap();
    let targets: Vec<Option<&str>> = manifest
        .parts
        .references
        .references
        .iter()
        .map(|r| r.target.as_deref())
        .collect();
    assert_eq!(targets, vec![Some("docs/intro"), Some("docs/intro")]);
}

// =========================================================================
// Locales
// =========================================================================

#[test]
fn untranslated_page_falls_back_with_warning() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "docweave.toml", "[i18n]\nlocales = [\"en\", \"fr\"]\n");
    write(tmp.path(), "docs/intro.md", "# Intro\n");

    let outcome = build(tmp.path());
    assert!(outcome.succeeded());
    let warnings: Vec<String> = outcome
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::Untranslated)
        .map(|f| f.to_string())
        .collect();
    assert_eq!(
        warnings,
        vec!["warning [untranslated] (fr): docs/intro has no 'fr' translation; default-locale content is served"]
    );

    let manifest = outcome.manifest.unwrap();
    assert_eq!(manifest.parts.locales.fallbacks["fr"], vec!["docs/intro"]);
    assert_eq!(
        labels(&manifest.parts.navigation["fr"].sidebars[DEFAULT_SIDEBAR_ID]),
        vec!["Intro"]
    );
}

#[test]
fn unknown_default_locale_is_config_error() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "docweave.toml",
        "[i18n]\ndefault_locale = \"de\"\nlocales = [\"en\"]\n",
    );
    let err = Site::load(tmp.path(), None).unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
}

// =========================================================================
// Navigation
// =========================================================================

#[test]
fn explicit_sidebar_with_generated_section() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "sidebars.toml",
        r#"main = [
    "intro",
    { type = "category", label = "Reference", items = [{ type = "autogenerated", dir_name = "reference" }] },
    { type = "link", label = "Blog", href = "/blog" },
]
"#,
    );
    write(tmp.path(), "docs/intro.md", "# Intro\n");
    write(tmp.path(), "docs/reference/cli.md", "---\nsidebar_position: 2\n---\n# CLI\n");
    write(tmp.path(), "docs/reference/config.md", "---\nsidebar_position: 1\n---\n# Config\n");
    write(tmp.path(), "docs/reference/api.md", "# API\n");
    write(tmp.path(), "blog/2024-01-01-hello.md", "# Hello\n");

    let manifest = build(tmp.path()).manifest.unwrap();
    let main = &manifest.parts.navigation["en"].sidebars["main"];
    assert_eq!(labels(main), vec!["Intro", "Reference", "Blog"]);
    match &main[1] {
        NavigationNode::Category { items, .. } => {
            assert_eq!(labels(items), vec!["Config", "CLI", "API"]);
        }
        other => panic!("expected category, got {other:?}"),
    }
    assert_eq!(labels(&manifest.parts.navigation["en"].blog), vec!["Hello"]);
}

#[test]
fn navbar_points_at_sidebar() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "docweave.toml",
        r#"
[[navbar.items]]
label = "Tutorial"
sidebar_id = "defaultSidebar"

[[navbar.items]]
label = "Blog"
to = "/blog/hello"
"#,
    );
    write(tmp.path(), "docs/01-start.md", "# Start\n");
    write(tmp.path(), "blog/2024-01-01-hello.md", "# Hello\n");

    let manifest = build(tmp.path()).manifest.unwrap();
    let navbar = &manifest.parts.navbar;
    assert_eq!(navbar.len(), 2);
    match &navbar[0].target {
        NavbarTarget::Sidebar { first_doc, .. } => {
            assert_eq!(first_doc["en"], "docs/start");
        }
        other => panic!("expected sidebar target, got {other:?}"),
    }
    assert_eq!(manifest.parts.references.count(ReferenceStatus::Resolved), 1);
}

// =========================================================================
// Determinism and output
// =========================================================================

#[test]
fn manifest_is_identical_across_runs() {
    let tmp = TempDir::new().unwrap();
    for name in ["zeta", "alpha", "mid", "beta"] {
        write(
            tmp.path(),
            &format!("docs/{name}.md"),
            &format!("# {name}\n\n[next](/docs/alpha)\n"),
        );
    }
    let out_a = tmp.path().join("out-a");
    let out_b = tmp.path().join("out-b");
    let a = manifest::write_manifest(&build(tmp.path()).manifest.unwrap(), &out_a).unwrap();
    let b = manifest::write_manifest(&build(tmp.path()).manifest.unwrap(), &out_b).unwrap();

    let a = fs::read_to_string(a).unwrap();
    let b = fs::read_to_string(b).unwrap();
    assert_eq!(a, b);

    let parsed: SiteManifest = serde_json::from_str(&a).unwrap();
    assert_eq!(parsed.fingerprint.len(), 64);
}

#[test]
fn duplicate_identifier_stops_build() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "docs/01-setup.md", "# Setup\n");
    write(tmp.path(), "docs/02-setup.md", "# Setup again\n");

    let site = Site::load(tmp.path(), None).unwrap();
    let err = pipeline::run(&site).unwrap_err();
    assert!(err.to_string().contains("docs/setup"), "{err}");
}

#[test]
fn drafts_are_skipped_unless_included() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "docs/intro.md", "# Intro\n");
    write(tmp.path(), "docs/wip.md", "---\ndraft: true\n---\n# WIP\n");

    let outcome = build(tmp.path());
    assert_eq!(outcome.stats.items_by_locale["en"], 1);

    write(tmp.path(), "docweave.toml", "[build]\ninclude_drafts = true\n");
    let outcome = build(tmp.path());
    assert_eq!(outcome.stats.items_by_locale["en"], 2);
}
