//! Shared test utilities for the docweave test suite.
//!
//! Provides in-memory item builders, on-disk site fixtures, and navigation
//! tree assertions that work with the pipeline's data structures
//! (`ContentItem`, `ContentInventory`, `NavigationTree`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_site();
//! write(tmp.path(), "docs/guides/setup.md", "# Setup\n");
//!
//! let inventory = inventory_of(vec![item("docs/intro", "en")]);
//! assert_nav_shape(&tree, "docs", &[
//!     ("intro", &[]),
//!     ("Guides", &["setup"]),
//! ]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::inventory::{ContentInventory, FolderMeta};
use crate::navigation::{NavigationNode, NavigationTree};
use crate::types::{ContentItem, ContentKind, ContentRoot};

// =========================================================================
// In-memory items
// =========================================================================

/// A minimal item: title is the last identifier segment, permalink is `/` + id.
pub fn item(id: &str, locale: &str) -> ContentItem {
    let kind = ContentKind::of_id(id).unwrap_or(ContentKind::Docs);
    let local = id
        .strip_prefix(kind.prefix())
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(id);
    ContentItem {
        id: id.to_string(),
        kind,
        locale: locale.to_string(),
        title: local.rsplit('/').next().unwrap_or(local).to_string(),
        source_path: format!("{local}.md"),
        permalink: format!("/{id}"),
        references: vec![],
        headings: vec![],
        sidebar_position: None,
        sidebar_label: None,
        date: None,
    }
}

/// An item with an explicit sidebar position.
pub fn positioned(id: &str, locale: &str, position: f64) -> ContentItem {
    ContentItem {
        sidebar_position: Some(position),
        ..item(id, locale)
    }
}

/// An item whose body links to `targets`, in order.
pub fn linking(id: &str, locale: &str, targets: &[&str]) -> ContentItem {
    ContentItem {
        references: targets.iter().map(|t| t.to_string()).collect(),
        ..item(id, locale)
    }
}

/// Folder metadata as read from `_category_.yml`.
pub fn folder(id: &str, locale: &str, label: &str, position: Option<f64>) -> FolderMeta {
    FolderMeta {
        id: id.to_string(),
        locale: locale.to_string(),
        label: label.to_string(),
        position,
        collapsed: None,
    }
}

/// Case-insensitive inventory of `items`. Panics on duplicates.
pub fn inventory_of(items: Vec<ContentItem>) -> ContentInventory {
    inventory_with_folders(items, vec![])
}

pub fn inventory_with_folders(items: Vec<ContentItem>, folders: Vec<FolderMeta>) -> ContentInventory {
    ContentInventory::from_items(items, folders, false).unwrap()
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write `content` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn docs_root(site: &Path, locale: &str) -> ContentRoot {
    ContentRoot {
        kind: ContentKind::Docs,
        path: site.join("docs"),
        locale: locale.to_string(),
        route_base: "/docs".to_string(),
    }
}

pub fn blog_root(site: &Path, locale: &str) -> ContentRoot {
    ContentRoot {
        kind: ContentKind::Blog,
        path: site.join("blog"),
        locale: locale.to_string(),
        route_base: "/blog".to_string(),
    }
}

/// A small bilingual site in a temp directory.
///
/// ```text
/// docweave.toml          en + fr, markdown links warn
/// docs/intro.md          links to guides/setup.md and /docs/guides/deploy
/// docs/02-guides/        _category_.yml "Guides", setup.md, deploy.md
/// blog/2024-05-01-launch.md
/// i18n/fr/docs/intro.md  translation of intro only
/// ```
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(
        root,
        "docweave.toml",
        r#"title = "Fixture"
url = "https://fixture.dev"
on_broken_markdown_links = "warn"

[i18n]
locales = ["en", "fr"]
"#,
    );
    write(
        root,
        "docs/intro.md",
        "---\nsidebar_position: 1\n---\n# Introduction\n\nSee [setup](02-guides/setup.md) and [deploy](/docs/guides/deploy#steps).\n",
    );
    write(root, "docs/02-guides/_category_.yml", "label: Guides\n");
    write(root, "docs/02-guides/setup.md", "# Setup\n\n## Install\n");
    write(root, "docs/02-guides/deploy.md", "# Deploy\n\n## Steps\n");
    write(
        root,
        "blog/2024-05-01-launch.md",
        "---\ntitle: Launch\n---\nRead the [intro](/docs/intro).\n",
    );
    write(root, "i18n/fr/docs/intro.md", "# Présentation\n\nVoir [déployer](/fr/docs/guides/deploy).\n");
    tmp
}

// =========================================================================
// Navigation helpers
// =========================================================================

fn node_label(node: &NavigationNode) -> &str {
    match node {
        NavigationNode::Page { label, .. }
        | NavigationNode::Category { label, .. }
        | NavigationNode::Link { label, .. } => label,
    }
}

fn sidebar<'a>(tree: &'a NavigationTree, sidebar_id: &str) -> &'a [NavigationNode] {
    tree.sidebars.get(sidebar_id).unwrap_or_else(|| {
        let ids: Vec<&String> = tree.sidebars.keys().collect();
        panic!("sidebar '{sidebar_id}' not found. Available: {ids:?}")
    })
}

/// Top-level labels of a sidebar in order. Panics if the sidebar is missing.
pub fn sidebar_labels<'a>(tree: &'a NavigationTree, sidebar_id: &str) -> Vec<&'a str> {
    sidebar(tree, sidebar_id).iter().map(node_label).collect()
}

/// Child labels under a top-level category. Panics if not found.
pub fn category_labels<'a>(tree: &'a NavigationTree, sidebar_id: &str, category: &str) -> Vec<&'a str> {
    sidebar(tree, sidebar_id)
        .iter()
        .find_map(|n| match n {
            NavigationNode::Category { label, items, .. } if label == category => {
                Some(items.iter().map(node_label).collect())
            }
            _ => None,
        })
        .unwrap_or_else(|| {
            let labels = sidebar_labels(tree, sidebar_id);
            panic!("category '{category}' not found. Available: {labels:?}")
        })
}

/// Assert that a sidebar matches an expected shape.
///
/// Each entry is `(label, children)`. Use `&[]` for pages and links.
pub fn assert_nav_shape(tree: &NavigationTree, sidebar_id: &str, expected: &[(&str, &[&str])]) {
    let actual = sidebar_labels(tree, sidebar_id);
    let expected_labels: Vec<&str> = expected.iter().map(|(l, _)| *l).collect();
    assert_eq!(actual, expected_labels, "sidebar top-level labels mismatch");

    for (label, children) in expected {
        if children.is_empty() {
            continue;
        }
        let actual_children = category_labels(tree, sidebar_id, label);
        assert_eq!(
            actual_children,
            children.to_vec(),
            "children of '{label}' mismatch"
        );
    }
}
