//! Sidebar and navigation tree construction.
//!
//! Turns a sidebar layout plus the docs of one locale into an ordered tree
//! of categories, pages and links. A layout is either written out in
//! `sidebars.toml` or generated from the folder structure.
//!
//! ## Sidebar File
//!
//! Each top-level key is a sidebar id holding a list of entries. A bare
//! string is shorthand for a doc entry:
//!
//! ```toml
//! tutorialSidebar = [
//!     "intro",
//!     { type = "category", label = "Guides", items = ["guides/setup"] },
//!     { type = "autogenerated", dir_name = "reference" },
//!     { type = "link", label = "Changelog", href = "/blog" },
//! ]
//! ```
//!
//! ## Auto-Generation
//!
//! Folders become categories, files become pages. Within a folder entries
//! with a position (front matter `sidebar_position`, `_category_` metadata
//! or a number prefix) come first, ordered by position and then by name;
//! the rest follow in name order. A folder's `index.md` becomes the
//! category's landing page instead of a child.
//!
//! ## Invariants
//!
//! A doc appears at most once per sidebar and category labels are unique
//! among siblings; violations are fatal. Entries naming unknown docs are
//! dropped and reported so the caller can apply its sidebar policy.

use crate::inventory::{ContentInventory, FolderMeta};
use crate::locale::{LocaleSet, effective_items};
use crate::naming::{collision_key, normalize_path, parse_entry_name};
use crate::types::{ContentItem, ContentKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Sidebar id used when no sidebar file exists.
pub const DEFAULT_SIDEBAR_ID: &str = "defaultSidebar";

#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("Failed to read sidebar file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid sidebar file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum NavigationError {
    #[error("'{id}' appears more than once in sidebar '{sidebar}'")]
    DuplicateSidebarEntry { sidebar: String, id: String },
    #[error("Duplicate category label '{label}' in sidebar '{sidebar}'")]
    DuplicateCategoryLabel { sidebar: String, label: String },
}

// ============================================================================
// Sidebar layout
// ============================================================================

/// One entry of a sidebar layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "EntrySyntax")]
pub enum SidebarEntry {
    Doc {
        id: String,
        label: Option<String>,
    },
    Category {
        label: String,
        items: Vec<SidebarEntry>,
        collapsed: bool,
        /// Doc shown when the category itself is clicked.
        link: Option<String>,
    },
    Link {
        label: String,
        href: String,
    },
    /// Splice in the folder tree under `dir_name` (`.` = docs root).
    Autogenerated {
        dir_name: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntrySyntax {
    Short(String),
    Full(TaggedEntry),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedEntry {
    Doc {
        id: String,
        #[serde(default)]
        label: Option<String>,
    },
    Category {
        label: String,
        #[serde(default)]
        items: Vec<SidebarEntry>,
        #[serde(default = "default_collapsed")]
        collapsed: bool,
        #[serde(default)]
        link: Option<String>,
    },
    Link {
        label: String,
        href: String,
    },
    Autogenerated {
        #[serde(default = "default_dir_name")]
        dir_name: String,
    },
}

fn default_collapsed() -> bool {
    true
}

fn default_dir_name() -> String {
    ".".to_string()
}

impl From<EntrySyntax> for SidebarEntry {
    fn from(syntax: EntrySyntax) -> Self {
        match syntax {
            EntrySyntax::Short(id) => SidebarEntry::Doc { id, label: None },
            EntrySyntax::Full(TaggedEntry::Doc { id, label }) => SidebarEntry::Doc { id, label },
            EntrySyntax::Full(TaggedEntry::Category {
                label,
                items,
                collapsed,
                link,
            }) => SidebarEntry::Category {
                label,
                items,
                collapsed,
                link,
            },
            EntrySyntax::Full(TaggedEntry::Link { label, href }) => {
                SidebarEntry::Link { label, href }
            }
            EntrySyntax::Full(TaggedEntry::Autogenerated { dir_name }) => {
                SidebarEntry::Autogenerated { dir_name }
            }
        }
    }
}

/// All sidebars of a site, keyed by sidebar id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SidebarSpec {
    pub sidebars: BTreeMap<String, Vec<SidebarEntry>>,
}

impl SidebarSpec {
    /// One sidebar generated from the whole docs folder structure.
    pub fn autogenerated() -> Self {
        Self {
            sidebars: BTreeMap::from([(
                DEFAULT_SIDEBAR_ID.to_string(),
                vec![SidebarEntry::Autogenerated {
                    dir_name: default_dir_name(),
                }],
            )]),
        }
    }

    pub fn parse(content: &str) -> Result<Self, SidebarError> {
        Ok(toml::from_str(content)?)
    }
}

/// Load the sidebar layout. A missing file means [`SidebarSpec::autogenerated`].
pub fn load_sidebars(path: &Path) -> Result<SidebarSpec, SidebarError> {
    if !path.exists() {
        debug!(path = %path.display(), "no sidebar file, generating from folders");
        return Ok(SidebarSpec::autogenerated());
    }
    let content = fs::read_to_string(path).map_err(|source| SidebarError::Io {
        path: path.display().to_string(),
        source,
    })?;
    SidebarSpec::parse(&content)
}

// ============================================================================
// Navigation tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationNode {
    Page {
        id: String,
        label: String,
        permalink: String,
    },
    Category {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link: Option<String>,
        collapsed: bool,
        /// Generated from a folder rather than written in the sidebar file.
        autogenerated: bool,
        items: Vec<NavigationNode>,
    },
    Link {
        label: String,
        href: String,
    },
}

impl NavigationNode {
    /// Every doc id in this subtree (pages and category landing pages), in order.
    pub fn doc_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            NavigationNode::Page { id, .. } => out.push(id),
            NavigationNode::Category { link, items, .. } => {
                if let Some(link) = link {
                    out.push(link);
                }
                for item in items {
                    item.doc_ids(out);
                }
            }
            NavigationNode::Link { .. } => {}
        }
    }

    /// Every `(label, href)` link item in this subtree, in order.
    pub fn links<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            NavigationNode::Link { label, href } => out.push((label, href)),
            NavigationNode::Category { items, .. } => {
                for item in items {
                    item.links(out);
                }
            }
            NavigationNode::Page { .. } => {}
        }
    }
}

/// Navigation of one locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTree {
    pub sidebars: BTreeMap<String, Vec<NavigationNode>>,
    /// Most recent blog posts, newest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blog: Vec<NavigationNode>,
}

impl NavigationTree {
    /// First doc of a sidebar, the target of navbar sidebar items.
    pub fn first_doc(&self, sidebar: &str) -> Option<&str> {
        let mut ids = Vec::new();
        for node in self.sidebars.get(sidebar)? {
            node.doc_ids(&mut ids);
            if let Some(first) = ids.first() {
                return Some(first);
            }
        }
        None
    }

    /// Link items of every sidebar as `(sidebar id, label, href)`.
    pub fn link_items(&self) -> Vec<(&str, &str, &str)> {
        let mut out = Vec::new();
        for (sidebar, nodes) in &self.sidebars {
            let mut links = Vec::new();
            for node in nodes {
                node.links(&mut links);
            }
            out.extend(links.into_iter().map(|(l, h)| (sidebar.as_str(), l, h)));
        }
        out
    }
}

/// A sidebar entry naming a doc that does not exist; dropped from the tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnknownEntry {
    pub sidebar: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationOutcome {
    pub tree: NavigationTree,
    pub unknown_entries: Vec<UnknownEntry>,
}

#[derive(Debug, Clone, Copy)]
pub struct NavOptions {
    /// Number of posts in the blog sidebar.
    pub blog_sidebar_count: usize,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            blog_sidebar_count: 5,
        }
    }
}

/// Docs of one locale (with default-locale fallbacks) indexed for lookup.
struct DocIndex<'a> {
    by_id: BTreeMap<&'a str, &'a ContentItem>,
    folded: HashMap<String, Vec<&'a ContentItem>>,
    folders: HashMap<&'a str, &'a FolderMeta>,
    case_sensitive: bool,
}

impl<'a> DocIndex<'a> {
    fn new(
        inventory: &'a ContentInventory,
        locales: &LocaleSet,
        locale: &str,
        docs: &[&'a ContentItem],
    ) -> Self {
        let case_sensitive = inventory.case_sensitive();
        let mut folded: HashMap<String, Vec<&ContentItem>> = HashMap::new();
        for item in docs {
            folded
                .entry(collision_key(&item.id, false))
                .or_default()
                .push(*item);
        }
        // Translated folder labels win; untranslated folders use the default's.
        let mut folders = HashMap::new();
        for folder in inventory.folders() {
            if folder.locale == locales.default_locale() {
                folders.entry(folder.id.as_str()).or_insert(folder);
            }
        }
        for folder in inventory.folders() {
            if folder.locale == locale {
                folders.insert(folder.id.as_str(), folder);
            }
        }
        Self {
            by_id: docs.iter().map(|i| (i.id.as_str(), *i)).collect(),
            folded,
            folders,
            case_sensitive,
        }
    }

    /// Resolve a sidebar doc id, written relative to the docs root or in full.
    fn lookup(&self, raw: &str) -> Option<&'a ContentItem> {
        let path = normalize_path(raw);
        let id = if ContentKind::of_id(&path) == Some(ContentKind::Docs) {
            path
        } else {
            format!("{}/{}", ContentKind::Docs.prefix(), path)
        };
        if let Some(item) = self.by_id.get(id.as_str()) {
            return Some(*item);
        }
        if self.case_sensitive {
            return None;
        }
        match self.folded.get(&collision_key(&id, false)).map(Vec::as_slice) {
            Some([only]) => Some(*only),
            _ => None,
        }
    }
}

/// Build the navigation tree of one locale.
pub fn build(
    inventory: &ContentInventory,
    locales: &LocaleSet,
    locale: &str,
    spec: &SidebarSpec,
    options: &NavOptions,
) -> Result<NavigationOutcome, NavigationError> {
    let visible = effective_items(inventory, locales, locale);
    let docs: Vec<&ContentItem> = visible
        .iter()
        .copied()
        .filter(|i| i.kind == ContentKind::Docs)
        .collect();
    let index = DocIndex::new(inventory, locales, locale, &docs);

    let mut tree = NavigationTree::default();
    let mut unknown_entries = Vec::new();

    for (sidebar, entries) in &spec.sidebars {
        let mut builder = SidebarBuilder {
            sidebar,
            index: &index,
            unknown: &mut unknown_entries,
        };
        let nodes = builder.entries(entries)?;
        check_sidebar(sidebar, &nodes)?;
        debug!(locale, sidebar = %sidebar, nodes = nodes.len(), "sidebar built");
        tree.sidebars.insert(sidebar.clone(), nodes);
    }

    tree.blog = blog_sidebar(&visible, options.blog_sidebar_count);
    unknown_entries.sort();
    unknown_entries.dedup();

    Ok(NavigationOutcome {
        tree,
        unknown_entries,
    })
}

struct SidebarBuilder<'s, 'a> {
    sidebar: &'s str,
    index: &'s DocIndex<'a>,
    unknown: &'s mut Vec<UnknownEntry>,
}

impl<'a> SidebarBuilder<'_, 'a> {
    fn entries(&mut self, entries: &[SidebarEntry]) -> Result<Vec<NavigationNode>, NavigationError> {
        let mut nodes = Vec::new();
        for entry in entries {
            match entry {
                SidebarEntry::Doc { id, label } => {
                    if let Some(item) = self.resolve(id) {
                        nodes.push(NavigationNode::Page {
                            id: item.id.clone(),
                            label: label.clone().unwrap_or_else(|| item.nav_label().to_string()),
                            permalink: item.permalink.clone(),
                        });
                    }
                }
                SidebarEntry::Category {
                    label,
                    items,
                    collapsed,
                    link,
                } => {
                    let link = link
                        .as_deref()
                        .and_then(|id| self.resolve(id))
                        .map(|item| item.id.clone());
                    nodes.push(NavigationNode::Category {
                        label: label.clone(),
                        link,
                        collapsed: *collapsed,
                        autogenerated: false,
                        items: self.entries(items)?,
                    });
                }
                SidebarEntry::Link { label, href } => nodes.push(NavigationNode::Link {
                    label: label.clone(),
                    href: href.clone(),
                }),
                SidebarEntry::Autogenerated { dir_name } => {
                    let dir = normalize_path(dir_name);
                    let prefix = if dir.is_empty() {
                        ContentKind::Docs.prefix().to_string()
                    } else {
                        format!("{}/{}", ContentKind::Docs.prefix(), dir)
                    };
                    nodes.extend(autogenerate(self.index, &prefix));
                }
            }
        }
        Ok(nodes)
    }

    fn resolve(&mut self, id: &str) -> Option<&'a ContentItem> {
        let found = self.index.lookup(id);
        if found.is_none() {
            debug!(sidebar = self.sidebar, id, "unknown sidebar entry dropped");
            self.unknown.push(UnknownEntry {
                sidebar: self.sidebar.to_string(),
                id: id.to_string(),
            });
        }
        found
    }
}

/// Sort key of an auto-generated entry.
struct Ordered {
    position: Option<f64>,
    name: String,
    node: NavigationNode,
}

fn compare_entries(a: &Ordered, b: &Ordered) -> Ordering {
    match (a.position, b.position) {
        (Some(pa), Some(pb)) => pa.total_cmp(&pb).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}

/// Generate the entries of the folder identified by `prefix` (e.g. `docs/guides`).
fn autogenerate(index: &DocIndex<'_>, prefix: &str) -> Vec<NavigationNode> {
    let mut pages = Vec::new();
    let mut subfolders: BTreeSet<&str> = BTreeSet::new();

    for (id, item) in index.by_id.range::<str, _>((
        std::ops::Bound::Excluded(prefix),
        std::ops::Bound::Unbounded,
    )) {
        let Some(rest) = id.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) else {
            // `docs/guides-old` sorts between `docs/guides` and `docs/guides/…`
            if id.starts_with(prefix) {
                continue;
            }
            break;
        };
        match rest.split_once('/') {
            None => pages.push((rest, *item)),
            Some((folder, _)) => {
                subfolders.insert(folder);
            }
        }
    }

    let mut entries: Vec<Ordered> = Vec::new();
    for (name, item) in pages {
        if subfolders.contains(name) {
            // Landing page of a subfolder; attached to its category below.
            continue;
        }
        entries.push(Ordered {
            position: item.sidebar_position,
            name: name.to_string(),
            node: NavigationNode::Page {
                id: item.id.clone(),
                label: item.nav_label().to_string(),
                permalink: item.permalink.clone(),
            },
        });
    }

    for name in subfolders {
        let folder_id = format!("{prefix}/{name}");
        let meta = index.folders.get(folder_id.as_str());
        let landing = index.by_id.get(folder_id.as_str());
        let items = autogenerate(index, &folder_id);
        let label = meta
            .map(|m| m.label.clone())
            .unwrap_or_else(|| parse_entry_name(name).display_title);
        let position = meta
            .and_then(|m| m.position)
            .or_else(|| landing.and_then(|l| l.sidebar_position));
        entries.push(Ordered {
            position,
            name: name.to_string(),
            node: NavigationNode::Category {
                label,
                link: landing.map(|l| l.id.clone()),
                collapsed: meta.and_then(|m| m.collapsed).unwrap_or(true),
                autogenerated: true,
                items,
            },
        });
    }

    entries.sort_by(compare_entries);
    entries.into_iter().map(|e| e.node).collect()
}

/// Enforce per-sidebar uniqueness of docs and sibling category labels.
fn check_sidebar(sidebar: &str, nodes: &[NavigationNode]) -> Result<(), NavigationError> {
    let mut ids = Vec::new();
    for node in nodes {
        node.doc_ids(&mut ids);
    }
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(NavigationError::DuplicateSidebarEntry {
                sidebar: sidebar.to_string(),
                id: id.to_string(),
            });
        }
    }
    check_labels(sidebar, nodes)
}

fn check_labels(sidebar: &str, nodes: &[NavigationNode]) -> Result<(), NavigationError> {
    let mut labels = BTreeSet::new();
    for node in nodes {
        if let NavigationNode::Category { label, items, .. } = node {
            if !labels.insert(label.as_str()) {
                return Err(NavigationError::DuplicateCategoryLabel {
                    sidebar: sidebar.to_string(),
                    label: label.clone(),
                });
            }
            check_labels(sidebar, items)?;
        }
    }
    Ok(())
}

/// Newest `count` posts: by date, then identifier, both descending.
fn blog_sidebar(items: &[&ContentItem], count: usize) -> Vec<NavigationNode> {
    let mut posts: Vec<&ContentItem> = items
        .iter()
        .copied()
        .filter(|i| i.kind == ContentKind::Blog)
        .collect();
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    posts
        .into_iter()
        .take(count)
        .map(|post| NavigationNode::Page {
            id: post.id.clone(),
            label: post.nav_label().to_string(),
            permalink: post.permalink.clone(),
        })
        .collect()
}
