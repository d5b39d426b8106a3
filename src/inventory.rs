//! Content inventory: filesystem scanning of content roots.
//!
//! First stage of the build. Walks every content root, produces one
//! [`ContentItem`] per markdown file and one [`FolderMeta`] per docs folder.
//! Later stages never touch the filesystem again.
//!
//! ## Directory Structure
//!
//! ```text
//! docs/                            # Docs root
//! ├── 01-intro.md                  # docs/intro, sidebar position 1
//! ├── 02-guides/                   # Folder → category, position 2
//! │   ├── _category_.yml           # Optional label / position / collapsed
//! │   ├── index.md                 # docs/guides (category landing page)
//! │   └── setup.mdx                # docs/guides/setup
//! ├── reference.md                 # docs/reference, unpositioned
//! └── _partials/                   # Leading underscore = not content
//! blog/
//! ├── 2024-03-09-hello-world.md    # blog/hello-world, dated 2024-03-09
//! └── 2024-05-01-launch/
//!     └── index.md                 # blog/launch
//! ```
//!
//! ## Identifiers
//!
//! `kind/` + the relative path with extension, number prefixes (docs) or
//! date prefixes (blog) removed, and a trailing `index`/`README` collapsed
//! onto its folder. A front matter `id` replaces the last segment.
//!
//! ## Validation
//!
//! Two files collapsing to the same identifier in the same locale is a
//! [`InventoryError::DuplicateIdentifier`]. With case-insensitive matching
//! (the default) identifiers differing only in case collide as well: such a
//! site breaks as soon as it is served from a case-insensitive filesystem.

use crate::naming::{
    collision_key, normalize_doc_segment, parse_date_prefix, parse_entry_name, slugify,
    strip_markdown_extension,
};
use crate::types::{ContentItem, ContentKind, ContentRoot};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to walk content root: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid category metadata in {path}: {message}")]
    CategoryMeta { path: PathBuf, message: String },
    #[error("Duplicate identifier '{id}' in locale '{locale}': {first} and {second}")]
    DuplicateIdentifier {
        id: String,
        locale: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Scan behaviour shared by all roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub case_sensitive: bool,
    pub include_drafts: bool,
}

/// Folder metadata for docs categories.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderMeta {
    /// Normalized folder identifier, e.g. `docs/guides`
    pub id: String,
    pub locale: String,
    /// Label from `_category_` metadata or the folder name
    pub label: String,
    /// Position from `_category_` metadata or the folder's number prefix
    pub position: Option<f64>,
    pub collapsed: Option<bool>,
}

/// Every content item and docs folder of a build, sorted by `(locale, id)`.
#[derive(Debug, Clone, Default)]
pub struct ContentInventory {
    items: Vec<ContentItem>,
    folders: Vec<FolderMeta>,
    case_sensitive: bool,
}

impl ContentInventory {
    /// Assemble an inventory from already-built items, enforcing identifier
    /// uniqueness per locale.
    pub fn from_items(
        items: Vec<ContentItem>,
        folders: Vec<FolderMeta>,
        case_sensitive: bool,
    ) -> Result<Self, InventoryError> {
        let mut seen: HashMap<(String, String), usize> = HashMap::new();
        for (pos, item) in items.iter().enumerate() {
            let key = (item.locale.clone(), collision_key(&item.id, case_sensitive));
            if let Some(first) = seen.insert(key, pos) {
                return Err(InventoryError::DuplicateIdentifier {
                    id: item.id.clone(),
                    locale: item.locale.clone(),
                    first: PathBuf::from(&items[first].source_path),
                    second: PathBuf::from(&item.source_path),
                });
            }
        }

        let mut items = items;
        items.sort_by(|a, b| (&a.locale, &a.id).cmp(&(&b.locale, &b.id)));
        let mut folders = folders;
        folders.sort_by(|a, b| (&a.locale, &a.id).cmp(&(&b.locale, &b.id)));
        folders.dedup_by(|a, b| a.locale == b.locale && a.id == b.id);

        Ok(Self {
            items,
            folders,
            case_sensitive,
        })
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn folders(&self) -> &[FolderMeta] {
        &self.folders
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Items of one locale, sorted by identifier.
    pub fn in_locale<'a>(&'a self, locale: &str) -> impl Iterator<Item = &'a ContentItem> + use<'a> {
        let locale = locale.to_string();
        self.items.iter().filter(move |i| i.locale == locale)
    }

    pub fn get(&self, locale: &str, id: &str) -> Option<&ContentItem> {
        self.items
            .binary_search_by(|i| (i.locale.as_str(), i.id.as_str()).cmp(&(locale, id)))
            .ok()
            .map(|pos| &self.items[pos])
    }
}

/// Scan all content roots into one inventory.
///
/// Roots are scanned in parallel; results are concatenated in root order
/// and sorted, so the outcome does not depend on completion order.
pub fn scan(roots: &[ContentRoot], options: &ScanOptions) -> Result<ContentInventory, InventoryError> {
    let scanned = roots
        .par_iter()
        .map(|root| scan_root(root, options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut items = Vec::new();
    let mut folders = Vec::new();
    for (root_items, root_folders) in scanned {
        items.extend(root_items);
        folders.extend(root_folders);
    }
    ContentInventory::from_items(items, folders, options.case_sensitive)
}

type RootScan = (Vec<ContentItem>, Vec<FolderMeta>);

fn scan_root(root: &ContentRoot, options: &ScanOptions) -> Result<RootScan, InventoryError> {
    if !root.path.is_dir() {
        debug!(root = %root.path.display(), locale = %root.locale, "content root missing, treated as empty");
        return Ok((Vec::new(), Vec::new()));
    }
    debug!(root = %root.path.display(), kind = %root.kind, locale = %root.locale, "scanning content root");

    let mut items = Vec::new();
    let mut folders = Vec::new();

    let walker = WalkDir::new(&root.path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.file_name().to_string_lossy().as_ref()));

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(&root.path)
            .unwrap_or(entry.path())
            .to_path_buf();

        if entry.file_type().is_dir() {
            if root.kind == ContentKind::Docs {
                folders.push(read_folder_meta(root, entry.path(), &rel)?);
            }
        } else if is_markdown(entry.path()) {
            match read_item(root, entry.path(), &rel)? {
                Some(item) if item.1 && !options.include_drafts => {
                    debug!(path = %rel.display(), "skipping draft");
                }
                Some((item, _)) => items.push(item),
                None => {}
            }
        }
    }

    debug!(root = %root.path.display(), items = items.len(), "content root scanned");
    Ok((items, folders))
}

/// Hidden entries and `_`-prefixed partials are never content.
fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("mdx"))
        .unwrap_or(false)
}

/// Relative path as `/`-joined string segments.
fn segments(rel: &Path) -> Vec<String> {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect()
}

/// Front matter keys this crate reads. Other keys belong to the renderer.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    id: Option<String>,
    title: Option<String>,
    sidebar_label: Option<String>,
    sidebar_position: Option<f64>,
    slug: Option<String>,
    date: Option<String>,
    draft: bool,
}

/// Split a leading `---` fenced YAML block off the document.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}

fn parse_front_matter(yaml: Option<&str>, path: &Path) -> Result<FrontMatter, InventoryError> {
    match yaml {
        Some(y) if !y.trim().is_empty() => {
            serde_yaml::from_str(y).map_err(|source| InventoryError::FrontMatter {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(FrontMatter::default()),
    }
}

/// Build one content item. Returns the item and its draft flag.
fn read_item(
    root: &ContentRoot,
    path: &Path,
    rel: &Path,
) -> Result<Option<(ContentItem, bool)>, InventoryError> {
    let content = fs::read_to_string(path).map_err(|source| InventoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (yaml, body) = split_front_matter(&content);
    let front = parse_front_matter(yaml, path)?;

    let source_path = segments(rel).join("/");
    let Some(file_name) = source_path.rsplit('/').next().filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    let stem = strip_markdown_extension(file_name).unwrap_or(file_name);
    let position = match root.kind {
        ContentKind::Docs => parse_entry_name(stem).number.map(f64::from),
        ContentKind::Blog => None,
    };

    let override_id = front.id.as_deref().filter(|id| !id.trim_matches('/').is_empty());
    let identity = path_identity(root.kind, &source_path, override_id);
    let local_id = identity.segments.join("/");
    let id = format!("{}/{}", root.kind.prefix(), local_id);

    let extracted = extract_markdown(body);
    let title = front
        .title
        .clone()
        .or(extracted.first_h1)
        .unwrap_or_else(|| parse_entry_name(&identity.name).display_title);

    let permalink = permalink(&root.route_base, &local_id, front.slug.as_deref());

    let item = ContentItem {
        id,
        kind: root.kind,
        locale: root.locale.clone(),
        title,
        source_path,
        permalink,
        references: extracted.links,
        headings: extracted.headings,
        sidebar_position: front.sidebar_position.or(position),
        sidebar_label: front.sidebar_label,
        date: front.date.or(identity.date),
    };
    Ok(Some((item, front.draft)))
}

/// Identifier segments derived from a source path.
#[derive(Debug, PartialEq)]
struct PathIdentity {
    segments: Vec<String>,
    /// File or folder name the identifier was taken from, before normalization
    name: String,
    /// Date from a blog `YYYY-MM-DD-` prefix
    date: Option<String>,
}

/// Normalize a `/`-separated path relative to a content root.
///
/// Docs segments lose their number prefix, a blog name loses its date
/// prefix, and a trailing `index`/`README` collapses onto its folder. An
/// `id` from front matter replaces the file's own segment, so an index file
/// keeps its folder: `guides/index.md` with `id: overview` is
/// `guides/overview`.
fn path_identity(kind: ContentKind, path: &str, override_id: Option<&str>) -> PathIdentity {
    let mut dirs: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let file = dirs.pop().unwrap_or_default();
    let stem = strip_markdown_extension(file).unwrap_or(file);

    let collapse = override_id.is_none() && is_index_stem(stem) && !dirs.is_empty();
    let last = match dirs.last() {
        Some(dir) if collapse => *dir,
        _ => stem,
    };
    if collapse {
        dirs.pop();
    }

    let mut segments: Vec<String> = dirs
        .iter()
        .map(|dir| match kind {
            ContentKind::Docs => normalize_doc_segment(dir),
            ContentKind::Blog => dir.to_string(),
        })
        .collect();
    let (name, date) = match kind {
        ContentKind::Docs => (last.to_string(), None),
        ContentKind::Blog => match parse_date_prefix(last) {
            Some((d, rest)) if !rest.is_empty() => (rest, Some(d)),
            Some((d, _)) => (last.to_string(), Some(d)),
            None => (last.to_string(), None),
        },
    };
    segments.push(match (override_id, kind) {
        (Some(id), _) => id.trim_matches('/').to_string(),
        (None, ContentKind::Docs) => normalize_doc_segment(&name),
        (None, ContentKind::Blog) => name.clone(),
    });

    PathIdentity {
        segments,
        name,
        date,
    }
}

/// Identifier a source path maps to, ignoring front matter.
///
/// `docs`, `02-guides/01-setup.md` → `docs/guides/setup`. Markdown file
/// links are resolved through this so they follow the scan's naming.
pub fn path_id(kind: ContentKind, path: &str) -> String {
    format!("{}/{}", kind.prefix(), path_identity(kind, path, None).segments.join("/"))
}

fn is_index_stem(stem: &str) -> bool {
    stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme")
}

/// Route for an item. An absolute `slug` is taken from the root's route
/// base; a relative one replaces the last identifier segment.
fn permalink(route_base: &str, local_id: &str, slug: Option<&str>) -> String {
    let path = match slug {
        Some(s) if s.starts_with('/') => s.trim_matches('/').to_string(),
        Some(s) => match local_id.rfind('/') {
            Some(pos) => format!("{}/{}", &local_id[..pos], s.trim_matches('/')),
            None => s.trim_matches('/').to_string(),
        },
        None => local_id.to_string(),
    };
    if path.is_empty() {
        if route_base.is_empty() {
            "/".to_string()
        } else {
            route_base.to_string()
        }
    } else {
        format!("{route_base}/{path}")
    }
}

/// What the scan needs from a markdown body.
#[derive(Debug, Default, PartialEq)]
struct Extracted {
    first_h1: Option<String>,
    links: Vec<String>,
    headings: Vec<String>,
}

/// Collect link destinations and heading anchors in document order.
///
/// Headings get their explicit `{#id}` or a slug of their text; repeated
/// slugs are suffixed `-1`, `-2`, … like rendered anchors are.
fn extract_markdown(body: &str) -> Extracted {
    let mut out = Extracted::default();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut heading: Option<(HeadingLevel, Option<String>, String)> = None;

    for event in Parser::new_ext(body, Options::ENABLE_HEADING_ATTRIBUTES) {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                if !dest_url.is_empty() {
                    out.links.push(dest_url.to_string());
                }
            }
            Event::Start(Tag::Heading { level, id, .. }) => {
                heading = Some((level, id.map(|i| i.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, buf)) = heading.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit, text)) = heading.take() {
                    if level == HeadingLevel::H1 && out.first_h1.is_none() {
                        out.first_h1 = Some(text.trim().to_string());
                    }
                    let base = explicit.unwrap_or_else(|| slugify(&text));
                    let count = seen.entry(base.clone()).or_insert(0);
                    let anchor = if *count == 0 {
                        base
                    } else {
                        format!("{base}-{count}")
                    };
                    *count += 1;
                    out.headings.push(anchor);
                }
            }
            _ => {}
        }
    }
    out
}

/// Category metadata file accepted in docs folders.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategoryFile {
    label: Option<String>,
    position: Option<f64>,
    collapsed: Option<bool>,
}

fn read_folder_meta(root: &ContentRoot, dir: &Path, rel: &Path) -> Result<FolderMeta, InventoryError> {
    let segs = segments(rel);
    let raw_name = segs.last().cloned().unwrap_or_default();
    let parsed = parse_entry_name(&raw_name);
    let local: Vec<String> = segs.iter().map(|s| normalize_doc_segment(s)).collect();

    let file = read_category_file(dir)?;
    let fallback_label = match parsed.number {
        Some(_) if !parsed.name.is_empty() => parsed.display_title,
        _ => raw_name.replace(['-', '_'], " "),
    };

    Ok(FolderMeta {
        id: format!("{}/{}", root.kind.prefix(), local.join("/")),
        locale: root.locale.clone(),
        label: file.label.unwrap_or(fallback_label),
        position: file.position.or(parsed.number.map(f64::from)),
        collapsed: file.collapsed,
    })
}

fn read_category_file(dir: &Path) -> Result<CategoryFile, InventoryError> {
    let read = |path: PathBuf| {
        fs::read_to_string(&path).map_err(|source| InventoryError::Read { path, source })
    };
    for name in ["_category_.yml", "_category_.yaml"] {
        let path = dir.join(name);
        if path.is_file() {
            let content = read(path.clone())?;
            if content.trim().is_empty() {
                return Ok(CategoryFile::default());
            }
            return serde_yaml::from_str(&content).map_err(|e| InventoryError::CategoryMeta {
                path,
                message: e.to_string(),
            });
        }
    }
    let path = dir.join("_category_.json");
    if path.is_file() {
        let content = read(path.clone())?;
        return serde_json::from_str(&content).map_err(|e| InventoryError::CategoryMeta {
            path,
            message: e.to_string(),
        });
    }
    Ok(CategoryFile::default())
}

/// Group items by locale for reporting.
pub fn count_by_locale(inventory: &ContentInventory) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for item in inventory.items() {
        *counts.entry(item.locale.as_str()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{blog_root, docs_root, write};
    use tempfile::TempDir;

    fn scan_one(root: &ContentRoot) -> Result<ContentInventory, InventoryError> {
        scan(std::slice::from_ref(root), &ScanOptions::default())
    }

    fn ids(inventory: &ContentInventory) -> Vec<&str> {
        inventory.items().iter().map(|i| i.id.as_str()).collect()
    }

    fn folder<'a>(inventory: &'a ContentInventory, id: &str) -> Option<&'a FolderMeta> {
        inventory.folders().iter().find(|f| f.locale == "en" && f.id == id)
    }

    #[test]
    fn one_item_per_file_with_unique_ids() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/intro.md", "# Intro");
        write(tmp.path(), "docs/guides/setup.md", "# Setup");
        write(tmp.path(), "docs/guides/deploy.mdx", "# Deploy");
        write(tmp.path(), "docs/notes.txt", "not content");

        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        assert_eq!(
            ids(&inventory),
            vec!["docs/guides/deploy", "docs/guides/setup", "docs/intro"]
        );
    }

    #[test]
    fn number_prefixes_become_positions() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/01-intro.md", "# Intro");
        write(tmp.path(), "docs/02-guides/10-setup.md", "# Setup");

        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        let intro = inventory.get("en", "docs/intro").unwrap();
        assert_eq!(intro.sidebar_position, Some(1.0));
        let setup = inventory.get("en", "docs/guides/setup").unwrap();
        assert_eq!(setup.sidebar_position, Some(10.0));
        assert_eq!(setup.source_path, "02-guides/10-setup.md");
        assert_eq!(setup.permalink, "/docs/guides/setup");
    }

    #[test]
    fn front_matter_overrides() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "docs/03-start.md",
            "---\nid: getting-started\ntitle: Getting Started\nsidebar_label: Start\nsidebar_position: 7\nslug: /\nunknown_key: kept for the renderer\n---\n# Ignored heading\n",
        );

        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        let item = &inventory.items()[0];
        assert_eq!(item.id, "docs/getting-started");
        assert_eq!(item.title, "Getting Started");
        assert_eq!(item.sidebar_label.as_deref(), Some("Start"));
        assert_eq!(item.sidebar_position, Some(7.0));
        assert_eq!(item.permalink, "/docs");
    }

    #[test]
    fn title_falls_back_to_file_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/05-quick-tour.md", "No heading here.");
        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        assert_eq!(inventory.items()[0].title, "quick tour");
    }

    #[test]
    fn index_collapses_onto_folder() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/guides/index.md", "# Guides");
        write(tmp.path(), "docs/index.md", "# Home");
        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        assert_eq!(ids(&inventory), vec!["docs/guides", "docs/index"]);
    }

    #[test]
    fn front_matter_id_on_index_keeps_folder() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/02-guides/index.md", "---\nid: overview\n---\n# Guides");
        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        assert_eq!(ids(&inventory), vec!["docs/guides/overview"]);
        assert_eq!(inventory.items()[0].permalink, "/docs/guides/overview");
    }

    #[test]
    fn path_id_follows_scan_naming() {
        assert_eq!(path_id(ContentKind::Docs, "02-guides/01-setup.md"), "docs/guides/setup");
        assert_eq!(path_id(ContentKind::Docs, "02-guides/README.md"), "docs/guides");
        assert_eq!(path_id(ContentKind::Docs, "index"), "docs/index");
        assert_eq!(path_id(ContentKind::Blog, "2024-05-01-launch.md"), "blog/launch");
        assert_eq!(path_id(ContentKind::Blog, "2024-05-01-launch/index.md"), "blog/launch");
    }

    #[test]
    fn case_only_difference_is_duplicate() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/Intro.md", "# A");
        write(tmp.path(), "docs/intro.md", "# B");

        let result = scan_one(&docs_root(tmp.path(), "en"));
        match result {
            Err(InventoryError::DuplicateIdentifier { locale, .. }) => assert_eq!(locale, "en"),
            // Case-insensitive filesystems store only one of the two files.
            Ok(inventory) => assert_eq!(inventory.len(), 1),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prefix_collision_is_duplicate() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/01-intro.md", "# A");
        write(tmp.path(), "docs/intro.md", "# B");

        let result = scan_one(&docs_root(tmp.path(), "en"));
        assert!(matches!(
            result,
            Err(InventoryError::DuplicateIdentifier { ref id, .. }) if id == "docs/intro"
        ));
    }

    #[test]
    fn case_sensitive_inventory_keeps_both() {
        let a = crate::test_helpers::item("docs/Intro", "en");
        let b = crate::test_helpers::item("docs/intro", "en");
        assert!(ContentInventory::from_items(vec![a.clone(), b.clone()], vec![], true).is_ok());
        assert!(ContentInventory::from_items(vec![a, b], vec![], false).is_err());
    }

    #[test]
    fn same_id_in_two_locales_is_fine() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/intro.md", "# Intro");
        write(tmp.path(), "i18n/fr/docs/intro.md", "# Introduction");

        let roots = vec![
            docs_root(tmp.path(), "en"),
            ContentRoot {
                path: tmp.path().join("i18n/fr/docs"),
                route_base: "/fr/docs".to_string(),
                ..docs_root(tmp.path(), "fr")
            },
        ];
        let inventory = scan(&roots, &ScanOptions::default()).unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.get("fr", "docs/intro").unwrap().permalink, "/fr/docs/intro");
        assert_eq!(count_by_locale(&inventory).get("fr"), Some(&1));
    }

    #[test]
    fn hidden_and_underscore_entries_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/.draft.md", "# Hidden");
        write(tmp.path(), "docs/_partials/snippet.md", "# Partial");
        write(tmp.path(), "docs/_snippet.mdx", "# Partial");
        write(tmp.path(), "docs/intro.md", "# Intro");
        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        assert_eq!(ids(&inventory), vec!["docs/intro"]);
    }

    #[test]
    fn drafts_dropped_unless_requested() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/wip.md", "---\ndraft: true\n---\n# WIP");
        write(tmp.path(), "docs/intro.md", "# Intro");
        let root = docs_root(tmp.path(), "en");

        let inventory = scan(std::slice::from_ref(&root), &ScanOptions::default()).unwrap();
        assert_eq!(ids(&inventory), vec!["docs/intro"]);

        let options = ScanOptions {
            include_drafts: true,
            ..ScanOptions::default()
        };
        let inventory = scan(std::slice::from_ref(&root), &options).unwrap();
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        assert!(inventory.is_empty());
    }

    #[test]
    fn invalid_front_matter_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/bad.md", "---\nsidebar_position: [unclosed\n---\n");
        let result = scan_one(&docs_root(tmp.path(), "en"));
        assert!(matches!(result, Err(InventoryError::FrontMatter { .. })));
    }

    #[test]
    fn blog_dates_and_slugs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "blog/2024-03-09-hello-world.md", "# Hello");
        write(tmp.path(), "blog/2024-05-01-launch/index.md", "# Launch");
        write(tmp.path(), "blog/undated.md", "---\ndate: 2023-12-31\n---\n# Old");

        let inventory = scan_one(&blog_root(tmp.path(), "en")).unwrap();
        let summary: Vec<(&str, Option<&str>)> = inventory
            .items()
            .iter()
            .map(|i| (i.id.as_str(), i.date.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("blog/hello-world", Some("2024-03-09")),
                ("blog/launch", Some("2024-05-01")),
                ("blog/undated", Some("2023-12-31")),
            ]
        );
        assert!(inventory.folders().is_empty());
    }

    #[test]
    fn folder_metadata_from_category_file_and_prefix() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/02-guides/setup.md", "# Setup");
        write(tmp.path(), "docs/reference/_category_.yml", "label: API Reference\nposition: 5\ncollapsed: false\n");
        write(tmp.path(), "docs/reference/api.md", "# API");
        write(tmp.path(), "docs/extras/_category_.json", "{\"label\": \"Extras\"}");
        write(tmp.path(), "docs/extras/faq.md", "# FAQ");

        let inventory = scan_one(&docs_root(tmp.path(), "en")).unwrap();
        let guides = folder(&inventory, "docs/guides").unwrap();
        assert_eq!(guides.label, "guides");
        assert_eq!(guides.position, Some(2.0));

        let reference = folder(&inventory, "docs/reference").unwrap();
        assert_eq!(reference.label, "API Reference");
        assert_eq!(reference.position, Some(5.0));
        assert_eq!(reference.collapsed, Some(false));

        let extras = folder(&inventory, "docs/extras").unwrap();
        assert_eq!(extras.label, "Extras");
        assert_eq!(extras.position, None);
    }

    // =========================================================================
    // Markdown extraction
    // =========================================================================

    #[test]
    fn links_extracted_in_order() {
        let body = "See [setup](./guides/setup.md) and [home](/docs/intro#top).\n\n\
                    Visit <https://example.com> or [anchor](#usage).\n";
        let extracted = extract_markdown(body);
        assert_eq!(
            extracted.links,
            vec![
                "./guides/setup.md",
                "/docs/intro#top",
                "https://example.com",
                "#usage"
            ]
        );
    }

    #[test]
    fn images_are_not_references() {
        let extracted = extract_markdown("![logo](/img/logo.svg)\n");
        assert!(extracted.links.is_empty());
    }

    #[test]
    fn headings_slugged_and_deduplicated() {
        let body = "# Title\n\n## Usage\n\n## Usage\n\n## Custom {#my-id}\n\n### `code` span\n";
        let extracted = extract_markdown(body);
        assert_eq!(extracted.first_h1.as_deref(), Some("Title"));
        assert_eq!(
            extracted.headings,
            vec!["title", "usage", "usage-1", "my-id", "code-span"]
        );
    }

    #[test]
    fn front_matter_split() {
        let (fm, body) = split_front_matter("---\ntitle: X\n---\n# Body\n");
        assert_eq!(fm, Some("title: X\n"));
        assert_eq!(body, "# Body\n");

        let (fm, body) = split_front_matter("# No front matter\n");
        assert_eq!(fm, None);
        assert_eq!(body, "# No front matter\n");

        let (fm, _) = split_front_matter("---\nunterminated\n");
        assert_eq!(fm, None);
    }

    #[test]
    fn permalink_slug_rules() {
        assert_eq!(permalink("/docs", "guides/setup", None), "/docs/guides/setup");
        assert_eq!(permalink("/docs", "guides/setup", Some("install")), "/docs/guides/install");
        assert_eq!(permalink("/docs", "guides/setup", Some("/start")), "/docs/start");
        assert_eq!(permalink("/docs", "intro", Some("/")), "/docs");
        assert_eq!(permalink("", "intro", Some("/")), "/");
    }
}
