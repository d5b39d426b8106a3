//! Link integrity checking.
//!
//! Every link token authored in content, plus the internal targets declared
//! by sidebars, the navbar and the footer, is classified and resolved
//! against the inventory:
//!
//! | Token | Handling |
//! |-------|----------|
//! | `https://other.host/…`, `mailto:…`, `//cdn/…` | external, excluded |
//! | `https://<site host>/docs/intro` | treated as the path `/docs/intro` |
//! | `pathname:///raw.html` | escape hatch, excluded |
//! | `./setup.md`, `../intro.mdx#usage` | markdown file reference |
//! | `/docs/intro`, `setup`, `/fr/docs/intro` | route reference |
//! | `#usage` | anchor on the same page |
//! | `/img/logo.png` | static asset, excluded |
//!
//! File references are normalized the way the scan names files (number and
//! date prefixes dropped, `index` collapsed), so `../intro.md` reaches
//! `01-intro.md`. Routes are matched against permalinks and identifiers.
//! Lookups try the link's own locale first and fall back to the default
//! locale, the way untranslated pages are served. Keys are compared
//! case-insensitively: one match resolves, several are ambiguous even when
//! one of them matches exactly, none is broken.
//!
//! References found in markdown files by file path follow the markdown
//! link policy; all other references follow the generic one. With the
//! `ignore` policy broken and ambiguous references are dropped from the
//! report entirely.

use crate::config::{ReportPolicy, SiteConfig};
use crate::inventory::{self, ContentInventory};
use crate::locale::LocaleSet;
use crate::naming::{join_relative, normalize_path, strip_markdown_extension};
use crate::navigation::NavigationTree;
use crate::types::ContentItem;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::debug;
use url::Url;

/// Where a reference was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOrigin {
    /// Markdown file path inside content (`./setup.md`).
    Markdown,
    /// Route path inside content (`/docs/setup`).
    Route,
    Sidebar,
    Navbar,
    Footer,
}

impl fmt::Display for LinkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkOrigin::Markdown => "markdown",
            LinkOrigin::Route => "route",
            LinkOrigin::Sidebar => "sidebar",
            LinkOrigin::Navbar => "navbar",
            LinkOrigin::Footer => "footer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceStatus {
    Resolved,
    Broken,
    Ambiguous,
}

impl fmt::Display for ReferenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceStatus::Resolved => "resolved",
            ReferenceStatus::Broken => "broken",
            ReferenceStatus::Ambiguous => "ambiguous",
        };
        f.write_str(name)
    }
}

/// One checked reference. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference {
    pub locale: String,
    /// Item id for content links, `sidebar:<id>`, `navbar` or `footer:<column>` otherwise
    pub source: String,
    /// Token exactly as authored
    pub raw: String,
    pub origin: LinkOrigin,
    pub target: Option<String>,
    pub status: ReferenceStatus,
    /// Why a reference is not resolved (missing anchor, candidate list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Reference {
    pub fn is_problem(&self) -> bool {
        self.status != ReferenceStatus::Resolved
    }
}

/// All references of a build, sorted by `(locale, source, raw)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceReport {
    pub references: Vec<Reference>,
}

impl ReferenceReport {
    /// Broken and ambiguous references, in report order.
    pub fn problems(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.is_problem())
    }

    pub fn count(&self, status: ReferenceStatus) -> usize {
        self.references.iter().filter(|r| r.status == status).count()
    }
}

/// An internal target declared in configuration rather than content.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLink {
    pub origin: LinkOrigin,
    pub source: String,
    pub raw: String,
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub base_url: String,
    /// Lower-cased host of the site URL; absolute URLs on it are internal.
    pub site_host: Option<String>,
    pub check_anchors: bool,
    pub on_broken_links: ReportPolicy,
    pub on_broken_markdown_links: ReportPolicy,
    /// Locale-free routes of pages generated by the renderer (`blog`).
    pub generated_routes: BTreeSet<String>,
}

impl CheckOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            site_host: config.site_host(),
            check_anchors: config.links.check_anchors,
            on_broken_links: config.on_broken_links,
            on_broken_markdown_links: config.on_broken_markdown_links,
            generated_routes: generated_routes(config),
        }
    }

    pub fn policy_for(&self, origin: LinkOrigin) -> ReportPolicy {
        match origin {
            LinkOrigin::Markdown => self.on_broken_markdown_links,
            _ => self.on_broken_links,
        }
    }
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            site_host: None,
            check_anchors: true,
            on_broken_links: ReportPolicy::Error,
            on_broken_markdown_links: ReportPolicy::Warn,
            generated_routes: BTreeSet::new(),
        }
    }
}

/// The blog index page has no source file.
fn generated_routes(config: &SiteConfig) -> BTreeSet<String> {
    let mut routes = BTreeSet::new();
    if config.blog.enabled {
        routes.insert(normalize_path(&config.blog.route_base_path));
    }
    routes
}

/// Navbar and footer `to` targets of a configuration.
pub fn config_links(config: &SiteConfig) -> Vec<ConfigLink> {
    let mut links = Vec::new();
    for item in &config.navbar.items {
        if let Some(to) = &item.to {
            links.push(ConfigLink {
                origin: LinkOrigin::Navbar,
                source: "navbar".to_string(),
                raw: to.clone(),
            });
        }
    }
    for column in &config.footer.columns {
        for item in &column.items {
            if let Some(to) = &item.to {
                links.push(ConfigLink {
                    origin: LinkOrigin::Footer,
                    source: format!("footer:{}", column.title),
                    raw: to.clone(),
                });
            }
        }
    }
    links
}

// ============================================================================
// Token classification
// ============================================================================

#[derive(Debug, PartialEq)]
enum Token {
    Excluded,
    SamePage { anchor: String },
    File { path: String, anchor: Option<String> },
    Route { path: String, anchor: Option<String> },
}

/// `scheme:` before any path character.
fn has_scheme(raw: &str) -> bool {
    let Some(colon) = raw.find(':') else {
        return false;
    };
    let scheme = &raw[..colon];
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn classify(raw: &str, site_host: Option<&str>, allow_files: bool) -> Token {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("pathname://") {
        return Token::Excluded;
    }

    let local;
    let raw = if has_scheme(raw) || raw.starts_with("//") {
        let parsed = if raw.starts_with("//") {
            Url::parse(&format!("https:{raw}"))
        } else {
            Url::parse(raw)
        };
        let same_site = match (&parsed, site_host) {
            (Ok(url), Some(host)) => {
                matches!(url.scheme(), "http" | "https")
                    && url.host_str().is_some_and(|h| h.eq_ignore_ascii_case(host))
            }
            _ => false,
        };
        match parsed {
            Ok(url) if same_site => {
                local = match url.fragment() {
                    Some(fragment) => format!("{}#{fragment}", url.path()),
                    None => url.path().to_string(),
                };
                local.as_str()
            }
            _ => return Token::Excluded,
        }
    } else {
        raw
    };

    let (path, anchor) = match raw.split_once('#') {
        Some((path, anchor)) => (path, Some(anchor).filter(|a| !a.is_empty())),
        None => (raw, None),
    };
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() {
        return match anchor {
            Some(anchor) => Token::SamePage {
                anchor: anchor.to_string(),
            },
            None => Token::Excluded,
        };
    }
    let anchor = anchor.map(str::to_string);
    if strip_markdown_extension(path).is_some() {
        return if allow_files {
            Token::File {
                path: path.to_string(),
                anchor,
            }
        } else {
            Token::Route {
                path: path.to_string(),
                anchor,
            }
        };
    }
    if is_asset(path) {
        return Token::Excluded;
    }
    Token::Route {
        path: path.to_string(),
        anchor,
    }
}

/// Paths to static files (`/img/logo.png`) are not pages.
fn is_asset(path: &str) -> bool {
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && !ext.eq_ignore_ascii_case("html")
                && !ext.eq_ignore_ascii_case("htm")
        }
        None => false,
    }
}

// ============================================================================
// Lookup tables
// ============================================================================

enum Lookup<'a> {
    Found(&'a str),
    Ambiguous(Vec<&'a str>),
    Missing,
}

/// Keys folded to lower case, each mapping to every id that claims it.
#[derive(Default)]
struct Table<'a> {
    folded: HashMap<String, BTreeSet<&'a str>>,
}

impl<'a> Table<'a> {
    fn insert(&mut self, key: &str, id: &'a str) {
        self.folded.entry(key.to_lowercase()).or_default().insert(id);
    }

    fn lookup(&self, key: &str) -> Lookup<'a> {
        let Some(hits) = self.folded.get(&key.to_lowercase()) else {
            return Lookup::Missing;
        };
        let mut ids = hits.iter().copied();
        match (ids.next(), ids.next()) {
            (Some(only), None) => Lookup::Found(only),
            (Some(_), Some(_)) => Lookup::Ambiguous(hits.iter().copied().collect()),
            _ => Lookup::Missing,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TableKind {
    Files,
    Routes,
}

/// Per-locale lookup tables over source files and routes.
#[derive(Default)]
struct LocaleTables<'a> {
    files: Table<'a>,
    routes: Table<'a>,
}

impl<'a> LocaleTables<'a> {
    fn table(&self, kind: TableKind) -> &Table<'a> {
        match kind {
            TableKind::Files => &self.files,
            TableKind::Routes => &self.routes,
        }
    }
}

/// Split a route into its explicit locale prefix and its locale-free key.
///
/// `/book/fr/docs/intro/` with base `/book/` → (`Some("fr")`, `docs/intro`)
fn route_key(path: &str, base_url: &str, locales: &LocaleSet) -> (Option<String>, String) {
    let path = normalize_path(path);
    let base = normalize_path(base_url);
    let rest = if base.is_empty() {
        path.as_str()
    } else if path == base {
        ""
    } else {
        path.strip_prefix(&format!("{base}/")).unwrap_or(&path)
    };
    match rest.split_once('/').unwrap_or((rest, "")) {
        (first, tail) if first != locales.default_locale() && locales.contains(first) => {
            (Some(first.to_string()), tail.to_string())
        }
        _ => (None, rest.to_string()),
    }
}

struct Resolver<'a> {
    inventory: &'a ContentInventory,
    locales: &'a LocaleSet,
    options: &'a CheckOptions,
    tables: BTreeMap<&'a str, LocaleTables<'a>>,
}

struct Resolution {
    target: Option<String>,
    status: ReferenceStatus,
    reason: Option<String>,
}

impl Resolution {
    fn broken(reason: Option<String>) -> Self {
        Self {
            target: None,
            status: ReferenceStatus::Broken,
            reason,
        }
    }
}

impl<'a> Resolver<'a> {
    fn new(inventory: &'a ContentInventory, locales: &'a LocaleSet, options: &'a CheckOptions) -> Self {
        let mut tables: BTreeMap<&str, LocaleTables> = BTreeMap::new();
        for item in inventory.items() {
            let t = tables.entry(item.locale.as_str()).or_default();
            t.files.insert(&inventory::path_id(item.kind, &item.source_path), &item.id);
            let (_, key) = route_key(&item.permalink, &options.base_url, locales);
            t.routes.insert(&item.id, &item.id);
            t.routes.insert(&key, &item.id);
        }
        Self {
            inventory,
            locales,
            options,
            tables,
        }
    }

    /// Look up in `locale`, then in the default locale.
    fn find(
        &self,
        locale: &str,
        key: &str,
        kind: TableKind,
    ) -> (Lookup<'a>, &'a str) {
        let default = self.locales.default_locale();
        let mut order = vec![locale];
        if locale != default {
            order.push(default);
        }
        for loc in order {
            if let Some((name, tables)) = self.tables.get_key_value(loc) {
                match tables.table(kind).lookup(key) {
                    Lookup::Missing => continue,
                    found => return (found, *name),
                }
            }
        }
        (Lookup::Missing, locale_name(self.locales, locale))
    }

    fn resolve(&self, token: Token, source: Option<&ContentItem>, locale: &str) -> Option<Resolution> {
        let (lookup, found_in, anchor) = match token {
            Token::Excluded => return None,
            Token::SamePage { anchor } => {
                let item = source?;
                return Some(self.check_anchor(item, Some(&anchor)));
            }
            Token::File { path, anchor } => {
                let item = source?;
                let bare = strip_markdown_extension(&path).unwrap_or(&path);
                let joined = if bare.starts_with('/') {
                    normalize_path(bare)
                } else {
                    join_relative(&item.source_path, bare)
                };
                let key = inventory::path_id(item.kind, &joined);
                let (lookup, found_in) = self.find(locale, &key, TableKind::Files);
                (lookup, found_in, anchor)
            }
            Token::Route { path, anchor } => {
                let absolute = match source {
                    Some(item) if !path.starts_with('/') => {
                        format!("/{}", join_relative(&item.permalink, &path))
                    }
                    _ => path,
                };
                let (explicit, key) = route_key(&absolute, &self.options.base_url, self.locales);
                if self.options.generated_routes.contains(&key) {
                    return Some(Resolution {
                        target: None,
                        status: ReferenceStatus::Resolved,
                        reason: None,
                    });
                }
                let target_locale = explicit.as_deref().unwrap_or(locale);
                let (lookup, found_in) = self.find(target_locale, &key, TableKind::Routes);
                (lookup, found_in, anchor)
            }
        };

        Some(match lookup {
            Lookup::Found(id) => match self.inventory.get(found_in, id) {
                Some(target) => self.check_anchor(target, anchor.as_deref()),
                None => Resolution::broken(None),
            },
            Lookup::Ambiguous(candidates) => Resolution {
                target: None,
                status: ReferenceStatus::Ambiguous,
                reason: Some(format!("matches {}", candidates.join(", "))),
            },
            Lookup::Missing => Resolution::broken(None),
        })
    }

    fn check_anchor(&self, target: &ContentItem, anchor: Option<&str>) -> Resolution {
        match anchor {
            Some(anchor) if self.options.check_anchors && !target.has_heading(anchor) => Resolution {
                target: Some(target.id.clone()),
                status: ReferenceStatus::Broken,
                reason: Some(format!("no heading #{anchor} in {}", target.id)),
            },
            _ => Resolution {
                target: Some(target.id.clone()),
                status: ReferenceStatus::Resolved,
                reason: None,
            },
        }
    }
}

fn locale_name<'a>(locales: &'a LocaleSet, locale: &str) -> &'a str {
    locales
        .iter()
        .find(|l| *l == locale)
        .unwrap_or(locales.default_locale())
}

/// Check every reference of a build.
///
/// `trees` holds the navigation of each locale; its sidebar link items are
/// checked in that locale. Configuration links are checked in the default
/// locale.
pub fn check(
    inventory: &ContentInventory,
    locales: &LocaleSet,
    trees: &BTreeMap<String, NavigationTree>,
    extra: &[ConfigLink],
    options: &CheckOptions,
) -> ReferenceReport {
    let resolver = Resolver::new(inventory, locales, options);
    let host = options.site_host.as_deref();
    let mut references = Vec::new();
    let mut excluded = 0usize;

    let mut record = |locale: &str, source: &str, raw: &str, origin: LinkOrigin, resolution: Option<Resolution>| {
        let Some(resolution) = resolution else {
            excluded += 1;
            return;
        };
        if resolution.status != ReferenceStatus::Resolved
            && options.policy_for(origin) == ReportPolicy::Ignore
        {
            return;
        }
        references.push(Reference {
            locale: locale.to_string(),
            source: source.to_string(),
            raw: raw.to_string(),
            origin,
            target: resolution.target,
            status: resolution.status,
            reason: resolution.reason,
        });
    };

    for item in inventory.items() {
        if !locales.contains(&item.locale) {
            continue;
        }
        for raw in &item.references {
            let token = classify(raw, host, true);
            let origin = match token {
                Token::File { .. } => LinkOrigin::Markdown,
                _ => LinkOrigin::Route,
            };
            let resolution = resolver.resolve(token, Some(item), &item.locale);
            record(&item.locale, &item.id, raw, origin, resolution);
        }
    }

    for (locale, tree) in trees {
        for (sidebar, _label, href) in tree.link_items() {
            let resolution = resolver.resolve(classify(href, host, false), None, locale);
            record(locale, &format!("sidebar:{sidebar}"), href, LinkOrigin::Sidebar, resolution);
        }
    }

    let default = locales.default_locale();
    for link in extra {
        let resolution = resolver.resolve(classify(&link.raw, host, false), None, default);
        record(default, &link.source, &link.raw, link.origin, resolution);
    }

    references.sort();
    debug!(
        checked = references.len(),
        excluded, "references checked"
    );
    ReferenceReport { references }
}
