//! Site configuration module.
//!
//! Handles loading, validating, and merging `docweave.toml`. The file is the
//! typed equivalent of a documentation-site config object: site identity,
//! content roots, locales, link policies, navbar/footer declarations and
//! theme flags. It is loaded once at process start and then passed by
//! reference to every component; nothing mutates it afterwards.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── docweave.toml            # Site config (optional, stock defaults otherwise)
//! ├── sidebars.toml            # Sidebar layout (optional, auto-generated otherwise)
//! ├── docs/                    # Docs root (default locale)
//! ├── blog/                    # Blog root (default locale)
//! └── i18n/
//!     └── fr/
//!         ├── docs/            # French translations of docs/
//!         └── blog/
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! title = "My Docs"
//! on_broken_links = "warn"
//!
//! [i18n]
//! locales = ["en", "fr"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::locale::{LocaleError, LocaleSet};
use crate::types::{ContentKind, ContentRoot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILENAME: &str = "docweave.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config locale error: {0}")]
    Locale(#[from] LocaleError),
}

/// How findings of one class are treated.
///
/// Applied uniformly to every finding of the class it governs:
/// - `ignore`: findings are dropped silently
/// - `warn`: findings are reported, the build succeeds
/// - `error`: findings are reported and the build fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPolicy {
    Ignore,
    Warn,
    Error,
}

/// Treatment of sidebar entries that name unknown documents.
///
/// Either way the entry is dropped from the tree; `strict` additionally
/// fails the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarPolicy {
    Strict,
    #[default]
    Lenient,
}

/// Site configuration loaded from `docweave.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    pub tagline: String,
    /// Public origin of the deployed site, e.g. `https://example.github.io`.
    pub url: String,
    /// Path prefix under `url`; must start and end with `/`.
    pub base_url: String,
    pub organization_name: Option<String>,
    pub project_name: Option<String>,
    pub deployment_branch: Option<String>,
    /// Policy for broken route links, sidebar links, navbar and footer targets.
    pub on_broken_links: ReportPolicy,
    /// Policy for broken links to `.md`/`.mdx` files inside markdown content.
    pub on_broken_markdown_links: ReportPolicy,
    pub on_unknown_sidebar_entry: SidebarPolicy,
    /// Treat identifiers differing only in case as distinct.
    pub case_sensitive: bool,
    pub i18n: I18nConfig,
    pub docs: DocsConfig,
    pub blog: BlogConfig,
    pub links: LinksConfig,
    pub theme: ThemeConfig,
    pub navbar: NavbarConfig,
    pub footer: FooterConfig,
    pub build: BuildConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            tagline: String::new(),
            url: "https://example.com".to_string(),
            base_url: "/".to_string(),
            organization_name: None,
            project_name: None,
            deployment_branch: None,
            on_broken_links: ReportPolicy::Error,
            on_broken_markdown_links: ReportPolicy::Warn,
            on_unknown_sidebar_entry: SidebarPolicy::Lenient,
            case_sensitive: false,
            i18n: I18nConfig::default(),
            docs: DocsConfig::default(),
            blog: BlogConfig::default(),
            links: LinksConfig::default(),
            theme: ThemeConfig::default(),
            navbar: NavbarConfig::default(),
            footer: FooterConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with('/') || !self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must start and end with '/'".into(),
            ));
        }
        if url::Url::parse(&self.url).is_err() {
            return Err(ConfigError::Validation(format!(
                "url is not an absolute URL: {}",
                self.url
            )));
        }
        if self.blog.sidebar_count == 0 {
            return Err(ConfigError::Validation(
                "blog.sidebar_count must be at least 1".into(),
            ));
        }
        for (i, item) in self.navbar.items.iter().enumerate() {
            item.target().ok_or_else(|| {
                ConfigError::Validation(format!(
                    "navbar.items[{i}] must set exactly one of to, href, sidebar_id"
                ))
            })?;
        }
        for column in &self.footer.columns {
            for (i, link) in column.items.iter().enumerate() {
                if link.to.is_some() == link.href.is_some() {
                    return Err(ConfigError::Validation(format!(
                        "footer column '{}' item {i} must set exactly one of to, href",
                        column.title
                    )));
                }
            }
        }
        self.locale_set()?;
        Ok(())
    }

    /// The configured locales as a validated [`LocaleSet`].
    pub fn locale_set(&self) -> Result<LocaleSet, ConfigError> {
        Ok(LocaleSet::new(
            &self.i18n.default_locale,
            self.i18n.locales.iter().map(String::as_str),
        )?)
    }

    /// Content root descriptors for every enabled kind and supported locale.
    ///
    /// Default-locale content lives directly under the site root; other
    /// locales live under `<i18n.path>/<locale>/`. Default-locale roots come
    /// first, then the others in lexicographic locale order.
    pub fn content_roots(&self, site_root: &Path) -> Vec<ContentRoot> {
        let mut locales: Vec<&str> = self.i18n.locales.iter().map(String::as_str).collect();
        locales.sort_unstable();
        locales.dedup();
        locales.sort_by_key(|l| *l != self.i18n.default_locale);

        let mut roots = Vec::new();
        for locale in locales {
            let base = if locale == self.i18n.default_locale {
                site_root.to_path_buf()
            } else {
                site_root.join(&self.i18n.path).join(locale)
            };
            if self.docs.enabled {
                roots.push(ContentRoot {
                    kind: ContentKind::Docs,
                    path: base.join(&self.docs.path),
                    locale: locale.to_string(),
                    route_base: self.route_base(locale, &self.docs.route_base_path),
                });
            }
            if self.blog.enabled {
                roots.push(ContentRoot {
                    kind: ContentKind::Blog,
                    path: base.join(&self.blog.path),
                    locale: locale.to_string(),
                    route_base: self.route_base(locale, &self.blog.route_base_path),
                });
            }
        }
        roots
    }

    /// Route prefix for one content kind in one locale, without trailing `/`.
    fn route_base(&self, locale: &str, kind_base: &str) -> String {
        let mut route = self.base_url.clone();
        if locale != self.i18n.default_locale {
            route.push_str(locale);
            route.push('/');
        }
        route.push_str(kind_base.trim_matches('/'));
        route.trim_end_matches('/').to_string()
    }

    /// Host of the configured site URL, used to recognize same-site links.
    pub fn site_host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
    }
}

/// Internationalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    pub default_locale: String,
    /// Supported locales; must include `default_locale`.
    pub locales: Vec<String>,
    /// Directory holding translated content roots, one subdirectory per locale.
    pub path: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales: vec!["en".to_string()],
            path: "i18n".to_string(),
        }
    }
}

/// Docs content root settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    pub enabled: bool,
    pub path: String,
    /// Sidebar layout file relative to the site root. Missing file means
    /// one auto-generated sidebar.
    pub sidebar_path: String,
    pub route_base_path: String,
    /// Base URL for "edit this page" links, passed through to the renderer.
    pub edit_url: Option<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "docs".to_string(),
            sidebar_path: "sidebars.toml".to_string(),
            route_base_path: "docs".to_string(),
            edit_url: None,
        }
    }
}

/// Blog content root settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    pub enabled: bool,
    pub path: String,
    pub route_base_path: String,
    /// Number of recent posts listed in the blog sidebar.
    pub sidebar_count: usize,
    pub show_reading_time: bool,
    pub edit_url: Option<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "blog".to_string(),
            route_base_path: "blog".to_string(),
            sidebar_count: 5,
            show_reading_time: true,
            edit_url: None,
        }
    }
}

/// Link checking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    /// Check `#anchor` parts against the heading index of the target page.
    pub check_anchors: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            check_anchors: true,
        }
    }
}

/// Theme selection and color-mode policy flags. Passed through to the
/// renderer untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
    pub custom_css: Option<String>,
    pub color_mode: ColorModeConfig,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "classic".to_string(),
            custom_css: None,
            color_mode: ColorModeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorModeConfig {
    /// Mode used when the visitor has expressed no preference.
    pub default_mode: ColorMode,
    /// Hide the light/dark switch.
    pub disable_switch: bool,
    /// Follow the visitor's `prefers-color-scheme` instead of `default_mode`.
    pub respect_prefers_color_scheme: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavbarPosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavbarConfig {
    /// Navbar title; the site title when absent.
    pub title: Option<String>,
    pub items: Vec<NavbarItem>,
}

/// One navbar entry. Exactly one of `to`, `href`, `sidebar_id` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavbarItem {
    pub label: String,
    /// Internal route, checked like any other link.
    pub to: Option<String>,
    /// External URL, never checked.
    pub href: Option<String>,
    /// Opens the first page of the named sidebar.
    pub sidebar_id: Option<String>,
    pub position: NavbarPosition,
}

/// What a navbar entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget<'a> {
    Route(&'a str),
    External(&'a str),
    Sidebar(&'a str),
}

impl NavbarItem {
    /// The single configured target, or `None` if zero or several are set.
    pub fn target(&self) -> Option<NavTarget<'_>> {
        match (&self.to, &self.href, &self.sidebar_id) {
            (Some(to), None, None) => Some(NavTarget::Route(to)),
            (None, Some(href), None) => Some(NavTarget::External(href)),
            (None, None, Some(id)) => Some(NavTarget::Sidebar(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterStyle {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterConfig {
    pub style: FooterStyle,
    pub copyright: Option<String>,
    pub columns: Vec<FooterColumn>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterColumn {
    pub title: String,
    pub items: Vec<FooterLink>,
}

/// A footer link. Exactly one of `to` (internal) and `href` (external) is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterLink {
    pub label: String,
    pub to: Option<String>,
    pub href: Option<String>,
}

/// Build execution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Maximum number of parallel scan workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
    /// Keep documents marked `draft: true` in front matter.
    pub include_drafts: bool,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least one
pub fn effective_threads(config: &BuildConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `docweave.toml` from the given site root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    load_config_file(&root.join(CONFIG_FILENAME))
}

/// Load a config file from an explicit path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config_file(config_path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(config_path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `docweave.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docweave configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

title = "My Site"
tagline = ""

# Public origin of the deployed site and the path it is served under.
# base_url must start and end with "/".
url = "https://example.com"
base_url = "/"

# organization_name = "my-org"
# project_name = "my-site"
# deployment_branch = "gh-pages"

# Link policies: "ignore", "warn" or "error".
# on_broken_links governs route links, sidebar links, navbar and footer targets.
# on_broken_markdown_links governs links to .md/.mdx files inside content.
on_broken_links = "error"
on_broken_markdown_links = "warn"

# Sidebar entries naming unknown docs: "strict" fails the build,
# "lenient" drops them with a warning.
on_unknown_sidebar_entry = "lenient"

# Treat identifiers that differ only in case as distinct documents.
# Leave false if the site may be served from a case-insensitive filesystem.
case_sensitive = false

# ---------------------------------------------------------------------------
# Internationalization
# ---------------------------------------------------------------------------
[i18n]
default_locale = "en"
locales = ["en"]
# Translated content lives in <path>/<locale>/docs and <path>/<locale>/blog.
path = "i18n"

# ---------------------------------------------------------------------------
# Docs
# ---------------------------------------------------------------------------
[docs]
enabled = true
path = "docs"
# Sidebar layout; when the file is missing, one sidebar is generated
# from the folder structure.
sidebar_path = "sidebars.toml"
route_base_path = "docs"
# edit_url = "https://github.com/my-org/my-site/tree/main/"

# ---------------------------------------------------------------------------
# Blog
# ---------------------------------------------------------------------------
[blog]
enabled = true
path = "blog"
route_base_path = "blog"
# Number of recent posts listed in the blog sidebar.
sidebar_count = 5
show_reading_time = true

# ---------------------------------------------------------------------------
# Link checking
# ---------------------------------------------------------------------------
[links]
# Check "#anchor" parts against the headings of the target page.
check_anchors = true

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
name = "classic"
# custom_css = "src/css/custom.css"

[theme.color_mode]
default_mode = "light"
disable_switch = false
respect_prefers_color_scheme = false

# ---------------------------------------------------------------------------
# Navbar
# ---------------------------------------------------------------------------
[navbar]
# title = "My Site"
#
# [[navbar.items]]
# label = "Docs"
# sidebar_id = "docs"
#
# [[navbar.items]]
# label = "Blog"
# to = "/blog"
#
# [[navbar.items]]
# label = "GitHub"
# href = "https://github.com/my-org/my-site"
# position = "right"

# ---------------------------------------------------------------------------
# Footer
# ---------------------------------------------------------------------------
[footer]
style = "light"
# copyright = "Copyright 2026 My Org"
#
# [[footer.columns]]
# title = "Docs"
# items = [{ label = "Intro", to = "/docs/intro" }]

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Maximum parallel scan workers. Omit to auto-detect (= number of CPU cores).
# max_threads = 4
include_drafts = false
"##
}
