//! Site manifest assembly.
//!
//! The manifest is the single output of a build: navigation per locale,
//! the reference report, the locale summary, and the content, navbar,
//! footer and theme settings the renderer needs. It is composed in one step from
//! finished component outputs and is never produced partially. If any
//! error-severity finding exists, assembly fails and nothing is returned.
//!
//! The `fingerprint` is the SHA-256 of the canonical JSON of every other
//! field, so two builds of the same content produce the same fingerprint.

use crate::config::{FooterConfig, NavTarget, NavbarItem, NavbarPosition, SiteConfig, ThemeConfig};
use crate::diagnostics::{Finding, FindingKind, Findings, Severity};
use crate::links::ReferenceReport;
use crate::locale::PerLocaleInventory;
use crate::navigation::NavigationTree;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("build failed with {} error(s)", .0.count(Severity::Error))]
    BuildFailure(Findings),
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Site metadata copied from the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    pub tagline: String,
    pub url: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_branch: Option<String>,
    /// Navbar title, the site title unless configured.
    pub navbar_title: String,
}

impl SiteInfo {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            tagline: config.tagline.clone(),
            url: config.url.clone(),
            base_url: config.base_url.clone(),
            organization_name: config.organization_name.clone(),
            project_name: config.project_name.clone(),
            deployment_branch: config.deployment_branch.clone(),
            navbar_title: config
                .navbar
                .title
                .clone()
                .unwrap_or_else(|| config.title.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsSettings {
    pub route_base_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogSettings {
    pub route_base_path: String,
    pub show_reading_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
}

/// Settings of each enabled content root; a disabled root is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog: Option<BlogSettings>,
}

impl ContentSettings {
    pub fn from_config(config: &SiteConfig) -> Self {
        let docs = &config.docs;
        let blog = &config.blog;
        Self {
            docs: docs.enabled.then(|| DocsSettings {
                route_base_path: docs.route_base_path.clone(),
                edit_url: docs.edit_url.clone(),
            }),
            blog: blog.enabled.then(|| BlogSettings {
                route_base_path: blog.route_base_path.clone(),
                show_reading_time: blog.show_reading_time,
                edit_url: blog.edit_url.clone(),
            }),
        }
    }
}

/// Locales served and the default-locale pages each translation falls back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleSummary {
    pub default_locale: String,
    pub locales: Vec<String>,
    pub fallbacks: BTreeMap<String, Vec<String>>,
}

impl LocaleSummary {
    pub fn from_resolved(resolved: &PerLocaleInventory) -> Self {
        let mut locales: Vec<String> = resolved.partitions.keys().cloned().collect();
        locales.sort_by_key(|l| *l != resolved.default_locale);
        Self {
            default_locale: resolved.default_locale.clone(),
            locales,
            fallbacks: resolved.fallbacks.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavbarTarget {
    Route { to: String },
    External { href: String },
    /// First doc of a sidebar, per locale; absent when the sidebar is empty.
    Sidebar {
        sidebar_id: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        first_doc: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavbarEntry {
    pub label: String,
    pub position: NavbarPosition,
    pub target: NavbarTarget,
}

/// Resolve navbar items against the built navigation.
///
/// Items naming a sidebar that no locale defines are dropped and reported
/// with the given severity. Configuration validation guarantees each item
/// has exactly one target.
pub fn resolve_navbar(
    items: &[NavbarItem],
    navigation: &BTreeMap<String, NavigationTree>,
    unknown_severity: Severity,
) -> (Vec<NavbarEntry>, Vec<Finding>) {
    let mut entries = Vec::new();
    let mut findings = Vec::new();
    for item in items {
        let target = match item.target() {
            Some(NavTarget::Route(to)) => NavbarTarget::Route { to: to.to_string() },
            Some(NavTarget::External(href)) => NavbarTarget::External {
                href: href.to_string(),
            },
            Some(NavTarget::Sidebar(id)) => {
                if !navigation.values().any(|t| t.sidebars.contains_key(id)) {
                    findings.push(Finding::new(
                        unknown_severity,
                        FindingKind::UnknownNavbarSidebar,
                        format!("navbar item '{}' names unknown sidebar '{id}'", item.label),
                    ));
                    continue;
                }
                NavbarTarget::Sidebar {
                    sidebar_id: id.to_string(),
                    first_doc: navigation
                        .iter()
                        .filter_map(|(locale, tree)| {
                            tree.first_doc(id).map(|doc| (locale.clone(), doc.to_string()))
                        })
                        .collect(),
                }
            }
            None => continue,
        };
        entries.push(NavbarEntry {
            label: item.label.clone(),
            position: item.position,
            target,
        });
    }
    (entries, findings)
}

/// Everything the manifest contains apart from its fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestParts {
    pub site: SiteInfo,
    pub content: ContentSettings,
    pub locales: LocaleSummary,
    pub navigation: BTreeMap<String, NavigationTree>,
    pub references: ReferenceReport,
    pub navbar: Vec<NavbarEntry>,
    pub footer: FooterConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteManifest {
    #[serde(flatten)]
    pub parts: ManifestParts,
    pub fingerprint: String,
}

/// Compose the manifest, or fail with every finding if any is an error.
pub fn assemble(parts: ManifestParts, findings: &Findings) -> Result<SiteManifest, ManifestError> {
    if findings.has_errors() {
        return Err(ManifestError::BuildFailure(findings.clone()));
    }
    let canonical = serde_json::to_vec(&parts)?;
    let fingerprint = format!("{:x}", Sha256::digest(&canonical));
    Ok(SiteManifest { parts, fingerprint })
}

/// Write `manifest.json` into `out_dir`, creating it if needed.
pub fn write_manifest(manifest: &SiteManifest, out_dir: &Path) -> Result<PathBuf, ManifestError> {
    let path = out_dir.join(MANIFEST_FILENAME);
    let io_err = |source| ManifestError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(out_dir).map_err(io_err)?;
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).map_err(io_err)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationNode;
    use tempfile::TempDir;

    fn parts() -> ManifestParts {
        let config = SiteConfig::default();
        ManifestParts {
            site: SiteInfo::from_config(&config),
            content: ContentSettings::from_config(&config),
            locales: LocaleSummary {
                default_locale: "en".to_string(),
                locales: vec!["en".to_string()],
                fallbacks: BTreeMap::new(),
            },
            navigation: BTreeMap::from([(
                "en".to_string(),
                NavigationTree {
                    sidebars: BTreeMap::from([(
                        "docs".to_string(),
                        vec![NavigationNode::Page {
                            id: "docs/intro".to_string(),
                            label: "Intro".to_string(),
                            permalink: "/docs/intro".to_string(),
                        }],
                    )]),
                    blog: vec![],
                },
            )]),
            references: ReferenceReport::default(),
            navbar: vec![],
            footer: config.footer.clone(),
            theme: config.theme.clone(),
        }
    }

    #[test]
    fn assemble_fails_on_error_findings() {
        let mut findings = Findings::new();
        findings.push(Finding::new(Severity::Warning, FindingKind::Untranslated, "w"));
        assert!(assemble(parts(), &findings).is_ok());

        findings.push(Finding::new(Severity::Error, FindingKind::BrokenReference, "e"));
        match assemble(parts(), &findings) {
            Err(ManifestError::BuildFailure(all)) => assert_eq!(all.len(), 2),
            other => panic!("expected build failure, got {other:?}"),
        }
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = assemble(parts(), &Findings::new()).unwrap();
        let b = assemble(parts(), &Findings::new()).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint.len(), 64);

        let mut changed = parts();
        changed.site.title = "Other".to_string();
        let c = assemble(changed, &Findings::new()).unwrap();
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn navbar_sidebar_items_resolve_first_doc() {
        let p = parts();
        let items = vec![
            NavbarItem {
                label: "Docs".to_string(),
                sidebar_id: Some("docs".to_string()),
                ..NavbarItem::default()
            },
            NavbarItem {
                label: "API".to_string(),
                sidebar_id: Some("api".to_string()),
                ..NavbarItem::default()
            },
            NavbarItem {
                label: "GitHub".to_string(),
                href: Some("https://github.com".to_string()),
                position: NavbarPosition::Right,
                ..NavbarItem::default()
            },
        ];
        let (entries, findings) = resolve_navbar(&items, &p.navigation, Severity::Warning);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].target,
            NavbarTarget::Sidebar {
                sidebar_id: "docs".to_string(),
                first_doc: BTreeMap::from([("en".to_string(), "docs/intro".to_string())]),
            }
        );
        assert_eq!(entries[1].position, NavbarPosition::Right);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::UnknownNavbarSidebar);
    }

    #[test]
    fn manifest_written_as_json() {
        let tmp = TempDir::new().unwrap();
        let manifest = assemble(parts(), &Findings::new()).unwrap();
        let path = write_manifest(&manifest, &tmp.path().join("out")).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["fingerprint"], manifest.fingerprint.as_str());
        assert_eq!(value["navigation"]["en"]["sidebars"]["docs"][0]["type"], "page");
        assert_eq!(value["site"]["base_url"], "/");
    }

    #[test]
    fn renderer_settings_carried_from_config() {
        let config: SiteConfig = toml::from_str(
            r#"
title = "Handbook"

[docs]
edit_url = "https://github.com/acme/handbook/edit/main/"

[blog]
show_reading_time = false

[navbar]
title = "Acme"
"#,
        )
        .unwrap();
        let content = ContentSettings::from_config(&config);
        assert_eq!(
            content.docs,
            Some(DocsSettings {
                route_base_path: "docs".to_string(),
                edit_url: Some("https://github.com/acme/handbook/edit/main/".to_string()),
            })
        );
        let blog = content.blog.unwrap();
        assert!(!blog.show_reading_time);
        assert_eq!(blog.edit_url, None);
        assert_eq!(SiteInfo::from_config(&config).navbar_title, "Acme");

        let plain: SiteConfig = toml::from_str("title = \"Handbook\"\n\n[blog]\nenabled = false\n").unwrap();
        assert_eq!(SiteInfo::from_config(&plain).navbar_title, "Handbook");
        assert_eq!(ContentSettings::from_config(&plain).blog, None);
    }
}
