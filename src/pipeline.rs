//! The build: configuration in, manifest out.
//!
//! ```text
//! docweave.toml ─┐
//!                ├─ scan ──► inventory ─┬─ locale resolve ─┐
//! content roots ─┘                      ├─ navigation ─────┼─ link check ─► findings ─► assemble
//!                                       └──────────────────┘
//! ```
//!
//! Structural errors (bad config, duplicate identifiers, duplicate sidebar
//! entries) abort immediately with a [`BuildError`]. Everything else is
//! collected as findings so one run reports every problem; the assembler
//! then decides whether a manifest is produced.
//!
//! All parallel work runs on a rayon pool local to the build, sized by
//! `build.max_threads`.

use crate::config::{self, ConfigError, SiteConfig};
use crate::diagnostics::{self, Findings, Severity};
use crate::inventory::{self, ContentInventory, InventoryError, ScanOptions};
use crate::links::{self, CheckOptions, ReferenceReport, ReferenceStatus};
use crate::locale::{self, LocaleSet, PerLocaleInventory};
use crate::manifest::{
    self, ContentSettings, LocaleSummary, ManifestError, ManifestParts, SiteInfo, SiteManifest,
};
use crate::navigation::{
    self, NavOptions, NavigationError, NavigationOutcome, NavigationTree, SidebarError, SidebarSpec,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("Sidebar error: {0}")]
    Sidebar(#[from] SidebarError),
    /// Carries the findings collected before navigation failed.
    #[error("Navigation error: {source}")]
    Navigation {
        source: NavigationError,
        findings: Findings,
    },
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl BuildError {
    /// Non-fatal findings gathered before the build stopped, if any step
    /// had produced them.
    pub fn findings(&self) -> Option<&Findings> {
        match self {
            BuildError::Navigation { findings, .. } => Some(findings),
            _ => None,
        }
    }
}

/// A site root with its resolved configuration.
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Site {
    /// Load the configuration from `config_path`, or `docweave.toml` under `root`.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self, BuildError> {
        let config = match config_path {
            Some(path) => config::load_config_file(path)?,
            None => config::load_config(root)?,
        };
        debug!(root = %root.display(), "configuration loaded");
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            case_sensitive: self.config.case_sensitive,
            include_drafts: self.config.build.include_drafts,
        }
    }

    fn sidebars(&self) -> Result<SidebarSpec, BuildError> {
        if !self.config.docs.enabled {
            return Ok(SidebarSpec {
                sidebars: BTreeMap::new(),
            });
        }
        Ok(navigation::load_sidebars(
            &self.root.join(&self.config.docs.sidebar_path),
        )?)
    }
}

/// Counts shown in the build summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildStats {
    pub items_by_locale: BTreeMap<String, usize>,
    pub sidebars: usize,
    pub references: usize,
    pub broken: usize,
    pub ambiguous: usize,
}

/// Result of a build that got past every structural check.
#[derive(Debug)]
pub struct BuildOutcome {
    pub stats: BuildStats,
    pub findings: Findings,
    /// `None` when an error-severity finding blocked assembly.
    pub manifest: Option<SiteManifest>,
}

impl BuildOutcome {
    pub fn succeeded(&self) -> bool {
        self.manifest.is_some()
    }
}

fn thread_pool(config: &SiteConfig) -> Result<rayon::ThreadPool, BuildError> {
    let threads = config::effective_threads(&config.build);
    debug!(threads, "starting worker pool");
    Ok(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?)
}

/// Scan the content roots only.
pub fn scan(site: &Site) -> Result<ContentInventory, BuildError> {
    let pool = thread_pool(&site.config)?;
    let roots = site.config.content_roots(&site.root);
    let inventory = pool.install(|| inventory::scan(&roots, &site.scan_options()))?;
    Ok(inventory)
}

/// Build the navigation of every locale in parallel. Each locale is built
/// to completion so a failure in one does not hide findings of the others.
fn build_navigation(
    inventory: &ContentInventory,
    locales: &LocaleSet,
    sidebars: &SidebarSpec,
    options: &NavOptions,
) -> Vec<(String, Result<NavigationOutcome, NavigationError>)> {
    let tags: Vec<&str> = locales.iter().collect();
    tags.par_iter()
        .map(|locale| {
            let outcome = navigation::build(inventory, locales, locale, sidebars, options);
            (locale.to_string(), outcome)
        })
        .collect()
}

/// Run the full pipeline.
pub fn run(site: &Site) -> Result<BuildOutcome, BuildError> {
    let config = &site.config;
    let locale_set = config.locale_set()?;
    let sidebars = site.sidebars()?;
    let pool = thread_pool(config)?;

    pool.install(|| -> Result<BuildOutcome, BuildError> {
        info!("scanning content");
        let roots = config.content_roots(&site.root);
        let inventory = inventory::scan(&roots, &site.scan_options())?;
        info!(items = inventory.len(), "inventory complete");

        let nav_options = NavOptions {
            blog_sidebar_count: config.blog.sidebar_count,
        };
        let (resolved, navigation) = rayon::join(
            || locale::resolve(&inventory, &locale_set),
            || build_navigation(&inventory, &locale_set, &sidebars, &nav_options),
        );
        let mut findings = Findings::new();
        findings.extend(diagnostics::from_locale_warnings(&resolved.warnings));

        let mut trees: BTreeMap<String, NavigationTree> = BTreeMap::new();
        let mut failure = None;
        for (locale, outcome) in navigation {
            match outcome {
                Ok(outcome) => {
                    findings.extend(diagnostics::from_unknown_entries(
                        &locale,
                        &outcome.unknown_entries,
                        config.on_unknown_sidebar_entry,
                    ));
                    trees.insert(locale, outcome.tree);
                }
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(source) = failure {
            findings.sort();
            log_findings(&findings);
            return Err(BuildError::Navigation { source, findings });
        }
        info!(locales = trees.len(), "navigation built");

        let (navbar, navbar_findings) = manifest::resolve_navbar(
            &config.navbar.items,
            &trees,
            Severity::for_sidebar_policy(config.on_unknown_sidebar_entry),
        );
        findings.extend(navbar_findings);

        info!("checking links");
        let check_options = CheckOptions::from_config(config);
        let references = links::check(
            &inventory,
            &locale_set,
            &trees,
            &links::config_links(config),
            &check_options,
        );
        findings.extend(diagnostics::from_references(&references, |r| {
            check_options.policy_for(r.origin)
        }));
        findings.sort();

        let stats = stats(&inventory, &trees, &references);
        log_findings(&findings);

        let parts = ManifestParts {
            site: SiteInfo::from_config(config),
            content: ContentSettings::from_config(config),
            locales: LocaleSummary::from_resolved(&resolved),
            navigation: trees,
            references,
            navbar,
            footer: config.footer.clone(),
            theme: config.theme.clone(),
        };
        let manifest = match manifest::assemble(parts, &findings) {
            Ok(manifest) => {
                info!(fingerprint = %manifest.fingerprint, "manifest assembled");
                Some(manifest)
            }
            Err(ManifestError::BuildFailure(_)) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(BuildOutcome {
            stats,
            findings,
            manifest,
        })
    })
}

/// Resolve locales without building navigation, for `scan` output.
pub fn resolve_locales(site: &Site, inventory: &ContentInventory) -> Result<PerLocaleInventory, BuildError> {
    Ok(locale::resolve(inventory, &site.config.locale_set()?))
}

fn stats(
    inventory: &ContentInventory,
    trees: &BTreeMap<String, NavigationTree>,
    references: &ReferenceReport,
) -> BuildStats {
    BuildStats {
        items_by_locale: inventory::count_by_locale(inventory)
            .into_iter()
            .map(|(locale, count)| (locale.to_string(), count))
            .collect(),
        sidebars: trees.values().map(|t| t.sidebars.len()).max().unwrap_or(0),
        references: references.references.len(),
        broken: references.count(ReferenceStatus::Broken),
        ambiguous: references.count(ReferenceStatus::Ambiguous),
    }
}

fn log_findings(findings: &Findings) {
    let errors = findings.count(Severity::Error);
    let warnings = findings.count(Severity::Warning);
    if errors > 0 {
        warn!(errors, warnings, "build has errors");
    } else if warnings > 0 {
        warn!(warnings, "build has warnings");
    }
}
