//! Locale partitioning and translation-gap detection.
//!
//! Items are partitioned by locale tag. Each non-default locale is compared
//! against the default locale:
//!
//! - a default-locale identifier missing from a translation is
//!   *untranslated*; the renderer serves the default-locale content for it
//! - a translated identifier missing from the default locale is *missing
//!   base content*, usually a translation left behind after the original
//!   page was removed or renamed
//!
//! Neither is ever fatal. Both are reported on every build.

use crate::inventory::ContentInventory;
use crate::types::ContentItem;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum LocaleError {
    #[error("no locales configured")]
    Empty,
    #[error("default locale '{0}' is not among the supported locales")]
    DefaultNotSupported(String),
    #[error("invalid locale tag '{0}'")]
    InvalidTag(String),
}

/// Supported locales plus the default. The default is always a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleSet {
    default: String,
    supported: BTreeSet<String>,
}

impl LocaleSet {
    pub fn new<'a>(
        default: &str,
        supported: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, LocaleError> {
        let supported: BTreeSet<String> = supported.into_iter().map(str::to_string).collect();
        if supported.is_empty() {
            return Err(LocaleError::Empty);
        }
        if let Some(bad) = supported.iter().find(|tag| !is_valid_tag(tag)) {
            return Err(LocaleError::InvalidTag(bad.clone()));
        }
        if !supported.contains(default) {
            return Err(LocaleError::DefaultNotSupported(default.to_string()));
        }
        Ok(Self {
            default: default.to_string(),
            supported,
        })
    }

    /// Single-locale set, as used by sites without translations.
    pub fn single(locale: &str) -> Result<Self, LocaleError> {
        Self::new(locale, [locale])
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.supported.contains(locale)
    }

    /// All supported locales, default first, then lexicographic.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default.as_str()).chain(
            self.supported
                .iter()
                .map(String::as_str)
                .filter(move |l| *l != self.default),
        )
    }
}

/// Tags are used as path segments and route prefixes (`/fr/docs/...`).
fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A non-fatal translation finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocaleWarning {
    /// `id` exists in the default locale but not in `locale`.
    Untranslated { locale: String, id: String },
    /// `id` exists in `locale` but not in the default locale.
    MissingBaseContent { locale: String, id: String },
    /// Content tagged with a locale the site does not support.
    UnsupportedLocale { locale: String, id: String },
}

impl LocaleWarning {
    pub fn describe(&self) -> String {
        match self {
            LocaleWarning::Untranslated { locale, id } => {
                format!("{id} has no '{locale}' translation; default-locale content is served")
            }
            LocaleWarning::MissingBaseContent { locale, id } => {
                format!("{id} exists in '{locale}' but not in the default locale")
            }
            LocaleWarning::UnsupportedLocale { locale, id } => {
                format!("{id} is tagged with unsupported locale '{locale}'")
            }
        }
    }
}

/// Inventory partitioned by locale.
#[derive(Debug, Clone, Serialize)]
pub struct PerLocaleInventory {
    pub default_locale: String,
    /// Identifiers authored in each supported locale, sorted.
    pub partitions: BTreeMap<String, Vec<String>>,
    /// Identifiers served from the default locale, per non-default locale.
    pub fallbacks: BTreeMap<String, Vec<String>>,
    pub warnings: Vec<LocaleWarning>,
}

/// Partition the inventory per locale and record translation gaps.
pub fn resolve(inventory: &ContentInventory, locales: &LocaleSet) -> PerLocaleInventory {
    let mut partitions: BTreeMap<String, BTreeSet<&str>> = locales
        .iter()
        .map(|l| (l.to_string(), BTreeSet::new()))
        .collect();
    let mut warnings = Vec::new();

    for item in inventory.items() {
        match partitions.get_mut(&item.locale) {
            Some(ids) => {
                ids.insert(item.id.as_str());
            }
            None => warnings.push(LocaleWarning::UnsupportedLocale {
                locale: item.locale.clone(),
                id: item.id.clone(),
            }),
        }
    }

    let default = locales.default_locale();
    let base: BTreeSet<&str> = partitions.get(default).cloned().unwrap_or_default();
    let mut fallbacks = BTreeMap::new();

    for (locale, ids) in &partitions {
        if locale == default {
            continue;
        }
        let untranslated: Vec<String> = base.difference(ids).map(|id| id.to_string()).collect();
        for id in &untranslated {
            warnings.push(LocaleWarning::Untranslated {
                locale: locale.clone(),
                id: id.clone(),
            });
        }
        for id in ids.difference(&base) {
            warnings.push(LocaleWarning::MissingBaseContent {
                locale: locale.clone(),
                id: id.to_string(),
            });
        }
        fallbacks.insert(locale.clone(), untranslated);
    }
    warnings.sort();

    PerLocaleInventory {
        default_locale: default.to_string(),
        partitions: partitions
            .into_iter()
            .map(|(locale, ids)| (locale, ids.into_iter().map(str::to_string).collect()))
            .collect(),
        fallbacks,
        warnings,
    }
}

/// Items visible in `locale`: its own content plus default-locale fallbacks
/// for identifiers it does not translate. Sorted by identifier.
pub fn effective_items<'a>(
    inventory: &'a ContentInventory,
    locales: &LocaleSet,
    locale: &str,
) -> Vec<&'a ContentItem> {
    let own: Vec<&ContentItem> = inventory.in_locale(locale).collect();
    let mut items = own.clone();
    if locale != locales.default_locale() {
        let translated: BTreeSet<&str> = own.iter().map(|i| i.id.as_str()).collect();
        items.extend(
            inventory
                .in_locale(locales.default_locale())
                .filter(|i| !translated.contains(i.id.as_str())),
        );
    }
    items.sort_by(|a, b| a.id.cmp(&b.id));
    items
}
