//! Findings collected across a build.
//!
//! Components never fail a build for policy-controlled problems. They
//! report them, the pipeline turns each into a [`Finding`] with a severity
//! chosen by the configured policy, and the manifest assembler refuses to
//! produce a manifest while any error-severity finding remains.

use crate::config::{ReportPolicy, SidebarPolicy};
use crate::links::{Reference, ReferenceReport, ReferenceStatus};
use crate::locale::LocaleWarning;
use crate::navigation::UnknownEntry;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl Severity {
    /// Severity a report policy assigns to a problem; `None` when ignored.
    pub fn for_policy(policy: ReportPolicy) -> Option<Severity> {
        match policy {
            ReportPolicy::Ignore => None,
            ReportPolicy::Warn => Some(Severity::Warning),
            ReportPolicy::Error => Some(Severity::Error),
        }
    }

    pub fn for_sidebar_policy(policy: SidebarPolicy) -> Severity {
        match policy {
            SidebarPolicy::Strict => Severity::Error,
            SidebarPolicy::Lenient => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    BrokenReference,
    AmbiguousReference,
    UnknownSidebarEntry,
    UnknownNavbarSidebar,
    Untranslated,
    MissingBaseContent,
    UnsupportedLocale,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingKind::BrokenReference => "broken link",
            FindingKind::AmbiguousReference => "ambiguous link",
            FindingKind::UnknownSidebarEntry => "unknown sidebar entry",
            FindingKind::UnknownNavbarSidebar => "unknown navbar sidebar",
            FindingKind::Untranslated => "untranslated",
            FindingKind::MissingBaseContent => "missing base content",
            FindingKind::UnsupportedLocale => "unsupported locale",
        };
        f.write_str(name)
    }
}

/// One diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// Locale the finding applies to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub message: String,
}

impl Finding {
    pub fn new(severity: Severity, kind: FindingKind, message: impl Into<String>) -> Self {
        Finding {
            severity,
            kind,
            locale: None,
            message: message.into(),
        }
    }

    pub fn in_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.severity, self.kind)?;
        if let Some(locale) = &self.locale {
            write!(f, " ({locale})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Every finding of a build, errors first once sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Findings {
    items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.items.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.items.extend(findings);
    }

    /// Sort into a stable order: severity, kind, locale, message.
    pub fn sort(&mut self) {
        self.items.sort();
        self.items.dedup();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

// ============================================================================
// Conversions from component outputs
// ============================================================================

fn reference_message(reference: &Reference) -> String {
    let mut message = format!("{} -> {} ({})", reference.source, reference.raw, reference.origin);
    if let Some(reason) = &reference.reason {
        message.push_str(": ");
        message.push_str(reason);
    }
    message
}

/// Findings for the broken and ambiguous references of a report.
pub fn from_references(
    report: &ReferenceReport,
    policy_for: impl Fn(&Reference) -> ReportPolicy,
) -> Vec<Finding> {
    report
        .problems()
        .filter_map(|reference| {
            let severity = Severity::for_policy(policy_for(reference))?;
            let kind = match reference.status {
                ReferenceStatus::Ambiguous => FindingKind::AmbiguousReference,
                _ => FindingKind::BrokenReference,
            };
            Some(
                Finding::new(severity, kind, reference_message(reference))
                    .in_locale(&reference.locale),
            )
        })
        .collect()
}

pub fn from_unknown_entries(
    locale: &str,
    entries: &[UnknownEntry],
    policy: SidebarPolicy,
) -> Vec<Finding> {
    let severity = Severity::for_sidebar_policy(policy);
    entries
        .iter()
        .map(|entry| {
            Finding::new(
                severity,
                FindingKind::UnknownSidebarEntry,
                format!("sidebar '{}' names unknown doc '{}'", entry.sidebar, entry.id),
            )
            .in_locale(locale)
        })
        .collect()
}

/// Translation findings. Always warnings.
pub fn from_locale_warnings<'a>(warnings: impl IntoIterator<Item = &'a LocaleWarning>) -> Vec<Finding> {
    warnings
        .into_iter()
        .map(|warning| {
            let (kind, locale) = match warning {
                LocaleWarning::Untranslated { locale, .. } => (FindingKind::Untranslated, locale),
                LocaleWarning::MissingBaseContent { locale, .. } => {
                    (FindingKind::MissingBaseContent, locale)
                }
                LocaleWarning::UnsupportedLocale { locale, .. } => {
                    (FindingKind::UnsupportedLocale, locale)
                }
            };
            Finding::new(Severity::Warning, kind, warning.describe()).in_locale(locale)
        })
        .collect()
}
