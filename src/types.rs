//! Shared types used across all pipeline components.
//!
//! Content items are created once by the inventory scan and read by every
//! later stage; they also appear in the serialized site manifest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of content root. New content kinds are new variants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Docs,
    Blog,
}

impl ContentKind {
    /// Identifier prefix for items of this kind (`docs/…`, `blog/…`).
    pub fn prefix(self) -> &'static str {
        match self {
            ContentKind::Docs => "docs",
            ContentKind::Blog => "blog",
        }
    }

    /// Kind owning an identifier, judged by its first segment.
    pub fn of_id(id: &str) -> Option<ContentKind> {
        match id.split('/').next()? {
            "docs" => Some(ContentKind::Docs),
            "blog" => Some(ContentKind::Blog),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A content root: one directory of content files of one kind and locale.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRoot {
    pub kind: ContentKind,
    pub path: PathBuf,
    pub locale: String,
    /// Route prefix of items in this root, without trailing `/`
    /// (e.g. `/book/fr/docs`).
    pub route_base: String,
}

/// One content file, discovered during the inventory scan.
///
/// Identifiers are unique within a locale. The same identifier in two
/// locales means the second file is a translation of the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// `kind/normalized/relative/path`, e.g. `docs/guides/setup`
    pub id: String,
    pub kind: ContentKind,
    pub locale: String,
    /// Front matter title, first `# heading`, or the file name as fallback
    pub title: String,
    /// Path relative to the content root, `/`-separated
    pub source_path: String,
    /// Route under the site base URL, e.g. `/docs/guides/setup`
    pub permalink: String,
    /// Raw link targets in document order, exactly as authored
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Heading anchor ids in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    /// Publication date for blog posts (`YYYY-MM-DD` or as authored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ContentItem {
    /// Label shown in navigation.
    pub fn nav_label(&self) -> &str {
        self.sidebar_label.as_deref().unwrap_or(&self.title)
    }

    pub fn has_heading(&self, anchor: &str) -> bool {
        self.headings.iter().any(|h| h == anchor)
    }
}
