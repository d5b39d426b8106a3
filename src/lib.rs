//! # docweave
//!
//! A navigation and link-integrity builder for documentation sites. The
//! filesystem is the data source: markdown files under `docs/` and `blog/`
//! become content items, folders become sidebar categories, and translated
//! copies under `i18n/<locale>/` become locale partitions.
//!
//! # Architecture: One Pipeline, One Manifest
//!
//! ```text
//! 1. Scan       content roots  →  ContentInventory    (filesystem → items)
//! 2. Navigate   inventory      →  NavigationTree/locale
//! 3. Resolve    inventory      →  PerLocaleInventory  (translation gaps)
//! 4. Check      inventory+trees →  ReferenceReport
//! 5. Assemble   all of the above →  manifest.json
//! ```
//!
//! Steps 2 and 3 only read the inventory and run in parallel. Step 4 needs
//! finished trees. Each step returns a fresh immutable value; nothing is
//! written until the manifest is assembled.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`inventory`] | Walks content roots, parses front matter and links, produces the inventory |
//! | [`navigation`] | Sidebar layouts (`sidebars.toml` or generated) → navigation trees |
//! | [`links`] | Resolves every internal link and classifies it resolved, broken or ambiguous |
//! | [`locale`] | Locale sets, per-locale partitions, untranslated and orphaned pages |
//! | [`manifest`] | Composes the final manifest and its fingerprint |
//! | [`diagnostics`] | Findings with policy-driven severity |
//! | [`pipeline`] | Wires the steps together on a local thread pool |
//! | [`config`] | `docweave.toml` loading, stock defaults, validation |
//! | [`types`] | Content items and roots shared by every step |
//! | [`naming`] | `NNN-name` prefixes, date prefixes, path normalization |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Findings Over Early Exit
//!
//! Broken links and unknown sidebar entries do not stop the build. They are
//! collected with a severity chosen by the site's policies, and only the
//! manifest assembler turns error-severity findings into a failed build.
//! One run reports every problem. Structural errors, such as two files
//! claiming the same identifier, stop the pipeline at once.
//!
//! ## Case-Insensitive Identifiers
//!
//! Identifier collisions are checked case-insensitively unless
//! `case_sensitive = true`: `Intro.md` and `intro.md` would overwrite each
//! other on a case-insensitive host filesystem.
//!
//! ## NNN-Prefix Ordering
//!
//! Files and folders may carry a numeric prefix (`01-`, `020-`) that sets
//! their sidebar position and is stripped from identifiers and routes.
//! Parsing lives in [`naming::parse_entry_name`].

pub mod config;
pub mod diagnostics;
pub mod inventory;
pub mod links;
pub mod locale;
pub mod manifest;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
