//! Centralized file and path naming rules.
//!
//! Every component that turns a path into an identifier (the inventory scan,
//! the sidebar builder, the link checker) goes through this module so that
//! the same normalization is applied everywhere. A link resolves exactly
//! when its normalized form equals an identifier produced by the scan.
//!
//! ## Number Prefixes
//!
//! Doc files and folders may carry an ordering prefix (`NNN-`):
//! - `01-intro.md` → identifier segment `intro`, sidebar position `1`
//! - `020-Getting-Started/` → segment `Getting-Started`, position `20`
//!
//! The prefix only orders entries; it never shows up in identifiers or
//! routes, so renumbering files does not break links.
//!
//! ## Blog Dates
//!
//! Blog posts use a `YYYY-MM-DD-` prefix instead. It becomes the post date
//! and is stripped from the identifier the same way.

/// Result of parsing a numbered entry name like `020-Getting-Started`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `20` from `020-Getting-Started`)
    pub number: Option<u32>,
    /// Raw name part after `NNN-`, dashes preserved. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
    /// Display title: name with dashes and underscores converted to spaces.
    pub display_title: String,
}

/// Parse an entry name following the `NNN-name` convention.
///
/// - `"020-Getting-Started"` → number=Some(20), name="Getting-Started"
/// - `"001"` → number=Some(1), name=""
/// - `"wip-drafts"` → number=None, name="wip-drafts"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some(dash_pos) = name.find('-') {
        let prefix = &name[..dash_pos];
        if let Ok(num) = prefix.parse::<u32>() {
            let raw = &name[dash_pos + 1..];
            return ParsedName {
                number: Some(num),
                name: raw.to_string(),
                display_title: display_title(raw),
            };
        }
    }
    if let Ok(num) = name.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: name.to_string(),
        display_title: display_title(name),
    }
}

fn display_title(name: &str) -> String {
    name.replace(['-', '_'], " ")
}

/// Split a `YYYY-MM-DD-` date prefix off a blog file stem.
///
/// Returns `(date, rest)` where `rest` is the slug part. A stem that is only
/// a date yields an empty slug.
pub fn parse_date_prefix(stem: &str) -> Option<(String, String)> {
    let bytes = stem.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    let shape_ok = bytes[..10].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    let rest = match &stem[10..] {
        "" => String::new(),
        r if r.starts_with('-') => r[1..].to_string(),
        _ => return None,
    };
    Some((stem[..10].to_string(), rest))
}

/// Strip a markdown extension (`.md` / `.mdx`, any case) from a path token.
pub fn strip_markdown_extension(path: &str) -> Option<&str> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".mdx") {
        Some(&path[..path.len() - 4])
    } else if lower.ends_with(".md") {
        Some(&path[..path.len() - 3])
    } else {
        None
    }
}

/// Normalize one doc path segment: drop the ordering prefix.
///
/// A segment that is *only* a number keeps its digits, otherwise `001.md`
/// would normalize to an empty identifier.
pub fn normalize_doc_segment(segment: &str) -> String {
    let parsed = parse_entry_name(segment);
    match parsed.number {
        Some(_) if !parsed.name.is_empty() => parsed.name,
        _ => segment.to_string(),
    }
}

/// Resolve `.` and `..` segments and collapse separators.
///
/// `..` above the root is dropped rather than rejected; the result is then
/// simply looked up and reported broken if it matches nothing.
pub fn normalize_path(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

/// Join a relative reference onto the directory of a source identifier.
///
/// `join_relative("docs/guides/setup", "../intro")` → `docs/intro`
pub fn join_relative(source_id: &str, relative: &str) -> String {
    let dir = match source_id.rfind('/') {
        Some(pos) => &source_id[..pos],
        None => "",
    };
    normalize_path(&format!("{dir}/{relative}"))
}

/// Key used for collision detection and case-insensitive lookup.
pub fn collision_key(id: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        id.to_string()
    } else {
        id.to_lowercase()
    }
}

/// Turn heading text into an anchor id.
///
/// Lower-cases, keeps alphanumerics, `-` and `_`, and maps whitespace to `-`.
/// Everything else is dropped: `"What's new?"` → `whats-new`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            slug.push('-');
        }
    }
    slug
}
