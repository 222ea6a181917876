// Gitignore-style ignore rules
// Each rule compiles one pattern line into a regex matched against paths
// relative to the directory the pattern file was loaded from

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;
use regex::Regex;

use crate::error::EngineError;

/// One compiled ignore pattern
///
/// Negation (`!`), directory-only (trailing `/`) and anchored (leading `/`)
/// markers are stripped during construction; the remaining glob text is
/// compiled into an immutable regex.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    raw: String,
    negation: bool,
    directory_only: bool,
    anchored: bool,
    regex: Regex,
    base_path: PathBuf,
}

impl IgnoreRule {
    pub fn new(line: &str, base_path: &Path) -> Result<Self, EngineError> {
        let raw = line.to_string();
        let mut pattern = line.to_string();

        let negation = pattern.starts_with('!');
        if negation {
            pattern.remove(0);
        }

        let directory_only = pattern.ends_with('/');
        while pattern.ends_with('/') {
            pattern.pop();
        }

        let anchored = pattern.starts_with('/');
        if anchored {
            pattern.remove(0);
        }

        // a leading escaped '#' or '!' is literal
        if pattern.starts_with("\\#") || pattern.starts_with("\\!") {
            pattern.remove(0);
        }

        clean_trailing_spaces(&mut pattern);
        let pattern = pattern.replace("\\ ", " ");

        let source = to_regex(&pattern, anchored, directory_only);
        let regex = Regex::new(&source).map_err(|e| EngineError::InvalidPattern {
            pattern: raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw,
            negation,
            directory_only,
            anchored,
            regex,
            base_path: base_path.to_path_buf(),
        })
    }

    /// The pattern line this rule was built from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn negation(&self) -> bool {
        self.negation
    }

    pub fn directory_only(&self) -> bool {
        self.directory_only
    }

    pub fn anchored(&self) -> bool {
        self.anchored
    }

    /// Directory the pattern file was loaded from; relative paths for
    /// matching are computed against it
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Test this rule against a path
    ///
    /// Directory-only rules never match regular files directly; paths
    /// outside the rule's base directory never match at all.
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        if self.directory_only && !is_dir {
            return false;
        }
        match rel_posix(path, &self.base_path) {
            Some(rel) => self.regex.is_match(&rel),
            None => false,
        }
    }
}

/// Drop trailing unescaped spaces; a trailing `\ ` stays as a literal space
fn clean_trailing_spaces(pattern: &mut String) {
    while pattern.ends_with(' ') && !pattern.ends_with("\\ ") {
        pattern.pop();
    }
}

/// Translate one glob pattern into a regex source string
///
/// `**` matches across path separators, `*` within one segment, `?` one
/// character within a segment; `[...]` passes through as a character class
/// and `[!...]` becomes a negated class. Everything else is escaped.
fn to_regex(pattern: &str, anchored: bool, directory_only: bool) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut escaped = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '[' && i + 1 < chars.len() {
            match chars[i..].iter().position(|&c| c == ']') {
                Some(off) if off > 0 => {
                    let class: String = chars[i..=i + off].iter().collect();
                    escaped.push_str(&translate_char_class(&class));
                    i += off + 1;
                }
                _ => {
                    let rest: String = chars[i..].iter().collect();
                    escaped.push_str(&regex::escape(&rest));
                    break;
                }
            }
        } else {
            let mut buf = [0u8; 4];
            escaped.push_str(&regex::escape(chars[i].encode_utf8(&mut buf)));
            i += 1;
        }
    }

    let glob = escaped
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", "[^/]");

    let prefix = if anchored { "^" } else { "(^|/)" };
    let suffix = if directory_only { "(/|$)" } else { "($|/)" };

    format!("{}{}{}", prefix, glob, suffix)
}

fn translate_char_class(class: &str) -> String {
    if let Some(inner) = class.strip_prefix("[!") {
        // interior passes through verbatim, as in the positive form, so
        // ranges like 0-9 keep their meaning inside the negated class
        let inner = inner.strip_suffix(']').unwrap_or(inner);
        format!("[^{}]", inner)
    } else {
        class.to_string()
    }
}

/// Path relative to `base`, `/`-joined regardless of platform
fn rel_posix(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    if out.is_empty() {
        out.push('.');
    }
    Some(out)
}

/// An ordered list of ignore rules with gitignore evaluation semantics
///
/// Rules are scanned in reverse insertion order so the last-declared rule
/// wins, and negated rules re-include previously ignored paths.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    rules: Vec<IgnoreRule>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse an ignore file into a rule set
    ///
    /// Without a non-empty `extend` base, the set is seeded with a synthetic
    /// `.git/` rule so version-control metadata is always skipped. With one,
    /// the parent's rules are copied first and this file's rules appended;
    /// the parent set is never mutated.
    pub fn from_file(path: &Path, extend: Option<&IgnoreSet>) -> Result<Self, EngineError> {
        let base = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

        let mut set = match extend {
            Some(parent) if !parent.is_empty() => parent.clone(),
            _ => {
                let mut seeded = IgnoreSet::new();
                seeded.rules.push(IgnoreRule::new(".git/", &base)?);
                seeded
            }
        };

        let file = File::open(path)
            .map_err(|e| EngineError::from_io_error(e, "reading ignore file", Some(path.to_path_buf())))?;

        for line in BufReader::new(file).lines() {
            let line = line
                .map_err(|e| EngineError::from_io_error(e, "reading ignore file", Some(path.to_path_buf())))?;
            // blank/comment detection ignores surrounding whitespace, but the
            // rule is built from the untrimmed line so a trailing `\ `
            // survives to the constructor
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match IgnoreRule::new(&line, &base) {
                Ok(rule) => set.rules.push(rule),
                Err(e) => warn!("skipping ignore pattern: {}", e),
            }
        }

        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// Decide whether a path is excluded by this rule set
    ///
    /// A directory-only rule matching any ancestor directory of the path
    /// (inside the rule's base) counts as a match for all descendants.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        for rule in self.rules.iter().rev() {
            if rule.matches(path, is_dir) {
                return !rule.negation;
            }
            if rule.directory_only {
                let ancestor_hit = path
                    .ancestors()
                    .skip(1)
                    .take_while(|p| p.starts_with(rule.base_path()))
                    .any(|p| rule.matches(p, true));
                if ancestor_hit {
                    return !rule.negation;
                }
            }
        }
        false
    }
}
