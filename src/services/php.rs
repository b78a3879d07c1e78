//! PHP executable identity and version matching.
//!
//! The same PHP release shows up under several naming conventions depending
//! on the backend: `php`, `php8.2`, `php@8.2`. Identity extraction pulls the
//! pieces apart; version equality compares digit-only projections so all of
//! those spellings denote one release.

use regex::Regex;
use std::path::Path;

/// The pieces of a PHP executable path.
///
/// All fields are absent when the path does not look like a PHP executable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhpIdentity {
    /// Directory portion of the path.
    pub path_prefix: Option<String>,

    /// The base executable name (always "php" when matched).
    pub base_name: Option<String>,

    /// Version suffix as written ("8.2", "@8.2"), when present.
    pub version_suffix: Option<String>,
}

impl PhpIdentity {
    /// Formula label: base name plus version suffix.
    ///
    /// Yields "php@8.2", "php8.2", or plain "php" when no suffix was found.
    pub fn formula(&self) -> Option<String> {
        self.base_name.as_ref().map(|base| match &self.version_suffix {
            Some(suffix) => format!("{}{}", base, suffix),
            None => base.clone(),
        })
    }
}

/// Extract a PHP identity from an executable path.
///
/// Matches `<prefix>/php<version>?` where the version may use either the
/// `8.2` or `@8.2` spelling. Cellar-style layouts carry the version on a
/// directory segment instead (".../Cellar/php@8.2/8.2.30/bin/php"), so when
/// the basename has no suffix the prefix segments are consulted as well.
pub fn parse_php_path(path: &str) -> PhpIdentity {
    let Ok(re) = Regex::new(r"^(?P<prefix>.*)/(?P<base>php)(?P<suffix>@?[0-9][0-9.]*)?$") else {
        return PhpIdentity::default();
    };
    let Some(caps) = re.captures(path) else {
        return PhpIdentity::default();
    };

    let prefix = caps.name("prefix").map(|m| m.as_str().to_string());
    let base = caps.name("base").map(|m| m.as_str().to_string());
    let mut suffix = caps.name("suffix").map(|m| m.as_str().to_string());

    if suffix.is_none() {
        if let (Some(prefix), Ok(segment_re)) =
            (prefix.as_deref(), Regex::new(r"^php(@?[0-9][0-9.]*)$"))
        {
            suffix = prefix
                .split('/')
                .find_map(|segment| segment_re.captures(segment))
                .map(|c| c[1].to_string());
        }
    }

    PhpIdentity {
        path_prefix: prefix,
        base_name: base,
        version_suffix: suffix,
    }
}

/// Resolve the identity behind a well-known PHP executable path.
///
/// Follows the symlink chain when possible; a plain binary (or a dangling
/// path) is parsed as-is.
pub fn linked_identity(executable: &Path) -> PhpIdentity {
    let resolved = std::fs::canonicalize(executable)
        .or_else(|_| std::fs::read_link(executable))
        .unwrap_or_else(|_| executable.to_path_buf());

    parse_php_path(&resolved.to_string_lossy())
}

/// Strip every non-digit character.
pub fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digit-projection equality: "8.2", "82", "php8.2", and "php@8.2" all
/// denote the same release. The full digit run is compared, so "php8.2" and
/// "php8.20" stay distinct.
pub fn are_php_versions_equal(a: &str, b: &str) -> bool {
    digits(a) == digits(b)
}

/// First supported entry whose digit projection equals the formula's.
pub fn match_supported<'a>(formula: &str, supported: &[&'a str]) -> Option<&'a str> {
    let projection = digits(formula);
    if projection.is_empty() {
        return None;
    }

    supported
        .iter()
        .find(|candidate| digits(candidate) == projection)
        .copied()
}
