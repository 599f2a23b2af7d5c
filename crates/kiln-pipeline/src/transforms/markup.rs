//! Markup rewriting for `build:` blocks.
//!
//! A block looks like
//!
//! ```html
//! <!-- build:css -->
//! <link rel="stylesheet" href="css/reset.css">
//! <link rel="stylesheet" href="css/styles.css">
//! <!-- endbuild -->
//! ```
//!
//! and is replaced as a whole by the configured tag for its name, keeping the
//! indentation of the opening marker. Blocks without a configured
//! replacement are removed, or left exactly as they are when unassigned
//! blocks are kept.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static BUILD_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?P<indent>[ \t]*)<!--\s*build:(?P<name>[\w.-]+)\s*-->.*?<!--\s*endbuild\s*-->")
        .expect("build block pattern is valid")
});

/// Replace every `build:<name>` block in `source`.
///
/// Blocks whose name has no replacement are dropped unless `keep_unassigned`
/// is set.
pub fn rewrite_markup(
    source: &str,
    replacements: &BTreeMap<String, String>,
    keep_unassigned: bool,
) -> String {
    BUILD_BLOCK
        .replace_all(source, |caps: &Captures<'_>| match replacements.get(&caps["name"]) {
            Some(tag) => format!("{}{}", &caps["indent"], tag),
            None if keep_unassigned => caps[0].to_string(),
            None => String::new(),
        })
        .into_owned()
}

/// Names of the `build:` blocks found in `source`, in document order.
pub fn block_names(source: &str) -> Vec<String> {
    BUILD_BLOCK
        .captures_iter(source)
        .map(|caps| caps["name"].to_string())
        .collect()
}
