//! Mapping of python versions onto Debian policy versions.
//!
//! Debian sorts `~` below everything, even the end of the string, so
//! pre-release and snapshot markers are introduced with a tilde. The mapping
//! keeps the order of [`PyVersion`](crate::domain::PyVersion) for every
//! version the deriver produces on a single branch line.

use crate::domain::tag::DebianTag;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Textual transform of a python version into a Debian upstream version.
///
/// `_` becomes `~`, `rc` becomes `~rc` and a `dev`/`.dev` marker becomes
/// `~dev`.
pub fn debianize(python_version: &str) -> String {
    static DEV: OnceLock<Regex> = OnceLock::new();
    let dev = DEV.get_or_init(|| Regex::new(r"\.?dev").expect("dev marker pattern must compile"));

    let version = python_version.replace('_', "~").replace("rc", "~rc");
    dev.replace_all(&version, "~dev").into_owned()
}

fn dpkg_weight(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(b'~') => -1,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(c) => i32::from(c) + 256,
    }
}

fn is_digit_at(s: &[u8], i: usize) -> bool {
    s.get(i).is_some_and(u8::is_ascii_digit)
}

/// Compare two version fragments with dpkg's rules: non-digit runs by
/// character weight (`~` lowest, letters before other symbols), digit runs
/// numerically.
pub fn dpkg_compare(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        while (i < a.len() && !is_digit_at(a, i)) || (j < b.len() && !is_digit_at(b, j)) {
            let (x, y) = (dpkg_weight(a.get(i).copied()), dpkg_weight(b.get(j).copied()));
            if x != y {
                return x.cmp(&y);
            }
            i += 1;
            j += 1;
        }

        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while is_digit_at(a, i) && is_digit_at(b, j) {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }
        if is_digit_at(a, i) {
            return Ordering::Greater;
        }
        if is_digit_at(b, j) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

/// Tag stem of a Debian version: the version without `~` characters
pub fn version_to_tag(version: &str) -> String {
    version.replace('~', "")
}

/// Smallest debian revision whose tag is not taken yet, starting at 1.
///
/// Tags are probed one by one; the probe ends at most `tags.len() + 1` steps in.
pub fn debian_revision(debian_version: &str, codename: &str, tags: &HashSet<String>) -> u32 {
    let mut tag = DebianTag::new(version_to_tag(debian_version), 1, codename);
    while tags.contains(&tag.name()) {
        tag = tag.next_revision();
    }
    tag.revision
}

/// Join upstream version, debian revision and codename
pub fn format_debian_version(upstream: &str, revision: u32, codename: &str) -> String {
    format!("{}-{}~{}", upstream, revision, codename)
}

/// Full Debian version, `<upstream>-<revision>~<codename>`, for a python version
pub fn to_debian(python_version: &str, codename: &str, tags: &HashSet<String>) -> String {
    let version = debianize(python_version);
    let revision = debian_revision(&version, codename, tags);
    format_debian_version(&version, revision, codename)
}
