//! Version gate — decides whether a doclet's `@since` tag falls inside the
//! configured release range.

use crate::config::Config;
use crate::sink::DiagnosticSink;
use regex::Regex;
use semver::Version;
use std::fmt;
use std::sync::{Arc, LazyLock};

static RE_SEMVERISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?[0-9]+\.[0-9]+\.[0-9]+$").unwrap());

/// Comparator invoked as `(since, latest) -> include`.
#[derive(Clone, Default)]
pub enum VersionComparator {
    /// Built-in `v?N.N.N` component-wise comparison.
    #[default]
    Semver,
    /// Caller-supplied comparison for nonstandard version schemes.
    Custom(Arc<dyn Fn(&str, Option<&str>) -> bool + Send + Sync>),
}

impl VersionComparator {
    pub const BUILT_IN_NAMES: &'static [&'static str] = &["semver"];

    pub fn from_name(name: &str) -> Option<VersionComparator> {
        match name {
            "semver" => Some(VersionComparator::Semver),
            _ => None,
        }
    }
}

impl fmt::Debug for VersionComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionComparator::Semver => write!(f, "Semver"),
            VersionComparator::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Evaluate the gate for one doclet.
pub fn accept(since: Option<&str>, config: &Config, sink: &dyn DiagnosticSink) -> bool {
    if config.ignore_since_tag {
        return true;
    }
    let Some(since) = since.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let latest = config.latest_version.as_deref().map(str::trim);
    match &config.comparator {
        VersionComparator::Semver => semver_accept(since, latest, sink),
        VersionComparator::Custom(compare) => compare(since, latest),
    }
}

/// Default comparison: include iff `latest >= since`, component-wise.
///
/// An absent or non-conforming `latest` accepts everything; a
/// non-conforming `since` accepts with a warning so a typo'd tag never
/// silently erases API surface.
fn semver_accept(since: &str, latest: Option<&str>, sink: &dyn DiagnosticSink) -> bool {
    let Some(latest) = latest.filter(|l| RE_SEMVERISH.is_match(l)) else {
        return true;
    };
    if !RE_SEMVERISH.is_match(since) {
        sink.warn(&format!(
            "since tag '{}' does not look like a version, including item",
            since
        ));
        return true;
    }
    // The leading-v pattern already matched, so both parses succeed.
    match (parse_version(latest), parse_version(since)) {
        (Some(latest), Some(since)) => latest >= since,
        _ => true,
    }
}

fn parse_version(tag: &str) -> Option<Version> {
    Version::parse(tag.trim_start_matches('v')).ok()
}
