// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dependency-version harmonization across project manifests

use semver::Version;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Manifest sections harmonization reads and rewrites
const DEP_SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

/// One dependency name with conflicting versions and the chosen winner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harmonized {
    /// Dependency name
    pub name: String,
    /// All distinct version strings seen across manifests, sorted
    pub versions: Vec<String>,
    /// The version every manifest will be rewritten to
    pub winner: String,
}

/// Range-prefix preference when numeric versions tie: caret beats tilde
/// beats exact pin.
fn prefix_rank(version: &str) -> u8 {
    match version.bytes().next() {
        Some(b'^') => 2,
        Some(b'~') => 1,
        _ => 0,
    }
}

/// Strip a leading `^`/`~` range prefix
fn numeric_part(version: &str) -> &str {
    version.trim_start_matches(['^', '~'])
}

/// Only caret, tilde, and bare-number versions are harmonized; ranges,
/// tags, and URLs are left alone.
fn is_simple(version: &str) -> bool {
    matches!(version.bytes().next(), Some(b'^' | b'~' | b'0'..=b'9'))
}

/// Pick the winning version string: greatest numeric version, with the
/// prefix preference as tie-break. Returns `None` when no candidate
/// parses as a semantic version.
#[must_use]
pub fn pick_winner<'a, I>(versions: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(Version, &str)> = None;
    for candidate in versions {
        let Ok(parsed) = Version::parse(numeric_part(candidate)) else {
            continue;
        };
        best = match best {
            None => Some((parsed, candidate)),
            Some((best_ver, best_str)) => {
                if parsed > best_ver
                    || (parsed == best_ver
                        && prefix_rank(candidate) > prefix_rank(best_str))
                {
                    Some((parsed, candidate))
                } else {
                    Some((best_ver, best_str))
                }
            }
        };
    }
    best.map(|(_, s)| s.to_string())
}

/// Collect dependencies declared with conflicting versions across the
/// given manifests and choose a winner for each.
///
/// A dependency qualifies only when it appears with 2+ distinct version
/// strings and every one of them is a simple caret/tilde/pinned form that
/// parses as a semantic version.
#[must_use]
pub fn collect(manifests: &[(String, Value)]) -> Vec<Harmonized> {
    let mut all: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (_, manifest) in manifests {
        for section in DEP_SECTIONS {
            let Some(deps) = manifest.get(section).and_then(Value::as_object) else {
                continue;
            };
            for (name, version) in deps {
                if let Some(version) = version.as_str() {
                    all.entry(name.clone())
                        .or_default()
                        .insert(version.to_string());
                }
            }
        }
    }

    all.into_iter()
        .filter(|(_, versions)| versions.len() > 1)
        .filter(|(_, versions)| {
            versions
                .iter()
                .all(|v| is_simple(v) && Version::parse(numeric_part(v)).is_ok())
        })
        .filter_map(|(name, versions)| {
            let winner = pick_winner(versions.iter().map(String::as_str))?;
            Some(Harmonized {
                name,
                versions: versions.into_iter().collect(),
                winner,
            })
        })
        .collect()
}

/// Rewrite a manifest's dependency sections in place with the winners.
/// Returns `true` when anything changed.
pub fn apply(manifest: &mut Value, plan: &[Harmonized]) -> bool {
    let mut changed = false;
    for section in DEP_SECTIONS {
        let Some(deps) = manifest.get_mut(section).and_then(Value::as_object_mut) else {
            continue;
        };
        for entry in plan {
            if let Some(version) = deps.get_mut(&entry.name) {
                if version.as_str() != Some(entry.winner.as_str()) {
                    *version = Value::String(entry.winner.clone());
                    changed = true;
                }
            }
        }
    }
    changed
}
