// OpenDB core: object-table storage engine for VLSI physical design data.
//
// SPDX-License-Identifier: Apache-2.0
//
// Copyright (C) 2020-2026 ODB Contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

//! Final configuration for opening or creating a [`crate::db::Database`], resulting from a
//! config file merged with command-line overrides -- the same split the teacher's `Config` /
//! `Opts` pair in `src/config.rs` + `src/bin/opts/mod.rs` uses, scaled down to a library with no
//! network endpoints to configure.

use std::path::PathBuf;

/// Final configuration for opening or creating a database.
#[derive(Clone, PartialEq, Debug, Display)]
#[display(Debug)]
pub struct OdbConfig {
    /// Number of parasitic corners every `Block`'s RC side tables are sized for (spec §3,
    /// "constant for the block's lifetime after first allocation").
    pub corner_count: u32,

    /// Override for [`crate::page::PAGE_CAPACITY`]; `None` keeps the compiled-in default.
    pub page_capacity_override: Option<usize>,

    /// Technology case-sensitivity flag. Applied to a freshly created `Tech` via
    /// [`crate::db::Database::tech_mut`]; from there [`crate::name`] path resolution consults
    /// `Tech::names_case_sensitive` directly, since a `Database` can outlive the config that
    /// created it.
    pub case_sensitive: bool,

    /// Hierarchy delimiter used by newly created top `Block`s (spec §4.8).
    pub hierarchy_delimiter: char,

    /// Directory newly-created databases are written under by the `odb-cli` demo binary.
    pub data_dir: PathBuf,
}

impl Default for OdbConfig {
    fn default() -> Self {
        OdbConfig {
            corner_count: 1,
            page_capacity_override: None,
            case_sensitive: true,
            hierarchy_delimiter: '/',
            data_dir: default_data_dir(),
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd", target_os = "netbsd"))]
fn default_data_dir() -> PathBuf { PathBuf::from("~/.local/share/odb") }
#[cfg(target_os = "macos")]
fn default_data_dir() -> PathBuf { PathBuf::from("~/Library/Application Support/odb") }
#[cfg(target_os = "windows")]
fn default_data_dir() -> PathBuf { PathBuf::from("~\\AppData\\Local\\odb") }
#[cfg(not(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "macos",
    target_os = "windows"
)))]
fn default_data_dir() -> PathBuf { PathBuf::from(".") }

impl OdbConfig {
    /// Loads a config from a YAML file, falling back to [`Default::default`] field-by-field for
    /// anything the file omits -- mirrored on the serialized, optional-everywhere shape the
    /// teacher's `serde_yaml`-backed client config uses.
    #[cfg(feature = "serde")]
    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self, crate::error::OdbError> {
        let text = std::fs::read_to_string(path)?;
        let partial: PartialOdbConfig = serde_yaml::from_str(&text).map_err(|e| {
            log::error!("odb: malformed config file {}: {e}", path.display());
            crate::error::OdbError::Format(crate::error::FormatError::Truncated { expected: 0, found: 0 })
        })?;
        Ok(partial.merge_onto(OdbConfig::default()))
    }
}

/// Every field optional, the shape a partial YAML config file actually deserializes into.
#[cfg(feature = "serde")]
#[derive(Clone, Default, serde::Deserialize)]
struct PartialOdbConfig {
    corner_count: Option<u32>,
    page_capacity_override: Option<usize>,
    case_sensitive: Option<bool>,
    hierarchy_delimiter: Option<char>,
    data_dir: Option<PathBuf>,
}

#[cfg(feature = "serde")]
impl PartialOdbConfig {
    fn merge_onto(self, base: OdbConfig) -> OdbConfig {
        OdbConfig {
            corner_count: self.corner_count.unwrap_or(base.corner_count),
            page_capacity_override: self.page_capacity_override.or(base.page_capacity_override),
            case_sensitive: self.case_sensitive.unwrap_or(base.case_sensitive),
            hierarchy_delimiter: self.hierarchy_delimiter.unwrap_or(base.hierarchy_delimiter),
            data_dir: self.data_dir.unwrap_or(base.data_dir),
        }
    }
}

/// Command-line overrides layered on top of a loaded/default [`OdbConfig`]; the `odb-cli` `Opts`
/// converts into this the way the teacher's `bpd::Opts` converts into `Config`.
#[derive(Clone, Default, Debug)]
pub struct ConfigOverrides {
    pub corner_count: Option<u32>,
    pub case_sensitive: Option<bool>,
    pub data_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(self, mut base: OdbConfig) -> OdbConfig {
        if let Some(c) = self.corner_count {
            base.corner_count = c;
        }
        if let Some(c) = self.case_sensitive {
            base.case_sensitive = c;
        }
        if let Some(d) = self.data_dir {
            base.data_dir = d;
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_only_set_fields() {
        let base = OdbConfig::default();
        let overrides = ConfigOverrides { corner_count: Some(4), ..Default::default() };
        let merged = overrides.apply(base.clone());
        assert_eq!(merged.corner_count, 4);
        assert_eq!(merged.case_sensitive, base.case_sensitive);
    }
}
