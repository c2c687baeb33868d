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

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments
#[derive(Parser)]
#[derive(Clone, Debug)]
#[command(author, version, about)]
pub struct Opts {
    /// Directory demo databases are written to and read from.
    ///
    /// Defaults to the platform data directory (see `OdbConfig::default`).
    #[arg(short, long, global = true, env = "ODB_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Technology name comparisons are case-sensitive; pass `--case-sensitive=false` to relax
    /// path resolution to ASCII case-insensitive matching.
    #[arg(long, global = true)]
    pub case_sensitive: Option<bool>,

    /// Set a verbosity level
    ///
    /// Can be used multiple times to increase verbosity.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Command-line commands:
#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Builds a small demo database (one tech, one library cell, one block with an instance and
    /// a net) and writes it to `<data-dir>/demo.odb`.
    CreateDemo {
        /// Name of the database to create.
        #[arg(default_value = "demo")]
        name: String,
    },

    /// Reads a database file written by `create-demo` (or `odb::codec::write_database`) and
    /// prints a structural summary.
    Dump {
        /// Path to a serialized database.
        path: PathBuf,
    },

    /// Resolves a path name (e.g. `/Dtop/Bcore/Ibuf1`) against a database file and prints the
    /// object type and id it names, or reports that nothing matched.
    Resolve {
        /// Path to a serialized database.
        path: PathBuf,
        /// Path name to resolve.
        name: String,
    },

    /// Lists every database name currently registered in this process (C12).
    Registry,
}
