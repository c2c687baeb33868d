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

//! Command-line interface to the odb core.

#[macro_use]
extern crate log;

mod command;
mod opts;

use clap::Parser;
use loglevel::LogLevel;
use odb::config::ConfigOverrides;
use odb::OdbConfig;

pub use crate::opts::{Command, Opts};

fn main() {
    println!("odb-cli: command-line tool for inspecting an odb database");

    let opts = Opts::parse();
    LogLevel::from_verbosity_flag_count(opts.verbose).apply();
    trace!("Command-line arguments: {:#?}", &opts);

    let overrides = ConfigOverrides {
        corner_count: None,
        case_sensitive: opts.case_sensitive,
        data_dir: opts.data_dir.clone().map(Into::into),
    };
    let config = overrides.apply(OdbConfig::default());
    debug!("Data directory {}", config.data_dir.display());

    trace!("Executing command: {:?}", opts.command);
    if let Err(err) = command::exec(opts.command, config) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
