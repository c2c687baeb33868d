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

use std::fs;
use std::path::{Path, PathBuf};

use odb::model::enums::{IoType, ObjectType, SignalType};
use odb::{codec, name, registry, Database, OdbConfig, OdbError};

use crate::opts::Command;

/// Runs `command` against `config`, printing its result to stdout. The one error type every
/// subcommand can fail with is [`OdbError`] (malformed/truncated files) or a plain I/O error;
/// both are rendered by `main` rather than unwound here.
pub fn exec(command: Command, config: OdbConfig) -> Result<(), OdbError> {
    match command {
        Command::CreateDemo { name: db_name } => create_demo(&db_name, &config),
        Command::Dump { path } => dump(&path),
        Command::Resolve { path, name } => resolve(&path, &name),
        Command::Registry => {
            list_registry();
            Ok(())
        }
    }
}

fn expanded_data_dir(config: &OdbConfig) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&config.data_dir.to_string_lossy()).into_owned())
}

/// Builds a small demo database -- one tech, one library cell with two pins, a top block with
/// one instance and one net -- and writes it to `<data-dir>/<name>.odb`.
fn create_demo(db_name: &str, config: &OdbConfig) -> Result<(), OdbError> {
    let mut db = Database::create(db_name);

    db.create_tech(1000).expect("fresh database has no tech yet");
    db.tech_mut().expect("just created").names_case_sensitive = config.case_sensitive;

    let lib = db.create_lib("stdcells", 1000).expect("fresh database has no stdcells lib yet");
    let master = db.create_master(lib, "INV_X1").expect("fresh lib has no INV_X1 yet");
    db.create_mterm(master, "A", IoType::Input, SignalType::Signal).expect("master accepts mterms before freeze");
    db.create_mterm(master, "Z", IoType::Output, SignalType::Signal).expect("master accepts mterms before freeze");
    db.freeze_master(master);

    let (_chip, block) = db.create_chip("top", 1000).expect("fresh database has no chip yet");
    db.create_inst(block, master, "buf1").expect("fresh block has no buf1 yet");
    db.create_net(block, "clk").expect("fresh block has no clk net yet");

    let data_dir = expanded_data_dir(config);
    fs::create_dir_all(&data_dir)?;
    let out_path = data_dir.join(format!("{db_name}.odb"));
    fs::write(&out_path, codec::write_database(&db))?;
    println!("wrote {} ({} bytes)", out_path.display(), fs::metadata(&out_path)?.len());
    Ok(())
}

fn load(path: &Path) -> Result<Database, OdbError> {
    let bytes = fs::read(path)?;
    codec::read_database(&bytes)
}

/// Prints a structural summary: database name, tech parameters, every library's cell/site
/// counts, and the top block's instance/net/terminal counts.
fn dump(path: &Path) -> Result<(), OdbError> {
    let db = load(path)?;
    println!("database: {}", db.name());

    match db.tech() {
        Some(tech) => println!(
            "tech: dbu_per_micron={} manufacturing_grid={} case_sensitive={}",
            tech.dbu_per_micron, tech.manufacturing_grid, tech.names_case_sensitive
        ),
        None => println!("tech: (none)"),
    }

    for lib_id in db.libs_iter() {
        let lib_path = name::path_of(&db, name::Resolved { object_type: ObjectType::Lib, oid: lib_id })
            .unwrap_or_else(|| "<unresolvable>".to_string());
        let masters = db.masters_of(lib_id).count();
        let sites = db.sites_of(lib_id).count();
        println!("lib: {lib_path} masters={masters} sites={sites}");
    }

    if let Some(top) = db.top_block() {
        let block_path = name::path_of(&db, name::Resolved { object_type: ObjectType::Block, oid: top })
            .unwrap_or_else(|| "<unresolvable>".to_string());
        let insts = db.insts_of(top).count();
        let nets = db.nets_of(top).count();
        let bterms = db.bterms_of_block(top).count();
        println!("top block: {block_path} insts={insts} nets={nets} bterms={bterms}");
    } else {
        println!("top block: (none)");
    }

    Ok(())
}

/// Resolves `path_name` against the database at `path` and prints what it names, or reports
/// that nothing matched.
fn resolve(path: &Path, path_name: &str) -> Result<(), OdbError> {
    let db = load(path)?;
    match name::resolve(&db, path_name) {
        Some(resolved) => {
            let canonical = name::path_of(&db, resolved).unwrap_or_else(|| path_name.to_string());
            println!("{path_name} -> {:?} oid={} ({canonical})", resolved.object_type, resolved.oid);
        }
        None => println!("{path_name} -> no match"),
    }
    Ok(())
}

/// Lists every database name registered in this process (C12). Since the registry is
/// per-process, this only reflects databases created or loaded earlier in the same invocation.
fn list_registry() {
    let names = registry::names();
    if names.is_empty() {
        println!("(no databases registered in this process)");
        return;
    }
    for n in names {
        println!("{n}");
    }
}
