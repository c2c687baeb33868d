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

//! Path-name resolver (C10): bidirectional mapping between `/D<dbname>/<code><local-name>/...`
//! path strings and live object ids (spec §4.8). A path is a `/`-separated list of segments, each
//! a single [`ObjectType::code`] letter followed immediately by that object's local (not fully
//! qualified) name; segments are dense, so `"/Dtop//Bcore"` or a trailing `/` is rejected rather
//! than silently skipped.
//!
//! Case-sensitivity of name comparisons follows the open database's `Tech::names_case_sensitive`
//! flag (`true`, i.e. exact match, when no `Tech` exists yet).
//!
//! Only the subsystem this core actually carries end to end -- `Tech`, `Lib`/`Master`/`MTerm`/
//! `Site`, and the `Block`/`Inst`/`ITerm`/`BTerm`/`Net` connectivity graph -- is addressable.
//! Box/via/row/etc. path segments are out of scope, matching `codec.rs`'s own scope cut.

use crate::db::Database;
use crate::model::enums::ObjectType;
use crate::oid::Oid;

/// An object resolved from a path, tagged with the type table it lives in so a caller doesn't
/// have to re-derive which table an [`Oid`] indexes into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub object_type: ObjectType,
    pub oid: Oid,
}

fn names_match(db: &Database, a: &str, b: &str) -> bool {
    if db.tech().map(|t| t.names_case_sensitive).unwrap_or(true) { a == b } else { a.eq_ignore_ascii_case(b) }
}

/// Splits `"Xname"` into its leading object-type code and the rest of the segment.
fn split_segment(segment: &str) -> Option<(char, &str)> {
    let mut chars = segment.chars();
    let code = chars.next()?;
    Some((code, chars.as_str()))
}

/// `resolveDbName(db, path)` (spec §4.8): walks `path` one segment at a time against the live
/// object graph, returning the final object reached, or `None` if any segment is malformed,
/// names a type resolution doesn't support from the current context, or has no match.
pub fn resolve(db: &Database, path: &str) -> Option<Resolved> {
    let mut segments = path.split('/');
    // path starts with '/', so the first split yields an empty leading segment.
    if segments.next() != Some("") {
        return None;
    }
    let (code, dbname) = split_segment(segments.next()?)?;
    if code != ObjectType::Database.code() || !names_match(db, dbname, &db.name) {
        return None;
    }
    let mut current = Resolved { object_type: ObjectType::Database, oid: Oid::NULL };
    for segment in segments {
        let (code, name) = split_segment(segment)?;
        current = step(db, current, code, name)?;
    }
    Some(current)
}

/// Resolves one path segment from `current`'s object type to the next, or `None` if that
/// transition isn't valid (wrong code for the context, or no object with that name).
fn step(db: &Database, current: Resolved, code: char, name: &str) -> Option<Resolved> {
    use ObjectType::*;
    match (current.object_type, code) {
        (Database, c) if c == Tech.code() => {
            let id = db.tech_id();
            if id.is_null() { None } else { Some(Resolved { object_type: Tech, oid: id }) }
        }
        (Database, c) if c == Block.code() => {
            let top = db.top_block()?;
            let b = db.block(top)?;
            if names_match(db, &b.name, name) { Some(Resolved { object_type: Block, oid: top }) } else { None }
        }
        (Database, c) if c == Lib.code() => {
            let id = db.libs_iter().find(|&id| db.libs.get(id).is_some_and(|l| names_match(db, &l.name, name)))?;
            Some(Resolved { object_type: Lib, oid: id })
        }
        (Block, c) if c == Block.code() => {
            let id = db
                .blocks
                .iter_ids()
                .find(|&id| db.block(id).is_some_and(|b| b.parent == Some(current.oid) && names_match(db, &b.name, name)))?;
            Some(Resolved { object_type: Block, oid: id })
        }
        (Block, c) if c == Inst.code() => {
            let id = db.insts_of(current.oid).find(|&id| db.insts.get(id).is_some_and(|i| names_match(db, &i.name, name)))?;
            Some(Resolved { object_type: Inst, oid: id })
        }
        (Block, c) if c == Net.code() => {
            let id = db.nets_of(current.oid).find(|&id| db.nets.get(id).is_some_and(|n| names_match(db, &n.name, name)))?;
            Some(Resolved { object_type: Net, oid: id })
        }
        (Block, c) if c == BTerm.code() => {
            let id = db.bterms_of_block(current.oid).find(|&id| db.bterms.get(id).is_some_and(|t| names_match(db, &t.name, name)))?;
            Some(Resolved { object_type: BTerm, oid: id })
        }
        (Lib, c) if c == Master.code() => {
            let id = db.masters_of(current.oid).find(|&id| db.masters.get(id).is_some_and(|m| names_match(db, &m.name, name)))?;
            Some(Resolved { object_type: Master, oid: id })
        }
        (Lib, c) if c == Site.code() => {
            let id = db.sites_of(current.oid).find(|&id| db.sites.get(id).is_some_and(|s| names_match(db, &s.name, name)))?;
            Some(Resolved { object_type: Site, oid: id })
        }
        (Master, c) if c == MTerm.code() => {
            let id = db.mterms_of(current.oid).find(|&id| db.mterms.get(id).is_some_and(|m| names_match(db, &m.name, name)))?;
            Some(Resolved { object_type: MTerm, oid: id })
        }
        (Inst, c) if c == ITerm.code() => {
            let id = db.iterm_by_name(current.oid, name)?;
            Some(Resolved { object_type: ITerm, oid: id })
        }
        _ => None,
    }
}

/// `getDbName(out)` (spec §4.8): the canonical path of `resolved`, or `None` if its object type
/// isn't addressable by this module (see module scope note) or the id is dangling.
pub fn path_of(db: &Database, resolved: Resolved) -> Option<String> {
    use ObjectType::*;
    let mut segments = Vec::new();
    let mut cursor = resolved;
    loop {
        match cursor.object_type {
            Database => break,
            Tech => {
                segments.push(format!("{}", Tech.code()));
                cursor = Resolved { object_type: Database, oid: Oid::NULL };
            }
            Lib => {
                let l = db.libs.get(cursor.oid)?;
                segments.push(format!("{}{}", Lib.code(), l.name));
                cursor = Resolved { object_type: Database, oid: Oid::NULL };
            }
            Master => {
                let m = db.masters.get(cursor.oid)?;
                segments.push(format!("{}{}", Master.code(), m.name));
                cursor = Resolved { object_type: Lib, oid: m.lib };
            }
            MTerm => {
                let t = db.mterms.get(cursor.oid)?;
                segments.push(format!("{}{}", MTerm.code(), t.name));
                cursor = Resolved { object_type: Master, oid: t.master };
            }
            Site => {
                let s = db.sites.get(cursor.oid)?;
                segments.push(format!("{}{}", Site.code(), s.name));
                cursor = Resolved { object_type: Lib, oid: s.lib };
            }
            Block => {
                let b = db.block(cursor.oid)?;
                segments.push(format!("{}{}", Block.code(), b.name));
                cursor = match b.parent {
                    Some(p) => Resolved { object_type: Block, oid: p },
                    None => Resolved { object_type: Database, oid: Oid::NULL },
                };
            }
            Inst => {
                let i = db.insts.get(cursor.oid)?;
                segments.push(format!("{}{}", Inst.code(), i.name));
                cursor = Resolved { object_type: Block, oid: i.block };
            }
            ITerm => {
                let it = db.iterms.get(cursor.oid)?;
                let mterm = db.mterms.get(it.mterm)?;
                segments.push(format!("{}{}", ITerm.code(), mterm.name));
                cursor = Resolved { object_type: Inst, oid: it.inst };
            }
            BTerm => {
                let t = db.bterms.get(cursor.oid)?;
                segments.push(format!("{}{}", BTerm.code(), t.name));
                cursor = Resolved { object_type: Block, oid: t.block };
            }
            Net => {
                let n = db.nets.get(cursor.oid)?;
                segments.push(format!("{}{}", Net.code(), n.name));
                cursor = Resolved { object_type: Block, oid: n.block };
            }
            _ => return None,
        }
    }
    segments.push(format!("{}{}", Database.code(), db.name));
    segments.reverse();
    Some(format!("/{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::{IoType, SignalType};

    fn demo() -> (Database, Oid, Oid, Oid, Oid) {
        let mut db = Database::create("top");
        let _tech = db.create_tech(1000).expect("tech");
        let lib = db.create_lib("stdcells", 1000).expect("lib");
        let master = db.create_master(lib, "INV_X1").expect("master");
        db.create_mterm(master, "A", IoType::Input, SignalType::Signal).expect("mterm");
        db.create_mterm(master, "Z", IoType::Output, SignalType::Signal).expect("mterm");
        let (_chip, block) = db.create_chip("core", 1000).expect("chip");
        let inst = db.create_inst(block, master, "buf1").expect("inst");
        let net = db.create_net(block, "clk").expect("net");
        (db, block, master, inst, net)
    }

    #[test]
    fn resolves_block_inst_and_net() {
        let (db, block, _master, inst, net) = demo();
        let r = resolve(&db, "/Dtop/Bcore").expect("block resolves");
        assert_eq!(r, Resolved { object_type: ObjectType::Block, oid: block });

        let r = resolve(&db, "/Dtop/Bcore/Ibuf1").expect("inst resolves");
        assert_eq!(r, Resolved { object_type: ObjectType::Inst, oid: inst });

        let r = resolve(&db, "/Dtop/Bcore/Nclk").expect("net resolves");
        assert_eq!(r, Resolved { object_type: ObjectType::Net, oid: net });
    }

    #[test]
    fn resolves_into_library_and_back_through_iterm() {
        let (db, _block, master, inst, _net) = demo();
        let r = resolve(&db, "/Dtop/Lstdcells/MINV_X1").expect("master resolves");
        assert_eq!(r, Resolved { object_type: ObjectType::Master, oid: master });

        let r = resolve(&db, "/Dtop/Bcore/Ibuf1/iA").expect("iterm resolves");
        assert_eq!(r.object_type, ObjectType::ITerm);

        let path = path_of(&db, Resolved { object_type: ObjectType::Inst, oid: inst }).expect("path renders");
        assert_eq!(path, "/Dtop/Bcore/Ibuf1");
    }

    #[test]
    fn unknown_segment_and_wrong_db_name_fail_closed() {
        let (db, _block, _master, _inst, _net) = demo();
        assert!(resolve(&db, "/Dtop/Xbogus").is_none());
        assert!(resolve(&db, "/Dwrong/Bcore").is_none());
        assert!(resolve(&db, "Dtop/Bcore").is_none());
    }
}
