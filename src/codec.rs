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

//! Binary stream codec (C6): little-endian, byte-packed sections, each framed by a type tag, a
//! length, and a CRC-32 trailer (spec §4.4). `write_database`/`read_database` round-trip a whole
//! [`Database`]; the `write_tech`/`write_lib`/`write_block`/`write_wires`/`write_nets`/
//! `write_parasitics` functions emit (and the matching `read_*` consume) one section at a time, as
//! spec §6 names them, so a caller can persist or reload part of a database without touching the
//! rest.
//!
//! Records are written referenced-before-referrer (tech before libs, libs before blocks, a net's
//! own record before its wires and RC network) and read back the same way. Every id is written as
//! its raw `u32` and restored through [`crate::page::Table::alloc_at`], so a round trip preserves
//! exact id values; a reader builds into a brand-new [`Database`] and only returns it on success,
//! so a caller's existing database is left untouched by a failed load (the "shadow, then swap"
//! contract of spec §4.4 -- the swap itself is the caller replacing its own handle with the
//! returned value).
//!
//! Scope: this version of the codec carries the graph spec §8's testable properties exercise --
//! `Chip`, `Tech`/`Layer`/`TechVia`/`NonDefaultRule`, `Lib`/`Master`/`MTerm`/`Site`, the
//! `Block`/`Inst`/`ITerm`/`Net`/`BTerm` connectivity graph, per-net `Wire` opcode streams, and
//! per-net RC (`CapNode`/`RSeg`/`CCSeg`). `Box`/`SBox`/`Via`/`Row`/`Region`/`Module`/`ModInst`/`Group`/
//! `GCellGrid`/`TrackGrid`/`Fill`/`Obstruction`/`Blockage`/`Property`/`MPin`/`BPin`/`ViaRule`/
//! `ViaGenerateRule`/`AntennaRule` are not yet carried by the stream format; a `Block`'s head
//! pointers into those tables are reset to `Oid::NULL` on read rather than serialized dangling.
//! See `DESIGN.md` for the scope decision.

use std::io::{Cursor, Read};

use crc32fast::Hasher;

use crate::db::{Database, FORMAT_VERSION, MAGIC};
use crate::error::{FormatError, OdbError};
use crate::model::block::Chip;
use crate::model::enums::{IoType, Orientation, PlacementStatus, SignalType};
use crate::model::inst::{ITerm, Inst};
use crate::model::library::{Lib, MTerm, Master, Site};
use crate::model::net::{Net, WireRecord};
use crate::model::tech::{Layer, LayerRule, NonDefaultRule, Tech, TechVia};
use crate::model::term::BTerm;
use crate::oid::Oid;
use crate::rc::{CCSeg, CapNode, CapNodeKind, RSeg};
use crate::wire::Wire;

const TAG_TECH: u8 = 1;
const TAG_LIB: u8 = 2;
const TAG_BLOCK: u8 = 3;
const TAG_NETS: u8 = 4;
const TAG_WIRES: u8 = 5;
const TAG_PARASITICS: u8 = 6;
const TAG_CHIP: u8 = 7;

// -- primitive readers/writers ------------------------------------------------------------------

fn w_u8(out: &mut Vec<u8>, v: u8) { out.push(v); }
fn w_u16(out: &mut Vec<u8>, v: u16) { out.extend_from_slice(&v.to_le_bytes()); }
fn w_u32(out: &mut Vec<u8>, v: u32) { out.extend_from_slice(&v.to_le_bytes()); }
fn w_i32(out: &mut Vec<u8>, v: i32) { out.extend_from_slice(&v.to_le_bytes()); }
fn w_f64(out: &mut Vec<u8>, v: f64) { out.extend_from_slice(&v.to_le_bytes()); }
fn w_bool(out: &mut Vec<u8>, v: bool) { out.push(v as u8); }
fn w_oid(out: &mut Vec<u8>, id: Oid) { w_u32(out, id.raw()); }
fn w_opt_oid(out: &mut Vec<u8>, id: Option<Oid>) { w_oid(out, id.unwrap_or(Oid::NULL)); }
fn w_str(out: &mut Vec<u8>, s: &str) {
    w_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}
fn w_f64_vec(out: &mut Vec<u8>, v: &[f64]) {
    w_u32(out, v.len() as u32);
    for x in v {
        w_f64(out, *x);
    }
}

fn trunc(expected: usize) -> OdbError { OdbError::Format(FormatError::Truncated { expected, found: 0 }) }

fn r_bytes(cur: &mut Cursor<&[u8]>, n: usize) -> Result<Vec<u8>, OdbError> {
    let mut buf = vec![0u8; n];
    cur.read_exact(&mut buf).map_err(|_| trunc(n))?;
    Ok(buf)
}
fn r_u8(cur: &mut Cursor<&[u8]>) -> Result<u8, OdbError> { Ok(r_bytes(cur, 1)?[0]) }
fn r_u16(cur: &mut Cursor<&[u8]>) -> Result<u16, OdbError> {
    Ok(u16::from_le_bytes(r_bytes(cur, 2)?.try_into().expect("len 2")))
}
fn r_u32(cur: &mut Cursor<&[u8]>) -> Result<u32, OdbError> {
    Ok(u32::from_le_bytes(r_bytes(cur, 4)?.try_into().expect("len 4")))
}
fn r_i32(cur: &mut Cursor<&[u8]>) -> Result<i32, OdbError> {
    Ok(i32::from_le_bytes(r_bytes(cur, 4)?.try_into().expect("len 4")))
}
fn r_f64(cur: &mut Cursor<&[u8]>) -> Result<f64, OdbError> {
    Ok(f64::from_le_bytes(r_bytes(cur, 8)?.try_into().expect("len 8")))
}
fn r_bool(cur: &mut Cursor<&[u8]>) -> Result<bool, OdbError> { Ok(r_u8(cur)? != 0) }
fn r_oid(cur: &mut Cursor<&[u8]>) -> Result<Oid, OdbError> { Ok(Oid::new(r_u32(cur)?)) }
fn r_opt_oid(cur: &mut Cursor<&[u8]>) -> Result<Option<Oid>, OdbError> {
    let id = r_oid(cur)?;
    Ok(if id.is_null() { None } else { Some(id) })
}
fn r_str(cur: &mut Cursor<&[u8]>) -> Result<String, OdbError> {
    let len = r_u32(cur)? as usize;
    String::from_utf8(r_bytes(cur, len)?).map_err(|_| OdbError::Format(FormatError::Truncated { expected: len, found: 0 }))
}
fn r_f64_vec(cur: &mut Cursor<&[u8]>) -> Result<Vec<f64>, OdbError> {
    let len = r_u32(cur)? as usize;
    (0..len).map(|_| r_f64(cur)).collect()
}

fn io_type_tag(t: IoType) -> u8 { t as u8 }
fn io_type_from(v: u8) -> Result<IoType, OdbError> {
    Ok(match v {
        0 => IoType::Input,
        1 => IoType::Output,
        2 => IoType::Inout,
        3 => IoType::Feedthru,
        other => return Err(OdbError::UnknownOpcode(other)),
    })
}
fn signal_type_tag(t: SignalType) -> u8 { t as u8 }
fn signal_type_from(v: u8) -> Result<SignalType, OdbError> {
    use SignalType::*;
    Ok(match v {
        0 => Signal,
        1 => Power,
        2 => Ground,
        3 => Clock,
        4 => Analog,
        5 => Reset,
        6 => Scan,
        7 => Tieoff,
        other => return Err(OdbError::UnknownOpcode(other)),
    })
}
fn placement_status_tag(s: PlacementStatus) -> u8 { s as u8 }
fn placement_status_from(v: u8) -> Result<PlacementStatus, OdbError> {
    use PlacementStatus::*;
    Ok(match v {
        0 => None,
        1 => Unplaced,
        2 => Suggested,
        3 => Placed,
        4 => Locked,
        5 => Firm,
        6 => Cover,
        other => return Err(OdbError::UnknownOpcode(other)),
    })
}
fn orientation_tag(o: Orientation) -> u8 { o as u8 }
fn orientation_from(v: u8) -> Result<Orientation, OdbError> {
    crate::wire::orientation_from_u8(v).ok_or(OdbError::UnknownOpcode(v))
}

// -- section framing -----------------------------------------------------------------------------

fn write_section(out: &mut Vec<u8>, tag: u8, body: &[u8]) {
    w_u8(out, tag);
    w_u32(out, body.len() as u32);
    out.extend_from_slice(body);
    let mut hasher = Hasher::new();
    hasher.update(body);
    w_u32(out, hasher.finalize());
}

fn read_section(cur: &mut Cursor<&[u8]>, expected_tag: u8, name: &'static str) -> Result<Vec<u8>, OdbError> {
    let tag = r_u8(cur)?;
    if tag != expected_tag {
        return Err(OdbError::Format(FormatError::SectionOutOfOrder(name)));
    }
    let len = r_u32(cur)? as usize;
    let body = r_bytes(cur, len)?;
    let expected = r_u32(cur)?;
    let mut hasher = Hasher::new();
    hasher.update(&body);
    let computed = hasher.finalize();
    if expected != computed {
        return Err(OdbError::ChecksumMismatch { section: name, offset: cur.position(), expected, computed });
    }
    Ok(body)
}

// -- Tech section ---------------------------------------------------------------------------------

fn write_layer_rule(out: &mut Vec<u8>, rule: &LayerRule) {
    match rule {
        LayerRule::Spacing { within, spacing } => {
            w_u8(out, 0);
            w_i32(out, *within);
            w_i32(out, *spacing);
        }
        LayerRule::MinCut { width, cuts } => {
            w_u8(out, 1);
            w_i32(out, *width);
            w_u32(out, *cuts);
        }
        LayerRule::MinEnclosure { cut_width, enclosure } => {
            w_u8(out, 2);
            w_i32(out, *cut_width);
            w_i32(out, *enclosure);
        }
        LayerRule::Eol { width, spacing, within } => {
            w_u8(out, 3);
            w_i32(out, *width);
            w_i32(out, *spacing);
            w_i32(out, *within);
        }
        LayerRule::CornerSpacing { eol_width, spacing } => {
            w_u8(out, 4);
            w_i32(out, *eol_width);
            w_i32(out, *spacing);
        }
        LayerRule::CutClass { name, width, length } => {
            w_u8(out, 5);
            w_str(out, name);
            w_i32(out, *width);
            w_i32(out, *length);
        }
        LayerRule::CutSpacing { class_a, class_b, spacing } => {
            w_u8(out, 6);
            w_str(out, class_a);
            w_str(out, class_b);
            w_i32(out, *spacing);
        }
        LayerRule::V55Influence { width, within, spacing } => {
            w_u8(out, 7);
            w_i32(out, *width);
            w_i32(out, *within);
            w_i32(out, *spacing);
        }
        LayerRule::SpacingTablePrl { width, prl, spacing } => {
            w_u8(out, 8);
            w_i32(out, *width);
            w_i32(out, *prl);
            w_i32(out, *spacing);
        }
    }
}

fn read_layer_rule(cur: &mut Cursor<&[u8]>) -> Result<LayerRule, OdbError> {
    Ok(match r_u8(cur)? {
        0 => LayerRule::Spacing { within: r_i32(cur)?, spacing: r_i32(cur)? },
        1 => LayerRule::MinCut { width: r_i32(cur)?, cuts: r_u32(cur)? },
        2 => LayerRule::MinEnclosure { cut_width: r_i32(cur)?, enclosure: r_i32(cur)? },
        3 => LayerRule::Eol { width: r_i32(cur)?, spacing: r_i32(cur)?, within: r_i32(cur)? },
        4 => LayerRule::CornerSpacing { eol_width: r_i32(cur)?, spacing: r_i32(cur)? },
        5 => LayerRule::CutClass { name: r_str(cur)?, width: r_i32(cur)?, length: r_i32(cur)? },
        6 => LayerRule::CutSpacing { class_a: r_str(cur)?, class_b: r_str(cur)?, spacing: r_i32(cur)? },
        7 => LayerRule::V55Influence { width: r_i32(cur)?, within: r_i32(cur)?, spacing: r_i32(cur)? },
        8 => LayerRule::SpacingTablePrl { width: r_i32(cur)?, prl: r_i32(cur)?, spacing: r_i32(cur)? },
        other => return Err(OdbError::UnknownOpcode(other)),
    })
}

/// Emits the `TECH` section: the single `Tech` record, its `Layer` chain (with per-layer rules),
/// its `TechVia`s, and its `NonDefaultRule`s. `ViaRule`/`ViaGenerateRule`/`AntennaRule` are not
/// carried (see module scope note); `Tech`'s heads into those tables are not written at all, a
/// reader always starts them `Oid::NULL`.
pub fn write_tech(db: &Database, out: &mut Vec<u8>) {
    let mut body = Vec::new();
    let Some((tech_id, tech)) = db.tech.iter().next() else {
        w_u8(&mut body, 0);
        write_section(out, TAG_TECH, &body);
        return;
    };
    w_u8(&mut body, 1);
    w_oid(&mut body, tech_id);
    w_i32(&mut body, tech.dbu_per_micron);
    w_u16(&mut body, tech.lef_version.0);
    w_u16(&mut body, tech.lef_version.1);
    w_i32(&mut body, tech.manufacturing_grid);
    w_bool(&mut body, tech.names_case_sensitive);

    let layers: Vec<Oid> = crate::iter::Chain::new(&db.layers, tech.layer_head, |l: &Layer| (l.prev, l.next)).iter().collect();
    w_u32(&mut body, layers.len() as u32);
    for id in &layers {
        let l = db.layers.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_str(&mut body, &l.name);
        w_u16(&mut body, l.mask_number);
        w_bool(&mut body, l.routing_level.is_some());
        w_u16(&mut body, l.routing_level.unwrap_or(0));
        w_i32(&mut body, l.min_width);
        w_i32(&mut body, l.default_width);
        w_i32(&mut body, l.pitch);
        w_u32(&mut body, l.rules.len() as u32);
        for rule in &l.rules {
            write_layer_rule(&mut body, rule);
        }
    }

    let vias: Vec<Oid> = crate::iter::Chain::new(&db.tech_vias, tech.tech_via_head, |v: &TechVia| (v.prev, v.next)).iter().collect();
    w_u32(&mut body, vias.len() as u32);
    for id in &vias {
        let v = db.tech_vias.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_str(&mut body, &v.name);
        w_oid(&mut body, v.cut_layer);
        w_oid(&mut body, v.top_layer);
        w_oid(&mut body, v.bottom_layer);
        w_i32(&mut body, v.top_enclosure.0);
        w_i32(&mut body, v.top_enclosure.1);
        w_i32(&mut body, v.bottom_enclosure.0);
        w_i32(&mut body, v.bottom_enclosure.1);
        w_u32(&mut body, v.rows);
        w_u32(&mut body, v.cols);
        w_i32(&mut body, v.cut_size.0);
        w_i32(&mut body, v.cut_size.1);
        w_i32(&mut body, v.cut_spacing.0);
        w_i32(&mut body, v.cut_spacing.1);
    }

    let ndrs: Vec<Oid> =
        crate::iter::Chain::new(&db.non_default_rules, tech.non_default_rule_head, |r: &NonDefaultRule| (r.prev, r.next)).iter().collect();
    w_u32(&mut body, ndrs.len() as u32);
    for id in &ndrs {
        let r = db.non_default_rules.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_str(&mut body, &r.name);
        w_bool(&mut body, r.hard_spacing);
        w_u32(&mut body, r.layer_rules.len() as u32);
        for (layer, width, spacing) in &r.layer_rules {
            w_oid(&mut body, *layer);
            w_i32(&mut body, *width);
            w_i32(&mut body, *spacing);
        }
        w_u32(&mut body, r.via_substitutes.len() as u32);
        for (layer, techvia) in &r.via_substitutes {
            w_oid(&mut body, *layer);
            w_oid(&mut body, techvia.oid());
        }
    }

    write_section(out, TAG_TECH, &body);
}

/// Reads the `TECH` section into `db`, which must not already have a `Tech` (whole-database loads
/// call this exactly once, before any other section).
pub fn read_tech(db: &mut Database, cur: &mut Cursor<&[u8]>) -> Result<(), OdbError> {
    let body = read_section(cur, TAG_TECH, "tech")?;
    let mut bc = Cursor::new(body.as_slice());
    if r_u8(&mut bc)? == 0 {
        return Ok(());
    }
    let tech_id = r_oid(&mut bc)?;
    let dbu_per_micron = r_i32(&mut bc)?;
    let lef_major = r_u16(&mut bc)?;
    let lef_minor = r_u16(&mut bc)?;
    let manufacturing_grid = r_i32(&mut bc)?;
    let names_case_sensitive = r_bool(&mut bc)?;
    let mut tech = Tech::new(dbu_per_micron);
    tech.lef_version = (lef_major, lef_minor);
    tech.manufacturing_grid = manufacturing_grid;
    tech.names_case_sensitive = names_case_sensitive;

    let layer_count = r_u32(&mut bc)?;
    let mut layer_ids = Vec::with_capacity(layer_count as usize);
    for _ in 0..layer_count {
        let id = r_oid(&mut bc)?;
        let name = r_str(&mut bc)?;
        let mask_number = r_u16(&mut bc)?;
        let has_routing_level = r_bool(&mut bc)?;
        let routing_level_raw = r_u16(&mut bc)?;
        let mut layer = Layer::new(name, mask_number);
        layer.routing_level = if has_routing_level { Some(routing_level_raw) } else { None };
        layer.min_width = r_i32(&mut bc)?;
        layer.default_width = r_i32(&mut bc)?;
        layer.pitch = r_i32(&mut bc)?;
        let rule_count = r_u32(&mut bc)?;
        for _ in 0..rule_count {
            layer.rules.push(read_layer_rule(&mut bc)?);
        }
        db.layers.alloc_at(id.raw(), |_| layer);
        layer_ids.push(id);
    }
    link_chain(&mut db.layers, &layer_ids);
    tech.layer_head = layer_ids.first().copied().unwrap_or(Oid::NULL);
    tech.layer_tail = layer_ids.last().copied().unwrap_or(Oid::NULL);

    let via_count = r_u32(&mut bc)?;
    let mut via_ids = Vec::with_capacity(via_count as usize);
    for _ in 0..via_count {
        let id = r_oid(&mut bc)?;
        let name = r_str(&mut bc)?;
        let cut_layer = r_oid(&mut bc)?;
        let top_layer = r_oid(&mut bc)?;
        let bottom_layer = r_oid(&mut bc)?;
        let mut v = TechVia::new(name, cut_layer, top_layer, bottom_layer);
        v.top_enclosure = (r_i32(&mut bc)?, r_i32(&mut bc)?);
        v.bottom_enclosure = (r_i32(&mut bc)?, r_i32(&mut bc)?);
        v.rows = r_u32(&mut bc)?;
        v.cols = r_u32(&mut bc)?;
        v.cut_size = (r_i32(&mut bc)?, r_i32(&mut bc)?);
        v.cut_spacing = (r_i32(&mut bc)?, r_i32(&mut bc)?);
        v.regenerate_boxes();
        db.tech_vias.alloc_at(id.raw(), |_| v);
        via_ids.push(id);
    }
    link_chain(&mut db.tech_vias, &via_ids);
    tech.tech_via_head = via_ids.first().copied().unwrap_or(Oid::NULL);

    let ndr_count = r_u32(&mut bc)?;
    let mut ndr_ids = Vec::with_capacity(ndr_count as usize);
    for _ in 0..ndr_count {
        let id = r_oid(&mut bc)?;
        let name = r_str(&mut bc)?;
        let mut r = NonDefaultRule::new(name);
        r.hard_spacing = r_bool(&mut bc)?;
        let lr_count = r_u32(&mut bc)?;
        for _ in 0..lr_count {
            r.layer_rules.push((r_oid(&mut bc)?, r_i32(&mut bc)?, r_i32(&mut bc)?));
        }
        let vs_count = r_u32(&mut bc)?;
        for _ in 0..vs_count {
            let layer = r_oid(&mut bc)?;
            let techvia = r_oid(&mut bc)?;
            r.via_substitutes.push((layer, crate::oid::Id::from_oid(techvia)));
        }
        db.non_default_rules.alloc_at(id.raw(), |_| r);
        ndr_ids.push(id);
    }
    link_chain(&mut db.non_default_rules, &ndr_ids);
    tech.non_default_rule_head = ndr_ids.first().copied().unwrap_or(Oid::NULL);

    db.tech.alloc_at(tech_id.raw(), |_| tech);
    Ok(())
}

/// Threads `ids` (in the order they were written, head to tail) into `prev`/`next` pointers on
/// `table` via `crate::iter::ChainLinks`, restoring the exact traversal order they were saved in.
fn link_chain<R: crate::iter::ChainLinks>(table: &mut crate::page::Table<R>, ids: &[Oid]) {
    for (i, id) in ids.iter().enumerate() {
        let prev = if i == 0 { Oid::NULL } else { ids[i - 1] };
        let next = ids.get(i + 1).copied().unwrap_or(Oid::NULL);
        if let Some(rec) = table.get_mut(*id) {
            rec.set_prev(prev);
            rec.set_next(next);
        }
    }
}

/// Threads `ids` into a `BTerm`'s block-membership chain (`blk_prev`/`blk_next`), the sibling of
/// its net-chain (`ChainLinks`, used by [`link_chain`]) that a `BTerm` carries for its owning
/// `Block`'s own traversal.
fn link_bterm_block_chain(table: &mut crate::page::Table<BTerm>, ids: &[Oid]) {
    for (i, id) in ids.iter().enumerate() {
        let prev = if i == 0 { Oid::NULL } else { ids[i - 1] };
        let next = ids.get(i + 1).copied().unwrap_or(Oid::NULL);
        if let Some(rec) = table.get_mut(*id) {
            rec.blk_prev = prev;
            rec.blk_next = next;
        }
    }
}

// -- Chip section -------------------------------------------------------------------------------

/// Emits the `CHIP` section: a presence flag, then the `Chip` record if the database has created
/// one (spec §3: a database owns at most one `Chip`, via `create_chip`). Just the id and its
/// `top_block` reference -- the `Block` graph itself is written by [`write_block`].
pub fn write_chip(db: &Database, out: &mut Vec<u8>) {
    let mut body = Vec::new();
    let Some((chip_id, chip)) = db.chip.iter().next() else {
        w_u8(&mut body, 0);
        write_section(out, TAG_CHIP, &body);
        return;
    };
    w_u8(&mut body, 1);
    w_oid(&mut body, chip_id);
    w_oid(&mut body, chip.top_block);
    write_section(out, TAG_CHIP, &body);
}

/// Reads the `CHIP` section into `db`, which must not already have a `Chip`.
pub fn read_chip(db: &mut Database, cur: &mut Cursor<&[u8]>) -> Result<(), OdbError> {
    let body = read_section(cur, TAG_CHIP, "chip")?;
    let mut bc = Cursor::new(body.as_slice());
    if r_u8(&mut bc)? == 0 {
        return Ok(());
    }
    let chip_id = r_oid(&mut bc)?;
    let top_block = r_oid(&mut bc)?;
    db.chip.alloc_at(chip_id.raw(), |_| Chip { top_block });
    Ok(())
}

// -- Lib section ------------------------------------------------------------------------------

/// Emits a single `Lib`'s `LIB` section: the `Lib` record plus its `Master`/`MTerm`/`Site` chains.
pub fn write_lib(db: &Database, lib: Oid, out: &mut Vec<u8>) -> Option<()> {
    let l = db.libs.get(lib)?;
    let mut body = Vec::new();
    w_oid(&mut body, lib);
    w_str(&mut body, &l.name);
    w_i32(&mut body, l.dbu_per_micron);

    let masters: Vec<Oid> = crate::iter::Chain::new(&db.masters, l.master_head, |m: &Master| (m.prev, m.next)).iter().collect();
    w_u32(&mut body, masters.len() as u32);
    for id in &masters {
        let m = db.masters.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_str(&mut body, &m.name);
        w_i32(&mut body, m.bbox.x_min);
        w_i32(&mut body, m.bbox.y_min);
        w_i32(&mut body, m.bbox.x_max);
        w_i32(&mut body, m.bbox.y_max);
        w_bool(&mut body, m.frozen);

        let mterms: Vec<Oid> = crate::iter::Chain::new(&db.mterms, m.mterm_head, |t: &MTerm| (t.prev, t.next)).iter().collect();
        w_u32(&mut body, mterms.len() as u32);
        for tid in &mterms {
            let t = db.mterms.get(*tid).expect("chain id live");
            w_oid(&mut body, *tid);
            w_str(&mut body, &t.name);
            w_u8(&mut body, io_type_tag(t.io_type));
            w_u8(&mut body, signal_type_tag(t.signal_type));
            w_u32(&mut body, t.index);
        }
    }

    let sites: Vec<Oid> = crate::iter::Chain::new(&db.sites, l.site_head, |s: &Site| (s.prev, s.next)).iter().collect();
    w_u32(&mut body, sites.len() as u32);
    for id in &sites {
        let s = db.sites.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_str(&mut body, &s.name);
        w_i32(&mut body, s.width);
        w_i32(&mut body, s.height);
    }

    write_section(out, TAG_LIB, &body);
    Some(())
}

/// Reads one `LIB` section, returning the restored `Lib`'s id.
pub fn read_lib(db: &mut Database, cur: &mut Cursor<&[u8]>) -> Result<Oid, OdbError> {
    let body = read_section(cur, TAG_LIB, "lib")?;
    let mut bc = Cursor::new(body.as_slice());
    let lib_id = r_oid(&mut bc)?;
    let name = r_str(&mut bc)?;
    let dbu_per_micron = r_i32(&mut bc)?;
    let lib = Lib::new(name, dbu_per_micron);
    db.libs.alloc_at(lib_id.raw(), |_| lib);

    let master_count = r_u32(&mut bc)?;
    let mut master_ids = Vec::with_capacity(master_count as usize);
    for _ in 0..master_count {
        let id = r_oid(&mut bc)?;
        let name = r_str(&mut bc)?;
        let x0 = r_i32(&mut bc)?;
        let y0 = r_i32(&mut bc)?;
        let x1 = r_i32(&mut bc)?;
        let y1 = r_i32(&mut bc)?;
        let frozen = r_bool(&mut bc)?;
        let mut master = Master::new(lib_id, name);
        master.bbox = crate::geom::Rect::new(x0, y0, x1, y1);
        master.frozen = frozen;

        let mterm_count = r_u32(&mut bc)?;
        let mut mterm_ids = Vec::with_capacity(mterm_count as usize);
        for _ in 0..mterm_count {
            let tid = r_oid(&mut bc)?;
            let tname = r_str(&mut bc)?;
            let io = io_type_from(r_u8(&mut bc)?)?;
            let sig = signal_type_from(r_u8(&mut bc)?)?;
            let index = r_u32(&mut bc)?;
            db.mterms.alloc_at(tid.raw(), |_| MTerm::new(id, tname, io, sig, index));
            mterm_ids.push(tid);
        }
        link_chain(&mut db.mterms, &mterm_ids);
        master.mterm_head = mterm_ids.first().copied().unwrap_or(Oid::NULL);
        master.mterm_count = mterm_count;
        db.masters.alloc_at(id.raw(), |_| master);
        master_ids.push(id);
    }
    link_chain(&mut db.masters, &master_ids);
    db.libs.get_mut(lib_id).expect("just allocated").master_head = master_ids.first().copied().unwrap_or(Oid::NULL);

    let site_count = r_u32(&mut bc)?;
    let mut site_ids = Vec::with_capacity(site_count as usize);
    for _ in 0..site_count {
        let id = r_oid(&mut bc)?;
        let name = r_str(&mut bc)?;
        let width = r_i32(&mut bc)?;
        let height = r_i32(&mut bc)?;
        db.sites.alloc_at(id.raw(), |_| Site::new(lib_id, name, width, height));
        site_ids.push(id);
    }
    link_chain(&mut db.sites, &site_ids);
    db.libs.get_mut(lib_id).expect("just allocated").site_head = site_ids.first().copied().unwrap_or(Oid::NULL);

    Ok(lib_id)
}

// -- Block section (Inst/ITerm/BTerm, not Net) ------------------------------------------------

/// Emits a single `Block`'s `BLOCK` section: the `Block` record, its `Inst`/`ITerm` graph, and its
/// `BTerm`s (net references only -- the `Net` records themselves are written by [`write_nets`]).
pub fn write_block(db: &Database, block: Oid, out: &mut Vec<u8>) -> Option<()> {
    let b = db.blocks.get(block)?;
    let mut body = Vec::new();
    w_oid(&mut body, block);
    w_opt_oid(&mut body, b.parent);
    w_str(&mut body, &b.name);
    w_i32(&mut body, b.dbu_per_micron);
    w_u32(&mut body, b.corner_count);

    let insts: Vec<Oid> = crate::iter::Chain::new(&db.insts, b.inst_head, |i: &Inst| (i.prev, i.next)).iter().collect();
    w_u32(&mut body, insts.len() as u32);
    for id in &insts {
        let i = db.insts.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_oid(&mut body, i.master);
        w_str(&mut body, &i.name);
        w_i32(&mut body, i.origin.x);
        w_i32(&mut body, i.origin.y);
        w_u8(&mut body, orientation_tag(i.orient));
        w_u8(&mut body, placement_status_tag(i.status));
        w_opt_oid(&mut body, i.bound_block);

        w_u32(&mut body, i.iterms.len() as u32);
        for tid in &i.iterms {
            let t = db.iterms.get(*tid).expect("inst iterm must be live");
            w_oid(&mut body, *tid);
            w_oid(&mut body, t.mterm);
            w_u32(&mut body, t.mterm_index);
            w_opt_oid(&mut body, t.net);
        }
    }

    let bterms: Vec<Oid> = db.bterms_of_block(block).collect();
    w_u32(&mut body, bterms.len() as u32);
    for id in &bterms {
        let t = db.bterms.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_str(&mut body, &t.name);
        w_u8(&mut body, io_type_tag(t.io_type));
        w_u8(&mut body, signal_type_tag(t.signal_type));
        w_oid(&mut body, t.net);
    }

    write_section(out, TAG_BLOCK, &body);
    Some(())
}

/// Reads one `BLOCK` section, returning the restored `Block`'s id. `Inst`/`ITerm`/`BTerm` records
/// are restored with `net`/net-chain fields left unlinked; [`read_nets`] relinks them once the
/// `Net` records it owns exist.
pub fn read_block(db: &mut Database, cur: &mut Cursor<&[u8]>) -> Result<Oid, OdbError> {
    let body = read_section(cur, TAG_BLOCK, "block")?;
    let mut bc = Cursor::new(body.as_slice());
    let block_id = r_oid(&mut bc)?;
    let parent = r_opt_oid(&mut bc)?;
    let name = r_str(&mut bc)?;
    let dbu_per_micron = r_i32(&mut bc)?;
    let corner_count = r_u32(&mut bc)?;
    let mut block = crate::model::block::Block::new(parent, name, dbu_per_micron);
    block.corner_count = corner_count;

    let inst_count = r_u32(&mut bc)?;
    let mut inst_ids = Vec::with_capacity(inst_count as usize);
    for _ in 0..inst_count {
        let id = r_oid(&mut bc)?;
        let master = r_oid(&mut bc)?;
        let iname = r_str(&mut bc)?;
        let x = r_i32(&mut bc)?;
        let y = r_i32(&mut bc)?;
        let orient = orientation_from(r_u8(&mut bc)?)?;
        let status = placement_status_from(r_u8(&mut bc)?)?;
        let bound_block = r_opt_oid(&mut bc)?;

        let mut inst = Inst::new(block_id, master, iname);
        inst.origin = crate::geom::Point::new(x, y);
        inst.orient = orient;
        inst.status = status;
        inst.bound_block = bound_block;

        let iterm_count = r_u32(&mut bc)?;
        let mut iterm_ids = Vec::with_capacity(iterm_count as usize);
        for _ in 0..iterm_count {
            let tid = r_oid(&mut bc)?;
            let mterm = r_oid(&mut bc)?;
            let index = r_u32(&mut bc)?;
            let net = r_opt_oid(&mut bc)?;
            let mut iterm = ITerm::new(id, mterm, index);
            iterm.net = net;
            db.iterms.alloc_at(tid.raw(), |_| iterm);
            iterm_ids.push(tid);
        }
        inst.iterms = iterm_ids;
        db.insts.alloc_at(id.raw(), |_| inst);
        inst_ids.push(id);
    }
    link_chain(&mut db.insts, &inst_ids);
    block.inst_head = inst_ids.first().copied().unwrap_or(Oid::NULL);

    let bterm_count = r_u32(&mut bc)?;
    let mut bterm_ids = Vec::with_capacity(bterm_count as usize);
    for _ in 0..bterm_count {
        let id = r_oid(&mut bc)?;
        let name = r_str(&mut bc)?;
        let io = io_type_from(r_u8(&mut bc)?)?;
        let signal_type = signal_type_from(r_u8(&mut bc)?)?;
        let net = r_oid(&mut bc)?;
        let mut t = BTerm::new(block_id, net, name, io);
        t.signal_type = signal_type;
        db.bterms.alloc_at(id.raw(), |_| t);
        bterm_ids.push(id);
    }
    link_bterm_block_chain(&mut db.bterms, &bterm_ids);
    block.bterm_head = bterm_ids.first().copied().unwrap_or(Oid::NULL);

    db.blocks.alloc_at(block_id.raw(), |_| block);
    Ok(block_id)
}

// -- Nets section -----------------------------------------------------------------------------

/// Emits `block`'s `NETS` section: every `Net` record (name, signal type, non-default-rule
/// reference) and the `ITerm`/`BTerm` ids chained onto it, in net-chain order.
pub fn write_nets(db: &Database, block: Oid, out: &mut Vec<u8>) -> Option<()> {
    let b = db.blocks.get(block)?;
    let mut body = Vec::new();
    let nets: Vec<Oid> = crate::iter::Chain::new(&db.nets, b.net_head, |n: &Net| (n.prev, n.next)).iter().collect();
    w_u32(&mut body, nets.len() as u32);
    for id in &nets {
        let n = db.nets.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_str(&mut body, &n.name);
        w_u8(&mut body, signal_type_tag(n.signal_type));
        w_opt_oid(&mut body, n.non_default_rule);

        let iterms: Vec<Oid> = crate::iter::Chain::new(&db.iterms, n.iterm_head, |t: &ITerm| (t.net_prev, t.net_next)).iter().collect();
        w_u32(&mut body, iterms.len() as u32);
        for tid in &iterms {
            w_oid(&mut body, *tid);
        }

        let bterms: Vec<Oid> = crate::iter::Chain::new(&db.bterms, n.bterm_head, crate::model::term::bterm_net_links).iter().collect();
        w_u32(&mut body, bterms.len() as u32);
        for tid in &bterms {
            w_oid(&mut body, *tid);
        }
    }
    write_section(out, TAG_NETS, &body);
    Some(())
}

/// Reads `block`'s `NETS` section: creates the `Net` records and relinks the `ITerm`/`BTerm`
/// chains [`read_block`] left unlinked.
pub fn read_nets(db: &mut Database, block: Oid, cur: &mut Cursor<&[u8]>) -> Result<(), OdbError> {
    let body = read_section(cur, TAG_NETS, "nets")?;
    let mut bc = Cursor::new(body.as_slice());
    let net_count = r_u32(&mut bc)?;
    let mut net_ids = Vec::with_capacity(net_count as usize);
    for _ in 0..net_count {
        let id = r_oid(&mut bc)?;
        let name = r_str(&mut bc)?;
        let signal_type = signal_type_from(r_u8(&mut bc)?)?;
        let non_default_rule = r_opt_oid(&mut bc)?;
        let mut net = Net::new(block, name);
        net.signal_type = signal_type;
        net.non_default_rule = non_default_rule;

        let iterm_count = r_u32(&mut bc)?;
        let iterm_ids: Vec<Oid> = (0..iterm_count).map(|_| r_oid(&mut bc)).collect::<Result<_, _>>()?;
        link_chain(&mut db.iterms, &iterm_ids);
        net.iterm_head = iterm_ids.first().copied().unwrap_or(Oid::NULL);

        let bterm_count = r_u32(&mut bc)?;
        let bterm_ids: Vec<Oid> = (0..bterm_count).map(|_| r_oid(&mut bc)).collect::<Result<_, _>>()?;
        link_chain(&mut db.bterms, &bterm_ids);
        net.bterm_head = bterm_ids.first().copied().unwrap_or(Oid::NULL);

        db.nets.alloc_at(id.raw(), |_| net);
        net_ids.push(id);
    }
    link_chain(&mut db.nets, &net_ids);
    db.blocks.get_mut(block).expect("block exists").net_head = net_ids.first().copied().unwrap_or(Oid::NULL);
    Ok(())
}

// -- Wires section ----------------------------------------------------------------------------

/// Emits `block`'s `WIRES` section: each net with a decoded `Wire` (spec §4.5), as (net id, opcode
/// byte length, opcode bytes).
pub fn write_wires(db: &Database, block: Oid, out: &mut Vec<u8>) -> Option<()> {
    let b = db.blocks.get(block)?;
    let mut body = Vec::new();
    let nets: Vec<Oid> = crate::iter::Chain::new(&db.nets, b.net_head, |n: &Net| (n.prev, n.next)).iter().collect();
    let mut entries = Vec::new();
    for net in nets {
        if let Some(wire_id) = db.nets.get(net).expect("chain id live").wire {
            let w = db.wires.get(wire_id).expect("net.wire must be live");
            entries.push((net, w.wire.to_bytes()));
        }
    }
    w_u32(&mut body, entries.len() as u32);
    for (net, bytes) in &entries {
        w_oid(&mut body, *net);
        w_u32(&mut body, bytes.len() as u32);
        body.extend_from_slice(bytes);
    }
    write_section(out, TAG_WIRES, &body);
    Some(())
}

/// Reads `block`'s `WIRES` section, decoding each opcode stream and attaching it to its net (which
/// must already exist, i.e. [`read_nets`] must run first).
pub fn read_wires(db: &mut Database, cur: &mut Cursor<&[u8]>) -> Result<(), OdbError> {
    let body = read_section(cur, TAG_WIRES, "wires")?;
    let mut bc = Cursor::new(body.as_slice());
    let count = r_u32(&mut bc)?;
    for _ in 0..count {
        let net = r_oid(&mut bc)?;
        let len = r_u32(&mut bc)? as usize;
        let bytes = r_bytes(&mut bc, len)?;
        let decoded = Wire::decode(&bytes)?;
        let wire_id = db.wires.alloc(|_| WireRecord { net, wire: decoded });
        if let Some(n) = db.nets.get_mut(net) {
            n.wire = Some(wire_id);
        }
    }
    Ok(())
}

// -- Parasitics section -----------------------------------------------------------------------

/// Emits `block`'s `PARASITICS` section: every net's `CapNode`/`RSeg` chains and every `CCSeg`
/// reachable from them (written once, from its lower-numbered endpoint net, to avoid duplicates).
pub fn write_parasitics(db: &Database, block: Oid, out: &mut Vec<u8>) -> Option<()> {
    let b = db.blocks.get(block)?;
    let mut body = Vec::new();
    let nets: Vec<Oid> = crate::iter::Chain::new(&db.nets, b.net_head, |n: &Net| (n.prev, n.next)).iter().collect();

    for net in &nets {
        let n = db.nets.get(*net).expect("chain id live");
        let capnodes: Vec<Oid> = crate::iter::Chain::new(&db.capnodes, n.capnode_head, |c: &CapNode| (c.prev, c.next)).iter().collect();
        w_u32(&mut body, capnodes.len() as u32);
        for id in &capnodes {
            let c = db.capnodes.get(*id).expect("chain id live");
            w_oid(&mut body, *id);
            write_capnode_kind(&mut body, &c.kind);
            w_bool(&mut body, c.shape_id.is_some());
            w_u32(&mut body, c.shape_id.unwrap_or(0));
            w_f64_vec(&mut body, &c.capacitance);
        }

        let rsegs: Vec<Oid> = crate::iter::Chain::new(&db.rsegs, n.rseg_head, |r: &RSeg| (r.prev, r.next)).iter().collect();
        w_u32(&mut body, rsegs.len() as u32);
        for id in &rsegs {
            let r = db.rsegs.get(*id).expect("chain id live");
            w_oid(&mut body, *id);
            w_oid(&mut body, r.source);
            w_oid(&mut body, r.target);
            w_i32(&mut body, r.from_x);
            w_i32(&mut body, r.from_y);
            w_u8(&mut body, r.path_dir);
            w_bool(&mut body, r.shape_id.is_some());
            w_u32(&mut body, r.shape_id.unwrap_or(0));
            w_f64_vec(&mut body, &r.resistance);
        }

        // `ccsegs_of` dispatches on which side of the segment this net sits on, so the ids here
        // are already in this net's own chain order -- the side that gets re-threaded in
        // `read_parasitics`.
        let ccsegs: Vec<Oid> = db.ccsegs_of(*net).collect();
        w_u32(&mut body, ccsegs.len() as u32);
        for id in &ccsegs {
            w_oid(&mut body, *id);
        }
    }

    // Each CCSeg is reachable from both endpoint nets' chains above; its full body is written only
    // the first time it is seen (from whichever endpoint sorts first in our `nets` traversal).
    let mut seen = std::collections::HashSet::new();
    let mut ccsegs = Vec::new();
    for net in &nets {
        for id in db.ccsegs_of(*net) {
            if seen.insert(id) {
                ccsegs.push(id);
            }
        }
    }
    w_u32(&mut body, ccsegs.len() as u32);
    for id in &ccsegs {
        let c = db.ccsegs.get(*id).expect("chain id live");
        w_oid(&mut body, *id);
        w_oid(&mut body, c.net_a);
        w_oid(&mut body, c.cap_a);
        w_oid(&mut body, c.net_b);
        w_oid(&mut body, c.cap_b);
        w_f64_vec(&mut body, &c.capacitance);
    }

    write_section(out, TAG_PARASITICS, &body);
    Some(())
}

fn write_capnode_kind(out: &mut Vec<u8>, kind: &CapNodeKind) {
    match kind {
        CapNodeKind::ITerm(id) => {
            w_u8(out, 0);
            w_oid(out, *id);
        }
        CapNodeKind::BTerm(id) => {
            w_u8(out, 1);
            w_oid(out, *id);
        }
        CapNodeKind::Internal => w_u8(out, 2),
        CapNodeKind::Branch => w_u8(out, 3),
        CapNodeKind::Dangling => w_u8(out, 4),
        CapNodeKind::Foreign => w_u8(out, 5),
    }
}

fn read_capnode_kind(cur: &mut Cursor<&[u8]>) -> Result<CapNodeKind, OdbError> {
    Ok(match r_u8(cur)? {
        0 => CapNodeKind::ITerm(r_oid(cur)?),
        1 => CapNodeKind::BTerm(r_oid(cur)?),
        2 => CapNodeKind::Internal,
        3 => CapNodeKind::Branch,
        4 => CapNodeKind::Dangling,
        5 => CapNodeKind::Foreign,
        other => return Err(OdbError::UnknownOpcode(other)),
    })
}

/// Reads `block`'s `PARASITICS` section. Must run after [`read_nets`] has created every net.
pub fn read_parasitics(db: &mut Database, block: Oid, cur: &mut Cursor<&[u8]>) -> Result<(), OdbError> {
    let body = read_section(cur, TAG_PARASITICS, "parasitics")?;
    let mut bc = Cursor::new(body.as_slice());
    let nets: Vec<Oid> = crate::iter::Chain::new(&db.nets, db.blocks.get(block).expect("block exists").net_head, |n: &Net| (n.prev, n.next))
        .iter()
        .collect();
    let mut ccseg_refs: Vec<(Oid, Vec<Oid>)> = Vec::new();

    for net in &nets {
        let cap_count = r_u32(&mut bc)?;
        let mut cap_ids = Vec::with_capacity(cap_count as usize);
        for _ in 0..cap_count {
            let id = r_oid(&mut bc)?;
            let kind = read_capnode_kind(&mut bc)?;
            let has_shape = r_bool(&mut bc)?;
            let shape_raw = r_u32(&mut bc)?;
            let capacitance = r_f64_vec(&mut bc)?;
            let mut c = CapNode::new(*net, kind, 0);
            c.shape_id = if has_shape { Some(shape_raw) } else { None };
            c.capacitance = capacitance;
            db.capnodes.alloc_at(id.raw(), |_| c);
            cap_ids.push(id);
        }
        link_chain(&mut db.capnodes, &cap_ids);
        db.nets.get_mut(*net).expect("net exists").capnode_head = cap_ids.first().copied().unwrap_or(Oid::NULL);

        let rseg_count = r_u32(&mut bc)?;
        let mut rseg_ids = Vec::with_capacity(rseg_count as usize);
        for _ in 0..rseg_count {
            let id = r_oid(&mut bc)?;
            let source = r_oid(&mut bc)?;
            let target = r_oid(&mut bc)?;
            let from_x = r_i32(&mut bc)?;
            let from_y = r_i32(&mut bc)?;
            let path_dir = r_u8(&mut bc)?;
            let has_shape = r_bool(&mut bc)?;
            let shape_raw = r_u32(&mut bc)?;
            let resistance = r_f64_vec(&mut bc)?;
            let mut r = RSeg::new(*net, source, target, from_x, from_y, path_dir, 0);
            r.shape_id = if has_shape { Some(shape_raw) } else { None };
            r.resistance = resistance;
            db.rsegs.alloc_at(id.raw(), |_| r);
            rseg_ids.push(id);
        }
        link_chain(&mut db.rsegs, &rseg_ids);
        db.nets.get_mut(*net).expect("net exists").rseg_head = rseg_ids.first().copied().unwrap_or(Oid::NULL);

        let ccseg_ref_count = r_u32(&mut bc)?;
        let ids: Vec<Oid> = (0..ccseg_ref_count).map(|_| r_oid(&mut bc)).collect::<Result<_, _>>()?;
        ccseg_refs.push((*net, ids));
    }

    let ccseg_count = r_u32(&mut bc)?;
    for _ in 0..ccseg_count {
        let id = r_oid(&mut bc)?;
        let net_a = r_oid(&mut bc)?;
        let cap_a = r_oid(&mut bc)?;
        let net_b = r_oid(&mut bc)?;
        let cap_b = r_oid(&mut bc)?;
        let capacitance = r_f64_vec(&mut bc)?;
        let mut c = CCSeg::new(net_a, cap_a, net_b, cap_b, 0);
        c.capacitance = capacitance;
        db.ccsegs.alloc_at(id.raw(), |_| c);
    }

    for (net, ids) in &ccseg_refs {
        link_ccseg_side_chain(db, *net, ids);
    }

    Ok(())
}

/// Threads `ids` into the side of a `CCSeg` chain that belongs to `net` (`a_next`/`a_prev` if
/// `net` is the segment's `net_a`, `b_next`/`b_prev` if it is `net_b`) and points `net`'s own
/// `ccseg_head` at the first one. The two sides of one `CCSeg` are independent lists, so each net's
/// pass only ever touches the pointers it owns.
fn link_ccseg_side_chain(db: &mut Database, net: Oid, ids: &[Oid]) {
    for (i, id) in ids.iter().enumerate() {
        let prev = if i == 0 { Oid::NULL } else { ids[i - 1] };
        let next = ids.get(i + 1).copied().unwrap_or(Oid::NULL);
        if let Some(c) = db.ccsegs.get_mut(*id) {
            if c.net_a == net {
                c.a_prev = prev;
                c.a_next = next;
            } else {
                debug_assert_eq!(c.net_b, net);
                c.b_prev = prev;
                c.b_next = next;
            }
        }
    }
    if let Some(first) = ids.first() {
        db.nets.get_mut(net).expect("net exists").ccseg_head = *first;
    }
}

// -- Whole-database round trip ------------------------------------------------------------------

/// Serializes `db` in full: header, `TECH`, one `LIB` per library, one `BLOCK`/`NETS`/`WIRES`/
/// `PARASITICS` group per block (in ascending block-id order, which is always parent-before-child
/// since a block cannot exist before its parent).
pub fn write_database(db: &Database) -> Vec<u8> {
    let mut out = Vec::new();
    w_u32(&mut out, MAGIC);
    w_u16(&mut out, FORMAT_VERSION.0);
    w_u16(&mut out, FORMAT_VERSION.1);
    w_u32(&mut out, db.schema_generation);
    w_str(&mut out, &db.name);

    write_tech(db, &mut out);
    write_chip(db, &mut out);
    for lib in db.libs_iter() {
        write_lib(db, lib, &mut out);
    }
    for (block, _) in db.blocks.iter() {
        write_block(db, block, &mut out);
        write_nets(db, block, &mut out);
        write_wires(db, block, &mut out);
        write_parasitics(db, block, &mut out);
    }
    out
}

/// Deserializes a whole database from `bytes` into a brand-new [`Database`], leaving any existing
/// database the caller holds untouched until (and unless) this returns `Ok`.
pub fn read_database(bytes: &[u8]) -> Result<Database, OdbError> {
    let mut cur = Cursor::new(bytes);
    let magic = r_u32(&mut cur)?;
    if magic != MAGIC {
        return Err(OdbError::BadMagic { expected: MAGIC, found: magic });
    }
    let major = r_u16(&mut cur)?;
    let minor = r_u16(&mut cur)?;
    if major != FORMAT_VERSION.0 {
        return Err(OdbError::UnsupportedVersion { major, minor, max_major: FORMAT_VERSION.0, max_minor: FORMAT_VERSION.1 });
    }
    let schema_generation = r_u32(&mut cur)?;
    let name = r_str(&mut cur)?;

    let mut db = Database::create(&name);
    db.schema_generation = schema_generation;
    read_tech(&mut db, &mut cur)?;
    read_chip(&mut db, &mut cur)?;

    // Libs and blocks were each written as self-delimited sections; keep reading LIB sections
    // until the next tag belongs to a block group instead.
    loop {
        let save = cur.position();
        match r_u8(&mut cur) {
            Ok(TAG_LIB) => {
                cur.set_position(save);
                read_lib(&mut db, &mut cur)?;
            }
            Ok(_) => {
                cur.set_position(save);
                break;
            }
            Err(_) => break,
        }
    }
    loop {
        if (cur.position() as usize) >= bytes.len() {
            break;
        }
        let block = read_block(&mut db, &mut cur)?;
        read_nets(&mut db, block, &mut cur)?;
        read_wires(&mut db, &mut cur)?;
        read_parasitics(&mut db, block, &mut cur)?;
    }

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::{IoType, SignalType};
    use crate::rc::CapNodeKind;

    fn sample_database() -> Database {
        let mut db = Database::create("roundtrip");
        let _tech = db.create_tech(1000).expect("tech");
        let layer = db.create_layer("M1", 1).expect("layer");
        db.layers.get_mut(layer).expect("just created").routing_level = Some(1);
        let lib = db.create_lib("lib", 1000).expect("lib");
        let master = db.create_master(lib, "INV").expect("master");
        let mterm_a = db.create_mterm(master, "A", IoType::Input, SignalType::Signal).expect("mterm a");
        let _ = db.create_mterm(master, "Z", IoType::Output, SignalType::Signal).expect("mterm z");
        db.freeze_master(master);
        let _ = mterm_a;

        let (_chip, block) = db.create_chip("top", 1000).expect("chip");
        db.set_corner_count(block, 2);
        let inst = db.create_inst(block, master, "u1").expect("inst");
        let net = db.create_net(block, "n1").expect("net");
        let a_iterm = db.iterm_of_inst(inst, 0).expect("iterm a");
        db.connect_iterm(a_iterm, net);
        let cap = db.create_capnode(net, CapNodeKind::Internal).expect("capnode");
        let cap2 = db.create_capnode(net, CapNodeKind::Internal).expect("capnode2");
        let rseg = db.create_rseg(net, cap, cap2, 0, 0, 0, true).expect("rseg");
        db.rsegs.get_mut(rseg).unwrap().set_resistance(0, 3.5);
        db
    }

    #[test]
    fn whole_database_round_trips_tech_lib_and_block_graph() {
        let db = sample_database();
        let bytes = write_database(&db);
        let restored = read_database(&bytes).expect("decode");

        let (tech_id, tech) = restored.tech.iter().next().expect("tech restored");
        assert_eq!(tech.dbu_per_micron, 1000);
        let _ = tech_id;
        let layer = restored.layers.iter().next().expect("layer restored").1;
        assert_eq!(layer.name, "M1");
        assert_eq!(layer.routing_level, Some(1));

        let lib = restored.libs_iter().next().expect("lib restored");
        assert_eq!(restored.find_master(lib, "INV"), restored.masters.iter().next().map(|(id, _)| id));

        let block = restored.top_block().expect("block restored");
        let net = restored.find_net(block, "n1").expect("net restored");
        let inst = restored.find_inst(block, "u1").expect("inst restored");
        let iterm = restored.iterm_of_inst(inst, 0).expect("iterm restored");
        assert_eq!(restored.iterms.get(iterm).unwrap().net, Some(net));
        assert_eq!(restored.rsegs_of(net).count(), 1);
        let rseg = restored.rsegs_of(net).next().unwrap();
        assert_eq!(restored.rsegs.get(rseg).unwrap().resistance[0], 3.5);
    }

    #[test]
    fn bad_magic_is_rejected_without_touching_caller_state() {
        let mut bytes = write_database(&sample_database());
        bytes[0] ^= 0xFF;
        assert!(matches!(read_database(&bytes), Err(OdbError::BadMagic { .. })));
    }

    #[test]
    fn corrupted_section_body_fails_checksum() {
        let bytes = write_database(&sample_database());
        let mut corrupt = bytes.clone();
        // flip a byte inside the tech section body, well past the fixed header
        let idx = corrupt.len() / 4;
        corrupt[idx] ^= 0x01;
        assert!(read_database(&corrupt).is_err());
    }
}
