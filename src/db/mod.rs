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

//! The `Database` aggregate: one [`crate::page::Table`] per object type tag (C2), wired together
//! by the creation/destruction contracts of C5. This is the "embedding interface" of spec §6 made
//! concrete -- external collaborators (LEF/DEF/GDS parsers, the extractor, SPEF I/O) hold a
//! `&mut Database` and call the `create`/`destroy`/accessor methods spread across this module and
//! its siblings (`netlist`, `geometry`, `parasitics`).

mod geometry;
mod netlist;
mod parasitics;

use std::collections::HashMap;

use crate::eco::EcoJournal;
use crate::iter::{chain_push_front, chain_unlink, Chain};
use crate::model::block::{Block, Chip, GCellGrid, Group, ModInst, Module, Region, Row, TrackGrid};
use crate::model::enums::{IoType, SignalType};
use crate::model::library::{Lib, MPin, MTerm, Master, Site};
use crate::model::net::{Net, SWire, WireRecord};
use crate::model::shape::{Blockage, Fill, Obstruction, Shape, SpecialShape};
use crate::model::tech::{AntennaRule, Layer, NonDefaultRule, Tech, TechVia, ViaGenerateRule, ViaRule};
use crate::model::term::{BPin, BTerm};
use crate::model::via::Via;
use crate::model::inst::{ITerm, Inst};
use crate::oid::Oid;
use crate::page::Table;
use crate::property::PropertyTable;
use crate::rc::{CCSeg, CapNode, RSeg};

/// 4-byte magic stamped at the head of every stream-codec section sequence (spec §4.4).
pub const MAGIC: u32 = 0x4F44_4230; // "ODB0"
pub const FORMAT_VERSION: (u16, u16) = (1, 0);

/// One open in-memory database (spec §3: "Exactly one per open instance").
pub struct Database {
    pub(crate) name: String,
    pub(crate) schema_generation: u32,

    pub(crate) tech: Table<Tech>,
    pub(crate) chip: Table<Chip>,

    pub(crate) libs: Table<Lib>,
    pub(crate) masters: Table<Master>,
    pub(crate) mterms: Table<MTerm>,
    pub(crate) mpins: Table<MPin>,
    pub(crate) sites: Table<Site>,

    pub(crate) layers: Table<Layer>,
    pub(crate) tech_vias: Table<TechVia>,
    pub(crate) via_rules: Table<ViaRule>,
    pub(crate) via_generate_rules: Table<ViaGenerateRule>,
    pub(crate) non_default_rules: Table<NonDefaultRule>,
    pub(crate) antenna_rules: Table<AntennaRule>,

    pub(crate) blocks: Table<Block>,
    pub(crate) insts: Table<Inst>,
    pub(crate) iterms: Table<ITerm>,
    pub(crate) bterms: Table<BTerm>,
    pub(crate) bpins: Table<BPin>,
    pub(crate) nets: Table<Net>,
    pub(crate) swires: Table<SWire>,
    pub(crate) wires: Table<WireRecord>,
    pub(crate) vias: Table<Via>,

    pub(crate) boxes: Table<Shape>,
    pub(crate) sboxes: Table<SpecialShape>,
    pub(crate) fills: Table<Fill>,
    pub(crate) obstructions: Table<Obstruction>,
    pub(crate) blockages: Table<Blockage>,
    pub(crate) rows: Table<Row>,
    pub(crate) regions: Table<Region>,
    pub(crate) modules: Table<Module>,
    pub(crate) modinsts: Table<ModInst>,
    pub(crate) groups: Table<Group>,
    pub(crate) track_grids: Table<TrackGrid>,
    pub(crate) gcell_grids: Table<GCellGrid>,

    pub(crate) capnodes: Table<CapNode>,
    pub(crate) rsegs: Table<RSeg>,
    pub(crate) ccsegs: Table<CCSeg>,

    pub(crate) properties: PropertyTable,
    pub(crate) eco: HashMap<Oid, EcoJournal>,

    /// Named boolean flags on a `Net`, keyed by `(net, flag name)`. A side table rather than
    /// fixed `Net` fields since the exact set of user flag bits is unspecified (spec §9 open
    /// question); unset is `false`.
    pub(crate) net_flags: HashMap<(Oid, String), bool>,
}

impl Database {
    /// Creates and registers (C12) a new, empty database. Picks a fresh name if `name` collides
    /// with one already registered (spec §4.10 creation contracts: collisions are recoverable).
    pub fn create(name: &str) -> Self {
        let unique = crate::registry::unique_name(name);
        if unique != name {
            log::warn!("odb: database name {name:?} already registered, using {unique:?} instead");
        }
        crate::registry::register(&unique);
        Database {
            name: unique,
            schema_generation: 1,
            tech: Table::new(),
            chip: Table::new(),
            libs: Table::new(),
            masters: Table::new(),
            mterms: Table::new(),
            mpins: Table::new(),
            sites: Table::new(),
            layers: Table::new(),
            tech_vias: Table::new(),
            via_rules: Table::new(),
            via_generate_rules: Table::new(),
            non_default_rules: Table::new(),
            antenna_rules: Table::new(),
            blocks: Table::new(),
            insts: Table::new(),
            iterms: Table::new(),
            bterms: Table::new(),
            bpins: Table::new(),
            nets: Table::new(),
            swires: Table::new(),
            wires: Table::new(),
            vias: Table::new(),
            boxes: Table::new(),
            sboxes: Table::new(),
            fills: Table::new(),
            obstructions: Table::new(),
            blockages: Table::new(),
            rows: Table::new(),
            regions: Table::new(),
            modules: Table::new(),
            modinsts: Table::new(),
            groups: Table::new(),
            track_grids: Table::new(),
            gcell_grids: Table::new(),
            capnodes: Table::new(),
            rsegs: Table::new(),
            ccsegs: Table::new(),
            properties: PropertyTable::new(),
            eco: HashMap::new(),
            net_flags: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str { &self.name }

    /// Unregisters this database from the session registry (spec §4.10: "unregistration on
    /// destruction"). Consumes `self` since nothing should observe a `Database` past this point.
    pub fn destroy(self) { crate::registry::unregister(&self.name); }

    // -- Tech -----------------------------------------------------------------------------

    /// Creates the one `Tech` this database owns. Returns `None` if a `Tech` already exists
    /// (spec §3: "Database... Owns: one Tech").
    pub fn create_tech(&mut self, dbu_per_micron: i32) -> Option<Oid> {
        if self.tech.len() != 0 {
            log::warn!("odb: database already has a tech");
            return None;
        }
        Some(self.tech.alloc(|_| Tech::new(dbu_per_micron)))
    }

    pub fn tech(&self) -> Option<&Tech> { self.tech.iter().next().map(|(_, t)| t) }
    pub fn tech_mut(&mut self) -> Option<&mut Tech> { self.tech.get_mut(self.tech.begin()) }
    pub fn tech_id(&self) -> Oid { self.tech.begin() }

    pub fn create_layer(&mut self, name: &str, mask_number: u16) -> Option<Oid> {
        let tech_id = self.tech_id();
        if tech_id.is_null() {
            log::error!("odb: create_layer called before create_tech");
            return None;
        }
        if self.find_layer(name).is_some() {
            return None;
        }
        let id = self.layers.alloc(|_| Layer::new(name, mask_number));
        let tech = self.tech.get_mut(tech_id).expect("tech exists");
        chain_push_front(&mut self.layers, &mut tech.layer_head, id);
        if tech.layer_tail.is_null() {
            tech.layer_tail = id;
        }
        Some(id)
    }

    pub fn find_layer(&self, name: &str) -> Option<Oid> {
        let tech_id = self.tech_id();
        if tech_id.is_null() {
            return None;
        }
        let head = self.tech.get(tech_id)?.layer_head;
        Chain::new(&self.layers, head, |l: &Layer| (l.prev, l.next))
            .iter()
            .find(|&id| self.layers.get(id).is_some_and(|l| l.name == name))
    }

    pub fn layers_in_order(&self) -> Vec<Oid> {
        let tech_id = self.tech_id();
        if tech_id.is_null() {
            return Vec::new();
        }
        let head = self.tech.get(tech_id).expect("checked").layer_head;
        let mut v: Vec<Oid> =
            Chain::new(&self.layers, head, |l: &Layer| (l.prev, l.next)).iter().collect();
        // chain is head-insert (most-recent-first); layers must read bottom->top by mask number
        v.sort_by_key(|&id| self.layers.get(id).expect("live").mask_number);
        v
    }

    pub fn create_tech_via(&mut self, name: &str, cut_layer: Oid, top_layer: Oid, bottom_layer: Oid) -> Option<Oid> {
        let tech_id = self.tech_id();
        if tech_id.is_null() || self.find_tech_via(name).is_some() {
            return None;
        }
        let id = self.tech_vias.alloc(|_| TechVia::new(name, cut_layer, top_layer, bottom_layer));
        let tech = self.tech.get_mut(tech_id).expect("tech exists");
        chain_push_front(&mut self.tech_vias, &mut tech.tech_via_head, id);
        Some(id)
    }

    pub fn find_tech_via(&self, name: &str) -> Option<Oid> {
        let tech_id = self.tech_id();
        let head = self.tech.get(tech_id)?.tech_via_head;
        Chain::new(&self.tech_vias, head, |v: &TechVia| (v.prev, v.next))
            .iter()
            .find(|&id| self.tech_vias.get(id).is_some_and(|v| v.name == name))
    }

    pub fn create_non_default_rule(&mut self, name: &str) -> Option<Oid> {
        let tech_id = self.tech_id();
        if tech_id.is_null() || self.find_non_default_rule(name).is_some() {
            return None;
        }
        let id = self.non_default_rules.alloc(|_| NonDefaultRule::new(name));
        let tech = self.tech.get_mut(tech_id).expect("tech exists");
        chain_push_front(&mut self.non_default_rules, &mut tech.non_default_rule_head, id);
        Some(id)
    }

    pub fn find_non_default_rule(&self, name: &str) -> Option<Oid> {
        let tech_id = self.tech_id();
        let head = self.tech.get(tech_id)?.non_default_rule_head;
        Chain::new(&self.non_default_rules, head, |r: &NonDefaultRule| (r.prev, r.next))
            .iter()
            .find(|&id| self.non_default_rules.get(id).is_some_and(|r| r.name == name))
    }

    // -- Lib / Master / MTerm / MPin / Site ------------------------------------------------

    pub fn create_lib(&mut self, name: &str, dbu_per_micron: i32) -> Option<Oid> {
        if self.find_lib(name).is_some() {
            return None;
        }
        Some(self.libs.alloc(|_| Lib::new(name, dbu_per_micron)))
    }

    pub fn find_lib(&self, name: &str) -> Option<Oid> {
        self.libs.iter_ids().find(|&id| self.libs.get(id).is_some_and(|l| l.name == name))
    }

    pub fn create_master(&mut self, lib: Oid, name: &str) -> Option<Oid> {
        if self.libs.get(lib).is_none() || self.find_master(lib, name).is_some() {
            return None;
        }
        let id = self.masters.alloc(|_| Master::new(lib, name));
        let l = self.libs.get_mut(lib).expect("checked");
        chain_push_front(&mut self.masters, &mut l.master_head, id);
        Some(id)
    }

    pub fn find_master(&self, lib: Oid, name: &str) -> Option<Oid> {
        let head = self.libs.get(lib)?.master_head;
        Chain::new(&self.masters, head, |m: &Master| (m.prev, m.next))
            .iter()
            .find(|&id| self.masters.get(id).is_some_and(|m| m.name == name))
    }

    /// Creation contract (spec §4.3): a frozen master rejects mterm creation (recoverable, `None`
    /// return -- spec §7 "Frozen-master violation").
    pub fn create_mterm(&mut self, master: Oid, name: &str, io_type: IoType, signal_type: SignalType) -> Option<Oid> {
        let m = self.masters.get(master)?;
        if m.frozen {
            log::warn!("odb: cannot create mterm {name:?} on frozen master");
            return None;
        }
        let index = m.mterm_count;
        let id = self.mterms.alloc(|_| MTerm::new(master, name, io_type, signal_type, index));
        let m = self.masters.get_mut(master).expect("checked");
        chain_push_front(&mut self.mterms, &mut m.mterm_head, id);
        m.mterm_count += 1;
        Some(id)
    }

    /// Rejects destruction on a frozen master, mirroring `create_mterm`.
    pub fn destroy_mterm(&mut self, master: Oid, mterm: Oid) -> bool {
        let Some(m) = self.masters.get(master) else { return false };
        if m.frozen {
            log::warn!("odb: cannot destroy mterm on frozen master");
            return false;
        }
        let mut head = m.mterm_head;
        chain_unlink(&mut self.mterms, &mut head, mterm);
        self.masters.get_mut(master).expect("checked").mterm_head = head;
        self.masters.get_mut(master).expect("checked").mterm_count -= 1;
        self.mterms.free(mterm);
        true
    }

    /// Freezes a master: MTerm indices `[0..N-1]` become stable, further mterm edits are rejected
    /// (spec §3 invariant).
    pub fn freeze_master(&mut self, master: Oid) -> bool {
        match self.masters.get_mut(master) {
            Some(m) => {
                m.frozen = true;
                true
            }
            None => false,
        }
    }

    pub fn create_mpin(&mut self, mterm: Oid) -> Option<Oid> {
        self.mterms.get(mterm)?;
        let id = self.mpins.alloc(|_| MPin::new(mterm));
        let head = &mut self.mterms.get_mut(mterm).expect("checked").mpin_head;
        chain_push_front(&mut self.mpins, head, id);
        Some(id)
    }

    pub fn create_site(&mut self, lib: Oid, name: &str, width: i32, height: i32) -> Option<Oid> {
        if self.libs.get(lib).is_none() || self.find_site(lib, name).is_some() {
            return None;
        }
        let id = self.sites.alloc(|_| Site::new(lib, name, width, height));
        let l = self.libs.get_mut(lib).expect("checked");
        chain_push_front(&mut self.sites, &mut l.site_head, id);
        Some(id)
    }

    pub fn find_site(&self, lib: Oid, name: &str) -> Option<Oid> {
        let head = self.libs.get(lib)?.site_head;
        Chain::new(&self.sites, head, |s: &Site| (s.prev, s.next))
            .iter()
            .find(|&id| self.sites.get(id).is_some_and(|s| s.name == name))
    }

    /// Every `Master` owned by `lib`, in chain order.
    pub fn masters_of(&self, lib: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.libs.get(lib).map(|l| l.master_head).unwrap_or(Oid::NULL);
        Chain::new(&self.masters, head, |m: &Master| (m.prev, m.next)).iter()
    }

    /// Every `Site` owned by `lib`, in chain order.
    pub fn sites_of(&self, lib: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.libs.get(lib).map(|l| l.site_head).unwrap_or(Oid::NULL);
        Chain::new(&self.sites, head, |s: &Site| (s.prev, s.next)).iter()
    }

    /// Every `MTerm` of `master`, in declaration order.
    pub fn mterms_of(&self, master: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.masters.get(master).map(|m| m.mterm_head).unwrap_or(Oid::NULL);
        Chain::new(&self.mterms, head, |m: &MTerm| (m.prev, m.next)).iter()
    }

    // -- Chip / Block -----------------------------------------------------------------------

    /// Creates the one `Chip` this database owns, with `top` as its top-level `Block`.
    pub fn create_chip(&mut self, top_name: &str, dbu_per_micron: i32) -> Option<(Oid, Oid)> {
        if self.chip.len() != 0 {
            return None;
        }
        let top = self.blocks.alloc(|_| Block::new(None, top_name, dbu_per_micron));
        let chip = self.chip.alloc(|_| Chip { top_block: top });
        Some((chip, top))
    }

    pub fn top_block(&self) -> Option<Oid> { self.chip.iter().next().map(|(_, c)| c.top_block) }

    /// Creates a child block underneath `parent` (not chained into any list in spec.md -- child
    /// blocks are addressed by id from whatever instance binds to them, per spec §3 "Inst... may
    /// be bound to a child Block").
    pub fn create_child_block(&mut self, parent: Oid, name: &str) -> Option<Oid> {
        let dbu = self.blocks.get(parent)?.dbu_per_micron;
        Some(self.blocks.alloc(|_| Block::new(Some(parent), name, dbu)))
    }

    pub fn block(&self, id: Oid) -> Option<&Block> { self.blocks.get(id) }
    pub fn block_mut(&mut self, id: Oid) -> Option<&mut Block> { self.blocks.get_mut(id) }

    /// Sets the number of parasitic corners a block's RC side tables are sized for. Must be
    /// called before any `CapNode`/`RSeg`/`CCSeg` is created on a net of this block (spec §3:
    /// "constant for the block's lifetime after first allocation").
    pub fn set_corner_count(&mut self, block: Oid, corner_count: u32) -> bool {
        match self.blocks.get_mut(block) {
            Some(b) if self.nets_of(block).next().is_none() => {
                b.corner_count = corner_count;
                true
            }
            _ => false,
        }
    }

    pub fn libs_iter(&self) -> impl Iterator<Item = Oid> + '_ { self.libs.iter_ids() }

    // -- ECO journal (C9) -------------------------------------------------------------------

    /// `beginEco` (spec §4.7): starts (or restarts) recording on `block`'s journal.
    pub fn begin_eco(&mut self, block: Oid) -> bool {
        if self.blocks.get(block).is_none() {
            return false;
        }
        self.eco.entry(block).or_insert_with(EcoJournal::new).begin()
    }

    pub fn end_eco(&mut self, block: Oid) -> bool {
        self.eco.get_mut(&block).is_some_and(|j| j.end())
    }

    /// `ecoEmpty`: a block with no journal at all counts as empty.
    pub fn eco_empty(&self, block: Oid) -> bool {
        self.eco.get(&block).is_none_or(|j| j.is_empty())
    }

    /// `readEco`: the entries captured since the last `beginEco`, or an empty slice if `block`
    /// never had one.
    pub fn read_eco(&self, block: Oid) -> &[crate::eco::EcoEntry] {
        self.eco.get(&block).map(|j| j.entries()).unwrap_or(&[])
    }

    /// `writeEco`: replays `block`'s captured journal onto `target`'s `target_block`, then
    /// commits (clears) the source journal. Mirrors an ECO hand-off between two open databases
    /// of the same schema (spec §4.7, scenario 6).
    pub fn write_eco(&mut self, block: Oid, target: &mut Database, target_block: Oid) -> bool {
        let Some(journal) = self.eco.get(&block) else { return false };
        crate::eco::replay(target, target_block, journal);
        self.eco.get_mut(&block).expect("checked").commit();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::{IoType, SignalType};

    #[test]
    fn tech_and_layers_scenario_1_setup() {
        let mut db = Database::create("scenario1_tech");
        db.create_tech(1000);
        let m1 = db.create_layer("M1", 1).unwrap();
        let m2 = db.create_layer("M2", 2).unwrap();
        assert_eq!(db.layers_in_order(), vec![m1, m2]);
        db.destroy();
    }

    #[test]
    fn frozen_master_rejects_mterm_mutation() {
        let mut db = Database::create("scenario1_master");
        let lib = db.create_lib("L", 1000).unwrap();
        let master = db.create_master(lib, "INV_X1").unwrap();
        let a = db.create_mterm(master, "A", IoType::Input, SignalType::Signal).unwrap();
        db.create_mterm(master, "Y", IoType::Output, SignalType::Signal).unwrap();
        assert!(db.freeze_master(master));
        assert!(db.create_mterm(master, "Z", IoType::Input, SignalType::Signal).is_none());
        assert!(!db.destroy_mterm(master, a));
        db.destroy();
    }

    #[test]
    fn duplicate_names_are_rejected_with_null() {
        let mut db = Database::create("scenario1_dup");
        let lib = db.create_lib("L", 1000).unwrap();
        assert!(db.create_lib("L", 1000).is_none());
        db.create_master(lib, "INV_X1").unwrap();
        assert!(db.create_master(lib, "INV_X1").is_none());
        db.destroy();
    }
}
