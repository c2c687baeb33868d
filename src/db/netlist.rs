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

//! Netlist entity lifecycle: `Inst`/`ITerm`, `Net`, `BTerm`/`BPin`, and the `connect`/`disconnect`
//! operations spec.md §3-§4.3 describe. Scenario 1 of spec §8 is exercised end-to-end by this
//! module's tests.

use crate::db::Database;
use crate::iter::{chain_push_front, chain_unlink, Chain};
use crate::model::enums::{IoType, ObjectType, SignalType};
use crate::model::inst::{ITerm, Inst};
use crate::model::net::Net;
use crate::model::term::{bterm_block_links, bterm_net_links, BPin, BTerm};
use crate::oid::Oid;

impl Database {
    // -- Inst / ITerm -----------------------------------------------------------------------

    /// Creates an instance of `master` in `block`, plus one `ITerm` per `MTerm` of `master` in
    /// index order (spec §3: "ITerm. Implicit 1:1 with (Inst, MTerm)"). `master` need not be
    /// frozen, but un-frozen masters risk iterm/mterm-index mismatch if mterms are added later;
    /// OpenDB leaves that caller responsibility and so do we.
    pub fn create_inst(&mut self, block: Oid, master: Oid, name: &str) -> Option<Oid> {
        if self.blocks.get(block).is_none() || self.masters.get(master).is_none() {
            return None;
        }
        if self.find_inst(block, name).is_some() {
            log::warn!("odb: instance name {name:?} already exists in block");
            return None;
        }
        let mterm_head = self.masters.get(master).expect("checked").mterm_head;
        let mut mterms: Vec<Oid> =
            Chain::new(&self.mterms, mterm_head, |m| (m.prev, m.next)).iter().collect();
        mterms.sort_by_key(|&id| self.mterms.get(id).expect("live").index);

        let inst = self.insts.alloc(|_| Inst::new(block, master, name));
        let iterms: Vec<Oid> = mterms
            .iter()
            .map(|&mterm| {
                let index = self.mterms.get(mterm).expect("live").index;
                self.iterms.alloc(|_| ITerm::new(inst, mterm, index))
            })
            .collect();
        self.insts.get_mut(inst).expect("just allocated").iterms = iterms;

        let b = self.blocks.get_mut(block).expect("checked");
        chain_push_front(&mut self.insts, &mut b.inst_head, inst);
        let master_name = self.masters.get(master).expect("checked").name.clone();
        self.eco_record(
            block,
            crate::eco::EcoEntry::CreateInst { inst_name: name.to_string(), master_name },
        );
        Some(inst)
    }

    pub fn find_inst(&self, block: Oid, name: &str) -> Option<Oid> {
        let head = self.blocks.get(block)?.inst_head;
        Chain::new(&self.insts, head, |i: &Inst| (i.prev, i.next))
            .iter()
            .find(|&id| self.insts.get(id).is_some_and(|i| i.name == name))
    }

    pub fn insts_of(&self, block: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.blocks.get(block).map(|b| b.inst_head).unwrap_or(Oid::NULL);
        Chain::new(&self.insts, head, |i: &Inst| (i.prev, i.next)).iter()
    }

    pub fn iterm_of_inst(&self, inst: Oid, mterm_index: u32) -> Option<Oid> {
        self.insts.get(inst)?.iterms.get(mterm_index as usize).copied()
    }

    /// Finds the iterm of `inst` whose mterm has the given `name`, by scanning `master`'s mterm
    /// chain for the matching index (mirrors OpenDB's `findITerm(const char*)`).
    pub fn iterm_by_name(&self, inst: Oid, mterm_name: &str) -> Option<Oid> {
        let master = self.insts.get(inst)?.master;
        let head = self.masters.get(master)?.mterm_head;
        let mterm = Chain::new(&self.mterms, head, |m| (m.prev, m.next))
            .iter()
            .find(|&id| self.mterms.get(id).is_some_and(|m| m.name == mterm_name))?;
        let index = self.mterms.get(mterm)?.index;
        self.iterm_of_inst(inst, index)
    }

    /// Destroys an instance: disconnects every iterm from its net, frees the iterms, unlinks from
    /// the block chain, frees the properties, then the instance itself (spec §3 "Lifecycle").
    pub fn destroy_inst(&mut self, inst: Oid) -> bool {
        let Some(block) = self.insts.get(inst).map(|i| i.block) else { return false };
        let iterms: Vec<Oid> = self.insts.get(inst).expect("checked").iterms.clone();
        for it in iterms {
            self.disconnect_iterm(it);
            self.iterms.free(it);
        }
        let mut head = self.blocks.get(block).expect("checked").inst_head;
        chain_unlink(&mut self.insts, &mut head, inst);
        self.blocks.get_mut(block).expect("checked").inst_head = head;
        self.properties.destroy_all_owned_by(ObjectType::Inst, inst);
        let inst_name = self.insts.get(inst).expect("checked").name.clone();
        self.insts.free(inst);
        self.eco_record(block, crate::eco::EcoEntry::DestroyInst { inst_name });
        true
    }

    /// Rebinds `inst` to `new_master`, keeping every existing iterm's net connection intact by
    /// remapping it onto the mterm of the same index on `new_master` (spec §4.7 observed mutation
    /// "swap-master"). Requires `new_master` to expose exactly as many mterms as `inst` has
    /// iterms; a footprint mismatch is refused rather than silently dropping or stranding iterms.
    pub fn swap_master(&mut self, inst: Oid, new_master: Oid) -> bool {
        let Some(i) = self.insts.get(inst) else { return false };
        let block = i.block;
        let iterms = i.iterms.clone();
        let Some(new_mterm_head) = self.masters.get(new_master).map(|m| m.mterm_head) else { return false };
        let mut new_mterms: Vec<Oid> =
            Chain::new(&self.mterms, new_mterm_head, |m| (m.prev, m.next)).iter().collect();
        new_mterms.sort_by_key(|&id| self.mterms.get(id).expect("live").index);
        if new_mterms.len() != iterms.len() {
            log::warn!("odb: swap_master footprint mismatch ({} vs {} mterms)", new_mterms.len(), iterms.len());
            return false;
        }
        for (&iterm, &mterm) in iterms.iter().zip(new_mterms.iter()) {
            let index = self.mterms.get(mterm).expect("checked").index;
            let rec = self.iterms.get_mut(iterm).expect("checked");
            rec.mterm = mterm;
            rec.mterm_index = index;
        }
        self.insts.get_mut(inst).expect("checked").master = new_master;

        let inst_name = self.insts.get(inst).expect("checked").name.clone();
        let new_master_name = self.masters.get(new_master).expect("checked").name.clone();
        self.eco_record(block, crate::eco::EcoEntry::SwapMaster { inst_name, new_master_name });
        true
    }

    /// Sets `inst`'s placement (spec §4.7 observed mutation "move-inst"). Refuses to move an
    /// instance whose status is LOCKED/FIRM/COVER (spec §3.1: placers must not silently overwrite
    /// those); the caller must lower the status explicitly first.
    pub fn move_inst(&mut self, inst: Oid, origin: crate::geom::Point, orient: crate::model::enums::Orientation) -> bool {
        let Some(i) = self.insts.get(inst) else { return false };
        if i.status.is_fixed() {
            log::warn!("odb: move_inst refused, placement status {:?} is fixed", i.status);
            return false;
        }
        let block = i.block;
        let rec = self.insts.get_mut(inst).expect("checked");
        rec.origin = origin;
        rec.orient = orient;
        let inst_name = rec.name.clone();
        self.eco_record(
            block,
            crate::eco::EcoEntry::MoveInst { inst_name, x: origin.x, y: origin.y, orient },
        );
        true
    }

    /// Connects `iterm` to `net` (both must exist and belong to the same block's netlist). The
    /// invariant `it.net == net ⇔ it is in net's iterm chain` (spec §8) is maintained by always
    /// going through this function and [`disconnect_iterm`].
    pub fn connect_iterm(&mut self, iterm: Oid, net: Oid) -> bool {
        if self.iterms.get(iterm).is_none() || self.nets.get(net).is_none() {
            return false;
        }
        self.disconnect_iterm(iterm);
        let n = self.nets.get_mut(net).expect("checked");
        chain_push_front(&mut self.iterms, &mut n.iterm_head, iterm);
        self.iterms.get_mut(iterm).expect("checked").net = Some(net);
        if let Some((block, inst_name, mterm_name)) = self.iterm_names(iterm) {
            let net_name = self.nets.get(net).expect("checked").name.clone();
            self.eco_record(block, crate::eco::EcoEntry::ConnectITerm { inst_name, mterm_name, net_name });
        }
        true
    }

    pub fn disconnect_iterm(&mut self, iterm: Oid) -> bool {
        let Some(net) = self.iterms.get(iterm).and_then(|i| i.net) else { return false };
        let mut head = self.nets.get(net).expect("referenced net must exist").iterm_head;
        chain_unlink(&mut self.iterms, &mut head, iterm);
        self.nets.get_mut(net).expect("checked").iterm_head = head;
        self.iterms.get_mut(iterm).expect("checked").net = None;
        if let Some((block, inst_name, mterm_name)) = self.iterm_names(iterm) {
            self.eco_record(block, crate::eco::EcoEntry::DisconnectITerm { inst_name, mterm_name });
        }
        true
    }

    /// Resolves an iterm back to its owning block plus the `(inst, mterm)` names the ECO journal
    /// records instead of raw ids, so a replayed entry can re-resolve against a different database.
    fn iterm_names(&self, iterm: Oid) -> Option<(Oid, String, String)> {
        let it = self.iterms.get(iterm)?;
        let inst = self.insts.get(it.inst)?;
        let mterm = self.mterms.get(it.mterm)?;
        Some((inst.block, inst.name.clone(), mterm.name.clone()))
    }

    pub fn iterms_of_net(&self, net: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.nets.get(net).map(|n| n.iterm_head).unwrap_or(Oid::NULL);
        Chain::new(&self.iterms, head, |i: &ITerm| (i.net_prev, i.net_next)).iter()
    }

    // -- Net ----------------------------------------------------------------------------------

    pub fn create_net(&mut self, block: Oid, name: &str) -> Option<Oid> {
        if self.blocks.get(block).is_none() || self.find_net(block, name).is_some() {
            return None;
        }
        let id = self.nets.alloc(|_| Net::new(block, name));
        let b = self.blocks.get_mut(block).expect("checked");
        chain_push_front(&mut self.nets, &mut b.net_head, id);
        self.eco_record(block, crate::eco::EcoEntry::CreateNet { net_name: name.to_string() });
        Some(id)
    }

    pub fn find_net(&self, block: Oid, name: &str) -> Option<Oid> {
        let head = self.blocks.get(block)?.net_head;
        Chain::new(&self.nets, head, |n: &Net| (n.prev, n.next))
            .iter()
            .find(|&id| self.nets.get(id).is_some_and(|n| n.name == name))
    }

    pub fn nets_of(&self, block: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.blocks.get(block).map(|b| b.net_head).unwrap_or(Oid::NULL);
        Chain::new(&self.nets, head, |n: &Net| (n.prev, n.next)).iter()
    }

    pub fn rename_net(&mut self, net: Oid, new_name: &str) -> bool {
        let Some(n) = self.nets.get(net) else { return false };
        let block = n.block;
        if self.find_net(block, new_name).is_some() {
            return false;
        }
        let old_name = self.nets.get(net).expect("checked").name.clone();
        self.nets.get_mut(net).expect("checked").name = new_name.to_string();
        self.eco_record(block, crate::eco::EcoEntry::RenameNet { old_name, new_name: new_name.to_string() });
        true
    }

    /// Sets a named user flag on `net` (spec §4.7 observed mutation "set net-flag"). The exact
    /// set of flag names is unspecified (spec §9 open question), so flags are a plain string-keyed
    /// side table rather than fixed bit fields; unset flags read as `false`.
    pub fn set_net_flag(&mut self, net: Oid, flag: &str, value: bool) -> bool {
        let Some(n) = self.nets.get(net) else { return false };
        let block = n.block;
        let net_name = n.name.clone();
        self.net_flags.insert((net, flag.to_string()), value);
        self.eco_record(block, crate::eco::EcoEntry::SetNetFlag { net_name, flag: flag.to_string(), value });
        true
    }

    pub fn net_flag(&self, net: Oid, flag: &str) -> bool {
        self.net_flags.get(&(net, flag.to_string())).copied().unwrap_or(false)
    }

    /// Destroys a net: disconnects every iterm/bterm, destroys its swires and RC sub-network
    /// (including any `CCSeg`s, unlinked from the peer net -- spec §3 "Ownership summary"), then
    /// frees the net itself.
    pub fn destroy_net(&mut self, net: Oid) -> bool {
        let Some(n) = self.nets.get(net) else { return false };
        let block = n.block;

        let iterms: Vec<Oid> = self.iterms_of_net(net).collect();
        for it in iterms {
            self.disconnect_iterm(it);
        }
        let bterms: Vec<Oid> = self.bterms_of_net(net).collect();
        for bt in bterms {
            self.destroy_bterm(bt);
        }
        self.destroy_all_rc(net);
        self.net_flags.retain(|(n, _), _| *n != net);

        self.properties.destroy_all_owned_by(ObjectType::Net, net);
        let mut head = self.blocks.get(block).expect("checked").net_head;
        chain_unlink(&mut self.nets, &mut head, net);
        self.blocks.get_mut(block).expect("checked").net_head = head;
        let name = self.nets.get(net).expect("checked").name.clone();
        self.nets.free(net);
        self.eco_record(block, crate::eco::EcoEntry::DestroyNet { net_name: name });
        true
    }

    // -- BTerm / BPin ---------------------------------------------------------------------------

    pub fn create_bterm(&mut self, net: Oid, name: &str, io_type: IoType, signal_type: SignalType) -> Option<Oid> {
        let block = self.nets.get(net)?.block;
        if self.find_bterm(block, name).is_some() {
            return None;
        }
        let id = self.bterms.alloc(|_| {
            let mut t = BTerm::new(block, net, name, io_type);
            t.signal_type = signal_type;
            t
        });
        let n = self.nets.get_mut(net).expect("checked");
        chain_push_front(&mut self.bterms, &mut n.bterm_head, id);

        let old_blk_head = self.blocks.get(block).expect("checked").bterm_head;
        let rec = self.bterms.get_mut(id).expect("just allocated");
        rec.blk_prev = Oid::NULL;
        rec.blk_next = old_blk_head;
        if !old_blk_head.is_null() {
            self.bterms.get_mut(old_blk_head).expect("live").blk_prev = id;
        }
        self.blocks.get_mut(block).expect("checked").bterm_head = id;
        let net_name = self.nets.get(net).expect("checked").name.clone();
        self.eco_record(
            block,
            crate::eco::EcoEntry::CreateBTerm { bterm_name: name.to_string(), net_name, io_type, signal_type },
        );
        Some(id)
    }

    pub fn find_bterm(&self, block: Oid, name: &str) -> Option<Oid> {
        let head = self.blocks.get(block)?.bterm_head;
        bterm_block_chain(&self.bterms, head).find(|&id| self.bterms.get(id).is_some_and(|b| b.name == name))
    }

    pub fn bterms_of_net(&self, net: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.nets.get(net).map(|n| n.bterm_head).unwrap_or(Oid::NULL);
        Chain::new(&self.bterms, head, bterm_net_links).iter()
    }

    pub fn bterms_of_block(&self, block: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.blocks.get(block).map(|b| b.bterm_head).unwrap_or(Oid::NULL);
        bterm_block_chain(&self.bterms, head)
    }

    pub fn destroy_bterm(&mut self, bterm: Oid) -> bool {
        let Some(b) = self.bterms.get(bterm) else { return false };
        let (net, block) = (b.net, b.block);
        let bpins: Vec<Oid> = {
            let head = self.bterms.get(bterm).expect("checked").bpin_head;
            Chain::new(&self.bpins, head, |p: &BPin| (p.prev, p.next)).iter().collect()
        };
        for p in bpins {
            self.bpins.free(p);
        }
        let mut net_head = self.nets.get(net).expect("net must exist").bterm_head;
        chain_unlink(&mut self.bterms, &mut net_head, bterm);
        self.nets.get_mut(net).expect("checked").bterm_head = net_head;

        // the block chain is threaded through the same record's other prev/next pair, so unlink
        // it manually rather than through the generic `ChainLinks`-based helper
        let (prev, next) = { let r = self.bterms.get(bterm).expect("checked"); (r.blk_prev, r.blk_next) };
        if !prev.is_null() {
            self.bterms.get_mut(prev).expect("live").blk_next = next;
        } else {
            self.blocks.get_mut(block).expect("checked").bterm_head = next;
        }
        if !next.is_null() {
            self.bterms.get_mut(next).expect("live").blk_prev = prev;
        }

        self.properties.destroy_all_owned_by(ObjectType::BTerm, bterm);
        let bterm_name = self.bterms.get(bterm).expect("checked").name.clone();
        self.bterms.free(bterm);
        self.eco_record(block, crate::eco::EcoEntry::DestroyBTerm { bterm_name });
        true
    }

    pub fn create_bpin(&mut self, bterm: Oid) -> Option<Oid> {
        self.bterms.get(bterm)?;
        let id = self.bpins.alloc(|_| BPin::new(bterm));
        let head = &mut self.bterms.get_mut(bterm).expect("checked").bpin_head;
        chain_push_front(&mut self.bpins, head, id);
        Some(id)
    }

    pub(crate) fn eco_record(&mut self, block: Oid, entry: crate::eco::EcoEntry) {
        if let Some(journal) = self.eco.get_mut(&block) {
            journal.record(entry);
        }
    }
}

fn bterm_block_chain(table: &crate::page::Table<BTerm>, head: Oid) -> impl Iterator<Item = Oid> + '_ {
    BlockChainIter { table, current: head }
}

struct BlockChainIter<'a> {
    table: &'a crate::page::Table<BTerm>,
    current: Oid,
}

impl<'a> Iterator for BlockChainIter<'a> {
    type Item = Oid;
    fn next(&mut self) -> Option<Oid> {
        if self.current.is_null() {
            return None;
        }
        let id = self.current;
        self.current = self.table.get(id).expect("chain id must be live").blk_next;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::{IoType, SignalType};

    fn setup_scenario_1() -> (Database, Oid, Oid, Oid) {
        let mut db = Database::create("scenario1");
        db.create_tech(1000);
        db.create_layer("M1", 1);
        db.create_layer("M2", 2);
        let lib = db.create_lib("L", 1000).unwrap();
        let master = db.create_master(lib, "INV_X1").unwrap();
        db.create_mterm(master, "A", IoType::Input, SignalType::Signal).unwrap();
        db.create_mterm(master, "Y", IoType::Output, SignalType::Signal).unwrap();
        db.freeze_master(master);
        let (_chip, top) = db.create_chip("top", 1000).unwrap();
        let u0 = db.create_inst(top, master, "u0").unwrap();
        let u1 = db.create_inst(top, master, "u1").unwrap();
        (db, top, u0, u1)
    }

    #[test]
    fn scenario_1_connect_net_through_two_iterms() {
        let (mut db, top, u0, u1) = setup_scenario_1();
        let net = db.create_net(top, "n1").unwrap();
        let y0 = db.iterm_by_name(u0, "Y").unwrap();
        let a1 = db.iterm_by_name(u1, "A").unwrap();
        db.connect_iterm(y0, net);
        db.connect_iterm(a1, net);

        let n1 = db.find_net(top, "n1").unwrap();
        assert_eq!(n1, net);
        let iterms: Vec<Oid> = db.iterms_of_net(net).collect();
        assert_eq!(iterms.len(), 2);
        for it in iterms {
            assert_eq!(db.iterms.get(it).unwrap().net, Some(net));
        }
        db.destroy();
    }

    #[test]
    fn disconnect_removes_from_net_chain_and_clears_net_field() {
        let (mut db, top, u0, u1) = setup_scenario_1();
        let net = db.create_net(top, "n1").unwrap();
        let y0 = db.iterm_by_name(u0, "Y").unwrap();
        let a1 = db.iterm_by_name(u1, "A").unwrap();
        db.connect_iterm(y0, net);
        db.connect_iterm(a1, net);
        db.disconnect_iterm(a1);
        assert_eq!(db.iterms.get(a1).unwrap().net, None);
        assert_eq!(db.iterms_of_net(net).count(), 1);
        db.destroy();
    }

    #[test]
    fn destroy_inst_disconnects_its_iterms() {
        let (mut db, top, u0, u1) = setup_scenario_1();
        let net = db.create_net(top, "n1").unwrap();
        let y0 = db.iterm_by_name(u0, "Y").unwrap();
        db.connect_iterm(y0, net);
        db.destroy_inst(u0);
        assert_eq!(db.iterms_of_net(net).count(), 0);
        assert!(db.find_inst(top, "u0").is_none());
        let _ = u1;
        db.destroy();
    }
}
