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

//! Per-net RC sub-network (C8): `createCapNode`/`createRSeg`/`createCCSeg`, iteration,
//! destroy-all, and the two maintenance passes spec §4.6 names -- `reverseRSegs` and the
//! capnode-collapsing renumber pass -- plus ECO-donation of an `RSeg`'s endpoints between nets.
//!
//! `CCSeg` is chained on both endpoint nets at once (`net_a`/`net_b`, `a_next`/`a_prev` vs
//! `b_next`/`b_prev`) and so cannot implement `ChainLinks` generically; this module threads both
//! sides by hand the same way `db::netlist` threads `BTerm`'s block-chain membership alongside its
//! `ChainLinks`-based net-chain membership.

use crate::db::Database;
use crate::iter::{chain_push_front, chain_reverse, chain_unlink, Chain};
use crate::oid::Oid;
use crate::rc::{CCSeg, CapNode, CapNodeKind, RSeg};

impl Database {
    // -- CapNode ------------------------------------------------------------------------------

    pub fn create_capnode(&mut self, net: Oid, kind: CapNodeKind) -> Option<Oid> {
        let corner_count = self.blocks.get(self.nets.get(net)?.block)?.corner_count;
        let id = self.capnodes.alloc(|_| CapNode::new(net, kind, corner_count));
        let head = &mut self.nets.get_mut(net)?.capnode_head;
        chain_push_front(&mut self.capnodes, head, id);
        Some(id)
    }

    pub fn destroy_capnode(&mut self, capnode: Oid) -> bool {
        let Some(c) = self.capnodes.get(capnode) else { return false };
        let net = c.net;
        let Some(n) = self.nets.get(net) else { return false };
        let mut head = n.capnode_head;
        chain_unlink(&mut self.capnodes, &mut head, capnode);
        self.nets.get_mut(net).expect("checked").capnode_head = head;
        self.capnodes.free(capnode);
        true
    }

    pub fn capnodes_of(&self, net: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.nets.get(net).map(|n| n.capnode_head).unwrap_or(Oid::NULL);
        Chain::new(&self.capnodes, head, |c: &CapNode| (c.prev, c.next)).iter()
    }

    // -- RSeg -----------------------------------------------------------------------------------

    /// Creates an `RSeg` between `source` and `target`, both of which must belong to `net` (spec
    /// §4.6 invariant `r.source.net == r.target.net == r.net`). `allocate_cap` controls whether
    /// the per-corner resistance vector is sized up front (when the block's corner count is
    /// already known) or left empty for a caller that will grow it later.
    pub fn create_rseg(
        &mut self,
        net: Oid,
        source: Oid,
        target: Oid,
        from_x: i32,
        from_y: i32,
        path_dir: u8,
        allocate_cap: bool,
    ) -> Option<Oid> {
        let block = self.nets.get(net)?.block;
        if self.capnodes.get(source)?.net != net || self.capnodes.get(target)?.net != net {
            return None;
        }
        let corner_count = if allocate_cap { self.blocks.get(block)?.corner_count } else { 0 };
        let id = self.rsegs.alloc(|_| RSeg::new(net, source, target, from_x, from_y, path_dir, corner_count));
        let head = &mut self.nets.get_mut(net)?.rseg_head;
        chain_push_front(&mut self.rsegs, head, id);
        Some(id)
    }

    pub fn destroy_rseg(&mut self, rseg: Oid) -> bool {
        let Some(r) = self.rsegs.get(rseg) else { return false };
        let net = r.net;
        let Some(n) = self.nets.get(net) else { return false };
        let mut head = n.rseg_head;
        chain_unlink(&mut self.rsegs, &mut head, rseg);
        self.nets.get_mut(net).expect("checked").rseg_head = head;
        self.rsegs.free(rseg);
        true
    }

    pub fn rsegs_of(&self, net: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.nets.get(net).map(|n| n.rseg_head).unwrap_or(Oid::NULL);
        Chain::new(&self.rsegs, head, |r: &RSeg| (r.prev, r.next)).iter()
    }

    /// Flips the net's rseg traversal order in place (spec §8 scenario 5): swaps every record's
    /// prev/next roles and the chain head, preserving each `RSeg`'s own per-corner values.
    pub fn reverse_rsegs(&mut self, net: Oid) -> bool {
        let Some(n) = self.nets.get(net) else { return false };
        let mut head = n.rseg_head;
        chain_reverse(&mut self.rsegs, &mut head);
        self.nets.get_mut(net).expect("checked").rseg_head = head;
        true
    }

    /// Idempotent renumber pass (spec §4.6, §8 scenario: `collapseInternalCapNum` applied twice
    /// yields the same network as applied once): repeatedly finds an `Internal` cap-node with
    /// exactly one incoming and one outgoing `RSeg`, merges the two edges' per-corner resistances
    /// into the incoming edge (retargeted past the collapsed node), and frees the node and the
    /// now-redundant outgoing edge. Stops when no further merge is possible.
    pub fn collapse_internal_cap_num(&mut self, net: Oid) -> bool {
        if self.nets.get(net).is_none() {
            return false;
        }
        loop {
            let internal_nodes: Vec<Oid> = self
                .capnodes_of(net)
                .filter(|&id| matches!(self.capnodes.get(id).expect("chain id live").kind, CapNodeKind::Internal))
                .collect();

            let mut merged = false;
            for node in internal_nodes {
                let rsegs: Vec<Oid> = self.rsegs_of(net).collect();
                let incoming = rsegs.iter().copied().find(|&r| self.rsegs.get(r).expect("chain id live").target == node);
                let outgoing = rsegs.iter().copied().find(|&r| self.rsegs.get(r).expect("chain id live").source == node);
                let (Some(incoming), Some(outgoing)) = (incoming, outgoing) else { continue };
                if incoming == outgoing {
                    continue;
                }
                let out_target = self.rsegs.get(outgoing).expect("checked").target;
                let out_resistance = self.rsegs.get(outgoing).expect("checked").resistance.clone();
                {
                    let r = self.rsegs.get_mut(incoming).expect("checked");
                    r.target = out_target;
                    for (slot, add) in r.resistance.iter_mut().zip(out_resistance.iter()) {
                        *slot += *add;
                    }
                }
                self.destroy_rseg(outgoing);
                self.destroy_capnode(node);
                merged = true;
                break;
            }
            if !merged {
                return true;
            }
        }
    }

    // -- CCSeg ----------------------------------------------------------------------------------

    /// Creates a coupling-capacitance edge between `cap_a` and `cap_b`, which must belong to two
    /// different nets; chains the new `CCSeg` onto both endpoint nets' cc chains (spec §4.6: "kept
    /// in two symmetric ordered lists, one per endpoint net").
    pub fn create_ccseg(&mut self, cap_a: Oid, cap_b: Oid) -> Option<Oid> {
        let net_a = self.capnodes.get(cap_a)?.net;
        let net_b = self.capnodes.get(cap_b)?.net;
        if net_a == net_b {
            return None;
        }
        let corner_count = self.blocks.get(self.nets.get(net_a)?.block)?.corner_count;
        let id = self.ccsegs.alloc(|_| CCSeg::new(net_a, cap_a, net_b, cap_b, corner_count));

        let a_head = self.nets.get(net_a).expect("checked").ccseg_head;
        self.ccsegs.get_mut(id).expect("just allocated").a_next = a_head;
        if !a_head.is_null() {
            self.ccsegs.get_mut(a_head).expect("live").a_prev = id;
        }
        self.nets.get_mut(net_a).expect("checked").ccseg_head = id;

        let b_head = self.nets.get(net_b).expect("checked").ccseg_head;
        self.ccsegs.get_mut(id).expect("just allocated").b_next = b_head;
        if !b_head.is_null() {
            self.ccsegs.get_mut(b_head).expect("live").b_prev = id;
        }
        self.nets.get_mut(net_b).expect("checked").ccseg_head = id;

        Some(id)
    }

    pub fn destroy_ccseg(&mut self, ccseg: Oid) -> bool {
        let Some(c) = self.ccsegs.get(ccseg) else { return false };
        let (net_a, net_b) = (c.net_a, c.net_b);
        self.unlink_ccseg_side(net_a, ccseg);
        self.unlink_ccseg_side(net_b, ccseg);
        self.ccsegs.free(ccseg);
        true
    }

    /// Unlinks `ccseg` from `owner`'s side of its two chain memberships, leaving the other side
    /// (if any) untouched. `owner` must be one of the segment's two endpoint nets.
    fn unlink_ccseg_side(&mut self, owner: Oid, ccseg: Oid) {
        let Some(c) = self.ccsegs.get(ccseg) else { return };
        let is_a = c.net_a == owner;
        let (prev, next) = if is_a { (c.a_prev, c.a_next) } else { (c.b_prev, c.b_next) };

        if !prev.is_null() {
            let p = self.ccsegs.get_mut(prev).expect("live");
            if is_a { p.a_next = next } else { p.b_next = next }
        } else if let Some(n) = self.nets.get_mut(owner) {
            n.ccseg_head = next;
        }
        if !next.is_null() {
            let nrec = self.ccsegs.get_mut(next).expect("live");
            if is_a { nrec.a_prev = prev } else { nrec.b_prev = prev }
        }
    }

    pub fn ccsegs_of(&self, net: Oid) -> impl Iterator<Item = Oid> + '_ {
        let head = self.nets.get(net).map(|n| n.ccseg_head).unwrap_or(Oid::NULL);
        CCSegChainIter { table: &self.ccsegs, net, current: head }
    }

    // -- destroy-all & ECO-donation --------------------------------------------------------------

    /// Destroys every `CapNode`, `RSeg`, and `CCSeg` owned by `net` (spec §3 "Ownership summary":
    /// net destruction destroys its whole RC sub-network; `CCSeg`s are additionally unlinked from
    /// the peer net rather than leaking a dangling reference there).
    pub fn destroy_all_rc(&mut self, net: Oid) -> bool {
        if self.nets.get(net).is_none() {
            return false;
        }
        let ccsegs: Vec<Oid> = self.ccsegs_of(net).collect();
        for c in ccsegs {
            self.destroy_ccseg(c);
        }
        let rsegs: Vec<Oid> = self.rsegs_of(net).collect();
        for r in rsegs {
            self.destroy_rseg(r);
        }
        let capnodes: Vec<Oid> = self.capnodes_of(net).collect();
        for c in capnodes {
            self.destroy_capnode(c);
        }
        true
    }

    /// Moves `rseg` and its two `CapNode` endpoints from their current net to `to_net` (spec
    /// §4.6 "ECO-donation"), rewriting any `CCSeg` that anchored on a moved cap-node to point at
    /// `to_net` on that side -- the `CCSeg`'s own table slot and per-corner values are untouched,
    /// only the chain membership and net reference move.
    pub fn donate_rseg(&mut self, rseg: Oid, to_net: Oid) -> bool {
        let Some(r) = self.rsegs.get(rseg) else { return false };
        let from_net = r.net;
        let (source, target) = (r.source, r.target);
        if from_net == to_net || self.nets.get(to_net).is_none() {
            return from_net == to_net;
        }

        let mut from_head = self.nets.get(from_net).expect("checked").rseg_head;
        chain_unlink(&mut self.rsegs, &mut from_head, rseg);
        self.nets.get_mut(from_net).expect("checked").rseg_head = from_head;
        let mut to_head = self.nets.get(to_net).expect("checked").rseg_head;
        chain_push_front(&mut self.rsegs, &mut to_head, rseg);
        self.nets.get_mut(to_net).expect("checked").rseg_head = to_head;
        self.rsegs.get_mut(rseg).expect("just moved").net = to_net;

        self.move_capnode(source, from_net, to_net);
        self.move_capnode(target, from_net, to_net);
        true
    }

    /// Moves a single `CapNode` from `from_net` to `to_net`'s chain, rewriting any `CCSeg`
    /// anchored on it in place (spec §4.6: "pointers into CCSegs are rewritten, not reallocated").
    fn move_capnode(&mut self, capnode: Oid, from_net: Oid, to_net: Oid) {
        let Some(c) = self.capnodes.get(capnode) else { return };
        if c.net != from_net {
            return;
        }
        let mut from_head = self.nets.get(from_net).expect("checked").capnode_head;
        chain_unlink(&mut self.capnodes, &mut from_head, capnode);
        self.nets.get_mut(from_net).expect("checked").capnode_head = from_head;
        let mut to_head = self.nets.get(to_net).expect("checked").capnode_head;
        chain_push_front(&mut self.capnodes, &mut to_head, capnode);
        self.nets.get_mut(to_net).expect("checked").capnode_head = to_head;
        self.capnodes.get_mut(capnode).expect("just moved").net = to_net;

        let ccsegs: Vec<Oid> = self.ccsegs_of(from_net).filter(|&id| {
            let c = self.ccsegs.get(id).expect("chain id live");
            c.cap_a == capnode || c.cap_b == capnode
        }).collect();
        for seg in ccsegs {
            self.unlink_ccseg_side(from_net, seg);
            let is_a = self.ccsegs.get(seg).expect("checked").cap_a == capnode;
            if is_a {
                self.ccsegs.get_mut(seg).expect("checked").net_a = to_net;
            } else {
                self.ccsegs.get_mut(seg).expect("checked").net_b = to_net;
            }
            let mut to_head = self.nets.get(to_net).expect("checked").ccseg_head;
            if is_a {
                self.ccsegs.get_mut(seg).expect("checked").a_next = to_head;
                self.ccsegs.get_mut(seg).expect("checked").a_prev = Oid::NULL;
            } else {
                self.ccsegs.get_mut(seg).expect("checked").b_next = to_head;
                self.ccsegs.get_mut(seg).expect("checked").b_prev = Oid::NULL;
            }
            if !to_head.is_null() {
                let h = self.ccsegs.get_mut(to_head).expect("live");
                if is_a { h.a_prev = seg } else { h.b_prev = seg }
            }
            to_head = seg;
            self.nets.get_mut(to_net).expect("checked").ccseg_head = to_head;
        }
    }
}

struct CCSegChainIter<'a> {
    table: &'a crate::page::Table<CCSeg>,
    net: Oid,
    current: Oid,
}

impl<'a> Iterator for CCSegChainIter<'a> {
    type Item = Oid;
    fn next(&mut self) -> Option<Oid> {
        if self.current.is_null() {
            return None;
        }
        let id = self.current;
        let seg = self.table.get(id).expect("chain id must be live");
        self.current = if seg.net_a == self.net { seg.a_next } else { seg.b_next };
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_block() -> (Database, Oid) {
        let mut db = Database::create("rctest");
        let _tech = db.create_tech(1000).expect("tech");
        let lib = db.create_lib("lib", 1000).expect("lib");
        let _master = db.create_master(lib, "INV").expect("master");
        let (_chip, block) = db.create_chip("top", 1000).expect("chip");
        db.set_corner_count(block, 2);
        (db, block)
    }

    #[test]
    fn rseg_chain_reverses_preserving_values() {
        let (mut db, block) = demo_block();
        let net = db.create_net(block, "n1").expect("net");
        let a = db.create_capnode(net, CapNodeKind::Internal).unwrap();
        let b = db.create_capnode(net, CapNodeKind::Internal).unwrap();
        let c = db.create_capnode(net, CapNodeKind::Internal).unwrap();
        let r1 = db.create_rseg(net, a, b, 0, 0, 0, true).unwrap();
        let r2 = db.create_rseg(net, b, c, 0, 0, 0, true).unwrap();
        db.rsegs.get_mut(r1).unwrap().set_resistance(0, 1.0);
        db.rsegs.get_mut(r2).unwrap().set_resistance(0, 2.0);

        let before: Vec<Oid> = db.rsegs_of(net).collect();
        db.reverse_rsegs(net);
        let after: Vec<Oid> = db.rsegs_of(net).collect();
        assert_eq!(after, before.into_iter().rev().collect::<Vec<_>>());
        assert_eq!(db.rsegs.get(r1).unwrap().resistance[0], 1.0);
        assert_eq!(db.rsegs.get(r2).unwrap().resistance[0], 2.0);
    }

    #[test]
    fn collapse_is_idempotent_and_preserves_end_to_end_resistance() {
        let (mut db, block) = demo_block();
        let net = db.create_net(block, "n1").expect("net");
        let a = db.create_capnode(net, CapNodeKind::BTerm(Oid::NULL)).unwrap();
        let mid = db.create_capnode(net, CapNodeKind::Internal).unwrap();
        let z = db.create_capnode(net, CapNodeKind::BTerm(Oid::NULL)).unwrap();
        let r1 = db.create_rseg(net, a, mid, 0, 0, 0, true).unwrap();
        let r2 = db.create_rseg(net, mid, z, 10, 0, 0, true).unwrap();
        db.rsegs.get_mut(r1).unwrap().set_resistance(0, 1.5);
        db.rsegs.get_mut(r2).unwrap().set_resistance(0, 2.5);

        db.collapse_internal_cap_num(net);
        let remaining: Vec<Oid> = db.rsegs_of(net).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(db.rsegs.get(remaining[0]).unwrap().resistance[0], 4.0);
        assert!(db.capnodes.get(mid).is_none());

        let once: Vec<f64> = db.rsegs_of(net).map(|r| db.rsegs.get(r).unwrap().resistance[0]).collect();
        db.collapse_internal_cap_num(net);
        let twice: Vec<f64> = db.rsegs_of(net).map(|r| db.rsegs.get(r).unwrap().resistance[0]).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn destroying_net_a_drops_ccseg_from_nets_b_chain_and_frees_it() {
        let (mut db, block) = demo_block();
        let net_a = db.create_net(block, "a").expect("net a");
        let net_b = db.create_net(block, "b").expect("net b");
        let cap_a = db.create_capnode(net_a, CapNodeKind::Internal).unwrap();
        let cap_b = db.create_capnode(net_b, CapNodeKind::Internal).unwrap();
        let seg = db.create_ccseg(cap_a, cap_b).unwrap();
        assert_eq!(db.ccsegs_of(net_b).collect::<Vec<_>>(), vec![seg]);

        db.destroy_net(net_a);
        assert!(db.ccsegs_of(net_b).next().is_none());
        assert!(db.ccsegs.get(seg).is_none());
    }

    #[test]
    fn donate_rseg_moves_endpoints_and_rewrites_ccseg() {
        let (mut db, block) = demo_block();
        let net_src = db.create_net(block, "src").expect("net src");
        let net_dst = db.create_net(block, "dst").expect("net dst");
        let peer_net = db.create_net(block, "peer").expect("net peer");

        let a = db.create_capnode(net_src, CapNodeKind::Internal).unwrap();
        let b = db.create_capnode(net_src, CapNodeKind::Internal).unwrap();
        let rseg = db.create_rseg(net_src, a, b, 0, 0, 0, true).unwrap();
        let peer_cap = db.create_capnode(peer_net, CapNodeKind::Internal).unwrap();
        let ccseg = db.create_ccseg(a, peer_cap).unwrap();

        assert!(db.donate_rseg(rseg, net_dst));
        assert_eq!(db.rsegs.get(rseg).unwrap().net, net_dst);
        assert_eq!(db.capnodes.get(a).unwrap().net, net_dst);
        assert_eq!(db.capnodes.get(b).unwrap().net, net_dst);
        assert_eq!(db.ccsegs.get(ccseg).unwrap().net_a, net_dst);
        assert_eq!(db.ccsegs_of(net_dst).collect::<Vec<_>>(), vec![ccseg]);
        assert!(db.ccsegs_of(net_src).next().is_none());
    }
}
