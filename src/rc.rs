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

//! RC graph (C8): per-net parasitic sub-network of `CapNode`s, `RSeg`s, and `CCSeg`s. See spec
//! §4.6. Per-corner vectors are plain `Vec<f64>` sized to the owning `Block`'s `corner_count`
//! (spec §3, "constant for the block's lifetime after first allocation") rather than the
//! inline-bounded-at-256 array spec.md allows -- `DESIGN.md` records this as a scope choice; the
//! invariants tested in spec §8 don't depend on the representation.

use crate::iter::ChainLinks;
use crate::oid::Oid;

/// Classification bits for a [`CapNode`] (spec §3, "Key entities").
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CapNodeKind {
    ITerm(Oid),
    BTerm(Oid),
    Internal,
    Branch,
    Dangling,
    Foreign,
}

pub struct CapNode {
    pub net: Oid,
    pub kind: CapNodeKind,
    /// anchors a geometric shape id on the net's wire, if any
    pub shape_id: Option<u32>,
    pub capacitance: Vec<f64>,
    pub next: Oid,
    pub prev: Oid,
}

impl CapNode {
    pub fn new(net: Oid, kind: CapNodeKind, corner_count: u32) -> Self {
        CapNode {
            net,
            kind,
            shape_id: None,
            capacitance: vec![0.0; corner_count as usize],
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }

    pub fn adjust_cap(&mut self, corner: usize, delta: f64) { self.capacitance[corner] += delta; }
    pub fn set_cap(&mut self, corner: usize, value: f64) { self.capacitance[corner] = value; }
}

impl ChainLinks for CapNode {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// A directed edge between two [`CapNode`]s of the same net (spec §3, §4.6 invariant
/// `r.source.net == r.target.net == r.net`).
pub struct RSeg {
    pub net: Oid,
    pub source: Oid,
    pub target: Oid,
    pub from_x: i32,
    pub from_y: i32,
    pub path_dir: u8,
    pub resistance: Vec<f64>,
    /// optional geometric anchor into the net's wire opcode stream (a junction index)
    pub shape_id: Option<u32>,
    pub next: Oid,
    pub prev: Oid,
}

impl RSeg {
    pub fn new(net: Oid, source: Oid, target: Oid, from_x: i32, from_y: i32, path_dir: u8, corner_count: u32) -> Self {
        RSeg {
            net,
            source,
            target,
            from_x,
            from_y,
            path_dir,
            resistance: vec![0.0; corner_count as usize],
            shape_id: None,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }

    pub fn set_resistance(&mut self, corner: usize, value: f64) { self.resistance[corner] = value; }
}

impl ChainLinks for RSeg {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// A coupling-capacitance edge between `CapNode`s of two (generally different) nets. Kept in two
/// symmetric chains, one per endpoint net (spec §4.6); `net_a`/`net_b` and the matching
/// `a_next`/`a_prev` vs `b_next`/`b_prev` fields let one record belong to both chains at once,
/// which is why `CCSeg` cannot implement `ChainLinks` generically -- `crate::db` threads each side
/// through its own pair of accessor functions instead (the same pattern `model::term::BTerm`
/// uses for its two independent chain memberships).
pub struct CCSeg {
    pub net_a: Oid,
    pub cap_a: Oid,
    pub net_b: Oid,
    pub cap_b: Oid,
    pub capacitance: Vec<f64>,
    pub a_next: Oid,
    pub a_prev: Oid,
    pub b_next: Oid,
    pub b_prev: Oid,
}

impl CCSeg {
    pub fn new(net_a: Oid, cap_a: Oid, net_b: Oid, cap_b: Oid, corner_count: u32) -> Self {
        CCSeg {
            net_a,
            cap_a,
            net_b,
            cap_b,
            capacitance: vec![0.0; corner_count as usize],
            a_next: Oid::NULL,
            a_prev: Oid::NULL,
            b_next: Oid::NULL,
            b_prev: Oid::NULL,
        }
    }

    /// The endpoint net this segment is chained under from `owner`'s point of view, or `None` if
    /// `owner` is neither endpoint.
    pub fn side_of(&self, owner: Oid) -> Option<Side> {
        if owner == self.net_a {
            Some(Side::A)
        } else if owner == self.net_b {
            Some(Side::B)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Side {
    A,
    B,
}

pub fn ccseg_a_links(c: &CCSeg) -> (Oid, Oid) { (c.a_prev, c.a_next) }
pub fn ccseg_b_links(c: &CCSeg) -> (Oid, Oid) { (c.b_prev, c.b_next) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capnode_per_corner_values_are_independent() {
        let mut n = CapNode::new(Oid::new(1), CapNodeKind::Internal, 4);
        n.set_cap(0, 1.5);
        n.adjust_cap(0, 0.5);
        n.set_cap(3, 9.0);
        assert_eq!(n.capacitance, vec![2.0, 0.0, 0.0, 9.0]);
    }

    #[test]
    fn ccseg_reports_correct_side() {
        let a = Oid::new(1);
        let b = Oid::new(2);
        let seg = CCSeg::new(a, Oid::new(10), b, Oid::new(20), 1);
        assert_eq!(seg.side_of(a), Some(Side::A));
        assert_eq!(seg.side_of(b), Some(Side::B));
        assert_eq!(seg.side_of(Oid::new(99)), None);
    }
}
