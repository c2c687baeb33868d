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

//! Placed instances and their terminals: `Inst`, `ITerm`.

use crate::geom::Point;
use crate::iter::ChainLinks;
use crate::model::enums::{Orientation, PlacementStatus};
use crate::oid::Oid;

pub struct Inst {
    pub block: Oid,
    pub master: Oid,
    pub name: String,
    pub origin: Point,
    pub orient: Orientation,
    pub status: PlacementStatus,
    /// Set when this instance is bound 1:1 to a child block (spec §3: "binding requires 1:1 name
    /// match of Master MTerms to child Block BTerms").
    pub bound_block: Option<Oid>,
    /// One `ITerm` id per `MTerm` index of `master`, stable for the instance's lifetime.
    pub iterms: Vec<Oid>,
    /// Head of this instance's halo-box chain (spec §3: "Box... owned by... Inst (halo)").
    pub halo_box_head: Oid,
    pub next: Oid,
    pub prev: Oid,
}

impl Inst {
    pub fn new(block: Oid, master: Oid, name: impl Into<String>) -> Self {
        Inst {
            block,
            master,
            name: name.into(),
            origin: Point::new(0, 0),
            orient: Orientation::R0,
            status: PlacementStatus::None,
            bound_block: None,
            iterms: Vec::new(),
            halo_box_head: Oid::NULL,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }

    /// A placer must not silently move a locked/firm/cover instance (spec §3.1).
    pub fn set_placement(&mut self, origin: Point, orient: Orientation, status: PlacementStatus) -> bool {
        if self.status.is_fixed() && !status.is_fixed() {
            log::warn!("odb: refusing to reposition fixed instance {:?}", self.name);
            return false;
        }
        self.origin = origin;
        self.orient = orient;
        self.status = status;
        true
    }
}

impl ChainLinks for Inst {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// A terminal of an `Inst`, implicit 1:1 with one `MTerm`, indexed by `mterm_index`.
pub struct ITerm {
    pub inst: Oid,
    pub mterm: Oid,
    pub mterm_index: u32,
    pub net: Option<Oid>,
    pub net_next: Oid,
    pub net_prev: Oid,
}

impl ITerm {
    pub fn new(inst: Oid, mterm: Oid, mterm_index: u32) -> Self {
        ITerm { inst, mterm, mterm_index, net: None, net_next: Oid::NULL, net_prev: Oid::NULL }
    }
}

impl ChainLinks for ITerm {
    fn next(&self) -> Oid { self.net_next }
    fn set_next(&mut self, next: Oid) { self.net_next = next; }
    fn prev(&self) -> Oid { self.net_prev }
    fn set_prev(&mut self, prev: Oid) { self.net_prev = prev; }
}
