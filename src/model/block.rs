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

//! Hierarchical design containers: `Chip`, `Block`, and the floorplan-adjacent entities a
//! `Block` owns (`Row`, `Region`, `Module`, `ModInst`, `Group`, `GCellGrid`, `TrackGrid`).

use crate::iter::ChainLinks;
use crate::model::enums::Direction;
use crate::oid::Oid;

pub struct Chip {
    pub top_block: Oid,
}

pub struct Block {
    pub parent: Option<Oid>,
    pub name: String,
    pub hierarchy_delimiter: char,
    pub dbu_per_micron: i32,
    pub corner_count: u32,

    pub inst_head: Oid,
    pub net_head: Oid,
    pub bterm_head: Oid,
    pub via_head: Oid,
    pub row_head: Oid,
    pub region_head: Oid,
    pub module_head: Oid,
    pub modinst_head: Oid,
    pub group_head: Oid,
    pub obstruction_head: Oid,
    pub blockage_head: Oid,
    pub fill_head: Oid,
    pub track_grid_head: Oid,
    pub box_head: Oid,
    pub gcell_grid: Option<Oid>,

    /// Chain membership among `parent`'s children; unused (all `Oid::NULL`) for the top block.
    pub sib_next: Oid,
    pub sib_prev: Oid,
}

impl Block {
    pub fn new(parent: Option<Oid>, name: impl Into<String>, dbu_per_micron: i32) -> Self {
        Block {
            parent,
            name: name.into(),
            hierarchy_delimiter: '/',
            dbu_per_micron,
            corner_count: 1,
            inst_head: Oid::NULL,
            net_head: Oid::NULL,
            bterm_head: Oid::NULL,
            via_head: Oid::NULL,
            row_head: Oid::NULL,
            region_head: Oid::NULL,
            module_head: Oid::NULL,
            modinst_head: Oid::NULL,
            group_head: Oid::NULL,
            obstruction_head: Oid::NULL,
            blockage_head: Oid::NULL,
            fill_head: Oid::NULL,
            track_grid_head: Oid::NULL,
            box_head: Oid::NULL,
            gcell_grid: None,
            sib_next: Oid::NULL,
            sib_prev: Oid::NULL,
        }
    }
}

impl ChainLinks for Block {
    fn next(&self) -> Oid { self.sib_next }
    fn set_next(&mut self, next: Oid) { self.sib_next = next; }
    fn prev(&self) -> Oid { self.sib_prev }
    fn set_prev(&mut self, prev: Oid) { self.sib_prev = prev; }
}

pub struct Row {
    pub site: Oid,
    pub origin: crate::geom::Point,
    pub orient: crate::model::enums::Orientation,
    pub direction: Direction,
    pub count: u32,
    pub spacing: i32,
    pub next: Oid,
    pub prev: Oid,
}

impl Row {
    pub fn new(site: Oid, origin: crate::geom::Point) -> Self {
        Row {
            site,
            origin,
            orient: crate::model::enums::Orientation::R0,
            direction: Direction::Horizontal,
            count: 1,
            spacing: 0,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for Row {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

pub struct Region {
    pub name: String,
    pub insts: Vec<Oid>,
    /// Head of this region's own box chain (spec §3: "Box... owned by... Region").
    pub box_head: Oid,
    pub next: Oid,
    pub prev: Oid,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Region { name: name.into(), insts: Vec::new(), box_head: Oid::NULL, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for Region {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// A `Module` groups `Inst`s without creating a physical child `Block` (logical hierarchy
/// orthogonal to physical hierarchy; spec §3.1).
pub struct Module {
    pub name: String,
    pub insts: Vec<Oid>,
    pub modinsts: Vec<Oid>,
    pub next: Oid,
    pub prev: Oid,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module { name: name.into(), insts: Vec::new(), modinsts: Vec::new(), next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for Module {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// Instantiates a `Module` inside another `Module`.
pub struct ModInst {
    pub parent_module: Oid,
    pub master_module: Oid,
    pub name: String,
    pub next: Oid,
    pub prev: Oid,
}

impl ModInst {
    pub fn new(parent_module: Oid, master_module: Oid, name: impl Into<String>) -> Self {
        ModInst { parent_module, master_module, name: name.into(), next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for ModInst {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// Further partitions `Inst`s/`Module`s for physical constraints, orthogonal to both `Region`
/// and `Module` (spec §3.1).
pub struct Group {
    pub name: String,
    pub insts: Vec<Oid>,
    pub region: Option<Oid>,
    pub next: Oid,
    pub prev: Oid,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Group { name: name.into(), insts: Vec::new(), region: None, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for Group {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// One `GCellGrid` per `Block`: ordered grid-line coordinates plus per-gcell capacity overrides,
/// held as side arrays since gcell counts are unbounded (spec §3.1).
#[derive(Default)]
pub struct GCellGrid {
    pub x_lines: Vec<i32>,
    pub y_lines: Vec<i32>,
    pub capacity_overrides: Vec<(u32, u32, u32)>,
}

/// Per-`Layer` per-`Block` track definition (spec §3.1).
pub struct TrackGrid {
    pub layer: Oid,
    pub x_origin: i32,
    pub x_count: u32,
    pub x_step: i32,
    pub y_origin: i32,
    pub y_count: u32,
    pub y_step: i32,
    pub next: Oid,
    pub prev: Oid,
}

impl TrackGrid {
    pub fn new(layer: Oid) -> Self {
        TrackGrid {
            layer,
            x_origin: 0,
            x_count: 0,
            x_step: 0,
            y_origin: 0,
            y_count: 0,
            y_step: 0,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for TrackGrid {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}
