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

//! Geometric primitives: `Box` (plain rectilinear shape) and `SBox` (special-net routed shape).
//! Both are owned by exactly one of several possible owner kinds; the owner is recorded on the
//! record itself (spec §3) rather than modeled with a sum of per-owner tables.

use crate::geom::Rect;
use crate::iter::ChainLinks;
use crate::model::enums::{Direction, ObjectType, WireShapeType};
use crate::oid::Oid;

/// A rectilinear shape. `layer` is `Oid::NULL` when the box is a bbox of a composite object
/// (spec §3: "the layer may be null when the box is a bbox of a composite object").
pub struct Shape {
    pub layer: Oid,
    pub owner_type: ObjectType,
    pub owner: Oid,
    pub rect: Rect,
    pub next: Oid,
    pub prev: Oid,
}

impl Shape {
    pub fn new(layer: Oid, owner_type: ObjectType, owner: Oid, rect: Rect) -> Self {
        Shape { layer, owner_type, owner, rect, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for Shape {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// A special-net shape: adds wire-shape classification and routing direction on top of `Shape`.
pub struct SpecialShape {
    pub layer: Oid,
    pub owner: Oid,
    pub rect: Rect,
    pub wire_shape_type: WireShapeType,
    pub direction: Direction,
    pub next: Oid,
    pub prev: Oid,
}

impl SpecialShape {
    pub fn new(layer: Oid, owner: Oid, rect: Rect, wire_shape_type: WireShapeType, direction: Direction) -> Self {
        SpecialShape { layer, owner, rect, wire_shape_type, direction, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for SpecialShape {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// `Fill`: metal-fill shape owned by a `Block`.
pub struct Fill {
    pub layer: Oid,
    pub rect: Rect,
    pub is_opc: bool,
    pub next: Oid,
    pub prev: Oid,
}

impl Fill {
    pub fn new(layer: Oid, rect: Rect) -> Self { Fill { layer, rect, is_opc: false, next: Oid::NULL, prev: Oid::NULL } }
}

impl ChainLinks for Fill {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// `Obstruction`: routing obstruction owned by a `Block`.
pub struct Obstruction {
    pub layer: Oid,
    pub rect: Rect,
    pub inst: Option<Oid>,
    pub next: Oid,
    pub prev: Oid,
}

impl Obstruction {
    pub fn new(layer: Oid, rect: Rect) -> Self {
        Obstruction { layer, rect, inst: None, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for Obstruction {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// `Blockage`: placement blockage owned by a `Block`.
pub struct Blockage {
    pub rect: Rect,
    pub soft: bool,
    pub max_density: Option<f64>,
    pub next: Oid,
    pub prev: Oid,
}

impl Blockage {
    pub fn new(rect: Rect) -> Self {
        Blockage { rect, soft: false, max_density: None, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for Blockage {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}
