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

//! Cell library records: `Lib`, `Master`, `MTerm`, `MPin`, `Site`.

use crate::geom::Rect;
use crate::iter::ChainLinks;
use crate::model::enums::{IoType, SignalType};
use crate::oid::{Id, Oid};

pub struct Lib {
    pub name: String,
    pub dbu_per_micron: i32,
    pub master_head: Oid,
    pub site_head: Oid,
}

impl Lib {
    pub fn new(name: impl Into<String>, dbu_per_micron: i32) -> Self {
        Lib { name: name.into(), dbu_per_micron, master_head: Oid::NULL, site_head: Oid::NULL }
    }
}

pub struct Master {
    pub lib: Oid,
    pub name: String,
    pub bbox: Rect,
    /// Frozen masters reject mterm creation/deletion (spec §3 invariant); indices become stable
    /// `[0..N-1]` at the moment of freezing.
    pub frozen: bool,
    pub mterm_head: Oid,
    pub mterm_count: u32,
    pub next: Oid,
    pub prev: Oid,
}

impl Master {
    pub fn new(lib: Oid, name: impl Into<String>) -> Self {
        Master {
            lib,
            name: name.into(),
            bbox: Rect::new(0, 0, 0, 0),
            frozen: false,
            mterm_head: Oid::NULL,
            mterm_count: 0,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for Master {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

pub struct MTerm {
    pub master: Oid,
    pub name: String,
    pub io_type: IoType,
    pub signal_type: SignalType,
    /// Stable `[0..N-1]` index within the (now-frozen) master; matches the `ITerm` created for
    /// each `Inst` of this master.
    pub index: u32,
    pub mpin_head: Oid,
    pub next: Oid,
    pub prev: Oid,
}

impl MTerm {
    pub fn new(master: Oid, name: impl Into<String>, io_type: IoType, signal_type: SignalType, index: u32) -> Self {
        MTerm {
            master,
            name: name.into(),
            io_type,
            signal_type,
            index,
            mpin_head: Oid::NULL,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for MTerm {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

pub struct MPin {
    pub mterm: Oid,
    pub box_head: Oid,
    pub next: Oid,
    pub prev: Oid,
}

impl MPin {
    pub fn new(mterm: Oid) -> Self {
        MPin { mterm, box_head: Oid::NULL, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for MPin {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

pub struct Site {
    pub lib: Oid,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub next: Oid,
    pub prev: Oid,
}

impl Site {
    pub fn new(lib: Oid, name: impl Into<String>, width: i32, height: i32) -> Self {
        Site { lib, name: name.into(), width, height, next: Oid::NULL, prev: Oid::NULL }
    }
}

impl ChainLinks for Site {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

pub type MasterId = Id<Master>;
pub type MTermId = Id<MTerm>;
