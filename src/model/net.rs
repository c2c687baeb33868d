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

//! `Net`: an electrical net owning terminals, routing, and its RC sub-network.

use crate::iter::ChainLinks;
use crate::model::enums::SignalType;
use crate::oid::Oid;

pub struct Net {
    pub block: Oid,
    pub name: String,
    pub signal_type: SignalType,
    pub iterm_head: Oid,
    pub bterm_head: Oid,
    pub wire: Option<Oid>,
    pub swire_head: Oid,
    pub capnode_head: Oid,
    pub rseg_head: Oid,
    /// Head of the chain of `CCSeg`s in which this net participates on either side; see
    /// `crate::rc` for the symmetric two-sided traversal this requires.
    pub ccseg_head: Oid,
    pub non_default_rule: Option<Oid>,
    pub next: Oid,
    pub prev: Oid,
}

impl Net {
    pub fn new(block: Oid, name: impl Into<String>) -> Self {
        Net {
            block,
            name: name.into(),
            signal_type: SignalType::Signal,
            iterm_head: Oid::NULL,
            bterm_head: Oid::NULL,
            wire: None,
            swire_head: Oid::NULL,
            capnode_head: Oid::NULL,
            rseg_head: Oid::NULL,
            ccseg_head: Oid::NULL,
            non_default_rule: None,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for Net {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// A special (power/ground/clock) wire on a `Net`: an ordered list of routed `SpecialShape`s
/// classified by `crate::model::enums::WireShapeType` (spec §3, "SWire").
pub struct SWire {
    pub net: Oid,
    pub shape_head: Oid,
    pub next: Oid,
    pub prev: Oid,
}

impl SWire {
    pub fn new(net: Oid) -> Self { SWire { net, shape_head: Oid::NULL, next: Oid::NULL, prev: Oid::NULL } }
}

impl ChainLinks for SWire {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

/// Holds a signal net's decoded opcode stream (spec §4.5); one per `Net.wire`, stored in its own
/// table since its payload (`crate::wire::Wire`) is variable-sized, matching spec's "overflow
/// references to auxiliary tables (e.g. per-net opcode stream held in a separate byte-stream
/// table)".
pub struct WireRecord {
    pub net: Oid,
    pub wire: crate::wire::Wire,
}

impl WireRecord {
    pub fn new(net: Oid) -> Self { WireRecord { net, wire: crate::wire::Wire::new() } }
}
