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

//! Block boundary terminals: `BTerm`, `BPin`.

use crate::iter::ChainLinks;
use crate::model::enums::{IoType, SignalType};
use crate::oid::Oid;

/// A `BTerm` belongs to exactly one `Net` (spec §3) and is also linked into its owning `Block`'s
/// bterm chain -- two independent chain memberships on one record.
pub struct BTerm {
    pub block: Oid,
    pub net: Oid,
    pub name: String,
    pub io_type: IoType,
    pub signal_type: SignalType,
    pub net_next: Oid,
    pub net_prev: Oid,
    pub blk_next: Oid,
    pub blk_prev: Oid,
    pub bpin_head: Oid,
}

impl BTerm {
    pub fn new(block: Oid, net: Oid, name: impl Into<String>, io_type: IoType) -> Self {
        BTerm {
            block,
            net,
            name: name.into(),
            io_type,
            signal_type: SignalType::Signal,
            net_next: Oid::NULL,
            net_prev: Oid::NULL,
            blk_next: Oid::NULL,
            blk_prev: Oid::NULL,
            bpin_head: Oid::NULL,
        }
    }
}

/// `ChainLinks` for `BTerm` addresses its net-chain membership; the block-chain membership
/// (`blk_next`/`blk_prev`) is threaded manually where used since a record can only implement
/// `ChainLinks` once.
impl ChainLinks for BTerm {
    fn next(&self) -> Oid { self.net_next }
    fn set_next(&mut self, next: Oid) { self.net_next = next; }
    fn prev(&self) -> Oid { self.net_prev }
    fn set_prev(&mut self, prev: Oid) { self.net_prev = prev; }
}

pub fn bterm_net_links(b: &BTerm) -> (Oid, Oid) { (b.net_prev, b.net_next) }
pub fn bterm_block_links(b: &BTerm) -> (Oid, Oid) { (b.blk_prev, b.blk_next) }

pub struct BPin {
    pub bterm: Oid,
    pub status: crate::model::enums::PlacementStatus,
    pub box_head: Oid,
    pub next: Oid,
    pub prev: Oid,
}

impl BPin {
    pub fn new(bterm: Oid) -> Self {
        BPin {
            bterm,
            status: crate::model::enums::PlacementStatus::None,
            box_head: Oid::NULL,
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for BPin {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}
