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

//! `Via`: a Block-local named via, either a stamp of a `TechVia` ("generated") or carrying its
//! own explicit box list ("uncomposed"). See spec §3.1.

use crate::geom::Rect;
use crate::iter::ChainLinks;
use crate::oid::Oid;

pub enum ViaKind {
    Generated { tech_via: Oid },
    Uncomposed { boxes: Vec<(Oid, Rect)> },
}

pub struct Via {
    pub block: Oid,
    pub name: String,
    pub kind: ViaKind,
    pub next: Oid,
    pub prev: Oid,
}

impl Via {
    pub fn generated(block: Oid, name: impl Into<String>, tech_via: Oid) -> Self {
        Via { block, name: name.into(), kind: ViaKind::Generated { tech_via }, next: Oid::NULL, prev: Oid::NULL }
    }

    pub fn uncomposed(block: Oid, name: impl Into<String>) -> Self {
        Via {
            block,
            name: name.into(),
            kind: ViaKind::Uncomposed { boxes: Vec::new() },
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }

    /// Stamps this via's box list at `origin`, resolving `TechVia` boxes through `tech_via_boxes`
    /// when `self` is generated.
    pub fn stamp_at(&self, origin: crate::geom::Point, tech_via_boxes: &[(Oid, Rect)]) -> Vec<(Oid, Rect)> {
        let source: &[(Oid, Rect)] = match &self.kind {
            ViaKind::Generated { .. } => tech_via_boxes,
            ViaKind::Uncomposed { boxes } => boxes,
        };
        source.iter().map(|(layer, rect)| (*layer, rect.translate(origin.x, origin.y))).collect()
    }
}

impl ChainLinks for Via {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}
