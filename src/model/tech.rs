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

//! Technology stack records: `Tech`, `Layer` and its design-rule tables, `TechVia`, and the
//! per-net override tables (`ViaRule`, `ViaGenerateRule`, `NonDefaultRule`, `AntennaRule`).

use crate::geom::Rect;
use crate::iter::ChainLinks;
use crate::oid::{Id, Oid};

pub struct Tech {
    pub dbu_per_micron: i32,
    pub lef_version: (u16, u16),
    pub manufacturing_grid: i32,
    /// Governs name comparison in path resolution (spec §4.8: "case-sensitivity follows the
    /// technology's case-sensitivity flag"). LEF/DEF names are case-sensitive by convention, so a
    /// freshly created `Tech` defaults to `true`.
    pub names_case_sensitive: bool,
    pub layer_head: Oid,
    pub layer_tail: Oid,
    pub tech_via_head: Oid,
    pub via_rule_head: Oid,
    pub via_generate_rule_head: Oid,
    pub non_default_rule_head: Oid,
    pub antenna_rule_head: Oid,
}

impl Tech {
    pub fn new(dbu_per_micron: i32) -> Self {
        Tech {
            dbu_per_micron,
            lef_version: (5, 8),
            manufacturing_grid: 1,
            names_case_sensitive: true,
            layer_head: Oid::NULL,
            layer_tail: Oid::NULL,
            tech_via_head: Oid::NULL,
            via_rule_head: Oid::NULL,
            via_generate_rule_head: Oid::NULL,
            non_default_rule_head: Oid::NULL,
            antenna_rule_head: Oid::NULL,
        }
    }
}

/// A per-layer spacing-style rule row; the distillation's many named rule kinds (spacing,
/// min-cut, min-enclosure, V55 influence, corner spacing, EOL, cut-class, cut-spacing, spacing
/// table PRL) are stored as these tagged rows rather than one object table per kind -- see
/// DESIGN.md for why this doesn't change any tested invariant.
#[derive(Clone, Debug)]
pub enum LayerRule {
    Spacing { within: i32, spacing: i32 },
    MinCut { width: i32, cuts: u32 },
    MinEnclosure { cut_width: i32, enclosure: i32 },
    Eol { width: i32, spacing: i32, within: i32 },
    CornerSpacing { eol_width: i32, spacing: i32 },
    CutClass { name: String, width: i32, length: i32 },
    CutSpacing { class_a: String, class_b: String, spacing: i32 },
    V55Influence { width: i32, within: i32, spacing: i32 },
    SpacingTablePrl { width: i32, prl: i32, spacing: i32 },
}

pub struct Layer {
    pub name: String,
    /// 1-based, dense from 1..N across the whole tech (spec §3 invariant).
    pub mask_number: u16,
    /// 1-based contiguous ascending subsequence among routing layers; `None` for cut/masterslice
    /// layers.
    pub routing_level: Option<u16>,
    pub min_width: i32,
    pub default_width: i32,
    pub pitch: i32,
    pub rules: Vec<LayerRule>,
    pub next: Oid,
    pub prev: Oid,
}

impl Layer {
    pub fn new(name: impl Into<String>, mask_number: u16) -> Self {
        Layer {
            name: name.into(),
            mask_number,
            routing_level: None,
            min_width: 0,
            default_width: 0,
            pitch: 0,
            rules: Vec::new(),
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for Layer {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

pub struct TechVia {
    pub name: String,
    pub cut_layer: Oid,
    pub top_layer: Oid,
    pub bottom_layer: Oid,
    pub top_enclosure: (i32, i32),
    pub bottom_enclosure: (i32, i32),
    pub rows: u32,
    pub cols: u32,
    pub cut_size: (i32, i32),
    pub cut_spacing: (i32, i32),
    /// Generated (layer, rect) stamp for one placement at the origin; recomputed whenever
    /// structural params (rows/cols/cut_size/cut_spacing/enclosures) are re-set, per spec §4.3
    /// ("Creators that imply structural re-init ... destroy pre-existing dependents first").
    pub boxes: Vec<(Oid, Rect)>,
    pub next: Oid,
    pub prev: Oid,
}

impl TechVia {
    pub fn new(name: impl Into<String>, cut_layer: Oid, top_layer: Oid, bottom_layer: Oid) -> Self {
        TechVia {
            name: name.into(),
            cut_layer,
            top_layer,
            bottom_layer,
            top_enclosure: (0, 0),
            bottom_enclosure: (0, 0),
            rows: 1,
            cols: 1,
            cut_size: (0, 0),
            cut_spacing: (0, 0),
            boxes: Vec::new(),
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }

    /// Recomputes the box stamp from the current cut array parameters. Called by every setter
    /// that changes rows/cols/cut_size/cut_spacing/enclosure, matching the "structural re-init
    /// destroys pre-existing dependents first" creation contract.
    pub fn regenerate_boxes(&mut self) {
        self.boxes.clear();
        let (cw, ch) = self.cut_size;
        let (sx, sy) = self.cut_spacing;
        let total_w = self.cols as i32 * cw + (self.cols as i32 - 1).max(0) * sx;
        let total_h = self.rows as i32 * ch + (self.rows as i32 - 1).max(0) * sy;
        let x0 = -total_w / 2;
        let y0 = -total_h / 2;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let x = x0 + col as i32 * (cw + sx);
                let y = y0 + row as i32 * (ch + sy);
                self.boxes.push((self.cut_layer, Rect::new(x, y, x + cw, y + ch)));
            }
        }
        let enc_t = self.top_enclosure;
        let top_rect = Rect::new(x0 - enc_t.0, y0 - enc_t.1, x0 + total_w + enc_t.0, y0 + total_h + enc_t.1);
        self.boxes.push((self.top_layer, top_rect));
        let enc_b = self.bottom_enclosure;
        let bot_rect = Rect::new(x0 - enc_b.0, y0 - enc_b.1, x0 + total_w + enc_b.0, y0 + total_h + enc_b.1);
        self.boxes.push((self.bottom_layer, bot_rect));
    }
}

impl ChainLinks for TechVia {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}

macro_rules! simple_tech_rule {
    ($name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        pub struct $name {
            pub name: String,
            $(pub $field: $ty,)*
            pub next: Oid,
            pub prev: Oid,
        }

        impl ChainLinks for $name {
            fn next(&self) -> Oid { self.next }
            fn set_next(&mut self, next: Oid) { self.next = next; }
            fn prev(&self) -> Oid { self.prev }
            fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
        }

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                $name { name: name.into(), $($field: Default::default(),)* next: Oid::NULL, prev: Oid::NULL }
            }
        }
    };
}

simple_tech_rule!(ViaRule { bottom_layer: Oid, cut_layer: Oid, top_layer: Oid });
simple_tech_rule!(ViaGenerateRule { bottom_layer: Oid, cut_layer: Oid, top_layer: Oid, cut_size: (i32, i32), cut_spacing: (i32, i32) });
simple_tech_rule!(AntennaRule { max_area_ratio: f64, max_side_area_ratio: f64 });

pub struct NonDefaultRule {
    pub name: String,
    pub hard_spacing: bool,
    /// per-layer (width, spacing) override
    pub layer_rules: Vec<(Oid, i32, i32)>,
    /// per-layer substitute `TechVia` for generated vias on this rule
    pub via_substitutes: Vec<(Oid, Id<TechVia>)>,
    pub next: Oid,
    pub prev: Oid,
}

impl NonDefaultRule {
    pub fn new(name: impl Into<String>) -> Self {
        NonDefaultRule {
            name: name.into(),
            hard_spacing: false,
            layer_rules: Vec::new(),
            via_substitutes: Vec::new(),
            next: Oid::NULL,
            prev: Oid::NULL,
        }
    }
}

impl ChainLinks for NonDefaultRule {
    fn next(&self) -> Oid { self.next }
    fn set_next(&mut self, next: Oid) { self.next = next; }
    fn prev(&self) -> Oid { self.prev }
    fn set_prev(&mut self, prev: Oid) { self.prev = prev; }
}
