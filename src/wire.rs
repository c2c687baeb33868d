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

//! Wire opcode codec (C7): a signal `Net`'s routed path is a tagged opcode sequence (spec §4.5).
//!
//! In memory we keep the decoded token sequence as `Vec<WireOp>` rather than the two raw
//! parallel byte/varint streams the wire format ultimately uses on disk -- `to_bytes`/`from_bytes`
//! below are the bridge to that bespoke compact encoding (see `crate::codec` for the container
//! format it is embedded in). Keeping the host-side representation as a typed enum vector, rather
//! than re-parsing raw bytes on every traversal, is the only place this core deviates from a
//! byte-exact in-memory mirror of the persisted format; DESIGN.md records this as a scope choice.

use crate::geom::Rect;
use crate::oid::Oid;

/// One token of a wire's opcode stream. Ordinals are stable (spec §4.5 "Concrete opcode set").
#[derive(Clone, Debug, PartialEq)]
pub enum WireOp {
    Layer(Oid),
    Via { name: Oid, orient: Option<crate::model::enums::Orientation> },
    ViaMask { top: u8, cut: u8, bottom: u8 },
    Width(i32),
    Point { x: i32, y: i32 },
    ExtPoint { x: i32, y: i32, ext: i32 },
    Rect { dx1: i32, dy1: i32, dx2: i32, dy2: i32 },
    Taper,
    TaperRule(Oid),
    Shape(u8),
    Style(u8),
    Mask(u8),
    Done,
}

impl WireOp {
    const TAG_DONE: u8 = 0;
    const TAG_LAYER: u8 = 1;
    const TAG_VIA: u8 = 2;
    const TAG_VIAROTATION: u8 = 3;
    const TAG_WIDTH: u8 = 4;
    const TAG_POINT: u8 = 5;
    const TAG_EXT_POINT: u8 = 6;
    const TAG_TAPER: u8 = 7;
    const TAG_SHAPE: u8 = 8;
    const TAG_STYLE: u8 = 9;
    const TAG_TAPERRULE: u8 = 10;
    const TAG_RECT: u8 = 11;
    const TAG_MASK: u8 = 12;
    const TAG_VIAMASK: u8 = 13;

    /// A junction is produced by every vertex-like opcode and by vias (spec §4.5).
    pub fn is_junction(&self) -> bool {
        matches!(
            self,
            WireOp::Point { .. } | WireOp::ExtPoint { .. } | WireOp::Rect { .. } | WireOp::Via { .. }
        )
    }
}

/// A decoded view returned by [`Wire::shape_at`].
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeView {
    Segment { layer: Oid, rect: Rect },
    Via { name: Oid, origin: crate::geom::Point },
}

/// A signal net's lazily-decoded routed path.
#[derive(Default, Clone)]
pub struct Wire {
    pub ops: Vec<WireOp>,
}

impl Wire {
    pub fn new() -> Self { Wire::default() }

    pub fn append(&mut self, op: WireOp) { self.ops.push(op); }

    /// Junction ids are opcode stream positions (spec §4.5).
    pub fn junctions(&self) -> impl Iterator<Item = usize> + '_ {
        self.ops.iter().enumerate().filter(|(_, op)| op.is_junction()).map(|(i, _)| i)
    }

    /// Returns the shape at junction `j`: a `Segment` connecting it to the previous junction at
    /// the currently active width, or a `Via` view if `j` is a via opcode. `via_layers` resolves a
    /// via's `(bottom, top)` routing layers, used to advance the active layer across a via that
    /// has no explicit `Layer` op following it (spec §8 scenario 4); `via_landing_width` resolves
    /// the width a via lands at, used to size the segment leaving it.
    pub fn shape_at(
        &self,
        j: usize,
        via_layers: impl Fn(Oid) -> Option<(Oid, Oid)>,
        via_landing_width: impl Fn(Oid) -> i32,
    ) -> Option<ShapeView> {
        let op = self.ops.get(j)?;
        if let WireOp::Via { name, .. } = op {
            let origin = self.point_before(j)?;
            return Some(ShapeView::Via { name: *name, origin });
        }
        let (x, y) = self.point_of(op)?;
        let layer = self.active_layer_before(j, &via_layers)?;
        let width = self.active_width_before(j);
        let prev_j = self.prev_junction(j)?;
        let crossed_via = matches!(&self.ops[prev_j], WireOp::Via { .. });
        let (px, py) = match &self.ops[prev_j] {
            WireOp::Via { .. } => (self.point_before(prev_j)?.x, self.point_before(prev_j)?.y),
            other => self.point_of(other)?,
        };
        let half = if crossed_via {
            // crossing a via: the segment on the exit layer is anchored at the via landing
            via_landing_width(self.via_name_at(prev_j).unwrap_or(Oid::NULL)).max(width) / 2
        } else {
            width / 2
        };
        let rect = if py == y {
            Rect::new(px.min(x), y - half, px.max(x), y + half)
        } else {
            Rect::new(x - half, py.min(y), x + half, py.max(y))
        };
        Some(ShapeView::Segment { layer, rect })
    }

    fn via_name_at(&self, j: usize) -> Option<Oid> {
        match &self.ops[j] {
            WireOp::Via { name, .. } => Some(*name),
            _ => None,
        }
    }

    fn point_of(&self, op: &WireOp) -> Option<(i32, i32)> {
        match op {
            WireOp::Point { x, y } | WireOp::ExtPoint { x, y, .. } => Some((*x, *y)),
            WireOp::Rect { dx1, dy1, .. } => Some((*dx1, *dy1)),
            _ => None,
        }
    }

    fn point_before(&self, j: usize) -> Option<crate::geom::Point> {
        for i in (0..j).rev() {
            if let Some((x, y)) = self.point_of(&self.ops[i]) {
                return Some(crate::geom::Point::new(x, y));
            }
        }
        None
    }

    fn prev_junction(&self, j: usize) -> Option<usize> {
        (0..j).rev().find(|&i| self.ops[i].is_junction())
    }

    /// Layer in effect at or before `j`: the most recent explicit `Layer` op, advanced across every
    /// `Via` seen since (in order) onto that via's far routing layer -- a via with no `Layer` op
    /// following it implicitly switches the active layer rather than leaving it unchanged.
    fn active_layer_before(&self, j: usize, via_layers: &impl Fn(Oid) -> Option<(Oid, Oid)>) -> Option<Oid> {
        let mut layer = None;
        for op in &self.ops[..=j] {
            match op {
                WireOp::Layer(l) => layer = Some(*l),
                WireOp::Via { name, .. } => {
                    if let (Some(cur), Some((bottom, top))) = (layer, via_layers(*name)) {
                        layer = Some(if cur == bottom { top } else { bottom });
                    }
                }
                _ => {}
            }
        }
        layer
    }

    fn active_width_before(&self, j: usize) -> i32 {
        (0..=j)
            .rev()
            .find_map(|i| match &self.ops[i] {
                WireOp::Width(w) => Some(*w),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Forward traversal of every junction id.
    pub fn forward_traversal(&self) -> Vec<usize> { self.junctions().collect() }

    /// Reverse traversal of every junction id; `reverse(reverse_traversal(w))` must enumerate the
    /// same junctions as `forward_traversal` (spec §8).
    pub fn reverse_traversal(&self) -> Vec<usize> {
        let mut v = self.forward_traversal();
        v.reverse();
        v
    }

    /// Serializes the opcode stream to the compact on-disk form: one tag byte per opcode
    /// followed by its sign-extended varint operands, `DONE` terminated.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                WireOp::Done => out.push(WireOp::TAG_DONE),
                WireOp::Layer(id) => {
                    out.push(WireOp::TAG_LAYER);
                    write_varint(&mut out, id.raw() as i64);
                }
                WireOp::Via { name, orient } => {
                    if let Some(o) = orient {
                        out.push(WireOp::TAG_VIAROTATION);
                        write_varint(&mut out, name.raw() as i64);
                        out.push(*o as u8);
                    } else {
                        out.push(WireOp::TAG_VIA);
                        write_varint(&mut out, name.raw() as i64);
                    }
                }
                WireOp::ViaMask { top, cut, bottom } => {
                    out.push(WireOp::TAG_VIAMASK);
                    out.extend_from_slice(&[*top, *cut, *bottom]);
                }
                WireOp::Width(w) => {
                    out.push(WireOp::TAG_WIDTH);
                    write_varint(&mut out, *w as i64);
                }
                WireOp::Point { x, y } => {
                    out.push(WireOp::TAG_POINT);
                    write_varint(&mut out, *x as i64);
                    write_varint(&mut out, *y as i64);
                }
                WireOp::ExtPoint { x, y, ext } => {
                    out.push(WireOp::TAG_EXT_POINT);
                    write_varint(&mut out, *x as i64);
                    write_varint(&mut out, *y as i64);
                    write_varint(&mut out, *ext as i64);
                }
                WireOp::Rect { dx1, dy1, dx2, dy2 } => {
                    out.push(WireOp::TAG_RECT);
                    for v in [dx1, dy1, dx2, dy2] {
                        write_varint(&mut out, *v as i64);
                    }
                }
                WireOp::Taper => out.push(WireOp::TAG_TAPER),
                WireOp::TaperRule(id) => {
                    out.push(WireOp::TAG_TAPERRULE);
                    write_varint(&mut out, id.raw() as i64);
                }
                WireOp::Shape(k) => {
                    out.push(WireOp::TAG_SHAPE);
                    out.push(*k);
                }
                WireOp::Style(id) => {
                    out.push(WireOp::TAG_STYLE);
                    out.push(*id);
                }
                WireOp::Mask(m) => {
                    out.push(WireOp::TAG_MASK);
                    out.push(*m);
                }
            }
        }
        out.push(WireOp::TAG_DONE);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Wire, crate::error::OdbError> {
        use crate::error::{FormatError, OdbError};
        let mut ops = Vec::new();
        let mut cur = std::io::Cursor::new(bytes);
        loop {
            let tag = match read_u8(&mut cur) {
                Some(t) => t,
                None => break,
            };
            let op = match tag {
                WireOp::TAG_DONE => {
                    ops.push(WireOp::Done);
                    break;
                }
                WireOp::TAG_LAYER => WireOp::Layer(Oid::new(read_varint(&mut cur)? as u32)),
                WireOp::TAG_VIA => WireOp::Via { name: Oid::new(read_varint(&mut cur)? as u32), orient: None },
                WireOp::TAG_VIAROTATION => {
                    let name = Oid::new(read_varint(&mut cur)? as u32);
                    let o = read_u8(&mut cur).ok_or(OdbError::Format(FormatError::Truncated { expected: 1, found: 0 }))?;
                    WireOp::Via { name, orient: orientation_from_u8(o) }
                }
                WireOp::TAG_VIAMASK => {
                    let top = read_u8(&mut cur).ok_or(trunc())?;
                    let cut = read_u8(&mut cur).ok_or(trunc())?;
                    let bottom = read_u8(&mut cur).ok_or(trunc())?;
                    WireOp::ViaMask { top, cut, bottom }
                }
                WireOp::TAG_WIDTH => WireOp::Width(read_varint(&mut cur)? as i32),
                WireOp::TAG_POINT => {
                    let x = read_varint(&mut cur)? as i32;
                    let y = read_varint(&mut cur)? as i32;
                    WireOp::Point { x, y }
                }
                WireOp::TAG_EXT_POINT => {
                    let x = read_varint(&mut cur)? as i32;
                    let y = read_varint(&mut cur)? as i32;
                    let ext = read_varint(&mut cur)? as i32;
                    WireOp::ExtPoint { x, y, ext }
                }
                WireOp::TAG_RECT => {
                    let dx1 = read_varint(&mut cur)? as i32;
                    let dy1 = read_varint(&mut cur)? as i32;
                    let dx2 = read_varint(&mut cur)? as i32;
                    let dy2 = read_varint(&mut cur)? as i32;
                    WireOp::Rect { dx1, dy1, dx2, dy2 }
                }
                WireOp::TAG_TAPER => WireOp::Taper,
                WireOp::TAG_TAPERRULE => WireOp::TaperRule(Oid::new(read_varint(&mut cur)? as u32)),
                WireOp::TAG_SHAPE => WireOp::Shape(read_u8(&mut cur).ok_or(trunc())?),
                WireOp::TAG_STYLE => WireOp::Style(read_u8(&mut cur).ok_or(trunc())?),
                WireOp::TAG_MASK => WireOp::Mask(read_u8(&mut cur).ok_or(trunc())?),
                other => return Err(OdbError::UnknownOpcode(other)),
            };
            ops.push(op);
        }
        Ok(Wire { ops })
    }
}

fn trunc() -> crate::error::OdbError {
    crate::error::OdbError::Format(crate::error::FormatError::Truncated { expected: 1, found: 0 })
}

pub(crate) fn orientation_from_u8(v: u8) -> Option<crate::model::enums::Orientation> {
    use crate::model::enums::Orientation::*;
    Some(match v {
        0 => R0,
        1 => R90,
        2 => R180,
        3 => R270,
        4 => MY,
        5 => MYR90,
        6 => MX,
        7 => MXR90,
        _ => return None,
    })
}

fn write_varint(out: &mut Vec<u8>, value: i64) {
    // zig-zag then LEB128, matching the "sign-extended varints" grammar note in spec §4.5
    let mut zz = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let mut byte = (zz & 0x7f) as u8;
        zz >>= 7;
        if zz != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if zz == 0 {
            break;
        }
    }
}

fn read_varint(cur: &mut std::io::Cursor<&[u8]>) -> Result<i64, crate::error::OdbError> {
    use crate::error::{FormatError, OdbError};
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = read_u8(cur).ok_or(OdbError::Format(FormatError::Truncated { expected: 1, found: 0 }))?;
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 70 {
            return Err(OdbError::Format(FormatError::VarintOverflow));
        }
    }
    Ok(((result >> 1) as i64) ^ -((result & 1) as i64))
}

fn read_u8(cur: &mut std::io::Cursor<&[u8]>) -> Option<u8> {
    use std::io::Read;
    let mut b = [0u8; 1];
    match cur.read(&mut b) {
        Ok(1) => Some(b[0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_roundtrips() {
        let mut w = Wire::new();
        w.append(WireOp::Layer(Oid::new(1)));
        w.append(WireOp::Width(140));
        w.append(WireOp::Point { x: 0, y: 0 });
        w.append(WireOp::Point { x: 1000, y: 0 });
        w.append(WireOp::Via { name: Oid::new(12), orient: None });
        w.append(WireOp::Point { x: 1000, y: 500 });
        let bytes = w.to_bytes();
        let decoded = Wire::decode(&bytes).unwrap();
        assert_eq!(decoded.ops[..decoded.ops.len() - 1], w.ops[..]);
    }

    #[test]
    fn forward_and_reverse_traversal_enumerate_same_junctions() {
        let mut w = Wire::new();
        w.append(WireOp::Layer(Oid::new(1)));
        w.append(WireOp::Point { x: 0, y: 0 });
        w.append(WireOp::Point { x: 10, y: 0 });
        w.append(WireOp::Point { x: 10, y: 10 });
        let fwd = w.forward_traversal();
        let mut rev = w.reverse_traversal();
        rev.reverse();
        assert_eq!(fwd, rev);
    }

    #[test]
    fn scenario_4_segment_and_via_decoding() {
        // LAYER(M1=1) WIDTH(140) POINT(0,0) POINT(1000,0) VIA(V12=12) POINT(1000,500)
        // -- no explicit LAYER(M2) after the via; the decoder must infer the exit layer from
        // V12's (M1, M2) routing layers.
        let m1 = Oid::new(1);
        let m2 = Oid::new(2);
        let via_layers = |name: Oid| if name == Oid::new(12) { Some((m1, m2)) } else { None };
        let mut w = Wire::new();
        w.append(WireOp::Layer(m1));
        w.append(WireOp::Width(140));
        w.append(WireOp::Point { x: 0, y: 0 });
        w.append(WireOp::Point { x: 1000, y: 0 });
        w.append(WireOp::Via { name: Oid::new(12), orient: None });
        w.append(WireOp::Point { x: 1000, y: 500 });

        // junction 2 (ops[3], POINT(1000,0)) -> segment on M1 from junction 1
        let seg = w.shape_at(3, via_layers, |_| 140).unwrap();
        assert_eq!(seg, ShapeView::Segment { layer: m1, rect: Rect::new(0, -70, 1000, 70) });

        // junction 3 (ops[4], VIA) -> via view at (1000,0)
        let via = w.shape_at(4, via_layers, |_| 140).unwrap();
        assert_eq!(via, ShapeView::Via { name: Oid::new(12), origin: crate::geom::Point::new(1000, 0) });

        // junction 4 (ops[5], POINT(1000,500)) -> segment on M2 (inferred, no LAYER op), anchored
        // at the 140-wide via landing
        let seg2 = w.shape_at(5, via_layers, |_| 140).unwrap();
        assert_eq!(seg2, ShapeView::Segment { layer: m2, rect: Rect::new(930, 0, 1070, 500) });
    }
}
