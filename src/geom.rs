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

//! Integer-coordinate geometry shared by boxes, wires, and placement. Coordinates are database
//! units (DBU), always integers -- the core's Non-goal "floating-point analysis" refers to RC
//! analysis, not geometry storage, which stays exact as OpenDB requires.

use crate::model::enums::Orientation;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("({x}, {y})")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Point { x, y } }

    pub const fn translate(self, dx: i32, dy: i32) -> Self { Point::new(self.x + dx, self.y + dy) }
}

/// An axis-aligned rectangle. Invariant (spec §8): `x_min <= x_max && y_min <= y_max`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("({x_min}, {y_min}) - ({x_max}, {y_max})")]
pub struct Rect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Rect {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        assert_invariant!(x_min <= x_max && y_min <= y_max, "odb: degenerate rectangle");
        Rect { x_min, y_min, x_max, y_max }
    }

    pub const fn width(&self) -> i32 { self.x_max - self.x_min }
    pub const fn height(&self) -> i32 { self.y_max - self.y_min }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x_min + dx, self.y_min + dy, self.x_max + dx, self.y_max + dy)
    }

    /// Applies an orientation about the origin then translates by `origin` -- the transform
    /// spec.md §3 requires for `Inst.bbox == transform(orient, master.bbox) + origin`.
    pub fn transform(&self, orient: Orientation, origin: Point) -> Rect {
        use Orientation::*;
        let (x0, y0, x1, y1) = (self.x_min, self.y_min, self.x_max, self.y_max);
        let (a, b, c, d) = match orient {
            R0 => (x0, y0, x1, y1),
            R90 => (-y1, x0, -y0, x1),
            R180 => (-x1, -y1, -x0, -y0),
            R270 => (y0, -x1, y1, -x0),
            MY => (-x1, y0, -x0, y1),
            MYR90 => (-y1, -x1, -y0, -x0),
            MX => (x0, -y1, x1, -y0),
            MXR90 => (y0, x0, y1, x1),
        };
        let (x_min, x_max) = if a <= c { (a, c) } else { (c, a) };
        let (y_min, y_max) = if b <= d { (b, d) } else { (d, b) };
        Rect::new(x_min, y_min, x_max, y_max).translate(origin.x, origin.y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_matches_inst_bbox_invariant() {
        let bbox = Rect::new(0, 0, 100, 40);
        let placed = bbox.transform(Orientation::R0, Point::new(500, 200));
        assert_eq!(placed, Rect::new(500, 200, 600, 240));

        let mirrored = bbox.transform(Orientation::MY, Point::new(0, 0));
        assert_eq!(mirrored, Rect::new(-100, 0, 0, 40));
    }

    #[test]
    #[should_panic(expected = "degenerate rectangle")]
    fn rect_rejects_inverted_bounds() {
        let _ = Rect::new(10, 0, 0, 10);
    }
}
