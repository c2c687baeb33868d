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

//! Small closed enumerations used throughout the schema (C5): the object type tag, placement
//! orientation, placement status, signal/IO classification, and wire-shape type. Each derives
//! `strict_encoding`'s `StrictEncode`/`StrictDecode` the same way the teacher tags its own small
//! wire enums (see `FailureCode` in the teacher's RPC crate) -- a stable `repr(u8)` discriminant
//! doubles as the on-disk ordinal required by spec §3 ("a stable integer ordinal used in the
//! binary format").

use crate::LIB_NAME_ODB;

/// Every record kind the core knows how to store (spec §3, "object type tag"). Each variant
/// carries a single human-readable [`ObjectType::name`] and a single-letter [`ObjectType::code`]
/// used in path names (§4.8); the `repr(u8)` discriminant is the stable binary-format ordinal.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_ODB, tags = repr, into_u8, try_from_u8)]
pub enum ObjectType {
    #[strict_type(dumb)]
    Database = 1,
    Tech = 2,
    Chip = 3,
    Block = 4,
    Lib = 5,
    Master = 6,
    MTerm = 7,
    MPin = 8,
    Site = 9,
    Inst = 10,
    ITerm = 11,
    BTerm = 12,
    BPin = 13,
    Net = 14,
    Box = 15,
    SBox = 16,
    Wire = 17,
    SWire = 18,
    Via = 19,
    TechVia = 20,
    Layer = 21,
    Row = 22,
    Region = 23,
    Module = 24,
    ModInst = 25,
    Group = 26,
    Property = 27,
    Name = 28,
    RSeg = 29,
    CapNode = 30,
    CCSeg = 31,
    Fill = 32,
    TrackGrid = 33,
    GCellGrid = 34,
    Obstruction = 35,
    Blockage = 36,
    NonDefaultRule = 37,
    ViaRule = 38,
    ViaGenerateRule = 39,
    AntennaRule = 40,
}

impl ObjectType {
    pub const fn name(self) -> &'static str {
        use ObjectType::*;
        match self {
            Database => "database",
            Tech => "tech",
            Chip => "chip",
            Block => "block",
            Lib => "lib",
            Master => "master",
            MTerm => "mterm",
            MPin => "mpin",
            Site => "site",
            Inst => "inst",
            ITerm => "iterm",
            BTerm => "bterm",
            BPin => "bpin",
            Net => "net",
            Box => "box",
            SBox => "sbox",
            Wire => "wire",
            SWire => "swire",
            Via => "via",
            TechVia => "techvia",
            Layer => "layer",
            Row => "row",
            Region => "region",
            Module => "module",
            ModInst => "modinst",
            Group => "group",
            Property => "property",
            Name => "name",
            RSeg => "rseg",
            CapNode => "capnode",
            CCSeg => "ccseg",
            Fill => "fill",
            TrackGrid => "trackgrid",
            GCellGrid => "gcellgrid",
            Obstruction => "obstruction",
            Blockage => "blockage",
            NonDefaultRule => "nondefaultrule",
            ViaRule => "viarule",
            ViaGenerateRule => "viagenerraterule",
            AntennaRule => "antennarule",
        }
    }

    pub const fn code(self) -> char {
        use ObjectType::*;
        match self {
            Database => 'D',
            Tech => 'T',
            Chip => 'H',
            Block => 'B',
            Lib => 'L',
            Master => 'M',
            MTerm => 'm',
            MPin => 'p',
            Site => 'S',
            Inst => 'I',
            ITerm => 'i',
            BTerm => 'b',
            BPin => 'q',
            Net => 'N',
            Box => 'X',
            SBox => 'x',
            Wire => 'W',
            SWire => 'w',
            Via => 'V',
            TechVia => 'v',
            Layer => 'Y',
            Row => 'R',
            Region => 'G',
            Module => 'O',
            ModInst => 'o',
            Group => 'U',
            Property => 'P',
            Name => 'n',
            RSeg => 'E',
            CapNode => 'c',
            CCSeg => 'C',
            Fill => 'F',
            TrackGrid => 'k',
            GCellGrid => 'g',
            Obstruction => 'J',
            Blockage => 'K',
            NonDefaultRule => 'r',
            ViaRule => 'a',
            ViaGenerateRule => 'A',
            AntennaRule => 'z',
        }
    }

    pub const fn ordinal(self) -> u8 { self as u8 }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        use ObjectType::*;
        const ALL: &[ObjectType] = &[
            Database, Tech, Chip, Block, Lib, Master, MTerm, MPin, Site, Inst, ITerm, BTerm, BPin,
            Net, Box, SBox, Wire, SWire, Via, TechVia, Layer, Row, Region, Module, ModInst, Group,
            Property, Name, RSeg, CapNode, CCSeg, Fill, TrackGrid, GCellGrid, Obstruction,
            Blockage, NonDefaultRule, ViaRule, ViaGenerateRule, AntennaRule,
        ];
        ALL.iter().copied().find(|t| t.ordinal() == ordinal)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

/// The 8 standard placement orientations, closed under composition (spec §3.1).
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(doc_comments)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_ODB, tags = repr, into_u8, try_from_u8)]
pub enum Orientation {
    /// R0
    #[strict_type(dumb)]
    R0 = 0,
    /// R90
    R90 = 1,
    /// R180
    R180 = 2,
    /// R270
    R270 = 3,
    /// MY
    MY = 4,
    /// MYR90
    MYR90 = 5,
    /// MX
    MX = 6,
    /// MXR90
    MXR90 = 7,
}

impl Orientation {
    /// Composes `self` then `other`: applying `self.then(other)` to a shape is equivalent to
    /// applying `self` followed by `other`. The 8 orientations form the dihedral group D4 under
    /// this operation (closed, spec §3.1 invariant).
    pub const fn then(self, other: Orientation) -> Orientation {
        // Each orientation is (rotation in units of 90 degrees, mirrored) packed as bits
        // [mirror:1][rot:2]. Composition in D4: mirroring flips the sense of subsequent rotation.
        let (r1, m1) = self.decompose();
        let (r2, m2) = other.decompose();
        let rot = if m1 { (r1 + 4 - r2) % 4 } else { (r1 + r2) % 4 };
        let mirror = m1 ^ m2;
        Orientation::compose(rot, mirror)
    }

    const fn decompose(self) -> (u8, bool) {
        use Orientation::*;
        match self {
            R0 => (0, false),
            R90 => (1, false),
            R180 => (2, false),
            R270 => (3, false),
            MY => (0, true),
            MYR90 => (1, true),
            MX => (2, true),
            MXR90 => (3, true),
        }
    }

    const fn compose(rot: u8, mirror: bool) -> Orientation {
        use Orientation::*;
        match (rot % 4, mirror) {
            (0, false) => R0,
            (1, false) => R90,
            (2, false) => R180,
            (3, false) => R270,
            (0, true) => MY,
            (1, true) => MYR90,
            (2, true) => MX,
            (3, true) => MXR90,
            _ => unreachable!(),
        }
    }

    /// The inverse orientation: `o.then(o.inverse())` is always [`Orientation::R0`].
    pub const fn inverse(self) -> Orientation {
        let (rot, mirror) = self.decompose();
        if mirror {
            self
        } else {
            Orientation::compose((4 - rot) % 4, false)
        }
    }
}

/// Placement status for `Inst`/`BTerm`/`BPin`, ordered as spec §3.1 requires so placers can
/// decide whether a re-placement may overwrite a status: `NONE < UNPLACED < SUGGESTED < PLACED
/// < {LOCKED, FIRM, COVER}`. `LOCKED`/`FIRM`/`COVER` intentionally compare equal in strength so a
/// placer treats all three as "do not silently move"; `Ord` breaks ties by declaration order only
/// for a well-defined `sort`, not by strength.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Debug, Display)]
#[display(doc_comments)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_ODB, tags = repr, into_u8, try_from_u8)]
pub enum PlacementStatus {
    /// NONE
    #[strict_type(dumb)]
    None = 0,
    /// UNPLACED
    Unplaced = 1,
    /// SUGGESTED
    Suggested = 2,
    /// PLACED
    Placed = 3,
    /// LOCKED
    Locked = 4,
    /// FIRM
    Firm = 5,
    /// COVER
    Cover = 6,
}

impl PlacementStatus {
    /// `true` for the three statuses a placer must not silently overwrite.
    pub const fn is_fixed(self) -> bool {
        matches!(self, PlacementStatus::Locked | PlacementStatus::Firm | PlacementStatus::Cover)
    }
}

/// Signal classification of a `Net`/`BTerm`/`MTerm` (spec §3.1).
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(doc_comments)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_ODB, tags = repr, into_u8, try_from_u8)]
pub enum SignalType {
    /// SIGNAL
    #[strict_type(dumb)]
    Signal = 0,
    /// POWER
    Power = 1,
    /// GROUND
    Ground = 2,
    /// CLOCK
    Clock = 3,
    /// ANALOG
    Analog = 4,
    /// RESET
    Reset = 5,
    /// SCAN
    Scan = 6,
    /// TIEOFF
    Tieoff = 7,
}

/// I/O direction of a `BTerm`/`MTerm`/`ITerm` (spec §3.1).
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(doc_comments)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_ODB, tags = repr, into_u8, try_from_u8)]
pub enum IoType {
    /// INPUT
    #[strict_type(dumb)]
    Input = 0,
    /// OUTPUT
    Output = 1,
    /// INOUT
    Inout = 2,
    /// FEEDTHRU
    Feedthru = 3,
}

/// Wire direction as carried by routing-track grids and special wires.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(doc_comments)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_ODB, tags = repr, into_u8, try_from_u8)]
pub enum Direction {
    /// horizontal
    #[strict_type(dumb)]
    Horizontal = 0,
    /// vertical
    Vertical = 1,
    /// undefined
    Undefined = 2,
    /// octilinear
    Octilinear = 3,
}

/// Wire-shape classification of a routed `SBox` on a special net (spec §3.1).
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(doc_comments)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_ODB, tags = repr, into_u8, try_from_u8)]
pub enum WireShapeType {
    #[strict_type(dumb)]
    Ring = 0,
    Padring = 1,
    Blockring = 2,
    Stripe = 3,
    Followpin = 4,
    Iowire = 5,
    Corewire = 6,
    Blockwire = 7,
    Blockagewire = 8,
    Fillwire = 9,
    Drcfill = 10,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_letter_codes_are_unique() {
        let all: Vec<_> = (1u8..=40).filter_map(ObjectType::from_ordinal).collect();
        assert_eq!(all.len(), 40);
        let mut codes: Vec<char> = all.iter().map(|t| t.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 40, "object type letter codes must be pairwise distinct");
    }

    #[test]
    fn orientation_composition_is_closed_group() {
        use Orientation::*;
        let all = [R0, R90, R180, R270, MY, MYR90, MX, MXR90];
        for &a in &all {
            assert_eq!(a.then(R0), a);
            assert_eq!(R0.then(a), a);
            assert_eq!(a.then(a.inverse()), R0);
        }
    }

    #[test]
    fn placement_status_ordering_matches_spec() {
        assert!(PlacementStatus::None < PlacementStatus::Unplaced);
        assert!(PlacementStatus::Unplaced < PlacementStatus::Suggested);
        assert!(PlacementStatus::Suggested < PlacementStatus::Placed);
        assert!(PlacementStatus::Placed < PlacementStatus::Locked);
        assert!(PlacementStatus::Locked.is_fixed());
        assert!(PlacementStatus::Firm.is_fixed());
        assert!(PlacementStatus::Cover.is_fixed());
        assert!(!PlacementStatus::Placed.is_fixed());
    }
}
