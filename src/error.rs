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

//! Error taxonomy for the core (§7 of the design). Unrecoverable conditions propagate as
//! [`OdbError`]; recoverable ones (name collisions, frozen-master edits, bind mismatches) are
//! `Option`/`bool` returns at the call site and never appear here.

use std::io;

/// Unrecoverable failure raised by the core. Every fallible boundary logs the condition with
/// `log::error!`/`log::warn!` at the site that first observes it, then propagates this type; the
/// core never writes to stdout/stderr directly.
#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum OdbError {
    /// out of memory while growing an object table
    OutOfMemory,

    /// I/O failure at byte offset {offset}: {source}
    Io { offset: u64, source: io::Error },

    /// stream magic mismatch: expected {expected:08X}, found {found:08X}
    BadMagic { expected: u32, found: u32 },

    /// unsupported schema version {major}.{minor} (this build supports up to {max_major}.{max_minor})
    UnsupportedVersion { major: u16, minor: u16, max_major: u16, max_minor: u16 },

    /// checksum mismatch in section {section} at byte offset {offset}: expected {expected:08X}, computed {computed:08X}
    ChecksumMismatch { section: &'static str, offset: u64, expected: u32, computed: u32 },

    /// malformed stream: {0}
    #[display(inner)]
    Format(FormatError),

    /// unknown wire opcode {0:#04x}
    UnknownOpcode(u8),

    /// reference to a dangling or out-of-range object id {0:?}
    DanglingId(crate::oid::Oid),
}

impl From<io::Error> for OdbError {
    fn from(source: io::Error) -> Self { OdbError::Io { offset: 0, source } }
}

impl std::error::Error for OdbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OdbError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Structural malformations of a stream which are not simple I/O failures.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum FormatError {
    /// truncated stream: expected {expected} more bytes, found {found}
    Truncated { expected: usize, found: usize },

    /// section {0} appeared out of the required dependency order
    SectionOutOfOrder(&'static str),

    /// varint exceeds 64 bits
    VarintOverflow,
}

/// Assertion macro for invariants the core must never violate in a correct caller. Panics in
/// debug builds; in release builds the check is compiled out but the invariant must still hold
/// (mirrors the teacher's use of `debug_assert_eq!` around raw id decoding).
#[macro_export]
macro_rules! assert_invariant {
    ($cond:expr, $($arg:tt)+) => {
        debug_assert!($cond, $($arg)+);
    };
}
