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

//! `odb`: an in-memory object database for VLSI physical design data.
//!
//! The crate is organized bottom-up, the same order the component table in the design splits the
//! problem: [`oid`] (stable ids), [`page`] (the paged object table, C2), [`iter`] (the chain/scan
//! set protocol, C4), [`property`] (C3), [`model`] (the schema, C5), [`geom`]/[`wire`] (geometry
//! and the wire opcode codec, C7), [`rc`] (the parasitic graph, C8), [`codec`] (the binary stream
//! format, C6), [`eco`] (the mutation journal, C9), [`name`] (path-name resolution, C10),
//! [`registry`] (the process-wide session table, C12), and [`db`], which wires all of the above
//! into the `Database` aggregate external collaborators actually hold.

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate strict_encoding;
#[macro_use]
extern crate log;

pub mod codec;
pub mod config;
pub mod db;
pub mod eco;
pub mod error;
pub mod geom;
pub mod iter;
pub mod model;
pub mod name;
pub mod oid;
pub mod page;
pub mod property;
pub mod rc;
pub mod registry;
pub mod wire;

/// `strict_encoding` library name tag shared by every type in [`model::enums`] that derives
/// `StrictType`; mirrors the teacher's per-crate `BP_RPC_LIB`-style constant.
pub const LIB_NAME_ODB: &str = "ODB";

pub use config::OdbConfig;
pub use db::Database;
pub use error::OdbError;
pub use oid::{Id, Oid};
