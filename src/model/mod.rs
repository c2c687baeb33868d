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

//! Data-model schema (C5): one record struct per object type tag, plus the chains each
//! participates in. See spec §3 and §4.3. `crate::db` is what actually allocates these records in
//! [`crate::page::Table`]s and links them into their owner chains; this module only defines the
//! record layouts and their local (non-owning) helper methods.

pub mod block;
pub mod enums;
pub mod inst;
pub mod library;
pub mod net;
pub mod shape;
pub mod tech;
pub mod term;
pub mod via;
