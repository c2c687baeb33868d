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

//! Object identifiers (C1): a stable 32-bit id, a null sentinel, and a phantom-typed wrapper so
//! callers can't mix up ids belonging to different record kinds at the type level.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Raw 32-bit object id. `0` is the null sentinel; nonzero values are opaque indices into a
/// per-type [`crate::page::Table`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
#[display("#{0:08X}")]
pub struct Oid(u32);

impl Oid {
    pub const NULL: Oid = Oid(0);

    pub const fn new(raw: u32) -> Self { Oid(raw) }

    pub const fn is_null(&self) -> bool { self.0 == 0 }

    pub const fn raw(&self) -> u32 { self.0 }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Oid({:#010x})", self.0) }
}

/// A [`Oid`] paired with a phantom record-kind marker, so e.g. a net's id and an instance's id
/// are distinct types even though both are backed by a `u32`. `T` never appears in any stored
/// byte, so the wrapper is always `Copy`/`Send`/`Sync` regardless of `T`.
pub struct Id<T> {
    oid: Oid,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const NULL: Id<T> = Id { oid: Oid::NULL, _marker: PhantomData };

    pub const fn new(raw: u32) -> Self { Id { oid: Oid::new(raw), _marker: PhantomData } }

    pub const fn from_oid(oid: Oid) -> Self { Id { oid, _marker: PhantomData } }

    pub const fn oid(self) -> Oid { self.oid }

    pub const fn raw(self) -> u32 { self.oid.raw() }

    pub const fn is_null(self) -> bool { self.oid.is_null() }
}

impl<T> Copy for Id<T> {}
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self { *self }
}
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool { self.oid == other.oid }
}
impl<T> Eq for Id<T> {}
impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}
impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering { self.oid.cmp(&other.oid) }
}
impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.oid.hash(state) }
}
impl<T> Default for Id<T> {
    fn default() -> Self { Self::NULL }
}
impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({:?})", self.oid)
    }
}
impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.oid, f) }
}
impl<T> From<Oid> for Id<T> {
    fn from(oid: Oid) -> Self { Id::from_oid(oid) }
}
impl<T> From<Id<T>> for Oid {
    fn from(id: Id<T>) -> Self { id.oid }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Net;
    struct Inst;

    #[test]
    fn null_is_zero() {
        assert!(Oid::NULL.is_null());
        assert_eq!(Oid::NULL.raw(), 0);
        assert!(Id::<Net>::NULL.is_null());
    }

    #[test]
    fn typed_ids_are_copy_and_comparable() {
        let a: Id<Net> = Id::new(5);
        let b: Id<Net> = a;
        assert_eq!(a, b);
        assert!(a < Id::<Net>::new(6));
    }

    #[test]
    fn distinct_phantom_types_do_not_coerce() {
        let n: Id<Net> = Id::new(1);
        let i: Id<Inst> = Id::new(1);
        // same raw oid, different static types -- this just asserts both exist independently
        assert_eq!(n.raw(), i.raw());
    }
}
