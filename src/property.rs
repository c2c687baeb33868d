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

//! Property engine (C3): named, typed values attached to any object. Keyed by (owner type, owner
//! id, name); names are unique per owner (spec §3, "Property").

use amplify::confinement::TinyString;

use crate::model::enums::ObjectType;
use crate::oid::Oid;

/// A property's value; exactly the four variants spec.md §3 requires.
#[derive(Clone, PartialEq, Debug, Display)]
pub enum PropValue {
    #[display("{0}")]
    Bool(bool),
    #[display("{0}")]
    Int(i32),
    #[display("{0}")]
    Double(f64),
    #[display("{0}")]
    String(String),
}

impl PropValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Bool(_) => "bool",
            PropValue::Int(_) => "int",
            PropValue::Double(_) => "double",
            PropValue::String(_) => "string",
        }
    }
}

/// One (owner, name) -> value property record. `name` is confined to a short string, matching
/// the bounded-collection discipline `amplify::confinement` uses elsewhere in the schema.
#[derive(Clone, Debug)]
pub struct Property {
    pub owner_type: ObjectType,
    pub owner: Oid,
    pub name: TinyString,
    pub value: PropValue,
}

/// All properties in a database, regardless of which object type owns them -- a single flat
/// table keyed by `(owner_type, owner, name)`, matching spec.md's note that the property table
/// has "no owner-type special-casing".
#[derive(Default)]
pub struct PropertyTable {
    entries: Vec<Property>,
}

impl PropertyTable {
    pub fn new() -> Self { PropertyTable::default() }

    fn find_index(&self, owner_type: ObjectType, owner: Oid, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|p| p.owner_type == owner_type && p.owner == owner && p.name.as_str() == name)
    }

    /// Creates a property, or returns `None` if `name` is already used by this owner (name
    /// collision is a recoverable outcome per spec §7, never an `OdbError`).
    pub fn create(
        &mut self,
        owner_type: ObjectType,
        owner: Oid,
        name: &str,
        value: PropValue,
    ) -> Option<()> {
        if self.find_index(owner_type, owner, name).is_some() {
            log::warn!("odb: property {name:?} already exists on {owner_type:?}:{owner}");
            return None;
        }
        let truncated: String = name.chars().take(255).collect();
        self.entries.push(Property {
            owner_type,
            owner,
            name: TinyString::from_checked(truncated),
            value,
        });
        Some(())
    }

    pub fn find(&self, owner_type: ObjectType, owner: Oid, name: &str) -> Option<&PropValue> {
        self.find_index(owner_type, owner, name).map(|i| &self.entries[i].value)
    }

    pub fn set(&mut self, owner_type: ObjectType, owner: Oid, name: &str, value: PropValue) {
        match self.find_index(owner_type, owner, name) {
            Some(i) => self.entries[i].value = value,
            None => {
                self.create(owner_type, owner, name, value);
            }
        }
    }

    pub fn destroy(&mut self, owner_type: ObjectType, owner: Oid, name: &str) -> bool {
        match self.find_index(owner_type, owner, name) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Destroys every property owned by `owner`; called when the owning object is destroyed so
    /// properties never outlive their owner (spec §3 lifecycle: "destroys dependents...").
    pub fn destroy_all_owned_by(&mut self, owner_type: ObjectType, owner: Oid) {
        self.entries.retain(|p| !(p.owner_type == owner_type && p.owner == owner));
    }

    pub fn iter_owned_by(&self, owner_type: ObjectType, owner: Oid) -> impl Iterator<Item = &Property> {
        self.entries.iter().filter(move |p| p.owner_type == owner_type && p.owner == owner)
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &Property> { self.entries.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_duplicate_name_per_owner() {
        let mut props = PropertyTable::new();
        let owner = Oid::new(1);
        assert!(props.create(ObjectType::Net, owner, "WIDTH", PropValue::Int(140)).is_some());
        assert!(props.create(ObjectType::Net, owner, "WIDTH", PropValue::Int(200)).is_none());
        assert_eq!(props.find(ObjectType::Net, owner, "WIDTH"), Some(&PropValue::Int(140)));
    }

    #[test]
    fn same_name_allowed_on_different_owners() {
        let mut props = PropertyTable::new();
        props.create(ObjectType::Net, Oid::new(1), "WIDTH", PropValue::Int(1)).unwrap();
        props.create(ObjectType::Net, Oid::new(2), "WIDTH", PropValue::Int(2)).unwrap();
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn destroy_all_owned_by_removes_only_that_owner() {
        let mut props = PropertyTable::new();
        props.create(ObjectType::Net, Oid::new(1), "A", PropValue::Bool(true)).unwrap();
        props.create(ObjectType::Net, Oid::new(1), "B", PropValue::Bool(false)).unwrap();
        props.create(ObjectType::Net, Oid::new(2), "A", PropValue::Bool(true)).unwrap();
        props.destroy_all_owned_by(ObjectType::Net, Oid::new(1));
        assert_eq!(props.len(), 1);
        assert!(props.find(ObjectType::Net, Oid::new(2), "A").is_some());
    }
}
