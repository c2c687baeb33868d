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

//! Session/namespace registry (C12): a process-wide, single-threaded table of live databases'
//! names, so external code can resolve `/D<dbname>/...` path names (§4.8) without holding a
//! reference to every open `Database` itself. See spec §4.10 and §5 ("the session registry is the
//! only process-wide state; it is mutated only on database creation/destruction").
//!
//! The registry only ever stores names, never a `Database` itself: a `Database` is `!Sync` by
//! construction (plain owned value, `&mut self` methods throughout), so the `Mutex` here
//! serializes registration bookkeeping only, never database mutation.

use std::sync::Mutex;

static REGISTRY: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Registers a freshly created database's name. Returns `false` without registering if the name
/// is already taken -- callers are expected to pick a fresh name first via [`unique_name`].
pub fn register(name: &str) -> bool {
    let mut names = REGISTRY.lock().expect("odb: session registry mutex poisoned");
    if names.iter().any(|n| n == name) {
        log::warn!("odb: session registry already has a database named {name:?}");
        return false;
    }
    names.push(name.to_string());
    log::debug!("odb: registered database {name:?}");
    true
}

/// Unregisters a database name on `Database` destruction. No-op if the name was never registered.
pub fn unregister(name: &str) {
    let mut names = REGISTRY.lock().expect("odb: session registry mutex poisoned");
    if let Some(pos) = names.iter().position(|n| n == name) {
        names.remove(pos);
        log::debug!("odb: unregistered database {name:?}");
    }
}

/// `resolveDB(name)` (spec §4.10): `true` if a database with this name is currently registered.
pub fn contains(name: &str) -> bool {
    REGISTRY.lock().expect("odb: session registry mutex poisoned").iter().any(|n| n == name)
}

/// Every currently registered database name, in registration order.
pub fn names() -> Vec<String> {
    REGISTRY.lock().expect("odb: session registry mutex poisoned").clone()
}

/// Picks `base`, or `base_2`, `base_3`, ... until an unregistered name is found -- used by
/// `Database::create` when the caller doesn't care about a specific name collision.
pub fn unique_name(base: &str) -> String {
    if !contains(base) {
        return base.to_string();
    }
    let mut i = 2u32;
    loop {
        let candidate = format!("{base}_{i}");
        if !contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // serializes the tests below since they share the single process-wide registry
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    #[test]
    fn register_unregister_roundtrip() {
        let _guard = TEST_LOCK.lock().unwrap();
        assert!(register("t_roundtrip"));
        assert!(contains("t_roundtrip"));
        unregister("t_roundtrip");
        assert!(!contains("t_roundtrip"));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let _guard = TEST_LOCK.lock().unwrap();
        assert!(register("t_dup"));
        assert!(!register("t_dup"));
        unregister("t_dup");
    }

    #[test]
    fn unique_name_avoids_collisions() {
        let _guard = TEST_LOCK.lock().unwrap();
        register("t_base");
        let u = unique_name("t_base");
        assert_eq!(u, "t_base_2");
        unregister("t_base");
    }
}
