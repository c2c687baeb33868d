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

//! End-to-end scenarios exercised only through the crate's public API, as an external consumer
//! would use it. Scenarios 4, 5, 6 are exercised as module-internal unit tests (`wire.rs`,
//! `db/parasitics.rs`) since they need `pub(crate)` field access; scenarios 1 and 3 have unit-level
//! counterparts too (`db/netlist.rs`) but are repeated here against the public surface only.

use odb::codec::{read_database, write_database};
use odb::model::enums::IoType::{Input, Output};
use odb::model::enums::SignalType::Signal;
use odb::Database;

fn build_top() -> (Database, odb::Oid) {
    let mut db = Database::create("scenario");
    db.create_tech(1000).expect("fresh database has no tech yet");
    db.create_layer("M1", 1).expect("fresh tech has no M1 yet");
    db.create_layer("M2", 2).expect("fresh tech has no M2 yet");

    let lib = db.create_lib("L", 1000).expect("fresh database has no L yet");
    let master = db.create_master(lib, "INV_X1").expect("fresh lib has no INV_X1 yet");
    db.create_mterm(master, "A", Input, Signal).expect("master accepts mterms before freeze");
    db.create_mterm(master, "Y", Output, Signal).expect("master accepts mterms before freeze");
    db.freeze_master(master);

    let (_chip, top) = db.create_chip("top", 1000).expect("fresh database has no chip yet");
    db.create_inst(top, master, "u0").expect("fresh block has no u0 yet");
    db.create_inst(top, master, "u1").expect("fresh block has no u1 yet");
    (db, top)
}

/// Scenario 1: two instances of the same master, wired together by one net through their Y/A
/// pins, both land in the net's iterm chain.
#[test]
fn scenario_1_two_iterms_share_a_net() {
    let (mut db, top) = build_top();

    let u0 = db.find_inst(top, "u0").unwrap();
    let u1 = db.find_inst(top, "u1").unwrap();
    let net = db.create_net(top, "n1").expect("fresh block has no n1 yet");
    let y0 = db.iterm_by_name(u0, "Y").unwrap();
    let a1 = db.iterm_by_name(u1, "A").unwrap();
    assert!(db.connect_iterm(y0, net));
    assert!(db.connect_iterm(a1, net));

    let found = db.find_net(top, "n1").expect("just created");
    assert_eq!(found, net);
    assert_eq!(db.iterms_of_net(net).count(), 2);
    for it in db.iterms_of_net(net) {
        assert!(it == y0 || it == a1);
    }
}

/// Scenario 2: a database serialized and read back is equal at the record level -- every id in
/// the original exists in the restored copy with the same type and chain memberships, since every
/// record is restored under its exact original id (`Table::alloc_at`, not a freshly assigned one).
#[test]
fn scenario_2_round_trip_through_byte_buffer_preserves_ids_and_structure() {
    let (mut db, top) = build_top();
    let net = db.create_net(top, "n1").expect("fresh block has no n1 yet");
    let u0 = db.find_inst(top, "u0").unwrap();
    let u1 = db.find_inst(top, "u1").unwrap();
    db.connect_iterm(db.iterm_by_name(u0, "Y").unwrap(), net);
    db.connect_iterm(db.iterm_by_name(u1, "A").unwrap(), net);

    let bytes = write_database(&db);
    let restored = read_database(&bytes).expect("well-formed buffer decodes");

    assert_eq!(restored.name(), db.name());
    let r_top = restored.top_block().expect("block restored");
    assert_eq!(r_top, top);
    let r_net = restored.find_net(r_top, "n1").expect("net restored");
    assert_eq!(r_net, net);
    assert_eq!(restored.iterms_of_net(r_net).count(), 2);
    assert_eq!(restored.find_inst(r_top, "u0"), Some(u0));
    assert_eq!(restored.find_inst(r_top, "u1"), Some(u1));
    let lib = restored.libs_iter().next().expect("lib restored");
    assert_eq!(restored.masters_of(lib).count(), db.masters_of(db.libs_iter().next().unwrap()).count());
}

/// Scenario 3: a rename and a disconnect recorded between `beginEco`/`endEco` replay onto a fresh
/// copy of the pre-recording database and reproduce the same end state.
#[test]
fn scenario_3_eco_replay_reproduces_renamed_and_disconnected_state() {
    let (mut source, top) = build_top();
    let net = source.create_net(top, "n1").expect("fresh block has no n1 yet");
    let u0 = source.find_inst(top, "u0").unwrap();
    let u1 = source.find_inst(top, "u1").unwrap();
    source.connect_iterm(source.iterm_by_name(u0, "Y").unwrap(), net);
    source.connect_iterm(source.iterm_by_name(u1, "A").unwrap(), net);

    // a fresh copy of the database as it stood right before `beginEco`, via the byte-buffer path
    let mut replica = read_database(&write_database(&source)).expect("decode");
    let replica_top = replica.top_block().expect("block restored");

    assert!(source.begin_eco(top));
    assert!(source.rename_net(net, "n2"));
    let a1 = source.iterm_by_name(u1, "A").unwrap();
    assert!(source.disconnect_iterm(a1));
    assert!(source.end_eco(top));
    assert!(!source.eco_empty(top));

    let entries = source.read_eco(top).to_vec();
    assert_eq!(entries.len(), 2);

    assert!(source.write_eco(top, &mut replica, replica_top));
    assert!(source.eco_empty(top));

    assert!(replica.find_net(replica_top, "n2").is_some());
    assert!(replica.find_net(replica_top, "n1").is_none());
    let n2 = replica.find_net(replica_top, "n2").unwrap();
    assert_eq!(replica.iterms_of_net(n2).count(), 1);
    let replayed_u1 = replica.find_inst(replica_top, "u1").unwrap();
    let replayed_a1 = replica.iterm_by_name(replayed_u1, "A").unwrap();
    assert_eq!(replica.iterms_of_net(n2).next(), Some(replica.iterm_by_name(replica.find_inst(replica_top, "u0").unwrap(), "Y").unwrap()));
    assert_ne!(replica.iterms_of_net(n2).next(), Some(replayed_a1));
}
