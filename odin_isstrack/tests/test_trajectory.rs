/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use odin_isstrack::{geo::GeoPosition, trajectory::*, datetime::{secs,minutes}};

/// a fake ground track that moves 1 deg east per sample
fn sample (i: usize)->GeoPosition {
    let lon = ((i % 360) as f64) - 180.0;
    let lat = 50.0 * (i as f64 / 30.0).sin();
    GeoPosition::new( lat, lon).unwrap()
}

#[test]
fn test_visible_count () {
    assert_eq!( visible_count( 1.0, minutes(90), secs(30)), 180);
    assert_eq!( visible_count( 1.0, minutes(90), secs(15)), 360);
    assert_eq!( visible_count( 0.5, minutes(90), secs(30)), 90);
    assert_eq!( visible_count( 0.7, minutes(90), secs(45)), 84);
    assert_eq!( visible_count( 2.5, minutes(90), secs(30)), 450);

    // never less than one
    assert_eq!( visible_count( 0.001, minutes(90), secs(30)), 1);

    let policy = WindowPolicy::new( secs(30), 1.0).with_orbit_period( minutes(60));
    assert_eq!( policy.visible_count(), 120);
}

#[test]
fn test_window () {
    let mut store = TrajectoryStore::new();
    for i in 0..500 {
        assert_eq!( store.append( sample(i)), i);
    }
    assert_eq!( store.total_samples(), 500);

    let policy = WindowPolicy::new( secs(15), 1.0);
    let window = store.visible_window( &policy);
    assert_eq!( window.len(), 360);
    assert_eq!( window.first_index(), 140);
    assert_eq!( window.newest_index(), Some(499));
    assert_eq!( window.newest().map( |(_,p)| *p), Some( sample(499)));

    let indices: Vec<usize> = window.iter().map( |(i,_)| i).collect();
    assert_eq!( indices, (140..500).collect::<Vec<usize>>());

    let (i,p) = window.iter_newest_first().next().unwrap();
    assert_eq!( (i,*p), (499, sample(499)));

    // the full history is still there
    assert_eq!( store.get(0), Some( &sample(0)));
}

#[test]
fn test_short_history () {
    let mut store = TrajectoryStore::new();
    assert!( store.window( 180).is_empty());
    assert_eq!( store.window( 180).newest_index(), None);

    for i in 0..5 { store.append( sample(i)); }
    let window = store.window( 180);
    assert_eq!( window.len(), 5);
    assert_eq!( window.first_index(), 0);
}

#[test]
fn test_compaction () {
    let mut store = TrajectoryStore::with_compaction( 100);
    for i in 0..500 {
        assert_eq!( store.append( sample(i)), i);
        assert!( store.retained_samples() <= 200);
    }
    assert_eq!( store.total_samples(), 500);
    assert!( store.first_retained_index() > 0);

    // compaction does not change absolute indices or the visible window
    let window = store.window( 100);
    assert_eq!( window.len(), 100);
    assert_eq!( window.first_index(), 400);
    assert_eq!( window.positions()[0], sample(400));
    assert_eq!( store.get( 499), Some( &sample(499)));
    assert_eq!( store.get( 0), None);

    let mut store = TrajectoryStore::new();
    for i in 0..50 { store.append( sample(i)); }
    assert_eq!( store.compact( 10), 40);
    assert_eq!( store.compact( 10), 0);
    assert_eq!( store.first_retained_index(), 40);
    assert_eq!( store.newest().map( |(i,_)| i), Some(49));

    // a window larger than what is retained only covers the retained samples
    let window = store.window( 30);
    assert_eq!( window.first_index(), 40);
    assert_eq!( window.len(), 10);
}
