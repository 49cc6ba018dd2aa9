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

//! the trajectory history. Samples are only ever appended, and what gets rendered is a *view* (window)
//! of the most recent samples. Each sample keeps its absolute index (counted since program start), which
//! is what marker decimation is based on. Dropping old samples from the view does not change these indices,
//! and neither does the optional explicit compaction of the physical buffer.

use std::time::Duration;
use crate::geo::GeoPosition;
use crate::datetime::LEO_ORBIT_PERIOD;

/* #region window policy ***********************************************************************************/

/// how much of the trajectory history is visible: `max_orbits` orbits of `orbit_period`, sampled every `sampling_interval`
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct WindowPolicy {
    pub sampling_interval: Duration,
    pub max_orbits: f64,
    pub orbit_period: Duration,
}

impl WindowPolicy {
    pub fn new (sampling_interval: Duration, max_orbits: f64)->Self {
        WindowPolicy { sampling_interval, max_orbits, orbit_period: LEO_ORBIT_PERIOD }
    }

    pub fn with_orbit_period (mut self, orbit_period: Duration)->Self {
        self.orbit_period = orbit_period;
        self
    }

    pub fn visible_count (&self)->usize {
        visible_count( self.max_orbits, self.orbit_period, self.sampling_interval)
    }
}

/// number of samples covering `max_orbits` orbits: floor(max_orbits * orbit_period / sampling_interval).
/// This is never less than 1 so that the newest sample is always visible
pub fn visible_count (max_orbits: f64, orbit_period: Duration, sampling_interval: Duration)->usize {
    let dt = sampling_interval.as_secs_f64();
    if dt <= 0.0 { return 1 }

    let n = max_orbits * orbit_period.as_secs_f64() / dt;
    if n.is_finite() && n >= 1.0 {
        (n + 1e-9).floor() as usize // don't lose a sample to floating point noise (e.g. 0.7 * 5400 / 45)
    } else {
        1
    }
}

/* #endregion window policy */

/* #region store *******************************************************************************************/

/// upper bound for `max_retained_samples` (about 10 years of 30sec samples)
pub const MAX_RETAINED_SAMPLES: usize = 10_000_000;

#[derive(Debug,Default)]
pub struct TrajectoryStore {
    samples: Vec<GeoPosition>,
    base_index: usize, // absolute index of samples[0], only changes through compaction
    max_retained: Option<usize>,
}

impl TrajectoryStore {
    /// a store that never drops samples
    pub fn new ()->Self {
        TrajectoryStore { samples: Vec::new(), base_index: 0, max_retained: None }
    }

    /// a store that compacts its buffer down to `max_retained` samples once it holds more than twice that many.
    /// Callers have to make sure `max_retained` is not less than the visible count of the window they request
    pub fn with_compaction (max_retained: usize)->Self {
        TrajectoryStore { samples: Vec::new(), base_index: 0, max_retained: Some(max_retained.max(1)) }
    }

    /// append a new sample and return its absolute index
    pub fn append (&mut self, pos: GeoPosition)->usize {
        let idx = self.total_samples();
        self.samples.push( pos);

        if let Some(max_retained) = self.max_retained {
            if self.samples.len() > max_retained.saturating_mul(2) {
                self.compact( max_retained);
            }
        }
        idx
    }

    /// drop all but the `retain` most recent samples from the buffer. Absolute indices of the remaining
    /// samples do not change. Returns the number of dropped samples
    pub fn compact (&mut self, retain: usize)->usize {
        let len = self.samples.len();
        if len > retain {
            let n_drop = len - retain;
            self.samples.drain( ..n_drop);
            self.base_index += n_drop;
            n_drop
        } else {
            0
        }
    }

    /// number of samples appended since creation (including compacted ones)
    pub fn total_samples (&self)->usize { self.base_index + self.samples.len() }

    /// number of samples currently held in memory
    pub fn retained_samples (&self)->usize { self.samples.len() }

    pub fn first_retained_index (&self)->usize { self.base_index }

    pub fn is_empty (&self)->bool { self.samples.is_empty() }

    pub fn newest (&self)->Option<(usize,&GeoPosition)> {
        self.samples.last().map( |p| (self.total_samples()-1, p))
    }

    /// get a sample by its absolute index, if it is still retained
    pub fn get (&self, idx: usize)->Option<&GeoPosition> {
        if idx >= self.base_index { self.samples.get( idx - self.base_index) } else { None }
    }

    /// the most recent `visible_count` samples (or all of them if there are fewer)
    pub fn window (&self, visible_count: usize)->TrajectoryWindow<'_> {
        let cutoff = self.total_samples().saturating_sub( visible_count).max( self.base_index);
        let start = cutoff - self.base_index;
        TrajectoryWindow { positions: &self.samples[start..], first_index: cutoff }
    }

    pub fn visible_window (&self, policy: &WindowPolicy)->TrajectoryWindow<'_> {
        self.window( policy.visible_count())
    }
}

/* #endregion store */

/* #region window ******************************************************************************************/

/// read-only view of the most recent trajectory samples, oldest first
#[derive(Debug,Clone,Copy)]
pub struct TrajectoryWindow<'a> {
    positions: &'a [GeoPosition],
    first_index: usize,
}

impl<'a> TrajectoryWindow<'a> {
    /// a window over an arbitrary slice whose first element has absolute index `first_index`
    pub fn new (positions: &'a [GeoPosition], first_index: usize)->Self {
        TrajectoryWindow { positions, first_index }
    }

    pub fn empty ()->Self {
        TrajectoryWindow { positions: &[], first_index: 0 }
    }

    pub fn len (&self)->usize { self.positions.len() }
    pub fn is_empty (&self)->bool { self.positions.is_empty() }

    pub fn positions (&self)->&'a [GeoPosition] { self.positions }

    /// absolute index of the oldest sample in the window
    pub fn first_index (&self)->usize { self.first_index }

    /// absolute index of the newest sample in the window
    pub fn newest_index (&self)->Option<usize> {
        if self.positions.is_empty() { None } else { Some( self.first_index + self.positions.len() - 1) }
    }

    pub fn newest (&self)->Option<(usize,&'a GeoPosition)> {
        self.positions.last().map( |p| (self.first_index + self.positions.len() - 1, p))
    }

    /// (absolute index, position) pairs, oldest first
    pub fn iter (&self)->impl DoubleEndedIterator<Item=(usize,&'a GeoPosition)> + 'a {
        let first = self.first_index;
        self.positions.iter().enumerate().map( move |(i,p)| (first + i, p))
    }

    /// (absolute index, position) pairs, newest first
    pub fn iter_newest_first (&self)->impl Iterator<Item=(usize,&'a GeoPosition)> + 'a {
        self.iter().rev()
    }
}

/* #endregion window */
