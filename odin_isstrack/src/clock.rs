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

//! time source abstraction for the scheduler. [`SystemClock`] is the wall clock, [`SimClock`] is a
//! simulated clock that only advances when it is told to (or when somebody sleeps on it), which
//! lets us run many scheduler cycles without waiting for them

use std::{sync::Mutex, time::{Duration,Instant}};
use async_trait::async_trait;
use chrono::{DateTime,Local,TimeDelta};

#[async_trait]
pub trait Clock: Send + Sync {
    /// monotonic time, used to measure cycle durations
    fn now (&self)->Instant;

    /// local wall clock time
    fn local_time (&self)->DateTime<Local>;

    async fn sleep (&self, dur: Duration);
}

#[derive(Debug,Clone,Copy,Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now (&self)->Instant { Instant::now() }

    fn local_time (&self)->DateTime<Local> { Local::now() }

    async fn sleep (&self, dur: Duration) {
        tokio::time::sleep( dur).await
    }
}

/* #region SimClock ****************************************************************************************/

#[derive(Debug)]
pub struct SimClock {
    base: Instant,
    base_time: DateTime<Local>,
    state: Mutex<SimClockState>,
}

#[derive(Debug,Default)]
struct SimClockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl SimClock {
    pub fn new (start_time: DateTime<Local>)->Self {
        SimClock { base: Instant::now(), base_time: start_time, state: Mutex::new( SimClockState::default()) }
    }

    /// move simulated time forward, e.g. to model the duration of a blocking call
    pub fn advance (&self, dur: Duration) {
        self.with_state( |s| s.elapsed += dur)
    }

    pub fn elapsed (&self)->Duration {
        self.with_state( |s| s.elapsed)
    }

    /// all durations we were asked to sleep, in order
    pub fn sleeps (&self)->Vec<Duration> {
        self.with_state( |s| s.sleeps.clone())
    }

    fn with_state<F,T> (&self, f: F)->T where F: FnOnce(&mut SimClockState)->T {
        let mut state = self.state.lock().unwrap_or_else( |poisoned| poisoned.into_inner());
        f( &mut state)
    }
}

impl Default for SimClock {
    fn default()->Self { SimClock::new( Local::now()) }
}

#[async_trait]
impl Clock for SimClock {
    fn now (&self)->Instant {
        self.base + self.elapsed()
    }

    fn local_time (&self)->DateTime<Local> {
        let dt = TimeDelta::from_std( self.elapsed()).unwrap_or( TimeDelta::zero());
        self.base_time + dt
    }

    /// returns immediately after advancing simulated time. We still yield so that other tasks
    /// (e.g. a cancellation) get a chance to run
    async fn sleep (&self, dur: Duration) {
        self.with_state( |s| {
            s.sleeps.push( dur);
            s.elapsed += dur;
        });
        tokio::task::yield_now().await;
    }
}

/* #endregion SimClock */
