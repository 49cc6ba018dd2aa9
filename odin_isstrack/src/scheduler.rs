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

//! the tracker loop. Each cycle samples a position and, every `refresh_stride` samples, renders and
//! displays a frame. Cycles start every `sampling_interval`: the wait at the end of a cycle is reduced
//! by the time the cycle already took (drift compensation).
//!
//! ```text
//!   Idle ─► Sampling ─► (Rendering) ─► Waiting ─► Sampling ─► ...
//!                 └──────────┴────────────┴──► ShuttingDown ─► Terminated   (cancel or fatal error)
//! ```
//! Sampling, rendering and waiting are strictly sequential. Cancellation is checked at every await point,
//! and all paths out of the loop go through the same (idempotent) shutdown that powers off the display.

use std::{fmt, sync::Arc, time::{Duration,Instant}};
use tokio_util::sync::CancellationToken;
use tracing::{debug,info,warn,error};
use crate::clock::Clock;
use crate::display::DisplaySink;
use crate::provider::PositionProvider;
use crate::renderer::{Renderer,RenderedFrame};
use crate::trajectory::{TrajectoryStore,WindowPolicy};
use crate::datetime::{fmt_secs,local_hour};
use crate::errors::{Result,OdinIssTrackError,op_failed};

/* #region scheduling decisions ****************************************************************************/

/// do we refresh the display after sample number `sample_count` (1-based)? This is the case for the first
/// sample and every `refresh_stride`-th sample thereafter (1, 1+n, 1+2n, ..), or for every sample if the stride is 1
pub fn is_refresh_due (sample_count: usize, refresh_stride: usize)->bool {
    refresh_stride <= 1 || sample_count % refresh_stride == 1
}

/// how long to wait after a cycle that took `elapsed`, so that cycles start every `interval`. Never negative
pub fn wait_time (interval: Duration, elapsed: Duration)->Duration {
    interval.saturating_sub( elapsed)
}

/* #endregion scheduling decisions */

#[derive(Debug,Clone)]
pub struct SchedulerConfig {
    pub sampling_interval: Duration,
    pub refresh_stride: usize,
    pub window: WindowPolicy,
    pub max_consecutive_failures: u32,
    pub settle_time: Duration,
    pub display_timeout: Duration,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SchedulerState {
    Idle,
    Sampling,
    Rendering,
    Waiting,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt( self, f)
    }
}

/// what happened in a single cycle
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum CycleOutcome {
    /// got a new sample, display was not due
    Sampled,
    /// got a new sample and refreshed the display (successfully or not)
    Refreshed { ok: bool },
    /// position request failed, nothing was stored
    Skipped,
    Cancelled,
}

#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct SchedulerStats {
    pub samples: usize,
    pub failed_samples: usize,
    pub refreshes: usize,
    pub failed_refreshes: usize,
}

pub struct Scheduler<P,S> where P: PositionProvider, S: DisplaySink {
    config: SchedulerConfig,
    provider: P,
    sink: S,
    renderer: Renderer,
    store: TrajectoryStore,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,

    state: SchedulerState,
    sample_count: usize,
    last_sample: Option<Instant>,
    consecutive_failures: u32,
    stats: SchedulerStats,
    is_shut_down: bool,
}

impl<P,S> Scheduler<P,S> where P: PositionProvider, S: DisplaySink {
    pub fn new (config: SchedulerConfig, provider: P, sink: S, renderer: Renderer, store: TrajectoryStore,
                clock: Arc<dyn Clock>, cancel: CancellationToken)->Self {
        Scheduler {
            config, provider, sink, renderer, store, clock, cancel,
            state: SchedulerState::Idle,
            sample_count: 0,
            last_sample: None,
            consecutive_failures: 0,
            stats: SchedulerStats::default(),
            is_shut_down: false,
        }
    }

    pub fn state (&self)->SchedulerState { self.state }
    pub fn store (&self)->&TrajectoryStore { &self.store }
    pub fn sample_count (&self)->usize { self.sample_count }
    pub fn last_sample (&self)->Option<Instant> { self.last_sample }
    pub fn stats (&self)->SchedulerStats { self.stats }
    pub fn provider (&self)->&P { &self.provider }
    pub fn sink (&self)->&S { &self.sink }
    pub fn cancellation_token (&self)->CancellationToken { self.cancel.clone() }

    fn set_state (&mut self, state: SchedulerState) {
        if state != self.state {
            debug!("scheduler state {} -> {}", self.state, state);
            self.state = state;
        }
    }

    /// run cycles until cancelled or until a fatal error occurs. Both ways end with [`Self::shutdown`]
    pub async fn run (&mut self)->Result<()> {
        info!("starting tracker loop (sampling every {}, display refresh every {} samples, {} visible samples)",
              fmt_secs(&self.config.sampling_interval), self.config.refresh_stride, self.config.window.visible_count());

        let cancel = self.cancel.clone();
        let res = loop {
            if cancel.is_cancelled() { break Ok(()) }

            let cycle_start = self.clock.now();
            match self.run_cycle().await {
                Ok(CycleOutcome::Cancelled) => break Ok(()),
                Ok(_) => {}
                Err(e) => {
                    error!("terminating tracker loop: {e}");
                    break Err(e)
                }
            }

            let wait = wait_time( self.config.sampling_interval, self.clock.now().saturating_duration_since( cycle_start));
            self.set_state( SchedulerState::Waiting);
            let clock = self.clock.clone();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                _ = clock.sleep( wait) => {}
            }
        };

        self.shutdown().await;
        res
    }

    /// one Sampling (+ Rendering) step without the subsequent wait
    pub async fn run_cycle (&mut self)->Result<CycleOutcome> {
        let cancel = self.cancel.clone();
        self.set_state( SchedulerState::Sampling);

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(CycleOutcome::Cancelled),
            res = self.provider.fetch_position() => res
        };

        match fetched {
            Ok(pos) => {
                let idx = self.store.append( pos);
                self.sample_count += 1;
                self.stats.samples += 1;
                self.consecutive_failures = 0;
                self.last_sample = Some( self.clock.now());
                info!("fetched new position {} (sample {})", pos, idx);
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.stats.failed_samples += 1;
                warn!("failed to get position ({} in a row): {}", self.consecutive_failures, e);

                let max_failures = self.config.max_consecutive_failures;
                if !e.is_transient() || (max_failures > 0 && self.consecutive_failures >= max_failures) {
                    return Err( op_failed!("giving up after {} failed position request(s), last error: {}", self.consecutive_failures, e))
                }
                return Ok(CycleOutcome::Skipped)
            }
        }

        if is_refresh_due( self.sample_count, self.config.refresh_stride) {
            self.set_state( SchedulerState::Rendering);

            let t0 = self.clock.now();
            info!("updating display ...");
            let hour = local_hour( &self.clock.local_time());
            let frame = self.renderer.render( &self.store.visible_window( &self.config.window), hour);

            let sink = &mut self.sink;
            let clock = self.clock.as_ref();
            let refresh = tokio::time::timeout( self.config.display_timeout, show_frame( sink, clock, &frame, self.config.settle_time));
            let res = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(CycleOutcome::Cancelled),
                res = refresh => res.unwrap_or_else( |_| Err( OdinIssTrackError::Timeout( format!("display refresh exceeded {:?}", self.config.display_timeout))))
            };

            self.stats.refreshes += 1;
            match res {
                Ok(()) => {
                    info!("updated display in {}", fmt_secs( &self.clock.now().saturating_duration_since(t0)));
                    Ok(CycleOutcome::Refreshed { ok: true })
                }
                Err(e) => { // a display hiccup does not affect the trajectory, keep sampling
                    self.stats.failed_refreshes += 1;
                    error!("display update failed: {e}");
                    Ok(CycleOutcome::Refreshed { ok: false })
                }
            }
        } else {
            Ok(CycleOutcome::Sampled)
        }
    }

    /// power off the display. Only the first call has an effect
    pub async fn shutdown (&mut self) {
        if self.is_shut_down { return }
        self.is_shut_down = true;
        self.set_state( SchedulerState::ShuttingDown);

        info!("Goodbye!");
        match tokio::time::timeout( self.config.display_timeout, self.sink.power_off()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("failed to power off display: {e}"),
            Err(_) => error!("timeout powering off display"),
        }
        warn!("remember to clear the display (clear_display) before powering down and storing it, to prevent burn-in!");

        self.set_state( SchedulerState::Terminated);
    }
}

/// the panel refresh sequence: wake up, display, let it settle, back to sleep.
/// We try to put the panel back to sleep even if displaying failed
async fn show_frame<S: DisplaySink> (sink: &mut S, clock: &dyn Clock, frame: &RenderedFrame, settle_time: Duration)->Result<()> {
    sink.init().await?;

    let res = sink.display( &frame.basemap, &frame.trajectory).await;
    if res.is_ok() && !settle_time.is_zero() {
        clock.sleep( settle_time).await;
    }

    let sleep_res = sink.sleep().await;
    res.and( sleep_res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::secs;

    #[test]
    fn test_refresh_due () {
        let due: Vec<usize> = (1..=10).filter( |n| is_refresh_due( *n, 3)).collect();
        assert_eq!( due, vec![1,4,7,10]);

        assert!( (1..=5).all( |n| is_refresh_due( n, 1)));

        let due: Vec<usize> = (1..=6).filter( |n| is_refresh_due( *n, 2)).collect();
        assert_eq!( due, vec![1,3,5]);
    }

    #[test]
    fn test_wait_time () {
        assert_eq!( wait_time( secs(30), secs(12)), secs(18));
        assert_eq!( wait_time( secs(30), secs(45)), Duration::ZERO);
    }
}
