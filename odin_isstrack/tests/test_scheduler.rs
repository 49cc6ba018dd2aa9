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

use std::{sync::Arc, time::Duration};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use odin_isstrack::{
    OdinIssTrackError, Result,
    geo::{GeoPosition,EquirectangularMap},
    trajectory::{TrajectoryStore,WindowPolicy},
    basemap::{Basemap,BasemapInversion,PositionIcon},
    raster::RasterLayer,
    renderer::Renderer,
    provider::PositionProvider,
    display::DisplaySink,
    clock::{Clock,SimClock,SystemClock},
    scheduler::*,
    datetime::{secs,millis}
};

/* #region test fixtures ***********************************************************************************/

/// moves 3 deg east per request. Requests listed in `failing` (1-based) fail
struct TestProvider {
    n_requests: usize,
    failing: Vec<usize>,
    fatal: bool,
    hang: bool,
    cancel_at: Option<(usize,CancellationToken)>,
}

impl TestProvider {
    fn new ()->Self { TestProvider { n_requests: 0, failing: Vec::new(), fatal: false, hang: false, cancel_at: None } }

    fn failing (mut self, requests: &[usize])->Self { self.failing = requests.to_vec(); self }

    fn always_failing ()->Self { TestProvider::new().failing( &(1..1000).collect::<Vec<usize>>()) }

    fn cancel_at (mut self, request: usize, token: CancellationToken)->Self { self.cancel_at = Some((request,token)); self }
}

#[async_trait]
impl PositionProvider for TestProvider {
    async fn fetch_position (&mut self)->Result<GeoPosition> {
        self.n_requests += 1;
        if self.hang { tokio::time::sleep( secs(30)).await }
        if let Some((n,token)) = &self.cancel_at {
            if *n == self.n_requests { token.cancel() }
        }

        if self.failing.contains( &self.n_requests) {
            if self.fatal {
                Err( OdinIssTrackError::ConfigError("bad provider setup".into()))
            } else {
                Err( OdinIssTrackError::InvalidPosition("no position".into()))
            }
        } else {
            let lon = ((self.n_requests * 3) % 360) as f64 - 180.0;
            GeoPosition::new( 10.0, lon)
        }
    }
}

/// records calls. If it has a clock it advances it by `refresh_time` for each display call
struct TestSink {
    calls: Vec<&'static str>,
    clock: Option<Arc<SimClock>>,
    refresh_time: Duration,
    fail_display: bool,
    hang_display: bool,
    n_frames: usize,
}

impl TestSink {
    fn new ()->Self {
        TestSink { calls: Vec::new(), clock: None, refresh_time: Duration::ZERO, fail_display: false, hang_display: false, n_frames: 0 }
    }

    fn with_clock (mut self, clock: Arc<SimClock>, refresh_time: Duration)->Self {
        self.clock = Some(clock);
        self.refresh_time = refresh_time;
        self
    }

    fn count (&self, call: &str)->usize { self.calls.iter().filter( |c| **c == call).count() }
}

#[async_trait]
impl DisplaySink for TestSink {
    async fn init (&mut self)->Result<()> { self.calls.push("init"); Ok(()) }

    async fn display (&mut self, black: &RasterLayer, red: &RasterLayer)->Result<()> {
        self.calls.push("display");
        assert_eq!( black.dimensions(), red.dimensions());

        if let Some(clock) = &self.clock { clock.advance( self.refresh_time) }
        if self.hang_display { tokio::time::sleep( secs(30)).await }

        if self.fail_display {
            Err( OdinIssTrackError::DisplayError("panel busy".into()))
        } else {
            self.n_frames += 1;
            Ok(())
        }
    }

    async fn sleep (&mut self)->Result<()> { self.calls.push("sleep"); Ok(()) }
    async fn clear (&mut self)->Result<()> { self.calls.push("clear"); Ok(()) }
    async fn power_off (&mut self)->Result<()> { self.calls.push("power_off"); Ok(()) }
}

fn config (refresh_stride: usize)->SchedulerConfig {
    SchedulerConfig {
        sampling_interval: secs(30),
        refresh_stride,
        window: WindowPolicy::new( secs(30), 1.0),
        max_consecutive_failures: 5,
        settle_time: Duration::ZERO,
        display_timeout: secs(5),
    }
}

fn renderer ()->Renderer {
    let map = EquirectangularMap::new( 264, 181);
    Renderer::new( Basemap::graticule( map), PositionIcon::satellite(), BasemapInversion::Never, 30)
}

fn scheduler (config: SchedulerConfig, provider: TestProvider, sink: TestSink, clock: Arc<dyn Clock>, cancel: CancellationToken)->Scheduler<TestProvider,TestSink> {
    Scheduler::new( config, provider, sink, renderer(), TrajectoryStore::new(), clock, cancel)
}

/* #endregion test fixtures */

#[tokio::test]
async fn test_refresh_cadence () {
    let clock = Arc::new( SimClock::default());
    let mut sched = scheduler( config(3), TestProvider::new(), TestSink::new(), clock, CancellationToken::new());

    let mut refreshed = Vec::new();
    for n in 1..=10 {
        match sched.run_cycle().await.unwrap() {
            CycleOutcome::Refreshed { ok } => { assert!(ok); refreshed.push(n) }
            CycleOutcome::Sampled => {}
            other => panic!("unexpected cycle outcome {other:?}")
        }
    }

    assert_eq!( refreshed, vec![1,4,7,10]);
    assert_eq!( sched.sample_count(), 10);
    assert_eq!( sched.store().total_samples(), 10);
    assert_eq!( sched.sink().n_frames, 4);
    assert_eq!( &sched.sink().calls[..3], &["init","display","sleep"]);
    assert_eq!( sched.stats().refreshes, 4);
}

#[tokio::test]
async fn test_drift_compensation () {
    let clock = Arc::new( SimClock::default());
    let cancel = CancellationToken::new();
    let provider = TestProvider::new().cancel_at( 5, cancel.clone());
    let sink = TestSink::new().with_clock( clock.clone(), secs(12));
    let mut sched = scheduler( config(3), provider, sink, clock.clone(), cancel);

    sched.run().await.unwrap();

    // refresh cycles (1 and 4) took 12sec, which is subtracted from the wait
    assert_eq!( clock.sleeps(), vec![secs(18), secs(30), secs(30), secs(18)]);
    assert_eq!( clock.elapsed(), secs(4*30));
    assert_eq!( sched.sample_count(), 5);
    assert_eq!( sched.sink().count("power_off"), 1);
    assert_eq!( sched.state(), SchedulerState::Terminated);
}

#[tokio::test]
async fn test_settle_time () {
    let clock = Arc::new( SimClock::default());
    let mut cfg = config(1);
    cfg.settle_time = secs(2);
    let mut sched = scheduler( cfg, TestProvider::new(), TestSink::new(), clock.clone(), CancellationToken::new());

    sched.run_cycle().await.unwrap();
    assert_eq!( clock.sleeps(), vec![secs(2)]);
    assert_eq!( sched.sink().calls, vec!["init","display","sleep"]);
}

#[tokio::test]
async fn test_provider_failures_are_skipped () {
    let clock = Arc::new( SimClock::default());
    let provider = TestProvider::new().failing( &[2,3]);
    let mut sched = scheduler( config(3), provider, TestSink::new(), clock, CancellationToken::new());

    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push( sched.run_cycle().await.unwrap());
    }

    assert_eq!( outcomes, vec![
        CycleOutcome::Refreshed { ok: true },
        CycleOutcome::Skipped,
        CycleOutcome::Skipped,
        CycleOutcome::Sampled,
        CycleOutcome::Sampled,
    ]);
    assert_eq!( sched.sample_count(), 3);
    assert_eq!( sched.store().total_samples(), 3);
    assert_eq!( sched.stats().failed_samples, 2);
}

#[tokio::test]
async fn test_failure_limit () {
    let clock = Arc::new( SimClock::default());
    let mut cfg = config(3);
    cfg.max_consecutive_failures = 3;
    let mut sched = scheduler( cfg, TestProvider::always_failing(), TestSink::new(), clock.clone(), CancellationToken::new());

    let res = sched.run().await;
    assert!( res.is_err());
    assert_eq!( sched.provider().n_requests, 3);
    assert_eq!( clock.sleeps(), vec![secs(30), secs(30)]);
    assert_eq!( sched.sink().calls, vec!["power_off"]);
    assert_eq!( sched.state(), SchedulerState::Terminated);
}

#[tokio::test]
async fn test_fatal_provider_error () {
    let clock = Arc::new( SimClock::default());
    let mut provider = TestProvider::new().failing( &[1]);
    provider.fatal = true;
    let mut sched = scheduler( config(3), provider, TestSink::new(), clock, CancellationToken::new());

    assert!( sched.run_cycle().await.is_err());
    assert!( sched.store().is_empty());
}

#[tokio::test]
async fn test_display_failure_keeps_sampling () {
    let clock = Arc::new( SimClock::default());
    let mut sink = TestSink::new();
    sink.fail_display = true;
    let mut sched = scheduler( config(2), TestProvider::new(), sink, clock, CancellationToken::new());

    assert_eq!( sched.run_cycle().await.unwrap(), CycleOutcome::Refreshed { ok: false });
    assert_eq!( sched.run_cycle().await.unwrap(), CycleOutcome::Sampled);
    assert_eq!( sched.run_cycle().await.unwrap(), CycleOutcome::Refreshed { ok: false });

    assert_eq!( sched.sample_count(), 3);
    assert_eq!( sched.stats().failed_refreshes, 2);
    assert_eq!( sched.sink().count("sleep"), 2); // panel is put back to sleep even after failures
}

#[tokio::test]
async fn test_display_timeout () {
    let clock = Arc::new( SimClock::default());
    let mut cfg = config(1);
    cfg.display_timeout = millis(50);
    let mut sink = TestSink::new();
    sink.hang_display = true;
    let mut sched = scheduler( cfg, TestProvider::new(), sink, clock, CancellationToken::new());

    let res = tokio::time::timeout( secs(5), sched.run_cycle()).await.unwrap();
    assert_eq!( res.unwrap(), CycleOutcome::Refreshed { ok: false });
    assert_eq!( sched.store().total_samples(), 1);
}

#[tokio::test]
async fn test_cancel_during_wait () {
    let cancel = CancellationToken::new();
    let mut sched = scheduler( config(3), TestProvider::new(), TestSink::new(), Arc::new(SystemClock), cancel.clone());

    tokio::spawn( async move {
        tokio::time::sleep( millis(200)).await;
        cancel.cancel();
    });

    // the first wait would take 30sec
    let res = tokio::time::timeout( secs(5), sched.run()).await;
    assert!( matches!( res, Ok(Ok(()))));

    assert_eq!( sched.sample_count(), 1);
    assert_eq!( sched.sink().count("power_off"), 1);
    assert_eq!( sched.state(), SchedulerState::Terminated);

    // shutdown is idempotent
    sched.shutdown().await;
    assert_eq!( sched.sink().count("power_off"), 1);
}

#[tokio::test]
async fn test_cancel_before_start () {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let clock = Arc::new( SimClock::default());
    let mut sched = scheduler( config(3), TestProvider::new(), TestSink::new(), clock, cancel);

    sched.run().await.unwrap();
    assert_eq!( sched.provider().n_requests, 0);
    assert_eq!( sched.sink().calls, vec!["power_off"]);
}

#[tokio::test]
async fn test_cancel_during_display () {
    let cancel = CancellationToken::new();
    let mut sink = TestSink::new();
    sink.hang_display = true;
    let mut sched = scheduler( config(3), TestProvider::new(), sink, Arc::new(SystemClock), cancel.clone());

    tokio::spawn( async move {
        tokio::time::sleep( millis(100)).await;
        cancel.cancel();
    });

    // display hangs for 30sec, display timeout is 5sec
    let res = tokio::time::timeout( secs(3), sched.run()).await;
    assert!( matches!( res, Ok(Ok(()))));

    assert_eq!( sched.sink().calls, vec!["init","display","power_off"]);
    assert_eq!( sched.stats().refreshes, 0);
    assert_eq!( sched.store().total_samples(), 1);
    assert_eq!( sched.state(), SchedulerState::Terminated);
}

#[tokio::test]
async fn test_cancel_during_fetch () {
    let cancel = CancellationToken::new();
    let mut provider = TestProvider::new();
    provider.hang = true;
    let mut sched = scheduler( config(3), provider, TestSink::new(), Arc::new(SystemClock), cancel.clone());

    tokio::spawn( async move {
        tokio::time::sleep( millis(100)).await;
        cancel.cancel();
    });

    let res = tokio::time::timeout( secs(3), sched.run()).await;
    assert!( matches!( res, Ok(Ok(()))));

    assert_eq!( sched.provider().n_requests, 1);
    assert!( sched.store().is_empty());
    assert_eq!( sched.sink().calls, vec!["power_off"]);
    assert_eq!( sched.state(), SchedulerState::Terminated);
}
