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

//! tracker configuration. Configs are RON files, e.g. `configs/iss_tracker.ron`:
//! ```ron
//! IssTrackerConfig (
//!     sampling_interval: 30.0,       // seconds between position samples
//!     major_marker_interval: 900.0,  // seconds between two major trajectory markers
//!     refresh_stride: 3,             // refresh display every 3rd sample
//!     max_orbits: 1.0,               // how many past orbits to show
//!     map: ( width: 264, height: 181, basemap: Some("../assets/world_map.bmp"), inversion: EvenHours ),
//! )
//! ```
//! All settings are startup constants. Everything that is checked by [`IssTrackerConfig::validate`] is
//! reported before the tracker starts, never from within the sampling loop

use std::{fs, path::{Path,PathBuf}, time::Duration};
use serde::{Serialize,Deserialize};
use crate::geo::EquirectangularMap;
use crate::trajectory::{TrajectoryStore,WindowPolicy,MAX_RETAINED_SAMPLES};
use crate::basemap::{Basemap,BasemapInversion,PositionIcon};
use crate::renderer::{Renderer,decimation_stride};
use crate::provider::ProviderConfig;
use crate::display::DisplayConfig;
use crate::scheduler::SchedulerConfig;
use crate::datetime::{secs,minutes,LEO_ORBIT_PERIOD,de_duration_from_fractional_secs,ser_duration_as_fractional_secs};
use crate::errors::{Result,OdinIssTrackError,config_error};

/// map dimensions plus the optional basemap image that was prepared for them
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,

    /// basemap image, has to be `width` x `height`. If not set we use a generated graticule
    #[serde(default)]
    pub basemap: Option<PathBuf>,

    #[serde(default)]
    pub inversion: BasemapInversion,
}

impl MapConfig {
    pub fn map (&self)->EquirectangularMap { EquirectangularMap::new( self.width, self.height) }
}

impl Default for MapConfig {
    fn default()->Self {
        MapConfig { width: 264, height: 181, basemap: None, inversion: BasemapInversion::default() }
    }
}

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct IssTrackerConfig {
    #[serde(default="default_sampling_interval", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub sampling_interval: Duration,

    #[serde(default="default_major_marker_interval", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub major_marker_interval: Duration,

    /// number of samples between display refreshes
    #[serde(default="default_refresh_stride")]
    pub refresh_stride: u32,

    /// number of past orbits to display, can be fractional
    #[serde(default="default_max_orbits")]
    pub max_orbits: f64,

    #[serde(default="default_orbit_period", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub orbit_period: Duration,

    /// if set, the trajectory history is compacted to this many samples (has to cover the visible window)
    #[serde(default)]
    pub max_retained_samples: Option<usize>,

    /// give up after this many position requests failed in a row (0: never)
    #[serde(default="default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    #[serde(default)]
    pub map: MapConfig,

    /// current position icon image. If not set we use a built-in satellite glyph
    #[serde(default)]
    pub icon: Option<PathBuf>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_sampling_interval()->Duration { secs(30) }
fn default_major_marker_interval()->Duration { minutes(15) }
fn default_refresh_stride()->u32 { 3 }
fn default_max_orbits()->f64 { 1.0 }
fn default_orbit_period()->Duration { LEO_ORBIT_PERIOD }
fn default_max_consecutive_failures()->u32 { 20 }

impl Default for IssTrackerConfig {
    fn default()->Self {
        IssTrackerConfig {
            sampling_interval: default_sampling_interval(),
            major_marker_interval: default_major_marker_interval(),
            refresh_stride: default_refresh_stride(),
            max_orbits: default_max_orbits(),
            orbit_period: default_orbit_period(),
            max_retained_samples: None,
            max_consecutive_failures: default_max_consecutive_failures(),
            map: MapConfig::default(),
            icon: None,
            provider: ProviderConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl IssTrackerConfig {

    /// check all settings, reporting every violation (not just the first one)
    pub fn validate (&self)->Result<()> {
        let mut errs: Vec<String> = Vec::new();

        if self.sampling_interval.is_zero() { errs.push( "sampling_interval has to be > 0".into()) }
        if self.major_marker_interval.is_zero() { errs.push( "major_marker_interval has to be > 0".into()) }
        if self.refresh_stride == 0 { errs.push( "refresh_stride has to be >= 1".into()) }
        if !self.max_orbits.is_finite() || self.max_orbits <= 0.0 { errs.push( format!("max_orbits has to be > 0 (is {})", self.max_orbits)) }
        if self.orbit_period.is_zero() { errs.push( "orbit_period has to be > 0".into()) }
        if self.map.width == 0 || self.map.height == 0 { errs.push( format!("invalid map dimensions {}", self.map.map())) }

        if self.sampling_interval < self.display.refresh_time {
            errs.push( format!("sampling_interval ({:?}) has to be at least the display refresh_time ({:?})",
                               self.sampling_interval, self.display.refresh_time))
        }
        let refresh_sequence = self.display.refresh_time.saturating_add( self.display.settle_time);
        if self.display.timeout <= refresh_sequence {
            errs.push( format!("display timeout ({:?}) does not exceed refresh_time + settle_time ({:?})",
                               self.display.timeout, refresh_sequence))
        }

        if self.provider.url.trim().is_empty() { errs.push( "provider url is empty".into()) }
        if self.provider.timeout.is_zero() { errs.push( "provider timeout has to be > 0".into()) }

        if let Some(max_retained) = self.max_retained_samples {
            let n_visible = self.window_policy().visible_count();
            if max_retained < n_visible {
                errs.push( format!("max_retained_samples ({max_retained}) does not cover the visible window ({n_visible} samples)"))
            }
            if max_retained > MAX_RETAINED_SAMPLES {
                errs.push( format!("max_retained_samples ({max_retained}) exceeds {MAX_RETAINED_SAMPLES}"))
            }
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err( OdinIssTrackError::ConfigError( errs.join("; ")))
        }
    }

    /// make relative asset paths relative to `base_dir` (normally the directory of the config file)
    pub fn resolve_paths (&mut self, base_dir: &Path) {
        if let Some(path) = &self.map.basemap {
            if path.is_relative() { self.map.basemap = Some( base_dir.join(path)) }
        }
        if let Some(path) = &self.icon {
            if path.is_relative() { self.icon = Some( base_dir.join(path)) }
        }
    }

    pub fn window_policy (&self)->WindowPolicy {
        WindowPolicy::new( self.sampling_interval, self.max_orbits).with_orbit_period( self.orbit_period)
    }

    pub fn decimation_stride (&self)->usize {
        decimation_stride( self.major_marker_interval, self.sampling_interval)
    }

    pub fn scheduler_config (&self)->SchedulerConfig {
        SchedulerConfig {
            sampling_interval: self.sampling_interval,
            refresh_stride: self.refresh_stride as usize,
            window: self.window_policy(),
            max_consecutive_failures: self.max_consecutive_failures,
            settle_time: self.display.settle_time,
            display_timeout: self.display.timeout,
        }
    }

    pub fn create_store (&self)->TrajectoryStore {
        match self.max_retained_samples {
            Some(max_retained) => TrajectoryStore::with_compaction( max_retained),
            None => TrajectoryStore::new()
        }
    }

    /// basemap dimension mismatches are configuration errors
    pub fn load_basemap (&self)->Result<Basemap> {
        let map = self.map.map();
        match &self.map.basemap {
            Some(path) => Basemap::open( path, map).map_err( |e| config_error!("basemap {:?}: {}", path, e)),
            None => Ok( Basemap::graticule( map))
        }
    }

    pub fn load_icon (&self)->Result<PositionIcon> {
        match &self.icon {
            Some(path) => PositionIcon::open( path).map_err( |e| config_error!("icon {:?}: {}", path, e)),
            None => Ok( PositionIcon::satellite())
        }
    }

    pub fn create_renderer (&self)->Result<Renderer> {
        Ok( Renderer::new( self.load_basemap()?, self.load_icon()?, self.map.inversion, self.decimation_stride()) )
    }
}

/// read a RON config file, resolve its asset paths relative to the file location and validate it
pub fn load_config<P: AsRef<Path>> (path: P)->Result<IssTrackerConfig> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err( config_error!("config file not found: {:?}", path))
    }

    let data = fs::read( path)?;
    let mut config: IssTrackerConfig = ron::de::from_bytes( data.as_slice())?;

    if let Some(dir) = path.parent() {
        config.resolve_paths( dir);
    }
    config.validate()?;
    Ok(config)
}
