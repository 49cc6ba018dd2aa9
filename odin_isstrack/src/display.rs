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

//! the display side. [`DisplaySink`] is the capability the scheduler uses, modeled after two-color
//! e-paper drivers (init, display two 1bpp buffers, deep sleep, power cut-off).
//! [`ImageFileSink`] is a stand-in that writes frames as image files, which is what we use if there is no
//! panel attached (and for checking output on development machines)

use std::{fs, path::{Path,PathBuf}, time::Duration};
use async_trait::async_trait;
use serde::{Serialize,Deserialize};
use image::{Rgb,RgbImage};
use tokio::{task::spawn_blocking, time::sleep};
use tracing::{debug,info};
use crate::raster::{RasterLayer,check_equal_dimensions};
use crate::datetime::{secs,de_duration_from_fractional_secs,ser_duration_as_fractional_secs};
use crate::geo::EquirectangularMap;
use crate::errors::{Result,OdinIssTrackError,display_error};

#[async_trait]
pub trait DisplaySink: Send {
    /// wake up the panel (the scheduler calls this before each refresh)
    async fn init (&mut self)->Result<()>;

    /// show the frame. Only returns when the (slow) refresh has completed. Both layers have to have the same size
    async fn display (&mut self, black: &RasterLayer, red: &RasterLayer)->Result<()>;

    /// put the panel into low power mode. The displayed image is retained
    async fn sleep (&mut self)->Result<()>;

    /// blank the panel, which should be done before a display is stored for a longer time
    async fn clear (&mut self)->Result<()>;

    /// cut power, only used on shutdown
    async fn power_off (&mut self)->Result<()>;
}

/* #region config ******************************************************************************************/

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct DisplayConfig {
    /// where the image file sink stores frames
    #[serde(default="default_output_dir")]
    pub output_dir: PathBuf,

    /// how long a full refresh of the panel takes. The sampling interval has to be at least this long
    #[serde(default="default_refresh_time", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub refresh_time: Duration,

    /// if set, the image file sink takes `refresh_time` to display a frame
    #[serde(default="default_simulate_refresh")]
    pub simulate_refresh: bool,

    /// pause between display and sleep
    #[serde(default="default_settle_time", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub settle_time: Duration,

    /// upper bound for the whole init-display-settle-sleep sequence
    #[serde(default="default_display_timeout", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub timeout: Duration,
}

fn default_output_dir()->PathBuf { PathBuf::from("display") }
fn default_refresh_time()->Duration { secs(15) }
fn default_simulate_refresh()->bool { false }
fn default_settle_time()->Duration { secs(2) }
fn default_display_timeout()->Duration { secs(60) }

impl Default for DisplayConfig {
    fn default()->Self {
        DisplayConfig {
            output_dir: default_output_dir(),
            refresh_time: default_refresh_time(),
            simulate_refresh: default_simulate_refresh(),
            settle_time: default_settle_time(),
            timeout: default_display_timeout(),
        }
    }
}

/* #endregion config */

/* #region image file sink *********************************************************************************/

pub const BLACK_LAYER_FILE: &str = "black.png";
pub const RED_LAYER_FILE: &str = "red.png";
pub const FRAME_FILE: &str = "frame.png";

/// a display sink of fixed size that renders into `black.png`, `red.png` and a combined three color `frame.png`
#[derive(Debug)]
pub struct ImageFileSink {
    output_dir: PathBuf,
    dimensions: (u32,u32),
    refresh_delay: Duration,
    awake: bool,
    powered: bool,
    n_frames: usize,
}

impl ImageFileSink {
    pub fn new<P: AsRef<Path>> (output_dir: P, dimensions: (u32,u32), refresh_delay: Duration)->Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all( &output_dir)?;
        Ok( ImageFileSink { output_dir, dimensions, refresh_delay, awake: false, powered: true, n_frames: 0 } )
    }

    /// the panel size is the map size
    pub fn from_config (config: &DisplayConfig, map: &EquirectangularMap)->Result<Self> {
        let refresh_delay = if config.simulate_refresh { config.refresh_time } else { Duration::ZERO };
        Self::new( &config.output_dir, (map.width, map.height), refresh_delay)
    }

    pub fn output_dir (&self)->&Path { self.output_dir.as_path() }
    pub fn dimensions (&self)->(u32,u32) { self.dimensions }
    pub fn n_frames (&self)->usize { self.n_frames }
    pub fn is_awake (&self)->bool { self.awake }
    pub fn is_powered (&self)->bool { self.powered }

    fn check_awake (&self, op: &str)->Result<()> {
        if !self.powered { return Err( display_error!("{op} on powered off display")) }
        if !self.awake { return Err( display_error!("{op} on sleeping display (init first)")) }
        Ok(())
    }

    async fn write_frame (&mut self, black: &RasterLayer, red: &RasterLayer)->Result<()> {
        check_equal_dimensions( black, red)?;
        if black.dimensions() != self.dimensions {
            return Err( OdinIssTrackError::InvalidDimensions(
                format!("frame is {:?} but display is {:?}", black.dimensions(), self.dimensions)))
        }

        if self.refresh_delay > Duration::ZERO {
            sleep( self.refresh_delay).await;
        }

        // image encoding and file IO are blocking
        let (black, red, dir) = (black.clone(), red.clone(), self.output_dir.clone());
        spawn_blocking( move || -> Result<()> {
            black.save( dir.join( BLACK_LAYER_FILE))?;
            red.save( dir.join( RED_LAYER_FILE))?;
            compose_frame( &black, &red).save( dir.join( FRAME_FILE))?;
            Ok(())
        }).await.map_err( |e| display_error!("writing frame failed: {e}"))?
    }
}

#[async_trait]
impl DisplaySink for ImageFileSink {
    async fn init (&mut self)->Result<()> {
        if !self.powered { return Err( display_error!("init on powered off display")) }
        self.awake = true;
        Ok(())
    }

    async fn display (&mut self, black: &RasterLayer, red: &RasterLayer)->Result<()> {
        self.check_awake("display")?;
        self.write_frame( black, red).await?;
        self.n_frames += 1;
        debug!("wrote frame {} to {:?}", self.n_frames, self.output_dir);
        Ok(())
    }

    async fn sleep (&mut self)->Result<()> {
        self.awake = false;
        Ok(())
    }

    async fn clear (&mut self)->Result<()> {
        self.check_awake("clear")?;
        let blank = RasterLayer::new( self.dimensions.0, self.dimensions.1);
        self.write_frame( &blank, &blank).await
    }

    async fn power_off (&mut self)->Result<()> {
        self.awake = false;
        self.powered = false;
        info!("display powered off");
        Ok(())
    }
}

/// red ink has precedence over black ink, as on the panel
pub fn compose_frame (black: &RasterLayer, red: &RasterLayer)->RgbImage {
    RgbImage::from_fn( black.width(), black.height(), |x,y| {
        if red.is_ink(x,y) {
            Rgb([255,0,0])
        } else if black.is_ink(x,y) {
            Rgb([0,0,0])
        } else {
            Rgb([255,255,255])
        }
    })
}

/* #endregion image file sink */
