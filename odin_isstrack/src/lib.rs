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
#![allow(unused)]

//! odin_isstrack - a ground track display for the International Space Station (or any other object
//! we can get periodic positions for).
//!
//! The tracker samples positions at a fixed interval, keeps the trajectory history and every couple of
//! samples renders the recent part of it onto an equirectangular world map for a slow (multi-second refresh)
//! two-color e-paper display:
//!
//!   - [`geo`] maps positions to map pixels
//!   - [`trajectory`] holds the history and computes the visible window
//!   - [`renderer`] turns the window into a basemap and a trajectory layer
//!   - [`scheduler`] drives sampling and display refresh
//!
//! Position source and display are abstracted as [`provider::PositionProvider`] and [`display::DisplaySink`]

pub mod errors;
pub use errors::{OdinIssTrackError,Result};

pub mod datetime;
pub mod geo;
pub mod trajectory;
pub mod raster;
pub mod basemap;
pub mod renderer;
pub mod provider;
pub mod display;
pub mod clock;
pub mod scheduler;
pub mod process;

pub mod config;
pub use config::{IssTrackerConfig,MapConfig,load_config};

pub use geo::{GeoPosition,PixelPoint,EquirectangularMap,project};
pub use trajectory::{TrajectoryStore,TrajectoryWindow,WindowPolicy};
pub use renderer::{Renderer,RenderedFrame,MarkerKind};
pub use scheduler::{Scheduler,SchedulerConfig,SchedulerState};
