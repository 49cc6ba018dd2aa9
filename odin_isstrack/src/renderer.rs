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

//! turn the visible trajectory window into the two layers of a display frame

use std::time::Duration;
use imageproc::drawing::draw_filled_circle_mut;
use crate::geo::{EquirectangularMap,PixelPoint};
use crate::trajectory::TrajectoryWindow;
use crate::basemap::{Basemap,BasemapInversion,PositionIcon};
use crate::raster::{RasterLayer,INK};

pub const MAJOR_MARKER_RADIUS: i32 = 3;
pub const MINOR_MARKER_RADIUS: i32 = 1;

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum MarkerKind {
    CurrentPosition,
    Major,
    Minor,
}

/// number of samples between two major markers: max(round(major_marker_interval / sampling_interval), 1)
pub fn decimation_stride (major_marker_interval: Duration, sampling_interval: Duration)->usize {
    let dt = sampling_interval.as_secs_f64();
    if dt <= 0.0 { return 1 }

    let n = (major_marker_interval.as_secs_f64() / dt).round();
    if n.is_finite() && n >= 1.0 { n as usize } else { 1 }
}

/// classify a sample by its absolute index. The newest sample is always the current position
pub fn classify (index: usize, newest_index: usize, stride: usize)->MarkerKind {
    if index == newest_index {
        MarkerKind::CurrentPosition
    } else if index % stride.max(1) == 0 {
        MarkerKind::Major
    } else {
        MarkerKind::Minor
    }
}

/// the two layers of a frame. Both have the dimensions of the map
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct RenderedFrame {
    pub basemap: RasterLayer,
    pub trajectory: RasterLayer,
}

/// a marker to draw: absolute sample index, where, and how
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Marker {
    pub index: usize,
    pub pixel: PixelPoint,
    pub kind: MarkerKind,
}

/// renders frames for a fixed basemap/icon/decimation setup. Holds no per-frame state
#[derive(Debug,Clone)]
pub struct Renderer {
    basemap: Basemap,
    icon: PositionIcon,
    inversion: BasemapInversion,
    stride: usize,
}

impl Renderer {
    pub fn new (basemap: Basemap, icon: PositionIcon, inversion: BasemapInversion, stride: usize)->Self {
        Renderer { basemap, icon, inversion, stride: stride.max(1) }
    }

    pub fn map (&self)->&EquirectangularMap { self.basemap.map() }
    pub fn stride (&self)->usize { self.stride }

    /// the markers for a window in drawing order, i.e. newest first. The current position
    /// marker comes first so that it is never covered by trajectory dots
    pub fn markers (&self, window: &TrajectoryWindow)->Vec<Marker> {
        let map = self.basemap.map();
        match window.newest_index() {
            Some(newest) => {
                window.iter_newest_first().map( |(index,pos)| {
                    Marker { index, pixel: map.project(pos), kind: classify( index, newest, self.stride) }
                }).collect()
            }
            None => Vec::new()
        }
    }

    /// render basemap and trajectory layers. An empty window just yields the (possibly inverted) basemap
    /// and a blank trajectory layer
    pub fn render (&self, window: &TrajectoryWindow, hour_of_day: u32)->RenderedFrame {
        let map = self.basemap.map();
        let basemap = self.basemap.layer_for_hour( self.inversion, hour_of_day);
        let mut trajectory = RasterLayer::new( map.width, map.height);

        for marker in self.markers( window) {
            let (x,y) = (marker.pixel.x as i64, marker.pixel.y as i64);
            match marker.kind {
                MarkerKind::CurrentPosition => self.icon.draw_centered( &mut trajectory, x, y),
                MarkerKind::Major => draw_dot( &mut trajectory, x, y, MAJOR_MARKER_RADIUS),
                MarkerKind::Minor => draw_dot( &mut trajectory, x, y, MINOR_MARKER_RADIUS),
            }
        }

        RenderedFrame { basemap, trajectory }
    }
}

fn draw_dot (layer: &mut RasterLayer, x: i64, y: i64, radius: i32) {
    draw_filled_circle_mut( layer.image_mut(), (x as i32, y as i32), radius, INK);
}
