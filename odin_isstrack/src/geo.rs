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

//! geographic positions and their mapping onto the pixel grid of an equirectangular (plate carrée) map

use std::fmt;
use serde::{Serialize,Deserialize};
use crate::errors::{Result,OdinIssTrackError,invalid_position};

pub const MAX_LAT: f64 = 90.0;
pub const MAX_LON: f64 = 180.0;

/// a validated (latitude,longitude) sample in geodetic degrees. Immutable once created.
/// Deserialized values go through the same checks as [`GeoPosition::new`]
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(try_from = "UncheckedGeoPosition")]
pub struct GeoPosition {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct UncheckedGeoPosition {
    lat: f64,
    lon: f64,
}

impl TryFrom<UncheckedGeoPosition> for GeoPosition {
    type Error = OdinIssTrackError;

    fn try_from (p: UncheckedGeoPosition)->Result<Self> {
        GeoPosition::new( p.lat, p.lon)
    }
}

impl GeoPosition {
    pub fn new (lat: f64, lon: f64)->Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err( invalid_position!("non-finite coordinates ({lat},{lon})"))
        }
        if lat < -MAX_LAT || lat > MAX_LAT {
            return Err( invalid_position!("latitude {lat} out of range [-90,90]"))
        }
        if lon < -MAX_LON || lon > MAX_LON {
            return Err( invalid_position!("longitude {lon} out of range [-180,180]"))
        }
        Ok( GeoPosition{ lat, lon } )
    }

    pub fn latitude (&self)->f64 { self.lat }
    pub fn longitude (&self)->f64 { self.lon }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4},{:.4})", self.lat, self.lon)
    }
}

/// a raster coordinate (origin top-left, y growing downwards)
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

/// the pixel dimensions of an equirectangular world map.
///
/// This is the single source of truth for the map size: both the projection of positions and the
/// size check of the basemap image use it. A basemap that was prepared for different dimensions would
/// silently misalign trajectory and map features, which is why [`crate::basemap::Basemap`] refuses to
/// load images that do not match
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct EquirectangularMap {
    pub width: u32,
    pub height: u32,
}

impl EquirectangularMap {
    pub fn new (width: u32, height: u32)->Self {
        EquirectangularMap{ width, height }
    }

    pub fn project (&self, pos: &GeoPosition)->PixelPoint {
        PixelPoint { x: self.x_for_lon( pos.lon), y: self.y_for_lat( pos.lat) }
    }

    /// pixel column for a longitude in degrees: round((lon + 180) * w/360), clamped to the last column
    pub fn x_for_lon (&self, lon: f64)->u32 {
        let w = self.width as f64;
        clamp_to_grid( ((lon + MAX_LON) * w / (2.0 * MAX_LON)).round(), self.width)
    }

    /// pixel row for a latitude in degrees: round(h - (lat + 90) * h/180), clamped to the last row.
    /// Rows grow downwards while latitudes grow northwards, hence the flip
    pub fn y_for_lat (&self, lat: f64)->u32 {
        let h = self.height as f64;
        clamp_to_grid( (h - (lat + MAX_LAT) * h / (2.0 * MAX_LAT)).round(), self.height)
    }

    pub fn contains (&self, x: i64, y: i64)->bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }
}

impl fmt::Display for EquirectangularMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// map a position to the pixel grid of a `map_width` x `map_height` equirectangular map.
/// Values that end up on the right or bottom edge (lon=180, lat=-90) are clamped to the last column/row
pub fn project (pos: &GeoPosition, map_width: u32, map_height: u32)->PixelPoint {
    EquirectangularMap::new( map_width, map_height).project( pos)
}

#[inline]
fn clamp_to_grid (v: f64, n: u32)->u32 {
    if n == 0 { 0 } else { v.clamp( 0.0, (n-1) as f64) as u32 }
}
