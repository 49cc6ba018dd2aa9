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

//! static assets of a frame: the basemap (world map) and the icon marking the current position

use std::path::Path;
use serde::{Serialize,Deserialize};
use imageproc::{drawing::{draw_line_segment_mut,draw_hollow_rect_mut,draw_filled_rect_mut},rect::Rect};
use crate::geo::EquirectangularMap;
use crate::raster::{RasterLayer,INK};
use crate::errors::{Result,OdinIssTrackError};

/// when to tone-invert the basemap. Alternating the basemap tone is a cosmetic measure for e-paper
/// displays (bistable pixels that are not toggled for a long time tend to ghost)
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize,Default)]
pub enum BasemapInversion {
    Never,
    Always,
    #[default]
    EvenHours,
    OddHours,
}

impl BasemapInversion {
    pub fn is_inverted (&self, hour_of_day: u32)->bool {
        match self {
            BasemapInversion::Never => false,
            BasemapInversion::Always => true,
            BasemapInversion::EvenHours => hour_of_day % 2 == 0,
            BasemapInversion::OddHours => hour_of_day % 2 == 1,
        }
    }
}

/* #region basemap *****************************************************************************************/

/// the static map layer. Its dimensions always match the [`EquirectangularMap`] it was created for
#[derive(Debug,Clone)]
pub struct Basemap {
    map: EquirectangularMap,
    layer: RasterLayer,
}

impl Basemap {
    /// load basemap image from file, rejecting images that were not prepared for the given map dimensions
    pub fn open<P: AsRef<Path>> (path: P, map: EquirectangularMap)->Result<Self> {
        let layer = RasterLayer::open( path.as_ref())?;
        Self::from_layer( layer, map)
    }

    pub fn from_layer (layer: RasterLayer, map: EquirectangularMap)->Result<Self> {
        if layer.dimensions() != (map.width, map.height) {
            return Err( OdinIssTrackError::InvalidDimensions(
                format!("basemap is {}x{} but map is configured as {}", layer.width(), layer.height(), map)))
        }
        Ok( Basemap{ map, layer } )
    }

    /// a synthetic basemap with a 30° graticule, used if there is no basemap image
    pub fn graticule (map: EquirectangularMap)->Self {
        let mut layer = RasterLayer::new( map.width, map.height);

        if map.width > 0 && map.height > 0 {
            let img = layer.image_mut();
            let w = map.width as f32;

            for lon in (-150..=150).step_by(30) {
                draw_dotted_vline( img, map.x_for_lon( lon as f64), map.height);
            }
            for lat in (-60..=60).step_by(30) {
                let y = map.y_for_lat( lat as f64);
                if lat == 0 {
                    draw_line_segment_mut( img, (0.0, y as f32), (w - 1.0, y as f32), INK); // equator is solid
                } else {
                    draw_dotted_hline( img, y, map.width);
                }
            }
            draw_hollow_rect_mut( img, Rect::at(0,0).of_size( map.width, map.height), INK);
        }

        Basemap{ map, layer }
    }

    pub fn map (&self)->&EquirectangularMap { &self.map }
    pub fn layer (&self)->&RasterLayer { &self.layer }

    /// the layer as it should be displayed at the given local hour of day
    pub fn layer_for_hour (&self, inversion: BasemapInversion, hour_of_day: u32)->RasterLayer {
        let mut layer = self.layer.clone();
        if inversion.is_inverted( hour_of_day) {
            layer.invert();
        }
        layer
    }
}

fn draw_dotted_vline (img: &mut image::GrayImage, x: u32, height: u32) {
    for y in (0..height).step_by(2) { img.put_pixel( x, y, INK) }
}

fn draw_dotted_hline (img: &mut image::GrayImage, y: u32, width: u32) {
    for x in (0..width).step_by(2) { img.put_pixel( x, y, INK) }
}

/* #endregion basemap */

/* #region icon ********************************************************************************************/

/// the current position marker: a small bitmap of ink offsets relative to its center
#[derive(Debug,Clone,PartialEq)]
pub struct PositionIcon {
    width: u32,
    height: u32,
    ink: Vec<(i64,i64)>, // offsets from center
}

impl PositionIcon {
    pub fn open<P: AsRef<Path>> (path: P)->Result<Self> {
        let layer = RasterLayer::open( path.as_ref())?;
        Ok( Self::from_layer( &layer))
    }

    /// all ink pixels of the layer become part of the icon, which is centered on the layer center
    pub fn from_layer (layer: &RasterLayer)->Self {
        let (w,h) = layer.dimensions();
        let (cx,cy) = ((w/2) as i64, (h/2) as i64);
        let mut ink = Vec::new();

        for y in 0..h {
            for x in 0..w {
                if layer.is_ink(x,y) { ink.push( (x as i64 - cx, y as i64 - cy)) }
            }
        }
        PositionIcon { width: w, height: h, ink }
    }

    /// built-in 21x21 satellite glyph: a square body with a solar panel on each side
    pub fn satellite ()->Self {
        let mut layer = RasterLayer::new( 21, 21);
        let img = layer.image_mut();

        draw_filled_rect_mut( img, Rect::at(7,7).of_size(7,7), INK); // body
        draw_line_segment_mut( img, (0.0,10.0), (20.0,10.0), INK); // truss
        draw_hollow_rect_mut( img, Rect::at(0,3).of_size(5,15), INK); // left panel
        draw_hollow_rect_mut( img, Rect::at(16,3).of_size(5,15), INK); // right panel
        draw_line_segment_mut( img, (2.0,3.0), (2.0,17.0), INK);
        draw_line_segment_mut( img, (18.0,3.0), (18.0,17.0), INK);

        Self::from_layer( &layer)
    }

    pub fn width (&self)->u32 { self.width }
    pub fn height (&self)->u32 { self.height }

    /// draw icon centered at (x,y), clipping at the layer boundaries
    pub fn draw_centered (&self, layer: &mut RasterLayer, x: i64, y: i64) {
        for (dx,dy) in &self.ink {
            layer.set_ink( x + dx, y + dy);
        }
    }
}

impl Default for PositionIcon {
    fn default()->Self { Self::satellite() }
}

/* #endregion icon */
