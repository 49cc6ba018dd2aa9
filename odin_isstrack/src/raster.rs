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

//! 1 bit per pixel raster layers as they are sent to two-color (black/red on white) e-paper displays.
//! We store pixels as `Luma<u8>` so that we can use the `image` and `imageproc` drawing functions, but
//! only ever write the two values [`WHITE`] and [`INK`]

use std::path::Path;
use image::{GrayImage,Luma,DynamicImage,imageops};
use crate::errors::{Result,OdinIssTrackError};

pub const WHITE: Luma<u8> = Luma([255]);
pub const INK: Luma<u8> = Luma([0]);

/// luma threshold below which source image pixels are considered to be ink
pub const INK_THRESHOLD: u8 = 128;

#[derive(Debug,Clone,PartialEq,Eq)]
pub struct RasterLayer {
    img: GrayImage,
}

impl RasterLayer {
    /// a blank (all white) layer
    pub fn new (width: u32, height: u32)->Self {
        RasterLayer { img: GrayImage::from_pixel( width, height, WHITE) }
    }

    /// threshold a (any format) source image into a layer
    pub fn from_image (src: &DynamicImage)->Self {
        let luma = src.to_luma8();
        let img = GrayImage::from_fn( luma.width(), luma.height(), |x,y| {
            if luma.get_pixel(x,y)[0] < INK_THRESHOLD { INK } else { WHITE }
        });
        RasterLayer { img }
    }

    pub fn open<P: AsRef<Path>> (path: P)->Result<Self> {
        let src = image::open( path.as_ref())?;
        Ok( Self::from_image( &src))
    }

    pub fn width (&self)->u32 { self.img.width() }
    pub fn height (&self)->u32 { self.img.height() }
    pub fn dimensions (&self)->(u32,u32) { self.img.dimensions() }

    pub fn is_ink (&self, x: u32, y: u32)->bool {
        self.img.get_pixel(x,y)[0] == INK[0]
    }

    /// set pixel if it is inside of the layer, ignore otherwise
    pub fn set_ink (&mut self, x: i64, y: i64) {
        if x >= 0 && y >= 0 && x < self.img.width() as i64 && y < self.img.height() as i64 {
            self.img.put_pixel( x as u32, y as u32, INK);
        }
    }

    pub fn count_ink (&self)->usize {
        self.img.pixels().filter( |p| p[0] == INK[0]).count()
    }

    /// swap ink and white
    pub fn invert (&mut self) {
        imageops::invert( &mut self.img);
    }

    pub fn clear (&mut self) {
        for p in self.img.pixels_mut() { *p = WHITE }
    }

    pub fn image (&self)->&GrayImage { &self.img }
    pub fn image_mut (&mut self)->&mut GrayImage { &mut self.img }

    /// pack into the row-major, MSB-first 1bpp format that e-paper controllers expect (bit set = white).
    /// Rows are padded to full bytes
    pub fn to_packed_bits (&self)->Vec<u8> {
        let (w,h) = self.img.dimensions();
        let bytes_per_row = ((w + 7) / 8) as usize;
        let mut buf = vec![0xffu8; bytes_per_row * h as usize];

        for (x,y,p) in self.img.enumerate_pixels() {
            if p[0] == INK[0] {
                let i = y as usize * bytes_per_row + (x / 8) as usize;
                buf[i] &= !(0x80 >> (x % 8));
            }
        }
        buf
    }

    pub fn save<P: AsRef<Path>> (&self, path: P)->Result<()> {
        Ok( self.img.save( path.as_ref())? )
    }
}

/// make sure two layers can be displayed together
pub fn check_equal_dimensions (a: &RasterLayer, b: &RasterLayer)->Result<()> {
    if a.dimensions() != b.dimensions() {
        Err( OdinIssTrackError::InvalidDimensions( format!("layer dimensions differ: {:?} vs {:?}", a.dimensions(), b.dimensions())))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_bits () {
        let mut layer = RasterLayer::new( 10, 2);
        layer.set_ink( 0, 0);
        layer.set_ink( 9, 1);
        layer.set_ink( 42, 42); // ignored

        let bits = layer.to_packed_bits();
        assert_eq!( bits, vec![ 0x7f, 0xff, 0xff, 0xbf]);
        assert_eq!( layer.count_ink(), 2);
    }
}
