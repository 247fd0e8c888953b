//! Per-pixel shield rasterization into paired front/back images.

use rayon::prelude::*;

use super::geodesy::ImpactGeodesy;
use super::rings::PaintTable;

/// One packed-ARGB image, row-major, transparent (0) where nothing was drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShieldRaster {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl ShieldRaster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed `0xAARRGGBB` at `(column, row)`.
    pub fn argb_at(&self, column: usize, row: usize) -> u32 {
        self.pixels[row * self.width + column]
    }

    pub fn alpha_at(&self, column: usize, row: usize) -> u8 {
        (self.argb_at(column, row) >> 24) as u8
    }

    /// Straight RGBA8 bytes for upload to the painting layer.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&argb| {
                [
                    (argb >> 16) as u8,
                    (argb >> 8) as u8,
                    argb as u8,
                    (argb >> 24) as u8,
                ]
            })
            .collect()
    }

    fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, u32> {
        self.pixels.chunks_mut(self.width)
    }
}

/// Front (facing the viewer, `+z`) and back hemisphere images of one animation tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShieldFrame {
    pub front: ShieldRaster,
    pub back: ShieldRaster,
}

/// Draws shield frames for one impact.
#[derive(Clone, Debug)]
pub struct ShieldRasterizer {
    geodesy: ImpactGeodesy,
    parallel: bool,
}

impl ShieldRasterizer {
    pub fn new(geodesy: ImpactGeodesy) -> Self {
        Self {
            geodesy,
            parallel: true,
        }
    }

    /// Toggle rayon row parallelism. Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn geodesy(&self) -> &ImpactGeodesy {
        &self.geodesy
    }

    /// Raster width (`2b + 1`).
    pub fn columns(&self) -> usize {
        self.geodesy.geodesy().columns()
    }

    /// Raster height (`2a + 1`).
    pub fn rows(&self) -> usize {
        2 * self.geodesy.geodesy().a() as usize + 1
    }

    /// Rasterize both hemispheres with the given paint table.
    pub fn render(&self, paint: &PaintTable) -> ShieldFrame {
        let mut front = ShieldRaster::new(self.columns(), self.rows());
        let mut back = ShieldRaster::new(self.columns(), self.rows());

        if self.parallel {
            front
                .pixels
                .par_chunks_mut(self.columns())
                .zip(back.pixels.par_chunks_mut(self.columns()))
                .enumerate()
                .for_each(|(row, (front_row, back_row))| {
                    self.render_row(row, front_row, back_row, paint);
                });
        } else {
            for (row, (front_row, back_row)) in front.rows_mut().zip(back.rows_mut()).enumerate() {
                self.render_row(row, front_row, back_row, paint);
            }
        }

        ShieldFrame { front, back }
    }

    fn render_row(&self, row: usize, front: &mut [u32], back: &mut [u32], paint: &PaintTable) {
        let a = self.geodesy.geodesy().a();
        let b = self.geodesy.geodesy().b();
        let y = row as i64 - a;

        let mut column = 0;
        while column < front.len() {
            let lanes = self.geodesy.colors_x4(column as i64 - b, y, paint);
            for (lane, colors) in lanes.into_iter().enumerate() {
                let Some([top, bottom]) = colors else {
                    continue;
                };
                let c = column + lane;
                if top != 0 {
                    front[c] = top;
                }
                if bottom != 0 {
                    back[c] = bottom;
                }
            }
            column += 4;
        }
    }
}
