//! Film: the full-frame accumulation target tiles are merged into (spec
//! §4.3 "Film"), grounded on `include/aspirin/film.h` and
//! `src/libaspirin/film.cpp` in `examples/original_source/`. `develop`
//! stands in for the teacher's `ARP_NOT_IMPLEMENTED("develop")` stub with
//! an actual weight-normalized RGB readout, since a renderer with no way to
//! read pixels back out cannot be exercised by the tests this crate needs.

use crate::core::float::Float;
use crate::core::imageblock::ImageBlock;
use crate::core::rfilter::{GaussianFilter, ReconstructionFilter};
use crate::core::spectrum::Spectrum;

pub struct Film {
    size_x: i32,
    size_y: i32,
    filter: Box<dyn ReconstructionFilter>,
    block: ImageBlock,
}

impl Film {
    pub fn new(size_x: i32, size_y: i32) -> Self {
        Film::with_filter(size_x, size_y, Box::new(GaussianFilter::default()))
    }

    pub fn with_filter(size_x: i32, size_y: i32, filter: Box<dyn ReconstructionFilter>) -> Self {
        let block = ImageBlock::new(size_x, size_y, Some(filter.as_ref()));
        Film {
            size_x,
            size_y,
            filter,
            block,
        }
    }

    pub fn size(&self) -> (i32, i32) {
        (self.size_x, self.size_y)
    }

    pub fn filter(&self) -> &dyn ReconstructionFilter {
        self.filter.as_ref()
    }

    /// Merge a worker's completed tile into the full-frame buffer (spec
    /// §4.3, §8 "block accumulation is associative and commutative").
    pub fn put(&self, tile: &ImageBlock) {
        self.block.put_block(tile);
    }

    /// Weight-normalized RGB for pixel `(x, y)` in full-image coordinates;
    /// `None` weight yields black rather than dividing by zero, matching an
    /// unvisited pixel in a partially rendered frame.
    pub fn develop_pixel(&self, x: i32, y: i32) -> Spectrum {
        let border = self.block.border_size();
        match self.block.pixel(x + border, y + border) {
            Some(p) if p.weight > 0.0 => Spectrum::new(p.r, p.g, p.b) / p.weight,
            _ => Spectrum::black(),
        }
    }

    /// Full-frame RGB buffer in row-major order, normalized per pixel.
    pub fn develop(&self) -> Vec<Spectrum> {
        let mut out = Vec::with_capacity((self.size_x * self.size_y) as usize);
        for y in 0..self.size_y {
            for x in 0..self.size_x {
                out.push(self.develop_pixel(x, y));
            }
        }
        out
    }

    pub fn clear(&self) {
        self.block.clear();
    }
}
