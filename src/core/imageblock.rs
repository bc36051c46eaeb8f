//! ImageBlock: a per-tile RGBA+weight accumulation buffer with filtered
//! splatting (spec §4.3), grounded on `include/aspirin/imageblock.h` and
//! `src/libaspirin/imageblock.cpp` in `examples/original_source/`. The
//! teacher's `tbb::spin_mutex` becomes a `std::sync::Mutex` guarding the
//! buffer — coarser than a spinlock but the same serialization contract,
//! matching the teacher's own `std::sync` usage in `core/primitive.rs`.

use std::sync::Mutex;

use crate::core::float::Float;
use crate::core::geometry::Point2f;
use crate::core::rfilter::ReconstructionFilter;
use crate::core::spectrum::Spectrum;

/// One accumulation cell: RGB value sum plus the sum of filter weights that
/// contributed to it, so `Film::develop` can divide out the weight (spec
/// §4.3 "unnormalized accumulation").
#[derive(Debug, Clone, Copy, Default)]
pub struct Pixel {
    pub r: Float,
    pub g: Float,
    pub b: Float,
    pub weight: Float,
}

impl Pixel {
    fn add_splat(&mut self, val: Spectrum, w: Float) {
        self.r += val.r * w;
        self.g += val.g * w;
        self.b += val.b * w;
        self.weight += w;
    }
}

struct Buffer {
    width: i32,
    height: i32,
    pixels: Vec<Pixel>,
}

impl Buffer {
    fn new(width: i32, height: i32) -> Self {
        Buffer {
            width,
            height,
            pixels: vec![Pixel::default(); (width * height).max(0) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }
}

/// A rectangular tile of the film, offset within the full image, carrying a
/// border wide enough to hold filter splash-over from neighboring tiles
/// (spec §4.3). `put` accumulates a filtered sample; `put_block` merges
/// another block's overlapping region into this one (used by `Film`).
pub struct ImageBlock {
    buffer: Mutex<Buffer>,
    offset_x: i32,
    offset_y: i32,
    size_x: i32,
    size_y: i32,
    border_size: i32,
    filter_radius: Float,
    lookup_factor: Float,
    filter_table: Vec<Float>,
}

impl ImageBlock {
    pub fn new(size_x: i32, size_y: i32, filter: Option<&dyn ReconstructionFilter>) -> Self {
        let (border_size, filter_radius, lookup_factor, filter_table) = match filter {
            Some(f) => {
                let radius = f.radius();
                let border = (radius - 0.5).ceil().max(0.0) as i32;
                let table = f.build_lookup_table();
                let resolution = (table.len() - 1) as Float;
                (border, radius, resolution / radius, table)
            }
            None => (0, 0.0, 0.0, Vec::new()),
        };
        let buffer = Buffer::new(size_x + 2 * border_size, size_y + 2 * border_size);
        ImageBlock {
            buffer: Mutex::new(buffer),
            offset_x: 0,
            offset_y: 0,
            size_x,
            size_y,
            border_size,
            filter_radius,
            lookup_factor,
            filter_table,
        }
    }

    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.offset_x = x;
        self.offset_y = y;
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    pub fn size(&self) -> (i32, i32) {
        (self.size_x, self.size_y)
    }

    pub fn border_size(&self) -> i32 {
        self.border_size
    }

    pub fn clear(&self) {
        let mut buf = self.buffer.lock().unwrap();
        for p in buf.pixels.iter_mut() {
            *p = Pixel::default();
        }
    }

    /// Filtered sample splat, spec §4.3: `pos` is in the full image's pixel
    /// coordinates, already including any raster jitter. Returns `false`
    /// only when the sample's footprint lies entirely outside the block
    /// (border included).
    pub fn put(&self, pos: Point2f, val: Spectrum) -> bool {
        if self.filter_table.is_empty() {
            // No filter configured: box-splat the single covered pixel.
            let local_x = (pos.x - self.offset_x as Float) as i32 + self.border_size;
            let local_y = (pos.y - self.offset_y as Float) as i32 + self.border_size;
            let mut buf = self.buffer.lock().unwrap();
            return match buf.index(local_x, local_y) {
                Some(idx) => {
                    buf.pixels[idx].add_splat(val, 1.0);
                    true
                }
                None => false,
            };
        }

        let local_x = pos.x - (self.offset_x as Float - (self.border_size as Float + 0.5));
        let local_y = pos.y - (self.offset_y as Float - (self.border_size as Float + 0.5));

        let mut buf = self.buffer.lock().unwrap();
        let max_x = buf.width - 1;
        let max_y = buf.height - 1;

        let lo_x = ((local_x - self.filter_radius).ceil() as i32).clamp(0, max_x);
        let hi_x = ((local_x + self.filter_radius).floor() as i32).clamp(0, max_x);
        let lo_y = ((local_y - self.filter_radius).ceil() as i32).clamp(0, max_y);
        let hi_y = ((local_y + self.filter_radius).floor() as i32).clamp(0, max_y);

        if lo_x > hi_x || lo_y > hi_y {
            return false;
        }

        let weight_at = |center: Float, coord: i32| -> Float {
            let dist = (coord as Float - center).abs();
            let table_idx = ((dist * self.lookup_factor) as usize).min(self.filter_table.len() - 1);
            self.filter_table[table_idx]
        };

        for y in lo_y..=hi_y {
            let wy = weight_at(local_y, y);
            if wy == 0.0 {
                continue;
            }
            for x in lo_x..=hi_x {
                let wx = weight_at(local_x, x);
                if wx == 0.0 {
                    continue;
                }
                let idx = buf.index(x, y).unwrap();
                buf.pixels[idx].add_splat(val, wx * wy);
            }
        }
        true
    }

    /// Merge another block's contents into `self`, aligning by offset as in
    /// `ImageBlock::put(const ImageBlock*)` in the teacher source. Used when
    /// a tile worker's private block is flushed into the full-frame film.
    pub fn put_block(&self, other: &ImageBlock) {
        let other_buf = other.buffer.lock().unwrap();
        let dx = other.offset_x - self.offset_x + (self.border_size - other.border_size);
        let dy = other.offset_y - self.offset_y + (self.border_size - other.border_size);
        let mut buf = self.buffer.lock().unwrap();
        for y in 0..other_buf.height {
            for x in 0..other_buf.width {
                if let Some(dst) = buf.index(x + dx, y + dy) {
                    let src = other_buf.pixels[(y * other_buf.width + x) as usize];
                    buf.pixels[dst].r += src.r;
                    buf.pixels[dst].g += src.g;
                    buf.pixels[dst].b += src.b;
                    buf.pixels[dst].weight += src.weight;
                }
            }
        }
    }

    /// Raw pixel at local (border-inclusive) coordinates, for tests and for
    /// `Film::develop`.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        let buf = self.buffer.lock().unwrap();
        buf.index(x, y).map(|i| buf.pixels[i])
    }

    pub fn buffer_size(&self) -> (i32, i32) {
        let buf = self.buffer.lock().unwrap();
        (buf.width, buf.height)
    }
}
