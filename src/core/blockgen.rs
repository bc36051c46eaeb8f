//! Spiral tile generator (spec §4.3 "BlockGenerator"), grounded on the
//! `BlockGenerator` class in `include/aspirin/imageblock.h` and its
//! `next_block` in `src/libaspirin/imageblock.cpp`. The teacher guards the
//! walk state with a `tbb::spin_mutex` so `parallel_for` workers can each
//! pull a tile; here a `Mutex` serves the same role, matching
//! `imageblock.rs`'s choice.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    fn next(self) -> Direction {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }
}

struct State {
    block: (i32, i32),
    num_blocks: (i32, i32),
    blocks_left: i32,
    direction: Direction,
    num_steps: i32,
    steps_left: i32,
}

/// Hands out non-overlapping tiles of an image in an outward spiral from
/// the center, so early tiles (often containing the subject) finish first
/// under adaptive or preview rendering (spec §4.3, §5 "tile scheduling").
pub struct BlockGenerator {
    size_x: i32,
    size_y: i32,
    block_size: i32,
    state: Mutex<State>,
}

impl BlockGenerator {
    pub fn new(size_x: i32, size_y: i32, block_size: i32) -> Self {
        let num_blocks_x = (size_x as f32 / block_size as f32).ceil() as i32;
        let num_blocks_y = (size_y as f32 / block_size as f32).ceil() as i32;
        let state = State {
            block: (num_blocks_x / 2, num_blocks_y / 2),
            num_blocks: (num_blocks_x, num_blocks_y),
            blocks_left: num_blocks_x * num_blocks_y,
            direction: Direction::Right,
            num_steps: 1,
            steps_left: 1,
        };
        BlockGenerator {
            size_x,
            size_y,
            block_size,
            state: Mutex::new(state),
        }
    }

    pub fn block_size(&self) -> i32 {
        self.block_size
    }

    pub fn blocks_left(&self) -> i32 {
        self.state.lock().unwrap().blocks_left
    }

    /// Pop the next `(offset, size)` pair, or `None` once the whole image
    /// has been covered. Safe to call from multiple worker threads.
    pub fn next_block(&self) -> Option<((i32, i32), (i32, i32))> {
        let mut s = self.state.lock().unwrap();
        if s.blocks_left == 0 {
            return None;
        }
        let pos = (s.block.0 * self.block_size, s.block.1 * self.block_size);
        let size = (
            (self.size_x - pos.0).min(self.block_size),
            (self.size_y - pos.1).min(self.block_size),
        );

        s.blocks_left -= 1;
        if s.blocks_left == 0 {
            return Some((pos, size));
        }

        loop {
            match s.direction {
                Direction::Right => s.block.0 += 1,
                Direction::Down => s.block.1 += 1,
                Direction::Left => s.block.0 -= 1,
                Direction::Up => s.block.1 -= 1,
            }
            s.steps_left -= 1;
            if s.steps_left == 0 {
                s.direction = s.direction.next();
                if s.direction == Direction::Left || s.direction == Direction::Right {
                    s.num_steps += 1;
                }
                s.steps_left = s.num_steps;
            }
            if s.block.0 >= 0
                && s.block.1 >= 0
                && s.block.0 < s.num_blocks.0
                && s.block.1 < s.num_blocks.1
            {
                break;
            }
        }

        Some((pos, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn spiral_covers_every_pixel_exactly_once() {
        let gen = BlockGenerator::new(10, 7, 3);
        let mut covered: HashSet<(i32, i32)> = HashSet::new();
        let mut tiles = 0;
        while let Some((offset, size)) = gen.next_block() {
            tiles += 1;
            for y in offset.1..offset.1 + size.1 {
                for x in offset.0..offset.0 + size.0 {
                    assert!(covered.insert((x, y)), "pixel ({}, {}) covered twice", x, y);
                }
            }
        }
        assert_eq!(covered.len(), 10 * 7);
        assert!(tiles > 0);
        assert!(gen.next_block().is_none());
    }

    #[test]
    fn single_block_image_yields_one_tile() {
        let gen = BlockGenerator::new(4, 4, 8);
        let (offset, size) = gen.next_block().unwrap();
        assert_eq!(offset, (0, 0));
        assert_eq!(size, (4, 4));
        assert!(gen.next_block().is_none());
    }
}
