use glam::UVec2;

/// A rectangular block of pixels; the unit of work ownership. While a
/// worker holds a tile it is the only writer of those pixels.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub index: u32,
    /// Top-left pixel of the tile in buffer coordinates.
    pub origin: UVec2,
    /// Extent in pixels; edge tiles are cropped to the buffer.
    pub size: UVec2,
}

impl Tile {
    #[must_use]
    pub fn area(&self) -> usize {
        (self.size.x * self.size.y) as usize
    }

    /// Tile-local pixel coordinates in Morton order, which keeps
    /// consecutive pixels spatially close for cache locality.
    pub fn pixels(&self) -> impl Iterator<Item = UVec2> + '_ {
        let side = self.size.x.max(self.size.y).next_power_of_two();
        let size = self.size;
        (0..side * side).filter_map(move |code| {
            let p = morton_decode(code);
            (p.x < size.x && p.y < size.y).then_some(p)
        })
    }
}

/// Cuts a buffer into tiles, row-major.
#[must_use]
pub fn tile_grid(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut index = 0;
    for y in (0..height).step_by(tile_size as usize) {
        for x in (0..width).step_by(tile_size as usize) {
            tiles.push(Tile {
                index,
                origin: UVec2::new(x, y),
                size: UVec2::new(tile_size.min(width - x), tile_size.min(height - y)),
            });
            index += 1;
        }
    }
    tiles
}

fn morton_decode(code: u32) -> UVec2 {
    UVec2::new(compact_bits(code), compact_bits(code >> 1))
}

/// Keeps every other bit, packed low.
fn compact_bits(mut x: u32) -> u32 {
    x &= 0x5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333;
    x = (x | (x >> 2)) & 0x0f0f_0f0f;
    x = (x | (x >> 4)) & 0x00ff_00ff;
    x = (x | (x >> 8)) & 0x0000_ffff;
    x
}
