use rand::SeedableRng;
use rand::rand_core::TryRng;
use std::convert::Infallible;
use xxhash_rust::xxh3::xxh3_64;

/// PCG-XSH-RR 32-bit generator over a 64-bit linear state, seeded
/// through SplitMix64 so that nearby seeds produce unrelated streams.
#[derive(Debug, Clone)]
pub struct HashRng {
    state: u64,
}

const PCG_MULTIPLIER: u64 = 6364136223846793005;
const PCG_INCREMENT: u64 = 1442695040888963407;

#[inline]
fn split_mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

impl HashRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: split_mix(seed),
        }
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let state = self.state;
        self.state = state
            .wrapping_mul(PCG_MULTIPLIER)
            .wrapping_add(PCG_INCREMENT);
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// A uniform float in [0, 1) with 24 bits of precision.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.step() >> 8) as f32 * 5.960_464_5e-8
    }
}

impl TryRng for HashRng {
    type Error = Infallible;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        Ok(self.step())
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        Ok((u64::from(self.step()) << 32) | u64::from(self.step()))
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Self::Error> {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}

impl SeedableRng for HashRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// Deterministic per-sample seed independent of scheduling order.
#[must_use]
pub fn pixel_seed(tile: u32, pixel: u32, sample: u32, global_seed: u64) -> u64 {
    let mut key = [0u8; 20];
    key[0..4].copy_from_slice(&tile.to_le_bytes());
    key[4..8].copy_from_slice(&pixel.to_le_bytes());
    key[8..12].copy_from_slice(&sample.to_le_bytes());
    key[12..20].copy_from_slice(&global_seed.to_le_bytes());
    xxh3_64(&key)
}
