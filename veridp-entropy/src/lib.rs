//! Entropy sources used to seed the per-invocation generators of veridp
//! measurements. Production code only ever sees [`HostEntropySource`]; the
//! deterministic [`SimEntropySource`] exists behind the `sim` feature so
//! tests can replay a noise stream.

use rand_core::SeedableRng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntropyError {
    #[error("entropy platform failure: {0}")]
    Platform(&'static str),
}

/// Anything that can hand out seed bytes.
pub trait EntropySource {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;

    /// Draw a fixed-size seed.
    fn seed<const N: usize>(&mut self) -> Result<[u8; N], EntropyError>
    where
        Self: Sized,
    {
        let mut seed = [0u8; N];
        self.try_fill_bytes(&mut seed)?;
        Ok(seed)
    }
}

/// Entropy bridge backed by the operating system RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostEntropySource;

impl EntropySource for HostEntropySource {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        match dest {
            [] => Ok(()),
            bytes => getrandom::getrandom(bytes)
                .map_err(|_| EntropyError::Platform("os rng unavailable")),
        }
    }
}

/// Build a seeded generator from any entropy source.
///
/// Every call yields an independent generator; nothing is shared between
/// callers.
pub fn seeded_rng<R, S>(source: &mut S) -> Result<R, EntropyError>
where
    R: SeedableRng<Seed = [u8; 32]>,
    S: EntropySource,
{
    Ok(R::from_seed(source.seed::<32>()?))
}

/// Seed a generator straight from the host.
pub fn host_rng<R>() -> Result<R, EntropyError>
where
    R: SeedableRng<Seed = [u8; 32]>,
{
    seeded_rng(&mut HostEntropySource)
}

/// Replayable byte stream for tests. Two sources built from the same seed
/// yield the same bytes, so measurements seeded from them draw the same noise.
#[cfg(feature = "sim")]
#[derive(Clone, Debug)]
pub struct SimEntropySource {
    seed: u64,
    counter: u64,
}

#[cfg(feature = "sim")]
impl SimEntropySource {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

    pub fn with_seed(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    /// Restart the stream from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::with_seed(seed);
    }

    // splitmix64 finalizer over seed + counter * gamma
    fn word(&mut self) -> [u8; 8] {
        self.counter += 1;
        let mut z = self
            .seed
            .wrapping_add(self.counter.wrapping_mul(Self::GOLDEN_GAMMA));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        (z ^ (z >> 31)).to_le_bytes()
    }
}

#[cfg(feature = "sim")]
impl EntropySource for SimEntropySource {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        for chunk in dest.chunks_mut(8) {
            let word = self.word();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }
}
