use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand_xorshift::XorShiftRng;

/// Construct a throwaway random number generator seeded by a noise value.
///
/// Good for short-term use in immutable contexts given a varying source of
/// noise like map position coordinates.
///
/// ```
/// # use util::srng;
/// use rand::prelude::*;
///
/// assert_eq!(
///   srng(&(123u64, 4, 5)).gen_range(0..1000),
///   srng(&(123u64, 4, 5)).gen_range(0..1000));
/// ```
pub fn srng(seed: &(impl Hash + ?Sized)) -> XorShiftRng {
    XorShiftRng::seed_from_u64(hash_seed(seed))
}

/// Fold a hashable value into a 64-bit seed.
///
/// Use this to derive child seeds that stay stable as long as the parent
/// seed and the derivation key stay the same.
pub fn hash_seed(seed: &(impl Hash + ?Sized)) -> u64 {
    let mut h = crate::FastHasher::default();
    seed.hash(&mut h);
    h.finish()
}

pub trait RngExt {
    /// Bernoulli trial with a percent probability. Values of 100 and above
    /// always succeed, zero never does.
    fn percent_chance(&mut self, percent: u32) -> bool;
}

impl<T: Rng + ?Sized> RngExt for T {
    fn percent_chance(&mut self, percent: u32) -> bool {
        if percent >= 100 {
            return true;
        }
        self.gen_range(0..100) < percent
    }
}
