#![forbid(unsafe_code)]

use rand::{thread_rng, Rng};

pub mod category;
pub mod draw;
pub mod pools;
pub mod roster;

pub use rand_seeder::Seeder;

/// Default number of competitors per pool.
pub const DEFAULT_POOL_CAPACITY: usize = pools::DEFAULT_CAPACITY;

/// The random generator used for every randomized operation of this crate.
pub type RandGen = rand_pcg::Pcg64;

/// Generates a new random seed.
///
/// Keep the seed around to replay the draws generated from it.
pub fn gen_seed() -> [u8; 32] {
    let mut seed = [0; 32];
    thread_rng().fill(&mut seed[..]);
    seed
}

/// Generates a [`Seeder`] from a freshly generated random seed.
pub fn gen_seeder() -> Seeder {
    Seeder::from(gen_seed())
}
