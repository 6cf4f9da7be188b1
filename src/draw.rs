use crate::category::Category;
use crate::pools::{allocate, AllocationError, Pool, Pools};
use crate::roster::Entrant;
use crate::{RandGen, Seeder};
use itertools::Itertools;
use rand::prelude::SliceRandom;
use rand::Rng;
use std::marker::PhantomData;
use thiserror::Error;

/// A seeded single-elimination draw for one pool.
#[derive(Debug)]
pub struct Draw<'a, T> {
    /// The seeded slot sequence. Its length is the smallest power of two
    /// that fits the pool; [`None`] slots are byes. A bye only ever sits in
    /// the second slot of its match.
    pub slots: Vec<Option<&'a T>>,

    _phantom: PhantomData<()>,
}

impl<T> Clone for Draw<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Draw {
            slots: self.slots.clone(),
            _phantom: PhantomData,
        }
    }
}

/// A round-1 match of a draw.
#[derive(Debug)]
pub struct DrawMatch<'a, T> {
    /// Competitor in the red corner.
    pub aka: &'a T,
    /// Competitor in the white corner. [`None`] if `aka` advances on a bye.
    pub shiro: Option<&'a T>,

    _phantom: PhantomData<()>,
}

impl<T> Clone for DrawMatch<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DrawMatch<'_, T> {}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DrawError {
    /// An error occurred while seeding the draw.
    #[error("an error occurred while seeding the draw: {0}")]
    InternalError(&'static str),
}

/// Seeds a pool into a randomized slot sequence.
///
/// The slot count is the smallest power of two holding the whole pool;
/// the missing slots become byes. Rather than reshuffling until no bye lands
/// in the first slot of a match, the draw is built directly: the entrants
/// are shuffled, the bye positions are picked at random among the second
/// slots of the matches, and the shuffled entrants fill everything else.
/// Built this way, a bye can never open a match and no retry is needed.
pub fn seed<'a, T: Entrant>(
    pool: &Pool<'a, T>,
    mut seeder: Seeder,
) -> Result<Draw<'a, T>, DrawError> {
    let mut rng: RandGen = seeder.make_rng();
    seed_with_rng(pool, &mut rng)
}

fn seed_with_rng<'a, T: Entrant>(
    pool: &Pool<'a, T>,
    rng: &mut impl Rng,
) -> Result<Draw<'a, T>, DrawError> {
    if pool.entrants.is_empty() {
        return Ok(Draw {
            slots: Vec::new(),
            _phantom: PhantomData,
        });
    }

    let slot_count = pool
        .entrants
        .len()
        .checked_next_power_of_two()
        .ok_or(DrawError::InternalError("an overflow occurred"))?;

    let mut entrants = pool.entrants.clone();
    entrants.shuffle(rng);

    // There are always fewer byes than matches, so every bye fits in a
    // second slot
    let mut second_slots: Vec<usize> = (1..slot_count).step_by(2).collect();
    second_slots.shuffle(rng);
    second_slots.truncate(slot_count - entrants.len());

    let mut is_bye = vec![false; slot_count];
    for slot in second_slots {
        is_bye[slot] = true;
    }

    let mut entrants = entrants.into_iter();
    let slots: Vec<_> = is_bye
        .iter()
        .map(|&bye| if bye { None } else { entrants.next() })
        .collect();
    debug_assert!(entrants.next().is_none(), "not all entrants were seeded");

    Ok(Draw {
        slots,
        _phantom: PhantomData,
    })
}

impl<'a, T> Draw<'a, T> {
    /// Pairs the slots into the round-1 matches: slot `2i` against slot
    /// `2i + 1`. A match whose second slot is a bye is a walkover and its
    /// `aka` advances without fighting.
    pub fn round(&self) -> Result<Vec<DrawMatch<'a, T>>, DrawError> {
        self.slots
            .iter()
            .copied()
            .tuples()
            .map(|(first, second)| {
                let aka = first.ok_or(DrawError::InternalError(
                    "a bye occupies the first slot of a match",
                ))?;
                Ok(DrawMatch {
                    aka,
                    shiro: second,
                    _phantom: PhantomData,
                })
            })
            .collect()
    }

    /// Number of byes of the draw.
    #[inline]
    pub fn byes(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }
}

/// Pools and seeded draws of one category.
pub struct CategoryDraws<'a, T: Entrant> {
    /// The category the draws belong to, for the sheet headings.
    pub category: Category,
    /// The allocated pools, listed on the score sheets.
    pub pools: Pools<'a, T>,
    /// One draw per pool, in pool order.
    pub draws: Vec<Draw<'a, T>>,

    _phantom: PhantomData<()>,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CategoryDrawError {
    /// Allocating the category's pools failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    /// Seeding one of the category's draws failed.
    #[error(transparent)]
    Draw(#[from] DrawError),
}

/// Allocates a category roster into pools and seeds a draw for every pool.
///
/// The category record travels with the result, so a renderer can label
/// every sheet without any state shared across calls.
pub fn draw_category<'a, T: Entrant>(
    category: Category,
    roster: &'a [T],
    capacity: usize,
    mut seeder: Seeder,
) -> Result<CategoryDraws<'a, T>, CategoryDrawError> {
    let pools = allocate(roster, capacity)?;

    let mut rng: RandGen = seeder.make_rng();
    let draws = pools
        .pools
        .iter()
        .map(|pool| seed_with_rng(pool, &mut rng))
        .collect::<Result<_, _>>()?;

    Ok(CategoryDraws {
        category,
        pools,
        draws,
        _phantom: PhantomData,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::category::AgeBand;
    use crate::roster::{Belt, Day, Sex};
    use crate::{gen_seed, gen_seeder};

    #[derive(Debug, Eq, PartialEq)]
    struct ConcreteEntrant(usize, &'static str);

    impl Entrant for ConcreteEntrant {
        fn school(&self) -> &str {
            self.1
        }

        fn rank(&self) -> f64 {
            self.0 as f64
        }
    }

    fn roster(len: usize) -> Vec<ConcreteEntrant> {
        (0..len).map(|i| ConcreteEntrant(i, "S")).collect()
    }

    fn single_pool(entrants: &[ConcreteEntrant]) -> Pool<ConcreteEntrant> {
        let mut pools = allocate(entrants, entrants.len()).unwrap().pools;
        pools.remove(0)
    }

    fn seeded_ids(draw: &Draw<ConcreteEntrant>) -> Vec<Option<usize>> {
        draw.slots.iter().map(|slot| slot.map(|e| e.0)).collect()
    }

    #[test]
    fn test_pad_to_next_power_of_two() {
        for (len, slots) in [(1, 1), (2, 2), (3, 4), (4, 4), (5, 8), (6, 8), (7, 8), (8, 8)] {
            let entrants = roster(len);
            let draw = seed(&single_pool(&entrants), gen_seeder()).unwrap();

            assert_eq!(draw.slots.len(), slots);
            assert_eq!(draw.byes(), slots - len);
        }
    }

    #[test]
    fn test_byes_only_in_second_slots() {
        for _ in 0..50 {
            for len in 1..=8 {
                let entrants = roster(len);
                let draw = seed(&single_pool(&entrants), gen_seeder()).unwrap();

                for (i, slot) in draw.slots.iter().enumerate() {
                    if slot.is_none() {
                        assert_eq!(i % 2, 1, "bye in slot {i} of a {len}-entrant draw");
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_entrant_seeded_once() {
        for len in 1..=8 {
            let entrants = roster(len);
            let draw = seed(&single_pool(&entrants), gen_seeder()).unwrap();

            let mut ids: Vec<_> = seeded_ids(&draw).into_iter().flatten().collect();
            ids.sort_unstable();
            assert_eq!(ids, (0..len).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_reproducibility() {
        // Execute a bunch of times to test against different seeds
        for _ in 0..50 {
            reproducibility_test_case(gen_seed());
        }
    }

    fn reproducibility_test_case(seed_bytes: [u8; 32]) {
        let entrants = roster(5);
        let pool = single_pool(&entrants);
        let reference = seeded_ids(&seed(&pool, Seeder::from(seed_bytes)).unwrap());

        for _ in 0..10 {
            let again = seeded_ids(&seed(&pool, Seeder::from(seed_bytes)).unwrap());
            assert_eq!(reference, again);
        }
    }

    #[test]
    fn test_round_pairs_adjacent_slots() {
        let entrants = roster(5);
        let draw = seed(&single_pool(&entrants), gen_seeder()).unwrap();
        let matches = draw.round().unwrap();

        assert_eq!(matches.len(), 4);
        for (i, drawn) in matches.iter().enumerate() {
            assert_eq!(Some(drawn.aka), draw.slots[2 * i]);
            assert_eq!(drawn.shiro, draw.slots[2 * i + 1]);
        }

        let walkovers = matches.iter().filter(|m| m.shiro.is_none()).count();
        assert_eq!(walkovers, 3);
    }

    #[test]
    fn test_full_pool_has_no_byes() {
        let entrants = roster(8);
        let draw = seed(&single_pool(&entrants), gen_seeder()).unwrap();

        assert_eq!(draw.byes(), 0);
        let matches = draw.round().unwrap();
        assert!(matches.iter().all(|m| m.shiro.is_some()));
    }

    #[test]
    fn test_single_entrant() {
        let entrants = roster(1);
        let draw = seed(&single_pool(&entrants), gen_seeder()).unwrap();

        assert_eq!(seeded_ids(&draw), [Some(0)]);
        assert!(draw.round().unwrap().is_empty());
    }

    #[test]
    fn test_empty_pool() {
        let entrants = roster(1);
        let mut pool = single_pool(&entrants);
        pool.entrants.clear();
        let draw = seed(&pool, gen_seeder()).unwrap();

        assert!(draw.slots.is_empty());
        assert!(draw.round().unwrap().is_empty());
    }

    #[test]
    fn test_round_rejects_bye_in_first_slot() {
        let entrant = ConcreteEntrant(0, "S");
        let draw = Draw {
            slots: vec![None, Some(&entrant)],
            _phantom: PhantomData,
        };

        assert!(matches!(
            draw.round(),
            Err(DrawError::InternalError(_))
        ));
    }

    #[test]
    fn test_draw_category() {
        let entrants = roster(10);
        let category = Category {
            belt: Belt::Blue,
            age_band: AgeBand {
                lower: 9,
                upper: Some(9),
            },
            sex: Sex::Male,
            day: Day::Sunday,
        };
        let drawn = draw_category(category, &entrants, 8, gen_seeder()).unwrap();

        assert_eq!(drawn.category.to_string(), "BLUE_9_M_SUN");
        assert_eq!(drawn.pools.pools.len(), 2);
        assert_eq!(drawn.draws.len(), 2);
        for (pool, draw) in drawn.pools.pools.iter().zip(&drawn.draws) {
            assert_eq!(pool.entrants.len(), 5);
            assert_eq!(draw.slots.len(), 8);
            assert_eq!(draw.byes(), 3);
        }
    }
}
