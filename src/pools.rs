use crate::roster::Entrant;
use std::collections::HashMap;
use std::iter::repeat_with;
use std::marker::PhantomData;
use thiserror::Error;

/// Default maximum number of entrants per pool.
pub const DEFAULT_CAPACITY: usize = 8;

/// Generated pools.
pub struct Pools<'a, T: Entrant> {
    /// The generated pools, in allocation order.
    pub pools: Vec<Pool<'a, T>>,

    _phantom: PhantomData<()>,
}

/// A generated pool.
#[derive(Debug)]
pub struct Pool<'a, T: Entrant> {
    /// The entrants of this pool, in assignment order (ascending rank).
    pub entrants: Vec<&'a T>,

    _phantom: PhantomData<()>,
}

impl<'a, T: Entrant> Pool<'a, T> {
    #[inline]
    fn new() -> Pool<'a, T> {
        Pool {
            entrants: Vec::new(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entrant> Clone for Pool<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Pool {
            entrants: self.entrants.clone(),
            _phantom: PhantomData,
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AllocationError {
    /// The pool capacity must be at least 1.
    #[error("invalid pool capacity {0}, must be at least 1")]
    InvalidCapacity(usize),
    /// An error occurred while allocating the pools.
    #[error("an error occurred while allocating the pools: {0}")]
    InternalError(&'static str),
}

/// Allocates a roster into `ceil(roster len / capacity)` pools.
///
/// Pool sizes are fixed up front: every pool gets `roster len / pool count`
/// entrants and the first `roster len % pool count` pools one more, so no
/// pool exceeds `capacity` and no two pools differ in size by more than one.
///
/// Entrants are processed in ascending rank order (rank ties keep roster
/// order) and each one is assigned to the pool holding the fewest entrants
/// of the same school, preferring the less full pool on ties. This greedily
/// minimizes same-school meetings; a school with more members than there are
/// pools still repeats within at least one pool.
///
/// The roster is not modified and the result is fully deterministic.
pub fn allocate<T: Entrant>(roster: &[T], capacity: usize) -> Result<Pools<T>, AllocationError> {
    if capacity < 1 {
        return Err(AllocationError::InvalidCapacity(capacity));
    }
    if roster.is_empty() {
        return Ok(Pools {
            pools: Vec::new(),
            _phantom: PhantomData,
        });
    }

    let pool_number = roster.len().div_ceil(capacity);
    let base_size = roster.len() / pool_number;
    let extra = roster.len() % pool_number;
    let targets: Vec<usize> = (0..pool_number)
        .map(|i| base_size + usize::from(i < extra))
        .collect();

    let mut order: Vec<usize> = (0..roster.len()).collect();
    // Stable sort, so rank ties keep the roster order
    order.sort_by(|&a, &b| roster[a].rank().total_cmp(&roster[b].rank()));

    let mut pools: Vec<_> = repeat_with(|| Pool::new()).take(pool_number).collect();
    let mut school_counts: Vec<HashMap<&str, usize>> = vec![HashMap::new(); pool_number];

    for index in order {
        let entrant = &roster[index];
        let school = entrant.school();

        let pool = (0..pool_number)
            .filter(|&i| pools[i].entrants.len() < targets[i])
            .min_by_key(|&i| {
                (
                    school_counts[i].get(school).copied().unwrap_or(0),
                    pools[i].entrants.len(),
                )
            })
            .ok_or(AllocationError::InternalError("all pools are full"))?;

        pools[pool].entrants.push(entrant);
        *school_counts[pool].entry(school).or_default() += 1;
    }

    Ok(Pools {
        pools,
        _phantom: PhantomData,
    })
}
