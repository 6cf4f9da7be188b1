use crate::roster::{Belt, Competitor, Day, Sex};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Inclusive age band of a category.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AgeBand {
    /// Lowest age of the band.
    pub lower: u32,
    /// Highest age of the band. [`None`] for the open-ended top band.
    pub upper: Option<u32>,
}

impl Display for AgeBand {
    /// Labels a closed band by its lower bound and the top band as
    /// `Above N`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(_) => write!(f, "{}", self.lower),
            None => write!(f, "Above {}", self.lower),
        }
    }
}

/// Returns the age band a competitor of the given belt and age falls in.
///
/// Coloured belts band the youngest competitors together (0 to 5), then by
/// single year up to 15, then in an open 16-and-above band. Brown and black
/// belts only compete from age 7 up; a younger competitor of those belts has
/// no category.
pub fn age_band(belt: Belt, age: u32) -> Option<AgeBand> {
    let first_single_year = match belt {
        Belt::Brown | Belt::Black => 7,
        _ => 6,
    };

    if age < first_single_year {
        return match belt {
            Belt::Brown | Belt::Black => None,
            _ => Some(AgeBand {
                lower: 0,
                upper: Some(5),
            }),
        };
    }

    Some(if age >= 16 {
        AgeBand {
            lower: 16,
            upper: None,
        }
    } else {
        AgeBand {
            lower: age,
            upper: Some(age),
        }
    })
}

/// A competition category: one belt, age band, sex and day.
///
/// The category is explicit data that travels with the pools and draws
/// generated from it, so nothing about the current category has to be kept
/// in shared state between the allocation and the rendering of its sheets.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Category {
    pub belt: Belt,
    pub age_band: AgeBand,
    pub sex: Sex,
    pub day: Day,
}

impl Category {
    /// The category a competitor belongs to, if any.
    #[inline]
    pub fn of(competitor: &Competitor) -> Option<Category> {
        Some(Category {
            belt: competitor.belt,
            age_band: age_band(competitor.belt, competitor.age)?,
            sex: competitor.sex,
            day: competitor.day,
        })
    }
}

impl Display for Category {
    /// Sheet-heading label in the `BELT_AGE_SEX_DAY` format, e.g.
    /// `WHITE_7_M_SUN`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.belt, self.age_band, self.sex, self.day
        )
    }
}

/// Splits a full roster into per-category rosters.
///
/// Categories appear in first-seen order and keep their competitors in
/// roster order. Competitors without a category (see [`age_band`]) are
/// skipped.
pub fn categorize(roster: &[Competitor]) -> IndexMap<Category, Vec<&Competitor>> {
    let mut categories: IndexMap<Category, Vec<&Competitor>> = IndexMap::new();

    for competitor in roster {
        if let Some(category) = Category::of(competitor) {
            categories.entry(category).or_default().push(competitor);
        }
    }

    categories
}
