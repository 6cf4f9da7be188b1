use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// An entrant of a tournament category.
///
/// The pool allocator only needs to know where an entrant trains and how it
/// ranks against the others, so anything implementing this trait can be
/// allocated.
pub trait Entrant {
    /// School (or club) the entrant belongs to.
    fn school(&self) -> &str;

    /// Ranking attribute used to order entrants before allocation. Usually
    /// the competitor's weight.
    fn rank(&self) -> f64;
}

/// Belt grade of a competitor.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Belt {
    White,
    Yellow,
    Blue,
    Purple,
    Green,
    Brown,
    Black,
}

impl Display for Belt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Belt::White => "WHITE",
            Belt::Yellow => "YELLOW",
            Belt::Blue => "BLUE",
            Belt::Purple => "PURPLE",
            Belt::Green => "GREEN",
            Belt::Brown => "BROWN",
            Belt::Black => "BLACK",
        })
    }
}

/// Competitor sex as recorded on the entry sheet.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Display for Sex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sex::Male => "M",
            Sex::Female => "F",
        })
    }
}

/// Competition day.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Day {
    #[serde(rename = "SAT")]
    Saturday,
    #[serde(rename = "SUN")]
    Sunday,
}

impl Display for Day {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Day::Saturday => "SAT",
            Day::Sunday => "SUN",
        })
    }
}

/// A validated competitor record. Immutable once allocated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Competitor {
    /// Registration number of the competitor.
    pub number: u32,
    pub name: String,
    pub school: String,
    /// Weight in kilograms, used to rank competitors before allocation.
    pub weight: f64,
    pub belt: Belt,
    pub age: u32,
    pub sex: Sex,
    pub day: Day,
}

impl Entrant for Competitor {
    #[inline]
    fn school(&self) -> &str {
        &self.school
    }

    #[inline]
    fn rank(&self) -> f64 {
        self.weight
    }
}

impl Display for Competitor {
    /// Bracket-line format: `number | name`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.number, self.name)
    }
}

/// A roster row as read from an entry sheet, before validation.
///
/// Every field is optional so a whole sheet can be deserialized first and
/// checked afterwards; field names match the sheet columns.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct RawEntry {
    #[serde(rename = "Number")]
    pub number: Option<u32>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "School")]
    pub school: Option<String>,
    #[serde(rename = "WT")]
    pub weight: Option<f64>,
    #[serde(rename = "BELT")]
    pub belt: Option<Belt>,
    #[serde(rename = "AGE")]
    pub age: Option<u32>,
    #[serde(rename = "SEX")]
    pub sex: Option<Sex>,
    #[serde(rename = "DAY")]
    pub day: Option<Day>,
}

#[derive(Error, Debug)]
#[cfg_attr(test, derive(Eq, PartialEq))]
#[non_exhaustive]
pub enum RosterError {
    /// A roster record is missing a required field. Allocation with a
    /// defaulted school or weight would silently skew the pools, so the
    /// record is rejected instead.
    #[error("roster entry {index} is missing required field `{field}`")]
    MissingField { field: &'static str, index: usize },
}

impl RawEntry {
    /// Validates the entry into a [`Competitor`].
    ///
    /// `index` is the position of the record in its sheet, reported back in
    /// the error so the offending row can be found.
    pub fn validate(self, index: usize) -> Result<Competitor, RosterError> {
        let missing = |field| RosterError::MissingField { field, index };

        Ok(Competitor {
            number: self.number.ok_or(missing("Number"))?,
            name: self.name.ok_or(missing("Name"))?,
            school: self.school.ok_or(missing("School"))?,
            weight: self.weight.ok_or(missing("WT"))?,
            belt: self.belt.ok_or(missing("BELT"))?,
            age: self.age.ok_or(missing("AGE"))?,
            sex: self.sex.ok_or(missing("SEX"))?,
            day: self.day.ok_or(missing("DAY"))?,
        })
    }
}

/// Validates a whole roster, failing on the first malformed record.
pub fn validate_roster<I>(entries: I) -> Result<Vec<Competitor>, RosterError>
where
    I: IntoIterator<Item = RawEntry>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.validate(index))
        .collect()
}
