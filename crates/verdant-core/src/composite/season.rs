use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VerdantError;

const MONTH_INITIALS: [char; 12] = ['j', 'f', 'm', 'a', 'm', 'j', 'j', 'a', 's', 'o', 'n', 'd'];

/// A three-month compositing window identified by its start month.
///
/// Seasons are written as month-initial triplets ("jja" = Jun-Jul-Aug) and
/// may wrap the year end ("djf" = Dec-Jan-Feb). Acquisitions are always
/// grouped by their own calendar year, so the djf window of 2018 holds
/// that year's January, February and December.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Season {
    start_month: u32,
}

impl Season {
    pub fn new(start_month: u32) -> Result<Self, VerdantError> {
        if !(1..=12).contains(&start_month) {
            return Err(VerdantError::InvalidMonth(start_month));
        }
        Ok(Self { start_month })
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    /// The window's three months in order, wrapping past December.
    pub fn months(&self) -> [u32; 3] {
        let m = self.start_month;
        [m, m % 12 + 1, (m + 1) % 12 + 1]
    }

    pub fn contains(&self, month: u32) -> bool {
        self.months().contains(&month)
    }

    /// Month-initial label, e.g. "jja".
    pub fn label(&self) -> String {
        self.months()
            .iter()
            .map(|&m| MONTH_INITIALS[(m - 1) as usize])
            .collect()
    }
}

impl Default for Season {
    /// Northern-hemisphere growing season, Jun-Jul-Aug.
    fn default() -> Self {
        Self { start_month: 6 }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Season {
    type Err = VerdantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        for start_month in 1..=12 {
            let season = Season { start_month };
            if season.label() == wanted {
                return Ok(season);
            }
        }
        Err(VerdantError::UnknownSeason(s.to_string()))
    }
}

impl TryFrom<String> for Season {
    type Error = VerdantError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Season> for String {
    fn from(season: Season) -> Self {
        season.label()
    }
}
