use std::fmt::{self, Write};

use chrono::format::StrftimeItems;
use chrono::NaiveDate;

use crate::db::Repository;
use crate::error::{Result, SummitError};
use super::{Climber, Mountain};

const MINUTES_PER_DAY  : u32 = 24 * 60;
const MINUTES_PER_HOUR : u32 = 60;

/// representing a row from expeditions table;
/// duration in minutes, success normalized to bool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expedition {
    pub id: i64,
    pub name: String,
    pub mountain_id: i64,
    pub start: String,
    pub date: NaiveDate,
    pub country: String,
    pub duration: u32,
    pub success: bool,
}

impl Expedition
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id          : i64,
        name        : impl Into<String>,
        mountain_id : i64,
        start       : impl Into<String>,
        date        : NaiveDate,
        country     : impl Into<String>,
        duration    : u32,
        success     : bool,
        ) -> Self
    {
        Expedition {
            id,
            name: name.into(),
            mountain_id,
            start: start.into(),
            date,
            country: country.into(),
            duration,
            success,
        }
    }

    /// (days, hours, minutes) the duration breaks down into
    pub fn duration_parts(&self) -> (u32, u32, u32)
    {
        (self.duration / MINUTES_PER_DAY,
         (self.duration % MINUTES_PER_DAY) / MINUTES_PER_HOUR,
         self.duration % MINUTES_PER_HOUR)
    }

    /// substitutes `%D`, `%H`, `%M` w/ two digit zero padded values
    pub fn convert_duration(&self, to_format: &str) -> String
    {
        let (dd, hh, mm) = self.duration_parts();

        to_format
            .replace("%D", &format!("{:02}", dd))
            .replace("%H", &format!("{:02}", hh))
            .replace("%M", &format!("{:02}", mm))
    }

    /// date formatted w/ a strftime style string;
    /// errors on specifiers a plain date can't satisfy
    pub fn convert_date(&self, to_format: &str) -> Result<String>
    {
        let mut out = String::new();

        write!(out, "{}",
               self.date.format_with_items(StrftimeItems::new(to_format)))
            .map_err(|_| SummitError::Format(to_format.to_string()))?;

        Ok(out)
    }

    pub fn get_climbers(&self, repo: &impl Repository) -> Result<Vec<Climber>>
    {
        repo.climbers_by_expedition_id(self.id)
    }

    pub fn get_mountain(&self, repo: &impl Repository)
        -> Result<Option<Mountain>>
    {
        repo.mountain_by_rank(self.mountain_id)
    }
}

impl fmt::Display for Expedition
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{} {} on mountain {} from {} ({}), {}, {} min, {}",
               self.id, self.name, self.mountain_id, self.start, self.country,
               self.date.format("%Y-%m-%d"), self.duration,
               if self.success { "successful" } else { "unsuccessful" })
    }
}
