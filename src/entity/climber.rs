use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

use crate::db::Repository;
use crate::error::Result;
use super::Expedition;

/// representing a row from climbers table;
/// id is the store's, identity is (names, birth date, nationality)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Climber {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub nationality: String,
    pub date_of_birth: NaiveDate,
    pub expedition_id: i64,
}

impl Climber
{
    pub fn new(
        id            : i64,
        first_name    : impl Into<String>,
        last_name     : impl Into<String>,
        nationality   : impl Into<String>,
        date_of_birth : NaiveDate,
        expedition_id : i64,
        ) -> Self
    {
        Climber {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            nationality: nationality.into(),
            date_of_birth,
            expedition_id,
        }
    }

    /// age in completed years at given date
    pub fn get_age(&self, at_date: NaiveDate) -> i32
    {
        let birth = self.date_of_birth;
        let mut age = at_date.year() - birth.year();

        if (at_date.month(), at_date.day()) < (birth.month(), birth.day())
        {
            age -= 1;
        }

        age
    }

    /// age as of today (local time)
    pub fn age(&self) -> i32
    {
        self.get_age(Local::now().date_naive())
    }

    /// same physical person; ignores id and expedition_id
    pub fn is_same_climber(&self, other: &Climber) -> bool
    {
        self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.date_of_birth == other.date_of_birth
            && self.nationality == other.nationality
    }

    pub fn get_expedition(&self, repo: &impl Repository)
        -> Result<Option<Expedition>>
    {
        repo.expedition_by_id(self.expedition_id)
    }
}

impl fmt::Display for Climber
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{} {} {} ({}, born {}), expedition {}",
               self.id, self.first_name, self.last_name, self.nationality,
               self.date_of_birth.format("%Y-%m-%d"), self.expedition_id)
    }
}
