use std::fmt;

use crate::db::helpers::round2;
use crate::db::Repository;
use crate::error::Result;
use super::{Expedition, FEET_PER_METRE};

/// representing a row from mountains table; rank doubles as primary key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mountain {
    pub rank: i64,
    pub name: String,
    pub country: String,
    pub height: i64,
    pub prominence: i64,
    pub range: String,
}

impl Mountain
{
    pub fn new(
        rank       : i64,
        name       : impl Into<String>,
        country    : impl Into<String>,
        height     : i64,
        prominence : i64,
        range      : impl Into<String>,
        ) -> Self
    {
        Mountain {
            rank,
            name: name.into(),
            country: country.into(),
            height,
            prominence,
            range: range.into(),
        }
    }

    /// part of the height not accounted for by prominence
    pub fn height_difference(&self) -> i64
    {
        self.height - self.prominence
    }

    pub fn get_height_in_feet(&self) -> f64
    {
        round2(self.height as f64 * FEET_PER_METRE)
    }

    pub fn get_prominence_in_feet(&self) -> f64
    {
        round2(self.prominence as f64 * FEET_PER_METRE)
    }

    /// all expeditions that targeted this mountain; queries every call
    pub fn get_expeditions(&self, repo: &impl Repository)
        -> Result<Vec<Expedition>>
    {
        repo.expeditions_by_mountain_rank(self.rank)
    }
}

impl fmt::Display for Mountain
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{} {} ({}, {}) {} m, prominence {} m",
               self.rank, self.name, self.country, self.range,
               self.height, self.prominence)
    }
}
