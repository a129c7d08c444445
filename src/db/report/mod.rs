//! submodule dealing with the analytical queries
//! (extremes, aggregations, temporal and cross-table filters)
//!
//! extremal queries fail w/ NotFound on an empty store, filters return an
//! empty vec; ties always go to the lowest rank / id

pub mod export;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use crate::db::helpers::*;
use crate::db::queries::*;
use crate::db::{Repository, Store};
use crate::entity::{Climber, Expedition, Mountain};
use crate::error::{Result, SummitError};
use export::{write_csv, CsvRecord};

/// read-only query engine over a loaded store
#[derive(Debug)]
pub struct Reporter
{
    store      : Store,
    export_dir : PathBuf,
}

impl Reporter
{
    /// csv exports (if requested) land in `export_dir`
    pub fn new(store: Store, export_dir: impl Into<PathBuf>) -> Self
    {
        Reporter { store, export_dir: export_dir.into() }
    }

    pub fn store(&self) -> &Store
    {
        &self.store
    }

    pub fn export_dir(&self) -> &Path
    {
        &self.export_dir
    }

    /// hand the store back, eg to close it
    pub fn into_store(self) -> Store
    {
        self.store
    }

    /*
     * counts
     */

    pub fn try_total_climbers(&self) -> Result<u64>
    {
        self.store.row_count(SQL_TABLEN_CLB)
    }

    pub fn try_total_unique_climbers(&self) -> Result<u64>
    {
        let count : i64 = self.store.conn().query_row(
            &format!("SELECT COUNT(*) FROM (
                        SELECT DISTINCT first_name, last_name, nationality,
                            date_of_birth
                        FROM {})",
                     SQL_TABLEN_CLB), (),
            |row| row.get(0))?;

        Ok(count as u64)
    }

    /// number of climber rows; 0 if the query can't execute (logged)
    pub fn total_climbers(&self) -> u64
    {
        self.try_total_climbers().unwrap_or_else(|err| {
            warn!(%err, "counting climbers failed, reporting 0");
            0
        })
    }

    /// number of distinct persons; 0 if the query can't execute (logged)
    pub fn total_unique_climbers(&self) -> u64
    {
        self.try_total_unique_climbers().unwrap_or_else(|err| {
            warn!(%err, "counting unique climbers failed, reporting 0");
            0
        })
    }

    /*
     * extremes & aggregations
     */

    pub fn highest_mountain(&self) -> Result<Mountain>
    {
        self.one_mountain(&format!(
            "SELECT {} FROM {} ORDER BY height DESC, rank ASC LIMIT 1",
            SQL_COLS_MNT, SQL_TABLEN_MNT))
    }

    /// (longest, shortest) by duration
    pub fn longest_and_shortest_expedition(&self)
        -> Result<(Expedition, Expedition)>
    {
        let longest = self.one_expedition(&format!(
            "SELECT {} FROM {} ORDER BY duration DESC, id ASC LIMIT 1",
            SQL_COLS_EXP, SQL_TABLEN_EXP))?;

        let shortest = self.one_expedition(&format!(
            "SELECT {} FROM {} ORDER BY duration ASC, id ASC LIMIT 1",
            SQL_COLS_EXP, SQL_TABLEN_EXP))?;

        Ok((longest, shortest))
    }

    pub fn expedition_with_most_climbers(&self) -> Result<Expedition>
    {
        let id : Option<i64> = self.store.conn().query_row(
            &clean(&format!(
                "SELECT expedition_id FROM {}
                 GROUP BY expedition_id
                 ORDER BY COUNT(*) DESC, expedition_id ASC
                 LIMIT 1",
                SQL_TABLEN_CLB)), (),
            |row| row.get(0))
            .optional()?;

        let id = id.ok_or(SummitError::NotFound("climber"))?;
        debug!(expedition = id, "expedition w/ most climbers");

        self.store
            .expedition_by_id(id)?
            .ok_or(SummitError::NotFound("expedition"))
    }

    pub fn mountain_with_most_expeditions(&self) -> Result<Mountain>
    {
        let rank : Option<i64> = self.store.conn().query_row(
            &clean(&format!(
                "SELECT mountain_id FROM {}
                 GROUP BY mountain_id
                 ORDER BY COUNT(*) DESC, mountain_id ASC
                 LIMIT 1",
                SQL_TABLEN_EXP)), (),
            |row| row.get(0))
            .optional()?;

        let rank = rank.ok_or(SummitError::NotFound("expedition"))?;
        debug!(mountain = rank, "mountain w/ most expeditions");

        self.store
            .mountain_by_rank(rank)?
            .ok_or(SummitError::NotFound("mountain"))
    }

    /*
     * temporal
     */

    /// earliest expedition, optionally only among successful ones
    pub fn first_expedition(&self, only_successful: bool) -> Result<Expedition>
    {
        self.one_expedition(&format!(
            "SELECT {} FROM {} {} ORDER BY date ASC, id ASC LIMIT 1",
            SQL_COLS_EXP, SQL_TABLEN_EXP, success_filter(only_successful)))
    }

    /// most recent expedition, optionally only among successful ones
    pub fn latest_expedition(&self, only_successful: bool) -> Result<Expedition>
    {
        self.one_expedition(&format!(
            "SELECT {} FROM {} {} ORDER BY date DESC, id ASC LIMIT 1",
            SQL_COLS_EXP, SQL_TABLEN_EXP, success_filter(only_successful)))
    }

    /*
     * filters; empty result is a valid answer
     */

    /// climbers of expeditions to `mountain` dated within [start, end]
    pub fn climbers_on_mountain_between(
        &self,
        mountain : &Mountain,
        start    : NaiveDate,
        end      : NaiveDate,
        export   : bool,
        ) -> Result<Vec<Climber>>
    {
        let cols = SQL_COLS_CLB
            .split(", ")
            .map(|c| format!("c.{}", c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut stmt = self.store.conn().prepare(&clean(&format!(
            "SELECT {} FROM {} c
             JOIN {} e ON c.expedition_id = e.id
             WHERE e.mountain_id = ?1 AND e.date BETWEEN ?2 AND ?3
             ORDER BY c.id",
            cols, SQL_TABLEN_CLB, SQL_TABLEN_EXP)))?;

        let climbers = stmt
            .query_map(params![mountain.rank, start, end], climber_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(mountain = mountain.rank, %start, %end, found = climbers.len(),
               "climbers on mountain");

        if export
        {
            self.export(&format!("Climbers mountain {} between {} and {}.csv",
                                 mountain.name,
                                 start.format(DATE_FMT_ISO),
                                 end.format(DATE_FMT_ISO)),
                        &climbers);
        }

        Ok(climbers)
    }

    /// mountains whose country matches, ignoring case
    pub fn mountains_in_country(&self, country: &str, export: bool)
        -> Result<Vec<Mountain>>
    {
        let mut stmt = self.store.conn().prepare(&format!(
            "SELECT {} FROM {} WHERE {f}(country) = {f}(?1) ORDER BY rank",
            SQL_COLS_MNT, SQL_TABLEN_MNT, f = SQL_FN_LOWER))?;

        let mountains = stmt
            .query_map(params![country], mountain_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if export
        {
            self.export(&format!("Mountains in country {}.csv", country),
                        &mountains);
        }

        Ok(mountains)
    }

    /// climbers whose nationality matches, ignoring case
    pub fn climbers_from_country(&self, country: &str, export: bool)
        -> Result<Vec<Climber>>
    {
        let mut stmt = self.store.conn().prepare(&format!(
            "SELECT {} FROM {} WHERE {f}(nationality) = {f}(?1)
             ORDER BY id",
            SQL_COLS_CLB, SQL_TABLEN_CLB, f = SQL_FN_LOWER))?;

        let climbers = stmt
            .query_map(params![country], climber_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if export
        {
            self.export(&format!("Climbers in country {}.csv",
                                 capitalize(country)),
                        &climbers);
        }

        Ok(climbers)
    }

    /// the query result stands on its own; a failed export is only logged
    fn export<T: CsvRecord>(&self, filename: &str, records: &[T])
    {
        if let Err(err) = write_csv(&self.export_dir, filename, records)
        {
            warn!(%err, filename, dir = %self.export_dir.display(),
                  "csv export failed, returning rows anyway");
        }
    }

    fn one_mountain(&self, query: &str) -> Result<Mountain>
    {
        debug!(query, "single mountain");
        self.store.conn()
            .query_row(query, (), mountain_from_row)
            .optional()?
            .ok_or(SummitError::NotFound("mountain"))
    }

    fn one_expedition(&self, query: &str) -> Result<Expedition>
    {
        debug!(query, "single expedition");
        self.store.conn()
            .query_row(query, (), expedition_from_row)
            .optional()?
            .ok_or(SummitError::NotFound("expedition"))
    }
}

fn success_filter(only_successful: bool) -> &'static str
{
    if only_successful { "WHERE success = 1" } else { "" }
}

/// "sWEDEN" -> "Sweden"
fn capitalize(s: &str) -> String
{
    let mut chars = s.chars();
    match chars.next()
    {
        Some(first) => first.to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
