//! handles most db specific functionality
//! (store lifecycle, initialization, integrity checking, point lookups)
//! ingestion ousted to submodule load, analytics to submodule report

pub mod helpers;
pub mod load;
pub mod queries;
pub mod report;

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::entity::{Climber, Expedition, Mountain};
use crate::error::{Result, SummitError};
use helpers::*;
use queries::*;

/// tables in creation order (foreign keys point backwards)
const TABLES : [(&str, &str); 3] = [
    (SQL_TABLEN_MNT, SQL_CREATE_MNT),
    (SQL_TABLEN_EXP, SQL_CREATE_EXP),
    (SQL_TABLEN_CLB, SQL_CREATE_CLB),
];

/// point lookups backing the relationship accessors of the entities;
/// "nothing found" is None / an empty vec, never an error
pub trait Repository
{
    fn mountain_by_rank(&self, rank: i64) -> Result<Option<Mountain>>;
    fn expedition_by_id(&self, id: i64) -> Result<Option<Expedition>>;
    fn climbers_by_expedition_id(&self, id: i64) -> Result<Vec<Climber>>;
    fn expeditions_by_mountain_rank(&self, rank: i64)
        -> Result<Vec<Expedition>>;
}

/// owned handle to the sqlite store; opened once, passed explicitly
#[derive(Debug)]
pub struct Store
{
    conn : Connection,
}

impl Store
{
    /// open (create if needed) db file; creates or verifies tables
    pub fn open(path: impl AsRef<Path>) -> Result<Self>
    {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self>
    {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self>
    {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        register_functions(&conn)?;

        let store = Store { conn };

        if store.has_tables()?
        {
            store.check()?;
        }
        else
        {
            info!("initializing db w/ needed tables");
            store.init()?;
        }

        Ok(store)
    }

    /// release the connection, surfacing errors sqlite reports on close
    pub fn close(self) -> Result<()>
    {
        self.conn.close().map_err(|(_, err)| SummitError::Store(err))
    }

    pub fn conn(&self) -> &Connection
    {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection
    {
        &mut self.conn
    }

    fn has_tables(&self) -> Result<bool>
    {
        let count : i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            params![SQL_TABLEN_MNT],
            |row| row.get(0))?;

        Ok(count > 0)
    }

    /// create all tables on a new db
    fn init(&self) -> Result<()>
    {
        for (_, create) in TABLES
        {
            self.conn.execute(create, ())?;
        }

        Ok(())
    }

    /// check existing db for integrity, conforming to expected layout;
    /// compares creation schema versus the one from sqlite_master
    pub fn check(&self) -> Result<()>
    {
        let mut stmt = self.conn.prepare(
            "SELECT sql FROM sqlite_master WHERE type='table' AND name=?1",
        )?;

        for (table, create) in TABLES
        {
            let schema : Option<String> = stmt
                .query_row(params![table], |row| row.get(0))
                .optional()?;

            match schema
            {
                Some(s) if clean(&s) == clean(create) => (),
                _ => return Err(SummitError::Schema { table }),
            }
        }

        Ok(())
    }

    /// number of rows in one of our tables
    pub fn row_count(&self, table: &str) -> Result<u64>
    {
        if !TABLES.iter().any(|(name, _)| *name == table)
        {
            return Err(SummitError::Store(
                rusqlite::Error::InvalidParameterName(table.to_string())));
        }

        let count : i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table), (),
            |row| row.get(0))?;

        Ok(count as u64)
    }

    /// load guard; nothing loaded as long as there are no climbers
    pub fn is_empty(&self) -> Result<bool>
    {
        Ok(self.row_count(SQL_TABLEN_CLB)? == 0)
    }
}

impl Repository for Store
{
    fn mountain_by_rank(&self, rank: i64) -> Result<Option<Mountain>>
    {
        let mountain = self.conn.query_row(
            &format!("SELECT {} FROM {} WHERE rank = ?1",
                     SQL_COLS_MNT, SQL_TABLEN_MNT),
            params![rank],
            mountain_from_row)
            .optional()?;

        Ok(mountain)
    }

    fn expedition_by_id(&self, id: i64) -> Result<Option<Expedition>>
    {
        let expedition = self.conn.query_row(
            &format!("SELECT {} FROM {} WHERE id = ?1",
                     SQL_COLS_EXP, SQL_TABLEN_EXP),
            params![id],
            expedition_from_row)
            .optional()?;

        Ok(expedition)
    }

    fn climbers_by_expedition_id(&self, id: i64) -> Result<Vec<Climber>>
    {
        let mut stmt = self.conn.prepare(
            &format!("SELECT {} FROM {} WHERE expedition_id = ?1 ORDER BY id",
                     SQL_COLS_CLB, SQL_TABLEN_CLB))?;

        let climbers = stmt
            .query_map(params![id], climber_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(climbers)
    }

    fn expeditions_by_mountain_rank(&self, rank: i64)
        -> Result<Vec<Expedition>>
    {
        let mut stmt = self.conn.prepare(
            &format!("SELECT {} FROM {} WHERE mountain_id = ?1 ORDER BY id",
                     SQL_COLS_EXP, SQL_TABLEN_EXP))?;

        let expeditions = stmt
            .query_map(params![rank], expedition_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(expeditions)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::test; // crate w/ shared test logic
    use pretty_assertions::assert_eq;

    #[test]
    fn extra_table_column_integrity_check()
    {
        let store = Store::open_in_memory().unwrap();

        // add one extra column to climbers table
        store.conn()
            .execute(
                &format!("ALTER TABLE {} ADD COLUMN TEST INTEGER",
                         SQL_TABLEN_CLB),
                (),
            )
            .unwrap_or_else(|_| panic!("Couldn't add table column"));

        // integrity check should now fail
        assert!(matches!(
            store.check(),
            Err(SummitError::Schema { table: SQL_TABLEN_CLB })
        ));
    }

    #[test]
    fn reopen_keeps_tables_and_rows()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climbersapp.db");

        let mut store = Store::open(&path).unwrap();
        test::populate_store(&mut store);
        let count = store.row_count(SQL_TABLEN_CLB).unwrap();
        store.close().unwrap();

        let store = Store::open(&path).unwrap();
        assert_eq!(store.row_count(SQL_TABLEN_CLB).unwrap(), count);
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn row_count_rejects_foreign_table()
    {
        let store = Store::open_in_memory().unwrap();
        assert!(store.row_count("sqlite_master; DROP TABLE climbers").is_err());
        assert_eq!(store.row_count(SQL_TABLEN_MNT).unwrap(), 0);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn lookups_find_rows()
    {
        let mut store = Store::open_in_memory().unwrap();
        test::populate_store(&mut store);

        let mountain = store.mountain_by_rank(33).unwrap().unwrap();
        assert_eq!(mountain.name, "Molamenqing");

        let expedition = store.expedition_by_id(101).unwrap().unwrap();
        assert_eq!(expedition.mountain_id, 33);
        assert_eq!(expedition.duration, 30 * 60 + 15);

        let climbers = store.climbers_by_expedition_id(101).unwrap();
        let names : Vec<&str> = climbers.iter()
            .map(|c| c.last_name.as_str()).collect();
        assert_eq!(names, vec!["Lindqvist", "Sherpa"]);

        let ids : Vec<i64> = store.expeditions_by_mountain_rank(33).unwrap()
            .iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![101, 102, 103, 108]);
    }

    #[test]
    fn lookups_return_absent_not_errors()
    {
        let mut store = Store::open_in_memory().unwrap();
        test::populate_store(&mut store);

        assert_eq!(store.mountain_by_rank(9999).unwrap(), None);
        assert_eq!(store.expedition_by_id(-1).unwrap(), None);
        assert!(store.climbers_by_expedition_id(-1).unwrap().is_empty());
        assert!(store.expeditions_by_mountain_rank(9999).unwrap().is_empty());
    }

    #[test]
    fn entity_accessors_traverse_foreign_keys()
    {
        let mut store = Store::open_in_memory().unwrap();
        test::populate_store(&mut store);

        let climber = &store.climbers_by_expedition_id(101).unwrap()[0];
        let expedition = climber.get_expedition(&store).unwrap().unwrap();
        assert_eq!(expedition.id, 101);

        let mountain = expedition.get_mountain(&store).unwrap().unwrap();
        assert_eq!(mountain.rank, 33);

        assert_eq!(mountain.get_expeditions(&store).unwrap().len(), 4);
        assert_eq!(expedition.get_climbers(&store).unwrap().len(), 2);
    }
}
