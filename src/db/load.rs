//! one-time ingestion of the expeditions JSON document
//!
//! every record carries its mountain and climbers inline; mountains are
//! deduplicated by rank, expeditions and climbers are inserted as is;
//! the whole document goes in within one transaction, a single bad field
//! leaves the store untouched

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::{Result, SummitError};
use super::helpers::*;
use super::queries::*;
use super::Store;

/// rows actually inserted per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary
{
    pub mountains   : usize,
    pub expeditions : usize,
    pub climbers    : usize,
}

#[derive(Debug, Deserialize)]
struct RawExpedition
{
    id       : i64,
    name     : String,
    start    : String,
    date     : String,
    country  : String,
    duration : String,
    #[serde(deserialize_with = "flag")]
    success  : bool,
    mountain : RawMountain,
    climbers : Vec<RawClimber>,
}

#[derive(Debug, Deserialize)]
struct RawMountain
{
    rank       : i64,
    name       : String,
    countries  : Vec<String>,
    height     : i64,
    prominence : i64,
    range      : String,
}

#[derive(Debug, Deserialize)]
struct RawClimber
{
    first_name    : String,
    last_name     : String,
    nationality   : String,
    date_of_birth : String,
}

// success shows up as true/false as well as 1/0
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag
    {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)?
    {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0)  => Ok(false),
        Flag::Int(1)  => Ok(true),
        Flag::Int(n)  => Err(serde::de::Error::custom(
            format!("success flag must be 0 or 1, got {}", n))),
    }
}

/// expedition id if the record carries one, position otherwise
fn locate(pos: usize, record: &serde_json::Value) -> String
{
    match record.get("id").and_then(|id| id.as_i64())
    {
        Some(id) => format!("expedition {}", id),
        None     => format!("expedition record #{}", pos + 1),
    }
}

/// insert all records; caller decides whether the store may be loaded
/// (see `load_if_empty`)
pub fn load(store: &mut Store, records: &[serde_json::Value])
    -> Result<LoadSummary>
{
    let mut summary = LoadSummary::default();
    let tx = store.conn_mut().transaction()?;

    {
        let mut ins_mnt = tx.prepare(&format!(
            "INSERT OR IGNORE INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            SQL_TABLEN_MNT, SQL_COLS_MNT))?;

        let mut ins_exp = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            SQL_TABLEN_EXP, SQL_COLS_EXP))?;

        // id left to the store
        let mut ins_clb = tx.prepare(&format!(
            "INSERT INTO {} (first_name, last_name, nationality,
                date_of_birth, expedition_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            SQL_TABLEN_CLB))?;

        for (pos, record) in records.iter().enumerate()
        {
            let location = locate(pos, record);

            let raw = RawExpedition::deserialize(record).map_err(|e| {
                let msg = e.to_string();
                let field = field_from_serde_msg(&msg)
                    .unwrap_or_else(|| "record".to_string());
                SummitError::parse(&location, field, msg)
            })?;

            let m = &raw.mountain;

            let country = m.countries.first().ok_or_else(|| {
                SummitError::parse(&location, "mountain.countries",
                                   "list is empty")
            })?;

            if m.height < m.prominence
            {
                return Err(SummitError::parse(&location, "mountain.prominence",
                    format!("prominence {} exceeds height {}",
                            m.prominence, m.height)));
            }

            summary.mountains += ins_mnt.execute(rusqlite::params![
                m.rank, m.name, country, m.height, m.prominence, m.range,
            ])?;

            let duration = parse_duration(&raw.duration).ok_or_else(|| {
                SummitError::parse(&location, "duration",
                    format!("expected <hours>H<minutes>, got {:?}",
                            raw.duration))
            })?;

            let date = parse_date(&raw.date, DATE_FMT_ISO).ok_or_else(|| {
                SummitError::parse(&location, "date",
                    format!("expected YYYY-MM-DD, got {:?}", raw.date))
            })?;

            ins_exp.execute(rusqlite::params![
                raw.id,
                raw.name,
                m.rank,
                raw.start,
                date,
                raw.country,
                duration,
                raw.success as i64,
            ])?;
            summary.expeditions += 1;

            for (cpos, c) in raw.climbers.iter().enumerate()
            {
                let dob = parse_date(&c.date_of_birth, DATE_FMT_DMY)
                    .ok_or_else(|| {
                        SummitError::parse(
                            format!("{}, climber #{}", location, cpos + 1),
                            "date_of_birth",
                            format!("expected DD-MM-YYYY, got {:?}",
                                    c.date_of_birth))
                    })?;

                ins_clb.execute(rusqlite::params![
                    c.first_name, c.last_name, c.nationality, dob, raw.id,
                ])?;
                summary.climbers += 1;
            }

            debug!(expedition = raw.id, climbers = raw.climbers.len(),
                   "expedition staged");
        }
    }

    tx.commit()?;

    info!(mountains = summary.mountains,
          expeditions = summary.expeditions,
          climbers = summary.climbers,
          "source loaded");

    Ok(summary)
}

/// parse a whole document (array of expedition records) and load it
pub fn load_str(store: &mut Store, json: &str) -> Result<LoadSummary>
{
    let records : Vec<serde_json::Value> = serde_json::from_str(json)?;
    load(store, &records)
}

pub fn load_file(store: &mut Store, path: impl AsRef<Path>)
    -> Result<LoadSummary>
{
    let path = path.as_ref();
    debug!(path = %path.display(), "reading source");
    load_str(store, &fs::read_to_string(path)?)
}

/// the guarded invocation: loads only while the store holds no climbers
pub fn load_if_empty(store: &mut Store, path: impl AsRef<Path>)
    -> Result<Option<LoadSummary>>
{
    if !store.is_empty()?
    {
        info!("store already populated, skipping load");
        return Ok(None);
    }

    load_file(store, path).map(Some)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::db::Repository;
    use crate::test;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixture_loads_completely()
    {
        let mut store = Store::open_in_memory().unwrap();
        let summary = load_str(&mut store, test::FIXTURE).unwrap();

        assert_eq!(summary, LoadSummary {
            mountains   : 4,
            expeditions : 9,
            climbers    : 18,
        });
        assert_eq!(store.row_count(SQL_TABLEN_MNT).unwrap(), 4);
        assert_eq!(store.row_count(SQL_TABLEN_EXP).unwrap(), 9);
        assert_eq!(store.row_count(SQL_TABLEN_CLB).unwrap(), 18);
    }

    #[test]
    fn fields_are_normalized()
    {
        let mut store = Store::open_in_memory().unwrap();
        test::populate_store(&mut store);

        // first element of countries
        let everest = store.mountain_by_rank(1).unwrap().unwrap();
        assert_eq!(everest.country, "Nepal");

        let e = store.expedition_by_id(104).unwrap().unwrap();
        assert_eq!(e.duration, 210 * 60 + 30);
        assert_eq!(e.date, NaiveDate::from_ymd_opt(1975, 5, 27).unwrap());
        assert!(e.success);

        // success given as 0
        assert!(!store.expedition_by_id(109).unwrap().unwrap().success);

        // DD-MM-YYYY stored as YYYY-MM-DD
        let dob : String = store.conn().query_row(
            "SELECT date_of_birth FROM climbers WHERE last_name = 'Tabei'",
            (), |row| row.get(0)).unwrap();
        assert_eq!(dob, "1939-09-22");
    }

    #[test]
    fn repeated_mountain_is_ignored()
    {
        let mut store = Store::open_in_memory().unwrap();
        let json = r#"[
            {"id": 1, "name": "a", "start": "s", "date": "2000-01-01",
             "country": "Nepal", "duration": "1H00", "success": true,
             "mountain": {"rank": 3, "name": "Kangchenjunga",
                          "countries": ["Nepal", "India"], "height": 8586,
                          "prominence": 3922, "range": "Kangchenjunga Himalaya"},
             "climbers": []},
            {"id": 2, "name": "b", "start": "s", "date": "2001-01-01",
             "country": "Nepal", "duration": "2H00", "success": false,
             "mountain": {"rank": 3, "name": "Kangchenjunga",
                          "countries": ["Nepal", "India"], "height": 8586,
                          "prominence": 3922, "range": "Kangchenjunga Himalaya"},
             "climbers": []}
        ]"#;

        let summary = load_str(&mut store, json).unwrap();
        assert_eq!(summary.mountains, 1);
        assert_eq!(summary.expeditions, 2);
    }

    #[test]
    fn bad_duration_rolls_back_everything()
    {
        let mut store = Store::open_in_memory().unwrap();
        let mut records : Vec<serde_json::Value> =
            serde_json::from_str(test::FIXTURE).unwrap();
        records[5]["duration"] = serde_json::json!("twelve hours");

        let err = load(&mut store, &records).unwrap_err();
        match err
        {
            SummitError::Parse { location, field, .. } =>
            {
                assert_eq!(location, "expedition 106");
                assert_eq!(field, "duration");
            }
            other => panic!("unexpected error: {}", other),
        }

        assert_eq!(store.row_count(SQL_TABLEN_MNT).unwrap(), 0);
        assert_eq!(store.row_count(SQL_TABLEN_EXP).unwrap(), 0);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn bad_birth_date_names_climber()
    {
        let mut store = Store::open_in_memory().unwrap();
        let mut records : Vec<serde_json::Value> =
            serde_json::from_str(test::FIXTURE).unwrap();
        records[0]["climbers"][1]["date_of_birth"] =
            serde_json::json!("1970-01-01");

        match load(&mut store, &records).unwrap_err()
        {
            SummitError::Parse { location, field, .. } =>
            {
                assert_eq!(location, "expedition 101, climber #2");
                assert_eq!(field, "date_of_birth");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn missing_field_is_reported()
    {
        let mut store = Store::open_in_memory().unwrap();
        let mut records : Vec<serde_json::Value> =
            serde_json::from_str(test::FIXTURE).unwrap();
        records[2].as_object_mut().unwrap().remove("date");

        match load(&mut store, &records).unwrap_err()
        {
            SummitError::Parse { location, field, .. } =>
            {
                assert_eq!(location, "expedition 103");
                assert_eq!(field, "date");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn invalid_success_flag_is_rejected()
    {
        let mut store = Store::open_in_memory().unwrap();
        let mut records : Vec<serde_json::Value> =
            serde_json::from_str(test::FIXTURE).unwrap();
        records[0]["success"] = serde_json::json!(2);

        assert!(matches!(load(&mut store, &records),
                         Err(SummitError::Parse { .. })));
    }

    #[test]
    fn duplicate_expedition_id_fails()
    {
        let mut store = Store::open_in_memory().unwrap();
        let mut records : Vec<serde_json::Value> =
            serde_json::from_str(test::FIXTURE).unwrap();
        records[1]["id"] = serde_json::json!(101);

        assert!(matches!(load(&mut store, &records),
                         Err(SummitError::Store(_))));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn document_must_be_an_array()
    {
        let mut store = Store::open_in_memory().unwrap();
        assert!(matches!(load_str(&mut store, r#"{"id": 1}"#),
                         Err(SummitError::Json(_))));
    }

    #[test]
    fn load_if_empty_is_idempotent()
    {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("expeditions.json");
        std::fs::write(&source, test::FIXTURE).unwrap();

        let mut store = Store::open_in_memory().unwrap();

        let first = load_if_empty(&mut store, &source).unwrap();
        assert_eq!(first.map(|s| s.climbers), Some(18));

        let second = load_if_empty(&mut store, &source).unwrap();
        assert_eq!(second, None);
        assert_eq!(store.row_count(SQL_TABLEN_CLB).unwrap(), 18);
    }

    #[test]
    fn missing_source_file_is_io_error()
    {
        let mut store = Store::open_in_memory().unwrap();
        assert!(matches!(
            load_file(&mut store, "/nonexistent/expeditions.json"),
            Err(SummitError::Io(_))
        ));
    }
}
