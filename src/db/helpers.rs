use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Row};

use crate::entity::{Climber, Expedition, Mountain};

// "<hours>H<minutes>"; ':' accepted as separator as well
static DURATION_RE : LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*[Hh:]\s*(\d+)\s*$").expect("duration regex")
});

static WHITESPACE_RE : LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s{2,}").expect("whitespace regex")
});

// serde_json reports missing struct fields as "missing field `name`"
static MISSING_FIELD_RE : LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:missing|unknown) field `([^`]+)`").expect("field regex")
});

pub const DATE_FMT_ISO : &str = "%Y-%m-%d";
pub const DATE_FMT_DMY : &str = "%d-%m-%Y";

// helper function to clean a sql query
pub fn clean(input : &str) -> String
{
    let s = input.replace("\n", " ").replace("\t", " ");
    WHITESPACE_RE.replace_all(&s, " ").to_string()
}

// helper function to round a float to two digits after decimal point
pub fn round2(f : f64) -> f64
{
    (f * 100.).round() / 100.
}

/// "5H30" -> 330; None if token doesn't match or overflows
pub fn parse_duration(token : &str) -> Option<u32>
{
    let caps = DURATION_RE.captures(token)?;
    let hours   : u32 = caps[1].parse().ok()?;
    let minutes : u32 = caps[2].parse().ok()?;

    hours.checked_mul(60)?.checked_add(minutes)
}

pub fn parse_date(s : &str, fmt : &str) -> Option<NaiveDate>
{
    NaiveDate::parse_from_str(s.trim(), fmt).ok()
}

/// field name from a serde error message, if it names one
pub fn field_from_serde_msg(msg : &str) -> Option<String>
{
    MISSING_FIELD_RE
        .captures(msg)
        .map(|caps| caps[1].to_string())
}

// sqlite's own LOWER() folds ASCII only
pub const SQL_FN_LOWER : &str = "unicode_lower";

/// register scalar functions the queries rely on; per connection
pub fn register_functions(conn : &Connection) -> rusqlite::Result<()>
{
    conn.create_scalar_function(
        SQL_FN_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let s : Option<String> = ctx.get(0)?;
            Ok(s.map(|s| s.to_lowercase()))
        })
}

/*
 * row mappers; expect columns in the order of SQL_COLS_* (see queries.rs)
 */

pub fn mountain_from_row(row : &Row<'_>) -> rusqlite::Result<Mountain>
{
    Ok(Mountain {
        rank: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        height: row.get(3)?,
        prominence: row.get(4)?,
        range: row.get(5)?,
    })
}

pub fn expedition_from_row(row : &Row<'_>) -> rusqlite::Result<Expedition>
{
    // stored as 0/1, bool at the entity boundary
    let success : i64 = row.get(7)?;

    Ok(Expedition {
        id: row.get(0)?,
        name: row.get(1)?,
        mountain_id: row.get(2)?,
        start: row.get(3)?,
        date: row.get(4)?,
        country: row.get(5)?,
        duration: row.get(6)?,
        success: success != 0,
    })
}

pub fn climber_from_row(row : &Row<'_>) -> rusqlite::Result<Climber>
{
    Ok(Climber {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        nationality: row.get(3)?,
        date_of_birth: row.get(4)?,
        expedition_id: row.get(5)?,
    })
}
