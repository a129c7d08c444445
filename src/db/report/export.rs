//! csv projection of query results;
//! the reporter decides what rows go out, this only writes them

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::db::helpers::DATE_FMT_ISO;
use crate::entity::{Climber, Expedition, Mountain};
use crate::error::Result;

/// an entity that can be written as one csv line
pub trait CsvRecord
{
    const HEADER : &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

impl CsvRecord for Mountain
{
    const HEADER : &'static [&'static str] =
        &["rank", "name", "country", "height", "prominence", "range"];

    fn fields(&self) -> Vec<String>
    {
        vec![
            self.rank.to_string(),
            self.name.clone(),
            self.country.clone(),
            self.height.to_string(),
            self.prominence.to_string(),
            self.range.clone(),
        ]
    }
}

impl CsvRecord for Expedition
{
    const HEADER : &'static [&'static str] = &[
        "id", "name", "mountain_id", "start", "date", "country",
        "duration", "success",
    ];

    fn fields(&self) -> Vec<String>
    {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.mountain_id.to_string(),
            self.start.clone(),
            self.date.format(DATE_FMT_ISO).to_string(),
            self.country.clone(),
            self.duration.to_string(),
            self.success.to_string(),
        ]
    }
}

impl CsvRecord for Climber
{
    const HEADER : &'static [&'static str] = &[
        "id", "first_name", "last_name", "nationality", "date_of_birth",
        "expedition_id",
    ];

    fn fields(&self) -> Vec<String>
    {
        vec![
            self.id.to_string(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.nationality.clone(),
            self.date_of_birth.format(DATE_FMT_ISO).to_string(),
            self.expedition_id.to_string(),
        ]
    }
}

/// quote a field per RFC 4180: enclosed in double quotes if it contains
/// comma, double quote or line break; inner quotes doubled
pub fn csv_quote(s: &str) -> String
{
    if s.contains([',', '"', '\n', '\r'])
    {
        format!("\"{}\"", s.replace('"', "\"\""))
    }
    else
    {
        s.to_string()
    }
}

fn csv_line(fields: &[String]) -> String
{
    let mut line = fields
        .iter()
        .map(|f| csv_quote(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// header plus one line per record
pub fn to_csv<T: CsvRecord>(records: &[T]) -> String
{
    let header : Vec<String> = T::HEADER.iter().map(|h| h.to_string()).collect();
    let mut out = csv_line(&header);

    for record in records
    {
        out.push_str(&csv_line(&record.fields()));
    }

    out
}

/// keep a user-supplied name a single path component inside the export dir
pub fn sanitize_filename(name: &str) -> String
{
    let name = name
        .chars()
        .map(|c| match c
        {
            '/' | '\\' => '-',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .replace("..", "_");

    match name.trim()
    {
        "" => "_".to_string(),
        _  => name,
    }
}

/// write records to `dir/filename` (name sanitized), returns the full path
pub fn write_csv<T: CsvRecord>(dir: &Path, filename: &str, records: &[T])
    -> Result<PathBuf>
{
    fs::create_dir_all(dir)?;
    let path = dir.join(sanitize_filename(filename));
    fs::write(&path, to_csv(records))?;

    info!(path = %path.display(), rows = records.len(), "csv exported");

    Ok(path)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_quote_works()
    {
        assert_eq!(csv_quote("Nepal"), "Nepal");
        assert_eq!(csv_quote("Baltoro, Karakoram"), "\"Baltoro, Karakoram\"");
        assert_eq!(csv_quote("the \"Savage\""), "\"the \"\"Savage\"\"\"");
        assert_eq!(csv_quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn mountains_to_csv()
    {
        let mountains = vec![
            Mountain::new(2, "K2", "Pakistan", 8611, 4020, "Baltoro, Karakoram"),
            Mountain::new(33, "Molamenqing", "China", 7703, 433,
                          "Langtang Himalaya"),
        ];

        assert_eq!(
            to_csv(&mountains),
            "rank,name,country,height,prominence,range\n\
             2,K2,Pakistan,8611,4020,\"Baltoro, Karakoram\"\n\
             33,Molamenqing,China,7703,433,Langtang Himalaya\n"
        );
    }

    #[test]
    fn climbers_to_csv()
    {
        let climbers = vec![Climber::new(
            7, "Ang", "Tsering", "Nepal",
            NaiveDate::from_ymd_opt(1950, 10, 10).unwrap(), 104)];

        assert_eq!(
            to_csv(&climbers),
            "id,first_name,last_name,nationality,date_of_birth,expedition_id\n\
             7,Ang,Tsering,Nepal,1950-10-10,104\n"
        );
    }

    #[test]
    fn empty_result_still_has_header()
    {
        let none : Vec<Expedition> = Vec::new();
        assert_eq!(
            to_csv(&none),
            "id,name,mountain_id,start,date,country,duration,success\n"
        );
    }

    #[test]
    fn write_csv_creates_file()
    {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let mountains = vec![Mountain::new(1, "Mount Everest", "Nepal", 8848,
                                           8848, "Mahalangur Himalaya")];

        let path = write_csv(&target, "out.csv", &mountains).unwrap();

        assert_eq!(path, target.join("out.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), to_csv(&mountains));
    }

    #[test]
    fn sanitize_filename_strips_separators()
    {
        assert_eq!(sanitize_filename("Mountains in country Nepal.csv"),
                   "Mountains in country Nepal.csv");
        assert_eq!(sanitize_filename("Nepal/India.csv"), "Nepal-India.csv");
        assert_eq!(sanitize_filename("a\\b.csv"), "a-b.csv");
        assert_eq!(sanitize_filename("../../etc/passwd"), "_-_-etc-passwd");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
        assert_eq!(sanitize_filename(".."), "_");
        assert_eq!(sanitize_filename(""), "_");
    }

    #[test]
    fn write_csv_stays_in_dir()
    {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let none : Vec<Mountain> = Vec::new();

        let path = write_csv(&target, "../escaped.csv", &none).unwrap();

        assert_eq!(path.parent().unwrap(), target.as_path());
        assert!(path.exists());
        assert!(!dir.path().join("escaped.csv").exists());
    }
}
