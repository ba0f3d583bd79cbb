use anyhow::Context;
use log::warn;
use serde::Deserialize;

use crate::error::EngineResult;
use crate::model::estimator::estimate_cumulative_deaths;

#[derive(Debug, Deserialize)]
struct DailyRow {
    date: Option<String>,
    new_cases: Option<f64>,
    #[serde(default)]
    new_deaths: Option<f64>,
}

/// Daily counts read from a local CSV, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub dates: Vec<String>,
    pub cases: Vec<u64>,
    /// Present only when the file has a `new_deaths` column.
    pub deaths: Option<Vec<u64>>,
    /// Cells whose value was rounded, floored at zero or discarded as non-finite.
    pub adjusted: usize,
}

impl DailySeries {
    /// `first..last` date label, for reporting.
    pub fn span(&self) -> String {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => format!("{}..{}", first, last),
            _ => String::new(),
        }
    }

    pub fn cumulative_deaths(&self) -> EngineResult<Option<u64>> {
        self.deaths.as_deref().map(estimate_cumulative_deaths).transpose()
    }
}

// Reporting feeds leave blanks and occasional negative corrections; both count as zero.
fn to_count(v: Option<f64>, row: usize, column: &str, adjusted: &mut usize) -> u64 {
    let Some(x) = v else { return 0 };
    let count = if x.is_finite() { x.max(0.0).round() as u64 } else { 0 };
    if count as f64 != x {
        warn!("row {}: {} value {} read as {}", row, column, x, count);
        *adjusted += 1;
    }
    count
}

/// Parse CSV with columns `date,new_cases[,new_deaths]`.
pub fn read_series_csv<R: std::io::Read>(rdr: R) -> anyhow::Result<DailySeries> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(rdr);
    let has_deaths = rdr.headers().context("reading CSV header")?.iter().any(|h| h == "new_deaths");

    let mut dates = Vec::new();
    let mut cases = Vec::new();
    let mut deaths = Vec::new();
    let mut adjusted = 0;
    for (line, result) in rdr.deserialize::<DailyRow>().enumerate() {
        let row = result.with_context(|| format!("malformed series row {}", line + 1))?;
        dates.push(row.date.unwrap_or_default());
        cases.push(to_count(row.new_cases, line + 1, "new_cases", &mut adjusted));
        deaths.push(to_count(row.new_deaths, line + 1, "new_deaths", &mut adjusted));
    }
    anyhow::ensure!(!cases.is_empty(), "series CSV has no rows");
    Ok(DailySeries { dates, cases, deaths: has_deaths.then_some(deaths), adjusted })
}

pub fn load_series_csv(path: &str) -> anyhow::Result<DailySeries> {
    let f = std::fs::File::open(path).with_context(|| format!("Failed to open series CSV: {}", path))?;
    read_series_csv(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cases_and_deaths() {
        let csv = "date,new_cases,new_deaths\n2021-01-01,3,0\n2021-01-02,,1\n2021-01-03,7.0,2\n";
        let s = read_series_csv(csv.as_bytes()).unwrap();
        assert_eq!(s.cases, vec![3, 0, 7]);
        assert_eq!(s.deaths, Some(vec![0, 1, 2]));
        assert_eq!(s.span(), "2021-01-01..2021-01-03");
        assert_eq!(s.adjusted, 0);
        assert_eq!(s.cumulative_deaths().unwrap(), Some(3));
    }

    #[test]
    fn counts_every_rewritten_cell() {
        let csv = "date,new_cases,new_deaths
2021-01-01,2.6,-1
2021-01-02,NaN,0
2021-01-03,5,0.5
";
        let s = read_series_csv(csv.as_bytes()).unwrap();
        assert_eq!(s.cases, vec![3, 0, 5]);
        assert_eq!(s.deaths, Some(vec![0, 0, 1]));
        assert_eq!(s.adjusted, 4);
    }

    #[test]
    fn deaths_column_is_optional() {
        let s = read_series_csv("date,new_cases\n2021-01-01,4\n2021-01-02,-2\n".as_bytes()).unwrap();
        assert_eq!(s.cases, vec![4, 0]);
        assert_eq!(s.adjusted, 1);
        assert!(s.deaths.is_none());
        assert_eq!(s.cumulative_deaths().unwrap(), None);
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(read_series_csv("date,new_cases\n".as_bytes()).is_err());
    }

    #[test]
    fn non_numeric_cases_are_an_error() {
        assert!(read_series_csv("date,new_cases\n2021-01-01,many\n".as_bytes()).is_err());
    }
}
