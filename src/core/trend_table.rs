//! Term-keyed table of interest series sharing one date index.

use crate::core::TimeSeries;
use crate::error::{LifetimeError, Result};
use chrono::{DateTime, Utc};

/// Interest series for many terms: one column per term, one row per date.
///
/// Merging a series outer-joins the date index (cells absent on either side
/// become missing). Re-inserting a term replaces its column in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendTable {
    index: Vec<DateTime<Utc>>,
    columns: Vec<(String, Vec<f64>)>,
}

impl TrendTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table over a fixed index with no columns yet.
    pub fn with_index(index: Vec<DateTime<Utc>>) -> Result<Self> {
        if index.windows(2).any(|w| w[1] <= w[0]) {
            return Err(LifetimeError::TimestampError(
                "table index must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    /// Shared date index, strictly increasing.
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no terms.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Terms in column order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(t, _)| t.as_str())
    }

    /// Whether `term` has a column.
    pub fn contains(&self, term: &str) -> bool {
        self.columns.iter().any(|(t, _)| t == term)
    }

    /// Add a column aligned to the current index.
    pub fn insert_column(&mut self, term: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.index.len() {
            return Err(LifetimeError::DimensionMismatch {
                expected: self.index.len(),
                got: values.len(),
            });
        }
        self.put(term.into(), values);
        Ok(())
    }

    /// Merge a named series, outer-joining the date index.
    pub fn insert_series(&mut self, series: &TimeSeries) -> Result<()> {
        let term = series.term().ok_or_else(|| {
            LifetimeError::InvalidParameter("series must carry a term to join a table".to_string())
        })?;

        let merged = union_sorted(&self.index, series.timestamps());
        if merged.len() != self.index.len() {
            for (_, values) in self.columns.iter_mut() {
                *values = reindex(&self.index, values, &merged);
            }
            self.index = merged;
        }

        let values = reindex(series.timestamps(), series.values(), &self.index);
        self.put(term.to_string(), values);
        Ok(())
    }

    /// Series for `term` over the full table index.
    ///
    /// Cells the term never observed stay missing (NaN) and are zero-filled
    /// by preprocessing, so every term shares the table's length and dates.
    pub fn series(&self, term: &str) -> Result<TimeSeries> {
        let (name, values) = self
            .columns
            .iter()
            .find(|(t, _)| t == term)
            .ok_or_else(|| LifetimeError::InvalidParameter(format!("unknown term '{}'", term)))?;

        TimeSeries::new(self.index.clone(), values.clone(), Some(name.clone()))
    }

    /// Every term's series in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Result<TimeSeries>)> + '_ {
        self.columns
            .iter()
            .map(move |(t, _)| (t.as_str(), self.series(t)))
    }

    fn put(&mut self, term: String, values: Vec<f64>) {
        match self.columns.iter_mut().find(|(t, _)| *t == term) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((term, values)),
        }
    }
}

fn union_sorted(a: &[DateTime<Utc>], b: &[DateTime<Utc>]) -> Vec<DateTime<Utc>> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            out.push(a[i]);
            i += 1;
        } else if b[j] < a[i] {
            out.push(b[j]);
            j += 1;
        } else {
            out.push(a[i]);
            i += 1;
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

fn reindex(from: &[DateTime<Utc>], values: &[f64], to: &[DateTime<Utc>]) -> Vec<f64> {
    to.iter()
        .map(|t| match from.binary_search(t) {
            Ok(i) => values[i],
            Err(_) => f64::NAN,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Preprocessor;
    use chrono::NaiveDate;

    fn named(start: (i32, u32), values: Vec<f64>, term: &str) -> TimeSeries {
        TimeSeries::monthly(NaiveDate::from_ymd_opt(start.0, start.1, 1).unwrap(), values)
            .unwrap()
            .with_term(term)
    }

    #[test]
    fn outer_join_extends_the_index() {
        let mut table = TrendTable::new();
        table
            .insert_series(&named((2020, 1), vec![1.0, 2.0, 3.0], "킹받네"))
            .unwrap();
        table
            .insert_series(&named((2020, 3), vec![10.0, 20.0], "갓생"))
            .unwrap();

        assert_eq!(table.index().len(), 4);
        assert_eq!(table.terms().collect::<Vec<_>>(), vec!["킹받네", "갓생"]);

        let first = table.series("킹받네").unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(&first.values()[..3], &[1.0, 2.0, 3.0]);
        assert!(first.values()[3].is_nan());

        let second = table.series("갓생").unwrap();
        assert_eq!(second.len(), 4);
        assert_eq!(second.timestamps(), table.index());
        assert_eq!(&second.values()[2..], &[10.0, 20.0]);
        assert_eq!(second.term(), Some("갓생"));
    }

    #[test]
    fn reinserting_a_term_replaces_it() {
        let mut table = TrendTable::new();
        table.insert_series(&named((2020, 1), vec![1.0, 2.0], "a")).unwrap();
        table.insert_series(&named((2020, 1), vec![5.0, 6.0], "b")).unwrap();
        table.insert_series(&named((2020, 1), vec![9.0, 9.0], "a")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.terms().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.series("a").unwrap().values(), &[9.0, 9.0]);
    }

    fn monthly_index(len: usize) -> Vec<DateTime<Utc>> {
        TimeSeries::monthly(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), vec![0.0; len])
            .unwrap()
            .timestamps()
            .to_vec()
    }

    #[test]
    fn gaps_stay_missing_over_the_full_index() {
        let mut table = TrendTable::with_index(monthly_index(4)).unwrap();
        table
            .insert_column("x", vec![f64::NAN, 4.0, f64::NAN, 8.0])
            .unwrap();

        let series = table.series("x").unwrap();
        assert_eq!(series.len(), 4);
        assert!(series.values()[0].is_nan());
        assert!(series.values()[2].is_nan());
        assert!(table.insert_column("y", vec![1.0]).is_err());
    }

    #[test]
    fn leading_missing_cells_are_zero_filled_not_dropped() {
        let mut values = vec![f64::NAN; 15];
        values.extend(vec![50.0; 25]);
        let mut table = TrendTable::with_index(monthly_index(40)).unwrap();
        table.insert_column("w", values).unwrap();

        let series = table.series("w").unwrap();
        assert_eq!(series.len(), 40);
        assert_eq!(series.timestamps()[0], table.index()[0]);

        let filled = Preprocessor::default().fill_missing(&series);
        assert_eq!(&filled.values()[..15], &[0.0; 15]);
        assert_eq!(filled.values()[15], 50.0);
    }

    #[test]
    fn unnamed_series_and_unknown_terms_are_rejected() {
        let mut table = TrendTable::new();
        let unnamed =
            TimeSeries::monthly(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), vec![1.0]).unwrap();
        assert!(table.insert_series(&unnamed).is_err());
        assert!(table.series("nope").is_err());
    }
}
