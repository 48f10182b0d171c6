use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::{IPO_YEAR, YEAR_FOUNDED};

fn whole_year(name: &str) -> Expr {
    col(name)
        .is_not_nan()
        .and((col(name) % lit(1.0)).eq(lit(0.0)))
        .and(col(name).gt_eq(lit(i32::MIN as f64)))
        .and(col(name).lt_eq(lit(i32::MAX as f64)))
}

/// Coerces both year columns to numbers and drops rows where either is
/// missing, NaN, fractional or out of `Int32` range. Survivors are cast to
/// `Int32` and rows that went public before they were founded are removed.
pub fn clean(df: DataFrame) -> Result<DataFrame> {
    for name in [YEAR_FOUNDED, IPO_YEAR] {
        if df.column(name).is_err() {
            return Err(PipelineError::MissingColumn(name.to_string()).into());
        }
    }

    let raw_rows = df.height();

    let df = df
        .lazy()
        .with_columns([
            col(IPO_YEAR).cast(DataType::Float64),
            col(YEAR_FOUNDED).cast(DataType::Float64),
        ])
        .drop_nulls(Some(vec![col(IPO_YEAR), col(YEAR_FOUNDED)]))
        .filter(whole_year(IPO_YEAR).and(whole_year(YEAR_FOUNDED)))
        .with_columns([
            col(IPO_YEAR).cast(DataType::Int32),
            col(YEAR_FOUNDED).cast(DataType::Int32),
        ])
        .drop_nulls(Some(vec![col(IPO_YEAR), col(YEAR_FOUNDED)]))
        .collect()
        .context("could not coerce year columns")?;

    let typed_rows = df.height();
    debug!(dropped = raw_rows - typed_rows, "dropped rows without a usable year");

    let df = df
        .lazy()
        .filter(col(IPO_YEAR).gt_eq(col(YEAR_FOUNDED)))
        .collect()
        .context("could not filter ipo before founding")?;

    info!(
        rows = df.height(),
        dropped = raw_rows - df.height(),
        "cleaned dataset"
    );

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_csv_bytes;
    use rand::Rng;

    fn years(df: &DataFrame, name: &str) -> Vec<i32> {
        df.column(name)
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_clean_drops_invalid_rows() {
        let df = df!(
            "Company" => &["a", "b", "c", "d", "e"],
            "Year Founded" => &["2000", "2010", "n/a", "1999", "2001"],
            "IPO Year" => &["2005", "2005", "2004", "", "2001"],
        )
        .unwrap();

        let res = clean(df).unwrap();
        assert_eq!(res.shape(), (2, 3));

        let companies: Vec<&str> = res
            .column("Company")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(companies, vec!["a", "e"]);
        assert_eq!(res.column(IPO_YEAR).unwrap().dtype(), &DataType::Int32);
        assert_eq!(years(&res, YEAR_FOUNDED), vec![2000, 2001]);
    }

    #[test]
    fn test_clean_drops_nan_years() {
        let data = "Company,Year Founded,IPO Year\n\
            a,2000,2005\n\
            b,NaN,2006\n\
            c,2001,NaN\n\
            d,2002,2004\n";
        let df = read_csv_bytes(data.as_bytes().to_vec()).unwrap();

        let res = clean(df).unwrap();
        assert_eq!(years(&res, YEAR_FOUNDED), vec![2000, 2002]);
        assert_eq!(years(&res, IPO_YEAR), vec![2005, 2004]);
    }

    #[test]
    fn test_clean_drops_fractional_and_huge_years() {
        let df = df!(
            "Year Founded" => &[2000.0, 2000.5, 1999.0, 2001.0, f64::INFINITY],
            "IPO Year" => &[2003.0, 2004.0, 1e12, 2004.25, 2010.0],
        )
        .unwrap();

        let res = clean(df).unwrap();
        assert_eq!(years(&res, YEAR_FOUNDED), vec![2000]);
        assert_eq!(years(&res, IPO_YEAR), vec![2003]);
    }

    #[test]
    fn test_clean_missing_column() {
        let df = df!(
            "Company" => &["a"],
            "Year Founded" => &[2000],
        )
        .unwrap();

        let err = clean(df).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingColumn(name)) if name == "IPO Year"
        ));
    }

    #[test]
    fn test_clean_invariant_random() {
        let mut rng = rand::thread_rng();
        let n = 500;

        let founded = (0..n)
            .map(|_| {
                if rng.gen_bool(0.1) {
                    None
                } else {
                    Some(rng.gen_range(1970..2020))
                }
            })
            .collect::<Vec<Option<i32>>>();
        let ipo = (0..n)
            .map(|_| {
                if rng.gen_bool(0.1) {
                    None
                } else {
                    Some(rng.gen_range(1970..2025))
                }
            })
            .collect::<Vec<Option<i32>>>();

        let df = df!(
            "Year Founded" => founded,
            "IPO Year" => ipo,
        )
        .unwrap();

        let res = clean(df).unwrap();
        let founded = res.column(YEAR_FOUNDED).unwrap().i32().unwrap();
        let ipo = res.column(IPO_YEAR).unwrap().i32().unwrap();
        assert_eq!(founded.null_count(), 0);
        assert_eq!(ipo.null_count(), 0);

        for (f, i) in founded.into_no_null_iter().zip(ipo.into_no_null_iter()) {
            assert!(i >= f, "ipo {i} before founding {f}");
        }
    }
}
