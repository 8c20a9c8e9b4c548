//! Sentinel-to-missing translation.
//!
//! Only columns that declare a fill sentinel are touched. A value equal to a
//! sentinel in any other column passes through unchanged.

use crate::error::Result;
use crate::schema::{ColumnRegistry, FillValue};

use polars::prelude::*;
use tracing::debug;

/// Replace fill sentinels with nulls in every column that declares one.
///
/// Row count and column order are preserved. Applying it twice yields the
/// same frame as applying it once.
pub fn clean_sentinels(df: DataFrame, registry: &ColumnRegistry) -> Result<DataFrame> {
    let expressions: Vec<Expr> = registry
        .columns()
        .iter()
        .filter(|spec| df.get_column_index(&spec.name).is_some())
        .filter_map(|spec| spec.fill.map(|fill| null_sentinel(&spec.name, fill, spec.kind.dtype())))
        .collect();

    if expressions.is_empty() {
        return Ok(df);
    }

    debug!("Nulling fill sentinels in {} columns", expressions.len());
    Ok(df.lazy().with_columns(expressions).collect()?)
}

fn null_sentinel(name: &str, fill: FillValue, dtype: DataType) -> Expr {
    let sentinel = match fill {
        FillValue::Float(value) => lit(value),
        FillValue::Byte(value) => lit(value),
    };

    when(col(name).eq(sentinel))
        .then(lit(NULL).cast(dtype))
        .otherwise(col(name))
        .alias(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExtractionSchema, VariableSet};

    fn registry() -> ColumnRegistry {
        let top = VariableSet::new(
            ["predictor_limit_flag", "beam"],
            ["agbd", "elev_lowestmode"],
            Vec::<String>::new(),
        )
        .unwrap()
        .with_float_fill(["agbd"], -9999.0)
        .unwrap()
        .with_byte_fill(["predictor_limit_flag"], 255)
        .unwrap();
        ColumnRegistry::build(&ExtractionSchema::new(top)).unwrap()
    }

    fn frame() -> DataFrame {
        df!(
            "agbd" => [Some(100.0), Some(-9999.0), None],
            "beam" => [Some(255i64), Some(5), Some(5)],
            "elev_lowestmode" => [Some(-9999.0), Some(12.0), Some(13.0)],
            "predictor_limit_flag" => [Some(255i64), Some(254), Some(0)],
        )
        .unwrap()
    }

    #[test]
    fn test_float_sentinel_nulled_in_listed_column() {
        let cleaned = clean_sentinels(frame(), &registry()).unwrap();
        let agbd = cleaned.column("agbd").unwrap().as_materialized_series().clone();
        let agbd = agbd.f64().unwrap();

        assert_eq!(agbd.get(0), Some(100.0));
        assert_eq!(agbd.get(1), None);
        assert_eq!(agbd.get(2), None);
        assert_eq!(cleaned.height(), 3);
    }

    #[test]
    fn test_byte_sentinel_boundary() {
        let cleaned = clean_sentinels(frame(), &registry()).unwrap();
        let flags = cleaned
            .column("predictor_limit_flag")
            .unwrap()
            .as_materialized_series()
            .clone();
        let flags = flags.i64().unwrap();

        assert_eq!(flags.get(0), None);
        assert_eq!(flags.get(1), Some(254));
        assert_eq!(flags.get(2), Some(0));
    }

    #[test]
    fn test_unlisted_columns_untouched() {
        let cleaned = clean_sentinels(frame(), &registry()).unwrap();

        let elev = cleaned.column("elev_lowestmode").unwrap().as_materialized_series().clone();
        assert_eq!(elev.f64().unwrap().get(0), Some(-9999.0));

        let beam = cleaned.column("beam").unwrap().as_materialized_series().clone();
        assert_eq!(beam.i64().unwrap().get(0), Some(255));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let once = clean_sentinels(frame(), &registry()).unwrap();
        let twice = clean_sentinels(once.clone(), &registry()).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_column_order_preserved() {
        let cleaned = clean_sentinels(frame(), &registry()).unwrap();
        let names: Vec<String> = cleaned.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["agbd", "beam", "elev_lowestmode", "predictor_limit_flag"]);
    }
}
