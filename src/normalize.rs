// Table normalizer: trims headers, checks the schema, types declared columns.
use crate::error::SchemaViolation;
use crate::types::{Cell, Column, ColumnData, ColumnType, NormalizedTable, Schema, Table};
use crate::util::{display_number, parse_f64_safe, parse_timestamp_safe};
use tracing::debug;

/// Validate `table` against `schema` and coerce declared columns.
///
/// Every missing required column is reported in one `SchemaViolation`.
/// Unparsable numeric or timestamp cells become `None`; they are counted in
/// `coercion_gaps` but never fail the call.
pub fn normalize(table: &Table, schema: &Schema) -> Result<NormalizedTable, SchemaViolation> {
    let names: Vec<String> = table.columns.iter().map(|c| c.trim().to_string()).collect();

    let missing: Vec<String> = schema
        .columns
        .iter()
        .filter(|spec| spec.required && !names.iter().any(|n| n == spec.name))
        .map(|spec| spec.name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaViolation { missing });
    }

    let mut coercion_gaps = 0usize;
    let mut columns = Vec::with_capacity(names.len());
    for (idx, name) in names.into_iter().enumerate() {
        // Duplicate headers after trimming: first one wins.
        if columns.iter().any(|c: &Column| c.name == name) {
            debug!(column = %name, "duplicate column ignored");
            continue;
        }
        let cells = table.rows.iter().map(|row| &row[idx]);
        let column_type = schema.spec(&name).map(|s| s.column_type);
        let data = match column_type {
            Some(t) if t.is_numeric() => {
                let values: Vec<Option<f64>> = cells.map(coerce_number).collect();
                coercion_gaps += count_gaps(table, idx, &values);
                ColumnData::Numeric(values)
            }
            Some(ColumnType::Timestamp) => {
                let values: Vec<_> = cells
                    .map(|cell| match cell {
                        Cell::Text(s) => parse_timestamp_safe(Some(s)),
                        _ => None,
                    })
                    .collect();
                coercion_gaps += count_gaps(table, idx, &values);
                ColumnData::Timestamp(values)
            }
            _ => ColumnData::Text(cells.map(coerce_text).collect()),
        };
        columns.push(Column { name, data });
    }

    if coercion_gaps > 0 {
        debug!(coercion_gaps, "cells could not be coerced and count as empty");
    }
    Ok(NormalizedTable {
        columns,
        rows: table.len(),
        coercion_gaps,
    })
}

fn coerce_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => parse_f64_safe(Some(s)),
        _ => None,
    }
}

fn coerce_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Cell::Number(n) => Some(display_number(*n)),
        Cell::Missing => None,
    }
}

// Cells that held something but came out as `None`.
fn count_gaps<T>(table: &Table, idx: usize, values: &[Option<T>]) -> usize {
    table
        .rows
        .iter()
        .zip(values)
        .filter(|(row, v)| v.is_none() && row[idx] != Cell::Missing)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnSpec;
    use chrono::NaiveDate;

    const SCHEMA: &[ColumnSpec] = &[
        ColumnSpec {
            name: "Date",
            column_type: ColumnType::Timestamp,
            required: true,
        },
        ColumnSpec {
            name: "Revenue",
            column_type: ColumnType::Currency,
            required: true,
        },
        ColumnSpec {
            name: "Expenses",
            column_type: ColumnType::Currency,
            required: true,
        },
        ColumnSpec {
            name: "Service",
            column_type: ColumnType::Category,
            required: false,
        },
    ];

    #[test]
    fn reports_every_missing_required_column() {
        let table = Table::from_records(vec![vec![("Date", Cell::from("2024-01-01"))]]);
        let err = normalize(&table, &Schema::new(SCHEMA)).unwrap_err();
        assert_eq!(err.missing, vec!["Revenue".to_string(), "Expenses".to_string()]);
        assert_eq!(
            err.to_string(),
            "missing required columns: Revenue, Expenses"
        );
    }

    #[test]
    fn trims_headers_and_coerces_declared_columns() {
        let table = Table::from_records(vec![
            vec![
                (" Date ", Cell::from("2024-01-02")),
                ("Revenue ", Cell::from("$1,200")),
                ("Expenses", Cell::from(300.0)),
                ("Notes", Cell::from(5.0)),
            ],
            vec![
                (" Date ", Cell::from("not a date")),
                ("Revenue ", Cell::from("oops")),
                ("Expenses", Cell::Missing),
                ("Notes", Cell::from(" hi ")),
            ],
        ]);
        let norm = normalize(&table, &Schema::new(SCHEMA)).unwrap();
        assert_eq!(norm.rows, 2);
        assert_eq!(norm.numeric("Revenue"), Some(&[Some(1200.0), None][..]));
        assert_eq!(norm.numeric("Expenses"), Some(&[Some(300.0), None][..]));
        assert_eq!(
            norm.timestamps("Date").unwrap()[0].map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(
            norm.text("Notes"),
            Some(&[Some("5".to_string()), Some("hi".to_string())][..])
        );
        // "not a date" and "oops"; the missing expense is not a gap.
        assert_eq!(norm.coercion_gaps, 2);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let table = Table::from_records(vec![vec![
            ("Date", Cell::from("2024-01-01")),
            ("Revenue", Cell::from("1")),
            ("Expenses", Cell::from("1")),
        ]]);
        let norm = normalize(&table, &Schema::new(SCHEMA)).unwrap();
        assert!(norm.column("Service").is_none());
    }
}
