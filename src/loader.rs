use crate::error::LoadError;
use crate::types::{Cell, Table};
use csv::ReaderBuilder;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Anything that can hand the report engine a table for a source identifier.
pub trait DataSource {
    fn load(&self, source: &str) -> Result<Table, LoadError>;
}

/// Reads CSV exports from disk. Relative identifiers resolve against the
/// handle's base directory.
#[derive(Debug, Clone)]
pub struct CsvSource {
    base_dir: PathBuf,
}

impl CsvSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl DataSource for CsvSource {
    fn load(&self, source: &str) -> Result<Table, LoadError> {
        let path = self.resolve(source);
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(LoadError::Unsupported {
                location: source.to_string(),
            });
        }

        let file = std::fs::File::open(&path).map_err(|e| LoadError::Unreachable {
            location: path.display().to_string(),
            source: e,
        })?;
        let malformed = |e: csv::Error| LoadError::Malformed {
            location: path.display().to_string(),
            source: e,
        };

        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers: Vec<String> = rdr
            .headers()
            .map_err(malformed)?
            .iter()
            .map(str::to_string)
            .collect();
        let mut table = Table::new(headers);
        for record in rdr.records() {
            let record = record.map_err(malformed)?;
            table.push_row(record.iter().map(Cell::from_text).collect());
        }

        info!(
            source = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            "loaded table"
        );
        Ok(table)
    }
}

/// Memoizes successful loads by identifier for the lifetime of the handle.
pub struct CachedSource<S> {
    inner: S,
    cache: RefCell<HashMap<String, Table>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    fn load(&self, source: &str) -> Result<Table, LoadError> {
        if let Some(table) = self.cache.borrow().get(source) {
            debug!(source, "cache hit");
            return Ok(table.clone());
        }
        let table = self.inner.load(source)?;
        self.cache
            .borrow_mut()
            .insert(source.to_string(), table.clone());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as Counter;
    use std::io::Write;

    struct Counting {
        calls: Counter<usize>,
    }

    impl DataSource for Counting {
        fn load(&self, _source: &str) -> Result<Table, LoadError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Table::new(vec!["A".into()]))
        }
    }

    #[test]
    fn reads_csv_with_blank_cells_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("s.csv")).unwrap();
        writeln!(f, " Name ,Score").unwrap();
        writeln!(f, "Ana,").unwrap();
        writeln!(f, "Ben,7,extra").unwrap();
        drop(f);

        let table = CsvSource::new(dir.path()).load("s.csv").unwrap();
        assert_eq!(table.columns, vec![" Name ".to_string(), "Score".to_string()]);
        assert_eq!(table.rows[0], vec![Cell::Text("Ana".into()), Cell::Missing]);
        assert_eq!(
            table.rows[1],
            vec![Cell::Text("Ben".into()), Cell::Text("7".into())]
        );
    }

    #[test]
    fn missing_file_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvSource::new(dir.path()).load("nope.csv").unwrap_err();
        assert!(matches!(err, LoadError::Unreachable { .. }));
    }

    #[test]
    fn invalid_utf8_row_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bad.csv"),
            b"Name,Score\nAna,1\nB\xff\xfe,2\n".as_slice(),
        )
        .unwrap();
        let err = CsvSource::new(dir.path()).load("bad.csv").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }), "{err:?}");
        assert!(err.to_string().starts_with("malformed data in"));
    }

    #[test]
    fn non_csv_is_unsupported() {
        let err = CsvSource::new(".").load("sheet.xlsx").unwrap_err();
        assert!(matches!(err, LoadError::Unsupported { .. }));
    }

    #[test]
    fn cache_loads_each_source_once() {
        let cached = CachedSource::new(Counting {
            calls: Counter::new(0),
        });
        cached.load("a.csv").unwrap();
        cached.load("a.csv").unwrap();
        cached.load("b.csv").unwrap();
        assert_eq!(cached.inner.calls.get(), 2);
        cached.clear();
        cached.load("a.csv").unwrap();
        assert_eq!(cached.into_inner().calls.get(), 3);
    }
}
