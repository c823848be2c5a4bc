//! Salon dashboard reporting: load a spreadsheet export, validate it against
//! a view's schema, and aggregate it into metrics and chart-ready series.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod text;
pub mod types;
pub mod util;
pub mod views;

pub use error::{LoadError, ReportError, SchemaViolation};
pub use loader::{CachedSource, CsvSource, DataSource};
pub use types::{Report, ReportState, Table};
pub use views::{build_report, ReportRequest, ViewKind};
