use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A single raw cell as delivered by a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// Build a cell from loaded text, mapping blank values to `Missing`.
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Missing
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::from_text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

/// Raw rows keyed by a shared header. Every row has exactly `columns.len()`
/// cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Missing` and dropping cells
    /// beyond the header width.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Missing);
        self.rows.push(cells);
    }

    /// Build a table from per-row `(column, cell)` pairs. The header is the
    /// union of all column names in first-seen order.
    pub fn from_records<K, I, R>(records: R) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Cell)>,
        R: IntoIterator<Item = I>,
    {
        let mut table = Table::default();
        let mut keyed: Vec<Vec<(usize, Cell)>> = Vec::new();
        for record in records {
            let mut row = Vec::new();
            for (name, cell) in record {
                let name = name.into();
                let idx = match table.column_index(&name) {
                    Some(i) => i,
                    None => {
                        table.columns.push(name);
                        table.columns.len() - 1
                    }
                };
                row.push((idx, cell));
            }
            keyed.push(row);
        }
        for row in keyed {
            let mut cells = vec![Cell::Missing; table.columns.len()];
            for (idx, cell) in row {
                cells[idx] = cell;
            }
            table.rows.push(cells);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Semantic type a schema declares for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Timestamp,
    Currency,
    Count,
    Category,
    FreeText,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Currency | ColumnType::Count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new(columns: &[ColumnSpec]) -> Self {
        Self {
            columns: columns.to_vec(),
        }
    }

    pub fn spec(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
    Timestamp(Vec<Option<NaiveDateTime>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Output of the normalizer: trimmed names, declared columns typed, every
/// column the same length as the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub columns: Vec<Column>,
    pub rows: usize,
    /// Cells in declared numeric/timestamp columns that failed to parse.
    pub coercion_gaps: usize,
}

impl NormalizedTable {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn text(&self, name: &str) -> Option<&[Option<String>]> {
        match &self.column(name)?.data {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match &self.column(name)?.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn timestamps(&self, name: &str) -> Option<&[Option<NaiveDateTime>]> {
        match &self.column(name)?.data {
            ColumnData::Timestamp(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct CategoryCount {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Start")]
    pub start: NaiveDate,
    #[serde(rename = "Value")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct WordCount {
    #[serde(rename = "Word")]
    #[tabled(rename = "Word")]
    pub word: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// What a metric counts, so it can be shown the right way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Count,
    Currency,
    Percent,
}

impl From<ColumnType> for MetricUnit {
    fn from(t: ColumnType) -> Self {
        match t {
            ColumnType::Count => MetricUnit::Count,
            _ => MetricUnit::Currency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    Categories(Vec<CategoryCount>),
    Series(Vec<SeriesPoint>),
    Words(Vec<WordCount>),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub name: String,
    pub data: ChartData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trend {
    Improved,
    Declined,
    FlatOrEqual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Advice {
    Recommendation(String),
    Affirmation(String),
}

impl Advice {
    pub fn text(&self) -> &str {
        match self {
            Advice::Recommendation(t) | Advice::Affirmation(t) => t,
        }
    }
}

/// Current ISO week against the one before it, for a single measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSignal {
    pub metric: String,
    pub current: f64,
    pub previous: f64,
    pub trend: Trend,
    pub advice: Advice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    Ready,
    EmptyTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub view: crate::views::ViewKind,
    pub state: ReportState,
    pub responses: usize,
    pub metrics: Vec<Metric>,
    pub charts: Vec<Chart>,
    pub signals: Vec<WeekSignal>,
}

impl Report {
    pub fn empty(view: crate::views::ViewKind) -> Self {
        Self {
            view,
            state: ReportState::EmptyTable,
            responses: 0,
            metrics: Vec::new(),
            charts: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }

    pub fn chart(&self, name: &str) -> Option<&ChartData> {
        self.charts.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    pub fn signal(&self, metric: &str) -> Option<&WeekSignal> {
        self.signals.iter().find(|s| s.metric == metric)
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct SignalRow {
    #[tabled(rename = "Measure")]
    pub metric: String,
    #[tabled(rename = "This Week")]
    pub current: String,
    #[tabled(rename = "Last Week")]
    pub previous: String,
    #[tabled(rename = "Trend")]
    pub trend: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct SeriesRow {
    #[tabled(rename = "Bucket")]
    pub bucket: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
