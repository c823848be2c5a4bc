// Report views: which columns each view reads and how it aggregates them.
//
// Each view is a static schema plus a list of descriptors. `build_report`
// runs one loop over the descriptors; adding a chart means adding a line to
// the table, not another branch.
use crate::aggregate::{
    advise, distribution, growth_rate, multi_select_distribution, retention_rate, time_series,
    total, trend, week_over_week,
};
use crate::error::ReportError;
use crate::normalize::normalize;
use crate::text::word_frequency;
use crate::types::{
    Chart, ChartData, ColumnSpec, ColumnType, Granularity, Metric, MetricUnit, NormalizedTable,
    Report, ReportState, Schema, Table, WeekSignal,
};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ViewKind {
    #[default]
    #[value(name = "feedback")]
    #[serde(rename = "feedback")]
    CustomerFeedback,
    #[value(name = "financial")]
    #[serde(rename = "financial")]
    FinancialTracking,
}

impl ViewKind {
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::CustomerFeedback => "Customer Feedback",
            ViewKind::FinancialTracking => "Financial Tracking",
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            ViewKind::CustomerFeedback => Schema::new(FEEDBACK_SCHEMA),
            ViewKind::FinancialTracking => Schema::new(FINANCIAL_SCHEMA),
        }
    }

    pub fn descriptors(self) -> &'static [Descriptor] {
        match self {
            ViewKind::CustomerFeedback => FEEDBACK_VIEW,
            ViewKind::FinancialTracking => FINANCIAL_VIEW,
        }
    }
}

/// How a descriptor turns its column into report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Category distribution chart over whole cell values.
    Distribution,
    /// Category distribution over comma-separated options.
    MultiSelect,
    /// Top raw responses, plus a `"<name> Words"` word-frequency chart.
    FreeText,
    /// Sum of a numeric column as a metric.
    Total,
    /// `column` is returning customers; `new` is the new-customer column.
    Retention { new: &'static str },
    /// Numeric column summed per time bucket.
    Series { timestamp: &'static str },
    /// Current ISO week against the previous one, with optional growth metric.
    WeekOverWeek {
        timestamp: &'static str,
        growth_metric: Option<&'static str>,
        recommendation: &'static str,
        affirmation: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Metric, chart or signal name in the report.
    pub name: &'static str,
    pub column: &'static str,
    pub required: bool,
    pub aggregation: Aggregation,
}

pub const SATISFACTION: &str = "How satisfied are you with our services?";
pub const VISIT_FREQUENCY: &str = "How often do you visit a hair salon?";
pub const CHANNEL: &str = "How did you hear about us?";
pub const RECOMMEND: &str = "Would you recommend us to a friend?";
pub const AGE_GROUP: &str = "What is your age group?";
pub const GENDER: &str = "What is your gender?";
pub const SERVICES_USED: &str = "Which of our services have you used?";
pub const REQUESTED_SERVICES: &str = "Is there a service you wish we offered but currently don’t?";
pub const IMPROVEMENTS: &str = "What could we improve to enhance your experience?";

pub const DATE: &str = "Date";
pub const REVENUE: &str = "Total Revenue for the day ($)";
pub const EXPENSES: &str = "Total Expenses for the day ($)";
pub const NET_PROFIT: &str = "Net Profit for the day ($)";
pub const APPOINTMENTS: &str = "Number of Appointments";
pub const RETURNING: &str = "Number of Returning Customers";
pub const NEW_CUSTOMERS: &str = "Number of New Customers";
pub const PRODUCT_SALES: &str = "Product Sales for the day ($)";
pub const TOP_SERVICE: &str = "Top Selling Service";

const fn col(name: &'static str, column_type: ColumnType, required: bool) -> ColumnSpec {
    ColumnSpec {
        name,
        column_type,
        required,
    }
}

const FEEDBACK_SCHEMA: &[ColumnSpec] = &[
    col(SATISFACTION, ColumnType::Category, false),
    col(VISIT_FREQUENCY, ColumnType::Category, false),
    col(CHANNEL, ColumnType::Category, false),
    col(RECOMMEND, ColumnType::Category, false),
    col(AGE_GROUP, ColumnType::Category, false),
    col(GENDER, ColumnType::Category, false),
    col(SERVICES_USED, ColumnType::Category, false),
    col(REQUESTED_SERVICES, ColumnType::FreeText, false),
    col(IMPROVEMENTS, ColumnType::FreeText, false),
];

const FINANCIAL_SCHEMA: &[ColumnSpec] = &[
    col(DATE, ColumnType::Timestamp, true),
    col(REVENUE, ColumnType::Currency, true),
    col(EXPENSES, ColumnType::Currency, true),
    col(NET_PROFIT, ColumnType::Currency, true),
    col(APPOINTMENTS, ColumnType::Count, true),
    col(RETURNING, ColumnType::Count, true),
    col(NEW_CUSTOMERS, ColumnType::Count, true),
    col(PRODUCT_SALES, ColumnType::Currency, false),
    col(TOP_SERVICE, ColumnType::Category, false),
];

const fn chart(name: &'static str, column: &'static str, aggregation: Aggregation) -> Descriptor {
    Descriptor {
        name,
        column,
        required: false,
        aggregation,
    }
}

const FEEDBACK_VIEW: &[Descriptor] = &[
    chart("Satisfaction Distribution", SATISFACTION, Aggregation::Distribution),
    chart("Visit Frequency", VISIT_FREQUENCY, Aggregation::Distribution),
    chart("Marketing Channels", CHANNEL, Aggregation::Distribution),
    chart("Recommendation", RECOMMEND, Aggregation::Distribution),
    chart("Age Group", AGE_GROUP, Aggregation::Distribution),
    chart("Gender", GENDER, Aggregation::Distribution),
    chart("Services Used", SERVICES_USED, Aggregation::MultiSelect),
    chart("Requested Services", REQUESTED_SERVICES, Aggregation::FreeText),
    chart("Improvement Suggestions", IMPROVEMENTS, Aggregation::FreeText),
];

pub const REVENUE_GROWTH: &str = "Revenue Growth (%)";

const FINANCIAL_VIEW: &[Descriptor] = &[
    Descriptor {
        name: "Total Revenue",
        column: REVENUE,
        required: true,
        aggregation: Aggregation::Total,
    },
    Descriptor {
        name: "Total Expenses",
        column: EXPENSES,
        required: true,
        aggregation: Aggregation::Total,
    },
    Descriptor {
        name: "Net Profit",
        column: NET_PROFIT,
        required: true,
        aggregation: Aggregation::Total,
    },
    Descriptor {
        name: "Total Appointments",
        column: APPOINTMENTS,
        required: true,
        aggregation: Aggregation::Total,
    },
    Descriptor {
        name: "Total Sales",
        column: PRODUCT_SALES,
        required: false,
        aggregation: Aggregation::Total,
    },
    Descriptor {
        name: "Retention Rate (%)",
        column: RETURNING,
        required: true,
        aggregation: Aggregation::Retention { new: NEW_CUSTOMERS },
    },
    Descriptor {
        name: "Revenue",
        column: REVENUE,
        required: true,
        aggregation: Aggregation::WeekOverWeek {
            timestamp: DATE,
            growth_metric: Some(REVENUE_GROWTH),
            recommendation: "Revenue declined compared to last week. Consider a limited-time \
                promotion or reaching out to clients who have not booked recently.",
            affirmation: "Revenue is holding steady or growing compared to last week. Keep it up!",
        },
    },
    Descriptor {
        name: "Appointments",
        column: APPOINTMENTS,
        required: true,
        aggregation: Aggregation::WeekOverWeek {
            timestamp: DATE,
            growth_metric: None,
            recommendation: "Fewer appointments than last week. Consider sending booking \
                reminders or offering a referral discount.",
            affirmation: "Appointments are steady or up compared to last week.",
        },
    },
    Descriptor {
        name: "Revenue Over Time",
        column: REVENUE,
        required: true,
        aggregation: Aggregation::Series { timestamp: DATE },
    },
    chart("Sales Over Time", PRODUCT_SALES, Aggregation::Series { timestamp: DATE }),
    chart("Top Selling Services", TOP_SERVICE, Aggregation::Distribution),
];

/// Parameters of one report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub view: ViewKind,
    pub granularity: Granularity,
    pub top_responses: usize,
    pub top_words: usize,
    pub week_over_week: bool,
    /// Any date inside the week treated as "this week".
    pub as_of: NaiveDate,
}

impl ReportRequest {
    pub fn new(view: ViewKind, as_of: NaiveDate) -> Self {
        Self {
            view,
            granularity: Granularity::default(),
            top_responses: 5,
            top_words: 10,
            week_over_week: true,
            as_of,
        }
    }
}

/// Turn a loaded table into a report for the requested view.
///
/// An empty table yields an `EmptyTable` report without touching the schema.
/// Missing required columns abort with `ReportError::Schema`; missing
/// optional columns only mark their charts unavailable.
pub fn build_report(table: &Table, request: &ReportRequest) -> Result<Report, ReportError> {
    let view = request.view;
    if table.is_empty() {
        info!(view = view.title(), "no rows, nothing to report");
        return Ok(Report::empty(view));
    }

    let data = normalize(table, &view.schema())?;
    let mut report = Report {
        view,
        state: ReportState::Ready,
        responses: data.rows,
        metrics: Vec::new(),
        charts: Vec::new(),
        signals: Vec::new(),
    };
    if view == ViewKind::CustomerFeedback {
        report.metrics.push(Metric {
            name: "Total Responses".to_string(),
            value: data.rows as f64,
            unit: MetricUnit::Count,
        });
    }

    for d in view.descriptors() {
        apply(d, &data, request, &mut report);
    }

    info!(
        view = view.title(),
        rows = data.rows,
        metrics = report.metrics.len(),
        charts = report.charts.len(),
        "report built"
    );
    Ok(report)
}

fn apply(d: &Descriptor, data: &NormalizedTable, request: &ReportRequest, report: &mut Report) {
    match d.aggregation {
        Aggregation::Distribution | Aggregation::MultiSelect => {
            let Some(values) = data.text(d.column) else {
                unavailable(report, d.name, format!("column `{}` not present", d.column));
                return;
            };
            let present = values.iter().flatten().map(String::as_str);
            let counts = if d.aggregation == Aggregation::MultiSelect {
                multi_select_distribution(present)
            } else {
                distribution(present)
            };
            if counts.is_empty() {
                unavailable(report, d.name, "no responses".to_string());
                return;
            }
            report.charts.push(Chart {
                name: d.name.to_string(),
                data: ChartData::Categories(counts),
            });
        }
        Aggregation::FreeText => {
            let words_name = format!("{} Words", d.name);
            let Some(values) = data.text(d.column) else {
                let reason = format!("column `{}` not present", d.column);
                unavailable(report, d.name, reason.clone());
                unavailable(report, &words_name, reason);
                return;
            };
            let mut top = distribution(values.iter().flatten().map(String::as_str));
            top.truncate(request.top_responses);
            let mut words = word_frequency(values.iter().flatten().map(String::as_str));
            words.truncate(request.top_words);
            if top.is_empty() {
                unavailable(report, d.name, "no responses".to_string());
            } else {
                report.charts.push(Chart {
                    name: d.name.to_string(),
                    data: ChartData::Categories(top),
                });
            }
            if words.is_empty() {
                let reason = "no words left after removing stopwords".to_string();
                unavailable(report, &words_name, reason);
            } else {
                report.charts.push(Chart {
                    name: words_name,
                    data: ChartData::Words(words),
                });
            }
        }
        Aggregation::Total => match data.numeric(d.column) {
            Some(values) => report.metrics.push(Metric {
                name: d.name.to_string(),
                value: total(values),
                unit: request
                    .view
                    .schema()
                    .spec(d.column)
                    .map_or(MetricUnit::Currency, |s| s.column_type.into()),
            }),
            None => debug!(metric = d.name, column = d.column, "column absent, metric skipped"),
        },
        Aggregation::Retention { new } => {
            let (Some(returning), Some(new)) = (data.numeric(d.column), data.numeric(new)) else {
                debug!(metric = d.name, "customer columns absent, metric skipped");
                return;
            };
            report.metrics.push(Metric {
                name: d.name.to_string(),
                value: retention_rate(total(returning), total(new)),
                unit: MetricUnit::Percent,
            });
        }
        Aggregation::Series { timestamp } => {
            let (Some(stamps), Some(values)) = (data.timestamps(timestamp), data.numeric(d.column))
            else {
                unavailable(report, d.name, format!("column `{}` not present", d.column));
                return;
            };
            report.charts.push(Chart {
                name: d.name.to_string(),
                data: ChartData::Series(time_series(stamps, values, request.granularity)),
            });
        }
        Aggregation::WeekOverWeek {
            timestamp,
            growth_metric,
            recommendation,
            affirmation,
        } => {
            if !request.week_over_week {
                return;
            }
            let (Some(stamps), Some(values)) = (data.timestamps(timestamp), data.numeric(d.column))
            else {
                debug!(signal = d.name, "columns absent, signal skipped");
                return;
            };
            let (current, previous) = week_over_week(stamps, values, request.as_of);
            let t = trend(current, previous);
            if let Some(name) = growth_metric {
                report.metrics.push(Metric {
                    name: name.to_string(),
                    value: growth_rate(current, previous),
                    unit: MetricUnit::Percent,
                });
            }
            report.signals.push(WeekSignal {
                metric: d.name.to_string(),
                current,
                previous,
                trend: t,
                advice: advise(t, recommendation, affirmation),
            });
        }
    }
}

fn unavailable(report: &mut Report, name: &str, reason: String) {
    warn!(chart = name, %reason, "chart unavailable");
    report.charts.push(Chart {
        name: name.to_string(),
        data: ChartData::Unavailable { reason },
    });
}
