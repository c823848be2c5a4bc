use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use salon_report::types::{Advice, ChartData, Granularity, Trend};
use salon_report::views::REVENUE_GROWTH;
use salon_report::{
    build_report, CachedSource, CsvSource, DataSource, ReportError, ReportRequest, ReportState,
    ViewKind,
};
use std::io::Write;

fn fixtures() -> CsvSource {
    CsvSource::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

fn pairs(data: Option<&ChartData>) -> Vec<(String, usize)> {
    match data {
        Some(ChartData::Categories(c)) => c.iter().map(|c| (c.category.clone(), c.count)).collect(),
        other => panic!("expected categories, got {other:?}"),
    }
}

#[test]
fn feedback_fixture_report() {
    let table = fixtures().load("customer_feedback.csv").unwrap();
    let report = build_report(&table, &ReportRequest::new(ViewKind::CustomerFeedback, as_of())).unwrap();

    assert_eq!(report.state, ReportState::Ready);
    assert_eq!(report.metric("Total Responses"), Some(5.0));
    assert_eq!(
        pairs(report.chart("Satisfaction Distribution")),
        vec![
            ("Very Satisfied".to_string(), 3),
            ("Satisfied".to_string(), 1),
            ("Neutral".to_string(), 1),
        ]
    );
    assert_eq!(
        pairs(report.chart("Services Used")),
        vec![
            ("Haircut".to_string(), 4),
            ("Coloring".to_string(), 3),
            ("Braids".to_string(), 1),
            ("Treatment".to_string(), 1),
        ]
    );
    assert_eq!(
        pairs(report.chart("Requested Services")),
        vec![("Nails".to_string(), 3), ("Lash extensions".to_string(), 1)]
    );
    assert!(matches!(
        report.chart("Gender"),
        Some(ChartData::Unavailable { .. })
    ));
    match report.chart("Improvement Suggestions Words") {
        Some(ChartData::Words(words)) => {
            assert_eq!((words[0].word.as_str(), words[0].count), ("wait", 2));
            assert!(words.iter().all(|w| w.word != "the" && w.word != "on"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn financial_fixture_report() {
    let table = fixtures().load("salon_financials.csv").unwrap();
    let report =
        build_report(&table, &ReportRequest::new(ViewKind::FinancialTracking, as_of())).unwrap();

    assert_eq!(report.metric("Total Revenue"), Some(5300.0));
    assert_eq!(report.metric("Total Expenses"), Some(2400.0));
    assert_eq!(report.metric("Net Profit"), Some(2900.0));
    assert_eq!(report.metric("Total Appointments"), Some(54.0));
    // "n/a" in the sales column counts as zero.
    assert_eq!(report.metric("Total Sales"), Some(625.5));

    let retention = report.metric("Retention Rate (%)").unwrap();
    assert!((retention - 40.0 / 54.0 * 100.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&retention));

    match report.chart("Revenue Over Time") {
        Some(ChartData::Series(points)) => {
            let got: Vec<(&str, f64)> = points.iter().map(|p| (p.bucket.as_str(), p.value)).collect();
            assert_eq!(got, vec![("2024-W10", 2930.0), ("2024-W11", 2370.0)]);
            let sum: f64 = points.iter().map(|p| p.value).sum();
            assert_eq!(sum, report.metric("Total Revenue").unwrap());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        pairs(report.chart("Top Selling Services")),
        vec![
            ("Haircut".to_string(), 3),
            ("Coloring".to_string(), 2),
            ("Braids".to_string(), 1),
        ]
    );

    let revenue = report.signal("Revenue").unwrap();
    assert_eq!(revenue.trend, Trend::Declined);
    assert!(matches!(revenue.advice, Advice::Recommendation(_)));
    let growth = report.metric(REVENUE_GROWTH).unwrap();
    assert!((growth - (2370.0 - 2930.0) / 2930.0 * 100.0).abs() < 1e-9);
    assert_eq!(report.signal("Appointments").unwrap().trend, Trend::Declined);
}

#[test]
fn daily_granularity_keeps_one_bucket_per_day() {
    let table = fixtures().load("salon_financials.csv").unwrap();
    let mut request = ReportRequest::new(ViewKind::FinancialTracking, as_of());
    request.granularity = Granularity::Day;
    let report = build_report(&table, &request).unwrap();
    match report.chart("Revenue Over Time") {
        Some(ChartData::Series(points)) => {
            assert_eq!(points.len(), 6);
            assert_eq!(points[0].bucket, "2024-03-04");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn feedback_file_fails_financial_schema() {
    let table = fixtures().load("customer_feedback.csv").unwrap();
    let err =
        build_report(&table, &ReportRequest::new(ViewKind::FinancialTracking, as_of())).unwrap_err();
    match err {
        ReportError::Schema(v) => assert_eq!(v.missing.len(), 7),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn header_only_file_is_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut f = std::fs::File::create(dir.path().join("empty.csv")).unwrap();
    writeln!(f, "Date,Total Revenue for the day ($)").unwrap();
    drop(f);

    let source = CachedSource::new(CsvSource::new(dir.path()));
    let table = source.load("empty.csv").unwrap();
    let report =
        build_report(&table, &ReportRequest::new(ViewKind::FinancialTracking, as_of())).unwrap();
    assert_eq!(report.state, ReportState::EmptyTable);
    assert!(report.metrics.is_empty());
}

#[test]
fn report_serializes_for_presentation() {
    let table = fixtures().load("salon_financials.csv").unwrap();
    let report =
        build_report(&table, &ReportRequest::new(ViewKind::FinancialTracking, as_of())).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["view"], "financial");
    assert_eq!(json["state"], "ready");
    assert_eq!(json["signals"][0]["trend"], "declined");
    assert_eq!(json["signals"][0]["advice"]["kind"], "recommendation");
    assert_eq!(json["charts"][0]["data"]["kind"], "series");
}
