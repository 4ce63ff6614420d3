use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("research-report-client"));

// --- Controller ---

pub static REPORT_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.requests.total")
        .with_description("Report generation requests accepted by the controller")
        .with_unit("{request}")
        .build()
});

pub static REPORT_SUPERSEDED_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.superseded.total")
        .with_description("Resolutions discarded because a newer request was submitted")
        .with_unit("{request}")
        .build()
});

pub static REPORT_ANALYSIS_TABLES: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.analysis_tables")
        .with_description("Number of analysis tables per successful report")
        .with_unit("{table}")
        .build()
});

// --- Transport ---

pub static REPORT_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.request.duration")
        .with_description("Duration of report generation HTTP calls in seconds")
        .with_unit("s")
        .with_boundaries(vec![
            0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 90.0, 120.0, 180.0, 300.0,
        ])
        .build()
});

pub static REPORT_FAILURES: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.failures.total")
        .with_description("Failed report generation requests by error type")
        .with_unit("{error}")
        .build()
});
