#![allow(dead_code)]

use shardkit::boolean::Polygon;
use shardkit::math::Point2;

/// Installs a subscriber so `RUST_LOG=shardkit=debug` shows engine
/// diagnostics while a test runs. Safe to call from every test.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

pub fn p(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
    vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]
}

pub fn poly(region: Vec<Point2>) -> Polygon {
    Polygon::from_region(region)
}
