mod common;

use cache_sweep_rs::clock::PlatformClock;
use cache_sweep_rs::report::{OutputMode, Reporter};
use cache_sweep_rs::sweep::{BenchContext, SweepConfig};
use common::{Collector, PatternClock, small_config};

#[test]
fn small_sweep_visits_expected_points() {
    let clock = PlatformClock::new().unwrap();
    let mut ctx = BenchContext::new(small_config(), OutputMode::Human).unwrap();
    let mut collector = Collector::default();
    let summary = ctx.run(&clock, &mut collector).unwrap();

    let visited: Vec<_> = collector
        .records
        .iter()
        .map(|(p, _)| (p.size, p.stride))
        .collect();
    let mut expected: Vec<_> = [1, 2, 4, 8, 16, 32, 64, 128]
        .iter()
        .map(|&s| (256, s))
        .collect();
    expected.extend([1, 2, 4, 8, 16, 32, 64, 128, 256].iter().map(|&s| (512, s)));
    assert_eq!(visited, expected);

    assert_eq!(collector.sizes, vec![256, 512]);
    assert_eq!(collector.ended, vec![256, 512]);
    assert!(collector.finished);
    assert_eq!(summary.configurations, 17);
    let planned: Vec<_> = ctx.config().points().collect();
    let measured: Vec<_> = collector.records.iter().map(|(p, _)| *p).collect();
    assert_eq!(planned, measured);
    assert_eq!(ctx.buffer().as_slice().len(), 512);
    assert!(ctx.buffer().as_slice().iter().all(|&w| w == 0));

    for (point, m) in &collector.records {
        assert!(m.per_access_ns >= 0.0);
        assert!(m.per_access_ns.is_finite());
        assert_eq!(m.net_ns, m.actual_ns.saturating_sub(m.overhead_ns));
        let run = point.run_config(1000);
        assert!(run.repeat * run.accesses >= 1000);
    }
}

#[test]
fn human_report_groups_sizes() {
    let clock = PlatformClock::new().unwrap();
    let mut ctx = BenchContext::new(small_config(), OutputMode::Human).unwrap();
    let mut reporter = Reporter::new(Vec::new(), ctx.mode());
    ctx.run(&clock, &mut reporter).unwrap();

    let text = String::from_utf8(reporter.into_inner()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    // blank line, 8 results, blank line, 9 results
    assert_eq!(lines.len(), 19);
    assert_eq!(lines[0], "");
    assert_eq!(lines[9], "");
    assert!(lines[1].starts_with("Size (bytes):    1024 Stride (bytes):    4 read+write: "));
    assert!(lines[18].starts_with("Size (bytes):    2048 Stride (bytes): 1024 read+write: "));
    for line in lines.iter().filter(|l| !l.is_empty()) {
        let value = line
            .split("read+write:")
            .nth(1)
            .and_then(|rest| rest.trim().strip_suffix(" ns"))
            .unwrap();
        let ns: f64 = value.parse().unwrap();
        assert!(ns >= 0.0);
        assert_eq!(value.split('.').nth(1).map(str::len), Some(3));
    }
}

#[test]
fn csv_report_is_triangular() {
    let clock = PlatformClock::new().unwrap();
    let mode = OutputMode::from_args(["-csv"]);
    let mut ctx = BenchContext::new(small_config(), mode).unwrap();
    let mut reporter = Reporter::new(Vec::new(), ctx.mode());
    ctx.run(&clock, &mut reporter).unwrap();

    let text = String::from_utf8(reporter.into_inner()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);

    let header: Vec<_> = lines[0].split(',').collect();
    assert_eq!(header.first(), Some(&""));
    assert_eq!(header.last(), Some(&""));
    let strides = &header[1..header.len() - 1];
    assert_eq!(strides.len(), small_config().csv_strides().count());
    assert_eq!(strides[0], "4");
    assert_eq!(strides[8], "1024");

    let row_256: Vec<_> = lines[1].split(',').collect();
    assert_eq!(row_256[0], "1024");
    assert_eq!(row_256.len(), 1 + 8 + 1);
    let row_512: Vec<_> = lines[2].split(',').collect();
    assert_eq!(row_512[0], "2048");
    assert_eq!(row_512.len(), 1 + 9 + 1);
    for cell in row_256[1..9].iter().chain(&row_512[1..10]) {
        assert!(cell.trim().parse::<f64>().unwrap() >= 0.0);
    }
}

#[test]
fn noisy_overhead_is_clamped_and_counted() {
    // overhead always 100 ns, access always 50 ns
    let clock = PatternClock::new(1_000, 100, 50);
    let mut ctx = BenchContext::new(small_config(), OutputMode::Csv).unwrap();
    let mut collector = Collector::default();
    let summary = ctx.run(&clock, &mut collector).unwrap();

    assert_eq!(summary.configurations, 17);
    assert_eq!(summary.clamped, 17);
    assert_eq!(summary.clamp_rate(), 1.0);
    for (_, m) in &collector.records {
        assert_eq!(m.overhead_ns, 100);
        assert_eq!(m.actual_ns, 50);
        assert_eq!(m.per_access_ns, 0.0);
    }
}

#[test]
fn per_access_time_uses_all_touches() {
    let clock = PatternClock::new(0, 1_000, 6_000);
    let mut ctx = BenchContext::new(small_config(), OutputMode::Human).unwrap();
    let mut collector = Collector::default();
    let summary = ctx.run(&clock, &mut collector).unwrap();
    assert_eq!(summary.clamped, 0);

    let (point, m) = collector.records[0];
    let run = point.run_config(1000);
    // size 256, stride 1: 256 touches per pass, 4 passes
    assert_eq!((run.accesses, run.repeat), (256, 4));
    assert_eq!(m.net_ns, 5_000);
    assert_eq!(m.per_access_ns, 5_000.0 / 1024.0);
}

#[test]
fn invalid_config_is_rejected_before_allocation() {
    let config = SweepConfig {
        array_max: 100,
        ..small_config()
    };
    assert!(BenchContext::new(config, OutputMode::Human).is_err());
}

#[test]
fn size_group_without_strides_is_still_announced() {
    let config = SweepConfig {
        array_min: 1,
        array_max: 4,
        stride_min: 2,
        stride_max: 2,
        sample_target: 10,
    };
    let clock = PatternClock::new(0, 0, 0);
    let mut ctx = BenchContext::new(config, OutputMode::Human).unwrap();
    let mut collector = Collector::default();
    ctx.run(&clock, &mut collector).unwrap();
    assert_eq!(collector.sizes, vec![1, 2, 4]);
    let strides: Vec<_> = collector.records.iter().map(|(p, _)| (p.size, p.stride)).collect();
    assert_eq!(strides, vec![(4, 2)]);
}
