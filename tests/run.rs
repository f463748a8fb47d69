use std::io::Write;
use std::num::NonZeroUsize;
use std::process::Command;

use brc_chunked::{run, Config, Error, IoMode, KeyPolicy, Numeric, RunStats};
use tempfile::NamedTempFile;

const SAMPLE: &str = "Tamale;27.5
Bergen;9.6
Lodwar;37.1
Whitehorse;-3.8
Ouarzazate;19.1
Tamale;20.0
";

const EXPECTED: &str = "Bergen\t9.60/9.60/9.60
Lodwar\t37.10/37.10/37.10
Ouarzazate\t19.10/19.10/19.10
Tamale\t20.00/27.50/23.75
Whitehorse\t-3.80/-3.80/-3.80
";

fn input(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn config(file: &NamedTempFile) -> Config {
    Config {
        input: file.path().to_path_buf(),
        workers: NonZeroUsize::new(4).unwrap(),
        chunk_size: 16,
        ..Config::default()
    }
}

fn report(config: &Config) -> Result<(String, RunStats), Error> {
    let mut out = Vec::new();
    let stats = run(config, &mut out)?;
    Ok((String::from_utf8(out).unwrap(), stats))
}

#[test]
fn sample_report_in_every_mode() {
    let file = input(SAMPLE);
    for numeric in [Numeric::Float, Numeric::Fixed] {
        for io in [IoMode::Mmap, IoMode::Pread] {
            let config = Config {
                numeric,
                io,
                ..config(&file)
            };
            let (out, stats) = report(&config).unwrap();
            assert_eq!(out, EXPECTED, "{numeric:?} {io:?}");
            assert_eq!(stats.keys, 5);
            assert_eq!(stats.records, 6);
        }
    }
}

#[test]
fn chunk_size_does_not_change_report() {
    let file = input(&SAMPLE.repeat(40));
    let baseline = report(&Config {
        chunk_size: u64::MAX,
        ..config(&file)
    })
    .unwrap();
    assert_eq!(baseline.1.chunks, 1);
    for numeric in [Numeric::Float, Numeric::Fixed] {
        for chunk_size in [0, 1, 7, 64, 1000] {
            for workers in [1, 3, 8] {
                let config = Config {
                    chunk_size,
                    workers: NonZeroUsize::new(workers).unwrap(),
                    numeric,
                    ..config(&file)
                };
                let (out, stats) = report(&config).unwrap();
                assert_eq!(
                    out, baseline.0,
                    "{numeric:?} chunk_size={chunk_size} workers={workers}"
                );
                assert_eq!(stats.records, 240);
            }
        }
    }
}

#[test]
fn single_record_file() {
    let file = input("Bergen;9.6");
    let (out, stats) = report(&config(&file)).unwrap();
    assert_eq!(out, "Bergen\t9.60/9.60/9.60\n");
    assert_eq!(stats.chunks, 1);
}

#[test]
fn empty_file() {
    let file = input("");
    for io in [IoMode::Mmap, IoMode::Pread] {
        let (out, stats) = report(&Config { io, ..config(&file) }).unwrap();
        assert_eq!(out, "");
        assert_eq!(stats, RunStats { chunks: 0, keys: 0, records: 0 });
    }
}

#[test]
fn malformed_record_writes_nothing() {
    let file = input(&format!("{SAMPLE}Bergen 9.6\n{SAMPLE}"));
    let mut out = Vec::new();
    let err = run(&config(&file), &mut out).unwrap_err();
    assert!(matches!(err, Error::MissingSeparator { .. }), "{err}");
    assert!(out.is_empty());
}

#[test]
fn non_numeric_value_reports_offset() {
    let file = input("a;1.0\nb;warm\n");
    let err = report(&config(&file)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("byte 6"), "{message}");
    assert!(message.contains("warm"), "{message}");
}

#[test]
fn negative_zero_matches_across_strategies() {
    let file = input("a;-0.0\na;-0.0\n");
    for numeric in [Numeric::Float, Numeric::Fixed] {
        let (out, _) = report(&Config { numeric, ..config(&file) }).unwrap();
        assert_eq!(out, "a\t0.00/0.00/0.00\n", "{numeric:?}");
    }
}

#[test]
fn fixed_rejects_values_too_long_to_sum() {
    let file = input(&"a;99999999999999999.9\n".repeat(10));
    let mut out = Vec::new();
    let err = run(
        &Config {
            numeric: Numeric::Fixed,
            ..config(&file)
        },
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { offset: 0, .. }), "{err}");
    assert!(out.is_empty());
}

#[test]
fn fixed_sums_longest_values_exactly() {
    let file = input(&"a;99999.9\na;-99999.9\n".repeat(500));
    let (out, stats) = report(&Config {
        numeric: Numeric::Fixed,
        ..config(&file)
    })
    .unwrap();
    assert_eq!(out, "a\t-99999.90/99999.90/0.00\n");
    assert_eq!(stats.records, 1000);
}

#[test]
fn trim_policy_applies_to_whole_run() {
    let file = input("Bergen;1.0\n  Bergen ;3.0\n");
    let (verbatim, _) = report(&config(&file)).unwrap();
    assert_eq!(verbatim.lines().count(), 2);
    let (trimmed, _) = report(&Config {
        keys: KeyPolicy::Trim,
        ..config(&file)
    })
    .unwrap();
    assert_eq!(trimmed, "Bergen\t1.00/3.00/2.00\n");
}

#[test]
fn missing_input_is_an_open_error() {
    let config = Config {
        input: "/nonexistent/measurements.txt".into(),
        ..Config::default()
    };
    assert!(matches!(report(&config), Err(Error::Open { .. })));
}

#[test]
fn binary_prints_report_and_exits_zero() {
    let file = input(SAMPLE);
    let output = Command::new(env!("CARGO_BIN_EXE_brc"))
        .arg(file.path())
        .args(["--workers", "2", "--chunk-size", "8"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), EXPECTED);
}

#[test]
fn binary_fails_on_malformed_input() {
    let file = input("Tamale;27.5\nTamale;hot\n");
    let output = Command::new(env!("CARGO_BIN_EXE_brc"))
        .arg(file.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("hot"));
}
