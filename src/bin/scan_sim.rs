//! scan-sim - drive an average record from recorded or synthetic samples
//!
//! Usage:
//!   scan-sim --config tank.json samples.txt
//!   cat samples.txt | scan-sim --capacity 10
//!   scan-sim --capacity 5 --synthetic 200 --baseline 48 --noise 6

use average_record::{AverageRecord, RecordConfig};
use clap::Parser;
use serde::Serialize;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "scan-sim")]
#[command(about = "Feed samples through an average record and print each scan as JSON")]
struct Cli {
    /// Record configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window size, overrides the configuration file
    #[arg(long)]
    capacity: Option<i64>,

    /// Generate N noisy samples instead of reading input
    #[arg(long)]
    synthetic: Option<usize>,

    /// Centre of the synthetic signal
    #[arg(long, default_value = "0.0")]
    baseline: f64,

    /// Peak-to-peak noise amplitude of the synthetic signal
    #[arg(long, default_value = "1.0")]
    noise: f64,

    /// Sample file, one or more numbers per line (stdin if omitted)
    input: Option<PathBuf>,
}

#[derive(Serialize)]
struct ScanLine {
    scan: usize,
    input: f64,
    average: f64,
    severity: &'static str,
    alarm: &'static str,
    notifications: u16,
}

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("scan-sim: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => RecordConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RecordConfig::default(),
    };
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }

    let samples = match cli.synthetic {
        Some(count) => synthetic_samples(count, cli.baseline, cli.noise),
        None => match &cli.input {
            Some(path) => read_samples(BufReader::new(std::fs::File::open(path)?))?,
            None => read_samples(io::stdin().lock())?,
        },
    };

    let mut record = AverageRecord::new(config)?;
    info!(
        record = record.name(),
        capacity = record.capacity(),
        samples = samples.len(),
        "Starting scan simulation."
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (scan, &input) in samples.iter().enumerate() {
        let outcome = record.process(input);
        let line = ScanLine {
            scan,
            input,
            average: outcome.average,
            severity: outcome.severity.name(),
            alarm: outcome.kind.name(),
            notifications: outcome.notifications.bits(),
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }

    Ok(())
}

fn read_samples<R: BufRead>(reader: R) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    let mut samples = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        for token in line.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            let value = token
                .parse::<f64>()
                .map_err(|_| format!("line {}: '{}' is not a number", lineno + 1, token))?;
            samples.push(value);
        }
    }
    Ok(samples)
}

fn synthetic_samples(count: usize, baseline: f64, noise: f64) -> Vec<f64> {
    (0..count)
        .map(|_| baseline + (fastrand::f64() - 0.5) * noise)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_samples_mixed_separators() {
        let input = Cursor::new("1.5 2\n\n-3,4.25\n");
        assert_eq!(read_samples(input).unwrap(), vec![1.5, 2.0, -3.0, 4.25]);
    }

    #[test]
    fn test_read_samples_reports_bad_token() {
        let err = read_samples(Cursor::new("1\n2 x\n")).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
