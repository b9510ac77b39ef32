use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{Context, Result};

use crate::args::Cli;

/// Gathers addresses from the positional arguments, then `--input`, then
/// stdin, keeping that order.
pub fn collect(cli: &Cli) -> Result<Vec<String>> {
    let mut addresses = cli.emails.clone();

    if let Some(path) = &cli.input {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        addresses.extend(
            read_lines(BufReader::new(file))
                .with_context(|| format!("read {}", path.display()))?,
        );
    }

    if cli.stdin {
        addresses.extend(read_lines(io::stdin().lock()).context("read stdin")?);
    }

    Ok(addresses)
}

/// One address per line, trimmed; blank lines are skipped.
pub fn read_lines(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut addresses = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            addresses.push(trimmed.to_string());
        }
    }
    Ok(addresses)
}
