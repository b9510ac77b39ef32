use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

#[cfg(not(feature = "with-csv"))]
use anyhow::bail;
use anyhow::{Context, Result};
use mailverify_lib::{BatchReport, BatchSummary, MxRecord, ValidationResult, ValidationStatus};

use crate::args::OutputFormat;

/// Renders the report and sends it to `out`, or stdout when no path is given.
pub fn write_report(report: &BatchReport, format: OutputFormat, out: Option<&Path>) -> Result<()> {
    let bytes = render(report, format)?;
    match out {
        Some(path) => write_all_atomically(path, &bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes).context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

pub fn render(report: &BatchReport, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Human => Ok(render_human(report).into_bytes()),
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(report)?;
            s.push('\n');
            Ok(s.into_bytes())
        }
        OutputFormat::Ndjson => {
            let mut buf = Vec::new();
            for result in &report.results {
                serde_json::to_writer(&mut buf, result)?;
                buf.push(b'\n');
            }
            Ok(buf)
        }
        OutputFormat::Csv => render_csv(report),
    }
}

pub fn render_human(report: &BatchReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        let _ = writeln!(
            out,
            "{:<11}{} :: {}",
            status_tag(result.status()),
            result.email(),
            result.details()
        );
        if !result.mx_records().is_empty() {
            let _ = writeln!(out, "{:11}mx: {}", "", mx_summary(result.mx_records(), ", "));
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", summary_line(&report.summary));
    out
}

fn status_tag(status: ValidationStatus) -> &'static str {
    match status {
        ValidationStatus::MailboxConfirmed => "[OK]",
        ValidationStatus::MailboxRejected => "[REJECTED]",
        ValidationStatus::DomainValidMailboxUnknown => "[UNKNOWN]",
        ValidationStatus::NoMxRecords => "[NO-MX]",
        ValidationStatus::InvalidFormat => "[INVALID]",
    }
}

fn mx_summary(records: &[MxRecord], sep: &str) -> String {
    records
        .iter()
        .map(|r| format!("{} {}", r.preference, r.host))
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "{} checked: {} confirmed, {} domain valid only, {} invalid",
        summary.total, summary.confirmed, summary.domain_valid_only, summary.invalid
    )
}

#[cfg(feature = "with-csv")]
fn render_csv(report: &BatchReport) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "email",
        "valid_format",
        "domain_exists",
        "mx_records",
        "smtp_check",
        "status",
        "details",
    ])?;
    for result in &report.results {
        wtr.write_record(csv_record(result))?;
    }
    Ok(wtr.into_inner()?)
}

#[cfg(not(feature = "with-csv"))]
fn render_csv(_: &BatchReport) -> Result<Vec<u8>> {
    bail!("format=csv requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_record(result: &ValidationResult) -> [String; 7] {
    [
        result.email().to_string(),
        result.valid_format().to_string(),
        result.domain_exists().to_string(),
        mx_summary(result.mx_records(), "|"),
        result.smtp_check().to_string(),
        result.status().as_str().to_string(),
        result.details().to_string(),
    ]
}

/// Exit status: 2 when at least one address cannot receive mail at all.
pub fn any_invalid(results: &[ValidationResult]) -> bool {
    results.iter().any(|r| {
        matches!(
            r.status(),
            ValidationStatus::InvalidFormat | ValidationStatus::NoMxRecords
        )
    })
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    {
        let mut f = std::fs::File::create(&tmp)
            .with_context(|| format!("create {}", Path::new(&tmp).display()))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| {
        format!("rename {} -> {}", Path::new(&tmp).display(), path.display())
    })?;
    Ok(())
}
