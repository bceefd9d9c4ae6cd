//! Scan command: one organization, or every organization in a target list

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use colored::Colorize;
use log::{info, warn};

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::config::{is_target_list, load_targets, validate_target};
use crate::error::{ConfigError, Result};
use crate::models::TargetDisplay;
use crate::output::{format_json, format_table};
use crate::scan::{DispatchSummary, ScanReport, TargetReport, dispatch_all};

/// `If-Modified-Since` value for `hours` before `now` (RFC 7231 IMF-fixdate).
pub fn if_modified_since(hours: u32, now: DateTime<Utc>) -> Result<String> {
    let since = Duration::try_hours(i64::from(hours))
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| {
            ConfigError::Invalid(format!("--diff-timeframe {} hours is out of range", hours))
        })?;

    Ok(since.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

/// Run a scan of `target`.
///
/// A target ending in `.json` is read as a target list and dispatched over
/// the worker pool; per-target failures are reported but do not fail the run.
/// A single organization's failure is returned as an error.
pub async fn run(
    target: &str,
    etag: Option<String>,
    diff_timeframe: Option<u32>,
    opts: &GlobalOptions,
) -> Result<()> {
    if let Some(hours) = diff_timeframe {
        info!(
            "If-Modified-Since: {} (organization listings carry no Last-Modified; not sent)",
            if_modified_since(hours, Utc::now())?
        );
    }

    let list_mode = is_target_list(target);
    if !list_mode {
        validate_target(target)?;
    }

    let ctx = CommandContext::new(opts)?;

    if list_mode {
        if etag.is_some() {
            warn!("--etag is ignored when scanning a target list");
        }
        let targets = load_targets(Path::new(target))?;
        let summary = dispatch_all(&ctx.scanner, targets).await;
        print_summary(&summary, ctx.format)
    } else {
        let report = ctx.scanner.scan_target(target, etag).await?;
        print_report(target, report, ctx.format)
    }
}

fn print_report(target: &str, report: ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let report = TargetReport {
                target: target.to_string(),
                status: report.into(),
            };
            println!("{}", format_json(&report)?);
        }
        OutputFormat::Pretty => match report {
            ScanReport::Unchanged => {
                println!("{} {} has not changed since the last scan", "✓".green(), target.bold());
            }
            ScanReport::Updated {
                repos,
                missing,
                path,
            } => {
                println!(
                    "{} {}: {} repositories written to {}",
                    "✓".green(),
                    target.bold(),
                    repos,
                    path.display()
                );
                if missing > 0 {
                    println!(
                        "{} {} repositories reported {}",
                        "⚠".yellow(),
                        missing,
                        crate::scan::MISSING_PERMISSIONS
                    );
                }
            }
        },
    }
    Ok(())
}

fn print_summary(summary: &DispatchSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", format_json(summary)?),
        OutputFormat::Pretty => {
            let rows: Vec<TargetDisplay> = summary.targets.iter().map(TargetDisplay::from).collect();
            println!("{}", format_table(&rows));
            let failed = format!("{} failed", summary.failed());
            let failed = if summary.failed() == 0 {
                failed.as_str().green()
            } else {
                failed.as_str().red()
            };
            println!(
                "{} updated, {} unchanged, {}",
                summary.updated(),
                summary.unchanged(),
                failed
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::dispatch::TargetStatus;
    use chrono::TimeZone;
    use std::path::PathBuf;

    #[test]
    fn test_if_modified_since_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 30, 0).unwrap();
        assert_eq!(
            if_modified_since(24, now).unwrap(),
            "Sat, 09 Mar 2024 12:30:00 GMT"
        );
        assert_eq!(
            if_modified_since(0, now).unwrap(),
            "Sun, 10 Mar 2024 12:30:00 GMT"
        );
    }

    #[test]
    fn test_if_modified_since_out_of_range() {
        let err = if_modified_since(u32::MAX, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_report_into_status() {
        let status: TargetStatus = ScanReport::Updated {
            repos: 3,
            missing: 1,
            path: PathBuf::from("acme_status.json"),
        }
        .into();

        assert_eq!(
            status,
            TargetStatus::Updated {
                repos: 3,
                missing_permissions: 1,
                path: PathBuf::from("acme_status.json"),
            }
        );
        assert_eq!(TargetStatus::from(ScanReport::Unchanged), TargetStatus::Unchanged);
    }
}
