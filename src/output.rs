//! Rendering a [`CombinedResult`] for the terminal or for other tools.
//!
//! Every renderer treats each probe section as optional and always prints
//! the failure list when there is one.

use crate::results::CombinedResult;
use clap::ValueEnum;
use colored::Colorize;

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Comma separated sections
    Csv,
}

pub fn render(
    result: &CombinedResult,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(text(result)),
        OutputFormat::Json => json(result),
        OutputFormat::Csv => Ok(csv(result)),
    }
}

pub fn text(result: &CombinedResult) -> String {
    let mut lines = vec![
        "=== INTERNET SPEED TEST RESULTS ===".bold().to_string(),
        format!("{} {}", "Timestamp:".bold().white(), result.formatted_timestamp()),
        String::new(),
    ];

    if let Some(ping) = &result.latency {
        lines.push("PING (LATENCY)".bold().bright_blue().to_string());
        lines.push(format!("  Min: {:.2} ms", ping.min_ms));
        lines.push(format!("  Avg: {:.2} ms", ping.avg_ms));
        lines.push(format!("  Max: {:.2} ms", ping.max_ms));
        lines.push(format!("  Samples: {}/{}", ping.samples, ping.attempts()));
        lines.push(format!("  Success Rate: {:.1}%", ping.success_rate_percent));
        lines.push(String::new());
    }

    if let Some(jitter) = &result.jitter {
        lines.push("JITTER (STABILITY)".bold().bright_blue().to_string());
        lines.push(format!("  Avg Jitter: {:.2} ms", jitter.avg_jitter_ms));
        lines.push(format!("  Min Jitter: {:.2} ms", jitter.min_jitter_ms));
        lines.push(format!("  Max Jitter: {:.2} ms", jitter.max_jitter_ms));
        lines.push(format!("  Std Dev: {:.2} ms", jitter.std_dev_ms));
        lines.push(format!(
            "  Samples: {}/{}",
            jitter.samples,
            jitter.attempts()
        ));
        lines.push(format!(
            "  Success Rate: {:.1}%",
            jitter.success_rate_percent
        ));
        lines.push(String::new());
    }

    for (heading, transfer) in
        [("DOWNLOAD", &result.download), ("UPLOAD", &result.upload)]
    {
        let Some(transfer) = transfer else { continue };
        lines.push(heading.bold().bright_blue().to_string());
        lines.push(format!(
            "  Speed: {}",
            format!("{:.2} Mbps", transfer.speed_mbps).bright_cyan()
        ));
        lines.push(format!("  Transferred: {:.2} MB", transfer.transferred_mb()));
        lines.push(format!("  Time: {:.2} seconds", transfer.time_seconds));
        lines.push(String::new());
    }

    if !result.errors.is_empty() {
        lines.push("ERRORS".bold().red().to_string());
        for message in result.failure_messages() {
            lines.push(format!("  - {}", message));
        }
    }

    lines.join("\n")
}

pub fn json(result: &CombinedResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

pub fn csv(result: &CombinedResult) -> String {
    let mut rows: Vec<Vec<String>> =
        vec![vec!["Timestamp".into(), result.formatted_timestamp()]];

    if let Some(ping) = &result.latency {
        rows.push(vec![]);
        rows.push(header(&[
            "PING (ms)",
            "Min",
            "Avg",
            "Max",
            "Samples",
            "Failed",
            "Success Rate (%)",
        ]));
        rows.push(vec![
            String::new(),
            format!("{:.2}", ping.min_ms),
            format!("{:.2}", ping.avg_ms),
            format!("{:.2}", ping.max_ms),
            ping.samples.to_string(),
            ping.failed.to_string(),
            format!("{:.1}", ping.success_rate_percent),
        ]);
    }

    if let Some(jitter) = &result.jitter {
        rows.push(vec![]);
        rows.push(header(&[
            "JITTER (ms)",
            "Avg",
            "Min",
            "Max",
            "Std Dev",
            "Samples",
            "Failed",
            "Success Rate (%)",
        ]));
        rows.push(vec![
            String::new(),
            format!("{:.2}", jitter.avg_jitter_ms),
            format!("{:.2}", jitter.min_jitter_ms),
            format!("{:.2}", jitter.max_jitter_ms),
            format!("{:.2}", jitter.std_dev_ms),
            jitter.samples.to_string(),
            jitter.failed.to_string(),
            format!("{:.1}", jitter.success_rate_percent),
        ]);
    }

    for (heading, transfer) in
        [("DOWNLOAD", &result.download), ("UPLOAD", &result.upload)]
    {
        let Some(transfer) = transfer else { continue };
        rows.push(vec![]);
        rows.push(header(&[
            heading,
            "Speed (Mbps)",
            "Transferred (MB)",
            "Time (s)",
        ]));
        rows.push(vec![
            String::new(),
            format!("{:.2}", transfer.speed_mbps),
            format!("{:.2}", transfer.bytes_transferred as f64 / MIB),
            format!("{:.2}", transfer.time_seconds),
        ]);
    }

    if !result.errors.is_empty() {
        rows.push(vec![]);
        rows.push(header(&["ERRORS"]));
        for message in result.failure_messages() {
            rows.push(vec![String::new(), message]);
        }
    }

    let mut output = String::new();
    for row in rows {
        let fields: Vec<String> =
            row.iter().map(String::as_str).map(csv_field).collect();
        output.push_str(&fields.join(","));
        output.push_str("\r\n");
    }

    output
}

fn header(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
