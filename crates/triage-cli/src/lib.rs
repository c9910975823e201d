use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use triage_core::models::{Damage, Inspection, GALLERY_SLOTS};
use triage_core::sla_status_with_label;
use triage_services::StatusCounts;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Inspection list as a fixed-width table, one row per inspection.
pub fn format_inspection_table(
    inspections: &[&Inspection],
    counts: &StatusCounts,
    now: DateTime<Utc>,
    overdue_label: &str,
) -> String {
    let mut out = vec![
        format!(
            "Pending: {}  In review: {}  Approved: {}  Needs re-inspection: {}",
            counts.pending, counts.in_review, counts.approved, counts.needs_reinspection
        ),
        String::new(),
    ];

    if inspections.is_empty() {
        out.push("No inspections found.".to_string());
        return out.join("\n");
    }

    out.push(format!(
        "{:<20} {:<22} {:<10} {:<20} {:<14} {:>5} {:<18}",
        "ID", "Client", "Plate", "Status", "Policy", "Risk", "SLA"
    ));
    out.push("-".repeat(115));

    for inspection in inspections {
        let sla = sla_status_with_label(inspection.sla_deadline, now, overdue_label);
        out.push(format!(
            "{:<20} {:<22} {:<10} {:<20} {:<14} {:>5} {:<18}",
            truncate_string(&inspection.id, 20),
            truncate_string(inspection.client_name.as_deref().unwrap_or("-"), 22),
            truncate_string(inspection.vehicle_plate.as_deref().unwrap_or("-"), 10),
            inspection.status.label(),
            inspection.policy_type,
            inspection.risk_score,
            truncate_string(&sla.to_string(), 18),
        ));
    }

    out.join("\n")
}

pub fn format_damage_table(damages: &[Damage]) -> String {
    if damages.is_empty() {
        return "No damages recorded.".to_string();
    }

    let mut out = vec![
        format!(
            "{:<10} {:<24} {:<16} {:<10} {:>6} {:<10}",
            "ID", "Part", "Type", "Severity", "Conf.", "Approval"
        ),
        "-".repeat(81),
    ];
    out.extend(damages.iter().map(|d| {
        format!(
            "{:<10} {:<24} {:<16} {:<10} {:>5}% {:<10}",
            truncate_string(&d.id, 10),
            truncate_string(&d.part, 24),
            truncate_string(&d.damage_type, 16),
            d.severity,
            d.confidence,
            d.approval,
        )
    }));
    out.join("\n")
}

pub fn photo_summary(filled: usize) -> String {
    format!(
        "Photos:  {} of {} slots filled",
        filled.min(GALLERY_SLOTS),
        GALLERY_SLOTS
    )
}

/// Write report text to `path`, replacing any existing file.
pub fn write_report(path: &Path, text: &str) -> anyhow::Result<()> {
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::models::InspectionStatus;
    use triage_db::test_helpers::{sample_damage, sample_inspection};
    use triage_services::aggregate_counts;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("João Pereira", 7), "João...");
    }

    #[test]
    fn inspection_table_lists_rows_and_counts() {
        let mut approved = sample_inspection("INS-2");
        approved.status = InspectionStatus::Approved;
        let records = vec![sample_inspection("INS-1"), approved];
        let counts = aggregate_counts(&records);
        let rows: Vec<&Inspection> = records.iter().collect();

        let now = records[0].created_at;
        let table = format_inspection_table(&rows, &counts, now, "Overdue");

        assert!(table.starts_with("Pending: 1  In review: 0  Approved: 1"));
        assert!(table.contains("INS-1"));
        assert!(table.contains("Maria Souza"));
        assert!(table.contains("48h 0m"));
    }

    #[test]
    fn inspection_table_shows_overdue_label() {
        let record = sample_inspection("INS-1");
        let counts = aggregate_counts(std::slice::from_ref(&record));
        let now = record.created_at + chrono::Duration::days(5);

        let table = format_inspection_table(&[&record], &counts, now, "Atrasado");
        assert!(table.contains("Atrasado"));
    }

    #[test]
    fn empty_table_has_message() {
        let table = format_inspection_table(&[], &StatusCounts::default(), Utc::now(), "Overdue");
        assert!(table.ends_with("No inspections found."));
    }

    #[test]
    fn damage_table_rows() {
        let table = format_damage_table(&[sample_damage("3", "INS-1")]);
        assert!(table.contains("Front bumper"));
        assert!(table.contains("91%"));
        assert_eq!(format_damage_table(&[]), "No damages recorded.");
    }

    #[test]
    fn photo_summary_uses_gallery_capacity() {
        assert_eq!(photo_summary(3), format!("Photos:  3 of {} slots filled", GALLERY_SLOTS));
        assert_eq!(
            photo_summary(GALLERY_SLOTS + 4),
            format!("Photos:  {} of {} slots filled", GALLERY_SLOTS, GALLERY_SLOTS)
        );
    }

    #[test]
    fn write_report_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("INS-1.txt");

        write_report(&path, "VEHICLE INSPECTION REPORT\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "VEHICLE INSPECTION REPORT\n"
        );
    }

    #[test]
    fn write_report_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("INS-1.txt");
        let err = write_report(&path, "x").unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }
}
