//! Printable inspection report
//!
//! [`InspectionReport::from_snapshot`] shapes a loaded inspection into report data;
//! [`InspectionReport::render`] lays it out as fixed-size plain-text pages with a
//! "Page X of Y" footer. Rendering is a pure function of the snapshot.

use serde::Serialize;
use triage_core::models::{Damage, Inspection, RiskTier};

/// Characters per line.
pub const PAGE_WIDTH: usize = 80;
/// Lines per page, footer included.
pub const PAGE_HEIGHT: usize = 56;

const BAR_WIDTH: usize = 20;
const MISSING: &str = "-";
const PAGE_BREAK: char = '\u{c}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDamageRow {
    pub index: usize,
    pub part: String,
    pub damage_type: String,
    pub severity: String,
    pub confidence: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionReport {
    pub inspection_id: String,
    pub status: String,
    /// dd/mm/yyyy
    pub created_on: String,
    pub client: Vec<ReportField>,
    pub vehicle: Vec<ReportField>,
    pub risk_score: i32,
    pub risk_tier: RiskTier,
    pub quality_score: i32,
    pub damages: Vec<ReportDamageRow>,
    pub client_comments: Option<String>,
    pub review_notes: Option<String>,
}

fn field(label: &'static str, value: Option<&str>) -> ReportField {
    ReportField {
        label,
        value: value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(MISSING)
            .to_string(),
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

impl InspectionReport {
    pub fn from_snapshot(inspection: &Inspection, damages: &[Damage]) -> Self {
        let vehicle = inspection.vehicle_description();

        Self {
            inspection_id: inspection.id.clone(),
            status: inspection.status.label().to_string(),
            created_on: inspection.created_at.format("%d/%m/%Y").to_string(),
            client: vec![
                field("Name", inspection.client_name.as_deref()),
                field("Email", inspection.client_email.as_deref()),
                field("Phone", inspection.client_phone.as_deref()),
                field("Document", inspection.client_document.as_deref()),
            ],
            vehicle: vec![
                field("Vehicle", vehicle.as_deref()),
                field("Plate", inspection.vehicle_plate.as_deref()),
                field("Color", inspection.vehicle_color.as_deref()),
                field("VIN", inspection.vehicle_vin.as_deref()),
            ],
            risk_score: inspection.risk_score,
            risk_tier: inspection.risk_tier(),
            quality_score: inspection.quality_score,
            damages: damages
                .iter()
                .enumerate()
                .map(|(i, damage)| ReportDamageRow {
                    index: i + 1,
                    part: damage.part.clone(),
                    damage_type: damage.damage_type.clone(),
                    severity: damage.severity.label().to_string(),
                    confidence: damage.confidence,
                })
                .collect(),
            client_comments: non_blank(inspection.client_comments.as_ref()),
            review_notes: non_blank(inspection.review_notes.as_ref()),
        }
    }

    /// Lay the report out as pages of exactly [`PAGE_HEIGHT`] lines.
    pub fn render(&self) -> Vec<String> {
        let body = self.body_lines();
        let continuation = format!("Inspection {} (continued)", self.inspection_id);

        // First page: body + blank + footer. Later pages also carry a continuation header.
        let first_capacity = PAGE_HEIGHT - 2;
        let next_capacity = PAGE_HEIGHT - 3;

        let mut chunks: Vec<Vec<String>> = Vec::new();
        let (first, mut rest) = body.split_at(body.len().min(first_capacity));
        chunks.push(first.to_vec());
        while !rest.is_empty() {
            let (chunk, tail) = rest.split_at(rest.len().min(next_capacity));
            let mut page = Vec::with_capacity(next_capacity + 1);
            page.push(continuation.clone());
            page.extend_from_slice(chunk);
            chunks.push(page);
            rest = tail;
        }

        let total = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, mut lines)| {
                lines.resize(PAGE_HEIGHT - 2, String::new());
                lines.push(String::new());
                lines.push(center(&format!("Page {} of {}", i + 1, total)));
                lines.join("\n")
            })
            .collect()
    }

    /// All pages joined by form feeds.
    pub fn render_text(&self) -> String {
        let mut text = self
            .render()
            .join(&format!("\n{}", PAGE_BREAK));
        text.push('\n');
        text
    }

    fn body_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "VEHICLE INSPECTION REPORT".to_string(),
            format!("Inspection {}", self.inspection_id),
            "=".repeat(PAGE_WIDTH),
            format!("Status: {:<24}Created: {}", self.status, self.created_on),
            String::new(),
        ];

        section(&mut lines, "CLIENT", fields(&self.client));
        section(&mut lines, "VEHICLE", fields(&self.vehicle));
        section(
            &mut lines,
            "SCORES",
            vec![
                format!(
                    "  {:<9}{}  ({})",
                    "Risk",
                    score_bar(self.risk_score),
                    self.risk_tier
                ),
                format!("  {:<9}{}", "Quality", score_bar(self.quality_score)),
            ],
        );
        section(
            &mut lines,
            &format!("DAMAGES ({})", self.damages.len()),
            self.damage_table(),
        );
        section(
            &mut lines,
            "CLIENT COMMENTS",
            paragraph(self.client_comments.as_deref()),
        );
        section(
            &mut lines,
            "REVIEW NOTES",
            paragraph(self.review_notes.as_deref()),
        );

        // Drop the trailing separator left by the last section.
        lines.pop();
        lines
    }

    fn damage_table(&self) -> Vec<String> {
        if self.damages.is_empty() {
            return vec!["  No damages recorded".to_string()];
        }

        let mut rows = vec![
            format!(
                "  {:<4}{:<26}{:<18}{:<14}{:>10}",
                "#", "Part", "Type", "Severity", "Confidence"
            ),
            format!("  {}", "-".repeat(72)),
        ];
        rows.extend(self.damages.iter().map(|d| {
            format!(
                "  {:<4}{:<26}{:<18}{:<14}{:>9}%",
                d.index,
                clip(&d.part, 25),
                clip(&d.damage_type, 17),
                clip(&d.severity, 13),
                d.confidence
            )
        }));
        rows
    }
}

fn section(lines: &mut Vec<String>, title: &str, content: Vec<String>) {
    lines.push(title.to_string());
    lines.extend(content);
    lines.push(String::new());
}

fn fields(fields: &[ReportField]) -> Vec<String> {
    fields
        .iter()
        .flat_map(|f| {
            let label = format!("{}:", f.label);
            wrap(&f.value, PAGE_WIDTH - 14)
                .into_iter()
                .enumerate()
                .map(move |(i, chunk)| {
                    if i == 0 {
                        format!("  {:<12}{}", label, chunk)
                    } else {
                        format!("  {:<12}{}", "", chunk)
                    }
                })
        })
        .collect()
}

fn paragraph(text: Option<&str>) -> Vec<String> {
    match text {
        Some(text) => text
            .lines()
            .flat_map(|line| wrap(line, PAGE_WIDTH - 2))
            .map(|line| format!("  {}", line))
            .collect(),
        None => vec!["  None".to_string()],
    }
}

/// `[#####---------------]  25/100`
fn score_bar(score: i32) -> String {
    let score = score.clamp(0, 100);
    let filled = (score as usize * BAR_WIDTH) / 100;
    format!(
        "[{}{}] {:>3}/100",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        score
    )
}

fn center(text: &str) -> String {
    let len = text.chars().count();
    if len >= PAGE_WIDTH {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((PAGE_WIDTH - len) / 2), text)
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let tail = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = tail;
        }

        let needed = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}
