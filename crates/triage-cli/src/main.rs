//! Triage CLI: the reviewer console from a terminal.
//!
//! Reads the same environment as the API server (GATEWAY_BACKEND, DATASTORE_URL,
//! DATASTORE_API_KEY or DATABASE_URL). Every command is a single load or write.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use triage_cli::{
    format_damage_table, format_inspection_table, init_tracing, photo_summary, print_json,
    write_report,
};
use triage_core::{AppError, Config, ErrorMetadata};
use triage_db::{create_gateway, InspectionRepository};
use triage_services::{DetailController, DetailPhase, InspectionFilters, ListViewState, ReviewDecision};

#[derive(Parser)]
#[command(name = "triage", about = "Vehicle inspection triage console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Verdict {
    Approve,
    Reject,
}

#[derive(Subcommand)]
enum Commands {
    /// List inspections, newest first
    List {
        /// Substring of id, client name or plate
        #[arg(long, default_value = "")]
        search: String,
        /// Inspection status or "all"
        #[arg(long, default_value = "all")]
        status: String,
        /// Policy type or "all"
        #[arg(long, default_value = "all")]
        policy_type: String,
        /// Policy status or "all"
        #[arg(long, default_value = "all")]
        policy_status: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show one inspection with its damages, photos and consent
    Show {
        /// Inspection ID
        id: String,
        /// Gallery slot to select (0-11)
        #[arg(long)]
        photo: Option<usize>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Record a reviewer decision
    Decide {
        /// Inspection ID
        id: String,
        /// approve, reinspect or escalate
        decision: ReviewDecision,
        /// Review notes; persisted notes are kept when omitted
        #[arg(long)]
        notes: Option<String>,
    },
    /// Approve or reject one detected damage
    Damage {
        /// Damage ID
        damage_id: String,
        verdict: Verdict,
    },
    /// Render the printable report
    Report {
        /// Inspection ID
        id: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

async fn open_detail(repository: InspectionRepository, id: &str) -> anyhow::Result<DetailController> {
    let mut controller = DetailController::new(repository);
    controller.load(id).await;

    let state = controller.state();
    if state.phase == DetailPhase::NotFound {
        match controller.load_error() {
            Some(e) if !e.is_not_found() => anyhow::bail!("{}", e.client_message()),
            _ => anyhow::bail!("Inspection {} not found", id),
        }
    }
    for missing in &state.missing_evidence {
        tracing::warn!(inspection_id = %id, evidence = %missing, "Evidence could not be loaded");
    }
    Ok(controller)
}

fn failure(err: AppError) -> anyhow::Error {
    anyhow::anyhow!("{}", err.client_message())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    let gateway = create_gateway(&config)
        .await
        .context("Failed to connect to the inspection datastore")?;
    let repository = InspectionRepository::new(gateway);

    match cli.command {
        Commands::List {
            search,
            status,
            policy_type,
            policy_status,
            format,
        } => {
            let filters = InspectionFilters {
                status: status.parse()?,
                policy_type: policy_type.parse()?,
                policy_status: policy_status.parse()?,
            };

            let mut view = ListViewState::new();
            view.set_search_term(search);
            view.set_filters(filters);
            view.load(&repository).await;
            if let Some(message) = &view.load_error {
                eprintln!("{}", message);
            }

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "inspections": view.visible(),
                    "counts": view.counts(),
                    "total": view.records.len(),
                }))?,
                OutputFormat::Table => println!(
                    "{}",
                    format_inspection_table(
                        &view.visible(),
                        &view.counts(),
                        Utc::now(),
                        config.sla_overdue_label()
                    )
                ),
            }
        }
        Commands::Show { id, photo, format } => {
            let mut controller = open_detail(repository, &id).await?;
            if let Some(slot) = photo {
                if !controller.select_slot(slot) {
                    eprintln!("Slot {} has no photo", slot);
                }
            }
            let state = controller.state();

            match format {
                OutputFormat::Json => print_json(state)?,
                OutputFormat::Table => {
                    if let Some(inspection) = &state.inspection {
                        println!("Inspection {}", inspection.id);
                        println!("Status:  {}", inspection.status.label());
                        println!(
                            "Client:  {}",
                            inspection.client_name.as_deref().unwrap_or("-")
                        );
                        println!(
                            "Risk:    {} ({})",
                            inspection.risk_score,
                            inspection.risk_tier()
                        );
                        println!(
                            "SLA:     {}",
                            state.sla(Utc::now(), config.sla_overdue_label())
                        );
                    }
                    println!("\n{}\n", format_damage_table(&state.damages));
                    println!("{}", photo_summary(state.photo_count()));
                    if let Some(photo) = state.selected_photo() {
                        println!(
                            "Selected: {}",
                            photo.url.as_deref().unwrap_or("(no url)")
                        );
                    }
                    match &state.consent {
                        Some(consent) => println!(
                            "Consent: {} ({})",
                            if consent.accepted { "accepted" } else { "declined" },
                            consent.person_type
                        ),
                        None => println!("Consent: none"),
                    }
                }
            }
        }
        Commands::Decide {
            id,
            decision,
            notes,
        } => {
            let mut controller = open_detail(repository, &id).await?;
            if let Some(notes) = notes {
                controller.set_review_notes(notes);
            }
            controller.submit_decision(decision).await.map_err(failure)?;
            println!(
                "Inspection {} is now {}",
                id,
                decision.target_status().label()
            );
        }
        Commands::Damage { damage_id, verdict } => {
            let approved = matches!(verdict, Verdict::Approve);
            repository
                .set_damage_approval(&damage_id, approved)
                .await
                .map_err(|e| failure(AppError::write_failure(format!("damage {}", damage_id), &e)))?;
            println!(
                "Damage {} {}",
                damage_id,
                if approved { "approved" } else { "rejected" }
            );
        }
        Commands::Report { id, out } => {
            let controller = open_detail(repository, &id).await?;
            let report = controller
                .state()
                .report()
                .context("Inspection has no data to report")?;
            let text = report.render_text();

            match out {
                Some(path) => {
                    write_report(&path, &text)?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{}", text),
            }
        }
    }

    Ok(())
}
