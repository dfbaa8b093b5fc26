use crate::infra::{parse_month, read_image_data_url, Services};
use chrono::{Datelike, Local};
use clap::Args;
use incident_ai::config::AppConfig;
use incident_ai::error::AppError;
use incident_ai::workflows::incidents::{
    format_minutes, ChartEntry, DashboardSummary, IncidentLedger, Season, SeverityLevel,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct SeverityArgs {
    /// Incident type id, e.g. water-logging
    #[arg(long)]
    pub(crate) incident_type: String,
    /// Taluk id, e.g. mangalore
    #[arg(long)]
    pub(crate) taluk: String,
    /// Ask the AI service, falling back to the local estimate on failure
    #[arg(long)]
    pub(crate) ai: bool,
    /// Free-text description passed to the AI service
    #[arg(long, default_value = "")]
    pub(crate) description: String,
}

#[derive(Args, Debug)]
pub(crate) struct ResolutionArgs {
    /// Incident type id
    #[arg(long)]
    pub(crate) incident_type: String,
    /// Taluk id
    #[arg(long)]
    pub(crate) taluk: String,
    /// Severity 1-10 (defaults to the local severity estimate)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub(crate) severity: Option<u8>,
    /// Calendar month 1-12 for the seasonal adjustment
    #[arg(long, value_parser = parse_month, conflicts_with = "seasonal")]
    pub(crate) month: Option<u32>,
    /// Apply the seasonal adjustment for the current month
    #[arg(long)]
    pub(crate) seasonal: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// Print the summary as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
    /// List individual incidents for this taluk id
    #[arg(long)]
    pub(crate) taluk: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// Image taken before the resolution attempt (JPEG or PNG)
    #[arg(long)]
    pub(crate) before: PathBuf,
    /// Image taken after the resolution attempt (JPEG or PNG)
    #[arg(long)]
    pub(crate) after: PathBuf,
}

pub(crate) async fn run_severity(args: SeverityArgs) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let estimator = services.estimator();
    let reference = estimator.reference();
    let type_name = reference.incident_type_name(&args.incident_type);
    let taluk_name = reference.taluk_name(&args.taluk);

    println!("Severity estimate: {type_name} in {taluk_name}");
    let local = estimator.severity_estimate(&args.incident_type, &args.taluk);
    println!("- Local estimate: {}/10 ({})", local.score, local.level());

    if !args.ai {
        return Ok(());
    }
    let Some(description) = ai_description(&args) else {
        println!("- AI prediction skipped: no description provided");
        return Ok(());
    };

    match services
        .assessment
        .predict_severity(type_name, description, taluk_name)
        .await
    {
        Ok(ai) => {
            let score = ai.scaled_to_ten();
            println!(
                "- AI prediction: {}/10 ({}) from rubric score {}/5",
                score,
                SeverityLevel::from_score(score),
                ai.score
            );
            println!("  {}", ai.explanation);
        }
        Err(err) => {
            println!("- AI prediction unavailable: {err}");
            println!("  Using the local estimate instead.");
        }
    }

    Ok(())
}

/// The description worth sending to the AI service, if any.
fn ai_description(args: &SeverityArgs) -> Option<&str> {
    let description = args.description.trim();
    (!description.is_empty()).then_some(description)
}

pub(crate) fn run_resolution(args: ResolutionArgs) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let estimator = services.estimator();
    let reference = estimator.reference();

    let severity = args
        .severity
        .unwrap_or_else(|| estimator.estimate_severity(&args.incident_type, &args.taluk));
    let month = if args.seasonal {
        Some(Local::now().month())
    } else {
        args.month
    };
    let estimate = estimator.resolution_estimate(&args.incident_type, &args.taluk, severity, month);

    println!(
        "Resolution estimate: {} in {} (severity {}/10)",
        reference.incident_type_name(&args.incident_type),
        reference.taluk_name(&args.taluk),
        severity
    );
    if let Some(month) = month {
        println!(
            "- Season: {:?} (month {month}, x{:.1})",
            Season::for_month(month),
            Season::for_month(month).multiplier()
        );
    }
    println!(
        "- Expected time: {} ({} minutes)",
        estimate.human_duration(),
        estimate.minutes
    );
    println!("- Confidence: {}%", estimate.confidence);

    Ok(())
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let reference = services.estimator().reference();
    let ledger = &services.analytics.ledger;
    let summary = ledger.summary(reference);

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Dashboard summary unavailable: {err}"),
        }
    } else {
        render_dashboard(&summary);
    }

    if let Some(taluk) = args.taluk {
        render_incidents(ledger, &taluk, reference.taluk_name(&taluk));
    }

    Ok(())
}

pub(crate) async fn run_image_comparison(args: CompareArgs) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let before = read_image_data_url(&args.before)?;
    let after = read_image_data_url(&args.after)?;

    let result = services.assessment.compare_images(&before, &after).await?;

    println!("Image comparison");
    println!("- {} -> {}", args.before.display(), args.after.display());
    println!(
        "- Resolved: {} (confidence {:.0}%)",
        if result.resolved { "yes" } else { "no" },
        result.confidence * 100.0
    );
    println!("- {}", result.description);

    Ok(())
}

fn render_dashboard(summary: &DashboardSummary) {
    println!("Incident dashboard");
    println!(
        "- {} incidents | {} resolved ({}%) | {} high severity | {} critical",
        summary.total_incidents,
        summary.resolved_incidents,
        summary.resolution_rate_percent,
        summary.high_severity_incidents,
        summary.critical_incidents
    );
    println!(
        "- Average resolution {} | average severity {:.1}/10",
        format_minutes(u32::try_from(summary.average_resolution_minutes).unwrap_or(u32::MAX)),
        summary.average_severity
    );

    render_chart("Incidents by taluk", &summary.by_taluk, "");
    render_chart("Incidents by type", &summary.by_type, "");
    render_chart(
        "Average resolution by type",
        &summary.resolution_time_by_type,
        " min",
    );

    println!("\nSeverity distribution");
    for (index, count) in summary.severity_distribution.iter().enumerate() {
        println!("- {:>2}: {}", index + 1, "#".repeat(*count as usize));
    }
}

fn render_chart(title: &str, entries: &[ChartEntry], unit: &str) {
    println!("\n{title}");
    for entry in entries {
        println!("- {}: {}{}", entry.name, entry.value, unit);
    }
}

fn render_incidents(ledger: &IncidentLedger, taluk_id: &str, taluk_name: &str) {
    let incidents: Vec<_> = ledger.by_taluk(taluk_id).collect();
    if incidents.is_empty() {
        println!("\nIncidents in {taluk_name}: none");
        return;
    }

    println!("\nIncidents in {taluk_name}");
    for incident in incidents {
        let status = match incident.resolved_at {
            Some(at) => format!("resolved {}", at.format("%Y-%m-%d %H:%M")),
            None => "open".to_string(),
        };
        println!(
            "- {} | {} | severity {} | {} | {}",
            incident.id,
            incident.incident_type,
            incident.severity,
            status,
            incident.description
        );
    }
}
