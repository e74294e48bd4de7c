use anyhow::{Context, Result};
use nutrilab::analysis::NutriLab;
use nutrilab::cli::{parse_args, Command, OutputFormat};
use nutrilab::dashboard::{render_plan, share_id, share_message, status_counts, triage};
use nutrilab::logging;
use nutrilab::models::ReportDocument;
use nutrilab::report_parser::ReportUpload;
use tracing::warn;

fn print_report(report: &ReportDocument, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            let overview = triage(report);
            println!("{} - {} ({})", report.patient_name, report.lab_name, report.date);
            println!("Health score: {} ({:?})", report.risk_score, overview.health_band);
            println!("{}\n", report.summary);
            println!("Action required ({} items):", overview.attention.len());
            for b in &overview.attention {
                println!(
                    "  {} {} {} [{}] target {}",
                    b.name,
                    b.value,
                    b.unit,
                    b.status.as_str(),
                    b.range
                );
                if !b.explanation.is_empty() {
                    println!("    {}", b.explanation);
                }
            }
            let normal: Vec<&str> = overview.within_range.iter().map(|b| b.name.as_str()).collect();
            println!("Within range: {}", normal.join(", "));
            let counts: Vec<String> = status_counts(report)
                .into_iter()
                .map(|(status, n)| format!("{}: {}", status.as_str(), n))
                .collect();
            println!("Status distribution: {}", counts.join(", "));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();
    logging::init(cli.verbose);

    let lab = NutriLab::from_env();
    let prefs = cli.command.preferences();

    match &cli.command {
        Command::Parse {
            report_file,
            format,
        } => {
            let upload = ReportUpload::from_path(report_file)
                .await
                .with_context(|| format!("Failed to read report file '{}'", report_file.display()))?;
            let parsed = lab.parse_report(&upload).await;
            if let Some(warning) = &parsed.warning {
                warn!("{}", warning);
            }
            print_report(&parsed.report, *format)?;
        }
        Command::Plan {
            report_file,
            format,
            share_day,
            ..
        } => {
            let upload = ReportUpload::from_path(report_file)
                .await
                .with_context(|| format!("Failed to read report file '{}'", report_file.display()))?;
            let parsed = lab.parse_report(&upload).await;
            if let Some(warning) = &parsed.warning {
                warn!("{}", warning);
            }

            let generated = lab.generate_plan(&parsed.report, prefs).await;
            let language = prefs.unwrap_or_default().language;

            match format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "dietPlan": generated.plan,
                        "detailedSummary": generated.summary,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("{}\n", generated.summary);
                    print!("{}", render_plan(&generated.plan, language));
                }
            }

            if let Some(index) = share_day {
                let day = generated
                    .plan
                    .weekly_plan
                    .get(*index)
                    .with_context(|| format!("Day index {} is outside the 7-day plan", index))?;
                let id = share_id(&mut rand::thread_rng());
                println!("\n{}", share_message(&day.day, &id));
            }
        }
    }

    Ok(())
}
