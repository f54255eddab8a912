use crate::infra::build_controller;
use clap::Args;
use redacai::config::AppConfig;
use redacai::error::AppError;
use redacai::telemetry;
use redacai::workflows::correction::{ControllerError, EvaluationResult, QuotaSnapshot};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["file", "text"]),
))]
pub(crate) struct EvaluateArgs {
    /// Read the essay from a UTF-8 text file
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Pass the essay inline
    #[arg(long)]
    pub(crate) text: Option<String>,
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let essay = match (args.file, args.text) {
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(text)) => text,
        (None, None) => String::new(),
    };

    let controller = build_controller(&config);
    match controller.submit(&essay).await {
        Ok(result) => {
            render_result(&result);
            render_quota(&controller.quota());
            Ok(())
        }
        Err(err) => Err(report(err)),
    }
}

pub(crate) fn run_quota_status() -> Result<(), AppError> {
    let config = load_config()?;
    let controller = build_controller(&config);
    render_quota(&controller.quota());
    Ok(())
}

pub(crate) fn run_bonus() -> Result<(), AppError> {
    let config = load_config()?;
    let controller = build_controller(&config);
    match controller.grant_bonus() {
        Ok(snapshot) => {
            println!("Correção bônus liberada.");
            render_quota(&snapshot);
            Ok(())
        }
        Err(err) => Err(report(err)),
    }
}

fn report(err: ControllerError) -> AppError {
    let notice = err.notice();
    eprintln!("{}: {}", notice.title, notice.description);
    if let ControllerError::QuotaExceeded(limit) = &err {
        eprintln!(
            "Opções: `redacai-api quota bonus` (requer login) ou conheça os planos em {}",
            limit.plans_anchor
        );
    }
    AppError::from(err)
}

fn render_result(result: &EvaluationResult) {
    match result.score {
        Some(score) => println!("Nota simulada: {score} / 1000 ({:.0}%)", result.score_progress()),
        None => println!("Nota simulada: – / 1000"),
    }
    println!();
    println!("{}", result.composed_feedback);
}

fn render_quota(snapshot: &QuotaSnapshot) {
    println!();
    println!(
        "Correções hoje ({}): {} / {} | {}",
        snapshot.date,
        snapshot.used,
        snapshot.daily_limit,
        snapshot.badge_label()
    );
}
