use crate::cli::RunArgs;
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use oqpkit::engine::progress::ProgressReporter;
use oqpkit::engine::runner::JobRunner;
use oqpkit::workflows;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(
    args: RunArgs,
    mut partial_config: PartialAppConfig,
    ui_sender: mpsc::UnboundedSender<UiEvent>,
) -> Result<()> {
    if !args.input.is_file() {
        return Err(CliError::Argument(format!(
            "Input file does not exist: {}",
            args.input.display()
        )));
    }

    info!("Merging configuration from file and CLI arguments...");
    partial_config.apply_run_args(&args);
    let config = partial_config.resolve()?;

    let working_dir = resolve_working_dir(&args.input, args.working_dir.as_deref());
    let input_dir = resolve_working_dir(&args.input, None);
    if args.working_dir.is_some()
        && std::path::absolute(&input_dir)? != std::path::absolute(&working_dir)?
    {
        warn!(
            "Input file {:?} is not inside the working directory {:?}; the job will only see files under the working directory.",
            args.input, working_dir
        );
    }

    let runner = JobRunner::new(config.runner);
    let progress_handler = CliProgressHandler::new(ui_sender.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the job workflow...");
    let report = workflows::run::run(
        &runner,
        &args.input,
        &working_dir,
        &reporter,
        interrupt_signal(),
    )
    .await?;

    info!(
        "Job finished in state '{}' after {} output event(s).",
        report.outcome.state, report.events_delivered
    );
    if !report.outcome.is_success() {
        return Err(CliError::JobUnsuccessful {
            state: report.outcome.state,
            exit_code: report.outcome.exit_code,
        });
    }

    if args.extract_geometry {
        let job_name = args.job_name.unwrap_or_else(|| report.job.name());
        let saved = workflows::extract::save_optimized_geometry(
            &report.job.log_path,
            &job_name,
            &report.job.working_dir,
            &config.geometry_extension,
        )?;
        let message = format!(
            "✓ Optimized geometry ({} atoms) written to: {}",
            saved.document.atom_count(),
            saved.path.display()
        );
        if ui_sender.send(UiEvent::Log(message)).is_err() {
            warn!("UI channel closed before the geometry summary could be shown.");
        }
    }

    Ok(())
}

fn resolve_working_dir(input: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolves on the first Ctrl-C. If the handler cannot be installed it never resolves.
async fn interrupt_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupt received; cancelling the job."),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_dir_defaults_to_input_parent() {
        assert_eq!(
            resolve_working_dir(Path::new("/jobs/water/water.inp"), None),
            PathBuf::from("/jobs/water")
        );
        assert_eq!(
            resolve_working_dir(Path::new("water.inp"), None),
            PathBuf::from(".")
        );
        assert_eq!(
            resolve_working_dir(Path::new("/jobs/water/water.inp"), Some(Path::new("/scratch"))),
            PathBuf::from("/scratch")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_extracts_geometry_after_successful_job() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("water.sh");
        std::fs::write(
            &input,
            "cat > water.log <<'LOG'\n\
             PyOQP: Geometry Optimization Step 1\n\
             Cartesian Coordinate in Angstrom\n\
             ATOM ZNUC X Y Z\n\
             O 8.0 0.0 0.0 0.117\n\
             H 1.0 0.0 0.757 -0.468\n\
             \n\
             LOG\n",
        )
        .unwrap();
        let mut partial = PartialAppConfig::default();
        partial
            .apply_set_values(&["runtime.mode=direct".to_string(), "runtime.program=sh".to_string()])
            .unwrap();
        let args = RunArgs {
            input: input.clone(),
            working_dir: None,
            image: None,
            container_name: None,
            extract_geometry: true,
            job_name: None,
        };
        let (sender, mut receiver) = mpsc::unbounded_channel();

        run(args, partial, sender).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("water_opt_geo.xyz")).unwrap();
        assert!(written.starts_with("2\nOptimized Geometry\nO "));
        let mut saw_summary = false;
        while let Ok(event) = receiver.try_recv() {
            if let UiEvent::Log(msg) = event {
                saw_summary |= msg.contains("water_opt_geo.xyz");
            }
        }
        assert!(saw_summary);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_job_is_reported_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fail.sh");
        std::fs::write(&input, "exit 5\n").unwrap();
        let mut partial = PartialAppConfig::default();
        partial
            .apply_set_values(&["runtime.mode=direct".to_string(), "runtime.program=sh".to_string()])
            .unwrap();
        let args = RunArgs {
            input,
            working_dir: None,
            image: None,
            container_name: None,
            extract_geometry: false,
            job_name: None,
        };
        let (sender, _receiver) = mpsc::unbounded_channel();

        let err = run(args, partial, sender).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::JobUnsuccessful {
                exit_code: Some(5),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_input_is_rejected_before_launch() {
        let (sender, _receiver) = mpsc::unbounded_channel();
        let args = RunArgs {
            input: PathBuf::from("/nonexistent/water.inp"),
            working_dir: None,
            image: None,
            container_name: None,
            extract_geometry: false,
            job_name: None,
        };
        let err = run(args, PartialAppConfig::default(), sender)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }
}
