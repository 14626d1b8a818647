use crate::cli::GeometryArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use oqpkit::workflows;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: GeometryArgs, config: &AppConfig) -> Result<()> {
    let job_name = match args.job_name {
        Some(name) => name,
        None => default_job_name(&args.log)?,
    };
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| parent_or_current(&args.log));

    info!(
        "Extracting optimized geometry for job '{}' from {:?}",
        job_name, args.log
    );
    let saved = workflows::extract::save_optimized_geometry(
        &args.log,
        &job_name,
        &output_dir,
        &config.geometry_extension,
    )?;

    println!(
        "✓ Optimized geometry ({} atoms) written to: {}",
        saved.document.atom_count(),
        saved.path.display()
    );
    Ok(())
}

fn default_job_name(log_path: &Path) -> Result<String> {
    log_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            CliError::Argument(format!(
                "Cannot derive a job name from {:?}; pass --job-name.",
                log_path
            ))
        })
}

fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartialAppConfig;
    use oqpkit::core::io::optlog::ExtractError;

    const LOG: &str = "\
PyOQP: Geometry Optimization Step 3
 Cartesian Coordinate in Angstrom
 ATOM   ZNUC       X           Y           Z
 N      7.0    0.000000    0.000000    0.000000
 N      7.0    0.000000    0.000000    1.098000

";

    #[test]
    fn job_name_defaults_to_log_stem() {
        assert_eq!(default_job_name(Path::new("/runs/n2.log")).unwrap(), "n2");
        assert!(matches!(
            default_job_name(Path::new("/")),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn geometry_is_written_next_to_log_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("n2.log");
        std::fs::write(&log, LOG).unwrap();
        let config = PartialAppConfig::default().resolve().unwrap();

        run(
            GeometryArgs {
                log,
                job_name: None,
                output_dir: None,
            },
            &config,
        )
        .unwrap();

        let written = std::fs::read_to_string(dir.path().join("n2_opt_geo.xyz")).unwrap();
        assert!(written.starts_with("2\nOptimized Geometry\nN "));
    }

    #[test]
    fn missing_geometry_surfaces_extract_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("sp.log");
        std::fs::write(&log, "Total energy: -109.5\n").unwrap();
        let config = PartialAppConfig::default().resolve().unwrap();

        let err = run(
            GeometryArgs {
                log,
                job_name: Some("sp".to_string()),
                output_dir: Some(dir.path().to_path_buf()),
            },
            &config,
        )
        .unwrap_err();

        assert!(matches!(err, CliError::Extract(ExtractError::NotFound(_))));
    }
}
