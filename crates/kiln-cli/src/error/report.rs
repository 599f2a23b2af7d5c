//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use kiln_pipeline::PipelineError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Pipeline(e) => pipeline_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert PipelineError to miette Report
pub fn pipeline_error_to_miette(err: PipelineError) -> Report {
    match err {
        PipelineError::UnknownTask { name, available } => miette::miette!(
            "Task '{}' is not defined\n\nAvailable tasks: {}\n\nHint: Run 'kiln --tasks' to see what each task does",
            name,
            available
        ),
        PipelineError::Config(message) => miette::miette!(
            "Configuration error: {}\n\nHint: Check kiln.config.json and any KILN_* environment variables",
            message
        ),
        PipelineError::TaskFailed { task, source } => match *source {
            PipelineError::MissingInput(path) => miette::miette!(
                "Task '{}' failed: input file not found: {}\n\nHint: Every file listed in the bundle configuration must exist",
                task,
                path.display()
            ),
            other => miette::miette!("Task '{}' failed: {}", task, other),
        },
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unknown_task_report_has_hint() {
        let report = cli_error_to_miette(CliError::Pipeline(PipelineError::UnknownTask {
            name: "deploy".into(),
            available: "build, css".into(),
        }));
        let text = report.to_string();
        assert!(text.contains("deploy"));
        assert!(text.contains("build, css"));
        assert!(text.contains("kiln --tasks"));
    }

    #[test]
    fn test_missing_input_report_names_task_and_file() {
        let report = pipeline_error_to_miette(PipelineError::TaskFailed {
            task: "js".into(),
            source: Box::new(PipelineError::MissingInput(PathBuf::from("src/js/main.js"))),
        });
        let text = report.to_string();
        assert!(text.contains("'js'"));
        assert!(text.contains("src/js/main.js"));
    }
}
