use std::process::ExitCode;

use bacmon_service::logging::{self, Stage};
use bacmon_service::model::MonitorError;
use bacmon_service::{analysis, report, sampling_points};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), MonitorError> {
    let config = sampling_points::embedded_config()?;
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    )?;

    let points = sampling_points::from_config(&config)?;
    logging::info(
        Stage::Config,
        None,
        &format!("Loaded {} sampling points", points.len()),
    );

    for point in &points {
        let samples = point
            .normalize()
            .inspect_err(|e| logging::log_pipeline_failure(&point.id, Stage::Normalize, e))?;
        logging::log_normalization_summary(&point.id, point.dataset.dates.len(), samples.len());

        let analysis = analysis::analyze(&samples, &point.indicator_names());
        logging::info(
            Stage::Aggregate,
            Some(&point.id),
            &format!("{} monthly buckets", analysis.buckets.len()),
        );

        let payload = report::build_chart_payload(point, &analysis);
        logging::debug(Stage::Report, Some(&point.id), &payload.to_json()?);

        println!("{}", point.name);
        println!("{}", report::format_statistics_table(&analysis));
    }

    Ok(())
}
