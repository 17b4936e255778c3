use std::process;

use lectern::{
    application::{build::build_site, error::AppError},
    config,
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(
            error = %error,
            origin = report.source,
            causes = ?report.messages,
            "build failed"
        );
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(
            error = %error,
            origin = report.source,
            causes = ?report.messages,
            "build failed"
        );
    });
}

async fn run() -> Result<(), AppError> {
    let (_, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    telemetry::init(&settings.logging)?;

    let report = build_site(&settings).await?;
    info!(
        target = "lectern::build",
        index = %report.markup.path.display(),
        stylesheet = %report.styles.css_path.display(),
        "Site written"
    );
    Ok(())
}
