//! Whole-site build: markup, styles and scripts run concurrently.

use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tokio::try_join;
use tracing::info;

use crate::{
    application::{
        error::AppError,
        markup::{MarkupReport, build_markup},
        scripts::{PlaceholderBundler, ScriptBundler, build_scripts},
        styles::{StyleReport, build_styles},
    },
    config::Settings,
    infra::output,
};

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub markup: MarkupReport,
    pub styles: StyleReport,
    pub duration: Duration,
}

/// Build the site with the placeholder script step, classifying against the current time.
pub async fn build_site(settings: &Settings) -> Result<BuildReport, AppError> {
    let bundler = PlaceholderBundler::from_settings(&settings.scripts);
    build_site_with(settings, &bundler, OffsetDateTime::now_utc()).await
}

/// Run the three steps and wait for all of them.
///
/// The first failing step fails the build; files already written by the
/// other steps are left in place.
pub async fn build_site_with(
    settings: &Settings,
    bundler: &dyn ScriptBundler,
    now: OffsetDateTime,
) -> Result<BuildReport, AppError> {
    let started = Instant::now();
    let output_dir = &settings.build.output_dir;
    info!(
        target = "lectern::build",
        output_dir = %output_dir.display(),
        "Starting build"
    );

    output::ensure_dir(output_dir).await?;

    let (markup, styles, ()) = try_join!(
        build_markup(settings, now),
        build_styles(settings),
        build_scripts(bundler, output_dir),
    )?;

    let duration = started.elapsed();
    info!(
        target = "lectern::build",
        duration_ms = duration.as_millis() as u64,
        "Build completed"
    );

    Ok(BuildReport {
        markup,
        styles,
        duration,
    })
}
