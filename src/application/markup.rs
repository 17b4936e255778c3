//! Markup step: load → normalize → classify → render → write.

use std::path::PathBuf;

use time::OffsetDateTime;
use tracing::info;

use crate::{
    application::error::AppError,
    config::Settings,
    domain::engagements::{classify, normalize},
    infra::{data, output},
    presentation::views::{Page, render_page},
};

#[derive(Debug, Clone)]
pub struct MarkupReport {
    pub path: PathBuf,
    pub past: usize,
    pub upcoming: usize,
    pub talks: usize,
}

/// Render the index page, classifying events relative to `now`.
pub async fn build_markup(
    settings: &Settings,
    now: OffsetDateTime,
) -> Result<MarkupReport, AppError> {
    info!(target = "lectern::markup", "Building markup");

    let document = data::load_document(&settings.build.data_file).await?;
    let classified = classify(normalize(document)?, now);

    let page = Page::Index;
    let html = render_page(page, &classified, &settings.site, now)?;
    let path = settings.build.output_dir.join(page.file_name());
    output::write_output(&path, html).await?;

    let report = MarkupReport {
        path,
        past: classified.events.past.len(),
        upcoming: classified.events.upcoming.len(),
        talks: classified.talks.len(),
    };

    info!(
        target = "lectern::markup",
        path = %report.path.display(),
        past = report.past,
        upcoming = report.upcoming,
        talks = report.talks,
        "Markup done"
    );
    Ok(report)
}
