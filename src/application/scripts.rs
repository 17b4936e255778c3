//! Script step.
//!
//! There is no bundler yet; [`PlaceholderBundler`] only waits so the step
//! still occupies its slot in the concurrent build.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use tracing::info;

use crate::{application::error::AppError, config::ScriptSettings};

#[async_trait]
pub trait ScriptBundler: Send + Sync {
    async fn bundle(&self, output_dir: &Path) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct PlaceholderBundler {
    delay: Duration,
}

impl PlaceholderBundler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_settings(settings: &ScriptSettings) -> Self {
        Self::new(settings.delay)
    }
}

#[async_trait]
impl ScriptBundler for PlaceholderBundler {
    async fn bundle(&self, _output_dir: &Path) -> Result<(), AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

pub async fn build_scripts(bundler: &dyn ScriptBundler, output_dir: &Path) -> Result<(), AppError> {
    info!(target = "lectern::scripts", "Building scripts");
    bundler.bundle(output_dir).await?;
    info!(target = "lectern::scripts", "Scripts done");
    Ok(())
}
