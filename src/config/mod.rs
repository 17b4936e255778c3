//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::*;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "lectern";
const ENV_PREFIX: &str = "LECTERN";
const DEFAULT_OUTPUT_DIR: &str = "dist";
const DEFAULT_DATA_FILE: &str = "engagements.yml";
const DEFAULT_STYLESHEET: &str = "sass/main.scss";
const DEFAULT_SITE_TITLE: &str = "Talks & Engagements";
const DEFAULT_SCRIPT_DELAY_MS: u64 = 400;

/// Fully-resolved build settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub build: BuildSettings,
    pub site: SiteSettings,
    pub styles: StyleSettings,
    pub scripts: ScriptSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub output_dir: PathBuf,
    pub data_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct StyleSettings {
    pub entry: PathBuf,
    pub output_style: StyleOutput,
    pub source_map: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleOutput {
    Expanded,
    Compressed,
}

impl FromStr for StyleOutput {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "expanded" => Ok(Self::Expanded),
            "compressed" => Ok(Self::Compressed),
            other => Err(format!(
                "unknown output style `{other}` (expected expanded|compressed)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptSettings {
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    load_with_environment(cli, None)
}

/// `environment` replaces the process environment when given.
fn load_with_environment(
    cli: &CliArgs,
    environment: Option<Map<String, String>>,
) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(environment),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    build: RawBuildSettings,
    site: RawSiteSettings,
    styles: RawStyleSettings,
    scripts: RawScriptSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &BuildOverrides) {
        if let Some(dir) = overrides.output_dir.as_ref() {
            self.build.output_dir = Some(dir.clone());
        }
        if let Some(path) = overrides.data_file.as_ref() {
            self.build.data_file = Some(path.clone());
        }
        if let Some(path) = overrides.stylesheet.as_ref() {
            self.styles.entry = Some(path.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            build,
            site,
            styles,
            scripts,
            logging,
        } = raw;

        Ok(Self {
            build: build_build_settings(build)?,
            site: build_site_settings(site),
            styles: build_style_settings(styles)?,
            scripts: build_script_settings(scripts),
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_build_settings(build: RawBuildSettings) -> Result<BuildSettings, LoadError> {
    let output_dir = non_empty_path(build.output_dir, DEFAULT_OUTPUT_DIR, "build.output_dir")?;
    let data_file = non_empty_path(build.data_file, DEFAULT_DATA_FILE, "build.data_file")?;

    Ok(BuildSettings {
        output_dir,
        data_file,
    })
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    let title = site
        .title
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());

    SiteSettings { title }
}

fn build_style_settings(styles: RawStyleSettings) -> Result<StyleSettings, LoadError> {
    let entry = non_empty_path(styles.entry, DEFAULT_STYLESHEET, "styles.entry")?;

    let output_style = match styles.output_style {
        Some(value) => StyleOutput::from_str(&value)
            .map_err(|reason| LoadError::invalid("styles.output_style", reason))?,
        None => StyleOutput::Expanded,
    };

    Ok(StyleSettings {
        entry,
        output_style,
        source_map: styles.source_map.unwrap_or(true),
    })
}

fn build_script_settings(scripts: RawScriptSettings) -> ScriptSettings {
    ScriptSettings {
        delay: Duration::from_millis(scripts.delay_ms.unwrap_or(DEFAULT_SCRIPT_DELAY_MS)),
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: &str,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBuildSettings {
    output_dir: Option<PathBuf>,
    data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStyleSettings {
    entry: Option<PathBuf>,
    output_style: Option<String>,
    source_map: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawScriptSettings {
    delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}
