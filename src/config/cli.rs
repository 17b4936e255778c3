use std::path::PathBuf;

use clap::{Args, Parser, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the lectern binary.
///
/// Every flag is optional; running without arguments performs the default build.
#[derive(Debug, Default, Parser)]
#[command(
    name = "lectern",
    version,
    about = "Build the talks and speaking engagements site"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "LECTERN_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: BuildOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildOverrides {
    /// Override the directory receiving the generated site.
    #[arg(
        long = "output-dir",
        env = "OUTPUT_DIR",
        value_name = "PATH",
        value_hint = ValueHint::DirPath
    )]
    pub output_dir: Option<PathBuf>,

    /// Override the engagement data file.
    #[arg(long = "data-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub data_file: Option<PathBuf>,

    /// Override the stylesheet entry file.
    #[arg(long = "stylesheet", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub stylesheet: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}
