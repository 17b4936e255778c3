use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use lectern::{
    application::{
        build::build_site_with,
        error::AppError,
        scripts::{PlaceholderBundler, ScriptBundler},
    },
    config::{
        BuildSettings, LogFormat, LoggingSettings, ScriptSettings, Settings, SiteSettings,
        StyleOutput, StyleSettings,
    },
    infra::error::InfraError,
};
use tempfile::{TempDir, tempdir};
use time::macros::datetime;
use tracing::level_filters::LevelFilter;

const ENGAGEMENTS: &str = r#"
talks:
  ownership:
    sort: 1
    title: Ownership without tears
    slides: https://example.com/ownership
  async:
    sort: 2
    title: Async in anger
  legacy:
    sort: 0
    title: Legacy talk
    deprecated: true
events:
  - name: RustConf
    location: Portland
    date: 2020-04-02
    talk: ownership
  - name: EuroRust
    date: "2999-09-09T09:00:00Z"
    talk: async
  - name: Ghost Meetup
    date: 2021-06-01
    talk: nonexistent
"#;

const STYLESHEET: &str = "$accent: #336699;\nbody { a { color: $accent; } }\n";

struct Site {
    _dir: TempDir,
    root: PathBuf,
}

impl Site {
    fn new(engagements: Option<&str>, stylesheet: &str) -> Self {
        let dir = tempdir().expect("temp dir");
        let root = dir.path().to_path_buf();
        if let Some(engagements) = engagements {
            fs::write(root.join("engagements.yml"), engagements).expect("data written");
        }
        fs::create_dir_all(root.join("sass")).expect("sass dir");
        fs::write(root.join("sass/main.scss"), stylesheet).expect("stylesheet written");
        Self { _dir: dir, root }
    }

    fn settings(&self) -> Settings {
        Settings {
            build: BuildSettings {
                output_dir: self.root.join("dist"),
                data_file: self.root.join("engagements.yml"),
            },
            site: SiteSettings {
                title: "Speaking".to_string(),
            },
            styles: StyleSettings {
                entry: self.root.join("sass/main.scss"),
                output_style: StyleOutput::Expanded,
                source_map: true,
            },
            scripts: ScriptSettings {
                delay: Duration::ZERO,
            },
            logging: LoggingSettings {
                level: LevelFilter::INFO,
                format: LogFormat::Compact,
            },
        }
    }

    fn output(&self, relative: &str) -> PathBuf {
        self.root.join("dist").join(relative)
    }
}

fn bundler() -> PlaceholderBundler {
    PlaceholderBundler::new(Duration::ZERO)
}

#[tokio::test]
async fn builds_index_styles_and_source_map() {
    let site = Site::new(Some(ENGAGEMENTS), STYLESHEET);
    let settings = site.settings();

    let report = build_site_with(&settings, &bundler(), datetime!(2025-01-01 0:00 UTC))
        .await
        .expect("build succeeds");

    assert_eq!(report.markup.past, 1);
    assert_eq!(report.markup.upcoming, 1);
    assert_eq!(report.markup.talks, 2);
    assert_eq!(report.markup.path, site.output("index.html"));

    let html = fs::read_to_string(site.output("index.html")).expect("index written");
    assert!(html.contains("RustConf"));
    assert!(html.contains("Apr 2, 2020"));
    assert!(html.contains("EuroRust"));
    assert!(html.contains("Ownership without tears"));
    assert!(!html.contains("Ghost Meetup"));
    assert!(!html.contains("Legacy talk"));

    let css = fs::read_to_string(site.output("css/main.css")).expect("stylesheet written");
    assert!(css.contains("body a"), "{css}");
    assert!(css.contains("#336699"), "{css}");
    assert!(css.contains("sourceMappingURL=main.css.map"));

    let map: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(site.output("css/main.css.map")).expect("map written"),
    )
    .expect("map is json");
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "main.css");
    assert_eq!(map["sources"][0], "../../sass/main.scss");
    assert_eq!(map["sourcesContent"][0], STYLESHEET);
    assert_eq!(
        report.styles.map_path.as_deref(),
        Some(site.output("css/main.css.map").as_path())
    );
}

#[tokio::test]
async fn empty_collections_build_an_empty_page() {
    let site = Site::new(Some("events: []\ntalks: {}\n"), STYLESHEET);

    let report = build_site_with(&site.settings(), &bundler(), datetime!(2025-01-01 0:00 UTC))
        .await
        .expect("build succeeds");

    assert_eq!(report.markup.past, 0);
    assert_eq!(report.markup.upcoming, 0);
    assert_eq!(report.markup.talks, 0);

    let html = fs::read_to_string(site.output("index.html")).expect("index written");
    assert!(html.contains("Nothing scheduled right now."));
}

#[tokio::test]
async fn compressed_without_source_map() {
    let site = Site::new(Some(ENGAGEMENTS), STYLESHEET);
    let mut settings = site.settings();
    settings.styles.output_style = StyleOutput::Compressed;
    settings.styles.source_map = false;

    let report = build_site_with(&settings, &bundler(), datetime!(2025-01-01 0:00 UTC))
        .await
        .expect("build succeeds");

    assert!(report.styles.map_path.is_none());
    assert!(!site.output("css/main.css.map").exists());
    let css = fs::read_to_string(site.output("css/main.css")).expect("stylesheet written");
    assert!(!css.contains("sourceMappingURL"));
}

#[tokio::test]
async fn missing_data_file_fails_the_build() {
    let site = Site::new(None, STYLESHEET);

    let err = build_site_with(&site.settings(), &bundler(), datetime!(2025-01-01 0:00 UTC))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Infra(InfraError::Io { .. })), "{err}");
    assert!(!site.output("index.html").exists());
}

#[tokio::test]
async fn malformed_data_file_fails_the_build() {
    let site = Site::new(Some("events: [\n"), STYLESHEET);

    let err = build_site_with(&site.settings(), &bundler(), datetime!(2025-01-01 0:00 UTC))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Infra(InfraError::DataSource { .. })), "{err}");
}

#[tokio::test]
async fn unparseable_event_date_fails_the_build() {
    let site = Site::new(
        Some("talks:\n  k: { sort: 1 }\nevents:\n  - { date: soon, talk: k }\n"),
        STYLESHEET,
    );

    let err = build_site_with(&site.settings(), &bundler(), datetime!(2025-01-01 0:00 UTC))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(_)), "{err}");
}

#[tokio::test]
async fn stylesheet_error_fails_the_build() {
    let site = Site::new(Some(ENGAGEMENTS), "body { color: $missing; }\n");

    let err = build_site_with(&site.settings(), &bundler(), datetime!(2025-01-01 0:00 UTC))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Stylesheet(_)), "{err}");
}

struct FailingBundler;

#[async_trait]
impl ScriptBundler for FailingBundler {
    async fn bundle(&self, _output_dir: &Path) -> Result<(), AppError> {
        Err(AppError::unexpected("bundler exploded"))
    }
}

#[tokio::test]
async fn script_step_failure_fails_the_build() {
    let site = Site::new(Some(ENGAGEMENTS), STYLESHEET);

    let err = build_site_with(&site.settings(), &FailingBundler, datetime!(2025-01-01 0:00 UTC))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("bundler exploded"));
}
