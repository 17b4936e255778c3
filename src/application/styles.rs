//! Style step: SCSS entry file → `css/main.css` (+ source map).

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    application::error::AppError,
    config::{Settings, StyleOutput},
    infra::{error::InfraError, output},
};

pub const STYLESHEET_OUTPUT: &str = "css/main.css";
const SOURCE_MAP_VERSION: u8 = 3;

#[derive(Debug, Clone)]
pub struct StyleReport {
    pub css_path: PathBuf,
    pub map_path: Option<PathBuf>,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMap<'a> {
    version: u8,
    file: &'a str,
    sources: Vec<String>,
    sources_content: Vec<String>,
    names: Vec<String>,
    mappings: &'a str,
}

pub async fn build_styles(settings: &Settings) -> Result<StyleReport, AppError> {
    info!(target = "lectern::styles", "Building styles");

    let styles = &settings.styles;
    let entry = styles.entry.clone();
    let output_style = styles.output_style;
    let mut css = tokio::task::spawn_blocking(move || compile_stylesheet(&entry, output_style))
        .await
        .map_err(|err| AppError::unexpected(format!("stylesheet task failed: {err}")))??;

    let css_path = settings.build.output_dir.join(STYLESHEET_OUTPUT);
    let map_path = if styles.source_map {
        let map_path = source_map_path(&css_path);
        let map = source_map(&css_path, &styles.entry).await?;
        if let Some(name) = map_path.file_name() {
            css.push_str(&format!(
                "\n/*# sourceMappingURL={} */\n",
                name.to_string_lossy()
            ));
        }
        output::write_output(&map_path, map).await?;
        Some(map_path)
    } else {
        None
    };

    let bytes = css.len();
    output::write_output(&css_path, css).await?;

    info!(
        target = "lectern::styles",
        path = %css_path.display(),
        bytes,
        "Styles done"
    );
    Ok(StyleReport {
        css_path,
        map_path,
        bytes,
    })
}

/// Compile the SCSS entry file with `grass`.
pub fn compile_stylesheet(entry: &Path, output_style: StyleOutput) -> Result<String, AppError> {
    let style = match output_style {
        StyleOutput::Expanded => grass::OutputStyle::Expanded,
        StyleOutput::Compressed => grass::OutputStyle::Compressed,
    };
    let options = grass::Options::default().style(style);

    debug!(entry = %entry.display(), ?output_style, "compiling stylesheet");
    grass::from_path(entry, &options)
        .map_err(|err| AppError::stylesheet(format!("{}: {err}", entry.display())))
}

fn source_map_path(css_path: &Path) -> PathBuf {
    let mut name = css_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".map");
    css_path.with_file_name(name)
}

/// Path of `entry` as seen from `map_dir`, which is how map consumers resolve `sources`.
fn source_reference(entry: &Path, map_dir: &Path) -> String {
    let file_name = || {
        entry
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    if entry.is_absolute() != map_dir.is_absolute() {
        return file_name();
    }

    let entry_parts: Vec<Component<'_>> = entry
        .components()
        .filter(|part| !matches!(part, Component::CurDir))
        .collect();
    let dir_parts: Vec<Component<'_>> = map_dir
        .components()
        .filter(|part| !matches!(part, Component::CurDir))
        .collect();
    let shared = entry_parts
        .iter()
        .zip(&dir_parts)
        .take_while(|(left, right)| left == right)
        .count();
    if dir_parts[shared..]
        .iter()
        .any(|part| matches!(part, Component::ParentDir))
    {
        return file_name();
    }

    let mut relative = PathBuf::new();
    for _ in shared..dir_parts.len() {
        relative.push("..");
    }
    for part in &entry_parts[shared..] {
        relative.push(part.as_os_str());
    }
    relative.to_string_lossy().replace('\\', "/")
}

async fn source_map(css_path: &Path, entry: &Path) -> Result<String, AppError> {
    let content = tokio::fs::read_to_string(entry)
        .await
        .map_err(|err| InfraError::io(entry, err))?;
    let file = css_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let map_dir = css_path.parent().unwrap_or(Path::new(""));

    let map = SourceMap {
        version: SOURCE_MAP_VERSION,
        file: &file,
        sources: vec![source_reference(entry, map_dir)],
        sources_content: vec![content],
        names: Vec::new(),
        mappings: "",
    };

    serde_json::to_string(&map)
        .map_err(|err| AppError::unexpected(format!("failed to encode source map: {err}")))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn variables_and_nesting_are_compiled() {
        let dir = tempdir().expect("temp dir");
        let entry = dir.path().join("main.scss");
        std::fs::write(&entry, "$accent: #336699;\nnav { a { color: $accent; } }\n")
            .expect("fixture written");

        let css = compile_stylesheet(&entry, StyleOutput::Expanded).expect("compiles");

        assert!(css.contains("nav a"), "{css}");
        assert!(css.contains("#336699"), "{css}");
        assert!(!css.contains("$accent"));
    }

    #[test]
    fn compressed_output_has_no_line_breaks_between_rules() {
        let dir = tempdir().expect("temp dir");
        let entry = dir.path().join("main.scss");
        std::fs::write(&entry, "a { color: red; }\nb { color: blue; }\n").expect("fixture written");

        let css = compile_stylesheet(&entry, StyleOutput::Compressed).expect("compiles");

        assert!(!css.trim_end().contains('\n'), "{css}");
    }

    #[test]
    fn syntax_errors_name_the_entry_file() {
        let dir = tempdir().expect("temp dir");
        let entry = dir.path().join("broken.scss");
        std::fs::write(&entry, "a { color: $undefined; }\n").expect("fixture written");

        let err = compile_stylesheet(&entry, StyleOutput::Expanded).unwrap_err();

        assert!(matches!(err, AppError::Stylesheet(_)));
        assert!(err.to_string().contains("broken.scss"), "{err}");
    }

    #[test]
    fn sources_resolve_from_the_map_directory() {
        assert_eq!(
            source_reference(Path::new("sass/main.scss"), Path::new("dist/css")),
            "../../sass/main.scss"
        );
        assert_eq!(
            source_reference(Path::new("/site/sass/main.scss"), Path::new("/site/dist/css")),
            "../../sass/main.scss"
        );
        assert_eq!(
            source_reference(Path::new("./main.scss"), Path::new("dist")),
            "../main.scss"
        );
        assert_eq!(
            source_reference(Path::new("sass/main.scss"), Path::new("../out/css")),
            "main.scss"
        );
        assert_eq!(
            source_reference(Path::new("sass/main.scss"), Path::new("/srv/www/css")),
            "main.scss"
        );
    }

    #[test]
    fn map_sits_next_to_stylesheet() {
        let path = source_map_path(Path::new("dist/css/main.css"));
        assert_eq!(path, Path::new("dist/css/main.css.map"));
    }
}
