//! Engagement data file access.

use std::path::Path;

use tracing::debug;

use crate::domain::engagements::EngagementDocument;

use super::error::InfraError;

/// Read and deserialize the YAML engagement document at `path`.
pub async fn load_document(path: &Path) -> Result<EngagementDocument, InfraError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| InfraError::io(path, err))?;

    let document = parse_document(path, &contents)?;
    debug!(
        path = %path.display(),
        events = document.events.len(),
        talks = document.talks.len(),
        "loaded engagement document"
    );
    Ok(document)
}

pub fn parse_document(path: &Path, contents: &str) -> Result<EngagementDocument, InfraError> {
    serde_yaml_ng::from_str(contents).map_err(|err| InfraError::data_source(path, err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn missing_file_reports_path() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nowhere.yml");

        let err = load_document(&path).await.unwrap_err();

        assert!(matches!(err, InfraError::Io { .. }));
        assert!(err.to_string().contains("nowhere.yml"), "{err}");
    }

    #[tokio::test]
    async fn reads_events_and_talks() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("engagements.yml");
        tokio::fs::write(
            &path,
            "talks:\n  k:\n    sort: 1\nevents:\n  - date: 2024-03-05\n    talk: k\n",
        )
        .await
        .expect("fixture written");

        let document = load_document(&path).await.expect("loads");

        assert_eq!(document.events.len(), 1);
        assert!(document.talks.contains_key("k"));
    }

    #[test]
    fn malformed_yaml_is_a_data_source_error() {
        let path = PathBuf::from("engagements.yml");
        let err = parse_document(&path, "events: [unterminated").unwrap_err();
        assert!(matches!(err, InfraError::DataSource { .. }));
    }

    #[test]
    fn wrong_shape_is_a_data_source_error() {
        let path = PathBuf::from("engagements.yml");
        let err = parse_document(&path, "events: 12\n").unwrap_err();
        assert!(matches!(err, InfraError::DataSource { .. }));
    }
}
