//! End-to-end runs of the export job over a local conversations file.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::time::Duration;

use artifactctl_core::{
    ExportJob, ExportOptions, ExportState, FileDownloader, LocalSource, ProgressEvent,
    ZipArchiveSink,
};
use serde_json::json;
use tempfile::NamedTempFile;

fn write_export(value: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file.flush().unwrap();
    file
}

fn options() -> ExportOptions {
    ExportOptions {
        pacing: Duration::ZERO,
        archive_name: "claude-artifacts-2025-01-14.zip".to_string(),
    }
}

#[tokio::test]
async fn local_export_produces_zip_on_disk() {
    let export = write_export(json!([
        {
            "uuid": "c1",
            "name": "Web app",
            "created_at": "2025-01-14T12:00:00Z",
            "chat_messages": [
                {"sender": "human", "text": "make me an app"},
                {"sender": "assistant", "text": "", "content": [
                    {"type": "text", "text": "<antArtifact identifier=\"app\" type=\"application/vnd.ant.code\" language=\"javascript\" title=\"src/app.js\">\nconsole.log('hi');\n</antArtifact>"},
                    {"type": "text", "text": "<antArtifact title=\"src/app.js\" language=\"javascript\">console.log('v2');</antArtifact>"}
                ]}
            ]
        },
        {
            "uuid": "c2",
            "name": "Web app",
            "chat_messages": [
                {"sender": "assistant", "text": "<antArtifact title=\"README\" language=\"markdown\"># Hi</antArtifact>"}
            ]
        },
        {"uuid": "c3", "name": "Small talk", "chat_messages": [{"sender": "assistant", "text": "hello"}]}
    ]));
    let out = tempfile::tempdir().unwrap();

    let source = LocalSource::from_path(export.path()).unwrap();
    let report = ExportJob::new(
        source,
        ZipArchiveSink::new(),
        Box::new(|_: &ProgressEvent| {}),
        Box::new(FileDownloader::new(out.path())),
    )
    .with_options(options())
    .run()
    .await;

    assert_eq!(report.state, ExportState::Completed);
    assert_eq!(report.result.artifact_count, 3);
    assert_eq!(report.result.conversations_with_artifacts_count, 2);
    assert_eq!(report.result.total_conversations, 3);

    let saved = out.path().join("claude-artifacts-2025-01-14.zip");
    assert_eq!(report.result.saved_to.as_deref(), Some(saved.as_path()));

    let mut zip = zip::ZipArchive::new(Cursor::new(fs::read(&saved).unwrap())).unwrap();
    let mut names: Vec<_> = zip.file_names().map(str::to_owned).collect();
    names.sort();
    // Same display name on two conversations shares one folder
    assert_eq!(
        names,
        vec!["Web_app/README.md", "Web_app/src/app.js", "Web_app/src/app_1.js"]
    );

    let mut first = String::new();
    zip.by_name("Web_app/src/app.js").unwrap().read_to_string(&mut first).unwrap();
    assert_eq!(first, "console.log('hi');");
}

#[tokio::test]
async fn local_export_without_artifacts_writes_nothing() {
    let export = write_export(json!({
        "uuid": "solo",
        "name": "Plain",
        "chat_messages": [{"sender": "assistant", "text": "no tags here"}]
    }));
    let out = tempfile::tempdir().unwrap();

    let report = ExportJob::new(
        LocalSource::from_path(export.path()).unwrap(),
        ZipArchiveSink::new(),
        Box::new(|_: &ProgressEvent| {}),
        Box::new(FileDownloader::new(out.path())),
    )
    .with_options(options())
    .run()
    .await;

    assert!(!report.result.succeeded);
    assert!(report.result.error_message.is_some());
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}
