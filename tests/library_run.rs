// tests/library_run.rs

mod common;

use common::{contents_response, service_over, widgets_transport};
use repo_explorer::core_types::MaxDepth;
use repo_explorer::errors::Error;
use repo_explorer::git::HttpResponse;
use repo_explorer::{run, CancellationToken, ContentSelection, OutputDestination, RunRequest};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn request(selection: ContentSelection, output: &std::path::Path) -> RunRequest {
    RunRequest {
        url: "https://github.com/acme/widgets".to_string(),
        max_depth: MaxDepth::Unlimited,
        ignore_patterns: vec!["*.lock".to_string()],
        selection,
        destination: OutputDestination::File(output.to_path_buf()),
    }
}

#[tokio::test]
async fn test_run_tree_only_writes_tree() -> anyhow::Result<()> {
    let temp = tempdir()?;
    let output = temp.path().join("tree.txt");
    let service = service_over(Arc::new(widgets_transport(&[
        "Cargo.lock",
        "README.md",
        "src/",
        "src/main.rs",
    ])));

    run(
        &service,
        &request(ContentSelection::TreeOnly, &output),
        &CancellationToken::new(),
        None,
    )
    .await?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "├── src/\n│   └── main.rs\n└── README.md\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_run_all_writes_markdown_in_tree_order() -> anyhow::Result<()> {
    let temp = tempdir()?;
    let output = temp.path().join("out.md");
    let transport = widgets_transport(&["README.md", "logo.png", "src/", "src/main.rs"])
        .route("/contents/README.md", contents_response("# Widgets\n"))
        .route("/contents/src/main.rs", contents_response("fn main() {}\n"));
    let service = service_over(Arc::new(transport));

    run(
        &service,
        &request(ContentSelection::All, &output),
        &CancellationToken::new(),
        None,
    )
    .await?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "## File: src/main.rs\n```rs\nfn main() {}\n```\n\n## File: README.md\n```md\n# Widgets\n```\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_run_selected_files_reports_total_failure() -> anyhow::Result<()> {
    let temp = tempdir()?;
    let output = temp.path().join("out.md");
    let transport = widgets_transport(&["README.md"])
        .route("/contents/README.md", HttpResponse::new(404, r#"{"message":"Not Found"}"#));
    let service = service_over(Arc::new(transport));

    let err = run(
        &service,
        &request(ContentSelection::Files(vec!["README.md".to_string()]), &output),
        &CancellationToken::new(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::NotFound { .. })
    ));
    // The error marker is still written for the failed file.
    assert!(fs::read_to_string(&output)?.contains("[Error loading file: Not found:"));
    Ok(())
}
