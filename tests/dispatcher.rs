use serde_json::{json, Value};

use sandbox_agent::llm::Role;
use sandbox_agent::sandbox::SandboxRoot;
use sandbox_agent::tools::{Dispatcher, ToolCallRequest};

fn request(name: &str, args: Value) -> ToolCallRequest {
    ToolCallRequest::new(name, args.as_object().cloned().unwrap_or_default())
}

fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

async fn respond(dispatcher: &Dispatcher, name: &str, args: Value) -> Value {
    let message = dispatcher.dispatch(&request(name, args)).await;
    assert_eq!(message.role, Role::Tool);
    assert_eq!(message.parts.len(), 1);
    let response = message.function_response().unwrap();
    assert_eq!(response.name, name);
    response.response.clone()
}

#[tokio::test]
async fn test_calculator_session() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = Dispatcher::new(SandboxRoot::new(dir.path()).unwrap());

    let written = respond(
        &dispatcher,
        "write_file",
        json!({ "file_path": "pkg/calc.py", "content": "print(3 + 5)\n" }),
    )
    .await;
    assert_eq!(
        written["result"],
        "Successfully wrote to \"pkg/calc.py\" (13 characters written)"
    );

    let listing = respond(&dispatcher, "get_files_info", json!({ "directory": "pkg" })).await;
    let listing = listing["result"].as_str().unwrap();
    assert!(listing.starts_with("Contents of 'pkg':"));
    assert!(listing.contains("- calc.py: file_size=13 bytes, is_dir=false"));

    let content = respond(&dispatcher, "get_file_content", json!({ "file": "pkg/calc.py" })).await;
    assert_eq!(content["result"], "print(3 + 5)\n");

    if !python_available() {
        eprintln!("python3 not available, skipping run step");
        return;
    }
    let run = respond(&dispatcher, "run_python_file", json!({ "file_path": "pkg/calc.py" })).await;
    let report = run["result"].as_str().unwrap();
    assert!(report.contains("STDOUT:\n8"), "{report}");
}

#[tokio::test]
async fn test_parent_directory_never_listed() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = Dispatcher::new(SandboxRoot::new(dir.path()).unwrap());

    let response = respond(&dispatcher, "get_files_info", json!({ "directory": ".." })).await;
    assert!(response.get("result").is_none());
    assert_eq!(
        response["error"],
        "Error: Directory '..' is outside the working directory"
    );
}

#[tokio::test]
async fn test_every_failure_is_an_error_envelope() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "plain").unwrap();
    let dispatcher = Dispatcher::new(SandboxRoot::new(dir.path()).unwrap());

    let cases = vec![
        ("get_file_content", json!({ "file_path": "missing.txt" })),
        ("get_file_content", json!({ "file_path": "/etc/passwd" })),
        ("get_files_info", json!({ "directory": "notes.txt" })),
        ("write_file", json!({ "file_path": ".", "content": "x" })),
        ("run_python_file", json!({ "file_path": "notes.txt" })),
        ("run_python_file", json!({ "file_path": "absent.py" })),
        ("write_file", json!({ "file_path": "x.txt" })),
        ("rm_rf", json!({})),
    ];

    for (name, args) in cases {
        let response = respond(&dispatcher, name, args.clone()).await;
        assert!(
            response["error"].as_str().is_some_and(|e| !e.is_empty()),
            "{name} {args} -> {response}"
        );
        assert!(response.get("result").is_none());
    }
}
