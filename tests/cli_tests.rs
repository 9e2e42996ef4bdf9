use std::process::Command;

fn taskboard() -> Command {
    Command::new(env!("CARGO_BIN_EXE_taskboard"))
}

#[test]
fn serve_refuses_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("board.db");

    let output = taskboard()
        .arg("serve")
        .current_dir(dir.path())
        .env("TASKBOARD_PORT", "abc")
        .env("TASKBOARD_DATABASE", &database)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration error: TASKBOARD_PORT"), "{stderr}");
}
