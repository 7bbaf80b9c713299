use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_realesrgan-portable"))
        .current_dir(dir)
        .env_remove("REALESRGAN_CACHE_DIR")
        .env("NO_COLOR", "1")
        .args(args)
        .output()
        .expect("run realesrgan-portable")
}

/// 引数を args.txt に書き出し、指定コードで終了するスタブ
#[cfg(unix)]
fn install_stub(cache_dir: &Path, exit_code: i32) {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(cache_dir).unwrap();
    let stub = cache_dir.join("realesrgan-ncnn-vulkan");
    fs::write(
        &stub,
        format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args.txt\"\nexit {exit_code}\n"
        ),
    )
    .unwrap();
    // 実行権限はラッパー側が付与する
    fs::set_permissions(&stub, fs::Permissions::from_mode(0o644)).unwrap();
}

#[test]
fn help_exits_successfully() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--cache-dir"), "missing --cache-dir in help: {stdout}");
}

#[test]
fn missing_arguments_exit_with_one() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["in.jpg"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn missing_input_exits_before_download() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["missing.jpg", "out.png"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.jpg"), "stderr: {stderr}");
    assert!(!temp_dir.path().join("binary").exists());
}

#[test]
fn invalid_mode_exits_before_download() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("in.jpg"), b"dummy").unwrap();

    let output = run_cli(temp_dir.path(), &["in.jpg", "out.png", "photo"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("photo"), "stderr: {stderr}");
    assert!(!temp_dir.path().join("binary").exists());
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn cached_stub_is_invoked_with_expected_arguments() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("binary").join("realesrgan-ncnn-vulkan");
    install_stub(&cache_dir, 0);
    fs::write(temp_dir.path().join("in.jpg"), b"dummy").unwrap();

    let output = run_cli(temp_dir.path(), &["in.jpg", "out.png", "general"]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let args = fs::read_to_string(cache_dir.join("args.txt")).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec!["-i", "in.jpg", "-o", "out.png", "-n", "realesrgan-x4plus"]
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("out.png"), "stdout: {stdout}");
    assert!(stdout.contains("realesrgan-x4plus"), "stdout: {stdout}");
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn extra_arguments_follow_model_flag() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("cache");
    install_stub(&cache_dir, 0);
    fs::write(temp_dir.path().join("in.png"), b"dummy").unwrap();

    let output = run_cli(
        temp_dir.path(),
        &["--cache-dir", "cache", "in.png", "out/up.png", "ANIME", "-s", "2", "--tta"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(temp_dir.path().join("out").is_dir());
    let args = fs::read_to_string(cache_dir.join("args.txt")).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec![
            "-i",
            "in.png",
            "-o",
            "out/up.png",
            "-n",
            "realesrgan-x4plus-anime",
            "-s",
            "2",
            "--tta"
        ]
    );
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn child_exit_code_is_propagated() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("binary").join("realesrgan-ncnn-vulkan");
    install_stub(&cache_dir, 3);
    fs::write(temp_dir.path().join("in.jpg"), b"dummy").unwrap();

    let output = run_cli(temp_dir.path(), &["in.jpg", "out.png"]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains('3'), "stderr: {stderr}");
    assert!(stderr.contains("exit code 3"), "stderr: {stderr}");
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn own_flags_after_mode_reach_the_upscaler() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("binary").join("realesrgan-ncnn-vulkan");
    install_stub(&cache_dir, 0);
    fs::write(temp_dir.path().join("in.jpg"), b"dummy").unwrap();

    let output = run_cli(
        temp_dir.path(),
        &["in.jpg", "out.png", "general", "-h", "--cache-dir", "elsewhere"],
    );

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let args = fs::read_to_string(cache_dir.join("args.txt")).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec![
            "-i",
            "in.jpg",
            "-o",
            "out.png",
            "-n",
            "realesrgan-x4plus",
            "-h",
            "--cache-dir",
            "elsewhere"
        ]
    );
    assert!(!temp_dir.path().join("elsewhere").exists());
}
