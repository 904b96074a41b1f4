use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn salign_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("salign");
    path
}

/// Temp dir with a config that uses the offline hashed provider.
fn setup_test_env(alignment: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("salign.toml");
    let config_content = format!(
        r#"[embedding]
provider = "hashed"
dims = 256

[alignment]
{}
"#,
        alignment
    );
    fs::write(&config_path, config_content).unwrap();
    (tmp, config_path)
}

fn run_salign(config_path: Option<&Path>, args: &[&str]) -> (String, String, bool) {
    let binary = salign_binary();
    let mut cmd = Command::new(&binary);
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path);
    }
    let output = cmd
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run salign binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn parse_rows(stdout: &str) -> Vec<(Option<String>, Option<String>)> {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("bad JSON output {:?}: {}", stdout, e))
}

fn pairs(items: &[(Option<&str>, Option<&str>)]) -> Vec<(Option<String>, Option<String>)> {
    items
        .iter()
        .map(|(l, r)| (l.map(str::to_string), r.map(str::to_string)))
        .collect()
}

#[test]
fn test_align_line_files_table() {
    let (tmp, config_path) = setup_test_env("gap_penalty = 0.1");
    let left = write(tmp.path(), "left.txt", "apple\nbanana\ncherry\n");
    let right = write(tmp.path(), "right.txt", "apple\ncherry\n");

    let (stdout, stderr, success) = run_salign(
        Some(&config_path),
        &["align", "--left", &left, "--right", &right],
    );
    assert!(success, "align failed: {}", stderr);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["  1. apple  | apple", "  2. banana |", "  3. cherry | cherry"]
    );
}

#[test]
fn test_align_json_sequences() {
    let (tmp, config_path) = setup_test_env("");
    let input = write(
        tmp.path(),
        "pair.json",
        r#"{"left": ["north", "south", "east"], "right": ["north", "east"]}"#,
    );

    let (stdout, stderr, success) = run_salign(
        Some(&config_path),
        &["align", "--input", &input, "--format", "json"],
    );
    assert!(success, "align failed: {}", stderr);
    assert_eq!(
        parse_rows(&stdout),
        pairs(&[
            (Some("north"), Some("north")),
            (Some("south"), None),
            (Some("east"), Some("east")),
        ])
    );
}

#[test]
fn test_align_row_input_drops_double_gaps() {
    let (tmp, config_path) = setup_test_env("");
    let input = write(
        tmp.path(),
        "rows.json",
        r#"[["red", "red"], [null, null], ["blue", "blue"]]"#,
    );

    let (stdout, stderr, success) = run_salign(
        Some(&config_path),
        &["align", "--input", &input, "--format", "json"],
    );
    assert!(success, "align failed: {}", stderr);
    assert_eq!(
        parse_rows(&stdout),
        pairs(&[(Some("red"), Some("red")), (Some("blue"), Some("blue"))])
    );
}

#[test]
fn test_align_chunked_identical_inputs() {
    let (tmp, config_path) = setup_test_env("chunk_size = 4\noverlap_size = 2");
    let words = [
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    let lines = format!("{}\n", words.join("\n"));
    let left = write(tmp.path(), "left.txt", &lines);
    let right = write(tmp.path(), "right.txt", &lines);

    let (stdout, stderr, success) = run_salign(
        Some(&config_path),
        &["align", "--left", &left, "--right", &right, "--format", "json"],
    );
    assert!(success, "chunked align failed: {}", stderr);

    let expected: Vec<(Option<String>, Option<String>)> = words
        .iter()
        .map(|w| (Some(w.to_string()), Some(w.to_string())))
        .collect();
    assert_eq!(parse_rows(&stdout), expected);
}

#[test]
fn test_cli_overrides_config() {
    let (tmp, _config_path) = setup_test_env("");
    let input = write(tmp.path(), "pair.json", r#"{"left": ["a"], "right": ["a"]}"#);

    // No config file at all: provider comes from the command line.
    let (stdout, stderr, success) = run_salign(
        None,
        &[
            "align", "--input", &input, "--provider", "hashed", "--chunk-size", "2",
            "--format", "json",
        ],
    );
    assert!(success, "align failed: {}", stderr);
    assert_eq!(parse_rows(&stdout), pairs(&[(Some("a"), Some("a"))]));
}

#[test]
fn test_show_inputs_prints_raw_lists() {
    let (tmp, config_path) = setup_test_env("");
    let input = write(tmp.path(), "pair.json", r#"{"left": ["x"], "right": ["x", "y"]}"#);

    let (stdout, stderr, success) = run_salign(
        Some(&config_path),
        &["align", "--input", &input, "--show-inputs"],
    );
    assert!(success, "align failed: {}", stderr);
    assert!(stdout.contains("=== Raw Inputs (unaligned) ==="));
    assert!(stdout.contains("  1.   | y"));
}

#[test]
fn test_align_empty_inputs_need_no_provider() {
    let (tmp, _config_path) = setup_test_env("");
    let input = write(tmp.path(), "empty.json", r#"{"left": [], "right": []}"#);

    let (stdout, stderr, success) = run_salign(
        None,
        &["align", "--input", &input, "--provider", "disabled", "--format", "json"],
    );
    assert!(success, "align failed: {}", stderr);
    assert!(parse_rows(&stdout).is_empty());
}

#[test]
fn test_bad_row_arity_fails() {
    let (tmp, config_path) = setup_test_env("");
    let input = write(tmp.path(), "bad.json", r#"[["a", "b"], ["c"]]"#);

    let (_stdout, stderr, success) =
        run_salign(Some(&config_path), &["align", "--input", &input]);
    assert!(!success);
    assert!(stderr.contains("row 1 has 1 elements, expected 2"), "stderr: {}", stderr);
}

#[test]
fn test_zero_chunk_size_fails() {
    let (tmp, config_path) = setup_test_env("");
    let input = write(tmp.path(), "pair.json", r#"{"left": ["a"], "right": ["a"]}"#);

    let (_stdout, stderr, success) = run_salign(
        Some(&config_path),
        &["align", "--input", &input, "--chunk-size", "0"],
    );
    assert!(!success);
    assert!(stderr.contains("chunk_size"), "stderr: {}", stderr);
}

#[test]
fn test_disabled_provider_fails_on_tokens() {
    let (tmp, _config_path) = setup_test_env("");
    let input = write(tmp.path(), "pair.json", r#"{"left": ["a"], "right": ["b"]}"#);

    let (_stdout, stderr, success) = run_salign(
        None,
        &["align", "--input", &input, "--provider", "disabled"],
    );
    assert!(!success);
    assert!(stderr.contains("disabled"), "stderr: {}", stderr);
}

#[test]
fn test_stitch_chunks_gap_block_permutation() {
    let tmp = TempDir::new().unwrap();
    let chunks = write(
        tmp.path(),
        "chunks.json",
        r#"[
            [["dog", null], [null, "cat"], ["pizza", null], [null, "mouse"]],
            [[null, "mouse"], ["pizza", "pizza pie"], ["house", null]]
        ]"#,
    );

    let (stdout, stderr, success) = run_salign(
        None,
        &["stitch", "--chunks", &chunks, "--overlap-size", "2", "--format", "json"],
    );
    assert!(success, "stitch failed: {}", stderr);
    assert_eq!(
        parse_rows(&stdout),
        pairs(&[
            (Some("dog"), None),
            (None, Some("cat")),
            (None, Some("mouse")),
            (Some("pizza"), Some("pizza pie")),
            (Some("house"), None),
        ])
    );
}

#[test]
fn test_stitch_zero_overlap_concatenates() {
    let tmp = TempDir::new().unwrap();
    let chunks = write(
        tmp.path(),
        "chunks.json",
        r#"[[["a","x"],["b","y"]], [["c","z"]]]"#,
    );

    let (stdout, stderr, success) = run_salign(
        None,
        &["stitch", "--chunks", &chunks, "--overlap-size", "0", "--format", "json"],
    );
    assert!(success, "stitch failed: {}", stderr);
    assert_eq!(
        parse_rows(&stdout),
        pairs(&[
            (Some("a"), Some("x")),
            (Some("b"), Some("y")),
            (Some("c"), Some("z")),
        ])
    );
}

#[test]
fn test_stitch_pair_without_anchor_returns_chunk() {
    let tmp = TempDir::new().unwrap();
    let tail = write(tmp.path(), "tail.json", r#"[["a", null], [null, "b"]]"#);
    let chunk = write(tmp.path(), "chunk.json", r#"[[null, "c"], [null, "d"]]"#);

    let (stdout, stderr, success) = run_salign(
        None,
        &[
            "stitch", "--tail", &tail, "--chunk", &chunk, "--overlap-size", "1", "--format",
            "json",
        ],
    );
    assert!(success, "stitch failed: {}", stderr);
    assert_eq!(
        parse_rows(&stdout),
        pairs(&[(None, Some("c")), (None, Some("d"))])
    );
}

#[test]
fn test_missing_input_fails() {
    let (_stdout, stderr, success) = run_salign(None, &["align"]);
    assert!(!success);
    assert!(stderr.contains("--input"), "stderr: {}", stderr);
}
