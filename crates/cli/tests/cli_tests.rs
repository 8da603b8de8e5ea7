//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

const NEWS_URL: &str = "https://www.dailyledger.com/local/2024/03/riverside-park";

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("glean");
    cmd.env_remove("GLEAN_USER_AGENT").env_remove("RUST_LOG");
    cmd
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn news() -> String {
    get_fixture_path("news_article.html")
}

#[test]
fn test_cli_file_input_json() {
    let output = cmd().args(["--base-url", NEWS_URL, &news()]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "City Council Approves Riverside Park Expansion");
    assert_eq!(json["author"], "Maria Alvarez");
    assert_eq!(json["source"], "The Daily Ledger");
    assert_eq!(json["url"], NEWS_URL);
    assert_eq!(
        json["featuredImage"]["url"],
        "https://cdn.dailyledger.com/images/riverside-park-aerial.jpg"
    );
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(news()).unwrap();
    cmd()
        .args(["--base-url", NEWS_URL, "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Riverside Park"));
}

#[test]
fn test_cli_default_base_url() {
    cmd()
        .arg(get_fixture_path("blog_post.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost/wp-content/uploads/2023/11/crumb-75.jpg"));
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", "--base-url", NEWS_URL, &news()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("City Council Approves Riverside Park Expansion\n===="))
        .stdout(predicate::str::contains("By: Maria Alvarez"));
}

#[test]
fn test_cli_markdown_format() {
    cmd()
        .args(["-f", "markdown", "--base-url", NEWS_URL, &news()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("+++"))
        .stdout(predicate::str::contains("# City Council Approves Riverside Park Expansion"))
        .stdout(predicate::str::contains("## Images"));
}

#[test]
fn test_cli_gallery_limit() {
    let output = cmd()
        .args(["-f", "markdown", "--gallery", "1", "--base-url", NEWS_URL, &news()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("![").count(), 1);
}

#[test]
fn test_cli_invalid_format() {
    cmd().args(["-f", "html", &news()]).assert().failure();
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("article.json");

    cmd()
        .args(["-o", output.to_str().unwrap(), "--base-url", NEWS_URL, &news()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"featuredImage\""));
}

#[test]
fn test_cli_sequential_matches_parallel() {
    let parallel = cmd().args(["--base-url", NEWS_URL, &news()]).output().unwrap();
    let sequential = cmd().args(["--sequential", "--base-url", NEWS_URL, &news()]).output().unwrap();

    assert!(parallel.status.success());
    assert_eq!(parallel.stdout, sequential.stdout);
}

#[test]
fn test_cli_invalid_file() {
    cmd()
        .arg("nonexistent.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent.html"));
}

#[test]
fn test_cli_invalid_base_url() {
    cmd().args(["--base-url", "not a url", &news()]).assert().failure();
}

#[test]
fn test_cli_short_content_rejected() {
    cmd()
        .args(["--base-url", "https://www.nav-only.example.org/", &get_fixture_path("nav_only.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--allow-short"));
}

#[test]
fn test_cli_allow_short() {
    cmd()
        .args([
            "--allow-short",
            "--base-url",
            "https://www.nav-only.example.org/",
            &get_fixture_path("nav_only.html"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"nav-only.example.org\""));
}

#[test]
fn test_cli_min_content_threshold() {
    cmd()
        .args(["--min-content", "100000", "--base-url", NEWS_URL, &news()])
        .assert()
        .failure();
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", "--base-url", NEWS_URL, &news()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Glean"))
        .stderr(predicate::str::contains("Field Sources"))
        .stderr(predicate::str::contains("Structural"));
}

#[test]
fn test_cli_unreachable_url() {
    cmd().args(["--timeout", "2", "http://127.0.0.1:1/article"]).assert().failure();
}

#[test]
fn test_completions_use_the_same_flag_names_as_the_cli() {
    let bash = std::fs::read_to_string(concat!(env!("OUT_DIR"), "/completions/glean.bash")).unwrap();
    let help = cmd().arg("--help").output().unwrap();
    let help = String::from_utf8(help.stdout).unwrap();

    for flag in ["--base-url", "--user-agent", "--min-content", "--allow-short", "--sequential"] {
        assert!(bash.contains(flag), "{flag} missing from completions");
        assert!(help.contains(flag), "{flag} missing from --help");
    }
    for flag in ["--base_url", "--user_agent", "--min_content", "--allow_short"] {
        assert!(!bash.contains(flag), "{flag} should not be completed");
    }
}
