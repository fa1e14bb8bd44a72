#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

#[allow(dead_code)]
pub const OVERVIEW: &str = "# Overview\n\nAn agentic coding tool.\n\n## Install\n\n- Run the installer\n- Log in\n";

#[allow(dead_code)]
pub const HOOKS: &str = "# Hooks\n\nRun commands on events.\n\n## Events\n\n- PreToolUse\n- PostToolUse\n";

#[allow(dead_code)]
pub const CHANGELOG: &str = "# Changelog\n\n## 1.0.1\n\n- Fixed a crash when resuming sessions\n- Improved startup time\n\n## 1.0.0\n\n- Initial release\n";

/// Create a `docmirror` command isolated from the caller's environment.
#[allow(dead_code)]
pub fn docmirror_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docmirror"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env_remove("DOCMIRROR_CONFIG");
    cmd.env_remove("DOCMIRROR_OUTPUT_DIR");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write a config pointing every network endpoint at `server_uri`, with
/// retry delays shrunk for tests.
#[allow(dead_code)]
pub fn write_config(dir: &Path, server_uri: &str, output: &Path) -> PathBuf {
    let config = format!(
        r#"[source]
sitemap_urls = ["{server_uri}/sitemap.xml"]
fallback_pages = []
changelog_url = "{server_uri}/CHANGELOG.md"
changelog_page_url = "{server_uri}/blob/CHANGELOG.md"

[fetch]
max_attempts = 2
base_delay_ms = 1
max_delay_ms = 5
default_retry_after_secs = 0
request_delay_ms = 0

[output]
dir = '{}'
"#,
        output.display()
    );
    let path = dir.join("config.toml");
    std::fs::write(&path, config).expect("write config");
    path
}

#[allow(dead_code)]
pub async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve a two-page corpus plus the changelog.
#[allow(dead_code)]
pub async fn serve_corpus(server: &MockServer) {
    let uri = server.uri();
    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{uri}/en/docs/claude-code/overview</loc></url>
  <url><loc>{uri}/en/docs/claude-code/hooks</loc></url>
  <url><loc>{uri}/en/api/messages</loc></url>
</urlset>"#
    );
    serve(server, "/sitemap.xml", 200, &sitemap).await;
    serve(server, "/en/docs/claude-code/overview.md", 200, OVERVIEW).await;
    serve(server, "/en/docs/claude-code/hooks.md", 200, HOOKS).await;
    serve(server, "/CHANGELOG.md", 200, CHANGELOG).await;
}
