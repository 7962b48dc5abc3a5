//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the real HTTP fetcher.

use scrapework::config::{build_crawler, load_config_with_env};
use scrapework::crawler::{FetchError, RequestSpec};
use scrapework::extract::from_fn;
use scrapework::middleware::{
    HeadersMiddleware, Middleware, MiddlewareError, ProxyServiceMiddleware,
};
use scrapework::output::{JsonFileHandler, MarkdownReporter, MetadataHandler, SlackReporter};
use scrapework::{
    ConfigError, Crawler, Document, Extracted, Extractor, JobContext, ScrapeError,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Extractor that turns a JSON body into records
fn json_body() -> Arc<dyn Extractor> {
    from_fn(|_ctx: &JobContext, doc: &Document| Extracted::try_from(doc.json()?))
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).expect("output file missing"))
        .expect("output is not JSON")
}

#[tokio::test]
async fn test_records_from_two_pages_reach_json_handler() {
    let server = MockServer::start().await;
    mount_json(&server, "/a", json!({"id": 1})).await;
    mount_json(&server, "/b", json!([{"id": 2}, {"id": 3}])).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("records.json");

    let report = Crawler::new("ids")
        .with_extractor(json_body())
        .with_handler(JsonFileHandler::new(&out))
        .seed_urls([
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
        ])
        .run()
        .await
        .unwrap();

    assert_eq!(read_json(&out), json!([{"id": 1}, {"id": 2}, {"id": 3}]));
    assert_eq!(report.items_count(), 3);
    assert_eq!(report.pages_visited(), 2);
    assert_eq!(report.metadata.summed_item_count(), report.items_count());
}

#[tokio::test]
async fn test_duplicate_seeds_are_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/a", server.uri());
    let report = Crawler::new("dedup")
        .with_extractor(json_body())
        .seed_urls([url.clone(), url.clone(), url])
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_visited(), 1);
    assert_eq!(report.items_count(), 1);
}

#[tokio::test]
async fn test_forced_seed_is_fetched_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/a", server.uri());
    let report = Crawler::new("forced")
        .with_extractor(json_body())
        .seed(url.clone())
        .seed_forced(url, json_body())
        .run()
        .await
        .unwrap();

    assert_eq!(report.items_count(), 2);
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_error_status_aborts_before_handlers() {
    let server = MockServer::start().await;
    mount_json(&server, "/a", json!({"id": 1})).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("records.json");

    let err = Crawler::new("broken")
        .with_extractor(json_body())
        .with_handler(JsonFileHandler::new(&out))
        .seed_urls([
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
        ])
        .run()
        .await
        .unwrap_err();

    match err {
        ScrapeError::HttpStatus { url, status } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/b"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!out.exists());
}

#[tokio::test]
async fn test_timeout_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut defaults = RequestSpec::default();
    defaults.timeout = Duration::from_secs(1);

    let err = Crawler::new("slow")
        .with_request_defaults(defaults)
        .seed(format!("{}/slow", server.uri()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Fetch {
            source: FetchError::Timeout,
            ..
        }
    ));
}

/// Records which steps ran before it by extending the named order header
struct Step(&'static str, &'static str);

impl Middleware for Step {
    fn process_request(
        &self,
        _ctx: &JobContext,
        mut request: RequestSpec,
    ) -> Result<RequestSpec, MiddlewareError> {
        let order = format!("{}{}", request.header(self.0).unwrap_or(""), self.1);
        request.set_header(self.0, &order)?;
        Ok(request)
    }
}

#[tokio::test]
async fn test_middleware_changes_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .and(header("X-Order", "AB"))
        .and(header("User-Agent", "Anonymous"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let report = Crawler::new("order")
        .with_extractor(json_body())
        .with_middleware(HeadersMiddleware::anonymous())
        .with_middleware(Step("X-Order", "A"))
        .with_middleware(Step("x-order", "B"))
        .seed(format!("{}/a", server.uri()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.items_count(), 1);
}

#[tokio::test]
async fn test_proxy_service_receives_key_and_target() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/"))
        .and(query_param("api_key", "SECRET"))
        .and(query_param("url", "http://target.invalid/page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&service)
        .await;

    let report = Crawler::new("proxied")
        .with_extractor(json_body())
        .with_middleware(
            ProxyServiceMiddleware::new(&format!("{}/v1/", service.uri()), "SECRET").unwrap(),
        )
        .seed("http://target.invalid/page")
        .run()
        .await
        .unwrap();

    assert_eq!(report.items_count(), 1);
    assert_eq!(report.pages()[0].url, "http://target.invalid/page");
}

#[tokio::test]
async fn test_reporter_failure_does_not_fail_run() {
    let server = MockServer::start().await;
    mount_json(&server, "/a", json!({"id": 1})).await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let report = Crawler::new("reporting")
        .with_extractor(json_body())
        .with_handler(MetadataHandler)
        .with_reporter(SlackReporter::new(format!("{}/hook", server.uri())))
        .seed(format!("{}/a", server.uri()))
        .run()
        .await;

    assert!(report.is_ok());
}

#[tokio::test]
async fn test_markdown_summary_lists_pages() {
    let server = MockServer::start().await;
    mount_json(&server, "/a", json!({"id": 1})).await;
    mount_json(&server, "/b", json!([{"id": 2}, {"id": 3}])).await;

    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("summary.md");

    Crawler::new("summary")
        .with_extractor(json_body())
        .with_reporter(MarkdownReporter::new(&summary_path))
        .seed_urls([
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
        ])
        .run()
        .await
        .unwrap();

    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains("# Crawl Summary: summary"));
    assert!(markdown.contains("- **Items Extracted**: 3"));
    assert!(markdown.contains(&format!("| {}/b | 2 |", server.uri())));
}

#[tokio::test]
async fn test_no_seeds_fails_before_fetching() {
    let err = Crawler::new("empty").run().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Config(ConfigError::NoSeeds)));
}

#[tokio::test]
async fn test_config_driven_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quotes"))
        .and(header("Accept", "text/html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body>
                    <div class="quote"><span class="text">First</span><small class="author">Ann</small></div>
                    <div class="quote"><span class="text">Second</span><small class="author">Bo</small></div>
                    </body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("quotes.json");
    let sqlite_path = dir.path().join("quotes.db");
    let summary_path = dir.path().join("summary.md");

    let config_content = format!(
        r#"
[scraper]
name = "quotes"
start-urls = ["{uri}/quotes"]

[request]
timeout-secs = 5
headers = {{ Accept = "text/html" }}

[extractor]
kind = "selector"
item = ".quote"
fields = {{ text = ".text", author = ".author" }}

[output]
json-path = "{json}"
sqlite-path = "{sqlite}"
summary-path = "{summary}"
log-items-count = true
"#,
        uri = server.uri(),
        json = json_path.display(),
        sqlite = sqlite_path.display(),
        summary = summary_path.display(),
    );

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config_with_env(file.path(), |_| None).unwrap();
    let report = build_crawler(&config).unwrap().run().await.unwrap();

    assert_eq!(report.items_count(), 2);
    assert_eq!(
        read_json(&json_path),
        json!([
            {"author": "Ann", "text": "First"},
            {"author": "Bo", "text": "Second"}
        ])
    );
    assert!(sqlite_path.exists());
    assert!(summary_path.exists());
}
