//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including the logs left on disk.

use email_harvester::config::Config;
use email_harvester::crawler::Coordinator;
use email_harvester::storage::{log_paths, LogStore, Storage};
use email_harvester::HarvestError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration writing its logs to `output_dir`
fn create_test_config(output_dir: &Path, max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.requests_per_second = 50.0;
    config.crawler.request_timeout_secs = 5;
    config.output.directory = output_dir.to_string_lossy().into_owned();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_never_fetched(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(server)
        .await;
}

/// Data rows of a CSV log, header excluded
fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("log is readable");
    reader
        .records()
        .map(|r| r.expect("row is valid").iter().map(str::to_string).collect())
        .collect()
}

fn root_of(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

#[tokio::test]
async fn test_full_crawl_records_emails_with_context() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Example University</title></head><body>
            <a href="/staff">Staff</a>
            <a href="/brochure.pdf">Brochure</a>
            <a href="https://partner.example.org/">Partner</a>
            <a href="javascript:void(0)">Menu</a>
            <p>Main office <a href="mailto:office@example.edu">Email</a></p>
        </body></html>"#,
    )
    .await;

    mount_page(
        &server,
        "/staff",
        r#"<html><head><title>Staff</title></head><body>
            <a href="team">Our team</a>
            <ul><li><a href="mailto:Jane.Doe@example.edu?subject=Hi">Jane Doe</a> Registrar</li></ul>
        </body></html>"#,
    )
    .await;

    mount_page(
        &server,
        "/staff/team",
        r#"<html><head><title>Dean's Office</title></head><body>
            <p>Reach dean@example.edu for appointments.</p>
            <a href="/staff/team/more">More</a>
        </body></html>"#,
    )
    .await;

    mount_never_fetched(&server, "/brochure.pdf").await;
    mount_never_fetched(&server, "/staff/team/more").await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert!(!summary.cancelled);
    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(summary.previously_visited, 0);
    assert_eq!(summary.new_urls_visited, 3);
    assert_eq!(summary.new_emails, 3);
    assert_eq!(summary.total_emails, 3);

    let (history_path, emails_path) = log_paths(&root, dir.path());

    let visited: Vec<String> = read_rows(&history_path)
        .into_iter()
        .map(|row| row[1].clone())
        .collect();
    assert_eq!(
        visited,
        vec![
            root.clone(),
            format!("{}staff", root),
            format!("{}staff/team", root),
        ]
    );

    let emails = read_rows(&emails_path);
    assert_eq!(
        emails,
        vec![
            vec![
                "office@example.edu".to_string(),
                "Email".to_string(),
                "Main office".to_string(),
                root.clone(),
            ],
            vec![
                "Jane.Doe@example.edu".to_string(),
                "Jane Doe".to_string(),
                "Registrar".to_string(),
                format!("{}staff", root),
            ],
            vec![
                "dean@example.edu".to_string(),
                "dean@example.edu".to_string(),
                "Deans Office".to_string(),
                format!("{}staff/team", root),
            ],
        ]
    );
}

#[tokio::test]
async fn test_second_run_writes_nothing_new() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/contact">Contact</a>
            <p>Front desk <a href="mailto:desk@example.com">write</a></p>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/contact",
        r#"<html><head><title>Contact</title></head><body>
            <p>Sales team: sales@example.com</p>
        </body></html>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let (history_path, emails_path) = log_paths(&root, dir.path());

    let first = Coordinator::new(create_test_config(dir.path(), 3), &root)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(first.new_emails, 2);

    let history_before = std::fs::read_to_string(&history_path).unwrap();
    let emails_before = std::fs::read_to_string(&emails_path).unwrap();

    let second = Coordinator::new(create_test_config(dir.path(), 3), &root)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(second.new_urls_visited, 0);
    assert_eq!(second.previously_visited, 2);
    assert_eq!(second.new_emails, 0);
    assert_eq!(second.total_emails, 2);
    assert_eq!(second.pages_crawled, 1);

    assert_eq!(std::fs::read_to_string(&history_path).unwrap(), history_before);
    assert_eq!(std::fs::read_to_string(&emails_path).unwrap(), emails_before);
}

#[tokio::test]
async fn test_zero_depth_visits_only_root() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/about">About</a><a href="/people">People</a></body></html>"#,
    )
    .await;
    mount_never_fetched(&server, "/about").await;
    mount_never_fetched(&server, "/people").await;

    let dir = TempDir::new().unwrap();
    let summary = Coordinator::new(create_test_config(dir.path(), 0), &root)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.new_urls_visited, 1);

    let (history_path, _) = log_paths(&root, dir.path());
    assert_eq!(read_rows(&history_path).len(), 1);
}

#[tokio::test]
async fn test_previously_visited_pages_are_not_refetched() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/done">Done</a><a href="/todo">Todo</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/todo",
        r#"<html><body><p>ops@example.com</p></body></html>"#,
    )
    .await;
    mount_never_fetched(&server, "/done").await;

    let dir = TempDir::new().unwrap();
    {
        let mut store = LogStore::open(&root, dir.path()).unwrap();
        store.record_visit(&format!("{}done", root)).unwrap();
    }

    let summary = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.previously_visited, 1);
    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.new_emails, 1);
}

#[tokio::test]
async fn test_email_keys_are_case_insensitive() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="mailto:Foo@Example.com">Foo</a>
            <a href="/other">Other</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/other",
        r#"<html><body>
            <a href="mailto:foo@example.com">foo</a>
            <p>Or write to FOO@EXAMPLE.COM</p>
        </body></html>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let summary = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.new_emails, 1);
    assert_eq!(summary.total_emails, 1);

    let (_, emails_path) = log_paths(&root, dir.path());
    let rows = read_rows(&emails_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Foo@Example.com");
}

#[tokio::test]
async fn test_non_html_pages_are_skipped() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/feed.json">Feed</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"{"contact": "hidden@example.com"}"#.as_bytes().to_vec(),
                    "application/json",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.new_urls_visited, 2);
    assert_eq!(summary.new_emails, 0);
}

#[tokio::test]
async fn test_error_status_pages_below_root_are_still_parsed() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/gone">Gone</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(
                    r#"<html><head><title>Not Found</title></head><body>Report to webmaster@example.com</body></html>"#
                        .as_bytes()
                        .to_vec(),
                    "text/html",
                ),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.new_emails, 1);
}

#[tokio::test]
async fn test_root_error_status_is_fatal() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let result = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .unwrap()
        .run()
        .await;

    match result {
        Err(HarvestError::RootStatus { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected a root status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = Coordinator::new(create_test_config(dir.path(), 2), "http://127.0.0.1:1/")
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(HarvestError::RootUnreachable { .. })));
}

#[tokio::test]
async fn test_non_html_root_yields_empty_run() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    "plain text with someone@example.com".as_bytes().to_vec(),
                    "text/plain",
                ),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_crawled, 0);
    assert_eq!(summary.total_emails, 0);
}

#[tokio::test]
async fn test_cancelled_crawl_keeps_progress() {
    let server = MockServer::start().await;
    let root = root_of(&server);

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="mailto:first@example.com">First</a></body></html>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(create_test_config(dir.path(), 2), &root).unwrap();
    coordinator.cancellation_token().cancel();

    let summary = coordinator.run().await.unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.pages_crawled, 0);

    // A later run resumes normally and finds the address
    let summary = Coordinator::new(create_test_config(dir.path(), 2), &root)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert!(!summary.cancelled);
    assert_eq!(summary.new_emails, 1);
}
