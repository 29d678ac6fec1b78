use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use swatch_scraper::FetchedPage;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::source::FilePageSource;

const START: &str = "https://www.example.com/list/";

const FIRST_PAGE: &str = r#"
    <html><body>
      <div class="brand-item">
        <img src="/img/toteme.jpg"><h2>Toteme</h2>
        <p>PANTONE 19-4052 TCX Classic Blue</p>
      </div>
      <div class="pagination">
        <a href="/list/2">2</a><a href="/list/3">3</a><a href="/list/">1</a>
      </div>
    </body></html>"#;

fn single_brand_page(brand: &str) -> String {
    format!(
        r#"<div class="brand-item"><img src="/img/{brand}.jpg"><h2>{brand}</h2></div>
           <div class="pagination"><a href="/list/">1</a></div>"#
    )
}

/// In-memory pages keyed by URL; listed URLs fail.
struct MapSource {
    pages: HashMap<String, String>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MapSource {
    fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| ((*url).to_owned(), html.clone()))
                .collect(),
            failing: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_owned());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageSource for MapSource {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
        self.calls.lock().unwrap().push(url.to_owned());
        if self.failing.iter().any(|f| f == url) {
            anyhow::bail!("connection reset");
        }
        let html = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no page for {url}"))?;
        Ok(FetchedPage {
            html,
            url: url.to_owned(),
        })
    }
}

fn test_config(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.scraper.base_url = START.to_owned();
    config.scraper.site_url = "https://www.example.com/".to_owned();
    config.scraper.delay_min_secs = 0;
    config.scraper.delay_max_secs = 0;
    config.download.output_dir = root.join("output");
    config.download.image_dir = root.join("images");
    config
}

fn options(max_pages: usize, download: bool, dry_run: bool) -> RunOptions {
    RunOptions {
        max_pages,
        download,
        dry_run,
    }
}

fn read_export(root: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(root.join("output").join(JSON_EXPORT)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn saved_page_is_extracted_and_exported() {
    let root = tempfile::tempdir().unwrap();
    let html_path = root.path().join("saved.html");
    std::fs::write(&html_path, FIRST_PAGE).unwrap();

    let config = test_config(root.path());
    let source = FilePageSource::new(html_path);
    let summary = run(&config, &source, &options(5, false, false))
        .await
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.records, 1);
    assert_eq!(summary.colors, 1);
    assert!(summary.downloads.is_none());

    let export = read_export(root.path());
    assert_eq!(export["total_count"], 1);
    assert_eq!(export["brands"][0]["brand_name"], "Toteme");
    assert_eq!(export["brands"][0]["page_url"], START);
    assert_eq!(
        export["brands"][0]["image_url"],
        "https://www.example.com/img/toteme.jpg"
    );
    assert!(export["brands"][0]["local_image_path"].is_null());

    let csv = std::fs::read(root.path().join("output").join(CSV_EXPORT)).unwrap();
    assert!(csv.starts_with(b"\xEF\xBB\xBFbrand_name,"));
    assert!(!root.path().join("images").exists());
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let source = MapSource::new(&[(START, "<html><body>empty</body></html>".to_owned())]);

    let summary = run(&config, &source, &options(1, true, true)).await.unwrap();

    assert_eq!(summary.records, 0);
    assert!(!root.path().join("output").exists());
    assert!(!root.path().join("images").exists());
}

#[tokio::test]
async fn empty_page_is_saved_for_inspection() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let body = "<html><body><p>nothing here</p></body></html>".to_owned();
    let source = MapSource::new(&[(START, body.clone())]);

    let summary = run(&config, &source, &options(1, true, false)).await.unwrap();

    assert_eq!(summary.records, 0);
    let saved = std::fs::read_to_string(root.path().join("output").join(DEBUG_PAGE)).unwrap();
    assert_eq!(saved, body);
    assert_eq!(read_export(root.path())["total_count"], 0);
    assert!(!root.path().join("output").join(CSV_EXPORT).exists());
}

#[tokio::test]
async fn pagination_is_followed_up_to_the_page_limit() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let source = MapSource::new(&[
        (START, FIRST_PAGE.to_owned()),
        ("https://www.example.com/list/2", single_brand_page("khaite")),
        ("https://www.example.com/list/3", single_brand_page("proenza")),
    ]);

    let summary = run(&config, &source, &options(2, false, false))
        .await
        .unwrap();

    assert_eq!(
        source.calls(),
        vec![START.to_owned(), "https://www.example.com/list/2".to_owned()]
    );
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.records, 2);
}

#[tokio::test]
async fn pages_are_never_visited_twice() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let source = MapSource::new(&[
        (START, FIRST_PAGE.to_owned()),
        ("https://www.example.com/list/2", single_brand_page("khaite")),
        ("https://www.example.com/list/3", single_brand_page("proenza")),
    ]);

    let summary = run(&config, &source, &options(10, false, false))
        .await
        .unwrap();

    assert_eq!(source.calls().len(), 3);
    assert_eq!(summary.records, 3);
}

#[tokio::test]
async fn later_page_failure_is_skipped() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let source = MapSource::new(&[
        (START, FIRST_PAGE.to_owned()),
        ("https://www.example.com/list/3", single_brand_page("proenza")),
    ])
    .failing("https://www.example.com/list/2");

    let summary = run(&config, &source, &options(3, false, false))
        .await
        .unwrap();

    assert_eq!(source.calls().len(), 3);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.records, 2);
}

#[tokio::test]
async fn first_page_failure_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let source = MapSource::new(&[]).failing(START);

    let result = run(&config, &source, &options(3, false, false)).await;

    assert!(result.is_err());
    assert!(!root.path().join("output").join(JSON_EXPORT).exists());
}

#[tokio::test]
async fn downloaded_media_paths_are_attached_to_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/look.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(root.path());
    config.scraper.site_url = format!("{}/", server.uri());

    let page = r#"
        <div class="card"><img src="/img/look.jpg"><h3>Look</h3></div>
        <div class="card"><img src="/img/gone.jpg"><h3>Gone</h3></div>"#;
    let source = MapSource::new(&[(START, page.to_owned())]);

    let summary = run(&config, &source, &options(1, true, false)).await.unwrap();

    let stats = summary.downloads.unwrap();
    assert_eq!((stats.downloaded, stats.failed, stats.total), (1, 1, 2));

    let export = read_export(root.path());
    let expected = root.path().join("images").join("look.jpg");
    assert_eq!(
        export["brands"][0]["local_image_path"],
        expected.display().to_string()
    );
    assert!(export["brands"][1]["local_image_path"].is_null());
    assert!(expected.is_file());
}
