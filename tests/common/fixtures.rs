//! Page fixtures and mock page server helpers

use page_dl::{Document, Page};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fake page body for page `index`
pub fn page_bytes(index: usize) -> Vec<u8> {
    format!("page-{index:03}-image-bytes").into_bytes()
}

/// URL path of page `index` of `slug` on the mock server
pub fn page_path(slug: &str, index: usize) -> String {
    format!("/{slug}/{index}.png")
}

/// Document whose pages live on `server`
pub fn remote_document(server: &MockServer, slug: &str, pages: usize) -> Document {
    let pages = (0..pages)
        .map(|i| Page::new(format!("{}{}", server.uri(), page_path(slug, i))))
        .collect();
    Document::new(slug, format!("Remote {slug}"), pages)
}

/// Serve page `index` of `slug`, expecting exactly `times` requests
pub async fn mount_page(server: &MockServer, slug: &str, index: usize, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path(slug, index)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(page_bytes(index)))
        .expect(times)
        .mount(server)
        .await;
}

/// Answer page `index` of `slug` with `status`
pub async fn mount_status(server: &MockServer, slug: &str, index: usize, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path(slug, index)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
