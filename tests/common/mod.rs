use email_harvester_core::Row;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a minimal staff page whose contact list holds the given
/// `(href, anchor text)` pairs.
pub fn staff_page(mailtos: &[(&str, &str)]) -> String {
    let links: String = mailtos
        .iter()
        .map(|(href, text)| format!("      <li><a href=\"{}\">{}</a></li>\n", href, text))
        .collect();
    format!(
        "<html>\n  <body>\n    <h1>Our Staff</h1>\n    <ul>\n{}    </ul>\n  </body>\n</html>",
        links
    )
}

/// Builds an input row with the standard staff-table columns.
pub fn staff_row(index: usize, name: &str, title: &str, url: &str) -> Row {
    Row::new(
        index,
        vec![
            ("Name".to_string(), name.to_string()),
            ("Title".to_string(), title.to_string()),
            ("Staff Page URL".to_string(), url.to_string()),
        ],
    )
}

/// Serves `html` with a 200 OK at `url_path` on the given mock server.
pub async fn mock_staff_page(server: &MockServer, url_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Serves `html` at `url_path` after waiting `delay`, to simulate a slow page.
pub async fn mock_delayed_page(server: &MockServer, url_path: &str, html: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Responds with the given HTTP error status at `url_path`.
pub async fn mock_error_page(server: &MockServer, url_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
