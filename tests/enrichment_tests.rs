mod common;

use common::{mock_delayed_page, mock_error_page, mock_staff_page, staff_page, staff_row};
use email_harvester_core::{
    enrich_single_row, initialize_harvester, process_rows, write_enriched_csv, Config,
    EmailHarvester, StaffTable,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

fn test_config() -> Config {
    Config {
        navigation_timeout: Duration::from_secs(5),
        max_concurrency: 4,
        ..Config::default()
    }
}

async fn build_harvester(config: &Config) -> EmailHarvester {
    initialize_harvester(config)
        .await
        .expect("harvester should initialize in HTTP mode")
}

#[tokio::test]
async fn matches_anchor_text_against_row_clues() {
    let server = MockServer::start().await;
    let html = staff_page(&[
        ("mailto:jane.doe@school.edu", "Dr. Jane Doe"),
        ("mailto:office@school.edu", "Main Office"),
        ("mailto:webmaster@school.edu", "Webmaster"),
    ]);
    mock_staff_page(&server, "/jane", &html).await;

    let config = test_config();
    let harvester = build_harvester(&config).await;
    let row = staff_row(0, "Jane Doe", "Registrar", &format!("{}/jane", server.uri()));

    let result = enrich_single_row(&config, &harvester, row).await;

    assert!(!result.outcome.is_failed());
    assert_eq!(result.outcome.emails(), vec!["jane.doe@school.edu"]);
}

#[tokio::test]
async fn falls_back_to_the_lone_mailto_when_nothing_matches() {
    let server = MockServer::start().await;
    let html = staff_page(&[("mailto:office@district.org", "Contact Us")]);
    mock_staff_page(&server, "/office", &html).await;

    let config = test_config();
    let harvester = build_harvester(&config).await;
    let row = staff_row(0, "Jane Doe", "Registrar", &format!("{}/office", server.uri()));

    let result = enrich_single_row(&config, &harvester, row).await;

    assert_eq!(result.outcome.emails(), vec!["office@district.org"]);
}

#[tokio::test]
async fn ambiguous_pages_yield_no_addresses() {
    let server = MockServer::start().await;
    let html = staff_page(&[
        ("mailto:office@district.org", "Front Office"),
        ("mailto:it@district.org", "IT Helpdesk"),
    ]);
    mock_staff_page(&server, "/ambiguous", &html).await;

    let config = test_config();
    let harvester = build_harvester(&config).await;
    let row = staff_row(
        0,
        "Jane Doe",
        "Registrar",
        &format!("{}/ambiguous", server.uri()),
    );

    let result = enrich_single_row(&config, &harvester, row).await;

    assert!(!result.outcome.is_failed());
    assert!(result.outcome.emails().is_empty());
    assert_eq!(result.outcome.output_value(), "");
}

#[tokio::test]
async fn duplicate_addresses_are_kept_when_each_anchor_matches() {
    let server = MockServer::start().await;
    let html = staff_page(&[
        ("mailto:jane@x.com", "Jane Doe"),
        ("mailto:jane@x.com", "Email Jane"),
    ]);
    mock_staff_page(&server, "/jane", &html).await;

    let config = test_config();
    let harvester = build_harvester(&config).await;
    let row = staff_row(0, "Jane Doe", "Registrar", &format!("{}/jane", server.uri()));

    let result = enrich_single_row(&config, &harvester, row).await;

    assert_eq!(result.outcome.emails(), vec!["jane@x.com", "jane@x.com"]);
}

#[tokio::test]
async fn href_query_strings_and_percent_escapes_are_stripped() {
    let server = MockServer::start().await;
    let html = staff_page(&[(
        "mailto:jane.doe%40school.edu?subject=Hello%20there",
        "Jane Doe",
    )]);
    mock_staff_page(&server, "/jane", &html).await;

    let config = test_config();
    let harvester = build_harvester(&config).await;
    let row = staff_row(0, "Jane Doe", "Registrar", &format!("{}/jane", server.uri()));

    let result = enrich_single_row(&config, &harvester, row).await;

    assert_eq!(result.outcome.emails(), vec!["jane.doe@school.edu"]);
}

#[tokio::test]
async fn http_error_statuses_become_row_errors() {
    let server = MockServer::start().await;
    mock_error_page(&server, "/gone", 404).await;

    let config = test_config();
    let harvester = build_harvester(&config).await;
    let row = staff_row(0, "Jane Doe", "Registrar", &format!("{}/gone", server.uri()));

    let result = enrich_single_row(&config, &harvester, row).await;

    assert!(result.outcome.is_failed());
    let value = result.outcome.output_value();
    assert!(value.starts_with("ERROR:"), "got: {}", value);
    assert!(value.contains("HTTP status 404"), "got: {}", value);
}

#[tokio::test]
async fn slow_page_fails_without_sinking_the_batch() {
    let server = MockServer::start().await;
    mock_delayed_page(
        &server,
        "/slow",
        &staff_page(&[("mailto:sam@x.com", "Slow Sam")]),
        Duration::from_secs(3),
    )
    .await;
    mock_staff_page(
        &server,
        "/fast",
        &staff_page(&[("mailto:jane@x.com", "Jane Doe")]),
    )
    .await;

    let config = Config {
        navigation_timeout: Duration::from_secs(1),
        ..test_config()
    };
    let harvester = Arc::new(build_harvester(&config).await);
    let rows = vec![
        staff_row(0, "Slow Sam", "Clerk", &format!("{}/slow", server.uri())),
        staff_row(1, "Jane Doe", "Registrar", &format!("{}/fast", server.uri())),
    ];

    let results = process_rows(Arc::new(config), harvester, rows).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].outcome.is_failed());
    let value = results[0].outcome.output_value();
    assert!(value.starts_with("ERROR:"), "got: {}", value);
    assert!(value.contains("timed out"), "got: {}", value);
    assert_eq!(results[1].outcome.emails(), vec!["jane@x.com"]);
}

#[tokio::test]
async fn results_are_restored_to_input_order() {
    let server = MockServer::start().await;
    mock_delayed_page(
        &server,
        "/a",
        &staff_page(&[("mailto:avery@x.com", "Avery Lane")]),
        Duration::from_millis(500),
    )
    .await;
    mock_staff_page(
        &server,
        "/b",
        &staff_page(&[("mailto:blake@x.com", "Blake Hall")]),
    )
    .await;
    mock_staff_page(
        &server,
        "/c",
        &staff_page(&[("mailto:casey@x.com", "Casey Reed")]),
    )
    .await;

    let rows = vec![
        staff_row(0, "Avery Lane", "Principal", &format!("{}/a", server.uri())),
        staff_row(1, "Blake Hall", "Registrar", &format!("{}/b", server.uri())),
        staff_row(2, "Casey Reed", "Counselor", &format!("{}/c", server.uri())),
    ];
    let config = test_config();
    let harvester = Arc::new(build_harvester(&config).await);

    let results = process_rows(Arc::new(config), harvester, rows).await;

    let indices: Vec<usize> = results.iter().map(|r| r.row.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(results[0].outcome.emails(), vec!["avery@x.com"]);
    assert_eq!(results[2].outcome.emails(), vec!["casey@x.com"]);
}

#[tokio::test]
async fn limit_caps_the_number_of_processed_rows() {
    let server = MockServer::start().await;
    mock_staff_page(
        &server,
        "/a",
        &staff_page(&[("mailto:avery@x.com", "Avery Lane")]),
    )
    .await;

    let config = Config {
        limit: 1,
        ..test_config()
    };
    let harvester = Arc::new(build_harvester(&config).await);
    let rows = vec![
        staff_row(0, "Avery Lane", "Principal", &format!("{}/a", server.uri())),
        staff_row(1, "Blake Hall", "Registrar", &format!("{}/b", server.uri())),
        staff_row(2, "Casey Reed", "Counselor", &format!("{}/c", server.uri())),
    ];

    let results = process_rows(Arc::new(config), harvester, rows).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].row.index, 0);
    assert_eq!(results[0].outcome.emails(), vec!["avery@x.com"]);
}

#[tokio::test]
async fn csv_round_trip_annotates_and_drops_blank_url_rows() {
    let server = MockServer::start().await;
    mock_staff_page(
        &server,
        "/avery",
        &staff_page(&[
            ("mailto:avery@x.com", "Avery Lane"),
            ("mailto:office@x.com", "Front Office"),
        ]),
    )
    .await;
    mock_error_page(&server, "/blake", 500).await;

    let csv_text = format!(
        "Name,Title,Staff Page URL\n\
         Avery Lane,Principal,{0}/avery\n\
         Blake Hall,Registrar,{0}/blake\n\
         Casey Reed,Counselor,\n",
        server.uri()
    );

    let table = StaffTable::parse(&csv_text).unwrap();
    let headers = table.headers().to_vec();
    let (rows, dropped) = table.into_processable_rows("Staff Page URL");
    assert_eq!(dropped, 1);

    let config = test_config();
    let harvester = Arc::new(build_harvester(&config).await);
    let results = process_rows(Arc::new(config), harvester, rows).await;

    let annotated: Vec<_> = results
        .into_iter()
        .map(|result| result.into_annotated_row())
        .collect();
    let mut buf = Vec::new();
    write_enriched_csv(&mut buf, &headers, &annotated).unwrap();
    let output = String::from_utf8(buf).unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3, "header plus two data rows, got: {}", output);
    assert_eq!(lines[0], "Name,Title,Staff Page URL,Found Emails");
    assert!(lines[1].starts_with("Avery Lane,Principal,"), "got: {}", lines[1]);
    assert!(lines[1].ends_with(",avery@x.com"), "got: {}", lines[1]);
    assert!(lines[2].contains("ERROR:"), "got: {}", lines[2]);
    assert!(lines[2].contains("HTTP status 500"), "got: {}", lines[2]);
    assert!(!output.contains("Casey Reed"));
}
