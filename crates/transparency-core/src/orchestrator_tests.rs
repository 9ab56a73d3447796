use super::*;
use crate::fake_driver::{FakeDriver, FakeElement, FakePage};
use crate::request::SearchMode;
use crate::selectors::{SOCIAL_PROGRAMS_FILTER, VISIBLE_FILTER_PANEL_TOGGLE};

fn timeouts() -> TimeoutConfig {
    TimeoutConfig {
        element_secs: 0,
        results_secs: 0,
        poll_interval_ms: 1,
        settle_ms: 0,
    }
}

fn request(filters: &[&str]) -> SearchRequest {
    SearchRequest::new(
        "Alen Silva",
        "123.456.789-01",
        None,
        SearchMode::ByPrimaryId,
        filters,
    )
    .unwrap()
}

fn search_page() -> FakePage {
    FakePage::new("Busca")
        .with(SEARCH_INPUT, FakeElement::new(""))
        .with(SEARCH_BTN, FakeElement::button("results"))
}

fn results_page(count: &str, people: &[(&str, &str)]) -> FakePage {
    let mut page = FakePage::new("Resultados").with(RESULT_COUNT, FakeElement::new(count));
    for (name, cpf) in people {
        let mut link = FakeElement::button("person");
        link.text = name.to_string();
        page = page
            .with(RESULT_NAMES, link)
            .with(RESULT_IDENTIFIERS, FakeElement::new(cpf));
    }
    page
}

fn driver_with(results: FakePage) -> FakeDriver {
    FakeDriver::new("search")
        .with_page("search", search_page())
        .with_page("results", results)
        .with_page("person", FakePage::new("Pessoa"))
}

#[tokio::test]
async fn test_located_clicks_first_match() {
    let driver = driver_with(results_page(
        "2",
        &[
            ("MARIA PEREIRA", "***.456.789-**"),
            ("ALEN DA SILVA", "***.456.789-**"),
        ],
    ));
    let request = request(&[]);
    let timeouts = timeouts();
    let mut orchestrator = SearchOrchestrator::new(&driver, &request, &timeouts);

    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(
        outcome,
        Disambiguation::Located(Candidate::new("ALEN DA SILVA", "456789"))
    );
    assert_eq!(orchestrator.state(), SearchState::Terminal);
    assert_eq!(driver.typed(), vec![(SEARCH_INPUT, "12345678901".to_string())]);
    assert_eq!(driver.current_page_key().as_deref(), Some("person"));
}

#[tokio::test]
async fn test_no_match() {
    let driver = driver_with(results_page("1", &[("MARIA PEREIRA", "***.456.789-**")]));
    let request = request(&[]);
    let timeouts = timeouts();

    let outcome = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Disambiguation::NoMatch);
    assert_eq!(driver.current_page_key().as_deref(), Some("results"));
}

#[tokio::test]
async fn test_zero_results() {
    let driver = driver_with(results_page("0", &[]));
    let request = request(&[]);
    let timeouts = timeouts();

    let outcome = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Disambiguation::NoResults);
}

#[tokio::test]
async fn test_too_many_results_with_separator() {
    let driver = driver_with(results_page("1.015", &[]));
    let request = request(&[]);
    let timeouts = timeouts();

    let outcome = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Disambiguation::TooMany { count: 1015 });
}

#[tokio::test]
async fn test_missing_counter_degrades_to_no_results() {
    let driver = driver_with(FakePage::new("Resultados"));
    let request = request(&[]);
    let timeouts = timeouts();

    let outcome = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Disambiguation::NoResults);
}

#[tokio::test]
async fn test_blank_counter_is_polled_until_results_render() {
    let results = FakePage::new("Resultados")
        .with(RESULT_COUNT, FakeElement::new("1").blank_for(3))
        .with(RESULT_NAMES, {
            let mut link = FakeElement::button("person");
            link.text = "ALEN DA SILVA".to_string();
            link
        })
        .with(RESULT_IDENTIFIERS, FakeElement::new("***.456.789-**"));
    let driver = driver_with(results);
    let request = request(&[]);
    let timeouts = TimeoutConfig {
        results_secs: 5,
        ..timeouts()
    };

    let outcome = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Disambiguation::Located(Candidate::new("ALEN DA SILVA", "456789"))
    );
}

#[tokio::test]
async fn test_counter_that_stays_blank_is_no_results() {
    let driver = driver_with(results_page(" ", &[("ALEN DA SILVA", "***.456.789-**")]));
    let request = request(&[]);
    let timeouts = timeouts();

    let outcome = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Disambiguation::NoResults);
    assert_eq!(driver.current_page_key().as_deref(), Some("results"));
}

#[tokio::test]
async fn test_unclickable_filter_degrades_to_no_results() {
    let search = search_page()
        .with(
            VISIBLE_FILTER_PANEL_TOGGLE,
            FakeElement::new("").with_attr("class", "active"),
        )
        .with(SOCIAL_PROGRAMS_FILTER, FakeElement::disabled());
    let driver = FakeDriver::new("search").with_page("search", search);
    let request = request(&["social_programs"]);
    let timeouts = timeouts();
    let mut orchestrator = SearchOrchestrator::new(&driver, &request, &timeouts);

    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(outcome, Disambiguation::NoResults);
    assert_eq!(orchestrator.state(), SearchState::Terminal);
    assert!(!driver.clicks().contains(&SEARCH_BTN));
}

#[tokio::test]
async fn test_list_length_mismatch_is_an_error() {
    let results = results_page("2", &[("ALEN SILVA", "***.456.789-**")])
        .with(RESULT_NAMES, FakeElement::new("MARIA PEREIRA"));
    let driver = driver_with(results);
    let request = request(&[]);
    let timeouts = timeouts();

    let err = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::ResultListMismatch {
            names: 2,
            identifiers: 1
        }
    ));
}

#[tokio::test]
async fn test_negative_count_is_an_error() {
    let driver = driver_with(results_page("-3", &[]));
    let request = request(&[]);
    let timeouts = timeouts();

    let err = SearchOrchestrator::new(&driver, &request, &timeouts)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::InvalidResultCount(-3)));
}

#[test]
fn test_parse_result_count() {
    assert_eq!(parse_result_count(" 12 "), Some(12));
    assert_eq!(parse_result_count("1.234"), Some(1234));
    assert_eq!(parse_result_count(""), Some(0));
    assert_eq!(parse_result_count("muitos"), None);
}
