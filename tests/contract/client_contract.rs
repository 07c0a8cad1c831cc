use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use paceline_core::pagination;
use paceline_core::{
    ApiError, Client, ClientConfig, ClientError, ConfigError, CountriesParams, ErrorKind,
    MockHttpClient, RateLimitProfile, RequestDescriptor, VenuesParams,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::Instant;

const BASE_URL: &str = "https://api.example.test/v1";

fn config(profile: RateLimitProfile) -> ClientConfig {
    ClientConfig::new("contract-key", "paceline-contract/1.0")
        .with_base_url(BASE_URL)
        .with_profile(profile)
}

fn client_with(mock: &Arc<MockHttpClient>, profile: RateLimitProfile) -> Client {
    Client::with_http_client(config(profile), mock.clone()).expect("valid config")
}

type Call = Pin<Box<dyn Future<Output = Result<Value, ApiError>>>>;

struct InvalidCase {
    name: &'static str,
    field: &'static str,
    call: fn(Client) -> Call,
}

fn invalid_cases() -> Vec<InvalidCase> {
    vec![
        InvalidCase {
            name: "countries page 0",
            field: "page",
            call: |client| {
                Box::pin(async move { client.countries(CountriesParams::page(0, 10)).await })
            },
        },
        InvalidCase {
            name: "countries limit 101",
            field: "limit",
            call: |client| {
                Box::pin(async move { client.countries(CountriesParams::page(1, 101)).await })
            },
        },
        InvalidCase {
            name: "venues three-letter country",
            field: "country",
            call: |client| {
                let params = VenuesParams::new().with_country("USA");
                Box::pin(async move { client.venues(params).await })
            },
        },
        InvalidCase {
            name: "venues blank name",
            field: "name",
            call: |client| {
                let params = VenuesParams::new().with_name("  ");
                Box::pin(async move { client.venues(params).await })
            },
        },
        InvalidCase {
            name: "venues limit 0",
            field: "limit",
            call: |client| {
                let params = VenuesParams::new().with_limit(0);
                Box::pin(async move { client.venues(params).await })
            },
        },
        InvalidCase {
            name: "venue id 0",
            field: "id",
            call: |client| Box::pin(async move { client.venue(0).await }),
        },
    ]
}

#[tokio::test]
async fn invalid_parameters_never_reach_limiter_or_transport() {
    for case in invalid_cases() {
        let mock = Arc::new(MockHttpClient::new());
        let client = client_with(&mock, RateLimitProfile::Standard);

        let error = (case.call)(client.clone()).await.expect_err(case.name);

        match &error {
            ApiError::Validation { field, .. } => {
                assert_eq!(field, case.field, "case '{}': field", case.name)
            }
            other => panic!("case '{}': expected validation error, got {other:?}", case.name),
        }
        assert_eq!(error.code(), "api.validation", "case '{}': code", case.name);
        assert_eq!(mock.call_count(), 0, "case '{}': transport calls", case.name);
        assert_eq!(
            client.rate_limit_status().windows[0].used,
            0,
            "case '{}': limiter slots",
            case.name
        );
    }
}

#[test]
fn incomplete_configuration_fails_before_any_call() {
    let mock: Arc<MockHttpClient> = Arc::new(MockHttpClient::new());
    let cases = [
        (ClientConfig::new(" ", "app/1.0"), ConfigError::MissingApiKey),
        (ClientConfig::new("key", ""), ConfigError::MissingUserAgent),
        (ClientConfig::new("key", "app/1.0").with_timeout_ms(0), ConfigError::ZeroTimeout),
        (
            ClientConfig::new("key\nInjected: x", "app/1.0"),
            ConfigError::InvalidHeader { name: "api_key" },
        ),
    ];

    for (config, expected) in cases {
        let error = Client::with_http_client(config, mock.clone()).expect_err("invalid config");
        assert_eq!(error, expected);
    }
    assert!(matches!(
        Client::with_http_client(
            ClientConfig::new("key", "app/1.0").with_base_url("ftp://example.test"),
            mock.clone()
        ),
        Err(ConfigError::InvalidBaseUrl { .. })
    ));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn requests_carry_credentials_and_canonical_query() {
    let mock = Arc::new(MockHttpClient::new());
    let client = Client::with_http_client(
        config(RateLimitProfile::Disabled).with_language("fr"),
        mock.clone(),
    )
    .expect("valid config");

    client
        .venues(
            VenuesParams::new()
                .with_country("fr")
                .with_name(" Le Café ")
                .with_page(2)
                .with_limit(25),
        )
        .await
        .expect("venues succeed");

    let sent = &mock.requests()[0];
    assert_eq!(
        sent.url,
        format!("{BASE_URL}/venues?country=FR&name=Le%20Caf%C3%A9&page=2&limit=25")
    );
    assert_eq!(sent.header("x-api-key"), Some("contract-key"));
    assert_eq!(sent.header("user-agent"), Some("paceline-contract/1.0"));
    assert_eq!(sent.header("accept-language"), Some("fr"));
    assert!(!sent.url.contains("contract-key"), "key must never be in the URL");
}

#[tokio::test]
async fn successful_body_is_returned_untouched_and_paginates() {
    let body = json!({
        "results": [{"id": 1, "name": "Alpha"}, {"id": 2, "name": "Beta"}],
        "meta": {"page": "2", "per_page": 2, "total": 7},
        "extra": {"kept": true}
    });
    let mock = Arc::new(MockHttpClient::new().respond(200, body.to_string()));
    let client = client_with(&mock, RateLimitProfile::Disabled);

    let returned = client
        .venues(VenuesParams::new().with_page(2).with_limit(2))
        .await
        .expect("venues succeed");

    assert_eq!(returned, body);
    let info = pagination::extract(&returned);
    assert_eq!(info.page, 2);
    assert_eq!(info.items_per_page, 2);
    assert_eq!(info.total, 7);
    assert_eq!(info.total_pages(), 4);
    assert!(info.has_next_page());
}

#[tokio::test]
async fn typed_requests_decode_or_report_shape_mismatch() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Venue {
        id: u64,
        name: String,
    }

    let mock = Arc::new(
        MockHttpClient::new()
            .respond(200, r#"{"id": 5, "name": "Harbor Hall"}"#)
            .respond(200, r#"{"id": "five"}"#)
            .respond(404, r#"{"message": "no such venue"}"#),
    );
    let client = client_with(&mock, RateLimitProfile::Disabled);
    let executor = client.executor();

    let venue: Venue = executor
        .request_as(RequestDescriptor::get("/venues/5"))
        .await
        .expect("decodes");
    assert_eq!(
        venue,
        Venue {
            id: 5,
            name: String::from("Harbor Hall")
        }
    );

    let mismatch = executor
        .request_as::<Venue>(RequestDescriptor::get("/venues/5"))
        .await
        .expect_err("shape mismatch");
    assert!(matches!(mismatch, ClientError::Decode(_)));

    let missing = executor
        .request_as::<Venue>(RequestDescriptor::get("/venues/6"))
        .await
        .expect_err("not found");
    match missing {
        ClientError::Api(error) => {
            assert_eq!(error.kind(), ErrorKind::NotFound);
            assert_eq!(error.message(), "no such venue");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn two_clients_are_limited_independently() {
    let first_mock = Arc::new(MockHttpClient::new());
    let second_mock = Arc::new(MockHttpClient::new());
    let first = client_with(&first_mock, RateLimitProfile::Standard);
    let second = client_with(&second_mock, RateLimitProfile::Standard);
    let start = Instant::now();

    for _ in 0..2 {
        first.countries(CountriesParams::default()).await.expect("first ok");
        second.countries(CountriesParams::default()).await.expect("second ok");
    }

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(first.rate_limit_status().windows[0].used, 2);
    assert_eq!(second.rate_limit_status().windows[0].used, 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_budget() {
    let mock = Arc::new(MockHttpClient::new());
    let client = client_with(&mock, RateLimitProfile::Standard);
    let start = Instant::now();

    let mut tasks = tokio::task::JoinSet::new();
    for page in 1..=6 {
        let client = client.clone();
        tasks.spawn(async move {
            client.countries(CountriesParams::page(page, 10)).await?;
            Ok::<_, ApiError>(Instant::now())
        });
    }

    let mut finished = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        finished.push(joined.expect("task completes").expect("call succeeds"));
    }
    finished.sort();

    assert_eq!(mock.call_count(), 6);
    // 2 per second: grants land at roughly 0s, 1s and 2s.
    assert!(finished[5] - start >= Duration::from_secs(2));
    for window in finished.windows(3) {
        assert!(window[2] - window[0] > Duration::from_secs(1));
    }
}
