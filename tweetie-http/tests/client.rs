use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::header::HeaderValue;
use reqwest::{Method, StatusCode, Url};
use serde_json::{Value, json};
use tweetie_http::{Auth, HttpClient, HttpError, RequestOpts, RequestSigner};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct CountingSigner {
    calls: AtomicUsize,
}

impl RequestSigner for CountingSigner {
    fn authorization(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<HeaderValue, HttpError> {
        assert!(url.query().is_none(), "signing url must not carry a query");
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let value = format!("Test {method} {} params={} n={n}", url.path(), params.len());
        HeaderValue::from_str(&value).map_err(|e| HttpError::Build(e.to_string()))
    }
}

fn client(server: &MockServer) -> HttpClient {
    HttpClient::new(&server.uri()).unwrap()
}

#[tokio::test]
async fn signs_request_and_encodes_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/echo.json"))
        .and(query_param("screen_name", "some one"))
        .and(header("authorization", "Test GET /1.1/echo.json params=1 n=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let signer = CountingSigner::default();
    let got: Value = client(&server)
        .get_json(
            "1.1/echo.json",
            RequestOpts {
                auth: Some(Auth::Signed(&signer)),
                query: Some(vec![("screen_name", Cow::Borrowed("some one"))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(got, json!({"ok": true}));
}

#[tokio::test]
async fn waits_through_rate_limit_and_resigns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let signer = CountingSigner::default();
    let got: Vec<u32> = client(&server)
        .get_json(
            "limited",
            RequestOpts {
                auth: Some(Auth::Signed(&signer)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(got, vec![1, 2, 3]);
    assert_eq!(signer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn surfaces_rate_limit_when_waiting_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "42"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .with_rate_limit_wait(false)
        .get_json::<Value>("limited", RequestOpts::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HttpError::RateLimited {
            retry_after_secs: Some(42)
        }
    ));
}

#[tokio::test]
async fn retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
        .mount(&server)
        .await;

    let got: Value = client(&server)
        .get_json("flaky", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(got["ok"], 1);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"code": 50, "message": "User not found."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<Value>("missing", RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Api {
            status, message, ..
        } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "User not found. (code 50)");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn decode_errors_carry_snippet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<Value>("html", RequestOpts::default())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Decode(_, snippet) if snippet.contains("nope")));
}
