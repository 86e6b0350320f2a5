use minotas_core::ai::{
    AiGateway, AiOperation, AiOutcome, GENERATE_FAILED_TEXT, NO_NOTES_TEXT, RATE_LIMITED_TEXT,
    SUMMARY_FAILED_TEXT,
};
use minotas_core::{filter_notes_by_reply, AiConfig, Category, Note};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::io::Read;
use std::net::TcpListener;
use std::time::{Duration, Instant};

const API_KEY: &str = "test-key";

fn gateway(server: &ServerGuard) -> AiGateway {
    let config = AiConfig::new(API_KEY)
        .expect("test key is valid")
        .with_base_url(server.url())
        .expect("mock server url is valid")
        .with_timeout(Duration::from_secs(5));
    AiGateway::new(config).expect("build gateway")
}

fn generate_path() -> Matcher {
    Matcher::Regex(r"^/models/gemini-1\.5-pro-latest:generateContent".to_string())
}

fn reply_body(text: &str) -> String {
    json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    })
    .to_string()
}

#[tokio::test]
async fn summarize_sends_conversational_request_and_unwraps_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", generate_path())
        .match_query(Matcher::UrlEncoded("key".into(), API_KEY.into()))
        .match_body(Matcher::PartialJson(json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": "Resume esta nota en una versión más corta:\n\n\"texto largo...\""}]
            }],
            "generationConfig": {"maxOutputTokens": 200}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("Texto corto."))
        .expect(1)
        .create_async()
        .await;

    let outcome = gateway(&server).summarize_note("texto largo...").await;

    mock.assert_async().await;
    assert_eq!(outcome, AiOutcome::Ok("Texto corto.".to_string()));
}

#[tokio::test]
async fn summarize_rate_limited_yields_rate_limit_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", generate_path())
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#)
        .create_async()
        .await;

    let outcome = gateway(&server).summarize_note("texto largo...").await;

    mock.assert_async().await;
    assert_eq!(outcome, AiOutcome::RateLimited);
    let text = outcome.display_text(AiOperation::SummarizeNote);
    assert_eq!(text, RATE_LIMITED_TEXT);
    assert_ne!(text, SUMMARY_FAILED_TEXT);
}

#[tokio::test]
async fn server_error_is_transport_failure_with_generic_text() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", generate_path())
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let outcome = gateway(&server).generate_text("hola").await;

    match &outcome {
        AiOutcome::TransportError(detail) => {
            assert!(detail.contains("500"));
            assert!(!detail.contains(API_KEY));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        outcome.display_text(AiOperation::GenerateText),
        GENERATE_FAILED_TEXT
    );
}

#[tokio::test]
async fn legacy_shaped_reply_is_malformed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", generate_path())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates":[{"output":"texto"}]}"#)
        .create_async()
        .await;

    let outcome = gateway(&server).generate_text("hola").await;
    assert!(matches!(outcome, AiOutcome::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_failure() {
    let config = AiConfig::new(API_KEY)
        .expect("test key is valid")
        .with_base_url("http://127.0.0.1:1")
        .expect("loopback url is valid")
        .with_timeout(Duration::from_secs(2));
    let outcome = AiGateway::new(config)
        .expect("build gateway")
        .generate_text("hola")
        .await;

    match outcome {
        AiOutcome::TransportError(detail) => assert!(!detail.contains(API_KEY)),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn search_over_no_notes_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let outcome = gateway(&server).search_notes_natural("leche", &[]).await;

    mock.assert_async().await;
    assert_eq!(outcome, AiOutcome::NoNotes);
    assert_eq!(
        outcome.display_text(AiOperation::SearchNotes),
        NO_NOTES_TEXT
    );
}

#[tokio::test]
async fn search_lists_notes_and_reply_filters_them() {
    let notes = vec![
        Note::new(1, Category::Personal, "Comprar leche"),
        Note::new(2, Category::Trabajo, "Enviar informe"),
    ];
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", generate_path())
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex(
            r"- Personal: Comprar leche\\n- Trabajo: Enviar informe".to_string(),
        ))
        .with_status(200)
        .with_body(reply_body("La nota relacionada es: Comprar leche"))
        .create_async()
        .await;

    let outcome = gateway(&server)
        .search_notes_natural("supermercado", &notes)
        .await;

    mock.assert_async().await;
    let reply = outcome.text().expect("search should succeed");
    let related = filter_notes_by_reply(reply, &notes);
    assert_eq!(related, vec![notes[0].clone()]);
}

#[tokio::test]
async fn checked_category_suggestion_validates_reply() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", generate_path())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(reply_body("Recordatorios"))
        .create_async()
        .await;
    assert_eq!(
        gateway(&server)
            .suggest_category_checked("pagar la luz el lunes")
            .await,
        Category::Recordatorios
    );

    let mut off_list = Server::new_async().await;
    off_list
        .mock("POST", generate_path())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(reply_body("Finanzas"))
        .create_async()
        .await;
    let gateway = gateway(&off_list);
    assert_eq!(
        gateway.suggest_category("pagar la luz").await,
        AiOutcome::Ok("Finanzas".to_string())
    );
    assert_eq!(
        gateway.suggest_category_checked("pagar la luz").await,
        Category::Personal
    );
}

#[tokio::test]
async fn stalled_endpoint_is_cut_off_by_timeout() {
    // Accepts the connection and never answers.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut sink = [0_u8; 1024];
            while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
        }
    });

    let config = AiConfig::new(API_KEY)
        .expect("test key is valid")
        .with_base_url(format!("http://{addr}"))
        .expect("loopback url is valid")
        .with_timeout(Duration::from_millis(300));
    let started_at = Instant::now();
    let outcome = AiGateway::new(config)
        .expect("build gateway")
        .summarize_note("texto")
        .await;

    assert!(started_at.elapsed() < Duration::from_secs(5));
    match &outcome {
        AiOutcome::TransportError(detail) => assert!(!detail.contains(API_KEY)),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        outcome.display_text(AiOperation::SummarizeNote),
        SUMMARY_FAILED_TEXT
    );
}
