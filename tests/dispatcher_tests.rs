//! Tests for the App dispatch loop
//!
//! # Test Coverage
//!
//! - End-to-end dispatch of the demo routes through `App::call`
//! - Response translation defaults (`200 OK`, `Content-type: text/plain`)
//! - Explicit status and headers pass through without merging
//! - The host's `start_response` is called exactly once per successful request
//! - Handler failures (including parameter binding failures) reach the host unchanged
//! - Request bodies are available to handlers through the view

use anyhow::anyhow;
use routegate::demo::demo_app;
use routegate::server::{translate, RequestError};
use routegate::{App, AppConfig, Environ, Response, RouteError, TransportResponse};
use std::sync::Arc;

/// What the host saw for one request
#[derive(Debug)]
struct Recorded {
    calls: usize,
    status: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

fn call(app: &App, environ: Environ<'_>) -> anyhow::Result<Recorded> {
    let mut calls = 0;
    let mut status = String::new();
    let mut headers = Vec::new();
    let chunks = app.call(environ, &mut |s: &str, h: &[(String, String)]| {
        calls += 1;
        status = s.to_string();
        headers = h.to_vec();
    })?;
    assert_eq!(chunks.len(), 1, "body is always a single chunk");
    Ok(Recorded {
        calls,
        status,
        headers,
        body: chunks.concat(),
    })
}

fn get(app: &App, path: &str) -> Recorded {
    call(app, Environ::new("GET", path)).unwrap()
}

fn text_plain() -> Vec<(String, String)> {
    vec![("Content-type".to_string(), "text/plain".to_string())]
}

fn demo() -> App {
    demo_app(AppConfig::default()).unwrap()
}

#[test]
fn test_demo_index_route() {
    let res = get(&demo(), "/index/alice");
    assert_eq!(res.calls, 1);
    assert_eq!(res.status, "200 OK");
    assert_eq!(res.headers, text_plain());
    assert_eq!(res.body, b"Hello index: alice!");
}

#[test]
fn test_demo_number_route() {
    let res = get(&demo(), "/number/42");
    assert_eq!(res.status, "200 OK");
    assert!(String::from_utf8(res.body).unwrap().contains("42"));
}

#[test]
fn test_demo_unanchored_tmp_route() {
    let app = demo();
    assert_eq!(get(&app, "/tmp").body, b"Hello tmp!");
    assert_eq!(get(&app, "/tmp/anything").body, b"Hello tmp!");
}

#[test]
fn test_demo_missing_route_is_404() {
    let app = demo();
    for (method, path) in [("GET", "/missing"), ("POST", "/index/123"), ("PUT", "/")] {
        let res = call(&app, Environ::new(method, path)).unwrap();
        assert_eq!(res.calls, 1);
        assert_eq!(res.status, "404 Not Found");
        assert_eq!(res.headers, text_plain());
        assert_eq!(res.body, b"404 Not Found");
    }
}

#[test]
fn test_demo_number_echoes_digits_verbatim() {
    let app = demo();
    let res = get(&app, "/number/007");
    assert_eq!(res.status, "200 OK");
    assert_eq!(res.body, b"Hello index: 007!");

    let long = "99999999999999999999999";
    let res = get(&app, &format!("/number/{long}"));
    assert_eq!(res.status, "200 OK");
    assert_eq!(res.body, format!("Hello index: {long}!").into_bytes());
}

#[test]
fn test_empty_path_is_routed_as_root() {
    let mut app = App::new();
    app.route("^/$")
        .to(|req, _params| Ok(Response::new(req.path().to_string())))
        .unwrap();
    let res = get(&app, "");
    assert_eq!(res.status, "200 OK");
    assert_eq!(res.body, b"/");
}

#[test]
fn test_method_is_upper_cased_before_handler() {
    let mut app = App::new();
    app.route("/m")
        .to(|req, _params| Ok(Response::new(req.method().to_string())))
        .unwrap();
    let res = call(&app, Environ::new("patch", "/m")).unwrap();
    assert_eq!(res.body, b"PATCH");
}

#[test]
fn test_explicit_status_and_headers_are_preserved() {
    let mut app = App::new();
    app.route("^/created$")
        .to(|_req, _params| {
            Ok(Response::new("{}")
                .with_status("201 Created")
                .with_header("Content-Type", "application/json")
                .with_header("X-Trace", "abc"))
        })
        .unwrap();

    let res = get(&app, "/created");
    assert_eq!(res.status, "201 Created");
    assert_eq!(
        res.headers,
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Trace".to_string(), "abc".to_string()),
        ]
    );
    assert_eq!(res.body, b"{}");
}

#[test]
fn test_status_without_headers_gets_default_headers_only() {
    let transport = translate(Response::new("gone").with_status("410 Gone"));
    assert_eq!(transport.status, "410 Gone");
    assert_eq!(transport.headers, text_plain());
}

#[test]
fn test_headers_without_status_get_default_status_only() {
    let transport = translate(Response::new("x").with_header("X-A", "1"));
    assert_eq!(transport.status, "200 OK");
    assert_eq!(transport.headers, vec![("X-A".to_string(), "1".to_string())]);
}

#[test]
fn test_body_round_trips_through_translation_and_request_text() {
    let original = "héllo wörld ✓";
    let TransportResponse { body, .. } = translate(Response::new(original));
    let bytes = body.concat();
    assert_eq!(bytes, original.as_bytes());

    let mut app = App::new();
    app.route("/echo")
        .to(|req, _params| Ok(Response::new(req.text()?)))
        .unwrap();
    let res = call(&app, Environ::new("POST", "/echo").with_body(bytes)).unwrap();
    assert_eq!(String::from_utf8(res.body).unwrap(), original);
}

#[test]
fn test_handler_error_propagates_unchanged() {
    let mut app = App::new();
    app.route("/boom")
        .to(|_req, _params| Err(anyhow!("database unavailable")))
        .unwrap();

    let mut started = false;
    let err = app
        .call(Environ::new("GET", "/boom"), &mut |_s: &str, _h: &[(String, String)]| {
            started = true;
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "database unavailable");
    assert!(!started, "start_response must not be called when the handler fails");
}

#[test]
fn test_missing_param_is_a_handler_failure() {
    let mut app = App::new();
    // The pattern captures `name`, the handler asks for `id`.
    app.route(r"^/p/(?P<name>\w+)$")
        .to(|_req, params| Ok(Response::new(params.require("id")?.to_string())))
        .unwrap();

    let err = call(&app, Environ::new("GET", "/p/x")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RouteError>(),
        Some(RouteError::MissingParam { name }) if name == "id"
    ));
}

#[test]
fn test_body_without_content_length_fails_in_handler() {
    let mut app = App::new();
    app.route("/upload")
        .to(|req, _params| Ok(Response::new(format!("{} bytes", req.body()?.len()))))
        .unwrap();

    let environ = Environ::new("POST", "/upload").with_input(&b"payload"[..], None);
    let err = call(&app, environ).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RequestError>(),
        Some(RequestError::MissingContentLength)
    ));
}

#[test]
fn test_json_body_reaches_handler() {
    let mut app = App::new();
    app.route("^/pets$")
        .to(|req, _params| {
            let pet = req.json()?;
            let name = pet["name"].as_str().unwrap_or("?").to_string();
            Ok(Response::new(name).with_status("201 Created"))
        })
        .unwrap();

    let res = call(
        &app,
        Environ::new("POST", "/pets").with_body(r#"{"name":"Fluffy"}"#),
    )
    .unwrap();
    assert_eq!(res.status, "201 Created");
    assert_eq!(res.body, b"Fluffy");
}

#[test]
fn test_app_config_charset_reaches_request_view() {
    let mut app = App::with_config(AppConfig {
        charset: "latin-1".to_string(),
    });
    app.route("/t")
        .to(|req, _params| Ok(Response::new(req.text()?)))
        .unwrap();
    let res = call(&app, Environ::new("POST", "/t").with_body(vec![0x63, 0x61, 0x66, 0xe9])).unwrap();
    assert_eq!(String::from_utf8(res.body).unwrap(), "café");
}

#[test]
fn test_app_is_shareable_across_threads() {
    let app = Arc::new(demo());
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let app = Arc::clone(&app);
            std::thread::spawn(move || get(&app, &format!("/number/{i}")).body)
        })
        .collect();
    for (i, worker) in workers.into_iter().enumerate() {
        assert_eq!(worker.join().unwrap(), format!("Hello index: {i}!").into_bytes());
    }
}
