// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use escola_api::{ApiError, CSRF_HEADER, Client};
use escola_app::{RequerimentoFormInput, RequerimentoId, RequerimentoTipo};
use std::io::Read;
use std::thread;
use tiny_http::{Header, Response, Server};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

#[test]
fn dashboard_stats_sends_csrf_header_and_parses_counters() {
    let server = Server::http("127.0.0.1:0").expect("start mock server");
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/dashboard/stats/");

        let csrf = request
            .headers()
            .iter()
            .find(|header| header.field.equiv(CSRF_HEADER))
            .map(|header| header.value.as_str().to_owned());
        assert_eq!(csrf.as_deref(), Some("token-abc"));

        let content_type = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Content-Type"))
            .map(|header| header.value.as_str().to_owned());
        assert_eq!(content_type.as_deref(), Some("application/json"));

        request
            .respond(json_response(
                r#"{"students":120,"teachers":14,"classes":8,"subjects":11}"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "token-abc").expect("client should initialize");
    let stats = client.dashboard_stats().expect("stats should parse");
    assert_eq!(stats.students, 120);
    assert_eq!(stats.teachers, 14);
    assert_eq!(stats.classes, 8);
    assert_eq!(stats.subjects, 11);

    handle.join().expect("server thread should join");
}

#[test]
fn non_success_status_surfaces_as_status_error() {
    let server = Server::http("127.0.0.1:0").expect("start mock server");
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"detail":"not found"}"#, 404))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "token-abc").expect("client should initialize");
    let error = client
        .dashboard_stats()
        .expect_err("404 must not resolve to a value");
    assert!(matches!(error, ApiError::Status(404)));

    handle.join().expect("server thread should join");
}

#[test]
fn unreachable_server_surfaces_as_transport_error() {
    let client = Client::new("http://127.0.0.1:1", "token-abc").expect("client should initialize");
    let error = client
        .dashboard_stats()
        .expect_err("connection refused should fail");
    assert!(matches!(error, ApiError::Transport(_)));
}

#[test]
fn non_json_body_surfaces_as_decode_error() {
    let server = Server::http("127.0.0.1:0").expect("start mock server");
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(Response::from_string("<html>login</html>").with_status_code(200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "token-abc").expect("client should initialize");
    let error = client
        .dashboard_stats()
        .expect_err("html body should fail to decode");
    assert!(matches!(error, ApiError::Decode(_)));

    handle.join().expect("server thread should join");
}

#[test]
fn submit_requerimento_posts_json_body() {
    let server = Server::http("127.0.0.1:0").expect("start mock server");
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/administracao/requerimentos/");
        assert_eq!(request.method().as_str(), "POST");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("body is JSON");
        assert_eq!(parsed["tipo"], "material");
        assert_eq!(parsed["descricao"], "Giz e apagador para a sala 12.");

        request
            .respond(json_response(r#"{"id":7}"#, 201))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "token-abc").expect("client should initialize");
    let id = client
        .submit_requerimento(&RequerimentoFormInput {
            tipo: RequerimentoTipo::Material,
            descricao: "Giz e apagador para a sala 12.".to_owned(),
        })
        .expect("submission should succeed");
    assert_eq!(id, RequerimentoId::new(7));

    handle.join().expect("server thread should join");
}

#[test]
fn roster_list_parses_rows() {
    let server = Server::http("127.0.0.1:0").expect("start mock server");
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/alunos/");
        request
            .respond(json_response(
                r#"[{"id":1,"nome":"Álvaro Dias","matricula":"2026001","turma":"1A","status":"ativo"}]"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "token-abc").expect("client should initialize");
    let alunos = client.list_alunos().expect("roster should parse");
    assert_eq!(alunos.len(), 1);
    assert_eq!(alunos[0].nome, "Álvaro Dias");
    assert_eq!(alunos[0].nome_responsavel, "");

    handle.join().expect("server thread should join");
}
