mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use staffetta_server::routes::router;
use std::sync::Arc;
use tower::ServiceExt;

use common::setup;

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&b)?))?,
        None => req.body(Body::empty())?,
    };

    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn register(app: &Router, name: &str) -> Result<(i64, String)> {
    let (status, v) = call(app, Method::POST, "/api/register", None, Some(json!({ "name": name, "password": "pw" }))).await?;
    assert_eq!(status, StatusCode::CREATED, "register {name}: {v}");
    Ok((v["user"]["id"].as_i64().unwrap(), v["token"].as_str().unwrap().to_string()))
}

async fn app() -> Result<(common::TestDb, Router)> {
    let db = setup().await?;
    let app = router(Arc::new(db.state.clone()));
    Ok((db, app))
}

#[tokio::test]
async fn health_is_ok() -> Result<()> {
    let (_db, app) = app().await?;
    let (status, _) = call(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn api_requires_a_valid_token() -> Result<()> {
    let (_db, app) = app().await?;
    let (status, v) = call(&app, Method::GET, "/api/messages?global=1", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(v["code"], "unauthorized");

    let (status, _) = call(&app, Method::GET, "/api/users", Some("not-a-token"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_and_login() -> Result<()> {
    let (_db, app) = app().await?;
    let (id, first_token) = register(&app, "alice").await?;

    let (status, v) = call(&app, Method::POST, "/api/register", None, Some(json!({ "name": "alice", "password": "x" }))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(v["code"], "conflict");

    // nome o password vuoti (anche solo spazi) vengono rifiutati per campo
    let (status, v) = call(&app, Method::POST, "/api/register", None, Some(json!({ "name": "   ", "password": "pw" }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["details"]["fields"]["name"], "required");
    let (status, v) = call(&app, Method::POST, "/api/register", None, Some(json!({ "name": "bob", "password": "   " }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["code"], "validation_error");
    assert_eq!(v["details"]["fields"]["password"], "required");

    let (status, v) = call(&app, Method::POST, "/api/login", None, Some(json!({ "name": "alice", "password": "wrong" }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{v}");

    let (status, _) = call(&app, Method::POST, "/api/login", None, Some(json!({ "name": "nobody", "password": "pw" }))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, v) = call(&app, Method::POST, "/api/login", None, Some(json!({ "name": "alice", "password": "pw" }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["user"]["id"], id);
    let new_token = v["token"].as_str().unwrap();
    assert_ne!(new_token, first_token);

    // il login ruota il token
    let (status, _) = call(&app, Method::GET, "/api/users", Some(first_token.as_str()), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, Method::GET, "/api/users", Some(new_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn users_listing_excludes_caller_and_sorts_by_name() -> Result<()> {
    let (_db, app) = app().await?;
    let (_, token) = register(&app, "mario").await?;
    register(&app, "zoe").await?;
    register(&app, "Anna").await?;
    register(&app, "bruno").await?;

    let (status, v) = call(&app, Method::GET, "/api/users", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = v["users"].as_array().unwrap().iter().map(|u| u["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Anna", "bruno", "zoe"]);
    assert!(v["users"][0].get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn missing_scope_is_unprocessable() -> Result<()> {
    let (_db, app) = app().await?;
    let (_, token) = register(&app, "alice").await?;

    for uri in ["/api/messages", "/api/messages?global=false", "/api/messages?global=0&after=3"] {
        let (status, v) = call(&app, Method::GET, uri, Some(token.as_str()), None).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(v["code"], "missing_scope");
        assert_eq!(v["message"], "Missing global=1 or user_id");
    }
    Ok(())
}

#[tokio::test]
async fn send_and_poll_global_and_direct() -> Result<()> {
    let (_db, app) = app().await?;
    let (alice, alice_token) = register(&app, "alice").await?;
    let (bob, bob_token) = register(&app, "bob").await?;
    let (_, carol_token) = register(&app, "carol").await?;

    let (status, v) = call(&app, Method::POST, "/api/messages", Some(alice_token.as_str()), Some(json!({ "body": "hi" }))).await?;
    assert_eq!(status, StatusCode::CREATED, "{v}");
    assert_eq!(v["message"]["id"], 1);
    assert!(v["message"]["receiverId"].is_null());
    assert_eq!(v["message"]["sender"], json!({ "id": alice, "name": "alice" }));

    let (status, v) = call(&app, Method::POST, "/api/messages", Some(alice_token.as_str()), Some(json!({ "body": "hey", "receiver_id": bob }))).await?;
    assert_eq!(status, StatusCode::CREATED, "{v}");
    assert_eq!(v["message"]["receiverId"], bob);

    // global feed: solo il messaggio globale
    let (_, v) = call(&app, Method::GET, "/api/messages?global=1", Some(carol_token.as_str()), None).await?;
    let feed = v["messages"].as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["body"], "hi");
    assert_eq!(feed[0]["sender"]["name"], "alice");

    // conversazione vista da bob
    let (_, v) = call(&app, Method::GET, &format!("/api/messages?user_id={alice}"), Some(bob_token.as_str()), None).await?;
    assert_eq!(v["messages"].as_array().unwrap().len(), 1);
    assert_eq!(v["messages"][0]["body"], "hey");

    // carol non vede la conversazione alice-bob
    let (_, v) = call(&app, Method::GET, &format!("/api/messages?userId={alice}"), Some(carol_token.as_str()), None).await?;
    assert!(v["messages"].as_array().unwrap().is_empty());

    // cursore: dopo l'ultimo id visto non c'è niente di nuovo
    let (_, v) = call(&app, Method::GET, "/api/messages?global=1&after=1", Some(carol_token.as_str()), None).await?;
    assert!(v["messages"].as_array().unwrap().is_empty());

    // global ha la precedenza sul peer
    let (_, v) = call(&app, Method::GET, &format!("/api/messages?global=1&userId={alice}"), Some(bob_token.as_str()), None).await?;
    assert_eq!(v["messages"][0]["body"], "hi");
    Ok(())
}

#[tokio::test]
async fn send_validation_reports_the_field() -> Result<()> {
    let (_db, app) = app().await?;
    let (_, token) = register(&app, "alice").await?;

    let (status, v) = call(&app, Method::POST, "/api/messages", Some(token.as_str()), Some(json!({ "body": "" }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["code"], "validation_error");
    assert_eq!(v["details"]["fields"]["body"], "required");

    let (status, v) = call(&app, Method::POST, "/api/messages", Some(token.as_str()), Some(json!({ "body": "x".repeat(2001) }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["details"]["fields"]["body"].as_str().unwrap().contains("2000"));

    let (status, v) = call(&app, Method::POST, "/api/messages", Some(token.as_str()), Some(json!({ "body": "hi", "receiverId": 77 }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["details"]["fields"]["receiverId"], "unknown recipient");

    // nessun id consumato dai tentativi rifiutati
    let (status, v) = call(&app, Method::POST, "/api/messages", Some(token.as_str()), Some(json!({ "body": "ok" }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(v["message"]["id"], 1);
    Ok(())
}

/*
    Obiettivo test: un corpo JSON con tipi sbagliati produce lo stesso errore strutturato
    delle altre validazioni ({ code, message, details.fields }), non il testo semplice di axum.
*/
#[tokio::test]
async fn undecodable_json_is_a_validation_error() -> Result<()> {
    let (_db, app) = app().await?;
    let (_, token) = register(&app, "alice").await?;

    for body in [json!({ "body": 123 }), json!({ "body": "hi", "receiverId": "2" })] {
        let (status, v) = call(&app, Method::POST, "/api/messages", Some(token.as_str()), Some(body.clone())).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(v["code"], "validation_error", "{body}");
        assert!(v["details"]["fields"]["json"].is_string(), "{v}");
    }

    let (status, v) = call(&app, Method::POST, "/api/register", None, Some(json!({ "name": 1 }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["code"], "validation_error");

    // nessun messaggio salvato dai tentativi rifiutati
    let (_, v) = call(&app, Method::GET, "/api/messages?global=1", Some(token.as_str()), None).await?;
    assert!(v["messages"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn undecodable_query_is_a_validation_error() -> Result<()> {
    let (_db, app) = app().await?;
    let (_, token) = register(&app, "alice").await?;

    // chiave duplicata (userId e il suo alias user_id)
    let (status, v) = call(&app, Method::GET, "/api/messages?userId=2&user_id=3", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["code"], "validation_error");
    assert!(v["details"]["fields"]["query"].is_string(), "{v}");
    Ok(())
}
