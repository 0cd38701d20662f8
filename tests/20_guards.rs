//! Requests rejected before storage is touched; these run without a database.

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn admin_routes_reject_anonymous() -> Result<()> {
    let server = common::spawn_server().await?;

    let checks = [
        server.client.post(server.url("/companies")).json(&json!({})),
        server.client.patch(server.url("/companies/c1")).json(&json!({ "name": "x" })),
        server.client.delete(server.url("/companies/c1")),
        server.client.post(server.url("/jobs")).json(&json!({})),
        server.client.delete(server.url("/jobs/1")),
        server.client.get(server.url("/users")),
        server.client.get(server.url("/users/u1")),
        server.client.post(server.url("/users/u1/jobs/1")),
    ];

    for request in checks {
        let res = request.send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await?;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "Unauthorized");
    }
    Ok(())
}

#[tokio::test]
async fn garbage_token_treated_as_anonymous() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(server.url("/users"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn list_filters_validated_before_query() -> Result<()> {
    let server = common::spawn_server().await?;

    let cases = [
        ("/jobs?minSalary=-3", "minSalary must be >= 0"),
        ("/jobs?hasEquity=maybe", "hasEquity must be a boolean"),
        ("/companies?notAllowed=blah", "filter not allowed: notAllowed"),
        ("/companies?minEmployees=abc", "minEmployees must be an integer"),
        (
            "/companies?minEmployees=3&maxEmployees=1",
            "minEmployees cannot be greater than maxEmployees",
        ),
    ];

    for (path, message) in cases {
        let res = server.client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", path);
        let body: Value = res.json().await?;
        assert_eq!(body["message"], message, "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/auth/token"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/auth/token"))
        .json(&json!({ "username": "u1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
