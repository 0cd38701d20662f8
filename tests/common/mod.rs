#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jobly_api::auth::PasswordHasher;
use reqwest::StatusCode;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Secret the spawned server signs with; tests never need to forge tokens.
pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobly-api"));
        cmd.args(["--host", "127.0.0.1", "--port", &port.to_string()])
            .env("APP_ENV", "test")
            .env("SECRET_KEY", TEST_SECRET)
            .env("DATABASE_CONNECTION_TIMEOUT", "2")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Logs in through the API and returns the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/auth/token"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("no token in login response")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Starts a fresh server process for the calling test.
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres:///jobly_test".to_string())
}

/// Empties every table and loads a small fixture:
/// companies c1..c3, jobs j1..j3 (ids 1..3), users u1 (`password1`) and
/// admin (`password`).
pub async fn reset_database() -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url())
        .await
        .context("connecting to the test database")?;

    sqlx::query("TRUNCATE applications, jobs, users, companies RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await?;

    sqlx::query(
        "INSERT INTO companies (handle, name, num_employees, description, logo_url)
         VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
                ('c3', 'C3', 3, 'Desc3', 'http://c3.img')",
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO jobs (title, salary, equity, company_handle)
         VALUES ('j1', 100, 0.1, 'c1'),
                ('j2', 200, 0.2, 'c1'),
                ('j3', 300, 0, 'c2')",
    )
    .execute(&pool)
    .await?;

    let hasher = PasswordHasher::new(1)?;
    for (username, password, is_admin) in [("u1", "password1", false), ("admin", "password", true)] {
        sqlx::query(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(username)
        .bind(hasher.hash(password)?)
        .bind(format!("{}F", username))
        .bind(format!("{}L", username))
        .bind(format!("{}@email.com", username))
        .bind(is_admin)
        .execute(&pool)
        .await?;
    }

    Ok(pool)
}
