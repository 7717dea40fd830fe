use std::net::SocketAddr;
use std::path::Path;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::auth::otp;
use tokio::net::TcpListener;

use server::startup;

const SECRET: &str = "e2e-secret";

struct TestApp {
    base_url: String,
}

fn config(root: &Path, secret: Option<&str>) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.storage.path = root.to_path_buf();
    cfg.server.secret = secret.map(str::to_owned);
    cfg
}

async fn start_server(cfg: &AppConfig) -> anyhow::Result<TestApp> {
    let app = startup::build_app(cfg).await;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

/// Minimal client for the OTP scheme: every call fetches a nonce through a
/// denied request, then retries with the hash.
struct OtpClient {
    http: reqwest::Client,
    base_url: String,
    secret: String,
}

impl OtpClient {
    async fn nonce(&self) -> anyhow::Result<String> {
        let res = self.http.get(format!("{}/store", self.base_url)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
        let challenge = res
            .headers()
            .get("www-authenticate")
            .ok_or_else(|| anyhow::anyhow!("missing challenge"))?
            .to_str()?;
        Ok(otp::parse_challenge(challenge)
            .ok_or_else(|| anyhow::anyhow!("bad challenge {challenge}"))?
            .to_string())
    }

    async fn auth(&self) -> anyhow::Result<String> {
        let nonce = self.nonce().await?;
        Ok(otp::authorization_header(&nonce, &self.secret))
    }

    async fn get(&self, query: &str) -> anyhow::Result<(HttpStatusCode, Value)> {
        let res = self
            .http
            .get(format!("{}/store{}", self.base_url, query))
            .header("authorization", self.auth().await?)
            .send()
            .await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    async fn post(&self, body: &Value) -> anyhow::Result<HttpStatusCode> {
        let res = self
            .http
            .post(format!("{}/store", self.base_url))
            .header("authorization", self.auth().await?)
            .json(body)
            .send()
            .await?;
        Ok(res.status())
    }

    async fn delete(&self, query: &str) -> anyhow::Result<HttpStatusCode> {
        let res = self
            .http
            .delete(format!("{}/store{}", self.base_url, query))
            .header("authorization", self.auth().await?)
            .send()
            .await?;
        Ok(res.status())
    }
}

#[tokio::test]
async fn e2e_authenticated_crud_survives_restart() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let cfg = config(tmp.path(), Some(SECRET));
    let app = start_server(&cfg).await?;
    let client = OtpClient { http: reqwest::Client::new(), base_url: app.base_url.clone(), secret: SECRET.into() };

    assert_eq!(client.post(&json!({"rooms": {"kitchen": {"temp": 21}}})).await?, HttpStatusCode::OK);
    assert_eq!(client.post(&json!({"rooms": {"hall": {"temp": 19}}, "scenes": ["night"]})).await?, HttpStatusCode::OK);

    let (status, body) = client.get("?box=rooms").await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body, json!({"kitchen": {"temp": 21}, "hall": {"temp": 19}}));

    assert_eq!(client.delete("?box=scenes").await?, HttpStatusCode::NO_CONTENT);
    assert_eq!(client.delete("?box=scenes").await?, HttpStatusCode::NOT_FOUND);

    // a second instance on the same storage root sees the persisted tree
    let restarted = start_server(&cfg).await?;
    let client = OtpClient { http: reqwest::Client::new(), base_url: restarted.base_url, secret: SECRET.into() };
    let (_, body) = client.get("").await?;
    assert_eq!(body, json!({"rooms": {"kitchen": {"temp": 21}, "hall": {"temp": 19}}}));
    Ok(())
}

#[tokio::test]
async fn e2e_wrong_secret_never_gets_in() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let app = start_server(&config(tmp.path(), Some(SECRET))).await?;
    let client = OtpClient { http: reqwest::Client::new(), base_url: app.base_url, secret: "guess".into() };

    assert_eq!(client.post(&json!({"a": 1})).await?, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(client.delete("?box=a").await?, HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_open_mode_needs_no_header() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let app = start_server(&config(tmp.path(), None)).await?;
    let http = reqwest::Client::new();

    let res = http.post(format!("{}/store", app.base_url)).json(&json!({"a": {"b": 1}})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = http.get(format!("{}/store?box=a", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"b": 1}));

    let res = http.delete(format!("{}/store?box=a", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn e2e_run_until_stops_on_shutdown_signal() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut cfg = config(tmp.path(), None);
    cfg.server.host = "127.0.0.1".into();
    // port 0 is rejected by validation but fine for binding directly
    cfg.server.port = 0;

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(startup::run_until(cfg, async move {
        let _ = rx.await;
    }));
    let _ = tx.send(());
    handle.await??;
    Ok(())
}
