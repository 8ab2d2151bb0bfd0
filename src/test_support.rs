//! In-process stand-in for the analysis backend, used by tests.
//!
//! An axum router serving `POST /upload` and `GET /sample-csv` with one canned response.
//! Uploads are parsed as multipart and recorded field by field so tests can assert on
//! what the client actually sent.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::sync::watch;

pub(crate) const HEALTHY_ANALYSIS_BODY: &str = r#"{
    "metrics": {
        "total_revenue": 500000,
        "total_expenses": 300000,
        "net_profit": 200000,
        "benchmarking": {"status": "Healthy", "current": "40%", "industry": "Manufacturing", "industry_avg": "35%"},
        "alerts": []
    },
    "multilingual_summary": "Strong performance.",
    "recommendation": "Reinvest surplus."
}"#;

/// One `/upload` request as the backend saw it.
#[derive(Debug, Clone, Default)]
pub(crate) struct UploadedForm {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub file: Vec<u8>,
    pub industry: Option<String>,
    pub lang: Option<String>,
}

struct Shared {
    status: StatusCode,
    body: String,
    hits: AtomicUsize,
    sample_hits: AtomicUsize,
    uploads: Mutex<Vec<UploadedForm>>,
    released: watch::Receiver<bool>,
}

impl Shared {
    /// Wait for the gate to open, then answer with the canned response.
    async fn respond(&self, content_type: &'static str) -> Response {
        let mut released = self.released.clone();
        let _ = released.wait_for(|open| *open).await;
        (
            self.status,
            [(header::CONTENT_TYPE, content_type)],
            self.body.clone(),
        )
            .into_response()
    }
}

async fn upload(State(stub): State<Arc<Shared>>, mut multipart: Multipart) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);

    let mut form = UploadedForm::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.content_type = field.content_type().map(str::to_string);
                form.file = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            }
            "industry" => form.industry = field.text().await.ok(),
            "lang" => form.lang = field.text().await.ok(),
            _ => {}
        }
    }
    stub.uploads.lock().expect("stub lock").push(form);

    stub.respond("application/json").await
}

async fn sample_csv(State(stub): State<Arc<Shared>>) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    stub.sample_hits.fetch_add(1, Ordering::SeqCst);
    stub.respond("text/csv").await
}

pub(crate) struct StubBackend {
    pub addr: SocketAddr,
    shared: Arc<Shared>,
    release: watch::Sender<bool>,
}

impl StubBackend {
    /// Answer every request immediately with `status` and `body`.
    pub async fn start(status: u16, body: &str) -> Self {
        Self::spawn(status, body, false).await
    }

    /// Like `start`, but hold each response until `release` is called.
    pub async fn start_held(status: u16, body: &str) -> Self {
        Self::spawn(status, body, true).await
    }

    async fn spawn(status: u16, body: &str, hold: bool) -> Self {
        let (release, released) = watch::channel(!hold);
        let shared = Arc::new(Shared {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_string(),
            hits: AtomicUsize::new(0),
            sample_hits: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
            released,
        });

        let app = Router::new()
            .route("/upload", post(upload))
            .route("/sample-csv", get(sample_csv))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve stub") });

        Self {
            addr,
            shared,
            release,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests that reached a handler, across both routes.
    pub fn hits(&self) -> usize {
        self.shared.hits.load(Ordering::SeqCst)
    }

    pub fn sample_hits(&self) -> usize {
        self.shared.sample_hits.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<UploadedForm> {
        self.shared.uploads.lock().expect("stub lock").clone()
    }

    pub fn release(&self) {
        let _ = self.release.send(true);
    }
}

/// An address nothing listens on, for connection-refused cases.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind scratch listener");
    let addr = listener.local_addr().expect("scratch addr");
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn test_config(api_url: &str) -> crate::model::AnalysisConfig {
    crate::model::AnalysisConfig {
        api_url: api_url.to_string(),
        timeout: std::time::Duration::from_secs(10),
        user_agent: "sme-navigator-test".into(),
    }
}
