//! Shared harness: an in-process document server plus the full service stack
//! (HTTP router -> PrintService -> HttpDocumentFetcher -> Batcher -> PrintInvoker).

#![allow(dead_code)]

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use dymo_api_http::{router, serve, AppState};
use dymo_core::application::{BatcherConfig, PrintService};
use dymo_core::port::print_invoker::mocks::RecordingPrintInvoker;
use dymo_core::port::time_provider::SystemTimeProvider;
use dymo_core::port::PrintInvoker;
use dymo_infra_http::{build_client, FetchClientConfig, HttpDocumentFetcher};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Serves `/doc/{name}` (optional `?delay_ms=N`) and answers 404 on `/missing/{name}`
pub struct DocumentServer {
    pub base_url: String,
}

impl DocumentServer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route(
                "/doc/{name}",
                get(
                    |Path(name): Path<String>, Query(params): Query<HashMap<String, String>>| async move {
                        if let Some(delay) = params.get("delay_ms").and_then(|d| d.parse().ok()) {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                        }
                        format!("%PDF-1.4 {}", name)
                    },
                ),
            )
            .route("/missing/{name}", get(|| async { StatusCode::NOT_FOUND }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
        }
    }

    pub fn doc(&self, name: &str) -> String {
        format!("{}/doc/{}", self.base_url, name)
    }

    pub fn slow_doc(&self, name: &str, delay_ms: u64) -> String {
        format!("{}/doc/{}?delay_ms={}", self.base_url, name, delay_ms)
    }

    pub fn missing(&self, name: &str) -> String {
        format!("{}/missing/{}", self.base_url, name)
    }
}

/// The service stack served on an ephemeral localhost port
pub struct Stack {
    pub base_url: String,
    pub service: Arc<PrintService>,
    pub spool: TempDir,
    http: reqwest::Client,
    stop_http: Option<oneshot::Sender<()>>,
}

impl Stack {
    pub async fn start_recording(config: BatcherConfig) -> (Self, Arc<RecordingPrintInvoker>) {
        Self::start_recording_with(config, RecordingPrintInvoker::new()).await
    }

    pub async fn start_recording_with(
        config: BatcherConfig,
        invoker: RecordingPrintInvoker,
    ) -> (Self, Arc<RecordingPrintInvoker>) {
        let invoker = Arc::new(invoker);
        let stack = Self::start(config, invoker.clone()).await;
        (stack, invoker)
    }

    pub async fn start(config: BatcherConfig, invoker: Arc<dyn PrintInvoker>) -> Self {
        let spool = tempfile::tempdir().unwrap();
        let client = build_client(&FetchClientConfig {
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap();
        let fetcher = Arc::new(HttpDocumentFetcher::new(client, spool.path()));

        let service = Arc::new(
            PrintService::start(config, fetcher, invoker, Arc::new(SystemTimeProvider)).unwrap(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(AppState::new(Arc::clone(&service), false));
        let (stop_http, stopped) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = stopped.await;
            };
            serve(listener, app, shutdown).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            service,
            spool,
            http: reqwest::Client::new(),
            stop_http: Some(stop_http),
        }
    }

    /// POST PrintLabel the way the browser SDK does
    pub async fn print_label(&self, pdf_url: &str) -> reqwest::Response {
        self.http
            .post(format!("{}/DYMO/DLS/Printing/PrintLabel", self.base_url))
            .header(reqwest::header::REFERER, "https://shop.example/checkout")
            .form(&[("pdfUrl", pdf_url)])
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    pub fn spool_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.spool.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Stop the listener, then flush and stop the Batcher
    pub async fn shutdown(mut self) -> Arc<PrintService> {
        if let Some(stop) = self.stop_http.take() {
            let _ = stop.send(());
        }
        self.service.shutdown(Duration::from_secs(5)).await.unwrap();
        Arc::clone(&self.service)
    }
}

pub fn batcher_config(debounce: Duration) -> BatcherConfig {
    BatcherConfig::default().with_debounce(debounce)
}

/// Poll `condition` every 20ms until it holds or `within` elapses
pub async fn wait_until<F: Fn() -> bool>(condition: F, within: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

/// In-memory sink for the formatted log output of the current thread
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's events into a fresh buffer until the guard drops.
    /// Tests must run on the current-thread runtime for spawned tasks to be seen.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
