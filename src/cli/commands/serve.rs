//! Interactive web front end.
//!
//! Serves a single page where a user enters their OpenAI API key, uploads a
//! PDF and watches answers stream in, then downloads the Markdown report.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::document::DocumentSource;
use crate::error::DigestError;
use crate::openai::ApiCredential;
use crate::pipeline::Pipeline;
use crate::report::{ChannelSink, Report};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    settings: Settings,
}

/// Run the interactive web server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    mut settings: Settings,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.interactive.host = host;
    }
    if let Some(port) = port {
        settings.interactive.port = port;
    }

    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::warning(&format!("{} (requests will fail until this is fixed)", e));
    }

    let addr = format!("{}:{}", settings.interactive.host, settings.interactive.port);
    let max_upload = settings.interactive.max_upload_bytes;
    let state = Arc::new(AppState { settings });

    let app = router(state, max_upload);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Plandigest");
    println!();
    Output::success(&format!("Open http://{} in your browser", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Page", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Generate", "POST /generate");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>, max_upload: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/generate", post(generate))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(cors)
        .with_state(state)
}

/// Line that precedes the error message when a run fails after answers
/// have already been streamed. The page looks for it to tell a failed run
/// from a finished one.
const RUN_FAILED_MARKER: &str = "<!-- plandigest:run-failed -->";

// === Request/Response Types ===

#[derive(Debug, Default)]
struct GenerateForm {
    api_key: Option<String>,
    file_name: Option<String>,
    bytes: Option<Vec<u8>>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<DigestError> for ApiError {
    fn from(e: DigestError) -> Self {
        match e {
            DigestError::InvalidInput(_) => Self::bad_request(e.to_string()),
            _ => Self::internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// === Handlers ===

async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(render_page(&state.settings.interactive.title))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    let (pipeline, sources) = match prepare_run(&state.settings, form) {
        Ok(prepared) => prepared,
        Err(e) => return e.into_response(),
    };

    let run_id = Uuid::new_v4();
    info!(%run_id, "Starting run over {} document(s)", sources.len());

    let (tx, rx) = mpsc::channel::<String>(16);
    let run = tokio::spawn(
        async move {
            let mut sink = ChannelSink::new(tx);
            pipeline.process(&sources, &mut sink).await
        }
        .instrument(info_span!("generate", run_id = %run_id)),
    );

    stream_run(run, rx, &state.settings.interactive.download_file_name).await
}

/// Turn a running pipeline into a response.
///
/// A run that fails before its first answer becomes a JSON error. Once an
/// answer has been streamed the status is fixed, so a later failure is sent
/// as a trailer starting with [`RUN_FAILED_MARKER`].
async fn stream_run(
    run: JoinHandle<crate::error::Result<Report>>,
    mut rx: mpsc::Receiver<String>,
    download_file_name: &str,
) -> Response {
    let first = match rx.recv().await {
        Some(block) => block,
        None => {
            return match run_outcome(run).await {
                Ok(_) => markdown_response(download_file_name, Body::empty()),
                Err(message) => {
                    ApiError::internal(format!("An error occurred: {}", message)).into_response()
                }
            };
        }
    };

    let stream = futures::stream::unfold(Some((Some(first), rx, run)), |state| async move {
        let (pending, mut rx, run) = state?;
        if let Some(block) = pending {
            return Some((Ok::<_, std::io::Error>(block), Some((None, rx, run))));
        }
        if let Some(block) = rx.recv().await {
            return Some((Ok(block), Some((None, rx, run))));
        }
        match run_outcome(run).await {
            Ok(_) => None,
            Err(message) => Some((Ok(failure_trailer(&message)), None)),
        }
    });

    markdown_response(download_file_name, Body::from_stream(stream))
}

async fn run_outcome(run: JoinHandle<crate::error::Result<Report>>) -> Result<Report, String> {
    match run.await {
        Ok(Ok(report)) => {
            info!("Run finished with {} answers", report.len());
            Ok(report)
        }
        Ok(Err(e)) => {
            error!("Run failed: {}", e);
            Err(e.to_string())
        }
        Err(e) => {
            error!("Run task aborted: {}", e);
            Err(format!("Run aborted: {}", e))
        }
    }
}

fn failure_trailer(message: &str) -> String {
    format!("\n{}\nAn error occurred: {}\n", RUN_FAILED_MARKER, message)
}

fn markdown_response(download_file_name: &str, body: Body) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_file_name),
            ),
        ],
        body,
    )
        .into_response()
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateForm, ApiError> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?
    {
        match field.name() {
            Some("api_key") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid API key field: {}", e)))?;
                form.api_key = Some(value);
            }
            Some("file") => {
                form.file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid upload: {}", e)))?;
                form.bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Validate a submitted form and build the pipeline and sources for a run.
fn prepare_run(
    settings: &Settings,
    form: GenerateForm,
) -> Result<(Pipeline, Vec<DocumentSource>), ApiError> {
    let api_key = form
        .api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Please enter your OpenAI API key"))?;
    let credential = ApiCredential::new(api_key)?;

    let bytes = form
        .bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::bad_request("Please upload a PDF file"))?;
    let file_name = form.file_name.unwrap_or_else(|| "upload.pdf".to_string());
    let is_pdf = std::path::Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ApiError::bad_request(format!("{} is not a PDF file", file_name)));
    }

    let mut sources = vec![DocumentSource::Upload { file_name, bytes }];
    for path in settings.shared_documents() {
        if !path.is_file() {
            return Err(DigestError::NotFound(path).into());
        }
        sources.push(DocumentSource::Path(path));
    }

    let pipeline = Pipeline::new(settings.clone(), &credential)?
        .with_fence_stripping(settings.interactive.strip_code_fences);

    Ok((pipeline, sources))
}

fn render_page(title: &str) -> String {
    PAGE_TEMPLATE
        .replace("{title}", &escape_html(title))
        .replace("{failed_marker}", RUN_FAILED_MARKER)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body { font-family: sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
  label { display: block; margin-top: 1rem; font-weight: bold; }
  input[type=password] { width: 100%; padding: 0.4rem; }
  button { margin-top: 1rem; padding: 0.5rem 1.5rem; }
  #status { margin-top: 1rem; color: #555; }
  #result {
    white-space: pre-wrap; background: #f6f6f6;
    padding: 1rem; border-radius: 4px; min-height: 4rem;
  }
  .error { color: #b00020; }
</style>
</head>
<body>
<h1>{title}</h1>
<form id="form">
  <label for="api_key">OpenAI API key</label>
  <input type="password" id="api_key" name="api_key" autocomplete="off">
  <label for="file">Upload a PDF</label>
  <input type="file" id="file" name="file" accept=".pdf,application/pdf">
  <button type="submit" id="generate">Generate</button>
</form>
<div id="status"></div>
<pre id="result"></pre>
<a id="download" style="display:none">Download results</a>
<script>
const form = document.getElementById("form");
const statusEl = document.getElementById("status");
const result = document.getElementById("result");
const download = document.getElementById("download");
const button = document.getElementById("generate");
const FAILED_MARKER = "{failed_marker}";

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  statusEl.textContent = "";
  statusEl.className = "";
  result.textContent = "";
  download.style.display = "none";

  if (!form.api_key.value.trim()) {
    statusEl.textContent = "Please enter your OpenAI API key.";
    statusEl.className = "error";
    return;
  }
  if (!form.file.files.length) {
    statusEl.textContent = "Please upload a PDF file.";
    statusEl.className = "error";
    return;
  }

  button.disabled = true;
  statusEl.textContent = "Processing...";
  try {
    const response = await fetch("/generate", { method: "POST", body: new FormData(form) });
    if (!response.ok) {
      const body = await response.json().catch(() => ({ error: response.statusText }));
      throw new Error(body.error);
    }
    const filename = (response.headers.get("Content-Disposition") || "")
      .match(/filename="([^"]+)"/);
    const reader = response.body.getReader();
    const decoder = new TextDecoder();
    let text = "";
    for (;;) {
      const { done, value } = await reader.read();
      if (done) break;
      text += decoder.decode(value, { stream: true });
      result.textContent = text.split(FAILED_MARKER)[0];
    }
    const failedAt = text.indexOf(FAILED_MARKER);
    if (failedAt >= 0) {
      result.textContent = text.slice(0, failedAt);
      throw new Error(text.slice(failedAt + FAILED_MARKER.length).trim()
        .replace(/^An error occurred: /, ""));
    }
    statusEl.textContent = "Done.";
    download.href = URL.createObjectURL(new Blob([text], { type: "text/markdown" }));
    download.download = filename ? filename[1] : "qa_results.md";
    download.style.display = "inline";
  } catch (err) {
    statusEl.textContent = "An error occurred: " + err.message;
    statusEl.className = "error";
    download.style.display = "none";
  } finally {
    button.disabled = false;
  }
});
</script>
</body>
</html>
"#;
