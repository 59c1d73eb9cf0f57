use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::downloader::{self, ExportError};
use crate::error::{AppError, Envelope};
use crate::registration::{FieldErrors, Registration};
use crate::render::{ADMIN_TITLE, AdminView, FormView, Notice, Renderer};
use crate::row::Row;
use crate::sheet::{SheetClient, WriteOutcome};
use crate::table::{AdminTable, TableFilter};

pub struct AppState {
    config: Config,
    sheet: SheetClient,
    renderer: Renderer,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(AppState {
            sheet: SheetClient::new(config.sheet_url.clone()),
            renderer: Renderer::new()?,
            config,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct TableQuery {
    q: Option<String>,
    date: Option<String>,
}

impl TableQuery {
    fn filter(&self) -> TableFilter {
        TableFilter::from_params(self.q.as_deref(), self.date.as_deref())
    }
}

#[derive(Serialize)]
struct RowsResponse {
    result: &'static str,
    headers: Vec<String>,
    count: usize,
    rows: Vec<Row>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/", get(serve_form).post(submit_form))
        .route("/api/submit", post(proxy_submit))
        .route("/api/rows", get(get_rows))
        .route("/admin", get(serve_admin))
        .route("/admin/export", get(export_csv))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.sheet_url.is_none() {
        warn!("GOOGLE_SHEET_WEB_APP_URL is not set: submissions will fail and the admin table will be empty");
    }

    let address = config.bind_address.clone();
    let app = router(Arc::new(AppState::new(config)?));

    let listener = TcpListener::bind(&address).await?;
    info!("Listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Send a payload to the sheet, mapping every non-success to an error.
/// Both the HTML form and `/api/submit` go through here.
async fn forward<T: Serialize + ?Sized>(sheet: &SheetClient, payload: &T) -> Result<(), AppError> {
    match sheet.append(payload).await? {
        WriteOutcome::Confirmed | WriteOutcome::Inferred { .. } => Ok(()),
        WriteOutcome::Rejected { body, .. } => Err(AppError::RemoteRejected(body)),
    }
}

async fn serve_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let view = FormView::new(Registration::default(), FieldErrors::default(), None);
    Ok(Html(state.renderer.form(&view)?))
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(registration): Form<Registration>,
) -> Result<Response, AppError> {
    let payload = match registration.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            let view = FormView::new(registration, errors, None);
            let html = state.renderer.form(&view)?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    match forward(&state.sheet, &payload).await {
        Ok(()) => {
            info!("Registration submitted");
            let view = FormView::new(
                Registration::default(),
                FieldErrors::default(),
                Some(Notice::submitted()),
            );
            Ok(Html(state.renderer.form(&view)?).into_response())
        }
        Err(e) => {
            error!("Submission failed: {e}");
            let view = FormView::new(registration, FieldErrors::default(), Some(Notice::submit_failed()));
            let html = state.renderer.form(&view)?;
            Ok((StatusCode::BAD_GATEWAY, Html(html)).into_response())
        }
    }
}

/// Forward an arbitrary JSON body to the sheet
///
/// The body is not schema-checked. Anything that goes wrong, including an
/// unparseable body, comes back as `{"result":"error","error":...}` with a 500.
async fn proxy_submit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Envelope>, AppError> {
    let payload: serde_json::Value = serde_json::from_slice(&body)?;

    forward(&state.sheet, &payload).await?;

    Ok(Json(Envelope::success()))
}

async fn load_table(state: &AppState) -> AdminTable {
    AdminTable::new(state.sheet.fetch_rows().await, state.config.display_offset)
}

fn admin_view(table: &AdminTable, filter: &TableFilter, notice: Option<Notice>) -> AdminView {
    let headers = table.headers();
    let filtered = table.filter(filter);
    let date = filter
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    AdminView {
        page_title: ADMIN_TITLE,
        rows: filtered
            .iter()
            .map(|row| table.cells(row, &headers))
            .collect(),
        colspan: headers.len(),
        headers,
        export_href: format!(
            "/admin/export?q={}&date={}",
            urlencoding::encode(&filter.search),
            urlencoding::encode(&date)
        ),
        search: filter.search.clone(),
        date,
        filtered: filter.is_active(),
        total: table.rows().len(),
        shown: filtered.len(),
        notice,
    }
}

async fn serve_admin(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>, AppError> {
    let table = load_table(&state).await;
    let view = admin_view(&table, &query.filter(), None);

    Ok(Html(state.renderer.admin(&view)?))
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Result<Response, AppError> {
    let table = load_table(&state).await;
    let filter = query.filter();
    let headers = table.headers();
    let rows = table.filter(&filter);
    let now = Utc::now().with_timezone(&state.config.display_offset);

    match downloader::export(&state.config.export_prefix, &now, &headers, &rows) {
        Ok(file) => {
            info!("Exporting {} rows as {}", rows.len(), file.filename);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file.filename),
                    ),
                ],
                file.content,
            )
                .into_response())
        }
        Err(ExportError::NothingToExport) => {
            warn!("Export refused: no rows match the current filter");
            let view = admin_view(&table, &filter, Some(Notice::nothing_to_export()));
            Ok(Html(state.renderer.admin(&view)?).into_response())
        }
    }
}

async fn get_rows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Json<RowsResponse> {
    let table = load_table(&state).await;
    let rows: Vec<Row> = table.filter(&query.filter()).into_iter().cloned().collect();

    Json(RowsResponse {
        result: "success",
        headers: table.headers(),
        count: rows.len(),
        rows,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
