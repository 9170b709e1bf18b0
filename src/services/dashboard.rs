use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Poll, Vote};
use crate::utils::datetime::format_timestamp;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub backend: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

/// Per-poll summary row for the index page and `/api/polls`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PollSummary {
    pub id: i64,
    pub question: String,
    pub schedule: String,
    pub active: bool,
    pub total_votes: i64,
    pub last_sent: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptionCount {
    pub label: String,
    pub votes: i64,
}

/// Full aggregated results for one poll.
#[derive(Debug, Serialize, Deserialize)]
pub struct PollResults {
    pub id: i64,
    pub question: String,
    pub active: bool,
    pub options: Vec<OptionCount>,
    pub total_votes: i64,
    pub last_sent: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub timezone: FixedOffset,
    pub start_time: DateTime<Utc>,
}

pub struct DashboardService {
    pub router: Router,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseManager>, timezone: FixedOffset) -> Self {
        let state = AppState {
            db,
            timezone,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/", get(index_page))
            .route("/polls/:id", get(poll_page))
            .route("/api/polls", get(api_polls))
            .route("/api/polls/:id", get(api_poll))
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();

    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let response_time_ms = start.elapsed().as_millis() as u64;
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    let health_response = HealthResponse {
        status: db_status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: db_status.to_string(),
            backend: state.db.backend_name().to_string(),
            connection_pool_size: state.db.pool_size(),
            response_time_ms,
        },
        uptime_seconds: uptime,
    };

    if db_status == "healthy" {
        Ok(Json(health_response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match state.db.ping().await {
        Ok(_) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}

async fn summarize(state: &AppState, poll: &Poll) -> anyhow::Result<PollSummary> {
    let counts = Vote::counts_by_option(&state.db, poll.id).await?;
    let total_votes = counts.iter().map(|(_, votes)| votes).sum();

    Ok(PollSummary {
        id: poll.id,
        question: poll.question.clone(),
        schedule: poll
            .schedule()
            .map(|s| s.describe())
            .unwrap_or_else(|_| "unscheduled".to_string()),
        active: poll.active,
        total_votes,
        last_sent: (poll.last_sent > 0)
            .then(|| format_timestamp(poll.last_sent, &state.timezone)),
    })
}

async fn aggregate(state: &AppState, poll: &Poll) -> anyhow::Result<PollResults> {
    let labels = poll.option_list()?;
    let counts = Vote::counts_by_option(&state.db, poll.id).await?;

    let mut options: Vec<OptionCount> = labels
        .into_iter()
        .map(|label| OptionCount { label, votes: 0 })
        .collect();
    for (index, votes) in counts {
        if let Some(slot) = options.get_mut(index as usize) {
            slot.votes = votes;
        }
    }
    let total_votes = options.iter().map(|o| o.votes).sum();

    Ok(PollResults {
        id: poll.id,
        question: poll.question.clone(),
        active: poll.active,
        options,
        total_votes,
        last_sent: (poll.last_sent > 0)
            .then(|| format_timestamp(poll.last_sent, &state.timezone)),
    })
}

async fn api_polls(State(state): State<AppState>) -> Result<Json<Vec<PollSummary>>, StatusCode> {
    let polls = Poll::list_all(&state.db).await.map_err(|e| {
        tracing::error!("Dashboard failed to list polls: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut summaries = Vec::with_capacity(polls.len());
    for poll in &polls {
        let summary = summarize(&state, poll).await.map_err(|e| {
            tracing::error!("Dashboard failed to summarize poll {}: {}", poll.id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        summaries.push(summary);
    }

    Ok(Json(summaries))
}

async fn api_poll(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PollResults>, StatusCode> {
    let poll = Poll::find_by_id(&state.db, id)
        .await
        .map_err(|e| {
            tracing::error!("Dashboard failed to load poll {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let results = aggregate(&state, &poll).await.map_err(|e| {
        tracing::error!("Dashboard failed to aggregate poll {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(results))
}

const PAGE_STYLE: &str = "body{font-family:sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem;color:#222}\
table{border-collapse:collapse;width:100%}td,th{text-align:left;padding:.4rem .6rem;border-bottom:1px solid #ddd}\
.bar{background:#4a90d9;height:1.1rem;border-radius:2px}.muted{color:#888}a{color:#2a6ebb}";

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>",
        html_escape::encode_text(title),
        PAGE_STYLE,
        body
    ))
}

async fn index_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let polls = Poll::list_all(&state.db).await.map_err(|e| {
        tracing::error!("Dashboard failed to list polls: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut body = String::from("<h1>Polls</h1>");
    if polls.is_empty() {
        body.push_str("<p class=\"muted\">No polls yet.</p>");
    } else {
        body.push_str(
            "<table><tr><th>Poll</th><th>Schedule</th><th>Status</th><th>Votes</th><th>Last sent</th></tr>",
        );
        for poll in &polls {
            let summary = summarize(&state, poll).await.map_err(|e| {
                tracing::error!("Dashboard failed to summarize poll {}: {}", poll.id, e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            body.push_str(&format!(
                "<tr><td><a href=\"/polls/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                summary.id,
                html_escape::encode_text(&summary.question),
                html_escape::encode_text(&summary.schedule),
                if summary.active { "active" } else { "paused" },
                summary.total_votes,
                summary.last_sent.as_deref().unwrap_or("never"),
            ));
        }
        body.push_str("</table>");
    }

    Ok(page("Polls", &body))
}

async fn poll_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, StatusCode> {
    let poll = Poll::find_by_id(&state.db, id)
        .await
        .map_err(|e| {
            tracing::error!("Dashboard failed to load poll {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let results = aggregate(&state, &poll).await.map_err(|e| {
        tracing::error!("Dashboard failed to aggregate poll {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut body = format!(
        "<p><a href=\"/\">&larr; all polls</a></p><h1>{}</h1><p class=\"muted\">{} &middot; last sent: {}</p><table>",
        html_escape::encode_text(&results.question),
        if results.active { "active" } else { "paused" },
        results.last_sent.as_deref().unwrap_or("never"),
    );

    for option in &results.options {
        let percent = if results.total_votes > 0 {
            option.votes * 100 / results.total_votes
        } else {
            0
        };
        body.push_str(&format!(
            "<tr><td>{}</td><td style=\"width:50%\"><div class=\"bar\" style=\"width:{}%\"></div></td><td>{} ({}%)</td></tr>",
            html_escape::encode_text(&option.label),
            percent,
            option.votes,
            percent,
        ));
    }

    body.push_str(&format!(
        "</table><p>Total votes: {}</p>",
        results.total_votes
    ));

    Ok(page(&results.question, &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use tempfile::TempDir;

    async fn create_test_dashboard() -> (DashboardService, Arc<DatabaseManager>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite:{}", db_path.display());

        let db = DatabaseManager::new(&db_url)
            .await
            .expect("Failed to create test database");
        db.run_migrations()
            .await
            .expect("Failed to run migrations");
        let db = Arc::new(db);

        let tz = FixedOffset::east_opt(0).expect("valid offset");
        (DashboardService::new(db.clone(), tz), db, temp_dir)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (dashboard, _db, _temp_dir) = create_test_dashboard().await;
        let server = TestServer::new(dashboard.router).expect("Failed to create test server");

        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let health_response: HealthResponse = response.json();
        assert_eq!(health_response.status, "healthy");
        assert_eq!(health_response.database.status, "healthy");
        assert_eq!(health_response.database.backend, "sqlite");
        assert_eq!(health_response.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_readiness_and_liveness_endpoints() {
        let (dashboard, _db, _temp_dir) = create_test_dashboard().await;
        let server = TestServer::new(dashboard.router).expect("Failed to create test server");

        let ready = server.get("/health/ready").await;
        assert_eq!(ready.status_code(), StatusCode::OK);
        let ready_body: String = ready.json();
        assert_eq!(ready_body, "ready");

        let live = server.get("/health/live").await;
        assert_eq!(live.status_code(), StatusCode::OK);
        let live_body: String = live.json();
        assert_eq!(live_body, "alive");
    }

    #[tokio::test]
    async fn test_api_poll_not_found() {
        let (dashboard, _db, _temp_dir) = create_test_dashboard().await;
        let server = TestServer::new(dashboard.router).expect("Failed to create test server");

        let response = server.get("/api/polls/42").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
