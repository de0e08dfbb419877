//! Runs a local HTTP server that answers queries.
//!
//! `GET /api/v1/query?q=SELECT ...` returns `{"rows": [...]}`, or a 400 with `{"error": "..."}`.
use super::data_dir;
use crate::args::DataParams;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rusty_select::source::{CachedSource, CsvDirectory};
use rusty_select::{QueryExecutor, Row};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Builder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

type SharedExecutor = Arc<QueryExecutor<CachedSource<CsvDirectory>>>;

#[derive(Deserialize)]
struct QueryParams {
    q: String,
}

#[derive(Serialize)]
struct QueryResponse {
    rows: Vec<Row>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn run(data: DataParams, bind: String) -> Result<(), rusty_select::Error> {
    if let Err(error) = tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish())
    {
        eprintln!("Cannot set up logging: {error}");
    }

    let executor: SharedExecutor = Arc::new(QueryExecutor::new(CachedSource::new(
        CsvDirectory::new(data_dir(data)?),
    )));

    // We're using single threaded runtime because that's enough for a server which
    // I expect to be called a handful of times per second.
    let tokio = Builder::new_current_thread().enable_io().build()?;

    let app = Router::new()
        .route("/api/v1/query", get(query))
        .with_state(executor)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET]),
        );

    tokio.block_on(async {
        let listener = tokio::net::TcpListener::bind(&bind).await?;
        info!("listening on {}", bind);

        axum::serve(listener, app).await?;

        Ok::<(), rusty_select::Error>(())
    })
}

async fn query(
    State(executor): State<SharedExecutor>,
    Query(params): Query<QueryParams>,
) -> Response {
    info!("query: {}", params.q);

    match executor.execute(&params.q).await {
        Ok(rows) => Json(QueryResponse { rows }).into_response(),
        Err(error) => {
            warn!("query failed: {}", error);

            let error = ErrorResponse {
                error: error.to_string(),
            };
            (StatusCode::BAD_REQUEST, Json(error)).into_response()
        }
    }
}
