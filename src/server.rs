//! HTTP routes over the query functions.

use crate::catalog::Catalog;
use crate::query::{
    ActorReport, DirectorReport, actor_aggregate, director_aggregate, films_by_release_month,
    films_by_release_weekday, score_by_title, votes_by_title,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{debug, info};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

pub type AppState = Arc<Catalog>;

pub fn router(catalog: AppState) -> Router {
    Router::new()
        .route("/cantidad_filmaciones_mes/{mes}", get(cantidad_filmaciones_mes))
        .route("/cantidad_filmaciones_dia/{dia}", get(cantidad_filmaciones_dia))
        .route("/score_titulo/{titulo}", get(score_titulo))
        .route("/votos_titulo/{titulo}", get(votos_titulo))
        .route("/get_actor/{nombre_actor}", get(get_actor))
        .route("/get_director/{nombre_director}", get(get_director))
        .with_state(catalog)
}

/// Binds `addr` and serves until the listener fails.
pub async fn serve(addr: &str, catalog: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Serving {} films on http://{}", catalog.film_count(), addr);
    axum::serve(listener, router(catalog)).await
}

async fn cantidad_filmaciones_mes(
    State(catalog): State<AppState>,
    Path(mes): Path<String>,
) -> Response {
    debug!("cantidad_filmaciones_mes: {}", mes);
    match films_by_release_month(&catalog, &mes) {
        Ok(count) => Json(count.message()).into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": err.to_string() })),
        )
            .into_response(),
    }
}

async fn cantidad_filmaciones_dia(
    State(catalog): State<AppState>,
    Path(dia): Path<String>,
) -> Json<String> {
    debug!("cantidad_filmaciones_dia: {}", dia);
    Json(films_by_release_weekday(&catalog, &dia).message())
}

async fn score_titulo(State(catalog): State<AppState>, Path(titulo): Path<String>) -> Json<String> {
    debug!("score_titulo: {}", titulo);
    Json(score_by_title(&catalog, &titulo).message())
}

async fn votos_titulo(State(catalog): State<AppState>, Path(titulo): Path<String>) -> Json<String> {
    debug!("votos_titulo: {}", titulo);
    Json(votes_by_title(&catalog, &titulo).message())
}

async fn get_actor(
    State(catalog): State<AppState>,
    Path(nombre_actor): Path<String>,
) -> Response {
    debug!("get_actor: {}", nombre_actor);
    match actor_aggregate(&catalog, &nombre_actor) {
        ActorReport::Found(summary) => Json(summary).into_response(),
        report @ ActorReport::NotFound(_) => Json(report.message()).into_response(),
    }
}

async fn get_director(
    State(catalog): State<AppState>,
    Path(nombre_director): Path<String>,
) -> Response {
    debug!("get_director: {}", nombre_director);
    match director_aggregate(&catalog, &nombre_director) {
        DirectorReport::Found(summary) => Json(summary).into_response(),
        report @ DirectorReport::NotFound(_) => Json(report.message()).into_response(),
    }
}
