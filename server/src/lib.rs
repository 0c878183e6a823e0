use anyhow::Result;
use axum::{extract::{Path, State}, routing::get, Json, Router};
use filmrec_core::persist::{load_snapshot_if_fresh, save_snapshot, timestamp_now, IndexPaths, MetaFile};
use filmrec_core::queries::{self, ActorStats, DirectedFilm, TitleScore, VotesOutcome};
use filmrec_core::{Catalog, Error, Recommender, Tokenizer};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;

use config::Config;
use error::{AppError, AppResult};

pub const NOT_IN_CATALOG: &str = "Este título no se encuentra";
pub const BELOW_MIN_VOTES: &str = "La película no cumple con los requisitos mínimos de votos";

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub timeout: Duration,
}

impl AppState {
    pub fn new(recommender: Recommender, timeout: Duration) -> Self {
        Self { recommender: Arc::new(recommender), timeout }
    }

    fn catalog(&self) -> &Catalog {
        self.recommender.catalog()
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    #[serde(rename = "Películas recomendadas")]
    pub titles: Vec<String>,
}

#[derive(Serialize)]
pub struct MonthCountResponse {
    pub mes: String,
    pub cantidad: usize,
}

#[derive(Serialize)]
pub struct DayCountResponse {
    pub dia: String,
    pub cantidad: usize,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub titulo: String,
    #[serde(rename = "año")]
    pub anio: Option<i32>,
    pub score: Option<f64>,
}

impl From<TitleScore> for ScoreResponse {
    fn from(s: TitleScore) -> Self {
        Self { titulo: s.title, anio: s.release_year, score: s.vote_average }
    }
}

#[derive(Serialize)]
pub struct ActorResponse {
    pub actor: String,
    pub cantidad_filmaciones: usize,
    pub retorno_total: f64,
    pub retorno_promedio: f64,
}

impl From<ActorStats> for ActorResponse {
    fn from(s: ActorStats) -> Self {
        Self {
            actor: s.actor,
            cantidad_filmaciones: s.films,
            retorno_total: s.total_return,
            retorno_promedio: s.average_return,
        }
    }
}

#[derive(Serialize)]
pub struct DirectorResponse {
    pub director: String,
    pub peliculas: Vec<DirectedFilm>,
}

/// Loads the catalog and prepares the recommender, reusing a fresh snapshot when one exists.
pub fn load_recommender(config: &Config) -> Result<Recommender> {
    let catalog = Arc::new(Catalog::load(&config.dataset)?);
    let recommender = Recommender::new(Arc::clone(&catalog))
        .with_tokenizer(Tokenizer::with_stemming(config.stem))
        .with_weighting(config.weighting())
        .with_top_k(config.top_k);

    let Some(dir) = &config.index else {
        recommender.index();
        return Ok(recommender);
    };

    let paths = IndexPaths::new(dir);
    if let Some((index, meta)) = load_snapshot_if_fresh(&paths, catalog.fingerprint())? {
        if meta.stemming != config.stem {
            tracing::info!(snapshot = meta.stemming, configured = config.stem, "snapshot tokenizer differs, rebuilding");
        } else if meta.weighting != recommender.weighting() {
            tracing::info!(snapshot = ?meta.weighting, configured = ?recommender.weighting(), "snapshot weighting differs, rebuilding");
        } else {
            tracing::info!(root = %dir.display(), created_at = %meta.created_at, "using index snapshot");
            return Ok(recommender.with_index(index)?);
        }
    }

    let index = recommender.index();
    let meta = MetaFile::describe(&index, catalog.fingerprint(), timestamp_now());
    save_snapshot(&paths, &index, &meta)?;
    Ok(recommender)
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/cantidad_filmaciones_mes/:mes", get(month_handler))
        .route("/cantidad_filmaciones_dia/:dia", get(day_handler))
        .route("/score_titulo/:titulo", get(score_handler))
        .route("/votos_titulo/:titulo", get(votes_handler))
        .route("/get_actor/:nombre_actor", get(actor_handler))
        .route("/get_director/:nombre_director", get(director_handler))
        .route("/recomendacion/:titulo", get(recommend_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "Mensaje": "Welcome to the Movie API" }))
}

pub async fn month_handler(State(state): State<AppState>, Path(mes): Path<String>) -> AppResult<Json<MonthCountResponse>> {
    let cantidad = queries::count_by_month(state.catalog(), &mes)?;
    Ok(Json(MonthCountResponse { mes, cantidad }))
}

pub async fn day_handler(State(state): State<AppState>, Path(dia): Path<String>) -> AppResult<Json<DayCountResponse>> {
    let cantidad = queries::count_by_weekday(state.catalog(), &dia)?;
    Ok(Json(DayCountResponse { dia, cantidad }))
}

pub async fn score_handler(State(state): State<AppState>, Path(titulo): Path<String>) -> AppResult<Json<ScoreResponse>> {
    Ok(Json(queries::score_by_title(state.catalog(), &titulo)?.into()))
}

pub async fn votes_handler(State(state): State<AppState>, Path(titulo): Path<String>) -> AppResult<Json<Value>> {
    let body = match queries::votes_by_title(state.catalog(), &titulo)? {
        VotesOutcome::BelowThreshold => json!({ "mensaje": BELOW_MIN_VOTES }),
        VotesOutcome::Qualified(v) => json!({
            "titulo": v.title,
            "año": v.release_year,
            "votos": v.vote_count,
            "promedio_votos": v.vote_average,
        }),
    };
    Ok(Json(body))
}

pub async fn actor_handler(State(state): State<AppState>, Path(nombre_actor): Path<String>) -> AppResult<Json<ActorResponse>> {
    Ok(Json(queries::actor_stats(state.catalog(), &nombre_actor)?.into()))
}

pub async fn director_handler(State(state): State<AppState>, Path(nombre_director): Path<String>) -> AppResult<Json<DirectorResponse>> {
    let peliculas = queries::director_films(state.catalog(), &nombre_director)?;
    Ok(Json(DirectorResponse { director: nombre_director, peliculas }))
}

/// Runs `work` on the blocking pool. An expired `limit` or a panicked task is a computation error;
/// on timeout the task itself still runs to completion.
pub async fn run_bounded<T, F>(limit: Duration, work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);
    let joined = tokio::time::timeout(limit, task)
        .await
        .map_err(|_| AppError::Computation(format!("recommendation timed out after {} ms", limit.as_millis())))?;
    joined.map_err(|e| AppError::Computation(format!("recommendation task failed: {e}")))
}

pub async fn recommend_handler(State(state): State<AppState>, Path(titulo): Path<String>) -> AppResult<Json<RecommendResponse>> {
    let start = std::time::Instant::now();
    let recommender = Arc::clone(&state.recommender);
    let title = titulo.clone();
    let outcome = run_bounded(state.timeout, move || recommender.recommend(&title)).await?;

    match outcome {
        Ok(titles) => {
            tracing::info!(title = %titulo, results = titles.len(), took_ms = start.elapsed().as_millis() as u64, "recommendation served");
            Ok(Json(RecommendResponse { titles }))
        }
        Err(Error::NotFound(_)) => {
            tracing::debug!(title = %titulo, "recommendation for unknown title");
            Err(AppError::NotFound(NOT_IN_CATALOG.into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_work_returns_its_value() {
        let out = run_bounded(Duration::from_secs(5), || 40 + 2).await.unwrap();
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn slow_work_times_out() {
        let err = run_bounded(Duration::from_millis(10), || std::thread::sleep(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "computation");
        assert!(err.to_string().contains("timed out after 10 ms"), "{err}");
    }

    #[tokio::test]
    async fn panicking_work_is_a_computation_error() {
        let err = run_bounded(Duration::from_secs(5), || -> usize { panic!("ranking blew up") })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "computation");
        assert!(err.to_string().contains("task failed"), "{err}");
    }
}
