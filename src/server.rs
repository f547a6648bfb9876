//! HTTP routes.
//!
//! Handlers only pull inputs out of the request and hand them to
//! [`CloverBff`]; errors become a status code plus `{"detail": "..."}`.

use std::io;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bff::CloverBff;
use crate::error::{BffError, Result};
use crate::models::{
    Category, CloverMerchantId, ItemDetailRequest, ItemDetailResponse, MerchantInfo,
    MerchantItemsResponse, ModifierGroup, NewRecommendation, Page, Recommendation,
    RecommendationId, RecommendationUpdate, UserId,
};
use crate::storage::Storage;

/// Shared handler state.
type AppState<S> = State<Arc<CloverBff<S>>>;

/// Error body returned by every failing route.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable message.
    detail: String,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
struct Health {
    /// Always `"ok"`.
    status: &'static str,
}

/// JSON body extractor whose rejection is a [`BffError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(BffError))]
struct JsonBody<T>(
    /// Parsed body.
    T,
);

/// Path extractor whose rejection is a [`BffError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BffError))]
struct PathParam<T>(
    /// Parsed path parameter.
    T,
);

/// Query extractor whose rejection is a [`BffError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(BffError))]
struct QueryParams<T>(
    /// Parsed query string.
    T,
);

impl From<JsonRejection> for BffError {
    #[inline]
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for BffError {
    #[inline]
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for BffError {
    #[inline]
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for BffError {
    #[inline]
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the application router around a shared service.
#[inline]
pub fn router<S: Storage + 'static>(bff: Arc<CloverBff<S>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/items/details", post(item_details::<S>))
        .route("/merchants", get(list_merchants::<S>))
        .route("/merchants/{merchant_id}/items", get(merchant_items::<S>))
        .route(
            "/merchants/{merchant_id}/categories",
            get(merchant_categories::<S>),
        )
        .route(
            "/merchants/{merchant_id}/modifier-groups",
            get(modifier_groups::<S>),
        )
        .route(
            "/recommendations",
            post(create_recommendation::<S>).get(list_recommendations::<S>),
        )
        .route("/recommendations/{id}", get(get_recommendation::<S>))
        // `{id}` is the user id here; the router needs one name per position.
        .route(
            "/recommendations/{id}/recommendations",
            put(update_user_recommendation::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(bff)
}

/// Serves the router on `listener` until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener fails.
#[inline]
pub async fn serve<S: Storage + 'static>(
    listener: TcpListener,
    bff: Arc<CloverBff<S>>,
) -> io::Result<()> {
    let address = listener.local_addr()?;
    tracing::info!(%address, "server running");
    axum::serve(listener, router(bff))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server shut down");
    Ok(())
}

/// Resolves on the first shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
            core::future::pending::<()>().await;
        }
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                let _signal = stream.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// `GET /health`
async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// `POST /items/details`
async fn item_details<S: Storage>(
    State(bff): AppState<S>,
    JsonBody(request): JsonBody<ItemDetailRequest>,
) -> Result<Json<ItemDetailResponse>> {
    bff.item_details(request).await.map(Json)
}

/// `GET /merchants`
async fn list_merchants<S: Storage>(State(bff): AppState<S>) -> Result<Json<Vec<MerchantInfo>>> {
    bff.list_merchants().await.map(Json)
}

/// `GET /merchants/{merchant_id}/items`
async fn merchant_items<S: Storage>(
    State(bff): AppState<S>,
    PathParam(merchant_id): PathParam<CloverMerchantId>,
    QueryParams(page): QueryParams<Page>,
) -> Result<Json<MerchantItemsResponse>> {
    bff.merchant_items(merchant_id, page).await.map(Json)
}

/// `GET /merchants/{merchant_id}/categories`
async fn merchant_categories<S: Storage>(
    State(bff): AppState<S>,
    PathParam(merchant_id): PathParam<CloverMerchantId>,
) -> Result<Json<Vec<Category>>> {
    bff.merchant_categories(merchant_id).await.map(Json)
}

/// `GET /merchants/{merchant_id}/modifier-groups`
async fn modifier_groups<S: Storage>(
    State(bff): AppState<S>,
    PathParam(merchant_id): PathParam<CloverMerchantId>,
    QueryParams(page): QueryParams<Page>,
) -> Result<Json<Vec<ModifierGroup>>> {
    bff.modifier_groups(merchant_id, page).await.map(Json)
}

/// `POST /recommendations`
async fn create_recommendation<S: Storage>(
    State(bff): AppState<S>,
    JsonBody(recommendation): JsonBody<NewRecommendation>,
) -> Result<Json<Recommendation>> {
    bff.create_recommendation(recommendation).await.map(Json)
}

/// `GET /recommendations`
async fn list_recommendations<S: Storage>(
    State(bff): AppState<S>,
) -> Result<Json<Vec<Recommendation>>> {
    bff.recommendations().await.map(Json)
}

/// `GET /recommendations/{id}`
async fn get_recommendation<S: Storage>(
    State(bff): AppState<S>,
    PathParam(id): PathParam<RecommendationId>,
) -> Result<Json<Recommendation>> {
    bff.recommendation(id).await.map(Json)
}

/// `PUT /recommendations/{user_id}/recommendations`
async fn update_user_recommendation<S: Storage>(
    State(bff): AppState<S>,
    PathParam(user_id): PathParam<UserId>,
    JsonBody(update): JsonBody<RecommendationUpdate>,
) -> Result<Json<Recommendation>> {
    bff.update_user_recommendation(user_id, update)
        .await
        .map(Json)
}
