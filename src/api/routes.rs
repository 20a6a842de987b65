use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, Request, State, rejection::QueryRejection},
    http::{HeaderValue, Method, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, warn};

use crate::AppState;
use crate::api::models::{EnvCheckResponse, NewsQuery};
use crate::api::response;
use crate::error::AppError;
use crate::models::Continent;

pub fn create_router(app_state: AppState) -> Router {
    let origin = HeaderValue::from_str(&app_state.config.allowed_origin).unwrap_or_else(|_| {
        warn!(origin = %app_state.config.allowed_origin, "invalid allowed origin, refusing cross-origin reads");
        HeaderValue::from_static("null")
    });

    let news_route = any(news_handler)
        .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            origin,
        ))
        .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,OPTIONS"),
        ))
        .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ));

    Router::new()
        .route("/api/news", news_route)
        .route("/api/envcheck", get(envcheck_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        status = tracing::field::Empty,
                    )
                })
                .on_response(|res: &Response, latency: Duration, span: &Span| {
                    span.record("status", res.status().as_u16());
                    info!(status = res.status().as_u16(), latency = ?latency, "response");
                }),
        )
        .with_state(app_state)
}

async fn news_handler(
    method: Method,
    State(state): State<AppState>,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return response::preflight();
    }
    if method != Method::GET {
        return AppError::MethodNotAllowed.into_response();
    }

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection.into_response(),
    };

    let continent = match query.continent.as_deref() {
        None | Some("") => Continent::default(),
        Some(name) => match name.parse::<Continent>() {
            Ok(continent) => continent,
            Err(err) => return AppError::UnknownContinent(err.0).into_response(),
        },
    };

    match state.news.get_news(continent, query.refresh).await {
        Ok((payload, status)) => {
            info!(%continent, cache = %status, stories = payload.stories.len(), "served news");
            response::news(payload, status, &state.config.cache_control())
        }
        Err(err) => {
            warn!(%continent, error = %err, "news request failed");
            err.into_response()
        }
    }
}

async fn envcheck_handler(State(state): State<AppState>) -> Json<EnvCheckResponse> {
    let key = state.config.api_key.resolve();
    Json(EnvCheckResponse::from_key(key.as_deref()))
}
