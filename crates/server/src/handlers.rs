use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use muster_server_primitives::{
    AnnounceRequest, AnnounceResponse, DeannounceRequest, DeannounceResponse, InfoResponse,
};
use serde::Serialize;
use tracing::error;

use crate::api::{ApiError, ApiResponse};
use crate::ServiceState;

pub(crate) async fn announce_handler(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(state): Extension<Arc<ServiceState>>,
    Json(request): Json<AnnounceRequest>,
) -> impl IntoResponse {
    let outcome = state
        .tracker
        .announce(
            &request.community_id,
            &request.peer_id,
            request.port,
            addr.ip(),
        )
        .await;

    match outcome {
        Ok(announcement) => {
            state.metrics.observe(&announcement.stats);

            ApiResponse {
                payload: AnnounceResponse {
                    ttl: announcement.ttl.as_secs(),
                    peers: announcement.peers,
                },
            }
            .into_response()
        }
        Err(err) => {
            error!(%err, community = %request.community_id, "announce failed");

            ApiError::from(err).into_response()
        }
    }
}

pub(crate) async fn deannounce_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Json(request): Json<DeannounceRequest>,
) -> impl IntoResponse {
    match state
        .tracker
        .deannounce(&request.community_id, &request.peer_id)
        .await
    {
        Ok(()) => ApiResponse {
            payload: DeannounceResponse::default(),
        }
        .into_response(),
        Err(err) => {
            error!(%err, community = %request.community_id, "deannounce failed");

            ApiError::from(err).into_response()
        }
    }
}

pub(crate) async fn info_handler() -> impl IntoResponse {
    ApiResponse {
        payload: InfoResponse {
            name: "muster".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        },
    }
    .into_response()
}

#[derive(Debug, Serialize)]
struct GetHealthResponse {
    data: HealthStatus,
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: String,
}

pub(crate) async fn health_check_handler() -> impl IntoResponse {
    ApiResponse {
        payload: GetHealthResponse {
            data: HealthStatus {
                status: "alive".to_owned(),
            },
        },
    }
    .into_response()
}
