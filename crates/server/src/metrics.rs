//! Prometheus metrics and their `/metrics` exposition.
//!
//! Cardinality gauges are overwritten with the latest backend truth
//! rather than incremented; cardinality is monotonic, so a racing stale
//! write can only ever be replaced by a larger value.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::USER_AGENT;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, Router};
use axum::Extension;
use muster_tracker::StatsUpdate;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

use crate::ServiceState;

#[derive(Clone, Debug)]
pub struct TrackerMetrics {
    unique_communities: Gauge,
    unique_peers: Gauge,
    requests_by_client: Family<ClientLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ClientLabels {
    user_agent: String,
}

impl TrackerMetrics {
    pub fn new(registry: &mut Registry) -> Self {
        let tracker_registry = registry.sub_registry_with_prefix("muster");

        let unique_communities = Gauge::default();
        tracker_registry.register(
            "unique_communities",
            "Distinct communities ever announced to this tracker",
            unique_communities.clone(),
        );

        let unique_peers = Gauge::default();
        tracker_registry.register(
            "unique_peers",
            "Distinct peers ever seen by this tracker",
            unique_peers.clone(),
        );

        let requests_by_client = Family::<ClientLabels, Counter>::default();
        tracker_registry.register(
            "requests_by_client",
            "API requests by client user agent",
            requests_by_client.clone(),
        );

        Self {
            unique_communities,
            unique_peers,
            requests_by_client,
        }
    }

    pub(crate) fn observe(&self, stats: &StatsUpdate) {
        if let Some(count) = stats.unique_communities {
            let _ = self.unique_communities.set(gauge_value(count));
        }

        if let Some(count) = stats.unique_peers {
            let _ = self.unique_peers.set(gauge_value(count));
        }
    }

    pub(crate) fn record_client_request(&self, user_agent: &str) {
        let _ = self
            .requests_by_client
            .get_or_create(&ClientLabels {
                user_agent: user_agent.to_owned(),
            })
            .inc();
    }
}

fn gauge_value(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Count every API request against its `User-Agent`.
pub(crate) async fn track_client(
    Extension(state): Extension<Arc<ServiceState>>,
    request: Request,
    next: Next,
) -> Response {
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    state.metrics.record_client_request(user_agent);

    next.run(request).await
}

struct MetricsState {
    registry: Registry,
}

pub(crate) fn service(registry: Registry) -> (&'static str, Router) {
    let path = "/metrics";

    let state = Arc::new(MetricsState { registry });
    let handler = get(handle_request).layer(Extension(Arc::clone(&state)));

    (path, Router::new().route("/", handler))
}

async fn handle_request(Extension(state): Extension<Arc<MetricsState>>) -> impl IntoResponse {
    let mut buffer = String::new();
    encode(&mut buffer, &state.registry).unwrap();
    buffer
}
