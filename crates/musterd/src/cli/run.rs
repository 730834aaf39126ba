use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{Result as EyreResult, WrapErr};
use muster_server::config::{ServerConfig, DEFAULT_LISTEN};
use muster_server::start;
use muster_store::backend::RedisBackend;
use muster_store::key::{Keyspace, DEFAULT_PREFIX};
use muster_tracker::{Tracker, TrackerConfig, DEFAULT_ANNOUNCE_TTL, DEFAULT_PEER_LIMIT};
use tracing::info;

use super::endpoint_format::EndpointFormatArg;

/// Serve the tracker
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Address the API is served on
    #[arg(long, value_name = "ADDR", default_value_t = DEFAULT_LISTEN)]
    #[arg(env = "MUSTER_LISTEN")]
    pub listen: SocketAddr,

    /// Redis instance backing the tracker
    #[arg(long, value_name = "URL")]
    #[arg(env = "REDIS_URL", hide_env_values = true)]
    pub redis_url: String,

    /// Seconds an announce stays live without a refresh
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_ANNOUNCE_TTL.as_secs())]
    #[arg(env = "ANNOUNCE_TTL", value_parser = clap::value_parser!(u64).range(1..))]
    pub announce_ttl: u64,

    /// Most sibling peers returned from one announce
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_PEER_LIMIT)]
    #[arg(env = "PEER_LIMIT")]
    pub peer_limit: usize,

    /// Namespace prefixed to every Redis key
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_PREFIX)]
    #[arg(env = "MUSTER_KEY_PREFIX")]
    pub key_prefix: String,

    /// How peer endpoints are represented in listings
    #[arg(long, value_enum, default_value_t = EndpointFormatArg::Ip)]
    #[arg(env = "MUSTER_ENDPOINT_FORMAT")]
    pub endpoint_format: EndpointFormatArg,

    /// Scheme for url-formatted endpoints
    #[arg(long, value_name = "SCHEME", default_value = "https")]
    #[arg(env = "MUSTER_ENDPOINT_SCHEME")]
    pub endpoint_scheme: String,
}

impl RunCommand {
    pub async fn run(self) -> EyreResult<()> {
        let backend = RedisBackend::connect(&self.redis_url)
            .await
            .wrap_err("failed to connect to redis")?;

        info!("Connected to Redis, keys under '{}'", self.key_prefix);

        let tracker = Tracker::new(
            Arc::new(backend),
            Keyspace::new(&self.key_prefix),
            TrackerConfig {
                announce_ttl: Duration::from_secs(self.announce_ttl),
                peer_limit: self.peer_limit,
                endpoint_format: self.endpoint_format.into_format(self.endpoint_scheme),
            },
        );

        start(ServerConfig::new(self.listen), tracker).await
    }
}
