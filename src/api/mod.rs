use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context as AnyhowContext, Result};
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    context::Context,
    rewards::{types::RewardResult, RewardAggregator},
    sync_duties::SyncDutiesResolver,
};

use self::{
    client_ip::{trace_request, TrustedProxy},
    error::ApiError,
    response::PrettyJson,
};

pub mod client_ip;
pub mod error;
pub mod response;

pub struct Config {
    pub address: String,
    pub trusted_proxies: Vec<TrustedProxy>,
}

#[derive(Debug, Clone)]
struct ApiState {
    reward_aggregator: RewardAggregator,
    sync_duties_resolver: SyncDutiesResolver,
}

pub fn router(context: Context, trusted_proxies: Arc<[TrustedProxy]>) -> Router {
    let state = ApiState {
        reward_aggregator: RewardAggregator::new(context.clone()),
        sync_duties_resolver: SyncDutiesResolver::new(context),
    };

    Router::new()
        .route("/blockreward/{slot}", get(block_reward))
        .route("/syncduties/{slot}", get(sync_duties))
        .with_state(state)
        .layer(middleware::from_fn_with_state(trusted_proxies, trace_request))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(context: Context, config: Config) -> Result<()> {
    let listener = TcpListener::bind(&config.address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.address))?;

    info!(address = %listener.local_addr()?, "Listening for requests");

    let app = router(context, config.trusted_proxies.into());

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .with_context(|| "HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(?error, "Failed to listen for shutdown signal");
    }

    info!("Shutting down");
}

async fn block_reward(
    State(state): State<ApiState>,
    Path(slot): Path<String>,
) -> Result<PrettyJson<RewardResult>, ApiError> {
    let reward = state.reward_aggregator.reward_for_slot(&slot).await?;

    Ok(PrettyJson(reward))
}

async fn sync_duties(
    State(state): State<ApiState>,
    Path(slot): Path<String>,
) -> Result<PrettyJson<Vec<String>>, ApiError> {
    let pubkeys = state.sync_duties_resolver.duties_for_slot(&slot).await?;

    Ok(PrettyJson(pubkeys))
}
