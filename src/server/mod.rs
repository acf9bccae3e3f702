//! HTTP surface: the suggest endpoint, its preflight and a health check.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use tracing::info;
use warp::{Filter, Reply};

use crate::{
    config::Config,
    error::{AgentError, Result},
    routing::TripPlanner,
};

pub mod handlers;
pub mod middleware;

pub fn routes(
    planner: Arc<TripPlanner>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let suggest = warp::path!("api" / "ai" / "suggest")
        .and(warp::post())
        .and(middleware::body_limit())
        .and(warp::body::bytes())
        .and(with_planner(planner))
        .and_then(handlers::handle_suggest);

    let preflight = warp::path!("api" / "ai" / "suggest")
        .and(warp::options())
        .map(handlers::preflight);

    let health = warp::path!("health")
        .and(warp::get())
        .map(handlers::health);

    suggest
        .or(preflight)
        .or(health)
        .with(middleware::allow_any_origin())
        .with(warp::log("wego::server"))
        .recover(handlers::handle_rejection)
}

fn with_planner(
    planner: Arc<TripPlanner>,
) -> impl Filter<Extract = (Arc<TripPlanner>,), Error = Infallible> + Clone {
    warp::any().map(move || planner.clone())
}

/// Build the planner from `config` and serve until the process is stopped.
pub async fn serve(config: &Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| {
            AgentError::Config(format!(
                "invalid listen address {}:{}: {e}",
                config.host, config.port
            ))
        })?;

    let planner = Arc::new(TripPlanner::from_config(config)?);
    let models = planner.models();
    info!(
        target: "wego::server",
        %addr,
        fast_model = %models.fast.model,
        accurate_model = %models.accurate.model,
        "trip planner listening"
    );

    warp::serve(routes(planner)).run(addr).await;
    Ok(())
}
