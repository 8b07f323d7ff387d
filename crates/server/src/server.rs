use axum::{
    Router,
    routing::{get, post},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{donations, forum, fundraisers, people};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn health() -> &'static str {
    "Bazaar fundraiser API is running"
}

/// Builds the application router over `engine`.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/", get(health))
        .route(
            "/fundraiser",
            post(fundraisers::fundraiser_new).get(fundraisers::list),
        )
        .route("/fundraiser/{id}", get(fundraisers::detail))
        .route("/fundraiser/{id}/summary", get(fundraisers::summary))
        .route("/donation", post(donations::donation_new))
        .route("/person", post(people::person_new).get(people::list))
        .route("/person/{id}", get(people::get))
        .route("/forum-topic", post(forum::topic_new).get(forum::topics))
        .route(
            "/forum-question",
            post(forum::question_new).get(forum::questions),
        )
        .route("/forum-question/{id}/details", get(forum::question_details))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
