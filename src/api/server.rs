// API server implementation using actix-web

use std::sync::Arc;

use crate::api::{middleware, routes, ApiState};
use crate::config::MirrorConfig;
use crate::store::StoreHandle;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

pub struct ApiServer {
    pub host: String,
    pub port: u16,
    pub max_results: i64,
}

impl ApiServer {
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            max_results: config.max_results,
        }
    }

    /// Serve queries against whatever `store` holds at request time.
    pub async fn run(self, store: Arc<StoreHandle>) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            max_results = self.max_results,
            games = store.snapshot().len(),
            "starting games mirror API server"
        );

        let state = web::Data::new(ApiState {
            store,
            max_results: self.max_results,
        });

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();

            App::new()
                .app_data(state.clone())
                .wrap(middleware::json_content_type())
                .wrap(compress)
                .wrap(logger)
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
