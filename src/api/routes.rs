// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .service(
            web::scope("/Games")
                .route("/ByName", web::get().to(handlers::find_by_name))
                .route("/ByIds", web::get().to(handlers::find_by_ids)),
        );
}
