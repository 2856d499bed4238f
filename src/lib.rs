use actix_web::web;

pub mod config;
pub mod error;
pub mod extractor;
pub mod inference_server;
pub mod model;
pub mod session_server;
pub mod structs;
pub mod utils;

mod service;

use service::{pages, quiz, resources, upload};

/// 注册所有路由，各handler所需的数据由调用方通过app_data提供:
/// `Config`、`InferenceServerHandle`、`SessionServerHandle`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::index))
        .route("/", web::post().to(upload::upload))
        .route("/submit", web::post().to(quiz::submit))
        .route("/resources/{filename}", web::get().to(resources::resources))
        .service(web::scope("/api").route("/session/{token}", web::get().to(quiz::get_session)));
}
