use std::fs;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use tokio::time::Duration;

use pdfquiz::config::CONFIG;
use pdfquiz::inference_server::InferenceServer;
use pdfquiz::model::{MiniLmEmbedder, T5Generator};
use pdfquiz::session_server::SessionServer;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = CONFIG.clone();
    fs::create_dir_all(&config.upload.dir)?;

    // 模型只在启动时加载一次
    let generator = T5Generator::from_hub(&config.models)?;
    let embedder = MiniLmEmbedder::from_hub(&config.models.embedder)?;
    let (inference_server, inference) = InferenceServer::new(Box::new(generator), Box::new(embedder));
    inference_server.spawn()?;

    let (session_server, sessions) = SessionServer::new(Duration::from_secs(config.quiz.session_ttl_secs));
    actix_web::rt::spawn(async move {
        if let Err(e) = session_server.run().await {
            log::error!("会话服务意外退出: {e}");
        }
    });

    let bind = config.server.bind.clone();
    let config = web::Data::new(config);
    let inference = web::Data::new(inference);
    let sessions = web::Data::new(sessions);

    log::info!("HTTP服务启动于 {bind}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(inference.clone())
            .app_data(sessions.clone())
            .configure(pdfquiz::routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
