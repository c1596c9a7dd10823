mod config;
mod error;
mod inspect;
mod listing;
mod models;
mod paths;
mod upload;

use std::io::ErrorKind::AlreadyExists;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::Extension,
    http::StatusCode,
    response::Html,
    routing::{get, get_service, post},
    Router,
};
use dotenv::dotenv;
use log::info;
use tokio::fs;
use tower_http::services::ServeDir;

use crate::config::Config;

async fn get_root() -> Html<String> {
    // handler for GET /, the upload form page
    Html(upload::form_page(""))
}

async fn run(app: Router<Body>, addr: SocketAddr) {
    // runs the webserver
    let server = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to await for SIGINT")
        });

    info!("listening on http://{}", addr);
    server.await.expect("Failed to start server");
}

#[tokio::main]
async fn main() {
    drop(dotenv());
    env_logger::init();

    let cfg = Arc::new(Config::load());

    fs::create_dir(&cfg.serve_root)
        .await
        .unwrap_or_else(|err| {
            match err.kind() {
                AlreadyExists => (),
                _ => panic!("{:?}", err),
            }
        });

    let addr = cfg.socket_addr();
    let app: Router<Body> = Router::new()
        .route("/", get(get_root))
        .route("/upload", post(upload::post_upload))
        .route("/inspect", get(inspect::get_inspect))
        .fallback(get_service(ServeDir::new(&cfg.serve_root))
            .handle_error(|err| async move {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to serve files: {}", err),
                )
            })
        )
        .layer(Extension(Arc::clone(&cfg)));

    info!(
        "serving root '{}' ({:?} path mode)",
        cfg.serve_root.display(),
        cfg.path_mode
    );
    run(app, addr).await;
}
