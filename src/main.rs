use actix_web::middleware::Compress;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{info, warn};

use rust_homework_review::config::AppConfig;
use rust_homework_review::models::AppStartTime;
use rust_homework_review::runtime::{lifetime, logging, server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    setup_panic!();

    let started = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    AppConfig::init().map_err(|e| std::io::Error::other(format!("Invalid configuration: {e}")))?;
    let config = AppConfig::get();
    let _log_guard = logging::init_tracing(config);

    warn!(
        "{} v{} ({}) starting",
        config.app.system_name,
        env!("CARGO_PKG_VERSION"),
        config.app.environment
    );

    let startup = lifetime::startup::prepare_server_startup().await?;
    info!(
        "Startup completed in {} ms, uploads stored in {}",
        chrono::Utc::now()
            .signed_duration_since(started.start_datetime)
            .num_milliseconds(),
        config.upload.dir
    );

    let mount = server::mount_api(startup.storage, started);
    let http = HttpServer::new(move || {
        App::new()
            .wrap(server::cors(config))
            .wrap(Compress::default())
            .wrap(server::default_headers(config))
            .configure(mount.clone())
    })
    .keep_alive(server::keep_alive(config))
    .client_request_timeout(std::time::Duration::from_millis(
        config.server.timeouts.client_request,
    ))
    .client_disconnect_timeout(std::time::Duration::from_millis(
        config.server.timeouts.client_disconnect,
    ))
    .workers(config.server.workers);

    #[cfg(unix)]
    let http = match config.unix_socket_path() {
        Some(socket_path) => {
            if std::path::Path::new(socket_path).exists() {
                std::fs::remove_file(socket_path)?;
            }
            warn!("Listening on Unix socket {}", socket_path);
            http.bind_uds(socket_path)?
        }
        None => {
            warn!("Listening on http://{}", config.server_bind_address());
            http.bind(config.server_bind_address())?
        }
    };

    #[cfg(not(unix))]
    let http = {
        warn!("Listening on http://{}", config.server_bind_address());
        http.bind(config.server_bind_address())?
    };

    let running = http.run();
    let handle = running.handle();

    tokio::select! {
        res = running => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            // 停止接收新请求，等待进行中的上传与批改请求完成
            handle.stop(true).await;
            warn!("Server stopped");
        }
    }

    Ok(())
}
