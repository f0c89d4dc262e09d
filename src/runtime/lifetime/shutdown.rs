use tracing::{error, warn};

/// 等待 Ctrl+C，Unix 下同时监听 SIGTERM（容器停止时发送）
pub async fn listen_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = ctrl_c() => warn!("Ctrl+C received, shutting down"),
                    _ = terminate.recv() => warn!("SIGTERM received, shutting down"),
                }
                return;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    }

    ctrl_c().await;
    warn!("Ctrl+C received, shutting down");
}

// 无法监听时永不返回，服务继续运行
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
