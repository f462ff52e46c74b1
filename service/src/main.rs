use intake_common::util::state::Settings;
use provider_intake::build_router;
use provider_intake::state::ServiceCollection;
use std::env;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Could not init tracing.");

    let defaults = Settings::default();
    let settings = Settings {
        port: get_number("PORT", defaults.port),
        data_dir: get_data_dir(),
        parallelism: get_positive("PARALLELISM", defaults.parallelism),
        queue_capacity: get_positive("QUEUE_CAPACITY", defaults.queue_capacity),
        upload_rate_per_minute: get_rate("UPLOAD_RATE_PER_MINUTE", defaults.upload_rate_per_minute),
        status_rate_per_minute: get_rate("STATUS_RATE_PER_MINUTE", defaults.status_rate_per_minute),
        max_upload_bytes: get_positive("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        keep_uploads: get_keep_uploads(),
        validator_url: get_validator_url(),
        request_timeout: Duration::from_secs(get_positive("REQUEST_TIMEOUT_SECONDS", defaults.request_timeout.as_secs())),
    };
    let port = settings.port;

    let services = ServiceCollection::build(settings).await.expect("Could not build services.");
    let app = build_router(services);

    let addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
    info!("listening on {}", &addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error.");
    info!("Server shutdown complete");
}

fn get_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name).map(|value| value.parse::<T>()) {
        Ok(Ok(value)) => value,
        _ => default,
    }
}

fn get_positive<T: std::str::FromStr + PartialOrd + Default + Copy>(name: &str, default: T) -> T {
    let value = get_number(name, default);
    if value > T::default() {
        value
    } else {
        default
    }
}

fn get_rate(name: &str, default: NonZeroU32) -> NonZeroU32 {
    get_number(name, default)
}

fn get_data_dir() -> PathBuf {
    env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

fn get_keep_uploads() -> bool {
    matches!(env::var("KEEP_UPLOADS").map(|value| value.to_ascii_lowercase()).as_deref(), Ok("1" | "true" | "yes"))
}

fn get_validator_url() -> Option<String> {
    env::var("VALIDATOR_URL").ok().filter(|url| !url.trim().is_empty())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
