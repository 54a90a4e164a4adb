//! Pokemon manager server binary.
//!
//! Reads its configuration from the environment (optionally through a `.env` file), then serves the
//! endpoints of the [`pokemon_manager`] lib crate over HTTP. See `README.md` for the variables.

use actix_web::{web, HttpResponse, HttpServer, Responder};
use anyhow::Context;
use env_logger::Env;
use log::info;
use pokemon_manager::db::get_pool;
use pokemon_manager::error::EnvVarError;
use pokemon_manager::helpers::env::{int_env_var, load_optional_dotenv, optional_env_var};
use pokemon_manager::pokemon_app;
use pokemon_manager::service_env::ServiceEnv;
use pokemon_manager::storage::get_image_storage;
use rustc_version_runtime::version;
use serde::Serialize;

/// Bind address used when `HTTP_ADDR` is not set.
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1";

/// Port used when `HTTP_PORT` is not set.
const DEFAULT_HTTP_PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let env_file_loaded = load_optional_dotenv()?;

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if !env_file_loaded {
        info!("No .env file; using process environment only");
    }

    let http_addr = get_http_addr()?;
    let http_port = get_http_port()?;

    let pool = get_pool().context("failed to create DB connection pool")?;
    let storage = get_image_storage().context("failed to prepare image storage")?;
    info!("Storing Pokemon images in {}", storage.images_dir().display());

    let server =
        HttpServer::new(move || pokemon_app!(pool, storage).route("/", web::get().to(hello)))
            .bind((http_addr.as_str(), http_port))
            .with_context(|| format!("failed to bind to {}:{}", http_addr, http_port))?
            .run();

    let service_env = ServiceEnv::current();
    info!("Pokemon manager listening on {}:{} ({})", http_addr, http_port, service_env);
    info!("Built with Rust {}", version());
    if service_env.is_development() {
        info!("Backtraces in error responses: {}", backtrace_support());
    }

    Ok(server.await?)
}

/// Address to bind to, from `HTTP_ADDR`. Containers need `0.0.0.0`.
fn get_http_addr() -> anyhow::Result<String> {
    let http_addr = optional_env_var("HTTP_ADDR").context("invalid HTTP_ADDR")?;

    Ok(http_addr.unwrap_or_else(|| DEFAULT_HTTP_ADDR.into()))
}

/// Port to listen on, from `HTTP_PORT`.
fn get_http_port() -> anyhow::Result<u16> {
    match int_env_var("HTTP_PORT") {
        Ok(port) => Ok(port),
        Err(EnvVarError::NotFound) => Ok(DEFAULT_HTTP_PORT),
        Err(err) => Err(err).context("invalid HTTP_PORT"),
    }
}

fn backtrace_support() -> &'static str {
    #[cfg(backtrace_support)]
    match std::backtrace::Backtrace::capture().status() {
        std::backtrace::BacktraceStatus::Captured => "captured",
        std::backtrace::BacktraceStatus::Disabled => "disabled (set RUST_BACKTRACE)",
        std::backtrace::BacktraceStatus::Unsupported => "unsupported on this platform",
        _ => "unknown",
    }

    #[cfg(not(backtrace_support))]
    "unavailable (requires a nightly toolchain)"
}

/// `GET /`: a static message, usable as a healthcheck.
async fn hello() -> impl Responder {
    HttpResponse::Ok().json(Hello { message: "Hello from the Pokemon manager!" })
}

#[derive(Debug, Serialize)]
struct Hello {
    message: &'static str,
}
