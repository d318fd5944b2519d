//! Thin process entrypoint: initialize tracing, delegate to [`ptwatch_app::run`].

use std::process;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(error) = ptwatch_app::run().await {
        tracing::error!(%error, "fatal error");
        process::exit(error.exit_code());
    }
}
