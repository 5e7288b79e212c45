//! `skyscan` -- terminal front-end for the aerial detection service.
//!
//! Uploads imagery, pages through images, detection results and alerts,
//! acknowledges alerts and prints aggregate statistics.
//!
//! # Environment variables
//!
//! | Variable                       | Default                     | Description                     |
//! |--------------------------------|-----------------------------|---------------------------------|
//! | `SKYSCAN_API_URL`              | `http://localhost:5000/api` | Backend base URL                |
//! | `SKYSCAN_REQUEST_TIMEOUT_SECS` | `30`                        | Upper bound on every request    |
//! | `SKYSCAN_DETAIL_CONCURRENCY`   | `10`                        | Parallel detail fetches         |
//! | `RUST_LOG`                     | `skyscan_cli=info,...`      | Log filter                      |

mod args;
mod commands;
mod render;

use clap::Parser;
use skyscan_client::{ClientConfig, Dashboard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Args, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyscan_cli=info,skyscan_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = args.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    tracing::debug!(
        api_url = %config.api_url,
        timeout_secs = config.request_timeout.as_secs(),
        detail_concurrency = config.detail_concurrency,
        "Loaded configuration",
    );

    let dashboard = Dashboard::connect(&config)?;

    let result = match args.command {
        Command::Health => commands::health(&dashboard).await,
        Command::ModelInfo => commands::model_info(&dashboard).await,
        Command::Upload { file } => commands::upload(&dashboard, &file).await,
        Command::Gallery { page, image } => commands::gallery(&dashboard, page, image).await,
        Command::Results { page } => commands::results(&dashboard, page).await,
        Command::Alerts {
            page,
            severity,
            status,
        } => {
            commands::alerts(
                &dashboard,
                page,
                severity.map(Into::into),
                status.map(Into::into),
            )
            .await
        }
        Command::Ack { id } => commands::acknowledge(&dashboard, id).await,
        Command::Stats => commands::stats(&dashboard).await,
        Command::Detections { page, class } => {
            commands::detections(&dashboard, page, class.as_deref()).await
        }
    };

    dashboard.shutdown();
    result
}
