use catalog::Session;
use data::read_queries;
use futures_util::{stream::FuturesUnordered, StreamExt};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::prelude::*;

pub mod catalog;
pub mod data;
pub mod prelude;

#[tokio::main]
async fn main() {
    let file_appender = tracing_appender::rolling::hourly("logs", "stockhub_logs");
    let (file_writer, _file_guard) = tracing_appender::non_blocking(file_appender);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_line_number(true)
        .with_file(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(layer)
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    if std::env::args().any(|arg| arg == "--export") {
        run_export().await;
    } else {
        let mut session = Session::new();
        if let Err(err) = session.run().await {
            error!("Critical session error; err={:?}", err);
        }
    }
}

async fn run_export() {
    let queries = read_queries().await.expect("Failed to read queries");

    let mut threads = FuturesUnordered::new();
    for task in queries {
        let thread = tokio::spawn(async move { task.run().await });

        threads.push(thread);
    }

    while let Some(join_result) = threads.next().await {
        let task_result = match join_result {
            Ok(task_result) => task_result,
            Err(err) => {
                error!("Failed to start thread; err={:?}", err);
                continue;
            }
        };

        match task_result {
            Ok(_) => info!("Export finished successfully"),
            Err(err) => error!("Critical export error; err={:?}", err),
        }
    }
}
