mod args;

use std::sync::Arc;

use clap::Parser;
use pubsend_core::app::or_cancelled;
use pubsend_core::impls::{FixedProject, GcloudProject, GcpTopicClient};
use pubsend_core::ports::ProjectResolver;
use pubsend_core::{PublishDriver, PublishError, PublishRequest};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, OutputFormat, normalize_args};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        if let Some(err) = e.downcast_ref::<PublishError>() {
            tracing::debug!(kind = ?err.kind(), index = ?err.message_index(), "failed");
        }
        let program = std::env::args().next().unwrap_or_else(|| "pubsend".into());
        eprintln!("{program}: {e}");
        std::process::exit(1);
    }
}

/// Silent unless `-v` or `RUST_LOG` asks for output; logs go to stderr.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pubsend=debug,pubsend_core=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Cancelled on Ctrl-C; in-flight publishes observe it.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received interrupt, cancelling");
            on_interrupt.cancel();
        }
    });
    token
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cancel = interrupt_token();

    let resolver: Box<dyn ProjectResolver> = match &cli.project {
        Some(project) => Box::new(FixedProject::new(project.clone())),
        None => Box::new(GcloudProject::new()),
    };
    let project = resolver.resolve(&cancel).await?;
    tracing::info!(%project, "project: {project}");

    let client = or_cancelled(&cancel, GcpTopicClient::connect(&project)).await?;
    let driver = PublishDriver::new(Arc::new(client), project, cli.dispatch_options());

    if cli.list {
        for name in driver.list_topics(&cancel).await? {
            println!("{name}");
        }
        return Ok(());
    }

    let request = PublishRequest::new(cli.topic, cli.data)?;
    let report = driver
        .publish(&request, tokio::io::stdin(), &cancel)
        .await?;

    match cli.output {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
    }
    Ok(())
}
