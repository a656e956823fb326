use spindle::config::Config;
use spindle::display::TerminalDisplay;
use spindle::Session;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the display surface; log to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();
    std::fs::create_dir_all(&config.scratch_dir)?;
    tracing::info!(
        "Spindle booting. Scratch: {}, {} Hz, threshold {}",
        config.scratch_dir.display(),
        config.sample_rate,
        config.silence_threshold
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received; shutting down");
            signal_token.cancel();
        }
    });

    // Start with a blank screen; the session renders as episodes resolve.
    let display = TerminalDisplay::stdout()?;
    let mut session = Session::new(config, display, shutdown);
    session.run().await
}
