use cymatics_lab::app;
use cymatics_lab::cli::Opts;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let opts = Opts::parse();
    if let Err(e) = app::run(&opts) {
        error!("{e}");
        std::process::exit(1);
    }
}
