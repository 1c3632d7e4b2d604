mod cli;
use cli::{parse_cli_options, run, USAGE};

fn main() {
    setup_logging();

    let options = match parse_cli_options(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{USAGE}");
            return;
        }
    };

    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        tracing::error!("mealplan-calendar failed: {:#}", e);
        std::process::exit(1);
    }
}

fn setup_logging() {
    let log_dir = mealplan_calendar::storage::config::app_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "mealplan-calendar.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("mealplan-calendar started");
}
