use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the flag.
///
/// Logs go to stderr so the transcript on stdout stays readable. Quiet by
/// default: session-creation failures are reported at `error`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "salary_negotiator=debug,info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: a second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}
