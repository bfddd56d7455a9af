use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Installs the global subscriber writing to a non-blocking stdout.
///
/// The returned guard flushes buffered lines when dropped, so keep it alive
/// for the whole lifetime of `main`.
pub fn logging_stdout() -> impl Drop {
    logging_stdout_with(&[])
}

/// Same as [`logging_stdout`], with extra directives appended after the
/// default level, e.g. `"sqlx=warn"` to silence per-query logs.
pub fn logging_stdout_with(directives: &[&str]) -> impl Drop {
    let (nonblocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let mut filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    for directive in directives {
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("ignoring log directive {directive:?}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(nonblocking)
                .with_file(cfg!(debug_assertions))
                .with_line_number(cfg!(debug_assertions)),
        )
        .with(filter)
        .init();

    guard
}
