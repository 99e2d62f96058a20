use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Installs a logger printing to stderr with at least the given level. `RUST_LOG`
/// overrides the level if set. Calling it a second time has no effect.
pub fn build_logger_for_level(level: LevelFilter) {
    let _ = Builder::new()
        .filter_level(level)
        .parse_env(Env::default())
        .format(|buf, record| {
            writeln!(
                buf,
                "[{:>5} {:>8.3}s] {}",
                record.level(),
                seconds_since_start(),
                record.args()
            )
        })
        .is_test(cfg!(test))
        .try_init();
}

/// Each `-v` on the command line raises `base` by one level
pub fn build_logger_for_verbosity(base: LevelFilter, verbosity: usize) {
    let levels = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];

    let index = levels.iter().position(|&l| l == base).unwrap_or(2) + verbosity;
    build_logger_for_level(levels[index.min(levels.len() - 1)]);
}

fn seconds_since_start() -> f64 {
    use std::{sync::OnceLock, time::Instant};
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}
