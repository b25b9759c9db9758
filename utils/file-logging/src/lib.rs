use anyhow::Result;
use chrono::{DateTime, Local};
use flexi_logger::{
    style, AdaptiveFormat, Age, Cleanup, Criterion, DeferredNow, Duplicate, Logger, Naming, Record,
};
use std::path::Path;

pub use flexi_logger::LoggerHandle;

// local time with milliseconds, eg. 2025-11-03T07:56:22.348+02:00
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

const ROTATE_SIZE_BYTES: u64 = 1024 * 1024 * 1024;
const KEEP_COMPRESSED_LOGS: usize = 10;

fn timestamp(now: &mut DeferredNow) -> String {
    DateTime::<Local>::from(*now.now())
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn log_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "[{} {:5} {}] {}",
        timestamp(now),
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}

fn log_format_color(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let dimmed = yansi::Color::Fixed(247);
    write!(
        w,
        "[{} {:5} {}] {}",
        dimmed.paint(timestamp(now)),
        style(record.level(), record.level()),
        dimmed.paint(record.module_path().unwrap_or("<unnamed>")),
        record.args()
    )
}

/// Starts the process-wide logger. With a `log_dir` everything is also
/// written to files rotated daily or at 1 GiB, keeping the last ten
/// compressed rotations. `RUST_LOG` overrides both `default_level` and
/// `module_overrides`; `force_debug` bumps the default level only.
pub fn start_logger(
    default_level: &str,
    log_dir: Option<&Path>,
    module_overrides: &str,
    force_debug: bool,
) -> Result<LoggerHandle> {
    let level = if force_debug { "debug" } else { default_level };
    let spec = format!("{},{}", module_overrides, level);

    let mut logger = Logger::with_env_or_str(spec).format(log_format);
    if let Some(log_dir) = log_dir {
        logger = logger
            .log_to_file()
            .directory(log_dir)
            .rotate(
                Criterion::AgeOrSize(Age::Day, ROTATE_SIZE_BYTES),
                Naming::Timestamps,
                Cleanup::KeepLogAndCompressedFiles(1, KEEP_COMPRESSED_LOGS),
            )
            .print_message()
            .duplicate_to_stderr(Duplicate::All);
    }

    Ok(logger
        .adaptive_format_for_stderr(AdaptiveFormat::Custom(log_format, log_format_color))
        .set_palette("9;11;2;7;8".to_string())
        .start()?)
}
