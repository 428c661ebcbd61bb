use std::path::Path;

pub const LOG_FILE_BASENAME: &str = "daily-checklist";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 10;
pub const LOG_ENV_VAR: &str = "DAILY_CHECKLIST_LOG";

/// Log files live next to the data slots.
pub fn log_directory(data_dir: &Path) -> &Path {
    data_dir
}

/// `DAILY_CHECKLIST_LOG`, then `RUST_LOG`, then a build-dependent default.
pub fn log_spec(app_var: Option<String>, rust_log: Option<String>) -> String {
    let default_spec = if cfg!(debug_assertions) {
        "warn,daily_checklist_lib=debug"
    } else {
        "warn,daily_checklist_lib=info"
    };
    app_var
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

#[cfg(all(feature = "app", not(test)))]
pub fn init_logging(data_dir: &Path) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    std::fs::create_dir_all(data_dir)?;

    let spec = log_spec(
        std::env::var(LOG_ENV_VAR).ok(),
        std::env::var("RUST_LOG").ok(),
    );

    let handle = Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(log_directory(data_dir))
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stderr(if cfg!(debug_assertions) {
            Duplicate::Info
        } else {
            Duplicate::Warn
        })
        .start()?;

    install_panic_hook();

    log::info!(
        "logger initialized dir={} rotate_size_bytes={} keep_files={}",
        log_directory(data_dir).display(),
        LOG_ROTATE_SIZE_BYTES,
        LOG_ROTATE_KEEP_FILES
    );
    Ok(handle)
}

#[cfg(all(feature = "app", not(test)))]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");
        let location = info
            .location()
            .map(|loc| format!("{loc}"))
            .unwrap_or_else(|| "<unknown>".to_string());
        let backtrace = std::backtrace::Backtrace::force_capture();

        log::error!("panic: payload={payload} location={location}\nbacktrace:\n{backtrace}");
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_variable_wins_then_rust_log_then_default() {
        assert_eq!(
            log_spec(Some("debug".to_string()), Some("trace".to_string())),
            "debug"
        );
        assert_eq!(log_spec(Some("  ".to_string()), Some("trace".to_string())), "trace");
        assert!(log_spec(None, None).starts_with("warn,daily_checklist_lib="));
    }

    #[test]
    fn logs_share_the_data_directory() {
        let dir = Path::new("/tmp/daily-checklist");
        assert_eq!(log_directory(dir), dir);
    }
}
