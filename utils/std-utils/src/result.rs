pub trait LogErr<T, E: std::error::Error> {
    /// Logs `Err` on error level and passes the result through untouched.
    /// In case of `Ok` nothing happens.
    fn log_err(self) -> Result<T, E>;
}

impl<T, E: std::error::Error> LogErr<T, E> for Result<T, E> {
    fn log_err(self) -> Result<T, E> {
        if let Err(e) = &self {
            match caller_frame() {
                Some(frame) => log::error!("Error at {}: {}", frame, e),
                None => log::error!("Error: {}", e),
            }
        }
        self
    }
}

/// Name of the innermost own symbol on the stack, stripped down to the
/// type path.
fn caller_frame() -> Option<String> {
    let mut found = None;
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if let Some(name) = symbol.name().map(|s| s.to_string()) {
                if name.starts_with("<fg") {
                    let name = name.trim_start_matches('<');
                    found = Some(name.split(" as ").next().unwrap_or(name).to_string());
                }
            }
        });
        found.is_none()
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_err_passes_result_through() {
        let ok: Result<u32, std::io::Error> = Ok(7);
        assert_eq!(ok.log_err().unwrap(), 7);

        let err: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(err.log_err().is_err());
    }
}
