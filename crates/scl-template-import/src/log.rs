/// Trait for structs that provide metadata for logging
pub trait LogMetadata {
    fn meta(&self) -> String;
}

/// Identifies the template and import cycle a log line belongs to.
pub struct ImportLogContext<'a> {
    pub template: &'a str,
    pub cycle: u32,
}

impl LogMetadata for ImportLogContext<'_> {
    fn meta(&self) -> String {
        format!("template={}, cycle={}", self.template, self.cycle)
    }
}

// =============================================
// Logging Macros (namespaced under crate::log)
// =============================================

// ===== scl_info! =====
macro_rules! scl_info {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::info!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== scl_warn! =====
macro_rules! scl_warn {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::warn!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== scl_debug! =====
macro_rules! scl_debug {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::debug!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== scl_trace! =====
macro_rules! scl_trace {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::trace!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// Re-export macros for use in other files
pub(crate) use scl_debug;
pub(crate) use scl_info;
pub(crate) use scl_trace;
pub(crate) use scl_warn;
