//! Boundary logging macros
//!
//! `apply` and `delete` each emit one `start` event followed by exactly one
//! `end` or `end_error`. Extra fields follow the `tracing` field syntax.

/// Log that a boundary operation started
///
/// ```
/// # use gmlx_core::log_op_start;
/// log_op_start!("apply");
/// log_op_start!("apply", command_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_START,
            $($($field)+)?
        )
    };
}

/// Log that a boundary operation finished
///
/// ```
/// # use gmlx_core::log_op_end;
/// log_op_end!("delete", duration_ms = 0u64, removed = 4usize);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// Log that a boundary operation failed, tagged with the error's stable code
///
/// `$err` is anything convertible into [`crate::errors::ExError`].
///
/// ```
/// # use gmlx_core::{log_op_error, ModelError};
/// let err = ModelError::InvalidConfig { message: "bad".to_string() };
/// log_op_error!("apply", err, duration_ms = 1u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let failure: $crate::errors::ExError = ::std::convert::Into::into($err);
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?failure.kind(),
            err_code = failure.code(),
            $($($field)+)?
        )
    }};
}
