//! Structured logging for gmlx
//!
//! Only batch boundaries log at info level: `apply` and `delete` emit
//! `start` and `end`/`end_error` through [`log_op_start!`],
//! [`log_op_end!`] and [`log_op_error!`]. Single-record mutations are
//! silent, and every dispatched chain emits one debug event carrying its
//! batch ID and length.
//!
//! Binaries call [`init`] once; tests call [`init_test_capture`] and assert
//! on the captured events.
//!
//! ```rust
//! use gmlx_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```
//!
//! [`log_op_start!`]: crate::log_op_start
//! [`log_op_end!`]: crate::log_op_end
//! [`log_op_error!`]: crate::log_op_error

pub mod init;
pub mod macros;
pub mod test_capture;

pub use gmlx_core_types::schema;
pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
