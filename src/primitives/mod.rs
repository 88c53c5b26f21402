//! OTP Primitives - Component building blocks.
//!
//! - [`otp_input`] - A row of digit cells sharing one code
//! - [`digit_cell`] - One focusable slot; stateless, reports events upward
//! - [`OtpController`] - The pure state machine the row runs on
//! - [`Code`] - Left-filled digit slots
//!
//! # Architecture
//!
//! Components are indices in the registry. Each component:
//! 1. Allocates an index
//! 2. Registers its keyboard and focus handlers against that index
//! 3. Returns a cleanup function (or a handle that owns one)
//!
//! Data flows one way:
//!
//! ```text
//! key event → digit cell → OtpController → code + slot signals → cell views
//!                                        ↘ focus move → focus system / scheduler
//! ```

mod code;
mod controller;
mod digit_cell;
mod otp_input;
mod types;

pub use code::{is_slot_text, Code, Rejection};
pub use controller::{FocusMove, OtpController, OtpEvent, Transition};
pub use digit_cell::{digit_cell, CellView};
pub use otp_input::{otp_input, OtpInput};
pub use types::*;
