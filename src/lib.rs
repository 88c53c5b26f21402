//! # spark-otp
//!
//! Segmented one-time-passcode input for reactive terminal UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! An OTP row is N single-character digit cells sharing one code. Cells are
//! indices in a component registry; the row owns all state and the cells only
//! read it. Each slot has its own signal, so a keystroke re-renders one cell.
//!
//! ```text
//! key event → digit cell → OtpController → code + slot signals → frame derived → render effect
//!                                        ↘ focus move → focus system / scheduler
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use spark_otp::{otp_input, OtpConfig, OtpInputProps};
//! use spark_otp::pipeline::mount;
//!
//! let props = OtpInputProps::new(OtpConfig::new(6).with_auto_focus(true))
//!     .on_change(|code| tracing::info!(code, "otp changed"));
//! let otp = otp_input(props)?;
//!
//! let handle = mount::mount(&otp)?;
//! mount::run(&handle)?;
//! handle.unmount();
//! otp.unmount();
//! ```
//!
//! ## Modules
//!
//! - [`primitives`] - The OTP row, digit cells and the controller state machine
//! - [`config`] - `OtpConfig` and style types
//! - [`state`] - Focus, keyboard, mouse, input and the task scheduler
//! - [`layout`] - Taffy flexbox for the row
//! - [`renderer`] - Frame buffer and diff renderer
//! - [`pipeline`] - Frame derived and the mount loop
//! - [`engine`] - Component registry

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{CellStyle, ContainerStyle, FocusTiming, OtpConfig, DEFAULT_LENGTH, DEFAULT_MASK_CHAR};
pub use error::{OtpError, Result};

pub use engine::{get_allocated_indices, get_id, get_index, is_allocated, reset_registry};

pub use layout::{compute_otp_layout, OtpLayout};

pub use renderer::{DiffRenderer, FrameBuffer};

pub use pipeline::{mount, render_frame, run, tick, unmount, FrameResult, MountHandle};

pub use primitives::{
    otp_input, CellView, Cleanup, Code, OtpController, OtpEvent, OtpInput, OtpInputProps,
    Rejection, Transition,
};

pub use state::{
    // Focus
    blur, focus, focus_next, focus_previous, get_focused_index, is_focused,
    // Keyboard / input
    InputEvent, KeyState, KeyboardEvent, Modifiers,
};
