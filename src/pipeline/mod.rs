//! Reactive Pipeline
//!
//! Connects a mounted OTP row to the terminal.
//!
//! # Pipeline Architecture
//!
//! ```text
//! slot signals + focus signal + terminal size → frame derived → render effect
//! ```
//!
//! 1. **frame derived** - Lays the row out with taffy and paints a FrameBuffer
//!    plus the hit grid. Pure: reads signals, returns data.
//! 2. **render effect** - Installs the hit grid and hands the buffer to the
//!    diff renderer. The only place with side effects.
//!
//! The event loop (`tick`) polls input, routes it, then runs due scheduler
//! tasks. Rendering follows from whatever signals those steps wrote.

pub mod frame;
pub mod mount;
pub mod terminal;

pub use frame::{create_frame_derived, render_frame, FrameResult};
pub use mount::{mount, run, tick, unmount, MountHandle};
pub use terminal::{set_terminal_size, terminal_height, terminal_width};
