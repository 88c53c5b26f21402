//! Layout - Taffy flexbox for the OTP row.
//!
//! Tree shape, one node per box:
//!
//! ```text
//! screen  (terminal size, column, centered both ways)
//! └── container  (full width row, gap / padding / border from ContainerStyle)
//!     ├── cell 0  (fixed CellStyle size)
//!     ├── ...
//!     └── cell n-1
//! ```
//!
//! Taffy reports locations relative to the parent; [`compute_otp_layout`]
//! returns absolute terminal rectangles.

mod taffy_bridge;

pub use taffy_bridge::{compute_otp_layout, OtpLayout};
