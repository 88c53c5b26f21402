//! Engine - Component registry.
//!
//! Components are NOT objects. They are indices with a small record each:
//!
//! ```text
//! Index 0: OtpInput  (parent=None, focusable=false)
//! Index 1: DigitCell (parent=0,    focusable=true, tab_index=0)
//! Index 2: DigitCell (parent=0,    focusable=true, tab_index=1)
//! ```
//!
//! The focus system, keyboard registry and mouse hit grid all speak in these
//! indices, so a digit cell is addressable without a pointer back to its row.

mod registry;

pub use registry::*;
