//! Widget configuration.
//!
//! `OtpConfig` is fixed for the lifetime of a mounted widget. Styles are
//! passthrough: the controller never reads them, every cell view carries them.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{OtpError, Result};
use crate::types::{Attr, BorderStyle, JustifyContent, Rgba};

/// Default number of slots.
pub const DEFAULT_LENGTH: usize = 6;

/// Default character shown in place of each digit when `secure` is set.
pub const DEFAULT_MASK_CHAR: char = '•';

// =============================================================================
// Focus timing
// =============================================================================

/// When the auto-advance focus move happens after a digit is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FocusTiming {
    /// Move focus inside the same event turn.
    #[default]
    Immediate,
    /// Move focus once the current turn has finished and `delay` has passed.
    Deferred(Duration),
}

// =============================================================================
// Styles
// =============================================================================

/// Visual overrides for every digit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CellStyle {
    /// Outer width including border.
    pub width: u16,
    /// Outer height including border.
    pub height: u16,
    pub fg: Rgba,
    pub bg: Rgba,
    pub attrs: Attr,
    pub border: BorderStyle,
    pub border_color: Rgba,
    pub focused_border_color: Rgba,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            width: 5,
            height: 3,
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
            attrs: Attr::BOLD,
            border: BorderStyle::Rounded,
            border_color: Rgba::LIGHT_GRAY,
            focused_border_color: Rgba::WHITE,
        }
    }
}

impl CellStyle {
    /// Check that the border leaves room for one character.
    pub fn validate(&self) -> Result<()> {
        let (top, right, bottom, left) = self.border.insets();
        if self.width <= left + right || self.height <= top + bottom {
            return Err(OtpError::InvalidCellSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Visual overrides for the row holding the cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ContainerStyle {
    /// Columns between neighbouring cells.
    pub gap: u16,
    pub padding: u16,
    pub justify: JustifyContent,
    pub border: BorderStyle,
    pub border_color: Rgba,
    pub bg: Rgba,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self {
            gap: 1,
            padding: 0,
            justify: JustifyContent::Center,
            border: BorderStyle::None,
            border_color: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
        }
    }
}

// =============================================================================
// OtpConfig
// =============================================================================

/// Construction parameters for an OTP widget.
///
/// ```
/// use spark_otp::config::OtpConfig;
/// use spark_otp::types::Rgba;
///
/// let config = OtpConfig::new(4).with_secure(true).with_cursor_color(Rgba::BLUE);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.length, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct OtpConfig {
    /// Number of slots.
    pub length: usize,
    /// Mask every displayed digit.
    pub secure: bool,
    pub mask_char: char,
    pub container_style: ContainerStyle,
    pub input_style: CellStyle,
    pub cursor_color: Rgba,
    /// Drop non-digit keystrokes in the cell, like a numeric keypad would.
    pub numeric_keyboard: bool,
    pub advance_timing: FocusTiming,
    /// Focus the first slot on creation.
    pub auto_focus: bool,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            secure: false,
            mask_char: DEFAULT_MASK_CHAR,
            container_style: ContainerStyle::default(),
            input_style: CellStyle::default(),
            cursor_color: Rgba::WHITE,
            numeric_keyboard: true,
            advance_timing: FocusTiming::Immediate,
            auto_focus: false,
        }
    }
}

impl OtpConfig {
    /// Config with `length` slots and defaults for everything else.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    pub fn with_container_style(mut self, style: ContainerStyle) -> Self {
        self.container_style = style;
        self
    }

    pub fn with_input_style(mut self, style: CellStyle) -> Self {
        self.input_style = style;
        self
    }

    pub fn with_cursor_color(mut self, color: Rgba) -> Self {
        self.cursor_color = color;
        self
    }

    /// Set the cursor color from a color string (`"blue"`, `"#00f"`).
    pub fn with_cursor_color_str(mut self, color: &str) -> Result<Self> {
        self.cursor_color =
            Rgba::parse(color).ok_or_else(|| OtpError::InvalidColor(color.to_string()))?;
        Ok(self)
    }

    pub fn with_numeric_keyboard(mut self, numeric: bool) -> Self {
        self.numeric_keyboard = numeric;
        self
    }

    pub fn with_advance_timing(mut self, timing: FocusTiming) -> Self {
        self.advance_timing = timing;
        self
    }

    pub fn with_auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }

    /// Reject configurations the widget cannot render.
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            return Err(OtpError::InvalidLength(self.length));
        }
        self.input_style.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
