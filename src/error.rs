//! Error types.
//!
//! Rejected keystrokes are not errors: the controller drops them silently.
//! This enum covers configuration mistakes and terminal host failures.

use thiserror::Error;

/// Errors produced by configuration, layout and the terminal host.
#[derive(Debug, Error)]
pub enum OtpError {
    /// The widget needs at least one slot.
    #[error("otp length must be at least 1, got {0}")]
    InvalidLength(usize),

    /// A cell is too small to hold its border plus one character.
    #[error("cell {width}x{height} cannot fit a character inside its border")]
    InvalidCellSize { width: u16, height: u16 },

    /// A color string did not parse.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// Taffy rejected the layout tree.
    #[error("layout failed: {0}")]
    Layout(#[from] taffy::TaffyError),

    /// Terminal I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, OtpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            OtpError::InvalidLength(0).to_string(),
            "otp length must be at least 1, got 0"
        );
        assert_eq!(
            OtpError::InvalidCellSize { width: 2, height: 1 }.to_string(),
            "cell 2x1 cannot fit a character inside its border"
        );
        assert_eq!(
            OtpError::InvalidColor("nope".into()).to_string(),
            "invalid color: \"nope\""
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::other("tty gone");
        let err: OtpError = io.into();
        assert!(matches!(err, OtpError::Io(_)));
        assert_eq!(err.to_string(), "tty gone");
    }
}
