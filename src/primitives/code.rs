//! Code - the canonical value behind an OTP row.
//!
//! Stored as the string of filled slots. Slot `i` holds `digits[i]` when
//! `i < len()` and is empty otherwise, so no filled slot can follow an empty
//! one. Clearing a slot removes its digit and later digits shift left.

use std::fmt;

/// Why a text change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Text was neither empty nor exactly one ASCII digit.
    NotADigit,
    /// The slot before the target is still empty.
    PreviousSlotEmpty,
    /// The slot index is past the end of the row.
    OutOfRange,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADigit => f.write_str("not a single digit"),
            Self::PreviousSlotEmpty => f.write_str("previous slot is empty"),
            Self::OutOfRange => f.write_str("slot out of range"),
        }
    }
}

/// Empty or exactly one ASCII digit.
pub fn is_slot_text(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (None, _) => true,
        (Some(c), None) => c.is_ascii_digit(),
        _ => false,
    }
}

/// A fixed number of digit slots filled left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    length: usize,
    digits: String,
}

impl Code {
    /// An empty code with `length` slots.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            digits: String::with_capacity(length),
        }
    }

    /// Total number of slots.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.digits.len() == self.length
    }

    /// Index of the first empty slot, or `length` when every slot is filled.
    pub fn first_empty(&self) -> usize {
        self.digits.len()
    }

    /// Digit held by slot `index`.
    pub fn slot(&self, index: usize) -> Option<char> {
        self.digits.as_bytes().get(index).map(|&b| char::from(b))
    }

    /// The joined code.
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Write `text` into slot `index`; empty text clears the slot.
    pub fn set_slot(&mut self, index: usize, text: &str) -> Result<(), Rejection> {
        if !is_slot_text(text) {
            return Err(Rejection::NotADigit);
        }
        if index >= self.length {
            return Err(Rejection::OutOfRange);
        }
        if index > 0 && self.slot(index - 1).is_none() {
            return Err(Rejection::PreviousSlotEmpty);
        }

        if text.is_empty() {
            self.clear_slot(index);
        } else if index < self.digits.len() {
            self.digits.replace_range(index..index + 1, text);
        } else {
            self.digits.push_str(text);
        }
        Ok(())
    }

    /// Empty slot `index`. Returns false if it was already empty.
    pub fn clear_slot(&mut self, index: usize) -> bool {
        if index < self.digits.len() {
            self.digits.remove(index);
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}
