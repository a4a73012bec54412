//! Player Name Entry
//!
//! Upper-cased, length-capped text buffer fed one key at a time from the
//! on-screen keyboard or a physical one.

use serde::{Deserialize, Serialize};

/// A key from a keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameKey {
    /// Printable character.
    Char(char),
    /// Delete the last character.
    Backspace,
    /// Submit the name.
    Submit,
}

/// Where a key came from. Only the on-screen keyboard is debounced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Touchscreen keyboard.
    #[default]
    Virtual,
    /// USB keyboard.
    Physical,
}

/// Name being typed.
#[derive(Debug, Clone)]
pub struct NameBuffer {
    text: String,
    max_len: usize,
}

impl NameBuffer {
    /// Empty buffer holding at most `max_len` characters.
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::new(),
            max_len,
        }
    }

    /// Append `c` upper-cased. Control characters and anything past the
    /// length cap are dropped silently. Returns whether the buffer changed.
    pub fn push(&mut self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        let upper: String = c.to_uppercase().collect();
        if self.len() + upper.chars().count() > self.max_len {
            return false;
        }
        self.text.push_str(&upper);
        true
    }

    /// Remove the last character. Returns whether the buffer changed.
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Current text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Nothing typed yet.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Trimmed name, or `None` when only whitespace was typed.
    pub fn submittable(&self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
