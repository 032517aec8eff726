//! Token Estimation and Budget Tracking
//!
//! Provides a conservative character-based token estimate for LLM context
//! management. The estimate is a budget signal, not an exact count.
//!
//! ## Strategy
//! - Estimate `ceil(chars / 4)` for any text
//! - Track a running total against a ceiling before admitting more content
//! - Truncate individual files to a character budget before aggregation

use tracing::debug;

use crate::constants::budget::{CHARS_PER_TOKEN, TRUNCATION_MARKER};
use crate::types::RepoFile;

/// Estimate token count for a string: `ceil(chars / 4)`
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Sum of per-file estimates over file contents
pub fn estimate_files_tokens(files: &[RepoFile]) -> usize {
    files.iter().map(|f| estimate_tokens(&f.content)).sum()
}

/// Truncate content to `max_chars` characters, appending a visible marker when cut
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((byte_idx, _)) => {
            let mut truncated = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            truncated.push_str(&content[..byte_idx]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
    }
}

/// Running token budget with a hard ceiling
///
/// Content is admitted only while the running total stays at or below the
/// ceiling. The first rejection leaves the total untouched.
#[derive(Debug, Clone)]
pub struct TokenBudget {
    max_tokens: usize,
    current_tokens: usize,
}

impl TokenBudget {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            current_tokens: 0,
        }
    }

    /// Try to admit content with the given estimate
    /// Returns true if it fits, false if it would exceed the ceiling
    pub fn try_add_tokens(&mut self, tokens: usize) -> bool {
        if self.current_tokens + tokens <= self.max_tokens {
            self.current_tokens += tokens;
            debug!(
                "Added {} tokens, total: {}/{}",
                tokens, self.current_tokens, self.max_tokens
            );
            true
        } else {
            debug!(
                "Cannot add {} tokens, would exceed budget: {}/{}",
                tokens,
                self.current_tokens + tokens,
                self.max_tokens
            );
            false
        }
    }

    /// Try to admit text, estimating its tokens first
    pub fn try_add(&mut self, content: &str) -> bool {
        self.try_add_tokens(estimate_tokens(content))
    }

    /// Get current token usage
    pub fn current(&self) -> usize {
        self.current_tokens
    }

    /// Get remaining tokens
    pub fn remaining(&self) -> usize {
        self.max_tokens.saturating_sub(self.current_tokens)
    }
}
