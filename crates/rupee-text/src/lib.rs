//! Rupee Text - Indian rupee amount formatting
//!
//! This crate provides:
//! - Splitting an amount into rupees and paise
//! - Spelling numbers with Indian grouping (Thousand, Lakh, Crore)
//! - The "Rupees ... Only" amount-in-words line of an invoice
//! - Lenient parsing of numeric form cells
//! - Indian digit grouping for display (12,34,567.00)
//!
//! # Example
//!
//! ```
//! use rupee_text::{amount_to_words, split_currency, RupeeFormatter};
//!
//! let split = split_currency(1250.5);
//! assert_eq!((split.rupees, split.paise), (1250, 50));
//!
//! let words = amount_to_words("1250", "50");
//! assert_eq!(words, "Rupees One Thousand Two Hundred Fifty and Fifty Paise Only");
//!
//! assert_eq!(RupeeFormatter::format_grouped(125000.0, 2), "1,25,000.00");
//! ```

mod formatter;
mod parse;

pub use formatter::{CurrencySplit, RupeeFormatter};

// Re-export commonly used formatting functions
pub use formatter::{amount_to_words, format_indian, number_to_words, split_currency};
pub use parse::{parse_amount, parse_amount_or_zero};
