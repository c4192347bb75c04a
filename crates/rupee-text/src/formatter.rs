//! Rupee amount splitting, number words and Indian digit grouping

use crate::parse::parse_amount;

/// Names for 0-19
const ONES: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

/// Names for multiples of ten (index = tens digit)
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const HUNDRED: u64 = 100;
const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// An amount split into whole rupees and paise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrencySplit {
    /// Whole rupees
    pub rupees: u64,
    /// Paise (0-99)
    pub paise: u8,
}

impl CurrencySplit {
    /// True when both parts are zero
    pub fn is_zero(&self) -> bool {
        self.rupees == 0 && self.paise == 0
    }

    /// Rupees as shown in a form cell; blank for a zero amount
    ///
    /// A non-zero amount below one rupee still shows `0` so the words read
    /// "Rupees Zero and ... Paise".
    pub fn rupees_display(&self) -> String {
        if self.is_zero() {
            String::new()
        } else {
            self.rupees.to_string()
        }
    }

    /// Paise as shown in a form cell; blank when zero
    pub fn paise_display(&self) -> String {
        if self.paise == 0 {
            String::new()
        } else {
            self.paise.to_string()
        }
    }

    /// Back to fractional rupees
    pub fn as_f64(&self) -> f64 {
        self.rupees as f64 + self.paise as f64 / 100.0
    }

    /// The amount spelled out, see [`amount_to_words`]
    pub fn to_words(&self) -> String {
        words_for(self.rupees, self.paise as u64)
    }
}

/// Rupee formatting utilities
pub struct RupeeFormatter;

impl RupeeFormatter {
    /// Split an amount into rupees and paise
    pub fn split(amount: f64) -> CurrencySplit {
        split_currency(amount)
    }

    /// Spell out a whole number with Indian grouping
    pub fn format_number(n: u64) -> String {
        number_to_words(n)
    }

    /// Spell out an amount given as rupee and paise strings
    pub fn format_words(rupees: &str, paise: &str) -> String {
        amount_to_words(rupees, paise)
    }

    /// Format an amount with Indian digit grouping
    pub fn format_grouped(amount: f64, decimals: u8) -> String {
        format_indian(amount, decimals)
    }
}

/// Split an amount into whole rupees and rounded paise
///
/// `rupees = floor(amount)`, `paise = round((amount - rupees) * 100)`. A
/// fraction that rounds up to a full rupee carries over, so paise always
/// stays within 0-99. Zero, negative and non-finite amounts split to zero.
///
/// # Examples
/// ```
/// use rupee_text::split_currency;
/// let split = split_currency(12.5);
/// assert_eq!((split.rupees, split.paise), (12, 50));
/// ```
pub fn split_currency(amount: f64) -> CurrencySplit {
    if !amount.is_finite() || amount <= 0.0 {
        return CurrencySplit::default();
    }

    let rupees = amount.floor();
    let paise = ((amount - rupees) * 100.0).round() as u64;

    if paise >= 100 {
        CurrencySplit {
            rupees: rupees as u64 + 1,
            paise: 0,
        }
    } else {
        CurrencySplit {
            rupees: rupees as u64,
            paise: paise as u8,
        }
    }
}

/// Spell out a whole number using Indian grouping
///
/// # Examples
/// ```
/// use rupee_text::number_to_words;
/// assert_eq!(number_to_words(21), "Twenty One");
/// assert_eq!(number_to_words(100_000), "One Lakh");
/// assert_eq!(number_to_words(10_000_000), "One Crore");
/// ```
pub fn number_to_words(n: u64) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                unit => format!("{tens} {}", ONES[unit as usize]),
            }
        }
        100..=999 => scaled_words(n, HUNDRED, "Hundred"),
        1_000..=99_999 => scaled_words(n, THOUSAND, "Thousand"),
        100_000..=9_999_999 => scaled_words(n, LAKH, "Lakh"),
        _ => scaled_words(n, CRORE, "Crore"),
    }
}

/// `<head> <scale> [<remainder>]`, recursing on both parts
fn scaled_words(n: u64, unit: u64, scale: &str) -> String {
    let head = number_to_words(n / unit);
    match n % unit {
        0 => format!("{head} {scale}"),
        rest => format!("{head} {scale} {}", number_to_words(rest)),
    }
}

/// Spell out an amount as it is written on the invoice
///
/// Produces `"Rupees <Words> [and <Words> Paise] Only"`. Both parts are parsed
/// leniently and truncated to whole numbers; when both are zero the result is
/// empty. Rupees read "Zero" only when paise alone carry the amount.
///
/// # Examples
/// ```
/// use rupee_text::amount_to_words;
/// assert_eq!(amount_to_words("0", "0"), "");
/// assert_eq!(amount_to_words("1", ""), "Rupees One Only");
/// assert_eq!(amount_to_words("100", "50"), "Rupees One Hundred and Fifty Paise Only");
/// ```
pub fn amount_to_words(rupees: &str, paise: &str) -> String {
    words_for(whole_part(rupees), whole_part(paise))
}

fn words_for(rupees: u64, paise: u64) -> String {
    if rupees == 0 && paise == 0 {
        return String::new();
    }

    let mut out = format!("Rupees {}", number_to_words(rupees));
    if paise > 0 {
        out.push_str(" and ");
        out.push_str(&number_to_words(paise));
        out.push_str(" Paise");
    }
    out.push_str(" Only");
    out
}

/// Non-negative whole part of a leniently parsed field value
fn whole_part(text: &str) -> u64 {
    match parse_amount(text) {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Format an amount with Indian digit grouping (`12,34,567.50`)
///
/// The last three integer digits form one group, every group before them
/// holds two digits.
pub fn format_indian(amount: f64, decimals: u8) -> String {
    if amount.is_nan() {
        return "NaN".to_string();
    }
    if amount.is_infinite() {
        return if amount > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let multiplier = 10_f64.powi(decimals as i32);
    let scaled = (amount.abs() * multiplier).round();
    let int_part = (scaled / multiplier).floor() as u64;
    let frac_part = (scaled - int_part as f64 * multiplier).round() as u64;

    let sign = if amount < 0.0 && scaled > 0.0 { "-" } else { "" };
    let grouped = group_indian(int_part);

    if decimals > 0 {
        format!(
            "{sign}{grouped}.{frac_part:0>width$}",
            width = decimals as usize
        )
    } else {
        format!("{sign}{grouped}")
    }
}

fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}
