//! Prompts shared by the provider and manager terminals.
//!
//! Every prompt returns `None` when the user ends input, which callers treat
//! as "go back".

use crate::domain::model::DATE_FMT;
use crate::domain::ports::Terminal;
use crate::utils::error::{ChocAnError, Result};
use chrono::NaiveDate;
use std::ops::RangeInclusive;

/// Asks until the answer's length is inside `char_limit`.
pub fn prompt_str(
    term: &mut dyn Terminal,
    message: &str,
    char_limit: Option<RangeInclusive<usize>>,
) -> Option<String> {
    loop {
        let text = term.read_line(message)?;
        match &char_limit {
            Some(limit) if !limit.contains(&text.chars().count()) => term.write_line(&format!(
                "Input must be between {} and {} characters long.",
                limit.start(),
                limit.end()
            )),
            _ => return Some(text),
        }
    }
}

pub fn prompt_int(
    term: &mut dyn Terminal,
    message: &str,
    char_limit: Option<RangeInclusive<usize>>,
    numeric_limit: Option<RangeInclusive<u32>>,
) -> Option<u32> {
    let message = match &numeric_limit {
        Some(limit) => format!("{} ({}-{})", message, limit.start(), limit.end()),
        None => message.to_string(),
    };

    loop {
        let text = prompt_str(term, &message, char_limit.clone())?;
        let Ok(value) = text.trim().parse::<u32>() else {
            term.write_line(&format!("\"{}\" is not a valid integer.", text));
            continue;
        };
        match &numeric_limit {
            Some(limit) if !limit.contains(&value) => term.write_line(&format!(
                "\"{}\" is not in the range ({}-{}).",
                value,
                limit.start(),
                limit.end()
            )),
            _ => return Some(value),
        }
    }
}

/// A record number of exactly `digits` digits, without leading zeros.
pub fn prompt_id(term: &mut dyn Terminal, message: &str, digits: u32) -> Option<u32> {
    let min = 10u32.checked_pow(digits.saturating_sub(1)).unwrap_or(u32::MAX);
    let max = 10u32
        .checked_pow(digits)
        .map_or(u32::MAX, |bound| bound - 1);
    let width = digits as usize;

    loop {
        let value = prompt_int(term, message, Some(width..=width), None)?;
        if value < min {
            term.write_line(&format!(
                "\"{}\" is not in the range ({}-{}).",
                value, min, max
            ));
            continue;
        }
        return Some(value);
    }
}

/// A `MM-DD-YYYY` date. Errors only when the bounds themselves are inverted.
pub fn prompt_date(
    term: &mut dyn Terminal,
    message: &str,
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
) -> Result<Option<NaiveDate>> {
    if let (Some(min), Some(max)) = (min_date, max_date) {
        if min > max {
            return Err(ChocAnError::InvalidArgument {
                message: format!("min_date must not be after max_date ({} > {})", min, max),
            });
        }
    }

    let message = format!("{} (MM-DD-YYYY)", message);
    loop {
        let Some(text) = prompt_str(term, &message, None) else {
            return Ok(None);
        };
        let Ok(date) = NaiveDate::parse_from_str(text.trim(), DATE_FMT) else {
            term.write_line(&format!("{} is not in MM-DD-YYYY format.", text));
            continue;
        };
        if let Some(min) = min_date.filter(|min| date < *min) {
            term.write_line(&format!("Date must be on or after {}", min.format(DATE_FMT)));
        } else if let Some(max) = max_date.filter(|max| date > *max) {
            term.write_line(&format!("Date must be on or before {}", max.format(DATE_FMT)));
        } else {
            return Ok(Some(date));
        }
    }
}

/// Shows numbered choices and returns the zero-based index and text picked.
pub fn prompt_menu_options(
    term: &mut dyn Terminal,
    message: &str,
    choices: &[&str],
) -> Result<Option<(usize, String)>> {
    if choices.is_empty() {
        return Err(ChocAnError::InvalidArgument {
            message: "menu choices may not be empty".to_string(),
        });
    }

    term.write_line(message);
    for (i, choice) in choices.iter().enumerate() {
        term.write_line(&format!("\t{}: {}", i + 1, choice));
    }

    let last = u32::try_from(choices.len()).unwrap_or(u32::MAX);
    Ok(prompt_int(term, "Selection", None, Some(1..=last)).map(|selection| {
        let index = selection as usize - 1;
        (index, choices[index].to_string())
    }))
}

pub fn prompt_confirm(term: &mut dyn Terminal, message: &str) -> Option<bool> {
    let message = format!("{} (y/n)", message);
    loop {
        let text = term.read_line(&message)?;
        match text.trim().to_lowercase().as_str() {
            "y" | "yes" => return Some(true),
            "n" | "no" => return Some(false),
            _ => term.write_line("Please answer y or n."),
        }
    }
}

/// Highlighted line for the user. The log only gets it at debug level, so it is
/// not shown twice on an interactive terminal.
pub fn warn(term: &mut dyn Terminal, text: &str) {
    tracing::debug!("{}", text);
    term.write_line(&format!("\x1b[93m{}\x1b[0m", text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ScriptedTerminal;
    use crate::testing::date;

    #[test]
    fn test_prompt_str_enforces_length() {
        let mut term = ScriptedTerminal::new(["", "far too long", "ok"]);
        let result = prompt_str(&mut term, "Name", Some(1..=5));

        assert_eq!(result.as_deref(), Some("ok"));
        assert_eq!(
            term.transcript()
                .matches("Input must be between 1 and 5 characters long.")
                .count(),
            2
        );
    }

    #[test]
    fn test_prompt_str_cancel() {
        let mut term = ScriptedTerminal::new(Vec::<String>::new());
        assert_eq!(prompt_str(&mut term, "Name", None), None);
    }

    #[test]
    fn test_prompt_int_rejects_text_and_out_of_range() {
        let mut term = ScriptedTerminal::new(["abc", "12", "5"]);
        let result = prompt_int(&mut term, "Count", None, Some(1..=9));

        assert_eq!(result, Some(5));
        let transcript = term.transcript();
        assert!(transcript.contains("Count (1-9): abc"));
        assert!(transcript.contains("\"abc\" is not a valid integer."));
        assert!(transcript.contains("\"12\" is not in the range (1-9)."));
    }

    #[test]
    fn test_prompt_int_digit_count() {
        let mut term = ScriptedTerminal::new(["1234", "123456789"]);
        assert_eq!(
            prompt_int(&mut term, "User ID", Some(9..=9), None),
            Some(123456789)
        );
    }

    #[test]
    fn test_prompt_id_rejects_leading_zeros() {
        let mut term = ScriptedTerminal::new(["000000042", "222222222"]);
        assert_eq!(prompt_id(&mut term, "Member ID", 9), Some(222222222));
        assert!(term
            .transcript()
            .contains("\"42\" is not in the range (100000000-999999999)."));

        let mut term = ScriptedTerminal::new(["012345", "100000"]);
        assert_eq!(prompt_id(&mut term, "Service code", 6), Some(100000));
    }

    #[test]
    fn test_prompt_date_bounds() {
        let mut term = ScriptedTerminal::new(["2023-12-01", "11-30-2023", "12-09-2023", "12-05-2023"]);
        let result = prompt_date(
            &mut term,
            "Service date",
            Some(date(12, 1, 2023)),
            Some(date(12, 8, 2023)),
        )
        .unwrap();

        assert_eq!(result, Some(date(12, 5, 2023)));
        let transcript = term.transcript();
        assert!(transcript.contains("2023-12-01 is not in MM-DD-YYYY format."));
        assert!(transcript.contains("Date must be on or after 12-01-2023"));
        assert!(transcript.contains("Date must be on or before 12-08-2023"));
    }

    #[test]
    fn test_prompt_date_inverted_bounds() {
        let mut term = ScriptedTerminal::new(["12-05-2023"]);
        let result = prompt_date(&mut term, "Date", Some(date(12, 9, 2023)), Some(date(12, 1, 2023)));
        assert!(matches!(result, Err(ChocAnError::InvalidArgument { .. })));
        assert_eq!(term.remaining_inputs(), 1);
    }

    #[test]
    fn test_prompt_menu_options() {
        let mut term = ScriptedTerminal::new(["0", "2"]);
        let result = prompt_menu_options(&mut term, "Pick one", &["First", "Second"]).unwrap();

        assert_eq!(result, Some((1, "Second".to_string())));
        assert!(term.transcript().starts_with("Pick one\n\t1: First\n\t2: Second\n"));
    }

    #[test]
    fn test_prompt_menu_options_empty() {
        let mut term = ScriptedTerminal::new(["1"]);
        assert!(prompt_menu_options(&mut term, "Pick", &[]).is_err());
    }

    #[test]
    fn test_prompt_confirm() {
        let mut term = ScriptedTerminal::new(["maybe", "YES"]);
        assert_eq!(prompt_confirm(&mut term, "Sure?"), Some(true));
        let mut term = ScriptedTerminal::new(["n"]);
        assert_eq!(prompt_confirm(&mut term, "Sure?"), Some(false));
    }

    #[test]
    fn test_warn_is_highlighted() {
        let mut term = ScriptedTerminal::new(Vec::<String>::new());
        warn(&mut term, "careful");
        assert_eq!(term.transcript(), "\x1b[93mcareful\x1b[0m\n");
    }
}
