//! Interactive series picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `fred-etl` and choose series" UX

use std::io::{self, Write};

use crate::data::Catalog;
use crate::error::AppError;

/// Prompt the user to choose one or more catalog series.
///
/// Behavior:
/// - list the catalog, numbered
/// - accept comma/space separated numbers (`1,3 5`) or `all`
/// - `q` cancels
pub fn prompt_for_series(catalog: &Catalog) -> Result<Vec<String>, AppError> {
    let entries = catalog.entries();
    println!("Available series:");
    for (idx, entry) in entries.iter().enumerate() {
        println!("{:>3}) {} [{}]", idx + 1, entry.label, entry.series_id);
    }

    loop {
        print!("Select series by number (e.g. 1,3), 'all', or q to quit: ");
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Pass series with `fred-etl load -s <label>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        match parse_selection(input, entries.len()) {
            Ok(indices) => {
                return Ok(indices
                    .into_iter()
                    .map(|idx| entries[idx].label.to_string())
                    .collect());
            }
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        }
    }
}

/// Parse a picker answer into zero-based catalog indices (deduplicated, in input order).
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>, String> {
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let mut out = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let choice: usize = token
            .parse()
            .map_err(|_| format!("Not a number: '{token}'."))?;
        if !(1..=count).contains(&choice) {
            return Err(format!("Invalid choice: {choice}. Enter numbers between 1 and {count}."));
        }
        if !out.contains(&(choice - 1)) {
            out.push(choice - 1);
        }
    }

    if out.is_empty() {
        return Err("Please select at least one series.".to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_separators() {
        assert_eq!(parse_selection("1,3 5", 9).unwrap(), vec![0, 2, 4]);
        assert_eq!(parse_selection(" 2 , 2 ,1", 9).unwrap(), vec![1, 0]);
    }

    #[test]
    fn all_selects_everything() {
        assert_eq!(parse_selection("ALL", 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(parse_selection("0", 9).is_err());
        assert!(parse_selection("10", 9).is_err());
        assert!(parse_selection("gdp", 9).is_err());
        assert!(parse_selection("", 9).is_err());
    }
}
