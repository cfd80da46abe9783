//! Interactive menu loop

use std::io::{BufRead, Write};

use thiserror::Error;
use treepir_core::constants::MAX_SIZE_EXPONENT;
use treepir_core::{validate_size_exponent, Strategy};
use treepir_engine::PirEngine;

use crate::error::Result;
use crate::round::RoundController;

/// Selector that ends the loop
pub const EXIT_SELECTOR: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(Strategy),
    Exit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("Invalid choice {0:?}: expected a number from 1 to {}", EXIT_SELECTOR)]
    InvalidSelector(String),

    #[error("Invalid size exponent {0:?}: expected a number from 1 to {}", MAX_SIZE_EXPONENT)]
    InvalidSizeExponent(String),
}

pub fn parse_selector(input: &str) -> std::result::Result<MenuChoice, MenuError> {
    let input = input.trim();
    let selector: u32 = input
        .parse()
        .map_err(|_| MenuError::InvalidSelector(input.to_string()))?;
    if selector == EXIT_SELECTOR {
        return Ok(MenuChoice::Exit);
    }
    Strategy::from_selector(selector)
        .map(MenuChoice::Run)
        .ok_or_else(|| MenuError::InvalidSelector(input.to_string()))
}

pub fn parse_size_exponent(input: &str) -> std::result::Result<u32, MenuError> {
    let input = input.trim();
    let exponent: u32 = input
        .parse()
        .map_err(|_| MenuError::InvalidSizeExponent(input.to_string()))?;
    validate_size_exponent(exponent)
        .map_err(|_| MenuError::InvalidSizeExponent(input.to_string()))?;
    Ok(exponent)
}

pub fn print_menu(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "***** Menu - Parallel *****")?;
    for strategy in Strategy::ALL {
        writeln!(out, "{}. {}", strategy.selector(), strategy.description())?;
    }
    writeln!(out, "{EXIT_SELECTOR}. End")?;
    write!(out, "Choose your solutions from 1 to 3: ")?;
    out.flush()
}

/// What happened over a menu session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuStats {
    pub rounds: usize,
    pub failed_rounds: usize,
    pub invalid_inputs: usize,
    pub mismatched_workers: usize,
}

/// Drive rounds from `input` until the exit selector or end of input
///
/// Invalid input and failed rounds are reported to `out` and the loop keeps
/// going; only I/O errors on the streams end it early.
pub fn run_menu<E: PirEngine>(
    controller: &RoundController<E>,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<MenuStats> {
    let mut stats = MenuStats::default();
    let mut line = String::new();

    loop {
        print_menu(&mut out)?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        let strategy = match parse_selector(&line) {
            Ok(MenuChoice::Exit) => break,
            Ok(MenuChoice::Run(strategy)) => strategy,
            Err(e) => {
                stats.invalid_inputs += 1;
                writeln!(out, "{e}")?;
                continue;
            }
        };

        write!(out, "Type a size of database: 2^")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        let size_exponent = match parse_size_exponent(&line) {
            Ok(exponent) => exponent,
            Err(e) => {
                stats.invalid_inputs += 1;
                writeln!(out, "{e}")?;
                continue;
            }
        };

        stats.rounds += 1;
        match controller.run_round(strategy, size_exponent) {
            Ok(report) => {
                stats.mismatched_workers += report.summary().mismatched;
            }
            Err(e) => {
                stats.failed_rounds += 1;
                tracing::error!(%strategy, size_exponent, error = %e, "Round failed");
                writeln!(out, "Round failed: {e}")?;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use treepir_core::BenchConfig;
    use treepir_engine::PlainEngine;

    fn run(input: &str) -> (MenuStats, String) {
        let controller = RoundController::new(PlainEngine, BenchConfig::default()).unwrap();
        let mut out = Vec::new();
        let stats = run_menu(&controller, Cursor::new(input.to_string()), &mut out).unwrap();
        (stats, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!(
            parse_selector("1\n"),
            Ok(MenuChoice::Run(Strategy::WholeTree))
        );
        assert_eq!(
            parse_selector(" 3 "),
            Ok(MenuChoice::Run(Strategy::BalancedPartition))
        );
        assert_eq!(parse_selector("4"), Ok(MenuChoice::Exit));
        assert!(matches!(parse_selector("5"), Err(MenuError::InvalidSelector(_))));
        assert!(matches!(parse_selector("0"), Err(MenuError::InvalidSelector(_))));
        assert!(matches!(parse_selector("abc"), Err(MenuError::InvalidSelector(_))));
    }

    #[test]
    fn test_parse_size_exponent() {
        assert_eq!(parse_size_exponent("10\n"), Ok(10));
        assert!(parse_size_exponent("0").is_err());
        assert!(parse_size_exponent("33").is_err());
        assert!(parse_size_exponent("-1").is_err());
    }

    #[test]
    fn test_menu_text() {
        let mut out = Vec::new();
        print_menu(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("***** Menu - Parallel *****"));
        assert!(text.contains("2. Call PIR on each layer and wait for the slowest - O(n)"));
        assert!(text.contains("4. End"));
    }

    #[test]
    fn test_exit_selector() {
        let (stats, _) = run("4\n1\n3\n");
        assert_eq!(stats, MenuStats::default());
    }

    #[test]
    fn test_end_of_input_exits() {
        let (stats, _) = run("");
        assert_eq!(stats.rounds, 0);

        let (stats, _) = run("2\n");
        assert_eq!(stats.rounds, 0);
    }

    #[test]
    fn test_rounds_and_invalid_input() {
        let (stats, out) = run("2\n3\n7\n1\n0\n3\n2\n4\n");
        assert_eq!(stats.rounds, 2);
        assert_eq!(stats.invalid_inputs, 2);
        assert_eq!(stats.failed_rounds, 0);
        assert_eq!(stats.mismatched_workers, 0);
        assert!(out.contains("Invalid choice \"7\""));
        assert!(out.contains("Invalid size exponent \"0\""));
        assert!(out.contains("Type a size of database: 2^"));
    }
}
