//! Command line parsing.

use std::path::PathBuf;

use crate::error::UsageError;

pub fn print_usage() {
    eprintln!("Usage: gridflat [OPTIONS] FILE CELL");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  FILE                      Workbook to read (.grd, or .csv for a single sheet)");
    eprintln!("  CELL                      Cell to flatten, e.g. B3 or Sheet2.B3");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --sheet <NAME>        Active sheet for unqualified CELL (default: first sheet)");
    eprintln!("  -k, --keep-values         Leave references to value cells as written");
    eprintln!("  --max-depth <N>           Deepest chain of nested substitutions (default: 256)");
    eprintln!("  -c, --config <FILE>       Read settings from FILE instead of the user config");
    eprintln!("  -q, --quiet               Print only the flattened formula");
    eprintln!("  -v, --verbose             More log output (repeatable)");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Flatten(Args),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub file: PathBuf,
    pub cell: String,
    pub sheet: Option<String>,
    pub keep_values: bool,
    pub max_depth: Option<usize>,
    pub config: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: u8,
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut positional: Vec<String> = Vec::new();
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-s" | "--sheet" => {
                parsed.sheet = Some(next_value(&mut args, &arg)?);
            }
            "-k" | "--keep-values" => parsed.keep_values = true,
            "--max-depth" => {
                let value = next_value(&mut args, &arg)?;
                let depth = value.parse::<usize>().map_err(|_| UsageError::InvalidNumber {
                    flag: arg.clone(),
                    value,
                })?;
                parsed.max_depth = Some(depth);
            }
            "-c" | "--config" => {
                parsed.config = Some(PathBuf::from(next_value(&mut args, &arg)?));
            }
            "-q" | "--quiet" => parsed.quiet = true,
            "-v" | "--verbose" => parsed.verbose = parsed.verbose.saturating_add(1),
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(UsageError::UnknownOption(other.to_string()));
            }
            _ => {
                if positional.len() == 2 {
                    return Err(UsageError::UnexpectedArgument(arg.clone()));
                }
                positional.push(arg.clone());
            }
        }
    }

    let mut positional = positional.into_iter();
    parsed.file = positional.next().map(PathBuf::from).ok_or(UsageError::MissingFile)?;
    parsed.cell = positional.next().ok_or(UsageError::MissingCell)?;
    Ok(Command::Flatten(parsed))
}

fn next_value<I>(args: &mut I, flag: &str) -> Result<String, UsageError>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| UsageError::MissingValue(flag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_minimal() {
        let Command::Flatten(args) = parse(&["book.grd", "B3"]).unwrap() else {
            panic!("expected flatten command");
        };
        assert_eq!(args.file, PathBuf::from("book.grd"));
        assert_eq!(args.cell, "B3");
        assert!(!args.keep_values);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_parse_all_options() {
        let Command::Flatten(args) = parse(&[
            "-s", "Model", "--keep-values", "--max-depth", "12", "-c", "conf.toml", "-q", "-v",
            "-v", "book.grd", "Model.C4",
        ])
        .unwrap() else {
            panic!("expected flatten command");
        };
        assert_eq!(args.sheet.as_deref(), Some("Model"));
        assert!(args.keep_values);
        assert_eq!(args.max_depth, Some(12));
        assert_eq!(args.config, Some(PathBuf::from("conf.toml")));
        assert!(args.quiet);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.cell, "Model.C4");
    }

    #[test]
    fn test_parse_help_wins() {
        assert_eq!(parse(&["book.grd", "--help"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(&[]).unwrap_err(), UsageError::MissingFile);
        assert_eq!(parse(&["book.grd"]).unwrap_err(), UsageError::MissingCell);
        assert_eq!(
            parse(&["--sheet"]).unwrap_err(),
            UsageError::MissingValue("--sheet".into())
        );
        assert_eq!(
            parse(&["--bogus"]).unwrap_err(),
            UsageError::UnknownOption("--bogus".into())
        );
        assert_eq!(
            parse(&["a", "b", "c"]).unwrap_err(),
            UsageError::UnexpectedArgument("c".into())
        );
        assert!(matches!(
            parse(&["--max-depth", "deep", "a", "b"]).unwrap_err(),
            UsageError::InvalidNumber { .. }
        ));
    }
}
