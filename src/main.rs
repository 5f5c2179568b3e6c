//! cellgraph - apply edits to a saved spreadsheet and print its cells

mod config;
mod error;

use anyhow::{Context, Result};
use cellgraph_core::{CellValue, Spreadsheet};
use config::{NormalizeMode, load_config};
use error::CliError;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: cellgraph [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet file to open (XML)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <NAME=TEXT>     Set a cell's contents (can be repeated)");
    eprintln!("  -g, --get <NAME>          Print one cell (can be repeated; default: all)");
    eprintln!("  -o, --output <FILE>       Save the spreadsheet to FILE");
    eprintln!("  --save                    Save the spreadsheet back to [FILE]");
    eprintln!("  --json                    Print cells as JSON");
    eprintln!("  --config <path>           Load settings from TOML file");
    eprintln!("  --version-tag <tag>       Version tag required on load and written on save");
    eprintln!("  --normalize <mode>        Cell name normalizer: none, upper or lower");
    eprintln!("  --name-pattern <regex>    Only accept cell names matching this pattern");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Options {
    file: Option<PathBuf>,
    sets: Vec<(String, String)>,
    gets: Vec<String>,
    output: Option<PathBuf>,
    save: bool,
    json: bool,
    config: Option<PathBuf>,
    version_tag: Option<String>,
    normalize: Option<NormalizeMode>,
    name_pattern: Option<String>,
}

enum Command {
    Run(Options),
    Help,
}

fn next_value<'a>(args: &'a [String], i: &mut usize, what: &str) -> error::Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("{} requires {}", args[*i - 1], what)))
}

fn parse_args(args: &[String]) -> error::Result<Command> {
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-s" | "--set" => {
                let assignment = next_value(args, &mut i, "NAME=TEXT")?;
                let (name, text) = assignment.split_once('=').ok_or_else(|| {
                    CliError::Usage(format!("Expected NAME=TEXT, got: {}", assignment))
                })?;
                opts.sets.push((name.to_string(), text.to_string()));
            }
            "-g" | "--get" => {
                opts.gets.push(next_value(args, &mut i, "a cell name")?.to_string());
            }
            "-o" | "--output" => {
                opts.output = Some(PathBuf::from(next_value(args, &mut i, "a file path")?));
            }
            "--save" => opts.save = true,
            "--json" => opts.json = true,
            "--config" => {
                opts.config = Some(PathBuf::from(next_value(args, &mut i, "a file path")?));
            }
            "--version-tag" => {
                opts.version_tag = Some(next_value(args, &mut i, "a value")?.to_string());
            }
            "--normalize" => {
                opts.normalize = Some(next_value(args, &mut i, "a value")?.parse()?);
            }
            "--name-pattern" => {
                opts.name_pattern = Some(next_value(args, &mut i, "a pattern")?.to_string());
            }
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(CliError::Usage(format!("Unknown option: {}", arg)));
            }
            arg => {
                if opts.file.is_some() {
                    return Err(CliError::Usage(format!("Unexpected argument: {}", arg)));
                }
                opts.file = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    if opts.save && opts.file.is_none() {
        return Err(CliError::Usage("--save requires a FILE".to_string()));
    }
    Ok(Command::Run(opts))
}

/// One printed cell.
#[derive(Debug, Serialize)]
struct CellReport {
    name: String,
    contents: String,
    value: CellValue,
}

fn collect_reports(sheet: &Spreadsheet, gets: &[String]) -> Result<Vec<CellReport>> {
    let names: Vec<String> = if gets.is_empty() {
        let mut names: Vec<String> = sheet.names_of_nonempty_cells().into_iter().collect();
        names.sort();
        names
    } else {
        gets.to_vec()
    };

    names
        .into_iter()
        .map(|name| -> Result<CellReport> {
            let contents = sheet
                .get_contents(&name)
                .with_context(|| format!("Cannot read {}", name))?;
            let value = sheet.get_value(&name)?;
            Ok(CellReport {
                name,
                contents: contents.to_input_string(),
                value,
            })
        })
        .collect()
}

fn run(opts: Options) -> Result<()> {
    let mut config = load_config(opts.config.as_deref())?;
    if let Some(tag) = opts.version_tag.clone() {
        config.version = tag;
    }
    if let Some(mode) = opts.normalize {
        config.normalize = mode;
    }
    if let Some(pattern) = opts.name_pattern.clone() {
        config.name_pattern = Some(pattern);
    }
    let validator = config.validator()?;
    let normalizer = config.normalizer();

    let mut sheet = match &opts.file {
        Some(path) if path.exists() => {
            Spreadsheet::open(path, validator, normalizer, &config.version)
                .with_context(|| format!("Failed to open {}", path.display()))?
        }
        _ => Spreadsheet::with_rules(validator, normalizer, &config.version),
    };

    for (name, text) in &opts.sets {
        let order = sheet
            .set_contents(name, text)
            .with_context(|| format!("Cannot set {}", name))?;
        eprintln!("{}: recalculated {}", name, order.join(", "));
    }

    let reports = collect_reports(&sheet, &opts.gets)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}\t{}\t{}", report.name, report.contents, report.value);
        }
    }

    let target = match (&opts.output, opts.save) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => opts.file.clone(),
        (None, false) => None,
    };
    if let Some(path) = target {
        sheet
            .save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let opts = match parse_args(&args) {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(opts) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("cellgraph")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn parse(list: &[&str]) -> Options {
        match parse_args(&args(list)).unwrap() {
            Command::Run(opts) => opts,
            Command::Help => panic!("expected options"),
        }
    }

    #[test]
    fn test_parse_sets_in_order() {
        let opts = parse(&["sheet.xml", "-s", "A1=2", "--set", "B1==A1*2"]);
        assert_eq!(opts.file, Some(PathBuf::from("sheet.xml")));
        assert_eq!(
            opts.sets,
            vec![
                ("A1".to_string(), "2".to_string()),
                ("B1".to_string(), "=A1*2".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_flags() {
        let opts = parse(&[
            "--json",
            "-g",
            "A1",
            "--normalize",
            "upper",
            "--version-tag",
            "ps6",
            "-o",
            "out.xml",
        ]);
        assert!(opts.json);
        assert_eq!(opts.gets, vec!["A1".to_string()]);
        assert_eq!(opts.normalize, Some(NormalizeMode::Upper));
        assert_eq!(opts.version_tag.as_deref(), Some("ps6"));
        assert_eq!(opts.output, Some(PathBuf::from("out.xml")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["--set", "A1"])).is_err());
        assert!(parse_args(&args(&["--get"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["a.xml", "b.xml"])).is_err());
        assert!(parse_args(&args(&["--save"])).is_err());
        assert!(parse_args(&args(&["--normalize", "title"])).is_err());
    }

    #[test]
    fn test_parse_help() {
        assert!(matches!(
            parse_args(&args(&["-s", "A1=1", "-h"])).unwrap(),
            Command::Help
        ));
    }

    #[test]
    fn test_collect_reports_sorted() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents("B1", "=A1+1").unwrap();
        sheet.set_contents("A1", "1").unwrap();
        let reports = collect_reports(&sheet, &[]).unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A1", "B1"]);
        assert_eq!(reports[1].contents, "=A1+1");
        assert_eq!(reports[1].value, CellValue::Number(2.0));
    }

    #[test]
    fn test_collect_reports_empty_and_invalid() {
        let sheet = Spreadsheet::new();
        let reports = collect_reports(&sheet, &["Q7".to_string()]).unwrap();
        assert_eq!(reports[0].contents, "");
        assert_eq!(reports[0].value, CellValue::Empty);
        assert!(collect_reports(&sheet, &["7Q".to_string()]).is_err());
    }
}
