use crate::query;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::io::Write;

/// Parse a selector query and print the evaluator tree it compiles to.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The selector query to parse.
    pub query: String,

    /// How to render the parsed tree.
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Tree)]
    pub output: OutputFormat,
}

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented debug rendering.
    Tree,
    /// JSON rendering.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Tree => "tree",
            OutputFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}

/// Runs the CLI against `out`, returning the process exit code. Parse errors
/// go to stderr.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> i32 {
    match query::parse(&cli.query) {
        Ok(eval) => {
            let rendered = match cli.output {
                OutputFormat::Tree => format!("{eval:#?}"),
                OutputFormat::Json => serde_json::to_string_pretty(&eval).expect("internal error"),
            };
            match writeln!(out, "{rendered}") {
                Ok(()) => 0,
                Err(_) => 1,
            }
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run_to_string(args: &[&str]) -> (i32, String) {
        let cli = Cli::try_parse_from(args).expect("test error");
        let mut out = Vec::new();
        let code = run(&cli, &mut out);
        (code, String::from_utf8(out).expect("test error"))
    }

    #[test]
    fn tree_output() {
        let (code, out) = run_to_string(&["cssq", "div.note"]);
        assert_eq!(code, 0);
        assert!(out.contains("And"), "unexpected output: {out}");
        assert!(out.contains("Tag"), "unexpected output: {out}");
        assert!(out.contains("\"div\""), "unexpected output: {out}");
    }

    #[test]
    fn json_output() {
        let (code, out) = run_to_string(&["cssq", "a, b", "--output", "json"]);
        assert_eq!(code, 0);
        let value: serde_json::Value = serde_json::from_str(&out).expect("output is not JSON");
        assert!(value.get("Or").is_some(), "unexpected JSON: {out}");
    }

    #[test]
    fn json_renders_regex_as_pattern() {
        let (code, out) = run_to_string(&["cssq", ":matches(\\d+)", "--output", "json"]);
        assert_eq!(code, 0);
        let value: serde_json::Value = serde_json::from_str(&out).expect("output is not JSON");
        assert_eq!(value["MatchesText"], serde_json::json!("\\d+"));
    }

    #[test]
    fn parse_error_exits_nonzero() {
        let (code, out) = run_to_string(&["cssq", "{oops}"]);
        assert_eq!(code, 1);
        assert!(out.is_empty());
    }
}
