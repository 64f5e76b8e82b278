//! Options parser.

use std::str::FromStr;

use crate::error::{Error, Result};

/// What the driver does with the file once it is loaded.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Wrap,
    Highlight,
    Find(String),
    Replace(String, String),
    Format,
    Stat,
}

pub struct Options {
    pub help: bool,
    pub version: bool,
    pub config_path: Option<String>,
    pub syntax_dir: Option<String>,
    pub log_path: Option<String>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub case_sensitive: Option<bool>,
    pub whole_word: Option<bool>,
    pub regex: Option<bool>,
    pub mode: Option<Mode>,
    pub files: Vec<String>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            help: false,
            version: false,
            config_path: None,
            syntax_dir: None,
            log_path: None,
            width: None,
            height: None,
            case_sensitive: None,
            whole_word: None,
            regex: None,
            mode: None,
            files: vec![],
        }
    }
}

impl Options {
    pub fn parse<T>(args: T) -> Result<Options>
    where
        T: IntoIterator<Item = String>,
    {
        let mut opts = Options::default();
        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--help" => opts.help = true,
                "--version" => opts.version = true,
                "--config" => opts.config_path = Some(expect_value(&arg, it.next())?),
                "--syntax" => opts.syntax_dir = Some(expect_value(&arg, it.next())?),
                "--log" => opts.log_path = Some(expect_value(&arg, it.next())?),
                "--width" => opts.width = Some(parse_arg(&arg, it.next())?),
                "--height" => opts.height = Some(parse_arg(&arg, it.next())?),
                "--case" => opts.case_sensitive = Some(true),
                "--ignore-case" => opts.case_sensitive = Some(false),
                "--word" => opts.whole_word = Some(true),
                "--regex" => opts.regex = Some(true),
                "--wrap" => opts.mode = Some(Mode::Wrap),
                "--highlight" => opts.mode = Some(Mode::Highlight),
                "--find" => opts.mode = Some(Mode::Find(expect_value(&arg, it.next())?)),
                "--replace" => {
                    let term = expect_value(&arg, it.next())?;
                    let replacement = expect_value(&arg, it.next())?;
                    opts.mode = Some(Mode::Replace(term, replacement));
                }
                "--format" => opts.mode = Some(Mode::Format),
                "--stat" => opts.mode = Some(Mode::Stat),
                arg if arg.starts_with("--") => return Err(Error::unexpected_arg(arg)),
                _ => opts.files.push(arg),
            }
        }
        Ok(opts)
    }
}

fn parse_arg<T>(arg: &str, next_arg: Option<String>) -> Result<T>
where
    T: FromStr,
{
    if let Some(value) = next_arg {
        value
            .parse::<T>()
            .map_err(|_| Error::invalid_value(arg, &value))
    } else {
        Err(Error::expected_value(arg))
    }
}

fn expect_value(arg: &str, next_arg: Option<String>) -> Result<String> {
    next_arg.ok_or_else(|| Error::expected_value(arg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options> {
        Options::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn parse_modes() {
        let opts = parse(&["--width", "40", "--ignore-case", "--find", "foo", "a.rs"]).unwrap();
        assert_eq!(opts.width, Some(40));
        assert_eq!(opts.case_sensitive, Some(false));
        assert_eq!(opts.mode, Some(Mode::Find("foo".to_string())));
        assert_eq!(opts.files, vec!["a.rs"]);

        let opts = parse(&["--replace", "a", "b", "x"]).unwrap();
        assert_eq!(
            opts.mode,
            Some(Mode::Replace("a".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse(&["--width"]),
            Err(Error::ExpectedValue { .. })
        ));
        assert!(matches!(
            parse(&["--width", "wide"]),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            parse(&["--replace", "a"]),
            Err(Error::ExpectedValue { .. })
        ));
        assert!(matches!(
            parse(&["--bogus"]),
            Err(Error::UnexpectedArg { .. })
        ));
    }
}
