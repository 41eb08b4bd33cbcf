//! Command line option parsing.

use fp_proto::registry::{Config, CONFIGURABLE_ALIASES};

use std::path::PathBuf;

pub const USAGE: &str = "\
fpdt - read F Prime data products and print the decoded records

USAGE:
    fpdt [OPTIONS] [FILE]

ARGS:
    FILE    input file (default: read from stdin; \"-\" also means stdin)

OPTIONS:
    -F, --output-format <json|tsv|vnlog>
            selects the output format (default: vnlog)
    -d, --dictionary <PATH>
            FSW dictionary used to interpret packet contents; may be given
            several times, the dictionaries are merged in order
    -R, --record-type <NAME>
            top level type to parse the input as; one of ComLoggerRecord
            (default), FprimeGdsRecord, FprimeGdsStream, PrmDbRecord, or any
            type name from the namespace (built-in or dictionary-defined);
            anything but ComLoggerRecord/FprimeGdsRecord forces JSON output
    --USE_TIME_BASE <true|false>
            whether Fw::Time carries a time base field (default: true)
    --USE_TIME_CONTEXT <true|false>
            whether Fw::Time carries a time context field (default: true)
    --TRUE_BYTE <BYTE>
            byte encoding of boolean true (default: 0xff)
    --FALSE_BYTE <BYTE>
            byte encoding of boolean false (default: 0x00)
    --<ALIAS> <FUNDAMENTAL>
            rebinds a configurable type alias (FwBuffSize, FwChanId,
            FwEnumStore, FwEventId, FwOpcode, FwPacketDescriptor, FwPrmId,
            FwTimeBaseStore, FwTimeContextStore, FwTlmPacketizeId) to a
            fundamental type name such as U8 or U32LE
    -h, --help
            prints this help text
";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputFormat {
    Json,
    Tsv,
    Vnlog,
}

/// Parsed command line options.
#[derive(Debug)]
pub struct Options {
    /// Input file; `None` reads stdin.
    pub input: Option<PathBuf>,
    pub output_format: OutputFormat,
    /// Dictionary files, merged in order.
    pub dictionaries: Vec<PathBuf>,
    pub record_type: String,
    pub config: Config,
}

impl Options {
    pub fn from_args<I>(args: I) -> Result<Options, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options {
            input: None,
            output_format: OutputFormat::Vnlog,
            dictionaries: Vec::new(),
            record_type: "ComLoggerRecord".to_string(),
            config: Config::default(),
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-F" | "--output-format" => {
                    let value = option_value(&mut args, &arg)?;
                    options.output_format = match value.as_str() {
                        "json" => OutputFormat::Json,
                        "tsv" => OutputFormat::Tsv,
                        "vnlog" => OutputFormat::Vnlog,
                        _ => return Err(format!("unknown output format \"{}\"", value)),
                    };
                }
                "-d" | "--dictionary" => {
                    options
                        .dictionaries
                        .push(PathBuf::from(option_value(&mut args, &arg)?));
                }
                "-R" | "--record-type" => {
                    options.record_type = option_value(&mut args, &arg)?;
                }
                "--USE_TIME_BASE" => {
                    options.config.use_time_base = parse_bool(&option_value(&mut args, &arg)?)?;
                }
                "--USE_TIME_CONTEXT" => {
                    options.config.use_time_context = parse_bool(&option_value(&mut args, &arg)?)?;
                }
                "--TRUE_BYTE" => {
                    options.config.true_byte = parse_byte(&option_value(&mut args, &arg)?)?;
                }
                "--FALSE_BYTE" => {
                    options.config.false_byte = parse_byte(&option_value(&mut args, &arg)?)?;
                }
                "-" => options.input = None,
                _ => {
                    if let Some(&(alias, _)) = CONFIGURABLE_ALIASES
                        .iter()
                        .find(|&&(name, _)| arg == format!("--{}", name))
                    {
                        let target = option_value(&mut args, &arg)?;
                        options.config.aliases.push((alias.to_string(), target));
                    } else if arg.starts_with('-') && arg.len() > 1 {
                        return Err(format!("unknown option \"{}\"", arg));
                    } else if options.input.is_none() {
                        options.input = Some(PathBuf::from(arg));
                    } else {
                        return Err("more than one input file given".to_string());
                    }
                }
            }
        }

        Ok(options)
    }
}

fn option_value<I>(args: &mut I, option: &str) -> Result<String, String>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| format!("option \"{}\" is missing its value", option))
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        _ => Err(format!("invalid boolean \"{}\"", text)),
    }
}

/// A byte given as decimal or `0x`-prefixed hex.
fn parse_byte(text: &str) -> Result<u8, String> {
    let parsed = if text.starts_with("0x") || text.starts_with("0X") {
        u8::from_str_radix(&text[2..], 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| format!("invalid byte value \"{}\"", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, String> {
        Options::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.input, None);
        assert_eq!(options.output_format, OutputFormat::Vnlog);
        assert_eq!(options.record_type, "ComLoggerRecord");
        assert!(options.config.use_time_base);
    }

    #[test]
    fn full_invocation() {
        let options = parse(&[
            "-F",
            "json",
            "-d",
            "dict1.xml",
            "--dictionary",
            "dict2.xml",
            "-R",
            "FprimeGdsStream",
            "--USE_TIME_BASE",
            "false",
            "--TRUE_BYTE",
            "0x01",
            "--FwPacketDescriptor",
            "U8",
            "input.bin",
        ])
        .unwrap();
        assert_eq!(options.output_format, OutputFormat::Json);
        assert_eq!(options.dictionaries.len(), 2);
        assert_eq!(options.record_type, "FprimeGdsStream");
        assert!(!options.config.use_time_base);
        assert_eq!(options.config.true_byte, 0x01);
        assert_eq!(
            options.config.aliases,
            vec![("FwPacketDescriptor".to_string(), "U8".to_string())]
        );
        assert_eq!(options.input.as_ref().unwrap().to_str(), Some("input.bin"));
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["-F", "yaml"]).is_err());
        assert!(parse(&["a.bin", "b.bin"]).is_err());
        assert!(parse(&["--TRUE_BYTE", "256"]).is_err());
    }

    #[test]
    fn dash_means_stdin() {
        let options = parse(&["-"]).unwrap();
        assert_eq!(options.input, None);
    }
}
