//! The `fpdt` utility reads F Prime data products (ComLogger files,
//! `fprime-gds` logs and streams, parameter databases) and prints the
//! decoded records, one per line.
//!
//! Without a dictionary the tool still frames records and identifies packet
//! categories, which is useful for sanity checking raw data. With one or
//! more `--dictionary` files the packet payloads are additionally resolved
//! into typed values with component/mnemonic metadata.

extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate fp_proto;
extern crate fpdt;

use fp_proto::diag::{Diagnostics, StderrDiagnostics};
use fp_proto::dictionary::Dictionary;
use fp_proto::packet::Decoder;
use fp_proto::record::{Record, RecordFormat};
use fp_proto::registry::TypeRegistry;
use fp_proto::stream::{ByteStream, ReaderStream};
use fp_proto::{Codec, Error};
use fpdt::config::{Options, OutputFormat, USAGE};
use fpdt::printer::{ColumnPrinter, JsonPrinter, Printer};

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process;
use std::rc::Rc;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print!("{}", USAGE);
        return;
    }

    let options = match Options::from_args(args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("ERROR: {}", message);
            process::exit(1);
        }
    };

    match run(&options) {
        Ok(()) => {}
        Err(error) => {
            eprintln!("ERROR: {}", error);
            process::exit(1);
        }
    }
}

/// How the input is framed, per `--record-type`.
enum Source {
    Framed(RecordFormat),
    GdsStream,
    PrmDb,
    /// Any other name from the type namespace: the input is a concatenated
    /// sequence of that type's values.
    Values(Rc<dyn Codec>),
}

fn run(options: &Options) -> Result<(), failure::Error> {
    let diag = StderrDiagnostics;

    let mut registry = TypeRegistry::new(&options.config)?;
    let dict = if options.dictionaries.is_empty() {
        None
    } else {
        let mut dict = Dictionary::new();
        for path in &options.dictionaries {
            dict.load(path, &mut registry, &diag)?;
        }
        Some(dict)
    };
    let decoder = Decoder::new(&registry, dict.as_ref(), &diag);

    let source = match options.record_type.as_str() {
        "ComLoggerRecord" => Source::Framed(RecordFormat::ComLogger),
        "FprimeGdsRecord" => Source::Framed(RecordFormat::FprimeGds),
        "FprimeGdsStream" => Source::GdsStream,
        "PrmDbRecord" => Source::PrmDb,
        name => match registry.get(name) {
            Some(codec) => Source::Values(codec),
            None => return Err(format_err!("record type \"{}\" does not exist", name)),
        },
    };

    let mut output_format = options.output_format;
    match source {
        Source::Framed(_) => {}
        _ => {
            if output_format != OutputFormat::Json {
                diag.warning(&format!(
                    "record type \"{}\" is not ComLoggerRecord or FprimeGdsRecord; \
                     forcing JSON output",
                    options.record_type
                ));
                output_format = OutputFormat::Json;
            }
        }
    }

    let mut stream: Box<dyn ByteStream> = match options.input {
        Some(ref path) => Box::new(ReaderStream::seekable(File::open(path)?)),
        None => Box::new(ReaderStream::new(io::stdin())),
    };

    let stdout = io::stdout();
    let out = stdout.lock();

    match source {
        Source::Framed(format) => {
            let decode = |stream: &mut dyn ByteStream| decoder.decode_record(format, stream);
            match output_format {
                OutputFormat::Json => {
                    let mut printer = JsonPrinter::new(out, dict.as_ref());
                    run_records(decode, &mut *stream, &mut printer, &diag)
                }
                OutputFormat::Tsv => {
                    let mut printer = ColumnPrinter::tsv(out, dict.as_ref());
                    run_records(decode, &mut *stream, &mut printer, &diag)
                }
                OutputFormat::Vnlog => {
                    let mut printer = ColumnPrinter::vnlog(out, dict.as_ref());
                    run_records(decode, &mut *stream, &mut printer, &diag)
                }
            }
        }
        Source::GdsStream => {
            let mut printer = JsonPrinter::new(out, dict.as_ref());
            run_records(
                |stream: &mut dyn ByteStream| decoder.decode_gds_stream_record(stream),
                &mut *stream,
                &mut printer,
                &diag,
            )
        }
        Source::PrmDb => {
            let mut printer = JsonPrinter::new(out, dict.as_ref());
            loop {
                match decoder.decode_prm_db_record(&mut *stream) {
                    Ok(record) => {
                        if write_or_done(printer.prm_record(&record))? {
                            return Ok(());
                        }
                    }
                    Err(Error::EndOfStream) => return Ok(()),
                    Err(Error::MalformedPacket(message)) => {
                        diag.warning(&format!("dropping parameter record: {}", message));
                    }
                    Err(error) => return Err(error.into()),
                }
            }
        }
        Source::Values(codec) => {
            let mut printer = JsonPrinter::new(out, dict.as_ref());
            loop {
                match codec.decode(&mut *stream, None) {
                    Ok(value) => {
                        if write_or_done(printer.value(&value))? {
                            return Ok(());
                        }
                    }
                    Err(Error::EndOfStream) => return Ok(()),
                    Err(error) => return Err(error.into()),
                }
            }
        }
    }
}

/// Runs the record loop shared by the framed and sync-word sources.
///
/// `EndOfStream` is normal completion, a malformed record is dropped with a
/// diagnostic and framing continues, and a broken output pipe terminates
/// cleanly.
fn run_records<F>(
    decode: F,
    stream: &mut dyn ByteStream,
    printer: &mut dyn Printer,
    diag: &dyn Diagnostics,
) -> Result<(), failure::Error>
where
    F: Fn(&mut dyn ByteStream) -> Result<Record, Error>,
{
    if write_or_done(printer.header())? {
        return Ok(());
    }
    let mut index = 0;
    loop {
        let record = match decode(&mut *stream) {
            Ok(record) => record,
            Err(Error::EndOfStream) => break,
            Err(Error::MalformedPacket(message)) => {
                diag.warning(&format!("dropping record: {}", message));
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        if write_or_done(printer.record(index, &record))? {
            return Ok(());
        }
        index += 1;
    }
    if write_or_done(printer.footer())? {
        return Ok(());
    }
    io::stdout().flush().ok();
    Ok(())
}

/// `Ok(true)` when the output pipe is gone and the loop should stop cleanly.
fn write_or_done(result: io::Result<()>) -> Result<bool, failure::Error> {
    match result {
        Ok(()) => Ok(false),
        Err(ref error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(true),
        Err(error) => Err(error.into()),
    }
}
