//! Output formatting: JSON, TSV and VNLOG record printers.
//!
//! Printers write one line per record to an `io::Write` sink and never to
//! stderr; warnings stay on the diagnostics sink so they cannot interleave
//! with record output. A `BrokenPipe` error from the sink is propagated so
//! the main loop can terminate cleanly.

use serde_json::{Map, Value as Json};

use fp_proto::dictionary::{ArgDef, Dictionary};
use fp_proto::packet::{
    CommandPacket, EventPacket, FilePacket, FilePayload, Packet, PacketType, Payload, TelemPacket,
};
use fp_proto::record::{PrmDbRecord, Record};
use fp_proto::{hex, hex_prefixed, Value};

use std::io::{self, Write};

/// Writes decoded records to an output sink.
pub trait Printer {
    fn header(&mut self) -> io::Result<()>;
    fn record(&mut self, index: u64, record: &Record) -> io::Result<()>;
    fn footer(&mut self) -> io::Result<()>;
}

// -- JSON ---------------------------------------------------------------------

/// One JSON object per line.
#[derive(Debug)]
pub struct JsonPrinter<'a, W: Write> {
    out: W,
    dict: Option<&'a Dictionary>,
}

impl<'a, W: Write> JsonPrinter<'a, W> {
    pub fn new(out: W, dict: Option<&'a Dictionary>) -> Self {
        JsonPrinter { out, dict }
    }

    /// Prints a parameter database record.
    pub fn prm_record(&mut self, record: &PrmDbRecord) -> io::Result<()> {
        writeln!(self.out, "{}", prm_record_json(record, self.dict))
    }

    /// Prints a bare decoded value (used for custom `--record-type` names).
    pub fn value(&mut self, value: &Value) -> io::Result<()> {
        writeln!(self.out, "{}", value.to_json())
    }
}

impl<'a, W: Write> Printer for JsonPrinter<'a, W> {
    fn header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn record(&mut self, _index: u64, record: &Record) -> io::Result<()> {
        writeln!(self.out, "{}", record_json(record, self.dict))
    }

    fn footer(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn record_json(record: &Record, dict: Option<&Dictionary>) -> Json {
    json!({
        "offset": record.offset,
        "packet_size": record.packet_size,
        "packet": packet_json(&record.packet, dict),
    })
}

fn packet_json(packet: &Packet, dict: Option<&Dictionary>) -> Json {
    let type_json = match PacketType::from_value(packet.type_value) {
        Some(_) => json!(packet.type_name()),
        None => json!(packet.type_value),
    };
    let payload = match packet.payload {
        Payload::Command(ref command) => command_json(command, dict),
        Payload::Telem(ref telem) => telem_json(telem, dict),
        Payload::Log(ref event) => event_json(event, dict),
        Payload::File(ref file) => file_json(file),
        Payload::PacketizedTlm(ref bytes)
        | Payload::Idle(ref bytes)
        | Payload::Unknown(ref bytes) => json!(hex_prefixed(bytes)),
    };
    json!({ "type": type_json, "payload": payload })
}

fn arguments_json(defs: &[ArgDef], decoded: &[Option<Value>]) -> Json {
    Json::Array(
        defs.iter()
            .zip(decoded)
            .map(|(def, value)| {
                json!({
                    "name": def.name,
                    "type": def.type_name,
                    "value": match *value {
                        Some(ref value) => value.to_json(),
                        None => Json::Null,
                    },
                })
            })
            .collect(),
    )
}

fn command_json(packet: &CommandPacket, dict: Option<&Dictionary>) -> Json {
    let mut obj = json_obj(json!({
        "opcode": packet.opcode,
        "opcode_hex": format!("{:#x}", packet.opcode),
        "arguments_raw": hex_prefixed(&packet.arguments_raw),
    }));
    if let Some(command) = dict.and_then(|d| d.command_by_opcode(packet.opcode)) {
        obj.insert("topology_name".to_string(), json!(command.topology_name()));
        obj.insert("component".to_string(), json!(command.component));
        obj.insert("mnemonic".to_string(), json!(command.mnemonic));
        if let Some(ref arguments) = packet.arguments {
            obj.insert(
                "arguments".to_string(),
                arguments_json(&command.args, arguments),
            );
        }
    }
    Json::Object(obj)
}

fn telem_json(packet: &TelemPacket, dict: Option<&Dictionary>) -> Json {
    let mut obj = json_obj(json!({
        "id": packet.id,
        "id_hex": format!("{:#x}", packet.id),
        "time": packet.time.to_json(),
        "value_raw": hex_prefixed(&packet.value_raw),
    }));
    if let Some(channel) = dict.and_then(|d| d.channel_by_id(packet.id)) {
        obj.insert("topology_name".to_string(), json!(channel.topology_name()));
        obj.insert("component".to_string(), json!(channel.component));
        obj.insert("name".to_string(), json!(channel.name));
        obj.insert("type".to_string(), json!(channel.type_name));
    }
    if let Some(ref value) = packet.value {
        obj.insert("value".to_string(), value.to_json());
    }
    Json::Object(obj)
}

fn event_json(packet: &EventPacket, dict: Option<&Dictionary>) -> Json {
    let mut obj = json_obj(json!({
        "id": packet.id,
        "id_hex": format!("{:#x}", packet.id),
        "time": packet.time.to_json(),
        "arguments_raw": hex_prefixed(&packet.arguments_raw),
    }));
    if let Some(event) = dict.and_then(|d| d.event_by_id(packet.id)) {
        obj.insert("topology_name".to_string(), json!(event.topology_name()));
        obj.insert("component".to_string(), json!(event.component));
        obj.insert("name".to_string(), json!(event.name));
        obj.insert("severity".to_string(), json!(event.severity.as_str()));
        if let (&Some(ref format), &Some(ref arguments)) =
            (&event.format_string, &packet.arguments)
        {
            obj.insert(
                "message".to_string(),
                json!(format_message(format, arguments)),
            );
        }
        if let Some(ref arguments) = packet.arguments {
            obj.insert(
                "arguments".to_string(),
                arguments_json(&event.args, arguments),
            );
        }
    }
    Json::Object(obj)
}

fn file_json(packet: &FilePacket) -> Json {
    let payload = match packet.payload {
        FilePayload::Start {
            file_size,
            ref source_path,
            ref destination_path,
        } => json!({
            "file_size": file_size,
            "source_path": { "length": source_path.len(), "value": source_path },
            "destination_path": {
                "length": destination_path.len(),
                "value": destination_path,
            },
        }),
        FilePayload::Data {
            byte_offset,
            ref data,
        } => json!({
            "byte_offset": byte_offset,
            "data_size": data.len(),
            "data": hex_prefixed(data),
        }),
        FilePayload::End { checksum } => json!({ "checksum": checksum }),
        FilePayload::Cancel => json!({}),
    };
    json!({
        "type": packet.payload.type_name(),
        "sequence_index": packet.sequence_index,
        "payload": payload,
    })
}

pub fn prm_record_json(record: &PrmDbRecord, dict: Option<&Dictionary>) -> Json {
    let mut obj = json_obj(json!({
        "offset": record.offset,
        "size": record.size,
        "id": record.id,
        "id_hex": format!("{:#x}", record.id),
        "value_raw": hex_prefixed(&record.value_raw),
    }));
    if let Some(parameter) = dict.and_then(|d| d.parameter_by_id(record.id)) {
        obj.insert(
            "topology_name".to_string(),
            json!(parameter.topology_name()),
        );
        obj.insert("component".to_string(), json!(parameter.component));
        obj.insert("name".to_string(), json!(parameter.name));
        if let Some(ref type_name) = parameter.type_name {
            obj.insert("type".to_string(), json!(type_name));
        }
    }
    if let Some(ref value) = record.value {
        obj.insert("value".to_string(), value.to_json());
    }
    Json::Object(obj)
}

fn json_obj(value: Json) -> Map<String, Json> {
    match value {
        Json::Object(obj) => obj,
        _ => Map::new(),
    }
}

/// Best-effort rendering of an event's format string.
///
/// Printf-style conversions are substituted with the decoded arguments in
/// order; `%%` is a literal percent sign and arguments that never decoded
/// print as `?`.
pub fn format_message(format: &str, arguments: &[Option<Value>]) -> String {
    let mut out = String::new();
    let mut chars = format.chars().peekable();
    let mut values = arguments.iter();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        // Skip flags, width and precision up to the conversion letter.
        let mut conversion = None;
        while let Some(c) = chars.next() {
            if c.is_ascii_alphabetic() {
                conversion = Some(c);
                break;
            }
        }
        let value = values.next().and_then(|v| v.as_ref());
        match (conversion, value) {
            (Some('x'), Some(value)) => match value.as_u64() {
                Some(v) => out.push_str(&format!("{:x}", v)),
                None => out.push_str(&value.to_string()),
            },
            (Some(_), Some(value)) => out.push_str(&value.to_string()),
            (Some(_), None) => out.push('?'),
            (None, _) => {}
        }
    }
    out
}

// -- TSV / VNLOG --------------------------------------------------------------

const COLUMNS: [&str; 25] = [
    "record_index",
    "record_offset",
    "packet_size",
    "packet_type_name",
    "packet_type_value",
    "packet_time",
    "telem_id",
    "telem_id_hex",
    "telem_topology_name",
    "telem_component",
    "telem_name",
    "telem_time",
    "telem_value_raw_size",
    "telem_value_raw",
    "telem_value",
    "event_id",
    "event_id_hex",
    "event_topology_name",
    "event_component",
    "event_name",
    "event_severity",
    "event_time",
    "event_arguments_raw_size",
    "event_arguments_raw",
    "payload",
];

/// Tab-separated output with the fixed 25-column layout.
///
/// TSV writes empty cells as empty strings; VNLOG prefixes the header line
/// with `#` and writes empty cells as `-`.
#[derive(Debug)]
pub struct ColumnPrinter<'a, W: Write> {
    out: W,
    dict: Option<&'a Dictionary>,
    vnlog: bool,
}

impl<'a, W: Write> ColumnPrinter<'a, W> {
    pub fn tsv(out: W, dict: Option<&'a Dictionary>) -> Self {
        ColumnPrinter {
            out,
            dict,
            vnlog: false,
        }
    }

    pub fn vnlog(out: W, dict: Option<&'a Dictionary>) -> Self {
        ColumnPrinter {
            out,
            dict,
            vnlog: true,
        }
    }

    fn empty_cell(&self) -> &'static str {
        if self.vnlog {
            "-"
        } else {
            ""
        }
    }
}

/// Builds the 25 cells for one record.
pub fn record_cells(index: u64, record: &Record, dict: Option<&Dictionary>, empty: &str) -> Vec<String> {
    let mut cells = vec![empty.to_string(); COLUMNS.len()];
    cells[0] = index.to_string();
    if let Some(offset) = record.offset {
        cells[1] = offset.to_string();
    }
    cells[2] = record.packet_size.to_string();
    cells[3] = record.packet.type_name().to_string();
    cells[4] = record.packet.type_value.to_string();

    match record.packet.payload {
        Payload::Telem(ref telem) => {
            cells[5] = telem.time.to_string();
            cells[6] = telem.id.to_string();
            cells[7] = format!("{:#x}", telem.id);
            if let Some(channel) = dict.and_then(|d| d.channel_by_id(telem.id)) {
                cells[8] = channel.topology_name();
                cells[9] = channel.component.clone();
                cells[10] = channel.name.clone();
            }
            cells[11] = telem.time.to_string();
            cells[12] = telem.value_raw.len().to_string();
            if !telem.value_raw.is_empty() {
                cells[13] = hex(&telem.value_raw);
            }
            if let Some(ref value) = telem.value {
                cells[14] = value.to_string();
            }
        }
        Payload::Log(ref event) => {
            cells[5] = event.time.to_string();
            cells[15] = event.id.to_string();
            cells[16] = format!("{:#x}", event.id);
            if let Some(def) = dict.and_then(|d| d.event_by_id(event.id)) {
                cells[17] = def.topology_name();
                cells[18] = def.component.clone();
                cells[19] = def.name.clone();
                cells[20] = def.severity.as_str().to_string();
            }
            cells[21] = event.time.to_string();
            cells[22] = event.arguments_raw.len().to_string();
            if !event.arguments_raw.is_empty() {
                cells[23] = hex(&event.arguments_raw);
            }
        }
        Payload::Command(ref command) => {
            cells[24] = hex(&command.arguments_raw);
        }
        Payload::PacketizedTlm(ref bytes)
        | Payload::Idle(ref bytes)
        | Payload::Unknown(ref bytes) => {
            cells[24] = hex(bytes);
        }
        Payload::File(_) => {}
    }

    cells
}

impl<'a, W: Write> Printer for ColumnPrinter<'a, W> {
    fn header(&mut self) -> io::Result<()> {
        let prefix = if self.vnlog { "#" } else { "" };
        writeln!(self.out, "{}{}", prefix, COLUMNS.join("\t"))
    }

    fn record(&mut self, index: u64, record: &Record) -> io::Result<()> {
        let cells = record_cells(index, record, self.dict, self.empty_cell());
        writeln!(self.out, "{}", cells.join("\t"))
    }

    fn footer(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fp_proto::packet::Decoder;
    use fp_proto::record::RecordFormat;
    use fp_proto::registry::{Config, TypeRegistry};
    use fp_proto::stream::SliceStream;
    use fp_proto::diag::LogDiagnostics;

    fn sample_log_record(registry: &TypeRegistry) -> Record {
        // LOG packet: event id 1234, zeroed time, two argument bytes.
        let mut bytes = vec![0x00, 0x15];
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x02]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x04, 0xd2]);
        bytes.extend_from_slice(&[0; 11]);
        bytes.extend_from_slice(&[0xab, 0xcd]);

        let diag = LogDiagnostics;
        let decoder = Decoder::new(registry, None, &diag);
        decoder
            .decode_record(RecordFormat::ComLogger, &mut SliceStream::new(&bytes))
            .unwrap()
    }

    #[test]
    fn rows_always_have_25_columns() {
        let registry = TypeRegistry::new(&Config::default()).unwrap();
        let record = sample_log_record(&registry);

        let cells = record_cells(3, &record, None, "-");
        assert_eq!(cells.len(), 25);
        assert_eq!(cells[0], "3");
        assert_eq!(cells[3], "LOG");
        assert_eq!(cells[5], "0.000000");
        assert_eq!(cells[15], "1234");
        assert_eq!(cells[16], "0x4d2");
        assert_eq!(cells[22], "2");
        assert_eq!(cells[23], "abcd");
        // Telemetry columns stay empty for a LOG record.
        assert_eq!(cells[6], "-");
        assert_eq!(cells[24], "-");
    }

    #[test]
    fn vnlog_header_and_empty_cells() {
        let registry = TypeRegistry::new(&Config::default()).unwrap();
        let record = sample_log_record(&registry);

        let mut out = Vec::new();
        {
            let mut printer = ColumnPrinter::vnlog(&mut out, None);
            printer.header().unwrap();
            printer.record(0, &record).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("#record_index\t"));
        assert_eq!(header.split('\t').count(), 25);
        let row = lines.next().unwrap();
        assert_eq!(row.split('\t').count(), 25);
        assert!(row.contains("\t-\t"));
    }

    #[test]
    fn tsv_empty_cells_are_empty_strings() {
        let registry = TypeRegistry::new(&Config::default()).unwrap();
        let record = sample_log_record(&registry);

        let mut out = Vec::new();
        {
            let mut printer = ColumnPrinter::tsv(&mut out, None);
            printer.record(0, &record).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.trim_end_matches('\n').split('\t').any(str::is_empty));
    }

    #[test]
    fn json_record_shape() {
        let registry = TypeRegistry::new(&Config::default()).unwrap();
        let record = sample_log_record(&registry);

        let json = record_json(&record, None);
        assert_eq!(json["packet_size"], json!(21));
        assert_eq!(json["packet"]["type"], json!("LOG"));
        assert_eq!(json["packet"]["payload"]["id"], json!(1234));
        assert_eq!(
            json["packet"]["payload"]["arguments_raw"],
            json!("0xabcd")
        );
    }

    #[test]
    fn message_formatting() {
        let arguments = vec![Some(Value::U32(3)), Some(Value::U32(255))];
        assert_eq!(
            format_message("saw %d packets at %08x", &arguments),
            "saw 3 packets at ff"
        );
        assert_eq!(format_message("100%% done", &[]), "100% done");
        assert_eq!(format_message("missing %d", &[None]), "missing ?");
    }
}
