//! F Prime packet (`Fw::ComPacket`) parsing and serialization.
//!
//! A packet is a tagged payload: a `FwPacketDescriptor` value selects the
//! category, and the rest of the (confined) stream is the category payload.
//! Command, telemetry and event payloads end in a "read the rest" byte blob
//! whose interpretation needs the FSW dictionary; when one is loaded, the
//! decoder additionally resolves the blob into typed values.

use bytes::Bytes;
use num_traits::FromPrimitive;

use diag::Diagnostics;
use dictionary::Dictionary;
use error::Error;
use registry::TypeRegistry;
use stream::{read_u16_be, read_u32_be, ByteStream, SliceStream};
use types::{Time, Value};

use byteorder::{BigEndian, WriteBytesExt};

/// Packet categories keyed by the `FwPacketDescriptor` field.
#[allow(bad_style)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum PacketType {
    COMMAND = 0,
    TELEM = 1,
    LOG = 2,
    FILE = 3,
    PACKETIZED_TLM = 4,
    IDLE = 5,
    UNKNOWN = 0xff,
}

impl PacketType {
    /// The category a raw descriptor value maps to, if any.
    pub fn from_value(value: i64) -> Option<PacketType> {
        FromPrimitive::from_i64(value)
    }
}

/// A decoded packet: the raw descriptor value plus the category payload.
#[derive(Debug)]
pub struct Packet {
    /// Descriptor value as read off the wire. Preserved even when it maps
    /// to no known category.
    pub type_value: i64,
    pub payload: Payload,
}

#[derive(Debug)]
pub enum Payload {
    Command(CommandPacket),
    Telem(TelemPacket),
    Log(EventPacket),
    File(FilePacket),
    PacketizedTlm(Bytes),
    Idle(Bytes),
    Unknown(Bytes),
}

impl Packet {
    /// Category name as printed by the tool.
    pub fn type_name(&self) -> &'static str {
        match self.payload {
            Payload::Command(_) => "COMMAND",
            Payload::Telem(_) => "TELEM",
            Payload::Log(_) => "LOG",
            Payload::File(_) => "FILE",
            Payload::PacketizedTlm(_) => "PACKETIZED_TLM",
            Payload::Idle(_) => "IDLE",
            Payload::Unknown(_) => "UNKNOWN",
        }
    }

    /// Serializes the packet. The descriptor is written through the
    /// `FwPacketDescriptor` alias, so its width follows the configuration.
    pub fn encode(&self, types: &TypeRegistry, out: &mut Vec<u8>) -> Result<(), Error> {
        types
            .alias("FwPacketDescriptor")
            .encode(&Value::I64(self.type_value), out)?;
        match self.payload {
            Payload::Command(ref payload) => payload.encode(types, out),
            Payload::Telem(ref payload) => payload.encode(types, out),
            Payload::Log(ref payload) => payload.encode(types, out),
            Payload::File(ref payload) => payload.encode(out),
            Payload::PacketizedTlm(ref bytes)
            | Payload::Idle(ref bytes)
            | Payload::Unknown(ref bytes) => {
                out.extend_from_slice(bytes);
                Ok(())
            }
        }
    }
}

/// A command packet: opcode plus raw argument bytes.
#[derive(Debug)]
pub struct CommandPacket {
    pub opcode: u64,
    pub arguments_raw: Bytes,
    /// Arguments decoded via the dictionary, when it resolves the opcode.
    /// An argument whose type never bound stays `None`.
    pub arguments: Option<Vec<Option<Value>>>,
}

impl CommandPacket {
    fn encode(&self, types: &TypeRegistry, out: &mut Vec<u8>) -> Result<(), Error> {
        types
            .alias("FwOpcode")
            .encode(&Value::U64(self.opcode), out)?;
        out.extend_from_slice(&self.arguments_raw);
        Ok(())
    }
}

/// A telemetry packet: channel id, time stamp and raw channel value.
#[derive(Debug)]
pub struct TelemPacket {
    pub id: u64,
    pub time: Time,
    pub value_raw: Bytes,
    /// Channel value decoded via the dictionary.
    pub value: Option<Value>,
}

impl TelemPacket {
    fn encode(&self, types: &TypeRegistry, out: &mut Vec<u8>) -> Result<(), Error> {
        types.alias("FwChanId").encode(&Value::U64(self.id), out)?;
        types.encode_time(&self.time, out)?;
        out.extend_from_slice(&self.value_raw);
        Ok(())
    }
}

/// An event (log) packet: event id, time stamp and raw argument bytes.
#[derive(Debug)]
pub struct EventPacket {
    pub id: u64,
    pub time: Time,
    pub arguments_raw: Bytes,
    pub arguments: Option<Vec<Option<Value>>>,
}

impl EventPacket {
    fn encode(&self, types: &TypeRegistry, out: &mut Vec<u8>) -> Result<(), Error> {
        types.alias("FwEventId").encode(&Value::U64(self.id), out)?;
        types.encode_time(&self.time, out)?;
        out.extend_from_slice(&self.arguments_raw);
        Ok(())
    }
}

/// File transfer sub-packet types.
#[allow(bad_style)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum FilePacketType {
    START = 0,
    DATA = 1,
    END = 2,
    CANCEL = 3,
    NONE = 255,
}

/// A file transfer packet.
#[derive(Debug)]
pub struct FilePacket {
    pub sequence_index: u32,
    pub payload: FilePayload,
}

#[derive(Debug)]
pub enum FilePayload {
    Start {
        file_size: u32,
        /// u8 length prefix + ASCII bytes on the wire.
        source_path: String,
        destination_path: String,
    },
    Data {
        byte_offset: u32,
        /// Prefixed by a u16 data size on the wire.
        data: Bytes,
    },
    End {
        checksum: u32,
    },
    Cancel,
}

impl FilePayload {
    pub fn type_name(&self) -> &'static str {
        match *self {
            FilePayload::Start { .. } => "START",
            FilePayload::Data { .. } => "DATA",
            FilePayload::End { .. } => "END",
            FilePayload::Cancel => "CANCEL",
        }
    }

    fn type_value(&self) -> u8 {
        match *self {
            FilePayload::Start { .. } => FilePacketType::START as u8,
            FilePayload::Data { .. } => FilePacketType::DATA as u8,
            FilePayload::End { .. } => FilePacketType::END as u8,
            FilePayload::Cancel => FilePacketType::CANCEL as u8,
        }
    }
}

impl FilePacket {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        out.push(self.payload.type_value());
        out.write_u32::<BigEndian>(self.sequence_index)?;
        match self.payload {
            FilePayload::Start {
                file_size,
                ref source_path,
                ref destination_path,
            } => {
                out.write_u32::<BigEndian>(file_size)?;
                write_path(source_path, out)?;
                write_path(destination_path, out)?;
            }
            FilePayload::Data {
                byte_offset,
                ref data,
            } => {
                out.write_u32::<BigEndian>(byte_offset)?;
                out.write_u16::<BigEndian>(data.len() as u16)?;
                out.extend_from_slice(data);
            }
            FilePayload::End { checksum } => out.write_u32::<BigEndian>(checksum)?,
            FilePayload::Cancel => {}
        }
        Ok(())
    }
}

fn read_path(stream: &mut dyn ByteStream) -> Result<String, Error> {
    let length = stream.read_byte()? as usize;
    let data = stream.read_n(length)?;
    if !data.is_ascii() {
        return Err(Error::MalformedPacket("file path is not ASCII".to_string()));
    }
    String::from_utf8(data).map_err(|e| Error::MalformedPacket(e.to_string()))
}

fn write_path(path: &str, out: &mut Vec<u8>) -> Result<(), Error> {
    if !path.is_ascii() || path.len() > usize::from(u8::max_value()) {
        return Err(Error::Encode(format!("invalid file path {:?}", path)));
    }
    out.push(path.len() as u8);
    out.extend_from_slice(path.as_bytes());
    Ok(())
}

fn read_rest(stream: &mut dyn ByteStream) -> Result<Bytes, Error> {
    Ok(Bytes::from(stream.read_to_end()?))
}

/// Bundles the collaborators every decode needs: the codec registry, the
/// optional FSW dictionary and the warning sink.
#[derive(Debug, Copy, Clone)]
pub struct Decoder<'a> {
    pub types: &'a TypeRegistry,
    pub dict: Option<&'a Dictionary>,
    pub diag: &'a dyn Diagnostics,
}

impl<'a> Decoder<'a> {
    pub fn new(
        types: &'a TypeRegistry,
        dict: Option<&'a Dictionary>,
        diag: &'a dyn Diagnostics,
    ) -> Decoder<'a> {
        Decoder { types, dict, diag }
    }

    /// Decodes one packet from a stream confined to exactly the packet's
    /// bytes.
    ///
    /// Confinement matters: command, telemetry, event and idle payloads all
    /// read the rest of the stream. Framers arrange it by slicing the
    /// record's bytes into a [`SliceStream`] first.
    pub fn decode_packet(&self, stream: &mut dyn ByteStream) -> Result<Packet, Error> {
        let type_value = self
            .types
            .alias("FwPacketDescriptor")
            .decode(stream, None)?
            .as_i64()
            .ok_or_else(|| {
                Error::MalformedPacket("packet descriptor is not an integer".to_string())
            })?;

        let payload = match PacketType::from_i64(type_value) {
            Some(PacketType::COMMAND) => Payload::Command(self.decode_command(stream)?),
            Some(PacketType::TELEM) => Payload::Telem(self.decode_telem(stream)?),
            Some(PacketType::LOG) => Payload::Log(self.decode_event(stream)?),
            Some(PacketType::FILE) => Payload::File(self.decode_file(stream)?),
            Some(PacketType::PACKETIZED_TLM) => Payload::PacketizedTlm(read_rest(stream)?),
            Some(PacketType::IDLE) => Payload::Idle(read_rest(stream)?),
            Some(PacketType::UNKNOWN) => Payload::Unknown(read_rest(stream)?),
            None => {
                self.diag.warning(&format!(
                    "packet parsed with unknown type {}; forging on anyway",
                    type_value
                ));
                Payload::Unknown(read_rest(stream)?)
            }
        };

        Ok(Packet {
            type_value,
            payload,
        })
    }

    fn decode_command(&self, stream: &mut dyn ByteStream) -> Result<CommandPacket, Error> {
        let opcode = self.types.decode_alias_u64("FwOpcode", stream)?;
        let arguments_raw = read_rest(stream)?;

        let mut arguments = None;
        if let Some(dict) = self.dict {
            match dict.command_by_opcode(opcode) {
                Some(command) => {
                    let mut raw = SliceStream::new(&arguments_raw);
                    let mut decoded = Vec::with_capacity(command.args.len());
                    for arg in &command.args {
                        match arg.codec {
                            Some(ref codec) => {
                                decoded.push(Some(codec.decode(&mut raw, arg.length)?));
                            }
                            None => decoded.push(None),
                        }
                    }
                    arguments = Some(decoded);
                }
                None => self.diag.warning(&format!(
                    "could not find command opcode \"{}\" in the FSW dictionary; \
                     the dictionary and the input data may not be compatible",
                    opcode
                )),
            }
        }

        Ok(CommandPacket {
            opcode,
            arguments_raw,
            arguments,
        })
    }

    fn decode_telem(&self, stream: &mut dyn ByteStream) -> Result<TelemPacket, Error> {
        let id = self.types.decode_alias_u64("FwChanId", stream)?;
        let time = self.types.decode_time(stream)?;
        let value_raw = read_rest(stream)?;

        let mut value = None;
        if let Some(dict) = self.dict {
            match dict.channel_by_id(id) {
                Some(channel) => {
                    if let Some(ref codec) = channel.codec {
                        let mut raw = SliceStream::new(&value_raw);
                        value = Some(codec.decode(&mut raw, None)?);
                    }
                }
                None => self.diag.warning(&format!(
                    "could not find channel ID \"{}\" in the FSW dictionary; \
                     the dictionary and the input data may not be compatible",
                    id
                )),
            }
        }

        Ok(TelemPacket {
            id,
            time,
            value_raw,
            value,
        })
    }

    fn decode_event(&self, stream: &mut dyn ByteStream) -> Result<EventPacket, Error> {
        let id = self.types.decode_alias_u64("FwEventId", stream)?;
        let time = self.types.decode_time(stream)?;
        let arguments_raw = read_rest(stream)?;

        let mut arguments = None;
        if let Some(dict) = self.dict {
            match dict.event_by_id(id) {
                Some(event) => {
                    let mut raw = SliceStream::new(&arguments_raw);
                    let mut decoded = Vec::with_capacity(event.args.len());
                    for arg in &event.args {
                        match arg.codec {
                            Some(ref codec) => {
                                decoded.push(Some(codec.decode(&mut raw, arg.length)?));
                            }
                            None => decoded.push(None),
                        }
                    }
                    arguments = Some(decoded);
                }
                None => self.diag.warning(&format!(
                    "could not find event ID \"{}\" in the FSW dictionary; \
                     the dictionary and the input data may not be compatible",
                    id
                )),
            }
        }

        Ok(EventPacket {
            id,
            time,
            arguments_raw,
            arguments,
        })
    }

    fn decode_file(&self, stream: &mut dyn ByteStream) -> Result<FilePacket, Error> {
        let raw_type = stream.read_byte()?;
        let sequence_index = read_u32_be(stream)?;

        let payload = match FilePacketType::from_u8(raw_type) {
            Some(FilePacketType::START) => {
                let file_size = read_u32_be(stream)?;
                let source_path = read_path(stream)?;
                let destination_path = read_path(stream)?;
                FilePayload::Start {
                    file_size,
                    source_path,
                    destination_path,
                }
            }
            Some(FilePacketType::DATA) => {
                let byte_offset = read_u32_be(stream)?;
                let data_size = read_u16_be(stream)?;
                let data = Bytes::from(stream.read_n(usize::from(data_size))?);
                FilePayload::Data { byte_offset, data }
            }
            Some(FilePacketType::END) => FilePayload::End {
                checksum: read_u32_be(stream)?,
            },
            Some(FilePacketType::CANCEL) => FilePayload::Cancel,
            Some(FilePacketType::NONE) | None => {
                return Err(Error::MalformedPacket(format!(
                    "unknown file packet type {}",
                    raw_type
                )));
            }
        };

        Ok(FilePacket {
            sequence_index,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag::Collect;
    use registry::Config;
    use stream::SliceStream;

    fn registry() -> TypeRegistry {
        TypeRegistry::new(&Config::default()).unwrap()
    }

    fn decode(registry: &TypeRegistry, diag: &Collect, bytes: &[u8]) -> Result<Packet, Error> {
        let decoder = Decoder::new(registry, None, diag);
        decoder.decode_packet(&mut SliceStream::new(bytes))
    }

    #[test]
    fn log_packet() {
        // descriptor=LOG, event id 1234, zero time, no arguments
        let mut bytes = vec![0x00, 0x00, 0x00, 0x02];
        bytes.extend_from_slice(&[0x00, 0x00, 0x04, 0xd2]);
        bytes.extend_from_slice(&[0; 11]);

        let registry = registry();
        let diag = Collect::new();
        let packet = decode(&registry, &diag, &bytes).unwrap();
        assert_eq!(packet.type_name(), "LOG");
        assert_eq!(packet.type_value, 2);
        match packet.payload {
            Payload::Log(ref event) => {
                assert_eq!(event.id, 1234);
                assert_eq!(event.time.seconds, 0);
                assert!(event.arguments_raw.is_empty());
                assert!(event.arguments.is_none());
            }
            ref other => panic!("expected a LOG payload, got {:?}", other),
        }
        assert!(diag.messages().is_empty());
    }

    #[test]
    fn unknown_packet_type_forges_on() {
        let bytes = [0x00, 0x00, 0x00, 0x2a, 0xaa, 0xbb];
        let registry = registry();
        let diag = Collect::new();
        let packet = decode(&registry, &diag, &bytes).unwrap();
        assert_eq!(packet.type_value, 42);
        match packet.payload {
            Payload::Unknown(ref bytes) => assert_eq!(&bytes[..], &[0xaa, 0xbb]),
            ref other => panic!("expected an opaque payload, got {:?}", other),
        }
        assert_eq!(diag.messages().len(), 1);
    }

    #[test]
    fn declared_unknown_type_is_silent() {
        let bytes = [0x00, 0x00, 0x00, 0xff, 0x01];
        let registry = registry();
        let diag = Collect::new();
        let packet = decode(&registry, &diag, &bytes).unwrap();
        assert_eq!(packet.type_name(), "UNKNOWN");
        assert!(diag.messages().is_empty());
    }

    #[test]
    fn file_start_packet() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x03]; // descriptor=FILE
        bytes.push(0x00); // sub-type START
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]); // sequence 1
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x2a]); // file size 42
        bytes.extend_from_slice(&[0x03, b'f', b'o', b'o']);
        bytes.extend_from_slice(&[0x03, b'b', b'a', b'r']);

        let registry = registry();
        let diag = Collect::new();
        let packet = decode(&registry, &diag, &bytes).unwrap();
        match packet.payload {
            Payload::File(ref file) => {
                assert_eq!(file.sequence_index, 1);
                match file.payload {
                    FilePayload::Start {
                        file_size,
                        ref source_path,
                        ref destination_path,
                    } => {
                        assert_eq!(file_size, 42);
                        assert_eq!(source_path, "foo");
                        assert_eq!(destination_path, "bar");
                    }
                    ref other => panic!("expected START, got {:?}", other),
                }
            }
            ref other => panic!("expected a FILE payload, got {:?}", other),
        }
    }

    #[test]
    fn file_packet_with_bad_sub_type_is_malformed() {
        let bytes = [0x00, 0x00, 0x00, 0x03, 0x09, 0x00, 0x00, 0x00, 0x01];
        let registry = registry();
        let diag = Collect::new();
        match decode(&registry, &diag, &bytes) {
            Err(Error::MalformedPacket(_)) => {}
            other => panic!("expected MalformedPacket, got {:?}", other),
        }
    }

    #[test]
    fn empty_stream_fails_with_end_of_stream() {
        let registry = registry();
        let diag = Collect::new();
        match decode(&registry, &diag, &[]) {
            Err(Error::EndOfStream) => {}
            other => panic!("expected EndOfStream, got {:?}", other),
        }
    }

    #[test]
    fn packet_round_trip() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x00]; // COMMAND
        bytes.extend_from_slice(&[0x00, 0x00, 0x10, 0x01]); // opcode
        bytes.extend_from_slice(&[0xca, 0xfe]); // raw arguments

        let registry = registry();
        let diag = Collect::new();
        let packet = decode(&registry, &diag, &bytes).unwrap();

        let mut out = Vec::new();
        packet.encode(&registry, &mut out).unwrap();
        assert_eq!(out, bytes);
    }
}
