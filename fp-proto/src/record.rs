//! Record framing: length-prefixed records, sync-word streams and the
//! parameter database format.
//!
//! A record is a size prefix plus exactly that many packet bytes. The framer
//! slices the packet bytes into a [`SliceStream`] before handing them to the
//! packet decoder; that sub-stream is what bounds the "read the rest"
//! payload decoders, so truncated or oversized payloads can never bleed into
//! the following record.

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;

use error::Error;
use packet::{Decoder, Packet};
use registry::TypeRegistry;
use stream::{read_u16_be, read_u32_be, ByteStream, SliceStream};
use types::Value;

/// Width of the size prefix that frames a record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RecordFormat {
    /// `ComLogger` log files: u16 size prefix.
    ComLogger,
    /// `fprime-gds` `recv.bin` logs: u32 size prefix.
    FprimeGds,
}

/// Sync word framing `fprime-gds` uplink/downlink streams.
pub const GDS_SYNC_WORD: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

/// Sync byte preceding each `PrmDb` parameter record.
pub const PRM_DB_SYNC_WORD: [u8; 1] = [0xa5];

/// A framed packet with its size prefix and source offset.
#[derive(Debug)]
pub struct Record {
    /// Offset of the size prefix in the source, when the source reports
    /// offsets.
    pub offset: Option<u64>,
    pub packet_size: u64,
    pub packet: Packet,
}

impl Record {
    /// Serializes the size prefix and the packet.
    ///
    /// The written size is recomputed from the encoded packet, so it always
    /// equals the exact byte length the packet occupies on the wire.
    pub fn encode(
        &self,
        format: RecordFormat,
        types: &TypeRegistry,
        out: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let mut packet = Vec::new();
        self.packet.encode(types, &mut packet)?;
        match format {
            RecordFormat::ComLogger => {
                if packet.len() > usize::from(u16::max_value()) {
                    return Err(Error::Encode(format!(
                        "packet of {} bytes does not fit a u16 size prefix",
                        packet.len()
                    )));
                }
                out.write_u16::<BigEndian>(packet.len() as u16)?;
            }
            RecordFormat::FprimeGds => out.write_u32::<BigEndian>(packet.len() as u32)?,
        }
        out.extend_from_slice(&packet);
        Ok(())
    }

    /// Serializes sync word plus record, as `fprime-gds` frames its stream
    /// sockets.
    pub fn encode_gds_stream(&self, types: &TypeRegistry, out: &mut Vec<u8>) -> Result<(), Error> {
        out.extend_from_slice(&GDS_SYNC_WORD);
        self.encode(RecordFormat::FprimeGds, types, out)
    }
}

/// A parameter database record.
///
/// `PrmDb` files have no defined encode path, so this type is decode-only.
#[derive(Debug)]
pub struct PrmDbRecord {
    pub offset: Option<u64>,
    pub size: u32,
    pub id: u64,
    pub value_raw: Bytes,
    /// Parameter value decoded via the dictionary.
    pub value: Option<Value>,
}

/// Consumes bytes until the sync word has been read.
///
/// The scan rolls back in the Knuth-Morris-Pratt manner: when a partial
/// match fails at position k > 0, the comparison restarts at position 0
/// without consuming the byte that broke the match, so overlapping
/// occurrences are found. Fails with `EndOfStream` when the stream ends
/// before the sync word completes.
pub fn read_until_sync_word(stream: &mut dyn ByteStream, sync_word: &[u8]) -> Result<(), Error> {
    let mut index = 0;
    let mut byte = 0;
    let mut read_next = true;
    while index < sync_word.len() {
        if read_next {
            byte = stream.read_byte()?;
        }
        if byte == sync_word[index] {
            index += 1;
            read_next = true;
        } else if index > 0 {
            index = 0;
            read_next = false;
        } else {
            read_next = true;
        }
    }
    Ok(())
}

impl<'a> Decoder<'a> {
    /// Decodes one length-prefixed record.
    pub fn decode_record(
        &self,
        format: RecordFormat,
        stream: &mut dyn ByteStream,
    ) -> Result<Record, Error> {
        let offset = stream.offset();
        let packet_size = match format {
            RecordFormat::ComLogger => u64::from(read_u16_be(stream)?),
            RecordFormat::FprimeGds => u64::from(read_u32_be(stream)?),
        };
        let buffer = stream.read_n(packet_size as usize)?;
        let mut packet_stream = SliceStream::new(&buffer);
        let packet = self.decode_packet(&mut packet_stream)?;
        Ok(Record {
            offset,
            packet_size,
            packet,
        })
    }

    /// Scans for the GDS sync word, then decodes the record that follows.
    pub fn decode_gds_stream_record(&self, stream: &mut dyn ByteStream) -> Result<Record, Error> {
        read_until_sync_word(stream, &GDS_SYNC_WORD)?;
        self.decode_record(RecordFormat::FprimeGds, stream)
    }

    /// Decodes one parameter database record.
    pub fn decode_prm_db_record(&self, stream: &mut dyn ByteStream) -> Result<PrmDbRecord, Error> {
        let offset = stream.offset();
        read_until_sync_word(stream, &PRM_DB_SYNC_WORD)?;
        let size = read_u32_be(stream)?;
        let id_codec = self.types.alias("FwPrmId");
        let id_width = id_codec.width().unwrap_or(4);
        let id = id_codec
            .decode(stream, None)?
            .as_u64()
            .ok_or_else(|| {
                Error::MalformedPacket("FwPrmId field is not an unsigned integer".to_string())
            })?;
        let value_len = (size as usize).checked_sub(id_width).ok_or_else(|| {
            Error::MalformedPacket(format!(
                "parameter record size {} is smaller than its ID field",
                size
            ))
        })?;
        let value_raw = Bytes::from(stream.read_n(value_len)?);

        let mut value = None;
        if let Some(dict) = self.dict {
            match dict.parameter_by_id(id) {
                Some(parameter) => {
                    if let Some(ref codec) = parameter.codec {
                        let mut raw = SliceStream::new(&value_raw);
                        value = Some(codec.decode(&mut raw, None)?);
                    }
                }
                None => self.diag.warning(&format!(
                    "could not find parameter ID \"{}\" in the FSW dictionary; \
                     the dictionary and the input data may not be compatible",
                    id
                )),
            }
        }

        Ok(PrmDbRecord {
            offset,
            size,
            id,
            value_raw,
            value,
        })
    }
}
