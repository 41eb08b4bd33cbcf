//! The codec registry and the F Prime build configuration.
//!
//! F Prime deployments are compiled against a configuration that changes the
//! wire format: which fundamental type backs each `Fw*` alias, how booleans
//! are serialized and whether time stamps carry base/context fields. The
//! registry applies a [`Config`] once at construction and seeds the type
//! namespace with every built-in codec; the dictionary binder then registers
//! user-defined types into the same namespace.

use diag::Diagnostics;
use error::Error;
use stream::ByteStream;
use types::{
    BoolCodec, Codec, Endian, FundamentalCodec, Kind, StringCodec, Time, TimeCodec, Value,
};

use std::collections::HashMap;
use std::rc::Rc;

/// F Prime build configuration flags affecting the wire format.
#[derive(Debug, Clone)]
pub struct Config {
    /// `Fw::Time` carries a time base field.
    pub use_time_base: bool,
    /// `Fw::Time` carries a time context field.
    pub use_time_context: bool,
    /// Byte encoding of boolean true.
    pub true_byte: u8,
    /// Byte encoding of boolean false.
    pub false_byte: u8,
    /// Configurable type alias overrides as `(alias, fundamental name)`
    /// pairs, e.g. `("FwPacketDescriptor", "U8")`.
    pub aliases: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            use_time_base: true,
            use_time_context: true,
            true_byte: 0xff,
            false_byte: 0x00,
            aliases: Vec::new(),
        }
    }
}

/// The ten configurable type aliases and their default fundamentals.
pub const CONFIGURABLE_ALIASES: &[(&str, &str)] = &[
    ("FwBuffSize", "U16"),
    ("FwChanId", "U32"),
    ("FwEnumStore", "I32"),
    ("FwEventId", "U32"),
    ("FwOpcode", "U32"),
    ("FwPacketDescriptor", "U32"),
    ("FwPrmId", "U32"),
    ("FwTimeBaseStore", "U16"),
    ("FwTimeContextStore", "U8"),
    ("FwTlmPacketizeId", "U16"),
];

const FUNDAMENTALS: &[(Kind, &str)] = &[
    (Kind::I8, "I8"),
    (Kind::U8, "U8"),
    (Kind::I16, "I16"),
    (Kind::U16, "U16"),
    (Kind::I32, "I32"),
    (Kind::U32, "U32"),
    (Kind::I64, "I64"),
    (Kind::U64, "U64"),
    (Kind::F32, "F32"),
    (Kind::F64, "F64"),
];

/// Name → codec namespace.
///
/// Seeded with the built-in fundamentals, the configurable aliases, `bool`,
/// `string` and `Fw::Time`; the dictionary binder adds user types. All
/// registration happens before the first decode — afterwards the registry is
/// read-only and codecs are shared by `Rc` handles.
#[derive(Debug)]
pub struct TypeRegistry {
    types: HashMap<String, Rc<dyn Codec>>,
    fundamentals: HashMap<String, Rc<dyn Codec>>,
    aliases: HashMap<String, Rc<dyn Codec>>,
    time: Rc<dyn Codec>,
}

impl TypeRegistry {
    /// Builds the registry for a configuration.
    ///
    /// Fails with `Error::Config` when an alias override names anything but
    /// a fundamental type.
    pub fn new(config: &Config) -> Result<TypeRegistry, Error> {
        let mut fundamentals: HashMap<String, Rc<dyn Codec>> = HashMap::new();
        for &(kind, name) in FUNDAMENTALS {
            // The bare name family defaults to big-endian.
            fundamentals.insert(
                name.to_string(),
                Rc::new(FundamentalCodec::new(kind, Endian::Big)),
            );
            fundamentals.insert(
                format!("{}BE", name),
                Rc::new(FundamentalCodec::new(kind, Endian::Big)),
            );
            fundamentals.insert(
                format!("{}LE", name),
                Rc::new(FundamentalCodec::new(kind, Endian::Little)),
            );
            fundamentals.insert(
                format!("{}N", name),
                Rc::new(FundamentalCodec::new(kind, Endian::Native)),
            );
        }
        fundamentals.insert(
            "bool".to_string(),
            Rc::new(BoolCodec::new(config.true_byte, config.false_byte)),
        );

        for &(ref alias, _) in &config.aliases {
            if !CONFIGURABLE_ALIASES.iter().any(|&(name, _)| name == alias) {
                return Err(Error::Config(format!(
                    "unknown configurable type alias \"{}\"",
                    alias
                )));
            }
        }

        let mut types = fundamentals.clone();
        let mut aliases = HashMap::new();
        for &(alias, default) in CONFIGURABLE_ALIASES {
            let target = config
                .aliases
                .iter()
                .find(|&&(ref name, _)| name == alias)
                .map(|&(_, ref target)| target.as_str())
                .unwrap_or(default);
            let codec = fundamentals.get(target).cloned().ok_or_else(|| {
                Error::Config(format!(
                    "\"{}\" is not a fundamental type (while binding alias {})",
                    target, alias
                ))
            })?;
            aliases.insert(alias.to_string(), codec.clone());
            types.insert(alias.to_string(), codec);
        }

        let string = Rc::new(StringCodec::new(aliases["FwBuffSize"].clone()));
        types.insert("string".to_string(), string);

        let base = if config.use_time_base {
            Some(aliases["FwTimeBaseStore"].clone())
        } else {
            None
        };
        let context = if config.use_time_context {
            Some(aliases["FwTimeContextStore"].clone())
        } else {
            None
        };
        let time: Rc<dyn Codec> = Rc::new(TimeCodec::new(base, context));
        types.insert("Fw::Time".to_string(), time.clone());

        Ok(TypeRegistry {
            types,
            fundamentals,
            aliases,
            time,
        })
    }

    /// Looks up a codec by type name.
    pub fn get(&self, name: &str) -> Option<Rc<dyn Codec>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The codec bound to one of the configurable aliases.
    pub fn alias(&self, name: &str) -> Rc<dyn Codec> {
        self.aliases[name].clone()
    }

    /// Looks up a fundamental type by name (alias targets must come from
    /// this namespace).
    pub fn fundamental(&self, name: &str) -> Option<Rc<dyn Codec>> {
        self.fundamentals.get(name).cloned()
    }

    /// Registers a user type, warning on a namespace collision and
    /// replacing the previous codec.
    pub fn register(&mut self, name: &str, codec: Rc<dyn Codec>, diag: &dyn Diagnostics) {
        if self.types.contains_key(name) {
            diag.warning(&format!(
                "type named \"{}\" already exists in the type namespace and is being replaced",
                name
            ));
        }
        self.types.insert(name.to_string(), codec);
    }

    /// Decodes an identifier field through a configurable alias.
    pub fn decode_alias_u64(
        &self,
        name: &str,
        stream: &mut dyn ByteStream,
    ) -> Result<u64, Error> {
        let value = self.alias(name).decode(stream, None)?;
        value.as_u64().ok_or_else(|| {
            Error::MalformedPacket(format!("{} field is not an unsigned integer", name))
        })
    }

    /// Decodes an `Fw::Time` stamp with the configured layout.
    pub fn decode_time(&self, stream: &mut dyn ByteStream) -> Result<Time, Error> {
        match self.time.decode(stream, None)? {
            Value::Time(time) => Ok(time),
            other => Err(Error::MalformedPacket(format!(
                "expected a time stamp, got {:?}",
                other
            ))),
        }
    }

    /// Encodes an `Fw::Time` stamp with the configured layout.
    pub fn encode_time(&self, time: &Time, out: &mut Vec<u8>) -> Result<(), Error> {
        self.time.encode(&Value::Time(*time), out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag::Collect;
    use stream::SliceStream;
    use types::BufferCodec;

    #[test]
    fn default_aliases() {
        let registry = TypeRegistry::new(&Config::default()).unwrap();
        assert_eq!(registry.alias("FwPacketDescriptor").width(), Some(4));
        assert_eq!(registry.alias("FwBuffSize").width(), Some(2));
        assert_eq!(registry.alias("FwTimeContextStore").width(), Some(1));
        assert!(registry.get("U32LE").is_some());
        assert!(registry.get("bool").is_some());
        assert!(registry.get("string").is_some());
        assert!(registry.get("Fw::Time").is_some());
    }

    #[test]
    fn alias_override_changes_width() {
        let mut config = Config::default();
        config
            .aliases
            .push(("FwPacketDescriptor".to_string(), "U8".to_string()));
        let registry = TypeRegistry::new(&config).unwrap();
        assert_eq!(registry.alias("FwPacketDescriptor").width(), Some(1));

        let mut stream = SliceStream::new(&[0x02]);
        assert_eq!(
            registry
                .decode_alias_u64("FwPacketDescriptor", &mut stream)
                .unwrap(),
            2
        );
    }

    #[test]
    fn bad_alias_target_is_a_config_error() {
        let mut config = Config::default();
        config
            .aliases
            .push(("FwOpcode".to_string(), "string".to_string()));
        match TypeRegistry::new(&config) {
            Err(Error::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_alias_is_a_config_error() {
        let mut config = Config::default();
        config
            .aliases
            .push(("FwBogus".to_string(), "U8".to_string()));
        assert!(TypeRegistry::new(&config).is_err());
    }

    #[test]
    fn register_warns_on_collision() {
        let mut registry = TypeRegistry::new(&Config::default()).unwrap();
        let diag = Collect::new();
        registry.register("U32", Rc::new(BufferCodec), &diag);
        assert_eq!(diag.messages().len(), 1);
        assert!(registry.get("U32").unwrap().width().is_none());
    }
}
