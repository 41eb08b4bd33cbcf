//! FSW dictionary parsing and type binding.
//!
//! The dictionary is an XML artifact enumerating a deployment's commands,
//! events, telemetry channels, parameters and user-defined types, keyed by
//! the numeric IDs used on the wire. Loading happens in two steps: the XML
//! is parsed into descriptor structs, then the binder constructs a codec for
//! every declared type and resolves cross references (argument types,
//! channel types, parameter set-commands).
//!
//! Several dictionaries can be merged by loading them into the same
//! `Dictionary`; later files win namespace collisions (with a warning).

use roxmltree::{Document, Node};

use diag::Diagnostics;
use error::Error;
use registry::TypeRegistry;
use types::{ArrayCodec, Codec, EnumCodec, SerializableCodec};

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

/// Event severity levels as declared in dictionary XML.
#[allow(bad_style)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Severity {
    FATAL,
    WARNING_HI,
    WARNING_LO,
    COMMAND,
    ACTIVITY_HI,
    ACTIVITY_LO,
    DIAGNOSTIC,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Severity::FATAL => "FATAL",
            Severity::WARNING_HI => "WARNING_HI",
            Severity::WARNING_LO => "WARNING_LO",
            Severity::COMMAND => "COMMAND",
            Severity::ACTIVITY_HI => "ACTIVITY_HI",
            Severity::ACTIVITY_LO => "ACTIVITY_LO",
            Severity::DIAGNOSTIC => "DIAGNOSTIC",
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Severity, Error> {
        Ok(match s {
            "FATAL" => Severity::FATAL,
            "WARNING_HI" => Severity::WARNING_HI,
            "WARNING_LO" => Severity::WARNING_LO,
            "COMMAND" => Severity::COMMAND,
            "ACTIVITY_HI" => Severity::ACTIVITY_HI,
            "ACTIVITY_LO" => Severity::ACTIVITY_LO,
            "DIAGNOSTIC" => Severity::DIAGNOSTIC,
            _ => {
                return Err(Error::Dictionary(format!(
                    "unknown event severity \"{}\"",
                    s
                )));
            }
        })
    }
}

#[derive(Debug)]
pub struct EnumItem {
    pub name: String,
    pub value: i64,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct EnumDef {
    pub name: String,
    pub items: Vec<EnumItem>,
    pub codec: Option<Rc<dyn Codec>>,
}

#[derive(Debug)]
pub struct MemberDef {
    pub name: String,
    pub type_name: String,
    pub format_specifier: Option<String>,
    pub length: Option<usize>,
}

#[derive(Debug)]
pub struct SerializableDef {
    pub name: String,
    pub members: Vec<MemberDef>,
    pub codec: Option<Rc<dyn Codec>>,
}

#[derive(Debug)]
pub struct ArrayDef {
    pub name: String,
    pub element_type_name: String,
    pub type_id: Option<u64>,
    pub size: usize,
    pub format: Option<String>,
    pub codec: Option<Rc<dyn Codec>>,
}

/// A command or event argument.
#[derive(Debug)]
pub struct ArgDef {
    pub name: String,
    pub type_name: String,
    pub length: Option<usize>,
    pub description: Option<String>,
    /// Bound during the resolve phase; stays `None` when the type name
    /// never appears in the namespace.
    pub codec: Option<Rc<dyn Codec>>,
}

#[derive(Debug)]
pub struct CommandDef {
    pub component: String,
    pub mnemonic: String,
    pub opcode: u64,
    pub description: Option<String>,
    pub args: Vec<ArgDef>,
}

impl CommandDef {
    pub fn topology_name(&self) -> String {
        format!("{}.{}", self.component, self.mnemonic)
    }
}

#[derive(Debug)]
pub struct EventDef {
    pub component: String,
    pub name: String,
    pub id: u64,
    pub severity: Severity,
    pub format_string: Option<String>,
    pub description: Option<String>,
    pub args: Vec<ArgDef>,
}

impl EventDef {
    pub fn topology_name(&self) -> String {
        format!("{}.{}", self.component, self.name)
    }
}

#[derive(Debug)]
pub struct ChannelDef {
    pub component: String,
    pub name: String,
    pub id: u64,
    pub format_string: Option<String>,
    pub description: Option<String>,
    pub type_name: String,
    pub codec: Option<Rc<dyn Codec>>,
}

impl ChannelDef {
    pub fn topology_name(&self) -> String {
        format!("{}.{}", self.component, self.name)
    }
}

#[derive(Debug)]
pub struct ParameterDef {
    pub component: String,
    pub name: String,
    pub id: u64,
    pub default: Option<String>,
    /// Taken from the sole argument of the sibling `_PRM_SET` command.
    pub type_name: Option<String>,
    pub codec: Option<Rc<dyn Codec>>,
}

impl ParameterDef {
    pub fn topology_name(&self) -> String {
        format!("{}.{}", self.component, self.name)
    }
}

/// Parsed and bound dictionary contents.
///
/// Commands, events, channels and parameters are keyed by
/// `(component, name)`; the `*_by_id` indexes map the wire identifiers back
/// to those keys.
#[derive(Debug, Default)]
pub struct Dictionary {
    pub enums: HashMap<String, EnumDef>,
    pub serializables: HashMap<String, SerializableDef>,
    pub arrays: HashMap<String, ArrayDef>,
    pub commands: HashMap<(String, String), CommandDef>,
    pub events: HashMap<(String, String), EventDef>,
    pub channels: HashMap<(String, String), ChannelDef>,
    pub parameters: HashMap<(String, String), ParameterDef>,
    commands_by_opcode: HashMap<u64, (String, String)>,
    events_by_id: HashMap<u64, (String, String)>,
    channels_by_id: HashMap<u64, (String, String)>,
    parameters_by_id: HashMap<u64, (String, String)>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary::default()
    }

    /// Loads a dictionary file, merging into already loaded content, and
    /// binds codecs for everything it declares.
    pub fn load(
        &mut self,
        path: &Path,
        registry: &mut TypeRegistry,
        diag: &dyn Diagnostics,
    ) -> Result<(), Error> {
        let text = fs::read_to_string(path)?;
        self.load_str(&text, registry, diag)
    }

    /// Same as [`load`](#method.load), from in-memory XML.
    pub fn load_str(
        &mut self,
        xml: &str,
        registry: &mut TypeRegistry,
        diag: &dyn Diagnostics,
    ) -> Result<(), Error> {
        self.parse(xml)?;
        self.bind(registry, diag);
        Ok(())
    }

    pub fn command_by_opcode(&self, opcode: u64) -> Option<&CommandDef> {
        self.commands_by_opcode
            .get(&opcode)
            .and_then(|key| self.commands.get(key))
    }

    pub fn event_by_id(&self, id: u64) -> Option<&EventDef> {
        self.events_by_id.get(&id).and_then(|key| self.events.get(key))
    }

    pub fn channel_by_id(&self, id: u64) -> Option<&ChannelDef> {
        self.channels_by_id
            .get(&id)
            .and_then(|key| self.channels.get(key))
    }

    pub fn parameter_by_id(&self, id: u64) -> Option<&ParameterDef> {
        self.parameters_by_id
            .get(&id)
            .and_then(|key| self.parameters.get(key))
    }

    fn parse(&mut self, xml: &str) -> Result<(), Error> {
        let doc = Document::parse(xml).map_err(|e| Error::Dictionary(e.to_string()))?;
        for collection in doc.root_element().children().filter(Node::is_element) {
            match collection.tag_name().name() {
                "enums" => {
                    for elem in collection.children().filter(|n| n.has_tag_name("enum")) {
                        let def = parse_enum(&elem)?;
                        self.enums.insert(def.name.clone(), def);
                    }
                }
                "serializables" => {
                    for elem in collection
                        .children()
                        .filter(|n| n.has_tag_name("serializable"))
                    {
                        let def = parse_serializable(&elem)?;
                        self.serializables.insert(def.name.clone(), def);
                    }
                }
                "arrays" => {
                    for elem in collection.children().filter(|n| n.has_tag_name("array")) {
                        let def = parse_array(&elem)?;
                        self.arrays.insert(def.name.clone(), def);
                    }
                }
                "commands" => {
                    for elem in collection.children().filter(|n| n.has_tag_name("command")) {
                        let def = parse_command(&elem)?;
                        let key = (def.component.clone(), def.mnemonic.clone());
                        self.commands_by_opcode.insert(def.opcode, key.clone());
                        self.commands.insert(key, def);
                    }
                }
                "events" => {
                    for elem in collection.children().filter(|n| n.has_tag_name("event")) {
                        let def = parse_event(&elem)?;
                        let key = (def.component.clone(), def.name.clone());
                        self.events_by_id.insert(def.id, key.clone());
                        self.events.insert(key, def);
                    }
                }
                "channels" => {
                    for elem in collection.children().filter(|n| n.has_tag_name("channel")) {
                        let def = parse_channel(&elem)?;
                        let key = (def.component.clone(), def.name.clone());
                        self.channels_by_id.insert(def.id, key.clone());
                        self.channels.insert(key, def);
                    }
                }
                "parameters" => {
                    for elem in collection
                        .children()
                        .filter(|n| n.has_tag_name("parameter"))
                    {
                        let def = parse_parameter(&elem)?;
                        let key = (def.component.clone(), def.name.clone());
                        self.parameters_by_id.insert(def.id, key.clone());
                        self.parameters.insert(key, def);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Constructs codecs for user types and resolves cross references.
    fn bind(&mut self, registry: &mut TypeRegistry, diag: &dyn Diagnostics) {
        // Enums never depend on other user types.
        for def in self.enums.values_mut() {
            if def.codec.is_some() {
                continue;
            }
            let codec = Rc::new(EnumCodec::new(
                registry.alias("FwEnumStore"),
                def.items.iter().map(|item| (item.name.clone(), item.value)),
            ));
            def.codec = Some(codec.clone());
            registry.register(&def.name, codec, diag);
        }

        // Arrays and serializables may reference each other in any order, so
        // construct to a fix point instead of a single declaration-order
        // pass.
        loop {
            let mut progress = false;
            for def in self.arrays.values_mut() {
                if def.codec.is_some() {
                    continue;
                }
                if let Some(element) = registry.get(&def.element_type_name) {
                    let codec = Rc::new(ArrayCodec::new(element, def.size));
                    def.codec = Some(codec.clone());
                    registry.register(&def.name, codec, diag);
                    progress = true;
                }
            }
            for def in self.serializables.values_mut() {
                if def.codec.is_some() {
                    continue;
                }
                let members: Option<Vec<_>> = def
                    .members
                    .iter()
                    .map(|member| {
                        registry
                            .get(&member.type_name)
                            .map(|codec| (member.name.clone(), codec))
                    })
                    .collect();
                if let Some(members) = members {
                    let codec = Rc::new(SerializableCodec::new(members));
                    def.codec = Some(codec.clone());
                    registry.register(&def.name, codec, diag);
                    progress = true;
                }
            }
            if !progress {
                break;
            }
        }
        for def in self.arrays.values() {
            if def.codec.is_none() {
                diag.warning(&format!(
                    "could not find type \"{}\" for array \"{}\" in the type namespace",
                    def.element_type_name, def.name
                ));
            }
        }
        for def in self.serializables.values() {
            if def.codec.is_none() {
                for member in &def.members {
                    if !registry.contains(&member.type_name) {
                        diag.warning(&format!(
                            "could not find type \"{}\" for serializable \"{}\" in the type \
                             namespace",
                            member.type_name, def.name
                        ));
                    }
                }
            }
        }

        // Commands, events and channels resolve their codecs by type name.
        for def in self.commands.values_mut() {
            let topology_name = format!("{}.{}", def.component, def.mnemonic);
            for arg in &mut def.args {
                if arg.codec.is_some() {
                    continue;
                }
                arg.codec = registry.get(&arg.type_name);
                if arg.codec.is_none() {
                    diag.warning(&format!(
                        "could not find type \"{}\" for argument \"{}\" of command \"{}\"",
                        arg.type_name, arg.name, topology_name
                    ));
                }
            }
        }
        for def in self.events.values_mut() {
            let topology_name = format!("{}.{}", def.component, def.name);
            for arg in &mut def.args {
                if arg.codec.is_some() {
                    continue;
                }
                arg.codec = registry.get(&arg.type_name);
                if arg.codec.is_none() {
                    diag.warning(&format!(
                        "could not find type \"{}\" for argument \"{}\" of event \"{}\"",
                        arg.type_name, arg.name, topology_name
                    ));
                }
            }
        }
        for def in self.channels.values_mut() {
            if def.codec.is_some() {
                continue;
            }
            def.codec = registry.get(&def.type_name);
            if def.codec.is_none() {
                diag.warning(&format!(
                    "could not find type \"{}\" for channel \"{}.{}\"",
                    def.type_name, def.component, def.name
                ));
            }
        }

        // A parameter's type is whatever the sole argument of its sibling
        // `<component>.<name>_PRM_SET` command carries.
        let mut resolved = Vec::new();
        for (key, def) in &self.parameters {
            if def.codec.is_some() {
                continue;
            }
            let set_key = (def.component.clone(), format!("{}_PRM_SET", def.name));
            match self.commands.get(&set_key) {
                None => diag.warning(&format!(
                    "could not find command \"{}.{}\" for parameter \"{}\"",
                    set_key.0,
                    set_key.1,
                    def.topology_name()
                )),
                Some(command) if command.args.len() != 1 => diag.warning(&format!(
                    "command \"{}\" has {} arguments when it should have exactly 1",
                    command.topology_name(),
                    command.args.len()
                )),
                Some(command) => resolved.push((
                    key.clone(),
                    command.args[0].type_name.clone(),
                    command.args[0].codec.clone(),
                )),
            }
        }
        for (key, type_name, codec) in resolved {
            if let Some(def) = self.parameters.get_mut(&key) {
                def.type_name = Some(type_name);
                def.codec = codec;
            }
        }
    }
}

fn require_attr(node: &Node, name: &str) -> Result<String, Error> {
    node.attribute(name).map(str::to_string).ok_or_else(|| {
        Error::Dictionary(format!(
            "<{}> is missing the \"{}\" attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn optional_attr(node: &Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// Parses a decimal or `0x`-prefixed hex integer attribute.
fn parse_u64(text: &str) -> Result<u64, Error> {
    let text = text.trim();
    let parsed = if text.starts_with("0x") || text.starts_with("0X") {
        u64::from_str_radix(&text[2..], 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| Error::Dictionary(format!("invalid integer \"{}\"", text)))
}

fn parse_i64(text: &str) -> Result<i64, Error> {
    let text = text.trim();
    let parsed = if text.starts_with("0x") || text.starts_with("0X") {
        i64::from_str_radix(&text[2..], 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| Error::Dictionary(format!("invalid integer \"{}\"", text)))
}

fn parse_usize(text: &str) -> Result<usize, Error> {
    Ok(parse_u64(text)? as usize)
}

fn parse_length(node: &Node) -> Result<Option<usize>, Error> {
    match node.attribute("len") {
        Some(text) => Ok(Some(parse_usize(text)?)),
        None => Ok(None),
    }
}

fn parse_enum(elem: &Node) -> Result<EnumDef, Error> {
    let mut items = Vec::new();
    for item in elem.children().filter(|n| n.has_tag_name("item")) {
        items.push(EnumItem {
            name: require_attr(&item, "name")?,
            value: parse_i64(&require_attr(&item, "value")?)?,
            description: optional_attr(&item, "description"),
        });
    }
    Ok(EnumDef {
        name: require_attr(elem, "type")?,
        items,
        codec: None,
    })
}

fn parse_serializable(elem: &Node) -> Result<SerializableDef, Error> {
    let mut members = Vec::new();
    if let Some(list) = elem.children().find(|n| n.has_tag_name("members")) {
        for member in list.children().filter(|n| n.has_tag_name("member")) {
            members.push(MemberDef {
                name: require_attr(&member, "name")?,
                type_name: require_attr(&member, "type")?,
                format_specifier: optional_attr(&member, "format_specifier"),
                length: parse_length(&member)?,
            });
        }
    }
    Ok(SerializableDef {
        name: require_attr(elem, "type")?,
        members,
        codec: None,
    })
}

fn parse_array(elem: &Node) -> Result<ArrayDef, Error> {
    let type_id = match elem.attribute("type_id") {
        Some(text) => Some(parse_u64(text)?),
        None => None,
    };
    Ok(ArrayDef {
        name: require_attr(elem, "name")?,
        element_type_name: require_attr(elem, "type")?,
        type_id,
        size: parse_usize(&require_attr(elem, "size")?)?,
        format: optional_attr(elem, "format"),
        codec: None,
    })
}

fn parse_args(elem: &Node) -> Result<Vec<ArgDef>, Error> {
    let mut args = Vec::new();
    // Some generated commands (the `*_PRM_SAVE` family) carry no <args>
    // block at all; treat that the same as an empty one.
    if let Some(list) = elem.children().find(|n| n.has_tag_name("args")) {
        for arg in list.children().filter(|n| n.has_tag_name("arg")) {
            args.push(ArgDef {
                name: require_attr(&arg, "name")?,
                type_name: require_attr(&arg, "type")?,
                length: parse_length(&arg)?,
                description: optional_attr(&arg, "description"),
                codec: None,
            });
        }
    }
    Ok(args)
}

fn parse_command(elem: &Node) -> Result<CommandDef, Error> {
    Ok(CommandDef {
        component: require_attr(elem, "component")?,
        mnemonic: require_attr(elem, "mnemonic")?,
        opcode: parse_u64(&require_attr(elem, "opcode")?)?,
        description: optional_attr(elem, "description"),
        args: parse_args(elem)?,
    })
}

fn parse_event(elem: &Node) -> Result<EventDef, Error> {
    Ok(EventDef {
        component: require_attr(elem, "component")?,
        name: require_attr(elem, "name")?,
        id: parse_u64(&require_attr(elem, "id")?)?,
        severity: require_attr(elem, "severity")?.parse()?,
        format_string: optional_attr(elem, "format_string"),
        description: optional_attr(elem, "description"),
        args: parse_args(elem)?,
    })
}

fn parse_channel(elem: &Node) -> Result<ChannelDef, Error> {
    Ok(ChannelDef {
        component: require_attr(elem, "component")?,
        name: require_attr(elem, "name")?,
        id: parse_u64(&require_attr(elem, "id")?)?,
        format_string: optional_attr(elem, "format_string"),
        description: optional_attr(elem, "description"),
        type_name: require_attr(elem, "type")?,
        codec: None,
    })
}

fn parse_parameter(elem: &Node) -> Result<ParameterDef, Error> {
    Ok(ParameterDef {
        component: require_attr(elem, "component")?,
        name: require_attr(elem, "name")?,
        id: parse_u64(&require_attr(elem, "id")?)?,
        default: optional_attr(elem, "default"),
        type_name: None,
        codec: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag::Collect;
    use packet::{Decoder, Payload};
    use registry::Config;
    use stream::SliceStream;
    use types::Value;

    fn load(xml: &str) -> (Dictionary, TypeRegistry, Collect) {
        let mut registry = TypeRegistry::new(&Config::default()).unwrap();
        let diag = Collect::new();
        let mut dict = Dictionary::new();
        dict.load_str(xml, &mut registry, &diag).unwrap();
        (dict, registry, diag)
    }

    #[test]
    fn telemetry_channel_with_enum_type() {
        let xml = r#"
            <dictionary>
                <enums>
                    <enum type="Mode">
                        <item name="IDLE" value="0"/>
                        <item name="RUN" value="1"/>
                    </enum>
                </enums>
                <channels>
                    <channel component="C" name="mode" id="0x10" type="Mode"/>
                </channels>
            </dictionary>
        "#;
        let (dict, registry, diag) = load(xml);
        assert!(diag.messages().is_empty());
        assert_eq!(dict.channel_by_id(0x10).unwrap().name, "mode");

        // TELEM packet: id 0x10, zeroed time, value 1.
        let mut bytes = vec![0x00, 0x00, 0x00, 0x01];
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x10]);
        bytes.extend_from_slice(&[0; 11]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);

        let decoder = Decoder::new(&registry, Some(&dict), &diag);
        let packet = decoder.decode_packet(&mut SliceStream::new(&bytes)).unwrap();
        match packet.payload {
            Payload::Telem(ref telem) => {
                assert_eq!(telem.id, 0x10);
                assert_eq!(
                    telem.value,
                    Some(Value::Enum {
                        name: Some("RUN".to_string()),
                        value: 1,
                    })
                );
            }
            ref other => panic!("expected a TELEM payload, got {:?}", other),
        }
    }

    #[test]
    fn forward_references_bind_to_a_fix_point() {
        // The serializable references the array, which is declared after it
        // and itself references an enum.
        let xml = r#"
            <dictionary>
                <serializables>
                    <serializable type="Pair">
                        <members>
                            <member name="modes" type="ModeList"/>
                            <member name="count" type="U8"/>
                        </members>
                    </serializable>
                </serializables>
                <arrays>
                    <array name="ModeList" type="Mode" size="2"/>
                </arrays>
                <enums>
                    <enum type="Mode">
                        <item name="IDLE" value="0"/>
                    </enum>
                </enums>
            </dictionary>
        "#;
        let (dict, registry, diag) = load(xml);
        assert!(diag.messages().is_empty());
        assert!(dict.serializables["Pair"].codec.is_some());
        assert!(dict.arrays["ModeList"].codec.is_some());
        // FwEnumStore (i32) * 2 + u8
        assert_eq!(registry.get("Pair").unwrap().width(), Some(9));
    }

    #[test]
    fn unresolved_member_warns_and_stays_unbound() {
        let xml = r#"
            <dictionary>
                <serializables>
                    <serializable type="Broken">
                        <members>
                            <member name="field" type="NoSuchType"/>
                        </members>
                    </serializable>
                </serializables>
            </dictionary>
        "#;
        let (dict, registry, diag) = load(xml);
        assert!(dict.serializables["Broken"].codec.is_none());
        assert!(registry.get("Broken").is_none());
        assert_eq!(diag.messages().len(), 1);
    }

    #[test]
    fn unresolved_command_argument_leaves_a_placeholder() {
        let xml = r#"
            <dictionary>
                <commands>
                    <command component="C" mnemonic="GO" opcode="0x200">
                        <args>
                            <arg name="speed" type="U32"/>
                            <arg name="mystery" type="NoSuchType"/>
                        </args>
                    </command>
                </commands>
            </dictionary>
        "#;
        let (dict, registry, diag) = load(xml);
        assert_eq!(diag.messages().len(), 1);

        // COMMAND packet for opcode 0x200 with a u32 argument.
        let mut bytes = vec![0x00, 0x00, 0x00, 0x00];
        bytes.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x07]);

        let decoder = Decoder::new(&registry, Some(&dict), &diag);
        let packet = decoder.decode_packet(&mut SliceStream::new(&bytes)).unwrap();
        match packet.payload {
            Payload::Command(ref command) => {
                assert_eq!(
                    command.arguments,
                    Some(vec![Some(Value::U32(7)), None])
                );
            }
            ref other => panic!("expected a COMMAND payload, got {:?}", other),
        }
    }

    #[test]
    fn parameter_type_comes_from_its_set_command() {
        let xml = r#"
            <dictionary>
                <commands>
                    <command component="C" mnemonic="gain_PRM_SET" opcode="0x300">
                        <args>
                            <arg name="val" type="F32"/>
                        </args>
                    </command>
                </commands>
                <parameters>
                    <parameter component="C" name="gain" id="0x42"/>
                </parameters>
            </dictionary>
        "#;
        let (dict, _registry, diag) = load(xml);
        assert!(diag.messages().is_empty());
        let parameter = dict.parameter_by_id(0x42).unwrap();
        assert_eq!(parameter.type_name.as_ref().map(String::as_str), Some("F32"));
        assert!(parameter.codec.is_some());
    }

    #[test]
    fn missing_set_command_warns() {
        let xml = r#"
            <dictionary>
                <parameters>
                    <parameter component="C" name="gain" id="66"/>
                </parameters>
            </dictionary>
        "#;
        let (dict, _registry, diag) = load(xml);
        assert!(dict.parameter_by_id(66).unwrap().codec.is_none());
        assert_eq!(diag.messages().len(), 1);
    }

    #[test]
    fn event_severity_and_unknown_severity() {
        let xml = r#"
            <dictionary>
                <events>
                    <event component="C" name="Boom" id="7" severity="WARNING_HI"
                           format_string="boom %d">
                        <args>
                            <arg name="count" type="U32"/>
                        </args>
                    </event>
                </events>
            </dictionary>
        "#;
        let (dict, _registry, _diag) = load(xml);
        let event = dict.event_by_id(7).unwrap();
        assert_eq!(event.severity, Severity::WARNING_HI);
        assert_eq!(event.severity.as_str(), "WARNING_HI");

        let bad = r#"
            <dictionary>
                <events>
                    <event component="C" name="Boom" id="7" severity="SHRUG">
                        <args/>
                    </event>
                </events>
            </dictionary>
        "#;
        let mut registry = TypeRegistry::new(&Config::default()).unwrap();
        let diag = Collect::new();
        let mut dict = Dictionary::new();
        assert!(dict.load_str(bad, &mut registry, &diag).is_err());
    }

    #[test]
    fn merging_dictionaries_warns_on_collision() {
        let first = r#"
            <dictionary>
                <enums>
                    <enum type="Mode">
                        <item name="IDLE" value="0"/>
                    </enum>
                </enums>
            </dictionary>
        "#;
        let second = r#"
            <dictionary>
                <channels>
                    <channel component="C" name="mode" id="1" type="Mode"/>
                </channels>
            </dictionary>
        "#;
        let mut registry = TypeRegistry::new(&Config::default()).unwrap();
        let diag = Collect::new();
        let mut dict = Dictionary::new();
        dict.load_str(first, &mut registry, &diag).unwrap();
        dict.load_str(second, &mut registry, &diag).unwrap();
        assert!(diag.messages().is_empty());
        assert!(dict.channel_by_id(1).unwrap().codec.is_some());

        // Loading the first file again replaces the enum with a warning.
        dict.enums.clear();
        dict.load_str(first, &mut registry, &diag).unwrap();
        assert_eq!(diag.messages().len(), 1);
    }
}
