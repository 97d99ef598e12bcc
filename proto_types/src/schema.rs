use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

use crate::types::{DefaultValue, ProtoType, Rule};

/// Option key carrying a namespace override (root or per-message).
pub const OPTION_NAMESPACE: &str = "namespace";

/// Option key toggling the lifecycle hook seams of a message. Hooks are
/// compiled in when the key is present with any value other than `"off"`.
pub const OPTION_TRIGGERS: &str = "triggers";

/// Arena index of a message definition.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct MessageId(pub usize);

/// Arena index of an enum definition.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct EnumId(pub usize);

/// A fully-resolved schema tree.
///
/// All nodes live in two arenas and reference each other by index, so the
/// type graph may be cyclic (self- or mutually-referential messages) while
/// the ownership structure stays flat. Parent back-references terminate at
/// the schema root; top-level declaration order is preserved in `roots`
/// and `root_enums`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct Schema {
    pub messages: Vec<MessageDef>,
    pub enums: Vec<EnumDef>,
    /// Top-level messages in declaration order.
    pub roots: Vec<MessageId>,
    /// Top-level enums in declaration order.
    #[serde(default)]
    pub root_enums: Vec<EnumId>,
    /// Root option map; the default namespace lives under `"namespace"`.
    #[serde(default)]
    pub options: IndexMap<String, String>,
}

/// One message definition node.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Nested message definitions, declaration order.
    #[serde(default)]
    pub nested_messages: Vec<MessageId>,
    /// Nested enum definitions, declaration order.
    #[serde(default)]
    pub nested_enums: Vec<EnumId>,
    #[serde(default)]
    pub options: IndexMap<String, String>,
    /// Enclosing message, or `None` when declared at the schema root.
    #[serde(default)]
    pub parent: Option<MessageId>,
}

impl MessageDef {
    pub fn namespace_override(&self) -> Option<&str> {
        self.options.get(OPTION_NAMESPACE).map(String::as_str)
    }

    /// Whether pre-encode/post-decode hook seams are compiled for this
    /// message.
    pub fn hooks_enabled(&self) -> bool {
        match self.options.get(OPTION_TRIGGERS) {
            Some(value) => value != "off",
            None => false,
        }
    }
}

/// One field declaration inside a message.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Positive tag id, unique within the enclosing message (validated
    /// upstream).
    pub tag: u32,
    pub proto_type: ProtoType,
    pub rule: Rule,
    /// Packed wire layout; only meaningful for repeated packable scalars.
    #[serde(default)]
    pub packed: bool,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub deprecated: bool,
}

/// One enum definition node. The member table preserves declaration order;
/// the first entry is the implicit default member.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct EnumDef {
    pub name: String,
    pub members: IndexMap<String, i32>,
    /// Enclosing message, or `None` when declared at the schema root.
    #[serde(default)]
    pub parent: Option<MessageId>,
}

impl EnumDef {
    /// Value of the first-declared member, the implicit default.
    pub fn default_member_value(&self) -> Option<i32> {
        self.members.values().next().copied()
    }

    pub fn member_value(&self, name: &str) -> Option<i32> {
        self.members.get(name).copied()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new message under `parent` (or at the root) and return
    /// its arena id. The parent back-reference and the parent's nested
    /// list are wired here so the tree stays consistent.
    pub fn push_message(&mut self, parent: Option<MessageId>, name: &str) -> MessageId {
        let id = MessageId(self.messages.len());
        self.messages.push(MessageDef {
            name: name.to_string(),
            fields: Vec::new(),
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            options: IndexMap::new(),
            parent,
        });
        match parent {
            Some(p) => self.messages[p.0].nested_messages.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Register a new enum under `parent` (or at the root).
    pub fn push_enum(
        &mut self,
        parent: Option<MessageId>,
        name: &str,
        members: IndexMap<String, i32>,
    ) -> EnumId {
        let id = EnumId(self.enums.len());
        self.enums.push(EnumDef {
            name: name.to_string(),
            members,
            parent,
        });
        match parent {
            Some(p) => self.messages[p.0].nested_enums.push(id),
            None => self.root_enums.push(id),
        }
        id
    }

    pub fn add_field(&mut self, message: MessageId, field: FieldDef) {
        self.messages[message.0].fields.push(field);
    }

    pub fn set_option(&mut self, message: MessageId, key: &str, value: &str) {
        self.messages[message.0]
            .options
            .insert(key.to_string(), value.to_string());
    }

    pub fn message(&self, id: MessageId) -> Option<&MessageDef> {
        self.messages.get(id.0)
    }

    pub fn enum_def(&self, id: EnumId) -> Option<&EnumDef> {
        self.enums.get(id.0)
    }

    /// Root-level default namespace, if the schema declares one.
    pub fn default_namespace(&self) -> Option<&str> {
        self.options.get(OPTION_NAMESPACE).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProtoType;

    fn field(name: &str, tag: u32, proto_type: ProtoType, rule: Rule) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            tag,
            proto_type,
            rule,
            packed: false,
            default: None,
            deprecated: false,
        }
    }

    #[test]
    fn push_message_wires_parent_links() {
        let mut schema = Schema::new();
        let outer = schema.push_message(None, "Outer");
        let inner = schema.push_message(Some(outer), "Inner");

        assert_eq!(schema.roots, vec![outer]);
        let outer_def = schema.message(outer).expect("outer present");
        assert_eq!(outer_def.nested_messages, vec![inner]);
        let inner_def = schema.message(inner).expect("inner present");
        assert_eq!(inner_def.parent, Some(outer));
    }

    #[test]
    fn hooks_enabled_respects_off_value() {
        let mut schema = Schema::new();
        let on = schema.push_message(None, "WithHooks");
        let off = schema.push_message(None, "WithoutHooks");
        let silent = schema.push_message(None, "Silent");
        schema.set_option(on, OPTION_TRIGGERS, "on");
        schema.set_option(off, OPTION_TRIGGERS, "off");

        assert!(schema.message(on).expect("msg").hooks_enabled());
        assert!(!schema.message(off).expect("msg").hooks_enabled());
        assert!(!schema.message(silent).expect("msg").hooks_enabled());
    }

    #[test]
    fn enum_default_member_is_first_declared() {
        let mut schema = Schema::new();
        let mut members = IndexMap::new();
        members.insert("IDLE".to_string(), 5);
        members.insert("BUSY".to_string(), 0);
        let id = schema.push_enum(None, "State", members);

        let def = schema.enum_def(id).expect("enum present");
        assert_eq!(def.default_member_value(), Some(5));
        assert_eq!(def.member_value("BUSY"), Some(0));
        assert_eq!(def.member_value("GONE"), None);
    }

    #[test]
    fn self_referential_field_is_representable() {
        let mut schema = Schema::new();
        let node = schema.push_message(None, "TreeNode");
        schema.add_field(
            node,
            field("children", 1, ProtoType::Message(node), Rule::Repeated),
        );

        let def = schema.message(node).expect("node present");
        assert_eq!(def.fields[0].proto_type, ProtoType::Message(node));
    }

    #[test]
    fn schema_round_trips_through_yaml() {
        let mut schema = Schema::new();
        schema
            .options
            .insert(OPTION_NAMESPACE.to_string(), "demo.wire".to_string());
        let msg = schema.push_message(None, "Ping");
        schema.add_field(msg, field("seq", 1, ProtoType::Uint64, Rule::Required));

        let text = serde_yml::to_string(&schema).expect("serializes");
        let back: Schema = serde_yml::from_str(&text).expect("deserializes");
        assert_eq!(back, schema);
    }
}
