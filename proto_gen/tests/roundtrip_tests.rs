//! Round-trip coverage across the (type, rule) matrix.

use indexmap::IndexMap;
use proto_gen::{compile, CompiledSchema, Value};
use proto_types::{FieldDef, MessageId, ProtoType, Rule, Schema};

fn field(name: &str, tag: u32, proto_type: ProtoType, rule: Rule, packed: bool) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        tag,
        proto_type,
        rule,
        packed,
        default: None,
        deprecated: false,
    }
}

fn compile_single(proto_type: ProtoType, rule: Rule, packed: bool) -> (CompiledSchema, MessageId) {
    let mut schema = Schema::new();
    let msg = schema.push_message(None, "Holder");
    schema.add_field(msg, field("value", 1, proto_type, rule, packed));
    (compile(schema).expect("schema compiles"), msg)
}

fn roundtrip_singular(proto_type: ProtoType, samples: &[Value]) {
    for rule in [Rule::Optional, Rule::Required] {
        let (compiled, msg) = compile_single(proto_type, rule, false);
        for sample in samples {
            let mut instance = compiled.new_instance(msg).expect("instance");
            compiled
                .set_field(&mut instance, "value", sample.clone())
                .expect("value stored");
            let bytes = compiled.serialize_to_vec(&mut instance).expect("serializes");
            let back = compiled.deserialize(msg, &bytes).expect("deserializes");
            assert_eq!(
                compiled.field(&back, "value").expect("slot present").value(),
                Some(sample),
                "{proto_type:?} {rule:?} failed for {sample:?}"
            );
        }
    }
}

fn roundtrip_repeated(proto_type: ProtoType, samples: &[Value], packed: bool) {
    let (compiled, msg) = compile_single(proto_type, Rule::Repeated, packed);
    let mut instance = compiled.new_instance(msg).expect("instance");
    for sample in samples {
        compiled
            .push_field(&mut instance, "value", sample.clone())
            .expect("element stored");
    }
    let bytes = compiled.serialize_to_vec(&mut instance).expect("serializes");
    let back = compiled.deserialize(msg, &bytes).expect("deserializes");
    assert_eq!(
        compiled.field(&back, "value").expect("slot present").values(),
        Some(samples),
        "{proto_type:?} repeated (packed={packed}) failed"
    );
}

#[test]
fn double_round_trips() {
    let samples = [
        Value::Double(0.0),
        Value::Double(f64::MIN),
        Value::Double(f64::MAX),
        Value::Double(-2.5),
    ];
    roundtrip_singular(ProtoType::Double, &samples);
    roundtrip_repeated(ProtoType::Double, &samples, false);
    roundtrip_repeated(ProtoType::Double, &samples, true);
}

#[test]
fn float_round_trips() {
    let samples = [
        Value::Float(0.0),
        Value::Float(f32::MIN),
        Value::Float(f32::MAX),
        Value::Float(-1.25),
    ];
    roundtrip_singular(ProtoType::Float, &samples);
    roundtrip_repeated(ProtoType::Float, &samples, true);
}

#[test]
fn int32_round_trips() {
    let samples = [
        Value::Int32(0),
        Value::Int32(i32::MIN),
        Value::Int32(i32::MAX),
        Value::Int32(-1),
    ];
    roundtrip_singular(ProtoType::Int32, &samples);
    roundtrip_repeated(ProtoType::Int32, &samples, false);
    roundtrip_repeated(ProtoType::Int32, &samples, true);
}

#[test]
fn int64_round_trips() {
    let samples = [
        Value::Int64(0),
        Value::Int64(i64::MIN),
        Value::Int64(i64::MAX),
        Value::Int64(-1),
    ];
    roundtrip_singular(ProtoType::Int64, &samples);
    roundtrip_repeated(ProtoType::Int64, &samples, true);
}

#[test]
fn uint32_round_trips() {
    let samples = [Value::Uint32(0), Value::Uint32(u32::MAX), Value::Uint32(300)];
    roundtrip_singular(ProtoType::Uint32, &samples);
    roundtrip_repeated(ProtoType::Uint32, &samples, true);
}

#[test]
fn uint64_round_trips() {
    let samples = [Value::Uint64(0), Value::Uint64(u64::MAX), Value::Uint64(1)];
    roundtrip_singular(ProtoType::Uint64, &samples);
    roundtrip_repeated(ProtoType::Uint64, &samples, false);
}

#[test]
fn sint32_round_trips() {
    let samples = [
        Value::Sint32(0),
        Value::Sint32(i32::MIN),
        Value::Sint32(i32::MAX),
        Value::Sint32(-1),
    ];
    roundtrip_singular(ProtoType::Sint32, &samples);
    roundtrip_repeated(ProtoType::Sint32, &samples, true);
}

#[test]
fn sint64_round_trips() {
    let samples = [
        Value::Sint64(0),
        Value::Sint64(i64::MIN),
        Value::Sint64(i64::MAX),
        Value::Sint64(-1),
    ];
    roundtrip_singular(ProtoType::Sint64, &samples);
    roundtrip_repeated(ProtoType::Sint64, &samples, true);
}

#[test]
fn fixed_width_round_trips() {
    roundtrip_singular(
        ProtoType::Fixed32,
        &[Value::Fixed32(0), Value::Fixed32(u32::MAX)],
    );
    roundtrip_singular(
        ProtoType::Fixed64,
        &[Value::Fixed64(0), Value::Fixed64(u64::MAX)],
    );
    roundtrip_singular(
        ProtoType::Sfixed32,
        &[
            Value::Sfixed32(0),
            Value::Sfixed32(i32::MIN),
            Value::Sfixed32(-7),
        ],
    );
    roundtrip_singular(
        ProtoType::Sfixed64,
        &[
            Value::Sfixed64(0),
            Value::Sfixed64(i64::MIN),
            Value::Sfixed64(i64::MAX),
        ],
    );
    roundtrip_repeated(
        ProtoType::Sfixed64,
        &[Value::Sfixed64(-1), Value::Sfixed64(1)],
        true,
    );
}

#[test]
fn bool_round_trips() {
    let samples = [Value::Bool(false), Value::Bool(true)];
    roundtrip_singular(ProtoType::Bool, &samples);
    roundtrip_repeated(ProtoType::Bool, &samples, true);
}

#[test]
fn string_round_trips() {
    let samples = [
        Value::String(String::new()),
        Value::String("hello".to_string()),
        Value::String("smörgåsbord".to_string()),
    ];
    roundtrip_singular(ProtoType::String, &samples);
    roundtrip_repeated(ProtoType::String, &samples, false);
}

#[test]
fn bytes_round_trips() {
    let samples = [
        Value::Bytes(Vec::new()),
        Value::Bytes(vec![0x00, 0xff, 0x7f, 0x80]),
    ];
    roundtrip_singular(ProtoType::Bytes, &samples);
    roundtrip_repeated(ProtoType::Bytes, &samples, false);
}

#[test]
fn enum_round_trips() {
    let mut schema = Schema::new();
    let msg = schema.push_message(None, "Holder");
    let mut members = IndexMap::new();
    members.insert("ZERO".to_string(), 0);
    members.insert("ONE".to_string(), 1);
    members.insert("BIG".to_string(), 1000);
    let state = schema.push_enum(Some(msg), "State", members);
    schema.add_field(msg, field("value", 1, ProtoType::Enum(state), Rule::Required, false));
    schema.add_field(
        msg,
        field("history", 2, ProtoType::Enum(state), Rule::Repeated, true),
    );
    let compiled = compile(schema).expect("schema compiles");

    let mut instance = compiled.new_instance(msg).expect("instance");
    compiled
        .set_field(&mut instance, "value", Value::Enum(1000))
        .expect("value stored");
    for member in [Value::Enum(0), Value::Enum(1), Value::Enum(1000)] {
        compiled
            .push_field(&mut instance, "history", member)
            .expect("element stored");
    }
    let bytes = compiled.serialize_to_vec(&mut instance).expect("serializes");
    let back = compiled.deserialize(msg, &bytes).expect("deserializes");
    assert_eq!(
        compiled.field(&back, "value").expect("slot").value(),
        Some(&Value::Enum(1000))
    );
    assert_eq!(
        compiled.field(&back, "history").expect("slot").values(),
        Some(&[Value::Enum(0), Value::Enum(1), Value::Enum(1000)][..])
    );
}

#[test]
fn empty_repeated_decodes_to_empty_sequence() {
    for packed in [false, true] {
        let (compiled, msg) = compile_single(ProtoType::Uint32, Rule::Repeated, packed);
        let mut instance = compiled.new_instance(msg).expect("instance");
        let bytes = compiled.serialize_to_vec(&mut instance).expect("serializes");
        let back = compiled.deserialize(msg, &bytes).expect("deserializes");
        let slot = compiled.field(&back, "value").expect("slot present");
        // Empty never means absent for repeated fields.
        assert_eq!(slot.values(), Some(&[][..]), "packed={packed}");
    }
}

#[test]
fn nested_message_round_trips() {
    let mut schema = Schema::new();
    let outer = schema.push_message(None, "Outer");
    let inner = schema.push_message(Some(outer), "Inner");
    schema.add_field(inner, field("id", 1, ProtoType::Uint32, Rule::Required, false));
    schema.add_field(
        outer,
        field("child", 1, ProtoType::Message(inner), Rule::Optional, false),
    );
    schema.add_field(
        outer,
        field("items", 2, ProtoType::Message(inner), Rule::Repeated, false),
    );
    let compiled = compile(schema).expect("schema compiles");

    let mut child = compiled.new_instance(inner).expect("inner instance");
    compiled
        .set_field(&mut child, "id", Value::Uint32(5))
        .expect("value stored");
    let mut instance = compiled.new_instance(outer).expect("outer instance");
    compiled
        .set_field(&mut instance, "child", Value::Message(child.clone()))
        .expect("child stored");
    for id in [7u32, 8] {
        let mut item = compiled.new_instance(inner).expect("inner instance");
        compiled
            .set_field(&mut item, "id", Value::Uint32(id))
            .expect("value stored");
        compiled
            .push_field(&mut instance, "items", Value::Message(item))
            .expect("element stored");
    }

    let bytes = compiled.serialize_to_vec(&mut instance).expect("serializes");
    let back = compiled.deserialize(outer, &bytes).expect("deserializes");
    let child_back = compiled
        .field(&back, "child")
        .expect("slot")
        .value()
        .and_then(Value::as_message)
        .expect("child present");
    assert_eq!(
        compiled.field(child_back, "id").expect("slot").value(),
        Some(&Value::Uint32(5))
    );
    let items = compiled.field(&back, "items").expect("slot").values().expect("list");
    assert_eq!(items.len(), 2);
}

#[test]
fn recursive_message_round_trips() {
    let mut schema = Schema::new();
    let node = schema.push_message(None, "TreeNode");
    schema.add_field(node, field("label", 1, ProtoType::String, Rule::Optional, false));
    schema.add_field(
        node,
        field("children", 2, ProtoType::Message(node), Rule::Repeated, false),
    );
    let compiled = compile(schema).expect("schema compiles");

    let mut leaf = compiled.new_instance(node).expect("instance");
    compiled
        .set_field(&mut leaf, "label", Value::String("leaf".to_string()))
        .expect("value stored");
    let mut mid = compiled.new_instance(node).expect("instance");
    compiled
        .set_field(&mut mid, "label", Value::String("mid".to_string()))
        .expect("value stored");
    compiled
        .push_field(&mut mid, "children", Value::Message(leaf))
        .expect("element stored");
    let mut root = compiled.new_instance(node).expect("instance");
    compiled
        .set_field(&mut root, "label", Value::String("root".to_string()))
        .expect("value stored");
    compiled
        .push_field(&mut root, "children", Value::Message(mid))
        .expect("element stored");

    let bytes = compiled.serialize_to_vec(&mut root).expect("serializes");
    let back = compiled.deserialize(node, &bytes).expect("deserializes");

    let mid_children = compiled.field(&back, "children").expect("slot").values().expect("list");
    let mid_back = mid_children[0].as_message().expect("mid present");
    let leaf_children = compiled
        .field(mid_back, "children")
        .expect("slot")
        .values()
        .expect("list");
    let leaf_back = leaf_children[0].as_message().expect("leaf present");
    assert_eq!(
        compiled.field(leaf_back, "label").expect("slot").value(),
        Some(&Value::String("leaf".to_string()))
    );
}
