use std::path::Path;

use proto_gen::{compile, load_schema, Artifact};

pub fn run(file: &Path) -> anyhow::Result<()> {
    let schema = load_schema(file)?;
    let compiled = compile(schema)?;

    println!("[*] Artifacts for {}:", file.display());
    for artifact in compiled.artifacts() {
        match artifact {
            Artifact::Message { codec } => {
                let codec = &compiled.codecs()[*codec];
                let hooks = if codec.hooks_compiled() {
                    " (hooks)"
                } else {
                    ""
                };
                println!("message {}{}", codec.qualified_name, hooks);
                for field in &codec.fields {
                    let mut notes = String::new();
                    if field.packed {
                        notes.push_str(" packed");
                    }
                    if field.deprecated {
                        notes.push_str(" deprecated");
                    }
                    println!(
                        "    {} = {} : {} [{:?}{}]",
                        field.tag, field.name, field.type_name, field.wire_type, notes
                    );
                }
            }
            Artifact::Enum(group) => {
                println!("enum {}", group.qualified_name);
                for (name, value) in &group.members {
                    println!("    {name} = {value}");
                }
            }
        }
    }
    println!(
        "[✓] {} message codecs, schema walk preserved declaration order",
        compiled.codecs().len()
    );
    Ok(())
}
