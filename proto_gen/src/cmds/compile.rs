use std::path::Path;

use proto_gen::{compile_with_config, load_schema, CodecManifest, CompilerConfig};

pub fn run(file: &Path, output: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let schema = load_schema(file)?;
    let config = CompilerConfig {
        trace_fields: verbose,
    };
    let compiled = compile_with_config(schema, config)?;
    let manifest = CodecManifest::from_compiled(&compiled);
    let json = serde_json::to_string_pretty(&manifest)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("[✓] Wrote codec manifest: {}", path.display());
        }
        None => println!("{json}"),
    }
    println!(
        "[✓] Compiled {} message codecs and {} enum groups from {}",
        manifest.messages.len(),
        manifest.enums.len(),
        file.display()
    );
    Ok(())
}
