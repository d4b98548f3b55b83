use busgen_compiler::{EmitOptions, Target, compile_dir, emit};
use std::path::PathBuf;
use std::{env, fs};

const BINDINGS: [&str; 2] = ["Events", "Commands"];

fn main() -> anyhow::Result<()> {
    let src = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join("src");
    let out = PathBuf::from(env::var("OUT_DIR")?);

    for binding in BINDINGS {
        let target = Target::new(&src, binding);
        let schema = compile_dir(&target)?;
        let module = emit(&schema, &target, &EmitOptions::default())?;
        fs::write(out.join(module.file_name()), module.source())?;
    }

    println!("cargo:rerun-if-changed=src");
    Ok(())
}
