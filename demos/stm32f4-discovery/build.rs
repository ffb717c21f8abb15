use std::env;
use std::path::PathBuf;

fn main() {
    // Let cortex-m-rt's link.x find memory.x in the crate root.
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    println!("cargo:rustc-link-search={}", manifest_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
}
