use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct Manifest {
    package: Package,
}

#[derive(Deserialize)]
struct Package {
    metadata: Metadata,
}

#[derive(Deserialize)]
struct Metadata {
    todoquest: TodoQuestMetadata,
}

#[derive(Deserialize)]
struct TodoQuestMetadata {
    codename: String,
}

fn main() {
    let toml_str = fs::read_to_string("Cargo.toml").expect("Failed to read Cargo.toml");
    let manifest: Manifest = toml::from_str(&toml_str).expect("Failed to parse Cargo.toml");

    // Exposed to the binary as env!("CODENAME") for --version
    println!("cargo:rustc-env=CODENAME={}", manifest.package.metadata.todoquest.codename);
    println!("cargo:rerun-if-changed=Cargo.toml");
}
