//! Embeds the workspace `VERSION` file as `FACE_COMPARE_VERSION`.

use std::path::Path;

fn main() {
    let version_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../VERSION");
    println!("cargo:rerun-if-changed={}", version_path.display());

    let raw = std::fs::read_to_string(&version_path)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_path.display()));
    let version = raw.trim();
    let well_formed = !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    assert!(
        well_formed,
        "VERSION must look like MAJOR.MINOR.PATCH, got '{version}'"
    );

    println!("cargo:rustc-env=FACE_COMPARE_VERSION={version}");
}
