//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `libregister_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("libregister_core version={}", libregister_core::core_version());
    println!(
        "libregister_core backup_name={}",
        libregister_core::backup_file_name("1970-01-01")
    );
}
