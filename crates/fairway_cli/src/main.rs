//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `fairway_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("fairway_core ping={}", fairway_core::ping());
    println!("fairway_core version={}", fairway_core::core_version());
}
