//! Emits the linker arguments for the embedded target. The memory map comes
//! from embassy-stm32's `memory-x` feature, so nothing is copied here; the
//! script only wires up `link.x`/`defmt.x` when cross-compiling.

fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();
    if target.starts_with("thumbv7em") {
        println!("cargo:rustc-link-arg=-Tlink.x");
        println!("cargo:rustc-link-arg=-Tdefmt.x");
        println!("cargo:rustc-link-arg=--nmagic");
    }
}
