//! `gb-tc doctor` — toolchain diagnostics.

use anyhow::Result;
use gb_toolchain::{GcToolchain, HostLinker, Stage, SystemLinker};

/// Print whether each resolved tool is present.
pub fn run(toolchain: &GcToolchain) -> Result<()> {
    println!("=== gb-tc doctor ===");
    println!();
    println!("Host:    {}", toolchain.host());
    println!("Target:  {}", toolchain.target());
    println!("GOROOT:  {}", toolchain.goroot().display());
    println!();

    println!("--- Tools ---");
    for (stage, found) in check_tools(toolchain) {
        let status = if found { "ok" } else { "missing" };
        println!(
            "  {:<5} {}  {status}",
            stage.name(),
            toolchain.tool(stage).display()
        );
    }
    println!();

    println!("--- External Linker ---");
    match HostLinker.resolve_system_linker() {
        Ok(path) => println!("  cc: {}", path.display()),
        Err(e) => println!("  cc: {e}"),
    }

    Ok(())
}

/// Each stage paired with whether its tool exists on disk.
pub fn check_tools(toolchain: &GcToolchain) -> Vec<(Stage, bool)> {
    Stage::ALL
        .iter()
        .map(|&stage| (stage, toolchain.tool(stage).is_file()))
        .collect()
}
