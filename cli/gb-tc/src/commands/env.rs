//! `gb-tc env` — print the resolved toolchain.

use std::fmt::Write;

use anyhow::{bail, Result};
use gb_toolchain::{GcToolchain, Stage};

pub fn run(toolchain: &GcToolchain, format: Option<&str>) -> Result<()> {
    let text = match format.unwrap_or("text") {
        "text" => render_text(toolchain),
        "toml" => toml::to_string_pretty(toolchain)?,
        "json" => serde_json::to_string_pretty(toolchain)? + "\n",
        other => bail!("unknown format '{other}' (expected text, toml, or json)"),
    };
    print!("{text}");
    Ok(())
}

/// `KEY=value` lines in the style of `go env`.
pub fn render_text(toolchain: &GcToolchain) -> String {
    let mut out = String::new();
    let host = toolchain.host();
    let target = toolchain.target();
    let _ = writeln!(out, "GOHOSTOS={}", host.os);
    let _ = writeln!(out, "GOHOSTARCH={}", host.arch);
    let _ = writeln!(out, "GOOS={}", target.os);
    let _ = writeln!(out, "GOARCH={}", target.arch);
    let _ = writeln!(out, "GOROOT={}", toolchain.goroot().display());
    let _ = writeln!(out, "GOTOOLDIR={}", toolchain.tooldir().display());
    for stage in Stage::ALL {
        let _ = writeln!(
            out,
            "{}={}",
            stage.name().to_uppercase(),
            toolchain.tool(stage).display()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_toolchain::{EnvSnapshot, PlatformTriple, ToolchainConfig};

    fn toolchain() -> GcToolchain {
        let env = EnvSnapshot {
            goroot: Some("/usr/local/go".into()),
            ..Default::default()
        };
        ToolchainConfig::new(PlatformTriple::new("linux", "amd64"), &env, [])
            .resolve()
            .unwrap()
    }

    #[test]
    fn text_lists_every_tool() {
        let text = render_text(&toolchain());
        assert!(text.contains("GOOS=linux\n"));
        assert!(text.contains("GOTOOLDIR=/usr/local/go/pkg/tool/linux_amd64\n"));
        assert!(text.contains("GC=/usr/local/go/pkg/tool/linux_amd64/6g\n"));
        assert!(text.contains("ASM=/usr/local/go/pkg/tool/linux_amd64/6a\n"));
        assert!(text.contains("PACK=/usr/local/go/pkg/tool/linux_amd64/pack\n"));
    }

    #[test]
    fn toml_output_parses() {
        let s = toml::to_string_pretty(&toolchain()).unwrap();
        let value: toml::Value = toml::from_str(&s).unwrap();
        assert_eq!(
            value["ld"].as_str(),
            Some("/usr/local/go/pkg/tool/linux_amd64/6l")
        );
        assert_eq!(value["host"]["os"].as_str(), Some("linux"));
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(run(&toolchain(), Some("yaml")).is_err());
    }
}
