//! Build unit descriptors.
//!
//! The package graph lives outside this crate; stages only need read access
//! to a handful of already-resolved fields, expressed by [`BuildUnit`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Read-only view of one package as the stages need it.
pub trait BuildUnit {
    /// Extra flags passed first to the compiler.
    fn gcflags(&self) -> &[String];

    /// Extra flags passed first to the linker.
    fn ldflags(&self) -> &[String];

    /// Whether the package is pure Go and can be compiled with `-complete`.
    fn complete(&self) -> bool;

    /// Scratch directory of the build; stripped from native compile paths.
    fn workdir(&self) -> &Path;

    /// Directory receiving this package's intermediate objects.
    fn objdir(&self) -> &Path;

    /// The package source directory.
    fn dir(&self) -> &Path;

    /// Toolchain root the package was resolved against.
    fn goroot(&self) -> &Path;

    fn goos(&self) -> &str;

    fn goarch(&self) -> &str;
}

/// A plain [`BuildUnit`], loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Package {
    #[serde(default)]
    pub gcflags: Vec<String>,
    #[serde(default)]
    pub ldflags: Vec<String>,
    #[serde(default)]
    pub complete: bool,
    pub workdir: PathBuf,
    pub objdir: PathBuf,
    pub dir: PathBuf,
    pub goroot: PathBuf,
    pub goos: String,
    pub goarch: String,
}

impl Package {
    /// Parse a package descriptor from a TOML string.
    pub fn from_toml(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

impl BuildUnit for Package {
    fn gcflags(&self) -> &[String] {
        &self.gcflags
    }

    fn ldflags(&self) -> &[String] {
        &self.ldflags
    }

    fn complete(&self) -> bool {
        self.complete
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn objdir(&self) -> &Path {
        &self.objdir
    }

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn goroot(&self) -> &Path {
        &self.goroot
    }

    fn goos(&self) -> &str {
        &self.goos
    }

    fn goarch(&self) -> &str {
        &self.goarch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_package_toml() {
        let pkg = Package::from_toml(
            r#"
gcflags = ["-N", "-l"]
complete = true
workdir = "/tmp/gb-work"
objdir = "/tmp/gb-work/example/pkg/_obj"
dir = "/src/example/pkg"
goroot = "/usr/local/go"
goos = "linux"
goarch = "amd64"
"#,
        )
        .unwrap();
        assert_eq!(pkg.gcflags(), ["-N", "-l"]);
        assert!(pkg.ldflags().is_empty());
        assert!(pkg.complete());
        assert_eq!(pkg.dir(), Path::new("/src/example/pkg"));
        assert_eq!(pkg.goarch(), "amd64");
    }

    #[test]
    fn missing_required_field() {
        let result = Package::from_toml("goos = \"linux\"\n");
        assert!(result.is_err());
    }
}
