//! End-to-end pipeline tests against recording collaborators.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gb_toolchain::recording::{FixedLinker, RecordingRunner};
use gb_toolchain::{
    ConfigOverride, Context, EnvSnapshot, OsFileSystem, Package, PlatformTriple, Stage,
    ToolchainConfig, ToolchainError,
};

fn linux_amd64_env(goroot: &Path) -> EnvSnapshot {
    let goroot = goroot.to_string_lossy().into_owned();
    EnvSnapshot::from_lookup(move |key| match key {
        "GOOS" => Some("linux".into()),
        "GOARCH" => Some("amd64".into()),
        "GOROOT" => Some(goroot.clone()),
        _ => None,
    })
}

#[test]
fn compile_scenario_creates_output_tree() {
    let dir = tempfile::tempdir().unwrap();
    let goroot = dir.path().join("go");
    let host = PlatformTriple::new("linux", "amd64");

    let toolchain = ToolchainConfig::new(host, &linux_amd64_env(&goroot), [])
        .resolve()
        .unwrap();
    assert!(toolchain.tool(Stage::Compile).ends_with("pkg/tool/linux_amd64/6g"));

    let runner = Arc::new(RecordingRunner::new());
    let ctx = Context::new(toolchain)
        .with_runner(runner.clone())
        .with_fs(Arc::new(OsFileSystem));

    let out_dir = dir.path().join("tmp/out");
    let outfile = out_dir.join("pkg.a");
    let pkg = Package {
        gcflags: vec!["-N".into()],
        ..Default::default()
    };
    ctx.gc(
        &pkg,
        &[],
        "example/pkg",
        dir.path(),
        &outfile,
        &["a.go".into(), "b.go".into()],
    )
    .unwrap();

    assert!(out_dir.is_dir());
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let expected: Vec<String> = [
        "-N",
        "-p",
        "example/pkg",
        "-pack",
        "-o",
        outfile.to_str().unwrap(),
        "a.go",
        "b.go",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(calls[0].args, expected);
}

#[test]
fn cross_target_never_yields_a_toolchain() {
    let host = PlatformTriple::new("linux", "amd64");
    let env = linux_amd64_env(Path::new("/usr/local/go"));
    for (os, arch) in [("darwin", "amd64"), ("linux", "386"), ("windows", "arm")] {
        let result = ToolchainConfig::new(
            host.clone(),
            &env,
            [
                ConfigOverride::Goos(os.into()),
                ConfigOverride::Goarch(arch.into()),
            ],
        )
        .resolve();
        match result {
            Err(ToolchainError::CrossCompilation { host: h, target }) => {
                assert_eq!(h, host);
                assert_eq!(target, PlatformTriple::new(os, arch));
            }
            other => panic!("expected cross compilation error, got {other:?}"),
        }
    }
}

#[test]
fn full_package_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let host = PlatformTriple::new("linux", "amd64");
    let toolchain = ToolchainConfig::new(host, &linux_amd64_env(&root.join("go")), [])
        .resolve()
        .unwrap();

    let runner = Arc::new(RecordingRunner::new());
    let ctx = Context::new(toolchain.clone())
        .with_runner(runner.clone())
        .with_fs(Arc::new(OsFileSystem))
        .with_linker(Arc::new(FixedLinker("/usr/bin/gcc".into())));

    let objdir = root.join("work/example/cmd/_obj");
    let pkg = Package {
        complete: false,
        workdir: root.join("work"),
        objdir: objdir.clone(),
        dir: root.join("src/example/cmd"),
        goroot: toolchain.goroot().to_path_buf(),
        goos: "linux".into(),
        goarch: "amd64".into(),
        ..Default::default()
    };
    let searchpaths = vec![root.join("work/pkg/linux_amd64")];
    let archive = objdir.join("main.a");
    let asm_obj = objdir.join("asm_amd64.6");
    let c_obj = objdir.join("shim.6");
    let exe = root.join("bin/cmd");

    ctx.gc(
        &pkg,
        &searchpaths,
        "main",
        &pkg.dir,
        &archive,
        &["main.go".into()],
    )
    .unwrap();
    ctx.asm(&pkg, &pkg.dir, &asm_obj, Path::new("asm_amd64.s")).unwrap();
    ctx.cc(&pkg, &c_obj, Path::new("shim.c")).unwrap();
    ctx.pack(&[archive.clone(), asm_obj.clone(), c_obj.clone()])
        .unwrap();
    ctx.ld(&pkg, &searchpaths, &exe, &archive).unwrap();

    let programs: Vec<PathBuf> = runner.calls().into_iter().map(|c| c.program).collect();
    let stages = [
        Stage::Compile,
        Stage::Assemble,
        Stage::NativeCompile,
        Stage::Pack,
        Stage::Link,
    ];
    let expected: Vec<PathBuf> = stages
        .iter()
        .map(|&s| toolchain.tool(s).to_path_buf())
        .collect();
    assert_eq!(programs, expected);

    assert!(objdir.is_dir());
    assert!(root.join("bin").is_dir());

    let link = runner.calls().pop().unwrap();
    assert_eq!(link.dir, Path::new("."));
    assert_eq!(link.args.last().unwrap(), archive.to_str().unwrap());
}
