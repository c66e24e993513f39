//! gb-tc — inspect the resolved gc toolchain and run single build stages.

mod commands;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use gb_toolchain::recording::{RecordingFileSystem, RecordingRunner};
use gb_toolchain::{ConfigFile, ConfigOverride, Context, GcToolchain, ToolchainConfig};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "gb-toolchain.toml";

#[derive(Parser)]
#[command(name = "gb-tc", version, about = "Inspect and drive the gc toolchain")]
struct Cli {
    /// Target operating system (overrides GOOS)
    #[arg(long, global = true)]
    goos: Option<String>,
    /// Target architecture (overrides GOARCH)
    #[arg(long, global = true)]
    goarch: Option<String>,
    /// Toolchain root (overrides GOROOT)
    #[arg(long, global = true)]
    goroot: Option<PathBuf>,
    /// Toolchain config file (default: ./gb-toolchain.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print tool invocations instead of running them
    #[arg(long, global = true)]
    dry_run: bool,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved toolchain
    Env {
        /// Output format (text, toml, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Check that every resolved tool exists
    Doctor,
    /// Compile Go files into a package archive
    Gc {
        /// Build unit descriptor (TOML)
        #[arg(long)]
        unit: PathBuf,
        /// Import path of the package
        #[arg(long)]
        import_path: String,
        /// Working directory (default: the unit's source dir)
        #[arg(long)]
        srcdir: Option<PathBuf>,
        /// Package search path, in priority order
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,
        /// Output archive
        #[arg(short, long)]
        output: PathBuf,
        /// Go source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Assemble one file for the target
    Asm {
        /// Build unit descriptor (TOML)
        #[arg(long)]
        unit: PathBuf,
        /// Working directory (default: the unit's source dir)
        #[arg(long)]
        srcdir: Option<PathBuf>,
        /// Output object
        #[arg(short, long)]
        output: PathBuf,
        /// Assembly source file
        file: PathBuf,
    },
    /// Compile one C file with the native compiler
    Cc {
        /// Build unit descriptor (TOML)
        #[arg(long)]
        unit: PathBuf,
        /// Output object
        #[arg(short, long)]
        output: PathBuf,
        /// C source file
        file: PathBuf,
    },
    /// Link an archive into an executable
    Ld {
        /// Build unit descriptor (TOML)
        #[arg(long)]
        unit: PathBuf,
        /// Archive search path, in priority order
        #[arg(short = 'L', long = "libdir")]
        libdirs: Vec<PathBuf>,
        /// Output executable
        #[arg(short, long)]
        output: PathBuf,
        /// Input archive
        archive: PathBuf,
    },
    /// Append objects to an archive
    Pack {
        /// Archive to create or extend
        archive: PathBuf,
        /// Object files
        objects: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let toolchain = resolve_toolchain(&cli, &cwd)?;

    match cli.command {
        Commands::Env { format } => commands::env::run(&toolchain, format.as_deref()),
        Commands::Doctor => commands::doctor::run(&toolchain),
        command => {
            let (ctx, recorder) = stage_context(toolchain, cli.dry_run);
            run_stage(&ctx, command)?;
            if let Some(recorder) = recorder {
                for call in recorder.calls() {
                    println!("{call}");
                }
            }
            Ok(())
        }
    }
}

/// A context that executes for real, or records when `dry_run` is set.
fn stage_context(toolchain: GcToolchain, dry_run: bool) -> (Context, Option<Arc<RecordingRunner>>) {
    let ctx = Context::new(toolchain);
    if !dry_run {
        return (ctx, None);
    }
    let recorder = Arc::new(RecordingRunner::new());
    let ctx = ctx
        .with_runner(recorder.clone())
        .with_fs(Arc::new(RecordingFileSystem::new()));
    (ctx, Some(recorder))
}

fn run_stage(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Env { .. } | Commands::Doctor => Ok(()),
        Commands::Gc {
            unit,
            import_path,
            srcdir,
            include,
            output,
            files,
        } => {
            let unit = commands::stage::load_unit(&unit)?;
            commands::stage::gc(
                ctx,
                &unit,
                &include,
                &import_path,
                srcdir.as_deref(),
                &output,
                &files,
            )
        }
        Commands::Asm {
            unit,
            srcdir,
            output,
            file,
        } => {
            let unit = commands::stage::load_unit(&unit)?;
            let srcdir = srcdir.unwrap_or_else(|| unit.dir.clone());
            ctx.asm(&unit, &srcdir, &output, &file)
                .with_context(|| format!("assembling {}", file.display()))
        }
        Commands::Cc { unit, output, file } => {
            let unit = commands::stage::load_unit(&unit)?;
            ctx.cc(&unit, &output, &file)
                .with_context(|| format!("compiling {}", file.display()))
        }
        Commands::Ld {
            unit,
            libdirs,
            output,
            archive,
        } => {
            let unit = commands::stage::load_unit(&unit)?;
            ctx.ld(&unit, &libdirs, &output, &archive)
                .with_context(|| format!("linking {}", output.display()))
        }
        Commands::Pack { archive, objects } => {
            let mut afiles = vec![archive];
            afiles.extend(objects);
            ctx.pack(&afiles)
                .with_context(|| format!("packing {}", afiles[0].display()))
        }
    }
}

/// Collect overrides in precedence order: config file, then flags.
fn overrides(cli: &Cli, cwd: &Path) -> Result<Vec<ConfigOverride>> {
    let mut out = Vec::new();

    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => Some(cwd.join(DEFAULT_CONFIG)).filter(|p| p.is_file()),
    };
    if let Some(path) = config_path {
        let file = ConfigFile::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?;
        out.extend(file.overrides());
    }

    if let Some(os) = &cli.goos {
        out.push(ConfigOverride::Goos(os.clone()));
    }
    if let Some(arch) = &cli.goarch {
        out.push(ConfigOverride::Goarch(arch.clone()));
    }
    if let Some(root) = &cli.goroot {
        out.push(ConfigOverride::Goroot(root.clone()));
    }
    Ok(out)
}

fn resolve_toolchain(cli: &Cli, cwd: &Path) -> Result<GcToolchain> {
    let overrides = overrides(cli, cwd)?;
    ToolchainConfig::from_env(overrides)
        .resolve()
        .context("resolving gc toolchain")
}
