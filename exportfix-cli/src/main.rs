mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use exportfix_core::adapters::{FsSceneSource, FsWritePort, InMemorySceneSource};
use exportfix_core::dispatch::report_for;
use exportfix_core::ports::SceneSource;
use exportfix_core::{HookInvocation, InvocationSource, Platform, on_post_export, on_pre_export};
use exportfix_pbx::ProjectDescriptor;
use exportfix_types::io::read_document;
use exportfix_types::report::ToolInfo;
use fs_err as fs;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "exportfix",
    version,
    about = "Scene-gated patcher for Xcode projects exported by a game engine build."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the post-export hook against an exported Xcode project.
    PostExport(PostExportArgs),
    /// Run the pre-export hook (changes nothing).
    PreExport(PreExportArgs),
    /// Set the build configuration of every LaunchAction in one scheme file.
    ///
    /// The file is replaced atomically; no backup is kept.
    PatchScheme(PatchSchemeArgs),
    /// List the targets and build configurations of a project.pbxproj.
    Inspect(InspectArgs),
}

#[derive(Debug, Parser)]
struct HookArgs {
    /// Directory the engine exported the Xcode project into.
    #[arg(long)]
    export_path: Utf8PathBuf,

    /// Which build system is calling (editor, cloud).
    #[arg(long, default_value = "editor")]
    source: InvocationSource,

    /// Build target platform (required for editor invocations; cloud is always ios).
    #[arg(long)]
    platform: Option<Platform>,
}

#[derive(Debug, Parser)]
struct PostExportArgs {
    #[command(flatten)]
    hook: HookArgs,

    /// Engine project root (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Active scene path; repeat for each scene. Overrides EditorBuildSettings.asset.
    #[arg(long = "scene")]
    scenes: Vec<String>,

    /// Build configuration for every LaunchAction (default: Debug).
    #[arg(long)]
    configuration: Option<String>,

    /// Compute and print the patch without writing anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Do not keep a copy of each document before overwriting it.
    #[arg(long, default_value_t = false)]
    no_backup: bool,

    /// Config file (default: <project_root>/exportfix.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Write a JSON report to this path.
    #[arg(long)]
    report: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct PreExportArgs {
    #[command(flatten)]
    hook: HookArgs,
}

#[derive(Debug, Parser)]
struct PatchSchemeArgs {
    /// Path to the .xcscheme file.
    #[arg(long)]
    scheme: Utf8PathBuf,

    /// Build configuration for every LaunchAction.
    #[arg(long, default_value = "Debug")]
    configuration: String,
}

#[derive(Debug, Parser)]
struct InspectArgs {
    /// Path to project.pbxproj.
    #[arg(long)]
    project: Utf8PathBuf,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::PostExport(args) => cmd_post_export(args),
        Command::PreExport(args) => cmd_pre_export(args),
        Command::PatchScheme(args) => cmd_patch_scheme(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn invocation(args: HookArgs) -> anyhow::Result<HookInvocation> {
    match args.source {
        InvocationSource::Editor => {
            let platform = args
                .platform
                .context("--platform is required when --source is editor")?;
            Ok(HookInvocation::Editor {
                platform,
                export_path: args.export_path,
            })
        }
        InvocationSource::Cloud => {
            if let Some(platform) = args.platform.filter(|p| *p != Platform::Ios) {
                warn!(%platform, "cloud invocations always target ios; ignoring --platform");
            }
            Ok(HookInvocation::Cloud {
                export_path: args.export_path,
            })
        }
    }
}

fn cmd_post_export(args: PostExportArgs) -> anyhow::Result<()> {
    let invocation = invocation(args.hook)?;

    let cfg = config::load_or_default(args.config.as_deref(), &args.project_root)?;
    let settings = ConfigMerger::new(cfg).merge_post_export_args(
        &args.project_root,
        args.configuration.as_deref(),
        args.dry_run,
        args.no_backup,
    );

    let scenes: Box<dyn SceneSource> = if args.scenes.is_empty() {
        Box::new(FsSceneSource::new(args.project_root.clone()))
    } else {
        debug!(count = args.scenes.len(), "using scenes from the command line");
        Box::new(InMemorySceneSource::new(args.scenes))
    };

    let result = on_post_export(&invocation, scenes.as_ref(), &settings, &FsWritePort);

    if let Some(path) = &args.report {
        let report = report_for(tool_info(), &invocation, result.as_ref());
        write_json(path, &report)?;
        info!(%path, "wrote report");
    }

    let outcome = result.context("post-export failed")?;
    for warning in &outcome.warnings {
        warn!("{warning}");
    }

    if !outcome.verdict.is_eligible() {
        println!("skipped: {:?}", outcome.verdict);
        return Ok(());
    }

    if outcome.dry_run {
        println!("dry-run: no files were written");
        print!("{}", outcome.patch);
        return Ok(());
    }

    let changed: Vec<_> = outcome.changed_files().map(|f| f.path.as_str()).collect();
    if changed.is_empty() {
        println!("export already patched; nothing to do");
    } else {
        for path in changed {
            println!("patched {path}");
        }
    }
    Ok(())
}

fn cmd_pre_export(args: PreExportArgs) -> anyhow::Result<()> {
    let invocation = invocation(args.hook)?;
    on_pre_export(&invocation).context("pre-export failed")?;
    Ok(())
}

fn cmd_patch_scheme(args: PatchSchemeArgs) -> anyhow::Result<()> {
    let patch = exportfix_scheme::patch_scheme(&args.scheme, &args.configuration)
        .with_context(|| format!("patch scheme {}", args.scheme))?;
    if patch.is_noop() {
        println!("{}: no LaunchAction found", args.scheme);
    } else {
        println!(
            "{}: set buildConfiguration=\"{}\" on {} LaunchAction(s)",
            args.scheme, args.configuration, patch.launch_actions
        );
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let text = read_document(&args.project)?;
    let project = ProjectDescriptor::parse(&text)
        .with_context(|| format!("parse {}", args.project))?;

    let mut targets = Vec::new();
    for name in project.target_names()? {
        let id = project.target_by_name(&name)?;
        let configurations = project.configuration_names(&id)?;
        targets.push((name, id, configurations));
    }
    let dangling = project.dangling_references();

    match args.format {
        OutputFormat::Text => {
            println!("  {:<28} {:<26} CONFIGURATIONS", "TARGET", "ID");
            println!("  {:<28} {:<26} --------------", "------", "--");
            for (name, id, configurations) in &targets {
                println!("  {:<28} {:<26} {}", name, id, configurations.join(", "));
            }
            if !dangling.is_empty() {
                println!();
                println!("{} dangling reference(s)", dangling.len());
            }
        }
        OutputFormat::Json => {
            let targets: Vec<_> = targets
                .iter()
                .map(|(name, id, configurations)| {
                    serde_json::json!({
                        "name": name,
                        "id": id.to_string(),
                        "configurations": configurations,
                    })
                })
                .collect();
            let doc = serde_json::json!({
                "targets": targets,
                "dangling_references": dangling.len(),
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent))?;
    }
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "exportfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
