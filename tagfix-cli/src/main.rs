mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, MineOverrides};
use std::io::Write;
use std::process::ExitCode;
use tagfix_apriori::MiningPreset;
use tagfix_checks::{CheckRegistry, ReportToolInfo};
use tagfix_core::adapters::{FsSourcePort, FsWritePort};
use tagfix_core::pipeline;
use tagfix_core::ports::WritePort;
use tagfix_core::{PatchSet, ToolError};
use tagfix_domain::builtin_producer_metas;
use tagfix_sources::SourceKind;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tagfix",
    version,
    about = "Rule-driven tag proposals and consistency checks for package tag catalogs."
)]
struct Cli {
    /// Config file (default: ./tagfix.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Directory holding the metadata sources (overrides [sources] data_dir).
    #[arg(long, global = true, env = "TAGFIX_DATA_DIR")]
    data_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Propose tag changes from package metadata and mined rules.
    Autotag(AutotagArgs),
    /// Check a tag database for inconsistencies.
    Check(CheckArgs),
    /// Drop patch entries that a tag database already satisfies.
    Simplify(SimplifyArgs),
    /// Compute the patch that turns one patch file's effect into another's.
    Diff(DiffArgs),
    /// Apply a patch file to a tag database.
    Apply(ApplyArgs),
    /// Mine association rules from the stable tags and refresh the rule cache.
    MineRules(MineRulesArgs),
    /// List the consistency checks.
    ListChecks(ListArgs),
    /// List the tag producers and the sources they need.
    ListProducers(ListArgs),
}

#[derive(Debug, Parser)]
struct AutotagArgs {
    /// Association rule cache (default: <data_dir>/rules.json).
    #[arg(long)]
    rule_cache: Option<Utf8PathBuf>,

    /// File with the packages to consider, one per line.
    #[arg(long)]
    whitelist: Option<Utf8PathBuf>,

    /// Keep proposals that the stable tags already satisfy.
    #[arg(long, default_value_t = false)]
    no_simplify: bool,

    /// Write the patch here instead of stdout.
    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Tag database to check (default: <data_dir>/tags-stable).
    #[arg(long)]
    tags: Option<Utf8PathBuf>,

    /// Patch file applied to the database before checking.
    #[arg(long)]
    patch: Option<Utf8PathBuf>,

    /// Exit with code 2 when check-level violations are found.
    #[arg(long, default_value_t = false)]
    fail_on_violations: bool,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write the JSON report here.
    #[arg(long)]
    report: Option<Utf8PathBuf>,

    /// Write every suggested fix as a patch file here.
    #[arg(long)]
    fixes: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct SimplifyArgs {
    /// Patch file to simplify.
    patch: Utf8PathBuf,

    /// Tag database to simplify against (default: <data_dir>/tags-stable).
    #[arg(long)]
    tags: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct DiffArgs {
    /// Patch file describing the current proposal.
    from: Utf8PathBuf,
    /// Patch file describing the wanted proposal.
    to: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    /// Patch file to apply.
    patch: Utf8PathBuf,

    /// Tag database to patch (default: <data_dir>/tags-stable).
    #[arg(long)]
    tags: Option<Utf8PathBuf>,

    /// Where to write the patched database.
    #[arg(long)]
    out: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct MineRulesArgs {
    /// Tag database used as the corpus (default: <data_dir>/tags-stable).
    #[arg(long)]
    tags: Option<Utf8PathBuf>,

    /// Rule cache to write (default: <data_dir>/rules.json).
    #[arg(long)]
    cache: Option<Utf8PathBuf>,

    /// Path of the apriori executable.
    #[arg(long)]
    program: Option<Utf8PathBuf>,

    /// Mining preset.
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Mine only tags carried by at least this many packages (0 disables the cut).
    #[arg(long)]
    card_threshold: Option<usize>,

    /// Discard the miner's stderr.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Debug, Parser)]
struct ListArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum PresetArg {
    Standard,
    NegativeAssociation,
}

impl From<PresetArg> for MiningPreset {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Standard => MiningPreset::Standard,
            PresetArg::NegativeAssociation => MiningPreset::NegativeAssociation,
        }
    }
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = config::load_or_default(cli.config.as_deref(), Utf8Path::new("."))
        .context("load tagfix.toml config")?;
    let merger = ConfigMerger::new(file_config).with_data_dir(cli.data_dir);
    debug!(data_dir = %merger.data_dir(), "merged config");

    match cli.cmd {
        Command::Autotag(args) => cmd_autotag(&merger, args),
        Command::Check(args) => cmd_check(&merger, args),
        Command::Simplify(args) => cmd_simplify(&merger, args),
        Command::Diff(args) => cmd_diff(args),
        Command::Apply(args) => cmd_apply(&merger, args),
        Command::MineRules(args) => cmd_mine_rules(&merger, args),
        Command::ListChecks(args) => cmd_list_checks(args),
        Command::ListProducers(args) => cmd_list_producers(args),
    }
}

fn cmd_autotag(merger: &ConfigMerger, args: AutotagArgs) -> Result<(), ToolError> {
    let settings = merger.merge_autotag_args(args.rule_cache, args.whitelist, args.no_simplify);
    debug!(?settings, "autotag settings");
    let sources = FsSourcePort::new(merger.data_dir().to_path_buf());

    let outcome = pipeline::run_autotag(&settings, &sources)?;
    info!(producers = ?outcome.producers, "producers run");
    emit_patches(&outcome.patches, args.out.as_deref())
}

fn cmd_check(merger: &ConfigMerger, args: CheckArgs) -> Result<(), ToolError> {
    let settings = merger.merge_check_args(args.tags, args.patch, args.fail_on_violations);
    let registry = CheckRegistry::builtin().context("build check registry")?;

    let outcome = pipeline::run_check(&settings, &registry, tool_info())?;

    match args.format {
        OutputFormat::Text => {
            let mut out = std::io::stdout().lock();
            for v in &outcome.report.violations {
                writeln!(out, "{}: [{}] {}", v.package, v.level, v.message)
                    .context("write violations")?;
                if let Some(fix) = &v.fix {
                    writeln!(out, "  fix: {}", fix).context("write violations")?;
                }
            }
        }
        OutputFormat::Json => print_json(&outcome.report)?,
    }

    if let Some(path) = &args.report {
        write_json(path, &outcome.report)?;
        info!("wrote check report to {}", path);
    }
    if let Some(path) = &args.fixes {
        outcome
            .fixes
            .write_atomically(path)
            .with_context(|| format!("write fixes {}", path))?;
        info!(packages = outcome.fixes.len(), "wrote suggested fixes to {}", path);
    }

    outcome.verdict(&settings)
}

fn cmd_simplify(merger: &ConfigMerger, args: SimplifyArgs) -> Result<(), ToolError> {
    let tags = args
        .tags
        .unwrap_or_else(|| merger.source_path(SourceKind::StableTags));
    let patches = pipeline::run_simplify(&args.patch, &tags)?;
    emit_patches(&patches, None)
}

fn cmd_diff(args: DiffArgs) -> Result<(), ToolError> {
    let patches = pipeline::run_diff(&args.from, &args.to)?;
    emit_patches(&patches, None)
}

fn cmd_apply(merger: &ConfigMerger, args: ApplyArgs) -> Result<(), ToolError> {
    let tags = args
        .tags
        .unwrap_or_else(|| merger.source_path(SourceKind::StableTags));
    pipeline::run_apply(&args.patch, &tags, &args.out, &FsWritePort)?;
    Ok(())
}

fn cmd_mine_rules(merger: &ConfigMerger, args: MineRulesArgs) -> Result<(), ToolError> {
    let settings = merger.merge_mine_args(MineOverrides {
        tags: args.tags,
        cache: args.cache,
        program: args.program,
        preset: args.preset.map(MiningPreset::from),
        card_threshold: args.card_threshold,
        quiet: args.quiet,
    });
    let cache = pipeline::run_mine(&settings)?;
    info!(
        tag_rules = cache.t.len(),
        facet_rules = cache.f.len(),
        "wrote rule cache to {}",
        settings.cache
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct CheckListing {
    id: u32,
    name: &'static str,
    level: tagfix_checks::Level,
    short_description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    long_description: Option<&'static str>,
}

fn cmd_list_checks(args: ListArgs) -> Result<(), ToolError> {
    let registry = CheckRegistry::builtin().context("build check registry")?;
    let listing: Vec<CheckListing> = registry
        .iter()
        .map(|check| {
            let meta = check.meta();
            CheckListing {
                id: meta.id,
                name: meta.name,
                level: meta.level,
                short_description: meta.short_description,
                long_description: meta.long_description,
            }
        })
        .collect();

    match args.format {
        OutputFormat::Text => {
            println!("{:<4} {:<24} {:<6} DESCRIPTION", "ID", "NAME", "LEVEL");
            println!("{}", "-".repeat(72));
            for c in &listing {
                println!(
                    "{:<4} {:<24} {:<6} {}",
                    c.id,
                    c.name,
                    c.level.to_string(),
                    c.short_description
                );
            }
        }
        OutputFormat::Json => print_json(&listing)?,
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct ProducerListing {
    name: &'static str,
    description: &'static str,
    needs: Vec<&'static str>,
}

fn cmd_list_producers(args: ListArgs) -> Result<(), ToolError> {
    let listing: Vec<ProducerListing> = builtin_producer_metas()
        .into_iter()
        .map(|meta| ProducerListing {
            name: meta.name,
            description: meta.description,
            needs: meta.needs.iter().map(|k| k.name()).collect(),
        })
        .collect();

    match args.format {
        OutputFormat::Text => {
            for p in &listing {
                println!("{:<14} {} (needs: {})", p.name, p.description, p.needs.join(", "));
            }
        }
        OutputFormat::Json => print_json(&listing)?,
    }
    Ok(())
}

/// Write a patch set to `out`, or to stdout when no path is given.
fn emit_patches(patches: &PatchSet, out: Option<&Utf8Path>) -> Result<(), ToolError> {
    match out {
        Some(path) => {
            patches
                .write_atomically(path)
                .with_context(|| format!("write patch file {}", path))?;
            info!(packages = patches.len(), "wrote patch to {}", path);
        }
        None => {
            patches
                .write(std::io::stdout().lock())
                .context("write patch to stdout")?;
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    println!("{}", s);
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    FsWritePort
        .write_file(path, s.as_bytes())
        .with_context(|| format!("write {}", path))
}

fn tool_info() -> ReportToolInfo {
    ReportToolInfo {
        name: "tagfix".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
