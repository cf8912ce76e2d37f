//! Skill Planner - Entry Point
//!
//! Loads the master catalog and the user document, runs one command against
//! the planner and saves the document again when the command changed it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use skillplanner::catalog::load_catalog;
use skillplanner::custom::{parse_bundle, ConflictResolver, EntityKind, EntityRef, Resolution};
use skillplanner::planner::Planner;
use skillplanner::save::{self, load_user_data, parse_full_backup, save_user_data};
use skillplanner::tracking::Exclusivity;

#[derive(Parser)]
#[command(name = "skillplanner", version)]
#[command(about = "Plan a training deck and track which skills it can grant")]
struct Cli {
    /// Master catalog (defaults to masterData.json in the data directory)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// User data file (defaults to userdata.json in the data directory)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List obtainable skills grouped by source
    Skills,

    /// Show progress towards the required skills
    Progress,

    /// Change the deck
    Deck {
        #[command(subcommand)]
        action: DeckCommand,
    },

    /// Manage owned cards and factor sets
    Collection {
        #[command(subcommand)]
        action: CollectionCommand,
    },

    /// Cycle a skill's check state (not started, in progress, acquired)
    Check { skill_id: String },

    /// Edit the required and ignored skill lists
    Target {
        #[command(subcommand)]
        action: TargetCommand,
    },

    /// Merge an export file into the custom catalog
    Import { file: PathBuf },

    /// Export one custom entity with the custom skills it uses
    Export {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
        file: PathBuf,
    },

    /// Export every custom entity
    ExportAll { file: PathBuf },

    /// Write a full backup of the user data
    Backup { file: PathBuf },

    /// Replace the user data with a full backup
    Restore { file: PathBuf },
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Select a scenario, or clear it when no id is given
    Scenario { id: Option<String> },
    /// Put an owned factor set in slot 1-2
    Factor {
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        slot: u16,
        id: Option<String>,
    },
    /// Put an owned support card in slot 1-6
    Card {
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        slot: u16,
        id: Option<String>,
    },
}

#[derive(Subcommand)]
enum CollectionCommand {
    /// List owned cards and factor sets
    List,
    /// Own a master support card
    AddCard {
        master_card_id: String,
        /// Breakthrough level 0-4
        #[arg(long, default_value_t = 0)]
        level: u8,
    },
    /// Own a master factor set
    AddFactor { master_inza_id: String },
    /// Remove an owned card or factor set
    Remove { id: String },
}

#[derive(Subcommand)]
enum TargetCommand {
    Required { skill_id: String },
    Ignored { skill_id: String },
    Remove { skill_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Skill,
    Card,
    Factor,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Skill => EntityKind::Skill,
            KindArg::Card => EntityKind::SupportCard,
            KindArg::Factor => EntityKind::FactorSet,
        }
    }
}

/// Asks on the terminal how to settle each import conflict
struct PromptResolver {
    lines: Lines<BufReader<Stdin>>,
}

impl PromptResolver {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        flush_prompt(&mut std::io::stdout());
        match self.lines.next_line().await {
            Ok(line) => line.map(|l| l.trim().to_string()),
            Err(e) => {
                log::warn!("Failed to read answer: {}", e);
                None
            }
        }
    }
}

/// Push a prompt without a trailing newline out to the terminal
fn flush_prompt(out: &mut impl Write) -> bool {
    match out.flush() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to show prompt: {}", e);
            false
        }
    }
}

#[async_trait]
impl ConflictResolver for PromptResolver {
    async fn resolve(&mut self, existing: EntityRef<'_>, incoming: EntityRef<'_>, kind: EntityKind) -> Resolution {
        println!(
            "A custom {} named \"{}\" already exists ({}); the import has {}.",
            kind,
            existing.name(),
            existing.id(),
            incoming.id()
        );
        loop {
            let Some(answer) = self.ask("[o]verwrite / [r]ename / [s]kip / [a]dd anyway: ").await else {
                return Resolution::Skip;
            };
            match answer.to_lowercase().as_str() {
                "o" | "overwrite" => return Resolution::Overwrite,
                "s" | "skip" => return Resolution::Skip,
                "a" | "add" => return Resolution::Add,
                "r" | "rename" => {
                    let name = self.ask("New name: ").await.unwrap_or_default();
                    return Resolution::Rename(name);
                }
                _ => println!("Please answer o, r, s or a."),
            }
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    log::info!("Starting Skill Planner v{}", env!("CARGO_PKG_VERSION"));

    let catalog_path = cli.catalog.clone().unwrap_or_else(save::catalog_path);
    let data_path = cli.data.clone().unwrap_or_else(save::user_data_path);

    // Nothing works without the master catalog
    let master = load_catalog(&catalog_path).context("cannot start without the master catalog")?;
    let user = load_user_data(&data_path)
        .with_context(|| format!("cannot read user data at {}", data_path.display()))?;
    let mut planner = Planner::new(master, user);

    let changed = run(&mut planner, cli.command)?;
    if changed {
        if let Err(e) = save_user_data(&data_path, planner.user()) {
            log::error!("Save failed: {}", e);
            eprintln!("warning: changes were not saved: {e}");
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Run one command. Returns whether the user data changed.
fn run(planner: &mut Planner, command: Commands) -> Result<bool> {
    match command {
        Commands::Skills => {
            print_skills(planner);
            Ok(false)
        }
        Commands::Progress => {
            print_progress(planner);
            Ok(false)
        }
        Commands::Deck { action } => {
            match action {
                DeckCommand::Scenario { id } => planner.select_scenario(id.as_deref())?,
                DeckCommand::Factor { slot, id } => planner.select_factor_set(usize::from(slot) - 1, id.as_deref())?,
                DeckCommand::Card { slot, id } => planner.select_support_card(usize::from(slot) - 1, id.as_deref())?,
            }
            Ok(true)
        }
        Commands::Collection { action } => run_collection(planner, action),
        Commands::Check { skill_id } => {
            let state = planner.cycle_check_state(&skill_id);
            println!("{} {}", state.symbol(), skill_id);
            Ok(true)
        }
        Commands::Target { action } => {
            let changed = match action {
                TargetCommand::Required { skill_id } => planner.add_required(&skill_id),
                TargetCommand::Ignored { skill_id } => planner.add_ignored(&skill_id),
                TargetCommand::Remove { skill_id } => planner.remove_target(&skill_id),
            };
            Ok(changed)
        }
        Commands::Import { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("cannot read {}", file.display()))?;
            let bundle = parse_bundle(&text)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("cannot start async runtime")?;
            let mut resolver = PromptResolver::new();
            let stats = runtime.block_on(planner.import(bundle, &mut resolver));
            println!(
                "Imported: {} added, {} overwritten, {} skipped, {} linked to master skills",
                stats.added, stats.overwritten, stats.skipped, stats.linked
            );
            Ok(stats.total() > 0)
        }
        Commands::Export { kind, id, file } => {
            let bundle = planner.export_item(kind.into(), &id)?;
            write_file(&file, &bundle.to_json()?)?;
            Ok(false)
        }
        Commands::ExportAll { file } => {
            write_file(&file, &planner.export_all().to_json()?)?;
            Ok(false)
        }
        Commands::Backup { file } => {
            write_file(&file, &planner.user().to_json()?)?;
            Ok(false)
        }
        Commands::Restore { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("cannot read {}", file.display()))?;
            let backup = parse_full_backup(&text)?;
            planner.restore(backup);
            println!("Restored user data from {}", file.display());
            Ok(true)
        }
    }
}

fn run_collection(planner: &mut Planner, action: CollectionCommand) -> Result<bool> {
    match action {
        CollectionCommand::List => {
            println!("Support cards:");
            for card in &planner.user().my_collection.support_cards {
                let level = planner.card_level_info(&card.id).map(|i| i.text).unwrap_or_default();
                println!("  {}  {}  {}", card.id, card.name, level);
            }
            println!("Factor sets:");
            for set in &planner.user().my_collection.inza_characters {
                println!("  {}  {}", set.id, set.name);
            }
            Ok(false)
        }
        CollectionCommand::AddCard { master_card_id, level } => {
            let id = planner.add_master_card(&master_card_id, level)?;
            println!("Added {id}");
            Ok(true)
        }
        CollectionCommand::AddFactor { master_inza_id } => {
            let id = planner.add_master_factor_set(&master_inza_id)?;
            println!("Added {id}");
            Ok(true)
        }
        CollectionCommand::Remove { id } => {
            let removed = planner.remove_owned_card(&id) || planner.remove_owned_factor_set(&id);
            if !removed {
                anyhow::bail!("nothing owned with id {id}");
            }
            Ok(true)
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_skills(planner: &Planner) {
    let lookup = planner.lookup();
    let skills = planner.obtainable_skills();
    let groups = planner.classify();
    let checks = &planner.user().skill_check_states;

    let buckets = Exclusivity::ALL
        .iter()
        .map(|e| (e.label(), groups.bucket(*e)))
        .chain(std::iter::once(("Acquired", &groups.acquired)));
    for (label, bucket) in buckets {
        if bucket.is_empty() {
            continue;
        }
        println!("== {} ({}) ==", label, bucket.len());
        for (category, ids) in bucket.sections() {
            println!("  -- {} --", category.name());
            for id in ids {
                let name = lookup.skill(id).map(|s| s.name.as_str()).unwrap_or(id.as_str());
                let sources = skills.get(id).map(|s| s.sources_label()).unwrap_or_default();
                println!("  {} {}  {}", checks.get(id).symbol(), name, sources);
            }
        }
    }
    if skills.is_empty() {
        println!("The current deck grants no skills.");
    }
}

fn print_progress(planner: &Planner) {
    let progress = planner.progress();
    if progress.required_total() == 0 {
        println!("No target skills set.");
        return;
    }
    println!(
        "Acquired {} / {} ({:.0}%)",
        progress.acquired_count(),
        progress.required_total(),
        progress.ratio() * 100.0
    );
    for entry in &progress.acquired {
        println!("  [x] {}", entry.name);
    }
    for entry in &progress.remaining {
        let warning = if entry.obtainable { "" } else { "  (not obtainable with this deck)" };
        println!("  [ ] {}{}", entry.name, warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_flush_prompt_reports_failure() {
        assert!(!flush_prompt(&mut BrokenPipe));
        assert!(flush_prompt(&mut Vec::<u8>::new()));
    }
}
