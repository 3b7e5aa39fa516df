use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use libromaji::{Composition, RomajiConfig, Transliterator, TrimMode};

#[derive(Parser)]
#[command(name = "libromaji")]
#[command(about = "Romaji composition demo: type romaji, see every rendering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Single romaji input for quick testing
    input: Option<String>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tab-separated rule file used instead of the built-in rules
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive REPL mode
    Repl,
    /// Render one input under a single mode
    Render {
        /// Rendering mode
        #[arg(long, value_enum, default_value_t = Mode::Native)]
        mode: Mode,
        /// Treatment of the last chunk
        #[arg(long, value_enum, default_value_t = Trim::AsIs)]
        trim: Trim,
        /// Romaji input
        input: String,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum Mode {
    Native,
    Conversion,
    Raw,
    Hiragana,
    FullKatakana,
    HalfKatakana,
    FullAscii,
    HalfAscii,
}

impl From<Mode> for Transliterator {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Native => Transliterator::Native,
            Mode::Conversion => Transliterator::Conversion,
            Mode::Raw => Transliterator::Raw,
            Mode::Hiragana => Transliterator::Hiragana,
            Mode::FullKatakana => Transliterator::FullKatakana,
            Mode::HalfKatakana => Transliterator::HalfKatakana,
            Mode::FullAscii => Transliterator::FullAscii,
            Mode::HalfAscii => Transliterator::HalfAscii,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum Trim {
    Trim,
    AsIs,
    Fix,
}

impl From<Trim> for TrimMode {
    fn from(trim: Trim) -> Self {
        match trim {
            Trim::Trim => TrimMode::Trim,
            Trim::AsIs => TrimMode::AsIs,
            Trim::Fix => TrimMode::Fix,
        }
    }
}

fn build_composition(cli: &Cli) -> Result<Composition> {
    let config = match &cli.config {
        Some(path) => RomajiConfig::load_toml(path)?,
        None => RomajiConfig::default(),
    };

    match &cli.table {
        Some(path) => {
            let table = libromaji::load_table(path, &config)?;
            println!("loaded {} rules from {}", table.len(), path.display());
            Ok(Composition::with_config(Arc::new(table), config.base()))
        }
        None => Ok(libromaji::composition(&config)),
    }
}

fn print_renderings(comp: &Composition) {
    for mode in Transliterator::ALL {
        println!("  {:<14} {}", format!("{:?}", mode), comp.render_with_transliterator(mode));
    }
    println!(
        "  {:<14} {} | {}",
        "Trim / AsIs",
        comp.render_with_trim_mode(TrimMode::Trim),
        comp.render_with_trim_mode(TrimMode::AsIs)
    );

    let segments: Vec<String> = comp
        .segments(Transliterator::Raw)
        .iter()
        .map(|s| format!("{}..{}", s.range.start, s.range.end))
        .collect();
    println!("  {:<14} {}", "raw chunks", segments.join(" "));
}

fn compose(template: &Composition, input: &str) -> Composition {
    let mut comp = template.clone();
    comp.clear();
    comp.insert_at(0, input);
    comp
}

fn run_repl(template: &Composition) -> Result<()> {
    println!("Type romaji and press Enter. Ctrl+D exits.");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        print_renderings(&compose(template, input));
        println!();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let template = build_composition(&cli)?;

    match &cli.command {
        Some(Commands::Repl) => run_repl(&template)?,
        Some(Commands::Render { mode, trim, input }) => {
            let comp = compose(&template, input);
            println!("{}", comp.render((*mode).into(), (*trim).into()));
        }
        None => match &cli.input {
            Some(input) => print_renderings(&compose(&template, input)),
            None => run_repl(&template)?,
        },
    }
    Ok(())
}
