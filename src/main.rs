//! seqedit - Alignment Editor
//!
//! Loads an aligned FASTA file, applies edit commands, and writes the result
//! with an optional consensus record.
//!
//! ## Usage
//!
//! ```bash
//! seqedit aligned.fasta -e "strip" -e "level-left 1 -1 12" -o out.fasta
//! seqedit aligned.fasta -s edits.txt --consensus nucleotide
//! ```
//!
//! See the `command` module for the command language.

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use seqedit::command::{parse_script, EditCommand};
use seqedit::controller::{EditSession, SessionConfig};
use seqedit::fasta::{parse_fasta_file, write_fasta, write_fasta_file};
use seqedit::model::{is_gap, SequenceType};
use seqedit::symbol_rules::SymbolRuleSet;

/// Alphabet specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeArg {
    /// Detect from residues
    Auto,
    /// DNA or RNA
    Nucleotide,
    /// Protein
    Amino,
}

impl From<TypeArg> for Option<SequenceType> {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Auto => None,
            TypeArg::Nucleotide => Some(SequenceType::Nucleotide),
            TypeArg::Amino => Some(SequenceType::AminoAcid),
        }
    }
}

/// Consensus rule preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConsensusArg {
    /// Pick from the alignment's alphabet
    Auto,
    /// Amino acid classes
    Amino,
    /// Bases and IUPAC codes
    Nucleotide,
    /// No consensus record
    None,
}

/// seqedit - edit a multiple sequence alignment from the command line
///
/// Commands given with -s/--script run first, then each -e/--edit in order.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Aligned FASTA file
    file: PathBuf,

    /// Alphabet of the sequences (overrides auto-detection)
    #[arg(short = 't', long = "type", value_enum, default_value = "auto")]
    sequence_type: TypeArg,

    /// Edit command, may be repeated (e.g. "gap 3 2", "slide 5 1 8 4 -2")
    #[arg(short = 'e', long = "edit")]
    edits: Vec<String>,

    /// File of edit commands, one per line, '#' starts a comment
    #[arg(short = 's', long = "script")]
    script: Option<PathBuf>,

    /// Consensus rule preset
    #[arg(short = 'c', long = "consensus", value_enum, default_value = "auto")]
    consensus: ConsensusArg,

    /// Do not append a consensus record (same as --consensus none)
    #[arg(long = "no-consensus")]
    no_consensus: bool,

    /// Gap character written by edits ('-' or '.')
    #[arg(short = 'g', long = "gap-char", default_value = "-")]
    gap_char: char,

    /// Output file. Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,

    /// Residues per output line (0 for one line per sequence)
    #[arg(short = 'w', long = "line-width", default_value = "0")]
    line_width: usize,

    /// Increase logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

/// Resolves the consensus preset against the loaded alphabet.
fn consensus_rules(arg: ConsensusArg, sequence_type: SequenceType) -> Option<SymbolRuleSet> {
    match arg {
        ConsensusArg::None => None,
        ConsensusArg::Amino => Some(SymbolRuleSet::amino_acid_default()),
        ConsensusArg::Nucleotide => Some(SymbolRuleSet::nucleotide_default()),
        ConsensusArg::Auto => SessionConfig::for_sequence_type(sequence_type).rules,
    }
}

/// Reads the script (if any) then the inline edits.
fn collect_commands(script: Option<&Path>, edits: &[String]) -> Result<Vec<EditCommand>> {
    let mut commands = match script {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read script {}", path.display()))?;
            parse_script(&text).with_context(|| format!("in script {}", path.display()))?
        }
        None => Vec::new(),
    };
    for edit in edits {
        let command = edit
            .parse::<EditCommand>()
            .with_context(|| format!("invalid edit '{}'", edit))?;
        commands.push(command);
    }
    Ok(commands)
}

/// Runs CLI mode: parse file, apply edits, and write to output.
fn run_cli_mode(args: &Args) -> Result<()> {
    if !args.gap_char.is_ascii() || !is_gap(args.gap_char as u8) {
        bail!("Gap character must be '-' or '.' (got '{}')", args.gap_char);
    }
    let commands = collect_commands(args.script.as_deref(), &args.edits)?;

    let alignment = parse_fasta_file(&args.file, args.sequence_type.into())
        .with_context(|| format!("cannot load {}", args.file.display()))?;
    log::info!(
        "loaded {} rows x {} columns ({})",
        alignment.row_count(),
        alignment.length(),
        alignment.sequence_type()
    );

    let preset = if args.no_consensus {
        ConsensusArg::None
    } else {
        args.consensus
    };
    let config = SessionConfig {
        gap_char: args.gap_char as u8,
        rules: consensus_rules(preset, alignment.sequence_type()),
    };
    let mut session = EditSession::new(alignment, config);

    for (i, command) in commands.iter().enumerate() {
        let report = command
            .apply(&mut session)
            .with_context(|| format!("command {} '{}' failed", i + 1, command))?;
        log::info!("{}: {}", command, report);
    }
    debug_assert!(session.is_consistent());

    let consensus = session
        .consensus()
        .map(|c| ("consensus", c.as_bytes()));
    if args.output == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_fasta(&mut handle, session.alignment(), consensus, args.line_width)?;
    } else {
        write_fasta_file(&args.output, session.alignment(), consensus, args.line_width)
            .with_context(|| format!("cannot write {}", args.output))?;
        log::info!(
            "Wrote {} sequences to {}",
            session.alignment().row_count(),
            args.output
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);
    run_cli_mode(&args)
}
