use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use console::style;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::{info, warn};
use simple_logger::SimpleLogger;
use thousands::Separable;

use sigstring::exporters::{self, Exporter};
use sigstring::structs::*;
use sigstring::utils;
use sigstring::*;

#[derive(Parser)]
#[command(author, version, about = "Index FASTA files in a generalized suffix tree and mine their substrings")]
struct Args {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find every occurrence of a pattern
    Query {
        pattern: String,

        #[command(flatten)]
        common: Common,
    },

    /// List the substrings shared by enough sequences
    Frequent {
        /// Minimal number of distinct sequences containing a substring
        #[arg(short = 's', long, default_value_t = 2)]
        min_support: usize,

        /// Only keep substrings that are not part of a longer one with the same support
        #[arg(long)]
        closed: bool,

        #[command(flatten)]
        common: Common,
    },

    /// List the substrings characteristic of an input file
    Signatures {
        /// Minimal number of sequences of the dominant class containing a substring
        #[arg(short = 'm', long, default_value_t = 2)]
        min_instances: usize,

        /// Minimal rate of the dominant class
        #[arg(long)]
        high: Option<f64>,

        /// Maximal rate of any other class
        #[arg(long)]
        low: Option<f64>,

        /// Only report the deepest signature of each branch
        #[arg(long)]
        pruned: bool,

        #[command(flatten)]
        common: Common,
    },
}

#[derive(clap::Args)]
struct Common {
    /// FASTA files to index; each file is a class of its own
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Set the desired output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write the result to this file. If unspecified, write to STDOUT.
    #[arg(short, long)]
    out: Option<String>,

    /// Filter out reported substrings shorter than this
    #[arg(long, default_value_t = 1)]
    min_length: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Tsv,
}

struct Dataset {
    tree:      SuffixTree,
    classes:   ClassTable,
    sequences: Vec<SequenceRecord>,
}

fn index(inputs: &[String]) -> Result<Dataset> {
    info!("{} Reading sequences...", style("[1/3]").blue().bold());
    let mut sequences = Vec::new();
    let mut records = Vec::new();
    let mut populations = Vec::new();
    for (class, file) in inputs.iter().enumerate() {
        let file_records = utils::read_fasta(file)?;
        if file_records.is_empty() {
            bail!("`{}` does not contain any sequence", file);
        }
        populations.push(file_records.len());
        for r in file_records {
            sequences.push(SequenceRecord {
                id: (records.len() + 1) as SequenceId,
                name: r.name.clone(),
                file: file.clone(),
                class,
                length: r.sequence.len(),
            });
            records.push(r);
        }
    }
    let classes = ClassTable::new(populations)?;
    let total: usize = records.iter().map(|r| r.sequence.len()).sum();

    info!(
        "{} Indexing {} sequences ({}bp)...",
        style("[2/3]").blue().bold(),
        records.len().separate_with_commas(),
        total.separate_with_commas()
    );
    let mut tree = SuffixTree::new();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.blue} [{elapsed}] {wide_bar} {bytes}/{total_bytes} ({eta} remaining)")?);
    for r in &records {
        tree.insert_sequence(&r.sequence)
            .with_context(|| format!("Unable to index `{}`", r.name))?;
        pb.inc(r.sequence.len() as u64);
    }
    pb.finish_and_clear();
    info!("{} nodes in the suffix tree", tree.node_count().separate_with_commas());

    Ok(Dataset {
        tree,
        classes,
        sequences,
    })
}

fn write_report(report: &Report, format: Format, out: &Option<String>) -> Result<()> {
    let exporter: Box<dyn Exporter> = match format {
        Format::Json => Box::new(exporters::JSONExporter),
        Format::Tsv => Box::new(exporters::TSVExporter),
    };
    let extension = match format {
        Format::Json => "json",
        Format::Tsv => "tsv",
    };

    match out {
        Some(out) => {
            let filename = utils::make_filename(out, extension);
            let mut f = BufWriter::new(File::create(&filename).with_context(|| format!("Unable to create `{}`", filename))?);
            exporter.save(report, &mut f)?;
            f.flush().with_context(|| format!("Unable to write `{}`", filename))?;
            info!("{}", style(format!("Result written to {}", filename)).bold());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            exporter.save(report, &mut lock)?;
        }
    }
    Ok(())
}

fn run(command: Command) -> Result<()> {
    let start = Instant::now();
    let (common, settings) = match &command {
        Command::Query { pattern, common } => (
            common,
            RunSettings {
                pattern: Some(pattern.clone()),
                ..Default::default()
            },
        ),
        Command::Frequent {
            min_support,
            closed,
            common,
        } => (
            common,
            RunSettings {
                min_support: Some(*min_support),
                closed: *closed,
                ..Default::default()
            },
        ),
        Command::Signatures {
            min_instances,
            high,
            low,
            pruned,
            common,
        } => (
            common,
            RunSettings {
                min_instances: Some(*min_instances),
                high_level: *high,
                low_level: *low,
                pruned: *pruned,
                ..Default::default()
            },
        ),
    };
    let settings = RunSettings {
        min_length: common.min_length,
        ..settings
    };

    let Dataset {
        mut tree,
        classes,
        sequences,
    } = index(&common.inputs)?;
    let mut report = Report::new(common.inputs.clone(), sequences, settings);

    info!("{} Mining...", style("[3/3]").blue().bold());
    match &command {
        Command::Query { pattern, .. } => {
            let occurrences = tree.query_substring(pattern.as_bytes());
            if occurrences.len() == 0 {
                warn!("`{}` not found", pattern);
            }
            report.add_occurrences(occurrences);
        }
        Command::Frequent { min_support, closed, .. } => {
            let mut found = mine_frequent(&mut tree, *min_support);
            if *closed {
                found = mine_closed(found);
            }
            report.add_substrings(&found);
        }
        Command::Signatures {
            min_instances,
            high,
            low,
            pruned,
            ..
        } => {
            let thresholds = SignatureThresholds {
                min_instances: *min_instances,
                high_level:    *high,
                low_level:     *low,
            };
            let found = if *pruned {
                mine_signatures_pruned(&mut tree, &classes, &thresholds)?
            } else {
                mine_signatures_with(&mut tree, &classes, &thresholds)?
            };
            report.add_signatures(&found);
        }
    }

    write_report(&report, common.format, &common.out)?;
    info!(
        "{}",
        style(format!(
            "{} processed in {}.",
            common.inputs.join(", "),
            HumanDuration(start.elapsed())
        ))
        .green()
        .bold()
    );
    Ok(())
}

fn main() -> Result<()> {
    human_panic::setup_panic!();
    let args = Args::parse();
    SimpleLogger::new()
        .with_level(args.verbose.log_level_filter())
        .init()
        .context("Unable to initialize logger")?;

    run(args.command)
}
