use std::path::PathBuf;

use anyhow::{anyhow, bail, Error};
use clap::Parser;
use ftail::Ftail;
use log::{error, info, warn, LevelFilter};

use dollo::alignment::{profile_scoring, Aligner, GapExtension, ProgressiveAligner};
use dollo::alphabets::Alphabet;
use dollo::cost_matrix::CostMatrix;
use dollo::io::{read_cost_matrix, read_newick_from_file, read_sequences, write_sequences_to_file};
use dollo::parsimony::{
    CladeFitchParsimony, DolloParsimony, FixedAlignment, InsertionPoints, WeightedDolloParsimony,
};
use dollo::sequences::Sequences;
use dollo::tree::Tree;

mod cli;
use crate::cli::{Cli, Commands, GapExtensionArg};

type Result<T> = std::result::Result<T, Error>;

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            bail!("Unable to parse command line arguments: \n {}", error)
        }
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Ftail::new()
        .console(level)
        .init()
        .map_err(|e| anyhow!("Unable to set up logging: {e:?}"))?;
    info!("Successfully parsed the command line parameters");

    if let Err(e) = run(cli) {
        error!("{e:?}");
        return Err(e);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    info!("Running on sequences from {}.", cli.seq_file.display());
    let seqs = Sequences::new(read_sequences(&cli.seq_file)?);
    info!("Using tree from {}.", cli.tree_file.display());
    let tree = first_tree(&cli.tree_file)?;
    let costs = match &cli.cost_matrix {
        Some(path) => {
            let costs = read_cost_matrix(path)?;
            costs.validate_symbols(&seqs)?;
            Some(costs)
        }
        None => None,
    };

    match cli.command {
        Commands::Score {
            clade_fitch,
            ancestors_file,
        } => score(&tree, &seqs, costs.as_ref(), clade_fitch, ancestors_file),
        Commands::Align {
            output_msa_file,
            gap_extension,
        } => align(&tree, &seqs, costs.as_ref(), gap_extension, output_msa_file),
    }
}

fn first_tree(path: &PathBuf) -> Result<Tree> {
    let mut trees = read_newick_from_file(path)?;
    if trees.len() > 1 {
        warn!("Found {} trees, using the first one.", trees.len());
    }
    if trees.is_empty() {
        bail!("No tree found in {}", path.display());
    }
    Ok(trees.swap_remove(0))
}

fn score(
    tree: &Tree,
    seqs: &Sequences,
    costs: Option<&CostMatrix>,
    clade_fitch: bool,
    ancestors_file: Option<PathBuf>,
) -> Result<()> {
    let aln = FixedAlignment::new(tree, seqs)?;
    let points = InsertionPoints::locate(&aln);
    let alphabet = match costs {
        Some(costs) => costs.alphabet().clone(),
        None => Alphabet::from_sequences(seqs)?,
    };

    let ancestors = match (clade_fitch, costs) {
        (true, costs) => {
            if costs.is_some() {
                warn!("Clade restricted Fitch parsimony ignores the cost matrix.");
            }
            let parsimony = CladeFitchParsimony::new(&aln, &points);
            println!("{}", parsimony.score());
            ancestors_file
                .as_ref()
                .map(|_| parsimony.ancestral_sequences(&alphabet))
        }
        (false, Some(costs)) => {
            println!("{}", WeightedDolloParsimony::new(&aln, &points, costs).score());
            ancestors_file.as_ref().map(|_| {
                info!("Ancestral sequences are reconstructed from the unweighted sets.");
                DolloParsimony::new(&aln, &points).ancestral_sequences(&alphabet)
            })
        }
        (false, None) => {
            let parsimony = DolloParsimony::new(&aln, &points);
            println!("{}", parsimony.score());
            ancestors_file
                .as_ref()
                .map(|_| parsimony.ancestral_sequences(&alphabet))
        }
    };

    if let (Some(path), Some(ancestors)) = (ancestors_file, ancestors) {
        info!("Putting ancestral sequences in {}", path.display());
        write_sequences_to_file(&ancestors, &path)?;
    }
    Ok(())
}

fn align(
    tree: &Tree,
    seqs: &Sequences,
    costs: Option<&CostMatrix>,
    gap_extension: Option<GapExtensionArg>,
    output_msa_file: PathBuf,
) -> Result<()> {
    let scoring = profile_scoring(costs, gap_extension.map(GapExtension::from));
    let alignment = ProgressiveAligner::new(scoring).align(tree, seqs)?;
    println!("{}", alignment.score());
    info!("Putting resulting alignment in {}", output_msa_file.display());
    write_sequences_to_file(&alignment.records(tree), &output_msa_file)
}
