use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use dollo::alignment::GapExtension;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(super) struct Cli {
    /// Sequence file in fasta format
    #[arg(short, long, value_name = "SEQ_FILE")]
    pub(super) seq_file: PathBuf,

    /// Tree file in newick format, the first tree in the file is used
    #[arg(short, long, value_name = "TREE_FILE")]
    pub(super) tree_file: PathBuf,

    /// Cost matrix file, unit costs are used if omitted
    #[arg(short, long, value_name = "COST_MATRIX_FILE")]
    pub(super) cost_matrix: Option<PathBuf>,

    /// Log per node progress
    #[arg(short, long)]
    pub(super) verbose: bool,

    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Subcommand)]
pub(super) enum Commands {
    /// Scores the given multiple sequence alignment under Dollo parsimony
    Score {
        /// Restrict Fitch parsimony to the minimal clade of each column instead
        #[arg(long)]
        clade_fitch: bool,

        /// Fasta file for the reconstructed ancestral sequences
        #[arg(short, long, value_name = "ANCESTORS_FILE")]
        ancestors_file: Option<PathBuf>,
    },
    /// Aligns the given sequences progressively up the tree
    Align {
        /// Output multiple sequence alignment in fasta format
        #[arg(short, long, value_name = "OUTPUT_MSA_FILE")]
        output_msa_file: PathBuf,

        /// Cost of extending a gap run, defaults to charged without and free with a cost matrix
        #[arg(short, long, value_enum)]
        gap_extension: Option<GapExtensionArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(super) enum GapExtensionArg {
    Charged,
    Free,
}

impl From<GapExtensionArg> for GapExtension {
    fn from(arg: GapExtensionArg) -> Self {
        match arg {
            GapExtensionArg::Charged => GapExtension::Charged,
            GapExtensionArg::Free => GapExtension::Free,
        }
    }
}
