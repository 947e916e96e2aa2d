use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::bail;
use bio::io::fasta::{Reader, Record, Writer};
use hashbrown::HashMap;
use log::info;

use crate::alphabets::{GAP, POSSIBLE_GAPS};
use crate::cost_matrix::CostMatrix;
use crate::tree::{tree_parser, Tree};
use crate::Result;

pub(crate) struct DataError {
    pub(crate) message: String,
}
impl fmt::Debug for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl Error for DataError {}

/// Reads sequences from a fasta file, returning a vector of fasta records.
/// All sequences are converted to uppercase and every gap character in `-._~` becomes `-`.
///
/// # Arguments
/// * `path` - Path to the fasta file.
///
/// # Example
/// ```
/// use dollo::io::read_sequences;
/// use std::path::PathBuf;
/// let records = read_sequences(&PathBuf::from("./data/sequences_DNA_small.fasta")).unwrap();
/// # assert_eq!(records.len(), 4);
/// # for rec in records {
/// #    assert_eq!(rec.seq(), rec.seq().to_ascii_uppercase());
/// # }
/// ```
pub fn read_sequences(path: &Path) -> Result<Vec<Record>> {
    info!("Reading sequences from file {}", path.display());
    let reader = Reader::from_file(path)?;
    let mut sequences = Vec::new();

    for result in reader.records() {
        let rec = result?;
        if let Err(e) = rec.check() {
            bail!(DataError {
                message: e.to_string()
            });
        }
        let seq: Vec<u8> = rec
            .seq()
            .to_ascii_uppercase()
            .iter()
            .map(|c| if POSSIBLE_GAPS.contains(c) { GAP } else { *c })
            .collect();

        if let Some(&c) = seq.iter().find(|c| !c.is_ascii_alphabetic() && **c != GAP) {
            bail!(DataError {
                message: format!(
                    "Invalid genetic sequence encountered in {}: symbol '{}'",
                    rec.id(),
                    c as char
                )
            });
        }

        sequences.push(Record::with_attrs(rec.id(), rec.desc(), &seq));
    }
    if sequences.is_empty() {
        bail!(DataError {
            message: String::from("No sequences found in file")
        });
    }

    info!("Read {} sequences successfully", sequences.len());
    Ok(sequences)
}

/// Writes fasta sequences to the given file path. Will return an error if the file already exists.
///
/// # Arguments
/// * `sequences` - Vector of fasta records.
/// * `path` - Path to the fasta file.
pub fn write_sequences_to_file(sequences: &[Record], path: &PathBuf) -> Result<()> {
    info!("Writing sequences/MSA to file {}", path.display());
    if path.exists() {
        bail!(DataError {
            message: String::from("File already exists")
        });
    }
    let mut writer = Writer::to_file(path)?;
    for rec in sequences {
        writer.write_record(rec)?;
    }
    writer.flush()?;
    info!("Finished writing successfully");
    Ok(())
}

/// Reads newick trees from a file, returning a vector of trees.
///
/// Will read both rooted and unrooted trees, but unrooted trees will be converted to rooted
/// using zero length branches at the trifurcation.
///
/// # Example
/// ```
/// use dollo::io::read_newick_from_file;
/// use std::path::PathBuf;
/// let trees = read_newick_from_file(&PathBuf::from("./data/tree.newick")).unwrap();
/// # assert_eq!(trees.len(), 1);
/// # assert_eq!(trees[0].leaves().len(), 4);
/// ```
pub fn read_newick_from_file(path: &PathBuf) -> Result<Vec<Tree>> {
    info!("Reading newick trees from file {}", path.display());
    let newick = fs::read_to_string(path)?;
    info!("Read file successfully");
    tree_parser::from_newick(&newick)
}

/// Reads a cost matrix from a whitespace separated table.
///
/// The first line lists the column symbols, every following line starts with its row symbol.
/// Both must include the gap `-`. Empty lines and lines starting with `#` are skipped.
///
/// ```text
///    A  C  -
/// A  0  1  2
/// C  1  0  2
/// -  2  2  0
/// ```
///
/// # Example
/// ```
/// use dollo::io::read_cost_matrix;
/// use std::path::PathBuf;
/// let costs = read_cost_matrix(&PathBuf::from("./data/nucleotide_costs.txt")).unwrap();
/// assert_eq!(costs.cost(b'A', b'G'), 1.0);
/// assert_eq!(costs.cost(b'A', b'-'), 10.0);
/// ```
pub fn read_cost_matrix(path: &Path) -> Result<CostMatrix> {
    info!("Reading cost matrix from file {}", path.display());
    let content = fs::read_to_string(path)?;
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    let header = match lines.next() {
        Some(line) => parse_symbols(line)?,
        None => bail!(DataError {
            message: String::from("No cost matrix found in file")
        }),
    };
    let mut map: HashMap<u8, HashMap<u8, f64>> = HashMap::with_capacity(header.len());
    for line in lines {
        let mut fields = line.split_whitespace();
        let row = match fields.next() {
            Some(field) => parse_symbol(field)?,
            None => continue,
        };
        let costs = fields
            .map(|field| {
                field.parse::<f64>().map_err(|_| DataError {
                    message: format!("Invalid cost '{}' in row {}", field, row as char),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if costs.len() != header.len() {
            bail!(DataError {
                message: format!(
                    "Row {} has {} costs, expected {}",
                    row as char,
                    costs.len(),
                    header.len()
                )
            });
        }
        if map
            .insert(row, header.iter().copied().zip(costs).collect())
            .is_some()
        {
            bail!(DataError {
                message: format!("Row {} is listed twice", row as char)
            });
        }
    }
    let costs = CostMatrix::from_map(&map)?;
    info!("Read a cost matrix over {} symbols", costs.size());
    Ok(costs)
}

fn parse_symbols(line: &str) -> Result<Vec<u8>> {
    let symbols = line
        .split_whitespace()
        .map(parse_symbol)
        .collect::<Result<Vec<_>>>()?;
    for (i, symbol) in symbols.iter().enumerate() {
        if symbols[..i].contains(symbol) {
            bail!(DataError {
                message: format!("Column {} is listed twice", *symbol as char)
            });
        }
    }
    Ok(symbols)
}

fn parse_symbol(field: &str) -> Result<u8> {
    match field.as_bytes() {
        &[symbol] if symbol.is_ascii_graphic() => {
            let symbol = symbol.to_ascii_uppercase();
            Ok(if POSSIBLE_GAPS.contains(&symbol) {
                GAP
            } else {
                symbol
            })
        }
        _ => bail!(DataError {
            message: format!("Invalid cost matrix symbol '{}'", field)
        }),
    }
}
