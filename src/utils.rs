use std::path::Path;

use anyhow::{Context, Result};
use bio::io::fasta;
use log::warn;

/// A named record of a FASTA file.
#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub name:     String,
    pub sequence: Vec<u8>,
}

pub fn read_fasta(filename: &str) -> Result<Vec<FastaRecord>> {
    let reader = fasta::Reader::from_file(filename).with_context(|| format!("Unable to open `{}`", filename))?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| {
            format!(
                "Unable to read {:?}: not a FASTA file",
                Path::new(filename).file_name().unwrap_or_default()
            )
        })?;

        let name = match record.desc() {
            Some(desc) => format!("{} {}", record.id(), desc),
            None => record.id().to_owned(),
        };
        if record.seq().is_empty() {
            warn!("`{}` in `{}` is empty", name, filename);
        }
        records.push(FastaRecord {
            name,
            sequence: record.seq().to_vec(),
        });
    }

    Ok(records)
}

/// Append `ext` to `basename` unless it already ends with it.
pub fn make_filename(basename: &str, ext: &str) -> String {
    if basename.to_lowercase().ends_with(&format!(".{}", ext)) {
        basename.to_owned()
    } else {
        format!("{}.{}", basename, ext)
    }
}
