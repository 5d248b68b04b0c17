//! Aligned FASTA import and export.
//!
//! This module is the file boundary of the editor. It reads an aligned
//! FASTA file into an [`Alignment`] and writes one back, optionally
//! followed by a consensus record.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! AC-GTACG--TACGT...
//! >another_sequence
//! TGCA-TGCATG-CA...
//! ```
//!
//! Every record must have the same aligned length. Records holding only
//! gaps cannot become rows and are skipped with a warning.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::alignment::{Alignment, EditError};
use crate::model::{RowError, SequenceRow, SequenceType};

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),

    #[error("Not an alignment: {0}")]
    Alignment(#[from] EditError),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// One header plus its sequence bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Record {
    id: String,
    data: Vec<u8>,
}

/// Parses a FASTA file into an alignment.
///
/// The alphabet is detected from the residues unless `sequence_type` is
/// given.
///
/// # Examples
///
/// ```no_run
/// use seqedit::fasta::parse_fasta_file;
///
/// let alignment = parse_fasta_file("aligned.fasta", None).unwrap();
/// println!("Loaded {} rows", alignment.row_count());
/// ```
pub fn parse_fasta_file<P: AsRef<Path>>(
    path: P,
    sequence_type: Option<SequenceType>,
) -> FastaResult<Alignment> {
    let file = File::open(&path)?;
    let file_size = file.metadata()?.len() as usize;

    let records = if file_size > 1_000_000 {
        // read large files at once rather than line by line
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let mut content = String::with_capacity(file_size);
        reader.read_to_string(&mut content)?;
        read_records(content.lines().map(Ok))?
    } else {
        read_records(BufReader::new(file).lines())?
    };

    let mut alignment = build_alignment(records, sequence_type)?;
    alignment.name = path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());
    Ok(alignment)
}

/// Parses FASTA content from a reader.
pub fn parse_fasta<R: BufRead>(
    reader: R,
    sequence_type: Option<SequenceType>,
) -> FastaResult<Alignment> {
    build_alignment(read_records(reader.lines())?, sequence_type)
}

/// Parses FASTA content from a string.
///
/// Useful for testing or processing in-memory data.
pub fn parse_fasta_str(
    content: &str,
    sequence_type: Option<SequenceType>,
) -> FastaResult<Alignment> {
    build_alignment(read_records(content.lines().map(Ok))?, sequence_type)
}

/// Splits lines into records. Handles multi-line sequences.
fn read_records<I, S>(lines: I) -> FastaResult<Vec<Record>>
where
    I: IntoIterator<Item = std::io::Result<S>>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut current: Option<Record> = None;

    for (index, line_result) in lines.into_iter().enumerate() {
        let line_number = index + 1;
        let line = line_result?;
        let line = line.as_ref().trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }

            // id is everything before the first space
            let id = header.split_whitespace().next().unwrap_or(header);
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }
            current = Some(Record {
                id: id.to_string(),
                data: Vec::new(),
            });
        } else {
            let Some(record) = current.as_mut() else {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            };
            record
                .data
                .extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }
    }

    if let Some(record) = current {
        records.push(record);
    }
    Ok(records)
}

fn build_alignment(
    records: Vec<Record>,
    sequence_type: Option<SequenceType>,
) -> FastaResult<Alignment> {
    let records: Vec<Record> = records.into_iter().filter(|r| !r.data.is_empty()).collect();
    if records.is_empty() {
        return Err(FastaError::EmptyFile);
    }

    let sequence_type = sequence_type
        .unwrap_or_else(|| SequenceType::detect(records.iter().map(|r| r.data.as_slice())));
    log::debug!("{} records, {} alphabet", records.len(), sequence_type);

    let mut alignment = Alignment::new(sequence_type);
    for record in records {
        match SequenceRow::from_gapped(record.id, record.data, sequence_type) {
            Ok(row) => alignment.append(row)?,
            Err(RowError::NoResidues(id)) => log::warn!("skipping '{}': no residues", id),
            Err(e) => return Err(FastaError::InvalidFormat(e.to_string())),
        }
    }
    if alignment.is_empty() {
        return Err(FastaError::EmptyFile);
    }

    // import is not an edit
    alignment.take_events();
    Ok(alignment)
}

/// Writes an alignment as FASTA, `line_width` residues per line (0 for a
/// single line). `consensus` is appended as a last record when given.
pub fn write_fasta<W: Write>(
    writer: &mut W,
    alignment: &Alignment,
    consensus: Option<(&str, &[u8])>,
    line_width: usize,
) -> FastaResult<()> {
    for row in alignment.rows() {
        write_record(writer, row.id(), row.as_bytes(), line_width)?;
    }
    if let Some((id, symbols)) = consensus {
        write_record(writer, id, symbols, line_width)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes an alignment to a file; see [`write_fasta`].
pub fn write_fasta_file<P: AsRef<Path>>(
    path: P,
    alignment: &Alignment,
    consensus: Option<(&str, &[u8])>,
    line_width: usize,
) -> FastaResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_fasta(&mut writer, alignment, consensus, line_width)
}

fn write_record<W: Write>(
    writer: &mut W,
    id: &str,
    data: &[u8],
    line_width: usize,
) -> std::io::Result<()> {
    writeln!(writer, ">{}", id)?;
    if line_width == 0 || data.is_empty() {
        writer.write_all(data)?;
        return writeln!(writer);
    }
    for chunk in data.chunks(line_width) {
        writer.write_all(chunk)?;
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fasta() {
        let content = ">seq1\nAC-T\n>seq2\nTGCA\n";
        let alignment = parse_fasta_str(content, None).unwrap();

        assert_eq!(alignment.row_count(), 2);
        assert_eq!(alignment.row(1).unwrap().id(), "seq1");
        assert_eq!(alignment.row(1).unwrap().as_bytes(), b"AC-T");
        assert_eq!(alignment.row(1).unwrap().ungapped(), b"ACT");
        assert_eq!(alignment.row(2).unwrap().id(), "seq2");
        assert_eq!(alignment.sequence_type(), SequenceType::Nucleotide);
        assert!(!alignment.has_pending_events());
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let content = ">seq1 a description\nAC-T\nTG-A\n\n>seq2\nMKVL\nMKVL\n";
        let alignment = parse_fasta_str(content, Some(SequenceType::AminoAcid)).unwrap();

        assert_eq!(alignment.length(), 8);
        assert_eq!(alignment.row(1).unwrap().as_bytes(), b"AC-TTG-A");
        assert_eq!(alignment.sequence_type(), SequenceType::AminoAcid);
    }

    #[test]
    fn test_unequal_lengths_are_rejected() {
        let content = ">seq1\nACGT\n>seq2\nTG\n";
        let result = parse_fasta_str(content, None);
        assert!(matches!(
            result,
            Err(FastaError::Alignment(EditError::LengthMismatch { expected: 4, found: 2, .. }))
        ));
    }

    #[test]
    fn test_gap_only_records_are_skipped() {
        let content = ">seq1\nAC-T\n>empty\n----\n>seq3\nA--T\n";
        let alignment = parse_fasta_str(content, None).unwrap();
        assert_eq!(alignment.row_count(), 2);
        assert_eq!(alignment.row(-1).unwrap().id(), "seq3");
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_fasta_str("", None), Err(FastaError::EmptyFile)));
        assert!(matches!(parse_fasta_str(">a\n--\n", None), Err(FastaError::EmptyFile)));
    }

    #[test]
    fn test_sequence_without_header() {
        let content = "ACGT\n>seq1\nTGCA\n";
        let result = parse_fasta(content.as_bytes(), None);
        assert!(matches!(result, Err(FastaError::SequenceWithoutHeader(1))));
    }

    #[test]
    fn test_empty_identifier() {
        let result = parse_fasta_str(">\nACGT\n", None);
        assert!(matches!(result, Err(FastaError::InvalidFormat(_))));
    }

    #[test]
    fn test_case_preservation() {
        let alignment = parse_fasta_str(">seq1\nac-t\n", None).unwrap();
        assert_eq!(alignment.row(1).unwrap().as_bytes(), b"ac-t");
    }

    #[test]
    fn test_write_fasta() {
        let alignment = parse_fasta_str(">a\nAC-TG\n>b\nA--TG\n", None).unwrap();
        let mut out = Vec::new();
        write_fasta(&mut out, &alignment, Some(("consensus", b"A..TG")), 3).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ">a\nAC-\nTG\n>b\nA--\nTG\n>consensus\nA..\nTG\n"
        );

        let mut out = Vec::new();
        write_fasta(&mut out, &alignment, None, 0).unwrap();
        let reparsed = parse_fasta(out.as_slice(), None).unwrap();
        assert_eq!(reparsed.rows(), alignment.rows());
    }
}
