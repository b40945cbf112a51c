//! The V2 strategy artifact.
//!
//! File format, all fields little-endian:
//!
//! ```text
//! Header (24 bytes):
//!   magic:      u32 = 0x544F5353 ("TOSS")
//!   version:    u32 = 2
//!   iterations: i64
//!   num_nodes:  u64
//!
//! Node (75 bytes each):
//!   player        u8
//!   street        u8    7-value wire form (flop betting = 4)
//!   hole_bucket   u16
//!   board_bucket  u16
//!   pot_bucket    u8
//!   hist_bucket   u8
//!   flags         u8    bit7 bb_discarded, bit6 sb_discarded, bits 5..0 legal mask
//!   regret        [f64; 4]
//!   strat_sum     [f64; 4]
//!   reserved      u16 = 0
//! ```
//!
//! Node order is unspecified. Writes land in a sibling `.tmp` file that is
//! renamed over the target after a successful flush, so a crash mid-write
//! never leaves a file with a valid header and a truncated body.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::abstraction::{InfoKey, Street, LEGAL_MASK_BITS};
use crate::cfr::{Node, Table};
use crate::error::SolverError;

/// Artifact magic, "TOSS" read as a little-endian u32.
pub const MAGIC: u32 = 0x544F_5353;
/// Artifact format version.
pub const VERSION: u32 = 2;

/// Header length in bytes.
pub const HEADER_BYTES: usize = 24;
/// Per-node record length in bytes.
pub const NODE_BYTES: usize = 75;

const FLAG_BB_DISCARDED: u8 = 0x80;
const FLAG_SB_DISCARDED: u8 = 0x40;

/// Write the table to `path` as a V2 artifact.
///
/// # Errors
///
/// Returns [`SolverError::Io`] when the temporary file cannot be created,
/// written, flushed, or renamed into place.
pub fn save(path: &Path, table: &Table, iterations: i64) -> Result<(), SolverError> {
    let tmp = tmp_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        writer.write_all(&MAGIC.to_le_bytes())?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&iterations.to_le_bytes())?;
        writer.write_all(&(table.len() as u64).to_le_bytes())?;
        for (key, node) in table.iter() {
            write_node(&mut writer, key, node)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a V2 artifact back into a table.
///
/// # Errors
///
/// Returns [`SolverError::BadMagic`] / [`SolverError::VersionMismatch`] for
/// foreign files, [`SolverError::TruncatedArtifact`] when the body is
/// shorter than the header claims, and [`SolverError::InvalidStreet`] for
/// street codes outside the wire enumeration.
pub fn load(path: &Path) -> Result<(Table, i64), SolverError> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut header = [0u8; HEADER_BYTES];
    reader
        .read_exact(&mut header)
        .map_err(|e| truncated("header", &e))?;

    let magic = u32::from_le_bytes(header[0..4].try_into().expect("4-byte slice"));
    if magic != MAGIC {
        return Err(SolverError::BadMagic(magic));
    }
    let version = u32::from_le_bytes(header[4..8].try_into().expect("4-byte slice"));
    if version != VERSION {
        return Err(SolverError::VersionMismatch {
            expected: VERSION,
            actual: version,
        });
    }
    let iterations = i64::from_le_bytes(header[8..16].try_into().expect("8-byte slice"));
    let num_nodes = u64::from_le_bytes(header[16..24].try_into().expect("8-byte slice"));

    let mut table = Table::new();
    for i in 0..num_nodes {
        let (key, node) = read_node(&mut reader).map_err(|e| match e {
            SolverError::Io(io) => truncated(&format!("node {i} of {num_nodes}"), &io),
            other => other,
        })?;
        table.insert(key, node);
    }
    Ok((table, iterations))
}

fn truncated(context: &str, err: &std::io::Error) -> SolverError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        SolverError::TruncatedArtifact(context.to_string())
    } else {
        SolverError::Io(std::io::Error::new(err.kind(), err.to_string()))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_node<W: Write>(writer: &mut W, key: &InfoKey, node: &Node) -> Result<(), SolverError> {
    writer.write_all(&[key.player, key.street])?;
    writer.write_all(&key.hole_bucket.to_le_bytes())?;
    writer.write_all(&key.board_bucket.to_le_bytes())?;
    writer.write_all(&[key.pot_bucket, key.hist_bucket])?;

    let mut flags = key.legal_mask & LEGAL_MASK_BITS;
    if key.bb_discarded {
        flags |= FLAG_BB_DISCARDED;
    }
    if key.sb_discarded {
        flags |= FLAG_SB_DISCARDED;
    }
    writer.write_all(&[flags])?;

    for value in &node.regret {
        writer.write_all(&value.to_le_bytes())?;
    }
    for value in &node.strat_sum {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.write_all(&0u16.to_le_bytes())?;
    Ok(())
}

fn read_node<R: Read>(reader: &mut R) -> Result<(InfoKey, Node), SolverError> {
    let mut buf = [0u8; NODE_BYTES];
    reader.read_exact(&mut buf)?;

    let street = buf[1];
    if Street::from_wire_code(street).is_none() {
        return Err(SolverError::InvalidStreet(street));
    }

    let flags = buf[8];
    let key = InfoKey {
        player: buf[0],
        street,
        hole_bucket: u16::from_le_bytes([buf[2], buf[3]]),
        board_bucket: u16::from_le_bytes([buf[4], buf[5]]),
        pot_bucket: buf[6],
        hist_bucket: buf[7],
        bb_discarded: flags & FLAG_BB_DISCARDED != 0,
        sb_discarded: flags & FLAG_SB_DISCARDED != 0,
        legal_mask: flags & LEGAL_MASK_BITS,
    };

    let mut node = Node::default();
    for (i, value) in node.regret.iter_mut().enumerate() {
        let at = 9 + i * 8;
        *value = f64::from_le_bytes(buf[at..at + 8].try_into().expect("8-byte slice"));
    }
    for (i, value) in node.strat_sum.iter_mut().enumerate() {
        let at = 41 + i * 8;
        *value = f64::from_le_bytes(buf[at..at + 8].try_into().expect("8-byte slice"));
    }
    Ok((key, node))
}
