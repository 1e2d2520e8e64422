//! Section compression and decompression handling.
//!
//! Every section is compressed on its own; nothing is concatenated before compression.

use std::io::{self, Write};

use flate2::{write::DeflateEncoder, Compression, Decompress, FlushDecompress, Status};
use tracing::{instrument, trace};

use crate::error::{Error, Result};

/// Identifies how a section payload was framed
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Framing {
    /// A bare deflate stream, which is what [`deflate`] produces
    #[default]
    Deflate,

    /// A deflate stream behind a two byte zlib header and adler32 trailer
    Zlib,
}

impl Framing {
    /// Guess the framing of `data` from its first two bytes
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [cmf, flg, ..]
                if cmf & 0x0F == 8
                    && cmf >> 4 <= 7
                    && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0 =>
            {
                Framing::Zlib
            }
            _ => Framing::Deflate,
        }
    }
}

/// Inflate a section payload.
///
/// Zlib framed payloads are accepted as well; if a payload merely looks like zlib but
/// does not decode as such, it is retried as a bare deflate stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    inflate_with_limit(data, usize::MAX)
}

/// Inflate a section payload, failing with [`Error::CorruptStream`] once the output
/// grows past `limit` bytes.
#[instrument(skip(data), fields(size = data.len()), err)]
pub fn inflate_with_limit(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    match Framing::detect(data) {
        Framing::Zlib => inflate_framed(data, Framing::Zlib, limit).or_else(|_| {
            trace!("zlib header did not hold up, retrying as bare deflate");
            inflate_framed(data, Framing::Deflate, limit)
        }),
        Framing::Deflate => inflate_framed(data, Framing::Deflate, limit),
    }
}

fn inflate_framed(data: &[u8], framing: Framing, limit: usize) -> Result<Vec<u8>> {
    let mut decompress = Decompress::new(framing == Framing::Zlib);
    let ceiling = limit.saturating_add(1);
    let mut output = Vec::with_capacity(data.len().saturating_mul(2).max(64).min(ceiling));

    loop {
        if output.len() > limit {
            return Err(Error::CorruptStream(io::Error::new(
                io::ErrorKind::InvalidData,
                "deflate stream inflates past its size limit",
            )));
        }
        if output.len() == output.capacity() {
            output.reserve(output.capacity().min(ceiling - output.len()));
        }

        let consumed = decompress.total_in();
        let produced = decompress.total_out();
        let input = data.get(consumed as usize..).unwrap_or_default();

        let status = decompress
            .decompress_vec(input, &mut output, FlushDecompress::Finish)
            .map_err(|e| Error::CorruptStream(e.into()))?;

        match status {
            Status::StreamEnd if output.len() <= limit => return Ok(output),
            Status::StreamEnd => continue,
            Status::Ok | Status::BufError => {
                let stalled =
                    decompress.total_in() == consumed && decompress.total_out() == produced;
                if stalled {
                    return Err(Error::CorruptStream(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "deflate stream ended early",
                    )));
                }
            }
        }
    }
}

/// Compress a section payload into a bare deflate stream
#[instrument(skip(data), fields(size = data.len()), err)]
pub fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
