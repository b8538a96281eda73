use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::model::Booking;

/// Contract for the booking sheet: read the whole table, append one record.
/// The engine re-reads per interaction and never edits in place; appends are
/// observed all-or-nothing.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn read_all(&self) -> io::Result<Vec<Booking>>;
    async fn append(&self, booking: &Booking) -> io::Result<()>;
}

/// Encode a single booking to `[len][bincode][crc32]` format.
fn encode_record(buf: &mut Vec<u8>, booking: &Booking) -> io::Result<()> {
    let payload =
        bincode::serialize(booking).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let len = payload.len() as u32;
    let crc = crc32fast::hash(&payload);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(&payload);
    buf.extend_from_slice(&crc.to_le_bytes());
    Ok(())
}

/// Append-only booking sheet file.
///
/// Format per record: `[u32: len][bincode: Booking][u32: crc32]`
/// - `len` is the byte length of the bincode payload (not including the CRC).
/// - A truncated or corrupt trailing record (crash mid-append) is discarded
///   on read via the length prefix + CRC check.
pub struct SheetLog {
    path: PathBuf,
}

impl SheetLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every valid record from disk. A missing file is an empty sheet;
    /// replay stops at the first truncated or CRC-mismatched record.
    fn read_records(path: &Path) -> io::Result<Vec<Booking>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut reader = BufReader::new(file);
        let mut bookings = Vec::new();

        loop {
            let mut len_buf = [0u8; 4];
            match reader.read_exact(&mut len_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
            let len = u32::from_le_bytes(len_buf) as usize;

            let mut payload = vec![0u8; len];
            match reader.read_exact(&mut payload) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break, // truncated
                Err(e) => return Err(e),
            }

            let mut crc_buf = [0u8; 4];
            match reader.read_exact(&mut crc_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break, // truncated
                Err(e) => return Err(e),
            }
            let stored_crc = u32::from_le_bytes(crc_buf);
            if stored_crc != crc32fast::hash(&payload) {
                // Corrupt record — stop reading
                break;
            }

            match bincode::deserialize::<Booking>(&payload) {
                Ok(booking) => bookings.push(booking),
                Err(_) => break, // corrupt payload
            }
        }

        Ok(bookings)
    }

    /// Append one record with a single write and fsync.
    fn append_record(path: &Path, booking: &Booking) -> io::Result<()> {
        let mut buf = Vec::new();
        encode_record(&mut buf, booking)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(&buf)?;
        file.sync_all()
    }
}

#[async_trait]
impl BookingStore for SheetLog {
    async fn read_all(&self) -> io::Result<Vec<Booking>> {
        Self::read_records(&self.path)
    }

    async fn append(&self, booking: &Booking) -> io::Result<()> {
        Self::append_record(&self.path, booking)
    }
}
