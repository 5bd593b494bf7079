//! Device side of the host link.
//!
//! Every exchange starts with a sync: the host sends [SYNC] bytes until
//! it reads one back. After the sync a message follows, in whichever
//! direction the exchange goes, ended by a single [END] byte.
//!
//! Because the host may send several [SYNC] bytes before the device
//! answers, leading [SYNC] bytes are skipped on receive. A message
//! therefore cannot start with [SYNC], and cannot contain [END].

use embedded_io::{Read, Write};

/// Sync byte, sent by the host and echoed by the device.
pub const SYNC: u8 = 0xff;

/// Message terminator.
pub const END: u8 = 0x00;

/// A link error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The underlying port failed.
    Io(E),
    /// The port reported end of stream mid-exchange.
    Closed,
    /// An incoming message did not fit the buffer.
    Overflow,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Link Error {:?}", self)
    }
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::Io(value)
    }
}

fn read_byte<P: Read>(port: &mut P) -> Result<u8, Error<P::Error>> {
    let mut byte = [0];
    match port.read(&mut byte)? {
        0 => Err(Error::Closed),
        _ => Ok(byte[0]),
    }
}

/// Wait for the host's sync and answer it.
///
/// Bytes other than [SYNC] are line noise and dropped.
pub fn sync<P: Read + Write>(port: &mut P) -> Result<(), Error<P::Error>> {
    while read_byte(port)? != SYNC {}
    port.write_all(&[SYNC])?;
    port.flush()?;
    Ok(())
}

/// Sync, then send `data` as one message.
///
/// `data` is cut at its first [END], if any.
pub fn send<P: Read + Write>(port: &mut P, data: &[u8]) -> Result<(), Error<P::Error>> {
    let len = data.iter().position(|&b| b == END).unwrap_or(data.len());

    sync(port)?;
    port.write_all(&data[..len])?;
    port.write_all(&[END])?;
    port.flush()?;
    Ok(())
}

/// Sync, then receive one message into `buf`, returning its length.
///
/// On [Error::Overflow] the rest of the message is still in the port.
pub fn recv<P: Read + Write>(port: &mut P, buf: &mut [u8]) -> Result<usize, Error<P::Error>> {
    sync(port)?;

    let mut byte = read_byte(port)?;
    while byte == SYNC {
        byte = read_byte(port)?;
    }

    let mut len = 0;
    while byte != END {
        *buf.get_mut(len).ok_or(Error::Overflow)? = byte;
        len += 1;
        byte = read_byte(port)?;
    }

    Ok(len)
}
