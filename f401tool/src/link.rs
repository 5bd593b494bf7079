//! Host side of the board link.
//!
//! The host opens every exchange by sending [SYNC] until the board echoes
//! one back. A message then follows in one direction, ended by [END].

use std::io::{ErrorKind, Read, Write};

use anyhow::Context;

/// Sync byte, echoed by the board once it is listening.
pub const SYNC: u8 = 0xff;

/// Message terminator.
pub const END: u8 = 0x00;

/// How many sync bytes to send before giving up.
pub const SYNC_LIMIT: usize = 50;

#[derive(clap::Args, Debug, Clone)]
pub struct LinkArgs {
    /// Sync bytes to send before giving up on the board.
    #[arg(long, default_value_t = SYNC_LIMIT)]
    sync_limit: usize,
}

impl LinkArgs {
    pub fn wrap<P: Read + Write>(&self, port: P) -> Link<P> {
        Link::new(port).with_sync_limit(self.sync_limit)
    }
}

#[derive(Debug)]
pub struct Link<P> {
    port: P,
    sync_limit: usize,
}

// a timed out read is an unanswered byte, not a failure
fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

impl<P> Link<P>
where
    P: Read + Write,
{
    pub fn new(port: P) -> Self {
        Self {
            port,
            sync_limit: SYNC_LIMIT,
        }
    }

    pub fn with_sync_limit(mut self, sync_limit: usize) -> Self {
        self.sync_limit = sync_limit;
        self
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    /// Read one byte, or None if the port timed out.
    fn read_byte(&mut self) -> anyhow::Result<Option<u8>> {
        let mut byte = [0];
        match self.port.read(&mut byte) {
            Ok(0) => anyhow::bail!("port closed"),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if is_timeout(&e) => Ok(None),
            Err(e) => Err(e).context("read failed"),
        }
    }

    /// Send sync bytes until the board answers, returning how many it
    /// took.
    pub fn sync(&mut self) -> anyhow::Result<usize> {
        for sent in 1..=self.sync_limit {
            self.port.write_all(&[SYNC]).context("sync write failed")?;
            self.port.flush().context("sync flush failed")?;

            if self.read_byte()? == Some(SYNC) {
                return Ok(sent);
            }
        }

        anyhow::bail!("no sync after {} attempts", self.sync_limit)
    }

    /// Sync, then send `data` followed by [END].
    pub fn send(&mut self, data: &[u8]) -> anyhow::Result<()> {
        anyhow::ensure!(
            !data.contains(&END),
            "message contains a NUL byte, which would end it early"
        );
        anyhow::ensure!(
            data.first() != Some(&SYNC),
            "message starts with 0xFF, which the board skips as sync"
        );

        self.sync()?;
        self.port.write_all(data).context("message write failed")?;
        self.port.write_all(&[END]).context("message write failed")?;
        self.port.flush().context("message flush failed")?;
        Ok(())
    }

    /// Sync, then read a message up to [END], which is not included.
    pub fn recv(&mut self) -> anyhow::Result<Vec<u8>> {
        self.sync()?;

        let mut data = Vec::new();
        loop {
            match self.read_byte()? {
                None => anyhow::bail!("timed out after {} message bytes", data.len()),
                Some(END) => return Ok(data),
                // stray sync echoes can arrive before the message
                Some(SYNC) if data.is_empty() => continue,
                Some(b) => data.push(b),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    use std::collections::VecDeque;

    /// A port that plays back a fixed script of replies.
    ///
    /// `None` in the script is a read that times out. Reads past the end
    /// of the script time out too.
    #[derive(Debug, Default)]
    pub struct Scripted {
        pub replies: VecDeque<Option<u8>>,
        pub written: Vec<u8>,
    }

    impl Scripted {
        pub fn new(replies: impl IntoIterator<Item = Option<u8>>) -> Self {
            Self {
                replies: replies.into_iter().collect(),
                written: Vec::new(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.replies.pop_front().flatten() {
                Some(b) => {
                    buf[0] = b;
                    Ok(1)
                }
                None => Err(ErrorKind::TimedOut.into()),
            }
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn bytes(data: &[u8]) -> impl Iterator<Item = Option<u8>> + '_ {
        data.iter().copied().map(Some)
    }

    #[test]
    fn sync_first_try() {
        let mut link = Link::new(Scripted::new([Some(SYNC)]));
        assert_eq!(link.sync().unwrap(), 1);
        assert_eq!(link.into_inner().written, [SYNC]);
    }

    #[test]
    fn sync_through_noise() {
        let mut link = Link::new(Scripted::new([None, Some(b'x'), None, Some(SYNC)]));
        assert_eq!(link.sync().unwrap(), 4);
        assert_eq!(link.into_inner().written, [SYNC; 4]);
    }

    #[test]
    fn sync_gives_up() {
        let mut link = Link::new(Scripted::default()).with_sync_limit(7);
        let err = link.sync().unwrap_err();
        assert_eq!(err.to_string(), "no sync after 7 attempts");
        assert_eq!(link.into_inner().written.len(), 7);
    }

    #[test]
    fn send_frames_message() {
        let mut link = Link::new(Scripted::new([None, Some(SYNC)]));
        link.send(b"hi").unwrap();
        assert_eq!(link.into_inner().written, [SYNC, SYNC, b'h', b'i', END]);
    }

    #[test]
    fn send_rejects_unframeable() {
        let mut link = Link::new(Scripted::new([Some(SYNC)]));
        assert!(link.send(b"a\0b").is_err());
        assert!(link.send(&[SYNC, b'a']).is_err());
        // nothing went out, not even a sync
        assert!(link.into_inner().written.is_empty());
    }

    #[test]
    fn recv_up_to_end() {
        let script = Scripted::new(bytes(&[SYNC, SYNC, SYNC, b'o', b'k', END, b'z']));
        let mut link = Link::new(script);
        assert_eq!(link.recv().unwrap(), b"ok");

        let port = link.into_inner();
        assert_eq!(port.written, [SYNC]);
        assert_eq!(port.replies, [Some(b'z')]);
    }

    #[test]
    fn recv_keeps_inner_sync_bytes() {
        let script = Scripted::new(bytes(&[SYNC, b'a', SYNC, END]));
        assert_eq!(Link::new(script).recv().unwrap(), [b'a', SYNC]);
    }

    #[test]
    fn recv_empty_message() {
        let script = Scripted::new(bytes(&[SYNC, END]));
        assert!(Link::new(script).recv().unwrap().is_empty());
    }

    #[test]
    fn recv_times_out_mid_message() {
        let script = Scripted::new(bytes(&[SYNC, b'a', b'b']));
        let err = Link::new(script).recv().unwrap_err();
        assert_eq!(err.to_string(), "timed out after 2 message bytes");
    }

    #[test]
    fn closed_port_is_an_error() {
        struct Closed;

        impl Read for Closed {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Ok(0)
            }
        }

        impl Write for Closed {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        assert_eq!(
            Link::new(Closed).sync().unwrap_err().to_string(),
            "port closed"
        );
    }
}
