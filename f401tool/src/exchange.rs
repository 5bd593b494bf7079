use std::io::Write;

use anyhow::Context;

#[derive(clap::Args, Debug)]
pub struct PingOpts {
    #[command(flatten)]
    port: crate::common::SerialPortArgs,
    #[command(flatten)]
    link: crate::link::LinkArgs,
}

impl crate::ToolRun for PingOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut link = self.link.wrap(self.port.connect()?);
        let start = std::time::Instant::now();
        let sent = link.sync()?;
        eprintln!(
            "Board answered after {} sync bytes in {:?}.",
            sent,
            start.elapsed()
        );
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
pub struct SendOpts {
    #[command(flatten)]
    port: crate::common::SerialPortArgs,
    #[command(flatten)]
    link: crate::link::LinkArgs,

    /// Text to send. A NUL terminator is added.
    pub text: String,
}

impl crate::ToolRun for SendOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut link = self.link.wrap(self.port.connect()?);
        link.send(self.text.as_bytes())?;
        eprintln!("Sent {} bytes.", self.text.len());
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
pub struct RecvOpts {
    #[command(flatten)]
    port: crate::common::SerialPortArgs,
    #[command(flatten)]
    link: crate::link::LinkArgs,

    /// Write the message exactly as received, without a newline.
    #[arg(long)]
    raw: bool,
}

impl crate::ToolRun for RecvOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut link = self.link.wrap(self.port.connect()?);
        let data = link.recv()?;

        let mut stdout = std::io::stdout().lock();
        if self.raw {
            stdout.write_all(&data)?;
        } else {
            writeln!(stdout, "{}", String::from_utf8_lossy(&data))?;
        }
        stdout.flush().context("could not write message")?;
        Ok(())
    }
}
