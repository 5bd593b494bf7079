use clap::Parser;

mod common;
mod exchange;
mod link;
mod ports;
mod watch;

trait ToolRun {
    fn run(&self) -> anyhow::Result<()>;
}

/// Talk to a Black Pill board over its serial link.
#[derive(Parser, Debug)]
#[command(version, about)]
struct ToolOptions {
    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(clap::Subcommand, Debug)]
enum ToolCommand {
    /// List the serial ports on this machine.
    Ports(ports::PortsOpts),
    /// Connect and sync with the board.
    Ping(exchange::PingOpts),
    /// Send one message to the board.
    Send(exchange::SendOpts),
    /// Receive one message from the board and print it.
    Recv(exchange::RecvOpts),
    /// Report whenever the board's port appears or disappears.
    Watch(watch::WatchOpts),
}

impl ToolRun for ToolCommand {
    fn run(&self) -> anyhow::Result<()> {
        use ToolCommand::*;
        match self {
            Ports(o) => o.run(),
            Ping(o) => o.run(),
            Send(o) => o.run(),
            Recv(o) => o.run(),
            Watch(o) => o.run(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    ToolOptions::parse().command.run()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn options_are_consistent() {
        use clap::CommandFactory;
        ToolOptions::command().debug_assert();
    }

    #[test]
    fn send_takes_text() {
        let args = ["f401tool", "send", "-p", "/dev/ttyACM0", "hello"];
        let opts = ToolOptions::try_parse_from(args).unwrap();
        match opts.command {
            ToolCommand::Send(o) => assert_eq!(o.text, "hello"),
            other => panic!("parsed as {:?}", other),
        }
    }
}
