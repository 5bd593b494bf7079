use std::path::Path;

#[derive(clap::Args, Debug)]
pub struct WatchOpts {
    /// Serial device to watch.
    #[arg(short, long, default_value_t = crate::common::default_serial_port())]
    port: String,
    /// Time between checks, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    interval: u64,
    /// Stop after this many checks. Watches forever if not given.
    #[arg(long)]
    count: Option<u64>,
}

/// Whether the device went away or came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Transition {
    Appeared,
    Disappeared,
}

/// Turns a series of presence checks into transitions.
///
/// The first check always reports, so the starting state is known.
#[derive(Debug, Default)]
pub struct Watchdog {
    present: Option<bool>,
}

impl Watchdog {
    pub fn observe(&mut self, present: bool) -> Option<Transition> {
        if self.present.replace(present) == Some(present) {
            return None;
        }

        Some(if present {
            Transition::Appeared
        } else {
            Transition::Disappeared
        })
    }
}

impl crate::ToolRun for WatchOpts {
    fn run(&self) -> anyhow::Result<()> {
        let path = Path::new(&self.port);
        let interval = std::time::Duration::from_millis(self.interval);
        let mut dog = Watchdog::default();

        let mut checks = 0;
        while self.count.map_or(true, |max| checks < max) {
            if checks > 0 {
                std::thread::sleep(interval);
            }
            checks += 1;

            match dog.observe(path.exists()) {
                Some(Transition::Appeared) => println!("{}: connected", self.port),
                Some(Transition::Disappeared) => println!("{}: disconnected", self.port),
                None => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reports_changes_only() {
        let mut dog = Watchdog::default();
        let seen: Vec<_> = [false, false, true, true, true, false, true]
            .into_iter()
            .map(|p| dog.observe(p))
            .collect();

        use Transition::*;
        assert_eq!(
            seen,
            [
                Some(Disappeared),
                None,
                Some(Appeared),
                None,
                None,
                Some(Disappeared),
                Some(Appeared),
            ]
        );
    }

    #[test]
    fn first_check_reports() {
        assert_eq!(
            Watchdog::default().observe(true),
            Some(Transition::Appeared)
        );
    }
}
