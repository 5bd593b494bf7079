//! Blocking and non-blocking helpers.
//!
//! Non-blocking operations return [Result], with [Error::WouldBlock] when
//! the hardware is not ready. [block!] turns those into blocking calls.
//!
//! Driver-internal waits go through [wait_while], which spins on a status
//! condition forever. Under `cfg(test)` each poll also steps the simulated
//! hardware installed with `sim::attach`, and gives up with a panic after
//! `sim::CEILING` polls, so a test can model a peripheral that never
//! answers.

pub use nb::{block, Error, Result};

/// Spin until `busy` returns false.
#[inline(always)]
pub(crate) fn wait_while(mut busy: impl FnMut() -> bool) {
    #[cfg(test)]
    let mut polls = 0;

    while busy() {
        #[cfg(test)]
        {
            polls += 1;
            sim::step(polls);
        }

        #[cfg(not(test))]
        cortex_m::asm::nop();
    }
}

/// Wait for outstanding memory accesses, used after clock switches.
#[inline(always)]
pub(crate) fn barrier() {
    #[cfg(not(test))]
    cortex_m::asm::dsb();
}

#[cfg(test)]
pub(crate) mod sim {
    //! A stand-in for the silicon side of a register block.

    use std::boxed::Box;
    use std::cell::{Cell, RefCell};

    /// Polls of one wait before it counts as hung.
    pub(crate) const CEILING: u32 = 100_000;

    type Hardware = Box<dyn FnMut()>;

    std::thread_local! {
        static HARDWARE: RefCell<Option<Hardware>> = RefCell::new(None);
        static POLLS: Cell<u32> = const { Cell::new(0) };
    }

    /// Run `hardware` on every poll of every wait on this thread.
    pub(crate) fn attach(hardware: impl FnMut() + 'static) {
        HARDWARE.with(|h| *h.borrow_mut() = Some(Box::new(hardware)));
    }

    /// Total polls on this thread, across all waits.
    pub(crate) fn polls() -> u32 {
        POLLS.with(|p| p.get())
    }

    /// Leak a fresh register block, so handles and hardware closures can
    /// share it.
    pub(crate) fn leak<T>(block: T) -> &'static T {
        Box::leak(Box::new(block))
    }

    pub(super) fn step(polls: u32) {
        if polls > CEILING {
            panic!("peripheral did not respond after {} polls", CEILING);
        }

        POLLS.with(|p| p.set(p.get() + 1));
        react();
    }

    /// Run the hardware once for an access with side effects, such as a
    /// data register read. Not counted as a poll.
    pub(crate) fn react() {
        HARDWARE.with(|h| {
            if let Some(hardware) = h.borrow_mut().as_mut() {
                hardware();
            }
        });
    }
}
