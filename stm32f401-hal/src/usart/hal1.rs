use core::convert::Infallible;

use embedded_hal_nb::serial as hal1nb;
use embedded_io as hal1;

use crate::block;

use super::{Error, Rx, Tx};

impl hal1::Error for Error {
    fn kind(&self) -> hal1::ErrorKind {
        match self {
            Error::BaudOutOfRange => hal1::ErrorKind::InvalidInput,
            Error::Parity | Error::Framing | Error::Noise => hal1::ErrorKind::InvalidData,
            Error::Overrun => hal1::ErrorKind::Other,
        }
    }
}

impl hal1nb::Error for Error {
    fn kind(&self) -> hal1nb::ErrorKind {
        match self {
            Error::Overrun => hal1nb::ErrorKind::Overrun,
            Error::Framing => hal1nb::ErrorKind::FrameFormat,
            Error::Parity => hal1nb::ErrorKind::Parity,
            Error::Noise => hal1nb::ErrorKind::Noise,
            Error::BaudOutOfRange => hal1nb::ErrorKind::Other,
        }
    }
}

impl hal1::ErrorType for Rx<'_> {
    type Error = Error;
}

impl hal1::ErrorType for Tx<'_> {
    type Error = Infallible;
}

impl hal1nb::ErrorType for Rx<'_> {
    type Error = Error;
}

impl hal1nb::ErrorType for Tx<'_> {
    type Error = Infallible;
}

impl hal1::Read for Rx<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        block::block!(Rx::read_some(self, buf))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), hal1::ReadExactError<Self::Error>> {
        Rx::read_exact(self, buf).map_err(hal1::ReadExactError::Other)
    }
}

impl hal1nb::Read<u8> for Rx<'_> {
    fn read(&mut self) -> block::Result<u8, Self::Error> {
        Rx::read_one(self)
    }
}

impl hal1::ReadReady for Rx<'_> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!Rx::is_empty(self))
    }
}

impl hal1::Write for Tx<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        match buf.first() {
            Some(b) => {
                block::block!(Tx::write_one(self, *b))?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        block::block!(Tx::flush(self))
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        Tx::write_all(self, buf)
    }

    fn write_fmt(
        &mut self,
        fmt: core::fmt::Arguments<'_>,
    ) -> Result<(), hal1::WriteFmtError<Self::Error>> {
        match core::fmt::write(self, fmt) {
            Ok(()) => Ok(()),
            Err(_) => Err(hal1::WriteFmtError::FmtError),
        }
    }
}

impl hal1nb::Write for Tx<'_> {
    fn write(&mut self, word: u8) -> block::Result<(), Self::Error> {
        Tx::write_one(self, word)
    }

    fn flush(&mut self) -> block::Result<(), Self::Error> {
        Tx::flush(self)
    }
}

impl hal1::WriteReady for Tx<'_> {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(Tx::is_empty(self))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;
    use crate::gpio::Pin;
    use crate::pac;
    use crate::pac::usart::sr;
    use crate::usart::Usart;

    fn pair() -> (Tx<'static>, Rx<'static>, &'static pac::usart::RegisterBlock) {
        let regs = sim::leak(pac::usart::RegisterBlock::new());
        let port = sim::leak(pac::gpio::RegisterBlock::new());
        let usart = Usart::from_registers(regs);
        (
            usart.tx(Pin::from_registers(port, 'A', 9).unwrap()),
            usart.rx(Pin::from_registers(port, 'A', 10).unwrap()),
            regs,
        )
    }

    #[test]
    fn write_sends_one_byte() {
        let (mut tx, _, regs) = pair();
        regs.sr.write(sr::TXE.mask());

        assert_eq!(hal1::Write::write(&mut tx, b"abc"), Ok(1));
        assert_eq!(regs.dr.read(), b'a' as u32);
        assert_eq!(hal1::Write::write(&mut tx, b""), Ok(0));
        assert_eq!(regs.dr.read(), b'a' as u32);

        hal1::Write::write_fmt(&mut tx, format_args!("n={}", 7)).unwrap();
        assert_eq!(regs.dr.read(), b'7' as u32);
    }

    #[test]
    fn read_empty_buffer_does_not_wait() {
        let (_, mut rx, regs) = pair();
        regs.sr.write(0);

        assert_eq!(hal1::Read::read(&mut rx, &mut []), Ok(0));
    }

    #[test]
    fn read_takes_what_is_there() {
        let (_, mut rx, regs) = pair();
        regs.sr.write(sr::RXNE.mask());
        regs.dr.write(b'q' as u32);
        // the receiver drains after one byte
        sim::attach(move || regs.sr.write(0));

        let mut buf = [0; 3];
        assert_eq!(hal1::Read::read(&mut rx, &mut buf), Ok(1));
        assert_eq!(buf[0], b'q');
    }

    #[test]
    fn read_exact_wraps_errors() {
        let (_, mut rx, regs) = pair();
        regs.sr.write(sr::RXNE.mask() | sr::ORE.mask());

        let got = hal1::Read::read_exact(&mut rx, &mut [0; 2]);
        assert!(matches!(
            got,
            Err(hal1::ReadExactError::Other(Error::Overrun))
        ));
    }

    #[test]
    fn ready_follows_status() {
        let (mut tx, mut rx, regs) = pair();

        regs.sr.write(0);
        assert_eq!(hal1::ReadReady::read_ready(&mut rx), Ok(false));
        assert_eq!(hal1::WriteReady::write_ready(&mut tx), Ok(false));

        regs.sr.write(sr::RXNE.mask());
        assert_eq!(hal1::ReadReady::read_ready(&mut rx), Ok(true));
        assert_eq!(hal1::WriteReady::write_ready(&mut tx), Ok(false));

        regs.sr.write(sr::TXE.mask());
        assert_eq!(hal1::ReadReady::read_ready(&mut rx), Ok(false));
        assert_eq!(hal1::WriteReady::write_ready(&mut tx), Ok(true));
    }

    #[test]
    fn nb_words() {
        let (mut tx, mut rx, regs) = pair();

        regs.sr.write(0);
        assert_eq!(hal1nb::Read::read(&mut rx), Err(block::Error::WouldBlock));
        assert_eq!(
            hal1nb::Write::write(&mut tx, b'z'),
            Err(block::Error::WouldBlock)
        );
        assert_eq!(hal1nb::Write::flush(&mut tx), Err(block::Error::WouldBlock));

        regs.sr.write(sr::TXE.mask() | sr::TC.mask() | sr::RXNE.mask());
        regs.dr.write(b'r' as u32);
        assert_eq!(hal1nb::Read::read(&mut rx), Ok(b'r'));
        assert_eq!(hal1nb::Write::write(&mut tx, b'z'), Ok(()));
        assert_eq!(regs.dr.read(), b'z' as u32);
        assert_eq!(hal1nb::Write::flush(&mut tx), Ok(()));
    }

    #[test]
    fn error_kinds() {
        assert_eq!(
            hal1::Error::kind(&Error::Framing),
            hal1::ErrorKind::InvalidData
        );
        assert_eq!(
            hal1::Error::kind(&Error::BaudOutOfRange),
            hal1::ErrorKind::InvalidInput
        );
        assert_eq!(
            hal1nb::Error::kind(&Error::Overrun),
            hal1nb::ErrorKind::Overrun
        );
        assert_eq!(
            hal1nb::Error::kind(&Error::Noise),
            hal1nb::ErrorKind::Noise
        );
    }
}
