#[derive(clap::Args, Debug)]
pub struct PortsOpts {
    /// Also list ports that are not USB serial adapters.
    #[arg(short, long)]
    all: bool,
}

impl crate::ToolRun for PortsOpts {
    fn run(&self) -> anyhow::Result<()> {
        let infos = serialport::available_ports()?;
        let mut found = false;

        for info in infos {
            match info.port_type {
                serialport::SerialPortType::UsbPort(usb) => {
                    print!("{} usb {:04x}:{:04x}", info.port_name, usb.vid, usb.pid);
                    if let Some(product) = usb.product {
                        print!(" {}", product);
                    }
                    println!();
                }
                other if self.all => println!("{} {:?}", info.port_name, other),
                _ => continue,
            }
            found = true;
        }

        if !found {
            eprintln!("No serial ports found.");
        }
        Ok(())
    }
}
