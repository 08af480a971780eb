use std::sync::Arc;
use std::time::Duration;

use super::{list_devices, Device, DllDriver, Driver};
use crate::transport::Transport;
use crate::Error;

/// Exposes an NI-845x adapter through the session lifecycle.
///
/// Only the mandatory operations are available: bus traffic goes through
/// [`Ni845xTransport::device`] and the configuration guards it hands out.
pub struct Ni845xTransport {
    driver: Arc<dyn Driver>,
    device: Option<Device>,
    timeout: Option<Duration>,
}

impl Ni845xTransport {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Ni845xTransport {
            driver,
            device: None,
            timeout: None,
        }
    }

    /// Use the vendor library.
    pub fn load() -> crate::Result<Self> {
        Ok(Self::new(DllDriver::load()?))
    }

    pub fn device(&self) -> crate::Result<&Device> {
        self.device.as_ref().ok_or(Error::NotOpen)
    }
}

impl Transport for Ni845xTransport {
    /// An empty resource name opens the first adapter found.
    fn open(&mut self, resource: &str) -> crate::Result<()> {
        if let Some(device) = &self.device {
            return Err(Error::already_open(device.name()));
        }
        let device = if resource.trim().is_empty() {
            Device::open_first(self.driver.clone())?
        } else {
            Device::open(self.driver.clone(), resource.trim())?
        };
        if let Some(timeout) = self.timeout {
            device.set_timeout(timeout)?;
        }
        self.device = Some(device);
        Ok(())
    }

    fn close(&mut self) -> crate::Result<()> {
        self.device.take().ok_or(Error::NotOpen)?.close()
    }

    fn list_resources(&mut self) -> crate::Result<Vec<String>> {
        list_devices(self.driver.clone())
    }

    fn set_timeout(&mut self, timeout: Duration) -> crate::Result<()> {
        if let Some(device) = &self.device {
            device.set_timeout(timeout)?;
        }
        self.timeout = Some(timeout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockDriver;
    use super::*;
    use crate::session::Session;

    #[test]
    fn session_lifecycle() {
        let mock = MockDriver::new(&["USB0::0x3923::0x7514::01A2B3C4::RAW"]);
        let mut transport = Ni845xTransport::new(mock.clone());
        assert_eq!(
            transport.list_resources().unwrap(),
            vec!["USB0::0x3923::0x7514::01A2B3C4::RAW".to_string()]
        );
        transport.open("").unwrap();
        assert_eq!(mock.open_devices(), 1);
        assert_eq!(transport.device().unwrap().name(), "USB0::0x3923::0x7514::01A2B3C4::RAW");
        assert!(matches!(transport.open(""), Err(Error::AlreadyOpen { .. })));
        transport.close().unwrap();
        assert_eq!(mock.open_devices(), 0);
        assert!(matches!(transport.close(), Err(Error::NotOpen)));
        assert!(matches!(transport.device(), Err(Error::NotOpen)));
    }

    #[test]
    fn timeout_is_applied_on_open() {
        let mock = MockDriver::new(&["dev0"]);
        let mut transport = Ni845xTransport::new(mock.clone());
        transport.set_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(mock.timeout_ms(), None);
        transport.open("dev0").unwrap();
        assert_eq!(mock.timeout_ms(), Some(5000));
    }

    #[test]
    fn text_io_is_not_supported() {
        let mock = MockDriver::new(&["dev0"]);
        let mut transport = Ni845xTransport::new(mock.clone());
        transport.open("dev0").unwrap();
        assert!(matches!(transport.write("*RST"), Err(Error::NotSupported { .. })));
        assert!(matches!(transport.query("*IDN?"), Err(Error::NotSupported { .. })));
        assert!(matches!(transport.read_raw(16), Err(Error::NotSupported { .. })));
    }

    #[test]
    fn session_without_identification() {
        let mock = MockDriver::new(&["dev0"]);
        let mut session = Session::new(Ni845xTransport::new(mock.clone())).with_reset(Vec::new());
        session.open("dev0", false, false).unwrap();
        assert!(session.is_open());
        session.transport().device().unwrap().dio_write_port(0, 1).unwrap();
        session.close().unwrap();
        assert_eq!(mock.open_devices(), 0);
    }

    #[test]
    fn unknown_device_is_a_connection_error() {
        let mock = MockDriver::new(&["dev0"]);
        let mut session = Session::new(Ni845xTransport::new(mock.clone()));
        assert!(matches!(
            session.open("dev1", false, false),
            Err(Error::Connection { .. })
        ));
        assert!(!session.is_open());
    }
}
