//! NI USB-845x interface adapters (I2C, SPI, SPI streaming and DIO).
//!
//! Every driver handle is owned by a guard that releases it on drop: a
//! [`Device`] closes its device handle, [`I2cConfig`], [`SpiConfig`] and
//! [`SpiStreamConfig`] close their configuration handle and [`ScriptRun`]
//! closes its script. A device hands out at most one configuration and one
//! script at a time.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::Error;

mod dio;
mod dll;
pub mod driver;
mod i2c;
#[cfg(test)]
pub(crate) mod mock;
mod script;
mod spi;
mod stream;
mod transport;

pub use dio::{DriverType, Level};
pub use dll::{DllDriver, NI845X_LIB_ENV};
pub use driver::{ConfigHandle, DeviceHandle, Driver, FindHandle, ScriptHandle, Status};
pub use i2c::{AddressSize, I2cConfig};
pub use script::{ReadIndex, ScriptRun, ScriptStep, SpiScript};
pub use spi::{ClockPhase, ClockPolarity, SpiConfig};
pub use stream::{PinMode, SpiStream, SpiStreamConfig, StreamPin, TimingParameter};
pub use transport::Ni845xTransport;

/// The device timeout cannot be set below this.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(1000);

/// Map a driver status to a result. `call` names the entry point and its arguments.
pub(crate) fn check<F: FnOnce() -> String>(driver: &dyn Driver, status: Status, call: F) -> crate::Result<()> {
    if status == 0 {
        return Ok(());
    }
    let call = call();
    let message = driver.status_to_string(status);
    log::warn!("{} failed with status {}: {}", call, status, message);
    Err(Error::driver(call, status, message))
}

/// I/O high level of the adapter pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoVoltage {
    V3_3 = 33,
    V2_5 = 25,
    V1_8 = 18,
    V1_5 = 15,
    V1_2 = 12,
}

/// Enumerates attached adapters. The find handle is closed on drop.
pub struct DeviceFinder {
    driver: Arc<dyn Driver>,
    handle: FindHandle,
    first: String,
    count: u32,
    returned: u32,
}

impl DeviceFinder {
    pub fn find_first(driver: Arc<dyn Driver>) -> crate::Result<Self> {
        let mut first = String::new();
        let mut handle = FindHandle::default();
        let mut count = 0_u32;
        let status = driver.find_device(&mut first, &mut handle, &mut count);
        if status != 0 && count == 0 {
            log::debug!(
                "ni845xFindDevice returned {}: {}",
                status,
                driver.status_to_string(status)
            );
            return Err(Error::NoDeviceFound);
        }
        check(driver.as_ref(), status, || "ni845xFindDevice".to_string())?;
        let ret = DeviceFinder {
            driver,
            handle,
            first,
            count,
            returned: 1,
        };
        if ret.count == 0 {
            return Err(Error::NoDeviceFound);
        }
        Ok(ret)
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    /// Number of adapters found.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The next adapter, `NoDeviceFound` once all have been returned.
    pub fn find_next(&mut self) -> crate::Result<String> {
        if self.returned >= self.count {
            return Err(Error::NoDeviceFound);
        }
        let mut next = String::new();
        let status = self.driver.find_device_next(self.handle, &mut next);
        check(self.driver.as_ref(), status, || "ni845xFindDeviceNext".to_string())?;
        self.returned += 1;
        Ok(next)
    }
}

impl Drop for DeviceFinder {
    fn drop(&mut self) {
        let status = self.driver.close_find_device_handle(self.handle);
        if status != 0 {
            log::warn!(
                "ni845xCloseFindDeviceHandle failed: {}",
                self.driver.status_to_string(status)
            );
        }
    }
}

/// Names of every attached adapter, empty if there is none.
pub fn list_devices(driver: Arc<dyn Driver>) -> crate::Result<Vec<String>> {
    let mut finder = match DeviceFinder::find_first(driver) {
        Ok(finder) => finder,
        Err(Error::NoDeviceFound) => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut ret = vec![finder.first().to_string()];
    for _ in 1..finder.count() {
        ret.push(finder.find_next()?);
    }
    Ok(ret)
}

/// An open adapter.
pub struct Device {
    driver: Arc<dyn Driver>,
    handle: DeviceHandle,
    name: String,
    config_open: Cell<bool>,
    script_open: Cell<bool>,
    open: bool,
}

impl Device {
    pub fn open(driver: Arc<dyn Driver>, resource: &str) -> crate::Result<Self> {
        let mut handle = DeviceHandle::default();
        let status = driver.open(resource, &mut handle);
        check(driver.as_ref(), status, || format!("ni845xOpen({})", resource))?;
        log::info!("{} has been opened", resource);
        Ok(Device {
            driver,
            handle,
            name: resource.to_string(),
            config_open: Cell::new(false),
            script_open: Cell::new(false),
            open: true,
        })
    }

    /// Open the first adapter found.
    pub fn open_first(driver: Arc<dyn Driver>) -> crate::Result<Self> {
        let name = DeviceFinder::find_first(driver.clone())?.first().to_string();
        Self::open(driver, &name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub(crate) fn check<F: FnOnce() -> String>(&self, status: Status, call: F) -> crate::Result<()> {
        check(self.driver.as_ref(), status, call)
    }

    pub(crate) fn claim_config(&self, what: &str) -> crate::Result<()> {
        if self.config_open.replace(true) {
            return Err(Error::already_open(format!("A configuration on {} ({} requested)", self.name, what)));
        }
        Ok(())
    }

    pub(crate) fn release_config(&self) {
        self.config_open.set(false);
    }

    pub(crate) fn claim_script(&self) -> crate::Result<()> {
        if self.script_open.replace(true) {
            return Err(Error::already_open(format!("A script on {}", self.name)));
        }
        Ok(())
    }

    pub(crate) fn release_script(&self) {
        self.script_open.set(false);
    }

    pub fn set_io_voltage_level(&self, level: IoVoltage) -> crate::Result<()> {
        let status = self.driver.set_io_voltage_level(self.handle, level as u8);
        self.check(status, || format!("ni845xSetIoVoltageLevel({})", level as u8))
    }

    pub fn set_timeout(&self, timeout: Duration) -> crate::Result<()> {
        if timeout < MIN_TIMEOUT {
            return Err(Error::argument(anyhow!(
                "Timeout of {:?} is below the minimum of {:?}",
                timeout,
                MIN_TIMEOUT
            )));
        }
        let ms = timeout.as_millis().min(u32::MAX as u128) as u32;
        let status = self.driver.set_timeout(self.handle, ms);
        self.check(status, || format!("ni845xSetTimeout({})", ms))
    }

    pub fn i2c_set_pullup_enable(&self, enable: bool) -> crate::Result<()> {
        let status = self.driver.i2c_set_pullup_enable(self.handle, enable as u8);
        self.check(status, || format!("ni845xI2cSetPullupEnable({})", enable as u8))
    }

    /// Lock the device for exclusive access until the guard is dropped.
    pub fn lock(&self) -> crate::Result<DeviceLock<'_>> {
        let status = self.driver.device_lock(self.handle);
        self.check(status, || format!("ni845xDeviceLock({})", self.name))?;
        Ok(DeviceLock {
            device: self,
            locked: true,
        })
    }

    pub fn close(mut self) -> crate::Result<()> {
        self.open = false;
        let status = self.driver.close(self.handle);
        let ret = self.check(status, || format!("ni845xClose({})", self.name));
        log::info!("{} has been closed", self.name);
        ret
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        let status = self.driver.close(self.handle);
        if status != 0 {
            log::warn!(
                "Error closing {}: {}",
                self.name,
                self.driver.status_to_string(status)
            );
        }
    }
}

/// Exclusive access to a [`Device`], unlocked on drop.
pub struct DeviceLock<'d> {
    device: &'d Device,
    locked: bool,
}

impl<'d> DeviceLock<'d> {
    pub fn device(&self) -> &Device {
        self.device
    }

    pub fn unlock(mut self) -> crate::Result<()> {
        self.locked = false;
        let status = self.device.driver.device_unlock(self.device.handle);
        self.device
            .check(status, || format!("ni845xDeviceUnlock({})", self.device.name))
    }
}

impl<'d> Drop for DeviceLock<'d> {
    fn drop(&mut self) {
        if self.locked {
            let status = self.device.driver.device_unlock(self.device.handle);
            if status != 0 {
                log::warn!("ni845xDeviceUnlock failed with status {}", status);
            }
        }
    }
}
