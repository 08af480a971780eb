//! In-memory NI-845x driver for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::driver::{ConfigHandle, DeviceHandle, Driver, FindHandle, ScriptHandle, Status};

const INVALID_HANDLE: Status = -301_703;
const RESOURCE_NOT_FOUND: Status = -301_744;
const SCRIPT_NOT_RUN: Status = -301_760;

#[derive(Default)]
struct I2cSettings {
    address: u16,
    address_size: i32,
    clock_rate: u16,
    hs_clock_rate: u16,
    hs_enable: u8,
    hs_master_code: u8,
    port: u8,
    ack_poll_timeout: u16,
}

#[derive(Default)]
struct SpiSettings {
    chip_select: u32,
    clock_phase: i32,
    clock_polarity: i32,
    clock_rate: u16,
    bits: u16,
    port: u8,
}

#[derive(Default)]
struct StreamSettings {
    timing: HashMap<u8, u32>,
    pins: HashMap<u8, u8>,
}

#[derive(Default)]
struct Script {
    writes: Vec<Vec<u8>>,
    reads: Option<Vec<Vec<u8>>>,
}

#[derive(Default)]
struct State {
    devices: Vec<String>,
    calls: Vec<String>,
    failures: HashMap<String, Status>,
    next_handle: u64,
    finds: HashMap<u32, usize>,
    open_devices: HashSet<u64>,
    locked: HashSet<u64>,
    timeout_ms: Option<u32>,
    i2c: HashMap<u64, I2cSettings>,
    i2c_data: HashMap<u16, Vec<u8>>,
    i2c_written: Vec<(u16, Vec<u8>)>,
    spi: HashMap<u64, SpiSettings>,
    streams: HashMap<u64, StreamSettings>,
    streaming: bool,
    stream_counter: u8,
    scripts: HashMap<u64, Script>,
    dio_ports: HashMap<u8, u8>,
    dio_directions: HashMap<u8, u8>,
    dio_driver_types: HashMap<u8, u8>,
}

impl State {
    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

pub(crate) struct MockDriver {
    state: Mutex<State>,
}

macro_rules! enter {
    ($self:ident, $name:expr) => {
        match $self.enter($name) {
            Ok(state) => state,
            Err(status) => return status,
        }
    };
}

macro_rules! with {
    ($state:ident . $map:ident [ $handle:ident ], |$x:ident| $body:expr) => {
        match $state.$map.get_mut(&$handle.0) {
            Some($x) => {
                $body;
                0
            }
            None => INVALID_HANDLE,
        }
    };
}

impl MockDriver {
    pub(crate) fn new(devices: &[&str]) -> Arc<Self> {
        let state = State {
            devices: devices.iter().map(|x| x.to_string()).collect(),
            ..Default::default()
        };
        Arc::new(MockDriver {
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn enter(&self, name: &str) -> Result<MutexGuard<'_, State>, Status> {
        let mut state = self.lock();
        state.calls.push(name.to_string());
        match state.failures.remove(name) {
            Some(status) => Err(status),
            None => Ok(state),
        }
    }

    /// Make the next call to the entry point `name` fail with `status`.
    pub(crate) fn fail(&self, name: &str, status: Status) {
        self.lock().failures.insert(name.to_string(), status);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub(crate) fn is_device_open(&self, device: DeviceHandle) -> bool {
        self.lock().open_devices.contains(&device.0)
    }

    pub(crate) fn open_devices(&self) -> usize {
        self.lock().open_devices.len()
    }

    pub(crate) fn is_locked(&self, device: DeviceHandle) -> bool {
        self.lock().locked.contains(&device.0)
    }

    pub(crate) fn timeout_ms(&self) -> Option<u32> {
        self.lock().timeout_ms
    }

    pub(crate) fn open_configs(&self) -> usize {
        let state = self.lock();
        state.i2c.len() + state.spi.len() + state.streams.len()
    }

    pub(crate) fn open_scripts(&self) -> usize {
        self.lock().scripts.len()
    }

    pub(crate) fn set_i2c_data(&self, address: u16, data: &[u8]) {
        self.lock().i2c_data.insert(address, data.to_vec());
    }

    pub(crate) fn i2c_written(&self) -> Vec<(u16, Vec<u8>)> {
        self.lock().i2c_written.clone()
    }

    pub(crate) fn is_streaming(&self) -> bool {
        self.lock().streaming
    }

    pub(crate) fn stream_timing(&self, param: u8) -> Option<u32> {
        let state = self.lock();
        state.streams.values().find_map(|x| x.timing.get(&param).cloned())
    }

    pub(crate) fn stream_pin(&self, pin: u8) -> Option<u8> {
        let state = self.lock();
        state.streams.values().find_map(|x| x.pins.get(&pin).cloned())
    }

    pub(crate) fn dio_direction(&self, port: u8) -> u8 {
        self.lock().dio_directions.get(&port).cloned().unwrap_or(0)
    }

    pub(crate) fn dio_driver_type(&self, port: u8) -> u8 {
        self.lock().dio_driver_types.get(&port).cloned().unwrap_or(0)
    }
}

fn i2c_reply(state: &State, config: ConfigHandle, data: &mut [u8], read: &mut u32) -> Status {
    let address = match state.i2c.get(&config.0) {
        Some(x) => x.address,
        None => return INVALID_HANDLE,
    };
    let memory = state.i2c_data.get(&address).cloned().unwrap_or_default();
    let n = data.len().min(memory.len());
    data[..n].copy_from_slice(&memory[..n]);
    *read = n as u32;
    0
}

fn invert(write: &[u8]) -> Vec<u8> {
    write.iter().map(|x| !x).collect()
}

impl Driver for MockDriver {
    fn status_to_string(&self, status: Status) -> String {
        format!("mock status {}", status)
    }

    fn find_device(&self, first_device: &mut String, find: &mut FindHandle, found: &mut u32) -> Status {
        let mut state = enter!(self, "ni845xFindDevice");
        *found = state.devices.len() as u32;
        if state.devices.is_empty() {
            return RESOURCE_NOT_FOUND;
        }
        *first_device = state.devices[0].clone();
        let handle = state.handle() as u32;
        state.finds.insert(handle, 1);
        *find = FindHandle(handle);
        0
    }

    fn find_device_next(&self, find: FindHandle, next_device: &mut String) -> Status {
        let mut state = enter!(self, "ni845xFindDeviceNext");
        let pos = match state.finds.get(&find.0) {
            Some(x) => *x,
            None => return INVALID_HANDLE,
        };
        match state.devices.get(pos).cloned() {
            Some(name) => {
                *next_device = name;
                state.finds.insert(find.0, pos + 1);
                0
            }
            None => RESOURCE_NOT_FOUND,
        }
    }

    fn close_find_device_handle(&self, find: FindHandle) -> Status {
        let mut state = enter!(self, "ni845xCloseFindDeviceHandle");
        match state.finds.remove(&find.0) {
            Some(_) => 0,
            None => INVALID_HANDLE,
        }
    }

    fn open(&self, resource: &str, device: &mut DeviceHandle) -> Status {
        let mut state = enter!(self, "ni845xOpen");
        if !state.devices.iter().any(|x| x == resource) {
            return RESOURCE_NOT_FOUND;
        }
        let handle = state.handle();
        state.open_devices.insert(handle);
        *device = DeviceHandle(handle);
        0
    }

    fn close(&self, device: DeviceHandle) -> Status {
        let mut state = enter!(self, "ni845xClose");
        state.locked.remove(&device.0);
        if state.open_devices.remove(&device.0) {
            0
        } else {
            INVALID_HANDLE
        }
    }

    fn device_lock(&self, device: DeviceHandle) -> Status {
        let mut state = enter!(self, "ni845xDeviceLock");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        state.locked.insert(device.0);
        0
    }

    fn device_unlock(&self, device: DeviceHandle) -> Status {
        let mut state = enter!(self, "ni845xDeviceUnlock");
        if state.locked.remove(&device.0) {
            0
        } else {
            INVALID_HANDLE
        }
    }

    fn set_io_voltage_level(&self, device: DeviceHandle, _level: u8) -> Status {
        let state = enter!(self, "ni845xSetIoVoltageLevel");
        if state.open_devices.contains(&device.0) {
            0
        } else {
            INVALID_HANDLE
        }
    }

    fn set_timeout(&self, device: DeviceHandle, timeout_ms: u32) -> Status {
        let mut state = enter!(self, "ni845xSetTimeout");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        state.timeout_ms = Some(timeout_ms);
        0
    }

    fn i2c_set_pullup_enable(&self, device: DeviceHandle, _enable: u8) -> Status {
        let state = enter!(self, "ni845xI2cSetPullupEnable");
        if state.open_devices.contains(&device.0) {
            0
        } else {
            INVALID_HANDLE
        }
    }

    fn i2c_configuration_open(&self, config: &mut ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationOpen");
        let handle = state.handle();
        state.i2c.insert(handle, I2cSettings::default());
        *config = ConfigHandle(handle);
        0
    }

    fn i2c_configuration_close(&self, config: ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationClose");
        match state.i2c.remove(&config.0) {
            Some(_) => 0,
            None => INVALID_HANDLE,
        }
    }

    fn i2c_configuration_set_address(&self, config: ConfigHandle, address: u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetAddress");
        with!(state.i2c[config], |x| x.address = address)
    }

    fn i2c_configuration_get_address(&self, config: ConfigHandle, address: &mut u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetAddress");
        with!(state.i2c[config], |x| *address = x.address)
    }

    fn i2c_configuration_set_address_size(&self, config: ConfigHandle, size: i32) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetAddressSize");
        with!(state.i2c[config], |x| x.address_size = size)
    }

    fn i2c_configuration_get_address_size(&self, config: ConfigHandle, size: &mut i32) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetAddressSize");
        with!(state.i2c[config], |x| *size = x.address_size)
    }

    fn i2c_configuration_set_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetClockRate");
        with!(state.i2c[config], |x| x.clock_rate = khz)
    }

    fn i2c_configuration_get_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetClockRate");
        with!(state.i2c[config], |x| *khz = x.clock_rate)
    }

    fn i2c_configuration_set_hs_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetHSClockRate");
        with!(state.i2c[config], |x| x.hs_clock_rate = khz)
    }

    fn i2c_configuration_get_hs_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetHSClockRate");
        with!(state.i2c[config], |x| *khz = x.hs_clock_rate)
    }

    fn i2c_configuration_set_hs_enable(&self, config: ConfigHandle, enable: u8) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetHSEnable");
        with!(state.i2c[config], |x| x.hs_enable = enable)
    }

    fn i2c_configuration_get_hs_enable(&self, config: ConfigHandle, enable: &mut u8) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetHSEnable");
        with!(state.i2c[config], |x| *enable = x.hs_enable)
    }

    fn i2c_configuration_set_hs_master_code(&self, config: ConfigHandle, code: u8) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetHSMasterCode");
        with!(state.i2c[config], |x| x.hs_master_code = code)
    }

    fn i2c_configuration_get_hs_master_code(&self, config: ConfigHandle, code: &mut u8) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetHSMasterCode");
        with!(state.i2c[config], |x| *code = x.hs_master_code)
    }

    fn i2c_configuration_set_port(&self, config: ConfigHandle, port: u8) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetPort");
        with!(state.i2c[config], |x| x.port = port)
    }

    fn i2c_configuration_get_port(&self, config: ConfigHandle, port: &mut u8) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetPort");
        with!(state.i2c[config], |x| *port = x.port)
    }

    fn i2c_configuration_set_ack_poll_timeout(&self, config: ConfigHandle, timeout_ms: u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationSetAckPollTimeout");
        with!(state.i2c[config], |x| x.ack_poll_timeout = timeout_ms)
    }

    fn i2c_configuration_get_ack_poll_timeout(&self, config: ConfigHandle, timeout_ms: &mut u16) -> Status {
        let mut state = enter!(self, "ni845xI2cConfigurationGetAckPollTimeout");
        with!(state.i2c[config], |x| *timeout_ms = x.ack_poll_timeout)
    }

    fn i2c_write(&self, device: DeviceHandle, config: ConfigHandle, data: &[u8]) -> Status {
        let mut state = enter!(self, "ni845xI2cWrite");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        let address = match state.i2c.get(&config.0) {
            Some(x) => x.address,
            None => return INVALID_HANDLE,
        };
        state.i2c_written.push((address, data.to_vec()));
        0
    }

    fn i2c_read(&self, device: DeviceHandle, config: ConfigHandle, data: &mut [u8], read: &mut u32) -> Status {
        let state = enter!(self, "ni845xI2cRead");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        i2c_reply(&state, config, data, read)
    }

    fn i2c_write_read(
        &self,
        device: DeviceHandle,
        config: ConfigHandle,
        write: &[u8],
        data: &mut [u8],
        read: &mut u32,
    ) -> Status {
        let mut state = enter!(self, "ni845xI2cWriteRead");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        let address = match state.i2c.get(&config.0) {
            Some(x) => x.address,
            None => return INVALID_HANDLE,
        };
        state.i2c_written.push((address, write.to_vec()));
        i2c_reply(&state, config, data, read)
    }

    fn spi_configuration_open(&self, config: &mut ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationOpen");
        let handle = state.handle();
        state.spi.insert(handle, SpiSettings::default());
        *config = ConfigHandle(handle);
        0
    }

    fn spi_configuration_close(&self, config: ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationClose");
        match state.spi.remove(&config.0) {
            Some(_) => 0,
            None => INVALID_HANDLE,
        }
    }

    fn spi_configuration_set_chip_select(&self, config: ConfigHandle, chip_select: u32) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationSetChipSelect");
        with!(state.spi[config], |x| x.chip_select = chip_select)
    }

    fn spi_configuration_get_chip_select(&self, config: ConfigHandle, chip_select: &mut u32) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationGetChipSelect");
        with!(state.spi[config], |x| *chip_select = x.chip_select)
    }

    fn spi_configuration_set_clock_phase(&self, config: ConfigHandle, phase: i32) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationSetClockPhase");
        with!(state.spi[config], |x| x.clock_phase = phase)
    }

    fn spi_configuration_get_clock_phase(&self, config: ConfigHandle, phase: &mut i32) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationGetClockPhase");
        with!(state.spi[config], |x| *phase = x.clock_phase)
    }

    fn spi_configuration_set_clock_polarity(&self, config: ConfigHandle, polarity: i32) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationSetClockPolarity");
        with!(state.spi[config], |x| x.clock_polarity = polarity)
    }

    fn spi_configuration_get_clock_polarity(&self, config: ConfigHandle, polarity: &mut i32) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationGetClockPolarity");
        with!(state.spi[config], |x| *polarity = x.clock_polarity)
    }

    fn spi_configuration_set_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationSetClockRate");
        with!(state.spi[config], |x| x.clock_rate = khz)
    }

    fn spi_configuration_get_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationGetClockRate");
        with!(state.spi[config], |x| *khz = x.clock_rate)
    }

    fn spi_configuration_set_num_bits_per_sample(&self, config: ConfigHandle, bits: u16) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationSetNumBitsPerSample");
        with!(state.spi[config], |x| x.bits = bits)
    }

    fn spi_configuration_get_num_bits_per_sample(&self, config: ConfigHandle, bits: &mut u16) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationGetNumBitsPerSample");
        with!(state.spi[config], |x| *bits = x.bits)
    }

    fn spi_configuration_set_port(&self, config: ConfigHandle, port: u8) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationSetPort");
        with!(state.spi[config], |x| x.port = port)
    }

    fn spi_configuration_get_port(&self, config: ConfigHandle, port: &mut u8) -> Status {
        let mut state = enter!(self, "ni845xSpiConfigurationGetPort");
        with!(state.spi[config], |x| *port = x.port)
    }

    fn spi_write_read(
        &self,
        device: DeviceHandle,
        config: ConfigHandle,
        write: &[u8],
        data: &mut [u8],
        read: &mut u32,
    ) -> Status {
        let state = enter!(self, "ni845xSpiWriteRead");
        if !state.open_devices.contains(&device.0) || !state.spi.contains_key(&config.0) {
            return INVALID_HANDLE;
        }
        let reply = invert(write);
        let n = data.len().min(reply.len());
        data[..n].copy_from_slice(&reply[..n]);
        *read = n as u32;
        0
    }

    fn spi_script_open(&self, script: &mut ScriptHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptOpen");
        let handle = state.handle();
        state.scripts.insert(handle, Script::default());
        *script = ScriptHandle(handle);
        0
    }

    fn spi_script_close(&self, script: ScriptHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptClose");
        match state.scripts.remove(&script.0) {
            Some(_) => 0,
            None => INVALID_HANDLE,
        }
    }

    fn spi_script_clock_polarity_phase(&self, script: ScriptHandle, _polarity: i32, _phase: i32) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptClockPolarityPhase");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_clock_rate(&self, script: ScriptHandle, _khz: u16) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptClockRate");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_cs_high(&self, script: ScriptHandle, _chip_select: u32) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptCSHigh");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_cs_low(&self, script: ScriptHandle, _chip_select: u32) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptCSLow");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_num_bits_per_sample(&self, script: ScriptHandle, _bits: u16) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptNumBitsPerSample");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_us_delay(&self, script: ScriptHandle, _delay_us: u16) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptUsDelay");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_enable_spi(&self, script: ScriptHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptEnableSPI");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_disable_spi(&self, script: ScriptHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptDisableSPI");
        with!(state.scripts[script], |_x| ())
    }

    fn spi_script_write_read(&self, script: ScriptHandle, write: &[u8], read_index: &mut u32) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptWriteRead");
        with!(state.scripts[script], |x| {
            *read_index = x.writes.len() as u32;
            x.writes.push(write.to_vec())
        })
    }

    fn spi_script_extract_read_data_size(&self, script: ScriptHandle, read_index: u32, size: &mut u32) -> Status {
        let state = enter!(self, "ni845xSpiScriptExtractReadDataSize");
        let reads = match state.scripts.get(&script.0) {
            Some(Script { reads: Some(reads), .. }) => reads,
            Some(_) => return SCRIPT_NOT_RUN,
            None => return INVALID_HANDLE,
        };
        match reads.get(read_index as usize) {
            Some(data) => {
                *size = data.len() as u32;
                0
            }
            None => INVALID_HANDLE,
        }
    }

    fn spi_script_extract_read_data(&self, script: ScriptHandle, read_index: u32, data: &mut [u8]) -> Status {
        let state = enter!(self, "ni845xSpiScriptExtractReadData");
        let reads = match state.scripts.get(&script.0) {
            Some(Script { reads: Some(reads), .. }) => reads,
            Some(_) => return SCRIPT_NOT_RUN,
            None => return INVALID_HANDLE,
        };
        match reads.get(read_index as usize) {
            Some(read) if read.len() <= data.len() => {
                data[..read.len()].copy_from_slice(read);
                0
            }
            _ => INVALID_HANDLE,
        }
    }

    fn spi_script_run(&self, script: ScriptHandle, device: DeviceHandle, _port: u8) -> Status {
        let mut state = enter!(self, "ni845xSpiScriptRun");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        with!(state.scripts[script], |x| {
            x.reads = Some(x.writes.iter().map(|w| invert(w)).collect())
        })
    }

    fn spi_stream_configuration_open(&self, config: &mut ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationOpen");
        let handle = state.handle();
        state.streams.insert(handle, StreamSettings::default());
        *config = ConfigHandle(handle);
        0
    }

    fn spi_stream_configuration_close(&self, config: ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationClose");
        match state.streams.remove(&config.0) {
            Some(_) => 0,
            None => INVALID_HANDLE,
        }
    }

    fn spi_stream_configuration_set_num_bits(&self, config: ConfigHandle, _bits: u8) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationSetNumBits");
        with!(state.streams[config], |_x| ())
    }

    fn spi_stream_configuration_set_num_samples(&self, config: ConfigHandle, _samples: u32) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationSetNumSamples");
        with!(state.streams[config], |_x| ())
    }

    fn spi_stream_configuration_set_clock_phase(&self, config: ConfigHandle, _phase: u8) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationSetClockPhase");
        with!(state.streams[config], |_x| ())
    }

    fn spi_stream_configuration_set_clock_polarity(&self, config: ConfigHandle, _polarity: u8) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationSetClockPolarity");
        with!(state.streams[config], |_x| ())
    }

    fn spi_stream_configuration_wave1_set_timing_param(&self, config: ConfigHandle, param: u8, value: u32) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationWave1SetTimingParam");
        with!(state.streams[config], |x| x.timing.insert(param, value))
    }

    fn spi_stream_configuration_wave1_set_mosi_data(&self, config: ConfigHandle, _data: &[u8]) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationWave1SetMosiData");
        with!(state.streams[config], |_x| ())
    }

    fn spi_stream_configuration_wave1_set_pin_config(&self, config: ConfigHandle, pin: u8, mode: u8) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationWave1SetPinConfig");
        with!(state.streams[config], |x| x.pins.insert(pin, mode))
    }

    fn spi_stream_configuration_set_packet_size(&self, config: ConfigHandle, _size: u32) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamConfigurationSetPacketSize");
        with!(state.streams[config], |_x| ())
    }

    fn spi_stream_start(&self, device: DeviceHandle, config: ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamStart");
        if !state.open_devices.contains(&device.0) || !state.streams.contains_key(&config.0) {
            return INVALID_HANDLE;
        }
        state.streaming = true;
        state.stream_counter = 0;
        0
    }

    fn spi_stream_read(&self, device: DeviceHandle, config: ConfigHandle, data: &mut [u8], read: &mut u32) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamRead");
        if !state.streaming || !state.open_devices.contains(&device.0) || !state.streams.contains_key(&config.0) {
            return INVALID_HANDLE;
        }
        for x in data.iter_mut() {
            *x = state.stream_counter;
            state.stream_counter = state.stream_counter.wrapping_add(1);
        }
        *read = data.len() as u32;
        0
    }

    fn spi_stream_stop(&self, device: DeviceHandle, config: ConfigHandle) -> Status {
        let mut state = enter!(self, "ni845xSpiStreamStop");
        if !state.open_devices.contains(&device.0) || !state.streams.contains_key(&config.0) {
            return INVALID_HANDLE;
        }
        state.streaming = false;
        0
    }

    fn dio_set_port_line_direction_map(&self, device: DeviceHandle, port: u8, map: u8) -> Status {
        let mut state = enter!(self, "ni845xDioSetPortLineDirectionMap");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        state.dio_directions.insert(port, map);
        0
    }

    fn dio_set_driver_type(&self, device: DeviceHandle, port: u8, driver_type: u8) -> Status {
        let mut state = enter!(self, "ni845xDioSetDriverType");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        state.dio_driver_types.insert(port, driver_type);
        0
    }

    fn dio_write_line(&self, device: DeviceHandle, port: u8, line: u8, value: i32) -> Status {
        let mut state = enter!(self, "ni845xDioWriteLine");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        let current = state.dio_ports.get(&port).cloned().unwrap_or(0);
        let next = if value != 0 {
            current | (1 << line)
        } else {
            current & !(1 << line)
        };
        state.dio_ports.insert(port, next);
        0
    }

    fn dio_write_port(&self, device: DeviceHandle, port: u8, value: u8) -> Status {
        let mut state = enter!(self, "ni845xDioWritePort");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        state.dio_ports.insert(port, value);
        0
    }

    fn dio_read_line(&self, device: DeviceHandle, port: u8, line: u8, value: &mut i32) -> Status {
        let state = enter!(self, "ni845xDioReadLine");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        let current = state.dio_ports.get(&port).cloned().unwrap_or(0);
        *value = ((current >> line) & 1) as i32;
        0
    }

    fn dio_read_port(&self, device: DeviceHandle, port: u8, value: &mut u8) -> Status {
        let state = enter!(self, "ni845xDioReadPort");
        if !state.open_devices.contains(&device.0) {
            return INVALID_HANDLE;
        }
        *value = state.dio_ports.get(&port).cloned().unwrap_or(0);
        0
    }
}
