//! Runtime bindings to the VISA shared library.

use std::env;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::time::Duration;

use anyhow::anyhow;
use dlopen::wrapper::{Container, WrapperApi};

use crate::Error;

cfg_if::cfg_if! {
    if #[cfg(all(windows, target_pointer_width = "64"))] {
        const DEFAULT_VISA_LIB: &str = "visa64.dll";
    } else if #[cfg(windows)] {
        const DEFAULT_VISA_LIB: &str = "visa32.dll";
    } else if #[cfg(target_os = "macos")] {
        const DEFAULT_VISA_LIB: &str = "/Library/Frameworks/VISA.framework/VISA";
    } else {
        const DEFAULT_VISA_LIB: &str = "libvisa.so";
    }
}

/// Overrides the location of the VISA library.
pub const VISA_LIB_ENV: &str = "BENCHLINK_VISA_LIB";

type ViStatus = i32;
type ViAccessMode = u32;
type ViSession = u32;
type ViObject = u32;
type ViFindList = u32;
type ViAttr = u32;
type ViAttrState = u64;

const VI_SUCCESS_MAX_CNT: ViStatus = 0x3FFF_0006;
const VI_ERROR_RSRC_NFOUND: ViStatus = 0xBFFF_0011_u32 as i32;
const VI_NULL: ViAccessMode = 0;
const VI_FIND_BUFLEN: usize = 256;
const VI_TMO_INFINITE: u64 = 0xFFFF_FFFF;

const VI_ATTR_TMO_VALUE: ViAttr = 0x3FFF_001A;
const VI_ATTR_TERMCHAR: ViAttr = 0x3FFF_0018;
const VI_ATTR_TERMCHAR_EN: ViAttr = 0x3FFF_0038;

const READ_CHUNK: usize = 4096;

#[allow(non_snake_case)]
#[derive(WrapperApi)]
struct Api {
    viOpenDefaultRM: unsafe extern "C" fn(vi: *mut ViSession) -> ViStatus,
    viFindRsrc: unsafe extern "C" fn(
        session: ViSession,
        expr: *const c_char,
        find_list: *mut ViFindList,
        ret_cnt: *mut u32,
        desc: *mut c_char,
    ) -> ViStatus,
    viFindNext: unsafe extern "C" fn(find_list: ViFindList, desc: *mut c_char) -> ViStatus,
    viOpen: unsafe extern "C" fn(
        session: ViSession,
        rsrc: *const c_char,
        access_mode: ViAccessMode,
        timeout: u32,
        vi: *mut ViObject,
    ) -> ViStatus,
    viClose: unsafe extern "C" fn(vi: ViObject) -> ViStatus,
    viSetAttribute: unsafe extern "C" fn(vi: ViObject, attr: ViAttr, value: ViAttrState) -> ViStatus,
    viGetAttribute: unsafe extern "C" fn(vi: ViObject, attr: ViAttr, value: *mut ViAttrState) -> ViStatus,
    viStatusDesc: unsafe extern "C" fn(vi: ViObject, status: ViStatus, desc: *mut c_char) -> ViStatus,
    viRead: unsafe extern "C" fn(vi: ViObject, buf: *mut u8, cnt: u32, ret_cnt: *mut u32) -> ViStatus,
    viWrite: unsafe extern "C" fn(vi: ViObject, buf: *const u8, cnt: u32, ret_cnt: *mut u32) -> ViStatus,
    viClear: unsafe extern "C" fn(vi: ViObject) -> ViStatus,
}

struct Visa {
    api: Container<Api>,
}

lazy_static! {
    static ref VISA: crate::Result<Visa> = Visa::load();
}

fn get_visa() -> crate::Result<&'static Visa> {
    match VISA.as_ref() {
        Ok(visa) => Ok(visa),
        Err(err) => Err(err.clone()),
    }
}

fn library_path() -> String {
    env::var(VISA_LIB_ENV).unwrap_or_else(|_| DEFAULT_VISA_LIB.to_string())
}

fn to_cstring(value: &str) -> crate::Result<CString> {
    CString::new(value).map_err(|_| Error::argument(anyhow!("`{}` contains a NUL byte", value)))
}

fn from_buffer(buf: &[c_char]) -> String {
    unsafe { CStr::from_ptr(buf.as_ptr()) }.to_string_lossy().into_owned()
}

impl Visa {
    fn load() -> crate::Result<Self> {
        let path = library_path();
        log::debug!("Loading VISA library from `{}`", path);
        let api: Container<Api> = unsafe { Container::load(&path) }.map_err(|err| {
            Error::connection(
                "VISA resource manager",
                anyhow!("Cannot load `{}`: {}", path, err),
            )
        })?;
        Ok(Visa { api })
    }

    fn describe(&self, vi: ViObject, status: ViStatus) -> String {
        let mut desc = [0 as c_char; VI_FIND_BUFLEN];
        let ret = unsafe { self.api.viStatusDesc(vi, status, desc.as_mut_ptr()) };
        if ret < 0 {
            return format!("Unknown VISA status {:#X}", status);
        }
        from_buffer(&desc)
    }

    fn check<F: FnOnce() -> String>(&self, vi: ViObject, status: ViStatus, call: F) -> crate::Result<ViStatus> {
        if status < 0 {
            Err(Error::driver(call(), status, self.describe(vi, status)))
        } else {
            Ok(status)
        }
    }
}

/// A session to the default resource manager, closed on drop.
pub struct ResourceManager {
    visa: &'static Visa,
    session: ViSession,
}

impl ResourceManager {
    pub fn open() -> crate::Result<Self> {
        let visa = get_visa()?;
        let mut session: ViSession = 0;
        let status = unsafe { visa.api.viOpenDefaultRM(&mut session as *mut ViSession) };
        if status < 0 {
            return Err(Error::connection(
                "VISA resource manager",
                anyhow!("viOpenDefaultRM failed: {}", visa.describe(0, status)),
            ));
        }
        Ok(ResourceManager { visa, session })
    }

    /// All resources matching a VISA search expression such as `?*::INSTR`.
    pub fn find(&self, expr: &str) -> crate::Result<Vec<String>> {
        let cexpr = to_cstring(expr)?;
        let mut list: ViFindList = 0;
        let mut count = 0_u32;
        let mut desc = [0 as c_char; VI_FIND_BUFLEN];
        let status = unsafe {
            self.visa.api.viFindRsrc(
                self.session,
                cexpr.as_ptr(),
                &mut list as *mut ViFindList,
                &mut count as *mut u32,
                desc.as_mut_ptr(),
            )
        };
        if status == VI_ERROR_RSRC_NFOUND {
            return Ok(Vec::new());
        }
        self.visa.check(self.session, status, || format!("viFindRsrc({})", expr))?;
        let mut ret = Vec::with_capacity(count as usize);
        ret.push(from_buffer(&desc));
        let mut result = Ok(());
        for _ in 1..count {
            let status = unsafe { self.visa.api.viFindNext(list, desc.as_mut_ptr()) };
            if let Err(err) = self.visa.check(list, status, || "viFindNext".to_string()) {
                result = Err(err);
                break;
            }
            ret.push(from_buffer(&desc));
        }
        unsafe { self.visa.api.viClose(list) };
        result.map(|_| ret)
    }

    pub fn open_instrument(&self, addr: &str, timeout: Option<Duration>) -> crate::Result<Instrument> {
        let caddr = to_cstring(addr)?;
        let tmo = timeout.map(|x| x.as_millis() as u32).unwrap_or(0);
        let mut instr: ViObject = 0;
        let status = unsafe {
            self.visa
                .api
                .viOpen(self.session, caddr.as_ptr(), VI_NULL, tmo, &mut instr as *mut ViObject)
        };
        if status < 0 {
            return Err(Error::connection(
                addr,
                anyhow!("viOpen failed: {}", self.visa.describe(self.session, status)),
            ));
        }
        Ok(Instrument {
            visa: self.visa,
            instr,
            addr: addr.to_string(),
            open: true,
        })
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        let status = unsafe { self.visa.api.viClose(self.session) };
        if status < 0 {
            log::warn!("Error closing resource manager: {}", self.visa.describe(0, status));
        }
    }
}

/// An open instrument session, closed on drop.
pub struct Instrument {
    visa: &'static Visa,
    instr: ViObject,
    addr: String,
    open: bool,
}

impl Instrument {
    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn set_attribute(&self, attr: ViAttr, value: ViAttrState) -> crate::Result<()> {
        let status = unsafe { self.visa.api.viSetAttribute(self.instr, attr, value) };
        self.visa
            .check(self.instr, status, || format!("viSetAttribute({:#X}, {})", attr, value))
            .map(|_| ())
    }

    fn get_attribute(&self, attr: ViAttr) -> crate::Result<ViAttrState> {
        let mut value: ViAttrState = 0;
        let status = unsafe {
            self.visa
                .api
                .viGetAttribute(self.instr, attr, &mut value as *mut ViAttrState)
        };
        self.visa
            .check(self.instr, status, || format!("viGetAttribute({:#X})", attr))
            .map(|_| value)
    }

    /// `None` disables the timeout.
    pub fn set_timeout(&self, timeout: Option<Duration>) -> crate::Result<()> {
        let value = match timeout {
            Some(x) => (x.as_millis() as u64).min(VI_TMO_INFINITE - 1),
            None => VI_TMO_INFINITE,
        };
        self.set_attribute(VI_ATTR_TMO_VALUE, value)
    }

    pub fn timeout(&self) -> crate::Result<Option<Duration>> {
        let value = self.get_attribute(VI_ATTR_TMO_VALUE)?;
        if value == VI_TMO_INFINITE {
            Ok(None)
        } else {
            Ok(Some(Duration::from_millis(value)))
        }
    }

    pub fn set_term_char(&self, term: Option<u8>) -> crate::Result<()> {
        match term {
            Some(ch) => {
                self.set_attribute(VI_ATTR_TERMCHAR, ch as ViAttrState)?;
                self.set_attribute(VI_ATTR_TERMCHAR_EN, 1)
            }
            None => self.set_attribute(VI_ATTR_TERMCHAR_EN, 0),
        }
    }

    /// Write all of `data`. `context` names the command in error reports.
    pub fn write(&self, data: &[u8], context: &str) -> crate::Result<()> {
        let mut offset = 0;
        while offset < data.len() {
            let chunk = &data[offset..];
            let mut written = 0_u32;
            let status = unsafe {
                self.visa
                    .api
                    .viWrite(self.instr, chunk.as_ptr(), chunk.len() as u32, &mut written as *mut u32)
            };
            self.visa.check(self.instr, status, || format!("viWrite(`{}`)", context))?;
            if written == 0 {
                return Err(Error::driver(
                    format!("viWrite(`{}`)", context),
                    status,
                    "No bytes written",
                ));
            }
            offset += written as usize;
        }
        Ok(())
    }

    /// Read until the device signals the end of a message or `max_bytes` arrived.
    pub fn read(&self, max_bytes: usize, context: &str) -> crate::Result<Vec<u8>> {
        let mut ret = Vec::new();
        loop {
            let size = READ_CHUNK.min(max_bytes - ret.len());
            if size == 0 {
                break;
            }
            let mut chunk = vec![0_u8; size];
            let mut actually_read = 0_u32;
            let status = unsafe {
                self.visa
                    .api
                    .viRead(self.instr, chunk.as_mut_ptr(), size as u32, &mut actually_read as *mut u32)
            };
            self.visa.check(self.instr, status, || format!("viRead after `{}`", context))?;
            chunk.truncate(actually_read as usize);
            ret.extend_from_slice(&chunk);
            if status != VI_SUCCESS_MAX_CNT {
                break;
            }
        }
        Ok(ret)
    }

    pub fn clear(&self) -> crate::Result<()> {
        let status = unsafe { self.visa.api.viClear(self.instr) };
        self.visa.check(self.instr, status, || "viClear".to_string()).map(|_| ())
    }

    pub fn close(mut self) -> crate::Result<()> {
        self.open = false;
        let status = unsafe { self.visa.api.viClose(self.instr) };
        self.visa
            .check(self.instr, status, || format!("viClose({})", self.addr))
            .map(|_| ())
    }
}

impl Drop for Instrument {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        let status = unsafe { self.visa.api.viClose(self.instr) };
        if status < 0 {
            log::warn!(
                "Error closing `{}`: {}",
                self.addr,
                self.visa.describe(self.instr, status)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_visa_header() {
        assert_eq!(VI_ERROR_RSRC_NFOUND, -1_073_807_343);
        assert!(VI_SUCCESS_MAX_CNT > 0);
    }

    #[test]
    fn library_path_honors_environment() {
        env::set_var(VISA_LIB_ENV, "/opt/visa/libvisa-test.so");
        assert_eq!(library_path(), "/opt/visa/libvisa-test.so");
        env::remove_var(VISA_LIB_ENV);
        assert_eq!(library_path(), DEFAULT_VISA_LIB);
    }
}
