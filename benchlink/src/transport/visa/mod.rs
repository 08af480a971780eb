use std::time::Duration;

use visa_sys::{Instrument, ResourceManager};

use super::{Termination, Transport};
use crate::Error;

mod visa_sys;

pub use visa_sys::VISA_LIB_ENV;

/// Search expression used to enumerate instruments.
const FIND_EXPR: &str = "?*::INSTR";
const MAX_REPLY_BYTES: usize = 1024 * 1024;

/// [`Transport`] backed by a vendor VISA library loaded at runtime.
#[derive(Default)]
pub struct VisaTransport {
    rm: Option<ResourceManager>,
    instr: Option<Instrument>,
    termination: Termination,
    timeout: Option<Duration>,
}

impl VisaTransport {
    pub fn new() -> Self {
        Default::default()
    }

    fn rm(&mut self) -> crate::Result<&ResourceManager> {
        if self.rm.is_none() {
            self.rm = Some(ResourceManager::open()?);
        }
        self.rm.as_ref().ok_or(Error::NotOpen)
    }

    fn instr(&self) -> crate::Result<&Instrument> {
        self.instr.as_ref().ok_or(Error::NotOpen)
    }

    fn encode(&self, command: &str) -> Vec<u8> {
        let mut ret = command.as_bytes().to_vec();
        if self.termination == Termination::Newline && !command.ends_with('\n') {
            ret.push(b'\n');
        }
        ret
    }

    fn apply_settings(&self, instr: &Instrument) -> crate::Result<()> {
        if self.termination == Termination::Newline {
            instr.set_term_char(Some(b'\n'))?;
        }
        if self.timeout.is_some() {
            instr.set_timeout(self.timeout)?;
        }
        Ok(())
    }
}

impl Transport for VisaTransport {
    fn open(&mut self, resource: &str) -> crate::Result<()> {
        if let Some(instr) = &self.instr {
            return Err(Error::already_open(format!("VISA session on `{}`", instr.addr())));
        }
        let timeout = self.timeout;
        let instr = self.rm()?.open_instrument(resource, timeout)?;
        log::debug!("Opened VISA session on `{}`", resource);
        self.instr = Some(instr);
        Ok(())
    }

    fn close(&mut self) -> crate::Result<()> {
        let instr = self.instr.take().ok_or(Error::NotOpen)?;
        let ret = instr.close();
        // releases the resource manager session as well
        self.rm.take();
        ret
    }

    fn list_resources(&mut self) -> crate::Result<Vec<String>> {
        self.rm()?.find(FIND_EXPR)
    }

    fn set_termination(&mut self, termination: Termination) -> crate::Result<()> {
        self.termination = termination;
        match &self.instr {
            Some(instr) if termination == Termination::Newline => instr.set_term_char(Some(b'\n')),
            _ => Ok(()),
        }
    }

    fn set_timeout(&mut self, timeout: Duration) -> crate::Result<()> {
        self.timeout = Some(timeout);
        match &self.instr {
            Some(instr) => instr.set_timeout(Some(timeout)),
            None => Ok(()),
        }
    }

    fn write(&mut self, command: &str) -> crate::Result<()> {
        let data = self.encode(command);
        self.instr()?.write(&data, command)
    }

    fn query(&mut self, command: &str) -> crate::Result<String> {
        let data = self.encode(command);
        let instr = self.instr()?;
        instr.write(&data, command)?;
        let reply = instr.read(MAX_REPLY_BYTES, command)?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }

    fn read_raw(&mut self, max_bytes: usize) -> crate::Result<Vec<u8>> {
        read_unterminated(self.instr()?, self.termination, max_bytes)
    }
}

/// Reads that can switch the termination character on and off.
trait RawRead {
    fn set_term_char(&self, term: Option<u8>) -> crate::Result<()>;

    fn read(&self, max_bytes: usize, context: &str) -> crate::Result<Vec<u8>>;
}

impl RawRead for Instrument {
    fn set_term_char(&self, term: Option<u8>) -> crate::Result<()> {
        Instrument::set_term_char(self, term)
    }

    fn read(&self, max_bytes: usize, context: &str) -> crate::Result<Vec<u8>> {
        Instrument::read(self, max_bytes, context)
    }
}

/// Binary payloads may contain `\n`. The termination character is off during the
/// read and restored afterwards, also when the read fails.
fn read_unterminated<I: RawRead>(
    instr: &I,
    termination: Termination,
    max_bytes: usize,
) -> crate::Result<Vec<u8>> {
    if termination != Termination::Newline {
        return instr.read(max_bytes, "read_raw");
    }
    instr.set_term_char(None)?;
    let ret = instr.read(max_bytes, "read_raw");
    let restored = instr.set_term_char(Some(b'\n'));
    let data = ret?;
    restored?;
    Ok(data)
}

impl VisaTransport {
    /// Reapply termination and timeout, e.g. after the instrument was power cycled.
    pub fn refresh(&self) -> crate::Result<()> {
        let instr = self.instr()?;
        instr.clear()?;
        self.apply_settings(instr)
    }

    pub fn timeout(&self) -> crate::Result<Option<Duration>> {
        self.instr()?.timeout()
    }
}
