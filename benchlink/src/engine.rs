//! Binds a [`Profile`] to a [`Session`].

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::profile::{Arg, Args, Profile, Reply};
use crate::session::Session;
use crate::transport::Transport;
use crate::{Error, ScpiResponse};

/// Parsed outcome of a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Reading {
    Done,
    Float(f64),
    Floats(Vec<f64>),
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Reading {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Float(x) => Some(*x),
            Reading::Integer(x) => Some(*x as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reading::Text(x) => Some(x),
            _ => None,
        }
    }

    /// Interpret the reply to `command` according to `reply`.
    pub fn parse(command: &str, reply: Reply, text: &str) -> crate::Result<Reading> {
        let trimmed = text.trim();
        let malformed = || Error::malformed_reply(command, text);
        match reply {
            Reply::None => Ok(Reading::Done),
            Reply::Text => Ok(Reading::Text(trimmed.to_string())),
            Reply::Float => trimmed
                .parse::<f64>()
                .map(Reading::Float)
                .map_err(|_| malformed()),
            Reply::Integer => trimmed
                .parse::<i64>()
                .or_else(|_| match trimmed.parse::<f64>() {
                    Ok(x) if x.fract() == 0.0 => Ok(x as i64),
                    _ => Err(malformed()),
                })
                .map(Reading::Integer),
            Reply::FloatList => {
                if trimmed.is_empty() {
                    return Err(malformed());
                }
                trimmed
                    .split(',')
                    .map(|x| x.trim().parse::<f64>().map_err(|_| malformed()))
                    .collect::<crate::Result<Vec<_>>>()
                    .map(Reading::Floats)
            }
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Done => f.write_str("OK"),
            Reading::Float(x) => write!(f, "{}", x),
            Reading::Floats(x) => {
                let values: Vec<String> = x.iter().map(|x| x.to_string()).collect();
                f.write_str(&values.join(","))
            }
            Reading::Integer(x) => write!(f, "{}", x),
            Reading::Text(x) => f.write_str(x),
            Reading::Bytes(x) => write!(f, "<{} bytes>", x.len()),
        }
    }
}

impl From<ScpiResponse> for Reading {
    fn from(resp: ScpiResponse) -> Self {
        match resp {
            ScpiResponse::Done => Reading::Done,
            ScpiResponse::String(x) => Reading::Text(x),
            ScpiResponse::Binary { data } => Reading::Bytes(data),
        }
    }
}

/// An instrument: one session driven through the command table of a profile.
pub struct Adapter<T: Transport> {
    session: Session<T>,
    profile: Arc<Profile>,
}

impl<T: Transport> Adapter<T> {
    pub fn new(transport: T, profile: Arc<Profile>) -> Self {
        let session = Session::new(transport)
            .with_reset(profile.reset.clone())
            .with_timeout(profile.timeout());
        Adapter { session, profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn session(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    pub fn list_resources(&mut self) -> crate::Result<Vec<String>> {
        self.session.list_resources()
    }

    pub fn open(&mut self, resource: &str, reset: bool, identify: bool) -> crate::Result<()> {
        self.session.open(resource, reset, identify)
    }

    /// Open with the reset behavior of the profile and identification.
    pub fn connect(&mut self, resource: &str) -> crate::Result<()> {
        let reset = self.profile.reset_on_open;
        self.session.open(resource, reset, true)
    }

    pub fn close(&mut self) -> crate::Result<()> {
        self.session.close()
    }

    fn check_open(&self) -> crate::Result<()> {
        if self.session.is_open() {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }

    /// Render and send `command`, reading the reply if the command has one.
    pub fn execute(&mut self, command: &str, args: &Args) -> crate::Result<Reading> {
        self.check_open()?;
        let cmd = self.profile.command(command)?;
        let reply = cmd.reply;
        let text = cmd.render(&self.profile, args)?;
        if reply == Reply::None {
            self.session.write(&text)?;
            return Ok(Reading::Done);
        }
        let answer = self.session.query(&text)?;
        Reading::parse(&text, reply, &answer).map_err(|err| {
            log::warn!("{}", err);
            err
        })
    }

    /// Send a configuration command. Nothing is written if an argument is invalid.
    pub fn configure(&mut self, command: &str, args: &Args) -> crate::Result<()> {
        self.check_open()?;
        if self.profile.command(command)?.reply != Reply::None {
            return Err(Error::argument(anyhow!("`{}` is a query", command)));
        }
        self.execute(command, args).map(|_| ())
    }

    pub fn query(&mut self, command: &str, args: &Args) -> crate::Result<Reading> {
        self.check_open()?;
        if self.profile.command(command)?.reply == Reply::None {
            return Err(Error::argument(anyhow!("`{}` does not return a value", command)));
        }
        self.execute(command, args)
    }

    /// Query a parameterless measurement.
    pub fn measure(&mut self, command: &str) -> crate::Result<Reading> {
        self.query(command, &Args::new())
    }

    pub fn identify(&mut self) -> crate::Result<String> {
        match self.query("identify", &Args::new())? {
            Reading::Text(x) => Ok(x),
            other => Ok(other.to_string()),
        }
    }

    pub fn reset(&mut self) -> crate::Result<()> {
        self.session.reset()
    }

    /// Run one of the IEEE 488.2 status queries (`*CAL?`, `*ESR?`, `*STB?`, `*TST?`).
    pub fn common_query<A: Into<Arg>>(&mut self, kind: A) -> crate::Result<String> {
        let args = Args::new().with("query", kind);
        match self.query("commonQuery", &args)? {
            Reading::Text(x) => Ok(x),
            other => Ok(other.to_string()),
        }
    }

    pub fn raw_command(&mut self, command: &str) -> crate::Result<ScpiResponse> {
        self.session.raw_command(command)
    }

    /// Capture the screen into `path`, returns the number of bytes written.
    pub fn save_hardcopy<P: AsRef<Path>>(&mut self, path: P) -> crate::Result<usize> {
        let hardcopy = self
            .profile
            .hardcopy
            .clone()
            .ok_or_else(|| Error::not_supported(format!("Hardcopy on {}", self.profile.name)))?;
        self.check_open()?;
        let remote = &hardcopy.remote_path;
        self.session.write(&format!("SAVe:IMAGe '{}'", remote))?;
        self.session.query("*OPC?")?;
        self.session.write(&format!("FILESystem:READFile '{}'", remote))?;
        let data = self.session.read_raw(hardcopy.max_bytes)?;
        let saved = fs::write(path.as_ref(), &data);
        let deleted = self.session.write(&format!("FILESystem:DELEte '{}'", remote));
        saved?;
        deleted?;
        log::info!("Saved {} byte hardcopy to {}", data.len(), path.as_ref().display());
        Ok(data.len())
    }
}
