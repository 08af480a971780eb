//! Declarative instrument profiles.
//!
//! A [`Profile`] lists the option tables and command templates of one
//! instrument model. Rendering a command validates every argument against its
//! table before any text is produced, so invalid input never reaches the wire.

use std::collections::{BTreeMap, HashMap};
use std::convert::TryFrom;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use strfmt::strfmt;

use crate::session::{DEFAULT_SETUP, RESET};
use crate::Error;

/// One selectable value of an option table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub label: String,
    /// Text substituted into the command, defaults to the label. May reference
    /// other parameters of the same command, e.g. `MEAS{slot}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

impl OptionEntry {
    pub fn literal(&self) -> &str {
        self.literal.as_deref().unwrap_or(&self.label)
    }
}

/// SCPI abbreviation of a mnemonic, e.g. `VOLT` for `VOLTage`.
fn short_form(label: &str) -> Option<String> {
    if !label.chars().any(|x| x.is_ascii_lowercase()) {
        return None;
    }
    Some(label.chars().filter(|x| !x.is_ascii_lowercase()).collect())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionTable {
    pub name: String,
    pub entries: Vec<OptionEntry>,
}

impl OptionTable {
    pub fn new(name: &str, labels: &[&str]) -> Self {
        OptionTable {
            name: name.to_string(),
            entries: labels
                .iter()
                .map(|x| OptionEntry {
                    label: x.to_string(),
                    literal: None,
                })
                .collect(),
        }
    }

    /// A table whose entries substitute something other than their label.
    pub fn with_literals(name: &str, entries: &[(&str, &str)]) -> Self {
        OptionTable {
            name: name.to_string(),
            entries: entries
                .iter()
                .map(|(label, literal)| OptionEntry {
                    label: label.to_string(),
                    literal: Some(literal.to_string()),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|x| x.label.as_str()).collect()
    }

    /// Find an entry by label, ignoring case and accepting the SCPI short form.
    pub fn position(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.entries
            .iter()
            .position(|x| x.label.eq_ignore_ascii_case(label))
            .or_else(|| {
                self.entries.iter().position(|x| match short_form(&x.label) {
                    Some(short) => short.eq_ignore_ascii_case(label),
                    None => false,
                })
            })
    }

    fn by_index(&self, axis: &str, index: i64) -> crate::Result<(usize, &OptionEntry)> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i).map(|x| (i, x)))
            .ok_or_else(|| Error::InvalidOption {
                axis: axis.to_string(),
                index,
                len: self.len(),
            })
    }

    /// Resolve a user supplied value of parameter `axis` to one entry.
    pub fn lookup(&self, axis: &str, arg: &Arg) -> crate::Result<(usize, &OptionEntry)> {
        match arg {
            Arg::Index(index) => self.by_index(axis, i64::try_from(*index).unwrap_or(i64::MAX)),
            Arg::Number(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                self.by_index(axis, *x as i64)
            }
            Arg::Number(x) => Err(Error::argument(anyhow!(
                "`{}` expects an option index or label, got {}",
                axis,
                x
            ))),
            Arg::Text(text) => {
                if let Some(index) = self.position(text) {
                    return Ok((index, &self.entries[index]));
                }
                match text.trim().parse::<i64>() {
                    Ok(index) => self.by_index(axis, index),
                    Err(_) => Err(Error::argument(anyhow!(
                        "`{}` is not a valid `{}`, expected one of {:?}",
                        text,
                        axis,
                        self.labels()
                    ))),
                }
            }
        }
    }
}

/// Value supplied for a command parameter.
///
/// JSON integers deserialize to [`Arg::Index`], other numbers to [`Arg::Number`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Index(usize),
    Number(f64),
    Text(String),
}

impl Arg {
    /// Parse a command line value: integers become indices, decimals numbers.
    pub fn parse(value: &str) -> Arg {
        let value = value.trim();
        if let Ok(x) = value.parse::<usize>() {
            Arg::Index(x)
        } else if let Ok(x) = value.parse::<f64>() {
            Arg::Number(x)
        } else {
            Arg::Text(value.to_string())
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Index(x) => write!(f, "{}", x),
            Arg::Number(x) => write!(f, "{}", x),
            Arg::Text(x) => f.write_str(x),
        }
    }
}

impl From<usize> for Arg {
    fn from(x: usize) -> Self {
        Arg::Index(x)
    }
}

impl From<i32> for Arg {
    fn from(x: i32) -> Self {
        if x >= 0 {
            Arg::Index(x as usize)
        } else {
            Arg::Number(x as f64)
        }
    }
}

impl From<f64> for Arg {
    fn from(x: f64) -> Self {
        Arg::Number(x)
    }
}

impl From<&str> for Arg {
    fn from(x: &str) -> Self {
        Arg::Text(x.to_string())
    }
}

impl From<String> for Arg {
    fn from(x: String) -> Self {
        Arg::Text(x)
    }
}

/// Named arguments of one command invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Args(BTreeMap<String, Arg>);

impl Args {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with<A: Into<Arg>>(mut self, name: &str, arg: A) -> Self {
        self.set(name, arg);
        self
    }

    pub fn set<A: Into<Arg>>(&mut self, name: &str, arg: A) {
        self.0.insert(name.to_string(), arg.into());
    }

    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|x| x.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `name=value` pairs as given on the command line.
    pub fn parse_pairs<'a, I: IntoIterator<Item = &'a str>>(pairs: I) -> crate::Result<Self> {
        let mut ret = Args::new();
        for pair in pairs {
            let mut split = pair.splitn(2, '=');
            match (split.next(), split.next()) {
                (Some(name), Some(value)) if !name.trim().is_empty() => {
                    ret.set(name.trim(), Arg::parse(value))
                }
                _ => {
                    return Err(Error::argument(anyhow!(
                        "Expected `name=value`, got `{}`",
                        pair
                    )))
                }
            }
        }
        Ok(ret)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParamKind {
    Number,
    Integer,
    Text,
    Choice { table: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Arg>,
}

impl Param {
    fn new(name: &str, kind: ParamKind) -> Self {
        Param {
            name: name.to_string(),
            kind,
            default: None,
        }
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, ParamKind::Number)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, ParamKind::Integer)
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, ParamKind::Text)
    }

    pub fn choice(name: &str, table: &str) -> Self {
        Self::new(
            name,
            ParamKind::Choice {
                table: table.to_string(),
            },
        )
    }

    pub fn default<A: Into<Arg>>(mut self, arg: A) -> Self {
        self.default = Some(arg.into());
        self
    }

    fn value<'a>(&'a self, args: &'a Args) -> crate::Result<&'a Arg> {
        args.get(&self.name)
            .or_else(|| self.default.as_ref())
            .ok_or_else(|| Error::argument(anyhow!("Missing argument `{}`", self.name)))
    }

    fn invalid(&self, arg: &Arg) -> Error {
        Error::argument(anyhow!("Invalid value `{}` for `{}`", arg, self.name))
    }

    /// Text substituted for this parameter and whether it may contain placeholders.
    fn resolve(&self, profile: &Profile, args: &Args) -> crate::Result<(String, bool)> {
        let arg = self.value(args)?;
        match &self.kind {
            ParamKind::Number => {
                let value = match arg {
                    Arg::Index(x) => *x as f64,
                    Arg::Number(x) => *x,
                    Arg::Text(x) => x.trim().parse::<f64>().map_err(|_| self.invalid(arg))?,
                };
                if !value.is_finite() {
                    return Err(self.invalid(arg));
                }
                Ok((value.to_string(), false))
            }
            ParamKind::Integer => {
                let value = match arg {
                    Arg::Index(x) => *x as i64,
                    Arg::Number(x) if x.fract() == 0.0 => *x as i64,
                    Arg::Number(_) => return Err(self.invalid(arg)),
                    Arg::Text(x) => x.trim().parse::<i64>().map_err(|_| self.invalid(arg))?,
                };
                Ok((value.to_string(), false))
            }
            ParamKind::Text => Ok((arg.to_string(), false)),
            ParamKind::Choice { table } => {
                let table = profile.table(table)?;
                let (_, entry) = table.lookup(&self.name, arg)?;
                Ok((entry.literal().to_string(), true))
            }
        }
    }
}

/// Command text with `{name}` placeholders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub text: String,
    #[serde(default)]
    pub params: Vec<Param>,
}

impl Template {
    pub fn new(text: &str, params: Vec<Param>) -> Self {
        Template {
            text: text.to_string(),
            params,
        }
    }

    fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|x| x.name == name)
    }

    fn render(
        &self,
        profile: &Profile,
        args: &Args,
        mut values: HashMap<String, String>,
    ) -> crate::Result<String> {
        let mut nested = Vec::new();
        for param in &self.params {
            let (value, is_choice) = param.resolve(profile, args)?;
            if is_choice && value.contains('{') {
                nested.push(param.name.clone());
            }
            values.insert(param.name.clone(), value);
        }
        for name in nested {
            let raw = values.get(&name).cloned().unwrap_or_default();
            let expanded = strfmt(&raw, &values).map_err(|err| {
                Error::internal(anyhow!("Cannot expand `{}` of `{}`: {}", raw, name, err))
            })?;
            values.insert(name, expanded);
        }
        strfmt(&self.text, &values)
            .map_err(|err| Error::internal(anyhow!("Cannot render `{}`: {}", self.text, err)))
    }
}

/// How the reply of a command is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// The command is written, nothing is read back.
    None,
    Float,
    FloatList,
    Integer,
    Text,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub label: String,
    pub template: Template,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Form {
    Single(Template),
    /// The template is picked by the value of a choice parameter, whose literal
    /// is available to the variants under the parameter name.
    Tagged { tag: Param, variants: Vec<Variant> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub summary: String,
    pub reply: Reply,
    pub form: Form,
}

impl Command {
    pub fn write(name: &str, summary: &str, template: Template) -> Self {
        Command {
            name: name.to_string(),
            summary: summary.to_string(),
            reply: Reply::None,
            form: Form::Single(template),
        }
    }

    pub fn query(name: &str, summary: &str, reply: Reply, template: Template) -> Self {
        Command {
            name: name.to_string(),
            summary: summary.to_string(),
            reply,
            form: Form::Single(template),
        }
    }

    /// A parameterless query.
    pub fn measure(name: &str, summary: &str, reply: Reply, text: &str) -> Self {
        Self::query(name, summary, reply, Template::new(text, vec![]))
    }

    pub fn tagged(name: &str, summary: &str, tag: Param, variants: Vec<(&str, Template)>) -> Self {
        Command {
            name: name.to_string(),
            summary: summary.to_string(),
            reply: Reply::None,
            form: Form::Tagged {
                tag,
                variants: variants
                    .into_iter()
                    .map(|(label, template)| Variant {
                        label: label.to_string(),
                        template,
                    })
                    .collect(),
            },
        }
    }

    fn knows(&self, name: &str) -> bool {
        match &self.form {
            Form::Single(template) => template.has_param(name),
            Form::Tagged { tag, variants } => {
                tag.name == name || variants.iter().any(|x| x.template.has_param(name))
            }
        }
    }

    /// Names of all parameters, in declaration order and without duplicates.
    pub fn param_names(&self) -> Vec<&str> {
        let mut ret: Vec<&str> = Vec::new();
        match &self.form {
            Form::Single(template) => {
                ret.extend(template.params.iter().map(|x| x.name.as_str()));
            }
            Form::Tagged { tag, variants } => {
                ret.push(&tag.name);
                for param in variants.iter().flat_map(|x| x.template.params.iter()) {
                    if !ret.contains(&param.name.as_str()) {
                        ret.push(&param.name);
                    }
                }
            }
        }
        ret
    }

    pub fn render(&self, profile: &Profile, args: &Args) -> crate::Result<String> {
        if let Some(unknown) = args.names().find(|x| !self.knows(x)) {
            return Err(Error::argument(anyhow!(
                "`{}` has no parameter `{}`, expected one of {:?}",
                self.name,
                unknown,
                self.param_names()
            )));
        }
        match &self.form {
            Form::Single(template) => template.render(profile, args, HashMap::new()),
            Form::Tagged { tag, variants } => {
                let table = match &tag.kind {
                    ParamKind::Choice { table } => profile.table(table)?,
                    _ => {
                        return Err(Error::internal(anyhow!(
                            "Tag `{}` of `{}` is not a choice",
                            tag.name,
                            self.name
                        )))
                    }
                };
                let (_, entry) = table.lookup(&tag.name, tag.value(args)?)?;
                let variant = variants
                    .iter()
                    .find(|x| x.label.eq_ignore_ascii_case(&entry.label))
                    .ok_or_else(|| {
                        Error::argument(anyhow!(
                            "`{}` does not support `{}` {}",
                            self.name,
                            tag.name,
                            entry.label
                        ))
                    })?;
                let mut values = HashMap::new();
                values.insert(tag.name.clone(), entry.literal().to_string());
                variant.template.render(profile, args, values)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    PowerSupply,
    ElectronicLoad,
    Multimeter,
    Oscilloscope,
}

/// Screenshot transfer through the instrument file system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hardcopy {
    pub remote_path: String,
    pub max_bytes: usize,
}

fn default_reset() -> Vec<String> {
    vec![RESET.to_string(), DEFAULT_SETUP.to_string()]
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub vendor: String,
    pub model: String,
    pub kind: InstrumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub reset_on_open: bool,
    #[serde(default = "default_reset")]
    pub reset: Vec<String>,
    #[serde(default)]
    pub tables: Vec<OptionTable>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardcopy: Option<Hardcopy>,
}

impl Profile {
    pub fn new(name: &str, vendor: &str, model: &str, kind: InstrumentKind) -> Self {
        Profile {
            name: name.to_string(),
            aliases: Vec::new(),
            vendor: vendor.to_string(),
            model: model.to_string(),
            kind,
            timeout_ms: None,
            reset_on_open: true,
            reset: default_reset(),
            tables: Vec::new(),
            commands: Vec::new(),
            hardcopy: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout_ms = Some(timeout);
        self
    }

    pub fn reset_on_open(mut self, reset: bool) -> Self {
        self.reset_on_open = reset;
        self
    }

    pub fn table(&self, name: &str) -> crate::Result<&OptionTable> {
        self.tables
            .iter()
            .find(|x| x.name == name)
            .ok_or_else(|| Error::internal(anyhow!("Profile `{}` has no table `{}`", self.name, name)))
    }

    pub fn with_table(mut self, table: OptionTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_hardcopy(mut self, remote_path: &str, max_bytes: usize) -> Self {
        self.hardcopy = Some(Hardcopy {
            remote_path: remote_path.to_string(),
            max_bytes,
        });
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn command(&self, name: &str) -> crate::Result<&Command> {
        self.commands
            .iter()
            .find(|x| x.name == name)
            .ok_or_else(|| Error::argument(anyhow!("`{}` has no command `{}`", self.name, name)))
    }

    /// Render the wire text of `command`. Pure, nothing is sent.
    pub fn render(&self, command: &str, args: &Args) -> crate::Result<String> {
        self.command(command)?.render(self, args)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|x| x.eq_ignore_ascii_case(name))
    }

    /// Check that every choice refers to a known table, every default is valid
    /// and every placeholder is declared.
    pub fn validate(&self) -> crate::Result<()> {
        for command in &self.commands {
            let templates: Vec<(&Template, Option<&Param>)> = match &command.form {
                Form::Single(template) => vec![(template, None)],
                Form::Tagged { tag, variants } => {
                    variants.iter().map(|x| (&x.template, Some(tag))).collect()
                }
            };
            for (template, tag) in templates {
                let mut values = HashMap::new();
                if let Some(tag) = tag {
                    values.insert(tag.name.clone(), String::new());
                }
                for param in tag.into_iter().chain(template.params.iter()) {
                    if let ParamKind::Choice { table } = &param.kind {
                        let table = self.table(table)?;
                        if let Some(default) = &param.default {
                            table.lookup(&param.name, default)?;
                        }
                        for entry in &table.entries {
                            if entry.literal().contains('{') {
                                let mut trial = values.clone();
                                for p in &template.params {
                                    trial.insert(p.name.clone(), String::new());
                                }
                                strfmt(entry.literal(), &trial).map_err(|err| {
                                    Error::internal(anyhow!(
                                        "`{}` of `{}`: {}",
                                        entry.label,
                                        command.name,
                                        err
                                    ))
                                })?;
                            }
                        }
                    }
                    values.insert(param.name.clone(), String::new());
                }
                strfmt(&template.text, &values).map_err(|err| {
                    Error::internal(anyhow!("`{}` of `{}`: {}", template.text, command.name, err))
                })?;
            }
        }
        Ok(())
    }

    /// Load a profile from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let ret: Profile = serde_json::from_str(&data).map_err(|err| {
            Error::argument(anyhow!("Cannot parse `{}`: {}", path.as_ref().display(), err))
        })?;
        ret.validate()?;
        Ok(ret)
    }
}
