#![forbid(unsafe_code)]

//! Container-keyed sizer instances and by-name method dispatch.
//!
//! Hosts identify a container by an opaque [`ContainerKey`]; the registry
//! never stores anything on the container itself. [`SizerRegistry::invoke`]
//! is the dynamic front door: it parses a method name, checks argument
//! shapes and answers with JSON.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use serde_json::Value;

use flexgrid_core::{CellHost, CellId, ChangeEvent, ContainerKey, SizerOptions};

use crate::error::SizerError;
use crate::method::Method;
use crate::sizer::Sizer;

/// Sizers by container.
#[derive(Debug)]
pub struct SizerRegistry<H: CellHost> {
    sizers: FxHashMap<ContainerKey, Sizer<H>>,
}

impl<H: CellHost> Default for SizerRegistry<H> {
    fn default() -> Self {
        Self {
            sizers: FxHashMap::default(),
        }
    }
}

impl<H: CellHost> SizerRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the sizer for `key`.
    ///
    /// A container that already has a sizer keeps it unchanged; `host` and
    /// `options` are dropped in that case.
    pub fn init(
        &mut self,
        key: ContainerKey,
        host: H,
        options: SizerOptions,
    ) -> Result<&mut Sizer<H>, SizerError> {
        match self.sizers.entry(key) {
            Entry::Occupied(entry) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(container = key.0, "already initialized");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let sizer = Sizer::init(key, host, options)?;
                Ok(entry.insert(sizer))
            }
        }
    }

    /// Initialize from a JSON options object.
    pub fn init_json(
        &mut self,
        key: ContainerKey,
        host: H,
        options: Value,
    ) -> Result<&mut Sizer<H>, SizerError> {
        let options = SizerOptions::from_value(options)?;
        self.init(key, host, options)
    }

    #[must_use]
    pub fn get(&self, key: ContainerKey) -> Option<&Sizer<H>> {
        self.sizers.get(&key)
    }

    pub fn get_mut(&mut self, key: ContainerKey) -> Option<&mut Sizer<H>> {
        self.sizers.get_mut(&key)
    }

    #[must_use]
    pub fn contains(&self, key: ContainerKey) -> bool {
        self.sizers.contains_key(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sizers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizers.is_empty()
    }

    /// Destroy the sizer for `key` and return its host.
    pub fn destroy(&mut self, key: ContainerKey) -> Option<H> {
        self.sizers.remove(&key).map(Sizer::destroy)
    }

    /// Call a public method by name.
    ///
    /// `init` only succeeds for containers that already have a sizer (it
    /// needs a host, see [`Self::init`]). Results:
    /// - `grid`: array of rows of width strings,
    /// - `width`: width string, or null for an unknown index,
    /// - structural edits: the emitted change event, or null,
    /// - everything else: null.
    pub fn invoke(
        &mut self,
        key: ContainerKey,
        name: &str,
        args: &[Value],
    ) -> Result<Value, SizerError> {
        let method: Method = name.parse()?;
        if method == Method::Destroy {
            return match self.destroy(key) {
                Some(_) => Ok(Value::Null),
                None => Err(SizerError::UnknownContainer { key }),
            };
        }
        let sizer = self
            .sizers
            .get_mut(&key)
            .ok_or(SizerError::UnknownContainer { key })?;

        #[cfg(feature = "tracing")]
        tracing::trace!(container = key.0, method = method.name(), "invoke");
        match method {
            Method::Init | Method::Destroy => Ok(Value::Null),
            Method::Grid => Ok(Value::Array(
                sizer
                    .grid()
                    .into_iter()
                    .map(|row| {
                        Value::Array(
                            row.into_iter()
                                .map(|width| Value::String(width.to_string()))
                                .collect(),
                        )
                    })
                    .collect(),
            )),
            Method::Width => {
                let index = index_arg(method, args, 0)?;
                Ok(sizer
                    .width(index)
                    .map_or(Value::Null, |width| Value::String(width.to_string())))
            }
            Method::InsertBefore => {
                let index = index_arg(method, args, 0)?;
                let cell = cell_arg(method, args, 1)?;
                change_value(sizer.insert_before(index, cell))
            }
            Method::InsertAfter => {
                let index = index_arg(method, args, 0)?;
                let cell = cell_arg(method, args, 1)?;
                change_value(sizer.insert_after(index, cell))
            }
            Method::Detach => change_value(sizer.detach(index_arg(method, args, 0)?)),
            Method::Remove => change_value(sizer.remove(index_arg(method, args, 0)?)),
            Method::Split => change_value(sizer.split(index_arg(method, args, 0)?)),
            Method::Join => change_value(sizer.join(index_arg(method, args, 0)?)),
            Method::Normalize => {
                change_value(sizer.normalize(optional_index_arg(method, args, 0)?))
            }
            Method::Refresh => {
                sizer.refresh();
                Ok(Value::Null)
            }
            Method::Restart => {
                sizer.restart();
                Ok(Value::Null)
            }
        }
    }
}

fn change_value(event: Option<ChangeEvent>) -> Result<Value, SizerError> {
    match event {
        Some(event) => serde_json::to_value(&event).map_err(|err| SizerError::Encode {
            message: err.to_string(),
        }),
        None => Ok(Value::Null),
    }
}

/// JSON type name used in argument errors.
fn json_type(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(n)) if n.is_u64() => "integer",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn unsigned_arg(
    method: Method,
    args: &[Value],
    position: usize,
    expected: &'static str,
) -> Result<u64, SizerError> {
    let value = args.get(position);
    value
        .and_then(Value::as_u64)
        .ok_or_else(|| SizerError::InvalidArgument {
            method: method.name(),
            position,
            expected,
            found: json_type(value),
        })
}

fn index_arg(method: Method, args: &[Value], position: usize) -> Result<usize, SizerError> {
    let raw = unsigned_arg(method, args, position, "a cell index")?;
    usize::try_from(raw).map_err(|_| SizerError::InvalidArgument {
        method: method.name(),
        position,
        expected: "a cell index",
        found: "integer",
    })
}

fn optional_index_arg(
    method: Method,
    args: &[Value],
    position: usize,
) -> Result<Option<usize>, SizerError> {
    match args.get(position) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => index_arg(method, args, position).map(Some),
    }
}

fn cell_arg(method: Method, args: &[Value], position: usize) -> Result<CellId, SizerError> {
    unsigned_arg(method, args, position, "a cell id").map(CellId)
}
