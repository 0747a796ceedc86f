//! Repairing validator for sound parameters
//!
//! Never fails: any field of the wrong type or outside its domain falls back
//! to its default, and every such substitution is logged and reported.

use super::{Harmonizer, SoundParameters, FIELD_NAMES, VECTOR_LEN};
use crate::synth::Waveform;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Why a field was replaced by its default
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepairReason {
    #[error("expected {expected}, found {found}")]
    WrongType { expected: &'static str, found: &'static str },

    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("unknown waveform '{0}'")]
    UnknownWaveform(String),

    #[error("missing")]
    Missing,

    #[error("vector has {len} elements, expected 14")]
    ShortVector { len: usize },

    #[error("expected a parameter vector or record, found {found}")]
    NotParameters { found: &'static str },
}

/// A single substitution made while validating
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    /// Field name, or `"parameters"` when the whole input was replaced
    pub field: &'static str,
    pub reason: RepairReason,
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Validated parameters plus the repairs it took to get them
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub params: SoundParameters,
    pub repairs: Vec<Repair>,
}

impl Validation {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }

    fn defaults(repair: Repair) -> Self {
        log::warn!(target: "params", "{}, using default parameters", repair);
        Self {
            params: SoundParameters::default(),
            repairs: vec![repair],
        }
    }
}

/// Closed numeric domain with its fallback
struct Domain {
    min: f64,
    max: f64,
    default: f64,
}

const FREQUENCY: Domain = Domain { min: 20.0, max: 2000.0, default: 440.0 };
const DURATION: Domain = Domain { min: 50.0, max: 2000.0, default: 200.0 };
const MOD_FREQUENCY: Domain = Domain { min: 0.1, max: 20.0, default: 5.0 };
const MOD_DEPTH: Domain = Domain { min: 0.0, max: 100.0, default: 20.0 };
const FILTER_FREQUENCY: Domain = Domain { min: 20.0, max: 5000.0, default: 1000.0 };
const FILTER_RESONANCE: Domain = Domain { min: 0.0, max: 20.0, default: 1.0 };
const CHAOS: Domain = Domain { min: 0.0, max: 10.0, default: 0.0 };
const OCTAVE: Domain = Domain { min: 0.0, max: 100.0, default: 50.0 };
const FIFTH: Domain = Domain { min: 0.0, max: 100.0, default: 30.0 };
const THIRD: Domain = Domain { min: 0.0, max: 100.0, default: 20.0 };

/// Validate a vector, a record, or anything else
pub fn validate(value: &Value) -> Validation {
    match value {
        Value::Array(values) => validate_vector(values),
        Value::Object(record) => validate_record(record),
        other => Validation::defaults(Repair {
            field: "parameters",
            reason: RepairReason::NotParameters { found: type_name(other) },
        }),
    }
}

/// Validate a positional vector.
///
/// Vectors shorter than [`VECTOR_LEN`] are discarded wholesale in favour of the
/// default parameters. Extra trailing elements are ignored.
pub fn validate_vector(values: &[Value]) -> Validation {
    if values.len() < VECTOR_LEN {
        return Validation::defaults(Repair {
            field: "parameters",
            reason: RepairReason::ShortVector { len: values.len() },
        });
    }
    build(|index| values.get(index))
}

/// Validate a record keyed by field name
pub fn validate_record(record: &Map<String, Value>) -> Validation {
    build(|index| record.get(FIELD_NAMES[index]))
}

fn build<'a>(lookup: impl Fn(usize) -> Option<&'a Value>) -> Validation {
    let mut fields = Fields { lookup, repairs: Vec::new() };

    let params = SoundParameters {
        waveform: fields.waveform(0),
        frequency: fields.number(1, &FREQUENCY),
        duration_ms: fields.number(2, &DURATION),
        mod_frequency: fields.number(3, &MOD_FREQUENCY),
        mod_depth: fields.number(4, &MOD_DEPTH),
        filter_frequency: fields.number(5, &FILTER_FREQUENCY),
        filter_resonance: fields.number(6, &FILTER_RESONANCE),
        chaos_frequency: fields.number(7, &CHAOS),
        chaos_modulation: fields.number(8, &CHAOS),
        chaos_filter: fields.boolean(9, false),
        harmonizer: Harmonizer {
            enabled: fields.boolean(10, true),
            octave: fields.number(11, &OCTAVE) / 100.0,
            fifth: fields.number(12, &FIFTH) / 100.0,
            third: fields.number(13, &THIRD) / 100.0,
        },
    };

    Validation { params, repairs: fields.repairs }
}

struct Fields<F> {
    lookup: F,
    repairs: Vec<Repair>,
}

impl<'a, F: Fn(usize) -> Option<&'a Value>> Fields<F> {
    fn repair(&mut self, index: usize, reason: RepairReason) {
        let repair = Repair { field: FIELD_NAMES[index], reason };
        log::warn!(target: "params", "{}, using default", repair);
        self.repairs.push(repair);
    }

    fn number(&mut self, index: usize, domain: &Domain) -> f64 {
        let reason = match (self.lookup)(index) {
            None => RepairReason::Missing,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v >= domain.min && v <= domain.max => return v,
                Some(v) => RepairReason::OutOfRange { value: v, min: domain.min, max: domain.max },
                None => RepairReason::WrongType { expected: "number", found: "number" },
            },
            Some(other) => RepairReason::WrongType { expected: "number", found: type_name(other) },
        };
        self.repair(index, reason);
        domain.default
    }

    fn boolean(&mut self, index: usize, default: bool) -> bool {
        let reason = match (self.lookup)(index) {
            None => RepairReason::Missing,
            Some(Value::Bool(b)) => return *b,
            Some(other) => RepairReason::WrongType { expected: "boolean", found: type_name(other) },
        };
        self.repair(index, reason);
        default
    }

    fn waveform(&mut self, index: usize) -> Waveform {
        let reason = match (self.lookup)(index) {
            None => RepairReason::Missing,
            Some(Value::String(s)) => match s.parse() {
                Ok(waveform) => return waveform,
                Err(_) => RepairReason::UnknownWaveform(s.clone()),
            },
            Some(other) => RepairReason::WrongType { expected: "string", found: type_name(other) },
        };
        self.repair(index, reason);
        Waveform::default()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
