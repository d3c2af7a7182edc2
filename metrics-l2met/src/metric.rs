use std::{fmt, str::FromStr};

use crate::DrainError;

/// Metric kind.
///
/// The kind fully determines what the value of a [`Metric`] means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// A monotonic delta, usually `1`.
    Count,

    /// A point-in-time value, such as the number of open connections.
    Sample,

    /// A point-in-time measurement, such as the duration of a request.
    Measure,
}

impl MetricKind {
    /// Gets the name of this kind as it appears in the l2met format.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Count => "count",
            MetricKind::Sample => "sample",
            MetricKind::Measure => "measure",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = DrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(MetricKind::Count),
            "sample" => Ok(MetricKind::Sample),
            "measure" => Ok(MetricKind::Measure),
            other => Err(DrainError::InvalidMetricType { kind: other.to_owned() }),
        }
    }
}

/// The value of a metric.
///
/// Any scalar that renders as text can be a value. Backends that only understand integers coerce
/// it with [`Value::as_i64`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A signed integer.
    Signed(i64),

    /// An unsigned integer.
    Unsigned(u64),

    /// A floating-point number.
    Float(f64),

    /// A single-precision floating-point number, kept at its own width so it renders with the
    /// shortest representation of an `f32`.
    Float32(f32),

    /// Free-form text.
    Text(String),
}

impl Value {
    /// Coerces this value to a signed 64-bit integer.
    ///
    /// # Errors
    ///
    /// If the value is an unsigned integer larger than `i64::MAX`, [`DrainError::ValueOverflow`] is
    /// returned. If the value is not an integer at all, [`DrainError::ValueInvalid`] is returned.
    pub fn as_i64(&self) -> Result<i64, DrainError> {
        match self {
            Value::Signed(v) => Ok(*v),
            Value::Unsigned(v) => {
                i64::try_from(*v).map_err(|_| DrainError::ValueOverflow { value: *v })
            }
            Value::Float(_) | Value::Float32(_) | Value::Text(_) => {
                Err(DrainError::ValueInvalid { value: self.clone() })
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Signed(v) => write!(f, "{}", v),
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::Float(v) => write_float(f, *v, *v),
            Value::Float32(v) => write_float(f, *v, f64::from(*v)),
            Value::Text(v) => f.write_str(v),
        }
    }
}

// Shortest representation, switching to exponent form (`1e+21`, `1e-07`) outside of
// `1e-4 <= |v| < 1e21`.
fn write_float<T>(f: &mut fmt::Formatter<'_>, v: T, wide: f64) -> fmt::Result
where
    T: fmt::Display + fmt::LowerExp,
{
    if wide.is_nan() {
        return f.write_str("NaN");
    }
    if wide.is_infinite() {
        return f.write_str(if wide > 0.0 { "+Inf" } else { "-Inf" });
    }
    if wide == 0.0 {
        return write!(f, "{}", v);
    }

    let sci = format!("{:e}", v);
    match sci.split_once('e').map(|(m, e)| (m, e.parse::<i32>())) {
        Some((mantissa, Ok(exp))) if !(-4..21).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
        }
        _ => write!(f, "{}", v),
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from_int!(Signed, i64, i8, i16, i32, i64, isize);
impl_from_int!(Unsigned, u64, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// A single count, sample, or measurement.
///
/// A metric is created once per observation and handed, by value, to exactly one drainer.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    name: String,
    kind: MetricKind,
    value: Value,
    units: String,
}

impl Metric {
    /// Creates a new `Metric`.
    pub fn new<N, V, U>(kind: MetricKind, name: N, value: V, units: U) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
        U: Into<String>,
    {
        Metric { name: name.into(), kind, value: value.into(), units: units.into() }
    }

    /// Creates a count metric.
    pub fn count<N: Into<String>, V: Into<Value>>(name: N, value: V) -> Self {
        Self::new(MetricKind::Count, name, value, String::new())
    }

    /// Creates a sample metric.
    pub fn sample<N, V, U>(name: N, value: V, units: U) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
        U: Into<String>,
    {
        Self::new(MetricKind::Sample, name, value, units)
    }

    /// Creates a measure metric.
    pub fn measure<N, V, U>(name: N, value: V, units: U) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
        U: Into<String>,
    {
        Self::new(MetricKind::Measure, name, value, units)
    }

    /// Name of the metric, e.g. `request.time.2xx`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the metric.
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Value of the metric.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Units of the metric, possibly empty.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Consumes this metric, returning its name, kind, value, and units.
    pub fn into_parts(self) -> (String, MetricKind, Value, String) {
        (self.name, self.kind, self.value, self.units)
    }
}

/// Renders the metric in l2met format, without any source prefix.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}={}{}", self.kind, self.name, self.value, self.units)
    }
}
