use crate::error::{Error, Result};

/// A database-agnostic parameter or column value.
///
/// Adapters bind these positionally to driver-native query arguments and
/// decode result columns back into them, so callers never touch
/// driver-specific value types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Short name of the variant, used in decode error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// Builds a `Vec<SqlValue>` from a list of bindable values.
///
/// # Examples
///
/// ```rust
/// use sqlx_tx_context::{params, SqlValue};
///
/// let args = params!["John Doe", 1];
/// assert_eq!(args, vec![SqlValue::Text("John Doe".into()), SqlValue::Int(1)]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::SqlValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::SqlValue::from($value)),+]
    };
}

/// A destination that a row column can be scanned into.
///
/// Implemented for the primitive types [`SqlValue`] can carry, and for
/// `Option<T>` of those to accept SQL `NULL`. This is the positional
/// out-parameter half of the cursor contract: `rows.scan(&mut [&mut dest])`.
pub trait ScanTarget {
    /// Assigns `value` into `self`, failing on a type mismatch.
    fn assign(&mut self, value: &SqlValue) -> Result<()>;
}

fn mismatch(expected: &'static str, value: &SqlValue) -> Error {
    Error::Decode(format!("expected {expected}, got {}", value.kind()))
}

impl ScanTarget for bool {
    fn assign(&mut self, value: &SqlValue) -> Result<()> {
        match value {
            SqlValue::Bool(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("bool", other)),
        }
    }
}

impl ScanTarget for i64 {
    fn assign(&mut self, value: &SqlValue) -> Result<()> {
        match value {
            SqlValue::Int(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("int", other)),
        }
    }
}

impl ScanTarget for i32 {
    fn assign(&mut self, value: &SqlValue) -> Result<()> {
        match value {
            SqlValue::Int(v) => {
                *self = i32::try_from(*v)
                    .map_err(|_| Error::Decode(format!("value {v} out of range for i32")))?;
                Ok(())
            }
            other => Err(mismatch("int", other)),
        }
    }
}

impl ScanTarget for f64 {
    fn assign(&mut self, value: &SqlValue) -> Result<()> {
        match value {
            SqlValue::Float(v) => {
                *self = *v;
                Ok(())
            }
            // Integer-typed columns are accepted where a float is expected.
            SqlValue::Int(v) => {
                *self = *v as f64;
                Ok(())
            }
            other => Err(mismatch("float", other)),
        }
    }
}

impl ScanTarget for String {
    fn assign(&mut self, value: &SqlValue) -> Result<()> {
        match value {
            SqlValue::Text(v) => {
                v.clone_into(self);
                Ok(())
            }
            other => Err(mismatch("text", other)),
        }
    }
}

impl<T> ScanTarget for Option<T>
where
    T: ScanTarget + Default,
{
    fn assign(&mut self, value: &SqlValue) -> Result<()> {
        match value {
            SqlValue::Null => {
                *self = None;
                Ok(())
            }
            other => {
                let mut inner = T::default();
                inner.assign(other)?;
                *self = Some(inner);
                Ok(())
            }
        }
    }
}

/// Assigns a decoded row into positional destinations, enforcing the count
/// contract. Shared by the adapters' cursor implementations.
pub(crate) fn assign_row(values: &[SqlValue], dest: &mut [&mut dyn ScanTarget]) -> Result<()> {
    if dest.len() != values.len() {
        return Err(Error::ScanCount {
            destinations: dest.len(),
            columns: values.len(),
        });
    }
    for (target, value) in dest.iter_mut().zip(values) {
        target.assign(value)?;
    }
    Ok(())
}
