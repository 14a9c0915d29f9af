use std::collections::BTreeMap;

/// A scalar value bound to a placeholder or read back from a column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            Value::Text(v) => Some(v.as_bytes()),
            _ => None,
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
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

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A bind value before list expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Value(Value),
    /// Expanded into one placeholder per element, for `IN (:name)` predicates.
    List(Vec<Value>),
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Param::Value(v)
    }
}

impl From<Vec<Value>> for Param {
    fn from(v: Vec<Value>) -> Self {
        Param::List(v)
    }
}

/// Named bind parameters as supplied by the caller.
///
/// Names are stored without the leading `:`, so `":id"` and `"id"` refer to the same entry.
///
/// ```
/// use sqlx_pdo_driver::{Param, Params, Value};
///
/// let params = Params::new()
///     .bind(":status", "active")
///     .bind_list("ids", [1, 2, 3]);
///
/// assert_eq!(params.get("status"), Some(&Param::Value(Value::from("active"))));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a scalar value.
    pub fn bind(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.insert(name, Param::Value(value.into()));
        self
    }

    /// Binds a list, expanded to `:name_0, :name_1, ...` before the statement is prepared.
    pub fn bind_list<I, V>(mut self, name: impl AsRef<str>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert(name, Param::List(values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn insert(&mut self, name: impl AsRef<str>, param: impl Into<Param>) -> Option<Param> {
        self.0.insert(normalize_name(name.as_ref()), param.into())
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0.get(normalize_name(name).as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Param)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, P: Into<Param>> FromIterator<(K, P)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, param) in iter {
            params.insert(name, param);
        }
        params
    }
}

impl From<Bindings> for Params {
    fn from(bindings: Bindings) -> Self {
        bindings.into_iter().collect()
    }
}

/// Scalar bindings after list expansion, keyed by placeholder name. The leading `:` is optional.
pub type Bindings = BTreeMap<String, Value>;

pub(crate) fn normalize_name(name: &str) -> String {
    name.strip_prefix(':').unwrap_or(name).to_owned()
}

/// One result row; columns keep the order the driver returned them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.columns.push((column.into(), value));
    }

    /// Looks a column up by name; the first match wins when names repeat.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Summary of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub last_insert_id: i64,
    pub row_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_strip_leading_colon() {
        let params = Params::new().bind(":id", 42);
        assert_eq!(params.get("id"), Some(&Param::Value(Value::Int(42))));
        assert_eq!(params.get(":id"), Some(&Param::Value(Value::Int(42))));
    }

    #[test]
    fn test_params_rebind_replaces() {
        let params = Params::new().bind("id", 1).bind("id", 2);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some(&Param::Value(Value::Int(2))));
    }

    #[test]
    fn test_bind_list_keeps_order() {
        let params = Params::new().bind_list("ids", [3, 1, 2]);
        assert_eq!(
            params.get("ids"),
            Some(&Param::List(vec![Value::Int(3), Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn test_option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn test_row_lookup_by_name() {
        let row: Row = [("id", Value::Int(1)), ("name", Value::from("Alice"))]
            .into_iter()
            .collect();

        assert_eq!(row.get("name").and_then(Value::as_str), Some("Alice"));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
    }
}
