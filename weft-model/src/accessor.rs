use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use weft_dtype::{FieldType, Nullability, PType};
use weft_scalar::{PValue, Value};

/// Reads a fixed-width value of a record that can never be absent.
pub enum PrimitiveAccessor<T> {
    Bool(fn(&T) -> bool),
    I8(fn(&T) -> i8),
    I16(fn(&T) -> i16),
    I32(fn(&T) -> i32),
    I64(fn(&T) -> i64),
    F32(fn(&T) -> f32),
    F64(fn(&T) -> f64),
}

impl<T> PrimitiveAccessor<T> {
    /// The column type the accessor produces, always not-null.
    pub fn field_type(&self) -> FieldType {
        let n = Nullability::NonNullable;
        match self {
            Self::Bool(_) => FieldType::Bool(n),
            Self::I8(_) => FieldType::Primitive(PType::I8, n),
            Self::I16(_) => FieldType::Primitive(PType::I16, n),
            Self::I32(_) => FieldType::Primitive(PType::I32, n),
            Self::I64(_) => FieldType::Primitive(PType::I64, n),
            Self::F32(_) => FieldType::Primitive(PType::F32, n),
            Self::F64(_) => FieldType::Primitive(PType::F64, n),
        }
    }

    pub fn get(&self, record: &T) -> Value {
        match self {
            Self::Bool(f) => Value::Bool(f(record)),
            Self::I8(f) => Value::Primitive(PValue::I8(f(record))),
            Self::I16(f) => Value::Primitive(PValue::I16(f(record))),
            Self::I32(f) => Value::Primitive(PValue::I32(f(record))),
            Self::I64(f) => Value::Primitive(PValue::I64(f(record))),
            Self::F32(f) => Value::Primitive(PValue::F32(f(record))),
            Self::F64(f) => Value::Primitive(PValue::F64(f(record))),
        }
    }
}

impl<T> Clone for PrimitiveAccessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PrimitiveAccessor<T> {}

/// Closure reading a value out of a record, for columns only known at runtime.
pub type ClosureAccessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// How a write field obtains its value from a record.
pub enum Accessor<T> {
    /// A function pointer, used by declarative models
    Fn(fn(&T) -> Value),
    /// A shared closure
    Closure(ClosureAccessor<T>),
    /// An accessor returning an unboxed primitive
    Primitive(PrimitiveAccessor<T>),
}

impl<T> Accessor<T> {
    pub fn get(&self, record: &T) -> Value {
        match self {
            Self::Fn(f) => f(record),
            Self::Closure(f) => f(record),
            Self::Primitive(p) => p.get(record),
        }
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fn(f) => Self::Fn(*f),
            Self::Closure(f) => Self::Closure(f.clone()),
            Self::Primitive(p) => Self::Primitive(*p),
        }
    }
}

impl<T> Debug for Accessor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fn(_) => write!(f, "Accessor::Fn"),
            Self::Closure(_) => write!(f, "Accessor::Closure"),
            Self::Primitive(p) => write!(f, "Accessor::Primitive({})", p.field_type()),
        }
    }
}
