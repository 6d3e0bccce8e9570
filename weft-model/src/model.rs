use std::collections::HashSet;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use log::trace;
use weft_dtype::{FieldName, FieldPath, FieldType, Nullability, RecordFields};
use weft_error::{WeftError, WeftResult, weft_err};
use weft_scalar::{DecimalConfig, TypeContext, Value, marshal};

use crate::accessor::{Accessor, PrimitiveAccessor};
use crate::options::WriteOptions;

/// A host type with a write model.
///
/// Implemented by [`record_model!`](crate::record_model) for declared structs, or by hand on top
/// of [`WriteRecordModel::builder`].
pub trait RecordType: Sized + 'static {
    /// Builds the write model of the type in `ctx`.
    fn write_model(ctx: &TypeContext<'_>) -> WeftResult<WriteRecordModel<Self>>;
}

/// One column of a write model.
pub struct WriteField<T> {
    name: FieldName,
    dtype: FieldType,
    accessor: Accessor<T>,
}

impl<T> WriteField<T> {
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn dtype(&self) -> &FieldType {
        &self.dtype
    }

    pub fn accessor(&self) -> &Accessor<T> {
        &self.accessor
    }
}

impl<T> Debug for WriteField<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteField")
            .field("name", &self.name)
            .field("dtype", &self.dtype)
            .field("accessor", &self.accessor)
            .finish()
    }
}

impl<T> Clone for WriteField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            dtype: self.dtype.clone(),
            accessor: self.accessor.clone(),
        }
    }
}

/// Registers the fields of a write model, in column order.
///
/// The first registration error is kept and reported by [`WriteModelBuilder::build`].
pub struct WriteModelBuilder<T> {
    names: HashSet<FieldName>,
    fields: Vec<WriteField<T>>,
    nullability: Nullability,
    error: Option<WeftError>,
}

impl<T> Debug for WriteModelBuilder<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteModelBuilder")
            .field("fields", &self.fields)
            .field("nullability", &self.nullability)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> Default for WriteModelBuilder<T> {
    fn default() -> Self {
        Self {
            names: HashSet::new(),
            fields: Vec::new(),
            nullability: Nullability::NonNullable,
            error: None,
        }
    }
}

impl<T> WriteModelBuilder<T> {
    fn register(mut self, name: impl Into<FieldName>, dtype: FieldType, accessor: Accessor<T>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        if let Err(err) = dtype.validate() {
            self.error = Some(err.with_context(format!("field {name}")));
            return self;
        }
        if !self.names.insert(name.clone()) {
            self.error = Some(weft_err!(DuplicateField: "field {name} is already defined"));
            return self;
        }
        trace!("registering field {name}: {dtype}");
        self.fields.push(WriteField {
            name,
            dtype,
            accessor,
        });
        self
    }

    /// Adds a field read by a function pointer.
    pub fn with_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> Value) -> Self {
        self.register(name, dtype, Accessor::Fn(f))
    }

    /// Adds a field read by a closure.
    pub fn with_closure_field<F>(self, name: impl Into<FieldName>, dtype: FieldType, f: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.register(name, dtype, Accessor::Closure(Arc::new(f)))
    }

    /// Adds a field read by an accessor that cannot represent absence.
    ///
    /// Fails with `NullabilityMismatch` when `dtype` is nullable and with `SchemaMismatch` when
    /// the accessor produces another type than `dtype`.
    pub fn with_primitive_field(
        mut self,
        name: impl Into<FieldName>,
        dtype: FieldType,
        accessor: PrimitiveAccessor<T>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        if dtype.is_nullable() {
            self.error = Some(weft_err!(
                NullabilityMismatch: "field {name} is read by a primitive accessor so {dtype} must be declared not null"
            ));
            return self;
        }
        if accessor.field_type() != dtype {
            self.error = Some(weft_err!(
                SchemaMismatch: "field {name} is declared as {dtype} but its accessor reads {}",
                accessor.field_type()
            ));
            return self;
        }
        self.register(name, dtype, Accessor::Primitive(accessor))
    }

    pub fn with_bool_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> bool) -> Self {
        self.with_primitive_field(name, dtype, PrimitiveAccessor::Bool(f))
    }

    pub fn with_i8_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> i8) -> Self {
        self.with_primitive_field(name, dtype, PrimitiveAccessor::I8(f))
    }

    pub fn with_i16_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> i16) -> Self {
        self.with_primitive_field(name, dtype, PrimitiveAccessor::I16(f))
    }

    pub fn with_i32_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> i32) -> Self {
        self.with_primitive_field(name, dtype, PrimitiveAccessor::I32(f))
    }

    pub fn with_i64_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> i64) -> Self {
        self.with_primitive_field(name, dtype, PrimitiveAccessor::I64(f))
    }

    pub fn with_f32_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> f32) -> Self {
        self.with_primitive_field(name, dtype, PrimitiveAccessor::F32(f))
    }

    pub fn with_f64_field(self, name: impl Into<FieldName>, dtype: FieldType, f: fn(&T) -> f64) -> Self {
        self.with_primitive_field(name, dtype, PrimitiveAccessor::F64(f))
    }

    /// Marks the record itself as not null. This is the default.
    pub fn not_null(mut self) -> Self {
        self.nullability = Nullability::NonNullable;
        self
    }

    /// Marks the record itself as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullability = Nullability::Nullable;
        self
    }

    pub fn build(self) -> WeftResult<WriteRecordModel<T>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let record: RecordFields = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.dtype.clone()))
            .collect();
        Ok(WriteRecordModel {
            dtype: FieldType::Record(record, self.nullability),
            fields: self.fields.into(),
        })
    }
}

/// The immutable mapping from a host record to a record column.
pub struct WriteRecordModel<T> {
    dtype: FieldType,
    fields: Arc<[WriteField<T>]>,
}

impl<T> Debug for WriteRecordModel<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteRecordModel")
            .field("dtype", &self.dtype)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T> Clone for WriteRecordModel<T> {
    fn clone(&self) -> Self {
        Self {
            dtype: self.dtype.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<T> WriteRecordModel<T> {
    pub fn builder() -> WriteModelBuilder<T> {
        WriteModelBuilder::default()
    }

    /// The record type produced by the model.
    pub fn field_type(&self) -> &FieldType {
        &self.dtype
    }

    pub fn fields(&self) -> &[WriteField<T>] {
        &self.fields
    }

    /// The raw values of `record`, before marshaling.
    pub fn to_value(&self, record: &T) -> Value {
        Value::Record(self.fields.iter().map(|f| f.accessor.get(record)).collect())
    }

    /// Reads and marshals every field of `record`, in column order.
    pub fn marshal(&self, record: &T, decimals: &DecimalConfig) -> WeftResult<Vec<Value>> {
        self.fields
            .iter()
            .map(|f| marshal(f.accessor.get(record), &f.dtype, decimals, &FieldPath::from_name(f.name.as_ref())))
            .collect()
    }
}

impl<T: RecordType> WriteRecordModel<T> {
    /// The model of a host type, built with `options`.
    pub fn of(options: &WriteOptions) -> WeftResult<Self> {
        T::write_model(&options.type_context())
    }
}
