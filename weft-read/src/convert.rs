use std::sync::Arc;

use log::warn;
use weft_dtype::{Field, FieldPath};
use weft_error::{ContextExt, WeftResult, weft_bail, weft_err};
use weft_scalar::{Value, ValueErrorMode, convert_timestamp, from_integer, rescale};

use crate::plan::{Conversion, RecordPlan, ValuePlan};

/// Applies the plan of a record to the values handed to it, producing values in requested order.
pub(crate) fn convert_record(
    values: &[Value],
    plan: &RecordPlan,
    mode: ValueErrorMode,
    path: &FieldPath,
) -> WeftResult<Vec<Value>> {
    plan.entries()
        .iter()
        .map(|entry| {
            let value = entry
                .input_index()
                .and_then(|idx| values.get(idx))
                .cloned()
                .unwrap_or(Value::Null);
            convert_value(value, entry.plan(), mode, &path.child(&**entry.name()))
        })
        .collect()
}

/// Converts one stored value, substituting value errors when `mode` is
/// [`ValueErrorMode::NullOnError`].
pub(crate) fn convert_value(
    value: Value,
    plan: &ValuePlan,
    mode: ValueErrorMode,
    path: &FieldPath,
) -> WeftResult<Value> {
    match convert_strict(value, plan, mode, path) {
        Err(err) if mode == ValueErrorMode::NullOnError && err.is_value_error() => {
            let target = plan.target();
            let substitute = if target.is_nullable() {
                Value::Null
            } else if target.is_primitive() {
                Value::zero(target)
            } else {
                return Err(err);
            };
            warn!("reading {path}: {}, substituting {substitute}", err.root());
            Ok(substitute)
        }
        result => result,
    }
}

fn convert_strict(
    value: Value,
    plan: &ValuePlan,
    mode: ValueErrorMode,
    path: &FieldPath,
) -> WeftResult<Value> {
    if value.is_null() {
        if plan.null_check() {
            weft_bail!(UnexpectedNull: "{path} is null but {} is not nullable", plan.target());
        }
        return Ok(Value::Null);
    }

    Ok(match (plan.conversion(), value) {
        (Conversion::Identity, value) => value,
        (Conversion::Reject, _) => Value::Null,
        (Conversion::Widen(ptype) | Conversion::Narrow(ptype), Value::Primitive(p)) => {
            Value::Primitive(
                p.try_cast(*ptype)
                    .with_context(|| format!("reading {path}"))?,
            )
        }
        (Conversion::DecimalRescale { target, checked }, value) => {
            let converted = match &value {
                Value::Decimal(d) => rescale(*d, target, None),
                Value::Primitive(p) if p.is_int() => p
                    .as_i64()
                    .ok_or_else(|| weft_err!(AssertionFailed: "integer {p} is not an i64"))
                    .and_then(|i| from_integer(i, target)),
                other => weft_bail!(SchemaMismatch: "{path}: cannot rescale a {} value", other.kind()),
            };
            Value::Decimal(converted.map_err(|e| {
                if *checked && e.is_value_error() {
                    weft_err!(NarrowingConversion: "{path}: {value} does not fit {target}")
                } else {
                    e.with_context(format!("reading {path}"))
                }
            })?)
        }
        (Conversion::TemporalUnitConvert { from, to }, Value::Timestamp(ts)) => Value::Timestamp(
            convert_timestamp(ts, *from, *to)
                .with_context(|| format!("reading {path}"))?,
        ),
        (Conversion::Record(record), Value::Record(values)) => {
            Value::Record(convert_record(&values, record, mode, path)?.into())
        }
        (Conversion::List(element), Value::List(items)) => {
            let element_path = path.child(Field::Element);
            Value::List(
                items
                    .iter()
                    .map(|item| convert_value(item.clone(), element, mode, &element_path))
                    .collect::<WeftResult<Arc<[_]>>>()?,
            )
        }
        (Conversion::Map(key, val), Value::Map(entries)) => {
            let key_path = path.child(Field::Key);
            let value_path = path.child(Field::Value);
            Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| {
                        Ok((
                            convert_value(k.clone(), key, mode, &key_path)?,
                            convert_value(v.clone(), val, mode, &value_path)?,
                        ))
                    })
                    .collect::<WeftResult<Arc<[_]>>>()?,
            )
        }
        (conversion, value) => weft_bail!(
            SchemaMismatch: "{path}: a {} value cannot go through {conversion}",
            value.kind()
        ),
    })
}
