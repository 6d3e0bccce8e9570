use log::debug;
use weft_dtype::{Field, FieldPath, FieldType, Nullability, RecordFields, normalize_name};
use weft_error::{WeftResult, weft_bail, weft_err};

use crate::plan::{Conversion, PlanEntry, RecordPlan, ValuePlan};
use crate::policy::{ReadOptions, ReadPolicy};
use crate::shape::RequestedShape;

/// Builds the target type and the top-level record plan of a read.
pub(crate) fn reconcile_root(
    stored: &FieldType,
    shape: &RequestedShape,
    options: &ReadOptions,
) -> WeftResult<(FieldType, RecordPlan)> {
    let Some(stored_fields) = stored.as_record() else {
        weft_bail!(SchemaMismatch: "stored schema {stored} is not a record");
    };
    let policy = options.policy();

    match shape {
        RequestedShape::Record(requested) => {
            let Some(requested_fields) = requested.as_record() else {
                weft_bail!(SchemaMismatch: "requested shape {requested} is not a record");
            };
            let plan = reconcile_record(stored_fields, requested_fields, policy, &FieldPath::root())?;
            Ok((requested.clone(), plan))
        }
        RequestedShape::Projection(names) => {
            let mut entries = Vec::with_capacity(names.len());
            let mut dtypes = Vec::with_capacity(names.len());
            for name in names {
                let column = options.naming().resolve(name, None);
                let index = find_field(stored_fields, &column, policy).ok_or_else(|| {
                    weft_err!(MissingColumn: "column {column} requested as {name} is not in the stored schema")
                })?;
                let dtype = stored_fields.dtypes()[index].clone();
                entries.push(PlanEntry {
                    stored_index: Some(index),
                    input_index: Some(index),
                    name: name.as_str().into(),
                    plan: ValuePlan {
                        target: dtype.clone(),
                        conversion: Conversion::Identity,
                        null_check: false,
                    },
                });
                dtypes.push(dtype);
            }
            let names = entries.iter().map(|e| e.name.clone()).collect::<Vec<_>>();
            let target = FieldType::Record(
                RecordFields::try_new(names.into(), dtypes)?,
                Nullability::NonNullable,
            );
            Ok((target, RecordPlan { entries }))
        }
    }
}

/// Position of the stored field matching `name`.
fn find_field(stored: &RecordFields, name: &str, policy: &ReadPolicy) -> Option<usize> {
    stored.find_name(name).or_else(|| {
        if policy.is_strict() {
            return None;
        }
        let normalized = normalize_name(name);
        stored
            .names()
            .iter()
            .position(|stored_name| normalize_name(stored_name) == normalized)
    })
}

fn reconcile_record(
    stored: &RecordFields,
    requested: &RecordFields,
    policy: &ReadPolicy,
    path: &FieldPath,
) -> WeftResult<RecordPlan> {
    let mut entries = Vec::with_capacity(requested.len());
    for (name, dtype) in requested.iter() {
        let field_path = path.child(&**name);
        let entry = match find_field(stored, name, policy) {
            None => {
                if !dtype.is_nullable() {
                    weft_bail!(MissingColumn: "{field_path} is not nullable and absent from the stored schema");
                }
                if policy.fail_on_missing_column() || policy.is_strict() {
                    weft_bail!(MissingColumn: "{field_path} is absent from the stored schema");
                }
                debug!("{field_path} is absent from the stored schema, reading null");
                PlanEntry {
                    stored_index: None,
                    input_index: None,
                    name: name.clone(),
                    plan: ValuePlan {
                        target: dtype.clone(),
                        conversion: Conversion::Identity,
                        null_check: false,
                    },
                }
            }
            Some(index) => PlanEntry {
                stored_index: Some(index),
                input_index: Some(index),
                name: name.clone(),
                plan: reconcile_value(&stored.dtypes()[index], dtype, policy, &field_path)?,
            },
        };
        entries.push(entry);
    }
    Ok(RecordPlan { entries })
}

fn narrowing(
    policy: &ReadPolicy,
    path: &FieldPath,
    stored: &FieldType,
    requested: &FieldType,
    conversion: Conversion,
) -> WeftResult<Conversion> {
    if policy.fail_narrowing_primitive_conversion() {
        weft_bail!(NarrowingConversion: "{path} is stored as {stored} and cannot be read as {requested} without narrowing");
    }
    Ok(conversion)
}

fn reconcile_value(
    stored: &FieldType,
    requested: &FieldType,
    policy: &ReadPolicy,
    path: &FieldPath,
) -> WeftResult<ValuePlan> {
    use FieldType::*;

    let mut null_check = false;
    if stored.is_nullable() && !requested.is_nullable() {
        if requested.is_primitive() && policy.fail_on_null_for_primitives() {
            weft_bail!(SchemaMismatch: "{path} is stored as nullable {stored} but requested as not null {requested}");
        }
        null_check = true;
    }

    let conversion = match (stored, requested) {
        (Bool(_), Bool(_))
        | (Utf8(..), Utf8(..))
        | (Binary(..), Binary(..))
        | (Date(_), Date(_))
        | (Time(_), Time(_)) => Conversion::Identity,
        (Primitive(s, _), Primitive(r, _)) => {
            if s == r {
                Conversion::Identity
            } else if s.widens_to(*r) {
                Conversion::Widen(*r)
            } else {
                narrowing(policy, path, stored, requested, Conversion::Narrow(*r))?
            }
        }
        (Decimal(s, _), Decimal(r, _)) => {
            if s == r {
                Conversion::Identity
            } else if s.widens_to(r) {
                Conversion::DecimalRescale {
                    target: *r,
                    checked: false,
                }
            } else {
                narrowing(
                    policy,
                    path,
                    stored,
                    requested,
                    Conversion::DecimalRescale {
                        target: *r,
                        checked: true,
                    },
                )?
            }
        }
        (Primitive(s, _), Decimal(r, _)) if s.is_int() => match s.max_decimal_digits() {
            Some(digits) if digits <= r.integral_digits() => Conversion::DecimalRescale {
                target: *r,
                checked: false,
            },
            _ => narrowing(
                policy,
                path,
                stored,
                requested,
                Conversion::DecimalRescale {
                    target: *r,
                    checked: true,
                },
            )?,
        },
        (Timestamp(s, _), Timestamp(r, _)) => {
            if s == r {
                Conversion::Identity
            } else if s.widens_to(*r) {
                Conversion::TemporalUnitConvert { from: *s, to: *r }
            } else {
                narrowing(
                    policy,
                    path,
                    stored,
                    requested,
                    Conversion::TemporalUnitConvert { from: *s, to: *r },
                )?
            }
        }
        (List(s, _), List(r, _)) => Conversion::List(Box::new(reconcile_value(
            s,
            r,
            policy,
            &path.child(Field::Element),
        )?)),
        (Map(sk, sv, _), Map(rk, rv, _)) => Conversion::Map(
            Box::new(reconcile_value(sk, rk, policy, &path.child(Field::Key))?),
            Box::new(reconcile_value(sv, rv, policy, &path.child(Field::Value))?),
        ),
        (Record(s, _), Record(r, _)) => Conversion::Record(reconcile_record(s, r, policy, path)?),
        _ => {
            if policy.is_strict() || !requested.is_nullable() {
                weft_bail!(SchemaMismatch: "{path} is stored as {stored} and cannot be read as {requested}");
            }
            debug!("{path} is stored as {stored} and cannot be read as {requested}, reading null");
            return Ok(ValuePlan {
                target: requested.clone(),
                conversion: Conversion::Reject,
                null_check: false,
            });
        }
    };

    Ok(ValuePlan {
        target: requested.clone(),
        conversion,
        null_check,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;
    use weft_dtype::Nullability::{NonNullable, Nullable};
    use weft_dtype::{ColumnNamingStrategy, FieldType, LogicalTag, NamingConfig, PType, RecordFields, TimeUnit};
    use weft_error::WeftError;

    use crate::plan::{Conversion, ReadPlan};
    use crate::policy::{FieldMatchingStrategy, ReadOptions, ReadPolicy};
    use crate::shape::RequestedShape;

    fn record(fields: Vec<(&str, FieldType)>) -> FieldType {
        FieldType::Record(fields.into_iter().collect::<RecordFields>(), NonNullable)
    }

    fn i32_(n: weft_dtype::Nullability) -> FieldType {
        FieldType::Primitive(PType::I32, n)
    }

    fn i64_(n: weft_dtype::Nullability) -> FieldType {
        FieldType::Primitive(PType::I64, n)
    }

    fn options(policy: ReadPolicy) -> ReadOptions {
        ReadOptions::default().with_policy(policy)
    }

    fn plan(stored: FieldType, requested: FieldType, policy: ReadPolicy) -> Result<ReadPlan, WeftError> {
        ReadPlan::try_new(&stored, &RequestedShape::Record(requested), &options(policy))
    }

    #[test]
    fn identical_and_projected_away() {
        let stored = record(vec![
            ("id", i64_(NonNullable)),
            ("name", FieldType::Utf8(LogicalTag::None, Nullable)),
            ("extra", FieldType::Bool(Nullable)),
        ]);
        let requested = record(vec![
            ("name", FieldType::Utf8(LogicalTag::Json, Nullable)),
            ("id", i64_(NonNullable)),
        ]);
        let plan = plan(stored, requested, ReadPolicy::default()).unwrap();
        assert_eq!(plan.projection(), &[1, 0]);
        assert_eq!(plan.to_string(), "{name<-[1] identity, id<-[0] identity}");
        assert_eq!(plan.root().entries()[0].input_index(), Some(0));
    }

    #[test]
    fn missing_not_null_column_always_fails() {
        let stored = record(vec![("id", i64_(NonNullable))]);
        let requested = record(vec![("id", i64_(NonNullable)), ("age", i32_(NonNullable))]);
        let lenient = ReadPolicy::default().with_fail_on_missing_column(false);
        assert!(matches!(
            plan(stored, requested, lenient),
            Err(WeftError::MissingColumn(..))
        ));
    }

    #[rstest]
    #[case(ReadPolicy::default(), false)]
    #[case(ReadPolicy::default().with_fail_on_missing_column(false), true)]
    #[case(
        ReadPolicy::default()
            .with_fail_on_missing_column(false)
            .with_field_matching(FieldMatchingStrategy::Strict),
        false
    )]
    fn missing_nullable_column(#[case] policy: ReadPolicy, #[case] allowed: bool) {
        let stored = record(vec![("id", i64_(NonNullable))]);
        let requested = record(vec![("id", i64_(NonNullable)), ("age", i32_(Nullable))]);
        match plan(stored, requested, policy) {
            Ok(plan) => {
                assert!(allowed);
                assert_eq!(plan.to_string(), "{id<-[0] identity, age<-null}");
                assert_eq!(plan.projection(), &[0]);
            }
            Err(err) => {
                assert!(!allowed);
                assert!(matches!(err, WeftError::MissingColumn(..)));
            }
        }
    }

    #[rstest]
    #[case(PType::I8, PType::I64, "widen(i64)")]
    #[case(PType::I16, PType::F32, "widen(f32)")]
    #[case(PType::I32, PType::F64, "widen(f64)")]
    #[case(PType::F32, PType::F64, "widen(f64)")]
    fn widening(#[case] from: PType, #[case] to: PType, #[case] expected: &str) {
        let plan = plan(
            record(vec![("v", FieldType::Primitive(from, NonNullable))]),
            record(vec![("v", FieldType::Primitive(to, NonNullable))]),
            ReadPolicy::default(),
        )
        .unwrap();
        assert_eq!(plan.root().entries()[0].plan().conversion().to_string(), expected);
    }

    #[test]
    fn narrowing_depends_on_policy() {
        let stored = record(vec![("v", i64_(NonNullable))]);
        let requested = record(vec![("v", i32_(NonNullable))]);
        assert!(matches!(
            plan(stored.clone(), requested.clone(), ReadPolicy::default()),
            Err(WeftError::NarrowingConversion(..))
        ));
        let deferred = plan(
            stored,
            requested,
            ReadPolicy::default().with_fail_narrowing_primitive_conversion(false),
        )
        .unwrap();
        assert_eq!(
            deferred.root().entries()[0].plan().conversion(),
            &Conversion::Narrow(PType::I32)
        );
    }

    #[test]
    fn incompatible_types() {
        let stored = record(vec![("v", FieldType::Utf8(LogicalTag::None, Nullable))]);
        assert!(matches!(
            plan(stored.clone(), record(vec![("v", i32_(NonNullable))]), ReadPolicy::default()),
            Err(WeftError::SchemaMismatch(..))
        ));
        assert!(matches!(
            plan(
                stored.clone(),
                record(vec![("v", i32_(Nullable))]),
                ReadPolicy::default().with_field_matching(FieldMatchingStrategy::Strict)
            ),
            Err(WeftError::SchemaMismatch(..))
        ));
        let rejected = plan(stored, record(vec![("v", i32_(Nullable))]), ReadPolicy::default()).unwrap();
        assert_eq!(
            rejected.root().entries()[0].plan().conversion(),
            &Conversion::Reject
        );
    }

    #[test]
    fn nullable_into_not_null_primitive() {
        let stored = record(vec![("v", i32_(Nullable))]);
        let requested = record(vec![("v", i32_(NonNullable))]);
        assert!(matches!(
            plan(
                stored.clone(),
                requested.clone(),
                ReadPolicy::default().with_fail_on_null_for_primitives(true)
            ),
            Err(WeftError::SchemaMismatch(..))
        ));
        let checked = plan(stored, requested, ReadPolicy::default()).unwrap();
        assert!(checked.root().entries()[0].plan().null_check());
    }

    #[test]
    fn best_effort_name_matching() {
        let stored = record(vec![("employee_id", i64_(NonNullable))]);
        let requested = record(vec![("employeeId", i64_(NonNullable))]);
        assert_eq!(
            plan(stored.clone(), requested.clone(), ReadPolicy::default())
                .unwrap()
                .projection(),
            &[0]
        );
        assert!(matches!(
            plan(
                stored,
                requested,
                ReadPolicy::default().with_field_matching(FieldMatchingStrategy::Strict)
            ),
            Err(WeftError::MissingColumn(..))
        ));
    }

    #[test]
    fn decimals_and_timestamps() {
        let stored = record(vec![
            ("price", FieldType::decimal(10, 2, NonNullable).unwrap()),
            ("qty", i32_(NonNullable)),
            ("at", FieldType::Timestamp(TimeUnit::Millis, NonNullable)),
        ]);
        let requested = record(vec![
            ("price", FieldType::decimal(12, 4, NonNullable).unwrap()),
            ("qty", FieldType::decimal(12, 2, NonNullable).unwrap()),
            ("at", FieldType::Timestamp(TimeUnit::Micros, NonNullable)),
        ]);
        let plan = plan(stored, requested, ReadPolicy::default()).unwrap();
        assert_eq!(
            plan.to_string(),
            "{price<-[0] rescale(decimal(12,4)), qty<-[1] rescale(decimal(12,2)), at<-[2] unit(ms -> us)}"
        );
    }

    #[test]
    fn nested_records() {
        let stored = record(vec![(
            "address",
            record(vec![
                ("city", FieldType::Utf8(LogicalTag::None, Nullable)),
                ("zip", i32_(NonNullable)),
            ])
            .as_nullable(),
        )]);
        let requested = record(vec![(
            "address",
            record(vec![("zip", i64_(NonNullable))]).as_nullable(),
        )]);
        let plan = plan(stored, requested, ReadPolicy::default()).unwrap();
        assert_eq!(plan.to_string(), "{address<-[0] {zip<-[1] widen(i64)}}");

        let lists = plan_lists();
        assert_eq!(lists.to_string(), "{tags<-[0] list(widen(i64))}");
    }

    fn plan_lists() -> ReadPlan {
        plan(
            record(vec![(
                "tags",
                FieldType::List(Arc::new(i32_(NonNullable)), Nullable),
            )]),
            record(vec![(
                "tags",
                FieldType::List(Arc::new(i64_(NonNullable)), Nullable),
            )]),
            ReadPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn projection_by_name() {
        let stored = record(vec![
            ("employee_id", i64_(NonNullable)),
            ("first_name", FieldType::Utf8(LogicalTag::None, Nullable)),
        ]);
        let options = ReadOptions::default()
            .with_naming(NamingConfig::new(ColumnNamingStrategy::SnakeCase));
        let plan =
            ReadPlan::try_new(&stored, &RequestedShape::from_iter(["firstName"]), &options).unwrap();
        assert_eq!(plan.projection(), &[1]);
        assert_eq!(
            plan.target().to_string(),
            "{firstName=utf8?}"
        );
        assert!(matches!(
            ReadPlan::try_new(&stored, &RequestedShape::from_iter(["salary"]), &options),
            Err(WeftError::MissingColumn(..))
        ));
    }
}
