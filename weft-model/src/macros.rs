/// Declares a host record type together with its write model.
///
/// The struct is emitted as written (attributes and visibility included) and implements
/// [`RecordType`](crate::RecordType) and [`ScalarType`](weft_scalar::ScalarType), so it can be
/// written directly or nested inside another declared record. Column types follow the Rust types
/// of the fields: plain types are not null, `Option<T>` is nullable, `Vec<T>` is a list, maps are
/// maps and declared records are records.
///
/// Options follow the field type after `=>`, in brackets and separated by commas:
///
/// * `alias("name")`: the column name, overriding the naming configuration
/// * `decimal(precision, scale)`: precision and scale of a decimal field
/// * `json()`, `bson()`, `geometry()`, `geography()`: logical annotation of a string or binary field
/// * `unit(TimeUnit::Micros)`: resolution of a timestamp field
///
/// ```
/// use rust_decimal::Decimal;
/// use weft_model::{WriteOptions, WriteRecordModel, record_model};
///
/// record_model! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Employee {
///         pub id: i64,
///         pub name: Option<String> => [alias("full_name")],
///         pub salary: Option<Decimal> => [decimal(10, 2)],
///     }
/// }
///
/// let model = WriteRecordModel::<Employee>::of(&WriteOptions::default()).unwrap();
/// assert_eq!(
///     model.field_type().to_string(),
///     "{id=i64, full_name=utf8?, salary=decimal(10,2)?}"
/// );
/// ```
#[macro_export]
macro_rules! record_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> [ $($opt:ident ( $($arg:tt)* )),+ $(,)? ])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::RecordType for $name {
            fn write_model(
                ctx: &$crate::__private::TypeContext<'_>,
            ) -> $crate::__private::WeftResult<$crate::WriteRecordModel<Self>> {
                let builder = $crate::WriteRecordModel::<Self>::builder();
                $(
                    let builder = {
                        #[allow(unused_mut)]
                        let mut overrides = $crate::__private::FieldOverrides::default();
                        #[allow(unused_mut, unused_assignments)]
                        let mut alias: ::std::option::Option<&str> = None;
                        $($( $crate::__field_option!(overrides, alias, $opt ( $($arg)* )); )+)?
                        let name = ctx.naming().resolve(stringify!($field), alias);
                        let dtype = <$ty as $crate::__private::ScalarType>::field_type(
                            &ctx.for_field(overrides),
                        )
                        .map_err(|e| e.with_context(format!("field {}", stringify!($field))))?;
                        builder.with_field(name, dtype, |record: &Self| {
                            $crate::__private::ScalarType::to_value(&record.$field)
                        })
                    };
                )*
                builder.build()
            }
        }

        impl $crate::__private::ScalarType for $name {
            fn field_type(
                ctx: &$crate::__private::TypeContext<'_>,
            ) -> $crate::__private::WeftResult<$crate::__private::FieldType> {
                $crate::__private::record_field_type::<Self>(ctx)
            }

            fn to_value(&self) -> $crate::__private::Value {
                $crate::__private::Value::Record(::std::sync::Arc::from(vec![
                    $( $crate::__private::ScalarType::to_value(&self.$field), )*
                ]))
            }

            fn from_value(
                value: $crate::__private::Value,
            ) -> $crate::__private::WeftResult<Self> {
                const FIELDS: &[&str] = &[$(stringify!($field)),*];
                let mut values = $crate::__private::record_values(value, stringify!($name), FIELDS.len())?;
                Ok(Self {
                    $(
                        $field: $crate::__private::field_from_value(&mut values, stringify!($field))?,
                    )*
                })
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_option {
    ($o:ident, $a:ident, alias ( $name:expr )) => {
        $a = Some($name);
    };
    ($o:ident, $a:ident, decimal ( $p:expr, $s:expr )) => {
        $o.decimal = Some($crate::__private::DecimalDType::try_new($p, $s)?);
    };
    ($o:ident, $a:ident, json ()) => {
        $o.logical_tag = $crate::__private::LogicalTag::Json;
    };
    ($o:ident, $a:ident, bson ()) => {
        $o.logical_tag = $crate::__private::LogicalTag::Bson;
    };
    ($o:ident, $a:ident, geometry ()) => {
        $o.logical_tag = $crate::__private::LogicalTag::Geometry;
    };
    ($o:ident, $a:ident, geography ()) => {
        $o.logical_tag = $crate::__private::LogicalTag::Geography;
    };
    ($o:ident, $a:ident, unit ( $unit:expr )) => {
        $o.time_unit = Some($unit);
    };
}
