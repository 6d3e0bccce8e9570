use std::fmt::{Display, Formatter};

use itertools::Itertools;
use weft_dtype::{DecimalDType, FieldName, FieldType, PType, TimeUnit};
use weft_error::WeftResult;
use weft_io::RecordSource;
use weft_scalar::{ScalarType, ValueErrorMode};

use crate::policy::ReadOptions;
use crate::reconcile::reconcile_root;
use crate::shape::RequestedShape;

/// How one stored value becomes one requested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The value is taken as stored
    Identity,
    /// A primitive converted to a wider type
    Widen(PType),
    /// A primitive converted to a narrower type, checked for every value
    Narrow(PType),
    /// A decimal or an integer brought to the requested precision and scale. `checked` marks a
    /// narrowing that is verified for every value.
    DecimalRescale { target: DecimalDType, checked: bool },
    /// A timestamp re-expressed in another unit
    TemporalUnitConvert { from: TimeUnit, to: TimeUnit },
    /// A nested record
    Record(RecordPlan),
    /// Every element of a list
    List(Box<ValuePlan>),
    /// Every key and value of a map
    Map(Box<ValuePlan>, Box<ValuePlan>),
    /// The stored value cannot be converted; the requested value is null
    Reject,
}

/// The conversion of a value plus the type it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePlan {
    pub(crate) target: FieldType,
    pub(crate) conversion: Conversion,
    pub(crate) null_check: bool,
}

impl ValuePlan {
    /// The requested type.
    pub fn target(&self) -> &FieldType {
        &self.target
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    /// Whether stored nulls have to be rejected because the requested type is not null.
    pub fn null_check(&self) -> bool {
        self.null_check
    }
}

/// One requested field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub(crate) stored_index: Option<usize>,
    pub(crate) input_index: Option<usize>,
    pub(crate) name: FieldName,
    pub(crate) plan: ValuePlan,
}

impl PlanEntry {
    /// Position of the field in the stored record, `None` if it is absent and reads as null.
    pub fn stored_index(&self) -> Option<usize> {
        self.stored_index
    }

    /// Position of the field in the values handed to the plan.
    ///
    /// For nested records this is the stored position; for the top-level record it is the
    /// position in the projected row.
    pub fn input_index(&self) -> Option<usize> {
        self.input_index
    }

    /// The requested name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn plan(&self) -> &ValuePlan {
        &self.plan
    }
}

/// The requested fields of a record, in requested order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPlan {
    pub(crate) entries: Vec<PlanEntry>,
}

impl RecordPlan {
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }
}

/// The immutable result of reconciling a stored schema with a requested shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPlan {
    target: FieldType,
    root: RecordPlan,
    projection: Vec<usize>,
    value_errors: ValueErrorMode,
}

impl ReadPlan {
    /// Reconciles `stored` with `shape` under `options`.
    pub fn try_new(
        stored: &FieldType,
        shape: &RequestedShape,
        options: &ReadOptions,
    ) -> WeftResult<Self> {
        let (target, mut root) = reconcile_root(stored, shape, options)?;

        let projection: Vec<usize> = root
            .entries
            .iter()
            .filter_map(|e| e.stored_index)
            .unique()
            .collect();
        for entry in root.entries.iter_mut() {
            entry.input_index = entry
                .stored_index
                .and_then(|idx| projection.iter().position(|&p| p == idx));
        }

        Ok(Self {
            target,
            root,
            projection,
            value_errors: options.policy().value_errors(),
        })
    }

    /// Reconciles `stored` with the column type of host type `T`.
    pub fn for_type<T: ScalarType>(stored: &FieldType, options: &ReadOptions) -> WeftResult<Self> {
        let requested = T::field_type(&options.type_context())?;
        Self::try_new(stored, &RequestedShape::Record(requested), options)
    }

    /// Reconciles the schema of `source` with `shape`.
    pub fn for_source<S: RecordSource>(
        source: &S,
        shape: &RequestedShape,
        options: &ReadOptions,
    ) -> WeftResult<Self> {
        Self::try_new(source.schema(), shape, options)
    }

    /// The type of the records the plan produces.
    pub fn target(&self) -> &FieldType {
        &self.target
    }

    pub fn root(&self) -> &RecordPlan {
        &self.root
    }

    /// The stored top-level columns to scan, in the order the plan consumes them.
    pub fn projection(&self) -> &[usize] {
        &self.projection
    }

    /// How values that fail their conversion are handled.
    pub fn value_errors(&self) -> ValueErrorMode {
        self.value_errors
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Conversion::Identity => write!(f, "identity"),
            Conversion::Widen(p) => write!(f, "widen({p})"),
            Conversion::Narrow(p) => write!(f, "narrow({p})"),
            Conversion::DecimalRescale { target, checked } => {
                write!(f, "rescale({target}{})", if *checked { ", checked" } else { "" })
            }
            Conversion::TemporalUnitConvert { from, to } => write!(f, "unit({from} -> {to})"),
            Conversion::Record(r) => write!(f, "{r}"),
            Conversion::List(e) => write!(f, "list({})", e.conversion),
            Conversion::Map(k, v) => write!(f, "map({}, {})", k.conversion, v.conversion),
            Conversion::Reject => write!(f, "reject"),
        }
    }
}

impl Display for RecordPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.entries
                .iter()
                .map(|e| match e.stored_index {
                    Some(idx) => format!("{}<-[{idx}] {}", e.name, e.plan.conversion),
                    None => format!("{}<-null", e.name),
                })
                .join(", ")
        )
    }
}

impl Display for ReadPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.root, f)
    }
}

static_assertions::assert_impl_all!(ReadPlan: Send, Sync);
