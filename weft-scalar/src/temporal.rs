use jiff::civil::{DateTime, Time};
use weft_dtype::TimeUnit;
use weft_error::{WeftResult, weft_bail, weft_err};

const NANOS_PER_MICRO: i32 = 1_000;

fn nanos_per_unit(unit: TimeUnit) -> i32 {
    match unit {
        TimeUnit::Millis => 1_000_000,
        TimeUnit::Micros => NANOS_PER_MICRO,
    }
}

fn truncated_nanos(nanos: i32, step: i32) -> i32 {
    nanos - nanos % step
}

/// Drops the part of `value` finer than `unit`.
pub fn truncate_timestamp(value: DateTime, unit: TimeUnit) -> WeftResult<DateTime> {
    let nanos = truncated_nanos(value.subsec_nanosecond(), nanos_per_unit(unit));
    value
        .with()
        .subsec_nanosecond(nanos)
        .build()
        .map_err(|e| weft_err!(AssertionFailed: "truncating {value} to {unit}: {e}"))
}

/// Drops the part of `value` finer than a microsecond.
pub fn truncate_time(value: Time) -> WeftResult<Time> {
    let nanos = truncated_nanos(value.subsec_nanosecond(), NANOS_PER_MICRO);
    value
        .with()
        .subsec_nanosecond(nanos)
        .build()
        .map_err(|e| weft_err!(AssertionFailed: "truncating {value} to micros: {e}"))
}

/// Re-expresses a timestamp stored with unit `from` in unit `to`.
///
/// Going to a coarser unit fails with `NarrowingConversion` when the value carries digits the
/// target cannot hold.
pub fn convert_timestamp(value: DateTime, from: TimeUnit, to: TimeUnit) -> WeftResult<DateTime> {
    if from.widens_to(to) {
        return Ok(value);
    }
    if value.subsec_nanosecond() % nanos_per_unit(to) != 0 {
        weft_bail!(NarrowingConversion: "timestamp {value} does not fit unit {to}");
    }
    Ok(value)
}
