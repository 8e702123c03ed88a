//! Date and duration functions

use super::{number_arg, string_arg, BuiltinFunction};
use crate::context::EvaluationContext;
use crate::error::{Result, RuntimeError};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use sluice_core::Value;

pub(super) fn builtins() -> Vec<BuiltinFunction> {
    vec![
        BuiltinFunction::new("now", 0..=0, false, now),
        BuiltinFunction::new("parse_date", 1..=2, true, parse_date),
        BuiltinFunction::new("seconds", 1..=1, true, seconds),
        BuiltinFunction::new("minutes", 1..=1, true, minutes),
        BuiltinFunction::new("hours", 1..=1, true, hours),
        BuiltinFunction::new("days", 1..=1, true, days),
    ]
}

fn now(_args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    Ok(Value::DateTime(Utc::now()))
}

/// `parse_date(value, pattern?)`. Without a pattern the value must be
/// RFC 3339; with one it is read as a UTC wall-clock time in that
/// strftime-style format.
fn parse_date(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let value = string_arg("parse_date", args, 0)?;
    let parsed = match args.get(1) {
        None | Some(Value::Null) => DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RuntimeError::function("parse_date", e.to_string()))?,
        Some(_) => {
            let pattern = string_arg("parse_date", args, 1)?;
            let naive = NaiveDateTime::parse_from_str(value, pattern)
                .map_err(|e| RuntimeError::function("parse_date", e.to_string()))?;
            Utc.from_utc_datetime(&naive)
        }
    };
    Ok(Value::DateTime(parsed))
}

fn duration_of(function: &str, args: &[Value], unit_millis: f64) -> Result<Value> {
    let amount = number_arg(function, args, 0)?;
    let millis = amount * unit_millis;
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(RuntimeError::function(function, "duration out of range"));
    }
    Duration::try_milliseconds(millis as i64)
        .map(Value::Duration)
        .ok_or_else(|| RuntimeError::function(function, "duration out of range"))
}

fn seconds(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    duration_of("seconds", args, 1_000.0)
}

fn minutes(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    duration_of("minutes", args, 60_000.0)
}

fn hours(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    duration_of("hours", args, 3_600_000.0)
}

fn days(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    duration_of("days", args, 86_400_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::Message;

    fn eval(f: fn(&[Value], &mut EvaluationContext<'_>) -> Result<Value>, args: &[Value]) -> Result<Value> {
        let mut msg = Message::with_id("m1");
        let mut ctx = EvaluationContext::new(&mut msg);
        f(args, &mut ctx)
    }

    #[test]
    fn test_parse_date_rfc3339() {
        let r = eval(parse_date, &[Value::from("2024-03-01T10:00:00+02:00")]).unwrap();
        assert_eq!(
            r,
            Value::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_date_with_pattern() {
        let r = eval(
            parse_date,
            &[Value::from("01/03/2024 10:15:00"), Value::from("%d/%m/%Y %H:%M:%S")],
        )
        .unwrap();
        assert_eq!(
            r,
            Value::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap())
        );
        assert!(eval(parse_date, &[Value::from("not a date")]).is_err());
    }

    #[test]
    fn test_durations() {
        assert_eq!(
            eval(seconds, &[Value::from(1.5)]).unwrap(),
            Value::Duration(Duration::milliseconds(1500))
        );
        assert_eq!(
            eval(days, &[Value::from(2.0)]).unwrap(),
            Value::Duration(Duration::hours(48))
        );
        assert!(eval(hours, &[Value::from("3")]).is_err());
    }

    #[test]
    fn test_now_is_recent() {
        let before = Utc::now();
        match eval(now, &[]).unwrap() {
            Value::DateTime(t) => assert!(t >= before),
            other => panic!("Expected DateTime, got {:?}", other),
        }
    }
}
