//! The global `Date` object.
//!
//! Time values are milliseconds since the epoch stored as `f64`, with NaN
//! for invalid dates. The engine runs in UTC: local and UTC accessors
//! agree and `getTimezoneOffset` is zero.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-date-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Date

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject, ObjectKind},
    value::PreferredType,
    Context, JsArgs, JsResult, JsString, JsValue,
};
use std::time::{SystemTime, UNIX_EPOCH};

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
// ±100,000,000 days around the epoch.
const MAX_TIME: f64 = 8.64e15;

/// The `Date` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Date;

impl BuiltIn for Date {
    const NAME: &'static str = "Date";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().date();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(7)
                .static_method(Self::now, "now", 0)
                .static_method(Self::parse, "parse", 1)
                .static_method(Self::utc, "UTC", 7)
                .method(Self::get_time, "getTime", 0)
                .method(Self::get_time, "valueOf", 0)
                .method(Self::get_full_year, "getFullYear", 0)
                .method(Self::get_full_year, "getUTCFullYear", 0)
                .method(Self::get_month, "getMonth", 0)
                .method(Self::get_month, "getUTCMonth", 0)
                .method(Self::get_date, "getDate", 0)
                .method(Self::get_date, "getUTCDate", 0)
                .method(Self::get_day, "getDay", 0)
                .method(Self::get_day, "getUTCDay", 0)
                .method(Self::get_hours, "getHours", 0)
                .method(Self::get_hours, "getUTCHours", 0)
                .method(Self::get_minutes, "getMinutes", 0)
                .method(Self::get_minutes, "getUTCMinutes", 0)
                .method(Self::get_seconds, "getSeconds", 0)
                .method(Self::get_seconds, "getUTCSeconds", 0)
                .method(Self::get_milliseconds, "getMilliseconds", 0)
                .method(Self::get_milliseconds, "getUTCMilliseconds", 0)
                .method(Self::get_timezone_offset, "getTimezoneOffset", 0)
                .method(Self::set_time, "setTime", 1)
                .method(Self::set_full_year, "setFullYear", 3)
                .method(Self::set_full_year, "setUTCFullYear", 3)
                .method(Self::set_month, "setMonth", 2)
                .method(Self::set_month, "setUTCMonth", 2)
                .method(Self::set_date, "setDate", 1)
                .method(Self::set_date, "setUTCDate", 1)
                .method(Self::set_hours, "setHours", 4)
                .method(Self::set_hours, "setUTCHours", 4)
                .method(Self::set_minutes, "setMinutes", 3)
                .method(Self::set_minutes, "setUTCMinutes", 3)
                .method(Self::set_seconds, "setSeconds", 2)
                .method(Self::set_seconds, "setUTCSeconds", 2)
                .method(Self::set_milliseconds, "setMilliseconds", 1)
                .method(Self::set_milliseconds, "setUTCMilliseconds", 1)
                .method(Self::to_string, "toString", 0)
                .method(Self::to_string, "toUTCString", 0)
                .method(Self::to_string, "toLocaleString", 0)
                .method(Self::to_iso_string, "toISOString", 0)
                .method(Self::to_iso_string, "toJSON", 1)
                .method(Self::to_date_string, "toDateString", 0)
                .method(Self::to_time_string, "toTimeString", 0)
                .build();
        JsValue::Object(constructor)
    }
}

// === calendar arithmetic ===

fn time_clip(time: f64) -> f64 {
    if time.is_nan() || time.abs() > MAX_TIME {
        f64::NAN
    } else {
        time.trunc() + 0.0
    }
}

fn make_time(hours: f64, minutes: f64, seconds: f64, ms: f64) -> f64 {
    hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + ms
}

// Days from the epoch for a (year, month 0-based, day 1-based) triple,
// months outside 0..12 carrying into the year.
fn make_day(year: f64, month: f64, day: f64) -> f64 {
    if !year.is_finite() || !month.is_finite() || !day.is_finite() {
        return f64::NAN;
    }
    let year = year.trunc() as i64 + month.trunc().div_euclid(12.0) as i64;
    let month = month.trunc().rem_euclid(12.0) as i64;
    days_from_civil(year, month + 1, 1) as f64 + day - 1.0
}

fn make_date(day: f64, time: f64) -> f64 {
    day * MS_PER_DAY + time
}

// Howard Hinnant's civil calendar algorithms.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400;
    let doy = (153 * (if month > 2 { month - 3 } else { month + 9 }) + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let days = days + 719_468;
    let era = days.div_euclid(146_097);
    let doe = days - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    (if month <= 2 { year + 1 } else { year }, month, day)
}

fn day_of(time: f64) -> i64 {
    (time / MS_PER_DAY).floor() as i64
}

fn civil_of(time: f64) -> (i64, i64, i64) {
    civil_from_days(day_of(time))
}

fn hours_of(time: f64) -> f64 {
    (time / MS_PER_HOUR).floor().rem_euclid(24.0)
}

fn minutes_of(time: f64) -> f64 {
    (time / MS_PER_MINUTE).floor().rem_euclid(60.0)
}

fn seconds_of(time: f64) -> f64 {
    (time / MS_PER_SECOND).floor().rem_euclid(60.0)
}

fn ms_of(time: f64) -> f64 {
    time.rem_euclid(1000.0)
}

// 0 = Sunday.
fn week_day(time: f64) -> i64 {
    (day_of(time) + 4).rem_euclid(7)
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |duration| duration.as_millis() as f64)
}

fn this_time(this: &JsValue) -> JsResult<f64> {
    let Some(object) = this.as_object() else {
        return Err(receiver_error());
    };
    let borrowed = object.borrow();
    match borrowed.kind() {
        ObjectKind::Date(time) => Ok(*time),
        _ => Err(receiver_error()),
    }
}

fn set_this_time(this: &JsValue, time: f64) -> JsResult<f64> {
    let Some(object) = this.as_object() else {
        return Err(receiver_error());
    };
    let mut borrowed = object.borrow_mut();
    match borrowed.kind_mut() {
        ObjectKind::Date(slot) => {
            *slot = time;
            Ok(time)
        }
        _ => Err(receiver_error()),
    }
}

fn receiver_error() -> crate::JsError {
    JsNativeError::typ()
        .with_message("Date method called on incompatible receiver")
        .into()
}

const WEEK_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn format_date(time: f64) -> String {
    let (year, month, day) = civil_of(time);
    format!(
        "{} {} {:02} {}",
        WEEK_DAYS[week_day(time) as usize],
        MONTHS[(month - 1) as usize],
        day,
        year,
    )
}

fn format_time(time: f64) -> String {
    format!(
        "{:02}:{:02}:{:02} GMT+0000 (UTC)",
        hours_of(time) as u32,
        minutes_of(time) as u32,
        seconds_of(time) as u32,
    )
}

impl Date {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let constructing = context.take_constructing();
        let time = match args.len() {
            0 => now_ms(),
            1 => {
                let primitive = args[0].to_primitive(PreferredType::Default, context)?;
                match primitive {
                    JsValue::String(text) => parse_date_string(&text),
                    other => time_clip(other.to_number(context)?),
                }
            }
            _ => {
                let mut fields = [0.0; 7];
                for (index, slot) in fields.iter_mut().enumerate() {
                    *slot = match args.get(index) {
                        Some(value) => value.to_number(context)?,
                        None => {
                            if index == 2 {
                                1.0
                            } else {
                                0.0
                            }
                        }
                    };
                }
                let year = if (0.0..=99.0).contains(&fields[0]) && fields[0].fract() == 0.0 {
                    fields[0] + 1900.0
                } else {
                    fields[0]
                };
                time_clip(make_date(
                    make_day(year, fields[1], fields[2]),
                    make_time(fields[3], fields[4], fields[5], fields[6]),
                ))
            }
        };
        if !constructing {
            return Ok(JsValue::String(JsString::from(format!(
                "{} {}",
                format_date(time),
                format_time(time),
            ))));
        }
        Ok(JsValue::Object(JsObject::new(
            ObjectKind::Date(time),
            Some(context.standard_objects().date().prototype()),
        )))
    }

    /// `Date.now()`
    fn now(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Number(now_ms()))
    }

    /// `Date.parse( string )`
    fn parse(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let text = args.get_or_undefined(0).to_string(context)?;
        Ok(JsValue::Number(parse_date_string(&text)))
    }

    /// `Date.UTC( year, month, … )`
    fn utc(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut fields = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        for (index, slot) in fields.iter_mut().enumerate() {
            if let Some(value) = args.get(index) {
                *slot = value.to_number(context)?;
            }
        }
        let year = if (0.0..=99.0).contains(&fields[0]) && fields[0].fract() == 0.0 {
            fields[0] + 1900.0
        } else {
            fields[0]
        };
        Ok(JsValue::Number(time_clip(make_date(
            make_day(year, fields[1], fields[2]),
            make_time(fields[3], fields[4], fields[5], fields[6]),
        ))))
    }

    /// `Date.prototype.getTime()` / `valueOf()`
    fn get_time(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Number(this_time(this)?))
    }

    fn get_full_year(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::from(civil_of(time).0 as f64))
    }

    fn get_month(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::from((civil_of(time).1 - 1) as f64))
    }

    fn get_date(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::from(civil_of(time).2 as f64))
    }

    fn get_day(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::from(week_day(time) as f64))
    }

    fn get_hours(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::Number(hours_of(time)))
    }

    fn get_minutes(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::Number(minutes_of(time)))
    }

    fn get_seconds(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::Number(seconds_of(time)))
    }

    fn get_milliseconds(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::Number(ms_of(time)))
    }

    fn get_timezone_offset(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        this_time(this)?;
        Ok(JsValue::from(0.0))
    }

    /// `Date.prototype.setTime( time )`
    fn set_time(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let time = args.get_or_undefined(0).to_number(context)?;
        Ok(JsValue::Number(set_this_time(this, time_clip(time))?))
    }

    // The field setters rebuild the time value from the current fields and
    // the supplied ones; out-of-range fields carry over into the larger
    // units through the calendar arithmetic.
    fn set_fields(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
        first: usize,
    ) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() && first != 0 {
            return Ok(JsValue::Number(set_this_time(this, f64::NAN)?));
        }
        let (year, month, day) = if time.is_nan() {
            (1970, 1, 1)
        } else {
            civil_of(time)
        };
        let mut fields = [
            year as f64,
            (month - 1) as f64,
            day as f64,
            if time.is_nan() { 0.0 } else { hours_of(time) },
            if time.is_nan() { 0.0 } else { minutes_of(time) },
            if time.is_nan() { 0.0 } else { seconds_of(time) },
            if time.is_nan() { 0.0 } else { ms_of(time) },
        ];
        for (offset, value) in args.iter().enumerate() {
            let index = first + offset;
            if index >= fields.len() {
                break;
            }
            fields[index] = value.to_number(context)?;
        }
        let updated = time_clip(make_date(
            make_day(fields[0], fields[1], fields[2]),
            make_time(fields[3], fields[4], fields[5], fields[6]),
        ));
        Ok(JsValue::Number(set_this_time(this, updated)?))
    }

    fn set_full_year(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, context, 0)
    }

    fn set_month(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, context, 1)
    }

    fn set_date(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, context, 2)
    }

    fn set_hours(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, context, 3)
    }

    fn set_minutes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, context, 4)
    }

    fn set_seconds(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, context, 5)
    }

    fn set_milliseconds(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        Self::set_fields(this, args, context, 6)
    }

    /// `Date.prototype.toString()`
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::from("Invalid Date"));
        }
        Ok(JsValue::String(JsString::from(format!(
            "{} {}",
            format_date(time),
            format_time(time),
        ))))
    }

    /// `Date.prototype.toISOString()` / `toJSON()`
    fn to_iso_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Err(JsNativeError::range()
                .with_message("Invalid time value")
                .into());
        }
        let (year, month, day) = civil_of(time);
        Ok(JsValue::String(JsString::from(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            year,
            month,
            day,
            hours_of(time) as u32,
            minutes_of(time) as u32,
            seconds_of(time) as u32,
            ms_of(time) as u32,
        ))))
    }

    fn to_date_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::from("Invalid Date"));
        }
        Ok(JsValue::String(JsString::from(format_date(time))))
    }

    fn to_time_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let time = this_time(this)?;
        if time.is_nan() {
            return Ok(JsValue::from("Invalid Date"));
        }
        Ok(JsValue::String(JsString::from(format_time(time))))
    }
}

// An ISO-8601 subset: YYYY[-MM[-DD]][THH:MM[:SS[.mmm]]][Z|±HH:MM].
fn parse_date_string(text: &JsString) -> f64 {
    let Some(text) = text.as_str() else {
        return f64::NAN;
    };
    let text = text.trim();
    let bytes = text.as_bytes();

    let digits = |range: std::ops::Range<usize>| -> Option<f64> {
        let slice = bytes.get(range)?;
        let text = std::str::from_utf8(slice).ok()?;
        if text.bytes().all(|byte| byte.is_ascii_digit()) {
            text.parse().ok()
        } else {
            None
        }
    };

    let Some(year) = digits(0..4) else {
        return f64::NAN;
    };
    let mut month = 1.0;
    let mut day = 1.0;
    let mut position = 4;
    if bytes.get(position) == Some(&b'-') {
        let Some(parsed) = digits(position + 1..position + 3) else {
            return f64::NAN;
        };
        month = parsed;
        position += 3;
        if bytes.get(position) == Some(&b'-') {
            let Some(parsed) = digits(position + 1..position + 3) else {
                return f64::NAN;
            };
            day = parsed;
            position += 3;
        }
    }

    let mut hours = 0.0;
    let mut minutes = 0.0;
    let mut seconds = 0.0;
    let mut ms = 0.0;
    let mut offset_minutes = 0.0;
    if matches!(bytes.get(position), Some(&b'T' | &b' ')) {
        let (Some(h), Some(m)) = (
            digits(position + 1..position + 3),
            digits(position + 4..position + 6),
        ) else {
            return f64::NAN;
        };
        hours = h;
        minutes = m;
        position += 6;
        if bytes.get(position) == Some(&b':') {
            let Some(parsed) = digits(position + 1..position + 3) else {
                return f64::NAN;
            };
            seconds = parsed;
            position += 3;
            if bytes.get(position) == Some(&b'.') {
                let Some(parsed) = digits(position + 1..position + 4) else {
                    return f64::NAN;
                };
                ms = parsed;
                position += 4;
            }
        }
        match bytes.get(position) {
            Some(&b'Z') => position += 1,
            Some(&sign @ (b'+' | b'-')) => {
                let (Some(oh), Some(om)) = (
                    digits(position + 1..position + 3),
                    digits(position + 4..position + 6),
                ) else {
                    return f64::NAN;
                };
                offset_minutes = oh * 60.0 + om;
                if sign == b'+' {
                    offset_minutes = -offset_minutes;
                }
                position += 6;
            }
            _ => {}
        }
    }
    if position != bytes.len() {
        return f64::NAN;
    }
    time_clip(
        make_date(
            make_day(year, month - 1.0, day),
            make_time(hours, minutes, seconds, ms),
        ) + offset_minutes * MS_PER_MINUTE,
    )
}
