use chrono::{DateTime, SecondsFormat, Utc};

/// `{identity}-{timestamp}.{extension}`, where the timestamp is the ISO-8601
/// instant without `:`/`-` separators or the millisecond fraction, e.g.
/// `notes-20240102T030405Z.chatbook`. Names sort by creation time.
pub fn artifact_name(identity: &str, at: DateTime<Utc>, extension: &str) -> String {
    format!("{identity}-{}.{extension}", compact_timestamp(at))
}

fn compact_timestamp(at: DateTime<Utc>) -> String {
    let iso = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let without_fraction = match (iso.find('.'), iso.rfind('Z')) {
        (Some(dot), Some(zone)) if dot < zone => format!("{}{}", &iso[..dot], &iso[zone..]),
        _ => iso,
    };
    without_fraction.replace([':', '-'], "")
}
