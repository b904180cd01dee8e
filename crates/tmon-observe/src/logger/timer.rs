use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

/// RFC 3339 timestamps in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcRfc3339;

impl FormatTime for UtcRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match OffsetDateTime::now_utc().format(&Rfc3339) {
            Ok(ts) => write!(w, "{ts} "),
            Err(_) => w.write_str("<bad-clock> "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_utc_timestamp() {
        let mut out = String::new();
        UtcRfc3339.format_time(&mut Writer::new(&mut out)).unwrap();

        let ts = out.trim_end();
        assert!(ts.ends_with('Z'), "expected UTC suffix in {ts:?}");
        assert_eq!(ts.find('T'), Some(10), "expected date-time separator in {ts:?}");
    }
}
