use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::warn;

use crate::common::Timestamp;
use crate::error::{Error, Result};
use crate::registry::CounterVec;

use super::Filter;

/// `remote_host logname user [time] "method uri protocol" status bytes_sent "referer" "user_agent"`
const COMBINED_LOG_PATTERN: &str = r#"^(\S+)\s(\S+)\s(\S+)\s\[([\w:/]+\s[+\-]\d{4})\]\s"(\S+)\s?(\S+)?\s?(\S+)?"\s(\d{3}|-)\s(\d+|-)\s?"?([^"]*)"?\s?"?([^"]*)?"?$"#;

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COMBINED_LOG_PATTERN).expect("combined log pattern is valid"))
}

/// A parsed combined-log-format entry.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_host: String,
    pub logname: String,
    pub user: String,
    pub time: String,
    pub method: String,
    pub uri: String,
    pub protocol: String,
    pub status: u16,
    pub bytes_sent: Option<u64>,
    pub referer: String,
    pub user_agent: String,
}

fn parse(line: &str) -> Result<AccessLogEntry> {
    let caps = pattern()
        .captures(line)
        .ok_or_else(|| Error::Parse(line.to_string()))?;

    let get = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("").to_string();

    let status_str = get(8);
    let status: u16 = status_str
        .parse()
        .map_err(|_| Error::Parse(line.to_string()))?;

    let bytes_str = get(9);
    let bytes_sent = if bytes_str == "-" {
        None
    } else {
        Some(
            bytes_str
                .parse::<u64>()
                .map_err(|_| Error::Parse(line.to_string()))?,
        )
    };

    Ok(AccessLogEntry {
        remote_host: get(1),
        logname: get(2),
        user: get(3),
        time: get(4),
        method: get(5),
        uri: get(6),
        protocol: get(7),
        status,
        bytes_sent,
        referer: get(10),
        user_agent: get(11),
    })
}

/// The first path segment of `uri`, prefixed with `/` and stripped of any
/// query string. `None` if `uri` has no second `/`-separated segment.
fn derive_section(uri: &str) -> Option<String> {
    let segments: Vec<&str> = uri.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let segment = segments[1].split('?').next().unwrap_or("");
    Some(format!("/{segment}"))
}

/// The built-in filter: parses combined-log-format HTTP access log lines and
/// increments `request_total{method, section, status}`.
pub struct HttpAccessLogFilter {
    request_total: Arc<CounterVec>,
}

impl HttpAccessLogFilter {
    pub fn new(request_total: Arc<CounterVec>) -> Self {
        Self { request_total }
    }
}

impl Filter for HttpAccessLogFilter {
    fn handle_entry(&self, _time: Timestamp, line: &str) -> Result<()> {
        let entry = parse(line)?;
        let Some(section) = derive_section(&entry.uri) else {
            warn!(uri = %entry.uri, "access log line has no second uri segment");
            return Err(Error::Parse(line.to_string()));
        };

        let status = entry.status.to_string();
        self.request_total
            .with_label_values(&[&entry.method, &section, &status])
            .inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "-" "Mozilla/4.0""#;

    #[test]
    fn parses_combined_log_format() {
        let entry = parse(SAMPLE).unwrap();
        assert_eq!(entry.remote_host, "127.0.0.1");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.uri, "/apache_pb.gif");
        assert_eq!(entry.status, 200);
        assert_eq!(entry.bytes_sent, Some(2326));
        assert_eq!(entry.user_agent, "Mozilla/4.0");
    }

    #[test]
    fn derives_section_from_uri() {
        assert_eq!(derive_section("/apache_pb.gif").as_deref(), Some("/apache_pb.gif"));
        assert_eq!(derive_section("/a/b/c?x=1").as_deref(), Some("/a"));
        assert_eq!(derive_section("/").as_deref(), Some("/"));
        assert_eq!(derive_section("noleadingslash"), None);
    }

    #[test]
    fn handle_entry_increments_counter() {
        let cv = Arc::new(CounterVec::new("request_total", "h", &["method", "section", "status"]));
        let filter = HttpAccessLogFilter::new(cv.clone());
        filter.handle_entry(0, SAMPLE).unwrap();
        let counter = cv.with_label_values(&["GET", "/apache_pb.gif", "200"]);
        assert_eq!(counter.value(), 1.0);
    }

    #[test]
    fn rejects_malformed_line() {
        let cv = Arc::new(CounterVec::new("request_total", "h", &["method", "section", "status"]));
        let filter = HttpAccessLogFilter::new(cv);
        assert!(filter.handle_entry(0, "not a log line").is_err());
    }
}
