use serde::{Deserialize, Serialize};

/// A HAR 1.2 document. Unknown/extra fields are ignored, not rejected.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Har {
    pub log: Log,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Log {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Creator {
    pub name: String,
    pub version: String,
}

/// One captured request/response exchange plus timing metadata.
///
/// Entry order in a document is capture order as written; multiple proxy
/// workers may interleave, so no global time-monotonicity is assumed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub started_date_time: String,
    #[serde(default)]
    pub time: f64,
    pub request: Request,
    pub response: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<Timings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub http_version: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub query_string: Vec<QueryParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
    #[serde(default = "unknown_size")]
    pub headers_size: i64,
    #[serde(default = "unknown_size")]
    pub body_size: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: i64,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default = "unknown_size")]
    pub headers_size: i64,
    #[serde(default = "unknown_size")]
    pub body_size: i64,
}

/// `size: -1` means unknown per the archive format and is excluded, not
/// zeroed, in every aggregate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default = "unknown_size")]
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl Default for Content {
    fn default() -> Self {
        Content {
            size: -1,
            mime_type: None,
            text: None,
            encoding: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Timing fields may be `-1`/absent meaning "unknown"; they are treated as
/// missing, never coerced to 0.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Timings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<f64>,
}

fn unknown_size() -> i64 {
    -1
}

impl Entry {
    /// Response body size, or `None` when the capture recorded it as unknown.
    pub fn content_size(&self) -> Option<i64> {
        if self.response.content.size >= 0 {
            Some(self.response.content.size)
        } else {
            None
        }
    }

    /// Case-insensitive request header lookup; first match wins.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

impl Response {
    pub fn is_failure(&self) -> bool {
        (400..=599).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::Har;

    #[test]
    fn parses_minimal_har() {
        let json = r#"
        {
          "log": {
            "entries": [
              {
                "startedDateTime": "2024-01-15T10:30:00.000Z",
                "time": 150.5,
                "request": {
                  "method": "GET",
                  "url": "https://example.com/",
                  "httpVersion": "HTTP/1.1",
                  "headers": []
                },
                "response": {
                  "status": 200,
                  "statusText": "OK",
                  "headers": [],
                  "content": {
                    "size": 0
                  }
                }
              }
            ]
          }
        }
        "#;

        let har: Har = serde_json::from_str(json).expect("HAR should parse");
        assert_eq!(har.log.entries.len(), 1);
        assert_eq!(har.log.entries[0].request.method, "GET");
    }

    #[test]
    fn ignores_unknown_fields() {
        let json = r#"
        {
          "log": {
            "version": "1.2",
            "_custom": {"tool": "proxy"},
            "entries": []
          }
        }
        "#;

        let har: Har = serde_json::from_str(json).expect("extra fields are ignored");
        assert!(har.log.entries.is_empty());
    }

    #[test]
    fn missing_content_size_reads_as_unknown() {
        let json = r#"
        {
          "log": {
            "entries": [
              {
                "startedDateTime": "",
                "time": 1.0,
                "request": {"method": "GET", "url": "https://a/", "headers": []},
                "response": {"status": 200, "headers": [], "content": {}}
              }
            ]
          }
        }
        "#;

        let har: Har = serde_json::from_str(json).unwrap();
        assert_eq!(har.log.entries[0].content_size(), None);
    }
}
