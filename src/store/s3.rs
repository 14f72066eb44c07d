//! S3 uploads: one signed PUT per object

use std::collections::BTreeMap;

use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, info};
use url::Url;

use crate::error::ExportError;

use super::credentials::AwsCredentials;
use super::signer::{amz_date, encode_path, sha256_hex, SignableRequest, Signer};
use super::{validate_object_key, ObjectStore, PutObject};

/// S3 or an S3-compatible endpoint
pub struct S3Store {
    client: Client,
    credentials: AwsCredentials,
    region: String,
    endpoint: Option<Url>,
}

impl S3Store {
    pub fn new(credentials: AwsCredentials, region: impl Into<String>) -> Result<Self, ExportError> {
        Ok(Self {
            client: Client::builder().build()?,
            credentials,
            region: region.into(),
            endpoint: None,
        })
    }

    /// Send requests path-style to a custom endpoint (MinIO, LocalStack, ...)
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// URL an object is written to
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url, ExportError> {
        let path = encode_path(key);
        let raw = match self.endpoint {
            Some(ref endpoint) => format!(
                "{}/{}/{}",
                endpoint.as_str().trim_end_matches('/'),
                bucket,
                path
            ),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, path),
        };
        Url::parse(&raw).map_err(|e| ExportError::Config(format!("Invalid object URL {}: {}", raw, e)))
    }

    /// Headers that are both signed and sent
    fn signed_headers(
        &self,
        url: &Url,
        content_type: &str,
        payload_hash: &str,
        date: &str,
    ) -> Result<BTreeMap<String, String>, ExportError> {
        let host = url
            .host_str()
            .ok_or_else(|| ExportError::Config(format!("Object URL has no host: {}", url)))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        headers.insert("host".to_string(), host);
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.to_string());
        headers.insert("x-amz-date".to_string(), date.to_string());
        if let Some(token) = self.credentials.session_token() {
            headers.insert("x-amz-security-token".to_string(), token.to_string());
        }
        Ok(headers)
    }
}

impl ObjectStore for S3Store {
    fn put_object(&mut self, request: &PutObject<'_>) -> Result<(), ExportError> {
        validate_object_key(request.key)?;

        let url = self.object_url(request.bucket, request.key)?;
        let now = Utc::now();
        let payload_hash = sha256_hex(request.body);
        let headers = self.signed_headers(&url, request.content_type, &payload_hash, &amz_date(now))?;

        let authorization = Signer::new(&self.credentials, &self.region, "s3").authorization(
            &SignableRequest {
                method: "PUT",
                canonical_uri: url.path(),
                canonical_query: "",
                headers: &headers,
                payload_hash: &payload_hash,
            },
            now,
        );

        debug!(url = %url, bytes = request.body.len(), "Sending PUT");
        let mut builder = self
            .client
            .put(url.clone())
            .header(AUTHORIZATION, authorization)
            .body(request.body.to_vec());
        // signed headers minus host
        for (name, value) in headers.iter().filter(|(name, _)| name.as_str() != "host") {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExportError::Upload {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        info!(location = %self.location(request.bucket, request.key), "Uploaded object");
        Ok(())
    }

    fn location(&self, bucket: &str, key: &str) -> String {
        format!("s3://{}/{}", bucket, key)
    }
}

/// Pull `<Code>`/`<Message>` out of an S3 XML error body, else the trimmed body
fn error_message(body: &str) -> String {
    let code = xml_element(body, "Code");
    let message = xml_element(body, "Message");
    match (code, message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => body.trim().to_string(),
    }
}

fn xml_element<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim())
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::error::Stage;

    /// Accept one request, answer it, and hand back its head and body
    fn serve_once(status: &'static str, reply: &'static str) -> (Url, JoinHandle<(String, Vec<u8>)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&line);
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reply.len(),
                reply
            );
            stream.write_all(response.as_bytes()).unwrap();
            (head, body)
        });

        (endpoint, handle)
    }

    fn put(store: &mut S3Store, body: &[u8]) -> Result<(), ExportError> {
        store.put_object(&PutObject {
            bucket: "b",
            key: "dir/a b.csv",
            body,
            content_type: "text/csv",
        })
    }

    fn store() -> S3Store {
        S3Store::new(AwsCredentials::new("AKID", "secret", None), "eu-west-1").unwrap()
    }

    #[test]
    fn test_virtual_hosted_url() {
        let url = store().object_url("exports", "redis_data").unwrap();
        assert_eq!(url.as_str(), "https://exports.s3.eu-west-1.amazonaws.com/redis_data");
        assert_eq!(url.path(), "/redis_data");
    }

    #[test]
    fn test_path_style_url_with_endpoint() {
        let store = store().with_endpoint(Url::parse("http://localhost:9000/").unwrap());
        let url = store.object_url("exports", "daily/a b.csv").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/exports/daily/a%20b.csv");
        assert_eq!(url.path(), "/exports/daily/a%20b.csv");
    }

    #[test]
    fn test_signed_headers_carry_port_and_token() {
        let store = S3Store::new(
            AwsCredentials::new("AKID", "secret", Some("session".to_string())),
            "us-east-1",
        )
        .unwrap()
        .with_endpoint(Url::parse("http://localhost:9000").unwrap());
        let url = store.object_url("b", "k").unwrap();
        let headers = store
            .signed_headers(&url, "text/csv", "hash", "20240101T000000Z")
            .unwrap();

        assert_eq!(headers["host"], "localhost:9000");
        assert_eq!(headers["content-type"], "text/csv");
        assert_eq!(headers["x-amz-security-token"], "session");
        assert_eq!(
            headers.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["content-type", "host", "x-amz-content-sha256", "x-amz-date", "x-amz-security-token"]
        );
    }

    #[test]
    fn test_rejects_dot_segments_before_sending() {
        let mut store = store();
        let err = store
            .put_object(&PutObject {
                bucket: "b",
                key: "a/../b",
                body: b"",
                content_type: "text/csv",
            })
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidObjectKey(_)));
    }

    #[test]
    fn test_put_sends_signed_request() {
        let (endpoint, server) = serve_once("200 OK", "");
        let mut store = store().with_endpoint(endpoint);

        put(&mut store, b"a\r\n1\r\n").unwrap();

        let (head, body) = server.join().unwrap();
        let lower = head.to_ascii_lowercase();
        assert!(head.starts_with("PUT /b/dir/a%20b.csv HTTP/1.1\r\n"), "{}", head);
        assert!(lower.contains("content-type: text/csv\r\n"));
        assert!(lower.contains(&format!("x-amz-content-sha256: {}\r\n", sha256_hex(b"a\r\n1\r\n"))));
        assert!(lower.contains("x-amz-date: "));
        assert!(lower.contains("authorization: aws4-hmac-sha256 credential=akid/"));
        assert!(lower.contains("signedheaders=content-type;host;x-amz-content-sha256;x-amz-date,"));
        assert_eq!(body, b"a\r\n1\r\n");
    }

    #[test]
    fn test_rejected_put_is_upload_error() {
        let (endpoint, server) = serve_once(
            "403 Forbidden",
            "<?xml version=\"1.0\"?><Error><Code>AccessDenied</Code><Message>nope</Message></Error>",
        );
        let mut store = store().with_endpoint(endpoint);

        let err = put(&mut store, b"x").unwrap_err();
        server.join().unwrap();

        assert_eq!(err.stage(), Stage::Upload);
        match err {
            ExportError::Upload { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "AccessDenied: nope");
            }
            other => panic!("expected upload error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_message() {
        let body = "<?xml version=\"1.0\"?><Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>";
        assert_eq!(error_message(body), "AccessDenied: Access Denied");
        assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    }
}
