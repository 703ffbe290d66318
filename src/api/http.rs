//! Implements the `Transport` trait over HTTP with `reqwest`.

use crate::api::{ApiError, ApiRequest, Body, Method, Part, RawResponse, Transport};
use reqwest::multipart::Form;
use reqwest::Client;
use std::time::Duration;
use tracing::trace;
use url::Url;

pub struct HttpTransport {
    base: Url,
    timeout: Duration,
    client: Client,
}

impl HttpTransport {
    /// `base` must end with a slash so that relative paths are joined under it.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base,
            timeout,
            client,
        })
    }

    fn url(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self
            .base
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    fn map_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                timeout: self.timeout,
            }
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

fn form(parts: &[Part]) -> Form {
    parts.iter().fold(Form::new(), |form, part| match part {
        Part::Text { name, value } => form.text(name.clone(), value.clone()),
        Part::File {
            name,
            file_name,
            bytes,
        } => form.part(
            name.clone(),
            reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone()),
        ),
    })
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let url = self.url(request)?;
        trace!("{} {url}", request.method);

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(parts) => builder.multipart(form(parts)),
        };

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(e))?;
        trace!("{} answered {status}", request.endpoint());
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    /// What the local server does after reading the request.
    enum Reply {
        Stall,
        Json(&'static str),
    }

    /// Accepts one connection on a local port and sends back the raw request text.
    async fn serve_once(reply: Reply) -> (Url, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = Url::parse(&format!("http://{addr}/api/")).unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let _ = tx.send(request);
            match reply {
                Reply::Stall => tokio::time::sleep(Duration::from_secs(10)).await,
                Reply::Json(body) => {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    let _ = socket.shutdown().await;
                }
            }
        });
        (base, rx)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let done = if head.contains("transfer-encoding: chunked") {
                buf.ends_with(b"0\r\n\r\n")
            } else {
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                buf.len() - (end + 4) >= length
            };
            if done {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_bearer_header_and_timeout() {
        let (base, request) = serve_once(Reply::Stall).await;
        let transport = HttpTransport::new(base, Duration::from_millis(300)).unwrap();
        let mut get = ApiRequest::get("companies");
        get.bearer = Some("tok".to_string());

        let e = transport.send(&get).await.unwrap_err();
        assert!(
            matches!(e, ApiError::Timeout { timeout } if timeout == Duration::from_millis(300)),
            "{e:?}"
        );
        let head = request.await.unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /api/companies http/1.1\r\n"));
        assert!(head.contains("\r\nauthorization: bearer tok\r\n"));
    }

    #[tokio::test]
    async fn test_multipart_body() {
        let (base, request) = serve_once(Reply::Json(r#"{"success":true}"#)).await;
        let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();
        let post = ApiRequest::post("customers").multipart(vec![
            Part::Text {
                name: "city".to_string(),
                value: "Pune".to_string(),
            },
            Part::File {
                name: "panCard".to_string(),
                file_name: "pan.png".to_string(),
                bytes: b"png".to_vec(),
            },
        ]);

        let response = transport.send(&post).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"success":true}"#);

        let text = request.await.unwrap();
        assert!(text.starts_with("POST /api/customers HTTP/1.1\r\n"));
        assert!(text
            .to_ascii_lowercase()
            .contains("content-type: multipart/form-data; boundary="));
        assert!(text.contains("name=\"city\"\r\n\r\nPune\r\n"));
        assert!(text.contains("name=\"panCard\"; filename=\"pan.png\""));
        assert!(text.contains("\r\n\r\npng\r\n"));
    }

    #[test]
    fn test_url_join_and_query() {
        let base = Url::parse("https://api.example.com/v1/").unwrap();
        let transport = HttpTransport::new(base, Duration::from_secs(15)).unwrap();
        let request = ApiRequest::get("/transactions/cashbook").query(vec![
            ("companyId".into(), "2".into()),
            ("startDate".into(), "2024-01-01".into()),
        ]);
        assert_eq!(
            transport.url(&request).unwrap().as_str(),
            "https://api.example.com/v1/transactions/cashbook?companyId=2&startDate=2024-01-01"
        );
        let request = ApiRequest::get("transactions/4/slip")
            .query(vec![("type".into(), "borrower".into())]);
        assert_eq!(
            transport.url(&request).unwrap().as_str(),
            "https://api.example.com/v1/transactions/4/slip?type=borrower"
        );
    }
}
