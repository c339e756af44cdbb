//! In-process stand-in for the negotiation backend.
//!
//! One TCP listener serves both halves of the protocol, the way the real
//! backend does: plain HTTP for `/api/...` and a WebSocket upgrade for
//! `/ws/negotiation/{id}`. Everything it sees is recorded for assertions.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use salary_negotiator::ClientConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// How the mock answers.
#[derive(Clone)]
pub struct Script {
    pub start_status: u16,
    pub start_body: String,
    /// Body for `GET /api/session/{id}`; `None` answers 404.
    pub snapshot: Option<String>,
    /// Pushed to each channel right after the upgrade.
    pub greetings: Vec<String>,
    /// Reply to each inbound text frame, if set.
    pub reply: Option<fn(&str) -> String>,
    /// Close the channel from the server side after the greetings.
    pub close_after_greetings: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            start_status: 200,
            start_body: r#"{"session_id":"s1"}"#.to_string(),
            snapshot: None,
            greetings: Vec::new(),
            reply: None,
            close_after_greetings: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl HttpRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub http: Vec<HttpRequest>,
    pub ws_paths: Vec<String>,
    pub ws_inbound: Vec<String>,
    pub ws_closes: usize,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl MockBackend {
    pub async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        let rec = Arc::clone(&recorded);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let script = script.clone();
                let rec = Arc::clone(&rec);
                tokio::spawn(async move {
                    let _ = handle_connection(stream, script, rec).await;
                });
            }
        });

        Self { addr, recorded }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url()).expect("valid base url");
        config.connect_timeout = Duration::from_secs(2);
        config.request_timeout = Duration::from_secs(5);
        config
    }

    /// Poll the recording until `cond` holds, or panic after two seconds.
    pub async fn wait_for(&self, what: &str, cond: impl Fn(&Recorded) -> bool) {
        for _ in 0..200 {
            if cond(&self.recorded.lock().unwrap()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {what}");
    }

    pub fn http_requests(&self) -> Vec<HttpRequest> {
        self.recorded.lock().unwrap().http.clone()
    }
}

async fn handle_connection(
    stream: TcpStream,
    script: Script,
    rec: Arc<Mutex<Recorded>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let head = peek_head(&stream).await?;
    if head.to_ascii_lowercase().contains("upgrade: websocket") {
        handle_ws(stream, script, rec).await
    } else {
        handle_http(stream, script, rec).await
    }
}

/// Peek until the request head is complete without consuming it.
async fn peek_head(stream: &TcpStream) -> std::io::Result<String> {
    let mut buf = [0u8; 4096];
    for _ in 0..200 {
        let n = stream.peek(&mut buf).await?;
        let text = String::from_utf8_lossy(&buf[..n]).to_string();
        if text.contains("\r\n\r\n") || n == buf.len() {
            return Ok(text);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "incomplete request head"))
}

async fn handle_http(
    mut stream: TcpStream,
    script: Script,
    rec: Arc<Mutex<Recorded>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let (method, path, head_len, content_length) = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);

        let mut headers = [httparse::EMPTY_HEADER; 32];
        let mut req = httparse::Request::new(&mut headers);
        if let httparse::Status::Complete(head_len) = req.parse(&buf)? {
            let content_length = req
                .headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case("content-length"))
                .and_then(|h| std::str::from_utf8(h.value).ok())
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            break (
                req.method.unwrap_or("").to_string(),
                req.path.unwrap_or("").to_string(),
                head_len,
                content_length,
            );
        }
    };

    while buf.len() < head_len + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(head_len + content_length);
    let body = String::from_utf8_lossy(&buf[head_len..end]).to_string();

    rec.lock().unwrap().http.push(HttpRequest {
        method: method.clone(),
        path: path.clone(),
        body,
    });

    let (status, body) = match (method.as_str(), path.as_str()) {
        ("POST", "/api/start-negotiation") => (script.start_status, script.start_body.clone()),
        ("GET", p) if p.starts_with("/api/session/") => match &script.snapshot {
            Some(snap) => (200, snap.clone()),
            None => (404, r#"{"detail":"Session not found"}"#.to_string()),
        },
        _ => (404, r#"{"detail":"Not Found"}"#.to_string()),
    };
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

async fn handle_ws(
    stream: TcpStream,
    script: Script,
    rec: Arc<Mutex<Recorded>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path_rec = Arc::clone(&rec);
    let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        path_rec.lock().unwrap().ws_paths.push(req.uri().path().to_string());
        Ok(resp)
    };
    let ws = tokio_tungstenite::accept_hdr_async(stream, callback).await?;
    let (mut sink, mut source) = ws.split();

    for greeting in &script.greetings {
        sink.send(WsMessage::Text(greeting.clone())).await?;
    }
    if script.close_after_greetings {
        sink.send(WsMessage::Close(None)).await?;
    }

    while let Some(msg) = source.next().await {
        match msg {
            Ok(WsMessage::Text(text)) => {
                rec.lock().unwrap().ws_inbound.push(text.clone());
                if let Some(reply) = script.reply {
                    sink.send(WsMessage::Text(reply(&text))).await?;
                }
            }
            Ok(WsMessage::Close(_)) => {
                rec.lock().unwrap().ws_closes += 1;
                break;
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    Ok(())
}
