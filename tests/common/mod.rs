//! Shared mock servers for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Start a mock JSON-RPC node. While `healthy` is set it answers
/// `eth_blockNumber` with 0x64 and `eth_chainId` with 0xc488 (50312),
/// echoing the request id; otherwise it returns 503. Connections are served
/// keep-alive. Returns the bound address.
pub async fn start_json_rpc_node(
    healthy: Arc<AtomicBool>,
    hits: Arc<AtomicU32>,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let healthy = healthy.clone();
                    let hits = hits.clone();
                    tokio::spawn(async move {
                        serve_json_rpc(socket, healthy, hits).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_json_rpc(mut socket: TcpStream, healthy: Arc<AtomicBool>, hits: Arc<AtomicU32>) {
    let mut buf = Vec::new();
    loop {
        let body = match read_http_request(&mut socket, &mut buf).await {
            Some((_, body)) => body,
            None => return,
        };
        hits.fetch_add(1, Ordering::SeqCst);

        let response = if healthy.load(Ordering::SeqCst) {
            json_rpc_reply(&body)
        } else {
            http_response(503, "Service Unavailable", r#"{"error":"unhealthy"}"#)
        };

        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

/// Start a mock JSON-RPC node that answers 429 to the first `reject_first`
/// requests and behaves like a healthy node afterwards. `hits` counts every
/// request. Returns the bound address.
#[allow(dead_code)]
pub async fn start_flaky_json_rpc_node(reject_first: u32, hits: Arc<AtomicU32>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let hits = hits.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        loop {
                            let body = match read_http_request(&mut socket, &mut buf).await {
                                Some((_, body)) => body,
                                None => return,
                            };
                            let n = hits.fetch_add(1, Ordering::SeqCst);
                            let response = if n < reject_first {
                                http_response(
                                    429,
                                    "Too Many Requests",
                                    r#"{"error":"rate limited"}"#,
                                )
                            } else {
                                json_rpc_reply(&body)
                            };
                            if socket.write_all(response.as_bytes()).await.is_err() {
                                return;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

fn json_rpc_reply(request_body: &[u8]) -> String {
    let request: serde_json::Value = serde_json::from_slice(request_body).unwrap_or_default();
    let id = request.get("id").cloned().unwrap_or(serde_json::json!(1));
    let result = match request.get("method").and_then(|m| m.as_str()) {
        Some("eth_chainId") => "0xc488",
        _ => "0x64",
    };
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
    .to_string();
    http_response(200, "OK", &body)
}

/// Start a programmable HTTP backend. Each request invokes `f` for a
/// `(status, body)` pair. Connections are served keep-alive. Returns the
/// bound address.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        loop {
                            if read_http_request(&mut socket, &mut buf).await.is_none() {
                                return;
                            }
                            let (status, body) = f().await;
                            let response = http_response(status, status_text(status), &body);
                            if socket.write_all(response.as_bytes()).await.is_err() {
                                return;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start an HTTP backend that records every request line (method, target,
/// version) into `lines` and answers 200 `{"ok":true}`. Returns the bound
/// address.
#[allow(dead_code)]
pub async fn start_recording_backend(lines: Arc<std::sync::Mutex<Vec<String>>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let lines = lines.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        loop {
                            let line = match read_http_request(&mut socket, &mut buf).await {
                                Some((line, _)) => line,
                                None => return,
                            };
                            lines.lock().unwrap().push(line);
                            let response = http_response(200, "OK", r#"{"ok":true}"#);
                            if socket.write_all(response.as_bytes()).await.is_err() {
                                return;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that accepts connections and drops them immediately,
/// producing a transport error on the client side. Returns the bound address.
#[allow(dead_code)]
pub async fn start_refusing_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => drop(socket),
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP request from the socket, returning its request line and
/// body. `buf` carries leftover bytes between keep-alive requests. Returns
/// None on EOF.
async fn read_http_request(socket: &mut TcpStream, buf: &mut Vec<u8>) -> Option<(String, Vec<u8>)> {
    loop {
        if let Some(header_end) = find_subslice(buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let request_line = headers.lines().next().unwrap_or("").to_string();
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            let total = header_end + 4 + content_length;
            if buf.len() >= total {
                let body = buf[header_end + 4..total].to_vec();
                buf.drain(..total);
                return Some((request_line, body));
            }
        }

        let mut chunk = [0u8; 4096];
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn http_response(status: u16, status_text: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    )
}

#[allow(dead_code)]
fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "OK",
    }
}
