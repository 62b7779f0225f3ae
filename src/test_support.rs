// SPDX-License-Identifier: GPL-3.0-only

//! Helpers shared by unit tests

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Local HTTP server answering exactly one request
pub(crate) struct OneShotServer {
    /// `http://127.0.0.1:<port>`, without a trailing slash
    pub base_url: String,
    request: JoinHandle<String>,
}

impl OneShotServer {
    /// Raw text of the request the server received (head and body)
    pub async fn request(self) -> String {
        self.request.await.unwrap()
    }
}

/// Answer a single HTTP request with `status` and `body`
pub(crate) async fn serve_once(status: &'static str, body: &[u8]) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let body = body.to_vec();

    let request = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;

        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&raw).into_owned()
    });

    OneShotServer { base_url, request }
}

/// Read the request head, then as much body as Content-Length announces
async fn read_request(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return raw;
        }
        raw.extend_from_slice(&chunk[..n]);

        let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if raw.len() >= end + 4 + content_length {
            return raw;
        }
    }
}

/// Split a raw request into its head and body
pub(crate) fn split_request(raw: &str) -> (&str, &str) {
    raw.split_once("\r\n\r\n").unwrap_or((raw, ""))
}
