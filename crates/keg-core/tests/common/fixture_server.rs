//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body at any path. Can be told to answer with a
//! fixed error status, or to fail the first N requests with 503 (for retry
//! tests). Runs in a background thread until the process exits.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct FixtureServerOptions {
    /// Status for ordinary responses (200 serves the body, others serve nothing).
    pub status: u16,
    /// Answer the first N requests with 503 before serving normally.
    pub fail_first: u32,
}

impl Default for FixtureServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            fail_first: 0,
        }
    }
}

pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, FixtureServerOptions::default())
}

/// Starts the server and returns its base URL (e.g. "http://127.0.0.1:12345/").
pub fn start_with_options(body: Vec<u8>, opts: FixtureServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let served = Arc::new(AtomicU32::new(0));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let served = Arc::clone(&served);
            thread::spawn(move || handle(stream, &body, opts, &served));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: FixtureServerOptions,
    served: &AtomicU32,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    // Drain the request line and headers; the path does not matter.
    let mut buf = [0u8; 8192];
    if matches!(stream.read(&mut buf), Ok(0) | Err(_)) {
        return;
    }

    let request_no = served.fetch_add(1, Ordering::SeqCst);
    let status = if request_no < opts.fail_first {
        503
    } else {
        opts.status
    };

    if status == 200 {
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(header.as_bytes());
        let _ = stream.write_all(body);
    } else {
        let header = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status,
            reason(status)
        );
        let _ = stream.write_all(header.as_bytes());
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    }
}
