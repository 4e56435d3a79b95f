//! One-shot HTTP responder for exercising the network paths without leaving the machine.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::JoinHandle;

pub struct OneShot {
    addr: SocketAddr,
    handle: JoinHandle<String>,
}

impl OneShot {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for the single exchange and return the raw request head.
    pub fn finish(self) -> String {
        self.handle.join().unwrap()
    }
}

/// Accept exactly one connection, answer it with `status` and `body`, then close.
pub fn serve_once(status: u16, body: Vec<u8>) -> OneShot {
    let len = body.len();
    respond(status, len, body)
}

/// 200 response announcing `declared` bytes but closing after `body`.
pub fn serve_declaring(declared: usize, body: Vec<u8>) -> OneShot {
    respond(200, declared, body)
}

fn respond(status: u16, content_length: usize, body: Vec<u8>) -> OneShot {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let head = read_head(&mut stream);
        let reason = if status == 200 { "OK" } else { "Error" };
        let header = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status, reason, content_length
        );
        // The client may hang up early on error statuses.
        let _ = stream
            .write_all(header.as_bytes())
            .and_then(|_| stream.write_all(&body))
            .and_then(|_| stream.flush());
        head
    });
    OneShot { addr, handle }
}

fn read_head(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => buf.push(byte[0]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// A listener that never answers. `connections()` reports how many clients tried.
pub struct Silent {
    listener: TcpListener,
}

impl Silent {
    pub fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        Silent { listener }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.listener.local_addr().unwrap(), path)
    }

    pub fn connections(&self) -> usize {
        let mut n = 0;
        while self.listener.accept().is_ok() {
            n += 1;
        }
        n
    }
}

/// URL on a port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}
