//! A one-shot HTTP/1.1 server for tests.  It accepts a single connection,
//! records the request and answers with whatever the responder returns.

use crate::imp::form::FormBody;
use std::io;
use std::io::prelude::*;
use std::io::BufReader;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn form(&self) -> FormBody {
        let body = String::from_utf8(self.body.clone()).expect("form body is not utf-8");
        FormBody::decode(&body).expect("malformed form body")
    }
}

pub struct MockServer {
    addr: SocketAddr,
    handle: JoinHandle<io::Result<RecordedRequest>>,
}

impl MockServer {
    pub fn start<F>(respond: F) -> MockServer
    where
        F: FnOnce(&RecordedRequest) -> (u16, Vec<u8>) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");
        let handle = thread::spawn(move || serve_one(&listener, respond));

        MockServer { addr, handle }
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    /// Waits for the exchange to complete and returns what the client sent.
    pub fn finish(self) -> RecordedRequest {
        self.handle
            .join()
            .expect("mock server panicked")
            .expect("mock server failed")
    }
}

/// Responds with the decoded value of `key`, like a minifier that leaves its
/// input alone.
pub fn echo_field(key: &'static str) -> impl FnOnce(&RecordedRequest) -> (u16, Vec<u8>) {
    move |req| {
        let form = req.form();
        let value = form.values_of(key).next().unwrap_or("").to_string();
        (200, value.into_bytes())
    }
}

/// An address on which nothing is listening.
pub fn unused_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().expect("no local address");
    drop(listener);
    addr.to_string()
}

fn serve_one<F>(listener: &TcpListener, respond: F) -> io::Result<RecordedRequest>
where
    F: FnOnce(&RecordedRequest) -> (u16, Vec<u8>),
{
    let (stream, _) = listener.accept()?;
    let req = read_request(&stream)?;
    let (status, body) = respond(&req);
    write_response(&stream, status, &body)?;
    Ok(req)
}

fn read_request(stream: &TcpStream) -> io::Result<RecordedRequest> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(colon) = line.find(':') {
            let (name, value) = line.split_at(colon);
            headers.push((name.trim().to_string(), value[1..].trim().to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body)?;

    Ok(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn write_response(mut stream: &TcpStream, status: u16, body: &[u8]) -> io::Result<()> {
    let reason = if status == 200 { "OK" } else { "Error" };
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    )?;
    stream.write_all(body)?;
    stream.flush()
}
