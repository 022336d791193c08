//! Liveness endpoint for the hosting environment.
//!
//! Answers every HTTP request on the configured port with a static 200,
//! from a dedicated thread, independent of canvas state. Keeps
//! idle-shutdown watchdogs satisfied; nothing more.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

const STATUS_BODY: &str = "pixelboard online";
const REQUEST_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Binds the listener and serves it from a background thread.
///
/// Returns the bound address so callers (and tests, via port 0) know where
/// the endpoint landed. Bind failures surface here; per-connection errors
/// are logged and skipped.
pub fn spawn(port: u16) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    let addr = listener.local_addr()?;

    thread::spawn(move || {
        for connection in listener.incoming() {
            match connection {
                Ok(stream) => {
                    if let Err(err) = respond(stream) {
                        tracing::warn!(?err, "liveness response failed");
                    }
                }
                Err(err) => tracing::warn!(?err, "liveness accept failed"),
            }
        }
    });

    tracing::info!(%addr, "liveness endpoint up");
    Ok(addr)
}

fn respond(mut stream: TcpStream) -> std::io::Result<()> {
    // Drain whatever fits in one read; the reply is the same regardless.
    stream.set_read_timeout(Some(REQUEST_READ_TIMEOUT))?;
    let mut request = [0u8; 512];
    let _ = stream.read(&mut request);

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        STATUS_BODY.len(),
        STATUS_BODY
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn endpoint_answers_a_get_with_200_and_the_static_body() {
        let addr = spawn(0).expect("endpoint binds on an ephemeral port");

        let mut stream =
            TcpStream::connect(("127.0.0.1", addr.port())).expect("endpoint accepts connections");
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .expect("request writes");

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .expect("response reads");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with(STATUS_BODY));
    }
}
