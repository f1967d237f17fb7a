use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Body length announced by [`spawn_truncated_server`].
pub(crate) const TRUNCATED_DECLARED_LEN: usize = 100;
/// Body bytes actually sent by [`spawn_truncated_server`].
pub(crate) const TRUNCATED_SENT: &str = "0123456789";

pub(crate) struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Serves `body` to every connection after waiting `delay`.
pub(crate) fn spawn_server(
    body: &'static str,
    delay: Duration,
) -> Result<(String, ServerHandle), String> {
    spawn_with(move |stream| handle_client(stream, body, delay))
}

/// Announces a longer body than it sends, then waits `stall` before closing.
pub(crate) fn spawn_truncated_server(stall: Duration) -> Result<(String, ServerHandle), String> {
    spawn_with(move |stream| handle_truncated(stream, stall))
}

/// Answers every request with its own path as the body.
pub(crate) fn spawn_path_echo_server() -> Result<(String, ServerHandle), String> {
    spawn_with(handle_path_echo)
}

fn spawn_with<F>(handler: F) -> Result<(String, ServerHandle), String>
where
    F: Fn(TcpStream) + Clone + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            match listener.accept() {
                Ok((stream, _)) => {
                    let handler = handler.clone();
                    thread::spawn(move || handler(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    if stream.set_nonblocking(false).is_err() {
        return None;
    }
    let mut buffer = [0u8; 1024];
    let read = stream.read(&mut buffer).ok()?;
    buffer
        .get(..read)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

fn respond(mut stream: TcpStream, response: &str) {
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn ok_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn handle_client(mut stream: TcpStream, body: &str, delay: Duration) {
    if read_request(&mut stream).is_none() {
        return;
    }
    thread::sleep(delay);
    respond(stream, &ok_response(body));
}

fn handle_truncated(mut stream: TcpStream, stall: Duration) {
    if read_request(&mut stream).is_none() {
        return;
    }
    let partial = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        TRUNCATED_DECLARED_LEN, TRUNCATED_SENT
    );
    if stream.write_all(partial.as_bytes()).is_err() || stream.flush().is_err() {
        return;
    }
    thread::sleep(stall);
    drop(stream.shutdown(Shutdown::Both));
}

fn handle_path_echo(mut stream: TcpStream) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    // "GET /path HTTP/1.1"
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();
    respond(stream, &ok_response(&path));
}

/// An address nothing listens on.
pub(crate) fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}
