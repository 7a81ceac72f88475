use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    request_lines: Arc<Mutex<Vec<String>>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

impl ServerHandle {
    /// Request lines (`GET /path HTTP/1.1`) seen so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the request log lock is poisoned.
    pub fn request_lines(&self) -> Result<Vec<String>, String> {
        self.request_lines
            .lock()
            .map(|guard| guard.clone())
            .map_err(|err| format!("request log poisoned: {}", err))
    }
}

/// Spawn a lightweight HTTP server for tests that answers with `status`.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server(status: u16) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let request_lines = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&request_lines);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let recorded = Arc::clone(&recorded);
                    thread::spawn(move || handle_client(stream, status, &recorded));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
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
            request_lines,
        },
    ))
}

/// Like [`spawn_http_server`], but skips when the sandbox forbids sockets.
///
/// # Errors
///
/// Returns an error for any failure other than a denied bind.
pub fn spawn_http_server_or_skip(status: u16) -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_http_server(status) {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn handle_client(stream: TcpStream, status: u16, recorded: &Mutex<Vec<String>>) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => return,
            Ok(_) if header.trim_end().is_empty() => break,
            Ok(_) => {}
        }
    }
    if let Ok(mut guard) = recorded.lock() {
        guard.push(request_line.trim_end().to_owned());
    }

    let response = format!(
        "HTTP/1.1 {} Test\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
        status
    );
    let mut stream = stream;
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `rinha-load` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_rinha_load<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_rinha_load_with_host_env(args, None)
}

/// Run the `rinha-load` binary with `RINHA_LOAD_HOST` set to `host_env`
/// (removed when `None`).
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_rinha_load_with_host_env<I, S>(args: I, host_env: Option<&str>) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = rinha_load_bin()?;
    let mut command = Command::new(bin);
    command.args(args).env("RINHA_LOAD_LOG", "error");
    match host_env {
        Some(host) => command.env("RINHA_LOAD_HOST", host),
        None => command.env_remove("RINHA_LOAD_HOST"),
    };
    command
        .output()
        .map_err(|err| format!("run rinha-load failed: {}", err))
}

fn rinha_load_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_rinha-load").map_or_else(
        || Err("CARGO_BIN_EXE_rinha-load missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
