use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use tracing::{info, warn};

use crate::parallel::WorkerPool;

pub mod api;
pub mod routes;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_ITERATIONS: u32 = 5000;

/// Settings shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub default_iterations: u32,
    pub pool: WorkerPool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_iterations: DEFAULT_ITERATIONS,
            pool: WorkerPool::default(),
        }
    }
}

pub fn run_server(bind_addr: &str, config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!("broadside server listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, config) {
                    warn!("request error: {err}");
                }
            }
            Err(err) => warn!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &mut TcpStream, config: &ServerConfig) -> std::io::Result<()> {
    let mut buffer = [0_u8; 65_536];
    let bytes_read = stream.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let body = request
        .split("\r\n\r\n")
        .nth(1)
        .or_else(|| request.split("\n\n").nth(1))
        .unwrap_or("");

    let response = routes::route_request(method, path, body, config);
    info!(method, path, status = response.status_code, "request handled");
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}
