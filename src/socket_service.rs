//! Unix-socket service exposing both recognition engines over a small
//! line-oriented protocol.
//!
//! Grounded on `SocketService` in the teacher crate: same
//! bind/remove-stale-socket/accept-loop shape and `default_socket_path`
//! (still keyed off the caller's uid via `libc::getuid`), generalized from
//! a single character-matching request to a mode flag selecting between
//! [`crate::paleo::PaleoRecognizer`] and [`crate::dollarp::DpContext`].

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, error, info, warn};

use crate::dollarp::DpContext;
use crate::paleo::PaleoRecognizer;
use crate::stroke::Stroke;

/// Unix-socket recognition service. Holds one `PaleoRecognizer` (not
/// re-entrant per spec.md §5) behind a mutex so a single service instance
/// can serve sequential connections from multiple client threads; the $P
/// context is read-only once templates are loaded, so it needs no lock.
pub struct SocketService {
    paleo: Mutex<PaleoRecognizer>,
    dollarp: DpContext,
    socket_path: String,
}

/// Request line format: `mode\tx0,y0,t0;x1,y1,t1;...`, where `mode` is
/// `paleo` or `dollarp`.
enum Request {
    Paleo(Stroke),
    DollarP(Stroke),
}

fn parse_stroke(field: &str) -> Result<Stroke, String> {
    if field.is_empty() {
        return Err("empty stroke".to_string());
    }
    let mut stroke = Stroke::create(field.matches(';').count() + 1);
    for point_str in field.split(';') {
        let mut parts = point_str.split(',');
        let mut next = |label: &str| -> Result<i64, String> {
            parts
                .next()
                .ok_or_else(|| format!("missing {label}"))?
                .parse::<i64>()
                .map_err(|_| format!("invalid {label}"))
        };
        let x = next("x")?;
        let y = next("y")?;
        let t = next("t")?;
        stroke.append(x, y, t);
    }
    Ok(stroke)
}

fn parse_request(line: &str) -> Result<Request, String> {
    let mut parts = line.trim().splitn(2, '\t');
    let mode = parts.next().ok_or("missing mode")?;
    let stroke_field = parts.next().ok_or("missing stroke")?;
    let stroke = parse_stroke(stroke_field)?;
    match mode {
        "paleo" => Ok(Request::Paleo(stroke)),
        "dollarp" => Ok(Request::DollarP(stroke)),
        other => Err(format!("unknown mode '{other}'")),
    }
}

impl SocketService {
    /// Creates a new service over an already-configured recognizer and
    /// template library.
    pub fn new(paleo: PaleoRecognizer, dollarp: DpContext, socket_path: String) -> Self {
        Self {
            paleo: Mutex::new(paleo),
            dollarp,
            socket_path,
        }
    }

    /// Binds the Unix socket and serves connections until the process
    /// exits or a fatal I/O error occurs.
    pub fn start(&self) -> std::io::Result<()> {
        if let Some(parent) = Path::new(&self.socket_path).parent() {
            fs::create_dir_all(parent)?;
        }
        let _ = fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!(socket_path = %self.socket_path, "listening");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.handle_client(stream) {
                        warn!(error = %e, "error handling client");
                    }
                }
                Err(e) => error!(error = %e, "connection error"),
            }
        }

        Ok(())
    }

    fn handle_client(&self, mut stream: UnixStream) -> std::io::Result<()> {
        let mut line = String::new();
        {
            let mut reader = BufReader::new(&stream);
            reader.read_line(&mut line)?;
        }

        let request = match parse_request(&line) {
            Ok(r) => r,
            Err(msg) => {
                stream.write_all(format!("ERROR\t{msg}\n").as_bytes())?;
                return Ok(());
            }
        };

        match request {
            Request::Paleo(stroke) => {
                let mut rec = self.paleo.lock().expect("paleo recognizer lock poisoned");
                match rec.recognize(&stroke) {
                    Ok(kind) => {
                        debug!(?kind, "paleo recognized");
                        stream.write_all(format!("{kind:?}\n").as_bytes())?;
                    }
                    Err(e) => {
                        stream.write_all(format!("ERROR\t{e}\n").as_bytes())?;
                    }
                }
            }
            Request::DollarP(stroke) => {
                let result = self.dollarp.recognize(&stroke);
                debug!(template = ?result.template, score = result.score, "dollarp recognized");
                match result.template {
                    Some(name) => {
                        stream.write_all(format!("{name}\t{:.4}\n", result.score).as_bytes())?;
                    }
                    None => {
                        stream.write_all(b"NONE\t0.0000\n")?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Socket path keyed off the caller's uid, matching the teacher's
/// `default_socket_path` but under this crate's own run-directory name.
pub fn default_socket_path() -> String {
    let uid = unsafe { libc::getuid() };
    format!("/run/user/{uid}/strokeshapes/strokeshapes.socket")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_parse_request_paleo() {
        let req = parse_request("paleo\t0,0,0;100,0,10;200,0,20").unwrap();
        match req {
            Request::Paleo(s) => assert_eq!(s.len(), 3),
            _ => panic!("expected paleo request"),
        }
    }

    #[test]
    fn test_parse_request_unknown_mode_errors() {
        assert!(parse_request("bogus\t0,0,0").is_err());
    }

    #[test]
    fn test_parse_request_missing_stroke_errors() {
        assert!(parse_request("paleo").is_err());
    }

    #[test]
    fn test_socket_service_paleo_roundtrip() {
        let socket_path = format!("/tmp/strokeshapes_test_{}.socket", std::process::id());
        let service = SocketService::new(
            PaleoRecognizer::new(),
            DpContext::create(),
            socket_path.clone(),
        );

        thread::spawn(move || {
            let _ = service.start();
        });
        thread::sleep(Duration::from_millis(100));

        let mut stream = UnixStream::connect(&socket_path).expect("failed to connect");
        stream
            .write_all(b"paleo\t0,0,0;100,0,10;200,0,20\n")
            .expect("failed to write");

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .expect("failed to read");

        assert!(!response.is_empty());
        assert!(!response.starts_with("ERROR"));

        let _ = fs::remove_file(&socket_path);
    }
}
