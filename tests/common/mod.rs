#![allow(dead_code)]

pub mod test_server {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod http {
    use std::io::{ErrorKind, Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// A parsed HTTP/1.1 response.
    #[derive(Debug)]
    pub struct RawResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl RawResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn body_text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    /// Write `req` verbatim and read until the server closes the connection.
    pub fn send_raw(addr: SocketAddr, req: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream.write_all(req).unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::ConnectionReset => break,
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        buf
    }

    /// Send one request with `Connection: close` and parse the reply.
    pub fn send_request(addr: SocketAddr, method: &str, target: &str) -> RawResponse {
        let req = format!("{method} {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        let raw = send_raw(addr, req.as_bytes());
        parse_responses(&raw).into_iter().next().unwrap()
    }

    /// Split a byte stream holding one or more responses framed by
    /// `Content-Length`.
    pub fn parse_responses(mut raw: &[u8]) -> Vec<RawResponse> {
        let mut out = Vec::new();
        while !raw.is_empty() {
            let head_end = raw
                .windows(4)
                .position(|w| w == b"\r\n\r\n")
                .expect("response head terminator");
            let head = std::str::from_utf8(&raw[..head_end]).unwrap();
            let mut lines = head.split("\r\n");
            let status = lines
                .next()
                .and_then(|l| l.split_whitespace().nth(1))
                .and_then(|s| s.parse().ok())
                .unwrap();
            let headers: Vec<(String, String)> = lines
                .filter_map(|l| l.split_once(':'))
                .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
                .collect();
            let len: usize = headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
                .map(|(_, v)| v.parse().unwrap())
                .unwrap_or(0);
            let body_start = head_end + 4;
            out.push(RawResponse {
                status,
                headers,
                body: raw[body_start..body_start + len].to_vec(),
            });
            raw = &raw[body_start + len..];
        }
        out
    }
}
