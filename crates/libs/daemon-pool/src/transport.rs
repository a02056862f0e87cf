use crate::error::InstanceError;
use crate::http::{self, HttpReply};
use crate::instance::Instance;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Sends one serialized JSON-RPC body to one instance.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, instance: &Instance, body: &[u8]) -> Result<HttpReply, InstanceError>;
}

/// Plain-TCP HTTP/1.1 transport, one connection per request.
#[derive(Clone, Debug, Default)]
pub struct TcpTransport;

impl TcpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn post(&self, instance: &Instance, body: &[u8]) -> Result<HttpReply, InstanceError> {
        let mut stream = TcpStream::connect((instance.host(), instance.port()))
            .await
            .map_err(classify_connect_error)?;

        let request = http::build_http_post(instance, body);
        stream.write_all(&request).await.map_err(request_error)?;

        // daemons may keep the socket open after a complete reply
        let mut response = Vec::new();
        let mut chunk = [0_u8; 8192];
        loop {
            let read = stream.read(&mut chunk).await.map_err(request_error)?;
            if read == 0 {
                break;
            }
            response.extend_from_slice(&chunk[..read]);
            if http::response_complete(&response) {
                break;
            }
        }
        log::debug!("rpc({}): {} bytes in, {} bytes out", instance.index(), response.len(), body.len());

        http::parse_http_response(&response).map_err(request_error)
    }
}

fn classify_connect_error(err: io::Error) -> InstanceError {
    if err.kind() == io::ErrorKind::ConnectionRefused {
        InstanceError::offline(err.to_string())
    } else {
        request_error(err)
    }
}

fn request_error(err: io::Error) -> InstanceError {
    InstanceError::request(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceConfig;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn instance_on(port: u16) -> Instance {
        Instance::from_configs(vec![InstanceConfig::new(port, "user", "pass")]).remove(0)
    }

    #[test]
    fn refused_connections_are_offline() {
        let err = classify_connect_error(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(matches!(err, InstanceError::Offline { .. }));

        let err = classify_connect_error(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(matches!(err, InstanceError::Request { .. }));
    }

    #[tokio::test]
    async fn closed_port_reports_offline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = TcpTransport::new().post(&instance_on(port), b"{}").await.unwrap_err();
        assert!(matches!(err, InstanceError::Offline { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_request_error() {
        let instance = Instance::from_configs(vec![
            InstanceConfig::new(8332, "u", "p").with_host("no-such-host.invalid")
        ])
        .remove(0);
        let err = TcpTransport::new().post(&instance, b"{}").await.unwrap_err();
        assert!(matches!(err, InstanceError::Request { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn posts_body_and_reads_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buffer = Vec::new();
            loop {
                let mut chunk = [0_u8; 1024];
                let read = stream.read(&mut chunk).await.unwrap();
                buffer.extend_from_slice(&chunk[..read]);
                if let Some(end) = http::find_header_end(&buffer) {
                    let length = http::parse_content_length(&buffer[..end]).unwrap();
                    if buffer.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let reply = b"HTTP/1.1 200 OK\r\nContent-Length: 15\r\n\r\n{\"result\":true}";
            stream.write_all(reply).await.unwrap();
            stream.shutdown().await.unwrap();
            buffer
        });

        let reply = TcpTransport::new().post(&instance_on(port), b"{\"id\":1}").await.unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, b"{\"result\":true}");

        let request = server.await.unwrap();
        assert!(request.ends_with(b"{\"id\":1}"));
    }

    async fn read_request(stream: &mut TcpStream) {
        let mut buffer = Vec::new();
        loop {
            let mut chunk = [0_u8; 1024];
            let read = stream.read(&mut chunk).await.unwrap();
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(end) = http::find_header_end(&buffer) {
                let length = http::parse_content_length(&buffer[..end]).unwrap();
                if buffer.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn keep_alive_reply_completes_without_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (release, held) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            let reply = b"HTTP/1.1 200 OK\r\nContent-Length: 32\r\nConnection: keep-alive\r\n\r\n{\"result\":1,\"error\":null,\"id\":1}";
            stream.write_all(reply).await.unwrap();
            // hold the connection open until the client is done
            let _ = held.await;
        });

        let reply = tokio::time::timeout(
            Duration::from_secs(3),
            TcpTransport::new().post(&instance_on(port), b"{\"id\":1}"),
        )
        .await
        .expect("complete reply must not wait for the server to close")
        .unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, br#"{"result":1,"error":null,"id":1}"#);
        drop(release);
    }

    #[tokio::test]
    async fn keep_alive_chunked_reply_completes_without_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (release, held) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n")
                .await
                .unwrap();
            stream.write_all(b"6\r\n{\"a\":1\r\n").await.unwrap();
            stream.write_all(b"1\r\n}\r\n0\r\n\r\n").await.unwrap();
            let _ = held.await;
        });

        let reply = tokio::time::timeout(
            Duration::from_secs(3),
            TcpTransport::new().post(&instance_on(port), b"{}"),
        )
        .await
        .expect("chunked reply must end at the zero-size chunk")
        .unwrap();
        assert_eq!(reply.body, br#"{"a":1}"#);
        drop(release);
    }
}
