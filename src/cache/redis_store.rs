use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::{AsyncCommands, Client, RedisError, aio::MultiplexedConnection};
use tracing::info;

use super::store::{CacheError, CacheStore};

/// Redis backend over a shared multiplexed connection.
///
/// Every command is bounded by `command_timeout`; a server that stops
/// answering surfaces as [`CacheError::Backend`] instead of a stalled request.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: MultiplexedConnection,
    command_timeout: Duration,
}

impl RedisCacheStore {
    /// Open a connection, failing if the server is not reachable within `connect_timeout`.
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(CacheError::backend)?;
        let connection =
            tokio::time::timeout(connect_timeout, client.get_multiplexed_async_connection())
                .await
                .map_err(|_| {
                    CacheError::backend(format!(
                        "connecting to redis timed out after {connect_timeout:?}"
                    ))
                })?
                .map_err(CacheError::backend)?;

        info!("connected to redis cache backend");
        Ok(Self {
            connection,
            command_timeout,
        })
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        command: impl Future<Output = Result<T, RedisError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.command_timeout, command)
            .await
            .map_err(|_| {
                CacheError::backend(format!(
                    "redis {op} timed out after {:?}",
                    self.command_timeout
                ))
            })?
            .map_err(CacheError::backend)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut connection = self.connection.clone();
        let value: Option<Vec<u8>> = self.bounded("GET", connection.get(key)).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        self.bounded::<()>("SETEX", connection.set_ex(key, value.as_ref(), seconds))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use std::net::SocketAddr;

    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    /// Number of RESP command arrays in `chunk` and whether any is a data command.
    fn inspect(chunk: &[u8]) -> (usize, bool) {
        let text = String::from_utf8_lossy(chunk);
        let lines: Vec<&str> = text.split("\r\n").collect();
        let commands = lines
            .iter()
            .filter(|line| {
                line.strip_prefix('*')
                    .is_some_and(|count| !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()))
            })
            .count();
        let data = lines.iter().any(|line| {
            line.eq_ignore_ascii_case("GET") || line.eq_ignore_ascii_case("SETEX")
        });
        (commands, data)
    }

    async fn write_all(stream: &TcpStream, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            stream.writable().await.expect("writable");
            match stream.try_write(bytes) {
                Ok(written) => bytes = &bytes[written..],
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => panic!("write failed: {err}"),
            }
        }
    }

    /// Acknowledges connection setup with `+OK`, then never answers GET or SETEX.
    async fn stalling_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buffer = vec![0u8; 4096];
                    let mut stalled = false;
                    loop {
                        if stream.readable().await.is_err() {
                            return;
                        }
                        let read = match stream.try_read(&mut buffer) {
                            Ok(0) => return,
                            Ok(read) => read,
                            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                            Err(_) => return,
                        };
                        let (commands, data) = inspect(&buffer[..read]);
                        stalled |= data;
                        if !stalled {
                            for _ in 0..commands {
                                write_all(&stream, b"+OK\r\n").await;
                            }
                        }
                    }
                });
            }
        });
        addr
    }

    #[test]
    fn counts_pipelined_commands() {
        let chunk = b"*2\r\n$6\r\nCLIENT\r\n$7\r\nSETINFO\r\n*2\r\n$3\r\nGET\r\n$1\r\nk\r\n";
        assert_eq!(inspect(chunk), (2, true));
        assert_eq!(inspect(b"*1\r\n$4\r\nPING\r\n"), (1, false));
    }

    #[tokio::test]
    async fn unresponsive_server_fails_commands_within_the_timeout() {
        let addr = stalling_server().await;
        let store = RedisCacheStore::connect(
            &format!("redis://{addr}"),
            Duration::from_secs(2),
            Duration::from_millis(200),
        )
        .await
        .expect("handshake acknowledged");

        let get = tokio::time::timeout(Duration::from_secs(5), store.get("/api/v1/genre/"))
            .await
            .expect("get must not hang");
        assert!(matches!(get, Err(CacheError::Backend(message)) if message.contains("timed out")));

        let set = tokio::time::timeout(
            Duration::from_secs(5),
            store.set("/api/v1/genre/", Bytes::from_static(b"[]"), Duration::from_secs(60)),
        )
        .await
        .expect("set must not hang");
        assert!(matches!(set, Err(CacheError::Backend(_))));
    }
}
