use log::info;
use rand::rngs::OsRng;
use shared::{CodecError, Pair, Protocol, Request, Response, DEFAULT_PORT};
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::time::timeout;
use uuid::Uuid;

pub const DEFAULT_FEE: u64 = 150;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to server: {0}")]
    Connect(#[source] std::io::Error),

    #[error("failed to send {round} request: {source}")]
    Send {
        round: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("failed to decode {round} response: {source}")]
    Receive {
        round: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("failed to generate guess: {0}")]
    Random(#[source] rand::Error),

    #[error("play did not finish within {0:?}")]
    Timeout(Duration),
}

/// Plays one lottery game per connection against a server.
#[derive(Debug, Clone)]
pub struct Client {
    addr: String,
    protocol: Protocol,
    timeout: Duration,
}

impl Client {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
            protocol: Protocol::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Plays the initial round and, if granted, the fee-free bonus round.
    /// Returns the last response received.
    pub async fn play(&self, fee: u64) -> Result<Response, ClientError> {
        timeout(self.timeout, self.exchange(fee))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }

    async fn exchange(&self, fee: u64) -> Result<Response, ClientError> {
        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(ClientError::Connect)?;
        let local = stream
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default();
        let (reader, mut writer) = stream.split();
        let mut reader = BufReader::new(reader);

        let req = Request::new(Uuid::new_v4(), fee, random_guess()?);
        info!("{} request: {}", local, req);
        self.protocol
            .write_request(&mut writer, &req)
            .await
            .map_err(|source| ClientError::Send {
                round: "initial",
                source,
            })?;

        let resp = self
            .protocol
            .read_response(&mut reader)
            .await
            .map_err(|source| ClientError::Receive {
                round: "initial",
                source,
            })?;
        info!("{} response: {}", local, resp);

        if !resp.is_bonus() {
            return Ok(resp);
        }

        let bonus = req.bonus_round(random_guess()?);
        info!("{} bonus request: {}", local, bonus);
        self.protocol
            .write_request(&mut writer, &bonus)
            .await
            .map_err(|source| ClientError::Send {
                round: "bonus",
                source,
            })?;

        let resp = self
            .protocol
            .read_response(&mut reader)
            .await
            .map_err(|source| ClientError::Receive {
                round: "bonus",
                source,
            })?;
        info!("{} response: {}", local, resp);

        Ok(resp)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(&format!("127.0.0.1:{}", DEFAULT_PORT))
    }
}

fn random_guess() -> Result<Pair, ClientError> {
    Pair::random(&mut OsRng).map_err(ClientError::Random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::plain;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_client_defaults() {
        let client = Client::default();
        assert_eq!(client.addr, "127.0.0.1:9876");
        assert_eq!(client.protocol, Protocol::Plain);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_play_without_bonus_sends_one_request() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let req = plain::read_request(&mut stream).await.unwrap();
            plain::write_response(&mut stream, &Response::no_win())
                .await
                .unwrap();
            req
        });

        let resp = Client::new(&addr.to_string()).play(42).await.unwrap();
        assert_eq!(resp, Response::no_win());

        let req = server.await.unwrap();
        assert_eq!(req.fee, 42);
    }

    #[tokio::test]
    async fn test_play_follows_bonus_with_free_round() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let first = plain::read_request(&mut stream).await.unwrap();
            plain::write_response(&mut stream, &Response::bonus())
                .await
                .unwrap();
            let second = plain::read_request(&mut stream).await.unwrap();
            plain::write_response(&mut stream, &Response::win(42))
                .await
                .unwrap();
            (first, second)
        });

        let resp = Client::new(&addr.to_string()).play(42).await.unwrap();
        assert_eq!(resp, Response::win(42));

        let (first, second) = server.await.unwrap();
        assert_eq!(first.fee, 42);
        assert_eq!(second.fee, 0);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_play_rejects_garbage_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = plain::read_request(&mut stream).await;
            let _ = stream.write_all(b"winwin 43434").await;
        });

        let err = Client::new(&addr.to_string()).play(1).await.unwrap_err();
        assert!(matches!(err, ClientError::Receive { round: "initial", .. }));
    }

    #[tokio::test]
    async fn test_play_times_out_on_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let err = Client::new(&addr.to_string())
            .with_timeout(Duration::from_millis(100))
            .play(1)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
        server.abort();
    }
}
