use crate::error::CodecError;
use crate::{binary, plain, Request, Response};
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncWrite};

/// Wire format spoken on a connection. Server and client must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Delimited text, see [`crate::plain`].
    #[default]
    Plain,
    /// Length-prefixed bincode frames, see [`crate::binary`].
    Bincode,
}

impl Protocol {
    pub async fn read_request<R>(&self, reader: &mut R) -> Result<Request, CodecError>
    where
        R: AsyncRead + Unpin,
    {
        match self {
            Protocol::Plain => plain::read_request(reader).await,
            Protocol::Bincode => binary::read_request(reader).await,
        }
    }

    pub async fn write_request<W>(&self, writer: &mut W, req: &Request) -> Result<(), CodecError>
    where
        W: AsyncWrite + Unpin,
    {
        match self {
            Protocol::Plain => plain::write_request(writer, req).await,
            Protocol::Bincode => binary::write_request(writer, req).await,
        }
    }

    pub async fn read_response<R>(&self, reader: &mut R) -> Result<Response, CodecError>
    where
        R: AsyncRead + Unpin,
    {
        match self {
            Protocol::Plain => plain::read_response(reader).await,
            Protocol::Bincode => binary::read_response(reader).await,
        }
    }

    pub async fn write_response<W>(&self, writer: &mut W, resp: &Response) -> Result<(), CodecError>
    where
        W: AsyncWrite + Unpin,
    {
        match self {
            Protocol::Plain => plain::write_response(writer, resp).await,
            Protocol::Bincode => binary::write_response(writer, resp).await,
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(Protocol::Plain),
            "bincode" => Ok(Protocol::Bincode),
            other => Err(format!("invalid protocol \"{}\" (expected plain or bincode)", other)),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Plain => f.write_str("plain"),
            Protocol::Bincode => f.write_str("bincode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pair;
    use uuid::Uuid;

    #[test]
    fn test_protocol_from_str() {
        assert_eq!("plain".parse::<Protocol>(), Ok(Protocol::Plain));
        assert_eq!("BINCODE".parse::<Protocol>(), Ok(Protocol::Bincode));
        assert!("json".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_protocol_display_parses_back() {
        for protocol in [Protocol::Plain, Protocol::Bincode] {
            assert_eq!(protocol.to_string().parse::<Protocol>(), Ok(protocol));
        }
    }

    #[tokio::test]
    async fn test_exchange_over_duplex() {
        for protocol in [Protocol::Plain, Protocol::Bincode] {
            let (mut client, mut server) = tokio::io::duplex(64);
            let req = Request::new(Uuid::new_v4(), 42, Pair::new(1, 1));

            protocol.write_request(&mut client, &req).await.unwrap();
            assert_eq!(protocol.read_request(&mut server).await.unwrap(), req);

            protocol
                .write_response(&mut server, &Response::win(100))
                .await
                .unwrap();
            assert_eq!(
                protocol.read_response(&mut client).await.unwrap(),
                Response::win(100)
            );
        }
    }
}
