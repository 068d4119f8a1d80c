//! Length-prefixed bincode frames: a big-endian `u16` payload length
//! followed by the serialized message.

use crate::error::CodecError;
use crate::{Request, Response};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_FRAME_LEN: usize = 256;

/// Fixed-width integers, little endian, and no bytes left over after the
/// message.
fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

pub async fn write_request<W>(writer: &mut W, req: &Request) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(writer, req).await
}

pub async fn write_response<W>(writer: &mut W, resp: &Response) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(writer, resp).await
}

pub async fn read_request<R>(reader: &mut R) -> Result<Request, CodecError>
where
    R: AsyncRead + Unpin,
{
    read_frame(reader).await
}

pub async fn read_response<R>(reader: &mut R) -> Result<Response, CodecError>
where
    R: AsyncRead + Unpin,
{
    read_frame(reader).await
}

pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, CodecError> {
    let payload = options().serialize(message)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(CodecError::FrameTooLarge {
            size: payload.len(),
            limit: MAX_FRAME_LEN,
        });
    }

    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    writer.write_all(&encode(message)?).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_frame<R, T>(reader: &mut R) -> Result<T, CodecError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let len = reader
        .read_u16()
        .await
        .map_err(|e| CodecError::eof_as_truncated(e, "frame length"))? as usize;
    if len > MAX_FRAME_LEN {
        return Err(CodecError::FrameTooLarge {
            size: len,
            limit: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| CodecError::eof_as_truncated(e, "frame payload"))?;

    Ok(options().deserialize(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pair, ResponseKind};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_request_roundtrip() {
        for fee in [0, u64::MAX] {
            let req = Request::new(Uuid::new_v4(), fee, Pair::new(b' ', 7));
            let frame = encode(&req).unwrap();
            let decoded = read_request(&mut frame.as_slice()).await.unwrap();
            assert_eq!(decoded, req);
        }
    }

    #[tokio::test]
    async fn test_response_roundtrip() {
        for resp in [Response::win(100), Response::no_win(), Response::bonus()] {
            let frame = encode(&resp).unwrap();
            assert_eq!(read_response(&mut frame.as_slice()).await.unwrap(), resp);
        }
    }

    #[tokio::test]
    async fn test_frame_length_prefix() {
        let frame = encode(&Response::bonus()).unwrap();
        let len = u16::from_be_bytes([frame[0], frame[1]]) as usize;
        assert_eq!(len, frame.len() - 2);
    }

    #[tokio::test]
    async fn test_rejects_oversized_frame() {
        let data = [0x01u8, 0x01];
        let err = read_response(&mut &data[..]).await.unwrap_err();
        assert!(matches!(err, CodecError::FrameTooLarge { size: 257, .. }));
    }

    #[tokio::test]
    async fn test_rejects_truncated_frame() {
        let frame = encode(&Response::win(5)).unwrap();
        let err = read_response(&mut &frame[..frame.len() - 1]).await.unwrap_err();
        assert!(matches!(err, CodecError::Truncated("frame payload")));

        let err = read_response(&mut &frame[..1]).await.unwrap_err();
        assert!(matches!(err, CodecError::Truncated("frame length")));
    }

    #[tokio::test]
    async fn test_rejects_trailing_bytes() {
        let mut payload = encode(&Response::bonus()).unwrap().split_off(2);
        payload.extend_from_slice(b"GARBAGE!");

        let mut frame = (payload.len() as u16).to_be_bytes().to_vec();
        frame.extend_from_slice(&payload);

        let err = read_response(&mut frame.as_slice()).await.unwrap_err();
        assert!(matches!(err, CodecError::Bincode(_)));
    }

    #[tokio::test]
    async fn test_rejects_unknown_kind() {
        let mut payload = bincode::serialize(&Response {
            kind: ResponseKind::Win,
            jackpot: 1,
        })
        .unwrap();
        // Variant index is the leading u32.
        payload[0] = 9;

        let mut frame = (payload.len() as u16).to_be_bytes().to_vec();
        frame.extend_from_slice(&payload);

        let err = read_response(&mut frame.as_slice()).await.unwrap_err();
        assert!(matches!(err, CodecError::Bincode(_)));
    }
}
