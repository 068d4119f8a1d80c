//! Line-oriented text protocol.
//!
//! Request:  `<uuid:36> <fee-decimal> <guess:2 raw bytes>`
//! Response: `nowin ` | `bonus ` | `win <jackpot-decimal> `
//!
//! Variable-length fields end at the first delimiter; fixed-width fields
//! are read as exact byte counts whatever they contain.

use crate::error::CodecError;
use crate::{Pair, Request, Response, ResponseKind, PAIR_LEN};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

pub const DELIMITER: u8 = b' ';
pub const ID_LEN: usize = 36;
/// Digits in `u64::MAX`.
pub const MAX_DECIMAL_LEN: usize = 20;
/// Longest kind token (`nowin`, `bonus`).
pub const MAX_KIND_LEN: usize = 5;

pub fn encode_request(req: &Request) -> Vec<u8> {
    let mut data = Vec::with_capacity(ID_LEN + MAX_DECIMAL_LEN + PAIR_LEN + 2);
    data.extend_from_slice(req.id.hyphenated().to_string().as_bytes());
    data.push(DELIMITER);
    data.extend_from_slice(req.fee.to_string().as_bytes());
    data.push(DELIMITER);
    data.extend_from_slice(req.guess.as_bytes());
    data
}

pub fn encode_response(resp: &Response) -> Vec<u8> {
    let mut data = Vec::with_capacity(MAX_KIND_LEN + MAX_DECIMAL_LEN + 2);
    data.extend_from_slice(resp.kind.token().as_bytes());
    data.push(DELIMITER);
    if resp.kind == ResponseKind::Win {
        data.extend_from_slice(resp.jackpot.to_string().as_bytes());
        data.push(DELIMITER);
    }
    data
}

pub async fn write_request<W>(writer: &mut W, req: &Request) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_request(req)).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn write_response<W>(writer: &mut W, resp: &Response) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_response(resp)).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_request<R>(reader: &mut R) -> Result<Request, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut id = [0u8; ID_LEN];
    read_fixed(reader, &mut id, "request id").await?;
    let id = Uuid::try_parse_ascii(&id)?;

    let delimiter = reader
        .read_u8()
        .await
        .map_err(|e| CodecError::eof_as_truncated(e, "request id"))?;
    if delimiter != DELIMITER {
        return Err(CodecError::MissingDelimiter("request id"));
    }

    let mut buf = [0u8; MAX_DECIMAL_LEN + 1];
    let n = read_until(reader, &mut buf, "fee").await?;
    let fee = parse_decimal(&buf[..n], "fee")?;

    let mut guess = [0u8; PAIR_LEN];
    read_fixed(reader, &mut guess, "guess").await?;

    Ok(Request::new(id, fee, Pair(guess)))
}

pub async fn read_response<R>(reader: &mut R) -> Result<Response, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; MAX_DECIMAL_LEN + 1];

    let n = read_until(reader, &mut buf[..MAX_KIND_LEN + 1], "response kind").await?;
    let kind = ResponseKind::from_token(&buf[..n])
        .ok_or_else(|| CodecError::Kind(String::from_utf8_lossy(&buf[..n]).into_owned()))?;

    match kind {
        ResponseKind::Win => {
            let n = read_until(reader, &mut buf, "jackpot").await?;
            Ok(Response::win(parse_decimal(&buf[..n], "jackpot")?))
        }
        ResponseKind::NoWin => Ok(Response::no_win()),
        ResponseKind::Bonus => Ok(Response::bonus()),
    }
}

async fn read_fixed<R>(reader: &mut R, buf: &mut [u8], field: &'static str) -> Result<(), CodecError>
where
    R: AsyncRead + Unpin,
{
    reader
        .read_exact(buf)
        .await
        .map(|_| ())
        .map_err(|e| CodecError::eof_as_truncated(e, field))
}

/// Reads one byte at a time until the delimiter, which is consumed but not
/// stored. Returns the field length. `buf` bounds the field plus delimiter.
async fn read_until<R>(reader: &mut R, buf: &mut [u8], field: &'static str) -> Result<usize, CodecError>
where
    R: AsyncRead + Unpin,
{
    for (i, slot) in buf.iter_mut().enumerate() {
        let byte = reader
            .read_u8()
            .await
            .map_err(|e| CodecError::eof_as_truncated(e, field))?;
        if byte == DELIMITER {
            return Ok(i);
        }
        *slot = byte;
    }
    Err(CodecError::NoDelimiter {
        field,
        limit: buf.len(),
    })
}

/// Canonical unsigned decimal: digits only, no sign, no leading zeros.
fn parse_decimal(field: &[u8], name: &'static str) -> Result<u64, CodecError> {
    let invalid = || CodecError::Number {
        field: name,
        value: String::from_utf8_lossy(field).into_owned(),
    };

    let canonical = !field.is_empty()
        && field.iter().all(u8::is_ascii_digit)
        && (field.len() == 1 || field[0] != b'0');
    if !canonical {
        return Err(invalid());
    }

    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(invalid)
}
