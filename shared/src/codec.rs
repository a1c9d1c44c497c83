//! Message framing and encoding for the relay channel.
//!
//! Every message is a JSON document preceded by its length as a 4-byte
//! big-endian integer. Payloads are capped at [`MAX_MESSAGE_SIZE`] in both
//! directions.

use crate::MAX_MESSAGE_SIZE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("message of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),
}

fn check_len(len: usize) -> Result<(), WireError> {
    if len > MAX_MESSAGE_SIZE {
        return Err(WireError::FrameTooLarge {
            len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(())
}

pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, WireError> {
    let bytes = serde_json::to_vec(message)?;
    check_len(bytes.len())?;
    Ok(bytes)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reads one frame.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly at a frame
/// boundary, which callers treat as a disconnect.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    check_len(len)?;

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    check_len(payload.len())?;

    let mut frame = Vec::with_capacity(payload.len() + 4);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParticipantId, Report, Snapshot};
    use std::collections::BTreeMap;
    use tokio_test::io::Builder;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut bytes = (payload.len() as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[tokio::test]
    async fn test_read_frame_returns_payload() {
        let mut mock = Builder::new().read(&framed(b"{}")).build();

        let payload = read_frame(&mut mock).await.unwrap();
        assert_eq!(payload.as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn test_read_frame_handles_split_header() {
        let bytes = framed(br#"{"running":true}"#);
        let mut mock = Builder::new()
            .read(&bytes[..2])
            .read(&bytes[2..5])
            .read(&bytes[5..])
            .build();

        let payload = read_frame(&mut mock).await.unwrap().unwrap();
        let report: Report = decode(&payload).unwrap();
        assert_eq!(report.running, Some(true));
    }

    #[tokio::test]
    async fn test_read_frame_clean_eof_is_disconnect() {
        let mut mock = Builder::new().build();

        let payload = read_frame(&mut mock).await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn test_read_frame_truncated_header_is_error() {
        let mut mock = Builder::new().read(&[0, 0]).build();

        let result = read_frame(&mut mock).await;
        assert!(matches!(result, Err(WireError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized_length() {
        let header = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes();
        let mut mock = Builder::new().read(&header).build();

        let result = read_frame(&mut mock).await;
        assert!(matches!(
            result,
            Err(WireError::FrameTooLarge { len, .. }) if len == MAX_MESSAGE_SIZE + 1
        ));
    }

    #[tokio::test]
    async fn test_write_frame_prefixes_length() {
        let mut mock = Builder::new().write(&framed(b"{}")).build();

        write_frame(&mut mock, b"{}").await.unwrap();
    }

    #[tokio::test]
    async fn test_write_frame_rejects_oversized_payload() {
        let mut mock = Builder::new().build();
        let payload = vec![b' '; MAX_MESSAGE_SIZE + 10];

        let result = write_frame(&mut mock, &payload).await;
        assert!(matches!(result, Err(WireError::FrameTooLarge { .. })));
    }

    #[test]
    fn test_encode_rejects_oversized_message() {
        let report = Report {
            display_name: Some("x".repeat(MAX_MESSAGE_SIZE)),
            ..Report::default()
        };

        assert!(matches!(
            encode(&report),
            Err(WireError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result: Result<Report, _> = decode(b"not json");
        assert!(matches!(result, Err(WireError::Codec(_))));

        let result: Result<Report, _> = decode(b"[1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_snapshot() {
        let bytes = br#"{"max_players":3,"players":{"40001":{},"40000":{"running":false}}}"#;
        let snapshot: Snapshot = decode(bytes).unwrap();

        assert_eq!(snapshot.max_players, 3);
        let ids: Vec<ParticipantId> = snapshot.players.keys().copied().collect();
        assert_eq!(ids, vec![ParticipantId(40000), ParticipantId(40001)]);

        let mut expected = BTreeMap::new();
        expected.insert(ParticipantId(40001), Report::default());
        expected.insert(
            ParticipantId(40000),
            Report {
                running: Some(false),
                ..Report::default()
            },
        );
        assert_eq!(snapshot.players, expected);
    }
}
