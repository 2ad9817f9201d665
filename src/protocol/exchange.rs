//! Concurrent exchange of public values.
//!
//! Both peers send their `KEY` frame and wait for the other's at the same
//! time. Running the two halves sequentially would make the outcome depend on
//! which side writes first; joining them removes that dependency.

use tokio::io::{AsyncRead, AsyncWrite};

use super::keys::ExchangeResult;
use crate::codec::Frame;
use crate::error::{DhError, Result};
use crate::transport::Session;

/// Send `KEY <ours>` and receive the peer's `KEY` concurrently.
///
/// Returns once both directions are done. The first failure from either side
/// is returned and the other is dropped.
pub async fn exchange_keys<R, W>(session: &mut Session<R, W>, ours: i64) -> Result<ExchangeResult>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let role = session.role();
    let (reader, writer) = session.split_mut()?;

    let send = async {
        let frame = Frame::Key(ours);
        writer.write_frame(&frame).await?;
        tracing::debug!(%role, "Sent: {}", frame);
        Ok::<_, DhError>(())
    };

    let receive = async {
        let line = reader.read_line().await?;
        tracing::debug!(%role, "Received data by peer: {}", line);
        line.parse::<Frame>()?.expect_key()
    };

    let ((), theirs) = tokio::try_join!(send, receive)?;
    Ok(ExchangeResult { ours, theirs })
}
