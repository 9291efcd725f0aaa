//! Line-delimited JSON-RPC over stdin/stdout.

use serde_json::Value as J;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::dispatch::Dispatcher;
use crate::core::mcp;

/// Serve until the reader hits EOF. Every non-blank line gets exactly one
/// response line; lines that are not JSON get a parse error.
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let resp = match serde_json::from_str::<J>(&line) {
            Ok(v) => dispatcher.dispatch_value(&v).await,
            Err(e) => {
                tracing::warn!(error = %e, "stdio: malformed line");
                mcp::parse_error()
            }
        };
        let mut out = serde_json::to_vec(&resp)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    Ok(())
}

pub async fn serve_stdio(dispatcher: &Dispatcher) -> std::io::Result<()> {
    tracing::info!("mode=stdio");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_lines(dispatcher, stdin, stdout).await
}
