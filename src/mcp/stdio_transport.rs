// ABOUTME: Standard-stream MCP transport reading newline-delimited JSON-RPC from stdin
// ABOUTME: Writes responses and server notifications to stdout through one serialized writer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::request_processor::McpRequestProcessor;
use crate::constants::json_rpc::PARSE_ERROR;
use crate::errors::AppResult;
use crate::jsonrpc::JsonRpcResponse;
use oura_providers::WearableProvider;
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Single-session transport over a byte stream pair
pub struct StdioTransport {
    processor: Arc<McpRequestProcessor>,
}

impl StdioTransport {
    /// Create the transport with its one provider instance
    #[must_use]
    pub fn new(provider: Arc<dyn WearableProvider>) -> Self {
        let processor = McpRequestProcessor::new(provider);
        processor.set_session_label("stdio");
        Self {
            processor: Arc::new(processor),
        }
    }

    /// Serve the process's stdin and stdout until stdin closes
    ///
    /// # Errors
    ///
    /// Returns an error if reading stdin or writing stdout fails
    pub async fn run(&self) -> AppResult<()> {
        self.run_with(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve an arbitrary reader/writer pair until the reader reaches EOF
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails
    pub async fn run_with<R, W>(&self, reader: R, writer: W) -> AppResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!("MCP stdio transport ready - listening on stdin/stdout");

        let writer = Arc::new(Mutex::new(writer));
        let notification_handle = tokio::spawn(Self::forward_notifications(
            self.processor.subscribe(),
            writer.clone(),
        ));

        let result = self.read_loop(reader, &writer).await;

        notification_handle.abort();
        if let Err(e) = notification_handle.await {
            if !e.is_cancelled() {
                warn!("Notification forwarder failed: {e}");
            }
        }
        info!("stdin closed, stdio transport finished");
        result
    }

    async fn read_loop<R, W>(&self, reader: R, writer: &Arc<Mutex<W>>) -> AppResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<serde_json::Value>(&line) {
                Ok(message) => {
                    if let Some(response) = self.processor.handle_payload(message).await {
                        write_line(writer, &response).await?;
                    }
                }
                Err(e) => {
                    warn!("Invalid JSON-RPC message: {e}");
                    write_line(
                        writer,
                        &JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"),
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }

    async fn forward_notifications<W>(
        mut receiver: broadcast::Receiver<crate::jsonrpc::JsonRpcRequest>,
        writer: Arc<Mutex<W>>,
    ) where
        W: AsyncWrite + Unpin,
    {
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    if let Err(e) = write_line(&writer, &notification).await {
                        warn!("Failed to write notification to stdout: {e}");
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("stdio notification forwarder lagged, skipped {skipped} notifications");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Notification channel closed");
                    return;
                }
            }
        }
    }
}

/// Write one JSON message followed by a newline, then flush
async fn write_line<W, T>(writer: &Mutex<W>, message: &T) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + Sync,
{
    let mut json = serde_json::to_vec(message)?;
    json.push(b'\n');

    let mut writer = writer.lock().await;
    writer.write_all(&json).await?;
    writer.flush().await?;
    drop(writer);
    Ok(())
}
