//! Message-pattern transport: newline-delimited JSON over TCP.
//!
//! Each request line is `{"cmd": "<pattern>", "payload": ...}` and gets exactly one
//! response line, either `{"ok": <value>}` or `{"err": {"status": .., "message": ..}}`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use catalog_core::{DomainError, ProductId};
use catalog_infra::CatalogError;
use catalog_products::UpdateProduct;

use crate::app::dto;
use crate::app::services::AppServices;

pub const CREATE_PRODUCT: &str = "create_product";
pub const FIND_ALL_PRODUCTS: &str = "find_all_products";
pub const FIND_ONE_PRODUCT: &str = "find_one_product";
pub const UPDATE_PRODUCT: &str = "update_product";
pub const DELETE_PRODUCT: &str = "delete_product";
pub const VALIDATE_PRODUCTS: &str = "validate_products";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub cmd: String,
    #[serde(default)]
    pub payload: Value,
}

/// Error half of the reply envelope; `status` mirrors the HTTP status of the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{status}: {message}")]
pub struct RpcError {
    pub status: u16,
    pub message: String,
}

impl RpcError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            message: message.into(),
        }
    }
}

impl From<CatalogError> for RpcError {
    fn from(err: CatalogError) -> Self {
        if err.status() >= 500 {
            tracing::error!(error = %err, "rpc catalog call failed");
        }
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for RpcError {
    fn from(err: DomainError) -> Self {
        Self::bad_request(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcResponse {
    Ok(Value),
    Err(RpcError),
}

impl From<Result<Value, RpcError>> for RpcResponse {
    fn from(result: Result<Value, RpcError>) -> Self {
        match result {
            Ok(v) => RpcResponse::Ok(v),
            Err(e) => RpcResponse::Err(e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdPayload {
    id: ProductId,
}

#[derive(Debug, Deserialize)]
struct UpdatePayload {
    id: ProductId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<f64>,
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, RpcError> {
    serde_json::from_value(payload).map_err(|e| RpcError::bad_request(format!("invalid payload: {e}")))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError {
        status: 500,
        message: format!("failed to encode reply: {e}"),
    })
}

/// Dispatches decoded requests to the shared catalog.
#[derive(Clone)]
pub struct RpcHandler {
    services: Arc<AppServices>,
}

impl RpcHandler {
    pub fn new(services: Arc<AppServices>) -> Self {
        Self { services }
    }

    pub async fn handle(&self, request: RpcRequest) -> Result<Value, RpcError> {
        let catalog = self.services.catalog();
        match request.cmd.as_str() {
            CREATE_PRODUCT => {
                let body: dto::CreateProductRequest = decode(request.payload)?;
                let product = catalog.create(body.into_payload()?).await?;
                encode(&product)
            }
            FIND_ALL_PRODUCTS => {
                let query: dto::PaginationQuery = if request.payload.is_null() {
                    dto::PaginationQuery::default()
                } else {
                    decode(request.payload)?
                };
                let page = catalog.find_all(query.into_pagination()?).await?;
                encode(&page)
            }
            FIND_ONE_PRODUCT => {
                let IdPayload { id } = decode(request.payload)?;
                encode(&catalog.find_one(id).await?)
            }
            UPDATE_PRODUCT => {
                let body: UpdatePayload = decode(request.payload)?;
                let update = UpdateProduct {
                    id: Some(body.id),
                    name: body.name,
                    price: body.price,
                };
                update.validate()?;
                encode(&catalog.update(body.id, update).await?)
            }
            DELETE_PRODUCT => {
                let IdPayload { id } = decode(request.payload)?;
                encode(&catalog.remove(id).await?)
            }
            VALIDATE_PRODUCTS => {
                let ids: Vec<ProductId> = decode(request.payload)?;
                encode(&catalog.validate_products(&ids).await?)
            }
            other => Err(RpcError {
                status: 404,
                message: format!("unknown command: {other}"),
            }),
        }
    }

    /// Handle one raw request line and produce the serialized reply line.
    pub async fn handle_line(&self, line: &str) -> String {
        let result = match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => Err(RpcError::bad_request(format!("malformed request: {e}"))),
        };
        encode_reply(result)
    }
}

fn encode_reply(result: Result<Value, RpcError>) -> String {
    let response = RpcResponse::from(result);
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"err":{{"status":500,"message":"failed to encode reply: {e}"}}}}"#)
    })
}

/// Longest accepted request line in bytes, newline excluded.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// One framed request line, or the reason it cannot be handled.
#[derive(Debug, PartialEq)]
enum Frame {
    Line(String),
    Rejected(RpcError),
}

/// Read the next newline-terminated frame, never buffering more than
/// `max_len + 1` bytes. Returns `None` at end of stream.
///
/// An over-long line is drained up to its newline so the next request
/// starts on a frame boundary.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> std::io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *reader)
        .take(max_len as u64 + 1)
        .read_until(b'\n', buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    if buf.len() > max_len {
        discard_line(reader).await?;
        return Ok(Some(Frame::Rejected(RpcError::bad_request(format!(
            "malformed request: line exceeds {max_len} bytes"
        )))));
    }

    match String::from_utf8(std::mem::take(buf)) {
        Ok(line) => Ok(Some(Frame::Line(line))),
        Err(_) => Ok(Some(Frame::Rejected(RpcError::bad_request(
            "malformed request: invalid utf-8",
        )))),
    }
}

async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        let (consumed, done) = match available.iter().position(|b| *b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

/// Accept connections until the listener fails; one task per connection.
pub async fn serve(listener: TcpListener, services: Arc<AppServices>) -> std::io::Result<()> {
    serve_with_max_line(listener, services, DEFAULT_MAX_LINE_BYTES).await
}

pub async fn serve_with_max_line(
    listener: TcpListener,
    services: Arc<AppServices>,
    max_line_bytes: usize,
) -> std::io::Result<()> {
    let handler = RpcHandler::new(services);
    loop {
        let (stream, peer) = listener.accept().await?;
        let handler = handler.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_connection(stream, handler, max_line_bytes).await {
                tracing::warn!(%peer, error = %e, "rpc connection closed with error");
            }
        });
    }
}

async fn serve_connection(
    stream: TcpStream,
    handler: RpcHandler,
    max_line_bytes: usize,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    while let Some(frame) = read_frame(&mut reader, &mut buf, max_line_bytes).await? {
        let mut reply = match frame {
            Frame::Line(line) if line.trim().is_empty() => continue,
            Frame::Line(line) => handler.handle_line(&line).await,
            Frame::Rejected(err) => {
                tracing::warn!(error = %err, "rejected rpc frame");
                encode_reply(Err(err))
            }
        };
        reply.push('\n');
        writer.write_all(reply.as_bytes()).await?;
    }
    Ok(())
}
