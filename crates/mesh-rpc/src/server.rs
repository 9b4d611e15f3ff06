//! Sync RPC server
//!
//! Accepts TCP connections and answers newline-delimited JSON-RPC
//! requests on each one until the peer hangs up. Every request is
//! authenticated before dispatch and every file name is validated
//! before the handler sees it, so a rejected call never mutates state.
//! A request line longer than the server's limit is answered with an
//! error and the connection is closed.

use std::future::Future;
use std::sync::Arc;

use mesh_fs::{Error as FsError, validate_file_name};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::auth::SharedSecret;
use crate::handler::SyncHandler;
use crate::protocol::{
    FilesParams, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION,
    JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, Method, NamesParams, PARSE_ERROR,
    UNAUTHENTICATED,
};
use crate::{Result, RpcError};

/// Largest accepted request line, newline excluded.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

/// The node side of the sync contract.
pub struct SyncServer<H> {
    handler: Arc<H>,
    secret: SharedSecret,
    max_request_bytes: usize,
}

impl<H> Clone for SyncServer<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            secret: self.secret.clone(),
            max_request_bytes: self.max_request_bytes,
        }
    }
}

impl<H: SyncHandler> SyncServer<H> {
    pub fn new(handler: Arc<H>, secret: SharedSecret) -> Self {
        if secret.is_empty() {
            warn!("sync secret is empty; every call will be rejected");
        }
        Self {
            handler,
            secret,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }

    pub fn with_max_request_bytes(mut self, max_request_bytes: usize) -> Self {
        self.max_request_bytes = max_request_bytes;
        self
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Serve connections from `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(addr = %listener.local_addr()?, "sync service listening");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("sync service stopping");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    debug!(%peer, "accepted connection");
                    let server = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = server.serve_connection(stream).await {
                            debug!(%peer, error = %e, "connection ended with error");
                        }
                    });
                }
            }
        }
    }

    /// Answer requests on one connection until it is closed.
    pub async fn serve_connection(&self, stream: TcpStream) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            let line = match read_request(&mut reader, &mut buf, self.max_request_bytes).await? {
                Request::Line(line) => line,
                Request::Closed => return Ok(()),
                Request::TooLong => {
                    warn!(limit = self.max_request_bytes, "request line too long, closing connection");
                    let response = serde_json::to_string(&JsonRpcResponse::error(
                        None,
                        INVALID_REQUEST,
                        format!("Request exceeds {} bytes", self.max_request_bytes),
                    ))?;
                    writer.write_all(response.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    writer.flush().await?;
                    return Ok(());
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let response = match self.handle_message(&line).await {
                Ok(response) => response,
                Err(e) => serde_json::to_string(&JsonRpcResponse::error(
                    None,
                    INTERNAL_ERROR,
                    format!("Internal error: {e}"),
                ))?,
            };

            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    /// Handle a single request line and produce the response line.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                return serde_json::to_string(&response).map_err(RpcError::from);
            }
        };

        let response = self.handle_request(request).await;
        serde_json::to_string(&response).map_err(RpcError::from)
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;

        if request.jsonrpc != JSONRPC_VERSION {
            return JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid Request".to_string());
        }

        if !self.secret.verify(request.authorization.as_deref()) {
            warn!(method = %request.method, "rejected unauthenticated call");
            return JsonRpcResponse::error(id, UNAUTHENTICATED, "Unauthenticated".to_string());
        }

        let Ok(method) = request.method.parse::<Method>() else {
            return JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            );
        };

        debug!(%method, "dispatching call");
        match self.dispatch(method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                let code = error_code(&e);
                if code == INTERNAL_ERROR {
                    warn!(%method, error = %e, "call failed");
                } else {
                    debug!(%method, error = %e, "call rejected");
                }
                JsonRpcResponse::error(id, code, e.to_string())
            }
        }
    }

    async fn dispatch(&self, method: Method, params: Value) -> Result<Value> {
        let handler = &self.handler;
        match method {
            Method::Ping => Ok(Value::Bool(true)),
            Method::GetInventory => Ok(serde_json::to_value(handler.get_inventory().await?)?),
            Method::GetContent => {
                let NamesParams { names } = parse_params(params)?;
                validate_names(names.iter().map(String::as_str))?;
                Ok(serde_json::to_value(handler.get_content(names).await?)?)
            }
            Method::PutContent => {
                let FilesParams { files } = parse_params(params)?;
                validate_names(files.iter().map(|f| f.file_name.as_str()))?;
                if let Some(file) = files.iter().find(|f| f.content.is_none()) {
                    return Err(FsError::MissingContent {
                        name: file.file_name.clone(),
                    }
                    .into());
                }
                handler.put_content(files).await?;
                Ok(Value::Null)
            }
            Method::DeleteFiles => {
                let NamesParams { names } = parse_params(params)?;
                validate_names(names.iter().map(String::as_str))?;
                handler.delete_files(names).await?;
                Ok(Value::Null)
            }
            Method::RefreshConfigs => {
                handler.refresh_configs().await?;
                Ok(Value::Null)
            }
        }
    }
}

enum Request {
    Line(String),
    TooLong,
    Closed,
}

/// Read one newline-terminated request, buffering at most `max + 1` bytes.
async fn read_request<R>(reader: &mut R, buf: &mut Vec<u8>, max: usize) -> std::io::Result<Request>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(Request::Closed);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > max {
        return Ok(Request::TooLong);
    }

    String::from_utf8(std::mem::take(buf))
        .map(Request::Line)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn parse_params<T: DeserializeOwned + Default>(params: Value) -> Result<T> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|e| RpcError::InvalidParams(e.to_string()))
}

fn validate_names<'a>(mut names: impl Iterator<Item = &'a str>) -> Result<()> {
    names.try_for_each(validate_file_name).map_err(RpcError::from)
}

fn error_code(err: &RpcError) -> i32 {
    match err {
        RpcError::InvalidParams(_)
        | RpcError::Fs(FsError::InvalidFileName { .. })
        | RpcError::Fs(FsError::MissingContent { .. }) => INVALID_PARAMS,
        RpcError::Unauthenticated => UNAUTHENTICATED,
        _ => INTERNAL_ERROR,
    }
}
