//! Outbound side of the sync contract

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use mesh_fs::ConfigFileInfo;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::SharedSecret;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, Method, UNAUTHENTICATED};
use crate::{Result, RpcError};

/// Deadline for the liveness ping
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Deadline for every data-transfer call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// A connection to one peer's sync service.
///
/// Calls on one client are serialized over a single persistent TCP
/// connection, opened lazily and dropped after any failed or timed-out
/// exchange so the next call starts clean.
#[derive(Debug)]
pub struct SyncClient {
    endpoint: String,
    secret: SharedSecret,
    ping_timeout: Duration,
    call_timeout: Duration,
    next_id: AtomicU64,
    conn: Mutex<Option<BufStream<TcpStream>>>,
}

impl SyncClient {
    pub fn new(endpoint: impl Into<String>, secret: SharedSecret) -> Self {
        Self {
            endpoint: endpoint.into(),
            secret,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            next_id: AtomicU64::new(1),
            conn: Mutex::new(None),
        }
    }

    pub fn with_timeouts(mut self, ping_timeout: Duration, call_timeout: Duration) -> Self {
        self.ping_timeout = ping_timeout;
        self.call_timeout = call_timeout;
        self
    }

    /// `host:port` this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn ping(&self) -> Result<bool> {
        self.call(Method::Ping, Value::Null, self.ping_timeout).await
    }

    pub async fn get_inventory(&self) -> Result<Vec<ConfigFileInfo>> {
        self.call(Method::GetInventory, Value::Null, self.call_timeout)
            .await
    }

    pub async fn get_content(&self, names: &[String]) -> Result<Vec<ConfigFileInfo>> {
        self.call(Method::GetContent, json!({ "names": names }), self.call_timeout)
            .await
    }

    pub async fn put_content(&self, files: &[ConfigFileInfo]) -> Result<()> {
        self.call_unit(Method::PutContent, json!({ "files": files }))
            .await
    }

    pub async fn delete_files(&self, names: &[String]) -> Result<()> {
        self.call_unit(Method::DeleteFiles, json!({ "names": names }))
            .await
    }

    pub async fn refresh_configs(&self) -> Result<()> {
        self.call_unit(Method::RefreshConfigs, Value::Null).await
    }

    async fn call_unit(&self, method: Method, params: Value) -> Result<()> {
        let _: Value = self.call(method, params, self.call_timeout).await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        params: Value,
        deadline: Duration,
    ) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request =
            JsonRpcRequest::new(id, method, params).with_authorization(self.secret.bearer());
        let line = serde_json::to_string(&request)?;

        debug!(endpoint = %self.endpoint, %method, id, "calling peer");
        let response = self.with_deadline(deadline, self.exchange(&line)).await?;

        if let Some(error) = response.error {
            return Err(if error.code == UNAUTHENTICATED {
                RpcError::Unauthenticated
            } else {
                RpcError::Remote {
                    code: error.code,
                    message: error.message,
                }
            });
        }

        let result = response.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(RpcError::from)
    }

    async fn with_deadline<T>(
        &self,
        deadline: Duration,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let outcome = tokio::time::timeout(deadline, call).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                // A late response would desynchronize the stream.
                *self.conn.lock().await = None;
                Err(RpcError::Timeout(deadline))
            }
        }
    }

    async fn exchange(&self, line: &str) -> Result<JsonRpcResponse> {
        let mut conn = self.conn.lock().await;
        if conn.is_none() {
            let stream = TcpStream::connect(&self.endpoint)
                .await
                .map_err(|e| RpcError::connection(&self.endpoint, e))?;
            *conn = Some(BufStream::new(stream));
        }
        let Some(stream) = conn.as_mut() else {
            return Err(RpcError::connection(
                &self.endpoint,
                std::io::Error::from(std::io::ErrorKind::NotConnected),
            ));
        };

        let result = round_trip(stream, line)
            .await
            .map_err(|e| RpcError::connection(&self.endpoint, e));
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                *conn = None;
                return Err(e);
            }
        };

        serde_json::from_str(&response).map_err(|e| {
            *conn = None;
            RpcError::from(e)
        })
    }
}

async fn round_trip(stream: &mut BufStream<TcpStream>, line: &str) -> std::io::Result<String> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await?;

    let mut response = String::new();
    if stream.read_line(&mut response).await? == 0 {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    Ok(response)
}
