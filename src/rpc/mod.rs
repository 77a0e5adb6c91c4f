//! JSON-RPC front-end over TCP.
//!
//! Each line is one JSON document. Requests are dispatched to the gateway
//! handlers; the connection doubles as the outbound push channel for
//! notifications. One controller connection is tracked at a time: a new
//! connection silently supersedes the previous one, which keeps serving
//! request/response traffic but receives no further pushes.

pub mod codec;

use crate::error::{GatewayError, Result};
use crate::gateway::GatewayContext;
use crate::hardware::CommandOptions;
use codec::{Notification, Request, Response};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};

const MAX_LINE_LENGTH: usize = 64 * 1024;

/// TCP JSON-RPC server bound to a local port.
pub struct RpcServer {
    listener: TcpListener,
    ctx: Arc<GatewayContext>,
}

impl RpcServer {
    pub async fn bind(ctx: Arc<GatewayContext>, port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|e| GatewayError::RpcBindFailed(format!("port {port}: {e}")))?;
        Ok(Self { listener, ctx })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections for the lifetime of the process. Accept errors are
    /// logged and never fatal.
    pub async fn run(self) -> Result<()> {
        info!("[Rpc] listening port={}", self.local_addr()?.port());
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        handle_connection(ctx, stream, peer).await;
                    });
                }
                Err(e) => {
                    error!("[Rpc] accept failed: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Bind and serve on a background task, returning the bound address.
    pub async fn spawn(ctx: Arc<GatewayContext>, port: u16) -> Result<(SocketAddr, JoinHandle<()>)> {
        let server = Self::bind(ctx, port).await?;
        let addr = server.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("[Rpc] server stopped: {}", e);
            }
        });
        Ok((addr, handle))
    }
}

enum ConnEvent {
    Line(Option<std::result::Result<String, LinesCodecError>>),
    Push(Option<Notification>),
}

async fn handle_connection(ctx: Arc<GatewayContext>, stream: TcpStream, peer: SocketAddr) {
    info!("[Rpc] new client connection peer={}", peer);

    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let (tx, rx) = mpsc::unbounded_channel();
    let conn_id = ctx.register_connection(tx);
    let mut outbound = Some(rx);

    loop {
        let event = match outbound.as_mut() {
            Some(rx) => tokio::select! {
                line = framed.next() => ConnEvent::Line(line),
                push = rx.recv() => ConnEvent::Push(push),
            },
            None => ConnEvent::Line(framed.next().await),
        };

        match event {
            ConnEvent::Line(None) => break,
            ConnEvent::Line(Some(Err(e))) => {
                warn!("[Rpc] read error peer={}: {}", peer, e);
                break;
            }
            ConnEvent::Line(Some(Ok(line))) => {
                let Some(response) = dispatch(&ctx, &line).await else {
                    continue;
                };
                if !write_json(&mut framed, &response, peer).await {
                    break;
                }
            }
            ConnEvent::Push(None) => {
                // Superseded by a newer connection: keep answering requests,
                // stop watching for pushes
                debug!("[Rpc] connection superseded peer={}", peer);
                outbound = None;
            }
            ConnEvent::Push(Some(notification)) => {
                if !write_json(&mut framed, &notification, peer).await {
                    break;
                }
            }
        }
    }

    ctx.drop_connection(conn_id);
    info!("[Rpc] client disconnected peer={}", peer);
}

async fn write_json<T: serde::Serialize>(
    framed: &mut Framed<TcpStream, LinesCodec>,
    message: &T,
    peer: SocketAddr,
) -> bool {
    let line = match serde_json::to_string(message) {
        Ok(line) => line,
        Err(e) => {
            error!("[Rpc] failed to encode message: {}", e);
            return true;
        }
    };
    if let Err(e) = framed.send(line).await {
        warn!("[Rpc] write error peer={}: {}", peer, e);
        return false;
    }
    true
}

async fn dispatch(ctx: &GatewayContext, line: &str) -> Option<Response> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("[Rpc] malformed request: {}", e);
            return None;
        }
    };

    let response = match request.method.as_str() {
        "discover" => {
            info!("[Rpc] discover");
            match serde_json::to_value(ctx.discover()) {
                Ok(devices) => Response::success(request.id, devices),
                Err(e) => Response::error(request.id, e.to_string()),
            }
        }
        "sensor.get" => {
            let id = str_param(&request.params, 0);
            let reading = ctx.get_reading(&id).await;
            match serde_json::to_value(&reading) {
                Ok(result) => Response::success(request.id, result),
                Err(e) => Response::error(request.id, e.to_string()),
            }
        }
        "sensor.set" => {
            let id = str_param(&request.params, 0);
            let cmd = str_param(&request.params, 1);
            let options: CommandOptions = request
                .params
                .get(2)
                .cloned()
                .map(|v| serde_json::from_value(v).unwrap_or_default())
                .unwrap_or_default();
            ctx.dispatch_command(&id, &cmd, &options).await;
            Response::success(request.id, json!("success"))
        }
        "sensor.setNotification" => {
            let id = str_param(&request.params, 0);
            ctx.enable_notification(&id);
            Response::success(request.id, json!("success"))
        }
        other => {
            warn!("[Rpc] unknown method {}", other);
            Response::error(request.id, "method not found")
        }
    };
    Some(response)
}

fn str_param(params: &[Value], index: usize) -> String {
    params
        .get(index)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
