//! Transport to a native host running as a child process.

use std::ffi::{OsStr, OsString};
use std::process::Stdio;

use async_trait::async_trait;
use deskpilot_protocols::ChannelError;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tokio::sync::{OnceCell, mpsc, oneshot};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use crate::client::HostTransport;
use crate::codec::{LenientMessageCodec, NativeMessageCodec};

type Reply = oneshot::Sender<Result<Value, ChannelError>>;

/// Command line used to start the host on first use.
struct Launch {
    program: OsString,
    args: Vec<String>,
}

/// A running host: the I/O task's inbox and the child that feeds it.
struct HostLink {
    requests: mpsc::UnboundedSender<(Value, Reply)>,
    // Killed when the client is dropped.
    _child: Option<Child>,
}

/// Talks native messaging to a host process, one exchange at a time.
///
/// A background task owns the pipe and always reads the reply to every
/// message it writes, so a caller that gives up on an exchange cannot leave
/// a stale reply behind for the next one.
pub struct NativeHostClient {
    launch: Option<Launch>,
    link: OnceCell<HostLink>,
}

impl NativeHostClient {
    /// Spawn the host now and connect to its stdio. The host's stderr is
    /// inherited so its logs stay visible.
    pub fn spawn<S: AsRef<OsStr>>(program: S, args: &[String]) -> Result<Self, ChannelError> {
        let link = start_process(program.as_ref(), args)?;
        Ok(Self {
            launch: None,
            link: OnceCell::from(link),
        })
    }

    /// Start the host with the first exchange instead of now.
    ///
    /// A failed start is reported to that exchange and retried by the next.
    pub fn on_demand<S: AsRef<OsStr>>(program: S, args: &[String]) -> Self {
        Self {
            launch: Some(Launch {
                program: program.as_ref().to_os_string(),
                args: args.to_vec(),
            }),
            link: OnceCell::new(),
        }
    }

    /// Use an existing byte stream pair, e.g. an in-memory duplex.
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_io<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            launch: None,
            link: OnceCell::from(HostLink {
                requests: start_io(reader, writer),
                _child: None,
            }),
        }
    }

    /// Whether the host has been started.
    pub fn is_started(&self) -> bool {
        self.link.initialized()
    }

    async fn link(&self) -> Result<&HostLink, ChannelError> {
        self.link
            .get_or_try_init(|| async {
                match &self.launch {
                    Some(launch) => start_process(&launch.program, &launch.args),
                    None => Err(ChannelError::Transport(
                        "native host is not running".to_string(),
                    )),
                }
            })
            .await
    }
}

fn start_process(program: &OsStr, args: &[String]) -> Result<HostLink, ChannelError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            ChannelError::Transport(format!(
                "failed to start native host {}: {}",
                program.to_string_lossy(),
                e
            ))
        })?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| ChannelError::Transport("native host stdin unavailable".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ChannelError::Transport("native host stdout unavailable".to_string()))?;

    info!("Started native host {}", program.to_string_lossy());
    Ok(HostLink {
        requests: start_io(stdout, stdin),
        _child: Some(child),
    })
}

/// Spawn the task that owns the framed pipe and return its inbox.
fn start_io<R, W>(reader: R, writer: W) -> mpsc::UnboundedSender<(Value, Reply)>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<(Value, Reply)>();
    let mut reader = FramedRead::new(reader, LenientMessageCodec);
    let mut writer = FramedWrite::new(writer, NativeMessageCodec);

    tokio::spawn(async move {
        while let Some((message, respond)) = rx.recv().await {
            let result = match writer.send(message).await {
                Ok(()) => match reader.next().await {
                    Some(Ok(reply)) => reply,
                    Some(Err(e)) => Err(e),
                    None => Err(ChannelError::Transport(
                        "native host closed the connection".to_string(),
                    )),
                },
                Err(e) => Err(e),
            };

            let closed = matches!(result, Err(ChannelError::Transport(_)));
            if respond.send(result).is_err() {
                debug!("Dropped native host reply; the caller went away");
            }
            if closed {
                warn!("Native host connection lost");
                break;
            }
        }
    });

    tx
}

#[async_trait]
impl HostTransport for NativeHostClient {
    async fn exchange(&self, message: Value) -> Result<Value, ChannelError> {
        let link = self.link().await?;
        debug!(
            "Sending {} to native host",
            message["action"].as_str().unwrap_or("message")
        );

        let (reply_tx, reply_rx) = oneshot::channel();
        link.requests
            .send((message, reply_tx))
            .map_err(|_| ChannelError::Transport("native host connection is closed".to_string()))?;
        reply_rx
            .await
            .map_err(|_| ChannelError::Transport("native host connection is closed".to_string()))?
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Host stand-in that answers every message with `pong` plus the action.
    fn echo_host() -> NativeHostClient {
        let (client_side, host_side) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client_side);
        let (host_read, host_write) = tokio::io::split(host_side);

        tokio::spawn(async move {
            let mut reader = FramedRead::new(host_read, NativeMessageCodec);
            let mut writer = FramedWrite::new(host_write, NativeMessageCodec);
            while let Some(Ok(message)) = reader.next().await {
                let reply = json!({"success": true, "message": "pong", "echo": message["action"]});
                if writer.send(reply).await.is_err() {
                    break;
                }
            }
        });

        NativeHostClient::from_io(client_read, client_write)
    }

    #[tokio::test]
    async fn test_exchange() {
        let client = echo_host();
        let reply = client.exchange(json!({"action": "ping"})).await.unwrap();
        assert_eq!(reply["message"], "pong");
        assert_eq!(reply["echo"], "ping");
    }

    #[tokio::test]
    async fn test_sequential_exchanges() {
        let client = echo_host();
        for action in ["ping", "poll", "cancel"] {
            let reply = client.exchange(json!({"action": action})).await.unwrap();
            assert_eq!(reply["echo"], action);
        }
    }

    #[tokio::test]
    async fn test_abandoned_exchange_does_not_shift_replies() {
        let (client_side, host_side) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client_side);
        let (host_read, host_write) = tokio::io::split(host_side);

        tokio::spawn(async move {
            let mut reader = FramedRead::new(host_read, NativeMessageCodec);
            let mut writer = FramedWrite::new(host_write, NativeMessageCodec);
            while let Some(Ok(message)) = reader.next().await {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                let reply = json!({"success": true, "echo": message["action"]});
                if writer.send(reply).await.is_err() {
                    break;
                }
            }
        });

        let client = NativeHostClient::from_io(client_read, client_write);
        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            client.exchange(json!({"action": "get_actions"})),
        )
        .await;
        assert!(abandoned.is_err());

        let reply = client.exchange(json!({"action": "ping"})).await.unwrap();
        assert_eq!(reply["echo"], "ping");
        let reply = client.exchange(json!({"action": "poll"})).await.unwrap();
        assert_eq!(reply["echo"], "poll");
    }

    #[tokio::test]
    async fn test_on_demand_starts_with_first_exchange() {
        let client = NativeHostClient::on_demand("/nonexistent/deskpilot-host", &[]);
        assert!(!client.is_started());

        let err = client.exchange(json!({"action": "ping"})).await.unwrap_err();
        assert!(matches!(err, ChannelError::Transport(_)));
        assert!(err.to_string().contains("failed to start native host"));
        assert!(!client.is_started());
    }

    #[tokio::test]
    async fn test_closed_host() {
        let (client_side, host_side) = tokio::io::duplex(1024);
        let (client_read, client_write) = tokio::io::split(client_side);
        drop(host_side);

        let client = NativeHostClient::from_io(client_read, client_write);
        let err = client.exchange(json!({"action": "ping"})).await.unwrap_err();
        assert!(matches!(err, ChannelError::Transport(_)));
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let result = NativeHostClient::spawn("/nonexistent/deskpilot-host", &[]);
        assert!(matches!(result, Err(ChannelError::Transport(_))));
    }
}
