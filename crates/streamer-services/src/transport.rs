//! Upload transport
//!
//! The coordinator reads frames from, and sends its single reply through, an
//! [`UploadTransport`]. [`channel`] builds an in-process transport whose client half is
//! driven by the HTTP gateway and by tests.

use async_trait::async_trait;
use bytes::Bytes;
use streamer_core::{ErrorResponse, Frame, TransportError, UploadMetadata, UploadResponse};
use tokio::sync::{mpsc, oneshot};

/// What the caller receives once an upload ends
pub type UploadReply = Result<UploadResponse, ErrorResponse>;

/// Server side of one upload stream
#[async_trait]
pub trait UploadTransport: Send {
    /// Next frame, `Ok(None)` once the peer has ended the stream normally.
    async fn receive(&mut self) -> Result<Option<Frame>, TransportError>;

    /// Send the final reply and close the stream.
    async fn reply_and_close(&mut self, reply: UploadReply) -> Result<(), TransportError>;
}

#[derive(Debug)]
enum ClientMessage {
    Frame(Frame),
    End,
    Abort(String),
}

/// In-process [`UploadTransport`] backed by tokio channels
#[derive(Debug)]
pub struct ChannelTransport {
    frames: mpsc::Receiver<ClientMessage>,
    reply: Option<oneshot::Sender<UploadReply>>,
    ended: bool,
}

#[async_trait]
impl UploadTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<Frame>, TransportError> {
        if self.ended {
            return Ok(None);
        }

        match self.frames.recv().await {
            Some(ClientMessage::Frame(frame)) => Ok(Some(frame)),
            Some(ClientMessage::End) => {
                self.ended = true;
                Ok(None)
            }
            Some(ClientMessage::Abort(reason)) => Err(TransportError::Failed(reason)),
            None => Err(TransportError::Closed),
        }
    }

    async fn reply_and_close(&mut self, reply: UploadReply) -> Result<(), TransportError> {
        self.frames.close();
        let sender = self.reply.take().ok_or(TransportError::Closed)?;
        sender.send(reply).map_err(|_| TransportError::Closed)
    }
}

/// Client half of a [`ChannelTransport`]
#[derive(Debug)]
pub struct UploadClient {
    frames: mpsc::Sender<ClientMessage>,
    reply: oneshot::Receiver<UploadReply>,
}

impl UploadClient {
    pub async fn send_metadata(&self, metadata: UploadMetadata) -> Result<(), TransportError> {
        self.send(Frame::Metadata(metadata)).await
    }

    pub async fn send_chunk(&self, chunk: impl Into<Bytes>) -> Result<(), TransportError> {
        self.send(Frame::Data(chunk.into())).await
    }

    /// Send any frame, including out-of-order ones.
    ///
    /// Fails with [`TransportError::Closed`] once the server has stopped reading.
    pub async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.frames
            .send(ClientMessage::Frame(frame))
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// End the stream normally and wait for the server's reply.
    ///
    /// If the server already replied (for instance after rejecting the first frame),
    /// that reply is returned.
    pub async fn close_and_recv(self) -> Result<UploadReply, TransportError> {
        // A closed frame channel means the server replied or is about to.
        let _ = self.frames.send(ClientMessage::End).await;
        drop(self.frames);
        self.reply.await.map_err(|_| TransportError::Closed)
    }

    /// Break the stream abnormally and wait for the server's reply.
    pub async fn abort(self, reason: impl Into<String>) -> Result<UploadReply, TransportError> {
        let _ = self.frames.send(ClientMessage::Abort(reason.into())).await;
        drop(self.frames);
        self.reply.await.map_err(|_| TransportError::Closed)
    }
}

/// Create a connected client/server pair. `buffer` frames may be queued ahead of the server.
pub fn channel(buffer: usize) -> (UploadClient, ChannelTransport) {
    let (frames_tx, frames_rx) = mpsc::channel(buffer.max(1));
    let (reply_tx, reply_rx) = oneshot::channel();

    (
        UploadClient {
            frames: frames_tx,
            reply: reply_rx,
        },
        ChannelTransport {
            frames: frames_rx,
            reply: Some(reply_tx),
            ended: false,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_frames_then_end() {
        let (client, mut server) = channel(4);
        client.send_metadata(UploadMetadata::new("a.txt", "text/plain")).await.unwrap();
        client.send_chunk(Bytes::from_static(b"abc")).await.unwrap();

        let reply = tokio::spawn(client.close_and_recv());

        assert!(server.receive().await.unwrap().unwrap().is_metadata());
        assert_eq!(
            server.receive().await.unwrap(),
            Some(Frame::Data(Bytes::from_static(b"abc")))
        );
        assert_eq!(server.receive().await.unwrap(), None);
        assert_eq!(server.receive().await.unwrap(), None);

        let id = Uuid::new_v4();
        server.reply_and_close(Ok(UploadResponse { id })).await.unwrap();
        assert_eq!(reply.await.unwrap().unwrap(), Ok(UploadResponse { id }));
    }

    #[tokio::test]
    async fn test_dropped_client_is_closed() {
        let (client, mut server) = channel(1);
        drop(client);
        assert!(matches!(server.receive().await, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_abort_is_transport_failure() {
        let (client, mut server) = channel(1);
        let reply = tokio::spawn(client.abort("connection reset"));

        match server.receive().await {
            Err(TransportError::Failed(reason)) => assert_eq!(reason, "connection reset"),
            other => panic!("unexpected receive result: {other:?}"),
        }
        drop(server);
        assert!(matches!(reply.await.unwrap(), Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_send_after_reply_fails() {
        let (client, mut server) = channel(1);
        server
            .reply_and_close(Ok(UploadResponse { id: Uuid::new_v4() }))
            .await
            .unwrap();
        assert!(matches!(
            client.send_chunk(Bytes::from_static(b"late")).await,
            Err(TransportError::Closed)
        ));
        assert!(server.reply_and_close(Ok(UploadResponse { id: Uuid::new_v4() })).await.is_err());
    }
}
