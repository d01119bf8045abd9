//! One reporting session over one connected stream.
//!
//! On entry the queue is reset to a single fresh report. The loop then waits
//! on the queue signal (bounded by the poll interval), writes everything
//! queued in order, and queues a heartbeat once nothing has been sent for a
//! full heartbeat interval. Any write or read failure ends the session. A peer
//! that closes its sending side is simply no longer read from. Frames that
//! were not written are not redelivered.

use std::io;

use herald_net::heartbeat_frame;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::report::ReportSource;
use crate::state::{ReporterState, StateWatch};
use crate::timing::ReporterTiming;

/// Why a session ended.
#[derive(Debug)]
pub(crate) enum SessionEnd {
    /// Shutdown was requested.
    Cancelled,
    /// The connection is unusable.
    Failed(SessionError),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SessionError {
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
}

/// Drive one session until it fails or shutdown is requested.
pub(crate) async fn run_session<S>(
    stream: S,
    source: &ReportSource,
    timing: &ReporterTiming,
    state: &StateWatch,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let queue = source.queue();
    let mut inbound = [0u8; 512];
    let mut peer_sending = true;

    source.restart_queue();
    let mut last_sent = Instant::now();
    state.set(ReporterState::Active);

    loop {
        if *shutdown.borrow() {
            return SessionEnd::Cancelled;
        }

        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return SessionEnd::Cancelled;
                }
            }
            read = reader.read(&mut inbound), if peer_sending => match read {
                Ok(0) => {
                    tracing::debug!("Peer closed its sending side");
                    peer_sending = false;
                }
                Ok(n) => tracing::trace!("Ignoring {n} inbound byte(s)"),
                Err(e) => return SessionEnd::Failed(SessionError::Read(e)),
            },
            _ = queue.wait(timing.poll_interval) => {}
        }

        let frames = queue.drain_all();
        if !frames.is_empty() {
            for frame in &frames {
                if let Err(e) = writer.write_all(frame).await {
                    return SessionEnd::Failed(SessionError::Write(e));
                }
            }
            if let Err(e) = writer.flush().await {
                return SessionEnd::Failed(SessionError::Write(e));
            }
            last_sent = Instant::now();
        }

        if last_sent.elapsed() >= timing.heartbeat_interval {
            queue.enqueue(heartbeat_frame());
            last_sent = Instant::now();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::report::tests::test_source;
    use herald_net::{FrameConfig, MessageType, read_frame};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{DuplexStream, ReadBuf, duplex};

    fn fast_timing() -> ReporterTiming {
        ReporterTiming {
            heartbeat_interval: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_opens_with_fresh_report() {
        let source = test_source();
        source.player_joined("Alice");
        source.queue().enqueue(vec![0xAA; 4]);

        let (client, mut server) = duplex(64 * 1024);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();
        let timing = fast_timing();

        let session = run_session(client, &source, &timing, &state, &mut shutdown_rx);
        let check = async {
            let frame = read_frame(&mut server, &FrameConfig::default())
                .await
                .unwrap();
            assert_eq!(frame.message_type, MessageType::Report);
            assert_eq!(decode_players(&frame.payload), vec!["Alice"]);
            assert_eq!(state.current(), ReporterState::Active);
            shutdown_tx.send(true).unwrap();
        };

        let (end, ()) = tokio::join!(session, check);
        assert!(matches!(end, SessionEnd::Cancelled));
        assert!(source.queue().is_empty(), "Stale frame must not be sent");
    }

    fn decode_players(payload: &[u8]) -> Vec<String> {
        herald_report::decode_report(payload)
            .unwrap()
            .descriptor
            .players
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_after_idle_interval() {
        let source = test_source();
        let (client, mut server) = duplex(64 * 1024);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();
        let timing = fast_timing();

        let session = run_session(client, &source, &timing, &state, &mut shutdown_rx);
        let check = async {
            let config = FrameConfig::default();
            let start = Instant::now();
            let first = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(first.message_type, MessageType::Report);

            let hb = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(hb.message_type, MessageType::Heartbeat);
            assert!(hb.payload.is_empty());
            let first_gap = start.elapsed();
            assert!(first_gap >= Duration::from_secs(10));
            assert!(first_gap < Duration::from_millis(10_300));

            let hb2 = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(hb2.message_type, MessageType::Heartbeat);
            let second_gap = start.elapsed() - first_gap;
            assert!(second_gap >= Duration::from_secs(10));
            assert!(second_gap < Duration::from_millis(10_300));
            shutdown_tx.send(true).unwrap();
        };

        let (end, ()) = tokio::join!(session, check);
        assert!(matches!(end, SessionEnd::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_delays_heartbeat() {
        let source = test_source();
        let (client, mut server) = duplex(64 * 1024);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();
        let timing = fast_timing();

        let session = run_session(client, &source, &timing, &state, &mut shutdown_rx);
        let check = async {
            let config = FrameConfig::default();
            read_frame(&mut server, &config).await.unwrap();

            tokio::time::sleep(Duration::from_secs(6)).await;
            source.player_joined("Bob");
            let joined = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(joined.message_type, MessageType::Report);
            let sent_at = Instant::now();

            let hb = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(hb.message_type, MessageType::Heartbeat);
            assert!(sent_at.elapsed() >= Duration::from_secs(10));
            shutdown_tx.send(true).unwrap();
        };

        let (end, ()) = tokio::join!(session, check);
        assert!(matches!(end, SessionEnd::Cancelled));
    }

    #[tokio::test]
    async fn test_alice_bob_roster_reaches_wire_in_order() {
        let source = test_source();
        let (client, mut server) = duplex(64 * 1024);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();
        let timing = fast_timing();

        let session = run_session(client, &source, &timing, &state, &mut shutdown_rx);
        let check = async {
            let config = FrameConfig::default();
            let opening = read_frame(&mut server, &config).await.unwrap();
            assert!(decode_players(&opening.payload).is_empty());

            source.player_joined("Alice");
            source.player_joined("Bob");
            source.player_left("Alice");

            let mut rosters = Vec::new();
            for _ in 0..3 {
                let frame = read_frame(&mut server, &config).await.unwrap();
                rosters.push(decode_players(&frame.payload));
            }
            assert_eq!(
                rosters,
                vec![vec!["Alice"], vec!["Alice", "Bob"], vec!["Bob"]]
            );
            shutdown_tx.send(true).unwrap();
        };

        let (end, ()) = tokio::join!(session, check);
        assert!(matches!(end, SessionEnd::Cancelled));
    }

    /// A duplex end that can be told to fail every write.
    pub(crate) struct TestStream {
        inner: DuplexStream,
        broken: bool,
    }

    impl TestStream {
        pub(crate) fn healthy(inner: DuplexStream) -> Self {
            Self {
                inner,
                broken: false,
            }
        }

        pub(crate) fn broken(inner: DuplexStream) -> Self {
            Self {
                inner,
                broken: true,
            }
        }
    }

    impl AsyncRead for TestStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for TestStream {
        fn poll_write(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.broken {
                return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
            }
            Pin::new(&mut self.inner).poll_write(cx, buf)
        }

        fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.inner).poll_flush(cx)
        }

        fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.inner).poll_shutdown(cx)
        }
    }

    #[tokio::test]
    async fn test_write_failure_ends_session() {
        let source = test_source();
        let (client, _server) = duplex(1024);
        let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();

        let end = run_session(
            TestStream::broken(client),
            &source,
            &fast_timing(),
            &state,
            &mut shutdown_rx,
        )
        .await;
        assert!(matches!(end, SessionEnd::Failed(SessionError::Write(_))));
    }

    #[tokio::test]
    async fn test_write_to_vanished_peer_ends_session() {
        let source = test_source();
        let (client, server) = duplex(64 * 1024);
        let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();
        drop(server);

        let end = run_session(client, &source, &fast_timing(), &state, &mut shutdown_rx).await;
        assert!(matches!(end, SessionEnd::Failed(SessionError::Write(_))));
    }

    #[tokio::test]
    async fn test_half_closed_peer_keeps_session_open() {
        let source = test_source();
        let (client, mut server) = duplex(64 * 1024);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();
        let timing = fast_timing();

        let session = run_session(client, &source, &timing, &state, &mut shutdown_rx);
        let check = async {
            let config = FrameConfig::default();
            read_frame(&mut server, &config).await.unwrap();
            server.shutdown().await.unwrap();

            tokio::time::sleep(Duration::from_millis(300)).await;
            assert_eq!(state.current(), ReporterState::Active);

            source.player_joined("Alice");
            let frame = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(decode_players(&frame.payload), vec!["Alice"]);
            shutdown_tx.send(true).unwrap();
        };

        let (end, ()) = tokio::join!(session, check);
        assert!(matches!(end, SessionEnd::Cancelled));
    }

    #[tokio::test]
    async fn test_queued_frames_written_in_fifo_order() {
        let source = test_source();
        let (client, mut server) = duplex(64 * 1024);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = StateWatch::new();
        let timing = fast_timing();

        let session = run_session(client, &source, &timing, &state, &mut shutdown_rx);
        let check = async {
            let config = FrameConfig::default();
            read_frame(&mut server, &config).await.unwrap();

            source.report_now();
            source.queue().enqueue(heartbeat_frame());
            source.player_joined("Carol");

            let a = read_frame(&mut server, &config).await.unwrap();
            let b = read_frame(&mut server, &config).await.unwrap();
            let c = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(a.message_type, MessageType::Report);
            assert_eq!(b.message_type, MessageType::Heartbeat);
            assert_eq!(c.message_type, MessageType::Report);
            assert_eq!(decode_players(&c.payload), vec!["Carol"]);
            shutdown_tx.send(true).unwrap();
        };

        let (end, ()) = tokio::join!(session, check);
        assert!(matches!(end, SessionEnd::Cancelled));
    }
}
