//! End-to-end handshake tests.
//!
//! These run both roles against each other over real loopback TCP, and drive
//! the responder with hand-crafted frames where a well-behaved initiator
//! would never send them.

use std::time::Duration;

use dh_peer::config::{HandshakeConfig, PeerConfig};
use dh_peer::protocol::exchange_keys;
use dh_peer::transport::{dial, Acceptor};
use dh_peer::{Config, DhError, Outcome, Peer, Role, Session};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

fn config_with(port: u16, accept_timeout_ms: u64) -> Config {
    Config {
        peer: PeerConfig {
            port,
            bind_host: "127.0.0.1".to_string(),
            accept_timeout_ms,
        },
        handshake: HandshakeConfig::default().with_fixed_proposal(5, 23),
    }
}

/// Bind an acceptor on an ephemeral port and return it with the port.
async fn ephemeral_acceptor() -> (Acceptor, u16) {
    let acceptor = Acceptor::bind("127.0.0.1:0").await.unwrap();
    let port = acceptor.local_addr().unwrap().port();
    (acceptor, port)
}

/// PROP 5 23 from initiator to responder, then both KEY frames.
#[tokio::test]
async fn test_full_exchange_over_tcp() {
    let (acceptor, port) = ephemeral_acceptor().await;

    let responder = tokio::spawn(async move {
        let mut peer = Peer::new(config_with(port, 5_000));
        peer.run_passive_with(acceptor).await
    });

    let mut initiator = Peer::new(config_with(port, 5_000));
    let initiator_outcome = initiator.run_active("127.0.0.1").await.unwrap();
    let responder_outcome = responder.await.unwrap().unwrap();

    let (Outcome::Exchanged(i), Outcome::Exchanged(r)) = (initiator_outcome, responder_outcome)
    else {
        panic!("both sides should complete the exchange");
    };

    assert_eq!(i.result.theirs, r.result.ours);
    assert_eq!(r.result.theirs, i.result.ours);
    assert!((0..23).contains(&i.result.ours));
    assert!((0..23).contains(&r.result.ours));
    assert_eq!(i.keys.proposal().generator(), 5);
    assert_eq!(r.keys.proposal().modulus(), 23);
    assert_eq!(i.shared_secret().unwrap(), r.shared_secret().unwrap());
}

/// Crafted `PROP -1 23`: the responder answers NAK and aborts.
#[tokio::test]
async fn test_responder_rejects_negative_generator() {
    let (acceptor, port) = ephemeral_acceptor().await;

    let responder = tokio::spawn(async move {
        let mut peer = Peer::new(config_with(port, 5_000));
        peer.run_passive_with(acceptor).await
    });

    let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let (read, mut write) = stream.into_split();
    write.write_all(b"PROP -1 23\n").await.unwrap();

    let mut lines = BufReader::new(read).lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("NAK"));
    // Responder closes after rejecting; nothing else follows
    assert_eq!(lines.next_line().await.unwrap(), None);

    let result = responder.await.unwrap();
    assert!(matches!(
        result,
        Err(DhError::InvalidProposal {
            generator: -1,
            modulus: 23
        })
    ));
}

/// Nobody dials: the responder reports a timeout and sends nothing.
#[tokio::test]
async fn test_responder_times_out_without_initiator() {
    let (acceptor, _port) = ephemeral_acceptor().await;
    let mut peer = Peer::new(config_with(0, 50));

    let outcome = peer.run_passive_with(acceptor).await.unwrap();
    assert!(matches!(outcome, Outcome::TimedOut));
    assert!(!peer.is_connected());
}

/// The initiator treats NAK as a normal, non-fatal end.
#[tokio::test]
async fn test_initiator_not_acknowledged() {
    let (acceptor, port) = ephemeral_acceptor().await;

    let responder = tokio::spawn(async move {
        let mut session = acceptor.accept(Duration::from_secs(5)).await.unwrap();
        let frame = session.receive_frame().await.unwrap();
        assert_eq!(frame.to_string(), "PROP 5 23");
        session.send_frame(&dh_peer::Frame::Nak).await.unwrap();
        session
    });

    let mut initiator = Peer::new(config_with(port, 5_000));
    let outcome = initiator.run_active("127.0.0.1").await.unwrap();
    assert!(matches!(outcome, Outcome::NotAcknowledged { ref reply } if reply == "NAK"));

    // Initiator closed its side without sending KEY
    let mut session = responder.await.unwrap();
    assert!(matches!(
        session.receive_frame().await,
        Err(DhError::ConnectionClosed)
    ));
}

/// Dialing a port with no listener is a connection failure.
#[tokio::test]
async fn test_initiator_connection_refused() {
    let (acceptor, port) = ephemeral_acceptor().await;
    drop(acceptor);

    let mut initiator = Peer::new(config_with(port, 5_000));
    let result = initiator.run_active("127.0.0.1").await;
    assert!(matches!(result, Err(DhError::Connection(_))));
    assert!(result.unwrap_err().is_fatal());
}

/// Whichever half of the exchange finishes first, both values arrive exactly once.
#[tokio::test]
async fn test_exchange_interleavings() {
    for round in 0..40u64 {
        let capacity = 1 + (round as usize % 8);
        let (a, b) = tokio::io::duplex(capacity);
        let (ar, aw) = tokio::io::split(a);
        let (br, bw) = tokio::io::split(b);
        let mut left = Session::from_parts(Role::Initiator, ar, aw);
        let mut right = Session::from_parts(Role::Responder, br, bw);

        let delay = Duration::from_millis(round % 3);
        let ours_left = 1_000 + round as i64;
        let ours_right = 2_000 + round as i64;

        let left_fut = async {
            if round % 2 == 0 {
                tokio::time::sleep(delay).await;
            }
            exchange_keys(&mut left, ours_left).await
        };
        let right_fut = async {
            if round % 2 == 1 {
                tokio::time::sleep(delay).await;
            }
            exchange_keys(&mut right, ours_right).await
        };

        let (l, r) = tokio::join!(left_fut, right_fut);
        let (l, r) = (l.unwrap(), r.unwrap());
        assert_eq!((l.ours, l.theirs), (ours_left, ours_right));
        assert_eq!((r.ours, r.theirs), (ours_right, ours_left));
        assert_eq!(left.stats().frames_sent, 1);
        assert_eq!(left.stats().frames_received, 1);
        assert_eq!(right.stats().frames_sent, 1);
        assert_eq!(right.stats().frames_received, 1);
    }
}

/// Session over TCP carries frames in both directions after dial/accept.
#[tokio::test]
async fn test_tcp_sessions_exchange_concurrently() {
    let (acceptor, port) = ephemeral_acceptor().await;
    let server = tokio::spawn(async move {
        let mut session = acceptor.accept(Duration::from_secs(5)).await.unwrap();
        exchange_keys(&mut session, 77).await
    });

    let mut client = dial("127.0.0.1", port).await.unwrap();
    let client_result = exchange_keys(&mut client, 33).await.unwrap();
    let server_result = server.await.unwrap().unwrap();

    assert_eq!(client_result.theirs, 77);
    assert_eq!(server_result.theirs, 33);
}
