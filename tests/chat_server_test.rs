//! End-to-end chat scenarios over real TCP connections
//! Run with: cargo test --test chat_server_test

use std::sync::Once;

use slck::domain::traits::Acceptor;
use slck::{Config, Server, TcpAcceptor};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

struct TestServer {
    addr: String,
    shutdown: CancellationToken,
    task: JoinHandle<Result<(), slck::application::errors::ServerError>>,
}

impl TestServer {
    async fn start() -> Self {
        ensure_init();
        let acceptor = TcpAcceptor::bind("127.0.0.1:0").await.unwrap();
        let addr = acceptor.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task = tokio::spawn(async move { Server::new(Config::default()).run(acceptor, token).await });
        Self { addr, shutdown, task }
    }

    async fn connect(&self) -> Client {
        let stream = TcpStream::connect(&self.addr).await.unwrap();
        let (read, writer) = stream.into_split();
        Client {
            lines: BufReader::new(read).lines(),
            writer,
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.task.await.unwrap().unwrap();
    }
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn send(&mut self, frame: &str) {
        self.writer.write_all(frame.as_bytes()).await.unwrap();
    }

    async fn line(&mut self) -> String {
        self.lines.next_line().await.unwrap().expect("connection closed")
    }

    /// Send one frame and expect its OK
    async fn ok(&mut self, frame: &str) {
        self.send(frame).await;
        assert_eq!(self.line().await, "OK", "reply to {:?}", frame);
    }

    async fn lines(&mut self, count: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.line().await);
        }
        lines.sort();
        lines
    }
}

#[tokio::test]
async fn test_channel_broadcast_reaches_every_member_including_sender() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    alice.ok("REGISTER @alice\n").await;
    alice.ok("JOIN #general\n").await;
    bob.ok("REGISTER @bob\n").await;
    bob.ok("JOIN #general\n").await;

    alice.ok("SEND #general 11 hello world\n").await;
    assert_eq!(alice.line().await, "@alice: hello world");
    assert_eq!(bob.line().await, "@alice: hello world");

    server.stop().await;
}

#[tokio::test]
async fn test_direct_message_is_not_echoed() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    alice.ok("REGISTER @alice\n").await;
    bob.ok("REGISTER @bob\n").await;

    alice.ok("SEND @bob 2 hi\n").await;
    assert_eq!(bob.line().await, "@alice: hi");

    // Messages to yourself arrive in order, so anything echoed would show first
    alice.ok("SEND @alice 4 ping\n").await;
    assert_eq!(alice.line().await, "@alice: ping");

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_targets_are_dropped_silently() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;

    alice.ok("REGISTER @alice\n").await;
    alice.ok("SEND @nobody 3 hey\n").await;
    alice.ok("SEND #nowhere 3 hey\n").await;

    alice.ok("SEND @alice 4 ping\n").await;
    assert_eq!(alice.line().await, "@alice: ping");

    server.stop().await;
}

#[tokio::test]
async fn test_duplicate_username_is_reported_to_the_second_client() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut impostor = server.connect().await;

    alice.ok("REGISTER @alice\n").await;
    impostor.ok("REGISTER @alice\n").await;
    assert_eq!(impostor.line().await, "ERR @alice username is already taken");

    // The first registration still owns the name
    impostor.ok("SEND @alice 4 ping\n").await;
    assert_eq!(impostor.line().await, "ERR @alice is not registered");
    alice.ok("MEMBERS\n").await;
    assert_eq!(alice.line().await, "@alice");

    server.stop().await;
}

#[tokio::test]
async fn test_delete_removes_member_from_channels() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    alice.ok("REGISTER @alice\n").await;
    alice.ok("JOIN #general\n").await;
    bob.ok("REGISTER @bob\n").await;
    bob.ok("JOIN #general\n").await;

    bob.ok("DELETE\n").await;
    bob.send("MEMBERS\n").await;
    assert_eq!(bob.line().await, "ERR failed to list members: no session: register first");

    alice.ok("SEND #general 2 yo\n").await;
    assert_eq!(alice.line().await, "@alice: yo");

    bob.ok("REGISTER @bob\n").await;
    bob.ok("SEND @bob 4 ping\n").await;
    assert_eq!(bob.line().await, "@bob: ping");

    server.stop().await;
}

#[tokio::test]
async fn test_listings_and_errors() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    alice.send("MEMBERS\n").await;
    assert_eq!(alice.line().await, "ERR failed to list members: no session: register first");
    alice.send("HELLO\n").await;
    assert_eq!(alice.line().await, "ERR unknown command: HELLO");

    alice.ok("REGISTER @alice\n").await;
    alice.ok("JOIN #general\n").await;
    alice.ok("JOIN #random\n").await;
    bob.ok("REGISTER @bob\n").await;

    bob.ok("MEMBERS\n").await;
    assert_eq!(bob.lines(2).await, vec!["@alice", "@bob"]);
    bob.ok("CHANNELS\n").await;
    assert_eq!(bob.lines(2).await, vec!["#general", "#random"]);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_notifies_connected_clients() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    alice.ok("REGISTER @alice\n").await;

    server.stop().await;

    assert_eq!(alice.line().await, "ERR server is shutting down");
    assert!(alice.lines.next_line().await.unwrap().is_none());
}
