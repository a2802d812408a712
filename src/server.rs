// src/server.rs
// TCP transport and the single-threaded event loop driving the game.
//
// Every connection gets a reader task that turns socket reads into
// `ConnEvent`s and a writer task that drains an outgoing queue. Both run on
// the same current-thread runtime as the loop, and only the loop touches the
// `Game`: each event is dispatched to completion before the next wait.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::broadcast::Outbox;
use crate::config::ServerConfig;
use crate::defs::{ConnId, MAX_MESSAGE};
use crate::game::Game;
use crate::logging::{log_debug, log_error, log_info, log_warning};
use crate::record::GameRecord;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// What a reader task reports about its connection.
#[derive(Debug)]
enum ConnEvent {
    Data(ConnId, Vec<u8>),
    Closed(ConnId),
}

struct Connection {
    tx: UnboundedSender<String>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

/// Live client connections, keyed by the id handed to the game.
struct Connections {
    conns: HashMap<ConnId, Connection>,
    next_id: u64,
    events: UnboundedSender<ConnEvent>,
}

impl Connections {
    fn new(events: UnboundedSender<ConnEvent>) -> Self {
        Self { conns: HashMap::new(), next_id: 1, events }
    }

    fn register(&mut self, stream: TcpStream) -> ConnId {
        let conn = ConnId(self.next_id);
        self.next_id += 1;

        let (read_half, write_half) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(conn, read_half, self.events.clone()));
        let writer = tokio::spawn(write_loop(conn, write_half, rx));
        self.conns.insert(conn, Connection { tx, reader, writer });
        conn
    }

    /// Stops reading everywhere and gives the writers, all together, a
    /// bounded time to deliver what is still queued.
    async fn shutdown(mut self, limit: Duration) {
        let mut writers = Vec::with_capacity(self.conns.len());
        for (conn, connection) in self.conns.drain() {
            connection.reader.abort();
            drop(connection.tx);
            writers.push((conn, connection.writer));
        }

        let flush = async {
            for (_, writer) in writers.iter_mut() {
                let _ = writer.await;
            }
        };
        if tokio::time::timeout(limit, flush).await.is_err() {
            for (conn, writer) in &writers {
                if !writer.is_finished() {
                    log_warning(&format!("{conn}: gave up flushing output"));
                    writer.abort();
                }
            }
        }
    }
}

impl Outbox for Connections {
    fn send(&mut self, conn: ConnId, text: &str) {
        if let Some(connection) = self.conns.get(&conn) {
            if connection.tx.send(text.to_string()).is_err() {
                log_debug(&format!("{conn}: writer already gone"));
            }
        }
    }

    fn close(&mut self, conn: ConnId) {
        // Dropping the queue lets the writer flush and shut the socket down.
        if let Some(connection) = self.conns.remove(&conn) {
            connection.reader.abort();
        }
    }
}

async fn read_loop(conn: ConnId, mut reader: OwnedReadHalf, events: UnboundedSender<ConnEvent>) {
    let mut buf = [0u8; MAX_MESSAGE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if events.send(ConnEvent::Data(conn, buf[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(e) => {
                log_debug(&format!("{conn}: read failed: {e}"));
                break;
            }
        }
    }
    let _ = events.send(ConnEvent::Closed(conn));
}

async fn write_loop(conn: ConnId, mut writer: OwnedWriteHalf, mut rx: UnboundedReceiver<String>) {
    while let Some(text) = rx.recv().await {
        if let Err(e) = writer.write_all(text.as_bytes()).await {
            log_debug(&format!("{conn}: write failed: {e}"));
            return;
        }
    }
    let _ = writer.shutdown().await;
}

/// A bound listener plus the configuration of the game it will host.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.listen_addr()).await?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Hosts one game until it is over and returns its final standings.
    ///
    /// Accept failures are fatal and returned as errors; failures on a
    /// single connection only end that connection.
    pub async fn run(self) -> io::Result<GameRecord> {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut conns = Connections::new(events_tx);
        let mut game = Game::new(self.config.pebbles);
        log_info(&format!("Created new game {} listening on {}", game.id(), self.local_addr()?));

        while !game.is_over() {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, addr) = accepted?;
                    let conn = conns.register(stream);
                    log_debug(&format!("{conn} accepted from {addr}"));
                    game.connect(conn, &mut conns);
                }
                Some(event) = events_rx.recv() => match event {
                    ConnEvent::Data(conn, bytes) => game.receive(conn, &bytes, &mut conns),
                    ConnEvent::Closed(conn) => {
                        game.disconnect(conn, &mut conns);
                        log_debug(&format!("{conn} closed, {} sessions remain", game.registry().len()));
                    }
                },
            }
        }

        let record = game.record();
        if let Some(dir) = &self.config.dump_dir {
            match record.dump_to(dir) {
                Ok(path) => log_info(&format!("Game dumped to: {}", path.display())),
                Err(e) => log_error(&format!("Failed to dump game {}: {e}", record.id)),
            }
        }
        conns.shutdown(FLUSH_TIMEOUT).await;
        log_info("Server shutdown complete");
        Ok(record)
    }
}
