//! Server network layer: accept loop, fixed worker pool and the
//! per-connection two-round exchange

use crate::game::Game;
use crate::supply::SupplyError;
use log::{debug, error, info, warn};
use shared::{CodecError, Protocol, Request, Response, DEFAULT_PORT};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout_at, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_WORKERS: usize = 10;

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Construction-time server parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: String,
    /// Absolute budget for everything a connection does, both rounds included
    pub timeout: Duration,
    /// Number of connections handled concurrently
    pub workers: usize,
    /// Wire format spoken by clients
    pub protocol: Protocol,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            timeout: DEFAULT_TIMEOUT,
            workers: DEFAULT_WORKERS,
            protocol: Protocol::default(),
        }
    }
}

/// Where a connection stands in the initial/bonus exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingInitial,
    AwaitingBonus,
    Done,
}

impl Phase {
    /// Only a `Bonus` answer to the initial round earns a second round.
    pub fn next(self, resp: &Response) -> Phase {
        match self {
            Phase::AwaitingInitial if resp.is_bonus() => Phase::AwaitingBonus,
            _ => Phase::Done,
        }
    }

    pub fn round(&self) -> &'static str {
        match self {
            Phase::AwaitingInitial => "initial",
            Phase::AwaitingBonus => "bonus",
            Phase::Done => "done",
        }
    }
}

/// Failures that end a single connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to decode {round} request: {source}")]
    Decode {
        round: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("game failed in {round} round: {source}")]
    Game {
        round: &'static str,
        #[source]
        source: SupplyError,
    },

    #[error("failed to send {round} response: {source}")]
    Encode {
        round: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("connection deadline of {0:?} exceeded")]
    Timeout(Duration),
}

/// Accepted connection waiting for a worker
#[derive(Debug)]
struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

/// Lottery server sharing one game between a fixed set of workers
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    game: Arc<Mutex<Game>>,
}

impl Server {
    /// Binds the listener. Failure here is fatal to startup.
    pub async fn bind(config: ServerConfig, game: Game) -> io::Result<Self> {
        let listener = TcpListener::bind(&config.addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            config,
            game: Arc::new(Mutex::new(game)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle to the shared game, e.g. to inspect the jackpot
    pub fn game(&self) -> Arc<Mutex<Game>> {
        Arc::clone(&self.game)
    }

    /// Accepts connections until `shutdown` resolves, then waits for the
    /// workers to finish every connection already handed to them.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let workers = if self.config.workers == 0 {
            warn!("Worker count of 0 requested, using 1");
            1
        } else {
            self.config.workers
        };

        // Capacity 1 is the smallest tokio allows; accept stalls as soon as
        // no worker is free to take the next connection.
        let (conn_tx, conn_rx) = mpsc::channel::<Connection>(1);
        let conn_rx = Arc::new(Mutex::new(conn_rx));

        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    connections: Arc::clone(&conn_rx),
                    game: Arc::clone(&self.game),
                    protocol: self.config.protocol,
                    timeout: self.config.timeout,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            "Server started with {} workers, {} protocol, {:?} connection timeout",
            workers, self.config.protocol, self.config.timeout
        );

        tokio::pin!(shutdown);

        loop {
            let accepted = tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            tokio::select! {
                _ = &mut shutdown => {
                    warn!("{}: accepted but dropped, server is shutting down", peer);
                    break;
                }
                sent = conn_tx.send(Connection { stream, peer }) => {
                    if sent.is_err() {
                        error!("All workers exited, stopping accept loop");
                        break;
                    }
                }
            }
        }

        info!("Server shutting down, draining in-flight connections");
        drop(self.listener);
        drop(conn_tx);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Worker task panicked: {}", e);
            }
        }

        info!(
            "Server stopped, jackpot left: {}",
            self.game.lock().await.jackpot()
        );
    }
}

/// One executor of the pool; handles connections strictly one at a time
struct Worker {
    id: usize,
    connections: Arc<Mutex<mpsc::Receiver<Connection>>>,
    game: Arc<Mutex<Game>>,
    protocol: Protocol,
    timeout: Duration,
}

impl Worker {
    async fn run(self) {
        while let Some(conn) = self.next_connection().await {
            let peer = conn.peer;
            info!("{}: new connection", peer);

            if let Err(e) = self.handle(conn).await {
                error!("{}: failed to handle connection: {}", peer, e);
            }

            debug!("current jackpot: {}", self.game.lock().await.jackpot());
        }

        debug!("Worker {} finished", self.id);
    }

    async fn next_connection(&self) -> Option<Connection> {
        self.connections.lock().await.recv().await
    }

    /// Runs the exchange under one absolute deadline covering both rounds.
    async fn handle(&self, conn: Connection) -> Result<(), ConnectionError> {
        let deadline = Instant::now() + self.timeout;

        match timeout_at(deadline, self.exchange(conn)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectionError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, conn: Connection) -> Result<(), ConnectionError> {
        let Connection { mut stream, peer } = conn;
        let (reader, mut writer) = stream.split();
        let mut reader = BufReader::new(reader);

        let mut phase = Phase::AwaitingInitial;
        while phase != Phase::Done {
            let round = phase.round();

            let req = self
                .protocol
                .read_request(&mut reader)
                .await
                .map_err(|source| ConnectionError::Decode { round, source })?;
            info!("{}: {} request: {}", peer, round, req);

            let resp = self
                .play(&req)
                .await
                .map_err(|source| ConnectionError::Game { round, source })?;
            info!("{}: {} response: {}", peer, round, resp);

            self.protocol
                .write_response(&mut writer, &resp)
                .await
                .map_err(|source| ConnectionError::Encode { round, source })?;

            phase = phase.next(&resp);
        }

        Ok(())
    }

    /// The game lock is held for exactly one play, never across I/O.
    async fn play(&self, req: &Request) -> Result<Response, SupplyError> {
        let mut game = self.game.lock().await;
        game.play(req.fee, req.guess)
    }
}
