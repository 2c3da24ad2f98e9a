//! TCP front end for the Wordnet game.
//!
//! Binds a listener, accepts exactly one client and hands the connection to
//! a [`Session`]. There is no accept loop: once that client is done the
//! listener is closed and the server is finished.

use crate::config::Config;
use crate::session::{Outcome, Session};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Server instance
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the listening socket and log the port it got.
    ///
    /// Port `0` lets the OS choose, so the log line is the only way a client
    /// can find the server.
    pub async fn bind(listen: &str) -> io::Result<Self> {
        let server = Server {
            listener: TcpListener::bind(listen).await?,
        };
        let port = server.local_addr()?.port();
        info!(port, "Server started");

        Ok(server)
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept one client and run its session to the end.
    ///
    /// The client stream is shut down and the listener dropped on every
    /// path, including transport errors.
    pub async fn serve(self) -> io::Result<Outcome> {
        let Server { listener } = self;

        let (stream, peer) = listener.accept().await?;
        info!(address = %peer.ip(), port = peer.port(), "Accepted connection");

        let mut session = Session::new(stream);
        let result = session.run().await;
        session.close().await;
        drop(session);
        drop(listener);

        result
    }
}

/// Serve a single client with the given configuration.
///
/// Errors are logged here; whatever happens the server ends up disconnected.
pub async fn run(config: &Config) {
    match serve_one(config).await {
        Ok(outcome) => debug!(?outcome, "Session finished"),
        Err(e) => error!(error = %e, "Connection error"),
    }
    info!("Disconnected.");
}

async fn serve_one(config: &Config) -> io::Result<Outcome> {
    Server::bind(&config.listen).await?.serve().await
}
