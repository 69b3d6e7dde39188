use std::fmt;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::bootstrap::persistence::Bootstrapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Bootstrapping,
    Ready,
    Listening,
    Failed,
    Terminated,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Uninitialized => "uninitialized",
            State::Bootstrapping => "bootstrapping",
            State::Ready => "ready",
            State::Listening => "listening",
            State::Failed => "failed",
            State::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition {from} -> {to}")]
    InvalidTransition { from: State, to: State },
    #[error("bootstrap failed")]
    Bootstrap(#[source] anyhow::Error),
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Server startup state machine.
///
/// `Uninitialized -> Bootstrapping -> Ready -> Listening`, or
/// `Bootstrapping -> Failed -> Terminated`. The port is only ever bound from
/// `Ready`, so nothing can connect before bootstrap has succeeded.
#[derive(Debug)]
pub struct Lifecycle {
    state: State,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: State::Uninitialized,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn transition(&mut self, to: State) -> Result<(), LifecycleError> {
        let allowed = matches!(
            (self.state, to),
            (State::Uninitialized, State::Bootstrapping)
                | (State::Bootstrapping, State::Ready)
                | (State::Bootstrapping, State::Failed)
                | (State::Ready, State::Listening)
                | (State::Failed, State::Terminated)
        );
        if !allowed {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = %self.state, to = %to, "lifecycle_transition");
        self.state = to;
        Ok(())
    }

    pub async fn bootstrap(&mut self, bootstrapper: &dyn Bootstrapper) -> Result<(), LifecycleError> {
        self.transition(State::Bootstrapping)?;
        match bootstrapper.run().await {
            Ok(()) => self.transition(State::Ready),
            Err(e) => {
                self.transition(State::Failed)?;
                Err(LifecycleError::Bootstrap(e))
            }
        }
    }

    pub async fn listen(&mut self, addr: SocketAddr) -> Result<TcpListener, LifecycleError> {
        if self.state != State::Ready {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to: State::Listening,
            });
        }
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| LifecycleError::Bind { addr, source })?;
        self.transition(State::Listening)?;
        Ok(listener)
    }

    pub fn terminate(&mut self) -> Result<(), LifecycleError> {
        self.transition(State::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(bool);

    #[async_trait]
    impl Bootstrapper for Fixed {
        async fn run(&self) -> anyhow::Result<()> {
            if self.0 {
                Ok(())
            } else {
                anyhow::bail!("store unreachable")
            }
        }
    }

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test]
    async fn successful_bootstrap_allows_listening() {
        let mut lc = Lifecycle::new();
        lc.bootstrap(&Fixed(true)).await.unwrap();
        assert_eq!(lc.state(), State::Ready);
        let listener = lc.listen(loopback()).await.unwrap();
        assert!(listener.local_addr().unwrap().port() > 0);
        assert_eq!(lc.state(), State::Listening);
    }

    #[tokio::test]
    async fn failed_bootstrap_never_binds() {
        let mut lc = Lifecycle::new();
        let err = lc.bootstrap(&Fixed(false)).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Bootstrap(_)));
        assert_eq!(lc.state(), State::Failed);

        let listen = lc.listen(loopback()).await;
        assert!(matches!(
            listen,
            Err(LifecycleError::InvalidTransition {
                from: State::Failed,
                to: State::Listening
            })
        ));

        lc.terminate().unwrap();
        assert_eq!(lc.state(), State::Terminated);
        assert!(lc.bootstrap(&Fixed(true)).await.is_err());
    }

    #[tokio::test]
    async fn cannot_listen_before_bootstrap() {
        let mut lc = Lifecycle::new();
        assert!(lc.listen(loopback()).await.is_err());
        assert!(lc.terminate().is_err());
        assert_eq!(lc.state(), State::Uninitialized);
    }
}
