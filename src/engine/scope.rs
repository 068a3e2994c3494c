// src/engine/scope.rs

//! Join scope for launched (handle-less) tasks.
//!
//! Every launched job carries a [`ScopeToken`]. [`BatchScope::join`] resolves
//! once every token has been dropped, i.e. once every job has finished or
//! been torn down with its carrier.

use tokio::sync::mpsc;

#[derive(Debug)]
pub struct BatchScope {
    tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<()>,
}

/// Keeps its scope open while alive. Never sends anything.
#[derive(Debug, Clone)]
pub struct ScopeToken {
    _tx: mpsc::Sender<()>,
}

impl BatchScope {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self { tx, rx }
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            _tx: self.tx.clone(),
        }
    }

    pub async fn join(self) {
        let Self { tx, mut rx } = self;
        drop(tx);
        while rx.recv().await.is_some() {}
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn join_waits_for_every_token() {
        let scope = BatchScope::new();
        let early = scope.token();
        let late = scope.token();

        tokio::spawn(async move {
            drop(early);
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(late);
        });

        let started = tokio::time::Instant::now();
        scope.join().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn join_without_tokens_is_immediate() {
        tokio::time::timeout(Duration::from_millis(100), BatchScope::new().join())
            .await
            .expect("empty scope should join immediately");
    }
}
