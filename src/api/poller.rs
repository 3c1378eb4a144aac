// ============================================================================
// Poller de taux en arrière-plan
// ============================================================================
// Boucle : fetch_rates() -> callback(instantané) -> pause -> ...
//
// CONCEPT RUST : Thread + runtime tokio dédié
// - std::thread::spawn() : thread OS séparé de l'UI
// - Runtime current_thread : exécute le code async dans ce thread
// - watch::channel : signal d'arrêt, réveille la pause immédiatement
//
// Le callback est isolé : une erreur renvoyée est loggée, une panique est
// rattrapée. Dans les deux cas la boucle continue.
// ============================================================================

use std::panic::{self, AssertUnwindSafe};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::coingecko::RateFetcher;
use crate::models::RateCache;

/// Poignée sur le poller en cours d'exécution
///
/// Drop arrête aussi le poller : impossible de l'oublier en tâche de fond.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Demande l'arrêt et attend la fin du thread
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Vrai tant que le thread du poller tourne
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map_or(false, |t| !t.is_finished())
    }

    fn shutdown(&mut self) {
        // Err uniquement si le thread est déjà terminé
        let _ = self.stop_tx.send(true);

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Rate poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Lance le poller de taux
///
/// # Arguments
/// * `fetcher` - Client lié au RateStore à rafraîchir
/// * `interval` - Pause entre deux récupérations
/// * `callback` - Appelé avec l'instantané après chaque récupération
pub fn start_poller<F>(fetcher: RateFetcher, interval: Duration, mut callback: F) -> Result<PollerHandle>
where
    F: FnMut(RateCache) -> Result<()> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Échec de la création du runtime tokio du poller")?;

    let (stop_tx, mut stop_rx) = watch::channel(false);

    let thread = std::thread::Builder::new()
        .name("rate-poller".to_string())
        .spawn(move || {
            info!(interval_secs = interval.as_secs_f64(), "Rate poller started");

            runtime.block_on(async move {
                loop {
                    if *stop_rx.borrow() {
                        break;
                    }

                    // La récupération elle-même est interruptible
                    let snapshot = tokio::select! {
                        snapshot = fetcher.fetch_rates() => snapshot,
                        _ = stop_rx.changed() => break,
                    };

                    invoke_callback(&mut callback, snapshot);

                    tokio::select! {
                        _ = tokio::time::sleep(interval) => {}
                        _ = stop_rx.changed() => break,
                    }
                }
            });

            info!("Rate poller stopped");
        })
        .context("Échec du lancement du thread du poller")?;

    Ok(PollerHandle {
        stop_tx,
        thread: Some(thread),
    })
}

/// Appelle le callback en absorbant erreurs et paniques
fn invoke_callback<F>(callback: &mut F, snapshot: RateCache)
where
    F: FnMut(RateCache) -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
        Ok(Ok(())) => debug!("Rate callback completed"),
        Ok(Err(e)) => warn!(error = ?e, "Rate callback failed, ignoring"),
        Err(_) => error!("Rate callback panicked, ignoring"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Instant;

    use super::*;
    use crate::config::Config;
    use crate::models::RateStore;

    const WAIT: Duration = Duration::from_secs(10);

    fn unreachable_fetcher(store: RateStore) -> RateFetcher {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout: Duration::from_secs(2),
            ..Config::default()
        };
        RateFetcher::new(&config, store).unwrap()
    }

    fn wait_for(counter: &AtomicUsize, at_least: usize) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if counter.load(Ordering::SeqCst) >= at_least {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_poller_delivers_stale_cache_on_failure() {
        let store = RateStore::with_cache(RateCache::with_rates(5_000_000.0, 250_000.0, 83.0));
        let before = store.snapshot();
        let (tx, rx) = mpsc::channel();

        let handle = start_poller(
            unreachable_fetcher(store.clone()),
            Duration::from_millis(20),
            move |cache| tx.send(cache).context("receiver dropped"),
        )
        .unwrap();

        for _ in 0..2 {
            let snapshot = rx.recv_timeout(WAIT).unwrap();
            assert_eq!(snapshot, before);
        }

        handle.stop();

        // Le callback (et son Sender) est détruit avec le thread
        assert!(rx.iter().all(|snapshot| snapshot == before));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_poller_survives_callback_faults() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let handle = start_poller(
            unreachable_fetcher(RateStore::new()),
            Duration::from_millis(10),
            move |_cache| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                match n {
                    0 => panic!("callback fault"),
                    1 => anyhow::bail!("callback error"),
                    _ => Ok(()),
                }
            },
        )
        .unwrap();

        assert!(wait_for(&calls, 3), "poller stopped after a callback fault");
        assert!(handle.is_running());
        handle.stop();
    }

    #[test]
    fn test_stop_interrupts_sleep() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let handle = start_poller(
            unreachable_fetcher(RateStore::new()),
            Duration::from_secs(3600),
            move |_cache| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .unwrap();

        assert!(wait_for(&calls, 1));

        let started = Instant::now();
        handle.stop();
        assert!(started.elapsed() < WAIT);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_stops_poller() {
        let (tx, rx) = mpsc::channel::<RateCache>();
        {
            let _handle = start_poller(
                unreachable_fetcher(RateStore::new()),
                Duration::from_secs(3600),
                move |cache| tx.send(cache).context("receiver dropped"),
            )
            .unwrap();
            rx.recv_timeout(WAIT).unwrap();
        }
        // Thread joint au drop : plus aucun émetteur
        assert!(rx.recv_timeout(WAIT).is_err());
    }
}
