use super::source::TileSource;
use crate::{
    core::{config::TileLoadingConfig, geo::TileCoord},
    prelude::HashSet,
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use std::thread;

/// Outcome of one tile download
#[derive(Debug)]
pub struct TileResult {
    pub coord: TileCoord,
    pub data: std::result::Result<Vec<u8>, String>,
}

/// Fetches tiles on detached threads and hands the bytes back over a channel
///
/// Requests are fire-and-forget: the caller polls [`TileLoader::try_recv_results`]
/// from its own thread whenever it wants to pick up finished downloads.
pub struct TileLoader {
    config: TileLoadingConfig,
    client: OnceCell<Client>,
    tx: Sender<TileResult>,
    rx: Receiver<TileResult>,
    pending: HashSet<TileCoord>,
}

impl TileLoader {
    pub fn new(config: TileLoadingConfig) -> Self {
        let (tx, rx) = unbounded();
        Self {
            config,
            client: OnceCell::new(),
            tx,
            rx,
            pending: HashSet::default(),
        }
    }

    pub fn config(&self) -> &TileLoadingConfig {
        &self.config
    }

    /// Shared blocking client, built on first use with our User-Agent so
    /// that public tile servers accept the requests
    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .user_agent(self.config.user_agent.clone())
                .build()
                .map_err(MapError::from)
        })
    }

    pub fn is_pending(&self, coord: &TileCoord) -> bool {
        self.pending.contains(coord)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Starts downloading `coord` unless it is already in flight.
    /// Returns whether a new request was started.
    pub fn request(&mut self, source: &dyn TileSource, coord: TileCoord) -> Result<bool> {
        if !self.config.fetch_enabled || self.pending.contains(&coord) {
            return Ok(false);
        }

        let client = self.client()?.clone();
        let url = source.url(coord);
        let tx = self.tx.clone();
        let attempts = self.config.max_retries + 1;
        let retry_delay = self.config.retry_delay();

        self.pending.insert(coord);
        thread::spawn(move || {
            let mut last_error = String::new();
            for attempt in 1..=attempts {
                log::debug!("fetch tile {:?} attempt {} ({})", coord, attempt, url);
                match Self::fetch(&client, &url) {
                    Ok(data) => {
                        log::debug!("downloaded tile {:?} ({} bytes)", coord, data.len());
                        // The receiver may already be gone if the layer was dropped
                        let _ = tx.send(TileResult { coord, data: Ok(data) });
                        return;
                    }
                    Err(e) => {
                        log::warn!("tile {:?} download failed on attempt {}: {}", coord, attempt, e);
                        last_error = e.to_string();
                        if attempt < attempts {
                            thread::sleep(retry_delay);
                        }
                    }
                }
            }
            log::error!("giving up on tile {:?}", coord);
            let _ = tx.send(TileResult {
                coord,
                data: Err(last_error),
            });
        });

        Ok(true)
    }

    fn fetch(client: &Client, url: &str) -> Result<Vec<u8>> {
        let response = client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    /// Drains finished downloads without blocking
    pub fn try_recv_results(&mut self) -> Vec<TileResult> {
        let results: Vec<TileResult> = self.rx.try_iter().collect();
        for result in &results {
            self.pending.remove(&result.coord);
        }
        results
    }

    /// Sender used by the worker threads; exposed so results can be injected
    #[cfg(test)]
    pub(crate) fn sender(&self) -> Sender<TileResult> {
        self.tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::source::OpenStreetMapSource;

    fn offline() -> TileLoadingConfig {
        TileLoadingConfig {
            fetch_enabled: false,
            ..TileLoadingConfig::default()
        }
    }

    #[test]
    fn test_disabled_loader_never_requests() {
        let mut loader = TileLoader::new(offline());
        let started = loader
            .request(&OpenStreetMapSource::new(), TileCoord::new(0, 0, 0))
            .unwrap();
        assert!(!started);
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn test_results_clear_pending() {
        let mut loader = TileLoader::new(offline());
        let coord = TileCoord::new(1, 1, 1);
        loader.pending.insert(coord);

        loader
            .sender()
            .send(TileResult {
                coord,
                data: Ok(vec![1, 2, 3]),
            })
            .unwrap();

        let results = loader.try_recv_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data.as_deref(), Ok(&[1u8, 2, 3][..]));
        assert!(!loader.is_pending(&coord));
        assert!(loader.try_recv_results().is_empty());
    }
}
