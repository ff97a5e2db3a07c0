use crate::cli::Mode;
use crate::config::Config;
use anyhow::Context;
use chrono::NaiveDate;
use ecb_api::EcbAPI;
use futures::future::{try_join, try_join_all};
use log::{debug, info, warn};
use rates_model::{find_latest, group_by_month};
use rates_store::RatesStore;

/// Outcome of one fetch and store run.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub parsed: usize,
    pub months: usize,
    pub latest: Option<NaiveDate>,
    pub latest_updated: bool,
}

impl Summary {
    pub fn report(&self) {
        let Some(latest) = self.latest else {
            info!("Completed! Nothing to update.");
            return;
        };

        if self.latest_updated {
            info!(
                "Completed! Stored {} records in {} month-files and latest.json ({}).",
                self.parsed, self.months, latest
            );
        } else {
            info!(
                "Completed! Stored {} records in {} month-files, latest.json already at or after {}.",
                self.parsed, self.months, latest
            );
        }
    }
}

/// Fetches the feed selected by `mode`, then rewrites every touched month shard
/// and the latest pointer concurrently.
pub async fn run(config: &Config, mode: Mode) -> anyhow::Result<Summary> {
    let api = EcbAPI::with_urls(config.init_url.as_str(), config.update_url.as_str());
    let store = RatesStore::new(&config.data_dir);
    let feed = mode.feed();

    let rates = api
        .get_rates(feed)
        .await
        .with_context(|| format!("Cannot load {} feed from {}", feed, api.url_for(feed)))?;

    info!("Parsed {} daily records.", rates.len());

    let Some(latest) = find_latest(&rates).cloned() else {
        warn!("No rates found in {} feed, nothing written.", feed);
        return Ok(Summary::default());
    };

    let parsed = rates.len();
    let groups = group_by_month(rates);
    let months = groups.len();

    let shard_writes = try_join_all(
        groups
            .into_iter()
            .map(|(key, bucket)| store.process_group(key, bucket)),
    );
    let (shard_sizes, latest_updated) = try_join(shard_writes, store.process_latest(&latest))
        .await
        .with_context(|| format!("Cannot update store at {}", store.data_dir().display()))?;

    debug!("run | shard sizes: {:?}", shard_sizes);

    Ok(Summary {
        parsed,
        months,
        latest: Some(latest.date),
        latest_updated,
    })
}
