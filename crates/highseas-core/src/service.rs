//! Query layer: cache lookup, record-source reads, mapping, cache population.
//!
//! `DataService` owns both in-memory caches. Construct one per process and
//! share it; each method is a complete query.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use crate::api::{formula, RecordSource, SelectQuery};
use crate::cache::{OrderStore, TtlCache};
use crate::error::{DataError, Result};
use crate::grouping::{group_ships, OrphanPolicy, ShipGroup};
use crate::models::{Order, Person, Ship, PEOPLE_TABLE, SHIPS_TABLE, SHOP_ORDERS_TABLE};
use crate::shop::ShopCatalog;

// ============================================================================
// Constants
// ============================================================================

/// Ship groups are reused for 5 minutes.
const SHIPS_TTL_SECS: u64 = 5 * 60;

/// Person records are reused for 4 minutes.
const PERSON_TTL_SECS: u64 = 4 * 60;

const SHIPS_CACHE_CAPACITY: usize = 1000;
const PERSON_CACHE_CAPACITY: usize = 1000;

/// Orders placed before the event started are not shown.
const ORDERS_CUTOFF: &str = "2024-10-29";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub ships_ttl: Duration,
    pub person_ttl: Duration,
    pub ships_capacity: usize,
    pub person_capacity: usize,
    pub orders_cutoff: String,
    pub orphan_policy: OrphanPolicy,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            ships_ttl: Duration::from_secs(SHIPS_TTL_SECS),
            person_ttl: Duration::from_secs(PERSON_TTL_SECS),
            ships_capacity: SHIPS_CACHE_CAPACITY,
            person_capacity: PERSON_CACHE_CAPACITY,
            orders_cutoff: ORDERS_CUTOFF.to_string(),
            orphan_policy: OrphanPolicy::default(),
        }
    }
}

fn ships_cache_key(slack_id: &str, max_records: Option<usize>) -> String {
    match max_records {
        Some(max) => format!("{}-{}", slack_id, max),
        None => format!("{}-all", slack_id),
    }
}

fn person_cache_key(user_id: &str) -> String {
    format!("{}-person", user_id)
}

/// Cache state stays usable if a panic poisoned the lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct DataService {
    source: Arc<dyn RecordSource>,
    order_store: Arc<dyn OrderStore>,
    catalog: Arc<dyn ShopCatalog>,
    settings: ServiceSettings,
    ships: Mutex<TtlCache<Vec<ShipGroup>>>,
    people: Mutex<TtlCache<Person>>,
}

impl DataService {
    pub fn new(
        source: Arc<dyn RecordSource>,
        order_store: Arc<dyn OrderStore>,
        catalog: Arc<dyn ShopCatalog>,
        settings: ServiceSettings,
    ) -> Self {
        let ships = TtlCache::new(settings.ships_ttl, Some(settings.ships_capacity));
        let people = TtlCache::new(settings.person_ttl, Some(settings.person_capacity));
        Self {
            source,
            order_store,
            catalog,
            settings,
            ships: Mutex::new(ships),
            people: Mutex::new(people),
        }
    }

    /// Profile for a slack user id. `Ok(None)` when no record matches.
    pub async fn fetch_person(&self, user_id: &str) -> Result<Option<Person>> {
        let key = person_cache_key(user_id);
        let cached = lock(&self.people).get(&key);
        if cached.is_some() {
            return Ok(cached);
        }
        debug!(user_id = user_id, "Person cache miss");

        let query =
            SelectQuery::filter(formula::person_by_slack_id(user_id)).max_records(Some(1));
        let records = self
            .source
            .select(PEOPLE_TABLE, &query)
            .await
            .map_err(DataError::Upstream)?;

        let Some(record) = records.first() else {
            debug!(user_id = user_id, "No person record for user");
            return Ok(None);
        };
        let person = Person::from_record(record);
        lock(&self.people).insert(key, person.clone());
        Ok(Some(person))
    }

    /// Profile by record id, sharing the cache slot of `fetch_person` for
    /// `user_id`.
    pub async fn fetch_person_by_record_id(
        &self,
        record_id: &str,
        user_id: &str,
    ) -> Result<Person> {
        let key = person_cache_key(user_id);
        let cached = lock(&self.people).get(&key);
        if let Some(person) = cached {
            return Ok(person);
        }
        debug!(user_id = user_id, record_id = record_id, "Person cache miss");

        let record = self
            .source
            .find(PEOPLE_TABLE, record_id)
            .await
            .map_err(DataError::Upstream)?;
        let person = Person::from_record(&record);
        lock(&self.people).insert(key, person.clone());
        Ok(person)
    }

    /// A user's ships grouped by lineage, newest first.
    pub async fn fetch_ships(
        &self,
        slack_id: &str,
        max_records: Option<usize>,
    ) -> Result<Vec<ShipGroup>> {
        let key = ships_cache_key(slack_id, max_records);
        let cached = lock(&self.ships).get(&key);
        if let Some(groups) = cached {
            return Ok(groups);
        }
        debug!(slack_id = slack_id, max_records = ?max_records, "Ships cache miss");

        let query =
            SelectQuery::filter(formula::ships_for_entrant(slack_id)).max_records(max_records);
        let records = self
            .source
            .select(SHIPS_TABLE, &query)
            .await
            .map_err(DataError::Upstream)?;

        let ships = records
            .iter()
            .map(Ship::from_record)
            .collect::<Result<Vec<_>>>()?;
        let ship_count = ships.len();
        let groups = group_ships(ships, self.settings.orphan_policy);
        debug!(
            slack_id = slack_id,
            ships = ship_count,
            groups = groups.len(),
            "Grouped ships"
        );

        lock(&self.ships).insert(key, groups.clone());
        Ok(groups)
    }

    /// Shop orders for a user. A stored snapshot is returned as-is and never
    /// refreshed; only users without one trigger an upstream read.
    pub async fn get_user_shop_orders(&self, user_id: &str) -> Result<Vec<Order>> {
        let stored = self
            .order_store
            .get(user_id)
            .await
            .map_err(DataError::Store)?;
        if let Some(blob) = stored {
            let orders: Vec<Order> = serde_json::from_str(&blob)?;
            if !orders.is_empty() {
                return Ok(orders);
            }
        }
        debug!(user_id = user_id, "Order snapshot miss");

        let query = SelectQuery::filter(formula::orders_for_recipient(
            user_id,
            &self.settings.orders_cutoff,
        ));
        let (records, catalog) = futures::try_join!(
            async {
                self.source
                    .select(SHOP_ORDERS_TABLE, &query)
                    .await
                    .map_err(DataError::Upstream)
            },
            async { self.catalog.get_shop().await.map_err(DataError::Catalog) },
        )?;

        let orders: Vec<Order> = records
            .iter()
            .map(|record| Order::from_record(record, &catalog))
            .collect();
        let blob = serde_json::to_string(&orders)?;
        self.order_store
            .upsert(user_id, &blob)
            .await
            .map_err(DataError::Store)?;
        Ok(orders)
    }

    /// Forget the user's unbounded ship query and profile. Order snapshots
    /// are not touched.
    pub fn flush_caches(&self, user_id: &str) {
        lock(&self.ships).remove(&ships_cache_key(user_id, None));
        lock(&self.people).remove(&person_cache_key(user_id));
        info!(user_id = user_id, "Flushed cached ships and profile");
    }
}
