use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use ledger_api::{IdentityResolver, LedgerService};
use shared::{
    domain::{OwnerHandle, Property, PropertyId},
    error::ClientError,
    protocol::{CreatePropertyRequest, InquiryRequest, TransactionRecord, TransferOutcome},
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

pub mod directory;
pub mod filter;

pub use directory::{DirectoryPhase, PropertyDirectory};
pub use filter::FilterState;

/// User-visible notifications. Every completed mutation and every failure
/// produces one of these on the event stream.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    DirectoryRefreshed {
        properties: usize,
    },
    PropertyCreated {
        name: String,
        price: u64,
    },
    PurchaseCompleted {
        property_id: PropertyId,
        message: String,
    },
    PurchaseRejected {
        property_id: PropertyId,
        reason: String,
    },
    InquirySent {
        property_id: PropertyId,
    },
    Error(String),
}

// Recover the guard if a previous holder panicked; the guarded state is
// replaced wholesale and stays readable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Client-side session against the remote property ledger: mirrors the
/// catalog, answers filter queries from the mirror, and orchestrates
/// mutations. Single owner of the directory cache.
pub struct LedgerClient {
    ledger: Arc<dyn LedgerService>,
    identity_resolver: Arc<dyn IdentityResolver>,
    identity: OnceLock<OwnerHandle>,
    directory: Mutex<PropertyDirectory>,
    filter: Mutex<FilterState>,
    range_results: Mutex<Option<Vec<Property>>>,
    events: broadcast::Sender<ClientEvent>,
}

impl LedgerClient {
    pub fn new(
        ledger: Arc<dyn LedgerService>,
        identity_resolver: Arc<dyn IdentityResolver>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            ledger,
            identity_resolver,
            identity: OnceLock::new(),
            directory: Mutex::new(PropertyDirectory::new()),
            filter: Mutex::new(FilterState::default()),
            range_results: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Resolves the session identity, then performs the initial directory
    /// refresh. An identity failure is reported but does not block the
    /// refresh; the owned-by-me filter then matches nothing.
    pub async fn bootstrap(&self) -> Result<(), ClientError> {
        match self.identity_resolver.resolve().await {
            Ok(handle) => {
                info!(identity = %handle, "session identity resolved");
                let _ = self.identity.set(handle);
            }
            Err(err) => {
                warn!(error = %err, "identity resolution failed; owned-by-me filter will match nothing");
                let _ = self.events.send(ClientEvent::Error(err.to_string()));
            }
        }
        self.refresh_directory().await
    }

    /// Identity this session acts as; `None` until resolved, or forever if
    /// resolution failed.
    pub fn identity(&self) -> Option<&OwnerHandle> {
        self.identity.get()
    }

    /// Fetches the full catalog and replaces the mirrored snapshot. A
    /// trigger arriving while a refresh is outstanding is coalesced; a
    /// failure keeps the last good snapshot.
    pub async fn refresh_directory(&self) -> Result<(), ClientError> {
        let ticket = {
            let mut directory = lock(&self.directory);
            if directory.is_refreshing() {
                debug!("directory refresh already in flight; coalescing trigger");
                return Ok(());
            }
            directory.begin_refresh()
        };

        match self.ledger.list_properties().await {
            Ok(properties) => {
                let count = properties.len();
                let applied = lock(&self.directory).complete_refresh(ticket, properties);
                if applied {
                    info!(properties = count, "directory snapshot replaced");
                    let _ = self
                        .events
                        .send(ClientEvent::DirectoryRefreshed { properties: count });
                } else {
                    debug!("directory refresh superseded by a newer snapshot");
                }
                Ok(())
            }
            Err(err) => {
                lock(&self.directory).fail_refresh(ticket);
                warn!(error = %err, "directory refresh failed; keeping last good snapshot");
                Err(self.report(err))
            }
        }
    }

    /// Last good snapshot; empty before the first successful refresh.
    pub fn properties(&self) -> Arc<Vec<Property>> {
        lock(&self.directory).read()
    }

    pub fn directory_phase(&self) -> DirectoryPhase {
        lock(&self.directory).phase()
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        lock(&self.filter).search_query = query.into();
    }

    pub fn set_owned_only(&self, owned_only: bool) {
        lock(&self.filter).owned_only = owned_only;
    }

    pub fn set_available_only(&self, available_only: bool) {
        lock(&self.filter).available_only = available_only;
    }

    pub fn filter_state(&self) -> FilterState {
        lock(&self.filter).clone()
    }

    /// Combined listing view over the current snapshot and filter state.
    pub fn filtered_properties(&self) -> Vec<Property> {
        let snapshot = self.properties();
        let filter = self.filter_state();
        filter::matching_properties(&snapshot, &filter, self.identity())
    }

    /// Explicit range query over available properties. Both bounds are
    /// required; the outcome is recorded so an explicit empty result is
    /// distinguishable from a query that never ran.
    pub fn find_in_range(
        &self,
        min_price: &str,
        max_price: &str,
    ) -> Result<Vec<Property>, ClientError> {
        let min = filter::parse_price_bound("minimum", min_price).map_err(|err| self.report(err))?;
        let max = filter::parse_price_bound("maximum", max_price).map_err(|err| self.report(err))?;
        {
            let mut filter = lock(&self.filter);
            filter.min_price = Some(min);
            filter.max_price = Some(max);
        }

        let results = filter::properties_in_range(&self.properties(), min, max);
        debug!(min, max, matches = results.len(), "range query evaluated");
        *lock(&self.range_results) = Some(results.clone());
        Ok(results)
    }

    /// Result of the last range query, if one ran this session.
    pub fn range_results(&self) -> Option<Vec<Property>> {
        lock(&self.range_results).clone()
    }

    /// Validates the submitted fields, asks the ledger to create the
    /// property, and refreshes the mirror once on success. Any failure
    /// leaves the cache untouched.
    pub async fn submit_create(&self, name: &str, price: &str) -> Result<(), ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.report(ClientError::Input("property name is required".into())));
        }
        let price = filter::parse_price_bound("asking", price).map_err(|err| self.report(err))?;

        self.ledger
            .create_property(CreatePropertyRequest {
                name: name.to_string(),
                price,
            })
            .await
            .map_err(|err| self.report(err))?;

        info!(name, price, "property submitted to the ledger");
        let _ = self.events.send(ClientEvent::PropertyCreated {
            name: name.to_string(),
            price,
        });
        self.refresh_directory().await
    }

    /// Initiates an ownership transfer and settles the mirror afterwards.
    /// Leased records are refused before any remote call; only a completed
    /// transfer triggers a refresh, and exactly one.
    pub async fn submit_purchase(&self, id: PropertyId) -> Result<String, ClientError> {
        let leased = self
            .properties()
            .iter()
            .find(|property| property.id == id)
            .map(|property| property.is_leased);
        if leased == Some(true) {
            return Err(self.report(ClientError::Input(format!(
                "property {id} is leased and cannot be purchased"
            ))));
        }

        let outcome = self
            .ledger
            .transfer_ownership(id)
            .await
            .map_err(|err| self.report(err))?;

        match outcome {
            TransferOutcome::Completed(message) => {
                info!(property_id = id.0, %message, "ownership transfer completed");
                let _ = self.events.send(ClientEvent::PurchaseCompleted {
                    property_id: id,
                    message: message.clone(),
                });
                self.refresh_directory().await?;
                Ok(message)
            }
            TransferOutcome::Rejected(reason) => {
                warn!(property_id = id.0, %reason, "ownership transfer rejected");
                let _ = self.events.send(ClientEvent::PurchaseRejected {
                    property_id: id,
                    reason: reason.clone(),
                });
                Err(ClientError::Application(reason))
            }
            TransferOutcome::Malformed => {
                error!(property_id = id.0, "transfer reply carried neither ok nor err");
                Err(self.report(ClientError::UnexpectedResponse(
                    "transfer reply carried neither ok nor err".into(),
                )))
            }
        }
    }

    /// Posts an inquiry about a property. Fire-and-forget from the mirror's
    /// point of view; never triggers a refresh.
    pub async fn submit_inquiry(&self, id: PropertyId, message: &str) -> Result<(), ClientError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(self.report(ClientError::Input("inquiry message is required".into())));
        }

        self.ledger
            .send_inquiry(InquiryRequest {
                property_id: id,
                message: message.to_string(),
            })
            .await
            .map_err(|err| self.report(err))?;

        info!(property_id = id.0, "inquiry sent");
        let _ = self
            .events
            .send(ClientEvent::InquirySent { property_id: id });
        Ok(())
    }

    /// Read-through to the ledger's audit log.
    pub async fn transaction_history(&self) -> Result<Vec<TransactionRecord>, ClientError> {
        self.ledger
            .list_transactions()
            .await
            .map_err(|err| self.report(err))
    }

    fn report(&self, err: ClientError) -> ClientError {
        warn!(error = %err, "client operation failed");
        let _ = self.events.send(ClientEvent::Error(err.to_string()));
        err
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
