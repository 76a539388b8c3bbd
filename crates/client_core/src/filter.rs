use shared::{
    domain::{OwnerHandle, Property},
    error::ClientError,
};

/// Listing filters. Ephemeral and session-local; never sent to the ledger.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub search_query: String,
    pub owned_only: bool,
    pub available_only: bool,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

fn matches_query(property: &Property, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    property.name.to_lowercase().contains(query)
        || property.price.to_string().contains(query)
        || property.listing_label().contains(query)
}

/// Combined listing view: free-text match AND owned-by-me AND available,
/// preserving snapshot order. With no resolved identity the owned filter
/// matches nothing rather than guessing.
pub fn matching_properties(
    snapshot: &[Property],
    filter: &FilterState,
    identity: Option<&OwnerHandle>,
) -> Vec<Property> {
    let query = filter.search_query.to_lowercase();
    snapshot
        .iter()
        .filter(|property| {
            let matches_search = matches_query(property, &query);
            let matches_owned =
                !filter.owned_only || identity.is_some_and(|me| property.owner == *me);
            let matches_available = !filter.available_only || !property.is_leased;
            matches_search && matches_owned && matches_available
        })
        .cloned()
        .collect()
}

/// Parses a price bound from raw user text. Empty and non-numeric input are
/// rejected before anything touches the ledger.
pub fn parse_price_bound(label: &str, raw: &str) -> Result<u64, ClientError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ClientError::Input(format!("{label} price is required")));
    }
    raw.parse().map_err(|_| {
        ClientError::Input(format!("{label} price must be a whole non-negative number"))
    })
}

/// Inclusive price-range query over available (non-leased) properties. A
/// separate explicit action; not combined with the listing filters.
pub fn properties_in_range(snapshot: &[Property], min_price: u64, max_price: u64) -> Vec<Property> {
    snapshot
        .iter()
        .filter(|property| {
            !property.is_leased && property.price >= min_price && property.price <= max_price
        })
        .cloned()
        .collect()
}
