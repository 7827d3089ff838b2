// 🔎 Lookup Dispatcher
// Resolve a feed id or provider-funding id by regenerating the owning stream
// and scanning it. Not-found is `Ok(None)`, never an error.

use crate::error::Result;
use crate::fixture::Fixtures;
use crate::funding::{detect_stream, generator_for};
use crate::models::{Funding, ProviderFunding};
use tracing::{debug, warn};

/// Feed record content for `id`
pub fn get_by_id(fixtures: &Fixtures, id: &str) -> Result<Option<Funding>> {
    let Some(stream) = detect_stream(id) else {
        warn!(id, "unrecognised funding stream prefix");
        return Ok(None);
    };

    let found = generator_for(stream)
        .fundings(fixtures)?
        .into_iter()
        .map(|grouped| grouped.funding)
        .find(|funding| funding.id == id);

    match &found {
        Some(_) => debug!(id, stream = stream.code(), "resolved funding"),
        None => warn!(id, "funding not found"),
    }
    Ok(found)
}

/// Single-provider funding record for `id`
pub fn get_provider_funding(fixtures: &Fixtures, id: &str) -> Result<Option<ProviderFunding>> {
    let Some(stream) = detect_stream(id) else {
        warn!(id, "unrecognised funding stream prefix");
        return Ok(None);
    };

    let found = generator_for(stream)
        .provider_fundings(fixtures)?
        .into_iter()
        .find(|funding| funding.id == id);

    if found.is_none() {
        warn!(id, "provider funding not found");
    }
    Ok(found)
}
