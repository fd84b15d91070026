use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::search;
use crate::state::{CategoryGroup, NameIndexEntry, PokemonRecord, PokemonStat, SpriteRefs};

const API_BASE: &str = "https://pokeapi.co/api/v2";
/// One page covers the whole catalog (~1300 entries at the time of writing).
const NAME_INDEX_LIMIT: u32 = 2000;
const BATCH_CONCURRENCY: usize = 12;
/// Known-empty or non-standard types never offered in the gallery.
const EXCLUDED_TYPES: &[&str] = &["shadow", "unknown"];

/// Transport-level failure, distinct from a not-found lookup (which callers
/// see as `Ok(None)` where it is a legitimate outcome).
#[derive(Debug)]
pub enum FetchError {
    Request(reqwest::Error),
    Status(reqwest::StatusCode),
    Batch(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Request(err) => write!(f, "request failed: {err}"),
            FetchError::Status(status) => write!(f, "unexpected status: {status}"),
            FetchError::Batch(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeDetailResponse {
    pokemon: Vec<TypePokemonEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct TypePokemonEntry {
    pokemon: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u16,
    name: String,
    height: u16,
    weight: u16,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

/// Full name enumeration, lowercase-normalized. Loaded once per session and
/// shared by the search and detail resolvers.
pub async fn fetch_name_index() -> Result<Vec<NameIndexEntry>, FetchError> {
    let url = format!("{API_BASE}/pokemon?limit={NAME_INDEX_LIMIT}");
    let response: ListResponse = fetch_json(&url).await?;
    Ok(response
        .results
        .into_iter()
        .map(|entry| NameIndexEntry {
            name: entry.name.to_lowercase(),
            url: entry.url,
        })
        .collect())
}

pub async fn fetch_type_list() -> Result<Vec<String>, FetchError> {
    let url = format!("{API_BASE}/type?limit=999");
    let response: ListResponse = fetch_json(&url).await?;
    let mut types: Vec<String> = response
        .results
        .into_iter()
        .map(|entry| entry.name)
        .filter(|name| !EXCLUDED_TYPES.contains(&name.as_str()))
        .collect();
    types.sort();
    Ok(types)
}

/// One record by name or numeric id. `Ok(None)` is the catalog's 404: the
/// key simply does not exist, as opposed to a transport failure.
pub async fn fetch_pokemon(key: &str) -> Result<Option<PokemonRecord>, FetchError> {
    let url = format!("{API_BASE}/pokemon/{key}");
    let response = http_client()
        .get(&url)
        .send()
        .await
        .map_err(FetchError::Request)?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }
    let dto: PokemonResponse = response.json().await.map_err(FetchError::Request)?;
    Ok(Some(record_from_response(dto)))
}

/// Concurrent fetch of many records, bounded by a semaphore, preserving the
/// input order. One failing member fails the whole batch; remaining in-flight
/// fetches are dropped with the join set.
pub async fn fetch_pokemon_batch(names: &[String]) -> Result<Vec<PokemonRecord>, FetchError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let semaphore = Arc::new(Semaphore::new(BATCH_CONCURRENCY));
    let mut join_set = JoinSet::new();
    for (slot, name) in names.iter().enumerate() {
        let name = name.clone();
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| FetchError::Batch("batch semaphore closed".to_string()))?;
            let record = fetch_pokemon(&name).await?.ok_or_else(|| {
                FetchError::Batch(format!("{name} is missing from the catalog"))
            })?;
            Ok::<(usize, PokemonRecord), FetchError>((slot, record))
        });
    }

    let mut slots: Vec<Option<PokemonRecord>> = vec![None; names.len()];
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Ok((slot, record))) => slots[slot] = Some(record),
            Ok(Err(err)) => return Err(err),
            Err(err) => return Err(FetchError::Batch(err.to_string())),
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

/// What a search resolution produced. NoMatch is neutral, not a failure.
#[derive(Clone, Debug)]
pub enum SearchResolution {
    Single(PokemonRecord),
    Many(Vec<PokemonRecord>),
    NoMatch,
}

/// The full search algorithm: exact-match lookup first; on a miss, substring
/// scan of the in-memory index; unique matches fetch like an exact hit;
/// multi-matches fan out over the first ten in index order.
pub async fn resolve_search(
    query: &str,
    index: &[NameIndexEntry],
) -> Result<SearchResolution, FetchError> {
    let needle = query.trim().to_lowercase();

    // An exact hit short-circuits partial matching entirely, even when the
    // query is also a substring of other names.
    if let Some(record) = fetch_pokemon(&needle).await? {
        return Ok(SearchResolution::Single(record));
    }

    let candidates = search::candidate_names(index, &needle);
    match candidates.as_slice() {
        [] => Ok(SearchResolution::NoMatch),
        [only] => match fetch_pokemon(only).await? {
            Some(record) => Ok(SearchResolution::Single(record)),
            None => Ok(SearchResolution::NoMatch),
        },
        _ => {
            let records = fetch_pokemon_batch(&candidates).await?;
            Ok(SearchResolution::Many(records))
        }
    }
}

/// Every member of one type, full records, no cap beyond the type's own
/// membership.
pub async fn fetch_category_group(name: &str) -> Result<CategoryGroup, FetchError> {
    let url = format!("{API_BASE}/type/{name}");
    let response: TypeDetailResponse = fetch_json(&url).await?;
    let names: Vec<String> = response
        .pokemon
        .into_iter()
        .map(|entry| entry.pokemon.name)
        .collect();
    let members = fetch_pokemon_batch(&names).await?;
    Ok(CategoryGroup {
        name: name.to_string(),
        members,
    })
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(FetchError::Request)?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }
    Ok(response
        .bytes()
        .await
        .map_err(FetchError::Request)?
        .to_vec())
}

fn record_from_response(response: PokemonResponse) -> PokemonRecord {
    let types = response
        .types
        .into_iter()
        .map(|slot| slot.type_info.name)
        .collect();
    let stats = response
        .stats
        .into_iter()
        .map(|slot| PokemonStat {
            name: slot.stat.name,
            value: slot.base_stat,
        })
        .collect();
    let sprites = SpriteRefs {
        front_default: pointer_string(&response.sprites, "/front_default"),
        front_shiny: pointer_string(&response.sprites, "/front_shiny"),
        home: pointer_string(&response.sprites, "/other/home/front_default"),
        official_artwork: pointer_string(
            &response.sprites,
            "/other/official-artwork/front_default",
        ),
    };
    PokemonRecord {
        id: response.id,
        name: response.name,
        height: response.height,
        weight: response.weight,
        types,
        stats,
        sprites,
    }
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(FetchError::Request)?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }
    response.json().await.map_err(FetchError::Request)
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}
