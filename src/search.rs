//! In-memory half of the search resolver: substring matching against the
//! name index and client-side sorting of result lists. The fetch
//! orchestration around these lives in `api::resolve_search`.

use crate::state::{NameIndexEntry, PokemonRecord, SortDir, SortKey};

/// Multi-match result lists are truncated here, silently.
pub const MAX_RESULTS: usize = 10;
/// Live suggestions shown under the search input while typing.
pub const SUGGESTION_LIMIT: usize = 5;

/// Index entries whose name contains `needle` as a substring, in index order.
/// No ranking by match position or quality. `needle` must already be
/// lowercased; the index is lowercase-normalized at load time.
pub fn matching_entries<'a>(
    index: &'a [NameIndexEntry],
    needle: &str,
) -> Vec<&'a NameIndexEntry> {
    index
        .iter()
        .filter(|entry| entry.name.contains(needle))
        .collect()
}

/// Names to fetch for a multi-match fan-out: the first `MAX_RESULTS` matches
/// in index order.
pub fn candidate_names(index: &[NameIndexEntry], needle: &str) -> Vec<String> {
    matching_entries(index, needle)
        .into_iter()
        .take(MAX_RESULTS)
        .map(|entry| entry.name.clone())
        .collect()
}

/// Sort a result list in place. Stable: records comparing equal keep their
/// prior relative order, in both directions.
pub fn sort_records(records: &mut [PokemonRecord], key: SortKey, dir: SortDir) {
    records.sort_by(|a, b| {
        let ordering = match key.stat_name() {
            None => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Some(stat) => a.stat(stat).cmp(&b.stat(stat)),
        };
        match dir {
            SortDir::Ascending => ordering,
            SortDir::Descending => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PokemonStat, SpriteRefs};
    use pretty_assertions::assert_eq;

    fn entry(name: &str) -> NameIndexEntry {
        NameIndexEntry {
            name: name.to_string(),
            url: format!("https://pokeapi.co/api/v2/pokemon/{name}/"),
        }
    }

    fn record(name: &str, hp: u16, attack: u16) -> PokemonRecord {
        PokemonRecord {
            id: 0,
            name: name.to_string(),
            height: 7,
            weight: 69,
            types: vec!["normal".to_string()],
            stats: vec![
                PokemonStat {
                    name: "hp".to_string(),
                    value: hp,
                },
                PokemonStat {
                    name: "attack".to_string(),
                    value: attack,
                },
            ],
            sprites: SpriteRefs::default(),
        }
    }

    #[test]
    fn matching_preserves_index_order() {
        let index = vec![
            entry("charizard"),
            entry("pikachu"),
            entry("charmander"),
            entry("charmeleon"),
        ];
        let names: Vec<_> = matching_entries(&index, "char")
            .into_iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["charizard", "charmander", "charmeleon"]);
    }

    #[test]
    fn matching_is_substring_not_prefix() {
        let index = vec![entry("pikachu"), entry("raichu"), entry("pichu")];
        let names: Vec<_> = matching_entries(&index, "chu")
            .into_iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["pikachu", "raichu", "pichu"]);
    }

    #[test]
    fn no_match_yields_empty() {
        let index = vec![entry("bulbasaur"), entry("squirtle")];
        assert!(matching_entries(&index, "zzz").is_empty());
    }

    #[test]
    fn candidates_capped_at_ten() {
        let index: Vec<_> = (0..25).map(|i| entry(&format!("mon-{i:02}"))).collect();
        let names = candidate_names(&index, "mon");
        assert_eq!(names.len(), MAX_RESULTS);
        assert_eq!(names[0], "mon-00");
        assert_eq!(names[9], "mon-09");
    }

    #[test]
    fn name_sort_is_plain_string_order() {
        // charizard < charmander < charmeleon: 'i' < 'm', then 'a' < 'e'.
        let mut records = vec![
            record("charmeleon", 58, 64),
            record("charizard", 78, 84),
            record("charmander", 39, 52),
        ];
        sort_records(&mut records, SortKey::Name, SortDir::Ascending);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["charizard", "charmander", "charmeleon"]);
    }

    #[test]
    fn stat_sort_descending() {
        let mut records = vec![
            record("charmander", 39, 52),
            record("charizard", 78, 84),
            record("charmeleon", 58, 64),
        ];
        sort_records(&mut records, SortKey::Hp, SortDir::Descending);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["charizard", "charmeleon", "charmander"]);
    }

    #[test]
    fn missing_stat_sorts_as_zero() {
        let mut statless = record("ditto", 48, 48);
        statless.stats.clear();
        let mut records = vec![record("mew", 100, 100), statless];
        sort_records(&mut records, SortKey::Attack, SortDir::Ascending);
        assert_eq!(records[0].name, "ditto");
        assert_eq!(records[1].name, "mew");
    }

    #[test]
    fn equal_keys_keep_prior_order() {
        let mut records = vec![
            record("plusle", 60, 50),
            record("minun", 60, 40),
            record("pachirisu", 60, 45),
        ];
        sort_records(&mut records, SortKey::Hp, SortDir::Ascending);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["plusle", "minun", "pachirisu"]);

        // Idempotent under re-application.
        sort_records(&mut records, SortKey::Hp, SortDir::Ascending);
        let again: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(again, vec!["plusle", "minun", "pachirisu"]);
    }
}
