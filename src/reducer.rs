use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::search;
use crate::sprite;
use crate::state::{AppState, SearchOutcome, View};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.index_loading = true;
            state.types_loading = true;
            state.message = None;
            let mut effects = vec![Effect::LoadNameIndex, Effect::LoadTypes];
            if !state.search.query.trim().is_empty() {
                effects.push(begin_search(state));
            }
            DispatchResult::changed_with_many(effects)
        }

        Action::NameIndexDidLoad(entries) => {
            state.index_loading = false;
            state.name_index = entries;
            state.rebuild_suggestions();
            DispatchResult::changed()
        }

        Action::NameIndexDidError(error) => {
            state.index_loading = false;
            state.message = Some(format!("Name index error: {error}"));
            DispatchResult::changed()
        }

        Action::TypesDidLoad(types) => {
            state.types_loading = false;
            state.type_list = types;
            if state.gallery_type_index >= state.type_list.len() {
                state.gallery_type_index = 0;
            }
            if state.view == View::Gallery && state.gallery.is_none() && !state.gallery_loading {
                if let Some(effect) = begin_gallery(state) {
                    return DispatchResult::changed_with(effect);
                }
            }
            DispatchResult::changed()
        }

        Action::TypesDidError(error) => {
            state.types_loading = false;
            state.message = Some(format!("Type list error: {error}"));
            DispatchResult::changed()
        }

        Action::ViewSearch => {
            if state.view == View::Search {
                return DispatchResult::unchanged();
            }
            state.view = View::Search;
            DispatchResult::changed()
        }

        Action::ViewGallery => {
            if state.view == View::Gallery {
                return DispatchResult::unchanged();
            }
            state.view = View::Gallery;
            if state.gallery.is_none() && !state.gallery_loading {
                if let Some(effect) = begin_gallery(state) {
                    return DispatchResult::changed_with(effect);
                }
            }
            DispatchResult::changed()
        }

        Action::ViewBack => {
            if state.view != View::Detail {
                return DispatchResult::unchanged();
            }
            state.view = state.detail_return;
            DispatchResult::changed()
        }

        Action::SearchStart => {
            // The search box lives on the search view; follow it there.
            state.view = View::Search;
            state.search.active = true;
            state.rebuild_suggestions();
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.suggestions.clear();
            state.suggestion_selected = None;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.rebuild_suggestions();
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            state.search.query.pop();
            state.rebuild_suggestions();
            DispatchResult::changed()
        }

        Action::SearchSuggestionMove(delta) => {
            if state.suggestions.is_empty() {
                return DispatchResult::unchanged();
            }
            let last = state.suggestions.len() - 1;
            let next = match (state.suggestion_selected, delta.signum()) {
                (None, 1) => Some(0),
                (None, _) => None,
                (Some(0), -1) => None,
                (Some(idx), -1) => Some(idx - 1),
                (Some(idx), 1) => Some((idx + 1).min(last)),
                (current, _) => current,
            };
            if next == state.suggestion_selected {
                return DispatchResult::unchanged();
            }
            state.suggestion_selected = next;
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            if let Some(index) = state.suggestion_selected {
                if let Some(name) = state.suggestions.get(index).cloned() {
                    state.search.query = name;
                }
            }
            state.search.active = false;
            state.suggestions.clear();
            state.suggestion_selected = None;
            if state.search.query.trim().is_empty() {
                // Clearing, not an error.
                state.outcome = SearchOutcome::Idle;
                state.search_selected = 0;
                state.search_loading = false;
                state.message = None;
                return DispatchResult::changed();
            }
            DispatchResult::changed_with(begin_search(state))
        }

        Action::SearchDidMatch { seq, record } => {
            if seq != state.search_seq {
                return DispatchResult::unchanged();
            }
            state.search_loading = false;
            state.outcome = SearchOutcome::Single(record);
            state.search_selected = 0;
            DispatchResult::changed()
        }

        Action::SearchDidMatchMany { seq, mut records } => {
            if seq != state.search_seq {
                return DispatchResult::unchanged();
            }
            state.search_loading = false;
            search::sort_records(&mut records, state.sort_key, state.sort_dir);
            state.outcome = SearchOutcome::Many(records);
            state.search_selected = 0;
            DispatchResult::changed()
        }

        Action::SearchDidMiss { seq } => {
            if seq != state.search_seq {
                return DispatchResult::unchanged();
            }
            state.search_loading = false;
            state.outcome = SearchOutcome::NotFound;
            state.search_selected = 0;
            DispatchResult::changed()
        }

        Action::SearchDidError { seq, error } => {
            if seq != state.search_seq {
                return DispatchResult::unchanged();
            }
            state.search_loading = false;
            state.outcome = SearchOutcome::Failed(error);
            state.search_selected = 0;
            DispatchResult::changed()
        }

        Action::SearchSelectionMove(delta) => {
            let mut index = state.search_selected as i16 + delta;
            if index < 0 {
                index = 0;
            }
            if !state.set_search_selected(index as usize) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SearchSelect(index) => {
            if !state.set_search_selected(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SortKeyCycle => {
            state.sort_key = state.sort_key.next();
            resort_results(state);
            DispatchResult::changed()
        }

        Action::SortDirToggle => {
            state.sort_dir = state.sort_dir.toggle();
            resort_results(state);
            DispatchResult::changed()
        }

        Action::TypeNext => cycle_type(state, 1),
        Action::TypePrev => cycle_type(state, -1),

        Action::GalleryDidLoad { seq, group } => {
            if seq != state.gallery_seq {
                return DispatchResult::unchanged();
            }
            state.gallery_loading = false;
            state.gallery = Some(group);
            state.gallery_selected = 0;
            let effects = gallery_sprite_follow_up(state);
            if effects.is_empty() {
                DispatchResult::changed()
            } else {
                DispatchResult::changed_with_many(effects)
            }
        }

        Action::GalleryDidError { seq, name, error } => {
            if seq != state.gallery_seq {
                return DispatchResult::unchanged();
            }
            state.gallery_loading = false;
            state.message = Some(format!("Type {name} error: {error}"));
            DispatchResult::changed()
        }

        Action::GallerySelectionMove(delta) => {
            let mut index = state.gallery_selected as i16 + delta;
            if index < 0 {
                index = 0;
            }
            if !state.set_gallery_selected(index as usize) {
                return DispatchResult::unchanged();
            }
            let effects = gallery_sprite_follow_up(state);
            DispatchResult::changed_with_many(effects)
        }

        Action::GallerySelect(index) => {
            if !state.set_gallery_selected(index) {
                return DispatchResult::unchanged();
            }
            let effects = gallery_sprite_follow_up(state);
            DispatchResult::changed_with_many(effects)
        }

        Action::DetailOpen(key) => {
            if state.view != View::Detail {
                state.detail_return = state.view;
            }
            state.view = View::Detail;
            DispatchResult::changed_with(open_detail(state, key))
        }

        Action::DetailDidLoad { seq, record } => {
            if seq != state.detail_seq {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            let name = record.name.clone();
            state.detail = Some(record);
            let effects = sprite_follow_up(state, &name);
            if effects.is_empty() {
                DispatchResult::changed()
            } else {
                DispatchResult::changed_with_many(effects)
            }
        }

        Action::DetailDidMiss { seq, key } => {
            if seq != state.detail_seq {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            state.message = Some(format!("No Pokemon found for {key}."));
            DispatchResult::changed()
        }

        Action::DetailDidError { seq, error } => {
            if seq != state.detail_seq {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            state.message = Some(format!("Detail error: {error}"));
            DispatchResult::changed()
        }

        Action::DetailNext => step_detail(state, 1),
        Action::DetailPrev => step_detail(state, -1),

        Action::SpriteDidLoad { name, sprite } => {
            state.sprite_cache.insert(name, sprite);
            state.sprite_loading = false;
            DispatchResult::changed()
        }

        Action::SpriteDidError { name, url, error } => {
            state.sprite_loading = false;
            // One recomputed substitution per record, then give up quietly
            // into the message line.
            if !state.sprite_retry.contains(&name) {
                state.sprite_retry.insert(name.clone());
                if let Some(record) = state.record_by_name(&name) {
                    let fallback = sprite::fallback_url(record);
                    if fallback != url {
                        state.sprite_loading = true;
                        return DispatchResult::changed_with(Effect::LoadSprite {
                            name,
                            url: fallback,
                        });
                    }
                }
            }
            state.message = Some(format!("Sprite error for {name}: {error}"));
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.any_loading() {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Tag and launch one search resolution; older in-flight resolutions are
/// discarded on arrival by the sequence check.
fn begin_search(state: &mut AppState) -> Effect {
    state.search_seq += 1;
    state.search_loading = true;
    state.message = None;
    Effect::ResolveSearch {
        seq: state.search_seq,
        query: state.search.query.trim().to_string(),
        index: state.name_index.clone(),
    }
}

fn begin_gallery(state: &mut AppState) -> Option<Effect> {
    let name = state.current_type()?.to_string();
    state.gallery_seq += 1;
    state.gallery = None;
    state.gallery_selected = 0;
    state.gallery_loading = true;
    state.message = None;
    Some(Effect::LoadCategory {
        seq: state.gallery_seq,
        name,
    })
}

fn cycle_type(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    if state.type_list.is_empty() {
        return DispatchResult::unchanged();
    }
    let len = state.type_list.len() as i16;
    let mut next = state.gallery_type_index as i16 + step;
    if next < 0 {
        next = len - 1;
    } else if next >= len {
        next = 0;
    }
    if next as usize == state.gallery_type_index && state.gallery.is_some() {
        return DispatchResult::unchanged();
    }
    state.gallery_type_index = next as usize;
    match begin_gallery(state) {
        Some(effect) => DispatchResult::changed_with(effect),
        None => DispatchResult::changed(),
    }
}

fn open_detail(state: &mut AppState, key: String) -> Effect {
    state.detail_seq += 1;
    state.detail = None;
    state.detail_loading = true;
    state.message = None;
    Effect::LoadDetail {
        seq: state.detail_seq,
        key,
    }
}

fn step_detail(state: &mut AppState, delta: i64) -> DispatchResult<Effect> {
    if !state.nav_ready() {
        return DispatchResult::unchanged();
    }
    let Some(target) = state.nav_target(delta) else {
        return DispatchResult::unchanged();
    };
    DispatchResult::changed_with(open_detail(state, target))
}

fn sprite_follow_up(state: &mut AppState, name: &str) -> Vec<Effect> {
    if state.sprite_cache.contains_key(name) {
        return Vec::new();
    }
    let Some(record) = state.record_by_name(name) else {
        return Vec::new();
    };
    let url = sprite::display_url(record);
    state.sprite_loading = true;
    vec![Effect::LoadSprite {
        name: name.to_string(),
        url,
    }]
}

fn gallery_sprite_follow_up(state: &mut AppState) -> Vec<Effect> {
    let Some(name) = state
        .selected_gallery_record()
        .map(|record| record.name.clone())
    else {
        return Vec::new();
    };
    sprite_follow_up(state, &name)
}

fn resort_results(state: &mut AppState) {
    let key = state.sort_key;
    let dir = state.sort_dir;
    if let SearchOutcome::Many(records) = &mut state.outcome {
        search::sort_records(records, key, dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{NameIndexEntry, PokemonRecord, PokemonStat, SortKey, SpriteRefs};
    use pretty_assertions::assert_eq;

    fn entry(name: &str) -> NameIndexEntry {
        NameIndexEntry {
            name: name.to_string(),
            url: format!("https://pokeapi.co/api/v2/pokemon/{name}/"),
        }
    }

    fn record(id: u16, name: &str, hp: u16) -> PokemonRecord {
        PokemonRecord {
            id,
            name: name.to_string(),
            height: 7,
            weight: 69,
            types: vec!["fire".to_string()],
            stats: vec![PokemonStat {
                name: "hp".to_string(),
                value: hp,
            }],
            sprites: SpriteRefs::default(),
        }
    }

    #[test]
    fn empty_query_clears_results_without_error() {
        let mut state = AppState {
            outcome: SearchOutcome::NotFound,
            ..AppState::default()
        };
        state.search.query = "   ".to_string();

        let result = reducer(&mut state, Action::SearchSubmit);

        assert!(result.changed);
        assert!(result.effects.is_empty());
        assert_eq!(state.outcome, SearchOutcome::Idle);
        assert!(state.message.is_none());
    }

    #[test]
    fn submit_tags_resolution_with_fresh_sequence() {
        let mut state = AppState::default();
        state.search.query = "char".to_string();

        let result = reducer(&mut state, Action::SearchSubmit);

        assert!(state.search_loading);
        assert_eq!(result.effects.len(), 1);
        assert!(matches!(
            &result.effects[0],
            Effect::ResolveSearch { seq: 1, query, .. } if query == "char"
        ));
    }

    #[test]
    fn stale_resolution_is_discarded() {
        let mut state = AppState::default();
        state.search.query = "char".to_string();
        reducer(&mut state, Action::SearchSubmit);
        state.search.query = "pika".to_string();
        reducer(&mut state, Action::SearchSubmit);
        assert_eq!(state.search_seq, 2);

        // The slow first resolution lands after the second was issued.
        let result = reducer(
            &mut state,
            Action::SearchDidMatch {
                seq: 1,
                record: record(6, "charizard", 78),
            },
        );

        assert!(!result.changed);
        assert_eq!(state.outcome, SearchOutcome::Idle);
        assert!(state.search_loading);
    }

    #[test]
    fn multi_match_applies_default_name_sort() {
        let mut state = AppState::default();
        state.search.query = "char".to_string();
        reducer(&mut state, Action::SearchSubmit);

        reducer(
            &mut state,
            Action::SearchDidMatchMany {
                seq: 1,
                records: vec![
                    record(5, "charmeleon", 58),
                    record(6, "charizard", 78),
                    record(4, "charmander", 39),
                ],
            },
        );

        let names: Vec<_> = state
            .search_records()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["charizard", "charmander", "charmeleon"]);
    }

    #[test]
    fn sort_changes_reorder_in_place_without_refetching() {
        let mut state = AppState::default();
        state.search.query = "char".to_string();
        reducer(&mut state, Action::SearchSubmit);
        reducer(
            &mut state,
            Action::SearchDidMatchMany {
                seq: 1,
                records: vec![
                    record(4, "charmander", 39),
                    record(6, "charizard", 78),
                    record(5, "charmeleon", 58),
                ],
            },
        );

        let result = reducer(&mut state, Action::SortKeyCycle);
        assert!(result.effects.is_empty());
        assert_eq!(state.sort_key, SortKey::Hp);
        let names: Vec<_> = state
            .search_records()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["charmander", "charmeleon", "charizard"]);

        let result = reducer(&mut state, Action::SortDirToggle);
        assert!(result.effects.is_empty());
        let names: Vec<_> = state
            .search_records()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["charizard", "charmeleon", "charmander"]);
    }

    #[test]
    fn zero_matches_are_not_found_not_failed() {
        let mut state = AppState::default();
        state.search.query = "zzz".to_string();
        reducer(&mut state, Action::SearchSubmit);

        reducer(&mut state, Action::SearchDidMiss { seq: 1 });

        assert_eq!(state.outcome, SearchOutcome::NotFound);
        assert!(state.message.is_none());
    }

    #[test]
    fn detail_navigation_wraps_circularly() {
        let mut state = AppState::default();
        state.name_index = vec![entry("bulbasaur"), entry("ivysaur"), entry("venusaur")];
        state.detail = Some(record(3, "venusaur", 80));

        let result = reducer(&mut state, Action::DetailNext);
        assert_eq!(result.effects.len(), 1);
        assert!(matches!(
            &result.effects[0],
            Effect::LoadDetail { key, .. } if key == "bulbasaur"
        ));

        state.detail = Some(record(1, "bulbasaur", 45));
        let result = reducer(&mut state, Action::DetailPrev);
        assert!(matches!(
            &result.effects[0],
            Effect::LoadDetail { key, .. } if key == "venusaur"
        ));
    }

    #[test]
    fn single_entry_index_wraps_to_itself() {
        let mut state = AppState::default();
        state.name_index = vec![entry("mew")];
        state.detail = Some(record(151, "mew", 100));

        let result = reducer(&mut state, Action::DetailNext);
        assert!(matches!(
            &result.effects[0],
            Effect::LoadDetail { key, .. } if key == "mew"
        ));
    }

    #[test]
    fn navigation_disabled_until_index_and_record_load() {
        let mut state = AppState::default();
        state.detail = Some(record(25, "pikachu", 35));
        assert!(!reducer(&mut state, Action::DetailNext).changed);

        state.detail = None;
        state.name_index = vec![entry("pikachu")];
        assert!(!reducer(&mut state, Action::DetailNext).changed);
    }

    #[test]
    fn sprite_failure_substitutes_fallback_once() {
        let mut state = AppState::default();
        let mut pikachu = record(25, "pikachu", 35);
        pikachu.sprites.front_default = Some("https://example.test/broken.png".to_string());
        state.detail = Some(pikachu);

        let result = reducer(
            &mut state,
            Action::SpriteDidError {
                name: "pikachu".to_string(),
                url: "https://example.test/broken.png".to_string(),
                error: "decode failed".to_string(),
            },
        );
        assert_eq!(result.effects.len(), 1);
        let Effect::LoadSprite { url, .. } = &result.effects[0] else {
            panic!("expected a sprite reload");
        };
        assert!(url.ends_with("/25.png"));

        // Second failure for the same record gives up.
        let result = reducer(
            &mut state,
            Action::SpriteDidError {
                name: "pikachu".to_string(),
                url: url.clone(),
                error: "404".to_string(),
            },
        );
        assert!(result.effects.is_empty());
        assert!(state.message.is_some());
    }

    #[test]
    fn selecting_a_new_type_discards_the_previous_group() {
        let mut state = AppState::default();
        state.type_list = vec!["fire".to_string(), "water".to_string()];
        state.gallery = Some(crate::state::CategoryGroup {
            name: "fire".to_string(),
            members: vec![record(6, "charizard", 78)],
        });

        let result = reducer(&mut state, Action::TypeNext);

        assert!(state.gallery.is_none());
        assert!(state.gallery_loading);
        assert!(matches!(
            &result.effects[0],
            Effect::LoadCategory { seq: 1, name } if name == "water"
        ));
    }

    #[test]
    fn stale_gallery_load_is_discarded() {
        let mut state = AppState::default();
        state.type_list = vec!["fire".to_string(), "water".to_string()];
        reducer(&mut state, Action::TypeNext);
        reducer(&mut state, Action::TypePrev);
        assert_eq!(state.gallery_seq, 2);

        let result = reducer(
            &mut state,
            Action::GalleryDidLoad {
                seq: 1,
                group: crate::state::CategoryGroup {
                    name: "water".to_string(),
                    members: Vec::new(),
                },
            },
        );

        assert!(!result.changed);
        assert!(state.gallery.is_none());
    }

    #[test]
    fn suggestion_selection_submits_the_suggested_name() {
        let mut state = AppState::default();
        state.name_index = vec![entry("pikachu"), entry("pichu")];
        state.search.active = true;
        state.search.query = "pi".to_string();
        state.rebuild_suggestions();
        assert_eq!(state.suggestions.len(), 2);

        reducer(&mut state, Action::SearchSuggestionMove(1));
        reducer(&mut state, Action::SearchSuggestionMove(1));
        let result = reducer(&mut state, Action::SearchSubmit);

        assert_eq!(state.search.query, "pichu");
        assert!(matches!(
            &result.effects[0],
            Effect::ResolveSearch { query, .. } if query == "pichu"
        ));
    }
}
