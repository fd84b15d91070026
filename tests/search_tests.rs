//! Store-level tests for the search, gallery and detail flows, driven through
//! the reducer with EffectStore.

use pokesearch::{
    action::Action,
    effect::Effect,
    reducer::reducer,
    state::{
        AppState, CategoryGroup, NameIndexEntry, PokemonRecord, PokemonStat, SearchOutcome,
        SpriteRefs,
    },
};
use pretty_assertions::assert_eq;
use tui_dispatch::testing::*;
use tui_dispatch::{assert_emitted, assert_not_emitted, EffectStore};

fn entry(name: &str) -> NameIndexEntry {
    NameIndexEntry {
        name: name.to_string(),
        url: format!("https://pokeapi.co/api/v2/pokemon/{name}/"),
    }
}

fn record(id: u16, name: &str) -> PokemonRecord {
    PokemonRecord {
        id,
        name: name.to_string(),
        height: 4,
        weight: 60,
        types: vec!["electric".to_string()],
        stats: vec![PokemonStat {
            name: "hp".to_string(),
            value: 35,
        }],
        sprites: SpriteRefs::default(),
    }
}

macro_rules! type_query {
    ($store:expr, $text:expr) => {
        $store.dispatch(Action::SearchStart);
        for ch in $text.chars() {
            $store.dispatch(Action::SearchInput(ch));
        }
    };
}

#[test]
fn test_exact_match_yields_single_result() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    type_query!(store, "pikachu");

    let result = store.dispatch(Action::SearchSubmit);
    assert!(store.state().search_loading);
    assert!(matches!(
        &result.effects[0],
        Effect::ResolveSearch { seq: 1, query, .. } if query == "pikachu"
    ));

    store.dispatch(Action::SearchDidMatch {
        seq: 1,
        record: record(25, "pikachu"),
    });

    assert!(!store.state().search_loading);
    match &store.state().outcome {
        SearchOutcome::Single(found) => assert_eq!(found.id, 25),
        other => panic!("expected a single result, got {other:?}"),
    }
    assert_eq!(store.state().search_records().len(), 1);
}

#[test]
fn test_multi_match_list_keeps_at_most_ten() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    type_query!(store, "char");
    store.dispatch(Action::SearchSubmit);

    // The resolver fans out over at most ten candidates; the reducer takes
    // whatever arrived and sorts it.
    let records: Vec<_> = (0..10).map(|i| record(i, &format!("char-{i:02}"))).collect();
    store.dispatch(Action::SearchDidMatchMany { seq: 1, records });

    assert_eq!(store.state().search_records().len(), 10);
}

#[test]
fn test_not_found_is_neutral_and_distinct_from_failure() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    type_query!(store, "xyzzy");
    store.dispatch(Action::SearchSubmit);
    store.dispatch(Action::SearchDidMiss { seq: 1 });

    assert_eq!(store.state().outcome, SearchOutcome::NotFound);
    assert!(store.state().message.is_none());
    assert!(store.state().search_records().is_empty());

    type_query!(store, "!");
    store.dispatch(Action::SearchSubmit);
    store.dispatch(Action::SearchDidError {
        seq: 2,
        error: "request failed".to_string(),
    });
    assert!(matches!(
        store.state().outcome,
        SearchOutcome::Failed(ref msg) if msg == "request failed"
    ));
}

#[test]
fn test_gallery_group_is_not_capped() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::TypesDidLoad(vec![
        "fire".to_string(),
        "water".to_string(),
    ]));
    let result = store.dispatch(Action::TypeNext);
    assert!(matches!(
        &result.effects[0],
        Effect::LoadCategory { seq: 1, name } if name == "water"
    ));

    let members: Vec<_> = (0..150)
        .map(|i| record(i, &format!("water-mon-{i:03}")))
        .collect();
    store.dispatch(Action::GalleryDidLoad {
        seq: 1,
        group: CategoryGroup {
            name: "water".to_string(),
            members,
        },
    });

    assert_eq!(store.state().gallery_members().len(), 150);
}

#[test]
fn test_next_from_last_of_large_index_wraps_to_first() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    let index: Vec<_> = (1..=1302).map(|i| entry(&format!("mon-{i:04}"))).collect();
    store.dispatch(Action::NameIndexDidLoad(index));

    store.dispatch(Action::DetailOpen("mon-1302".to_string()));
    store.dispatch(Action::DetailDidLoad {
        seq: 1,
        record: record(1302, "mon-1302"),
    });
    assert_eq!(store.state().ordinal(), Some((1302, 1302)));

    let result = store.dispatch(Action::DetailNext);
    assert_emitted!(result.effects, Effect::LoadDetail { .. });
    assert!(matches!(
        &result.effects[0],
        Effect::LoadDetail { key, .. } if key == "mon-0001"
    ));
}

#[test]
fn test_ordinal_suppressed_for_record_outside_index() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::NameIndexDidLoad(vec![
        entry("bulbasaur"),
        entry("ivysaur"),
    ]));
    store.dispatch(Action::DetailOpen("missingno".to_string()));
    store.dispatch(Action::DetailDidLoad {
        seq: 1,
        record: record(0, "missingno"),
    });

    assert_eq!(store.state().ordinal(), None);
    // Navigation stays available regardless.
    assert!(store.state().nav_ready());
    let result = store.dispatch(Action::DetailNext);
    assert_emitted!(result.effects, Effect::LoadDetail { .. });
}

#[test]
fn test_detail_open_records_return_view() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::TypesDidLoad(vec!["fire".to_string()]));
    store.dispatch(Action::ViewGallery);
    store.dispatch(Action::DetailOpen("charizard".to_string()));
    assert_eq!(store.state().view, pokesearch::state::View::Detail);

    store.dispatch(Action::ViewBack);
    assert_eq!(store.state().view, pokesearch::state::View::Gallery);
}

#[test]
fn test_action_categories() {
    // Categories are inferred from the naming convention.
    let did_miss = Action::SearchDidMiss { seq: 1 };
    let resize = Action::UiTerminalResize(80, 24);
    let tick = Action::Tick;

    assert_eq!(did_miss.category(), Some("search_did"));
    assert_eq!(resize.category(), Some("ui"));
    assert_eq!(tick.category(), None);

    assert!(did_miss.is_search_did());
    assert!(resize.is_ui());
}

#[test]
fn test_harness_emit_and_drain() {
    let mut harness = TestHarness::<(), Action>::new(());

    harness.emit(Action::SearchStart);
    harness.emit(Action::SearchSubmit);
    harness.emit(Action::SearchDidMiss { seq: 1 });

    let actions = harness.drain_emitted();
    actions.assert_count(3);
}

#[test]
fn test_assert_emitted_macro() {
    let actions = vec![
        Action::SearchStart,
        Action::SearchDidMatch {
            seq: 1,
            record: record(25, "pikachu"),
        },
    ];

    assert_emitted!(actions, Action::SearchStart);
    assert_emitted!(actions, Action::SearchDidMatch { .. });
    assert_not_emitted!(actions, Action::Quit);
    assert_not_emitted!(actions, Action::SearchDidError { .. });
}
