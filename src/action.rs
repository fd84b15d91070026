use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::{CategoryGroup, NameIndexEntry, PokemonRecord};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    NameIndexDidLoad(Vec<NameIndexEntry>),
    NameIndexDidError(String),

    TypesDidLoad(Vec<String>),
    TypesDidError(String),

    ViewSearch,
    ViewGallery,
    ViewBack,

    SearchStart,
    SearchCancel,
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,
    SearchSuggestionMove(i16),
    SearchDidMatch { seq: u64, record: PokemonRecord },
    SearchDidMatchMany { seq: u64, records: Vec<PokemonRecord> },
    SearchDidMiss { seq: u64 },
    SearchDidError { seq: u64, error: String },
    SearchSelectionMove(i16),
    SearchSelect(usize),

    SortKeyCycle,
    SortDirToggle,

    TypeNext,
    TypePrev,
    GalleryDidLoad { seq: u64, group: CategoryGroup },
    GalleryDidError { seq: u64, name: String, error: String },
    GallerySelectionMove(i16),
    GallerySelect(usize),

    DetailOpen(String),
    DetailDidLoad { seq: u64, record: PokemonRecord },
    DetailDidMiss { seq: u64, key: String },
    DetailDidError { seq: u64, error: String },
    DetailNext,
    DetailPrev,

    SpriteDidLoad { name: String, sprite: SpriteData },
    SpriteDidError { name: String, url: String, error: String },

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
