use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::search;
use crate::sprite::SpriteData;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// One row of the catalog's complete name enumeration. Names are
/// lowercase-normalized at load time; the index is loaded once per session
/// and shared by search and detail navigation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameIndexEntry {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub name: String,
    pub value: u16,
}

/// Optional image references as the catalog reports them. Any subset may be
/// absent; the sprite fallback chain absorbs the gaps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteRefs {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    pub home: Option<String>,
    pub official_artwork: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub id: u16,
    pub name: String,
    /// Tenths of a meter, as reported by the catalog.
    pub height: u16,
    /// Tenths of a kilogram.
    pub weight: u16,
    pub types: Vec<String>,
    pub stats: Vec<PokemonStat>,
    pub sprites: SpriteRefs,
}

impl PokemonRecord {
    /// Base stat by catalog name; absent stats read as 0.
    pub fn stat(&self, name: &str) -> u16 {
        self.stats
            .iter()
            .find(|stat| stat.name == name)
            .map(|stat| stat.value)
            .unwrap_or(0)
    }
}

/// Every member of one elemental type. Replaced wholesale when the selection
/// changes; never merged across types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    pub members: Vec<PokemonRecord>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Name,
    Hp,
    Attack,
    Speed,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::Hp,
            SortKey::Hp => SortKey::Attack,
            SortKey::Attack => SortKey::Speed,
            SortKey::Speed => SortKey::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Hp => "hp",
            SortKey::Attack => "attack",
            SortKey::Speed => "speed",
        }
    }

    /// Catalog stat name for numeric keys.
    pub fn stat_name(self) -> Option<&'static str> {
        match self {
            SortKey::Name => None,
            SortKey::Hp => Some("hp"),
            SortKey::Attack => Some("attack"),
            SortKey::Speed => Some("speed"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    Ascending,
    Descending,
}

impl SortDir {
    pub fn toggle(self) -> Self {
        match self {
            SortDir::Ascending => SortDir::Descending,
            SortDir::Descending => SortDir::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDir::Ascending => "^",
            SortDir::Descending => "v",
        }
    }
}

/// Outcome of one search resolution. NotFound is a legitimate empty state,
/// distinct from a transport failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SearchOutcome {
    #[default]
    Idle,
    Single(PokemonRecord),
    Many(Vec<PokemonRecord>),
    NotFound,
    Failed(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum View {
    #[default]
    Search,
    Gallery,
    Detail,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub view: View,
    /// View to return to when the detail sheet closes.
    pub detail_return: View,

    pub name_index: Vec<NameIndexEntry>,
    pub index_loading: bool,

    pub search: SearchState,
    pub suggestions: Vec<String>,
    pub suggestion_selected: Option<usize>,
    pub search_seq: u64,
    pub search_loading: bool,
    pub outcome: SearchOutcome,
    pub search_selected: usize,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,

    pub type_list: Vec<String>,
    pub types_loading: bool,
    pub gallery_type_index: usize,
    pub gallery_seq: u64,
    pub gallery_loading: bool,
    pub gallery: Option<CategoryGroup>,
    pub gallery_selected: usize,

    pub detail_seq: u64,
    pub detail_loading: bool,
    pub detail: Option<PokemonRecord>,

    pub sprite_cache: HashMap<String, SpriteData>,
    pub sprite_retry: HashSet<String>,
    pub sprite_loading: bool,

    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terminal_size: (80, 24),
            view: View::Search,
            detail_return: View::Search,
            name_index: Vec::new(),
            index_loading: false,
            search: SearchState::default(),
            suggestions: Vec::new(),
            suggestion_selected: None,
            search_seq: 0,
            search_loading: false,
            outcome: SearchOutcome::Idle,
            search_selected: 0,
            sort_key: SortKey::default(),
            sort_dir: SortDir::default(),
            type_list: Vec::new(),
            types_loading: false,
            gallery_type_index: 0,
            gallery_seq: 0,
            gallery_loading: false,
            gallery: None,
            gallery_selected: 0,
            detail_seq: 0,
            detail_loading: false,
            detail: None,
            sprite_cache: HashMap::new(),
            sprite_retry: HashSet::new(),
            sprite_loading: false,
            message: None,
            tick: 0,
        }
    }
}

impl AppState {
    /// Records the search view currently lists, whether the outcome was a
    /// single hit or a multi-match list.
    pub fn search_records(&self) -> &[PokemonRecord] {
        match &self.outcome {
            SearchOutcome::Single(record) => std::slice::from_ref(record),
            SearchOutcome::Many(records) => records,
            _ => &[],
        }
    }

    pub fn selected_search_record(&self) -> Option<&PokemonRecord> {
        self.search_records().get(self.search_selected)
    }

    pub fn set_search_selected(&mut self, index: usize) -> bool {
        let len = self.search_records().len();
        if len == 0 {
            self.search_selected = 0;
            return false;
        }
        let bounded = index.min(len - 1);
        if bounded != self.search_selected {
            self.search_selected = bounded;
            return true;
        }
        false
    }

    pub fn current_type(&self) -> Option<&str> {
        self.type_list
            .get(self.gallery_type_index)
            .map(String::as_str)
    }

    pub fn gallery_members(&self) -> &[PokemonRecord] {
        self.gallery
            .as_ref()
            .map(|group| group.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_gallery_record(&self) -> Option<&PokemonRecord> {
        self.gallery_members().get(self.gallery_selected)
    }

    pub fn set_gallery_selected(&mut self, index: usize) -> bool {
        let len = self.gallery_members().len();
        if len == 0 {
            self.gallery_selected = 0;
            return false;
        }
        let bounded = index.min(len - 1);
        if bounded != self.gallery_selected {
            self.gallery_selected = bounded;
            return true;
        }
        false
    }

    /// 1-based rank of the current detail record within the name index, with
    /// the index total. None while either side is missing; the detail view
    /// then suppresses the "N of TOTAL" readout but keeps navigation.
    pub fn ordinal(&self) -> Option<(usize, usize)> {
        let detail = self.detail.as_ref()?;
        if self.name_index.is_empty() {
            return None;
        }
        let position = self
            .name_index
            .iter()
            .position(|entry| entry.name == detail.name)?;
        Some((position + 1, self.name_index.len()))
    }

    /// Name of the circular previous/next neighbor in the name index. A
    /// record absent from the index steps relative to slot -1, so stepping
    /// still lands inside the index.
    pub fn nav_target(&self, delta: i64) -> Option<String> {
        let detail = self.detail.as_ref()?;
        let len = self.name_index.len() as i64;
        if len == 0 {
            return None;
        }
        let position = self
            .name_index
            .iter()
            .position(|entry| entry.name == detail.name)
            .map(|idx| idx as i64)
            .unwrap_or(-1);
        let target = (position + delta).rem_euclid(len) as usize;
        self.name_index.get(target).map(|entry| entry.name.clone())
    }

    /// Navigation unlocks only once both the record and the index are in.
    pub fn nav_ready(&self) -> bool {
        self.detail.is_some() && !self.name_index.is_empty()
    }

    /// Locate a loaded record by name across whatever the views hold.
    pub fn record_by_name(&self, name: &str) -> Option<&PokemonRecord> {
        if let Some(record) = self.detail.as_ref().filter(|record| record.name == name) {
            return Some(record);
        }
        if let Some(record) = self
            .search_records()
            .iter()
            .find(|record| record.name == name)
        {
            return Some(record);
        }
        self.gallery_members()
            .iter()
            .find(|record| record.name == name)
    }

    pub fn rebuild_suggestions(&mut self) {
        self.suggestion_selected = None;
        let query = self.search.query.trim().to_lowercase();
        if !self.search.active || query.is_empty() {
            self.suggestions.clear();
            return;
        }
        self.suggestions = search::matching_entries(&self.name_index, &query)
            .into_iter()
            .take(search::SUGGESTION_LIMIT)
            .map(|entry| entry.name.clone())
            .collect();
    }

    pub fn any_loading(&self) -> bool {
        self.index_loading
            || self.search_loading
            || self.types_loading
            || self.gallery_loading
            || self.detail_loading
            || self.sprite_loading
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let outcome = match &self.outcome {
            SearchOutcome::Idle => "idle".to_string(),
            SearchOutcome::Single(record) => format!("single:{}", record.name),
            SearchOutcome::Many(records) => format!("many:{}", records.len()),
            SearchOutcome::NotFound => "not-found".to_string(),
            SearchOutcome::Failed(error) => format!("failed:{error}"),
        };
        vec![
            DebugSection::new("View")
                .entry("view", ron_string(&self.view))
                .entry("return", ron_string(&self.detail_return))
                .entry("index_len", ron_string(&self.name_index.len())),
            DebugSection::new("Search")
                .entry("query", ron_string(&self.search.query))
                .entry("active", ron_string(&self.search.active))
                .entry("outcome", ron_string(&outcome))
                .entry("seq", ron_string(&self.search_seq))
                .entry("selected", ron_string(&self.search_selected))
                .entry("sort", ron_string(&self.sort_key.label()))
                .entry("dir", ron_string(&self.sort_dir.arrow())),
            DebugSection::new("Gallery")
                .entry("type", ron_string(&self.current_type()))
                .entry("members", ron_string(&self.gallery_members().len()))
                .entry("selected", ron_string(&self.gallery_selected))
                .entry("seq", ron_string(&self.gallery_seq)),
            DebugSection::new("Detail")
                .entry(
                    "name",
                    ron_string(&self.detail.as_ref().map(|record| record.name.clone())),
                )
                .entry("ordinal", ron_string(&self.ordinal()))
                .entry("seq", ron_string(&self.detail_seq)),
            DebugSection::new("Status")
                .entry("index_loading", ron_string(&self.index_loading))
                .entry("search_loading", ron_string(&self.search_loading))
                .entry("gallery_loading", ron_string(&self.gallery_loading))
                .entry("detail_loading", ron_string(&self.detail_loading))
                .entry("sprite_loading", ron_string(&self.sprite_loading))
                .entry("message", ron_string(&self.message)),
        ]
    }
}
