use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::sprite;
use crate::sprite_backend;
use crate::state::{AppState, PokemonRecord, PokemonStat, SearchOutcome, View};

const BG_BASE: Color = Color::Rgb(16, 14, 22);
const BG_PANEL: Color = Color::Rgb(30, 26, 38);
const BG_PANEL_ALT: Color = Color::Rgb(40, 34, 50);
const BG_HIGHLIGHT: Color = Color::Rgb(96, 44, 52);
const TEXT_MAIN: Color = Color::Rgb(238, 234, 244);
const TEXT_DIM: Color = Color::Rgb(164, 156, 180);
const ACCENT_RED: Color = Color::Rgb(222, 82, 74);
const ACCENT_YELLOW: Color = Color::Rgb(244, 204, 92);
const CELL_ASPECT: f32 = 2.0;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

const DETAIL_SPRITE_SLOT: &str = "detail";
const GALLERY_SPRITE_SLOT: &str = "gallery";

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AppComponentId {
    SearchView,
    GalleryView,
    DetailView,
    SearchInput,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppContext {
    Search,
    Gallery,
    Detail,
    Input,
}

impl EventRoutingState<AppComponentId, AppContext> for AppState {
    fn focused(&self) -> Option<AppComponentId> {
        if self.search.active {
            return Some(AppComponentId::SearchInput);
        }
        match self.view {
            View::Search => Some(AppComponentId::SearchView),
            View::Gallery => Some(AppComponentId::GalleryView),
            View::Detail => Some(AppComponentId::DetailView),
        }
    }

    fn modal(&self) -> Option<AppComponentId> {
        if self.search.active {
            Some(AppComponentId::SearchInput)
        } else {
            None
        }
    }

    fn binding_context(&self, id: AppComponentId) -> AppContext {
        match id {
            AppComponentId::SearchView => AppContext::Search,
            AppComponentId::GalleryView => AppContext::Gallery,
            AppComponentId::DetailView => AppContext::Detail,
            AppComponentId::SearchInput => AppContext::Input,
        }
    }

    fn default_context(&self) -> AppContext {
        AppContext::Search
    }
}

pub struct LookupUi {
    result_list: SelectList,
    gallery_list: SelectList,
    status_bar: StatusBar,
}

impl LookupUi {
    pub fn new() -> Self {
        Self {
            result_list: SelectList::new(),
            gallery_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<AppComponentId>,
    ) {
        render_app(
            frame,
            area,
            state,
            render_ctx,
            event_ctx,
            &mut self.result_list,
            &mut self.gallery_list,
            &mut self.status_bar,
        );
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state, &mut self.result_list)
    }

    pub fn handle_gallery_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_gallery_event(event, state, &mut self.gallery_list)
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_detail_event(event, state)
    }

    pub fn handle_search_input_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_input_event(event, state)
    }
}

impl Default for LookupUi {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::too_many_arguments)]
pub fn render_app(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    _render_ctx: RenderContext,
    event_ctx: &mut EventContext<AppComponentId>,
    result_list: &mut SelectList,
    gallery_list: &mut SelectList,
    status_bar: &mut StatusBar,
) {
    let base = Block::default().style(Style::default().bg(BG_BASE));
    frame.render_widget(base, area);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(frame, layout[0], state);
    match state.view {
        View::Search => render_search_view(frame, layout[1], state, event_ctx, result_list),
        View::Gallery => render_gallery_view(frame, layout[1], state, event_ctx, gallery_list),
        View::Detail => render_detail_view(frame, layout[1], state, event_ctx),
    }
    render_footer(frame, layout[2], state, status_bar);
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title("POKESEARCH");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(10)])
        .split(inner);

    let tabs = Tabs::new(vec!["SEARCH", "GALLERY", "DETAIL"])
        .select(match state.view {
            View::Search => 0,
            View::Gallery => 1,
            View::Detail => 2,
        })
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(
            Style::default()
                .fg(ACCENT_YELLOW)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, layout[0]);

    let query = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let info = Line::from(vec![
        Span::raw("Query: "),
        Span::styled(query, Style::default().fg(ACCENT_YELLOW)),
        Span::raw("  |  Sort: "),
        Span::styled(
            format!("{}{}", state.sort_key.label(), state.sort_dir.arrow()),
            Style::default().fg(ACCENT_RED),
        ),
        Span::raw("  |  Index: "),
        Span::styled(
            if state.index_loading {
                "loading".to_string()
            } else {
                state.name_index.len().to_string()
            },
            Style::default().fg(TEXT_DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(info).alignment(Alignment::Right), layout[1]);
}

// ============================================================================
// Search view
// ============================================================================

fn render_search_view(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<AppComponentId>,
    result_list: &mut SelectList,
) {
    sprite_backend::clear_sprites();
    event_ctx.set_component_area(AppComponentId::SearchView, area);

    let suggestion_rows = if state.search.active && !state.suggestions.is_empty() {
        state.suggestions.len() as u16 + 2
    } else {
        0
    };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(suggestion_rows),
            Constraint::Min(6),
        ])
        .split(area);

    render_search_input(frame, layout[0], state, event_ctx);
    if suggestion_rows > 0 {
        render_suggestions(frame, layout[1], state);
    }
    render_search_results(frame, layout[2], state, result_list);
}

fn render_search_input(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<AppComponentId>,
) {
    if state.search.active {
        event_ctx.set_component_area(AppComponentId::SearchInput, area);
    }
    let border = if state.search.active {
        Style::default().fg(ACCENT_YELLOW).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("NAME")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = if state.search.active {
        Line::from(vec![
            Span::raw(state.search.query.clone()),
            Span::styled("_", Style::default().fg(ACCENT_YELLOW)),
        ])
    } else if state.search.query.is_empty() {
        Line::from(Span::styled(
            "press / and type a name (e.g. pikachu, char)",
            Style::default().fg(TEXT_DIM),
        ))
    } else {
        Line::from(state.search.query.clone())
    };
    frame.render_widget(Paragraph::new(content), inner);
}

fn render_suggestions(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("SUGGESTIONS")
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = state
        .suggestions
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if state.suggestion_selected == Some(idx) {
                Line::from(Span::styled(
                    format!("> {}", format_name(name)),
                    Style::default()
                        .bg(BG_HIGHLIGHT)
                        .fg(TEXT_MAIN)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {}", format_name(name)))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    result_list: &mut SelectList,
) {
    let records = state.search_records();
    if records.is_empty() {
        let content = search_placeholder(state);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("RESULTS")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(Style::default().fg(TEXT_DIM));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(content)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let title = format!(
        "RESULTS ({})  sort:{}{}",
        records.len(),
        state.sort_key.label(),
        state.sort_dir.arrow()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(ACCENT_RED));
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);

    let items = result_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.search_selected.min(items.len().saturating_sub(1)),
        is_focused: state.view == View::Search && !state.search.active,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::SearchSelect,
        render_item: &|item| item.clone(),
    };
    result_list.render(frame, inner, props);

    render_record_card(
        frame,
        layout[1],
        state.selected_search_record(),
        "SELECTED",
    );
}

fn search_placeholder(state: &AppState) -> Text<'static> {
    if state.search_loading {
        return Text::from("Searching...");
    }
    match &state.outcome {
        SearchOutcome::NotFound => Text::from(Span::styled(
            "No Pokemon found matching your search.",
            Style::default().fg(TEXT_DIM),
        )),
        SearchOutcome::Failed(error) => Text::from(Span::styled(
            format!("Search failed: {error}"),
            Style::default().fg(ACCENT_RED),
        )),
        _ => Text::from(vec![
            Line::from(""),
            Line::from("Search for any Pokemon by name to see its details."),
            Line::from(Span::styled(
                "Try partial searches like char, pika or mew.",
                Style::default().fg(TEXT_DIM),
            )),
        ]),
    }
}

fn result_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .search_records()
        .iter()
        .map(|record| {
            Line::from(format!(
                "#{:04} {:<14} {:<16} HP{:>3} ATK{:>3} SPD{:>3}",
                record.id,
                format_name(&record.name),
                record.types.join("/"),
                record.stat("hp"),
                record.stat("attack"),
                record.stat("speed"),
            ))
        })
        .collect()
}

// ============================================================================
// Gallery view
// ============================================================================

fn render_gallery_view(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<AppComponentId>,
    gallery_list: &mut SelectList,
) {
    sprite_backend::clear_slot(DETAIL_SPRITE_SLOT);
    event_ctx.set_component_area(AppComponentId::GalleryView, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)])
        .split(area);

    let type_label = state
        .current_type()
        .map(|name| name.to_ascii_uppercase())
        .unwrap_or_else(|| "--".to_string());
    let count = state.gallery_members().len();
    let type_line = Line::from(vec![
        Span::raw("TYPE  "),
        Span::styled("< ", Style::default().fg(TEXT_DIM)),
        Span::styled(
            type_label,
            Style::default()
                .fg(ACCENT_YELLOW)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" >", Style::default().fg(TEXT_DIM)),
        Span::raw(if count > 0 {
            format!("   {count} members")
        } else {
            String::new()
        }),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);
    frame.render_widget(Paragraph::new(type_line), inner);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("MEMBERS")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(ACCENT_RED));
    let inner = block.inner(body[0]);
    frame.render_widget(block, body[0]);

    let items = gallery_items(state);
    if items.is_empty() {
        let message = if state.gallery_loading {
            "Loading type members..."
        } else if state.types_loading {
            "Loading types..."
        } else {
            "No members."
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(TEXT_DIM)),
            inner,
        );
    } else {
        let props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: state.gallery_selected.min(items.len().saturating_sub(1)),
            is_focused: state.view == View::Gallery,
            style: list_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::GallerySelect,
            render_item: &|item| item.clone(),
        };
        gallery_list.render(frame, inner, props);
    }

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body[1]);
    render_sprite_panel(
        frame,
        side[0],
        state,
        state.selected_gallery_record().map(|record| record.name.as_str()),
        GALLERY_SPRITE_SLOT,
    );
    render_record_card(frame, side[1], state.selected_gallery_record(), "MEMBER");
}

fn gallery_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .gallery_members()
        .iter()
        .map(|record| {
            Line::from(format!(
                "#{:04} {:<16} {}",
                record.id,
                format_name(&record.name),
                record.types.join("/")
            ))
        })
        .collect()
}

// ============================================================================
// Detail view
// ============================================================================

fn render_detail_view(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<AppComponentId>,
) {
    sprite_backend::clear_slot(GALLERY_SPRITE_SLOT);
    event_ctx.set_component_area(AppComponentId::DetailView, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("DETAIL")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(ACCENT_RED));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(record) = state.detail.as_ref() else {
        let message = if state.detail_loading {
            "Loading Pokemon details..."
        } else {
            "No Pokemon data available."
        };
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)])
        .split(inner);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout[0]);

    render_sprite_panel(
        frame,
        columns[0],
        state,
        Some(record.name.as_str()),
        DETAIL_SPRITE_SLOT,
    );
    render_detail_info(frame, columns[1], record);
    render_detail_nav(frame, layout[1], state);
}

fn render_detail_info(frame: &mut Frame, area: Rect, record: &PokemonRecord) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(4)])
        .split(area);

    let types = record
        .types
        .iter()
        .map(|name| format_name(name))
        .collect::<Vec<_>>()
        .join(", ");
    let lines = vec![
        Line::from(Span::styled(
            format!("{}  #{}", format_name(&record.name), record.id),
            Style::default()
                .fg(ACCENT_YELLOW)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Types: {types}")),
        Line::from(format!(
            "Height: {}   Weight: {}",
            format_height(record.height),
            format_weight(record.weight)
        )),
    ];
    frame.render_widget(Paragraph::new(Text::from(lines)), layout[0]);

    let stats_block = Block::default()
        .borders(Borders::ALL)
        .title("BASE STATS")
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let stats_inner = stats_block.inner(layout[1]);
    frame.render_widget(stats_block, layout[1]);
    let stats: Vec<Line> = record.stats.iter().map(|stat| Line::from(render_stat(stat))).collect();
    frame.render_widget(Paragraph::new(Text::from(stats)), stats_inner);
}

fn render_detail_nav(frame: &mut Frame, area: Rect, state: &AppState) {
    let ordinal = state
        .ordinal()
        .map(|(position, total)| format!("{position} of {total}"))
        .unwrap_or_default();
    let enabled = state.nav_ready();
    let arrow_style = if enabled {
        Style::default().fg(ACCENT_YELLOW).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    let nav = Line::from(vec![
        Span::styled("h <- prev", arrow_style),
        Span::raw("   "),
        Span::styled(ordinal, Style::default().fg(TEXT_MAIN)),
        Span::raw("   "),
        Span::styled("next -> l", arrow_style),
    ]);
    frame.render_widget(Paragraph::new(nav).alignment(Alignment::Center), area);
}

// ============================================================================
// Shared panels
// ============================================================================

fn render_sprite_panel(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    name: Option<&str>,
    slot: &'static str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(name) = name {
        if let Some(sprite) = state.sprite_cache.get(name) {
            let (cols, rows) = sprite_fit(sprite, inner.width, inner.height);
            if let Ok(sequence) = sprite::kitty_sequence(sprite, cols, rows) {
                let offset_x = inner.x.saturating_add(inner.width.saturating_sub(cols) / 2);
                let offset_y = inner.y.saturating_add(inner.height.saturating_sub(rows) / 2);
                sprite_backend::place_sprite(slot, offset_x, offset_y, sequence);
            } else {
                sprite_backend::clear_slot(slot);
            }
            return;
        }
    }

    sprite_backend::clear_slot(slot);
    let content = if name.is_none() {
        "[nothing selected]"
    } else if state.sprite_loading {
        "[loading sprite]"
    } else {
        "[no sprite]"
    };
    frame.render_widget(
        Paragraph::new(content)
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_DIM)),
        inner,
    );
}

fn render_record_card(
    frame: &mut Frame,
    area: Rect,
    record: Option<&PokemonRecord>,
    title: &'static str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(record) = record else {
        frame.render_widget(
            Paragraph::new("Nothing selected.").style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    };

    let types = record
        .types
        .iter()
        .map(|name| format_name(name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}  #{}", format_name(&record.name), record.id),
            Style::default()
                .fg(ACCENT_YELLOW)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Types: {types}")),
        Line::from(format!(
            "Height: {}   Weight: {}",
            format_height(record.height),
            format_weight(record.weight)
        )),
        Line::from(""),
    ];
    lines.extend(record.stats.iter().map(|stat| Line::from(render_stat(stat))));
    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.any_loading() {
            let spinner = SPINNER[(state.tick % SPINNER.len() as u64) as usize];
            let what = if state.index_loading {
                "name index"
            } else if state.search_loading {
                "search"
            } else if state.gallery_loading {
                "type members"
            } else if state.detail_loading {
                "details"
            } else if state.sprite_loading {
                "sprite"
            } else {
                "types"
            };
            format!("{spinner} loading {what}...")
        } else {
            String::new()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status, Style::default().fg(ACCENT_YELLOW));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_RED)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_RED)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Search"),
            StatusBarHint::new("Up/Down", "Suggest"),
            StatusBarHint::new("Esc", "Cancel"),
        ];
        return (left, vec![]);
    }

    let left = match state.view {
        View::Search => vec![
            StatusBarHint::new("/", "Type a name"),
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("s/S", "Sort"),
        ],
        View::Gallery => vec![
            StatusBarHint::new("[ ]", "Type"),
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Open"),
        ],
        View::Detail => vec![
            StatusBarHint::new("h/l", "Prev/Next"),
            StatusBarHint::new("Esc", "Back"),
        ],
    };
    let center = vec![
        StatusBarHint::new("1", "Search"),
        StatusBarHint::new("2", "Gallery"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

// ============================================================================
// Event handlers
// ============================================================================

pub fn handle_search_event(
    event: &EventKind,
    state: &AppState,
    result_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Enter => state
                .selected_search_record()
                .map(|record| vec![Action::DetailOpen(record.name.clone())])
                .unwrap_or_default(),
            crossterm::event::KeyCode::Char('s') => vec![Action::SortKeyCycle],
            crossterm::event::KeyCode::Char('S') => vec![Action::SortDirToggle],
            _ => {
                let items = result_items(state);
                if items.is_empty() {
                    return HandlerResponse::ignored();
                }
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.search_selected.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::SearchSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = result_list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SearchSelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_gallery_event(
    event: &EventKind,
    state: &AppState,
    gallery_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Char('[') | crossterm::event::KeyCode::Left => {
                vec![Action::TypePrev]
            }
            crossterm::event::KeyCode::Char(']') | crossterm::event::KeyCode::Right => {
                vec![Action::TypeNext]
            }
            crossterm::event::KeyCode::Enter => state
                .selected_gallery_record()
                .map(|record| vec![Action::DetailOpen(record.name.clone())])
                .unwrap_or_default(),
            _ => {
                let items = gallery_items(state);
                if items.is_empty() {
                    return HandlerResponse::ignored();
                }
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.gallery_selected.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::GallerySelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> =
                    gallery_list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::GallerySelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_detail_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                vec![Action::DetailPrev]
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                vec![Action::DetailNext]
            }
            crossterm::event::KeyCode::Esc | crossterm::event::KeyCode::Backspace => {
                vec![Action::ViewBack]
            }
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_input_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Down => vec![Action::SearchSuggestionMove(1)],
            crossterm::event::KeyCode::Up => vec![Action::SearchSuggestionMove(-1)],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

// ============================================================================
// Small helpers
// ============================================================================

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => "".to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_height(tenths: u16) -> String {
    format!("{:.1} m", tenths as f32 / 10.0)
}

fn format_weight(tenths: u16) -> String {
    format!("{:.1} kg", tenths as f32 / 10.0)
}

fn render_stat(stat: &PokemonStat) -> String {
    let label = shorten_stat(&stat.name);
    let bar_len = (stat.value as usize / 12).clamp(1, 20);
    let bar = "#".repeat(bar_len);
    format!("{label:>4} {value:>3} {bar}", value = stat.value)
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => " HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SAT".to_string(),
        "special-defense" => "SDF".to_string(),
        "speed" => "SPD".to_string(),
        _ => name.to_ascii_uppercase(),
    }
}

fn sprite_fit(sprite: &sprite::SpriteData, max_cols: u16, max_rows: u16) -> (u16, u16) {
    if max_cols == 0 || max_rows == 0 || sprite.height == 0 {
        return (max_cols, max_rows);
    }
    let image_ratio = sprite.width as f32 / sprite.height as f32;
    let max_cols_f = max_cols as f32;
    let max_rows_f = max_rows as f32;
    let cols_for_max_rows = image_ratio * max_rows_f * CELL_ASPECT;
    if cols_for_max_rows <= max_cols_f {
        let cols = cols_for_max_rows.max(1.0).round() as u16;
        return (cols.max(1), max_rows.max(1));
    }
    let rows_for_max_cols = max_cols_f / (image_ratio * CELL_ASPECT);
    let rows = rows_for_max_cols.max(1.0).round() as u16;
    (max_cols.max(1), rows.min(max_rows).max(1))
}
