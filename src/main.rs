use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokesearch::action::Action;
use pokesearch::api;
use pokesearch::effect::Effect;
use pokesearch::reducer::reducer;
use pokesearch::sprite;
use pokesearch::sprite_backend::{self, SpriteBackend};
use pokesearch::state::{AppState, View};
use pokesearch::ui::{AppComponentId, AppContext, LookupUi};

#[derive(Parser, Debug)]
#[command(name = "pokesearch")]
#[command(about = "Pokemon lookup TUI: search by name, browse by type")]
struct Args {
    /// Name to search for on startup (exact or partial)
    #[arg(long, short)]
    query: Option<String>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        query,
        debug: debug_args,
    } = Args::parse();
    let debug = DebugSession::new(debug_args);

    let state = debug
        .load_state_or_else_async(move || async move {
            let mut state = AppState::default();
            if let Some(query) = query {
                state.search.query = query;
            }
            Ok::<AppState, io::Error>(state)
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = SpriteBackend::new(stdout, sprite_backend::sprite_registry());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(LookupUi::new()));
    let mut bus: EventBus<AppState, Action, AppComponentId, AppContext> = EventBus::new();
    let keybindings: Keybindings<AppContext> = Keybindings::new();

    let ui_search = Rc::clone(&ui);
    bus.register(AppComponentId::SearchView, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_gallery = Rc::clone(&ui);
    bus.register(AppComponentId::GalleryView, move |event, state| {
        ui_gallery
            .borrow_mut()
            .handle_gallery_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(AppComponentId::DetailView, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    let ui_input = Rc::clone(&ui);
    bus.register(AppComponentId::SearchInput, move |event, state| {
        ui_input
            .borrow_mut()
            .handle_search_input_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Char('q') if !state.search.active => {
                HandlerResponse::action(Action::Quit)
            }
            crossterm::event::KeyCode::Char('/') if !state.search.active => {
                HandlerResponse::action(Action::SearchStart)
            }
            crossterm::event::KeyCode::Char('1') if !state.search.active => {
                HandlerResponse::action(Action::ViewSearch)
            }
            crossterm::event::KeyCode::Char('2') if !state.search.active => {
                HandlerResponse::action(Action::ViewGallery)
            }
            crossterm::event::KeyCode::Tab if !state.search.active => {
                if state.view == View::Search {
                    HandlerResponse::action(Action::ViewGallery)
                } else {
                    HandlerResponse::action(Action::ViewSearch)
                }
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(120), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadNameIndex => {
            ctx.tasks().spawn(TaskKey::new("name_index"), async {
                match api::fetch_name_index().await {
                    Ok(entries) => Action::NameIndexDidLoad(entries),
                    Err(err) => Action::NameIndexDidError(err.to_string()),
                }
            });
        }
        Effect::LoadTypes => {
            ctx.tasks().spawn(TaskKey::new("types"), async {
                match api::fetch_type_list().await {
                    Ok(types) => Action::TypesDidLoad(types),
                    Err(err) => Action::TypesDidError(err.to_string()),
                }
            });
        }
        Effect::ResolveSearch { seq, query, index } => {
            ctx.tasks().spawn(TaskKey::new("search"), async move {
                match api::resolve_search(&query, &index).await {
                    Ok(api::SearchResolution::Single(record)) => {
                        Action::SearchDidMatch { seq, record }
                    }
                    Ok(api::SearchResolution::Many(records)) => {
                        Action::SearchDidMatchMany { seq, records }
                    }
                    Ok(api::SearchResolution::NoMatch) => Action::SearchDidMiss { seq },
                    Err(err) => Action::SearchDidError {
                        seq,
                        error: err.to_string(),
                    },
                }
            });
        }
        Effect::LoadCategory { seq, name } => {
            let key = format!("type_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_category_group(&name).await {
                    Ok(group) => Action::GalleryDidLoad { seq, group },
                    Err(err) => Action::GalleryDidError {
                        seq,
                        name,
                        error: err.to_string(),
                    },
                }
            });
        }
        Effect::LoadDetail { seq, key } => {
            let task_key = format!("detail_{key}");
            ctx.tasks().spawn(TaskKey::new(task_key), async move {
                match api::fetch_pokemon(&key).await {
                    Ok(Some(record)) => Action::DetailDidLoad { seq, record },
                    Ok(None) => Action::DetailDidMiss { seq, key },
                    Err(err) => Action::DetailDidError {
                        seq,
                        error: err.to_string(),
                    },
                }
            });
        }
        Effect::LoadSprite { name, url } => {
            let key = format!("sprite_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_bytes(&url).await {
                    Ok(bytes) => match sprite::decode_sprite(&bytes) {
                        Ok(data) => Action::SpriteDidLoad { name, sprite: data },
                        Err(error) => Action::SpriteDidError { name, url, error },
                    },
                    Err(err) => Action::SpriteDidError {
                        name,
                        url,
                        error: err.to_string(),
                    },
                }
            });
        }
    }
}
