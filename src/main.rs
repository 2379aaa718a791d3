//! Verse Search entry point
//!
//! The browser build drives the game through the DOM. The native build is a
//! terminal front end plus the offline content tools.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, MouseEvent, Response, TouchEvent};

    use verse_search::audio::{AudioManager, SoundEffect};
    use verse_search::consts::*;
    use verse_search::content::{
        CORPUS_FILE, Content, ENGLISH_DICTIONARY_FILE, ROMANIAN_DICTIONARY_FILE,
    };
    use verse_search::history::format_date;
    use verse_search::platform::LocalStorage;
    use verse_search::puzzle::CellPos;
    use verse_search::session::{ActionError, PrimaryAction, Reveal, Snapshot};
    use verse_search::{Game, GameEvent, Language, Mode, SessionPhase};

    /// Browser-side state around the controller
    struct App {
        game: Game<LocalStorage>,
        audio: AudioManager,
        drag_start: Option<CellPos>,
        drag_cells: Vec<CellPos>,
        hint_cell: Option<CellPos>,
        reveal: Option<Reveal>,
        message: String,
    }

    type SharedApp = Rc<RefCell<App>>;

    impl App {
        fn new(game: Game<LocalStorage>) -> Self {
            let audio = AudioManager::new(game.settings().muted);
            Self {
                game,
                audio,
                drag_start: None,
                drag_cells: Vec::new(),
                hint_cell: None,
                reveal: None,
                message: String::new(),
            }
        }

        /// Play cues and pick up messages from controller events
        fn handle_events(&mut self) {
            for event in self.game.take_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
                match event {
                    GameEvent::Notice(text) => self.message = text,
                    GameEvent::LevelStarted { level, .. } => {
                        self.message = format!("Level {}", level);
                        self.reveal = None;
                    }
                    GameEvent::LevelComplete {
                        level,
                        points_earned,
                    } => {
                        self.message =
                            format!("Level {} complete! {} points earned.", level, points_earned);
                    }
                    _ => {}
                }
            }
        }

        fn begin_drag(&mut self, pos: CellPos) {
            if self.game.session().phase != SessionPhase::LevelActive {
                return;
            }
            self.audio.resume();
            self.drag_start = Some(pos);
            self.drag_cells = vec![pos];
        }

        /// Snap the selection to the straight line from the drag start
        fn extend_drag(&mut self, pos: CellPos) -> bool {
            let Some(start) = self.drag_start else {
                return false;
            };
            match self.game.session().grid.line(start, pos) {
                Some(line) if line != self.drag_cells => {
                    self.drag_cells = line;
                    true
                }
                _ => false,
            }
        }

        fn finish_drag(&mut self) {
            if self.drag_start.take().is_none() {
                return;
            }
            let cells = std::mem::take(&mut self.drag_cells);
            match self.game.submit_selection(&cells) {
                Ok(found) => self.reveal = Some(found.reveal),
                Err(e) => log::debug!("Selection rejected: {}", e),
            }
            self.handle_events();
        }

        fn render(&self) {
            let Some(document) = current_document() else { return };
            let snap = self.game.snapshot();

            set_text(&document, "score", &snap.score.to_string());
            set_text(&document, "level", &snap.level.to_string());
            set_text(&document, "timer", &format_clock(snap.elapsed_seconds));
            set_text(&document, "hints", &snap.hints_used.to_string());
            set_text(&document, "mode-label", &snap.mode.label(snap.language));
            set_text(&document, "primary-btn", snap.primary_action.label());
            set_text(&document, "message", &self.message);
            set_text(&document, "mute-btn", if snap.muted { "Unmute" } else { "Mute" });
            set_text(&document, "grid-size-value", &snap.pending_grid_size.to_string());

            for (id, lang) in [("lang-en", Language::English), ("lang-ro", Language::Romanian)] {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.class_list().toggle_with_force("active", snap.language == lang);
                }
            }
            if let Some(input) = input_by_id(&document, "mode-toggle") {
                input.set_checked(snap.mode == Mode::Scripture);
            }
            if let Some(input) = input_by_id(&document, "grid-size") {
                input.set_value(&snap.pending_grid_size.to_string());
            }

            self.render_grid(&document, &snap);
            self.render_words(&document, &snap);
            self.render_reveal(&document);
        }

        fn render_grid(&self, document: &Document, snap: &Snapshot) {
            let Some(container) = document.get_element_by_id("grid") else {
                return;
            };
            container.set_inner_html("");
            if let Some(el) = container.dyn_ref::<HtmlElement>() {
                let _ = el.style().set_property(
                    "grid-template-columns",
                    &format!("repeat({}, 1fr)", snap.grid.size()),
                );
            }

            let found: HashSet<CellPos> = snap
                .words
                .iter()
                .flat_map(|w| w.cells.iter().copied())
                .collect();
            for (r, row) in snap.grid.rows().iter().enumerate() {
                for (c, &letter) in row.iter().enumerate() {
                    let Ok(cell) = document.create_element("div") else {
                        continue;
                    };
                    let pos = CellPos::new(r, c);
                    let mut class = String::from("cell");
                    if found.contains(&pos) {
                        class.push_str(" found");
                    }
                    if self.drag_cells.contains(&pos) {
                        class.push_str(" selected");
                    }
                    if self.hint_cell == Some(pos) {
                        class.push_str(" hint");
                    }
                    cell.set_class_name(&class);
                    let _ = cell.set_attribute("data-row", &r.to_string());
                    let _ = cell.set_attribute("data-col", &c.to_string());
                    cell.set_text_content(Some(&letter.to_string()));
                    let _ = container.append_child(&cell);
                }
            }
        }

        fn render_words(&self, document: &Document, snap: &Snapshot) {
            let Some(list) = document.get_element_by_id("word-list") else {
                return;
            };
            list.set_inner_html("");
            for entry in &snap.words {
                let Ok(item) = document.create_element("li") else {
                    continue;
                };
                item.set_class_name(if entry.found { "word found" } else { "word" });
                let _ = item.set_attribute("data-word", &entry.word);
                item.set_text_content(Some(&entry.word));
                let _ = list.append_child(&item);
            }
        }

        fn render_reveal(&self, document: &Document) {
            let Some(panel) = document.get_element_by_id("reveal") else {
                return;
            };
            panel.set_inner_html("");
            let parts: Vec<(&str, String)> = match &self.reveal {
                Some(reveal @ Reveal::Verse { reference, text, .. }) => {
                    let mut parts = vec![("reference", format!("{} ", reference))];
                    match reveal.highlighted() {
                        Some((before, word, after)) => {
                            parts.push(("text", before));
                            parts.push(("highlight", word));
                            parts.push(("text", after));
                        }
                        None => parts.push(("text", text.clone())),
                    }
                    parts
                }
                Some(Reveal::Definition { word, definition }) => vec![
                    ("highlight", word.clone()),
                    ("text", format!(": {}", definition)),
                ],
                Some(Reveal::Nothing) | None => Vec::new(),
            };
            for (class, text) in parts {
                if let Ok(span) = document.create_element("span") {
                    span.set_class_name(class);
                    span.set_text_content(Some(&text));
                    let _ = panel.append_child(&span);
                }
            }
        }

        fn render_history(&self, document: &Document) {
            let Some(list) = document.get_element_by_id("history-list") else {
                return;
            };
            list.set_inner_html("");
            let history = self.game.history();
            if history.is_empty() {
                list.set_text_content(Some("No levels played yet."));
                return;
            }
            for record in history.most_recent_first() {
                let Ok(item) = document.create_element("li") else {
                    continue;
                };
                item.set_class_name(if record.completed { "completed" } else { "incomplete" });
                item.set_text_content(Some(&format!(
                    "Level {} | {} | {} | {} | {}/{} words | {} hints | {} points",
                    record.level,
                    record.mode,
                    format_date(record.timestamp),
                    format_clock(record.elapsed_seconds),
                    record.words_found,
                    record.total_words,
                    record.hints_used,
                    record.points_earned
                )));
                let _ = list.append_child(&item);
            }
        }
    }

    fn current_document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn input_by_id(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn format_clock(seconds: u32) -> String {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }

    fn confirm(message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    /// Grid cell under an element, from its data attributes
    fn cell_of(element: &Element) -> Option<CellPos> {
        let row = element.get_attribute("data-row")?.parse().ok()?;
        let col = element.get_attribute("data-col")?.parse().ok()?;
        Some(CellPos::new(row, col))
    }

    fn cell_at_touch(event: &TouchEvent) -> Option<CellPos> {
        let touch = event.touches().get(0)?;
        let element = current_document()?.element_from_point(touch.client_x() as f32, touch.client_y() as f32)?;
        cell_of(&element)
    }

    fn cell_at_mouse(event: &MouseEvent) -> Option<CellPos> {
        cell_of(&event.target()?.dyn_into::<Element>().ok()?)
    }

    async fn fetch_text(url: &str) -> Result<String, String> {
        let window = web_sys::window().ok_or("no window")?;
        let response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| format!("{}: {:?}", url, e))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| format!("{}: not a response", url))?;
        if !response.ok() {
            return Err(format!("{}: HTTP {}", url, response.status()));
        }
        let body = response.text().map_err(|e| format!("{}: {:?}", url, e))?;
        JsFuture::from(body)
            .await
            .map_err(|e| format!("{}: {:?}", url, e))?
            .as_string()
            .ok_or_else(|| format!("{}: body is not text", url))
    }

    async fn load_content() -> Result<Content, String> {
        let corpus = fetch_text(CORPUS_FILE).await?;
        let english = fetch_text(ENGLISH_DICTIONARY_FILE).await?;
        let romanian = fetch_text(ROMANIAN_DICTIONARY_FILE).await?;
        Content::from_json(&corpus, &english, &romanian).map_err(|e| e.to_string())
    }

    /// Show the loader, then run a level-starting action once it has painted
    fn defer_level_start(app: SharedApp, action: impl FnOnce(&mut App) + 'static) {
        let Some(window) = web_sys::window() else { return };
        if let Some(document) = window.document() {
            set_hidden(&document, "loading", false);
        }
        let closure = Closure::once(move || {
            let mut a = app.borrow_mut();
            action(&mut *a);
            a.handle_events();
            a.render();
            if let Some(document) = current_document() {
                set_hidden(&document, "loading", true);
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            LEVEL_START_DELAY_MS,
        );
        closure.forget();
    }

    fn report_level_error(app: &mut App, result: Result<(), ActionError>) {
        if let Err(e) = result {
            log::warn!("{}", e);
            app.message = e.to_string();
            if let ActionError::InsufficientScore { .. } = e {
                alert(&app.message);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Verse Search starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let content = match load_content().await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to load game content: {}", e);
                set_hidden(&document, "loading", true);
                set_text(
                    &document,
                    "fatal-error",
                    &format!("Could not load the game data ({}). Please reload the page.", e),
                );
                set_hidden(&document, "fatal-error", false);
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(content, LocalStorage::new(), seed);
        let app = Rc::new(RefCell::new(App::new(game)));
        log::info!("Game initialized with seed: {}", seed);

        setup_grid_input(app.clone());
        setup_word_list(app.clone());
        setup_controls(app.clone());
        setup_history(app.clone());
        setup_clock(app.clone());

        defer_level_start(app, |a| match a.game.resume() {
            Ok(resumed) => log::info!("Session ready ({:?})", resumed),
            Err(e) => {
                log::error!("{}", e);
                a.message = e.to_string();
            }
        });

        log::info!("Verse Search running!");
    }

    fn setup_grid_input(app: SharedApp) {
        let Some(document) = current_document() else { return };
        let Some(grid) = document.get_element_by_id("grid") else {
            log::warn!("No #grid element");
            return;
        };

        // Mouse down - start a selection
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                if let Some(pos) = cell_at_mouse(&event) {
                    let mut a = app.borrow_mut();
                    a.begin_drag(pos);
                    a.render();
                }
            });
            let _ = grid.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - extend along a straight line
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(pos) = cell_at_mouse(&event) {
                    let mut a = app.borrow_mut();
                    if a.extend_drag(pos) {
                        a.render();
                    }
                }
            });
            let _ = grid.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up anywhere - submit
        if let Some(window) = web_sys::window() {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                if a.drag_start.is_some() {
                    a.finish_drag();
                    a.render();
                }
            });
            let _ = window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = cell_at_touch(&event) {
                    let mut a = app.borrow_mut();
                    a.begin_drag(pos);
                    a.render();
                }
            });
            let _ = grid.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = cell_at_touch(&event) {
                    let mut a = app.borrow_mut();
                    if a.extend_drag(pos) {
                        a.render();
                    }
                }
            });
            let _ = grid.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.finish_drag();
                a.render();
            });
            let _ = grid.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Clicking an unfound word buys a hint
    fn setup_word_list(app: SharedApp) {
        let Some(document) = current_document() else { return };
        let Some(list) = document.get_element_by_id("word-list") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(word) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.get_attribute("data-word"))
            else {
                return;
            };
            let mut a = app.borrow_mut();
            match a.game.request_hint(&word) {
                Ok(cell) => {
                    a.hint_cell = Some(cell);
                    a.handle_events();
                    a.render();
                    clear_hint_later(app.clone(), cell);
                }
                Err(ActionError::AlreadyFound(_)) => {}
                Err(e) => {
                    a.message = e.to_string();
                    a.render();
                    if let ActionError::InsufficientScore { .. } = e {
                        alert(&format!("Hints cost {} points.", HINT_COST));
                    }
                }
            }
        });
        let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn clear_hint_later(app: SharedApp, cell: CellPos) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move || {
            let mut a = app.borrow_mut();
            if a.hint_cell == Some(cell) {
                a.hint_cell = None;
                a.render();
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            HINT_HIGHLIGHT_MS,
        );
        closure.forget();
    }

    fn setup_controls(app: SharedApp) {
        let Some(document) = current_document() else { return };

        // Primary action button
        if let Some(btn) = document.get_element_by_id("primary-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let action = app.borrow().game.primary_action();
                match action {
                    PrimaryAction::NextLevel => {
                        defer_level_start(app.clone(), |a| {
                            let result = a.game.advance();
                            report_level_error(a, result);
                        });
                    }
                    PrimaryAction::Regenerate => {
                        if confirm("Start a new puzzle with the new grid size? This level will be recorded as incomplete.") {
                            defer_level_start(app.clone(), |a| {
                                let result = a.game.regenerate();
                                report_level_error(a, result);
                            });
                        }
                    }
                    PrimaryAction::Skip { cost } => {
                        let score = app.borrow().game.session().score;
                        if score < cost {
                            alert(&format!("Skipping costs {} points. You have {}.", cost, score));
                        } else if confirm(&format!("Skip this level for {} points?", cost)) {
                            defer_level_start(app.clone(), |a| {
                                let result = a.game.skip();
                                report_level_error(a, result);
                            });
                        }
                    }
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Language buttons
        for (id, lang) in [("lang-en", Language::English), ("lang-ro", Language::Romanian)] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    if app.borrow().game.session().language == lang {
                        return;
                    }
                    defer_level_start(app.clone(), move |a| {
                        let result = a.game.switch_language(lang);
                        report_level_error(a, result);
                    });
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Mode checkbox (checked = Scripture)
        if let Some(input) = input_by_id(&document, "mode-toggle") {
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mode = if input_clone.checked() {
                    Mode::Scripture
                } else {
                    Mode::Standard
                };
                defer_level_start(app.clone(), move |a| {
                    let result = a.game.switch_mode(mode);
                    report_level_error(a, result);
                });
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Grid size slider
        if let Some(input) = input_by_id(&document, "grid-size") {
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Ok(n) = input_clone.value().parse::<usize>() else {
                    return;
                };
                let mut a = app.borrow_mut();
                let size = a.game.change_grid_size(n);
                log::info!("Grid size preference: {}", size);
                a.render();
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mute toggle
        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                let muted = !a.game.settings().muted;
                a.game.set_muted(muted);
                a.audio.set_muted(muted);
                a.render();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_history(app: SharedApp) {
        let Some(document) = current_document() else { return };

        if let Some(btn) = document.get_element_by_id("history-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let Some(document) = current_document() else { return };
                app.borrow().render_history(&document);
                set_hidden(&document, "history-modal", false);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("history-close") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if let Some(document) = current_document() {
                    set_hidden(&document, "history-modal", true);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// One-second level clock
    fn setup_clock(app: SharedApp) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Ok(mut a) = app.try_borrow_mut() else {
                return;
            };
            if let Some(seconds) = a.game.tick_clock() {
                if let Some(document) = current_document() {
                    set_text(&document, "timer", &format_clock(seconds));
                }
            }
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            1000,
        );
        closure.forget();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use clap::{Args, Parser, Subcommand, ValueEnum};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use thiserror::Error;

    use verse_search::content::corpus::merge_books;
    use verse_search::content::import::{
        DictionaryOptions, DictionarySource, ImportError, build_dictionary, format_niv_text,
        parse_scripture_text,
    };
    use verse_search::content::ContentError;
    use verse_search::history::format_date;
    use verse_search::platform::{FileStore, now_ms};
    use verse_search::puzzle::CellPos;
    use verse_search::session::{ActionError, PrimaryAction, Reveal, Snapshot};
    use verse_search::{Game, GameEvent, Language, Mode, SessionPhase};

    #[derive(Debug, Parser)]
    #[command(name = "verse-search", version, about = "Scripture and dictionary word-search puzzles")]
    pub struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// Play in the terminal
        Play(PlayArgs),
        /// Convert a plain-text scripture file into the corpus JSON
        ImportBible(ImportBibleArgs),
        /// Number unnumbered NIV text (one verse per line under book names)
        FormatNiv(FormatNivArgs),
        /// Build a word-definition dictionary from a raw dump
        BuildDictionary(BuildDictionaryArgs),
    }

    #[derive(Debug, Args)]
    struct PlayArgs {
        /// Directory holding the three content JSON files
        #[arg(long, default_value = ".")]
        content: PathBuf,
        /// Save file (session, history and settings)
        #[arg(long, default_value = "verse_search_save.json")]
        state: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        /// Start a new game in this language instead of resuming
        #[arg(long, value_parser = parse_language)]
        language: Option<Language>,
        /// Start a new game in this mode instead of resuming
        #[arg(long, value_parser = parse_mode)]
        mode: Option<Mode>,
    }

    #[derive(Debug, Args)]
    struct ImportBibleArgs {
        /// Plain-text scripture file
        input: PathBuf,
        #[arg(long, value_parser = parse_language)]
        language: Language,
        /// Corpus file to merge into (created if missing)
        #[arg(long, default_value = "bible_data.json")]
        corpus: PathBuf,
    }

    #[derive(Debug, Args)]
    struct FormatNivArgs {
        input: PathBuf,
        #[arg(long, short, default_value = "formatted_bible_niv.txt")]
        output: PathBuf,
        /// Per-book verse count summary
        #[arg(long, default_value = "niv_summary_log.txt")]
        summary: PathBuf,
    }

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum SourceFormat {
        /// `{ "word": "<html definition>" }`
        Json,
        /// Wiktionary JSONL dump
        Jsonl,
    }

    #[derive(Debug, Args)]
    struct BuildDictionaryArgs {
        input: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: SourceFormat,
        #[arg(long, value_parser = parse_language)]
        language: Language,
        #[arg(long, default_value_t = 4)]
        min_len: usize,
        #[arg(long, default_value_t = 9)]
        max_len: usize,
        /// Percentage of filtered words to drop at random
        #[arg(long, default_value_t = 80.0)]
        reduction: f64,
        /// File with one excluded word per line
        #[arg(long)]
        exclusions: Option<PathBuf>,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    }

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error("{path}: {source}")]
        Io {
            path: String,
            #[source]
            source: io::Error,
        },
        #[error(transparent)]
        Content(#[from] ContentError),
        #[error(transparent)]
        Import(#[from] ImportError),
    }

    fn parse_language(s: &str) -> Result<Language, String> {
        Language::from_str(s).ok_or_else(|| format!("unknown language '{}' (en, ro)", s))
    }

    fn parse_mode(s: &str) -> Result<Mode, String> {
        Mode::from_str(s).ok_or_else(|| format!("unknown mode '{}' (scripture, standard)", s))
    }

    fn read_file(path: &PathBuf) -> Result<String, CliError> {
        std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn write_file(path: &PathBuf, text: &str) -> Result<(), CliError> {
        std::fs::write(path, text).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn run(cli: Cli) -> Result<(), CliError> {
        match cli.command {
            Command::Play(args) => play(args),
            Command::ImportBible(args) => import_bible(args),
            Command::FormatNiv(args) => format_niv_file(args),
            Command::BuildDictionary(args) => build_dictionary_file(args),
        }
    }

    fn import_bible(args: ImportBibleArgs) -> Result<(), CliError> {
        let text = read_file(&args.input)?;
        let (books, report) = parse_scripture_text(&text)?;
        for warning in &report.warnings {
            log::warn!("{}", warning);
        }

        let mut document = if args.corpus.exists() {
            serde_json::from_str(&read_file(&args.corpus)?).map_err(|e| ContentError::Json {
                source_name: "corpus",
                message: e.to_string(),
            })?
        } else {
            serde_json::Value::Object(serde_json::Map::new())
        };
        merge_books(&mut document, args.language, books)?;
        let json = serde_json::to_string_pretty(&document).unwrap_or_default();
        write_file(&args.corpus, &json)?;

        println!(
            "Imported {} books, {} chapters, {} verses ({}) into {}",
            report.books,
            report.chapters,
            report.verses,
            args.language.as_str(),
            args.corpus.display()
        );
        Ok(())
    }

    fn format_niv_file(args: FormatNivArgs) -> Result<(), CliError> {
        let text = read_file(&args.input)?;
        let (formatted, summary) = format_niv_text(&text);
        write_file(&args.output, &formatted)?;

        let mut log_text = summary.join("\n");
        log_text.push('\n');
        write_file(&args.summary, &log_text)?;

        let good = summary.iter().filter(|l| l.ends_with(" - Good")).count();
        println!(
            "Formatted {} into {} ({} of {} books complete, summary in {})",
            args.input.display(),
            args.output.display(),
            good,
            summary.len(),
            args.summary.display()
        );
        Ok(())
    }

    fn build_dictionary_file(args: BuildDictionaryArgs) -> Result<(), CliError> {
        let text = read_file(&args.input)?;
        let source = match args.format {
            SourceFormat::Json => DictionarySource::Json(&text),
            SourceFormat::Jsonl => DictionarySource::WiktionaryJsonl(&text),
        };
        let mut opts = DictionaryOptions {
            language: args.language,
            min_len: args.min_len,
            max_len: args.max_len,
            reduction_percent: args.reduction,
            ..DictionaryOptions::default()
        };
        if let Some(path) = &args.exclusions {
            opts = opts.with_exclusions(&read_file(path)?);
        }
        let seed = args.seed.unwrap_or_else(|| now_ms() as u64);
        let mut rng = Pcg32::seed_from_u64(seed);

        let dict = build_dictionary(source, &opts, &mut rng)?;
        write_file(&args.output, &dict.to_json(true))?;
        println!("Wrote {} words to {}", dict.len(), args.output.display());
        Ok(())
    }

    /// One line of terminal input
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Input {
        Select(CellPos, CellPos),
        Word(String),
        Hint(String),
        Next,
        ToggleMode,
        Lang(Language),
        Size(usize),
        History,
        Mute,
        Help,
        Quit,
    }

    fn parse_input(line: &str) -> Result<Input, String> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Err("empty command".into());
        };
        let rest: Vec<&str> = parts.collect();
        fn number(s: &str) -> Result<usize, String> {
            s.parse().map_err(|_| format!("'{}' is not a number", s))
        }
        match (cmd.to_lowercase().as_str(), rest.as_slice()) {
            ("s" | "select", [r1, c1, r2, c2]) => Ok(Input::Select(
                CellPos::new(number(r1)?, number(c1)?),
                CellPos::new(number(r2)?, number(c2)?),
            )),
            ("s" | "select", _) => Err("usage: select <row> <col> <row> <col>".into()),
            ("w" | "word", [word]) => Ok(Input::Word(word.to_string())),
            ("h" | "hint", [word]) => Ok(Input::Hint(word.to_uppercase())),
            ("n" | "next" | "skip", []) => Ok(Input::Next),
            ("mode", []) => Ok(Input::ToggleMode),
            ("lang", [lang]) => parse_language(lang).map(Input::Lang),
            ("size", [n]) => number(n).map(Input::Size),
            ("history", []) => Ok(Input::History),
            ("mute", []) => Ok(Input::Mute),
            ("help" | "?", []) => Ok(Input::Help),
            ("q" | "quit" | "exit", []) => Ok(Input::Quit),
            _ => Err(format!("unknown command '{}' (try 'help')", line.trim())),
        }
    }

    const HELP: &str = "\
Commands:
  select <row> <col> <row> <col>   select a straight line of cells
  word <WORD>                      type a word instead of selecting it
  hint <WORD>                      reveal the first letter of a word
  next                             skip, regenerate or go to the next level
  mode                             toggle Scripture/Standard
  lang <en|ro>                     switch language
  size <5-20>                      grid size for the next puzzle
  history                          list played levels
  mute                             toggle the (silent) mute preference
  quit";

    fn confirm(prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).is_ok()
            && matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn print_snapshot(snap: &Snapshot) {
        println!();
        println!(
            "{} | Level {} | Score {} | Time {}:{:02} | Hints {}",
            snap.mode.label(snap.language),
            snap.level,
            snap.score,
            snap.elapsed_seconds / 60,
            snap.elapsed_seconds % 60,
            snap.hints_used
        );
        if snap.grid.is_empty() {
            println!("(no puzzle)");
        } else {
            print!("{}", snap.grid);
        }
        let words: Vec<String> = snap
            .words
            .iter()
            .map(|w| if w.found { format!("[{}]", w.word) } else { w.word.clone() })
            .collect();
        println!("Words: {}", words.join("  "));
        if snap.pending_grid_size != snap.grid_size {
            println!("Next grid size: {}", snap.pending_grid_size);
        }
        println!("> next: {}", snap.primary_action.label());
    }

    fn print_reveal(reveal: &Reveal) {
        match reveal {
            Reveal::Verse { reference, .. } => match reveal.highlighted() {
                Some((before, word, after)) => {
                    println!("{}: {}*{}*{}", reference, before, word, after)
                }
                None => println!("{}", reference),
            },
            Reveal::Definition { word, definition } => println!("{}: {}", word, definition),
            Reveal::Nothing => {}
        }
    }

    fn print_events(game: &mut Game<FileStore>) {
        for event in game.take_events() {
            match event {
                GameEvent::Notice(text) => println!("! {}", text),
                GameEvent::WordFound { word, points } => println!("Found {} (+{})", word, points),
                GameEvent::SelectionRejected { .. } => println!("No word there."),
                GameEvent::LevelComplete {
                    level,
                    points_earned,
                } => println!("Level {} complete! {} points earned.", level, points_earned),
                GameEvent::HintUsed { word, cell } => {
                    println!("{} starts at row {}, col {}", word, cell.row, cell.col)
                }
                GameEvent::LevelStarted { .. } => {}
            }
        }
    }

    fn report(result: Result<(), ActionError>) {
        if let Err(e) = result {
            println!("! {}", e);
        }
    }

    fn primary(game: &mut Game<FileStore>) {
        match game.primary_action() {
            PrimaryAction::NextLevel => report(game.advance()),
            PrimaryAction::Regenerate => {
                if game.session().phase == SessionPhase::Idle
                    || confirm("Start a new puzzle with the new grid size?")
                {
                    report(game.regenerate());
                }
            }
            PrimaryAction::Skip { cost } => {
                if game.session().score < cost {
                    println!("! Skipping costs {} points.", cost);
                } else if confirm(&format!("Skip this level for {} points?", cost)) {
                    report(game.skip());
                }
            }
        }
    }

    fn play(args: PlayArgs) -> Result<(), CliError> {
        let content = verse_search::content::Content::load_dir(&args.content)?;
        let store = FileStore::open(&args.state);
        let seed = args.seed.unwrap_or_else(|| now_ms() as u64);
        let mut game = Game::new(content, store, seed);
        log::info!("Game initialized with seed: {}", seed);

        let started = if args.language.is_some() || args.mode.is_some() {
            game.start_new_game(
                args.language.unwrap_or_default(),
                args.mode.unwrap_or_default(),
                0,
            )
            .map(|_| ())
        } else {
            game.resume().map(|r| log::info!("Session ready ({:?})", r))
        };
        if let Err(e) = started {
            println!("! {}", e);
        }
        print_events(&mut game);
        print_snapshot(&game.snapshot());

        let mut clock = Instant::now();
        let stdin = io::stdin();
        loop {
            print!("> ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if line.trim().is_empty() {
                continue;
            }

            let elapsed = clock.elapsed().as_secs();
            for _ in 0..elapsed {
                game.tick_clock();
            }
            clock += Duration::from_secs(elapsed);

            let input = match parse_input(&line) {
                Ok(input) => input,
                Err(e) => {
                    println!("! {}", e);
                    continue;
                }
            };
            match input {
                Input::Quit => break,
                Input::Help => {
                    println!("{}", HELP);
                    continue;
                }
                Input::History => {
                    let history = game.history();
                    for r in history.most_recent_first() {
                        println!(
                            "Level {:>3} | {} | {} | {}:{:02} | {}/{} | hints {} | {:+} {}",
                            r.level,
                            r.mode,
                            format_date(r.timestamp),
                            r.elapsed_seconds / 60,
                            r.elapsed_seconds % 60,
                            r.words_found,
                            r.total_words,
                            r.hints_used,
                            r.points_earned,
                            if r.completed { "completed" } else { "incomplete" }
                        );
                    }
                    println!("{} levels, {} points", history.len(), history.total_points());
                    continue;
                }
                Input::Select(start, end) => {
                    let cells = game
                        .session()
                        .grid
                        .line(start, end)
                        .unwrap_or_else(|| vec![start, end]);
                    match game.submit_selection(&cells) {
                        Ok(found) => print_reveal(&found.reveal),
                        Err(e) => log::debug!("{}", e),
                    }
                }
                Input::Word(word) => match game.submit_word(&word) {
                    Ok(found) => print_reveal(&found.reveal),
                    Err(e) => println!("! {}", e),
                },
                Input::Hint(word) => {
                    if let Err(e) = game.request_hint(&word) {
                        println!("! {}", e);
                    }
                }
                Input::Next => primary(&mut game),
                Input::ToggleMode => {
                    let mode = game.session().mode.toggled();
                    report(game.switch_mode(mode));
                }
                Input::Lang(lang) => report(game.switch_language(lang)),
                Input::Size(n) => {
                    let size = game.change_grid_size(n);
                    println!("Grid size for the next puzzle: {}", size);
                }
                Input::Mute => {
                    let muted = !game.settings().muted;
                    game.set_muted(muted);
                    println!("{}", if muted { "Muted" } else { "Unmuted" });
                }
            }
            print_events(&mut game);
            print_snapshot(&game.snapshot());
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_select() {
            assert_eq!(
                parse_input("s 0 1 0 4"),
                Ok(Input::Select(CellPos::new(0, 1), CellPos::new(0, 4)))
            );
            assert!(parse_input("select 0 1").is_err());
            assert!(parse_input("select a b c d").is_err());
        }

        #[test]
        fn test_parse_commands() {
            assert_eq!(parse_input("hint cat"), Ok(Input::Hint("CAT".into())));
            assert_eq!(parse_input("lang ro"), Ok(Input::Lang(Language::Romanian)));
            assert_eq!(parse_input("lang english"), Ok(Input::Lang(Language::English)));
            assert_eq!(parse_input("size 9"), Ok(Input::Size(9)));
            assert_eq!(parse_input("NEXT"), Ok(Input::Next));
            assert!(parse_input("dance").is_err());
        }

        #[test]
        fn test_parse_mode_names() {
            assert_eq!(parse_mode("scripture"), Ok(Mode::Scripture));
            assert_eq!(parse_mode("STANDARD"), Ok(Mode::Standard));
            assert!(parse_mode("arcade").is_err());
        }

        #[test]
        fn test_cli_parses_subcommands() {
            let cli = Cli::try_parse_from([
                "verse-search",
                "build-dictionary",
                "dump.jsonl",
                "--format",
                "jsonl",
                "--language",
                "en",
                "-o",
                "out.json",
            ])
            .unwrap();
            let Command::BuildDictionary(args) = cli.command else {
                panic!("expected build-dictionary");
            };
            assert_eq!(args.min_len, 4);
            assert_eq!(args.max_len, 9);
            assert_eq!(args.reduction, 80.0);
        }

        #[test]
        fn test_cli_parses_format_niv() {
            let cli = Cli::try_parse_from(["verse-search", "format-niv", "niv.txt"]).unwrap();
            let Command::FormatNiv(args) = cli.command else {
                panic!("expected format-niv");
            };
            assert_eq!(args.output, PathBuf::from("formatted_bible_niv.txt"));
            assert_eq!(args.summary, PathBuf::from("niv_summary_log.txt"));
        }

        #[test]
        fn test_import_bible_merges_into_existing_corpus() {
            let dir = tempfile::tempdir().unwrap();
            let corpus = dir.path().join("bible_data.json");
            std::fs::write(
                &corpus,
                r#"{
                    "spanish": { "Rut": { "1": { "1": "No me ruegues" } } },
                    "english": { "Genesis": {
                        "1": { "1": "In the beginning" },
                        "2": { "1": "Thus the heavens" }
                    } }
                }"#,
            )
            .unwrap();
            let input = dir.path().join("genesis3.txt");
            std::fs::write(&input, "Genesis\nChapter 3\n1 Now the serpent was more subtil\n").unwrap();

            import_bible(ImportBibleArgs {
                input,
                language: Language::English,
                corpus: corpus.clone(),
            })
            .unwrap();

            let merged: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(&corpus).unwrap()).unwrap();
            assert_eq!(merged["spanish"]["Rut"]["1"]["1"], "No me ruegues");
            let chapters: Vec<_> = merged["english"]["Genesis"]
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            assert_eq!(chapters, ["1", "2", "3"]);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    let cli = terminal::Cli::parse();
    match terminal::run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
