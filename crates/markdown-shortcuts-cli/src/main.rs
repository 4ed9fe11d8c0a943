use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_shortcuts_config::Config;
use markdown_shortcuts_engine::{
    ACCENT_COLOR, BlockType, DEFAULT_HISTORY_LIMIT, EditorSession, FileStore, HandleResult,
    InlineStyle, MemoryStore, PersistenceAdapter, StyleSet, persistence::DEFAULT_STORAGE_KEY,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env,
    fs::File,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

/// Where the edited document lives
enum Target {
    File(PathBuf),
    Memory(String),
}

struct App {
    session: EditorSession,
    store: Box<dyn PersistenceAdapter>,
    title: String,
    status: String,
    /// Whether saved content outlives the process
    persistent: bool,
    /// Set after a failed restore; the next save only asks for confirmation
    confirm_overwrite: bool,
    /// First visible (row, column) of the editor pane
    scroll: (usize, usize),
}

impl App {
    fn new(target: Target, history_limit: usize) -> Self {
        let (store, title, persistent): (Box<dyn PersistenceAdapter>, String, bool) = match target
        {
            Target::File(path) => {
                let title = path.display().to_string();
                (Box::new(FileStore::new(path)), title, true)
            }
            Target::Memory(key) => {
                let title = format!("memory:{key} (not kept after exit)");
                (Box::new(MemoryStore::with_key(key)), title, false)
            }
        };

        let (session, status, confirm_overwrite) = match EditorSession::restore(store.as_ref()) {
            Ok(session) => (session, "Ready".to_string(), false),
            Err(e) => {
                log::warn!("Could not restore {title}: {e}");
                let status = format!("Could not restore: {e}. Saving will overwrite it");
                (EditorSession::new(), status, true)
            }
        };

        Self {
            session: session.with_history_limit(history_limit),
            store,
            title,
            status,
            persistent,
            confirm_overwrite,
            scroll: (0, 0),
        }
    }

    fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let chars = c.encode_utf8(&mut buf);
        if self.session.on_before_insert_text(chars) == HandleResult::NotHandled {
            self.session.insert_text(chars);
        }
    }

    /// Store the document. After a failed restore the first request only
    /// warns, so the unreadable stored copy is not replaced by accident.
    fn save(&mut self) {
        if self.confirm_overwrite {
            self.confirm_overwrite = false;
            self.status =
                "Stored document could not be read; press ^S again to overwrite it".to_string();
            return;
        }
        self.status = match self.session.save(self.store.as_mut()) {
            Ok(()) if self.persistent => format!("Saved {}", self.title),
            Ok(()) => "Saved to memory only; it is lost on exit".to_string(),
            Err(e) => format!("Save failed: {e}"),
        };
    }

    /// Scroll just enough to keep the caret inside `area` and return the
    /// terminal cell it occupies, if the area has room for one
    fn place_caret(&mut self, area: Rect) -> Option<(u16, u16)> {
        let snapshot = self.session.snapshot();
        let row = snapshot.active_index();
        let column = snapshot.selection().focus_offset;

        self.scroll.0 = follow(row, self.scroll.0, usize::from(area.height));
        self.scroll.1 = follow(column, self.scroll.1, usize::from(area.width));

        let dy = u16::try_from(row - self.scroll.0).ok()?;
        let dx = u16::try_from(column - self.scroll.1).ok()?;
        if dx >= area.width || dy >= area.height {
            return None;
        }
        Some((area.x.saturating_add(dx), area.y.saturating_add(dy)))
    }

    fn undo(&mut self) {
        if !self.session.undo() {
            self.status = "Nothing to undo".to_string();
        }
    }

    fn redo(&mut self) {
        if !self.session.redo() {
            self.status = "Nothing to redo".to_string();
        }
    }

    /// Returns false when the app should exit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => return false,
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('z') => self.undo(),
                KeyCode::Char('y') => self.redo(),
                KeyCode::Char('b') => self.session.toggle_style(InlineStyle::Bold),
                KeyCode::Char('u') => self.session.toggle_style(InlineStyle::Underline),
                _ => {}
            }
            return true;
        }

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Enter => {
                self.session.on_request_line_break();
            }
            KeyCode::Backspace => self.session.delete_backward(),
            KeyCode::Left => self.session.move_left(),
            KeyCode::Right => self.session.move_right(),
            KeyCode::Up => self.session.move_up(),
            KeyCode::Down => self.session.move_down(),
            KeyCode::Home => self.session.move_to_line_start(),
            KeyCode::End => self.session.move_to_line_end(),
            _ => {}
        }
        true
    }
}

fn main() -> Result<()> {
    init_logging();

    // Determine the document from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    if args.len() == 3 && args[1] == "--init" {
        let config = Config::new(&args[2]);
        config.save()?;
        println!(
            "Wrote {} with document path {}",
            config_path.display(),
            config.document_path.display()
        );
        return Ok(());
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} [document.json | --memory | --init document.json]", args[0]);
            process::exit(1);
        }
    };

    let history_limit = config.as_ref().map_or(DEFAULT_HISTORY_LIMIT, |c| c.history_limit);

    let target = match (args.len(), config) {
        (2, config) if args[1] == "--memory" => Target::Memory(
            config.map_or_else(|| DEFAULT_STORAGE_KEY.to_string(), |c| c.storage_key),
        ),
        (2, _) => Target::File(PathBuf::from(&args[1])),
        (1, Some(config)) => Target::File(config.document_path),
        (1, None) => {
            eprintln!("Error: No document path provided and no config file found");
            eprintln!("Usage: {} [document.json | --memory | --init document.json]", args[0]);
            eprintln!(
                "Or create a config file at {} with `{} --init <document.json>`",
                config_path.display(),
                args[0]
            );
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [document.json | --memory | --init document.json]", args[0]);
            process::exit(1);
        }
    };

    let mut app = App::new(target, history_limit);
    log::info!("Editing {}", app.title);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    if !app.persistent {
        eprintln!("In-memory document discarded");
    } else if app.session.is_dirty() {
        eprintln!("Unsaved changes to {} were discarded", app.title);
    }

    Ok(())
}

/// Log to the file named by `MARKDOWN_SHORTCUTS_LOG`; stderr belongs to the
/// terminal UI otherwise, so only errors go there
fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Error);

    if let Some(path) = env::var_os("MARKDOWN_SHORTCUTS_LOG") {
        match File::create(&path) {
            Ok(file) => {
                builder
                    .filter_level(log::LevelFilter::Info)
                    .target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {}: {e}", PathBuf::from(path).display()),
        }
    }

    builder.parse_default_env().init();
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)
        {
            return Ok(());
        }
    }
}

/// Which of undo and redo the session can currently perform
fn history_label(session: &EditorSession) -> &'static str {
    match (session.can_undo(), session.can_redo()) {
        (true, true) => "undo/redo",
        (true, false) => "undo",
        (false, true) => "redo",
        (false, false) => "-",
    }
}

/// Smallest window start that keeps `position` inside `start..start + extent`
fn follow(position: usize, start: usize, extent: usize) -> usize {
    if extent == 0 || position < start {
        position
    } else if position >= start + extent {
        position + 1 - extent
    } else {
        start
    }
}

fn span_style(block_type: BlockType, styles: &StyleSet, accent: Color) -> Style {
    let mut style = Style::default();
    if block_type == BlockType::Heading {
        style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
    }
    for inline in styles {
        style = match inline {
            InlineStyle::Bold => style.add_modifier(Modifier::BOLD),
            InlineStyle::Colored => style.fg(accent),
            InlineStyle::Underline => style.add_modifier(Modifier::UNDERLINED),
        };
    }
    style
}

/// One line per block, split into spans wherever the style set changes
fn block_line(block: &markdown_shortcuts_engine::Block, accent: Color) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_styles: Option<StyleSet> = None;

    for (offset, ch) in block.text().chars().enumerate() {
        let styles = block.styles_at(offset);
        if run_styles.as_ref() != Some(&styles) {
            if let Some(prev) = run_styles.take() {
                spans.push(Span::styled(
                    std::mem::take(&mut run),
                    span_style(block.block_type(), &prev, accent),
                ));
            }
            run_styles = Some(styles);
        }
        run.push(ch);
    }
    if let Some(prev) = run_styles {
        spans.push(Span::styled(run, span_style(block.block_type(), &prev, accent)));
    }

    Line::from(spans)
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)].as_ref())
        .split(f.area());

    let accent = ACCENT_COLOR.parse::<Color>().unwrap_or(Color::Red);
    let snapshot = app.session.snapshot();
    let lines: Vec<Line> = snapshot
        .document()
        .blocks()
        .iter()
        .map(|block| block_line(block, accent))
        .collect();

    let block_type = snapshot.active_block().block_type();
    let styles: Vec<&str> = snapshot.active_styles().iter().map(InlineStyle::as_str).collect();

    let dirty = if app.session.is_dirty() { " [+]" } else { "" };
    let frame = Block::default()
        .borders(Borders::ALL)
        .title(format!("{}{}", app.title, dirty));
    let inner = frame.inner(chunks[0]);

    // One terminal cell per character
    let caret = app.place_caret(inner);
    let offset = (
        u16::try_from(app.scroll.0).unwrap_or(u16::MAX),
        u16::try_from(app.scroll.1).unwrap_or(u16::MAX),
    );
    let editor = Paragraph::new(lines).block(frame).scroll(offset);
    f.render_widget(editor, chunks[0]);
    if let Some(position) = caret {
        f.set_cursor_position(position);
    }

    let history = history_label(&app.session);
    let status_text = Line::from(vec![
        Span::raw(format!("{} | ", app.status)),
        Span::raw(format!("{} | ", block_type.as_str())),
        Span::raw(format!("styles: [{}] | ", styles.join(", "))),
        Span::raw(format!("history: {history}")),
    ]);
    let help_text = Line::from(vec![
        Span::raw("Esc/^Q: Quit | "),
        Span::raw("^S: Save | "),
        Span::raw("^Z/^Y: Undo/Redo | "),
        Span::raw("'# ' heading, '* ' bold, '** ' colored, '*** ' underline"),
    ]);

    let help = Paragraph::new(vec![status_text, help_text]).block(Block::default());
    f.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_shortcuts_engine::Block as TextBlock;
    use markdown_shortcuts_engine::Document;
    use tempfile::TempDir;

    fn ctrl(app: &mut App, c: char) -> bool {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn app_with_blocks(count: usize) -> App {
        let text = (0..count).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut app = App::new(Target::Memory("test".to_string()), 10);
        app.session = EditorSession::with_document(Document::from_text(&text));
        app
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_keys(app: &mut App, text: &str) {
        for c in text.chars() {
            let code = if c == '\n' { KeyCode::Enter } else { KeyCode::Char(c) };
            press(app, code);
        }
    }

    #[test]
    fn test_block_line_splits_on_style_changes() {
        let block = TextBlock::new("plain loud").with_style(InlineStyle::Bold, 6..10);
        let line = block_line(&block, Color::Red);

        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content, "plain ");
        assert_eq!(line.spans[1].content, "loud");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_heading_and_accent_styles() {
        let heading = TextBlock::heading("Title");
        let style = span_style(heading.block_type(), &StyleSet::new(), Color::Red);
        assert_eq!(style.fg, Some(Color::Cyan));

        let colored = StyleSet::from([InlineStyle::Colored, InlineStyle::Underline]);
        let style = span_style(BlockType::Default, &colored, Color::Red);
        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_accent_color_parses() {
        assert_eq!(ACCENT_COLOR.parse::<Color>().ok(), Some(Color::Rgb(255, 0, 0)));
    }

    #[test]
    fn test_keystrokes_drive_shortcuts() {
        let mut app = App::new(Target::Memory("test".to_string()), 10);
        type_keys(&mut app, "# Title\n** red");

        let blocks = app.session.document().blocks();
        assert_eq!(blocks[0].text(), "Title");
        assert_eq!(blocks[0].block_type(), BlockType::Heading);
        assert_eq!(blocks[1].text(), "red");
        assert!(blocks[1].has_style(InlineStyle::Colored));
    }

    #[test]
    fn test_save_and_quit_keys() {
        let mut app = App::new(Target::Memory("test".to_string()), 10);
        type_keys(&mut app, "hello");
        assert!(app.session.is_dirty());

        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(!app.session.is_dirty());
        assert!(app.status.contains("lost on exit"));
        assert!(app.title.contains("not kept after exit"));

        assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(!press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_history_label_tracks_undo_and_redo() {
        let mut app = App::new(Target::Memory("test".to_string()), 10);
        assert_eq!(history_label(&app.session), "-");

        app.session.type_text("a");
        assert_eq!(history_label(&app.session), "undo");

        ctrl(&mut app, 'z');
        assert_eq!(history_label(&app.session), "redo");

        app.session.type_text("ab");
        ctrl(&mut app, 'z');
        assert_eq!(history_label(&app.session), "undo/redo");
    }

    #[test]
    fn test_undo_with_empty_history_reports_status() {
        let mut app = App::new(Target::Memory("test".to_string()), 10);
        app.handle_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL));
        assert_eq!(app.status, "Nothing to undo");
    }

    #[test]
    fn test_unreadable_document_is_not_overwritten_without_confirmation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        let stored = r#"{"blocks":[{"text":"precious notes","type":"default",
            "inline_style_ranges":[{"style":"bold","start":0,"end":99}]}]}"#;
        std::fs::write(&path, stored).unwrap();

        let mut app = App::new(Target::File(path.clone()), 10);
        assert!(app.status.starts_with("Could not restore"));

        ctrl(&mut app, 's');
        assert_eq!(std::fs::read_to_string(&path).unwrap(), stored);
        assert!(app.status.contains("press ^S again"));

        ctrl(&mut app, 's');
        assert!(app.status.starts_with("Saved"));
        assert_ne!(std::fs::read_to_string(&path).unwrap(), stored);
    }

    #[test]
    fn test_readable_document_saves_on_first_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        let mut app = App::new(Target::File(path.clone()), 10);
        type_keys(&mut app, "* kept");
        ctrl(&mut app, 's');

        assert!(app.status.starts_with("Saved"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"kept\""));
    }

    #[test]
    fn test_follow_keeps_position_in_window() {
        assert_eq!(follow(5, 0, 10), 0);
        assert_eq!(follow(12, 0, 10), 3);
        assert_eq!(follow(2, 6, 10), 2);
        assert_eq!(follow(7, 3, 0), 7);
    }

    #[test]
    fn test_caret_below_the_fold_scrolls_into_view() {
        let mut app = app_with_blocks(60);
        press(&mut app, KeyCode::End);
        for _ in 0..59 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.session.snapshot().active_index(), 59);

        let area = Rect::new(1, 1, 78, 22);
        let (x, y) = app.place_caret(area).unwrap();
        assert_eq!(app.scroll.0, 38);
        assert_eq!(y, 22);
        assert!(x < area.right());

        press(&mut app, KeyCode::Up);
        for _ in 0..40 {
            press(&mut app, KeyCode::Up);
        }
        let (_, y) = app.place_caret(area).unwrap();
        assert_eq!(app.scroll.0, 18);
        assert_eq!(y, 1);
    }

    #[test]
    fn test_long_line_scrolls_horizontally() {
        let mut app = App::new(Target::Memory("test".to_string()), 10);
        app.session.insert_text(&"x".repeat(100_000));

        let area = Rect::new(1, 1, 40, 10);
        let (x, y) = app.place_caret(area).unwrap();
        assert_eq!(app.scroll.1, 100_000 + 1 - 40);
        assert_eq!((x, y), (40, 1));
    }

    #[test]
    fn test_empty_area_places_no_caret() {
        let mut app = app_with_blocks(3);
        assert_eq!(app.place_caret(Rect::new(0, 0, 0, 0)), None);
        assert_eq!(app.place_caret(Rect::new(5, 5, 0, 4)), None);
    }
}
