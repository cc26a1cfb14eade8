mod app;
mod config;
mod diff;
mod plan;
mod ui;

use anyhow::{Context, Result};
use app::{App, NavEvent};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plan::{ChangeRecord, SourceIndex};
use ratatui::prelude::*;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;
use ui::{DetailRenderer, Theme};

/// Terminal viewer for Terraform / OpenTofu plans
#[derive(Parser)]
#[command(name = "tplan", version, about)]
struct Cli {
    /// Plan JSON from `terraform show -json` (reads stdin when omitted or `-`)
    plan: Option<PathBuf>,

    /// Directory holding the .tf sources, used to group resources by file
    #[arg(long, default_value = ".")]
    source_dir: PathBuf,

    /// Skip scanning .tf files for resource locations
    #[arg(long)]
    no_locate: bool,

    /// Start with every node expanded
    #[arg(long)]
    expand: bool,

    /// Write logs to this file (level from TPLAN_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    if cli.plan.is_none() && io::stdin().is_terminal() {
        anyhow::bail!("No plan given: pass a file or pipe `terraform show -json <planfile>` in");
    }

    let config = config::load_config(Path::new("."));
    let mut plan = plan::load_plan(cli.plan.as_deref())?;
    log::info!(
        "loaded {} resource changes, {} diagnostics",
        plan.records.len(),
        plan.diagnostics.len()
    );

    if config.grouping.by_file && !cli.no_locate {
        match SourceIndex::scan(&cli.source_dir) {
            Ok(index) => {
                log::debug!("{} resource blocks indexed", index.len());
                if index.is_empty() {
                    log::info!("no resource blocks found under {}", cli.source_dir.display());
                }
                for record in plan.records.iter_mut() {
                    record.location = index.locate(record);
                }
            }
            Err(e) => log::warn!("resource locations unavailable: {:#}", e),
        }
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::new(&config.theme);
    let result = run_app(&mut terminal, plan, &config, &theme, cli.expand);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// `TPLAN_LOG` sets the filter. Without `--log-file` only warnings and worse
/// reach stderr, and only before the alternate screen is entered.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let env = env_logger::Env::new().filter_or("TPLAN_LOG", "warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    plan: plan::Plan,
    config: &config::TplanConfig,
    theme: &Theme,
    expand: bool,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let size = terminal.size()?;
    let locate = |r: &ChangeRecord| r.location.clone();
    let mut app = App::new(plan, Some(&locate), ui::content_rows(size.height));
    // Rebuilt on resize only, so detail lines are cached across frames
    let mut detail = DetailRenderer::new(&config.display, theme, size.width as usize);

    if expand {
        app.handle(NavEvent::ExpandAll, &detail);
    }

    loop {
        terminal.draw(|f| ui::draw(f, &app, &detail))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(nav) = handle_key(key) {
                        app.handle(nav, &detail);
                    }
                }
                Event::Resize(w, h) => {
                    detail = DetailRenderer::new(&config.display, theme, w as usize);
                    app.handle(NavEvent::Resize(ui::content_rows(h)), &detail);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(key: KeyEvent) -> Option<NavEvent> {
    let nav = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => NavEvent::Quit,
        KeyCode::Char('q') | KeyCode::Esc => NavEvent::Quit,
        KeyCode::Up | KeyCode::Char('k') => NavEvent::Up,
        KeyCode::Down | KeyCode::Char('j') => NavEvent::Down,
        KeyCode::Enter | KeyCode::Char(' ') => NavEvent::Toggle,
        KeyCode::Tab => NavEvent::NextView,
        KeyCode::BackTab => NavEvent::PrevView,
        KeyCode::Home | KeyCode::Char('g') => NavEvent::Top,
        KeyCode::End | KeyCode::Char('G') => NavEvent::Bottom,
        KeyCode::Char('e') => NavEvent::ExpandAll,
        KeyCode::Char('c') => NavEvent::CollapseAll,
        _ => return None,
    };
    Some(nav)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_quits_plain_c_collapses() {
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(NavEvent::Quit)
        );
        assert_eq!(handle_key(key(KeyCode::Char('c'))), Some(NavEvent::CollapseAll));
    }

    #[test]
    fn vim_and_arrow_keys_move() {
        assert_eq!(handle_key(key(KeyCode::Char('j'))), Some(NavEvent::Down));
        assert_eq!(handle_key(key(KeyCode::Down)), Some(NavEvent::Down));
        assert_eq!(handle_key(key(KeyCode::Char('k'))), Some(NavEvent::Up));
        assert_eq!(handle_key(key(KeyCode::Char('G'))), Some(NavEvent::Bottom));
    }

    #[test]
    fn tab_and_backtab_switch_views() {
        assert_eq!(handle_key(key(KeyCode::Tab)), Some(NavEvent::NextView));
        assert_eq!(handle_key(key(KeyCode::BackTab)), Some(NavEvent::PrevView));
    }

    #[test]
    fn unbound_key_ignored() {
        assert_eq!(handle_key(key(KeyCode::Char('x'))), None);
    }
}
