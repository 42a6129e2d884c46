mod app;
mod audio;
mod click;
mod config;
mod keys;
mod metronome;
mod selector;
mod theme;
mod ui;

use std::fs::File;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use app::{App, Settings};
use audio::AudioEngine;
use click::Clicker;
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use keys::Key;
use ratatui::{backend::CrosstermBackend, Terminal};

const USAGE: &str = "\
chordtrainer - diatonic seventh-chord drill with metronome

USAGE:
    chordtrainer [--key <KEY>] [--tempo <BPM>] [--verbose]

OPTIONS:
    -k, --key <KEY>      Start in KEY (C, C#, Db, ... Bb, B, Cb)
    -t, --tempo <BPM>    Metronome tempo, 30-240
    -v, --verbose        Debug-level logging
    -h, --help           Print this help";

/// Command-line overrides on top of the config file.
#[derive(Debug, Default, PartialEq)]
struct Args {
    key:     Option<Key>,
    tempo:   Option<u32>,
    verbose: bool,
    help:    bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-v" | "--verbose" => out.verbose = true,
            "-h" | "--help"    => out.help = true,
            "-k" | "--key" => {
                let v = it.next().context("--key needs a value")?;
                out.key = Some(v.parse()?);
            }
            "-t" | "--tempo" => {
                let v = it.next().context("--tempo needs a value")?;
                out.tempo = Some(v.parse().with_context(|| format!("invalid tempo `{}`", v))?);
            }
            other => bail!("unknown argument `{}`\n\n{}", other, USAGE),
        }
    }
    Ok(out)
}

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = config::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("chordtrainer.log");
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = File::create(&log_path)
        .or_else(|_| File::create(std::env::temp_dir().join("chordtrainer.log")));
    match file {
        Ok(file) => {
            if WriteLogger::init(log_level, simplelog::Config::default(), file).is_err() {
                eprintln!("logger already initialised");
            }
        }
        Err(e) => eprintln!("cannot create log file: {}", e),
    }

    log::info!("chordtrainer starting (log level: {:?})", log_level);
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }
    init_logging(args.verbose);

    let config = Config::load();
    let settings = Settings {
        key:      args.key.unwrap_or_else(|| config.key()),
        tempo:    args.tempo.unwrap_or_else(|| config.tempo()),
        volume:   config.volume(),
        accent:   config.accent(),
        disabled: config.disabled(),
    };
    log::info!("key {}, {} bpm", settings.key, settings.tempo);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run(&mut terminal, settings);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    if let Err(e) = result {
        log::error!("{:?}", e);
        eprintln!("Error: {:?}", e);
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, settings: Settings) -> Result<()> {
    let clicker = Arc::new(Mutex::new(Clicker::new(44100.0)));
    // Declared before `app` so it is dropped after it.
    let audio = match AudioEngine::new(Arc::clone(&clicker)) {
        Ok(engine) => Some(engine),
        Err(e) => {
            log::warn!("audio disabled: {:#}", e);
            None
        }
    };
    let mut app = App::new(Arc::clone(&clicker), settings);
    if audio.is_none() {
        app.status_msg = "No audio output: metronome is silent".to_string();
    }

    loop {
        app.tick(Instant::now());
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(&mut app, key),
                _ => {}
            }
        }
        if app.should_quit { break; }
    }

    app.shutdown();
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();

    // Held keys only repeat the stepping controls.
    if key.kind == KeyEventKind::Repeat {
        match key.code {
            KeyCode::Up   | KeyCode::Char('+') | KeyCode::Char('=') => app.tempo_up(now),
            KeyCode::Down | KeyCode::Char('-')                      => app.tempo_down(now),
            KeyCode::Char(']') => app.volume_up(),
            KeyCode::Char('[') => app.volume_down(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.should_quit = true,

        KeyCode::Char(' ') | KeyCode::Enter => app.switch_chord(),
        KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_metronome(now),
        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
        KeyCode::Char('k') | KeyCode::Char('K') => app.cycle_key(),
        KeyCode::Char('o') | KeyCode::Char('O') => app.cycle_accent(),

        KeyCode::Up   | KeyCode::Char('+') | KeyCode::Char('=') => app.tempo_up(now),
        KeyCode::Down | KeyCode::Char('-')                      => app.tempo_down(now),
        KeyCode::Char(']') => app.volume_up(),
        KeyCode::Char('[') => app.volume_down(),

        KeyCode::Char(c @ '1'..='7') => app.toggle_degree(c as usize - '1' as usize),

        KeyCode::Char(c) => {
            if let Some((_, k)) = ui::NATURAL_KEYS.iter().find(|(kc, _)| *kc == c) {
                app.select_key(*k);
            } else if let Some((_, k, _)) = ui::ACCIDENTAL_KEYS.iter().find(|(kc, _, _)| *kc == c) {
                app.select_key(*k);
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Result<Args> {
        parse_args(v.iter().map(|s| s.to_string()))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let clicker = Arc::new(Mutex::new(Clicker::new(44_100.0)));
        App::with_rng(clicker, Settings::default(), fastrand::Rng::with_seed(11))
    }

    #[test]
    fn no_args_means_no_overrides() {
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn parses_key_tempo_and_verbose() {
        let a = args(&["--key", "F#", "-t", "120", "-v"]).unwrap();
        assert_eq!(a.key, Some(Key::FSharp));
        assert_eq!(a.tempo, Some(120));
        assert!(a.verbose);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&["--key", "H"]).is_err());
        assert!(args(&["--key"]).is_err());
        assert!(args(&["--tempo", "fast"]).is_err());
        assert!(args(&["--nope"]).is_err());
    }

    #[test]
    fn shifted_letters_select_black_key_buttons() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('C')));
        assert_eq!(app.key, Key::DFlat);
        handle_key(&mut app, press(KeyCode::Char('C')));
        assert_eq!(app.key, Key::CSharp);
        handle_key(&mut app, press(KeyCode::Char('f')));
        assert_eq!(app.key, Key::F);
    }

    #[test]
    fn digits_toggle_degrees() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('7')));
        assert!(app.selector.is_disabled(6));
        handle_key(&mut app, press(KeyCode::Char('7')));
        assert!(!app.selector.is_disabled(6));
    }

    #[test]
    fn quit_keys() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = test_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn plain_c_selects_key_not_quit() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('d')));
        handle_key(&mut app, press(KeyCode::Char('c')));
        assert_eq!(app.key, Key::C);
        assert!(!app.should_quit);
    }

    #[test]
    fn p_toggles_metronome() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('p')));
        assert!(app.metronome.running());
        handle_key(&mut app, press(KeyCode::Char('p')));
        assert!(!app.metronome.running());
    }
}
