use clap::Parser;
use color_eyre::Result;
use orderdash::error_display::{user_message, user_message_from_report};
use orderdash::logging::{self, LogTarget};
use orderdash::{
    report, App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, DatasetLocator,
    GroupSelection, SellerGroup, Selections, APP_NAME,
};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let locator = DatasetLocator::from_config(&config.data, args.path.as_deref());
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new(tx.clone(), config)?.with_selections(selections_from_args(args));
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(locator))?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn selections_from_args(args: &Args) -> Selections {
    let groups = if args.groups.is_empty() {
        GroupSelection::all()
    } else {
        GroupSelection::from_groups(args.groups.iter().map(|g| SellerGroup::from(*g)))
    };
    Selections {
        groups,
        region: args.region.clone(),
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(APP_NAME)?,
    };
    if let Some(delimiter) = args.delimiter {
        config.data.delimiter = Some(delimiter);
    }
    if let Some(validation) = args.validation {
        config.validation.mode = validation.into();
    }
    Ok(config)
}

fn run_report(args: &Args, config: &AppConfig) -> Result<()> {
    let locator = DatasetLocator::from_config(&config.data, args.path.as_deref());
    let results = match report::compute(config, &locator, &selections_from_args(args)) {
        Ok(results) => results,
        Err(e) => {
            tracing::error!(error = %e, "report failed");
            eprintln!("{}", user_message(&e));
            std::process::exit(1);
        }
    };
    if args.json {
        println!("{}", report::render_json(&results)?);
    } else {
        print!("{}", report::render_text(&results, &config.grouping));
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        match ConfigManager::new(APP_NAME).and_then(|m| m.write_default_config(args.force)) {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", user_message_from_report(&e, args.config.as_deref()));
            std::process::exit(1);
        }
    };

    if args.report {
        logging::init(&config.logging, args.debug, &LogTarget::Stderr)?;
        return run_report(&args, &config);
    }

    // The terminal belongs to the TUI, so logs go to a file
    let log_file = config.logging.file.clone().or_else(|| {
        CacheManager::new(APP_NAME)
            .ok()
            .map(|cache| cache.cache_file("orderdash.log"))
    });
    if let Some(path) = log_file {
        if let Err(e) = logging::init(&config.logging, args.debug, &LogTarget::File(path)) {
            eprintln!("Warning: {}", e);
        }
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        tracing::error!(error = %e, "exiting after error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
