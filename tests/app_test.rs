mod common;

use common::{sample_orders, write_dataset};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use orderdash::{App, AppConfig, AppEvent, DatasetLocator, Section, SellerGroup};
use std::sync::mpsc::channel;
use tempfile::TempDir;

fn new_app() -> App {
    let (tx, _rx) = channel::<AppEvent>();
    App::new(tx, AppConfig::default()).unwrap()
}

/// Feed `event` and every follow-up event the app returns, like the main loop does.
fn drive(app: &mut App, event: AppEvent) {
    let mut next = Some(event);
    while let Some(event) = next {
        assert!(
            !matches!(event, AppEvent::Crash(_)),
            "app crashed: {:?}",
            event
        );
        next = app.event(&event);
    }
}

fn press(app: &mut App, code: KeyCode) {
    drive(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
}

fn loaded_app() -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let path = write_dataset(dir.path(), &sample_orders());
    let mut app = new_app();
    drive(&mut app, AppEvent::Open(DatasetLocator::explicit(path)));
    (dir, app)
}

#[test]
fn test_open_loads_and_renders() {
    let (_dir, app) = loaded_app();
    let results = app.results().expect("results after load");
    assert_eq!(results.metrics.order_count, 5);
    assert!(app.notice().is_none());
    assert!(!app.loading_state().is_loading());
    assert_eq!(app.dataset_loads(), 1);
}

#[test]
fn test_open_shows_loading_before_reading() {
    let dir = TempDir::new().unwrap();
    let path = write_dataset(dir.path(), &sample_orders());
    let mut app = new_app();
    let next = app.event(&AppEvent::Open(DatasetLocator::explicit(&path)));
    assert!(matches!(next, Some(AppEvent::DoLoad(_))));
    assert!(app.loading_state().is_loading());
    assert!(app.results().is_none());
}

#[test]
fn test_missing_dataset_becomes_notice() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    drive(
        &mut app,
        AppEvent::Open(DatasetLocator::explicit(dir.path().join("missing.csv"))),
    );
    assert!(app.results().is_none());
    let notice = app.notice().expect("notice for missing file");
    assert!(notice.contains("not found"));
    assert!(notice.contains("missing.csv"));
}

#[test]
fn test_deselecting_every_group_shows_notice() {
    let (_dir, mut app) = loaded_app();

    press(&mut app, KeyCode::Char('k'));
    assert!(app.results().is_some());
    assert_eq!(
        app.selections().groups.groups(),
        vec![SellerGroup::Other]
    );

    press(&mut app, KeyCode::Char('o'));
    assert!(app.selections().groups.is_empty());
    assert!(app.results().is_none());
    assert!(app.notice().is_some());

    press(&mut app, KeyCode::Char('k'));
    let results = app.results().expect("results once a group is back");
    assert!(app.notice().is_none());
    assert_eq!(results.metrics.order_count, 2);
    // The base table is reused, never re-read
    assert_eq!(app.dataset_loads(), 1);
}

#[test]
fn test_section_navigation() {
    let (_dir, mut app) = loaded_app();
    assert_eq!(app.section(), Section::RevenueChannel);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.section(), Section::SellersLoyalty);
    press(&mut app, KeyCode::BackTab);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.section(), Section::RawData);
    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.section(), Section::Regions);
}

#[test]
fn test_region_selection_follows_arrow_keys() {
    let (_dir, mut app) = loaded_app();
    press(&mut app, KeyCode::Char('3'));

    let regions: Vec<String> = app
        .results()
        .unwrap()
        .regional_revenue
        .iter()
        .map(|r| r.region.clone())
        .collect();
    assert_eq!(app.selections().region.as_deref(), Some(regions[0].as_str()));

    press(&mut app, KeyCode::Down);
    let results = app.results().unwrap();
    assert_eq!(results.selected_region.as_deref(), Some(regions[1].as_str()));
    assert!(results
        .region_combos
        .iter()
        .all(|c| !c.channel.is_empty() && !c.seller.is_empty()));

    press(&mut app, KeyCode::Up);
    press(&mut app, KeyCode::Up);
    assert_eq!(
        app.results().unwrap().selected_region.as_deref(),
        Some(regions[0].as_str())
    );
}

#[test]
fn test_reload_reads_the_file_again() {
    let (_dir, mut app) = loaded_app();
    press(&mut app, KeyCode::Char('R'));
    assert_eq!(app.dataset_loads(), 2);
    assert!(app.results().is_some());
}

#[test]
fn test_quit_keys() {
    let mut app = new_app();
    let quit = app.event(&AppEvent::Key(KeyEvent::new(
        KeyCode::Char('q'),
        KeyModifiers::NONE,
    )));
    assert!(matches!(quit, Some(AppEvent::Exit)));
    let ctrl_c = app.event(&AppEvent::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )));
    assert!(matches!(ctrl_c, Some(AppEvent::Exit)));
}

#[test]
fn test_render_does_not_panic() {
    use ratatui::{backend::TestBackend, Terminal};

    let (_dir, mut app) = loaded_app();
    let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
    for key in ['1', '2', '3', '4', '5'] {
        press(&mut app, KeyCode::Char(key));
        terminal
            .draw(|frame| frame.render_widget(&mut app, frame.area()))
            .unwrap();
    }
    press(&mut app, KeyCode::Char('k'));
    press(&mut app, KeyCode::Char('o'));
    terminal
        .draw(|frame| frame.render_widget(&mut app, frame.area()))
        .unwrap();
}
