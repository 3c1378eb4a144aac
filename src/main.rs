// ============================================================================
// FloatWallet - Simulateur d'ALU IEEE-754 et portefeuille multi-devises
// ============================================================================
// Programme TUI à deux onglets :
// - ALU : calcule "a op b" en simple précision et affiche les bits
// - Wallet : dépôts, retraits et conversions aux taux CoinGecko
//
// Les taux sont rafraîchis par un poller en arrière-plan qui renvoie chaque
// instantané à la boucle d'événements via un channel mpsc.
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use floatwallet::api::{start_poller, RateFetcher};
use floatwallet::app::App;
use floatwallet::config::Config;
use floatwallet::models::{Fiat, RateCache, RateStore};
use floatwallet::ui::events::{
    get_char_from_event, is_backspace_event, is_cycle_currency_event, is_enter_event,
    is_interrupt_event, is_quit_event, is_tab_event, wallet_action_for, Event, EventHandler,
};
use floatwallet::ui::render;

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/floatwallet/logs/floatwallet.log.*
/// RUST_LOG=floatwallet=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = &config.log_dir;
    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "floatwallet.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Distingue l'UI du poller
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floatwallet=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'installation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });
    info!(?config, "FloatWallet starting up");

    // Cache de taux injecté : le poller écrit, l'UI lit ses instantanés
    let store = RateStore::new();
    let fetcher = RateFetcher::new(&config, store)?;

    // Le callback du poller pousse chaque instantané vers l'UI
    // CONCEPT RUST : mpsc channel
    // - rates_tx est déplacé dans le callback (thread du poller)
    // - rates_rx reste dans la boucle d'événements
    let (rates_tx, rates_rx) = mpsc::channel::<RateCache>();
    let poller = start_poller(fetcher, config.poll_interval, move |cache| {
        rates_tx.send(cache).context("UI fermée, instantané ignoré")
    })?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::with_fiat(Fiat::new(&config.fiat));
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &rates_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    info!("Stopping rate poller");
    poller.stop();

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Intégrer les taux reçus du poller
//   1. Dessiner l'interface
//   2. Traiter l'entrée clavier
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    rates_rx: &mpsc::Receiver<RateCache>,
) -> Result<()> {
    while app.is_running() {
        // Plusieurs instantanés en attente : le plus récent gagne
        while let Ok(rates) = rates_rx.try_recv() {
            app.update_rates(rates);
        }

        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => error!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(_) if is_interrupt_event(&event) => {
            info!("User interrupted");
            app.quit();
        }

        // ESC : quit confirmation two-step
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_tab_event(&event) => {
            app.cancel_quit();
            app.next_tab();
        }

        Event::Key(_) if is_backspace_event(&event) => {
            app.cancel_quit();
            app.backspace();
        }

        // Entrée : évalue l'expression (onglet ALU)
        Event::Key(_) if is_enter_event(&event) && app.is_on_alu() => {
            app.cancel_quit();
            app.run_alu();
        }

        Event::Key(_) if is_cycle_currency_event(&event) && app.is_on_wallet() => {
            app.cancel_quit();
            app.cycle_currency();
            debug!(currency = %app.selected_currency, "User selected currency");
        }

        Event::Key(_) if app.is_on_wallet() && wallet_action_for(&event).is_some() => {
            app.cancel_quit();
            if let Some(action) = wallet_action_for(&event) {
                app.perform(action);
            }
        }

        // Tout autre caractère va dans le buffer de l'onglet courant
        Event::Key(_) => {
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
