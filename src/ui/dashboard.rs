// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// ┌ FloatWallet ───────────────────────────────────────┐
// │ ALU Simulator │ Wallet (BTC / ETH / USD)           │  header : onglets
// ├────────────────────────────────────────────────────┤
// │ contenu de l'onglet                                │
// ├────────────────────────────────────────────────────┤
// │ raccourcis clavier                                 │  footer
// └────────────────────────────────────────────────────┘
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, Status, Tab};
use crate::models::Currency;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    match app.current_tab {
        Tab::Alu => render_alu_tab(frame, app, chunks[1]),
        Tab::Wallet => render_wallet_tab(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : onglets
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(3), // Footer : raccourcis
        ])
        .split(area)
        .to_vec()
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
}

// ============================================================================
// Header : barre d'onglets
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = Tabs::new(Tab::TITLES.to_vec())
        .block(bordered(" FloatWallet - IEEE-754 ALU "))
        .select(app.current_tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

// ============================================================================
// Onglet ALU
// ============================================================================

fn render_alu_tab(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::raw(app.alu_input.as_str()),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]))
    .block(bordered(" Expression (ex: 10.5 + 20.25, 30 * 4, 50 / 3) "));
    frame.render_widget(input, chunks[0]);

    // Chaque compte rendu peut faire plusieurs lignes
    let lines: Vec<Line> = app
        .alu_log
        .iter()
        .flat_map(|entry| entry.lines())
        .map(|line| {
            let style = if line.starts_with("Error") {
                Style::default().fg(Color::Red)
            } else if line.starts_with("   Sign") {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(line.to_string(), style))
        })
        .collect();

    // Affiche toujours la fin du journal (2 lignes de bordure)
    let visible = chunks[1].height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let log = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .block(bordered(" Résultats "))
        .wrap(Wrap { trim: false });
    frame.render_widget(log, chunks[1]);
}

// ============================================================================
// Onglet Wallet
// ============================================================================

fn render_wallet_tab(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Taux
            Constraint::Length(3), // Saisie + devise
            Constraint::Length(6), // Soldes
            Constraint::Min(0),    // Statut
        ])
        .split(area);

    let rate_style = if app.rates.is_empty() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    let rates = Paragraph::new(Line::from(Span::styled(app.rate_line(), rate_style))).block(bordered(" Taux "));
    frame.render_widget(rates, chunks[0]);

    render_amount_input(frame, app, chunks[1]);
    render_balances(frame, app, chunks[2]);

    let status = match &app.status {
        Some(Status::Info(msg)) => Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Green))),
        Some(Status::Error(msg)) => Line::from(Span::styled(
            format!("Erreur : {}", msg),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled("Aucune opération", Style::default().fg(Color::Gray))),
    };
    frame.render_widget(Paragraph::new(status).block(bordered(" Statut ")), chunks[3]);
}

fn render_amount_input(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!("Montant ({} ou unités) : ", app.fiat()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(app.amount_input.as_str()),
        Span::styled("█   ", Style::default().fg(Color::Yellow)),
        Span::raw("Devise : "),
    ];

    for currency in Currency::ALL {
        let style = if currency == app.selected_currency {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", currency), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(bordered(" Saisie ")), area);
}

fn render_balances(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:<4}", app.fiat()), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}", app.fiat().format_amount(app.wallet.fiat()))),
    ])];

    for currency in Currency::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<4}", currency.symbol()), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                " {:.*}",
                currency.display_decimals(),
                app.wallet.balance(currency)
            )),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(bordered(" Soldes ")), area);
}

// ============================================================================
// Footer : raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help = if app.is_awaiting_quit_confirmation() {
        Span::styled(
            "ESC à nouveau pour quitter, n'importe quelle autre touche pour annuler",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        let text = match app.current_tab {
            Tab::Alu => "Tab: onglet | Entrée: calculer | ESC: quitter".to_string(),
            Tab::Wallet => format!(
                "Tab: onglet | d: dépôt | w: retrait | b: {fiat}→devise | s: devise→{fiat} | c: devise | ESC: quitter",
                fiat = app.fiat()
            ),
        };
        Span::styled(text, Style::default().fg(Color::Gray))
    };

    let paragraph = Paragraph::new(Line::from(help))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::app::WalletAction;
    use crate::models::{Fiat, RateCache};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_render_both_tabs() {
        let mut app = App::with_rates(RateCache::with_rates(3_000_000.0, 200_000.0, 83.0));
        app.run_alu();
        draw(&app);

        app.next_tab();
        app.amount_input = "100".to_string();
        app.perform(WalletAction::Deposit);
        draw(&app);

        app.request_quit();
        draw(&app);
    }

    #[test]
    fn test_render_configured_fiat() {
        let mut app = App::with_fiat(Fiat::new("eur"));
        app.next_tab();
        app.amount_input = "42".to_string();
        app.perform(WalletAction::Deposit);

        let screen = draw(&app);
        assert!(screen.contains("EUR  €42.00"));
        assert!(screen.contains("b: EUR→devise"));
        assert!(!screen.contains("INR"));
    }

    #[test]
    fn test_render_tiny_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        let app = App::new();
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
