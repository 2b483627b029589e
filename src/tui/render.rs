//! UI rendering functions for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::browse::{CatalogStatus, DataSource, Lifecycle, NavigationCoordinator, IDLE_LABEL};
use crate::types::Episode;

use super::state::App;
use super::types::Screen;

/// Draw the UI.
pub fn draw<S: DataSource>(frame: &mut Frame, app: &mut App, nav: &NavigationCoordinator<S>) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search bar
            Constraint::Min(0),    // Content (shows + episodes)
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, nav, chunks[0]);
    draw_search_bar(frame, app, nav, chunks[1]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);

    draw_show_list(frame, app, nav, content_chunks[0]);
    draw_episode_panel(frame, app, nav, content_chunks[1]);

    draw_footer(frame, app, chunks[3]);

    // Episode errors stay in their panel so another show can still be picked.
    if let CatalogStatus::Failed(message) = nav.catalog_status() {
        draw_error_popup(frame, app, message);
    }

    if app.show_help {
        draw_help_modal(frame, app);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn highlight_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn retry_hint(app: &App) -> String {
    format!("Press '{}' to retry.", app.keybindings.label(&app.keybindings.retry))
}

fn draw_header<S: DataSource>(frame: &mut Frame, nav: &NavigationCoordinator<S>, area: Rect) {
    let (status, status_style) = match nav.lifecycle() {
        Lifecycle::Idle => ("idle".to_string(), Style::default().fg(Color::DarkGray)),
        Lifecycle::Loading(_) => ("loading".to_string(), Style::default().fg(Color::Yellow)),
        Lifecycle::Browsing(_) => ("browsing".to_string(), Style::default().fg(Color::Green)),
        Lifecycle::Error { .. } => ("error".to_string(), Style::default().fg(Color::Red)),
    };

    let mut spans = vec![
        Span::styled(
            "tvmaze-browser",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", status), status_style),
    ];
    if let Some(show) = nav.active_show() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(show.name.clone(), Style::default().fg(Color::White)));
        if !show.url.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(show.url.clone(), Style::default().fg(Color::DarkGray)));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_search_bar<S: DataSource>(
    frame: &mut Frame,
    app: &App,
    nav: &NavigationCoordinator<S>,
    area: Rect,
) {
    let (query, title, scope) = match app.screen {
        Screen::ShowList => (nav.show_query(), "Search shows", "shows"),
        Screen::EpisodeList => (nav.episode_query(), "Search episodes", "episodes"),
    };

    let search_text = if query.is_empty() && !app.search_focused {
        let key = app.keybindings.label(&app.keybindings.search);
        format!("Press '{}' to search {}...", key, scope)
    } else {
        query.to_string()
    };

    let search = Paragraph::new(search_text)
        .style(if app.search_focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(app.search_focused)),
        );

    frame.render_widget(search, area);

    if app.search_focused {
        frame.set_cursor_position((area.x + query.chars().count() as u16 + 1, area.y + 1));
    }
}

fn draw_show_list<S: DataSource>(
    frame: &mut Frame,
    app: &mut App,
    nav: &NavigationCoordinator<S>,
    area: Rect,
) {
    let border_style = focus_style(app.screen == Screen::ShowList);

    let message = match nav.catalog_status() {
        CatalogStatus::NotLoaded | CatalogStatus::Loading => Some("Loading shows...".to_string()),
        CatalogStatus::Failed(_) => Some(format!("Could not load shows. {}", retry_hint(app))),
        CatalogStatus::Ready => None,
    };

    if let Some(message) = message {
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Shows")
                    .border_style(border_style),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, area);
        return;
    }

    let active = nav.browse_state().active_show;
    let items: Vec<ListItem> = nav
        .catalog_view()
        .iter()
        .map(|s| {
            let item = ListItem::new(s.to_display());
            if Some(s.id) == active {
                item.style(Style::default().fg(Color::Green))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Shows ({})", nav.catalog_count_label()))
                .border_style(border_style),
        )
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.show_list_state);
}

fn draw_episode_panel<S: DataSource>(
    frame: &mut Frame,
    app: &mut App,
    nav: &NavigationCoordinator<S>,
    area: Rect,
) {
    let border_style = focus_style(app.screen == Screen::EpisodeList);
    let state = nav.state();

    let message = match state.lifecycle {
        Lifecycle::Idle => Some(IDLE_LABEL.to_string()),
        Lifecycle::Loading(_) => Some("Loading episodes...".to_string()),
        Lifecycle::Error { message, .. } => Some(format!("{}\n\n{}", message, retry_hint(app))),
        Lifecycle::Browsing(_) => None,
    };

    if let Some(message) = message {
        let placeholder = Paragraph::new(message)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Episodes")
                    .border_style(border_style),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let items: Vec<ListItem> = state
        .display
        .iter()
        .map(|e| {
            if app.show_airdates && !e.airdate.is_empty() {
                ListItem::new(format!("{}  ({})", e.to_display(), e.airdate))
            } else {
                ListItem::new(e.to_display())
            }
        })
        .collect();

    let title = if nav.pinned_episode().is_some() {
        format!("Episodes ({}, pinned)", state.count_label)
    } else if !nav.episode_query().is_empty() {
        format!("Episodes ({}, filtered)", state.count_label)
    } else {
        format!("Episodes ({})", state.count_label)
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        )
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], &mut app.episode_list_state);

    let details = app
        .episode_list_state
        .selected()
        .and_then(|i| state.display.get(i))
        .map(|e| episode_details(app, e))
        .unwrap_or_default();

    let details_widget = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });

    frame.render_widget(details_widget, chunks[1]);
}

/// Text for the details panel of one episode.
fn episode_details(app: &App, episode: &Episode) -> String {
    let mut lines = vec![format!("{}  {}", episode.code(), episode.name)];

    if app.show_airdates && !episode.airdate.is_empty() {
        lines.push(format!("Aired: {}", episode.airdate));
    }
    if let Some(runtime) = episode.runtime {
        lines.push(format!("Runtime: {} min", runtime));
    }
    if app.show_ratings {
        if let Some(rating) = episode.rating {
            lines.push(format!("Rating: {:.1}", rating));
        }
    }
    if !episode.summary.is_empty() {
        lines.push(String::new());
        lines.push(episode.summary.clone());
    }
    if !episode.url.is_empty() {
        lines.push(String::new());
        lines.push(format!("View on TVMaze: {}", episode.url));
    }

    lines.join("\n")
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.search_focused {
        "[type] filter  [Enter/Esc] done".to_string()
    } else {
        let keys = &app.keybindings;
        match app.screen {
            Screen::ShowList => format!(
                "[{}] search  [{}] switch  [{}] select  [{}] none  [{}] help  [{}] quit",
                keys.label(&keys.search),
                keys.label(&keys.toggle_focus),
                keys.label(&keys.select),
                keys.label(&keys.clear_selection),
                keys.label(&keys.help),
                keys.label(&keys.quit),
            ),
            Screen::EpisodeList => format!(
                "[{}] search  [{}] pin  [{}] unpin  [{}] all  [{}] back  [{}] help  [{}] quit",
                keys.label(&keys.search),
                keys.label(&keys.select),
                keys.label(&keys.clear_selection),
                keys.label(&keys.show_all),
                keys.label(&keys.back),
                keys.label(&keys.help),
                keys.label(&keys.quit),
            ),
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_error_popup(frame: &mut Frame, app: &App, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(format!("{}\n\n{}", error, retry_hint(app)))
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let (title, content) = get_help_content(app);

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Help - {}", title))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

fn get_help_content(app: &App) -> (&'static str, String) {
    let keys = &app.keybindings;

    let mut content = String::from("Global Commands\n───────────────\n");
    content.push_str(&help_row(&keys.help, "Show/hide this help"));
    content.push_str(&help_row("ctrl+c", "Force quit"));
    content.push_str(&help_row(&format!("{},{}", keys.search, keys.filter), "Focus search bar"));
    content.push_str(&help_row(&keys.toggle_focus, "Switch between shows and episodes"));
    content.push_str(&help_row(&keys.retry, "Retry a failed load"));
    content.push_str(&help_row(&keys.quit, "Quit"));

    let title = match app.screen {
        Screen::ShowList => {
            content.push_str("\nShows\n─────\n");
            content.push_str(&help_row(&keys.down, "Move down"));
            content.push_str(&help_row(&keys.up, "Move up"));
            content.push_str(&help_row(&keys.select, "Open the show's episodes"));
            content.push_str(&help_row(&keys.clear_selection, "Select no show"));
            "Shows"
        }
        Screen::EpisodeList => {
            content.push_str("\nEpisodes\n────────\n");
            content.push_str(&help_row(&keys.down, "Move down"));
            content.push_str(&help_row(&keys.up, "Move up"));
            content.push_str(&help_row(&keys.select, "Show only this episode (clears search)"));
            content.push_str(&help_row(&keys.clear_selection, "Unpin the episode"));
            content.push_str(&help_row(&keys.show_all, "Show all (clears search and pin)"));
            content.push_str(&help_row(&keys.back, "Back to shows"));
            "Episodes"
        }
    };

    content.push_str("\nSearch Bar\n──────────\n");
    content.push_str(&help_row("(type)", "Filter the focused list as you type"));
    content.push_str(&help_row("backspace", "Delete character"));
    content.push_str(&help_row("enter,esc", "Leave the search bar"));
    content.push_str(&format!("\nPress {} to close", keys.label(&keys.help)));

    (title, content)
}

/// One line of the help modal: every key of `binding`, then what it does.
fn help_row(binding: &str, description: &str) -> String {
    let keys: Vec<&str> = binding.split(',').map(str::trim).collect();
    format!("  {:<18}{}\n", keys.join(", "), description)
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
