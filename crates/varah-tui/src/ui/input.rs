//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Returns `true`
//! from `handle_input` when the application should exit.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_card_char, can_add_email_char, can_add_name_char, can_add_password_char, AddFocus,
    App, AppState, LoginFocus, Tab,
};

pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => handle_login_input(app, key).await,
        AppState::AddingEmployee => handle_add_input(app, key).await,
        AppState::ConfirmingDelete => handle_delete_confirm_input(app, key).await,
        AppState::ShowingHelp => {
            // Any key closes the help overlay
            app.state = AppState::Normal;
            Ok(false)
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => return Ok(true),
                KeyCode::Char('n') | KeyCode::Esc => app.state = AppState::Normal,
                _ => {}
            }
            Ok(false)
        }
        AppState::Normal => handle_normal_input(app, key),
        AppState::Quitting => Ok(true),
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,

        // Tab navigation
        KeyCode::Char('1') => app.current_tab = Tab::Employees,
        KeyCode::Char('2') => app.current_tab = Tab::Logs,
        KeyCode::Char('3') => app.current_tab = Tab::Kiosks,
        KeyCode::Tab => app.current_tab = app.current_tab.next(),
        KeyCode::BackTab => app.current_tab = app.current_tab.prev(),

        // Selection
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),

        // Roster actions (Employees tab only)
        KeyCode::Char('a') if app.current_tab == Tab::Employees => {
            app.start_add_employee();
        }
        KeyCode::Char('d') | KeyCode::Delete if app.current_tab == Tab::Employees => {
            app.start_delete_selected();
        }
        KeyCode::Char('r') => {
            app.status_message = None;
            app.refresh_employees_background();
        }

        KeyCode::Char('L') => app.logout(),

        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,

        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }

        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                let _ = app.attempt_login().await;
            }
        },

        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },

        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email if can_add_email_char(&app.login_email) => {
                app.login_email.push(c);
            }
            LoginFocus::Password if can_add_password_char(&app.login_password) => {
                app.login_password.push(c);
            }
            _ => {}
        },

        _ => {}
    }
    Ok(false)
}

async fn handle_add_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,

        KeyCode::Tab | KeyCode::Down => {
            app.add_focus = match app.add_focus {
                AddFocus::Name => AddFocus::CardId,
                AddFocus::CardId => AddFocus::Button,
                AddFocus::Button => AddFocus::Name,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.add_focus = match app.add_focus {
                AddFocus::Name => AddFocus::Button,
                AddFocus::CardId => AddFocus::Name,
                AddFocus::Button => AddFocus::CardId,
            };
        }

        KeyCode::Enter => match app.add_focus {
            AddFocus::Name => app.add_focus = AddFocus::CardId,
            AddFocus::CardId | AddFocus::Button => {
                let _ = app.submit_new_employee().await;
            }
        },

        KeyCode::Backspace => match app.add_focus {
            AddFocus::Name => {
                app.add_name.pop();
            }
            AddFocus::CardId => {
                app.add_card_id.pop();
            }
            AddFocus::Button => {}
        },

        KeyCode::Char(c) => match app.add_focus {
            AddFocus::Name if can_add_name_char(&app.add_name) => {
                app.add_name.push(c);
            }
            AddFocus::CardId if can_add_card_char(&app.add_card_id) => {
                app.add_card_id.push(c);
            }
            _ => {}
        },

        _ => {}
    }
    Ok(false)
}

async fn handle_delete_confirm_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            let _ = app.confirm_delete().await;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.pending_delete = None;
            app.state = AppState::Normal;
        }
        _ => {}
    }
    Ok(false)
}
