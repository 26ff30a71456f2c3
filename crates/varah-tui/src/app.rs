//! Application state management for the Varah TUI.
//!
//! The `App` struct owns the session, the API client, and all UI state:
//! which view is active, the login and add-employee forms, the employee
//! roster, and the background refresh channel.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use varah_core::api::{ApiClient, ApiError};
use varah_core::auth::{CredentialStore, Session};
use varah_core::config::Config;
use varah_core::models::Employee;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background refresh message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for email input.
pub const MAX_EMAIL_LENGTH: usize = 50;

/// Maximum length for password input.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for an employee name.
pub const MAX_NAME_LENGTH: usize = 60;

/// Maximum length for an NFC card id.
pub const MAX_CARD_ID_LENGTH: usize = 32;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs, mirroring the service's sections. Logs and Kiosks
/// have no read endpoints yet and render as placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Employees,
    Logs,
    Kiosks,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Employees => "Employees",
            Tab::Logs => "Logs",
            Tab::Kiosks => "Kiosks",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Employees => Tab::Logs,
            Tab::Logs => Tab::Kiosks,
            Tab::Kiosks => Tab::Employees,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Employees => Tab::Kiosks,
            Tab::Logs => Tab::Employees,
            Tab::Kiosks => Tab::Logs,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    AddingEmployee,
    ConfirmingDelete,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Add-employee form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddFocus {
    Name,
    CardId,
    Button,
}

/// Check whether another character fits in the email field
pub fn can_add_email_char(current: &str) -> bool {
    current.len() < MAX_EMAIL_LENGTH
}

/// Check whether another character fits in the password field
pub fn can_add_password_char(current: &str) -> bool {
    current.len() < MAX_PASSWORD_LENGTH
}

/// Check whether another character fits in the employee name field
pub fn can_add_name_char(current: &str) -> bool {
    current.len() < MAX_NAME_LENGTH
}

/// Check whether another character fits in the NFC card id field
pub fn can_add_card_char(current: &str) -> bool {
    current.len() < MAX_CARD_ID_LENGTH
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from the background roster refresh task.
enum RefreshResult {
    /// Employee roster fetched successfully
    Employees(Vec<Employee>),
    /// The server answered 401; the session is already cleared
    Unauthorized,
    /// Any other failure, with the message to display
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub status_message: Option<String>,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub loading: bool,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Add-employee form state
    pub add_name: String,
    pub add_card_id: String,
    pub add_focus: AddFocus,
    pub add_error: Option<String>,

    // Roster
    pub employees: Vec<Employee>,
    pub employee_selection: usize,
    pub pending_delete: Option<i64>,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let session = Session::new();
        let api = ApiClient::new(session.clone())?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill credentials from env vars, falling back to the last
        // email in config and its stored keychain password
        let login_email = std::env::var("VARAH_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();

        let login_password = std::env::var("VARAH_PASSWORD")
            .ok()
            .or_else(|| {
                if !login_email.is_empty() && CredentialStore::has_credentials(&login_email) {
                    CredentialStore::get_password(&login_email).ok()
                } else {
                    None
                }
            })
            .unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            current_tab: Tab::Employees,
            status_message: None,
            last_refreshed: None,
            loading: false,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            add_name: String::new(),
            add_card_id: String::new(),
            add_focus: AddFocus::Name,
            add_error: None,

            employees: Vec::new(),
            employee_selection: 0,
            pending_delete: None,

            refresh_rx: rx,
            refresh_tx: tx,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.login(&email, &password).await {
            Ok(()) => {
                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");

                self.refresh_employees_background();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                // Server messages are shown verbatim; only transport
                // failures get rephrased
                let user_message = match &e {
                    ApiError::Network(_) => {
                        "Unable to connect to server. Check your internet connection.".to_string()
                    }
                    ApiError::Timeout => "Connection timed out. Please try again.".to_string(),
                    other => other.to_string(),
                };
                self.login_error = Some(user_message);
                Err(e.into())
            }
        }
    }

    /// Explicit logout: clear the session and return to the login view
    pub fn logout(&mut self) {
        self.session.logout();
        self.employees.clear();
        self.employee_selection = 0;
        self.status_message = Some("Logged out".to_string());
        self.start_login();
    }

    /// React to a 401 surfaced by any request. The client has already
    /// cleared the session; the app's job is to fall back to the login view.
    fn handle_unauthorized(&mut self) {
        self.employees.clear();
        self.employee_selection = 0;
        self.start_login();
        self.login_error = Some("Session expired - please log in again".to_string());
    }

    // =========================================================================
    // Roster operations
    // =========================================================================

    /// Fetch the employee roster in a background task. Results arrive via
    /// the refresh channel and are applied in `check_background_tasks`.
    pub fn refresh_employees_background(&mut self) {
        if self.loading {
            return;
        }
        self.loading = true;

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            let result = match api.fetch_employees().await {
                Ok(employees) => RefreshResult::Employees(employees),
                Err(ApiError::Unauthorized) => RefreshResult::Unauthorized,
                Err(e) => RefreshResult::Error(e.to_string()),
            };
            let _ = tx.send(result).await;
        });
    }

    /// Drain completed background task results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.refresh_rx.try_recv() {
            self.loading = false;
            match result {
                RefreshResult::Employees(employees) => {
                    self.employees = employees;
                    self.last_refreshed = Some(Utc::now());
                    self.clamp_selection();
                }
                RefreshResult::Unauthorized => {
                    self.handle_unauthorized();
                }
                RefreshResult::Error(msg) => {
                    self.status_message = Some(format!("Error: {}", msg));
                }
            }
        }
    }

    /// Show the add-employee form
    pub fn start_add_employee(&mut self) {
        self.state = AppState::AddingEmployee;
        self.add_name.clear();
        self.add_card_id.clear();
        self.add_focus = AddFocus::Name;
        self.add_error = None;
    }

    /// Submit the add-employee form
    pub async fn submit_new_employee(&mut self) -> Result<()> {
        let name = self.add_name.trim().to_string();
        let card_id = self.add_card_id.trim().to_string();

        if name.is_empty() || card_id.is_empty() {
            self.add_error = Some("Name and card id required".to_string());
            return Ok(());
        }

        self.add_error = None;

        match self.api.create_employee(&name, &card_id).await {
            Ok(message) => {
                self.status_message =
                    Some(message.unwrap_or_else(|| "Employee added".to_string()));
                self.state = AppState::Normal;
                self.refresh_employees_background();
                Ok(())
            }
            Err(ApiError::Unauthorized) => {
                self.handle_unauthorized();
                Ok(())
            }
            Err(e) => {
                // Keep the form open with the values intact so the user
                // can correct and resubmit
                self.add_error = Some(format!("Error: {}", e));
                Ok(())
            }
        }
    }

    /// Ask for confirmation before deleting the selected employee
    pub fn start_delete_selected(&mut self) {
        if let Some(employee) = self.selected_employee() {
            self.pending_delete = Some(employee.id);
            self.state = AppState::ConfirmingDelete;
        }
    }

    /// Delete the employee confirmed in the delete overlay. The roster is
    /// refreshed afterwards whether or not the delete succeeded.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        self.state = AppState::Normal;
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };

        match self.api.delete_employee(id).await {
            Ok(()) => {
                self.status_message = Some("Employee deleted".to_string());
            }
            Err(ApiError::Unauthorized) => {
                self.handle_unauthorized();
                return Ok(());
            }
            Err(e) => {
                self.status_message = Some(format!("Error: {}", e));
            }
        }

        self.refresh_employees_background();
        Ok(())
    }

    // =========================================================================
    // Selection helpers
    // =========================================================================

    pub fn selected_employee(&self) -> Option<&Employee> {
        self.employees.get(self.employee_selection)
    }

    pub fn select_next(&mut self) {
        if !self.employees.is_empty() {
            self.employee_selection =
                (self.employee_selection + 1).min(self.employees.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.employee_selection = self.employee_selection.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.employee_selection >= self.employees.len() {
            self.employee_selection = self.employees.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Employees.next(), Tab::Logs);
        assert_eq!(Tab::Kiosks.next(), Tab::Employees);
        assert_eq!(Tab::Employees.prev(), Tab::Kiosks);

        // A full forward cycle returns to the start
        let mut tab = Tab::Employees;
        for _ in 0..3 {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Employees);
    }

    #[test]
    fn test_input_length_caps() {
        assert!(can_add_email_char(""));
        assert!(!can_add_email_char(&"a".repeat(MAX_EMAIL_LENGTH)));
        assert!(can_add_password_char(&"a".repeat(MAX_PASSWORD_LENGTH - 1)));
        assert!(!can_add_password_char(&"a".repeat(MAX_PASSWORD_LENGTH)));
        assert!(can_add_name_char(&"a".repeat(MAX_NAME_LENGTH - 1)));
        assert!(!can_add_name_char(&"a".repeat(MAX_NAME_LENGTH)));
        assert!(can_add_card_char(""));
        assert!(!can_add_card_char(&"a".repeat(MAX_CARD_ID_LENGTH)));
    }
}
