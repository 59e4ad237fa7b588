/*!
 * Interactive lookup terminal
 *
 * Two panels share one prompt loop: the search panel submits identifiers
 * through the [`QueryOrchestrator`], the admin panel sits behind the PIN
 * gate and shows the audit log. Leaving the admin panel always re-locks it.
 */

use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use tokio::runtime::Runtime;

use crate::admin::{AdminConsole, PIN_MAX_LEN};
use crate::cli_style::{
    audit_entry_label, audit_table, header_box, print_error, print_info, print_success,
    print_warning, results_table, section_header, Icons, Theme,
};
use crate::error::{QueryDeskError, Result};
use crate::orchestrator::{QueryOrchestrator, SearchState};
use crate::viewer::render_details;

pub struct Terminal {
    runtime: Runtime,
    orchestrator: QueryOrchestrator,
    admin: AdminConsole,
    theme: ColorfulTheme,
}

impl Terminal {
    pub fn new(runtime: Runtime, orchestrator: QueryOrchestrator, admin: AdminConsole) -> Self {
        Self {
            runtime,
            orchestrator,
            admin,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run until the operator quits
    pub fn run(&mut self) -> Result<()> {
        header_box("QUERYDESK", Some("All queries are logged and monitored"));

        loop {
            let choice = Select::with_theme(&self.theme)
                .with_prompt("Select panel")
                .items(&[
                    format!("{} Search", Icons::SEARCH),
                    format!("{} Admin console", Icons::LOCK),
                    "Quit".to_string(),
                ])
                .default(0)
                .interact()?;

            match choice {
                0 => self.search_panel()?,
                1 => {
                    let result = self.admin_panel();
                    self.admin.exit();
                    result?;
                }
                _ => break,
            }
        }

        Ok(())
    }

    fn search_panel(&mut self) -> Result<()> {
        section_header("SECURE QUERY");
        print_info("Required format (no dashes): mobile 923001234567, CNIC 3440112345670");

        loop {
            let action = Select::with_theme(&self.theme)
                .with_prompt("Search")
                .items(&["Scan", "Reset", "Back"])
                .default(0)
                .interact()?;

            match action {
                0 => {
                    let query: String = Input::with_theme(&self.theme)
                        .with_prompt("Target identifier")
                        .with_initial_text(self.orchestrator.query())
                        .allow_empty(true)
                        .interact_text()?;

                    print_info("Scanning...");
                    let orchestrator = &self.orchestrator;
                    if self
                        .runtime
                        .block_on(orchestrator.submit_query(&query))
                        .is_none()
                    {
                        continue;
                    }
                    render_state(&self.orchestrator.state());
                }
                1 => {
                    self.orchestrator.reset();
                    print_info("Query cleared");
                }
                _ => return Ok(()),
            }
        }
    }

    fn admin_panel(&mut self) -> Result<()> {
        section_header("ADMIN OVERRIDE");

        if !self.admin.gate().is_unlocked() {
            let pin = Password::with_theme(&self.theme)
                .with_prompt("Restricted Area // Enter Passcode")
                .allow_empty_password(true)
                .validate_with(|input: &String| -> std::result::Result<(), String> {
                    if input.chars().count() <= PIN_MAX_LEN {
                        Ok(())
                    } else {
                        Err(format!("Passcode is at most {} characters", PIN_MAX_LEN))
                    }
                })
                .interact()?;

            match self.admin.submit_pin(&pin) {
                Ok(()) => print_success("CONNECTION ESTABLISHED"),
                Err(QueryDeskError::AccessDenied) => {
                    acknowledge(&QueryDeskError::AccessDenied.to_string())?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }

        loop {
            let viewer = match self.admin.viewer() {
                Some(viewer) => viewer,
                None => return Ok(()),
            };

            if viewer.entries().is_empty() {
                print_warning("NO LOGS FOUND");
            } else {
                println!("{}", audit_table(viewer.entries()));
                if let Some(entry) = viewer
                    .expanded()
                    .and_then(|id| viewer.entries().iter().find(|e| e.id == id))
                {
                    println!("{}", Theme::muted(render_details(&entry.details)));
                }
            }

            let mut items: Vec<String> = viewer
                .entries()
                .iter()
                .map(|e| audit_entry_label(e, viewer.is_expanded(e.id)))
                .collect();
            let ids: Vec<_> = viewer.entries().iter().map(|e| e.id).collect();
            items.push("Refresh".to_string());
            items.push(format!("{} Purge logs", Icons::WARNING));
            items.push("Exit system".to_string());

            let choice = Select::with_theme(&self.theme)
                .with_prompt(format!("{} System logs", Icons::SHIELD))
                .items(&items)
                .default(items.len() - 1)
                .max_length(15)
                .interact()?;

            let viewer = match self.admin.viewer_mut() {
                Some(viewer) => viewer,
                None => return Ok(()),
            };

            if choice < ids.len() {
                viewer.toggle(ids[choice]);
            } else if choice == ids.len() {
                viewer.load();
            } else if choice == ids.len() + 1 {
                let theme = &self.theme;
                let purged = viewer.purge_all(|| {
                    Confirm::with_theme(theme)
                        .with_prompt("WARNING: Provide authorization to purge system logs?")
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                })?;
                if purged {
                    print_success("System logs purged");
                }
            } else {
                return Ok(());
            }
        }
    }
}

/// Print the outcome of the last scan
pub fn render_state(state: &SearchState) {
    match state {
        SearchState::Idle => print_info("Awaiting input"),
        SearchState::Loading => print_info("Scanning..."),
        SearchState::Success(response) if response.results.is_empty() => {
            print_warning("NO RECORDS FOUND");
        }
        SearchState::Success(response) => {
            print_success(&format!("{} record(s) found", response.count()));
            println!("{}", results_table(&response.results));
        }
        SearchState::Failed(message) => print_error(message),
    }
}

/// Blocking notification: show `message` until a key is pressed
fn acknowledge(message: &str) -> Result<()> {
    print_error(message);
    println!("{}", Theme::muted("Press any key to continue"));
    Term::stdout().read_key()?;
    Ok(())
}
