use std::sync::Arc;

use crossterm::event::Event as CrosstermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use edu_core::UiController;
use edu_core::protocol::EventMsg;
use edu_core::protocol::FormId;
use edu_core::protocol::InputId;
use edu_core::protocol::NotificationKind;
use edu_core::protocol::Op;
use edu_core::protocol::OverlayTicket;
use ratatui::widgets::WidgetRef;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::page::Page;
use crate::screen::Screen;
use crate::slash_command::ProcessedCommand;
use crate::slash_command::SlashCommand;
use crate::slash_command::parse_notify_args;
use crate::slash_command::parse_submit_args;
use crate::slash_command::process_slash_command_message;
use crate::tui::Tui;

/// Search input the terminal drives.
pub(crate) const SEARCH_INPUT: &str = "search";

/// Form the `/submit` command posts; one submission at a time.
pub(crate) const COMMAND_FORM: &str = "command-line";

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Redraw,
    Controller(EventMsg),
    ControllerStopped,
}

pub(crate) struct App {
    controller: Arc<UiController>,
    page: Page,
    input: String,
    search_input: InputId,
    endpoint: String,
    user: Option<String>,
    overlay_ticket: Option<OverlayTicket>,
    exit: bool,
    app_event_tx: UnboundedSender<AppEvent>,
    app_event_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(controller: UiController, endpoint: String) -> Self {
        let (app_event_tx, app_event_rx) = unbounded_channel();
        Self {
            controller: Arc::new(controller),
            page: Page::new(),
            input: String::new(),
            search_input: InputId::new(SEARCH_INPUT),
            endpoint,
            user: None,
            overlay_ticket: None,
            exit: false,
            app_event_tx,
            app_event_rx,
        }
    }

    /// Forward terminal input and controller events into the app queue.
    fn spawn_event_sources(&self) {
        // crossterm reads block, so they get their own thread.
        let tx = self.app_event_tx.clone();
        std::thread::spawn(move || {
            loop {
                let app_event = match crossterm::event::read() {
                    Ok(CrosstermEvent::Key(key)) => AppEvent::Key(key),
                    Ok(CrosstermEvent::Paste(text)) => AppEvent::Paste(text),
                    Ok(CrosstermEvent::Resize(..)) => AppEvent::Redraw,
                    Ok(_) => continue,
                    Err(e) => {
                        error!("failed to read terminal event: {e}");
                        break;
                    }
                };
                if tx.send(app_event).is_err() {
                    break;
                }
            }
        });

        let tx = self.app_event_tx.clone();
        let controller = Arc::clone(&self.controller);
        tokio::spawn(async move {
            loop {
                match controller.next_event().await {
                    Ok(event) => {
                        if tx.send(AppEvent::Controller(event.msg)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        let _ = tx.send(AppEvent::ControllerStopped);
                        break;
                    }
                }
            }
        });
    }

    pub async fn run(mut self, terminal: &mut Tui) -> anyhow::Result<()> {
        self.spawn_event_sources();
        self.controller
            .submit(Op::AttachSearch {
                input: self.search_input.clone(),
                endpoint: self.endpoint.clone(),
            })
            .await?;

        self.draw(terminal)?;
        while let Some(event) = self.app_event_rx.recv().await {
            match event {
                AppEvent::Key(key) => self.on_key(key).await?,
                AppEvent::Paste(text) => {
                    self.input.push_str(&text.replace(['\r', '\n'], " "));
                    self.input_changed().await?;
                }
                AppEvent::Redraw => {}
                AppEvent::Controller(msg) => {
                    if matches!(msg, EventMsg::ShutdownComplete) {
                        self.exit = true;
                    }
                    self.page.apply(msg);
                    if self.page.take_finished_logout() {
                        self.user = None;
                        self.overlay_ticket = None;
                        self.controller.submit(Op::HideAllOverlays).await?;
                    }
                }
                AppEvent::ControllerStopped => {
                    info!("controller stopped");
                    self.exit = true;
                }
            }
            if self.exit {
                break;
            }
            self.draw(terminal)?;
        }
        Ok(())
    }

    fn draw(&self, terminal: &mut Tui) -> anyhow::Result<()> {
        let screen = Screen {
            page: &self.page,
            input: &self.input,
            search_input: &self.search_input,
            user: self.user.as_deref(),
        };
        terminal.draw(|frame| {
            let area = frame.area();
            screen.render_ref(area, frame.buffer_mut());
            let (x, y) = screen.cursor_position(area);
            frame.set_cursor_position((x, y));
        })?;
        Ok(())
    }

    async fn on_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        self.controller.submit(Op::UserActivity).await?;

        if self.page.inactivity_prompt {
            let stay = match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
                KeyCode::Char('n') | KeyCode::Char('N') => false,
                _ => return Ok(()),
            };
            self.page.inactivity_prompt = false;
            self.controller
                .submit(Op::InactivityResponse { stay })
                .await?;
            return Ok(());
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.controller.submit(Op::Shutdown).await?;
            }
            KeyCode::Esc => {
                if !self.input.is_empty() {
                    self.input.clear();
                    self.input_changed().await?;
                } else if let Some(card) = self.page.newest_card() {
                    let id = card.id;
                    self.controller
                        .submit(Op::DismissNotification { id })
                        .await?;
                }
            }
            KeyCode::Enter => self.submit_line().await?,
            KeyCode::Backspace => {
                self.input.pop();
                self.input_changed().await?;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                self.input_changed().await?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Every edit of a search query goes to the controller; command lines
    /// do not.
    async fn input_changed(&mut self) -> anyhow::Result<()> {
        if self.input.starts_with('/') {
            return Ok(());
        }
        self.controller
            .submit(Op::SearchInputChanged {
                input: self.search_input.clone(),
                text: self.input.clone(),
            })
            .await?;
        Ok(())
    }

    async fn submit_line(&mut self) -> anyhow::Result<()> {
        let (command, args) = match process_slash_command_message(&self.input) {
            ProcessedCommand::NotCommand(_) => return Ok(()),
            ProcessedCommand::Error(message) => {
                self.controller
                    .notify(NotificationKind::Warning, message)
                    .await?;
                return Ok(());
            }
            ProcessedCommand::Command(command, args) => (command, args),
        };
        self.input.clear();
        self.dispatch_command(command, &args).await
    }

    async fn dispatch_command(&mut self, command: SlashCommand, args: &str) -> anyhow::Result<()> {
        debug!("running /{}", command.command());
        match command {
            SlashCommand::Submit => match parse_submit_args(args) {
                Ok(request) => {
                    self.controller
                        .submit(Op::SubmitForm {
                            form: FormId::new(COMMAND_FORM),
                            request,
                        })
                        .await?;
                }
                Err(message) => {
                    self.controller
                        .notify(NotificationKind::Warning, message)
                        .await?;
                }
            },
            SlashCommand::Notify => {
                let (kind, message) = parse_notify_args(args);
                self.controller.notify(kind, message).await?;
            }
            SlashCommand::Dismiss => {
                if let Some(card) = self.page.newest_card() {
                    let id = card.id;
                    self.controller
                        .submit(Op::DismissNotification { id })
                        .await?;
                }
            }
            SlashCommand::Theme => {
                self.controller.submit(Op::ToggleTheme).await?;
            }
            SlashCommand::Overlay => match self.overlay_ticket.take() {
                Some(ticket) => {
                    self.controller.hide_overlay(ticket).await?;
                }
                None => {
                    let message = (!args.is_empty()).then(|| args.to_string());
                    self.overlay_ticket = Some(self.controller.show_overlay(message).await?);
                }
            },
            SlashCommand::Login => {
                let mut words = args.split_whitespace();
                let user = words.next().unwrap_or_default().to_string();
                let access_token = words.next().map(str::to_string);
                self.user = Some(user.clone());
                self.page.signed_in = true;
                self.controller
                    .submit(Op::SetSession { user, access_token })
                    .await?;
            }
            SlashCommand::Logout => {
                self.controller.submit(Op::Logout).await?;
            }
            SlashCommand::Quit => {
                self.controller.submit(Op::Shutdown).await?;
            }
        }
        Ok(())
    }
}
