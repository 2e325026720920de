// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{TabKind, Theme};

/// Terminal width below which the sidebar collapses, the analog of the
/// narrow-viewport breakpoint in the web layout this client replaces.
pub const SIDEBAR_COLLAPSE_COLS: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Requerimento,
    Confirmacao,
    Ajuda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub level: AlertLevel,
    pub permanent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub active_tab: TabKind,
    pub theme: Theme,
    pub modal: Option<ModalKind>,
    pub alerts: Vec<Alert>,
    pub sidebar_collapsed: bool,
    pub status_line: Option<String>,
    next_alert_id: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            active_tab: TabKind::Dashboard,
            theme: Theme::Light,
            modal: None,
            alerts: Vec::new(),
            sidebar_collapsed: false,
            status_line: None,
            next_alert_id: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    NextTab,
    PrevTab,
    SetTab(TabKind),
    ToggleTheme,
    OpenModal(ModalKind),
    CloseModal,
    PushAlert {
        message: String,
        level: AlertLevel,
        permanent: bool,
    },
    DismissAlert(u64),
    Resize {
        width: u16,
    },
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    TabChanged(TabKind),
    ThemeChanged(Theme),
    ModalOpened(ModalKind),
    ModalClosed(ModalKind),
    AlertShown(u64),
    AlertDismissed(u64),
    SidebarCollapsed(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl PageState {
    /// Applies one command and reports what changed. Every mutation of
    /// page-level state funnels through here so tests can drive the page
    /// without a terminal.
    pub fn dispatch(&mut self, command: PageCommand) -> Vec<PageEvent> {
        match command {
            PageCommand::NextTab => self.rotate_tab(1),
            PageCommand::PrevTab => self.rotate_tab(-1),
            PageCommand::SetTab(tab) => {
                if self.active_tab == tab {
                    return Vec::new();
                }
                self.active_tab = tab;
                vec![PageEvent::TabChanged(tab)]
            }
            PageCommand::ToggleTheme => {
                self.theme = self.theme.toggled();
                vec![PageEvent::ThemeChanged(self.theme)]
            }
            PageCommand::OpenModal(kind) => {
                self.modal = Some(kind);
                vec![PageEvent::ModalOpened(kind)]
            }
            PageCommand::CloseModal => match self.modal.take() {
                Some(kind) => vec![PageEvent::ModalClosed(kind)],
                None => Vec::new(),
            },
            PageCommand::PushAlert {
                message,
                level,
                permanent,
            } => {
                let id = self.next_alert_id;
                self.next_alert_id += 1;
                self.alerts.push(Alert {
                    id,
                    message,
                    level,
                    permanent,
                });
                vec![PageEvent::AlertShown(id)]
            }
            PageCommand::DismissAlert(id) => {
                let before = self.alerts.len();
                self.alerts.retain(|alert| alert.id != id);
                if self.alerts.len() == before {
                    return Vec::new();
                }
                vec![PageEvent::AlertDismissed(id)]
            }
            PageCommand::Resize { width } => {
                let collapsed = width < SIDEBAR_COLLAPSE_COLS;
                if collapsed == self.sidebar_collapsed {
                    return Vec::new();
                }
                self.sidebar_collapsed = collapsed;
                vec![PageEvent::SidebarCollapsed(collapsed)]
            }
            PageCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![PageEvent::StatusUpdated(message)]
            }
            PageCommand::ClearStatus => {
                self.status_line = None;
                vec![PageEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<PageEvent> {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![PageEvent::TabChanged(self.active_tab)]
    }
}
