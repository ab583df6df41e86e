// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ViewKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub active_view: ViewKind,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_view: ViewKind::Orders,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    ShowView(ViewKind),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(active_view: ViewKind) -> Self {
        Self {
            active_view,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::ShowView(kind) => {
                self.active_view = kind;
                vec![
                    AppEvent::ViewChanged(kind),
                    self.set_status(&format!("{} view", kind.label())),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_view = views[next];
        vec![
            AppEvent::ViewChanged(self.active_view),
            self.set_status(&format!("{} view", self.active_view.label())),
        ]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
