use std::time::Duration;

use eframe::egui;
use shared::domain::{Message, MessageId, Role};

use crate::controller::{session::WINDOW_TITLE, BridgeStatus, SessionController};

const COMPOSER_HEIGHT: f32 = 56.0;
const SEND_BUTTON_WIDTH: f32 = 96.0;
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

const HEADER_BG: egui::Color32 = egui::Color32::from_rgb(0x66, 0x7e, 0xea);
const USER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(0xe3, 0xf2, 0xfd);
const USER_LABEL: egui::Color32 = egui::Color32::from_rgb(0x19, 0x76, 0xd2);
const ASSISTANT_BUBBLE: egui::Color32 = egui::Color32::from_rgb(0xf5, 0xf5, 0xf5);
const ASSISTANT_LABEL: egui::Color32 = egui::Color32::from_rgb(0x42, 0x42, 0x42);
const CONNECTED: egui::Color32 = egui::Color32::from_rgb(0x4c, 0xaf, 0x50);
const DISCONNECTED: egui::Color32 = egui::Color32::from_rgb(0xbd, 0xbd, 0xbd);
const LOAD_ERROR: egui::Color32 = egui::Color32::from_rgb(0xff, 0xcd, 0xd2);

/// Native chat window. Owns the controller and renders from store snapshots.
pub struct ShellApp {
    controller: SessionController,
    composer: String,
    messages: Vec<Message>,
    rendered_up_to: Option<MessageId>,
    applied_title: Option<String>,
}

impl ShellApp {
    pub fn new(controller: SessionController) -> Self {
        let mut app = Self {
            controller,
            composer: String::new(),
            messages: Vec::new(),
            rendered_up_to: None,
            applied_title: None,
        };
        app.refresh_messages();
        app
    }

    /// Appends whatever the store gained since the last rendered id.
    fn refresh_messages(&mut self) {
        let newer = self.controller.store().messages_after(self.rendered_up_to);
        if let Some(last) = newer.last() {
            self.rendered_up_to = Some(last.id);
        }
        self.messages.extend(newer);
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = self.controller.window_title();
        if self.applied_title.as_deref() != Some(title.as_str()) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.applied_title = Some(title);
        }
    }

    fn try_send_current_composer(&mut self, response: &egui::Response) {
        let text = self.composer.trim_end_matches('\n').to_string();
        if self.controller.send_user_message(&text).is_some() {
            self.composer.clear();
            self.refresh_messages();
        } else if text.trim().is_empty() {
            self.composer.clear();
        }
        response.request_focus();
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::default().fill(HEADER_BG).inner_margin(egui::Margin::same(12)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(WINDOW_TITLE)
                            .heading()
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    ui.label(
                        egui::RichText::new(self.controller.environment_label())
                            .small()
                            .color(egui::Color32::WHITE),
                    );
                    if let Some(load_error) = self.controller.last_load_error() {
                        ui.label(
                            egui::RichText::new(format!("Connection problem: {load_error}"))
                                .small()
                                .color(LOAD_ERROR),
                        );
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (text, color, hover) = match self.controller.bridge_status() {
                            BridgeStatus::Active(addr) => (
                                "● Connected",
                                CONNECTED,
                                format!(
                                    "Listening on {addr} ({:?})",
                                    self.controller.listener_state()
                                ),
                            ),
                            BridgeStatus::Inert(reason) => {
                                ("● Bridge offline", DISCONNECTED, reason.clone())
                            }
                        };
                        ui.label(egui::RichText::new(text).small().color(color))
                            .on_hover_text(hover);
                    });
                });
            });
    }

    fn show_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            let pending = self.controller.pending_sends();
            let status = self.controller.status();
            if pending > 0 {
                ui.small(format!("Waiting for backend ({pending})"));
            } else if !status.is_empty() {
                ui.small(status);
            }
            ui.horizontal(|ui| {
                let response = ui.add_sized(
                    [ui.available_width() - SEND_BUTTON_WIDTH, COMPOSER_HEIGHT],
                    egui::TextEdit::multiline(&mut self.composer)
                        .hint_text("Type your message here... (Enter to send, Shift+Enter for newline)"),
                );
                let send_shortcut = response.has_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift);
                let accepting_input = !self.controller.window_state().is_shutting_down();
                let clicked_send = ui
                    .add_enabled_ui(accepting_input, |ui| {
                        ui.add_sized(
                            [SEND_BUTTON_WIDTH - 8.0, COMPOSER_HEIGHT],
                            egui::Button::new("Send"),
                        )
                    })
                    .inner
                    .clicked();
                if send_shortcut || clicked_send {
                    self.try_send_current_composer(&response);
                }
            });
            ui.add_space(6.0);
        });
    }

    fn show_messages(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in &self.messages {
                        render_message(ui, message);
                        ui.add_space(8.0);
                    }
                });
        });
    }
}

fn render_message(ui: &mut egui::Ui, message: &Message) {
    let (fill, label_color) = match message.role {
        Role::User => (USER_BUBBLE, USER_LABEL),
        Role::Assistant => (ASSISTANT_BUBBLE, ASSISTANT_LABEL),
    };
    let received_at = message
        .received_at
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S")
        .to_string();

    egui::Frame::group(ui.style())
        .fill(fill)
        .inner_margin(egui::Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(message.role.label())
                        .strong()
                        .color(label_color),
                );
                ui.small(received_at);
            });
            ui.label(egui::RichText::new(&message.text).color(egui::Color32::BLACK));
        });
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let conversation_changed = self.controller.process_ui_events();
        if conversation_changed || self.controller.store().last_id() != self.rendered_up_to {
            self.refresh_messages();
        }

        self.sync_title(ctx);
        self.show_header(ctx);
        self.show_composer(ctx);
        self.show_messages(ctx);

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

#[cfg(test)]
#[path = "../tests/app_tests.rs"]
mod tests;
