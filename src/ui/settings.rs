use iced::widget::{button, checkbox, column, container, row, text, text_input};
use iced::{Alignment, Element, Length, Task, Theme};

use crate::api::ollama::OllamaClient;
use crate::config::Config;

#[derive(Debug, Clone, Default)]
pub struct State {
    // Required to be public for dynamically changing the theme
    pub config: Config,
    available_models: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Action {
    ServerUrlChanged(String),
    ModelChanged(String),
    AutoStartToggled(bool),
    ScreenshotDirChanged(String),
    ChangeTheme(Theme),
    Save,
    ModelsLoaded(Vec<String>),
}

impl State {
    pub fn new() -> (Self, Task<Action>) {
        let state = Self::default();
        let url = state.config.server.url.clone();
        let task = Task::perform(load_models(url), Action::ModelsLoaded);
        (state, task)
    }

    pub fn update(&mut self, action: Action) -> Task<Action> {
        match action {
            Action::ServerUrlChanged(value) => {
                self.config.server.url = value;
                Task::none()
            }
            Action::ModelChanged(value) => {
                self.config.server.model = value;
                Task::none()
            }
            Action::AutoStartToggled(value) => {
                self.config.server.auto_start = value;
                self.config.update_settings();
                Task::none()
            }
            Action::ScreenshotDirChanged(value) => {
                self.config.actions.screenshot_dir =
                    if value.is_empty() { None } else { Some(value) };
                Task::none()
            }
            Action::ChangeTheme(theme) => {
                self.config.theme = theme;
                self.config.update_settings();
                Task::none()
            }
            Action::Save => {
                self.config.update_settings();
                let url = self.config.server.url.clone();
                Task::perform(load_models(url), Action::ModelsLoaded)
            }
            Action::ModelsLoaded(models) => {
                self.available_models = models;
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Action> {
        let models_hint = if self.available_models.is_empty() {
            text("No models found. Is the server running?".to_string())
        } else {
            text(format!("Available: {}", self.available_models.join(", ")))
        };

        let form = column![
            text("Server URL"),
            text_input("http://localhost:11434", &self.config.server.url)
                .on_input(Action::ServerUrlChanged),
            text("Model"),
            text_input("llama3.2", &self.config.server.model).on_input(Action::ModelChanged),
            models_hint,
            checkbox(self.config.server.auto_start)
                .label("Start the server automatically")
                .on_toggle(Action::AutoStartToggled),
            text("Screenshot folder (empty for Desktop)"),
            text_input(
                "",
                self.config.actions.screenshot_dir.as_deref().unwrap_or("")
            )
            .on_input(Action::ScreenshotDirChanged),
            row![
                button("Light").on_press(Action::ChangeTheme(Theme::Light)),
                button("Dark").on_press(Action::ChangeTheme(Theme::Dark)),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            button("Save").on_press(Action::Save),
        ]
        .spacing(10)
        .max_width(480);

        container(form)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }
}

async fn load_models(url: String) -> Vec<String> {
    match OllamaClient::new(&url).list_models().await {
        Ok(models) => models,
        Err(err) => {
            log::warn!("couldn't list models: {err}");
            vec![]
        }
    }
}
