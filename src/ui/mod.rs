use iced::{
    widget::{button, column, row},
    Element, Task, Theme,
};

mod chat;
mod settings;

pub fn init() -> (Deskmate, Task<Message>) {
    Deskmate::new()
}

#[derive(Debug, Default)]
pub struct Deskmate {
    current_page: PageId,
    chat: chat::State,
    pub settings: settings::State,
}

impl Deskmate {
    pub fn new() -> (Self, Task<Message>) {
        let (settings_state, settings_task) = settings::State::new();
        let state = Self {
            current_page: PageId::default(),
            chat: chat::State::new(),
            settings: settings_state,
        };
        let task = settings_task.map(Message::Settings);
        (state, task)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(PageId),
    Chat(chat::ChatAction),
    Settings(settings::Action),
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub enum PageId {
    #[default]
    Chat,
    Settings,
}

pub fn update(state: &mut Deskmate, message: Message) -> Task<Message> {
    match message {
        Message::Navigate(page_id) => {
            state.current_page = page_id;
            Task::none()
        }
        Message::Chat(chat_action) => {
            let task = state.chat.update(chat_action);
            task.map(Message::Chat)
        }
        Message::Settings(settings_action) => {
            let task = state.settings.update(settings_action);
            task.map(Message::Settings)
        }
    }
}

pub fn view(state: &Deskmate) -> Element<'_, Message> {
    let navigation = build_navigation_bar(&state.current_page);

    let page_content = match &state.current_page {
        PageId::Chat => state.chat.view().map(Message::Chat),
        PageId::Settings => state.settings.view().map(Message::Settings),
    };

    column![navigation, page_content]
        .spacing(10)
        .padding(10)
        .into()
}

pub fn theme(state: &Deskmate) -> Theme {
    state.settings.config.theme.clone()
}

fn build_navigation_bar(current_page: &PageId) -> Element<'static, Message> {
    row![
        button("Chat").on_press_maybe(if current_page != &PageId::Chat {
            Some(Message::Navigate(PageId::Chat))
        } else {
            None
        }),
        button("Settings").on_press_maybe(if current_page != &PageId::Settings {
            Some(Message::Navigate(PageId::Settings))
        } else {
            None
        }),
    ]
    .spacing(10)
    .into()
}
