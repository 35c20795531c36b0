mod actions;
mod api;
mod chat;
mod config;
mod intent;
mod models;
mod ui;

pub fn main() -> iced::Result {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("Failed to initialize logging");

    iced::application(ui::init, ui::update, ui::view)
        .title("Deskmate")
        .theme(ui::theme)
        .run()
}
