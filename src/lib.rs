pub mod commands;
pub mod config;
pub mod db;
pub mod handlers;
pub mod imdb;
pub mod permissions;
pub mod showtime;
pub mod store;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub store: store::GuildStore,
    pub imdb: imdb::ImdbClient,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
