pub mod autorole;
pub mod disable;
pub mod event;
pub mod host;
pub mod logging;
pub mod say;
pub mod welcome;
