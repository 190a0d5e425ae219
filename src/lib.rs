pub mod browser;
pub mod config;
pub mod error;
pub mod fixture;
pub mod logging;
pub mod server;

pub use browser::{ChromeDriver, PageDriver};
pub use config::SmokeConfig;
pub use error::{Result, SmokeError};
pub use fixture::{check_title, SmokeFixture};
pub use server::StaticServer;
