mod health;
mod url;
mod user;

pub use health::{health_handler, ping_handler};
pub use url::{redirect_handler, shorten_batch_handler, shorten_json_handler, shorten_text_handler};
pub use user::{delete_user_urls_handler, user_urls_handler};
