mod health;
mod url;
mod user;

pub use self::health::health_handler;
pub use self::url::{delete_url_handler, redirect_handler, save_url_handler};
pub use self::user::{delete_user_handler, login_handler, register_handler};
