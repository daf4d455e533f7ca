mod user;

pub use self::user::UserId;
