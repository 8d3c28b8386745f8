pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod post;
pub mod comment;
pub mod post_like;
pub mod follow;
pub mod conversation;
pub mod message;
pub mod listing;
pub mod booking;
pub mod favorite;

#[cfg(test)]
mod tests;
