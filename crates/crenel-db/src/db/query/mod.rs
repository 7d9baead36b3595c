pub mod admin_user;
pub mod intervenant;
