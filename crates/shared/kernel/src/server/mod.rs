mod health;
pub mod router;
