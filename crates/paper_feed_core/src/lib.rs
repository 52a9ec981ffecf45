pub mod domain;
pub mod ports;

pub use domain::{DateBucket, Paper, Session, UserProfile, UserRating};
pub use ports::{PortError, PortResult, RecommendationService, TokenStore};
