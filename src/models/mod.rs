//! Data models
//!
//! This module contains the data structures shared by the askly services.
//! Models represent:
//! - Database entities (User, Session, Question, Answer)
//! - Service inputs (SignupInput)

mod answer;
mod question;
mod session;
mod user;

pub use answer::Answer;
pub use question::Question;
pub use session::{InvalidReason, Session, SessionStatus};
pub use user::{DuplicateCredential, SignupInput, User, UserProfile, UserRole};
