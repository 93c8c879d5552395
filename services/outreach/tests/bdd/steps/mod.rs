//! BDD step definitions for the outreach service

pub mod gate_steps;
pub mod newsletter_steps;
pub mod reply_steps;
