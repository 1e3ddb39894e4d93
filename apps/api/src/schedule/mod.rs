//! Scheduled interviews — a simple lifecycle next to the live session flow.
//!
//! An entry is created when an interview is booked and flipped to completed
//! exactly once, either by an explicit confirmation or by the periodic
//! sweep in `interview::timeout` once its date and time have passed.

pub mod handlers;
