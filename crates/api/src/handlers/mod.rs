pub mod actions;
pub mod backup;
pub mod dialplan;
pub mod rules;
