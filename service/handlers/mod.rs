pub mod appraisals;
pub mod health;
