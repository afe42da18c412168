pub mod attempt;
pub mod mocktest;
pub mod outcome;
pub mod question;
