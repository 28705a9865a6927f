//! Text rendering for the terminal: the appointment table and the form's
//! inline field errors.

pub mod form;
pub mod table;
