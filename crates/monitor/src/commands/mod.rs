pub mod check;
pub mod test_email;
